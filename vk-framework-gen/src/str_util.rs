//! `vkStrUtil.inl` prototypes and their `vkStrUtilImpl.inl` bodies.

use std::collections::HashSet;

use vk_registry::{Api, Bitmask, Composite, EnumType, Member};

use crate::names::bare_name;
use crate::platform::{PLATFORM_TYPES, PLATFORM_TYPE_NAMESPACE};
use crate::writer::Inl;

/// Character arrays printed as strings rather than byte dumps.
const STRING_ARRAYS: &[&str] = &["extensionName", "deviceName", "layerName", "description"];

fn sorted_enums(api: &Api) -> Vec<&EnumType> {
    let mut enums: Vec<&EnumType> = api.enums.iter().collect();
    enums.sort_by(|a, b| a.name.cmp(&b.name));
    enums
}

/// Bitmasks that back a flags type, with that flags type name.
fn sorted_bitmasks(api: &Api) -> Vec<(&Bitmask, &str)> {
    let mut bitmasks: Vec<(&Bitmask, &str)> = api
        .bitmasks
        .iter()
        .filter_map(|b| b.flags_name.as_deref().map(|f| (b, f)))
        .collect();
    bitmasks.sort_by(|a, b| a.0.name.cmp(&b.0.name));
    bitmasks
}

fn sorted_composites(api: &Api) -> Vec<&Composite> {
    let mut composites: Vec<&Composite> = api.composites.iter().collect();
    composites.sort_by(|a, b| a.name.cmp(&b.name));
    composites
}

pub fn generate_proto(api: &Api) -> String {
    let enums = sorted_enums(api);
    let mut inl = Inl::new();
    inl.aligned(enums.iter().map(|e| {
        format!("const char*\tget{}Name\t({} value);", bare_name(&e.name), e.name)
    }));
    inl.line("");
    inl.aligned(enums.iter().map(|e| {
        let bare = bare_name(&e.name);
        format!(
            "inline tcu::Format::Enum<{n}>\tget{b}Str\t({n} value)\t{{ return tcu::Format::Enum<{n}>(get{b}Name, value);\t}}",
            n = e.name,
            b = bare
        )
    }));
    inl.line("");
    inl.aligned(enums.iter().map(|e| {
        format!(
            "inline std::ostream&\toperator<<\t(std::ostream& s, {} value)\t{{ return s << get{}Str(value);\t}}",
            e.name,
            bare_name(&e.name)
        )
    }));
    inl.line("");
    inl.aligned(sorted_bitmasks(api).into_iter().map(|(b, flags)| {
        format!(
            "tcu::Format::Bitfield<{}>\tget{}Str\t({} value);",
            b.bit_width,
            bare_name(flags),
            flags
        )
    }));
    inl.line("");
    inl.aligned(sorted_composites(api).into_iter().map(|s| {
        format!("std::ostream&\toperator<<\t(std::ostream& s, const {}& value);", s.name)
    }));
    inl.finish()
}

pub fn generate_impl(api: &Api) -> String {
    let mut inl = Inl::new();

    let mut handles: Vec<&str> = api.handles.iter().map(|h| h.name.as_str()).collect();
    handles.sort_unstable();
    inl.aligned(handles.iter().map(|h| {
        format!("template<> const char*\tgetTypeName<{}>\t(void) {{ return \"{}\";\t}}", h, h)
    }));

    inl.line("");
    inl.line(format!("namespace {}", PLATFORM_TYPE_NAMESPACE));
    inl.line("{");
    inl.aligned(PLATFORM_TYPES.iter().map(|(_, name, _)| {
        format!(
            "std::ostream& operator<< (std::ostream& s, {}\tv) {{ return s << tcu::toHex(v.internal); }}",
            name
        )
    }));
    inl.line("}");

    for e in sorted_enums(api) {
        inl.line("");
        inl.line(format!("const char* get{}Name ({} value)", bare_name(&e.name), e.name));
        inl.line("{");
        inl.line("\tswitch (value)");
        inl.line("\t{");
        let mut values: Vec<&str> = e.values.iter().map(|v| v.name.as_str()).collect();
        values.sort_unstable();
        let mut cases: Vec<String> = values
            .iter()
            .map(|v| format!("\t\tcase {}:\treturn \"{}\";", v, v))
            .collect();
        cases.push("\t\tdefault:\treturn nullptr;".to_string());
        inl.aligned(cases);
        inl.line("\t}");
        inl.line("}");
    }

    let bitmasks = sorted_bitmasks(api);
    for (bitmask, flags) in &bitmasks {
        inl.line("");
        inl.line(format!(
            "tcu::Format::Bitfield<{}> get{}Str ({} value)",
            bitmask.bit_width,
            bare_name(flags),
            flags
        ));
        inl.line("{");
        inl.line("\tstatic const tcu::Format::BitDesc s_desc[] =");
        inl.line("\t{");
        if bitmask.values.is_empty() {
            inl.line("\t\ttcu::Format::BitDesc(0, \"0\")");
        } else {
            let mut values: Vec<&str> = bitmask.values.iter().map(|v| v.name.as_str()).collect();
            values.sort_unstable();
            inl.aligned(
                values
                    .iter()
                    .map(|v| format!("\t\ttcu::Format::BitDesc({},\t\"{}\"),", v, v)),
            );
        }
        inl.line("\t};");
        inl.line(format!(
            "\treturn tcu::Format::Bitfield<{}>(value, DE_ARRAY_BEGIN(s_desc), DE_ARRAY_END(s_desc));",
            bitmask.bit_width
        ));
        inl.line("}");
    }

    let flag_types: HashSet<&str> = bitmasks.iter().map(|(_, flags)| *flags).collect();
    inl.line("");
    for s in sorted_composites(api) {
        inl.line("");
        inl.line(format!("std::ostream& operator<< (std::ostream& s, const {}& value)", s.name));
        inl.line("{");
        inl.line(format!("\ts << \"{} = {{\\n\";", s.name));
        for member in &s.members {
            member_printer(&mut inl, member, &flag_types);
        }
        inl.line("\ts << '}';");
        inl.line("\treturn s;");
        inl.line("}");
    }
    inl.finish()
}

fn member_printer(inl: &mut Inl, member: &Member, flag_types: &HashSet<&str>) {
    let name = &member.name;
    let mut new_line = "";
    let value = if flag_types.contains(member.type_name.as_str()) {
        let deref = if member.pointer > 0 { "*" } else { "" };
        format!("get{}Str({}value.{})", bare_name(&member.type_name), deref, name)
    } else if member.type_name == "char" && member.pointer == 1 && member.arrays.is_empty() {
        format!("getCharPtrStr(value.{})", name)
    } else if member.type_name == "LPCWSTR" {
        format!("getWStr(value.{})", name)
    } else if member.arrays.len() == 1 {
        if STRING_ARRAYS.contains(&name.as_str()) {
            format!("(const char*)value.{}", name)
        } else if member.type_name == "char" || member.type_name == "uint8_t" {
            new_line = "'\\n' << ";
            format!(
                "tcu::formatArray(tcu::Format::HexIterator<{t}>(DE_ARRAY_BEGIN(value.{n})), tcu::Format::HexIterator<{t}>(DE_ARRAY_END(value.{n})))",
                t = member.type_name,
                n = name
            )
        } else {
            let end = if name == "memoryTypes" || name == "memoryHeaps" {
                format!("DE_ARRAY_BEGIN(value.{}) + value.{}Count", name, &name[..name.len() - 1])
            } else {
                format!("DE_ARRAY_END(value.{})", name)
            };
            new_line = "'\\n' << ";
            format!("tcu::formatArray(DE_ARRAY_BEGIN(value.{}), {})", name, end)
        }
    } else if member.arrays.len() > 1 {
        inl.line(format!("\ts << \"\\t{} = \" << '\\n';", name));
        let mut index = String::new();
        for (dim, size) in member.arrays[..member.arrays.len() - 1].iter().enumerate() {
            inl.line(format!("\tfor(uint32_t i{d} = 0 ; i{d} < {s} ; ++i{d})", d = dim, s = size));
            index.push_str(&format!("[i{}]", dim));
        }
        inl.line(format!(
            "\t\ts << tcu::formatArray(DE_ARRAY_BEGIN(value.{n}{i}), DE_ARRAY_END(value.{n}{i})) << '\\n';",
            n = name,
            i = index
        ));
        return;
    } else {
        format!("value.{}", name)
    };
    inl.line(format!("\ts << \"\\t{} = \" << {}{} << '\\n';", name, new_line, value));
}
