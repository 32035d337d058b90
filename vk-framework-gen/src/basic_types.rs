//! `vkBasicTypes.inl`: defines, handles, enums, bitmasks, flags, platform
//! types and extension names.

use log::debug;
use vk_registry::{Api, ApiVariant, Bitmask, EnumType, EnumValue};

use crate::handles::handle_type_name;
use crate::names::enum_prefix_and_postfix;
use crate::platform::{definition_type, PLATFORM_TYPES};
use crate::writer::Inl;

pub fn generate(api: &Api) -> String {
    let mut inl = Inl::new();

    inl.line("// Defines");
    inl.aligned(defines(api));
    inl.line("");

    inl.line("// Handles");
    inl.aligned(handles(api));
    inl.line("");

    let mut enums: Vec<&EnumType> = api
        .enums
        .iter()
        .filter(|e| !(e.values.is_empty() && api.variant == ApiVariant::Vulkan))
        .collect();
    enums.sort_by(|a, b| a.name.cmp(&b.name));

    inl.line("// Enums");
    for e in &enums {
        enum_definition(&mut inl, e);
    }

    inl.line("// Enum aliases");
    for e in &enums {
        for alias in &e.aliases {
            inl.line(format!("typedef {} {};", e.name, alias));
        }
    }

    inl.line("// Bitmasks");
    for bitmask in &api.bitmasks {
        if bitmask.bit_width == 64 {
            bitmask64_definition(&mut inl, bitmask);
        } else {
            bitmask32_definition(&mut inl, bitmask);
        }
        if let Some(flags) = &bitmask.flags_name {
            inl.line(format!("typedef uint{}_t {};", bitmask.bit_width, flags));
        }
        for alias in &bitmask.aliases {
            inl.line(format!("typedef {} {};", bitmask.name, alias));
        }
        inl.line("");
    }

    let mut flags: Vec<_> = api.flags.iter().collect();
    flags.sort_by(|a, b| a.name.cmp(&b.name));
    inl.line("// Flags");
    for f in flags {
        // flags with bits were typedef'd next to their bitmask
        if f.bits.is_none() {
            inl.line(format!("typedef uint{}_t {};", f.bit_width, f.name));
        }
        for alias in &f.aliases {
            inl.line(format!("typedef {} {};", f.name, alias));
        }
    }
    inl.line("");

    inl.aligned(
        PLATFORM_TYPES
            .iter()
            .map(|(_, name, underlying)| format!("VK_DEFINE_PLATFORM_TYPE({},\t{})", name, underlying)),
    );
    inl.line("");

    let mut extensions: Vec<_> = api.extensions.iter().collect();
    extensions.sort_by(|a, b| a.name.cmp(&b.name));
    inl.line("// Extensions");
    for ext in extensions {
        if let Some(define) = &ext.name_define {
            inl.line(format!("#define {} \"{}\"", define, ext.name));
            if let Some(version) = ext.spec_version {
                let spec_define = define.replace("_EXTENSION_NAME", "_SPEC_VERSION");
                inl.line(format!("#define {} {}", spec_define, version));
            }
        }
    }

    inl.finish()
}

fn defines(api: &Api) -> Vec<String> {
    let mut lines = vec![
        "#define VK_API_VERSION_1_0\t(static_cast<uint32_t>\t(VK_MAKE_API_VERSION(0, 1, 0, 0)))".to_string(),
    ];
    let core_versions: Vec<_> = api
        .versions
        .iter()
        .filter(|v| v.name.starts_with("VK_VERSION_"))
        .collect();
    for v in core_versions.iter().filter(|v| (v.major, v.minor) != (1, 0)) {
        lines.push(format!(
            "#define {}\t(static_cast<uint32_t>\t(VK_MAKE_API_VERSION(0, {}, {}, 0)))",
            v.api_name, v.major, v.minor
        ));
    }
    lines.push(
        "#define VKSC_API_VERSION_1_0\t(static_cast<uint32_t>\t(VK_MAKE_API_VERSION(1, 1, 0, 0)))".to_string(),
    );

    let mut constants: Vec<_> = api.constants.iter().collect();
    constants.sort_by(|a, b| a.name.cmp(&b.name));
    for c in constants {
        let ty = definition_type(&c.name)
            .or(c.type_name.as_deref())
            .unwrap_or("uint32_t");
        lines.push(format!("#define {}\t(static_cast<{}>\t({}))", c.name, ty, c.value));
        for alias in &c.aliases {
            lines.push(format!("#define {}\t{}", alias, c.name));
        }
    }

    let (api_prefix, max_version) = match api.variant {
        ApiVariant::Vulkan => {
            let last = core_versions
                .last()
                .map(|v| format!("{}_{}", v.major, v.minor))
                .unwrap_or_else(|| "1_0".to_string());
            ("", last)
        }
        ApiVariant::VulkanSc => ("SC", "1_0".to_string()),
    };
    debug!("max framework version for '{}': {}", api.variant, max_version);
    lines.push(format!(
        "#define VK{}_API_MAX_FRAMEWORK_VERSION\tVK{}_API_VERSION_{}",
        api_prefix, api_prefix, max_version
    ));
    lines
}

fn handles(api: &Api) -> Vec<String> {
    let mut handles: Vec<_> = api.handles.iter().collect();
    handles.sort_by(|a, b| a.name.cmp(&b.name));
    let mut lines = Vec::new();
    for h in handles {
        let define = if h.dispatchable {
            "VK_DEFINE_HANDLE"
        } else {
            "VK_DEFINE_NON_DISPATCHABLE_HANDLE"
        };
        let handle_type = handle_type_name(&h.name);
        lines.push(format!("{}\t({},\t{});", define, h.name, handle_type));
        for alias in &h.aliases {
            lines.push(format!("{}\t({},\t{});", define, alias, handle_type));
        }
    }
    lines
}

fn enum_definition(inl: &mut Inl, e: &EnumType) {
    let values = e.sorted_values();
    let mut lines: Vec<String> = values
        .iter()
        .map(|v| format!("\t{}\t= {},", v.name, v.text))
        .collect();
    for v in &values {
        for alias in &v.aliases {
            lines.push(format!("\t{}\t= {},", alias, v.name));
        }
    }
    let (prefix, postfix) = enum_prefix_and_postfix(&e.name);
    if e.is_linear() {
        lines.push(format!("\t{}{}_LAST,", prefix, postfix));
    }
    lines.push(format!("\t{}_MAX_ENUM{}\t= 0x7FFFFFFF", prefix, postfix));

    inl.line(format!("enum {}", e.name));
    inl.line("{");
    inl.aligned(lines);
    inl.line("};");
    inl.line("");
}

fn bitmask_lines<F>(values: &[EnumValue], render: F) -> Vec<String>
where
    F: Fn(&str, &str) -> String,
{
    let mut lines = Vec::new();
    for v in values {
        lines.push(render(&v.name, &v.text));
        for alias in &v.aliases {
            lines.push(render(alias, &v.text));
        }
    }
    lines
}

fn bitmask32_definition(inl: &mut Inl, bitmask: &Bitmask) {
    let mut lines = bitmask_lines(&bitmask.values, |name, text| format!("\t{}\t= {},", name, text));
    let (prefix, postfix) = enum_prefix_and_postfix(&bitmask.name);
    lines.push(format!("\t{}_MAX_ENUM{}\t= 0x7FFFFFFF", prefix, postfix));
    inl.line(format!("enum {}", bitmask.name));
    inl.line("{");
    inl.aligned(lines);
    inl.line("};");
}

fn bitmask64_definition(inl: &mut Inl, bitmask: &Bitmask) {
    inl.line(format!("typedef uint64_t {};", bitmask.name));
    inl.aligned(bitmask_lines(&bitmask.values, |name, text| {
        format!("static const {} {}\t= {};", bitmask.name, name, text)
    }));
}
