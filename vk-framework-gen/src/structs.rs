//! `vkStructTypes.inl`, `vkGetStructureTypeImpl.inl` and the plain C
//! `vkStructTypesC.inl`.

use std::collections::HashSet;

use log::{debug, warn};
use vk_registry::{Api, ApiVariant, Composite, Member};

use crate::names::{enum_prefix_and_postfix, substitute_type};
use crate::writer::Inl;

fn sorted_composites(api: &Api) -> Vec<&Composite> {
    let mut composites: Vec<&Composite> = api.composites.iter().collect();
    composites.sort_by(|a, b| a.name.cmp(&b.name));
    composites
}

/// Orders composites so that every struct comes after the structs it embeds
/// by value. Otherwise alphabetical.
pub fn declaration_order(api: &Api) -> Vec<&Composite> {
    let all = sorted_composites(api);
    let mut emitted: HashSet<&str> = HashSet::new();
    let mut ordered: Vec<&Composite> = Vec::with_capacity(all.len());
    let mut delayed: Vec<&Composite> = Vec::new();

    let is_ready = |c: &Composite, emitted: &HashSet<&str>| {
        c.members.iter().filter(|m| m.pointer == 0).all(|m| match api.composite(&m.type_name) {
            Some(dep) => dep.name == c.name || emitted.contains(dep.name.as_str()),
            None => true,
        })
    };

    for composite in all {
        loop {
            match delayed.iter().position(|d| is_ready(*d, &emitted)) {
                Some(i) => {
                    let ready = delayed.remove(i);
                    emitted.insert(ready.name.as_str());
                    ordered.push(ready);
                }
                None => break,
            }
        }
        if is_ready(composite, &emitted) {
            emitted.insert(composite.name.as_str());
            ordered.push(composite);
        } else {
            delayed.push(composite);
        }
    }
    while !delayed.is_empty() {
        match delayed.iter().position(|d| is_ready(*d, &emitted)) {
            Some(i) => {
                let ready = delayed.remove(i);
                emitted.insert(ready.name.as_str());
                ordered.push(ready);
            }
            None => {
                for d in &delayed {
                    warn!("{} embeds a type that is never declared", d.name);
                }
                ordered.append(&mut delayed);
            }
        }
    }
    ordered
}

fn member_line(member: &Member, full_type: String) -> String {
    let mut line = format!("\t{}\t{}", full_type, member.name);
    for size in &member.arrays {
        line.push('[');
        line.push_str(size);
        line.push(']');
    }
    if let Some(width) = member.bitfield_width {
        line.push_str(&format!(" : {}", width));
    }
    line.push(';');
    line
}

pub fn generate_struct_types(api: &Api) -> String {
    let mut inl = Inl::new();
    for composite in declaration_order(api) {
        inl.line(format!(
            "{} {}",
            if composite.is_union { "union" } else { "struct" },
            composite.name
        ));
        inl.line("{");
        inl.aligned(
            composite
                .members
                .iter()
                .map(|m| member_line(m, substitute_type(&m.full_type, &m.type_name))),
        );
        inl.line("};");
        inl.line("");
    }

    // vkscserver still consumes shader modules
    if api.variant == ApiVariant::VulkanSc && api.composite("VkShaderModuleCreateInfo").is_none() {
        inl.lines([
            "struct VkShaderModuleCreateInfo",
            "{",
            "\tVkStructureType\tsType;",
            "\tconst void*\tpNext;",
            "\tuint32_t\tflags;",
            "\tsize_t\tcodeSize;",
            "\tconst uint32_t*\tpCode;",
            "};",
            "",
        ]);
    }

    for composite in sorted_composites(api) {
        let mut aliases: Vec<&String> = composite.aliases.iter().collect();
        aliases.sort();
        for alias in aliases {
            inl.line(format!("typedef {} {};", composite.name, alias));
            inl.line("");
        }
    }
    inl.finish()
}

pub fn generate_get_structure_type_impl(api: &Api) -> String {
    let mut inl = Inl::new();
    for s in sorted_composites(api).into_iter().filter(|c| !c.is_union) {
        if s.members.first().map(|m| m.name.as_str()) != Some("sType")
            || s.name == "VkBaseOutStructure"
            || s.name == "VkBaseInStructure"
        {
            continue;
        }
        let s_type = match &s.s_type {
            Some(s_type) => s_type,
            None => {
                debug!("{} has an sType member without a fixed value", s.name);
                continue;
            }
        };
        inl.line(format!("template<> VkStructureType getStructureType<{}> (void)", s.name));
        inl.line("{");
        inl.line(format!("\treturn {};", s_type));
        inl.line("}");
        inl.line("");
    }
    inl.finish()
}

/// Plain C declarations of enums, flags, handles and structs.
pub fn generate_struct_types_c(api: &Api) -> String {
    let mut inl = Inl::new();

    let mut handles: Vec<_> = api.handles.iter().collect();
    handles.sort_by(|a, b| a.name.cmp(&b.name));
    for h in handles {
        if h.dispatchable {
            inl.line(format!("typedef struct {}_T* {};", h.name, h.name));
        } else {
            inl.line(format!("typedef uint64_t {};", h.name));
        }
        for alias in &h.aliases {
            inl.line(format!("typedef {} {};", h.name, alias));
        }
    }
    inl.line("");

    let mut enums: Vec<_> = api.enums.iter().filter(|e| !e.values.is_empty()).collect();
    enums.sort_by(|a, b| a.name.cmp(&b.name));
    for e in enums {
        let (prefix, postfix) = enum_prefix_and_postfix(&e.name);
        let mut lines: Vec<String> = e
            .sorted_values()
            .iter()
            .map(|v| format!("\t{}\t= {},", v.name, v.text))
            .collect();
        lines.push(format!("\t{}_MAX_ENUM{}\t= 0x7FFFFFFF", prefix, postfix));
        inl.line(format!("typedef enum {}", e.name));
        inl.line("{");
        inl.aligned(lines);
        inl.line(format!("}} {};", e.name));
        for alias in &e.aliases {
            inl.line(format!("typedef {} {};", e.name, alias));
        }
        inl.line("");
    }

    let mut flags: Vec<_> = api.flags.iter().collect();
    flags.sort_by(|a, b| a.name.cmp(&b.name));
    for f in flags {
        inl.line(format!("typedef uint{}_t {};", f.bit_width, f.name));
    }
    inl.line("");

    for composite in declaration_order(api) {
        let keyword = if composite.is_union { "union" } else { "struct" };
        inl.line(format!("typedef {} {}", keyword, composite.name));
        inl.line("{");
        inl.aligned(
            composite
                .members
                .iter()
                .map(|m| member_line(m, m.full_type.clone())),
        );
        inl.line(format!("}} {};", composite.name));
        for alias in &composite.aliases {
            inl.line(format!("typedef {} {};", composite.name, alias));
        }
        inl.line("");
    }
    inl.finish()
}
