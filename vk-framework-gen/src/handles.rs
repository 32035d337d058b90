//! `vkHandleType.inl` and `vkObjTypeImpl.inl`.

use vk_registry::{Api, Handle};

use crate::names::prefix_name;
use crate::writer::Inl;

pub fn handle_type_name(handle: &str) -> String {
    prefix_name("HANDLE_TYPE_", handle)
}

fn sorted_handles(api: &Api) -> Vec<&Handle> {
    let mut handles: Vec<&Handle> = api.handles.iter().collect();
    handles.sort_by(|a, b| a.name.cmp(&b.name));
    handles
}

pub fn generate_handle_type(api: &Api) -> String {
    let handles = sorted_handles(api);
    let mut lines = Vec::new();
    for (i, h) in handles.iter().enumerate() {
        if i == 0 {
            lines.push(format!("\t{}\t= 0,", handle_type_name(&h.name)));
        } else {
            lines.push(format!("\t{},", handle_type_name(&h.name)));
        }
    }
    for h in &handles {
        for alias in &h.aliases {
            lines.push(format!(
                "\t{}\t= {},",
                handle_type_name(alias),
                handle_type_name(&h.name)
            ));
        }
    }
    match handles.last() {
        Some(last) => lines.push(format!(
            "\tHANDLE_TYPE_LAST\t= {} + 1",
            handle_type_name(&last.name)
        )),
        None => lines.push("\tHANDLE_TYPE_LAST\t= 0".to_string()),
    }

    let mut inl = Inl::new();
    inl.line("");
    inl.line("enum HandleType");
    inl.line("{");
    inl.aligned(lines);
    inl.line("};");
    inl.finish()
}

pub fn generate_obj_type_impl(api: &Api) -> String {
    let mut inl = Inl::new();
    inl.line("namespace vk");
    inl.line("{");
    inl.line("template<typename T> VkObjectType getObjectType\t(void);");
    inl.aligned(api.handles.iter().map(|h| {
        let object_type = h
            .object_type
            .clone()
            .unwrap_or_else(|| prefix_name("VK_OBJECT_TYPE_", &h.name));
        format!(
            "template<> inline VkObjectType\tgetObjectType<{}>\t(void) {{ return {};\t}}",
            h.name, object_type
        )
    }));
    inl.line("}");
    inl.finish()
}
