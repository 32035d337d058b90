//! `vkRefUtil.inl` and `vkRefUtilImpl.inl`: `Move<T>` returning wrappers
//! around object constructors and the matching deleters.

use log::warn;
use vk_registry::{Api, Function, FunctionKind, Member};

use crate::functions::sorted_functions;
use crate::names::{arg_list, interface_name};
use crate::writer::Inl;

/// Constructors without a matching destructor.
const NO_DELETER: &[&str] = &["vkCreatePipelineBinariesKHR", "vkCreateDisplayModeKHR"];

struct Constructor<'a> {
    kind: FunctionKind,
    name: String,
    object_type: &'a str,
    iface_args: String,
    params: &'a [Member],
}

fn is_allocator(param: &Member) -> bool {
    param.type_name == "VkAllocationCallbacks" && param.is_const && param.pointer == 1
}

fn constructors(api: &Api) -> Vec<Constructor<'_>> {
    let mut result = Vec::new();
    for f in sorted_functions(api, None) {
        if !(f.name.starts_with("vkCreate") || f.name == "vkAllocateMemory") {
            continue;
        }
        if f.params.iter().any(|p| p.name == "createInfoCount") || NO_DELETER.contains(&f.name.as_str()) {
            continue;
        }
        let n = f.params.len();
        if n < 2 || !is_allocator(&f.params[n - 2]) {
            warn!("{} does not take an allocator before its output, no Move<> wrapper", f.name);
            continue;
        }
        let mut iface_args = String::new();
        if f.name == "vkCreateDevice" {
            iface_args.push_str("const PlatformInterface& vkp, VkInstance instance, ");
        }
        iface_args.push_str(&format!("const {}Interface& vk", f.kind.as_str()));
        result.push(Constructor {
            kind: f.kind,
            name: interface_name(&f.name),
            object_type: &f.params[n - 1].type_name,
            iface_args,
            params: &f.params[..n - 1],
        });
    }
    result
}

pub fn generate_proto(api: &Api) -> String {
    let mut inl = Inl::new();
    inl.aligned(constructors(api).into_iter().map(|c| {
        format!(
            "Move<{}>\t{}\t({}, {} = nullptr);",
            c.object_type,
            c.name,
            c.iface_args,
            arg_list(c.params)
        )
    }));
    inl.finish()
}

fn is_deleter(f: &Function) -> bool {
    f.kind == FunctionKind::Device
        && (f.name.starts_with("vkDestroy") || f.name == "vkFreeMemory")
        && f.name != "vkDestroyDevice"
        && f.params.len() >= 2
}

pub fn generate_impl(api: &Api) -> String {
    let mut inl = Inl::new();
    inl.line("namespace refdetails");
    inl.line("{");
    inl.line("");
    for f in sorted_functions(api, Some(FunctionKind::Device)).into_iter().filter(|f| is_deleter(f)) {
        let object_type = &f.params[f.params.len() - 2].type_name;
        inl.line("template<>");
        inl.line(format!("void Deleter<{}>::operator() ({} obj) const", object_type, object_type));
        inl.line("{");
        inl.line(format!("\tm_deviceIface->{}(m_device, obj, m_allocator);", interface_name(&f.name)));
        inl.line("}");
        inl.line("");
    }
    inl.line("} // refdetails");
    inl.line("");

    for c in constructors(api) {
        let allocator = &c.params[c.params.len() - 1].name;
        let deleter_args = if c.name == "createDevice" {
            format!("vkp, instance, object, {}", allocator)
        } else {
            let owner = match c.kind {
                FunctionKind::Platform => "object",
                FunctionKind::Instance => "instance",
                FunctionKind::Device => "device",
            };
            format!("vk, {}, {}", owner, allocator)
        };
        let mut call_args: Vec<&str> = c.params.iter().map(|p| p.name.as_str()).collect();
        call_args.push("&object");

        inl.line(format!(
            "Move<{}> {} ({}, {})",
            c.object_type,
            c.name,
            c.iface_args,
            arg_list(c.params)
        ));
        inl.line("{");
        inl.line(format!("\t{} object = VK_NULL_HANDLE;", c.object_type));
        inl.line(format!("\tVK_CHECK(vk.{}({}));", c.name, call_args.join(", ")));
        inl.line(format!(
            "\treturn Move<{t}>(check<{t}>(object), Deleter<{t}>({a}));",
            t = c.object_type,
            a = deleter_args
        ));
        inl.line("}");
        inl.line("");
    }
    inl.finish()
}
