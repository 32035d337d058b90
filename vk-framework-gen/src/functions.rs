//! Function tables: interfaces, pointer typedefs, pointer members, their
//! initialisation and the driver forwarding implementations.

use vk_registry::{Api, ApiVariant, Function, FunctionKind};

use crate::names::{api_version_name, arg_list, function_type_name, interface_name, param_names, version_args};
use crate::writer::Inl;

/// Entry points a compute-only device refuses.
const COMPUTE_ONLY_FORBIDDEN: &[&str] = &[
    "destroyRenderPass",
    "createRenderPass2",
    "createRenderPass",
    "createGraphicsPipelines",
];

/// Entry points a compute-only device accepts with restricted arguments.
const COMPUTE_ONLY_RESTRICTED: &[(&str, &str)] = &[
    (
        "createComputePipelines",
        "\t\tfor (uint32_t i=0; i<createInfoCount; ++i)\n\t\t\tif ((pCreateInfos[i].stage.stage & VK_SHADER_STAGE_ALL_GRAPHICS) != 0) THROW_NOT_SUPPORTED_COMPUTE_ONLY();",
    ),
    (
        "createBuffer",
        "\t\tif ((pCreateInfo->usage & ( VK_BUFFER_USAGE_VERTEX_BUFFER_BIT | VK_BUFFER_USAGE_INDEX_BUFFER_BIT )) !=0) THROW_NOT_SUPPORTED_COMPUTE_ONLY();",
    ),
];

pub(crate) fn sorted_functions(api: &Api, kind: Option<FunctionKind>) -> Vec<&Function> {
    let mut functions: Vec<&Function> = api
        .functions
        .iter()
        .filter(|f| kind.map_or(true, |k| f.kind == k))
        .collect();
    functions.sort_by(|a, b| a.name.cmp(&b.name));
    functions
}

/// `vkVirtual*Interface.inl` (pure virtual) and `vkConcrete*Interface.inl`.
pub fn generate_interface(api: &Api, kind: FunctionKind, concrete: bool) -> String {
    let postfix = if concrete { "" } else { " = 0" };
    let mut inl = Inl::new();
    inl.aligned(sorted_functions(api, Some(kind)).into_iter().map(|f| {
        format!(
            "virtual {}\t{}\t({}) const{};",
            f.return_type,
            interface_name(&f.name),
            arg_list(&f.params),
            postfix
        )
    }));
    inl.finish()
}

pub fn generate_function_pointer_types(api: &Api) -> String {
    let mut lines = Vec::new();
    for f in sorted_functions(api, None) {
        let args = arg_list(&f.params);
        for name in std::iter::once(&f.name).chain(f.aliases.iter()) {
            lines.push(format!(
                "typedef VKAPI_ATTR {}\t(VKAPI_CALL* {})\t({});",
                f.return_type,
                function_type_name(name),
                args
            ));
        }
    }
    let mut inl = Inl::new();
    inl.aligned(lines);
    inl.finish()
}

/// `vk*FunctionPointers.inl`. Instance tables also carry a member per
/// alias so the driver can dispatch on the device version.
pub fn generate_function_pointers(api: &Api, kind: FunctionKind) -> String {
    let mut lines = Vec::new();
    for f in sorted_functions(api, Some(kind)) {
        lines.push(format!("{}\t{};", function_type_name(&f.name), interface_name(&f.name)));
        if kind == FunctionKind::Instance {
            for alias in &f.aliases {
                lines.push(format!("{}\t{};", function_type_name(alias), interface_name(alias)));
            }
        }
    }
    let mut inl = Inl::new();
    inl.aligned(lines);
    inl.finish()
}

fn load_line(prefix: &str, member: &str, function_type: &str, entry_point: &str) -> String {
    format!(
        "{}m_vk.{} = ({}) GET_PROC_ADDR(\"{}\");",
        prefix, member, function_type, entry_point
    )
}

pub fn generate_init_function_pointers(api: &Api, kind: FunctionKind) -> String {
    let is_sc = api.variant == ApiVariant::VulkanSc;
    let mut functions: Vec<&Function> = sorted_functions(api, Some(kind))
        .into_iter()
        .filter(|f| f.name != "vkGetInstanceProcAddr")
        .collect();
    functions.sort_by_key(|f| interface_name(&f.name));

    let mut inl = Inl::new();
    for f in functions {
        let member = interface_name(&f.name);
        let function_type = function_type_name(&f.name);

        let mut condition = String::new();
        if !is_sc && kind == FunctionKind::Device {
            if let Some(args) = f
                .version
                .as_deref()
                .filter(|v| *v != "VK_VERSION_1_0")
                .and_then(version_args)
            {
                condition = format!("if (usedApiVersion >= VK_MAKE_API_VERSION(0, {}, 0))\n    ", args);
            }
        }
        inl.line(load_line(&condition, &member, &function_type, &f.name));

        if is_sc {
            continue;
        }
        for alias in &f.aliases {
            inl.line(format!("if (!m_vk.{})", member));
            inl.line(load_line("    ", &member, &function_type, alias));
        }
        if kind == FunctionKind::Instance {
            for alias in &f.aliases {
                inl.line(format!(
                    "m_vk.{} = ({}) m_vk.{};",
                    interface_name(alias),
                    function_type_name(alias),
                    member
                ));
            }
        }
    }
    inl.finish()
}

/// Alias to dispatch to when the physical device reports an older API
/// version than the one the command was promoted in.
fn pre_promotion_alias(f: &Function) -> Option<&str> {
    ["KHR", "EXT"].iter().find_map(|postfix| {
        let name = format!("{}{}", f.name, postfix);
        f.aliases.iter().find(|a| **a == name).map(String::as_str)
    })
}

pub fn generate_driver_impl(api: &Api, kind: FunctionKind) -> String {
    let class = kind.as_str();
    let mut inl = Inl::new();
    for f in sorted_functions(api, Some(kind)) {
        let member = interface_name(&f.name);
        inl.line("");
        inl.line(format!(
            "{} {}Driver::{} ({}) const",
            f.return_type,
            class,
            member,
            arg_list(&f.params)
        ));
        inl.line("{");

        if COMPUTE_ONLY_FORBIDDEN.contains(&member.as_str()) {
            inl.line("    if( m_computeOnlyMode ) THROW_NOT_SUPPORTED_COMPUTE_ONLY();");
        }
        if let Some((_, check)) = COMPUTE_ONLY_RESTRICTED.iter().find(|(name, _)| *name == member) {
            inl.line("\tif( m_computeOnlyMode )");
            inl.line("\t{");
            inl.line(check);
            inl.line("\t}");
        }

        if f.name == "vkEnumerateInstanceVersion" {
            inl.lines([
                "    if (m_vk.enumerateInstanceVersion)",
                "        return m_vk.enumerateInstanceVersion(pApiVersion);",
                "",
                "    *pApiVersion = VK_API_VERSION_1_0;",
                "    return VK_SUCCESS;",
                "}",
            ]);
            continue;
        }

        let ret = if f.return_type == "void" { "" } else { "return " };
        let call = |target: &str| format!("{}m_vk.{}({});", ret, target, param_names(&f.params));

        let takes_physical_device = f.params.first().map(|p| p.type_name.as_str()) == Some("VkPhysicalDevice");
        let promoted = f.version.as_deref().filter(|v| *v != "VK_VERSION_1_0");
        match (kind, takes_physical_device, promoted, pre_promotion_alias(f)) {
            (FunctionKind::Instance, true, Some(version), Some(alias)) => {
                inl.line("    vk::VkPhysicalDeviceProperties props;");
                inl.line("    m_vk.getPhysicalDeviceProperties(physicalDevice, &props);");
                inl.line(format!("    if (props.apiVersion >= {})", api_version_name(version)));
                inl.line(format!("        {}", call(&member)));
                inl.line("    else");
                inl.line(format!("        {}", call(&interface_name(alias))));
            }
            _ => inl.line(format!("    {}", call(&member))),
        }
        inl.line("}");
    }
    inl.finish()
}
