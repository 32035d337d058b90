//! Extension and core-version bookkeeping tables.

use std::collections::BTreeMap;

use vk_registry::{Api, ApiVariant, DependsExpr, Extension, FunctionKind, Version};

use crate::platform::PARTIALLY_PROMOTED_EXTENSIONS;
use crate::writer::Inl;

/// Core version an extension was fully promoted to, if any.
fn promoted_core_version(ext: &Extension) -> Option<(u32, u32)> {
    ext.promoted_to
        .as_deref()
        .filter(|p| p.contains("VK_VERSION"))
        .and_then(Version::numbers_from_name)
}

/// `vkSupportedExtensions.inl`: extensions implied by each core version.
pub fn generate_supported_extensions(api: &Api) -> String {
    let is_sc = api.variant == ApiVariant::VulkanSc;
    let mut instance: BTreeMap<(u32, u32), Vec<&str>> = BTreeMap::new();
    let mut device: BTreeMap<(u32, u32), Vec<&str>> = BTreeMap::new();

    for ext in &api.extensions {
        if PARTIALLY_PROMOTED_EXTENSIONS.contains(&ext.name.as_str()) {
            continue;
        }
        let version = match promoted_core_version(ext) {
            Some(v) => v,
            None => continue,
        };
        // Vulkan SC is based on Vulkan 1.2
        if is_sc && version > (1, 2) {
            continue;
        }
        let map = if ext.is_device() { &mut device } else { &mut instance };
        map.entry(version).or_default().push(&ext.name);
    }

    let mut inl = Inl::new();
    inl.line("");
    write_core_extensions(&mut inl, "getCoreDeviceExtensionsImpl", device, is_sc);
    inl.line("");
    write_core_extensions(&mut inl, "getCoreInstanceExtensionsImpl", instance, is_sc);
    inl.finish()
}

fn write_core_extensions(
    inl: &mut Inl,
    function: &str,
    map: BTreeMap<(u32, u32), Vec<&str>>,
    is_sc: bool,
) {
    let dst = if !map.is_empty() || is_sc { " dst" } else { "" };
    inl.line(format!(
        "void {} (uint32_t coreVersion, ::std::vector<const char*>&{})",
        function, dst
    ));
    inl.line("{");
    if map.is_empty() {
        inl.line("    DE_UNREF(coreVersion);");
        if !dst.is_empty() {
            inl.line("    DE_UNREF(dst);");
        }
    }
    for ((major, minor), mut names) in map {
        names.sort_unstable();
        inl.line(format!("    if (coreVersion >= VK_API_VERSION_{}_{})", major, minor));
        inl.line("    {");
        for name in names {
            inl.line(format!("        dst.push_back(\"{}\");", name));
        }
        inl.line("    }");
    }
    inl.line("}");
}

/// `vkInstanceExtensions.inl` and `vkDeviceExtensions.inl`: allowed KHR
/// extensions of one type.
pub fn generate_extension_list(api: &Api, device: bool) -> String {
    let list_name = if device { "Device" } else { "Instance" };
    let mut names: Vec<&str> = api
        .extensions
        .iter()
        .filter(|e| e.name.starts_with("VK_KHR") && e.is_device() == device)
        .map(|e| e.name.as_str())
        .collect();
    names.sort_unstable();

    let mut inl = Inl::new();
    inl.line(format!("static const char* s_allowed{}KhrExtensions[] =", list_name));
    inl.line("{");
    for name in names {
        inl.line(format!("\t\"{}\",", name));
    }
    inl.line("};");
    inl.line("");
    inl.finish()
}

/// Entry points that moved between extensions when device groups were
/// promoted, loaded only from the matching API version.
fn device_group_functions(kind: FunctionKind) -> &'static [&'static str] {
    match kind {
        FunctionKind::Instance => &["vkGetPhysicalDevicePresentRectanglesKHR"],
        FunctionKind::Device => &[
            "vkGetDeviceGroupPresentCapabilitiesKHR",
            "vkGetDeviceGroupSurfacePresentModesKHR",
            "vkAcquireNextImage2KHR",
        ],
        FunctionKind::Platform => &[],
    }
}

/// `vkExtensionFunctions.inl`: entry points each extension adds, guarded by
/// the `depends` condition of the require block that adds them.
pub fn generate_extension_functions(api: &Api) -> String {
    let mut inl = Inl::new();
    inl.lines([
        "bool checkVersion(uint32_t major, uint32_t minor, const uint32_t testedApiVersion)",
        "{",
        "\tuint32_t testedMajor = VK_API_VERSION_MAJOR(testedApiVersion);",
        "\tuint32_t testedMinor = VK_API_VERSION_MINOR(testedApiVersion);",
        "\t// return true when tested api version is greater",
        "\t// or equal to version represented by two uints",
        "\tif (major == testedMajor)",
        "\t\treturn minor <= testedMinor;",
        "\treturn major < testedMajor;",
        "}",
        "",
    ]);
    if api.variant == ApiVariant::Vulkan {
        inl.lines([
            "bool extensionIsSupported(const std::vector<std::string> extNames, const std::string& ext)",
            "{",
            "\tfor (const std::string& supportedExtension : extNames)",
            "\t{",
            "\t\tif (supportedExtension == ext) return true;",
            "\t}",
            "\treturn false;",
            "}",
            "",
        ]);
    }

    extension_functions(&mut inl, api, FunctionKind::Instance);
    inl.line("");
    extension_functions(&mut inl, api, FunctionKind::Device);
    inl.line("");

    inl.line("::std::string instanceExtensionNames[] =");
    inl.line("{");
    for ext in api.extensions.iter().filter(|e| !e.is_device()) {
        inl.line(format!("\t\"{}\",", ext.name));
    }
    inl.line("};");
    inl.line("");
    inl.line("::std::string deviceExtensionNames[] =");
    inl.line("{");
    for ext in api.extensions.iter().filter(|e| e.is_device()) {
        inl.line(format!("\t\"{}\",", ext.name));
    }
    inl.line("};");
    inl.finish()
}

fn extension_functions(inl: &mut Inl, api: &Api, kind: FunctionKind) {
    inl.line(format!(
        "void get{}ExtensionFunctions (uint32_t apiVersion, const std::vector<std::string> vIEP, const std::vector<std::string> vDEP, const std::string extName, ::std::vector<const char*>& functions)",
        kind.as_str()
    ));
    inl.line("{");
    inl.line("\t(void)vIEP;");
    inl.line("\t(void)vDEP;");
    let device_group = device_group_functions(kind);

    let mut extensions: Vec<&Extension> = api.extensions.iter().collect();
    extensions.sort_by(|a, b| a.name.cmp(&b.name));
    for ext in extensions {
        inl.line(format!("\tif (extName == \"{}\")", ext.name));
        inl.line("\t{");
        for require in &ext.requires {
            let functions: Vec<&str> = require
                .commands
                .iter()
                .filter(|c| api.function(c).map_or(false, |f| f.kind == kind))
                .map(String::as_str)
                .collect();
            if functions.is_empty() {
                continue;
            }
            let mut indent = "\t\t";
            if let Some(depends) = &require.depends {
                let condition = match DependsExpr::parse(depends) {
                    Ok(expr) => expr.to_cpp(
                        api,
                        depends,
                        &|major, minor| format!("checkVersion({}, {}, apiVersion)", major, minor),
                        &|list, ext| format!("extensionIsSupported({}, \"{}\")", list, ext),
                    ),
                    Err(e) => {
                        log::warn!("{}: {}", ext.name, e);
                        "false".to_string()
                    }
                };
                inl.line(format!("\t\t// Dependencies: {}", depends));
                inl.line(format!("\t\tif ({}) {{", condition));
                indent = "\t\t\t";
            }
            for function in functions {
                if device_group.contains(&function) {
                    inl.line(format!(
                        "{}if(apiVersion >= VK_API_VERSION_1_1) functions.push_back(\"{}\");",
                        indent, function
                    ));
                } else {
                    inl.line(format!("{}functions.push_back(\"{}\");", indent, function));
                }
            }
            if require.depends.is_some() {
                inl.line("\t\t}");
            }
        }
        if ext.name == "VK_KHR_device_group" {
            for function in device_group {
                inl.line(format!(
                    "\t\tif(apiVersion < VK_API_VERSION_1_1) functions.push_back(\"{}\");",
                    function
                ));
            }
        }
        inl.line("\t\treturn;");
        inl.line("\t}");
    }
    inl.line("\tDE_FATAL(\"Extension name not found\");");
    inl.line("}");
}

/// Host image copy entry points promoted to 1.4 only optionally.
fn is_optional_promotion(name: &str, version: &str) -> bool {
    version == "VK_VERSION_1_4" && (name.starts_with("vkCopy") || name == "vkTransitionImageLayout")
}

/// `vkCoreFunctionalities.inl`: core entry points available at each API
/// version. Every version lists the entry points of all earlier versions too.
pub fn generate_core_functionalities(api: &Api) -> String {
    let mut per_version: Vec<(String, Vec<(&str, FunctionKind)>)> = api
        .versions
        .iter()
        .map(|v| (v.name.clone(), Vec::new()))
        .collect();

    for f in &api.functions {
        // extension entry points end with their vendor tag
        if f.name.ends_with(|c: char| c.is_ascii_uppercase()) {
            continue;
        }
        let version = f.version.as_deref().unwrap_or("VK_VERSION_1_0");
        if is_optional_promotion(&f.name, version) {
            continue;
        }
        match per_version.iter_mut().find(|(v, _)| v == version) {
            Some((_, list)) => list.push((&f.name, f.kind)),
            None => per_version.push((version.to_string(), vec![(&f.name, f.kind)])),
        }
    }
    per_version.retain(|(_, list)| !list.is_empty());

    let api_version = |v: &str| v.replacen("_VERSION_", "_API_VERSION_", 1);

    let mut inl = Inl::new();
    inl.line("");
    inl.line("enum FunctionOrigin");
    inl.line("{");
    inl.aligned([
        "\tFUNCTIONORIGIN_PLATFORM\t= 0,",
        "\tFUNCTIONORIGIN_INSTANCE,",
        "\tFUNCTIONORIGIN_DEVICE",
    ]);
    inl.line("};");
    inl.line("");
    inl.line("typedef ::std::pair<const char*, FunctionOrigin> FunctionInfo;");
    inl.line("typedef ::std::vector<FunctionInfo> FunctionInfosList;");
    inl.line("typedef ::std::map<uint32_t, FunctionInfosList> ApisMap;");
    inl.line("");
    inl.line("void initApisMap (ApisMap& apis)");
    inl.line("{");
    inl.line("    apis.clear();");
    for (version, _) in &per_version {
        inl.line(format!(
            "    apis.insert(::std::pair<uint32_t, FunctionInfosList>({}, FunctionInfosList()));",
            api_version(version)
        ));
    }
    inl.line("");

    let mut available: Vec<String> = Vec::new();
    for (version, functions) in &per_version {
        inl.line(format!("\tapis[{}] = {{", api_version(version)));
        for (name, kind) in functions {
            available.push(format!(
                "\t\t{{\"{}\",\tFUNCTIONORIGIN_{}}},",
                name,
                kind.as_str().to_uppercase()
            ));
        }
        inl.aligned(&available);
        inl.line("\t};");
    }
    inl.line("}");
    inl.finish()
}

/// `vkEntryPointValidation.inl`: device-level entry points added by
/// instance extensions.
pub fn generate_entry_point_validation(api: &Api) -> String {
    let mut inl = Inl::new();
    inl.line("std::map<std::string, std::vector<std::string> > instExtDeviceFun");
    inl.line("{");
    for ext in api.extensions.iter().filter(|e| !e.is_device()) {
        let device_functions: Vec<&str> = ext
            .commands()
            .into_iter()
            .filter(|c| api.function(c).map_or(false, |f| f.kind == FunctionKind::Device))
            .collect();
        if device_functions.is_empty() {
            continue;
        }
        inl.line(format!("\t{{ \"{}\",", ext.name));
        inl.line("\t\t{");
        for function in device_functions {
            inl.line(format!("\t\t\t\"{}\",", function));
        }
        inl.line("\t\t}");
        inl.line("\t},");
    }
    inl.line("};");
    inl.finish()
}

/// `vkKnownDriverIds.inl`: the `VkDriverId` enumerators with their values.
pub fn generate_known_driver_ids(api: &Api) -> String {
    let mut inl = Inl::new();
    inl.lines([
        "static const struct",
        "{",
        "\tstd::string driver;",
        "\tuint32_t id;",
        "} driverIds [] =",
        "{",
    ]);
    if let Some(driver_ids) = api.enum_type("VkDriverId") {
        for v in &driver_ids.values {
            inl.line(format!("\t{{\"{}\", {}}},", v.name, v.value));
        }
        for v in &driver_ids.values {
            if let Some(alias) = v.aliases.first() {
                inl.line(format!("\t{{\"{}\", {}}},\t// {}", alias, v.value, v.name));
            }
        }
    }
    inl.line("\t{\"VK_DRIVER_ID_MAX_ENUM\", 0x7FFFFFFF}");
    inl.line("};");
    inl.finish()
}
