//! `vkApiExtensionDependencyInfo.inl`: dependency checks per extension,
//! released API versions and the core version each extension needs.

use log::warn;
use vk_registry::{Api, ApiVariant, DependsExpr, Extension, Version};

use crate::writer::Inl;

const HELPERS: &[&str] = &[
    "using namespace tcu;",
    "using ExtPropVect = std::vector<vk::VkExtensionProperties>;",
    "using IsSupportedFun = bool (*)(const tcu::UVec2&, const ExtPropVect&, const ExtPropVect&);",
    "using DependencyCheckVect = std::vector<std::pair<const char*, IsSupportedFun> >;\n",
    "bool isCompatible(uint32_t major, uint32_t minor, const tcu::UVec2& testedApiVersion)",
    "{",
    "\t// return true when tested api version is greater",
    "\t// or equal to version represented by two uints",
    "\tif (major == testedApiVersion.x())",
    "\t\treturn minor <= testedApiVersion.y();",
    "\treturn major < testedApiVersion.x();",
    "}\n",
    "bool isSupported(const ExtPropVect& extensions, const char* ext)",
    "{",
    "\treturn isExtensionStructSupported(extensions, vk::RequiredExtension(ext));",
    "}\n",
];

fn sorted_extensions(api: &Api) -> Vec<&Extension> {
    let mut extensions: Vec<&Extension> = api.extensions.iter().collect();
    extensions.sort_by(|a, b| a.name.cmp(&b.name));
    extensions
}

fn depends_condition(api: &Api, ext: &Extension, depends: &str) -> String {
    match DependsExpr::parse(depends) {
        Ok(expr) => expr.to_cpp(
            api,
            depends,
            &|major, minor| format!("isCompatible({}, {}, v)", major, minor),
            &|list, name| format!("isSupported({}, \"{}\")", list, name),
        ),
        Err(e) => {
            warn!("{}: {}", ext.name, e);
            format!("false /* UNSUPPORTED CONDITION: {}*/", depends)
        }
    }
}

fn dependency_checks(inl: &mut Inl, api: &Api, device: bool) {
    let (ext_vector, other_vector, type_name) = if device {
        ("vDEP", "vIEP", "device")
    } else {
        ("vIEP", "vDEP", "instance")
    };

    let mut checked: Vec<&str> = Vec::new();
    for ext in sorted_extensions(api) {
        if ext.is_device() != device {
            continue;
        }
        let depends = match &ext.depends {
            Some(d) => d,
            None => continue,
        };
        checked.push(&ext.name);

        inl.line(format!(
            "bool check_{}(const tcu::UVec2& v, const ExtPropVect& vIEP, const ExtPropVect& vDEP)",
            ext.name
        ));
        inl.line("{");
        match ext
            .promoted_to
            .as_deref()
            .filter(|p| p.contains("VK_VERSION"))
            .and_then(Version::numbers_from_name)
        {
            Some((major, minor)) => {
                inl.line(format!("\tif (isCompatible({}, {}, v))", major, minor));
                inl.line("\t\treturn true;\n");
            }
            None => inl.line("\tDE_UNREF(v);"),
        }
        inl.line(format!("\tDE_UNREF({});", other_vector));
        inl.line(format!("\n\tif (!isSupported({}, \"{}\"))", ext_vector, ext.name));
        inl.line("\t\treturn true;\n");
        inl.line(format!("\t// depends attribute in xml: {}", depends));
        inl.line(format!("\treturn {};", depends_condition(api, ext, depends)));
        inl.line("}\n");
    }

    inl.line(format!("static const DependencyCheckVect {}ExtensionDependencies", type_name));
    inl.line("{");
    inl.aligned(
        checked
            .iter()
            .map(|name| format!("\tstd::make_pair(\"{}\",\t&check_{}),", name, name)),
    );
    inl.line("};\n");
}

/// `VK_MAKE_API_VERSION(variant, major, minor, 0)`.
fn packed_version(variant: u32, major: u32, minor: u32) -> u32 {
    (variant << 29) | (major << 22) | (minor << 12)
}

fn released_api_versions(inl: &mut Inl, api: &Api) {
    let (variant, prefix) = match api.variant {
        ApiVariant::Vulkan => (0, "VK_VERSION_"),
        ApiVariant::VulkanSc => (1, "VKSC_VERSION_"),
    };
    inl.line("static const std::tuple<uint32_t, uint32_t, uint32_t, uint32_t>\treleasedApiVersions[]\t=");
    inl.line("{");
    // Vulkan 1.0 always closes the table.
    let released = api
        .versions
        .iter()
        .rev()
        .filter(|v| v.name.starts_with(prefix))
        .filter(|v| !(variant == 0 && v.major == 1 && v.minor == 0));
    for v in released {
        inl.line(format!(
            "\tstd::make_tuple({}, {}, {}, {}),",
            packed_version(variant, v.major, v.minor),
            variant,
            v.major,
            v.minor
        ));
    }
    inl.line(format!("\tstd::make_tuple({}, 0, 1, 0)", packed_version(0, 1, 0)));
    inl.line("};");
}

/// Core version an extension explicitly requires through its own `depends`.
fn explicit_core_version(ext: &Extension) -> Option<(u32, u32)> {
    ext.depends
        .as_deref()
        .and_then(|d| DependsExpr::parse(d).ok())
        .and_then(|e| e.required_core_version())
}

/// Explicit requirement, or else the highest explicit requirement among the
/// extensions it depends on. Defaults to 1.0.
pub fn required_core_version(api: &Api, ext: &Extension) -> (u32, u32) {
    if let Some(version) = explicit_core_version(ext) {
        return version;
    }
    let expr = match ext.depends.as_deref().map(DependsExpr::parse) {
        Some(Ok(expr)) => expr,
        _ => return (1, 0),
    };
    expr.atoms()
        .into_iter()
        .filter_map(|atom| api.extension(atom))
        .filter_map(explicit_core_version)
        .fold((1, 0), |best, v| best.max(v))
}

fn required_core_versions(inl: &mut Inl, api: &Api) {
    inl.line("static const std::tuple<uint32_t, uint32_t, const char*>\textensionRequiredCoreVersion[]\t =");
    inl.line("{");
    for ext in sorted_extensions(api) {
        if ext.name.contains("vulkan_video_") {
            continue;
        }
        let (major, minor) = required_core_version(api, ext);
        inl.line(format!("\tstd::make_tuple({}, {}, \"{}\"),", major, minor, ext.name));
    }
    inl.line("};");
}

pub fn generate(api: &Api) -> String {
    let mut inl = Inl::new();
    inl.lines(HELPERS.iter().copied());
    dependency_checks(&mut inl, api, false);
    dependency_checks(&mut inl, api, true);
    released_api_versions(&mut inl, api);
    required_core_versions(&mut inl, api);
    inl.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_versions() {
        assert_eq!(packed_version(0, 1, 0), 4194304);
        assert_eq!(packed_version(0, 1, 3), 4206592);
        assert_eq!(packed_version(1, 1, 0), 541065216);
    }
}
