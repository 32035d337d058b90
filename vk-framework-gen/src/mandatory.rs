//! `vkMandatoryFeatures.inl`: checks that every feature bit the registry
//! marks as required is reported by the device.

use log::{info, warn};
use vk_registry::{Api, ApiVariant, Composite, FeatureRequirement, Version};

use crate::names::variable_name;
use crate::platform::extensions_tested_by_cts;
use crate::writer::Inl;

const PROLOGUE: &str = "\
bool canUseFeaturesStruct (const vector<VkExtensionProperties>& deviceExtensions, uint32_t usedApiVersion,
\t\t\t\tconst char* extension, const char* extensionPromotedFrom = nullptr)
{
\tif (isCoreDeviceExtension(usedApiVersion, extension))
\t\treturn true;
\tif (isExtensionStructSupported(deviceExtensions, RequiredExtension(extension)))
\t\treturn true;
\treturn extensionPromotedFrom && isExtensionStructSupported(deviceExtensions, RequiredExtension(extensionPromotedFrom));
}

void checkBasicMandatoryFeatures(const vkt::Context& context, std::vector<std::string>& failMesages)
{
\tif (!context.isInstanceFunctionalitySupported(\"VK_KHR_get_physical_device_properties2\"))
\t\tTCU_THROW(NotSupportedError, \"Extension VK_KHR_get_physical_device_properties2 is not present\");

\tVkPhysicalDevice\t\t\t\t\tphysicalDevice\t\t= context.getPhysicalDevice();
\tconst InstanceInterface&\t\t\tvki\t\t\t\t\t= context.getInstanceInterface();
\tconst vector<VkExtensionProperties>\tdeviceExtensions\t= enumerateDeviceExtensionProperties(vki, physicalDevice, nullptr);
\tconst uint32_t\t\t\t\t\t\tusedApiVersion\t\t= context.getUsedApiVersion();

\tvk::VkPhysicalDeviceFeatures2 coreFeatures = initVulkanStructure();
\tconst auto addFeatures = makeStructChainAdder(&coreFeatures);
";

const CORE_FEATURES: &str = "VkPhysicalDeviceFeatures";

/// Feature structs whose registry name changed when promoted.
const RENAMED_STRUCTS: &[(&str, &str)] = &[
    ("VkPhysicalDeviceVariablePointerFeaturesKHR", "VkPhysicalDeviceVariablePointersFeatures"),
    ("VkPhysicalDeviceExternalSciBufFeaturesNV", "VkPhysicalDeviceExternalMemorySciBufFeaturesNV"),
];

/// Finds the struct a requirement names, looking through promotions.
fn resolve_struct<'a>(api: &'a Api, name: &str) -> Option<&'a Composite> {
    if let Some(s) = api.composite(name) {
        return Some(s);
    }
    let bare = name.trim_end_matches(|c: char| c.is_ascii_uppercase());
    for postfix in ["", "KHR", "EXT"] {
        if let Some(s) = api.composite(&format!("{}{}", bare, postfix)) {
            return Some(s);
        }
    }
    RENAMED_STRUCTS
        .iter()
        .find(|(old, _)| *old == name)
        .and_then(|(_, new)| api.composite(new))
}

/// Struct names referenced as `Struct::field` in a depends expression.
fn struct_references(depends: &str) -> impl Iterator<Item = &str> {
    depends
        .split(|c: char| matches!(c, '+' | ',' | '(' | ')'))
        .filter_map(|atom| atom.split_once("::").map(|(s, _)| s))
}

fn collect_struct_names<'a>(requirements: impl Iterator<Item = &'a FeatureRequirement>, used: &mut Vec<&'a str>) {
    for fr in requirements {
        let referenced = std::iter::once(fr.struct_name.as_str())
            .chain(fr.depends.as_deref().into_iter().flat_map(struct_references));
        for name in referenced {
            if name != CORE_FEATURES && !used.contains(&name) {
                used.push(name);
            }
        }
    }
}

struct FeatureChecks<'a> {
    api: &'a Api,
    structs: Vec<&'a Composite>,
}

impl<'a> FeatureChecks<'a> {
    fn new(api: &'a Api) -> Self {
        let mut used: Vec<&str> = Vec::new();
        collect_struct_names(api.extensions.iter().flat_map(|e| &e.feature_requirements), &mut used);
        if api.variant == ApiVariant::Vulkan {
            collect_struct_names(api.versions.iter().flat_map(|v| &v.requirements), &mut used);
        }
        used.sort_unstable();

        let mut structs: Vec<&Composite> = Vec::new();
        for name in used {
            match resolve_struct(api, name) {
                Some(s) if structs.iter().any(|seen| seen.name == s.name) => {}
                Some(s) => structs.push(s),
                None => warn!("feature struct {} is not part of the API", name),
            }
        }
        FeatureChecks { api, structs }
    }

    /// Variable holding a struct in generated code, named after the most
    /// recent struct name.
    fn var_name(&self, struct_name: &str) -> String {
        if struct_name == CORE_FEATURES {
            return "coreFeatures.features".to_string();
        }
        let canonical = resolve_struct(self.api, struct_name)
            .map(|s| s.name.as_str())
            .unwrap_or(struct_name);
        variable_name(canonical)
    }

    fn chain_structs(&self, inl: &mut Inl) {
        for s in &self.structs {
            let mut names = vec![s.name.as_str()];
            names.extend(s.aliases.iter().map(String::as_str));
            inl.line(format!("\t// {} for ext [{}]", names.join(", "), s.extensions.join(", ")));

            let condition = if s.extensions.is_empty() {
                let (major, minor) = s
                    .version
                    .as_deref()
                    .and_then(Version::numbers_from_name)
                    .unwrap_or((1, 0));
                format!("context.contextSupports(vk::ApiVersion(0, {}, {}, 0))", major, minor)
            } else {
                let extensions: Vec<String> = s.extensions.iter().take(2).map(|e| format!("\"{}\"", e)).collect();
                format!(
                    "canUseFeaturesStruct(deviceExtensions, usedApiVersion, {})",
                    extensions.join(", ")
                )
            };
            let var = variable_name(&s.name);
            inl.line(format!(
                "\tvk::{} {} = initVulkanStructure();\n\tif ({})\n\t\taddFeatures(&{});\n",
                s.name, var, condition, var
            ));
        }
    }

    fn depends_atom(&self, owner: &str, atom: &str) -> String {
        if atom.starts_with("VK_VERSION") {
            if let Some((major, minor)) = Version::numbers_from_name(atom) {
                return format!("context.contextSupports(vk::ApiVersion(0, {}, {}, 0))", major, minor);
            }
        }
        if let Some((struct_name, field)) = atom.split_once("::") {
            return format!("{}.{}", self.var_name(struct_name), field);
        }
        if atom.starts_with("VK_") {
            return format!("isExtensionStructSupported(deviceExtensions, RequiredExtension(\"{}\"))", atom);
        }
        warn!("unknown dependency {} for {}", atom, owner);
        format!("false /* UNSUPPORTED CONDITION: {}*/", atom)
    }

    /// Renders a depends expression, keeping its grouping.
    fn depends_condition(&self, owner: &str, depends: &str) -> String {
        let mut out = String::new();
        let mut atom = String::new();
        for c in depends.chars() {
            let operator = match c {
                '+' => " && ",
                ',' => " || ",
                '(' => "(",
                ')' => ")",
                _ => {
                    atom.push(c);
                    continue;
                }
            };
            if !atom.is_empty() {
                out.push_str(&self.depends_atom(owner, &atom));
                atom.clear();
            }
            out.push_str(operator);
        }
        if !atom.is_empty() {
            out.push_str(&self.depends_atom(owner, &atom));
        }
        if depends.contains(',') {
            out = format!("({})", out);
        }
        out
    }

    fn check_requirement(&self, inl: &mut Inl, owner: &str, fr: &FeatureRequirement, initial: &str) {
        let var = self.var_name(&fr.struct_name);
        let fields: Vec<&str> = fr.feature.split(',').collect();
        let field_condition = if fields.len() > 1 {
            let parts: Vec<String> = fields.iter().map(|f| format!("{}.{} == VK_FALSE", var, f)).collect();
            format!("({})", parts.join(") && ("))
        } else {
            format!("{}.{} == VK_FALSE", var, fr.feature)
        };
        let message = fields.join(" or ");

        let mut condition = initial.to_string();
        if let Some(depends) = &fr.depends {
            condition.push_str(" && ");
            condition.push_str(&self.depends_condition(owner, depends));
        }
        inl.line(format!(
            "\t// {}\n\tif ( {} )\n\t{{\n\t\tif ( {} )\n\t\t\tfailMesages.push_back(\"{}\");\n\t}}\n",
            fr.struct_name, condition, field_condition, message
        ));
    }
}

pub fn generate(api: &Api) -> String {
    let tested: Vec<&str> = extensions_tested_by_cts().collect();
    let checks = FeatureChecks::new(api);

    let mut inl = Inl::new();
    inl.line(PROLOGUE);
    checks.chain_structs(&mut inl);
    inl.line("\tcontext.getInstanceInterface().getPhysicalDeviceFeatures2(context.getPhysicalDevice(), &coreFeatures);\n");

    let mut skipped: Vec<&str> = Vec::new();
    for ext in &api.extensions {
        let vendor_checked = ext.name.contains("KHR") || ext.name.contains("EXT");
        let core_promoted = ext.promoted_to.as_deref().map_or(false, |p| p.contains("VK_VERSION"));
        if !ext.feature_requirements.is_empty()
            && vendor_checked
            && !core_promoted
            && !tested.contains(&ext.name.as_str())
        {
            skipped.push(&ext.name);
            continue;
        }
        let initial = format!(
            "isExtensionStructSupported(deviceExtensions, RequiredExtension(\"{}\"))",
            ext.name
        );
        for fr in &ext.feature_requirements {
            checks.check_requirement(&mut inl, &ext.name, fr, &initial);
        }
    }
    if !skipped.is_empty() {
        info!(
            "Not testing mandatory features of extensions the CTS does not test: {}",
            skipped.join(", ")
        );
    }

    if api.variant == ApiVariant::Vulkan {
        for version in &api.versions {
            let initial = format!(
                "context.contextSupports(vk::ApiVersion(0, {}, {}, 0))",
                version.major, version.minor
            );
            for fr in &version.requirements {
                checks.check_requirement(&mut inl, &version.name, fr, &initial);
            }
        }
    }

    inl.line("}");
    inl.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn struct_references_in_depends() {
        let refs: Vec<&str> =
            struct_references("VK_VERSION_1_2+(VkPhysicalDeviceVulkan12Features::bufferDeviceAddress,VK_KHR_x)")
                .collect();
        assert_eq!(refs, ["VkPhysicalDeviceVulkan12Features"]);
    }
}
