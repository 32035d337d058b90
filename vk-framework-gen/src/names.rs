//! Naming conventions of the generated framework.

use once_cell::sync::Lazy;
use regex::Regex;
use vk_registry::{Member, Version};

use crate::platform::{EXTENSION_POSTFIXES, PLATFORM_TYPES, PLATFORM_TYPE_NAMESPACE, TYPE_SUBSTITUTIONS};

static LOWER_UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());
static LETTER_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-zA-Z])([0-9])").unwrap());
static CAMEL_2D_3D: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z])([23])D([A-Z])").unwrap());
static CAMEL_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(.)([A-Z][a-z]+)").unwrap());

fn strip_vk(name: &str) -> &str {
    name.strip_prefix("Vk")
        .or_else(|| name.strip_prefix("vk"))
        .unwrap_or(name)
}

/// `prefix_name("HANDLE_TYPE_", "VkCommandBuffer")` gives `HANDLE_TYPE_COMMAND_BUFFER`.
pub fn prefix_name(prefix: &str, name: &str) -> String {
    let name = LOWER_UPPER.replace_all(strip_vk(name), "${1}_${2}");
    let name = LETTER_DIGIT.replace_all(&name, "${1}_${2}");
    format!("{}{}", prefix, name.to_uppercase())
}

/// `vkCreateInstance` becomes `createInstance`.
pub fn interface_name(function: &str) -> String {
    let rest = strip_vk(function);
    let mut chars = rest.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `vkCreateInstance` becomes `CreateInstanceFunc`.
pub fn function_type_name(function: &str) -> String {
    format!("{}Func", strip_vk(function))
}

/// Name without the `Vk` prefix, used in `get<Name>Str` style helpers.
pub fn bare_name(name: &str) -> &str {
    strip_vk(name)
}

/// Splits an enum type name into its enumerator prefix and vendor postfix.
///
/// `VkSurfaceTransformFlagBitsKHR` gives `("VK_SURFACE_TRANSFORM_FLAG_BITS", "_KHR")`.
pub fn enum_prefix_and_postfix(name: &str) -> (String, String) {
    let mut prefix = String::new();
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if let Some(p) = prev {
            if c.is_ascii_uppercase() && !p.is_ascii_uppercase() {
                prefix.push('_');
            }
        }
        prefix.extend(c.to_uppercase());
        prev = Some(c);
    }
    for postfix in EXTENSION_POSTFIXES {
        if prefix.ends_with(postfix) && prefix.len() > postfix.len() {
            let stem = &prefix[..prefix.len() - postfix.len() - 1];
            return (stem.to_string(), format!("_{}", postfix));
        }
    }
    (prefix, String::new())
}

pub fn camel_to_snake(name: &str) -> String {
    let name = CAMEL_2D_3D.replace_all(name, "${1}_${2}d${3}");
    let name = CAMEL_WORD.replace_all(&name, "${1}_${2}");
    LOWER_UPPER.replace_all(&name, "${1}_${2}").to_lowercase()
}

/// Rewrites `full_type` so that window-system types use their framework
/// wrappers.
pub fn substitute_type(full_type: &str, base_type: &str) -> String {
    for (src, dst) in TYPE_SUBSTITUTIONS {
        if base_type == *src {
            return full_type.replace(base_type, dst);
        }
    }
    for (tokens, substitute, _) in PLATFORM_TYPES {
        let base = if tokens.contains(&"*") {
            tokens[tokens.len() - 2]
        } else {
            tokens[0]
        };
        if base_type == base {
            let declared = tokens.join(" ").replace(" *", "*");
            return full_type.replace(&declared, &format!("{}::{}", PLATFORM_TYPE_NAMESPACE, substitute));
        }
    }
    full_type.to_string()
}

/// Member or parameter declaration, e.g. `const char* pName` or `uint8_t uuid[VK_UUID_SIZE]`.
pub fn declaration(member: &Member) -> String {
    let mut text = format!(
        "{} {}",
        substitute_type(&member.full_type, &member.type_name),
        member.name
    );
    for size in &member.arrays {
        text.push('[');
        text.push_str(size);
        text.push(']');
    }
    text
}

pub fn arg_list(params: &[Member]) -> String {
    params.iter().map(declaration).collect::<Vec<_>>().join(", ")
}

pub fn param_names(params: &[Member]) -> String {
    params
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `"1, 2"` for `VK_VERSION_1_2`, as used in `VK_MAKE_API_VERSION(0, 1, 2, 0)`.
pub fn version_args(version: &str) -> Option<String> {
    Version::numbers_from_name(version).map(|(major, minor)| format!("{}, {}", major, minor))
}

/// `VK_API_VERSION_1_2` for `VK_VERSION_1_2`.
pub fn api_version_name(version: &str) -> String {
    version.replacen("_VERSION_", "_API_VERSION_", 1)
}

/// Variable name of a feature struct in generated code, `VkPhysicalDeviceFoo` gives `physicalDeviceFoo`.
pub fn variable_name(type_name: &str) -> String {
    interface_name(type_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_names() {
        assert_eq!(prefix_name("HANDLE_TYPE_", "VkCommandBuffer"), "HANDLE_TYPE_COMMAND_BUFFER");
        assert_eq!(
            prefix_name("VK_OBJECT_TYPE_", "VkPhysicalDevice"),
            "VK_OBJECT_TYPE_PHYSICAL_DEVICE"
        );
        assert_eq!(
            prefix_name("VK_STRUCTURE_TYPE_", "VkPhysicalDeviceFeatures2"),
            "VK_STRUCTURE_TYPE_PHYSICAL_DEVICE_FEATURES_2"
        );
    }

    #[test]
    fn function_names() {
        assert_eq!(interface_name("vkCreateInstance"), "createInstance");
        assert_eq!(function_type_name("vkCreateInstance"), "CreateInstanceFunc");
        assert_eq!(variable_name("VkPhysicalDeviceFeatures"), "physicalDeviceFeatures");
    }

    #[test]
    fn enum_prefixes() {
        assert_eq!(
            enum_prefix_and_postfix("VkSurfaceTransformFlagBitsKHR"),
            ("VK_SURFACE_TRANSFORM_FLAG_BITS".to_string(), "_KHR".to_string())
        );
        assert_eq!(
            enum_prefix_and_postfix("VkStructureType"),
            ("VK_STRUCTURE_TYPE".to_string(), String::new())
        );
        assert_eq!(
            enum_prefix_and_postfix("VkQueueFlagBits"),
            ("VK_QUEUE_FLAG_BITS".to_string(), String::new())
        );
    }

    #[test]
    fn snake_case() {
        assert_eq!(camel_to_snake("imageView2DOn3DImage"), "image_view_2d_on_3d_image");
        assert_eq!(camel_to_snake("robustBufferAccess"), "robust_buffer_access");
    }

    #[test]
    fn platform_substitution() {
        assert_eq!(substitute_type("Display*", "Display"), "pt::XlibDisplayPtr");
        assert_eq!(
            substitute_type("struct wl_surface*", "wl_surface"),
            "pt::WaylandSurfacePtr"
        );
        assert_eq!(substitute_type("HANDLE*", "HANDLE"), "pt::Win32Handle*");
        assert_eq!(
            substitute_type("const SECURITY_ATTRIBUTES*", "SECURITY_ATTRIBUTES"),
            "pt::Win32SecurityAttributesPtr"
        );
        assert_eq!(substitute_type("DWORD", "DWORD"), "uint32_t");
        assert_eq!(substitute_type("const char*", "char"), "const char*");
    }
}
