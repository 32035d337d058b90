use vk_registry::{is_dependency_met, Api, ApiVariant, DependsError, DependsExpr};

const VK_MINI: &str = include_str!("data/vk_mini.xml");

fn api() -> Api {
    let (registry, errors) = vk_registry::parse_stream(VK_MINI.as_bytes()).unwrap();
    if !errors.is_empty() {
        panic!("{:?}", errors);
    }
    Api::build(&registry, ApiVariant::Vulkan)
}

fn render(api: &Api, source: &str) -> String {
    DependsExpr::parse(source).unwrap().to_cpp(
        api,
        source,
        &|major, minor| format!("checkVersion({}, {}, apiVersion)", major, minor),
        &|list, ext| format!("isSupported({}, \"{}\")", list, ext),
    )
}

macro_rules! evaluates {
    ($name:ident, $expr:expr, $enabled:expr, $expected:expr) => {
        #[test]
        fn $name() {
            let enabled: &[&str] = &$enabled;
            assert_eq!(is_dependency_met(Some($expr), enabled), $expected);
        }
    };
}

evaluates!(single_extension_enabled, "VK_KHR_surface", ["VK_KHR_surface"], true);
evaluates!(single_extension_missing, "VK_KHR_surface", [], false);
evaluates!(version_is_always_met, "VK_VERSION_1_1", [], true);
evaluates!(and_needs_both, "VK_KHR_a+VK_KHR_b", ["VK_KHR_a"], false);
evaluates!(or_needs_one, "VK_KHR_a,VK_KHR_b", ["VK_KHR_b"], true);
evaluates!(grouping, "(VK_KHR_a,VK_VERSION_1_1)+VK_KHR_b", ["VK_KHR_b"], true);
evaluates!(feature_atoms_are_unmet, "VkPhysicalDeviceFeatures::sparseBinding", [], false);
evaluates!(malformed_is_unmet, "VK_KHR_a+", ["VK_KHR_a"], false);

#[test]
fn missing_expression_is_met() {
    let none: &[&str] = &[];
    assert!(is_dependency_met(None, none));
}

#[test]
fn parse_errors() {
    assert!(matches!(
        DependsExpr::parse("(VK_KHR_a"),
        Err(DependsError::UnbalancedParen { pos: 0, .. })
    ));
    assert!(matches!(
        DependsExpr::parse("VK_KHR_a)"),
        Err(DependsError::UnbalancedParen { pos: 8, .. })
    ));
    assert!(matches!(
        DependsExpr::parse("VK_KHR_a+"),
        Err(DependsError::UnexpectedEnd { .. })
    ));
    assert!(matches!(
        DependsExpr::parse("VK_KHR_a&VK_KHR_b"),
        Err(DependsError::UnexpectedChar { found: '&', .. })
    ));
}

#[test]
fn whitespace_is_ignored() {
    let spaced = DependsExpr::parse(" VK_KHR_a + ( VK_KHR_b , VK_KHR_c ) ").unwrap();
    let compact = DependsExpr::parse("VK_KHR_a+(VK_KHR_b,VK_KHR_c)").unwrap();
    assert_eq!(spaced, compact);
    assert_eq!(compact.atoms(), ["VK_KHR_a", "VK_KHR_b", "VK_KHR_c"]);
}

#[test]
fn required_core_version() {
    let version = |s: &str| DependsExpr::parse(s).unwrap().required_core_version();
    assert_eq!(version("VK_VERSION_1_2"), Some((1, 2)));
    assert_eq!(version("VK_KHR_a+VK_VERSION_1_1+VK_VERSION_1_3"), Some((1, 3)));
    assert_eq!(version("VK_KHR_a,VK_VERSION_1_1"), None);
    assert_eq!(version("VK_KHR_a"), None);
}

#[test]
fn cpp_rendering() {
    let api = api();
    assert_eq!(
        render(&api, "VK_KHR_surface"),
        "isSupported(vIEP, \"VK_KHR_surface\")"
    );
    assert_eq!(
        render(&api, "VK_KHR_swapchain+VK_VERSION_1_1"),
        "(isSupported(vDEP, \"VK_KHR_swapchain\") && checkVersion(1, 1, apiVersion))"
    );
    assert_eq!(
        render(&api, "VK_KHR_get_physical_device_properties2"),
        "(checkVersion(1, 1, apiVersion) || isSupported(vIEP, \"VK_KHR_get_physical_device_properties2\"))"
    );
    assert_eq!(
        render(&api, "VK_KHR_get_physical_device_properties2,VK_VERSION_1_1"),
        "(isSupported(vIEP, \"VK_KHR_get_physical_device_properties2\") || checkVersion(1, 1, apiVersion))"
    );
    assert_eq!(
        render(&api, "VK_KHR_surface+VkPhysicalDeviceFeatures::sparseBinding"),
        "(isSupported(vIEP, \"VK_KHR_surface\") && false /* UNSUPPORTED CONDITION: VkPhysicalDeviceFeatures::sparseBinding*/)"
    );
}

fn promote(api: &mut Api, extension: &str, target: &str) {
    let ext = api.extensions.iter_mut().find(|e| e.name == extension).unwrap();
    ext.promoted_to = Some(target.into());
}

#[test]
fn promotion_target_must_be_named_exactly() {
    let mut api = api();
    promote(&mut api, "VK_EXT_private_data", "VK_KHR_swap");

    assert_eq!(
        render(&api, "VK_EXT_private_data+VK_KHR_swapchain"),
        "((isSupported(vDEP, \"VK_KHR_swap\") || isSupported(vDEP, \"VK_EXT_private_data\")) && isSupported(vDEP, \"VK_KHR_swapchain\"))"
    );

    promote(&mut api, "VK_EXT_private_data", "VK_KHR_swapchain");
    assert_eq!(
        render(&api, "VK_EXT_private_data+VK_KHR_swapchain"),
        "(isSupported(vDEP, \"VK_EXT_private_data\") && isSupported(vDEP, \"VK_KHR_swapchain\"))"
    );
}
