use vk_registry::{Api, ApiVariant, FunctionKind, Registry};

const VK_MINI: &str = include_str!("data/vk_mini.xml");

fn registry() -> Registry {
    let (registry, errors) = vk_registry::parse_stream(VK_MINI.as_bytes()).unwrap();
    if !errors.is_empty() {
        panic!("{:?}", errors);
    }
    registry
}

fn build(variant: ApiVariant) -> Api {
    let mut api = Api::build(&registry(), variant);
    api.post_process(&[]);
    api
}

fn enum_value(api: &Api, enum_name: &str, value_name: &str) -> i64 {
    api.enum_type(enum_name)
        .and_then(|e| e.values.iter().find(|v| v.name == value_name))
        .unwrap_or_else(|| panic!("{}::{} missing", enum_name, value_name))
        .value
}

#[test]
fn handles_are_classified() {
    let api = build(ApiVariant::Vulkan);
    let names: Vec<&str> = api.handles.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "VkInstance",
            "VkPhysicalDevice",
            "VkDevice",
            "VkQueue",
            "VkCommandBuffer",
            "VkBuffer",
            "VkPrivateDataSlot"
        ]
    );
    assert!(api.handle("VkDevice").unwrap().dispatchable);
    assert!(!api.handle("VkBuffer").unwrap().dispatchable);
    assert_eq!(
        api.handle("VkQueue").unwrap().object_type.as_deref(),
        Some("VK_OBJECT_TYPE_QUEUE")
    );
    assert_eq!(
        api.handle("VkPrivateDataSlotEXT").unwrap().name,
        "VkPrivateDataSlot"
    );
}

#[test]
fn extension_enumerators_get_block_values() {
    let api = build(ApiVariant::Vulkan);
    assert_eq!(
        enum_value(&api, "VkStructureType", "VK_STRUCTURE_TYPE_SWAPCHAIN_CREATE_INFO_KHR"),
        1000001000
    );
    assert_eq!(
        enum_value(&api, "VkStructureType", "VK_STRUCTURE_TYPE_DEVICE_GROUP_PRESENT_CAPABILITIES_KHR"),
        1000001007
    );
    assert_eq!(
        enum_value(&api, "VkStructureType", "VK_STRUCTURE_TYPE_PHYSICAL_DEVICE_FEATURES_2"),
        1000059000
    );
    assert_eq!(enum_value(&api, "VkResult", "VK_ERROR_SURFACE_LOST_KHR"), -1000000000);
    assert_eq!(enum_value(&api, "VkResult", "VK_ERROR_OUT_OF_POOL_MEMORY"), -1000069000);
    assert!(api
        .enum_type("VkStructureType")
        .unwrap()
        .values
        .iter()
        .all(|v| v.name != "VK_STRUCTURE_TYPE_DISABLED_THING_KHR"));
}

#[test]
fn enumerator_aliases_resolve() {
    let api = build(ApiVariant::Vulkan);
    let features2 = api
        .enum_type("VkStructureType")
        .unwrap()
        .values
        .iter()
        .find(|v| v.name == "VK_STRUCTURE_TYPE_PHYSICAL_DEVICE_FEATURES_2")
        .unwrap();
    assert_eq!(features2.aliases, ["VK_STRUCTURE_TYPE_PHYSICAL_DEVICE_FEATURES_2_KHR"]);

    let none = api
        .bitmask("VkAccessFlagBits2")
        .unwrap()
        .values
        .iter()
        .find(|v| v.name == "VK_ACCESS_2_NONE")
        .unwrap();
    assert_eq!(none.aliases, ["VK_ACCESS_2_NONE_KHR"]);

    let external = api
        .constants
        .iter()
        .find(|c| c.name == "VK_QUEUE_FAMILY_EXTERNAL")
        .unwrap();
    assert_eq!(external.aliases, ["VK_QUEUE_FAMILY_EXTERNAL_KHR"]);
    assert_eq!(external.value, "(~1U)");
}

#[test]
fn bitmasks_link_to_flags() {
    let api = build(ApiVariant::Vulkan);
    let queue = api.bitmask("VkQueueFlagBits").unwrap();
    assert_eq!(queue.flags_name.as_deref(), Some("VkQueueFlags"));
    let present = queue
        .values
        .iter()
        .find(|v| v.name == "VK_QUEUE_PRESENT_BIT_KHR")
        .unwrap();
    assert_eq!(present.value, 8);
    assert_eq!(present.text, "0x00000008");

    let access = api.bitmask("VkAccessFlagBits2").unwrap();
    assert_eq!(access.bit_width, 64);
    assert_eq!(access.flags_name.as_deref(), Some("VkAccessFlags2"));
    let sampled = access
        .values
        .iter()
        .find(|v| v.name == "VK_ACCESS_2_SHADER_SAMPLED_READ_BIT")
        .unwrap();
    assert_eq!(sampled.value, 1 << 33);
    assert_eq!(sampled.text, "0x0000000200000000ULL");

    assert!(api.bitmask("VkInstanceCreateFlagBits").unwrap().values.is_empty());
}

#[test]
fn structs_carry_members_and_aliases() {
    let api = build(ApiVariant::Vulkan);

    let features2 = api.composite("VkPhysicalDeviceFeatures2KHR").unwrap();
    assert_eq!(features2.name, "VkPhysicalDeviceFeatures2");
    assert_eq!(features2.aliases, ["VkPhysicalDeviceFeatures2KHR"]);
    assert_eq!(
        features2.s_type.as_deref(),
        Some("VK_STRUCTURE_TYPE_PHYSICAL_DEVICE_FEATURES_2")
    );
    assert_eq!(features2.extends, ["VkDeviceCreateInfo"]);
    assert_eq!(features2.version.as_deref(), Some("VK_VERSION_1_1"));
    assert_eq!(features2.extensions, ["VK_KHR_get_physical_device_properties2"]);

    let create_info = api.composite("VkInstanceCreateInfo").unwrap();
    let layers = create_info
        .members
        .iter()
        .find(|m| m.name == "ppEnabledLayerNames")
        .unwrap();
    assert_eq!(layers.full_type, "const char* const*");
    assert_eq!(layers.pointer, 2);
    assert_eq!(layers.type_name, "char");

    let props = api.composite("VkPhysicalDeviceProperties").unwrap();
    assert!(props.returned_only);
    assert_eq!(props.members[1].arrays, ["VK_MAX_PHYSICAL_DEVICE_NAME_SIZE"]);
    assert_eq!(props.members[0].limit_type.as_deref(), Some("noauto"));

    let clear = api.composite("VkClearColorValue").unwrap();
    assert!(clear.is_union);
    assert!(api.structs().all(|s| s.name != "VkClearColorValue"));

    let device = api.composite("VkDeviceCreateInfo").unwrap();
    let names: Vec<&str> = device.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["sType", "pNext", "enabledLayerCount"]);
}

#[test]
fn unrequired_entities_are_dropped() {
    let api = build(ApiVariant::Vulkan);
    assert!(api.composite("VkUnreferencedStruct").is_none());
    assert!(api.composite("VkAccelerationStructureInstanceKHR").is_none());
    assert!(api.function("vkUnreferencedCommand").is_none());
    assert!(api.function("vkGetFaultData").is_none());
    assert!(api.extension("VK_KHR_disabled_thing").is_none());
}

#[test]
fn functions_are_classified() {
    let api = build(ApiVariant::Vulkan);
    let kind = |name: &str| api.function(name).unwrap().kind;
    assert_eq!(kind("vkCreateInstance"), FunctionKind::Platform);
    assert_eq!(kind("vkGetInstanceProcAddr"), FunctionKind::Platform);
    assert_eq!(kind("vkDestroyInstance"), FunctionKind::Instance);
    assert_eq!(kind("vkGetPhysicalDeviceFeatures2KHR"), FunctionKind::Instance);
    assert_eq!(kind("vkCreateDevice"), FunctionKind::Instance);
    assert_eq!(kind("vkGetDeviceQueue"), FunctionKind::Device);
    assert_eq!(kind("vkCmdSetCullMode"), FunctionKind::Device);

    let create = api.function("vkCreateInstance").unwrap();
    assert_eq!(create.return_type, "VkResult");
    assert_eq!(create.params.len(), 3);
    assert_eq!(create.params[1].full_type, "const VkAllocationCallbacks*");
    assert!(create.params[1].optional);

    let cull = api.function("vkCmdSetCullModeEXT").unwrap();
    assert_eq!(cull.name, "vkCmdSetCullMode");
    assert_eq!(cull.version.as_deref(), Some("VK_VERSION_1_3"));
    assert_eq!(cull.extensions, ["VK_EXT_extended_dynamic_state"]);

    assert_eq!(
        FunctionKind::classify("vkGetExternalComputeQueueDataNV", Some("VkExternalComputeQueueNV")),
        FunctionKind::Platform
    );
    assert_eq!(
        FunctionKind::classify("vkDestroyExternalComputeQueueNV", Some("VkDevice")),
        FunctionKind::Device
    );
    assert_eq!(
        FunctionKind::classify("vkGetDisplayModePropertiesKHR", Some("VkDisplayKHR")),
        FunctionKind::Instance
    );
    assert_eq!(FunctionKind::classify("vkSomethingNew", None), FunctionKind::Instance);
}

#[test]
fn versions_and_extensions() {
    let api = build(ApiVariant::Vulkan);
    let versions: Vec<(&str, u32, u32)> = api
        .versions
        .iter()
        .map(|v| (v.name.as_str(), v.major, v.minor))
        .collect();
    assert_eq!(
        versions,
        [("VK_VERSION_1_0", 1, 0), ("VK_VERSION_1_1", 1, 1), ("VK_VERSION_1_3", 1, 3)]
    );
    assert_eq!(api.versions[1].api_name, "VK_API_VERSION_1_1");
    assert_eq!(api.versions[0].requirements.len(), 1);
    assert_eq!(api.versions[0].requirements[0].feature, "robustBufferAccess");

    let swapchain = api.extension("VK_KHR_swapchain").unwrap();
    assert!(swapchain.is_device());
    assert_eq!(swapchain.spec_version, Some(70));
    assert_eq!(swapchain.name_define.as_deref(), Some("VK_KHR_SWAPCHAIN_EXTENSION_NAME"));
    assert_eq!(swapchain.requires.len(), 2);
    assert_eq!(swapchain.requires[1].depends.as_deref(), Some("VK_VERSION_1_1"));

    let props2 = api.extension("VK_KHR_get_physical_device_properties2").unwrap();
    assert!(!props2.is_device());
    assert_eq!(props2.promoted_to.as_deref(), Some("VK_VERSION_1_1"));
    assert_eq!(props2.commands(), ["vkGetPhysicalDeviceFeatures2KHR"]);
}

#[test]
fn vulkan_sc_model() {
    let api = build(ApiVariant::VulkanSc);

    assert!(api.handle("VkPrivateDataSlot").is_none());
    assert!(api.function("vkCreatePrivateDataSlot").is_none());
    assert!(api.function("vkGetFaultData").is_some());
    assert!(api.extension("VK_KHR_get_physical_device_properties2").is_none());
    assert!(api.extension("VK_EXT_private_data").is_none());

    let cull = api.function("vkCmdSetCullModeEXT").unwrap();
    assert_eq!(cull.name, "vkCmdSetCullModeEXT");
    assert!(cull.aliases.is_empty());
    assert!(api.functions.iter().all(|f| f.name != "vkCmdSetCullMode"));

    let features2 = api.composite("VkPhysicalDeviceFeatures2").unwrap();
    assert!(features2.aliases.is_empty());
    let variable_pointers = api.composite("VkPhysicalDeviceVariablePointersFeatures").unwrap();
    assert_eq!(variable_pointers.aliases, ["VkPhysicalDeviceVariablePointerFeatures"]);

    let device = api.composite("VkDeviceCreateInfo").unwrap();
    let names: Vec<&str> = device.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["sType", "pNext", "reservedLayerCount"]);

    assert_eq!(
        enum_value(&api, "VkStructureType", "VK_STRUCTURE_TYPE_QUEUE_FAMILY_CHECKPOINT_PROPERTIES_2_NV"),
        1000314008
    );
    assert_eq!(
        enum_value(&api, "VkStructureType", "VK_STRUCTURE_TYPE_SHADER_MODULE_CREATE_INFO"),
        16
    );
    assert!(api.version("VKSC_VERSION_1_0").is_some());
}

#[test]
fn empty_enums_are_kept() {
    let api = build(ApiVariant::Vulkan);
    assert!(api.enum_type("VkEmptyEnum").unwrap().values.is_empty());
    assert!(api.enum_type("VkObjectType").unwrap().values.len() > 1);
    assert!(!api.enum_type("VkObjectType").unwrap().is_linear());
    assert!(api.enum_type("VkPipelineCacheHeaderVersion").is_some());
}

const ALIAS_CHAIN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<registry>
    <types>
        <type category="struct" name="VkChainA" alias="VkChainB"/>
        <type category="struct" name="VkChainB" alias="VkChainC"/>
        <type category="struct" name="VkDangling" alias="VkMissing"/>
        <type category="struct" name="VkChainC">
            <member><type>uint32_t</type> <name>value</name></member>
        </type>
    </types>
    <feature api="vulkan" name="VK_VERSION_1_0" number="1.0">
        <require>
            <type name="VkChainA"/>
            <type name="VkChainB"/>
            <type name="VkChainC"/>
            <type name="VkDangling"/>
        </require>
    </feature>
</registry>
"#;

#[test]
fn forward_alias_chain_resolves_to_one_definition() {
    let (registry, errors) = vk_registry::parse_stream(ALIAS_CHAIN.as_bytes()).unwrap();
    if !errors.is_empty() {
        panic!("{:?}", errors);
    }
    let mut api = Api::build(&registry, ApiVariant::Vulkan);
    api.post_process(&[]);

    assert_eq!(api.composites.len(), 1);
    let c = api.composite("VkChainC").unwrap();
    assert_eq!(c.aliases, ["VkChainB", "VkChainA"]);
    assert_eq!(api.composite("VkChainA").unwrap().name, "VkChainC");
    assert_eq!(api.composite("VkChainB").unwrap().name, "VkChainC");

    assert!(api.composite("VkDangling").is_none());
    assert!(api.composite("VkMissing").is_none());
}
