use std::fs;

use vk_framework_gen::{
    basic_types, ext_deps, extensions, functions, generators, handles, mandatory, ref_util, str_util,
    structs, INL_HEADER,
};
use vk_registry::{Api, ApiVariant, FunctionKind};

const VK_MINI: &str = include_str!("../../vk-registry/tests/data/vk_mini.xml");

fn build(variant: ApiVariant) -> Api {
    let (registry, errors) = vk_registry::parse_stream(VK_MINI.as_bytes()).unwrap();
    if !errors.is_empty() {
        panic!("{:?}", errors);
    }
    let mut api = Api::build(&registry, variant);
    api.post_process(&[]);
    api
}

macro_rules! test_contains {
    ($($test_name:ident: $variant:ident, $generate:expr, $needle:expr;)*) => {
        $(
            #[test]
            fn $test_name() {
                let api = build(ApiVariant::$variant);
                let text: String = ($generate)(&api);
                assert!(text.contains($needle), "{:?} not found in:\n{}", $needle, text);
            }
        )*
    };
}

test_contains! {
    basic_types_max_framework_version: Vulkan, basic_types::generate,
        "VK_API_MAX_FRAMEWORK_VERSION";
    basic_types_sc_max_framework_version: VulkanSc, basic_types::generate,
        "VKSC_API_VERSION_1_0\n";
    basic_types_handle_alias: Vulkan, basic_types::generate,
        "(VkPrivateDataSlotEXT,";
    basic_types_extension_name: Vulkan, basic_types::generate,
        "#define VK_KHR_SWAPCHAIN_EXTENSION_NAME \"VK_KHR_swapchain\"\n#define VK_KHR_SWAPCHAIN_SPEC_VERSION 70\n";
    basic_types_64bit_bitmask: Vulkan, basic_types::generate,
        "typedef uint64_t VkAccessFlagBits2;";
    handle_type_alias: Vulkan, handles::generate_handle_type,
        "= HANDLE_TYPE_PRIVATE_DATA_SLOT,";
    handle_type_last: Vulkan, handles::generate_handle_type,
        "= HANDLE_TYPE_QUEUE + 1";
    obj_type_impl: Vulkan, handles::generate_obj_type_impl,
        "{ return VK_OBJECT_TYPE_PRIVATE_DATA_SLOT;";
    structure_type_impl: Vulkan, structs::generate_get_structure_type_impl,
        "template<> VkStructureType getStructureType<VkApplicationInfo> (void)\n{\n\treturn VK_STRUCTURE_TYPE_APPLICATION_INFO;\n}\n";
    struct_alias_typedef: Vulkan, structs::generate_struct_types,
        "typedef VkPhysicalDeviceFeatures2 VkPhysicalDeviceFeatures2KHR;";
    union_declaration: Vulkan, structs::generate_struct_types,
        "union VkClearColorValue\n{";
    sc_shader_module_struct: VulkanSc, structs::generate_struct_types,
        "struct VkShaderModuleCreateInfo\n";
    c_struct_typedef: Vulkan, structs::generate_struct_types_c,
        "} VkApplicationInfo;";
    virtual_device_interface: Vulkan, |api| functions::generate_interface(api, FunctionKind::Device, false),
        "(VkDevice device, uint32_t queueFamilyIndex, uint32_t queueIndex, VkQueue* pQueue) const = 0;";
    concrete_device_interface: Vulkan, |api| functions::generate_interface(api, FunctionKind::Device, true),
        "(VkDevice device, uint32_t queueFamilyIndex, uint32_t queueIndex, VkQueue* pQueue) const;";
    function_pointer_alias_type: Vulkan, functions::generate_function_pointer_types,
        "(VKAPI_CALL* CmdSetCullModeEXTFunc)";
    init_device_pointer_version_guard: Vulkan, |api| functions::generate_init_function_pointers(api, FunctionKind::Device),
        "if (usedApiVersion >= VK_MAKE_API_VERSION(0, 1, 3, 0))\n    m_vk.cmdSetCullMode = (CmdSetCullModeFunc) GET_PROC_ADDR(\"vkCmdSetCullMode\");\n";
    init_device_pointer_alias_fallback: Vulkan, |api| functions::generate_init_function_pointers(api, FunctionKind::Device),
        "if (!m_vk.cmdSetCullMode)\n    m_vk.cmdSetCullMode = (CmdSetCullModeFunc) GET_PROC_ADDR(\"vkCmdSetCullModeEXT\");\n";
    init_instance_alias_member: Vulkan, |api| functions::generate_init_function_pointers(api, FunctionKind::Instance),
        "m_vk.getPhysicalDeviceFeatures2KHR = (GetPhysicalDeviceFeatures2KHRFunc) m_vk.getPhysicalDeviceFeatures2;";
    instance_driver_dispatches_on_device_version: Vulkan, |api| functions::generate_driver_impl(api, FunctionKind::Instance),
        "    if (props.apiVersion >= VK_API_VERSION_1_1)\n        m_vk.getPhysicalDeviceFeatures2(physicalDevice, pFeatures);\n    else\n        m_vk.getPhysicalDeviceFeatures2KHR(physicalDevice, pFeatures);\n";
    enum_name_switch: Vulkan, str_util::generate_impl,
        "const char* getResultName (VkResult value)\n{\n\tswitch (value)\n";
    flags_str: Vulkan, str_util::generate_impl,
        "tcu::Format::Bitfield<32> getQueueFlagsStr (VkQueueFlags value)";
    ref_util_create_instance: Vulkan, ref_util::generate_proto,
        "(const PlatformInterface& vk, const VkInstanceCreateInfo* pCreateInfo, const VkAllocationCallbacks* pAllocator = nullptr);";
    ref_util_create_device: Vulkan, ref_util::generate_proto,
        "(const PlatformInterface& vkp, VkInstance instance, const InstanceInterface& vk, VkPhysicalDevice physicalDevice, const VkDeviceCreateInfo* pCreateInfo, const VkAllocationCallbacks* pAllocator = nullptr);";
    ref_util_device_deleter: Vulkan, ref_util::generate_impl,
        "\treturn Move<VkDevice>(check<VkDevice>(object), Deleter<VkDevice>(vkp, instance, object, pAllocator));";
    ref_util_device_object: Vulkan, ref_util::generate_impl,
        "\tVK_CHECK(vk.createPrivateDataSlot(device, pAllocator, &object));";
    supported_device_extensions: Vulkan, extensions::generate_supported_extensions,
        "    if (coreVersion >= VK_API_VERSION_1_3)\n    {\n        dst.push_back(\"VK_EXT_private_data\");\n    }\n";
    supported_instance_extensions: Vulkan, extensions::generate_supported_extensions,
        "        dst.push_back(\"VK_KHR_get_physical_device_properties2\");";
    instance_khr_extensions: Vulkan, |api| extensions::generate_extension_list(api, false),
        "{\n\t\"VK_KHR_get_physical_device_properties2\",\n\t\"VK_KHR_surface\",\n};";
    device_khr_extensions: Vulkan, |api| extensions::generate_extension_list(api, true),
        "static const char* s_allowedDeviceKhrExtensions[] =\n{\n\t\"VK_KHR_swapchain\",\n};";
    extension_device_functions: Vulkan, extensions::generate_extension_functions,
        "\tif (extName == \"VK_EXT_extended_dynamic_state\")\n\t{\n\t\tfunctions.push_back(\"vkCmdSetCullModeEXT\");\n\t\treturn;\n\t}";
    extension_instance_functions: Vulkan, extensions::generate_extension_functions,
        "\t\tfunctions.push_back(\"vkGetPhysicalDeviceSurfaceCapabilitiesKHR\");";
    extension_name_arrays: Vulkan, extensions::generate_extension_functions,
        "::std::string deviceExtensionNames[] =\n{\n\t\"VK_KHR_swapchain\",";
    core_functionalities_map: Vulkan, extensions::generate_core_functionalities,
        "    apis.insert(::std::pair<uint32_t, FunctionInfosList>(VK_API_VERSION_1_1, FunctionInfosList()));";
    core_functionalities_version: Vulkan, extensions::generate_core_functionalities,
        "\tapis[VK_API_VERSION_1_3] = {";
    entry_point_validation: Vulkan, extensions::generate_entry_point_validation,
        "instExtDeviceFun\n{\n};";
    known_driver_ids: Vulkan, extensions::generate_known_driver_ids,
        "\t{\"VK_DRIVER_ID_MAX_ENUM\", 0x7FFFFFFF}\n};";
    dependency_check_function: Vulkan, ext_deps::generate,
        "bool check_VK_KHR_swapchain(const tcu::UVec2& v, const ExtPropVect& vIEP, const ExtPropVect& vDEP)\n{\n\tDE_UNREF(v);\n\tDE_UNREF(vIEP);\n\n\tif (!isSupported(vDEP, \"VK_KHR_swapchain\"))\n\t\treturn true;\n\n\t// depends attribute in xml: VK_KHR_surface\n\treturn isSupported(vIEP, \"VK_KHR_surface\");\n}\n";
    dependency_check_promoted: Vulkan, ext_deps::generate,
        "\tif (isCompatible(1, 3, v))\n\t\treturn true;\n";
    dependency_check_alternatives: Vulkan, ext_deps::generate,
        "\treturn (isSupported(vIEP, \"VK_KHR_get_physical_device_properties2\") || isCompatible(1, 1, v));";
    released_api_versions: Vulkan, ext_deps::generate,
        "=\n{\n\tstd::make_tuple(4206592, 0, 1, 3),\n\tstd::make_tuple(4198400, 0, 1, 1),\n\tstd::make_tuple(4194304, 0, 1, 0)\n};";
    released_sc_api_versions: VulkanSc, ext_deps::generate,
        "=\n{\n\tstd::make_tuple(541065216, 1, 1, 0),\n\tstd::make_tuple(4194304, 0, 1, 0)\n};";
    required_core_version: Vulkan, ext_deps::generate,
        "\tstd::make_tuple(1, 0, \"VK_EXT_extended_dynamic_state\"),";
    mandatory_core_feature: Vulkan, mandatory::generate,
        "\t// VkPhysicalDeviceFeatures\n\tif ( context.contextSupports(vk::ApiVersion(0, 1, 0, 0)) )\n\t{\n\t\tif ( coreFeatures.features.robustBufferAccess == VK_FALSE )\n\t\t\tfailMesages.push_back(\"robustBufferAccess\");\n\t}\n";
}

#[test]
fn empty_enums_are_skipped_for_vulkan_only() {
    let vulkan = basic_types::generate(&build(ApiVariant::Vulkan));
    assert!(!vulkan.contains("enum VkEmptyEnum"));
    let sc = basic_types::generate(&build(ApiVariant::VulkanSc));
    assert!(sc.contains("enum VkEmptyEnum"));
}

#[test]
fn sparse_enums_have_no_last() {
    let text = basic_types::generate(&build(ApiVariant::Vulkan));
    assert!(text.contains("VK_PIPELINE_CACHE_HEADER_VERSION_MAX_ENUM"));
    assert!(!text.contains("VK_OBJECT_TYPE_LAST"));
    assert!(!text.contains("VK_RESULT_LAST"));
}

#[test]
fn embedded_structs_are_declared_first() {
    let api = build(ApiVariant::Vulkan);
    let order: Vec<&str> = structs::declaration_order(&api)
        .into_iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(order.len(), api.composites.len());
    let position = |name: &str| order.iter().position(|n| *n == name).unwrap();
    assert!(position("VkPhysicalDeviceFeatures") < position("VkPhysicalDeviceFeatures2"));
}

#[test]
fn core_functionalities_are_cumulative() {
    let text = extensions::generate_core_functionalities(&build(ApiVariant::Vulkan));
    assert_eq!(text.matches("\"vkCreateInstance\"").count(), 3);
    assert_eq!(text.matches("\"vkCmdSetCullMode\"").count(), 1);
    assert!(!text.contains("vkGetPhysicalDeviceSurfaceCapabilitiesKHR"));
}

#[test]
fn platform_pointers_skip_get_instance_proc_addr() {
    let text = functions::generate_init_function_pointers(&build(ApiVariant::Vulkan), FunctionKind::Platform);
    assert!(text.contains("GET_PROC_ADDR(\"vkCreateInstance\")"));
    assert!(!text.contains("vkGetInstanceProcAddr"));
}

#[test]
fn sc_init_has_no_alias_fallback() {
    let text = functions::generate_init_function_pointers(&build(ApiVariant::VulkanSc), FunctionKind::Device);
    assert!(!text.contains("if (!m_vk."));
    assert!(!text.contains("usedApiVersion"));
}

#[test]
fn every_file_has_header() {
    for variant in [ApiVariant::Vulkan, ApiVariant::VulkanSc] {
        let api = build(variant);
        for generator in generators() {
            let text = generator.generate(&api);
            assert!(text.starts_with(INL_HEADER), "{}", generator.file_name);
        }
    }
}

#[test]
fn generation_is_deterministic() {
    let api = build(ApiVariant::Vulkan);
    for generator in generators() {
        assert_eq!(generator.generate(&api), generator.generate(&api), "{}", generator.file_name);
    }
}

#[test]
fn run_writes_only_changed_files() {
    let api = build(ApiVariant::Vulkan);
    let outdir = std::env::temp_dir().join(format!("vk-framework-gen-run-{}", std::process::id()));
    let _ = fs::remove_dir_all(&outdir);
    let total = generators().len();

    let first = vk_framework_gen::run(&api, &outdir).unwrap();
    assert_eq!(first.written, total);
    assert_eq!(first.unchanged, 0);

    let second = vk_framework_gen::run(&api, &outdir).unwrap();
    assert_eq!(second.written, 0);
    assert_eq!(second.unchanged, total);

    fs::write(outdir.join("vkHandleType.inl"), "stale").unwrap();
    let third = vk_framework_gen::run(&api, &outdir).unwrap();
    assert_eq!(third.written, 1);

    fs::remove_dir_all(&outdir).unwrap();
}
