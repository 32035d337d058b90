//! Fixed tables describing how registry types map onto the framework.

/// Namespace of the opaque platform type wrappers.
pub const PLATFORM_TYPE_NAMESPACE: &str = "pt";

/// Window-system types, as `(C tokens, wrapper name, underlying type)`.
pub const PLATFORM_TYPES: &[(&[&str], &str, &str)] = &[
    // VK_KHR_xlib_surface
    (&["Display", "*"], "XlibDisplayPtr", "void*"),
    (&["Window"], "XlibWindow", "uintptr_t"),
    (&["VisualID"], "XlibVisualID", "uint32_t"),
    // VK_KHR_xcb_surface
    (&["xcb_connection_t", "*"], "XcbConnectionPtr", "void*"),
    (&["xcb_window_t"], "XcbWindow", "uintptr_t"),
    (&["xcb_visualid_t"], "XcbVisualid", "uint32_t"),
    // VK_KHR_wayland_surface
    (&["struct", "wl_display", "*"], "WaylandDisplayPtr", "void*"),
    (&["struct", "wl_surface", "*"], "WaylandSurfacePtr", "void*"),
    // VK_KHR_mir_surface
    (&["MirConnection", "*"], "MirConnectionPtr", "void*"),
    (&["MirSurface", "*"], "MirSurfacePtr", "void*"),
    // VK_KHR_android_surface
    (&["ANativeWindow", "*"], "AndroidNativeWindowPtr", "void*"),
    // VK_KHR_win32_surface
    (&["HINSTANCE"], "Win32InstanceHandle", "void*"),
    (&["HWND"], "Win32WindowHandle", "void*"),
    (&["HANDLE"], "Win32Handle", "void*"),
    (&["const", "SECURITY_ATTRIBUTES", "*"], "Win32SecurityAttributesPtr", "const void*"),
    (&["AHardwareBuffer", "*"], "AndroidHardwareBufferPtr", "void*"),
    (&["HMONITOR"], "Win32MonitorHandle", "void*"),
    (&["LPCWSTR"], "Win32LPCWSTR", "const void*"),
    // VK_EXT_acquire_xlib_display
    (&["RROutput"], "RROutput", "void*"),
    (&["zx_handle_t"], "zx_handle_t", "uint32_t"),
    (&["GgpFrameToken"], "GgpFrameToken", "int32_t"),
    (&["GgpStreamDescriptor"], "GgpStreamDescriptor", "int32_t"),
    (&["CAMetalLayer"], "CAMetalLayer", "void*"),
    (&["struct", "_screen_context", "*"], "QNXScreenContextPtr", "void*"),
    (&["struct", "_screen_window", "*"], "QNXScreenWindowPtr", "void*"),
    // VK_EXT_metal_objects
    (&["MTLDevice_id"], "MTLDevice_id", "void*"),
    (&["MTLCommandQueue_id"], "MTLCommandQueue_id", "void*"),
    (&["MTLBuffer_id"], "MTLBuffer_id", "void*"),
    (&["MTLTexture_id"], "MTLTexture_id", "void*"),
    (&["IOSurfaceRef"], "IOSurfaceRef", "void*"),
    (&["MTLSharedEvent_id"], "MTLSharedEvent_id", "void*"),
    // VK_NV_external_sci_sync
    (&["NvSciBufObj"], "NvSciBufObj", "int"),
    (&["NvSciSyncObj"], "NvSciSyncObj", "int"),
    (&["NvSciSyncFence"], "NvSciSyncFence", "int"),
    (&["NvSciBufAttrList"], "NvSciBufAttrList", "int"),
    (&["NvSciSyncAttrList"], "NvSciSyncAttrList", "int"),
    // VK_OHOS_surface
    (&["OHNativeWindow"], "OHNativeWindow", "void*"),
    // VK_EXT_directfb_surface
    (&["IDirectFB"], "IDirectFB", "int"),
    (&["IDirectFBSurface"], "IDirectFBSurface", "int"),
];

/// Base types replaced outright.
pub const TYPE_SUBSTITUTIONS: &[(&str, &str)] = &[("DWORD", "uint32_t")];

/// Type used for the `#define` of a constant, overriding the registry type.
pub const DEFINITIONS: &[(&str, &str)] = &[
    ("VK_MAX_PHYSICAL_DEVICE_NAME_SIZE", "size_t"),
    ("VK_MAX_EXTENSION_NAME_SIZE", "size_t"),
    ("VK_MAX_DRIVER_NAME_SIZE", "size_t"),
    ("VK_MAX_DRIVER_INFO_SIZE", "size_t"),
    ("VK_UUID_SIZE", "size_t"),
    ("VK_LUID_SIZE", "size_t"),
    ("VK_MAX_MEMORY_TYPES", "size_t"),
    ("VK_MAX_MEMORY_HEAPS", "size_t"),
    ("VK_MAX_DESCRIPTION_SIZE", "size_t"),
    ("VK_MAX_DEVICE_GROUP_SIZE", "size_t"),
    ("VK_ATTACHMENT_UNUSED", "uint32_t"),
    ("VK_SUBPASS_EXTERNAL", "uint32_t"),
    ("VK_QUEUE_FAMILY_IGNORED", "uint32_t"),
    ("VK_QUEUE_FAMILY_EXTERNAL", "uint32_t"),
    ("VK_REMAINING_MIP_LEVELS", "uint32_t"),
    ("VK_REMAINING_ARRAY_LAYERS", "uint32_t"),
    ("VK_WHOLE_SIZE", "vk::VkDeviceSize"),
    ("VK_TRUE", "vk::VkBool32"),
    ("VK_FALSE", "vk::VkBool32"),
];

/// Vendor and KHR suffixes split off enum prefixes.
pub const EXTENSION_POSTFIXES: &[&str] = &[
    "KHR", "EXT", "AMD", "ARM", "NV", "INTEL", "NVX", "KHX", "NN", "MVK", "FUCHSIA", "QCOM", "GGP",
    "QNX", "ANDROID", "VALVE", "HUAWEI", "IMG",
];

/// Extensions whose promotion to core is only partial.
pub const PARTIALLY_PROMOTED_EXTENSIONS: &[&str] = &[
    "VK_EXT_extended_dynamic_state",
    "VK_EXT_extended_dynamic_state2",
    "VK_EXT_texel_buffer_alignment",
    "VK_EXT_ycbcr_2plane_444_formats",
    "VK_EXT_4444_formats",
];

const EXTENSIONS_TESTED_BY_CTS: &str = include_str!("../data/extensions_tested_by_cts.txt");

/// KHR and EXT extensions whose mandatory features the CTS checks.
pub fn extensions_tested_by_cts() -> impl Iterator<Item = &'static str> {
    EXTENSIONS_TESTED_BY_CTS
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
}

pub fn definition_type(constant: &str) -> Option<&'static str> {
    DEFINITIONS
        .iter()
        .find(|(name, _)| *name == constant)
        .map(|(_, ty)| *ty)
}
