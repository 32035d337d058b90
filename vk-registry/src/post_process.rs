//! Cleanup applied to a freshly built model before any code is emitted.
//!
//! The Vulkan SC registry does not describe the SC API exactly as CTS needs
//! it, so a few fixups are applied by name.

use log::{debug, warn};

use crate::api::{lookup_mut, Api, ApiVariant, EnumValue, Named};
use crate::builder::HasAliases;
use crate::metadata::ExtensionMetadata;

/// Promoted commands that SC only exposes with a `KHR` suffix.
const SC_KHR_COMMANDS: &[&str] = &[
    // VK_KHR_copy_commands2
    "vkCmdBlitImage2",
    "vkCmdCopyBuffer2",
    "vkCmdCopyBufferToImage2",
    "vkCmdCopyImage2",
    "vkCmdCopyImageToBuffer2",
    "vkCmdResolveImage2",
    // VK_KHR_synchronization2
    "vkCmdPipelineBarrier2",
    "vkCmdResetEvent2",
    "vkCmdSetEvent2",
    "vkCmdWaitEvents2",
    "vkCmdWriteTimestamp2",
    "vkQueueSubmit2",
];

/// Promoted commands that SC only exposes with an `EXT` suffix.
const SC_EXT_COMMANDS: &[&str] = &[
    // VK_EXT_extended_dynamic_state
    "vkCmdBindVertexBuffers2",
    "vkCmdSetCullMode",
    "vkCmdSetDepthBoundsTestEnable",
    "vkCmdSetDepthCompareOp",
    "vkCmdSetDepthTestEnable",
    "vkCmdSetDepthWriteEnable",
    "vkCmdSetFrontFace",
    "vkCmdSetPrimitiveTopology",
    "vkCmdSetScissorWithCount",
    "vkCmdSetStencilOp",
    "vkCmdSetStencilTestEnable",
    "vkCmdSetViewportWithCount",
    // VK_EXT_extended_dynamic_state2
    "vkCmdSetDepthBiasEnable",
    "vkCmdSetLogicOp",
    "vkCmdSetPatchControlPoints",
    "vkCmdSetPrimitiveRestartEnable",
    "vkCmdSetRasterizerDiscardEnable",
    // VK_EXT_line_rasterization
    "vkCmdSetLineStipple",
];

const SC_UNSUPPORTED_COMMANDS: &[&str] = &[
    "vkGetDeviceImageSparseMemoryRequirements",
    "vkCreatePrivateDataSlot",
    "vkDestroyPrivateDataSlot",
    "vkGetPrivateData",
    "vkSetPrivateData",
];

const SC_UNSUPPORTED_HANDLES: &[&str] = &["VkPrivateDataSlot"];

/// Types that SC names with a `KHR` suffix.
const SC_KHR_TYPES: &[&str] = &[
    // VK_KHR_global_priority
    "VkQueueGlobalPriority",
    // VK_KHR_vertex_attribute_divisor
    "VkVertexInputBindingDivisorDescription",
    "VkPhysicalDeviceVertexAttributeDivisorFeatures",
    "VkPhysicalDeviceVertexAttributeDivisorProperties",
    "VkPipelineVertexInputDivisorStateCreateInfo",
];

/// Legacy struct names SC headers still provide.
const SC_STRUCT_ALIASES: &[(&str, &str)] = &[
    ("VkPhysicalDeviceVariablePointersFeatures", "VkPhysicalDeviceVariablePointerFeatures"),
    ("VkPhysicalDeviceShaderDrawParametersFeatures", "VkPhysicalDeviceShaderDrawParameterFeatures"),
];

/// `VkStructureType` values CTS uses for SC that the SC registry lacks.
const SC_EXTRA_STRUCTURE_TYPES: &[(&str, i64)] = &[
    ("VK_STRUCTURE_TYPE_QUEUE_FAMILY_CHECKPOINT_PROPERTIES_2_NV", 1000314008),
    ("VK_STRUCTURE_TYPE_SHADER_MODULE_CREATE_INFO", 16),
];

fn add_alias<T: HasAliases + Named>(item: &mut T, alias: &str) {
    if !item.is_named(alias) {
        item.aliases_mut().push(alias.to_string());
    }
}

impl Api {
    /// Applies the per-variant fixups and merges extension `metadata`. Call
    /// once, right after [`Api::build`]; the model is not changed afterwards.
    pub fn post_process(&mut self, metadata: &[ExtensionMetadata]) {
        if self.variant == ApiVariant::VulkanSc {
            self.post_process_sc();
        }
        self.merge_metadata(metadata);
    }

    fn post_process_sc(&mut self) {
        for (list, postfix) in [(SC_KHR_COMMANDS, "KHR"), (SC_EXT_COMMANDS, "EXT")] {
            for name in list {
                if let Some(f) = self.functions.iter_mut().find(|f| f.name == *name) {
                    let new_name = format!("{}{}", name, postfix);
                    debug!("renaming {} to {}", f.name, new_name);
                    f.aliases.retain(|a| *a != new_name);
                    f.name = new_name;
                }
            }
        }

        self.functions
            .retain(|f| !SC_UNSUPPORTED_COMMANDS.contains(&f.name.as_str()));
        self.handles
            .retain(|h| !SC_UNSUPPORTED_HANDLES.contains(&h.name.as_str()));

        for c in &mut self.composites {
            if SC_KHR_TYPES.contains(&c.name.as_str()) {
                let alias = format!("{}KHR", c.name);
                add_alias(c, &alias);
            }
        }
        for e in &mut self.enums {
            if SC_KHR_TYPES.contains(&e.name.as_str()) {
                let alias = format!("{}KHR", e.name);
                add_alias(e, &alias);
            }
        }
        for (name, alias) in SC_STRUCT_ALIASES {
            if let Some(c) = lookup_mut(&mut self.composites, name) {
                add_alias(c, alias);
            }
        }

        match lookup_mut(&mut self.enums, "VkStructureType") {
            Some(structure_type) => {
                for (name, value) in SC_EXTRA_STRUCTURE_TYPES {
                    if !structure_type.values.iter().any(|v| v.is_named(name)) {
                        structure_type.values.push(EnumValue {
                            name: name.to_string(),
                            aliases: Vec::new(),
                            value: *value,
                            text: value.to_string(),
                        });
                    }
                }
            }
            None => warn!("VkStructureType missing from the vulkansc model"),
        }
    }
}
