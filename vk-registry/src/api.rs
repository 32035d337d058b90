//! Cross-referenced API model built from a [`Registry`](crate::Registry).
//!
//! An [`Api`] is produced once per target variant by [`Api::build`], cleaned up
//! by the post-processing pass and only read afterwards.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serialize")]
use crate::types::is_default;

/// API variant a model is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ApiVariant {
    Vulkan,
    VulkanSc,
}

impl ApiVariant {
    /// Name used in the registry `api` and `supported` attributes.
    pub fn as_str(self) -> &'static str {
        match self {
            ApiVariant::Vulkan => "vulkan",
            ApiVariant::VulkanSc => "vulkansc",
        }
    }

    /// Returns whether a comma separated `api`/`supported` attribute names this
    /// variant. A missing attribute applies to every variant.
    pub fn matches(self, attribute: Option<&str>) -> bool {
        match attribute {
            None => true,
            Some(list) => list.split(',').any(|api| api.trim() == self.as_str()),
        }
    }
}

impl Default for ApiVariant {
    fn default() -> Self {
        ApiVariant::Vulkan
    }
}

impl fmt::Display for ApiVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownApiVariant(pub String);

impl fmt::Display for UnknownApiVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown API variant '{}', expected 'vulkan' or 'vulkansc'", self.0)
    }
}

impl std::error::Error for UnknownApiVariant {}

impl FromStr for ApiVariant {
    type Err = UnknownApiVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "vulkan" => Ok(ApiVariant::Vulkan),
            "SC" | "sc" | "vulkansc" => Ok(ApiVariant::VulkanSc),
            _ => Err(UnknownApiVariant(s.to_string())),
        }
    }
}

/// Entities that can be looked up by their canonical name or an alias.
pub trait Named {
    fn name(&self) -> &str;
    fn aliases(&self) -> &[String];

    fn is_named(&self, name: &str) -> bool {
        self.name() == name || self.aliases().iter().any(|a| a == name)
    }
}

macro_rules! impl_named {
    ($($t:ty),+) => {
        $(
            impl Named for $t {
                fn name(&self) -> &str {
                    &self.name
                }

                fn aliases(&self) -> &[String] {
                    &self.aliases
                }
            }
        )+
    };
}

impl_named!(Handle, EnumType, Bitmask, Flags, Constant, Composite, Function, EnumValue);

/// Finds an entity by canonical name or alias.
pub fn lookup<'a, T: Named>(items: &'a [T], name: &str) -> Option<&'a T> {
    items.iter().find(|i| i.is_named(name))
}

pub(crate) fn lookup_mut<'a, T: Named>(items: &'a mut [T], name: &str) -> Option<&'a mut T> {
    items.iter_mut().find(|i| i.is_named(name))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Handle {
    pub name: String,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub aliases: Vec<String>,

    pub dispatchable: bool,

    /// `VkObjectType` enumerator of this handle.
    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub object_type: Option<String>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct EnumValue {
    pub name: String,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub aliases: Vec<String>,

    pub value: i64,

    /// Value as it should be printed, e.g. `0x00000004` for bitmask flags.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct EnumType {
    pub name: String,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub aliases: Vec<String>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub values: Vec<EnumValue>,
}

impl EnumType {
    /// Values sorted by numeric value, ties keep registry order.
    pub fn sorted_values(&self) -> Vec<&EnumValue> {
        let mut values: Vec<&EnumValue> = self.values.iter().collect();
        values.sort_by_key(|v| v.value);
        values
    }

    /// An enum is linear when its values are exactly `0..n`.
    pub fn is_linear(&self) -> bool {
        let values = self.sorted_values();
        !values.is_empty() && values.iter().enumerate().all(|(i, v)| v.value == i as i64)
    }
}

/// `FlagBits` enumeration backing a `Flags` typedef.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Bitmask {
    pub name: String,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub aliases: Vec<String>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub flags_name: Option<String>,

    pub bit_width: u32,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Flags {
    pub name: String,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub aliases: Vec<String>,

    pub bit_width: u32,

    /// Name of the `FlagBits` enumeration, when the flags have defined bits.
    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub bits: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Constant {
    pub name: String,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub aliases: Vec<String>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub type_name: Option<String>,

    pub value: String,
}

/// Struct member or command parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Member {
    pub name: String,

    /// Base type without qualifiers, e.g. `VkAllocationCallbacks`.
    pub type_name: String,

    /// Type as declared, e.g. `const VkAllocationCallbacks*`.
    pub full_type: String,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub pointer: u32,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub is_const: bool,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub arrays: Vec<String>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub bitfield_width: Option<u32>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub optional: bool,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub limit_type: Option<String>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub len: Option<String>,

    /// Fixed value of the member, used for `sType`.
    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub values: Option<String>,
}

pub type Param = Member;

/// Struct or union.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Composite {
    pub name: String,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub aliases: Vec<String>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub is_union: bool,

    pub members: Vec<Member>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub s_type: Option<String>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub extends: Vec<String>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub returned_only: bool,

    /// First API version requiring this type.
    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub version: Option<String>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum FunctionKind {
    Platform,
    Instance,
    Device,
}

impl FunctionKind {
    pub const ALL: [FunctionKind; 3] = [
        FunctionKind::Platform,
        FunctionKind::Instance,
        FunctionKind::Device,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FunctionKind::Platform => "Platform",
            FunctionKind::Instance => "Instance",
            FunctionKind::Device => "Device",
        }
    }
}

impl Default for FunctionKind {
    fn default() -> Self {
        FunctionKind::Instance
    }
}

/// Commands that take a dispatchable instance-level handle but are loaded
/// without one.
const PLATFORM_FUNCTIONS: &[&str] = &[
    "vkCreateInstance",
    "vkGetInstanceProcAddr",
    "vkEnumerateInstanceVersion",
    "vkEnumerateInstanceLayerProperties",
    "vkEnumerateInstanceExtensionProperties",
    "vkGetExternalComputeQueueDataNV",
];

const DEVICE_HANDLES: &[&str] = &[
    "VkDevice",
    "VkQueue",
    "VkCommandBuffer",
    "VkExternalComputeQueueNV",
];

impl FunctionKind {
    /// Classifies a command from its name and the type of its first parameter.
    pub fn classify(name: &str, first_param_type: Option<&str>) -> FunctionKind {
        if PLATFORM_FUNCTIONS.contains(&name) {
            FunctionKind::Platform
        } else if first_param_type.map_or(false, |t| DEVICE_HANDLES.contains(&t)) {
            FunctionKind::Device
        } else {
            FunctionKind::Instance
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Function {
    pub name: String,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub aliases: Vec<String>,

    pub return_type: String,

    pub params: Vec<Param>,

    pub kind: FunctionKind,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub version: Option<String>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub extensions: Vec<String>,
}

/// A feature bit that must be supported, e.g. `VkPhysicalDeviceFeatures::robustBufferAccess`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct FeatureRequirement {
    pub struct_name: String,

    pub feature: String,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub depends: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Version {
    /// `VK_VERSION_1_2`
    pub name: String,

    /// `VK_API_VERSION_1_2`
    pub api_name: String,

    pub major: u32,

    pub minor: u32,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub requirements: Vec<FeatureRequirement>,
}

impl Version {
    /// Parses the major and minor numbers out of a `VK_VERSION_X_Y` style name.
    pub fn numbers_from_name(name: &str) -> Option<(u32, u32)> {
        let rest = &name[name.find("_VERSION_")? + "_VERSION_".len()..];
        let mut parts = rest.split('_');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        Some((major, minor))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ExtensionKind {
    Instance,
    Device,
}

impl ExtensionKind {
    pub fn parse(text: &str) -> Option<ExtensionKind> {
        match text {
            "instance" => Some(ExtensionKind::Instance),
            "device" => Some(ExtensionKind::Device),
            _ => None,
        }
    }
}

/// One `<require>` block of an extension.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ExtensionRequire {
    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub depends: Option<String>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub commands: Vec<String>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Extension {
    pub name: String,

    pub number: i64,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub kind: Option<ExtensionKind>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub depends: Option<String>,

    /// Version (`VK_VERSION_1_1`) or extension the extension was promoted to.
    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub promoted_to: Option<String>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub deprecated_by: Option<String>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub obsoleted_by: Option<String>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub platform: Option<String>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub provisional: bool,

    /// `VK_KHR_SWAPCHAIN_EXTENSION_NAME`
    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub name_define: Option<String>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub spec_version: Option<u32>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub requires: Vec<ExtensionRequire>,

    #[cfg_attr(
        feature = "serialize",
        serde(default, skip_serializing_if = "is_default")
    )]
    pub feature_requirements: Vec<FeatureRequirement>,
}

impl Extension {
    pub fn is_device(&self) -> bool {
        self.kind == Some(ExtensionKind::Device)
    }

    /// All commands required by any of the `<require>` blocks, without duplicates.
    pub fn commands(&self) -> Vec<&str> {
        let mut commands: Vec<&str> = Vec::new();
        for r in &self.requires {
            for c in &r.commands {
                if !commands.contains(&c.as_str()) {
                    commands.push(c);
                }
            }
        }
        commands
    }
}

/// The whole API surface of one variant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Api {
    pub variant: ApiVariant,
    pub handles: Vec<Handle>,
    pub enums: Vec<EnumType>,
    pub bitmasks: Vec<Bitmask>,
    pub flags: Vec<Flags>,
    pub constants: Vec<Constant>,
    pub composites: Vec<Composite>,
    pub functions: Vec<Function>,
    pub versions: Vec<Version>,
    pub extensions: Vec<Extension>,
}

impl Api {
    pub fn handle(&self, name: &str) -> Option<&Handle> {
        lookup(&self.handles, name)
    }

    pub fn enum_type(&self, name: &str) -> Option<&EnumType> {
        lookup(&self.enums, name)
    }

    pub fn bitmask(&self, name: &str) -> Option<&Bitmask> {
        lookup(&self.bitmasks, name)
    }

    pub fn composite(&self, name: &str) -> Option<&Composite> {
        lookup(&self.composites, name)
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        lookup(&self.functions, name)
    }

    pub fn extension(&self, name: &str) -> Option<&Extension> {
        self.extensions.iter().find(|e| e.name == name)
    }

    pub fn version(&self, name: &str) -> Option<&Version> {
        self.versions.iter().find(|v| v.name == name)
    }

    pub fn structs(&self) -> impl Iterator<Item = &Composite> {
        self.composites.iter().filter(|c| !c.is_union)
    }

    pub fn functions_of_kind(&self, kind: FunctionKind) -> impl Iterator<Item = &Function> {
        self.functions.iter().filter(move |f| f.kind == kind)
    }

    /// Canonical name for `name`, which may be an alias of any kind of entity.
    pub fn canonical_name<'a>(&'a self, name: &'a str) -> &'a str {
        fn find<'a, T: Named>(items: &'a [T], name: &str) -> Option<&'a str> {
            lookup(items, name).map(|i| i.name())
        }
        find(&self.handles, name)
            .or_else(|| find(&self.enums, name))
            .or_else(|| find(&self.bitmasks, name))
            .or_else(|| find(&self.flags, name))
            .or_else(|| find(&self.composites, name))
            .or_else(|| find(&self.functions, name))
            .unwrap_or(name)
    }
}
