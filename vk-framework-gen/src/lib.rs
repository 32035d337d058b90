//! Emits the C++ inline fragments of the Vulkan CTS framework from an
//! [`Api`] model.
//!
//! Every output file has one generator, a pure function of the model. [`run`]
//! renders all of them for a variant and writes the files that changed.

use std::{error, fmt, io, path::Path};

use log::{debug, info};
use vk_registry::{Api, FunctionKind};

pub mod basic_types;
pub mod ext_deps;
pub mod extensions;
pub mod functions;
pub mod handles;
pub mod mandatory;
pub mod names;
pub mod platform;
pub mod ref_util;
pub mod str_util;
pub mod structs;
pub mod writer;

pub use writer::{indent_lines, write_if_changed, Inl, INL_HEADER};

#[derive(Debug)]
pub enum GenError {
    Io(io::Error),
    Registry(vk_registry::FatalError),
    Metadata(vk_registry::MetadataError),
    Ron(ron::Error),
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenError::Io(e) => write!(f, "i/o error: {}", e),
            GenError::Registry(e) => write!(f, "registry error: {}", e),
            GenError::Metadata(e) => write!(f, "extension metadata error: {}", e),
            GenError::Ron(e) => write!(f, "RON error: {}", e),
        }
    }
}

impl error::Error for GenError {}

impl From<io::Error> for GenError {
    fn from(e: io::Error) -> Self {
        GenError::Io(e)
    }
}

impl From<vk_registry::FatalError> for GenError {
    fn from(e: vk_registry::FatalError) -> Self {
        GenError::Registry(e)
    }
}

impl From<vk_registry::MetadataError> for GenError {
    fn from(e: vk_registry::MetadataError) -> Self {
        GenError::Metadata(e)
    }
}

impl From<ron::Error> for GenError {
    fn from(e: ron::Error) -> Self {
        GenError::Ron(e)
    }
}

/// One output file and the function rendering it.
pub struct Generator {
    pub file_name: &'static str,
    generate: Box<dyn Fn(&Api) -> String>,
}

impl Generator {
    fn new<F>(file_name: &'static str, generate: F) -> Self
    where
        F: Fn(&Api) -> String + 'static,
    {
        Generator {
            file_name,
            generate: Box::new(generate),
        }
    }

    pub fn generate(&self, api: &Api) -> String {
        (self.generate)(api)
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("file_name", &self.file_name)
            .finish()
    }
}

/// All generators, in output order. Both variants produce the same files.
pub fn generators() -> Vec<Generator> {
    use FunctionKind::{Device, Instance, Platform};
    vec![
        Generator::new("vkBasicTypes.inl", basic_types::generate),
        Generator::new("vkHandleType.inl", handles::generate_handle_type),
        Generator::new("vkObjTypeImpl.inl", handles::generate_obj_type_impl),
        Generator::new("vkStructTypes.inl", structs::generate_struct_types),
        Generator::new("vkGetStructureTypeImpl.inl", structs::generate_get_structure_type_impl),
        Generator::new("vkStructTypesC.inl", structs::generate_struct_types_c),
        Generator::new("vkVirtualPlatformInterface.inl", |api| functions::generate_interface(api, Platform, false)),
        Generator::new("vkVirtualInstanceInterface.inl", |api| functions::generate_interface(api, Instance, false)),
        Generator::new("vkVirtualDeviceInterface.inl", |api| functions::generate_interface(api, Device, false)),
        Generator::new("vkConcretePlatformInterface.inl", |api| functions::generate_interface(api, Platform, true)),
        Generator::new("vkConcreteInstanceInterface.inl", |api| functions::generate_interface(api, Instance, true)),
        Generator::new("vkConcreteDeviceInterface.inl", |api| functions::generate_interface(api, Device, true)),
        Generator::new("vkFunctionPointerTypes.inl", functions::generate_function_pointer_types),
        Generator::new("vkPlatformFunctionPointers.inl", |api| functions::generate_function_pointers(api, Platform)),
        Generator::new("vkInstanceFunctionPointers.inl", |api| functions::generate_function_pointers(api, Instance)),
        Generator::new("vkDeviceFunctionPointers.inl", |api| functions::generate_function_pointers(api, Device)),
        Generator::new("vkInitPlatformFunctionPointers.inl", |api| {
            functions::generate_init_function_pointers(api, Platform)
        }),
        Generator::new("vkInitInstanceFunctionPointers.inl", |api| {
            functions::generate_init_function_pointers(api, Instance)
        }),
        Generator::new("vkInitDeviceFunctionPointers.inl", |api| {
            functions::generate_init_function_pointers(api, Device)
        }),
        Generator::new("vkPlatformDriverImpl.inl", |api| functions::generate_driver_impl(api, Platform)),
        Generator::new("vkInstanceDriverImpl.inl", |api| functions::generate_driver_impl(api, Instance)),
        Generator::new("vkDeviceDriverImpl.inl", |api| functions::generate_driver_impl(api, Device)),
        Generator::new("vkStrUtil.inl", str_util::generate_proto),
        Generator::new("vkStrUtilImpl.inl", str_util::generate_impl),
        Generator::new("vkRefUtil.inl", ref_util::generate_proto),
        Generator::new("vkRefUtilImpl.inl", ref_util::generate_impl),
        Generator::new("vkSupportedExtensions.inl", extensions::generate_supported_extensions),
        Generator::new("vkInstanceExtensions.inl", |api| extensions::generate_extension_list(api, false)),
        Generator::new("vkDeviceExtensions.inl", |api| extensions::generate_extension_list(api, true)),
        Generator::new("vkExtensionFunctions.inl", extensions::generate_extension_functions),
        Generator::new("vkCoreFunctionalities.inl", extensions::generate_core_functionalities),
        Generator::new("vkEntryPointValidation.inl", extensions::generate_entry_point_validation),
        Generator::new("vkKnownDriverIds.inl", extensions::generate_known_driver_ids),
        Generator::new("vkApiExtensionDependencyInfo.inl", ext_deps::generate),
        Generator::new("vkMandatoryFeatures.inl", mandatory::generate),
    ]
}

/// What [`run`] did with the output files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Report {
    pub written: usize,
    pub unchanged: usize,
}

/// Renders every file for `api` into `outdir`, leaving files whose content
/// is already current untouched.
pub fn run(api: &Api, outdir: &Path) -> Result<Report, GenError> {
    let mut report = Report::default();
    for generator in generators() {
        info!("Generating {}", generator.file_name);
        let text = generator.generate(api);
        if write_if_changed(&outdir.join(generator.file_name), &text)? {
            report.written += 1;
        } else {
            debug!("{} is up to date", generator.file_name);
            report.unchanged += 1;
        }
    }
    Ok(report)
}
