use std::path::{Path, PathBuf};

use vk_registry::{load_metadata_dir, parse_metadata, Api, ApiVariant, ExtensionKind, MetadataError};

const VK_MINI: &str = include_str!("data/vk_mini.xml");

const SWAPCHAIN_JSON: &str = r#"{
    "register_extension": { "type": "device", "core": "1.1.0" },
    "mandatory_features": {
        "VkPhysicalDeviceFeatures": [
            { "features": ["robustBufferAccess", "sparseBinding"], "requirements": ["VK_KHR_swapchain"] }
        ]
    }
}"#;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("vk-registry-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn parses_register_and_features() {
    let m = parse_metadata("VK_KHR_swapchain", SWAPCHAIN_JSON, Path::new("VK_KHR_swapchain.json")).unwrap();
    assert_eq!(m.kind, Some(ExtensionKind::Device));
    assert_eq!(m.core, Some((1, 1)));
    assert_eq!(m.mandatory_features.len(), 2);
    assert_eq!(m.mandatory_features[1].struct_name, "VkPhysicalDeviceFeatures");
    assert_eq!(m.mandatory_features[1].feature, "sparseBinding");
    assert_eq!(m.mandatory_features[1].depends.as_deref(), Some("VK_KHR_swapchain"));
}

#[test]
fn rejects_bad_documents() {
    let path = Path::new("x.json");
    assert!(matches!(
        parse_metadata("x", "{ not json", path),
        Err(MetadataError::Json { .. })
    ));
    assert!(matches!(
        parse_metadata("x", "[]", path),
        Err(MetadataError::Format { .. })
    ));
    assert!(matches!(
        parse_metadata("x", r#"{"register_extension": {"type": "weird"}}"#, path),
        Err(MetadataError::Format { .. })
    ));
}

#[test]
fn merges_directory_into_model() {
    let dir = scratch_dir("merge");
    std::fs::write(dir.join("VK_KHR_swapchain.json"), SWAPCHAIN_JSON).unwrap();
    std::fs::write(
        dir.join("VK_KHR_surface.json"),
        r#"{"register_extension": {"type": "instance", "core": "1.4.0"}}"#,
    )
    .unwrap();
    std::fs::write(dir.join("VK_KHR_unknown.json"), "{}").unwrap();
    std::fs::write(dir.join("README.txt"), "not metadata").unwrap();

    let metadata = load_metadata_dir(&dir).unwrap();
    let names: Vec<&str> = metadata.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["VK_KHR_surface", "VK_KHR_swapchain", "VK_KHR_unknown"]);

    let (registry, errors) = vk_registry::parse_stream(VK_MINI.as_bytes()).unwrap();
    if !errors.is_empty() {
        panic!("{:?}", errors);
    }
    let mut api = Api::build(&registry, ApiVariant::Vulkan);
    api.post_process(&metadata);

    let swapchain = api.extension("VK_KHR_swapchain").unwrap();
    assert_eq!(swapchain.promoted_to.as_deref(), Some("VK_VERSION_1_1"));
    assert_eq!(swapchain.feature_requirements.len(), 2);

    let surface = api.extension("VK_KHR_surface").unwrap();
    assert_eq!(surface.promoted_to.as_deref(), Some("VK_VERSION_1_4"));

    let props2 = api.extension("VK_KHR_get_physical_device_properties2").unwrap();
    assert_eq!(props2.promoted_to.as_deref(), Some("VK_VERSION_1_1"));

    let _ = std::fs::remove_dir_all(&dir);
}
