use vk_registry::{
    Command, EnumSpec, EnumsChild, Error, ExtensionChild, InterfaceItem, RegistryChild, TypeSpec,
    TypesChild,
};

const VK_MINI: &str = include_str!("data/vk_mini.xml");

fn parse(xml: &str) -> (vk_registry::Registry, Vec<Error>) {
    vk_registry::parse_stream(xml.as_bytes()).unwrap()
}

#[test]
fn test_mini_registry() {
    let (registry, errors) = parse(VK_MINI);
    if !errors.is_empty() {
        panic!("{:?}", errors);
    }

    let kinds: Vec<&str> = registry
        .0
        .iter()
        .map(|c| match c {
            RegistryChild::Comment(_) => "comment",
            RegistryChild::Types(_) => "types",
            RegistryChild::Enums(_) => "enums",
            RegistryChild::Commands(_) => "commands",
            RegistryChild::Feature(_) => "feature",
            RegistryChild::Extensions(_) => "extensions",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds[..3], ["comment", "types", "enums"]);
    assert_eq!(kinds.iter().filter(|k| **k == "feature").count(), 4);
    assert_eq!(kinds.last(), Some(&"extensions"));
}

#[test]
fn test_type_markup() {
    let (registry, errors) = parse(VK_MINI);
    if !errors.is_empty() {
        panic!("{:?}", errors);
    }
    let types = registry
        .0
        .iter()
        .find_map(|c| match c {
            RegistryChild::Types(t) => Some(t),
            _ => None,
        })
        .unwrap();

    let instance = types
        .children
        .iter()
        .find_map(|c| match c {
            TypesChild::Type(t) if t.objtypeenum.as_deref() == Some("VK_OBJECT_TYPE_INSTANCE") => Some(t),
            _ => None,
        })
        .unwrap();
    match &instance.spec {
        TypeSpec::Code(code) => assert_eq!(code.code, "VK_DEFINE_HANDLE(VkInstance)"),
        other => panic!("{:?}", other),
    }

    let props = types
        .children
        .iter()
        .find_map(|c| match c {
            TypesChild::Type(t) if t.name.as_deref() == Some("VkPhysicalDeviceProperties") => Some(t),
            _ => None,
        })
        .unwrap();
    match &props.spec {
        TypeSpec::Members(members) => assert_eq!(members.len(), 3),
        other => panic!("{:?}", other),
    }
}

#[test]
fn test_command_code() {
    let (registry, errors) = parse(VK_MINI);
    if !errors.is_empty() {
        panic!("{:?}", errors);
    }
    let commands = registry
        .0
        .iter()
        .find_map(|c| match c {
            RegistryChild::Commands(c) => Some(c),
            _ => None,
        })
        .unwrap();

    let mut aliases = 0;
    for command in &commands.children {
        match command {
            Command::Alias { .. } => aliases += 1,
            Command::Definition(def) if def.proto.name == "vkGetDeviceQueue" => {
                assert_eq!(
                    def.code,
                    "void vkGetDeviceQueue (VkDevice device, uint32_t queueFamilyIndex, uint32_t queueIndex, VkQueue* pQueue);"
                );
                assert_eq!(def.params[3].definition.type_name.as_deref(), Some("VkQueue"));
            }
            _ => {}
        }
    }
    assert_eq!(aliases, 2);
}

#[test]
fn test_extension_items() {
    let (registry, errors) = parse(VK_MINI);
    if !errors.is_empty() {
        panic!("{:?}", errors);
    }
    let swapchain = registry
        .0
        .iter()
        .filter_map(|c| match c {
            RegistryChild::Extensions(e) => Some(e),
            _ => None,
        })
        .flat_map(|e| e.children.iter())
        .find(|e| e.name == "VK_KHR_swapchain")
        .unwrap();
    assert_eq!(swapchain.number, Some(2));
    assert_eq!(swapchain.depends.as_deref(), Some("VK_KHR_surface"));

    let mut offsets = Vec::new();
    for child in &swapchain.children {
        if let ExtensionChild::Require { items, .. } = child {
            for item in items {
                if let InterfaceItem::Enum(e) = item {
                    if let EnumSpec::Offset { offset, dir, .. } = e.spec {
                        offsets.push((offset, dir));
                    }
                }
            }
        }
    }
    assert_eq!(offsets, [(0, true), (7, true)]);
}

#[test]
fn test_enum_specs() {
    let (registry, errors) = parse(VK_MINI);
    if !errors.is_empty() {
        panic!("{:?}", errors);
    }
    let access = registry
        .0
        .iter()
        .find_map(|c| match c {
            RegistryChild::Enums(e) if e.name.as_deref() == Some("VkAccessFlagBits2") => Some(e),
            _ => None,
        })
        .unwrap();
    assert_eq!(access.bitwidth, Some(64));
    assert_eq!(access.kind.as_deref(), Some("bitmask"));
    let specs: Vec<&EnumSpec> = access
        .children
        .iter()
        .filter_map(|c| match c {
            EnumsChild::Enum(e) => Some(&e.spec),
            _ => None,
        })
        .collect();
    assert!(matches!(specs[0], EnumSpec::Value { value, .. } if value == "0"));
    assert!(matches!(specs[2], EnumSpec::Bitpos { bitpos: 33, .. }));
    assert!(matches!(specs[3], EnumSpec::Alias { alias, .. } if alias == "VK_ACCESS_2_NONE"));
}

#[test]
fn test_recoverable_errors() {
    let xml = r#"<registry>
        <types>
            <type category="struct" name="VkBroken" frobnicate="yes">
                <member><type>uint32_t</type></member>
            </type>
        </types>
        <enums name="VkResult" type="enum">
            <enum value="0" bitpos="1" name="VK_SUCCESS"/>
            <enum offset="zz" extends="VkResult" name="VK_BAD"/>
        </enums>
    </registry>"#;
    let (registry, errors) = parse(xml);
    assert_eq!(registry.0.len(), 2);

    assert!(errors.iter().any(|e| matches!(
        e,
        Error::UnexpectedAttribute { name, .. } if name == "frobnicate"
    )));
    assert!(errors.iter().any(|e| matches!(
        e,
        Error::MissingElement { xpath, name } if name == "name" && xpath.ends_with("/types/type")
    )));
    assert_eq!(
        errors
            .iter()
            .filter(|e| matches!(e, Error::SchemaViolation { .. }))
            .count(),
        2
    );
}

#[test]
fn test_missing_registry_is_fatal() {
    let result = vk_registry::parse_stream("<notaregistry/>".as_bytes());
    assert!(matches!(result, Err(vk_registry::FatalError::MissingRegistryElement)));
}
