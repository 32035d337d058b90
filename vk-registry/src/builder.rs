use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::api::*;
use crate::c_decl::{parse_declaration, CDecl};
use crate::parse::parse_registry_integer;
use crate::types::{
    self, Command, Enum, EnumSpec, Enums, EnumsChild, ExtensionChild, Feature, InterfaceItem,
    Registry, RegistryChild, Type, TypeCodeMarkup, TypeMember, TypeMemberMarkup, TypeSpec,
    TypesChild,
};

const EXTENSION_ENUM_BASE: i64 = 1_000_000_000;
const EXTENSION_ENUM_BLOCK_SIZE: i64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
enum AliasKind {
    Type,
    Command,
    /// Enumerator of the enum or bitmask named by the parent.
    Value(String),
    Constant,
}

/// Alias whose target was not known when it was read.
#[derive(Debug, Clone)]
struct PendingAlias {
    kind: AliasKind,
    name: String,
    target: String,
}

struct Builder {
    variant: ApiVariant,
    api: Api,
    enum_type_names: Vec<String>,
    fixups: Vec<PendingAlias>,
    required: HashSet<String>,
    removed: HashSet<String>,
    introduced_in: HashMap<String, String>,
    required_by: HashMap<String, Vec<String>>,
}

impl Api {
    /// Builds the model of `variant` from a parsed registry.
    ///
    /// Aliases are attached to their canonical definitions; aliases whose
    /// target never shows up are dropped with a warning. Entities no
    /// supported version or extension requires are left out.
    pub fn build(registry: &Registry, variant: ApiVariant) -> Api {
        let mut b = Builder {
            variant,
            api: Api {
                variant,
                ..Api::default()
            },
            enum_type_names: Vec::new(),
            fixups: Vec::new(),
            required: HashSet::new(),
            removed: HashSet::new(),
            introduced_in: HashMap::new(),
            required_by: HashMap::new(),
        };

        let mut features = Vec::new();
        let mut extensions = Vec::new();
        for child in &registry.0 {
            match child {
                RegistryChild::Types(types) => {
                    for t in &types.children {
                        if let TypesChild::Type(t) = t {
                            b.add_type(t);
                        }
                    }
                }
                RegistryChild::Enums(enums) => b.add_enums(enums),
                RegistryChild::Commands(commands) => {
                    for c in &commands.children {
                        b.add_command(c);
                    }
                }
                RegistryChild::Feature(f) => features.push(f),
                RegistryChild::Extensions(e) => extensions.extend(e.children.iter()),
                RegistryChild::Comment(_) => {}
            }
        }
        b.add_missing_enum_types();
        b.resolve_aliases(false);

        for f in features {
            b.add_feature(f);
        }
        for e in extensions {
            b.add_extension(e);
        }
        b.resolve_aliases(true);
        b.link_flags();
        b.filter_required();

        debug!(
            "built {} model: {} structs, {} functions, {} enums, {} extensions",
            variant,
            b.api.composites.len(),
            b.api.functions.len(),
            b.api.enums.len(),
            b.api.extensions.len()
        );
        b.api
    }
}

fn type_name(t: &Type) -> Option<String> {
    if let Some(name) = &t.name {
        return Some(name.clone());
    }
    if let TypeSpec::Code(code) = &t.spec {
        for m in &code.markup {
            if let TypeCodeMarkup::Name(name) = m {
                return Some(name.clone());
            }
        }
    }
    None
}

fn member_from_declaration(name: String, type_name: String, code: &str) -> Member {
    let decl = parse_declaration(code, &name).unwrap_or_else(|| CDecl {
        full_type: type_name.clone(),
        ..CDecl::default()
    });
    Member {
        name,
        type_name,
        full_type: decl.full_type,
        pointer: decl.pointer,
        is_const: decl.is_const,
        arrays: decl.arrays,
        bitfield_width: decl.bitfield_width,
        ..Member::default()
    }
}

fn enumerator_value(spec: &EnumSpec, ext_number: Option<i64>, bit_width: u32) -> Option<(i64, String)> {
    match spec {
        EnumSpec::Value { value, .. } => {
            parse_registry_integer(value).map(|v| (v, value.trim().to_string()))
        }
        EnumSpec::Bitpos { bitpos, .. } => {
            let v = 1i64 << bitpos;
            let text = if bit_width == 64 {
                format!("0x{:016X}ULL", v)
            } else {
                format!("0x{:08X}", v)
            };
            Some((v, text))
        }
        EnumSpec::Offset {
            offset,
            extnumber,
            dir,
            ..
        } => {
            let number = extnumber.or(ext_number)?;
            let mut v = EXTENSION_ENUM_BASE + (number - 1) * EXTENSION_ENUM_BLOCK_SIZE + offset;
            if !dir {
                v = -v;
            }
            Some((v, v.to_string()))
        }
        EnumSpec::Alias { .. } | EnumSpec::None => None,
    }
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}

impl Builder {
    fn defer_alias(&mut self, kind: AliasKind, name: &str, target: &str) {
        self.fixups.push(PendingAlias {
            kind,
            name: name.to_string(),
            target: target.to_string(),
        });
    }

    fn add_type(&mut self, t: &Type) {
        if !self.variant.matches(t.api.as_deref()) {
            return;
        }
        let name = match type_name(t) {
            Some(name) => name,
            None => return,
        };
        if let Some(alias) = &t.alias {
            self.defer_alias(AliasKind::Type, &name, alias);
            return;
        }

        match t.category.as_deref() {
            Some("handle") => {
                let dispatchable = match &t.spec {
                    TypeSpec::Code(code) => code
                        .markup
                        .iter()
                        .any(|m| *m == TypeCodeMarkup::Type(String::from("VK_DEFINE_HANDLE"))),
                    _ => false,
                };
                self.api.handles.push(Handle {
                    name,
                    aliases: Vec::new(),
                    dispatchable,
                    object_type: t.objtypeenum.clone(),
                    parent: t.parent.clone(),
                });
            }
            Some("enum") => self.enum_type_names.push(name),
            Some("bitmask") => {
                let bit_width = match &t.spec {
                    TypeSpec::Code(code)
                        if code
                            .markup
                            .iter()
                            .any(|m| *m == TypeCodeMarkup::Type(String::from("VkFlags64"))) =>
                    {
                        64
                    }
                    _ => 32,
                };
                self.api.flags.push(Flags {
                    name,
                    aliases: Vec::new(),
                    bit_width,
                    bits: t.requires.clone().or_else(|| t.bitvalues.clone()),
                });
            }
            Some("struct") | Some("union") => {
                let composite = self.composite_from_type(name, t);
                self.api.composites.push(composite);
            }
            _ => {}
        }
    }

    fn composite_from_type(&mut self, name: String, t: &Type) -> Composite {
        let mut members = Vec::new();
        if let TypeSpec::Members(defs) = &t.spec {
            for def in defs {
                let def = match def {
                    TypeMember::Definition(def) => def,
                    TypeMember::Comment(_) => continue,
                };
                if !self.variant.matches(def.api.as_deref()) {
                    continue;
                }
                let mut member_name = None;
                let mut member_type = None;
                for m in &def.markup {
                    match m {
                        TypeMemberMarkup::Name(n) if member_name.is_none() => member_name = Some(n.clone()),
                        TypeMemberMarkup::Type(n) if member_type.is_none() => member_type = Some(n.clone()),
                        _ => {}
                    }
                }
                let member_name = match member_name {
                    Some(n) => n,
                    None => continue,
                };
                let member_type = member_type.unwrap_or_else(|| {
                    warn!("member {}::{} has no type", name, member_name);
                    String::new()
                });
                let mut member = member_from_declaration(member_name, member_type, &def.code);
                member.optional = def.optional.as_deref().map_or(false, |o| o.starts_with("true"));
                member.limit_type = def.limittype.clone();
                member.len = def.len.clone();
                member.values = def.values.clone();
                members.push(member);
            }
        }

        let s_type = members
            .iter()
            .find(|m| m.name == "sType")
            .and_then(|m| m.values.clone());

        Composite {
            name,
            aliases: Vec::new(),
            is_union: t.category.as_deref() == Some("union"),
            members,
            s_type,
            extends: t
                .structextends
                .as_deref()
                .map(|s| s.split(',').map(String::from).collect())
                .unwrap_or_default(),
            returned_only: t.returnedonly.as_deref() == Some("true"),
            version: None,
            extensions: Vec::new(),
        }
    }

    fn add_enums(&mut self, enums: &Enums) {
        let block_name = enums.name.clone().unwrap_or_default();
        let items = enums.children.iter().filter_map(|c| match c {
            EnumsChild::Enum(e) => Some(e),
            EnumsChild::Comment(_) => None,
        });

        match enums.kind.as_deref() {
            Some("enum") | Some("bitmask") => {
                let is_bitmask = enums.kind.as_deref() == Some("bitmask");
                let bit_width = enums.bitwidth.unwrap_or(32);
                let mut values = Vec::new();
                for e in items {
                    if !self.variant.matches(e.api.as_deref()) {
                        continue;
                    }
                    if let EnumSpec::Alias { alias, .. } = &e.spec {
                        self.defer_alias(AliasKind::Value(block_name.clone()), &e.name, alias);
                        continue;
                    }
                    match enumerator_value(&e.spec, None, bit_width) {
                        Some((value, text)) => values.push(EnumValue {
                            name: e.name.clone(),
                            aliases: Vec::new(),
                            value,
                            text,
                        }),
                        None => warn!("enumerator {} of {} has no value", e.name, block_name),
                    }
                }
                if is_bitmask {
                    self.api.bitmasks.push(Bitmask {
                        name: block_name,
                        aliases: Vec::new(),
                        flags_name: None,
                        bit_width,
                        values,
                    });
                } else {
                    self.api.enums.push(EnumType {
                        name: block_name,
                        aliases: Vec::new(),
                        values,
                    });
                }
            }
            _ => {
                for e in items {
                    if !self.variant.matches(e.api.as_deref()) {
                        continue;
                    }
                    match &e.spec {
                        EnumSpec::Alias { alias, .. } => {
                            self.defer_alias(AliasKind::Constant, &e.name, alias)
                        }
                        EnumSpec::Value { value, .. } => self.api.constants.push(Constant {
                            name: e.name.clone(),
                            aliases: Vec::new(),
                            type_name: e.type_suffix.clone(),
                            value: value.clone(),
                        }),
                        _ => warn!("API constant {} has no value", e.name),
                    }
                }
            }
        }
    }

    /// Enum types declared with `category="enum"` that have no `<enums>` block.
    fn add_missing_enum_types(&mut self) {
        for name in std::mem::take(&mut self.enum_type_names) {
            let known = self.api.enums.iter().any(|e| e.name == name)
                || self.api.bitmasks.iter().any(|b| b.name == name);
            if !known {
                self.api.enums.push(EnumType {
                    name,
                    aliases: Vec::new(),
                    values: Vec::new(),
                });
            }
        }
    }

    fn add_command(&mut self, command: &Command) {
        let def = match command {
            Command::Alias { name, alias } => {
                self.defer_alias(AliasKind::Command, name, alias);
                return;
            }
            Command::Definition(def) => def,
        };
        if !self.variant.matches(def.api.as_deref()) {
            return;
        }

        let params: Vec<Param> = def
            .params
            .iter()
            .filter(|p| self.variant.matches(p.api.as_deref()))
            .map(|p| {
                let d = &p.definition;
                let mut param = member_from_declaration(
                    d.name.clone(),
                    d.type_name.clone().unwrap_or_default(),
                    &d.code,
                );
                param.optional = p.optional.as_deref().map_or(false, |o| o.starts_with("true"));
                param.len = p.len.clone();
                param
            })
            .collect();

        let name = def.proto.name.clone();
        let kind = FunctionKind::classify(&name, params.first().map(|p| p.type_name.as_str()));
        let return_type = match parse_declaration(&def.proto.code, &name) {
            Some(decl) if !decl.full_type.is_empty() => decl.full_type,
            _ => def.proto.type_name.clone().unwrap_or_else(|| String::from("void")),
        };

        self.api.functions.push(Function {
            name,
            aliases: Vec::new(),
            return_type,
            params,
            kind,
            version: None,
            extensions: Vec::new(),
        });
    }

    fn add_feature(&mut self, feature: &Feature) {
        if !self.variant.matches(Some(feature.api.as_str())) {
            return;
        }
        let (major, minor) = {
            let mut parts = feature.number.split('.');
            let major = parts.next().and_then(|p| p.parse().ok());
            let minor = parts.next().and_then(|p| p.parse().ok());
            match (major, minor) {
                (Some(major), Some(minor)) => (major, minor),
                _ => Version::numbers_from_name(&feature.name).unwrap_or((1, 0)),
            }
        };
        let mut version = Version {
            name: feature.name.clone(),
            api_name: feature.name.replacen("_VERSION_", "_API_VERSION_", 1),
            major,
            minor,
            requirements: Vec::new(),
        };

        for child in &feature.children {
            match child {
                ExtensionChild::Require { api, depends, items, .. } => {
                    if !self.variant.matches(api.as_deref()) {
                        continue;
                    }
                    for item in items {
                        match item {
                            InterfaceItem::Type { name, .. } | InterfaceItem::Command { name, .. } => {
                                self.required.insert(name.clone());
                                self.introduced_in
                                    .entry(name.clone())
                                    .or_insert_with(|| feature.name.clone());
                            }
                            InterfaceItem::Enum(e) => self.add_extension_enumerator(e, None),
                            InterfaceItem::Feature {
                                name,
                                struct_name,
                                depends: item_depends,
                            } => version.requirements.push(FeatureRequirement {
                                struct_name: struct_name.clone(),
                                feature: name.clone(),
                                depends: item_depends.clone().or_else(|| depends.clone()),
                            }),
                            InterfaceItem::Comment(_) => {}
                        }
                    }
                }
                ExtensionChild::Remove { api, items, .. } => self.remove_items(api.as_deref(), items),
            }
        }

        self.api.versions.push(version);
    }

    fn add_extension(&mut self, ext: &types::Extension) {
        if !self.variant.matches(Some(ext.supported.as_deref().unwrap_or("disabled"))) {
            return;
        }
        let mut extension = Extension {
            name: ext.name.clone(),
            number: ext.number.unwrap_or(0),
            kind: ext.ext_type.as_deref().and_then(ExtensionKind::parse),
            depends: ext.depends.clone(),
            promoted_to: ext.promotedto.clone(),
            deprecated_by: ext.deprecatedby.clone(),
            obsoleted_by: ext.obsoletedby.clone(),
            platform: ext.platform.clone(),
            provisional: ext.provisional,
            ..Extension::default()
        };

        for child in &ext.children {
            match child {
                ExtensionChild::Require { api, depends, items, .. } => {
                    if !self.variant.matches(api.as_deref()) {
                        continue;
                    }
                    let mut require = ExtensionRequire {
                        depends: depends.clone(),
                        ..ExtensionRequire::default()
                    };
                    for item in items {
                        match item {
                            InterfaceItem::Type { name, .. } => {
                                self.mark_required_by(name, &ext.name);
                                require.types.push(name.clone());
                            }
                            InterfaceItem::Command { name, .. } => {
                                self.mark_required_by(name, &ext.name);
                                require.commands.push(name.clone());
                            }
                            InterfaceItem::Enum(e) => {
                                if e.spec.extends().is_some() {
                                    self.add_extension_enumerator(e, ext.number);
                                } else if e.name.ends_with("_EXTENSION_NAME") {
                                    extension.name_define = Some(e.name.clone());
                                } else if e.name.ends_with("_SPEC_VERSION") {
                                    if let EnumSpec::Value { value, .. } = &e.spec {
                                        extension.spec_version =
                                            parse_registry_integer(value).map(|v| v as u32);
                                    }
                                }
                            }
                            InterfaceItem::Feature {
                                name,
                                struct_name,
                                depends: item_depends,
                            } => extension.feature_requirements.push(FeatureRequirement {
                                struct_name: struct_name.clone(),
                                feature: name.clone(),
                                depends: item_depends.clone().or_else(|| depends.clone()),
                            }),
                            InterfaceItem::Comment(_) => {}
                        }
                    }
                    extension.requires.push(require);
                }
                ExtensionChild::Remove { api, items, .. } => self.remove_items(api.as_deref(), items),
            }
        }

        self.api.extensions.push(extension);
    }

    fn mark_required_by(&mut self, name: &str, extension: &str) {
        self.required.insert(name.to_string());
        let list = self.required_by.entry(name.to_string()).or_default();
        push_unique(list, extension);
    }

    fn remove_items(&mut self, api: Option<&str>, items: &[InterfaceItem]) {
        if !self.variant.matches(api) {
            return;
        }
        for item in items {
            if let InterfaceItem::Type { name, .. } | InterfaceItem::Command { name, .. } = item {
                self.removed.insert(name.clone());
            }
        }
    }

    /// Adds an enumerator that a version or extension contributes to an
    /// existing enum or bitmask.
    fn add_extension_enumerator(&mut self, e: &Enum, ext_number: Option<i64>) {
        if !self.variant.matches(e.api.as_deref()) {
            return;
        }
        let extends = match e.spec.extends() {
            Some(extends) => extends.to_string(),
            None => return,
        };
        if let EnumSpec::Alias { alias, .. } = &e.spec {
            self.defer_alias(AliasKind::Value(extends), &e.name, alias);
            return;
        }

        let bit_width = lookup(&self.api.bitmasks, &extends).map_or(32, |b| b.bit_width);
        let (value, text) = match enumerator_value(&e.spec, ext_number, bit_width) {
            Some(v) => v,
            None => {
                warn!("enumerator {} extending {} has no value", e.name, extends);
                return;
            }
        };
        let values = if let Some(target) = lookup_mut(&mut self.api.enums, &extends) {
            &mut target.values
        } else if let Some(target) = lookup_mut(&mut self.api.bitmasks, &extends) {
            &mut target.values
        } else {
            warn!("enumerator {} extends unknown type {}", e.name, extends);
            return;
        };
        if lookup(values, &e.name).is_none() {
            values.push(EnumValue {
                name: e.name.clone(),
                aliases: Vec::new(),
                value,
                text,
            });
        }
    }

    /// Retries deferred aliases until no more of them can be attached. With
    /// `last_pass` set the remaining ones are dropped.
    fn resolve_aliases(&mut self, last_pass: bool) {
        loop {
            let pending = std::mem::take(&mut self.fixups);
            let before = pending.len();
            for alias in pending {
                if !self.try_attach_alias(&alias) {
                    self.fixups.push(alias);
                }
            }
            if self.fixups.is_empty() || self.fixups.len() == before {
                break;
            }
        }

        if last_pass {
            for alias in self.fixups.drain(..) {
                warn!(
                    "dropping alias {} of unknown {:?} target {}",
                    alias.name, alias.kind, alias.target
                );
            }
        }
    }

    fn try_attach_alias(&mut self, alias: &PendingAlias) -> bool {
        fn attach<T: Named + HasAliases>(items: &mut [T], alias: &PendingAlias) -> bool {
            match lookup_mut(items, &alias.target) {
                Some(item) => {
                    if !item.is_named(&alias.name) {
                        item.aliases_mut().push(alias.name.clone());
                    }
                    true
                }
                None => false,
            }
        }

        let api = &mut self.api;
        match &alias.kind {
            AliasKind::Type => {
                attach(&mut api.handles, alias)
                    || attach(&mut api.composites, alias)
                    || attach(&mut api.enums, alias)
                    || attach(&mut api.bitmasks, alias)
                    || attach(&mut api.flags, alias)
            }
            AliasKind::Command => attach(&mut api.functions, alias),
            AliasKind::Constant => attach(&mut api.constants, alias),
            AliasKind::Value(parent) => {
                if let Some(e) = lookup_mut(&mut api.enums, parent) {
                    attach(&mut e.values, alias)
                } else if let Some(b) = lookup_mut(&mut api.bitmasks, parent) {
                    attach(&mut b.values, alias)
                } else {
                    false
                }
            }
        }
    }

    fn link_flags(&mut self) {
        for bitmask in &mut self.api.bitmasks {
            let flags = self
                .api
                .flags
                .iter_mut()
                .find(|f| f.bits.as_deref().map_or(false, |b| bitmask.is_named(b)));
            if let Some(flags) = flags {
                bitmask.flags_name = Some(flags.name.clone());
                if bitmask.bit_width != flags.bit_width {
                    bitmask.bit_width = bitmask.bit_width.max(flags.bit_width);
                    flags.bit_width = bitmask.bit_width;
                }
            }
        }
    }

    fn is_required(&self, name: &str) -> bool {
        self.required.contains(name) && !self.removed.contains(name)
    }

    fn filter_required(&mut self) {
        fn retain<T: Named + HasAliases>(items: &mut Vec<T>, b: &Builder) {
            items.retain(|i| b.is_required(i.name()) || i.aliases().iter().any(|a| b.is_required(a)));
            for i in items.iter_mut() {
                i.aliases_mut().retain(|a| b.is_required(a));
            }
        }

        let mut api = std::mem::take(&mut self.api);
        retain(&mut api.handles, self);
        retain(&mut api.enums, self);
        retain(&mut api.bitmasks, self);
        retain(&mut api.flags, self);
        retain(&mut api.composites, self);
        retain(&mut api.functions, self);

        for c in &mut api.composites {
            c.version = self.first_version(&c.name, &c.aliases);
            c.extensions = self.requiring_extensions(&c.name, &c.aliases);
        }
        for f in &mut api.functions {
            f.version = self.first_version(&f.name, &f.aliases);
            f.extensions = self.requiring_extensions(&f.name, &f.aliases);
        }
        self.api = api;
    }

    fn first_version(&self, name: &str, aliases: &[String]) -> Option<String> {
        std::iter::once(name)
            .chain(aliases.iter().map(String::as_str))
            .find_map(|n| self.introduced_in.get(n).cloned())
    }

    fn requiring_extensions(&self, name: &str, aliases: &[String]) -> Vec<String> {
        let mut result = Vec::new();
        for n in std::iter::once(name).chain(aliases.iter().map(String::as_str)) {
            if let Some(exts) = self.required_by.get(n) {
                for e in exts {
                    push_unique(&mut result, e);
                }
            }
        }
        result
    }
}

/// Mutable access to the alias list, used while fixups are attached.
pub(crate) trait HasAliases {
    fn aliases_mut(&mut self) -> &mut Vec<String>;
}

macro_rules! impl_has_aliases {
    ($($t:ty),+) => {
        $(
            impl HasAliases for $t {
                fn aliases_mut(&mut self) -> &mut Vec<String> {
                    &mut self.aliases
                }
            }
        )+
    };
}

impl_has_aliases!(Handle, EnumType, Bitmask, Flags, Constant, Composite, Function, EnumValue);
