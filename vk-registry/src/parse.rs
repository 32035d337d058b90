use std::io::Read;
use xml::reader::XmlEvent;

use crate::types::*;

type XmlEvents<R> = xml::reader::Events<R>;
type XmlAttribute = xml::attribute::OwnedAttribute;

//--------------------------------------------------------------------------------------------------
struct ParseCtx<R: Read> {
    events: XmlEvents<R>,
    xpath: String,
    errors: Vec<Error>,
}

impl<R: Read> ParseCtx<R> {
    fn push_element(&mut self, name: &str) {
        self.xpath.push('/');
        self.xpath.push_str(name);
    }

    fn pop_element(&mut self) {
        if let Some(separator_pos) = self.xpath.rfind('/') {
            self.xpath.truncate(separator_pos);
        } else {
            self.errors.push(Error::Internal {
                desc: "ParseCtx push_element/pop_element mismatch.",
            });
        }
    }

    fn error_missing_element(&mut self, name: &str) {
        self.errors.push(Error::MissingElement {
            xpath: self.xpath.clone(),
            name: String::from(name),
        });
    }
}

//--------------------------------------------------------------------------------------------------
macro_rules! unwrap_attribute (
    ($ctx:expr, $attribute:ident) => {
        let $attribute = match $attribute {
            Some(val) => val,
            None => {
                $ctx.errors.push(Error::MissingAttribute {
                    xpath: $ctx.xpath.clone(),
                    name: String::from(stringify!($attribute)),
                });
                return None;
            }
        };
    };
);

macro_rules! match_attributes {
    ($ctx:expr, $a:ident in $attributes:expr, $($p:pat => $e:expr),+) => {
        for $a in $attributes {
            let n = $a.name.local_name.as_str();
            match n {
                $(
                    $p => $e,
                )+
                _ => $ctx.errors.push(Error::UnexpectedAttribute {
                    xpath: $ctx.xpath.clone(),
                    name: String::from(n),
                })
            }
        }
    };
}

macro_rules! match_elements {
    ($ctx:expr, $($p:pat => $e:expr),+) => {
        while let Some(Ok(e)) = $ctx.events.next() {
            match e {
                XmlEvent::StartElement { name, .. } => {
                    let name = name.local_name.as_str();
                    $ctx.push_element(name);
                    match name {
                        $(
                            $p => $e,
                        )+
                        _ => {
                            $ctx.errors.push(Error::UnexpectedElement {
                                xpath: $ctx.xpath.clone(),
                                name: String::from(name),
                            });
                            consume_current_element($ctx);
                        }
                    }
                }
                XmlEvent::EndElement { .. } => {
                    $ctx.pop_element();
                    break;
                }
                _ => {}
            }
        }
    };

    ( $ctx:expr, $attributes:ident, $($p:pat => $e:expr),+) => {
        while let Some(Ok(e)) = $ctx.events.next() {
            match e {
                XmlEvent::StartElement { name, $attributes, .. } => {
                    let name = name.local_name.as_str();
                    $ctx.push_element(name);
                    match name {
                        $(
                            $p => $e,
                        )+
                        _ => {
                            $ctx.errors.push(Error::UnexpectedElement {
                                xpath: $ctx.xpath.clone(),
                                name: String::from(name),
                            });
                            consume_current_element($ctx);
                        }
                    }
                }
                XmlEvent::EndElement { .. } => {
                    $ctx.pop_element();
                    break;
                }
                _ => {}
            }
        }
    };
}

/// Like `match_elements!`, but all character data between the child elements
/// is appended to `$buffer`, so the C declaration text can be recovered.
macro_rules! match_elements_combine_text {
    ( $ctx:expr, $buffer:ident, $($p:pat => $e:expr),+) => {
        while let Some(Ok(e)) = $ctx.events.next() {
            match e {
                XmlEvent::Characters(text) => $buffer.push_str(&text),
                XmlEvent::Whitespace(text) => $buffer.push_str(&text),
                XmlEvent::StartElement { name, .. } => {
                    $buffer.push(' ');
                    let name = name.local_name.as_str();
                    $ctx.push_element(name);
                    match name {
                        $(
                            $p => $e,
                        )+
                        _ => {
                            $ctx.errors.push(Error::UnexpectedElement {
                                xpath: $ctx.xpath.clone(),
                                name: String::from(name),
                            });
                            consume_current_element($ctx);
                        }
                    }
                }
                XmlEvent::EndElement { .. } => {
                    $buffer.push(' ');
                    $ctx.pop_element();
                    break;
                },
                _ => {}
            }
        }
    };

    ( $ctx:expr, $attributes:ident, $buffer:ident, $($p:pat => $e:expr),+) => {
        while let Some(Ok(e)) = $ctx.events.next() {
            match e {
                XmlEvent::Characters(text) => $buffer.push_str(&text),
                XmlEvent::Whitespace(text) => $buffer.push_str(&text),
                XmlEvent::StartElement { name, $attributes, .. } => {
                    let name = name.local_name.as_str();
                    $ctx.push_element(name);
                    match name {
                        $(
                            $p => $e,
                        )+
                        _ => {
                            $ctx.errors.push(Error::UnexpectedElement {
                                xpath: $ctx.xpath.clone(),
                                name: String::from(name),
                            });
                            consume_current_element($ctx);
                        }
                    }
                }
                XmlEvent::EndElement { .. } => {
                    $ctx.pop_element();
                    break;
                }
                _ => {}
            }
        }
    };
}

//--------------------------------------------------------------------------------------------------
/// Parses the Vulkan XML file into a Rust object.
pub fn parse_file(path: &std::path::Path) -> Result<(Registry, Vec<Error>), FatalError> {
    let file = std::io::BufReader::new(std::fs::File::open(path)?);
    let parser = xml::reader::ParserConfig::new().create_reader(file);
    parse_xml(parser.into_iter())
}

/// Parses the Vulkan XML file from stream into a Rust object.
pub fn parse_stream<T: std::io::Read>(stream: T) -> Result<(Registry, Vec<Error>), FatalError> {
    let parser = xml::reader::ParserConfig::new().create_reader(stream);
    parse_xml(parser.into_iter())
}

fn parse_xml<R: Read>(events: XmlEvents<R>) -> Result<(Registry, Vec<Error>), FatalError> {
    let mut ctx = ParseCtx {
        events,
        xpath: String::from(""),
        errors: Vec::new(),
    };

    let mut result = Err(FatalError::MissingRegistryElement);

    {
        let ctx = &mut ctx;
        match_elements! {ctx,
            "registry" => result = parse_registry(ctx)
        }
    }

    result.map(|r| (r, ctx.errors))
}

fn parse_registry<R: Read>(ctx: &mut ParseCtx<R>) -> Result<Registry, FatalError> {
    let mut registry = Registry(Vec::new());

    match_elements! {ctx, attributes,
        "comment" => registry.0.push(RegistryChild::Comment(parse_text_element(ctx))),
        "platforms" | "tags" | "vendorids" | "formats" | "spirvextensions"
            | "spirvcapabilities" | "sync" | "videocodecs" => consume_current_element(ctx),
        "types" => {
            let mut comment = None;
            let mut children = Vec::new();
            match_attributes!{ctx, a in attributes,
                "comment" => comment = Some(a.value)
            }
            match_elements!{ctx, attributes,
                "comment" => children.push(TypesChild::Comment(parse_text_element(ctx))),
                "type" => children.push(parse_type(ctx, attributes))
            }
            registry.0.push(RegistryChild::Types(Types { comment, children }));
        },
        "enums" => registry.0.push(parse_enums(ctx, attributes)),
        "commands" => {
            let mut comment = None;
            let mut children = Vec::new();
            match_attributes!{ctx, a in attributes,
                "comment" => comment = Some(a.value)
            }
            match_elements!{ctx, attributes,
                "command" => if let Some(v) = parse_command(ctx, attributes) {
                    children.push(v);
                }
            }
            registry.0.push(RegistryChild::Commands(Commands { comment, children }));
        },
        "feature" => if let Some(v) = parse_feature(ctx, attributes) {
            registry.0.push(v);
        },
        "extensions" => {
            let mut comment = None;
            let mut children = Vec::new();
            match_attributes!{ctx, a in attributes,
                "comment" => comment = Some(a.value)
            }
            match_elements!{ctx, attributes,
                "extension" => if let Some(v) = parse_extension(ctx, attributes) {
                    children.push(v);
                }
            }
            registry.0.push(RegistryChild::Extensions(Extensions { comment, children }));
        }
    }

    Ok(registry)
}

fn parse_type<R: Read>(ctx: &mut ParseCtx<R>, attributes: Vec<XmlAttribute>) -> TypesChild {
    let mut api = None;
    let mut alias = None;
    let mut requires = None;
    let mut name = None;
    let mut category = None;
    let mut parent = None;
    let mut returnedonly = None;
    let mut structextends = None;
    let mut objtypeenum = None;
    let mut bitvalues = None;
    let mut comment = None;

    let mut code = String::new();
    let mut markup = Vec::new();
    let mut members = Vec::new();

    match_attributes! {ctx, a in attributes,
        "api"            => api            = Some(a.value),
        "alias"          => alias          = Some(a.value),
        "requires"       => requires       = Some(a.value),
        "name"           => name           = Some(a.value),
        "category"       => category       = Some(a.value),
        "parent"         => parent         = Some(a.value),
        "returnedonly"   => returnedonly   = Some(a.value),
        "structextends"  => structextends  = Some(a.value),
        "objtypeenum"    => objtypeenum    = Some(a.value),
        "bitvalues"      => bitvalues      = Some(a.value),
        "comment"        => comment        = Some(a.value),
        "allowduplicate" | "deprecated" => ()
    }

    match_elements_combine_text! {ctx, attributes, code,
        "member" => {
            if let Some(member) = parse_member(ctx, attributes) {
                members.push(TypeMember::Definition(member));
            }
        },
        "comment" => members.push(TypeMember::Comment(parse_text_element(ctx))),
        "name" => {
            let text = parse_text_element(ctx);
            code.push_str(&text);
            markup.push(TypeCodeMarkup::Name(text));
        },
        "type" => {
            let text = parse_text_element(ctx);
            code.push_str(&text);
            markup.push(TypeCodeMarkup::Type(text));
        },
        "apientry" => {
            let text = parse_text_element(ctx);
            code.push_str(&text);
            markup.push(TypeCodeMarkup::ApiEntry(text));
        }
    }

    TypesChild::Type(Type {
        name,
        alias,
        api,
        requires,
        category,
        parent,
        returnedonly,
        structextends,
        objtypeenum,
        bitvalues,
        comment,
        spec: if !members.is_empty() {
            TypeSpec::Members(members)
        } else if !code.trim().is_empty() {
            TypeSpec::Code(TypeCode { code, markup })
        } else {
            TypeSpec::None
        },
    })
}

fn parse_member<R: Read>(
    ctx: &mut ParseCtx<R>,
    attributes: Vec<XmlAttribute>,
) -> Option<TypeMemberDefinition> {
    let mut api = None;
    let mut len = None;
    let mut altlen = None;
    let mut externsync = None;
    let mut optional = None;
    let mut selector = None;
    let mut selection = None;
    let mut noautovalidity = None;
    let mut values = None;
    let mut limittype = None;
    let mut code = String::new();
    let mut markup = Vec::new();

    match_attributes! {ctx, a in attributes,
        "api"                   => api            = Some(a.value),
        "len"                   => len            = Some(a.value),
        "altlen"                => altlen         = Some(a.value),
        "externsync"            => externsync     = Some(a.value),
        "optional"              => optional       = Some(a.value),
        "selector"              => selector       = Some(a.value),
        "selection"             => selection      = Some(a.value),
        "noautovalidity"        => noautovalidity = Some(a.value),
        "values"                => values         = Some(a.value),
        "limittype"             => limittype      = Some(a.value),
        "validextensionstructs" | "objecttype" | "deprecated" | "featurelink" | "stride" => ()
    }

    match_elements_combine_text! {ctx, code,
        "type" => {
            let text = parse_text_element(ctx);
            code.push_str(&text);
            markup.push(TypeMemberMarkup::Type(text));
        },
        "name" => {
            let text = parse_text_element(ctx);
            code.push_str(&text);
            markup.push(TypeMemberMarkup::Name(text));
        },
        "enum" => {
            let text = parse_text_element(ctx);
            code.push_str(&text);
            markup.push(TypeMemberMarkup::Enum(text));
        },
        "comment" => {
            let text = parse_text_element(ctx);
            markup.push(TypeMemberMarkup::Comment(text));
        }
    }

    if !markup.iter().any(|m| matches!(m, TypeMemberMarkup::Name(_))) {
        ctx.error_missing_element("name");
        return None;
    }

    Some(TypeMemberDefinition {
        api,
        len,
        altlen,
        externsync,
        optional,
        selector,
        selection,
        noautovalidity,
        values,
        limittype,
        code,
        markup,
    })
}

fn parse_enums<R: Read>(ctx: &mut ParseCtx<R>, attributes: Vec<XmlAttribute>) -> RegistryChild {
    let mut name = None;
    let mut kind = None;
    let mut bitwidth = None;
    let mut comment = None;
    let mut children = Vec::new();

    match_attributes! {ctx, a in attributes,
        "name"     => name     = Some(a.value),
        "type"     => kind     = Some(a.value),
        "bitwidth" => bitwidth = Some(a.value),
        "comment"  => comment  = Some(a.value),
        "start" | "end" | "vendor" => ()
    }

    match_elements! {ctx, attributes,
        "enum" => if let Some(v) = parse_enum(ctx, attributes) {
            children.push(EnumsChild::Enum(v));
        },
        "unused" => consume_current_element(ctx),
        "comment" => children.push(EnumsChild::Comment(parse_text_element(ctx)))
    }

    let bitwidth = bitwidth
        .and_then(|val| parse_integer(ctx, &val))
        .map(|v| v as u32);

    RegistryChild::Enums(Enums {
        name,
        kind,
        bitwidth,
        comment,
        children,
    })
}

fn parse_command<R: Read>(ctx: &mut ParseCtx<R>, attributes: Vec<XmlAttribute>) -> Option<Command> {
    let mut name = None;
    let mut alias = None;
    let mut api = None;
    let mut queues = None;
    let mut successcodes = None;
    let mut errorcodes = None;
    let mut comment = None;

    match_attributes! {ctx, a in attributes,
        "name"         => name         = Some(a.value),
        "alias"        => alias        = Some(a.value),
        "api"          => api          = Some(a.value),
        "queues"       => queues       = Some(a.value),
        "successcodes" => successcodes = Some(a.value),
        "errorcodes"   => errorcodes   = Some(a.value),
        "comment"      => comment      = Some(a.value),
        "renderpass" | "videocoding" | "cmdbufferlevel" | "tasks" | "conditionalrendering"
            | "allownoqueues" | "export" | "deprecated" => ()
    }

    if let Some(alias) = alias {
        unwrap_attribute!(ctx, name);
        consume_current_element(ctx);
        return Some(Command::Alias { name, alias });
    }

    let mut code = String::new();
    let mut proto = None;
    let mut params = Vec::new();

    fn parse_name_with_type<R: Read>(ctx: &mut ParseCtx<R>) -> Option<NameWithType> {
        let mut name = None;
        let mut type_name = None;
        let mut code = String::new();
        match_elements_combine_text! {ctx, code,
            "type" => {
                let text = parse_text_element(ctx);
                code.push_str(&text);
                type_name = Some(text);
            },
            "name" => {
                let text = parse_text_element(ctx);
                code.push_str(&text);
                name = Some(text);
            }
        }
        let name = match name {
            Some(v) => v,
            None => {
                ctx.error_missing_element("name");
                return None;
            }
        };
        Some(NameWithType {
            type_name,
            name,
            code: code.split_whitespace().collect::<Vec<_>>().join(" "),
        })
    }

    match_elements! {ctx, attributes,
        "proto" => {
            proto = parse_name_with_type(ctx);
            if let Some(proto) = &proto {
                code.push_str(&proto.code);
            }
            code.push_str(" (");
        },
        "param" => {
            let mut api = None;
            let mut len = None;
            let mut altlen = None;
            let mut externsync = None;
            let mut optional = None;
            let mut noautovalidity = None;

            match_attributes!{ctx, a in attributes,
                "api"            => api            = Some(a.value),
                "len"            => len            = Some(a.value),
                "altlen"         => altlen         = Some(a.value),
                "externsync"     => externsync     = Some(a.value),
                "optional"       => optional       = Some(a.value),
                "noautovalidity" => noautovalidity = Some(a.value),
                "objecttype" | "validstructs" | "stride" => ()
            }

            if let Some(definition) = parse_name_with_type(ctx) {
                if !params.is_empty() {
                    code.push_str(", ");
                }
                code.push_str(&definition.code);
                params.push(CommandParam {
                    api,
                    len,
                    altlen,
                    externsync,
                    optional,
                    noautovalidity,
                    definition,
                });
            }
        },
        "description" | "implicitexternsyncparams" => consume_current_element(ctx)
    }
    code.push_str(");");

    let proto = match proto {
        Some(v) => v,
        None => {
            ctx.error_missing_element("proto");
            return None;
        }
    };

    Some(Command::Definition(CommandDefinition {
        api,
        queues,
        successcodes,
        errorcodes,
        comment,
        proto,
        params,
        code,
    }))
}

fn parse_enum<R: Read>(ctx: &mut ParseCtx<R>, attributes: Vec<XmlAttribute>) -> Option<Enum> {
    let mut name = None;
    let mut comment = None;
    let mut type_suffix = None;
    let mut api = None;
    let mut extends = None;
    let mut value = None;
    let mut bitpos = None;
    let mut extnumber = None;
    let mut offset = None;
    let mut positive = true;
    let mut alias = None;

    match_attributes! {ctx, a in attributes,
        "name"      => name        = Some(a.value),
        "comment"   => comment     = Some(a.value),
        "type"      => type_suffix = Some(a.value),
        "api"       => api         = Some(a.value),
        "extends"   => extends     = Some(a.value),
        "value"     => value       = Some(a.value),
        "offset"    => offset      = Some(a.value),
        "bitpos"    => bitpos      = Some(a.value),
        "extnumber" => extnumber   = Some(a.value),
        "alias"     => alias       = Some(a.value),
        "dir" => {
            if a.value.as_str() == "-" {
                positive = false;
            } else {
                ctx.errors.push(Error::UnexpectedAttributeValue {
                    xpath: ctx.xpath.clone(),
                    name: String::from("dir"),
                    value: a.value
                });
            }
        },
        "protect" | "deprecated" => ()
    }

    unwrap_attribute!(ctx, name);

    let count = [offset.is_some(), bitpos.is_some(), value.is_some(), alias.is_some()]
        .iter()
        .filter(|v| **v)
        .count();
    if count > 1 {
        ctx.errors.push(Error::SchemaViolation {
            xpath: ctx.xpath.clone(),
            desc: format!(
                "Unable to determine correct specification of enum: offset={:?}, bitpos={:?}, value={:?}, alias={:?}",
                offset, bitpos, value, alias
            ),
        });
        consume_current_element(ctx);
        return None;
    }

    let spec = if let Some(alias) = alias {
        EnumSpec::Alias { alias, extends }
    } else if let Some(offset) = offset {
        let offset = match parse_integer(ctx, &offset) {
            Some(v) => v,
            None => {
                consume_current_element(ctx);
                return None;
            }
        };
        let extends = match extends {
            Some(v) => v,
            None => {
                ctx.errors.push(Error::SchemaViolation {
                    xpath: ctx.xpath.clone(),
                    desc: String::from("Missing extends on enum with offset spec."),
                });
                consume_current_element(ctx);
                return None;
            }
        };
        EnumSpec::Offset {
            offset,
            extends,
            extnumber: extnumber.and_then(|v| parse_integer(ctx, &v)),
            dir: positive,
        }
    } else if let Some(bitpos) = bitpos {
        let bitpos = match parse_integer(ctx, &bitpos) {
            Some(v) => v,
            None => {
                consume_current_element(ctx);
                return None;
            }
        };
        EnumSpec::Bitpos { bitpos, extends }
    } else if let Some(value) = value {
        EnumSpec::Value { value, extends }
    } else {
        EnumSpec::None
    };

    consume_current_element(ctx);

    Some(Enum {
        name,
        comment,
        type_suffix,
        api,
        spec,
    })
}

fn parse_feature<R: Read>(
    ctx: &mut ParseCtx<R>,
    attributes: Vec<XmlAttribute>,
) -> Option<RegistryChild> {
    let mut api = None;
    let mut name = None;
    let mut number = None;
    let mut depends = None;
    let mut comment = None;
    let mut children = Vec::new();

    match_attributes! {ctx, a in attributes,
        "api"     => api     = Some(a.value),
        "name"    => name    = Some(a.value),
        "number"  => number  = Some(a.value),
        "depends" => depends = Some(a.value),
        "comment" => comment = Some(a.value),
        "protect" | "apitype" => ()
    }

    match_elements! {ctx, attributes,
        "require"    => children.push(parse_require(ctx, attributes)),
        "remove"     => children.push(parse_remove(ctx, attributes)),
        "deprecate"  => consume_current_element(ctx)
    }

    unwrap_attribute!(ctx, api);
    unwrap_attribute!(ctx, name);
    unwrap_attribute!(ctx, number);

    Some(RegistryChild::Feature(Feature {
        api,
        name,
        number,
        depends,
        comment,
        children,
    }))
}

fn parse_extension<R: Read>(
    ctx: &mut ParseCtx<R>,
    attributes: Vec<XmlAttribute>,
) -> Option<Extension> {
    let mut name = None;
    let mut comment = None;
    let mut number = None;
    let mut platform = None;
    let mut ext_type = None;
    let mut depends = None;
    let mut supported = None;
    let mut deprecatedby = None;
    let mut promotedto = None;
    let mut obsoletedby = None;
    let mut provisional = None;
    let mut children = Vec::new();

    match_attributes! {ctx, a in attributes,
        "name"         => name         = Some(a.value),
        "comment"      => comment      = Some(a.value),
        "number"       => number       = Some(a.value),
        "platform"     => platform     = Some(a.value),
        "type"         => ext_type     = Some(a.value),
        "depends"      => depends      = Some(a.value),
        "supported"    => supported    = Some(a.value),
        "deprecatedby" => deprecatedby = Some(a.value),
        "promotedto"   => promotedto   = Some(a.value),
        "obsoletedby"  => obsoletedby  = Some(a.value),
        "provisional"  => provisional  = Some(a.value),
        "author" | "contact" | "specialuse" | "sortorder" | "protect" | "ratified"
            | "nofeatures" => ()
    }

    let number = number.and_then(|text| parse_integer(ctx, &text));

    let provisional = match provisional.as_deref() {
        Some("true") => true,
        Some(value) => {
            ctx.errors.push(Error::SchemaViolation {
                xpath: ctx.xpath.clone(),
                desc: format!("Unexpected value of 'provisional' attribute: {}", value),
            });
            false
        }
        None => false,
    };

    match_elements! {ctx, attributes,
        "require"   => children.push(parse_require(ctx, attributes)),
        "remove"    => children.push(parse_remove(ctx, attributes)),
        "deprecate" => consume_current_element(ctx)
    }

    unwrap_attribute!(ctx, name);

    Some(Extension {
        name,
        comment,
        number,
        platform,
        ext_type,
        depends,
        supported,
        deprecatedby,
        promotedto,
        obsoletedby,
        provisional,
        children,
    })
}

fn parse_require<R: Read>(ctx: &mut ParseCtx<R>, attributes: Vec<XmlAttribute>) -> ExtensionChild {
    let mut api = None;
    let mut depends = None;
    let mut comment = None;

    match_attributes! {ctx, a in attributes,
        "api"     => api     = Some(a.value),
        "depends" => depends = Some(a.value),
        "comment" => comment = Some(a.value)
    }

    let items = parse_interface_items(ctx);
    ExtensionChild::Require {
        api,
        depends,
        comment,
        items,
    }
}

fn parse_remove<R: Read>(ctx: &mut ParseCtx<R>, attributes: Vec<XmlAttribute>) -> ExtensionChild {
    let mut api = None;
    let mut comment = None;

    match_attributes! {ctx, a in attributes,
        "api"     => api     = Some(a.value),
        "comment" => comment = Some(a.value),
        "reasonlink" => ()
    }

    let items = parse_interface_items(ctx);
    ExtensionChild::Remove {
        api,
        comment,
        items,
    }
}

fn parse_interface_items<R: Read>(ctx: &mut ParseCtx<R>) -> Vec<InterfaceItem> {
    let mut items = Vec::new();
    while let Some(Ok(e)) = ctx.events.next() {
        match e {
            XmlEvent::StartElement {
                name, attributes, ..
            } => {
                let name = name.local_name.as_str();
                ctx.push_element(name);
                if let Some(v) = parse_interface_item(ctx, name, attributes) {
                    items.push(v);
                }
            }
            XmlEvent::EndElement { .. } => {
                ctx.pop_element();
                break;
            }
            _ => {}
        }
    }
    items
}

fn parse_interface_item<R: Read>(
    ctx: &mut ParseCtx<R>,
    name: &str,
    attributes: Vec<XmlAttribute>,
) -> Option<InterfaceItem> {
    match name {
        "comment" => Some(InterfaceItem::Comment(parse_text_element(ctx))),
        "type" | "command" => {
            let mut item_name = None;
            let mut comment = None;
            match_attributes! {ctx, a in attributes,
                "name"    => item_name = Some(a.value),
                "comment" => comment   = Some(a.value)
            }
            consume_current_element(ctx);
            unwrap_attribute!(ctx, item_name);
            if name == "type" {
                Some(InterfaceItem::Type {
                    name: item_name,
                    comment,
                })
            } else {
                Some(InterfaceItem::Command {
                    name: item_name,
                    comment,
                })
            }
        }
        "enum" => parse_enum(ctx, attributes).map(InterfaceItem::Enum),
        "feature" => {
            let mut name = None;
            let mut struct_name = None;
            let mut depends = None;
            match_attributes! {ctx, a in attributes,
                "name"    => name        = Some(a.value),
                "struct"  => struct_name = Some(a.value),
                "depends" => depends     = Some(a.value),
                "comment" => ()
            }
            consume_current_element(ctx);
            unwrap_attribute!(ctx, name);
            unwrap_attribute!(ctx, struct_name);
            Some(InterfaceItem::Feature {
                name,
                struct_name,
                depends,
            })
        }
        _ => {
            ctx.errors.push(Error::UnexpectedElement {
                xpath: ctx.xpath.clone(),
                name: String::from(name),
            });
            consume_current_element(ctx);
            None
        }
    }
}

fn parse_integer<R: Read>(ctx: &mut ParseCtx<R>, text: &str) -> Option<i64> {
    match parse_registry_integer(text) {
        Some(v) => Some(v),
        None => {
            ctx.errors.push(Error::SchemaViolation {
                xpath: ctx.xpath.clone(),
                desc: format!("Value '{}' is not valid base 10 or 16 integer.", text),
            });
            None
        }
    }
}

/// Parses a decimal or `0x` prefixed hexadecimal integer, optionally negative.
pub fn parse_registry_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let value = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    Some(if negative { -value } else { value })
}

fn consume_current_element<R: Read>(ctx: &mut ParseCtx<R>) {
    let mut depth = 1;
    while let Some(Ok(e)) = ctx.events.next() {
        match e {
            XmlEvent::StartElement { name, .. } => {
                ctx.push_element(name.local_name.as_str());
                depth += 1;
            }
            XmlEvent::EndElement { .. } => {
                depth -= 1;
                ctx.pop_element();
                if depth == 0 {
                    break;
                }
            }
            _ => (),
        }
    }
}

fn parse_text_element<R: Read>(ctx: &mut ParseCtx<R>) -> String {
    let mut result = String::new();
    let mut depth = 1;
    while let Some(Ok(e)) = ctx.events.next() {
        match e {
            XmlEvent::StartElement { name, .. } => {
                ctx.push_element(name.local_name.as_str());
                depth += 1;
            }
            XmlEvent::Characters(text) => result.push_str(&text),
            XmlEvent::EndElement { .. } => {
                depth -= 1;
                ctx.pop_element();
                if depth == 0 {
                    break;
                }
            }
            _ => (),
        }
    }
    result
}
