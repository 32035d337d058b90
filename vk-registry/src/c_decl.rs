//! Splits the C declaration text of struct members and command parameters
//! into the parts the generators need.

/// A declaration such as `const VkAllocationCallbacks* pAllocator` or
/// `char deviceName[VK_MAX_PHYSICAL_DEVICE_NAME_SIZE]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CDecl {
    /// Type as written before the name, with normalized spacing: `const char* const*`.
    pub full_type: String,
    pub pointer: u32,
    /// Pointee is const (`const T*`), or the value itself for non-pointers.
    pub is_const: bool,
    /// Fixed array sizes in declaration order, e.g. `["3", "4"]` or `["VK_UUID_SIZE"]`.
    pub arrays: Vec<String>,
    pub bitfield_width: Option<u32>,
}

/// Splits `code` around the declared `name`.
///
/// Returns `None` when `name` does not occur in `code` as a separate token.
pub fn parse_declaration(code: &str, name: &str) -> Option<CDecl> {
    let name_pos = find_token(code, name)?;
    let (prefix, rest) = code.split_at(name_pos);
    let suffix = &rest[name.len()..];

    let full_type = normalize_type(prefix);
    let pointer = full_type.matches('*').count() as u32;
    let is_const = full_type.starts_with("const ");

    let mut arrays = Vec::new();
    let mut bitfield_width = None;
    let mut chars = suffix.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '[' => {
                let start = i + 1;
                let mut end = start;
                for (j, c) in chars.by_ref() {
                    if c == ']' {
                        end = j;
                        break;
                    }
                }
                arrays.push(suffix[start..end].trim().to_string());
            }
            ':' => {
                bitfield_width = suffix[i + 1..]
                    .trim()
                    .trim_end_matches(';')
                    .trim()
                    .parse()
                    .ok();
                break;
            }
            _ => {}
        }
    }

    Some(CDecl {
        full_type,
        pointer,
        is_const,
        arrays,
        bitfield_width,
    })
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn find_token(code: &str, token: &str) -> Option<usize> {
    let mut search_from = 0;
    while let Some(found) = code[search_from..].find(token) {
        let start = search_from + found;
        let end = start + token.len();
        let before_ok = code[..start].chars().next_back().map_or(true, |c| !is_ident_char(c));
        let after_ok = code[end..].chars().next().map_or(true, |c| !is_ident_char(c));
        if before_ok && after_ok {
            return Some(start);
        }
        search_from = end;
    }
    None
}

/// Collapses whitespace and attaches `*` to the preceding word. The `struct`
/// keyword is dropped, C++ code refers to the type name directly.
pub fn normalize_type(text: &str) -> String {
    let mut out = String::new();
    let mut pending_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if c == '*' {
            out.push('*');
        } else {
            if pending_space {
                out.push(' ');
            }
            out.push(c);
        }
        pending_space = false;
    }
    match out.strip_prefix("struct ") {
        Some(rest) => rest.to_string(),
        None => out.replace("const struct ", "const "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_to_const() {
        let d = parse_declaration(" const  VkAllocationCallbacks *  pAllocator ", "pAllocator").unwrap();
        assert_eq!(d.full_type, "const VkAllocationCallbacks*");
        assert_eq!(d.pointer, 1);
        assert!(d.is_const);
        assert!(d.arrays.is_empty());
    }

    #[test]
    fn double_pointer() {
        let d = parse_declaration("const  char * const*  ppEnabledLayerNames", "ppEnabledLayerNames").unwrap();
        assert_eq!(d.full_type, "const char* const*");
        assert_eq!(d.pointer, 2);
    }

    #[test]
    fn arrays_and_bitfields() {
        let d = parse_declaration(" float  matrix [3][4]", "matrix").unwrap();
        assert_eq!(d.arrays, vec!["3", "4"]);
        let d = parse_declaration(" char  deviceName [ VK_MAX_PHYSICAL_DEVICE_NAME_SIZE ]", "deviceName").unwrap();
        assert_eq!(d.arrays, vec!["VK_MAX_PHYSICAL_DEVICE_NAME_SIZE"]);
        let d = parse_declaration(" uint32_t  instanceCustomIndex :24", "instanceCustomIndex").unwrap();
        assert_eq!(d.bitfield_width, Some(24));
        assert_eq!(d.full_type, "uint32_t");
    }

    #[test]
    fn struct_keyword_and_token_boundaries() {
        let d = parse_declaration("struct  VkBaseOutStructure *  pNext ", "pNext").unwrap();
        assert_eq!(d.full_type, "VkBaseOutStructure*");
        assert!(parse_declaration("uint32_t  countX", "count").is_none());
    }
}
