//! Boolean `depends` expressions of the registry.
//!
//! `VK_KHR_a+VK_KHR_b` requires both, `VK_KHR_a,VK_VERSION_1_1` either one.
//! `+` binds tighter than `,` and parentheses group. Atoms are version names,
//! extension names or `Struct::member` feature references.

use std::fmt;

use log::warn;

use crate::api::{Api, Version};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependsExpr {
    Atom(String),
    And(Vec<DependsExpr>),
    Or(Vec<DependsExpr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependsError {
    UnexpectedEnd { expr: String },
    UnexpectedChar { expr: String, pos: usize, found: char },
    UnbalancedParen { expr: String, pos: usize },
}

impl fmt::Display for DependsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependsError::UnexpectedEnd { expr } => {
                write!(f, "unexpected end of depends expression \"{}\"", expr)
            }
            DependsError::UnexpectedChar { expr, pos, found } => write!(
                f,
                "unexpected '{}' at offset {} of depends expression \"{}\"",
                found, pos, expr
            ),
            DependsError::UnbalancedParen { expr, pos } => write!(
                f,
                "unbalanced parenthesis at offset {} of depends expression \"{}\"",
                pos, expr
            ),
        }
    }
}

impl std::error::Error for DependsError {}

struct Parser<'a> {
    expr: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn end_error(&self) -> DependsError {
        DependsError::UnexpectedEnd {
            expr: self.expr.to_string(),
        }
    }

    fn parse_or(&mut self) -> Result<DependsExpr, DependsError> {
        let mut terms = vec![self.parse_and()?];
        while let Some((_, ',')) = self.peek() {
            self.pos += 1;
            terms.push(self.parse_and()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            DependsExpr::Or(terms)
        })
    }

    fn parse_and(&mut self) -> Result<DependsExpr, DependsError> {
        let mut terms = vec![self.parse_primary()?];
        while let Some((_, '+')) = self.peek() {
            self.pos += 1;
            terms.push(self.parse_primary()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            DependsExpr::And(terms)
        })
    }

    fn parse_primary(&mut self) -> Result<DependsExpr, DependsError> {
        match self.peek() {
            None => Err(self.end_error()),
            Some((open, '(')) => {
                self.pos += 1;
                let inner = self.parse_or()?;
                match self.peek() {
                    Some((_, ')')) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    _ => Err(DependsError::UnbalancedParen {
                        expr: self.expr.to_string(),
                        pos: open,
                    }),
                }
            }
            Some((start, c)) if is_atom_char(c) => {
                let mut end = start;
                while let Some((i, c)) = self.peek() {
                    if !is_atom_char(c) {
                        break;
                    }
                    end = i + c.len_utf8();
                    self.pos += 1;
                }
                Ok(DependsExpr::Atom(self.expr[start..end].to_string()))
            }
            Some((pos, found)) => Err(DependsError::UnexpectedChar {
                expr: self.expr.to_string(),
                pos,
                found,
            }),
        }
    }
}

fn is_atom_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == ':'
}

fn is_version_atom(atom: &str) -> bool {
    atom.contains("_VERSION_")
}

impl DependsExpr {
    pub fn parse(expr: &str) -> Result<DependsExpr, DependsError> {
        let mut parser = Parser {
            expr,
            chars: expr.char_indices().filter(|(_, c)| !c.is_whitespace()).collect(),
            pos: 0,
        };
        let result = parser.parse_or()?;
        match parser.peek() {
            None => Ok(result),
            Some((pos, ')')) => Err(DependsError::UnbalancedParen {
                expr: expr.to_string(),
                pos,
            }),
            Some((pos, found)) => Err(DependsError::UnexpectedChar {
                expr: expr.to_string(),
                pos,
                found,
            }),
        }
    }

    /// All atoms in the order they appear.
    pub fn atoms(&self) -> Vec<&str> {
        let mut atoms = Vec::new();
        self.collect_atoms(&mut atoms);
        atoms
    }

    fn collect_atoms<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            DependsExpr::Atom(a) => out.push(a),
            DependsExpr::And(terms) | DependsExpr::Or(terms) => {
                for t in terms {
                    t.collect_atoms(out);
                }
            }
        }
    }

    /// Evaluates the expression with every version treated as available.
    pub fn is_met<S: AsRef<str>>(&self, extensions: &[S]) -> bool {
        match self {
            DependsExpr::Atom(a) => {
                is_version_atom(a) || extensions.iter().any(|e| e.as_ref() == a)
            }
            DependsExpr::And(terms) => terms.iter().all(|t| t.is_met(extensions)),
            DependsExpr::Or(terms) => terms.iter().any(|t| t.is_met(extensions)),
        }
    }

    /// Highest version that is unconditionally required, i.e. a version atom
    /// that is the whole expression or a direct operand of a top-level AND.
    pub fn required_core_version(&self) -> Option<(u32, u32)> {
        match self {
            DependsExpr::Atom(a) => Version::numbers_from_name(a),
            DependsExpr::And(terms) => terms
                .iter()
                .filter_map(|t| match t {
                    DependsExpr::Atom(a) => Version::numbers_from_name(a),
                    _ => None,
                })
                .max(),
            DependsExpr::Or(_) => None,
        }
    }

    /// Renders the expression as a C++ condition.
    ///
    /// `version_check(major, minor)` renders a version atom and
    /// `extension_check(list, name)` an extension atom, where `list` is
    /// `vDEP` or `vIEP` depending on the extension type. Extensions promoted
    /// to something the expression does not already name accept the
    /// promotion target as well. Atoms that are neither are rendered as an
    /// always-false condition and logged.
    pub fn to_cpp<V, E>(&self, api: &Api, source: &str, version_check: &V, extension_check: &E) -> String
    where
        V: Fn(u32, u32) -> String,
        E: Fn(&str, &str) -> String,
    {
        let named = self.atoms();
        self.render_cpp(api, source, &named, version_check, extension_check)
    }

    fn render_cpp<V, E>(&self, api: &Api, source: &str, named: &[&str], version_check: &V, extension_check: &E) -> String
    where
        V: Fn(u32, u32) -> String,
        E: Fn(&str, &str) -> String,
    {
        match self {
            DependsExpr::Atom(atom) => atom_to_cpp(atom, api, source, named, version_check, extension_check),
            DependsExpr::And(terms) | DependsExpr::Or(terms) => {
                let op = if let DependsExpr::And(_) = self { " && " } else { " || " };
                let parts: Vec<String> = terms
                    .iter()
                    .map(|t| t.render_cpp(api, source, named, version_check, extension_check))
                    .collect();
                format!("({})", parts.join(op))
            }
        }
    }
}

/// `named` holds every atom of the whole expression.
fn atom_to_cpp<V, E>(
    atom: &str,
    api: &Api,
    source: &str,
    named: &[&str],
    version_check: &V,
    extension_check: &E,
) -> String
where
    V: Fn(u32, u32) -> String,
    E: Fn(&str, &str) -> String,
{
    if is_version_atom(atom) {
        if let Some((major, minor)) = Version::numbers_from_name(atom) {
            return version_check(major, minor);
        }
    }

    if let Some(ext) = api.extension(atom) {
        let list = if ext.is_device() { "vDEP" } else { "vIEP" };
        let check = extension_check(list, atom);
        return match &ext.promoted_to {
            Some(promoted) if !named.contains(&promoted.as_str()) => {
                match Version::numbers_from_name(promoted).filter(|_| is_version_atom(promoted)) {
                    Some((major, minor)) => format!("({} || {})", version_check(major, minor), check),
                    None => {
                        let promoted_list = match api.extension(promoted) {
                            Some(p) if !p.is_device() => "vIEP",
                            Some(_) => "vDEP",
                            None => list,
                        };
                        format!("({} || {})", extension_check(promoted_list, promoted), check)
                    }
                }
            }
            _ => check,
        };
    }

    warn!("unsupported depends term '{}' in \"{}\"", atom, source);
    format!("false /* UNSUPPORTED CONDITION: {}*/", atom)
}

/// Parses `expr` and checks it against `extensions`. A missing expression is
/// always met; a malformed one is logged and treated as not met.
pub fn is_dependency_met<S: AsRef<str>>(expr: Option<&str>, extensions: &[S]) -> bool {
    match expr {
        None => true,
        Some(text) => match DependsExpr::parse(text) {
            Ok(e) => e.is_met(extensions),
            Err(err) => {
                warn!("{}", err);
                false
            }
        },
    }
}
