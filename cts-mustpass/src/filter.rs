//! Include/exclude filtering of case lists.
//!
//! Filters apply in order. Every case starts out kept; an include filter
//! keeps only cases it matches, an exclude filter drops the cases it matches.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::warn;
use regex::Regex;

use crate::case_list::{parse_lines, read_lines};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Include,
    Exclude,
}

/// Translates a shell wildcard (`*`, `?`, `[...]`, `[!...]`) into an
/// anchored regular expression.
pub fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::from("^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                let mut class = String::new();
                let mut closed = false;
                if chars.peek() == Some(&'!') {
                    chars.next();
                    class.push('^');
                }
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    if c == '\\' || c == '[' {
                        class.push('\\');
                    }
                    class.push(c);
                }
                if closed {
                    out.push('[');
                    out.push_str(&class);
                    out.push(']');
                } else {
                    out.push_str(&regex::escape("["));
                    out.push_str(&regex::escape(&class));
                }
            }
            c => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    out.push('$');
    out
}

fn is_wildcard(pattern: &str) -> bool {
    pattern.contains(|c| matches!(c, '*' | '?' | '['))
}

/// One pattern and the filter file it was read from.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub text: String,
    pub source: PathBuf,
    regex: Option<Regex>,
}

impl Pattern {
    pub fn new(text: &str, source: &Path) -> Result<Self, Error> {
        let regex = if is_wildcard(text) {
            let regex = Regex::new(&glob_to_regex(text)).map_err(|error| Error::PatternError {
                file: source.to_path_buf(),
                pattern: text.to_string(),
                error,
            })?;
            Some(regex)
        } else {
            None
        };
        Ok(Pattern {
            text: text.to_string(),
            source: source.to_path_buf(),
            regex,
        })
    }

    pub fn matches(&self, case: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(case),
            None => self.text == case,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Filter {
    pub kind: FilterKind,
    /// Exact names, indexed into `patterns`. A name listed twice keeps both
    /// indices.
    exact: HashMap<String, Vec<usize>>,
    wildcards: Vec<usize>,
    patterns: Vec<Pattern>,
}

impl Filter {
    pub fn new(kind: FilterKind) -> Self {
        Filter {
            kind,
            exact: HashMap::new(),
            wildcards: Vec::new(),
            patterns: Vec::new(),
        }
    }

    pub fn add_pattern(&mut self, pattern: Pattern) {
        let index = self.patterns.len();
        if pattern.regex.is_some() {
            self.wildcards.push(index);
        } else {
            self.exact.entry(pattern.text.clone()).or_default().push(index);
        }
        self.patterns.push(pattern);
    }

    /// Adds the patterns in `text`, one per line, as read from `source`.
    pub fn add_text(&mut self, text: &str, source: &Path) -> Result<(), Error> {
        for line in parse_lines(text) {
            self.add_pattern(Pattern::new(&line, source)?);
        }
        Ok(())
    }

    pub fn load(kind: FilterKind, files: &[PathBuf]) -> Result<Self, Error> {
        let mut filter = Filter::new(kind);
        for file in files {
            for line in read_lines(file)? {
                filter.add_pattern(Pattern::new(&line, file)?);
            }
        }
        Ok(filter)
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Indices of every pattern matching `case`.
    fn matching<'a>(&'a self, case: &'a str) -> impl Iterator<Item = usize> + 'a {
        let exact = self.exact.get(case).into_iter().flatten().copied();
        let wildcards = self
            .wildcards
            .iter()
            .copied()
            .filter(move |&i| self.patterns[i].matches(case));
        exact.chain(wildcards)
    }
}

/// Match counts per pattern, per filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternUsage {
    counts: Vec<Vec<usize>>,
}

impl PatternUsage {
    pub fn count(&self, filter: usize, pattern: usize) -> usize {
        self.counts[filter][pattern]
    }

    /// Patterns that matched no case.
    pub fn unused<'a>(&'a self, filters: &'a [Filter]) -> impl Iterator<Item = &'a Pattern> + 'a {
        filters.iter().zip(&self.counts).flat_map(|(filter, counts)| {
            filter
                .patterns
                .iter()
                .zip(counts)
                .filter(|(_, count)| **count == 0)
                .map(|(pattern, _)| pattern)
        })
    }

    pub fn warn_unused(&self, filters: &[Filter]) {
        for pattern in self.unused(filters) {
            warn!(
                "{}: pattern '{}' does not match any case",
                pattern.source.display(),
                pattern.text
            );
        }
    }
}

/// Applies `filters` in order and returns the kept cases in their original
/// order together with how often each pattern matched. A filter only sees
/// the cases the filters before it kept.
pub fn apply_filters(cases: &[String], filters: &[Filter]) -> (Vec<String>, PatternUsage) {
    let mut usage = PatternUsage {
        counts: filters.iter().map(|f| vec![0; f.patterns.len()]).collect(),
    };
    let mut kept = Vec::new();
    for case in cases {
        let mut keep = true;
        for (filter, counts) in filters.iter().zip(usage.counts.iter_mut()) {
            let mut matched = false;
            for i in filter.matching(case) {
                counts[i] += 1;
                matched = true;
            }
            keep = match filter.kind {
                FilterKind::Include => matched,
                FilterKind::Exclude => !matched,
            };
            if !keep {
                break;
            }
        }
        if keep {
            kept.push(case.clone());
        }
    }
    (kept, usage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn globs() {
        assert_eq!(glob_to_regex("dEQP.api.*"), r"^dEQP\.api\..*$");
        assert_eq!(glob_to_regex("a?c"), "^a.c$");
        assert_eq!(glob_to_regex("a[!bc]d"), "^a[^bc]d$");
        assert_eq!(glob_to_regex("a[bc"), r"^a\[bc$");
    }

    #[test]
    fn exact_and_wildcard_patterns() {
        let source = Path::new("test.txt");
        assert!(Pattern::new("a.b.c", source).unwrap().matches("a.b.c"));
        assert!(!Pattern::new("a.b.c", source).unwrap().matches("a.b.cd"));
        assert!(Pattern::new("a.b.*", source).unwrap().matches("a.b.cd"));
        assert!(!Pattern::new("a.b.*", source).unwrap().matches("xa.b.c"));
        assert!(Pattern::new("a.b.[cd]", source).unwrap().matches("a.b.d"));
    }
}
