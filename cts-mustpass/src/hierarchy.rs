//! Test hierarchy dumps (`GROUP: a.b` / `TEST: a.b.c` lines) and their
//! conversion to Android CTS test package XML.

use std::collections::HashMap;

use xml::writer::{EmitterConfig, EventWriter, XmlEvent};

use crate::error::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub groups: Vec<usize>,
    pub tests: Vec<String>,
}

/// Groups are stored flat and refer to their children by index; both
/// children and tests keep file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hierarchy {
    groups: Vec<Group>,
    roots: Vec<usize>,
    by_path: HashMap<String, usize>,
    test_count: usize,
}

fn split_path(path: &str) -> (Option<&str>, &str) {
    match path.rfind('.') {
        Some(i) => (Some(&path[..i]), &path[i + 1..]),
        None => (None, path),
    }
}

impl Hierarchy {
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut hierarchy = Hierarchy::default();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let err = |message: String| Error::HierarchyError { line: i + 1, message };
            if let Some(path) = line.strip_prefix("GROUP:") {
                hierarchy.group(path.trim());
            } else if let Some(path) = line.strip_prefix("TEST:") {
                let path = path.trim();
                let (parent, name) = split_path(path);
                let parent = parent.ok_or_else(|| err(format!("test '{}' has no group", path)))?;
                let group = hierarchy.group(parent);
                if hierarchy.groups[group].tests.iter().any(|t| t == name) {
                    return Err(err(format!("duplicate test '{}'", path)));
                }
                hierarchy.groups[group].tests.push(name.to_string());
                hierarchy.test_count += 1;
            } else {
                return Err(err(format!("unrecognized line '{}'", line)));
            }
        }
        Ok(hierarchy)
    }

    /// Index of the group at `path`, creating it and any missing parents.
    fn group(&mut self, path: &str) -> usize {
        if let Some(&index) = self.by_path.get(path) {
            return index;
        }
        let (parent, name) = split_path(path);
        let parent = parent.map(|p| self.group(p));
        let index = self.groups.len();
        self.groups.push(Group {
            name: name.to_string(),
            ..Group::default()
        });
        match parent {
            Some(p) => self.groups[p].groups.push(index),
            None => self.roots.push(index),
        }
        self.by_path.insert(path.to_string(), index);
        index
    }

    pub fn roots(&self) -> impl Iterator<Item = &Group> {
        self.roots.iter().map(move |&i| &self.groups[i])
    }

    pub fn get(&self, index: usize) -> &Group {
        &self.groups[index]
    }

    pub fn test_count(&self) -> usize {
        self.test_count
    }

    fn has_tests(&self, index: usize) -> bool {
        let group = &self.groups[index];
        !group.tests.is_empty() || group.groups.iter().any(|&g| self.has_tests(g))
    }

    /// Full paths of every test, depth first.
    pub fn test_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        for &root in &self.roots {
            self.collect_paths(root, "", &mut out);
        }
        out
    }

    fn collect_paths(&self, index: usize, prefix: &str, out: &mut Vec<String>) {
        let group = &self.groups[index];
        let path = if prefix.is_empty() {
            group.name.clone()
        } else {
            format!("{}.{}", prefix, group.name)
        };
        for test in &group.tests {
            out.push(format!("{}.{}", path, test));
        }
        for &child in &group.groups {
            self.collect_paths(child, &path, out);
        }
    }

    /// Android CTS XML for the hierarchy. Groups without any test below
    /// them are left out.
    pub fn to_cts_xml(&self, package: &str) -> Result<String, Error> {
        let mut out = Vec::new();
        {
            let mut w = EmitterConfig::new()
                .perform_indent(true)
                .indent_string("\t")
                .create_writer(&mut out);
            w.write(XmlEvent::start_element("TestPackage").attr("name", package))?;
            for &root in &self.roots {
                self.write_group(&mut w, root)?;
            }
            w.write(XmlEvent::end_element())?;
        }
        let mut text = String::from_utf8_lossy(&out).into_owned();
        text.push('\n');
        Ok(text)
    }

    fn write_group(&self, w: &mut EventWriter<&mut Vec<u8>>, index: usize) -> Result<(), Error> {
        if !self.has_tests(index) {
            return Ok(());
        }
        let group = &self.groups[index];
        w.write(XmlEvent::start_element("TestSuite").attr("name", &group.name))?;
        if !group.tests.is_empty() {
            w.write(XmlEvent::start_element("TestCase").attr("name", &group.name))?;
            for test in &group.tests {
                w.write(XmlEvent::start_element("Test").attr("name", test))?;
                w.write(XmlEvent::end_element())?;
            }
            w.write(XmlEvent::end_element())?;
        }
        for &child in &group.groups {
            self.write_group(w, child)?;
        }
        w.write(XmlEvent::end_element())?;
        Ok(())
    }
}
