//! The parameter tree: nested `subsection` scopes holding `set` entries.

use std::fmt;
use std::mem;
use std::path::Path;

use log::debug;

use crate::error::{ConfigError, Error};

mod parser;
pub mod pattern;
pub mod value;

pub use parser::ParameterParser;
pub use pattern::Pattern;
pub use value::{split_list, ParameterValue};

/// Trims a section or entry name and collapses inner whitespace runs to one space.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn owned_path(path: &[&str]) -> Vec<String> {
    path.iter().map(|name| normalize_name(name)).collect()
}

/// The text of one `set` entry and the line it was last set on.
#[derive(Debug, Clone)]
pub struct Leaf {
    value: String,
    line: usize,
}

impl Leaf {
    pub fn new(value: impl Into<String>, line: usize) -> Self {
        Self {
            value: value.into(),
            line,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn parse<T: ParameterValue>(&self) -> Option<T> {
        T::from_text(&self.value)
    }
}

// Line numbers are provenance, not content.
impl PartialEq for Leaf {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(Leaf),
    Section(Section),
}

/// A scope of uniquely named entries and subsections, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    entries: Vec<(String, Node)>,
}

impl Section {
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        let key = normalize_name(key);
        self.entries
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, node)| node)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|(name, _)| name == key)
            .map(|(_, node)| node)
    }

    pub fn leaf(&self, key: &str) -> Option<&Leaf> {
        match self.get(key) {
            Some(Node::Leaf(leaf)) => Some(leaf),
            _ => None,
        }
    }

    pub fn subsection(&self, name: &str) -> Option<&Section> {
        match self.get(name) {
            Some(Node::Section(section)) => Some(section),
            _ => None,
        }
    }

    pub fn section(&self, path: &[&str]) -> Option<&Section> {
        path.iter()
            .try_fold(self, |section, name| section.subsection(name))
    }

    /// Stores a value, overwriting an earlier one in place. Fails if `key`
    /// already names a subsection.
    pub(crate) fn insert_leaf(&mut self, key: &str, leaf: Leaf) -> Result<(), String> {
        match self.get_mut(key) {
            Some(Node::Leaf(existing)) => {
                debug!(
                    "`{}` set again on line {} (was `{}` from line {})",
                    key, leaf.line, existing.value, existing.line
                );
                *existing = leaf;
                Ok(())
            }
            Some(Node::Section(_)) => Err(format!("`{}` is already a subsection", key)),
            None => {
                self.entries.push((key.to_string(), Node::Leaf(leaf)));
                Ok(())
            }
        }
    }

    /// Takes the subsection `name` out for editing, leaving an empty one in
    /// its place; it is created if missing. Pair with [`Section::restore`].
    pub(crate) fn open(&mut self, name: &str) -> Result<Section, String> {
        match self.get_mut(name) {
            Some(Node::Section(section)) => Ok(mem::take(section)),
            Some(Node::Leaf(_)) => Err(format!("`{}` is already a parameter", name)),
            None => {
                self.entries
                    .push((name.to_string(), Node::Section(Section::default())));
                Ok(Section::default())
            }
        }
    }

    pub(crate) fn restore(&mut self, name: &str, section: Section) {
        if let Some(Node::Section(slot)) = self.get_mut(name) {
            *slot = section;
        }
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        for (key, node) in &self.entries {
            match node {
                Node::Leaf(leaf) => writeln!(
                    f,
                    "{}set {} = {}",
                    indent,
                    escape(key).replace('=', "\\="),
                    terminate(escape(&leaf.value))
                )?,
                Node::Section(section) => {
                    writeln!(f, "{}subsection {}", indent, terminate(escape(key)))?;
                    section.write(f, depth + 1)?;
                    writeln!(f, "{}end", indent)?;
                }
            }
        }
        Ok(())
    }
}

fn escape(text: &str) -> String {
    text.replace('#', "\\#")
}

/// A trailing backslash would continue onto the next line; an empty comment
/// after it keeps the statement on one line.
fn terminate(text: String) -> String {
    if text.ends_with('\\') {
        text + " #"
    } else {
        text
    }
}

/// A parsed parameter file.
///
/// Lookups take a section path (outermost first) and an entry name; names
/// are matched after whitespace normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
    root: Section,
}

impl ConfigTree {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        ParameterParser::parse_parameters(text)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Read {} bytes from {}", text.len(), path.display());
        Ok(Self::parse(&text)?)
    }

    pub(crate) fn from_root(root: Section) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Section {
        &self.root
    }

    pub fn section(&self, path: &[&str]) -> Option<&Section> {
        self.root.section(path)
    }

    pub fn contains(&self, path: &[&str], key: &str) -> bool {
        self.section(path).and_then(|s| s.leaf(key)).is_some()
    }

    /// Sets `key` in the section at `path`, creating sections as needed.
    pub fn set(&mut self, path: &[&str], key: &str, value: impl Into<String>) -> Result<(), ConfigError> {
        let key = normalize_name(key);
        let names = owned_path(path);
        let structural = |message: String| ConfigError::Structural {
            line: 0,
            message,
            scope: names.clone(),
        };

        let mut opened: Vec<(String, Section)> = Vec::new();
        let mut current = mem::take(&mut self.root);
        let mut result = Ok(());
        for name in &names {
            match current.open(name) {
                Ok(child) => opened.push((name.clone(), mem::replace(&mut current, child))),
                Err(message) => {
                    result = Err(structural(message));
                    break;
                }
            }
        }
        if result.is_ok() {
            result = current.insert_leaf(&key, Leaf::new(value, 0)).map_err(structural);
        }
        while let Some((name, mut parent)) = opened.pop() {
            parent.restore(&name, current);
            current = parent;
        }
        self.root = current;
        result
    }

    pub fn leaf(&self, path: &[&str], key: &str) -> Result<&Leaf, ConfigError> {
        self.section(path)
            .and_then(|section| section.leaf(key))
            .ok_or_else(|| ConfigError::MissingKey {
                path: owned_path(path),
                key: normalize_name(key),
            })
    }

    /// The raw text of an entry.
    pub fn get_str(&self, path: &[&str], key: &str) -> Result<&str, ConfigError> {
        self.leaf(path, key).map(Leaf::value)
    }

    pub fn get<T: ParameterValue>(&self, path: &[&str], key: &str) -> Result<T, ConfigError> {
        let leaf = self.leaf(path, key)?;
        leaf.parse().ok_or_else(|| ConfigError::Type {
            expected: T::expected(),
            path: owned_path(path),
            key: normalize_name(key),
            text: leaf.value.clone(),
        })
    }

    /// Like [`ConfigTree::get`], but an absent entry yields `default`. A
    /// present entry that fails to parse is still an error.
    pub fn get_or<T: ParameterValue>(
        &self,
        path: &[&str],
        key: &str,
        default: T,
    ) -> Result<T, ConfigError> {
        match self.get(path, key) {
            Err(ConfigError::MissingKey { .. }) => Ok(default),
            other => other,
        }
    }

    pub fn get_string(&self, path: &[&str], key: &str) -> Result<String, ConfigError> {
        self.get(path, key)
    }

    pub fn get_real(&self, path: &[&str], key: &str) -> Result<f64, ConfigError> {
        self.get(path, key)
    }

    pub fn get_int(&self, path: &[&str], key: &str) -> Result<i64, ConfigError> {
        self.get(path, key)
    }

    pub fn get_bool(&self, path: &[&str], key: &str) -> Result<bool, ConfigError> {
        self.get(path, key)
    }

    pub fn get_list<T: ParameterValue>(
        &self,
        path: &[&str],
        key: &str,
    ) -> Result<Vec<T>, ConfigError> {
        self.get(path, key)
    }

    /// The raw text of an entry, if it matches `pattern`.
    pub fn get_checked(
        &self,
        path: &[&str],
        key: &str,
        pattern: &Pattern,
    ) -> Result<&str, ConfigError> {
        let leaf = self.leaf(path, key)?;
        if pattern.matches(&leaf.value) {
            Ok(leaf.value.trim())
        } else {
            Err(ConfigError::Type {
                expected: pattern.description(),
                path: owned_path(path),
                key: normalize_name(key),
                text: leaf.value.clone(),
            })
        }
    }

    /// An entry that must be one of `options`.
    pub fn get_selection(
        &self,
        path: &[&str],
        key: &str,
        options: &[&str],
    ) -> Result<&str, ConfigError> {
        let pattern = Pattern::Selection(options.iter().map(|o| o.to_string()).collect());
        self.get_checked(path, key, &pattern)
    }
}

impl fmt::Display for ConfigTree {
    /// Writes the tree back in parameter-file syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.write(f, 0)
    }
}
