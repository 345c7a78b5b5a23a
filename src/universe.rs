//! The set of file paths seen across all snapshots

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Union of member paths across every unpacked snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUniverse {
    paths: BTreeSet<String>,
}

impl FileUniverse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.paths.insert(path.into())
    }

    pub fn merge(&mut self, other: FileUniverse) {
        self.paths.extend(other.paths);
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Every path, unfiltered
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Paths the filter accepts, in sorted order
    pub fn tracked<'a>(&'a self, filter: &'a ExtensionFilter) -> impl Iterator<Item = &'a str> + 'a {
        self.iter().filter(move |p| filter.matches(p))
    }
}

impl<S: Into<String>> FromIterator<S> for FileUniverse {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Suffix match on structured-data extensions
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
    case_insensitive: bool,
}

impl ExtensionFilter {
    pub fn new<I, S>(extensions: I, case_insensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|e| {
                let e = e.as_ref().trim();
                let e = if e.starts_with('.') { e.to_string() } else { format!(".{}", e) };
                if case_insensitive { e.to_lowercase() } else { e }
            })
            .collect();

        Self {
            extensions,
            case_insensitive,
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        if self.case_insensitive {
            let lowered = path.to_lowercase();
            self.extensions.iter().any(|e| lowered.ends_with(e.as_str()))
        } else {
            self.extensions.iter().any(|e| path.ends_with(e.as_str()))
        }
    }
}
