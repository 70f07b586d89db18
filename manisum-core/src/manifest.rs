use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping of relative path to digest, kept in byte-wise ascending path order.
///
/// Inserting an existing path overwrites its digest.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous digest when `rel_path` was already present.
    pub fn insert(&mut self, rel_path: impl Into<String>, digest: impl Into<String>) -> Option<String> {
        self.entries.insert(rel_path.into(), digest.into())
    }

    pub fn get(&self, rel_path: &str) -> Option<&str> {
        self.entries.get(rel_path).map(String::as_str)
    }

    pub fn contains(&self, rel_path: &str) -> bool {
        self.entries.contains_key(rel_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in ascending path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, d)| (p.as_str(), d.as_str()))
    }
}

impl<P: Into<String>, D: Into<String>> FromIterator<(P, D)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (P, D)>>(iter: I) -> Self {
        let mut m = Manifest::new();
        for (p, d) in iter {
            m.insert(p, d);
        }
        m
    }
}
