//! Checkpoint structure: an ordered collection of named parameter arrays

use crate::tensor::ParamArray;
use std::collections::HashMap;

/// Named parameter arrays in insertion order
///
/// Re-inserting an existing name replaces its value without moving it, so
/// the order of an archive written from a checkpoint is the order in which
/// names were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Checkpoint {
    entries: Vec<(String, ParamArray)>,
    index: HashMap<String, usize>,
}

impl Checkpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ParamArray> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ParamArray> {
        match self.index.get(name) {
            Some(&i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    /// Insert a parameter, returning the previous value if the name existed
    pub fn insert(&mut self, name: impl Into<String>, value: ParamArray) -> Option<ParamArray> {
        let name = name.into();
        if let Some(&i) = self.index.get(&name) {
            return Some(std::mem::replace(&mut self.entries[i].1, value));
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, value));
        None
    }

    /// Parameter names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamArray)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>> FromIterator<(K, ParamArray)> for Checkpoint {
    fn from_iter<I: IntoIterator<Item = (K, ParamArray)>>(iter: I) -> Self {
        let mut checkpoint = Checkpoint::new();
        for (name, value) in iter {
            checkpoint.insert(name, value);
        }
        checkpoint
    }
}

impl IntoIterator for Checkpoint {
    type Item = (String, ParamArray);
    type IntoIter = std::vec::IntoIter<(String, ParamArray)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
