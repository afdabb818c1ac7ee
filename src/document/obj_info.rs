//! `obj_info` metadata of a PLY header.
//!
//! Free-form key/value strings outside the element schema, e.g.
//! `obj_info num_cols 640`. The key is the first word after the keyword and
//! the value is the rest of the line, possibly empty. A repeated key replaces
//! the earlier value in place.

use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use crate::header::format::OBJ_INFO_KEYWORD;

/// `obj_info` entries in the order their keys were first declared.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ObjInfo {
    entries: SmallVec<[(String, String); 4]>,
}

impl ObjInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `obj_info <key> <value>`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Value of `key` parsed as `T`, e.g. the `num_cols` of a range grid.
    ///
    /// `None` when the key is missing or its value does not parse.
    pub fn parse<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key)?.parse().ok()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One header line per entry, `obj_info <key> <value>`.
impl fmt::Display for ObjInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.iter() {
            if value.is_empty() {
                writeln!(f, "{OBJ_INFO_KEYWORD} {key}")?;
            } else {
                writeln!(f, "{OBJ_INFO_KEYWORD} {key} {value}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ObjInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
