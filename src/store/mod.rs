//! Hierarchical key-value store backing the bot's config, language and tag documents
//!
//! A store holds one YAML mapping.  Values are addressed with dotted paths (`roles.admin`), and
//! each store has a [`DefaultPolicy`] deciding what a lookup of a missing path yields.

mod error;
mod file;
mod transaction;

pub use error::{Error, Result};
pub use file::ConfigFile;
pub use transaction::Snapshot;

use serde_yaml::{Mapping, Value};
use std::{io::ErrorKind, path::Path};

/// What a typed accessor returns when the path is missing and no explicit default was passed.
///
/// | policy     | object / list | string        | integer  |
/// |------------|---------------|---------------|----------|
/// | `Raise`    | `NotFound`    | `NotFound`    | `NotFound` |
/// | `Identity` | empty         | the path      | `NotFound` |
/// | `Empty`    | empty         | `""`          | `NotFound` |
///
/// Integers have no meaningful empty value, so callers that want a fallback must pass one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefaultPolicy {
    /// Missing paths are errors.  Used for the bot configuration.
    Raise,
    /// Missing paths yield the path itself, so untranslated messages stay visible.
    Identity,
    /// Missing paths yield empty values.  Used for tags.
    Empty,
}

#[derive(Clone, Debug)]
pub struct Config {
    data: Mapping,
    policy: DefaultPolicy,
}

enum Resolved<'a> {
    Root(&'a Mapping),
    Value(&'a Value),
}

impl Config {
    pub fn new(policy: DefaultPolicy) -> Self {
        Self {
            data: Mapping::new(),
            policy,
        }
    }

    pub fn policy(&self) -> DefaultPolicy {
        self.policy
    }

    /// The root mapping
    pub fn data(&self) -> &Mapping {
        &self.data
    }

    /// Merge a YAML document into the store.
    ///
    /// Only the root is merged: a top-level key present in `source` replaces the existing value
    /// wholesale, nested mappings are not combined.  On error the store is left untouched.
    pub fn load_str(&mut self, source: &str) -> Result<()> {
        for (key, value) in parse_document(source)? {
            self.data.insert(key, value);
        }
        Ok(())
    }

    /// Merge the YAML document at `path` into the store.  A missing file is not an error.
    pub async fn load_file(&mut self, path: &Path) -> Result<()> {
        match tokio::fs::read_to_string(path).await {
            Ok(source) => self.load_str(&source),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(&self.data).map_err(Error::Serialize)
    }

    /// Write the store to `path` as YAML.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        file::write_atomic(path, &self.to_yaml_string()?).await
    }

    pub fn get_object(&self, path: &str, default: Option<Mapping>) -> Result<Mapping> {
        match self.resolve(path)? {
            Some(Resolved::Root(root)) => Ok(root.clone()),
            Some(Resolved::Value(Value::Mapping(mapping))) => Ok(mapping.clone()),
            Some(Resolved::Value(_)) => Err(mismatch(path, "a mapping")),
            None => default
                .or_else(|| self.empty_fallback(Mapping::new))
                .ok_or_else(|| Error::NotFound(path.to_owned())),
        }
    }

    pub fn get_list(&self, path: &str, default: Option<Vec<Value>>) -> Result<Vec<Value>> {
        match self.resolve(path)? {
            Some(Resolved::Value(Value::Sequence(list))) => Ok(list.clone()),
            Some(_) => Err(mismatch(path, "a list")),
            None => default
                .or_else(|| self.empty_fallback(Vec::new))
                .ok_or_else(|| Error::NotFound(path.to_owned())),
        }
    }

    pub fn get_string(&self, path: &str, default: Option<&str>) -> Result<String> {
        match self.resolve(path)? {
            Some(Resolved::Value(Value::String(string))) => Ok(string.clone()),
            Some(_) => Err(mismatch(path, "a string")),
            None => match (default, self.policy) {
                (Some(default), _) => Ok(default.to_owned()),
                (None, DefaultPolicy::Identity) => Ok(path.to_owned()),
                (None, DefaultPolicy::Empty) => Ok(String::new()),
                (None, DefaultPolicy::Raise) => Err(Error::NotFound(path.to_owned())),
            },
        }
    }

    pub fn get_integer(&self, path: &str, default: Option<i64>) -> Result<i64> {
        match self.resolve(path)? {
            Some(Resolved::Value(Value::Number(number))) => {
                number.as_i64().ok_or_else(|| mismatch(path, "an integer"))
            }
            Some(_) => Err(mismatch(path, "an integer")),
            None => default.ok_or_else(|| Error::NotFound(path.to_owned())),
        }
    }

    /// Walk every segment of `path` without applying the default policy.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = split_path(path).into_iter();
        let mut node = self.data.get(segments.next()?)?;
        for segment in segments {
            node = node.as_mapping()?.get(segment)?;
        }
        Some(node)
    }

    pub fn contains(&self, path: &str) -> bool {
        path.is_empty() || self.lookup(path).is_some()
    }

    /// Assign `value` at `path`, creating intermediate mappings and replacing any non-mapping
    /// value standing in the way.  The empty path replaces the root if `value` is a mapping.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        let value = value.into();
        let segments = split_path(path);
        if segments.is_empty() {
            if let Value::Mapping(root) = value {
                self.data = root;
            }
            return;
        }
        insert_path(&mut self.data, &segments, value);
    }

    /// Remove and return the value at `path`.
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        remove_path(&mut self.data, &split_path(path))
    }

    // Walks all but the last segment as mappings.  `Ok(None)` means the path is missing.
    fn resolve(&self, path: &str) -> Result<Option<Resolved<'_>>> {
        let segments = split_path(path);
        let Some((last, parents)) = segments.split_last() else {
            return Ok(Some(Resolved::Root(&self.data)));
        };

        let mut node = &self.data;
        for segment in parents {
            match node.get(*segment) {
                Some(Value::Mapping(child)) => node = child,
                Some(_) => return Err(Error::NotFound(path.to_owned())),
                None => return Ok(None),
            }
        }

        Ok(node.get(*last).map(Resolved::Value))
    }

    fn empty_fallback<T>(&self, empty: impl FnOnce() -> T) -> Option<T> {
        match self.policy {
            DefaultPolicy::Raise => None,
            DefaultPolicy::Identity | DefaultPolicy::Empty => Some(empty()),
        }
    }
}

impl Snapshot for Config {
    type State = Mapping;

    fn snapshot(&self) -> Mapping {
        self.data.clone()
    }

    fn restore(&mut self, state: Mapping) {
        self.data = state;
    }
}

fn split_path(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('.').collect()
    }
}

fn parse_document(source: &str) -> Result<Mapping> {
    if source.trim().is_empty() {
        return Ok(Mapping::new());
    }

    let document: Value = serde_yaml::from_str(source)?;
    match document {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(Error::RootNotMapping),
    }
}

fn insert_path(node: &mut Mapping, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            node.insert(Value::from(*last), value);
        }
        [first, rest @ ..] => {
            let child = node.entry(Value::from(*first)).or_insert(Value::Null);
            if !child.is_mapping() {
                *child = Value::Mapping(Mapping::new());
            }
            if let Value::Mapping(child) = child {
                insert_path(child, rest, value);
            }
        }
    }
}

fn remove_path(node: &mut Mapping, segments: &[&str]) -> Option<Value> {
    match segments {
        [] => None,
        [last] => node.remove(*last),
        [first, rest @ ..] => match node.get_mut(*first) {
            Some(Value::Mapping(child)) => remove_path(child, rest),
            _ => None,
        },
    }
}

fn mismatch(path: &str, expected: &'static str) -> Error {
    Error::TypeMismatch {
        path: path.to_owned(),
        expected,
    }
}
