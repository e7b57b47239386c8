//! Dotted paths into a store document.
//!
//! Document keys are written in kebab-case (`not-found`) while Rust identifiers are snake_case
//! (`not_found`).  [`Key::attr`] bridges the two, which is what the [`key!`](crate::key) macro
//! uses, so `key!(messages.tag.not_found)` names the document path `messages.tag.not-found`.

use std::fmt;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Key {
    segments: Vec<String>,
}

impl Key {
    /// The empty path, which names the document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Append an identifier-style segment, turning underscores into hyphens.
    pub fn attr(mut self, name: &str) -> Self {
        self.segments.push(name.replace('_', "-"));
        self
    }

    /// Append a segment verbatim, e.g. a name that came from user input.
    pub fn append(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn to_path_string(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_path_string())
    }
}

/// Build a [`Key`] from dotted identifiers: `key!(features.react_roles.message)`.
#[macro_export]
macro_rules! key {
    ($($segment:ident).+) => {{
        $crate::key::Key::root()$(.attr(stringify!($segment)))+
    }};
}
