//! User-facing message texts

use crate::key::Key;
use crate::store::Config;
use std::fmt::Display;

/// Read-only view of the language store.
///
/// Missing texts come back as their own path (e.g. `messages.tag.not-found`) so a gap in the
/// translation shows up in chat instead of an empty message.
#[derive(Clone, Copy)]
pub struct Language<'a> {
    store: &'a Config,
}

impl<'a> Language<'a> {
    pub fn new(store: &'a Config) -> Self {
        Self { store }
    }

    pub fn text(&self, key: &Key) -> String {
        let path = key.to_path_string();
        self.store.get_string(&path, None).unwrap_or(path)
    }

    /// The text at `key` with its placeholders filled, see [`fill`].
    pub fn format(&self, key: &Key, args: &[&dyn Display]) -> String {
        fill(&self.text(key), args)
    }
}

/// Fill `{}` placeholders in order and `{N}` placeholders by index.  `{{` and `}}` are literal
/// braces.  Placeholders without a matching argument are left in place.
pub fn fill(template: &str, args: &[&dyn Display]) -> String {
    let mut filled = String::with_capacity(template.len());
    let mut next = 0;
    let mut rest = template;

    while let Some(brace) = rest.find(|c: char| c == '{' || c == '}') {
        filled.push_str(&rest[..brace]);
        let tail = &rest[brace..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            filled.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }

        if let Some(close) = tail.strip_prefix('{').and_then(|t| t.find('}')) {
            let field = &tail[1..=close];
            let arg = if field.is_empty() {
                next += 1;
                args.get(next - 1)
            } else {
                field.parse::<usize>().ok().and_then(|index| args.get(index))
            };

            if let Some(arg) = arg {
                filled.push_str(&arg.to_string());
                rest = &tail[close + 2..];
                continue;
            }
        }

        filled.push_str(&tail[..1]);
        rest = &tail[1..];
    }

    filled.push_str(rest);
    filled
}
