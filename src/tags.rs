//! User-authored message snippets, looked up by name from the tag store

use crate::store::{Config, Result};
use crate::template::Expander;
use serde_yaml::Value;

/// A tag as written in the tag document
#[derive(Clone, Debug, PartialEq)]
pub enum TagEntry {
    /// Plain template text, expandable anywhere with `!!name`
    Text(String),
    /// Rendered as an embed, never spliced into other text
    Rich(RichTag),
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RichTag {
    pub title: Option<String>,
    pub content: Option<String>,
    pub message: Option<String>,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
    pub author: Option<String>,
    pub author_icon: Option<String>,
}

impl TagEntry {
    /// `None` for values that cannot be a tag, such as lists or malformed rich tags.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(TagEntry::Text(text.clone())),
            Value::Null => Some(TagEntry::Text(String::new())),
            Value::Bool(b) => Some(TagEntry::Text(b.to_string())),
            Value::Number(n) => Some(TagEntry::Text(n.to_string())),
            Value::Mapping(_) => serde_yaml::from_value(value.clone())
                .ok()
                .map(TagEntry::Rich),
            Value::Sequence(_) | Value::Tagged(_) => None,
        }
    }
}

impl RichTag {
    /// True when there is nothing to show, neither in the embed nor as a message.
    pub fn is_empty(&self) -> bool {
        [
            &self.title,
            &self.content,
            &self.message,
            &self.image,
            &self.thumbnail,
            &self.author,
        ]
        .into_iter()
        .all(|field| field.as_deref().map_or(true, |text| text.trim().is_empty()))
    }

    /// Expand `content` and `message`.  The remaining fields are used as written.
    pub fn expand(&self, expander: &Expander, sender: Option<&str>) -> Result<RichTag> {
        let expand = |field: &Option<String>| {
            field
                .as_deref()
                .map(|text| expander.expand(text, sender))
                .transpose()
        };

        Ok(RichTag {
            content: expand(&self.content)?,
            message: expand(&self.message)?,
            ..self.clone()
        })
    }
}

/// Read-only view of a tag store.  Tag names are single keys at the document root; dots in a name
/// are not path separators.
#[derive(Clone, Copy)]
pub struct Tags<'a> {
    store: &'a Config,
}

impl<'a> Tags<'a> {
    pub fn new(store: &'a Config) -> Self {
        Self { store }
    }

    pub fn get(&self, name: &str) -> Option<TagEntry> {
        self.store.data().get(name).and_then(TagEntry::from_value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.data().contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'a str> {
        self.store.data().keys().filter_map(Value::as_str)
    }

    /// Tag names starting with `prefix`, sorted
    pub fn completions(&self, prefix: &str) -> Vec<&'a str> {
        let mut names: Vec<&str> = self
            .names()
            .filter(|name| name.starts_with(prefix))
            .collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DefaultPolicy;

    const TAGS: &str = "
greet: hello @!sender
rules:
  title: Rules
  content: 'read #rules please'
  message: '@&admin>>'
  author: Mod Team
  author-icon: https://example.com/icon.png
release.notes: see changelog
answer: 42
empty:
broken: [1, 2]
";

    fn store() -> Config {
        let mut tags = Config::new(DefaultPolicy::Empty);
        tags.load_str(TAGS).unwrap();
        tags
    }

    #[test]
    fn plain_and_scalar_tags_are_text() {
        let store = store();
        let tags = Tags::new(&store);

        assert_eq!(tags.get("greet"), Some(TagEntry::Text("hello @!sender".into())));
        assert_eq!(tags.get("answer"), Some(TagEntry::Text("42".into())));
        assert_eq!(tags.get("empty"), Some(TagEntry::Text(String::new())));
    }

    #[test]
    fn mapping_tags_are_rich() {
        let store = store();
        let Some(TagEntry::Rich(rules)) = Tags::new(&store).get("rules") else {
            panic!("rules should be a rich tag");
        };

        assert_eq!(rules.title.as_deref(), Some("Rules"));
        assert_eq!(rules.author_icon.as_deref(), Some("https://example.com/icon.png"));
        assert_eq!(rules.image, None);
    }

    #[test]
    fn names_are_not_split_on_dots() {
        let store = store();
        let tags = Tags::new(&store);

        assert!(tags.contains("release.notes"));
        assert_eq!(tags.get("release.notes"), Some(TagEntry::Text("see changelog".into())));
        assert_eq!(tags.get("release"), None);
    }

    #[test]
    fn absent_and_invalid_tags_are_none() {
        let store = store();
        let tags = Tags::new(&store);

        assert_eq!(tags.get("missing"), None);
        assert_eq!(tags.get("broken"), None);
        assert!(tags.contains("broken"));
    }

    #[test]
    fn completions_filter_by_prefix() {
        let store = store();
        let tags = Tags::new(&store);

        assert_eq!(tags.completions("r"), vec!["release.notes", "rules"]);
        assert_eq!(tags.completions("zzz"), Vec::<&str>::new());
        assert_eq!(tags.completions("").len(), 6);
    }

    #[test]
    fn rich_tag_emptiness() {
        assert!(RichTag::default().is_empty());
        assert!(RichTag {
            content: Some("  ".into()),
            author_icon: Some("https://example.com/icon.png".into()),
            ..RichTag::default()
        }
        .is_empty());
        assert!(!RichTag {
            image: Some("https://example.com/cat.png".into()),
            ..RichTag::default()
        }
        .is_empty());
    }

    #[test]
    fn rich_tag_expands_only_content_and_message() {
        let mut config = Config::new(DefaultPolicy::Raise);
        config
            .load_str("roles:\n  admin: 1\nchannels:\n  rules: 2\n")
            .unwrap();
        let store = store();
        let expander = Expander::new(&config, Tags::new(&store));

        let rich = RichTag {
            title: Some("#rules ".into()),
            content: Some("read #rules please".into()),
            message: Some("@&admin>>".into()),
            ..RichTag::default()
        };
        let expanded = rich.expand(&expander, None).unwrap();

        assert_eq!(expanded.title.as_deref(), Some("#rules "));
        assert_eq!(expanded.content.as_deref(), Some("read <#2> please"));
        assert_eq!(expanded.message.as_deref(), Some("<@&1>"));
    }
}
