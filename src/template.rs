//! Markup expansion for announcements, tags and `!f` messages
//!
//! Supported markup, each name terminated by whitespace or `>>`:
//!
//! - `@!sender` - mention of whoever triggered the message, `@here` if nobody did
//! - `@&name` - mention of the role configured at `roles.<name>`
//! - `#name` - mention of the channel configured at `channels.<name>`
//! - `!!name` - contents of tag `name`, itself expanded
//!
//! A whitespace terminator comes out as a single space, `>>` is swallowed so markup can be glued
//! to following text: `@&admin>>s` becomes `<@&123>s`.  Unknown names are left as plain text.

use crate::store::{Config, Error, Result};
use crate::tags::{TagEntry, Tags};
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::sync::LazyLock;

pub const SENDER_PLACEHOLDER: &str = "@!sender";
pub const NO_SENDER_MENTION: &str = "@here";
pub const RECURSION_PLACEHOLDER: &str = "[...recursive]";
/// How many tags may be nested inside each other before expansion gives up
pub const MAX_EXPANSION_DEPTH: usize = 16;

const CLOSING_MARKER: &str = ">>";

static ROLE_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@&(\S+?)(\s|>>)").expect("role markup pattern is valid"));
static CHANNEL_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\S+?)(\s|>>)").expect("channel markup pattern is valid"));
static TAG_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!!(\S+?)(\s|>>)").expect("tag markup pattern is valid"));

/// Expands markup using `roles`/`channels` from the bot config and the given tags.
pub struct Expander<'a> {
    config: &'a Config,
    tags: Tags<'a>,
}

impl<'a> Expander<'a> {
    pub fn new(config: &'a Config, tags: Tags<'a>) -> Self {
        Self { config, tags }
    }

    /// Expand all markup in `text`.  `sender` is the mention used for `@!sender`.
    ///
    /// Fails only when tags nest deeper than [`MAX_EXPANSION_DEPTH`].  A tag that refers back to
    /// a tag it is part of expands to [`RECURSION_PLACEHOLDER`] at that point.
    pub fn expand(&self, text: &str, sender: Option<&str>) -> Result<String> {
        self.expand_within(text, sender, &mut Vec::new())
    }

    // `chain` holds the tags currently being expanded, outermost first.
    fn expand_within(
        &self,
        text: &str,
        sender: Option<&str>,
        chain: &mut Vec<String>,
    ) -> Result<String> {
        let text = text.replace(SENDER_PLACEHOLDER, sender.unwrap_or(NO_SENDER_MENTION));

        let roles = self.id_map("roles");
        let text = substitute(&ROLE_MARKUP, &text, |name, end| {
            Ok(match mention_id(&roles, name) {
                Some(id) => format!("<@&{id}>{end}"),
                None => format!("@{name}{end}"),
            })
        })?;

        let channels = self.id_map("channels");
        let text = substitute(&CHANNEL_MARKUP, &text, |name, end| {
            Ok(match mention_id(&channels, name) {
                Some(id) => format!("<#{id}>{end}"),
                None => format!("#{name}{end}"),
            })
        })?;

        substitute(&TAG_MARKUP, &text, |name, end| {
            self.expand_tag(name, end, sender, chain)
        })
    }

    fn expand_tag(
        &self,
        name: &str,
        end: &str,
        sender: Option<&str>,
        chain: &mut Vec<String>,
    ) -> Result<String> {
        let Some(TagEntry::Text(content)) = self.tags.get(name) else {
            return Ok(format!("!!{name}{end}"));
        };

        if chain.iter().any(|outer| outer == name) {
            return Ok(format!("{RECURSION_PLACEHOLDER}{end}"));
        }

        if chain.len() >= MAX_EXPANSION_DEPTH {
            return Err(Error::ExpansionTooDeep {
                tag: name.to_owned(),
                max: MAX_EXPANSION_DEPTH,
            });
        }

        // The terminator goes in before expanding so markup at the very end of the tag still
        // has one.
        chain.push(name.to_owned());
        let expanded = self.expand_within(&format!("{content}{end}"), sender, chain);
        chain.pop();
        expanded
    }

    fn id_map(&self, path: &str) -> Mapping {
        self.config
            .get_object(path, Some(Mapping::new()))
            .unwrap_or_default()
    }
}

/// Replace every match of `pattern` with `replace(name, terminator)`, where the terminator is a
/// space for any whitespace and empty for `>>`.
fn substitute(
    pattern: &Regex,
    text: &str,
    mut replace: impl FnMut(&str, &str) -> Result<String>,
) -> Result<String> {
    let mut expanded = String::with_capacity(text.len());
    let mut last = 0;

    for captures in pattern.captures_iter(text) {
        let whole = captures.get_match();
        let end = match &captures[2] {
            CLOSING_MARKER => "",
            _ => " ",
        };

        expanded.push_str(&text[last..whole.start()]);
        expanded.push_str(&replace(&captures[1], end)?);
        last = whole.end();
    }

    expanded.push_str(&text[last..]);
    Ok(expanded)
}

fn mention_id(ids: &Mapping, name: &str) -> Option<String> {
    match ids.get(name)? {
        Value::Number(id) => Some(id.to_string()),
        Value::String(id) => Some(id.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DefaultPolicy;

    const CONFIG: &str = "
roles:
  admin: 123
  news: '555'
channels:
  rules: 42
  off-topic: 43
";

    struct Fixture {
        config: Config,
        tags: Config,
    }

    impl Fixture {
        fn new(tags: &str) -> Self {
            let mut config = Config::new(DefaultPolicy::Raise);
            config.load_str(CONFIG).unwrap();
            let mut tag_store = Config::new(DefaultPolicy::Empty);
            tag_store.load_str(tags).unwrap();
            Self {
                config,
                tags: tag_store,
            }
        }

        fn expand(&self, text: &str, sender: Option<&str>) -> Result<String> {
            Expander::new(&self.config, Tags::new(&self.tags)).expand(text, sender)
        }
    }

    fn expand(text: &str) -> String {
        Fixture::new("").expand(text, None).unwrap()
    }

    #[test]
    fn sender_placeholder() {
        let fixture = Fixture::new("");
        assert_eq!(fixture.expand("@!sender", Some("X")).unwrap(), "X");
        assert_eq!(fixture.expand("@!sender", None).unwrap(), "@here");
        assert_eq!(
            fixture.expand("hi @!sender and @!sender", Some("<@1>")).unwrap(),
            "hi <@1> and <@1>"
        );
    }

    #[test]
    fn known_role_becomes_mention() {
        assert_eq!(expand("@&admin "), "<@&123> ");
        assert_eq!(expand("ping @&news now"), "ping <@&555> now");
    }

    #[test]
    fn unknown_role_falls_back_to_plain_text() {
        assert_eq!(expand("@&moderator "), "@moderator ");

        let mut fixture = Fixture::new("");
        fixture.config = Config::new(DefaultPolicy::Raise);
        assert_eq!(fixture.expand("@&admin ", None).unwrap(), "@admin ");
    }

    #[test]
    fn closing_marker_is_swallowed() {
        assert_eq!(expand("@&admin>>s rule"), "<@&123>s rule");
        assert_eq!(expand("@&nobody>>!"), "@nobody!");
        assert_eq!(expand("#rules>>."), "<#42>.");
    }

    #[test]
    fn whitespace_terminator_becomes_space() {
        assert_eq!(expand("see #rules\nthanks"), "see <#42> thanks");
        assert_eq!(expand("#off-topic\tnow"), "<#43> now");
        assert_eq!(expand("@&admin\nnext"), "<@&123> next");
        assert_eq!(expand("#general\nnext"), "#general next");

        let fixture = Fixture::new("greet: hi\n");
        assert_eq!(fixture.expand("!!greet\nnext", None).unwrap(), "hi next");
        assert_eq!(fixture.expand("!!missing\tnext", None).unwrap(), "!!missing next");
    }

    #[test]
    fn markup_without_terminator_is_untouched() {
        assert_eq!(expand("@&admin"), "@&admin");
        assert_eq!(expand("go to #rules"), "go to #rules");
        assert_eq!(expand("# Heading"), "# Heading");
    }

    #[test]
    fn unknown_channel_falls_back_to_plain_text() {
        assert_eq!(expand("#general "), "#general ");
    }

    #[test]
    fn tag_is_expanded_recursively() {
        let fixture = Fixture::new("outer: 'A !!inner>>!'\ninner: B\n");
        assert_eq!(fixture.expand("!!outer ", None).unwrap(), "A B! ");
    }

    #[test]
    fn tag_body_markup_uses_callers_context() {
        let fixture = Fixture::new("ping: '@&admin please @!sender'\n");
        assert_eq!(
            fixture.expand("!!ping>>", Some("<@7>")).unwrap(),
            "<@&123> please <@7>"
        );
    }

    #[test]
    fn missing_tag_is_left_as_is() {
        let fixture = Fixture::new("greet: hi\n");
        assert_eq!(fixture.expand("!!missing ", None).unwrap(), "!!missing ");
    }

    #[test]
    fn rich_tag_is_not_spliced() {
        let fixture = Fixture::new("rules:\n  title: Rules\n  content: be nice\n");
        assert_eq!(fixture.expand("!!rules ", None).unwrap(), "!!rules ");
    }

    #[test]
    fn self_reference_is_cut_off() {
        let fixture = Fixture::new("greet: 'hi !!greet '\n");
        assert_eq!(
            fixture.expand("!!greet ", None).unwrap(),
            "hi [...recursive]  "
        );
    }

    // Any cycle is caught, not only a tag referring to itself directly.
    #[test]
    fn indirect_cycles_are_cut_off() {
        let two = Fixture::new("a: '!!b>>'\nb: '!!a>>'\n");
        assert_eq!(two.expand("!!a>>", None).unwrap(), RECURSION_PLACEHOLDER);

        let three = Fixture::new("a: 'x !!b>>'\nb: 'y !!c>>'\nc: 'z !!a>>'\n");
        assert_eq!(
            three.expand("!!a>>", None).unwrap(),
            "x y z [...recursive]"
        );
    }

    #[test]
    fn same_tag_twice_is_not_a_cycle() {
        let fixture = Fixture::new("x: X\n");
        assert_eq!(fixture.expand("!!x !!x>>", None).unwrap(), "X X");
    }

    #[test]
    fn deep_nesting_is_an_error() {
        let tags: String = (0..20)
            .map(|i| format!("t{i}: '!!t{}>>'\n", i + 1))
            .collect();
        let fixture = Fixture::new(&tags);

        assert!(matches!(
            fixture.expand("!!t0>>", None),
            Err(Error::ExpansionTooDeep { max: MAX_EXPANSION_DEPTH, .. })
        ));
    }

    #[test]
    fn moderate_nesting_is_fine() {
        let tags: String = (0..5)
            .map(|i| format!("t{i}: '{i} !!t{}>>'\n", i + 1))
            .chain(std::iter::once("t5: end\n".to_owned()))
            .collect();
        let fixture = Fixture::new(&tags);

        assert_eq!(fixture.expand("!!t0>>", None).unwrap(), "0 1 2 3 4 end");
    }
}
