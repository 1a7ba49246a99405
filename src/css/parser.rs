//! Regex-driven record parser.
//!
//! Turns the raw [`Record`]s produced by [`crate::css::assembler`] into typed
//! [`Block`]s: selector lists, declaration blocks, `@import`, `@charset` and
//! `@media` scoping. Nothing here fails; text that does not match the grammar
//! is dropped.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::css::assembler::{assemble, Record};
use crate::css::model::{
    AttributeOperator, Block, Combinator, Import, Properties, Ruleset, Selector,
};

/// Identifier pattern shared by selectors and property names.
const IDENT: &str = r"[A-Za-z_-][A-Za-z0-9_-]*";

// Whitespace on either side of these delimiters is not a combinator.
static DELIMITER_SPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*(~=|\|=|[#,.+>\[\]=])\s*").unwrap());

static COMBINATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+|\+|>").unwrap());

static TYPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(&format!(r"^(?:{IDENT}|\*)$")).unwrap());

static CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^({IDENT}|\*)?\.({IDENT})$")).unwrap());

static ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^({IDENT}|\*)?#({IDENT})$")).unwrap());

static ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"^({IDENT}|\*)?\[({IDENT})(?:(=|~=|\|=)(?:"([^"]*)"|'([^']*)'|({IDENT})))?\]$"#
    ))
    .unwrap()
});

static PROPERTY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"({IDENT})\s*:\s*([^;]+);?")).unwrap());

static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)^@import\s*(?:url\(\s*["']?([^"')]*?)["']?\s*\)|"([^"]*)"|'([^']*)')\s*([^;]*);$"#,
    )
    .unwrap()
});

static CHARSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)^@charset\s+"([^"]*)"\s*;$"#).unwrap());

/// Parse stylesheet text into blocks, in source order.
pub fn parse_css(input: &str) -> Vec<Block> {
    resolve_records(assemble(input))
}

/// Interpret assembled records, tracking the active `@media` context.
pub fn resolve_records(records: Vec<Record>) -> Vec<Block> {
    let mut media: Option<Vec<String>> = None;
    let mut blocks = Vec::with_capacity(records.len());

    for record in records {
        match record {
            Record::MediaEnd => media = None,
            Record::Text(text) => {
                if starts_with_ignore_case(&text, "@media") {
                    media = parse_media_list(&text["@media".len()..]);
                } else if starts_with_ignore_case(&text, "@import") {
                    match parse_import(&text) {
                        Some(block) => blocks.push(block),
                        None => log::debug!("dropping malformed @import `{text}`"),
                    }
                } else if starts_with_ignore_case(&text, "@charset") {
                    match parse_charset(&text) {
                        Some(block) => blocks.push(block),
                        None => log::debug!("dropping malformed @charset `{text}`"),
                    }
                } else {
                    blocks.push(Block::Comment(text));
                }
            }
            Record::Rule {
                selectors,
                properties,
            } => {
                let parsed = parse_selectors(&selectors);
                match Ruleset::new(parsed, parse_properties(&properties), media.clone()) {
                    Ok(ruleset) => blocks.push(Block::Ruleset(ruleset)),
                    Err(_) => log::debug!("dropping ruleset `{selectors}`: no usable selector"),
                }
            }
        }
    }

    blocks
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Split a comma-separated media list. An empty list means "no media".
fn parse_media_list(text: &str) -> Option<Vec<String>> {
    let types = split_list(text);
    (!types.is_empty()).then_some(types)
}

fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_import(text: &str) -> Option<Block> {
    let caps = IMPORT_RE.captures(text)?;
    let url = caps
        .get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))?
        .as_str();
    Some(Block::Import(Import {
        url: url.to_string(),
        media_types: split_list(&caps[4]),
    }))
}

fn parse_charset(text: &str) -> Option<Block> {
    let caps = CHARSET_RE.captures(text)?;
    Some(Block::Charset(caps[1].to_string()))
}

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

/// Parse a selector list such as `div > p.x, a:hover`.
///
/// Groups that do not parse are dropped, so the result may be shorter than the
/// number of comma-separated groups, or empty.
pub fn parse_selectors(text: &str) -> Vec<Selector> {
    let normalized = normalize_selector_text(text);
    advanced_split(&normalized, ',')
        .into_iter()
        .filter_map(|group| {
            let selector = parse_selector(group.trim());
            if selector.is_none() {
                log::trace!("dropping selector `{group}`");
            }
            selector
        })
        .collect()
}

/// Remove whitespace that is not significant to the selector grammar.
fn normalize_selector_text(text: &str) -> String {
    DELIMITER_SPACE_RE
        .replace_all(text.trim(), "$1")
        .into_owned()
}

/// Split on `delimiter`, ignoring one leading and one trailing occurrence.
fn advanced_split(text: &str, delimiter: char) -> Vec<&str> {
    let text = text.strip_prefix(delimiter).unwrap_or(text);
    let text = text.strip_suffix(delimiter).unwrap_or(text);
    if text.is_empty() {
        return Vec::new();
    }
    text.split(delimiter).collect()
}

/// Parse one comma-free selector, folding combinators left to right.
fn parse_selector(group: &str) -> Option<Selector> {
    let mut atomics = Vec::new();
    let mut combinators = Vec::new();
    let mut last = 0;

    for m in COMBINATOR_RE.find_iter(group) {
        atomics.push(&group[last..m.start()]);
        combinators.push(match m.as_str() {
            ">" => Combinator::Child,
            "+" => Combinator::Adjacent,
            _ => Combinator::Descendant,
        });
        last = m.end();
    }
    atomics.push(&group[last..]);

    let mut atomics = atomics.into_iter();
    let mut selector = parse_atomic(atomics.next()?)?;
    for (combinator, text) in combinators.into_iter().zip(atomics) {
        selector = Selector::connector(selector, combinator, parse_atomic(text)?);
    }
    Some(selector)
}

/// Parse a single selector without combinators, e.g. `div.foo`, `a[href]`,
/// `li:hover`.
pub fn parse_atomic(text: &str) -> Option<Selector> {
    let (base, pseudo) = match text.split_once(':') {
        Some((base, pseudo)) => (base, Some(pseudo)),
        None => (text, None),
    };

    let selector = classify(base)?;
    match pseudo {
        Some("") => None,
        Some(name) => Some(Selector::pseudo(selector, name)),
        None => Some(selector),
    }
}

fn classify(base: &str) -> Option<Selector> {
    if base.contains('.') {
        let caps = CLASS_RE.captures(base)?;
        Some(Selector::class(&caps[2], caps.get(1).map(|m| m.as_str())))
    } else if base.contains('#') {
        let caps = ID_RE.captures(base)?;
        Some(Selector::id(&caps[2], caps.get(1).map(|m| m.as_str())))
    } else if base.contains('[') {
        let caps = ATTRIBUTE_RE.captures(base)?;
        let qualifier = caps.get(1).map(|m| m.as_str());
        let (operator, value) = match caps.get(3) {
            Some(op) => {
                let value = caps
                    .get(4)
                    .or_else(|| caps.get(5))
                    .or_else(|| caps.get(6))
                    .map(|m| m.as_str());
                (AttributeOperator::from_symbol(op.as_str())?, value)
            }
            None => (AttributeOperator::Exists, None),
        };
        Some(Selector::attribute(&caps[2], operator, value, qualifier))
    } else if TYPE_RE.is_match(base) {
        Some(Selector::type_selector(base))
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

/// Parse a declaration block body such as `color: red; margin: 0`.
pub fn parse_properties(text: &str) -> Properties {
    let mut properties = Properties::new();
    for caps in PROPERTY_RE.captures_iter(text) {
        properties.insert(caps[1].to_string(), caps[2].trim().to_string());
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn only_ruleset(input: &str) -> Ruleset {
        let blocks = parse_css(input);
        assert_eq!(blocks.len(), 1, "expected one block, got {blocks:?}");
        match blocks.into_iter().next() {
            Some(Block::Ruleset(ruleset)) => ruleset,
            other => panic!("expected a ruleset, got {other:?}"),
        }
    }

    // ── Atomic selectors ─────────────────────────────────────────────

    #[test]
    fn atomic_class_with_qualifier() {
        assert_eq!(parse_atomic("div.foo"), Some(Selector::class("foo", Some("div"))));
    }

    #[test]
    fn atomic_id_without_qualifier() {
        assert_eq!(parse_atomic("#bar"), Some(Selector::id("bar", None)));
    }

    #[test]
    fn atomic_universal_qualifier() {
        assert_eq!(parse_atomic("*.x"), Some(Selector::class("x", Some("*"))));
        assert_eq!(parse_atomic("*"), Some(Selector::type_selector("*")));
    }

    #[test]
    fn atomic_attribute_exists() {
        assert_eq!(
            parse_atomic("a[href]"),
            Some(Selector::attribute("href", AttributeOperator::Exists, None, Some("a")))
        );
    }

    #[test]
    fn atomic_attribute_equals() {
        assert_eq!(
            parse_atomic(r#"a[href="x"]"#),
            Some(Selector::attribute("href", AttributeOperator::Equals, Some("x"), Some("a")))
        );
    }

    #[test]
    fn atomic_attribute_operators_and_quoting() {
        assert_eq!(
            parse_atomic(r#"[class~="nav"]"#),
            Some(Selector::attribute("class", AttributeOperator::Includes, Some("nav"), None))
        );
        assert_eq!(
            parse_atomic("[lang|='en']"),
            Some(Selector::attribute("lang", AttributeOperator::Dashmatch, Some("en"), None))
        );
        assert_eq!(
            parse_atomic("input[type=text]"),
            Some(Selector::attribute(
                "type",
                AttributeOperator::Equals,
                Some("text"),
                Some("input")
            ))
        );
    }

    #[test]
    fn atomic_pseudo() {
        assert_eq!(
            parse_atomic("li:hover"),
            Some(Selector::pseudo(Selector::type_selector("li"), "hover"))
        );
        assert_eq!(
            parse_atomic("p::first-line"),
            Some(Selector::pseudo(Selector::type_selector("p"), ":first-line"))
        );
    }

    #[test]
    fn atomic_malformed_is_dropped() {
        assert_eq!(parse_atomic(".a.b"), None);
        assert_eq!(parse_atomic("#"), None);
        assert_eq!(parse_atomic("a[href"), None);
        assert_eq!(parse_atomic("9lives"), None);
        assert_eq!(parse_atomic(""), None);
        assert_eq!(parse_atomic(":hover"), None);
        assert_eq!(parse_atomic("a:"), None);
    }

    // ── Selector lists ───────────────────────────────────────────────

    #[test]
    fn combinator_chain_folds_left() {
        let expected = Selector::connector(
            Selector::connector(
                Selector::type_selector("div"),
                Combinator::Child,
                Selector::class("x", Some("p")),
            ),
            Combinator::Adjacent,
            Selector::type_selector("span"),
        );
        assert_eq!(parse_selectors("div > p.x + span"), vec![expected.clone()]);
        assert_eq!(parse_selectors("div>p.x+span"), vec![expected]);
    }

    #[test]
    fn space_before_qualifier_delimiter_merges_into_atomic() {
        assert_eq!(
            parse_selectors("div .foo"),
            vec![Selector::class("foo", Some("div"))]
        );
        assert_eq!(
            parse_selectors("a [href]"),
            vec![Selector::attribute("href", AttributeOperator::Exists, None, Some("a"))]
        );
        assert_eq!(
            parse_selectors("#nav  li"),
            vec![Selector::connector(
                Selector::id("nav", None),
                Combinator::Descendant,
                Selector::type_selector("li"),
            )]
        );
    }

    #[test]
    fn comma_list() {
        assert_eq!(
            parse_selectors(" h1 , h2,h3 "),
            vec![
                Selector::type_selector("h1"),
                Selector::type_selector("h2"),
                Selector::type_selector("h3"),
            ]
        );
    }

    #[test]
    fn stray_commas_are_trimmed_once() {
        assert_eq!(parse_selectors(",a,"), vec![Selector::type_selector("a")]);
        assert_eq!(
            parse_selectors("a,,b"),
            vec![Selector::type_selector("a"), Selector::type_selector("b")]
        );
        assert!(parse_selectors("").is_empty());
    }

    #[test]
    fn malformed_group_reduces_count() {
        assert_eq!(
            parse_selectors("a, .x.y, b > .c.d"),
            vec![Selector::type_selector("a")]
        );
    }

    #[test]
    fn advanced_split_edges() {
        assert_eq!(advanced_split(",a,b,", ','), vec!["a", "b"]);
        assert_eq!(advanced_split(",", ','), Vec::<&str>::new());
        assert_eq!(advanced_split("a", ','), vec!["a"]);
    }

    // ── Properties ───────────────────────────────────────────────────

    #[test]
    fn properties_keep_source_order() {
        let props = parse_properties("color: red; background :blue;margin:0 auto");
        let pairs: Vec<(&str, &str)> = props
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("color", "red"), ("background", "blue"), ("margin", "0 auto")]
        );
    }

    #[test]
    fn duplicate_property_keeps_first_position_last_value() {
        let props = parse_properties("color: red; margin: 0; color: blue;");
        let pairs: Vec<(&str, &str)> = props
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(pairs, vec![("color", "blue"), ("margin", "0")]);
    }

    #[test]
    fn vendor_prefixed_property() {
        let props = parse_properties("-webkit-box-shadow: none;");
        assert_eq!(props.get("-webkit-box-shadow").map(String::as_str), Some("none"));
    }

    // ── Records to blocks ────────────────────────────────────────────

    #[test]
    fn unknown_at_rule_becomes_comment() {
        assert_eq!(parse_css("@foo bar;"), vec![Block::Comment("@foo bar;".into())]);
    }

    #[test]
    fn at_sign_in_value_is_not_a_comment() {
        let blocks = parse_css("a{b:@c;}");
        assert_eq!(blocks.len(), 1);
        let ruleset = blocks[0].as_ruleset().unwrap();
        assert_eq!(ruleset.property("b"), Some("@c"));
    }

    #[test]
    fn import_forms() {
        let blocks = parse_css(
            "@import url(\"a.css\") print, screen;\n@import url(b.css);\n@import \"c.css\" tv;",
        );
        assert_eq!(
            blocks,
            vec![
                Block::Import(Import {
                    url: "a.css".into(),
                    media_types: vec!["print".into(), "screen".into()],
                }),
                Block::Import(Import {
                    url: "b.css".into(),
                    media_types: vec![],
                }),
                Block::Import(Import {
                    url: "c.css".into(),
                    media_types: vec!["tv".into()],
                }),
            ]
        );
    }

    #[test]
    fn charset() {
        assert_eq!(
            parse_css("@CHARSET \"utf-8\";"),
            vec![Block::Charset("utf-8".into())]
        );
    }

    #[test]
    fn malformed_import_and_charset_are_dropped() {
        assert!(parse_css("@import ;\n@charset utf-8;").is_empty());
    }

    #[test]
    fn media_context_applies_until_closed() {
        let blocks = parse_css("@media print,screen{a{color:red;}}p{color:blue;}");
        let media: Vec<Option<&[String]>> = blocks
            .iter()
            .filter_map(Block::as_ruleset)
            .map(Ruleset::media)
            .collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            media,
            vec![Some(&["print".to_string(), "screen".to_string()][..]), None]
        );
    }

    #[test]
    fn empty_media_list_means_no_media() {
        let ruleset = only_ruleset("@media { a { b: c; } }");
        assert_eq!(ruleset.media(), None);
    }

    #[test]
    fn ruleset_without_selectors_is_dropped() {
        assert!(parse_css(".a.b { color: red; }").is_empty());
    }

    #[test]
    fn escaped_quote_stays_in_value() {
        let ruleset = only_ruleset(r#"p { content: "a\"b"; color: red; }"#);
        assert_eq!(ruleset.property("content"), Some(r#""a\"b""#));
        assert_eq!(ruleset.property("color"), Some("red"));
    }

    #[test]
    fn comments_are_kept_in_order() {
        let blocks = parse_css("/* head */\na { b: c; }\n/* tail */");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], Block::Comment("/* head */".into()));
        assert!(blocks[1].as_ruleset().is_some());
        assert_eq!(blocks[2], Block::Comment("/* tail */".into()));
    }
}
