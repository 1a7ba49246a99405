//! Document model: Selector, Block, Ruleset.
//!
//! Every value here is immutable once built. A stylesheet is edited by
//! replacing whole blocks, never by mutating a selector or property in place.

use std::fmt;

use indexmap::IndexMap;

use crate::css::error::CssError;

/// Ordered property map. Re-inserting a name replaces its value but keeps the
/// position of its first occurrence.
pub type Properties = IndexMap<String, String>;

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

/// A combinator between two selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Descendant combinator (whitespace): `A B`.
    Descendant,
    /// Child combinator: `A > B`.
    Child,
    /// Adjacent sibling combinator: `A + B`.
    Adjacent,
}

impl Combinator {
    /// The combinator as it appears between two selectors, spaces included.
    pub fn as_css(self) -> &'static str {
        match self {
            Combinator::Descendant => " ",
            Combinator::Child => " > ",
            Combinator::Adjacent => " + ",
        }
    }
}

/// The match operator of an attribute selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeOperator {
    /// `[name]`
    Exists,
    /// `[name="value"]`
    Equals,
    /// `[name~="value"]`
    Includes,
    /// `[name|="value"]`
    Dashmatch,
}

impl AttributeOperator {
    /// Parse the operator symbol (`=`, `~=`, `|=`).
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(AttributeOperator::Equals),
            "~=" => Some(AttributeOperator::Includes),
            "|=" => Some(AttributeOperator::Dashmatch),
            _ => None,
        }
    }

    pub fn as_css(self) -> &'static str {
        match self {
            AttributeOperator::Exists => "",
            AttributeOperator::Equals => "=",
            AttributeOperator::Includes => "~=",
            AttributeOperator::Dashmatch => "|=",
        }
    }
}

/// A CSS selector.
///
/// Atomic selectors (`Type`, `Class`, `Id`, `Attribute`) may carry a
/// `qualifier`: the type name or `*` written in front of them, as in `div.foo`.
/// `Pseudo` decorates any selector with a trailing `:name`; `Connector` joins
/// two selectors with a combinator. `div > p.x + span` is
/// `Connector(Connector(div, Child, p.x), Adjacent, span)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Type selector, including the universal selector `*`.
    Type(String),
    /// Class selector: `.name`.
    Class {
        name: String,
        qualifier: Option<String>,
    },
    /// ID selector: `#name`.
    Id {
        name: String,
        qualifier: Option<String>,
    },
    /// Attribute selector: `[name]`, `[name="value"]`, ...
    Attribute {
        name: String,
        operator: AttributeOperator,
        value: Option<String>,
        qualifier: Option<String>,
    },
    /// Pseudo-class or pseudo-element: `inner:name`.
    Pseudo { inner: Box<Selector>, name: String },
    /// Two selectors joined by a combinator.
    Connector {
        left: Box<Selector>,
        combinator: Combinator,
        right: Box<Selector>,
    },
}

impl Selector {
    pub fn type_selector(tagname: impl Into<String>) -> Self {
        Selector::Type(tagname.into())
    }

    pub fn class(name: impl Into<String>, qualifier: Option<&str>) -> Self {
        Selector::Class {
            name: name.into(),
            qualifier: qualifier.map(str::to_string),
        }
    }

    pub fn id(name: impl Into<String>, qualifier: Option<&str>) -> Self {
        Selector::Id {
            name: name.into(),
            qualifier: qualifier.map(str::to_string),
        }
    }

    pub fn attribute(
        name: impl Into<String>,
        operator: AttributeOperator,
        value: Option<&str>,
        qualifier: Option<&str>,
    ) -> Self {
        Selector::Attribute {
            name: name.into(),
            operator,
            value: value.map(str::to_string),
            qualifier: qualifier.map(str::to_string),
        }
    }

    pub fn pseudo(inner: Selector, name: impl Into<String>) -> Self {
        Selector::Pseudo {
            inner: Box::new(inner),
            name: name.into(),
        }
    }

    pub fn connector(left: Selector, combinator: Combinator, right: Selector) -> Self {
        Selector::Connector {
            left: Box::new(left),
            combinator,
            right: Box::new(right),
        }
    }

    /// This selector followed, depth-first, by every selector nested inside it.
    pub fn flatten(&self) -> Vec<&Selector> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into<'a>(&'a self, out: &mut Vec<&'a Selector>) {
        out.push(self);
        match self {
            Selector::Pseudo { inner, .. } => inner.collect_into(out),
            Selector::Connector { left, right, .. } => {
                left.collect_into(out);
                right.collect_into(out);
            }
            Selector::Type(_)
            | Selector::Class { .. }
            | Selector::Id { .. }
            | Selector::Attribute { .. } => {}
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Type(tagname) => f.write_str(tagname),
            Selector::Class { name, qualifier } => {
                write!(f, "{}.{name}", qualifier.as_deref().unwrap_or(""))
            }
            Selector::Id { name, qualifier } => {
                write!(f, "{}#{name}", qualifier.as_deref().unwrap_or(""))
            }
            Selector::Attribute {
                name,
                operator,
                value,
                qualifier,
            } => {
                write!(f, "{}[{name}", qualifier.as_deref().unwrap_or(""))?;
                if let Some(value) = value {
                    write!(f, "{}\"{value}\"", operator.as_css())?;
                }
                f.write_str("]")
            }
            Selector::Pseudo { inner, name } => write!(f, "{inner}:{name}"),
            Selector::Connector {
                left,
                combinator,
                right,
            } => write!(f, "{left}{}{right}", combinator.as_css()),
        }
    }
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// A ruleset: selectors, declarations and the media list it is scoped to.
///
/// Always holds at least one selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ruleset {
    selectors: Vec<Selector>,
    properties: Properties,
    media: Option<Vec<String>>,
}

impl Ruleset {
    /// Build a ruleset. Fails if `selectors` is empty.
    pub fn new(
        selectors: Vec<Selector>,
        properties: Properties,
        media: Option<Vec<String>>,
    ) -> Result<Self, CssError> {
        if selectors.is_empty() {
            return Err(CssError::EmptySelectorList);
        }
        Ok(Self {
            selectors,
            properties,
            media,
        })
    }

    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Value of a single property, if declared.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// The media types this ruleset is scoped to; `None` outside `@media`.
    pub fn media(&self) -> Option<&[String]> {
        self.media.as_deref()
    }

    /// The ruleset's name: the CSS text of its first selector.
    pub fn name(&self) -> String {
        self.selectors[0].to_string()
    }

    /// Render the ruleset with every line prefixed by `indent`.
    pub fn to_css(&self, indent: &str) -> String {
        self.to_css_with_step(indent, "\t")
    }

    /// Render with an explicit indentation step for declarations.
    pub(crate) fn to_css_with_step(&self, indent: &str, step: &str) -> String {
        let selectors = self
            .selectors
            .iter()
            .map(Selector::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        let mut out = format!("{indent}{selectors} {{\n");
        for (name, value) in &self.properties {
            out.push_str(&format!("{indent}{step}{name}: {value};\n"));
        }
        out.push_str(indent);
        out.push('}');
        out
    }
}

/// An `@import` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub url: String,
    pub media_types: Vec<String>,
}

/// One top-level construct of a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A comment, or an at-rule this model does not understand, kept verbatim.
    Comment(String),
    /// `@import url("...") media, types;`
    Import(Import),
    /// `@charset "...";`
    Charset(String),
    Ruleset(Ruleset),
}

impl Block {
    pub fn as_ruleset(&self) -> Option<&Ruleset> {
        match self {
            Block::Ruleset(ruleset) => Some(ruleset),
            _ => None,
        }
    }

    /// Render the block as CSS. Only rulesets are indented.
    pub fn to_css(&self, indent: &str) -> String {
        match self {
            Block::Ruleset(ruleset) => ruleset.to_css(indent),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::Comment(text) => f.write_str(text),
            Block::Import(Import { url, media_types }) => {
                write!(f, "@import url(\"{url}\")")?;
                if !media_types.is_empty() {
                    write!(f, " {}", media_types.join(", "))?;
                }
                f.write_str(";")
            }
            Block::Charset(name) => write!(f, "@charset \"{name}\";"),
            Block::Ruleset(ruleset) => f.write_str(&ruleset.to_css("")),
        }
    }
}

impl From<Ruleset> for Block {
    fn from(ruleset: Ruleset) -> Self {
        Block::Ruleset(ruleset)
    }
}
