//! Stylesheet document: ordered blocks, queries, removal, serialization.
//!
//! A [`StyleSheet`] is parsed eagerly from text and afterwards is a plain
//! in-memory document. Block order is significant: consecutive rulesets that
//! share a media list are written out inside one `@media` group.

use std::fmt;

use crate::css::error::{require_non_blank, CssError};
use crate::css::model::{Block, Ruleset, Selector};
use crate::css::parser::parse_css;

// ---------------------------------------------------------------------------
// WriterConfig
// ---------------------------------------------------------------------------

/// Options for turning a [`StyleSheet`] back into text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    /// One level of indentation, used for declarations and `@media` bodies.
    pub indent: String,
    /// Close an `@media` group that is still open after the last block.
    /// Off by default: existing output leaves it open.
    pub close_trailing_media: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            indent: "\t".to_string(),
            close_trailing_media: false,
        }
    }
}

impl WriterConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the indentation unit (builder).
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Close a trailing `@media` group (builder).
    pub fn with_close_trailing_media(mut self, close: bool) -> Self {
        self.close_trailing_media = close;
        self
    }
}

// ---------------------------------------------------------------------------
// StyleSheet
// ---------------------------------------------------------------------------

/// A parsed stylesheet: an ordered sequence of [`Block`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    blocks: Vec<Block>,
}

impl StyleSheet {
    /// Parse `css` into a stylesheet. Never fails; unparseable parts are dropped.
    pub fn new(css: &str) -> Self {
        Self {
            blocks: parse_css(css),
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    /// Append a block.
    pub fn add_block(&mut self, block: impl Into<Block>) {
        self.blocks.push(block.into());
    }

    /// Remove the blocks at `indices`, keeping the rest in their original order.
    ///
    /// Out-of-range and repeated indices are ignored. Returns how many blocks
    /// were removed.
    pub fn remove_blocks(&mut self, indices: &[usize]) -> usize {
        let len = self.blocks.len();
        let mut doomed = vec![false; len];
        let mut removed = 0;

        for &index in indices {
            if index >= len {
                log::debug!("ignoring block index {index}: stylesheet has {len} blocks");
                continue;
            }
            if !doomed[index] {
                doomed[index] = true;
                removed += 1;
            }
        }

        let mut position = 0;
        self.blocks.retain(|_| {
            let keep = !doomed[position];
            position += 1;
            keep
        });

        removed
    }

    /// The ruleset at `index`.
    pub fn ruleset(&self, index: usize) -> Result<&Ruleset, CssError> {
        let block = self.blocks.get(index).ok_or(CssError::IndexOutOfRange {
            index,
            len: self.blocks.len(),
        })?;
        block.as_ruleset().ok_or(CssError::NotARuleset { index })
    }

    /// The rulesets at `indices`. Indices that are out of range or point at a
    /// non-ruleset block are skipped.
    pub fn rulesets(&self, indices: &[usize]) -> Vec<&Ruleset> {
        indices
            .iter()
            .filter_map(|&index| self.blocks.get(index).and_then(Block::as_ruleset))
            .collect()
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Indices of rulesets scoped to `media`. `None` selects the rulesets
    /// outside any `@media` group.
    pub fn ruleset_indices_for_media(&self, media: Option<&str>) -> Result<Vec<usize>, CssError> {
        let media = media.map(|m| require_non_blank(m, "media type")).transpose()?;
        Ok(self.indices_where(|ruleset| match (media, ruleset.media()) {
            (None, None) => true,
            (Some(wanted), Some(list)) => list.iter().any(|m| m == wanted),
            _ => false,
        }))
    }

    pub fn rulesets_for_media(&self, media: Option<&str>) -> Result<Vec<&Ruleset>, CssError> {
        Ok(self.rulesets(&self.ruleset_indices_for_media(media)?))
    }

    /// Indices of rulesets with an id selector named `id` anywhere in them.
    pub fn ruleset_indices_for_id(&self, id: &str) -> Result<Vec<usize>, CssError> {
        let id = require_non_blank(id, "id")?;
        Ok(self.indices_where_selector(|selector| {
            matches!(selector, Selector::Id { name, .. } if name == id)
        }))
    }

    pub fn rulesets_for_id(&self, id: &str) -> Result<Vec<&Ruleset>, CssError> {
        Ok(self.rulesets(&self.ruleset_indices_for_id(id)?))
    }

    /// Indices of rulesets with a class selector named `class` anywhere in them.
    pub fn ruleset_indices_for_class(&self, class: &str) -> Result<Vec<usize>, CssError> {
        let class = require_non_blank(class, "class")?;
        Ok(self.indices_where_selector(|selector| {
            matches!(selector, Selector::Class { name, .. } if name == class)
        }))
    }

    pub fn rulesets_for_class(&self, class: &str) -> Result<Vec<&Ruleset>, CssError> {
        Ok(self.rulesets(&self.ruleset_indices_for_class(class)?))
    }

    /// Indices of rulesets with a type selector `tagname` anywhere in them.
    ///
    /// Qualifiers do not count: `div.foo` is a class selector.
    pub fn ruleset_indices_for_tagname(&self, tagname: &str) -> Result<Vec<usize>, CssError> {
        let tagname = require_non_blank(tagname, "tag name")?;
        Ok(self.indices_where_selector(|selector| {
            matches!(selector, Selector::Type(t) if t == tagname)
        }))
    }

    pub fn rulesets_for_tagname(&self, tagname: &str) -> Result<Vec<&Ruleset>, CssError> {
        Ok(self.rulesets(&self.ruleset_indices_for_tagname(tagname)?))
    }

    /// Indices of rulesets whose [`Ruleset::name`] equals `name`.
    pub fn ruleset_indices_by_name(&self, name: &str) -> Result<Vec<usize>, CssError> {
        let name = require_non_blank(name, "name")?;
        Ok(self.indices_where(|ruleset| ruleset.name() == name))
    }

    pub fn rulesets_by_name(&self, name: &str) -> Result<Vec<&Ruleset>, CssError> {
        Ok(self.rulesets(&self.ruleset_indices_by_name(name)?))
    }

    fn indices_where(&self, predicate: impl Fn(&Ruleset) -> bool) -> Vec<usize> {
        self.blocks
            .iter()
            .enumerate()
            .filter_map(|(index, block)| {
                block
                    .as_ruleset()
                    .filter(|&ruleset| predicate(ruleset))
                    .map(|_| index)
            })
            .collect()
    }

    fn indices_where_selector(&self, predicate: impl Fn(&Selector) -> bool) -> Vec<usize> {
        self.indices_where(|ruleset| {
            ruleset
                .selectors()
                .iter()
                .flat_map(Selector::flatten)
                .any(&predicate)
        })
    }

    // ── Serialization ────────────────────────────────────────────────

    /// Write the stylesheet as CSS text.
    ///
    /// Every block is followed by a blank line. Runs of rulesets with the same
    /// media list are wrapped in one `@media` group; comments and at-rules are
    /// written unindented wherever they fall.
    pub fn to_css_with(&self, config: &WriterConfig) -> String {
        let mut out = String::new();
        // Outer `None`: no ruleset written yet.
        let mut last_media: Option<Option<&[String]>> = None;
        let mut indent: &str = "";

        for block in &self.blocks {
            match block {
                Block::Ruleset(ruleset) => {
                    let media = ruleset.media();
                    if last_media != Some(media) {
                        if let Some(Some(_)) = last_media {
                            out.push_str("}\n\n");
                        }
                        match media {
                            Some(list) => {
                                out.push_str(&format!("@media {} {{\n", list.join(", ")));
                                indent = config.indent.as_str();
                            }
                            None => indent = "",
                        }
                        last_media = Some(media);
                    }
                    out.push_str(&ruleset.to_css_with_step(indent, &config.indent));
                }
                other => out.push_str(&other.to_css("")),
            }
            out.push_str("\n\n");
        }

        if config.close_trailing_media && matches!(last_media, Some(Some(_))) {
            out.push_str("}\n\n");
        }

        out
    }
}

impl fmt::Display for StyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css_with(&WriterConfig::default()))
    }
}

impl From<Vec<Block>> for StyleSheet {
    fn from(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }
}

impl FromIterator<Block> for StyleSheet {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        Self {
            blocks: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a StyleSheet {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
