//! # cssdoc
//!
//! An order-preserving CSS document model. Stylesheet text is parsed into a
//! sequence of blocks (comments, `@import`, `@charset`, rulesets scoped to an
//! optional `@media` list) that can be queried, edited block by block, and
//! written back out as CSS.
//!
//! ```
//! use cssdoc::StyleSheet;
//!
//! let sheet = StyleSheet::new("@media print { a { color: red; } } p { color: blue; }");
//! assert_eq!(sheet.rulesets_for_media(Some("print")).unwrap().len(), 1);
//! assert!(sheet.to_string().starts_with("@media print {"));
//! ```
//!
//! ## Core Systems
//!
//! - **[`css::tokenizer`]** — logos delimiter scanner with code-point offsets
//! - **[`css::assembler`]** — comment/string/ruleset/at-rule state machine
//! - **[`css::parser`]** — selector grammar, declarations, at-rule records
//! - **[`css::model`]** — `Selector`, `Block`, `Ruleset`
//! - **[`css::stylesheet`]** — the document: queries, removal, serialization
//!
//! The parser never fails. Text it cannot make sense of is dropped, and
//! at-rules it does not know are kept verbatim as comment blocks.

pub mod css;

pub use css::error::CssError;
pub use css::model::{AttributeOperator, Block, Combinator, Import, Properties, Ruleset, Selector};
pub use css::stylesheet::{StyleSheet, WriterConfig};
