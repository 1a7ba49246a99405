//! Block assembler: slices stylesheet text into raw records.
//!
//! Consumes the delimiters from [`crate::css::tokenizer::scan`] with a four-flag
//! state machine (comment, string, ruleset, at-rule). Inside a comment only
//! `*/` matters; inside a string only an unescaped `"` matters. Anything left
//! open at end of input swallows the rest of the text.

use crate::css::tokenizer::{scan, Delimiter, Token};

/// A raw slice of the stylesheet, not yet interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// A comment, an at-rule statement (`@import …;`), or an at-rule block
    /// header (`@media print`).
    Text(String),
    /// A ruleset's selector text and declaration-block text.
    Rule { selectors: String, properties: String },
    /// A `}` that closes an at-rule block rather than a ruleset.
    MediaEnd,
}

/// Slice `input` into records, in source order.
pub fn assemble(input: &str) -> Vec<Record> {
    let mut assembler = Assembler::new(input);
    for delimiter in scan(input) {
        assembler.feed(delimiter);
    }
    assembler.finish()
}

/// Assembler state.
struct Assembler<'a> {
    input: &'a str,
    in_comment: bool,
    in_string: bool,
    in_ruleset: bool,
    in_at_rule: bool,
    /// Non-comment text collected since the last structural boundary.
    buffer: String,
    /// Byte offset up to which `input` has been consumed into `buffer`.
    last_pos: usize,
    comment_start: usize,
    at_rule_start: usize,
    selector_text: String,
    /// Most recent delimiter that entered a state, for diagnostics.
    last_opener: Option<Delimiter>,
    records: Vec<Record>,
}

impl<'a> Assembler<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            in_comment: false,
            in_string: false,
            in_ruleset: false,
            in_at_rule: false,
            buffer: String::new(),
            last_pos: 0,
            comment_start: 0,
            at_rule_start: 0,
            selector_text: String::new(),
            last_opener: None,
            records: Vec::new(),
        }
    }

    fn feed(&mut self, delimiter: Delimiter) {
        let offset = delimiter.byte_offset;
        let end = delimiter.end();

        match delimiter.token {
            Token::Quote => {
                if !self.in_comment && !is_escaped(self.input, offset) {
                    self.in_string = !self.in_string;
                    if self.in_string {
                        self.last_opener = Some(delimiter);
                    }
                }
            }
            Token::CommentOpen => {
                if !self.in_string && !self.in_comment {
                    self.flush(offset);
                    self.comment_start = offset;
                    self.in_comment = true;
                    self.last_opener = Some(delimiter);
                }
            }
            Token::CommentClose => {
                if self.in_comment {
                    let text = &self.input[self.comment_start..end];
                    self.records.push(Record::Text(text.to_string()));
                    self.in_comment = false;
                    self.last_pos = end;
                }
            }
            Token::At => {
                // Only a top-level `@` opens an at-rule. Inside a declaration
                // block it is value text and never becomes a comment record.
                if !self.in_comment && !self.in_string && !self.in_ruleset && !self.in_at_rule {
                    self.in_at_rule = true;
                    self.at_rule_start = offset;
                    self.last_opener = Some(delimiter);
                }
            }
            Token::Semicolon => {
                if self.in_at_rule && !self.in_comment && !self.in_string {
                    let text = self.input[self.at_rule_start..end].trim();
                    self.records.push(Record::Text(text.to_string()));
                    self.in_at_rule = false;
                    self.reset(end);
                }
            }
            Token::BraceOpen => {
                if self.in_comment || self.in_string {
                    return;
                }
                if self.in_at_rule {
                    let header = self.input[self.at_rule_start..offset].trim();
                    self.records.push(Record::Text(header.to_string()));
                    self.in_at_rule = false;
                    self.reset(end);
                } else {
                    self.flush(offset);
                    self.selector_text = std::mem::take(&mut self.buffer).trim().to_string();
                    self.in_ruleset = true;
                    self.last_pos = end;
                    self.last_opener = Some(delimiter);
                }
            }
            Token::BraceClose => {
                if self.in_comment || self.in_string {
                    return;
                }
                if self.in_ruleset {
                    self.flush(offset);
                    let properties = std::mem::take(&mut self.buffer).trim().to_string();
                    self.records.push(Record::Rule {
                        selectors: std::mem::take(&mut self.selector_text),
                        properties,
                    });
                    self.in_ruleset = false;
                    self.last_pos = end;
                } else {
                    self.records.push(Record::MediaEnd);
                    self.reset(end);
                }
            }
        }
    }

    /// Move the text between `last_pos` and `upto` into the buffer.
    fn flush(&mut self, upto: usize) {
        if self.last_pos < upto {
            self.buffer.push_str(&self.input[self.last_pos..upto]);
        }
        self.last_pos = upto;
    }

    fn reset(&mut self, pos: usize) {
        self.buffer.clear();
        self.last_pos = pos;
    }

    fn finish(self) -> Vec<Record> {
        let open_state = if self.in_comment {
            Some("comment")
        } else if self.in_string {
            Some("string")
        } else if self.in_ruleset {
            Some("ruleset")
        } else if self.in_at_rule {
            Some("at-rule")
        } else {
            None
        };

        if let (Some(state), Some(opener)) = (open_state, self.last_opener) {
            log::debug!(
                "unterminated {state} opened at character {} swallowed the rest of the stylesheet",
                opener.char_offset
            );
        }

        self.records
    }
}

/// Returns `true` if the byte at `offset` is preceded by an odd number of
/// consecutive backslashes.
fn is_escaped(input: &str, offset: usize) -> bool {
    let backslashes = input.as_bytes()[..offset]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count();
    backslashes % 2 == 1
}
