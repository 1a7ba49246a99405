//! logos-based delimiter scanner.
//!
//! Only the characters that change the assembler's state are lexed: comment
//! markers, double quotes, braces, `@` and `;`. Everything else is skipped in
//! runs. Logos reports byte spans; each [`Delimiter`] also carries the
//! code-point offset so positions stay meaningful for multibyte sources.

use logos::Logos;

/// A significant delimiter in stylesheet text.
///
/// Longest match wins, so `/*` and `*/` are never split into `/` + `*`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r#"[^/*"{}@;]+"#)]
pub enum Token {
    /// `/*`
    #[token("/*")]
    CommentOpen,

    /// `*/`
    #[token("*/")]
    CommentClose,

    /// `"`
    #[token("\"")]
    Quote,

    /// `{`
    #[token("{")]
    BraceOpen,

    /// `}`
    #[token("}")]
    BraceClose,

    /// `@`
    #[token("@")]
    At,

    /// `;`
    #[token(";")]
    Semicolon,
}

impl Token {
    /// Length of the token in bytes.
    pub fn byte_len(self) -> usize {
        match self {
            Token::CommentOpen | Token::CommentClose => 2,
            _ => 1,
        }
    }
}

/// A delimiter located in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter {
    pub token: Token,
    /// Byte offset of the first byte of the token.
    pub byte_offset: usize,
    /// Code-point offset of the token.
    pub char_offset: usize,
}

impl Delimiter {
    /// Byte offset just past the token.
    pub fn end(&self) -> usize {
        self.byte_offset + self.token.byte_len()
    }
}

/// Scan `input` for delimiters, in source order.
pub fn scan(input: &str) -> Vec<Delimiter> {
    let spans: Vec<(Token, usize)> = Token::lexer(input)
        .spanned()
        .filter_map(|(result, span)| result.ok().map(|token| (token, span.start)))
        .collect();

    if input.is_ascii() {
        return spans
            .into_iter()
            .map(|(token, offset)| Delimiter {
                token,
                byte_offset: offset,
                char_offset: offset,
            })
            .collect();
    }

    correct_offsets(input, spans)
}

/// Walk the delimiters and the multibyte code points in lockstep, subtracting
/// the extra bytes of every multibyte character that precedes a delimiter.
fn correct_offsets(input: &str, spans: Vec<(Token, usize)>) -> Vec<Delimiter> {
    let mut multibyte = input
        .char_indices()
        .filter(|(_, c)| c.len_utf8() > 1)
        .map(|(i, c)| (i, c.len_utf8() - 1))
        .peekable();
    let mut extra = 0;

    spans
        .into_iter()
        .map(|(token, offset)| {
            while let Some(&(pos, bytes)) = multibyte.peek() {
                if pos >= offset {
                    break;
                }
                extra += bytes;
                multibyte.next();
            }
            Delimiter {
                token,
                byte_offset: offset,
                char_offset: offset - extra,
            }
        })
        .collect()
}
