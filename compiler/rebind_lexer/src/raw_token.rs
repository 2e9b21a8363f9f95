//! Raw Token Definition
//!
//! The `RawToken` enum is the logos-derived code-mode tokenizer output
//! before keyword classification. Inline text, open tags and the bodies of
//! interpolating strings are handled by the scanner in `lib.rs`; logos only
//! ever sees code.

use logos::{Lexer, Logos};

use crate::TokenKind;

/// Raw token from logos (before keyword lookup).
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawToken {
    #[regex(r"[ \t\r\n\x0C]+")]
    Whitespace,

    #[token("//", line_comment)]
    #[token("#", line_comment)]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    #[token("?>")]
    CloseTag,

    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_]*")]
    Variable,

    #[token("$")]
    Dollar,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9_]+)?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?")]
    #[regex(r"0[xX][0-9a-fA-F_]+")]
    #[regex(r"0[bB][01_]+")]
    Number,

    #[regex(r"'([^'\\]|\\(.|\n))*'")]
    String,

    /// Opening `"` or `` ` `` of an interpolating string. The scanner lexes
    /// the body itself.
    #[token("\"")]
    #[token("`")]
    InterpolatingQuote,

    #[regex(
        r#"<<<[ \t]*("[a-zA-Z_][a-zA-Z0-9_]*"|'[a-zA-Z_][a-zA-Z0-9_]*'|[a-zA-Z_][a-zA-Z0-9_]*)\r?\n"#,
        heredoc
    )]
    Heredoc,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("#[")]
    AttributeOpen,

    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("->")]
    Arrow,
    #[token("?->")]
    NullsafeArrow,
    #[token("::")]
    DoubleColon,
    #[token("\\")]
    NsSeparator,
    #[token(":")]
    Colon,
    #[token("&")]
    Ampersand,

    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token("**")]
    #[token("=")]
    #[token("==")]
    #[token("===")]
    #[token("!=")]
    #[token("!==")]
    #[token("<>")]
    #[token("<")]
    #[token(">")]
    #[token("<=")]
    #[token(">=")]
    #[token("<=>")]
    #[token("&&")]
    #[token("||")]
    #[token("!")]
    #[token(".")]
    #[token("...")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token(".=")]
    #[token("%=")]
    #[token("**=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("<<=")]
    #[token(">>=")]
    #[token("??=")]
    #[token("??")]
    #[token("?")]
    #[token("=>")]
    #[token("++")]
    #[token("--")]
    #[token("|")]
    #[token("^")]
    #[token("~")]
    #[token("<<")]
    #[token(">>")]
    #[token("@")]
    Operator,
}

impl RawToken {
    /// Classify a raw token, resolving identifiers to keywords.
    pub(crate) fn kind(self, slice: &str) -> TokenKind {
        match self {
            RawToken::Whitespace => TokenKind::Whitespace,
            RawToken::LineComment => TokenKind::Comment,
            RawToken::BlockComment => {
                // `/**/` is an ordinary (empty) comment.
                if slice.starts_with("/**") && slice.len() > 4 {
                    TokenKind::DocComment
                } else {
                    TokenKind::Comment
                }
            }
            RawToken::CloseTag => TokenKind::CloseTag,
            RawToken::Variable => TokenKind::Variable,
            RawToken::Dollar => TokenKind::Dollar,
            RawToken::Ident => crate::keyword(slice).unwrap_or(TokenKind::Ident),
            RawToken::Number => TokenKind::Number,
            RawToken::String => TokenKind::String,
            // The scanner takes the body over before classification.
            RawToken::InterpolatingQuote => TokenKind::String,
            RawToken::Heredoc => TokenKind::Heredoc,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::AttributeOpen => TokenKind::AttributeOpen,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Arrow => TokenKind::Arrow,
            RawToken::NullsafeArrow => TokenKind::NullsafeArrow,
            RawToken::DoubleColon => TokenKind::DoubleColon,
            RawToken::NsSeparator => TokenKind::NsSeparator,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Ampersand => TokenKind::Ampersand,
            RawToken::Operator => TokenKind::Operator,
        }
    }
}

/// Extend a line comment up to the end of the line or a `?>`, whichever
/// comes first. The newline itself is left for the whitespace token.
fn line_comment(lex: &mut Lexer<'_, RawToken>) {
    let rest = lex.remainder().as_bytes();
    let line_end = memchr::memchr(b'\n', rest).unwrap_or(rest.len());
    let end = memchr::memmem::find(&rest[..line_end], b"?>").unwrap_or(line_end);
    lex.bump(end);
}

/// Extend a heredoc opener through its closing label.
///
/// The closing label may be indented and must not be followed by an
/// identifier character. Returns `false` for an unterminated heredoc, which
/// surfaces the opener as an `Other` token.
fn heredoc(lex: &mut Lexer<'_, RawToken>) -> bool {
    let label = lex
        .slice()
        .trim_start_matches('<')
        .trim_matches(|c: char| c.is_ascii_whitespace() || c == '"' || c == '\'');

    let mut offset = 0;
    let mut found = None;
    for line in lex.remainder().split_inclusive('\n') {
        let trimmed = line.trim_start_matches([' ', '\t']);
        if let Some(after) = trimmed.strip_prefix(label) {
            let continues_ident = after
                .bytes()
                .next()
                .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_');
            if !continues_ident {
                found = Some(offset + (line.len() - trimmed.len()) + label.len());
                break;
            }
        }
        offset += line.len();
    }

    match found {
        Some(consumed) => {
            lex.bump(consumed);
            true
        }
        None => false,
    }
}
