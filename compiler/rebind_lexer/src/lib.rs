//! Lossless lexer for PHP-style host sources.
//!
//! Produces a flat `Vec<Token>` whose texts concatenate back to the exact
//! input. Nothing is ever dropped: trivia is kept as tokens, and bytes that
//! start no token become [`TokenKind::Other`]. This is what lets the
//! rewriting engine serialize an unedited source byte-for-byte.
//!
//! # Modes
//!
//! Sources start in *inline mode*, where everything up to `<?php` or `<?=`
//! is a single [`TokenKind::InlineHtml`] token. After an open tag the
//! scanner switches to *code mode* and hands the remainder to the logos
//! tokenizer until a `?>` close tag switches it back.
//!
//! Double-quoted strings, backtick strings and heredocs interpolate. When
//! one contains a `{$expr}` or `${expr}` it is split into
//! [`TokenKind::StringPart`] text and ordinary code tokens for each
//! expression, so rewriting passes see the code inside it.

mod kind;
mod raw_token;

use logos::Logos;
use memchr::memmem;

pub use kind::{keyword, TokenKind, TokenSet, IMPORTS, TRIVIA};
use raw_token::RawToken;

/// An immutable lexical token.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based line on which the token starts.
    pub line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32) -> Self {
        Token {
            kind,
            text: text.into(),
            line,
        }
    }
}

/// Lex a whole source unit.
pub fn lex(source: &str) -> Vec<Token> {
    Scanner::new(source).run()
}

/// Where a run of code ends.
#[derive(Clone, Copy, PartialEq, Eq)]
enum CodeEnd {
    /// At a `?>`, which is consumed along with a directly following newline.
    CloseTag,
    /// After the `}` that closes an interpolated expression.
    ClosingBrace,
}

/// Mode-switching driver around the logos tokenizer.
struct Scanner<'a> {
    source: &'a str,
    pos: usize,
    line: u32,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Scanner {
            source,
            pos: 0,
            line: 1,
            // Rough guess: one token per four bytes of source.
            tokens: Vec::with_capacity(source.len() / 4 + 1),
        }
    }

    fn run(mut self) -> Vec<Token> {
        while self.pos < self.source.len() {
            self.scan_inline();
            if self.pos < self.source.len() {
                self.scan_code(CodeEnd::CloseTag, self.source.len());
            }
        }
        self.tokens
    }

    /// Consume inline text up to and including the next open tag.
    fn scan_inline(&mut self) {
        let rest = &self.source[self.pos..];
        match find_open_tag(rest) {
            Some((offset, tag_len, kind)) => {
                if offset > 0 {
                    self.push(TokenKind::InlineHtml, offset);
                }
                self.push(kind, tag_len);
            }
            None => self.push(TokenKind::InlineHtml, rest.len()),
        }
    }

    /// Consume code up to `until`, never reading past `limit`.
    ///
    /// Interpolating strings and heredocs interrupt the logos run: the
    /// scanner lexes their bodies and then restarts logos after them.
    fn scan_code(&mut self, until: CodeEnd, limit: usize) {
        let source = self.source;
        let mut depth = 0usize;
        'restart: while self.pos < limit {
            let base = self.pos;
            let mut lexer = RawToken::lexer(&source[base..limit]);
            while let Some(result) = lexer.next() {
                let span = lexer.span();
                let start = base + span.start;
                if start > self.pos {
                    self.push(TokenKind::Other, start - self.pos);
                }
                let Ok(raw) = result else {
                    self.push(TokenKind::Other, span.len());
                    continue;
                };
                match raw {
                    RawToken::InterpolatingQuote => {
                        let quote = source.as_bytes()[start];
                        self.scan_interpolated(Some(quote), limit, TokenKind::String);
                        continue 'restart;
                    }
                    RawToken::Heredoc if !is_nowdoc(lexer.slice()) => {
                        self.scan_interpolated(None, base + span.end, TokenKind::Heredoc);
                        continue 'restart;
                    }
                    RawToken::CloseTag if until == CodeEnd::CloseTag => {
                        let rest = lexer.remainder();
                        let newline = if rest.starts_with("\r\n") {
                            2
                        } else {
                            usize::from(rest.starts_with('\n'))
                        };
                        self.push(TokenKind::CloseTag, span.len() + newline);
                        return;
                    }
                    RawToken::LBrace => depth += 1,
                    RawToken::RBrace if until == CodeEnd::ClosingBrace => {
                        if depth == 0 {
                            self.push(TokenKind::RBrace, span.len());
                            return;
                        }
                        depth -= 1;
                    }
                    _ => {}
                }
                let kind = self.classify(raw, lexer.slice());
                self.push(kind, span.len());
            }
            break;
        }
        if self.pos < limit {
            self.push(TokenKind::Other, limit - self.pos);
        }
    }

    /// Lex an interpolating string or heredoc starting at `pos`.
    ///
    /// With a `quote` the literal ends after the next unescaped quote,
    /// otherwise at `limit`. Each `{$expr}` and `${expr}` is lexed as code
    /// between real bracket tokens and the text around them becomes
    /// [`TokenKind::StringPart`]s. A literal without interpolation stays a
    /// single `whole` token.
    fn scan_interpolated(&mut self, quote: Option<u8>, limit: usize, whole: TokenKind) {
        let source = self.source;
        let bytes = source.as_bytes();
        let mut i = self.pos + usize::from(quote.is_some());
        let mut split = false;
        while i < limit {
            match bytes[i] {
                b'\\' => i += 2,
                b if Some(b) == quote => {
                    i += 1;
                    break;
                }
                b'{' if bytes.get(i + 1) == Some(&b'$') => {
                    self.push_fragment(i);
                    self.push(TokenKind::CurlyOpen, 1);
                    self.scan_code(CodeEnd::ClosingBrace, limit);
                    split = true;
                    i = self.pos;
                }
                b'$' if bytes.get(i + 1) == Some(&b'{') => {
                    self.push_fragment(i);
                    self.push(TokenKind::Dollar, 1);
                    self.push(TokenKind::LBrace, 1);
                    self.scan_code(CodeEnd::ClosingBrace, limit);
                    split = true;
                    i = self.pos;
                }
                _ => i += 1,
            }
        }
        let end = i.min(limit);
        if end > self.pos {
            let kind = if split { TokenKind::StringPart } else { whole };
            self.push(kind, end - self.pos);
        }
    }

    fn push_fragment(&mut self, to: usize) {
        if to > self.pos {
            self.push(TokenKind::StringPart, to - self.pos);
        }
    }

    /// Keyword lookup, except that reserved words naming a member or a
    /// declared function are plain identifiers, as in `$r->eval()`,
    /// `A::require` or `function &include()`.
    fn classify(&self, raw: RawToken, slice: &str) -> TokenKind {
        let kind = raw.kind(slice);
        if raw == RawToken::Ident && kind != TokenKind::Ident && self.at_member_name() {
            return TokenKind::Ident;
        }
        kind
    }

    fn at_member_name(&self) -> bool {
        let mut significant = self.tokens.iter().rev().filter(|t| !t.kind.is_trivia());
        match significant.next().map(|t| t.kind) {
            Some(
                TokenKind::Arrow
                | TokenKind::NullsafeArrow
                | TokenKind::DoubleColon
                | TokenKind::Function,
            ) => true,
            Some(TokenKind::Ampersand) => significant
                .next()
                .is_some_and(|t| t.kind == TokenKind::Function),
            _ => false,
        }
    }

    fn push(&mut self, kind: TokenKind, len: usize) {
        let text = &self.source[self.pos..self.pos + len];
        self.tokens.push(Token::new(kind, text, self.line));
        let newlines = memchr::memchr_iter(b'\n', text.as_bytes()).count();
        self.line += u32::try_from(newlines).unwrap_or(u32::MAX);
        self.pos += len;
    }
}

/// Whether a heredoc opener (`<<<'LABEL'`) starts a nowdoc, which never
/// interpolates.
fn is_nowdoc(opener: &str) -> bool {
    opener
        .trim_start_matches('<')
        .trim_start_matches([' ', '\t'])
        .starts_with('\'')
}

/// Find the next open tag in inline text.
///
/// Returns `(offset, tag_len, kind)`. `<?php` must be followed by whitespace
/// or the end of input; one whitespace character (or `\r\n`) belongs to the
/// tag. Short `<?` tags are not recognised.
fn find_open_tag(text: &str) -> Option<(usize, usize, TokenKind)> {
    let bytes = text.as_bytes();
    let finder = memmem::Finder::new(b"<?");
    let mut from = 0;
    while let Some(found) = finder.find(&bytes[from..]) {
        let at = from + found;
        let after = &bytes[at + 2..];
        if after.first() == Some(&b'=') {
            return Some((at, 3, TokenKind::OpenTagWithEcho));
        }
        if after.len() >= 3 && after[..3].eq_ignore_ascii_case(b"php") {
            let tail = &after[3..];
            match tail.first() {
                None => return Some((at, 5, TokenKind::OpenTag)),
                Some(b'\r') if tail.get(1) == Some(&b'\n') => {
                    return Some((at, 7, TokenKind::OpenTag));
                }
                Some(b) if b.is_ascii_whitespace() => {
                    return Some((at, 6, TokenKind::OpenTag));
                }
                Some(_) => {}
            }
        }
        from = at + 2;
    }
    None
}

#[cfg(test)]
mod tests;
