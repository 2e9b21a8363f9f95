//! The token source and its structural queries.

use std::cell::RefCell;

use rebind_lexer::{lex, Token, TokenKind, TokenSet, TRIVIA};

use crate::splice::SplicePlan;
use crate::{SpliceMode, StructuralError};

/// One unit of source text as an indexed token sequence.
///
/// Indices stay stable for the lifetime of the value: splices are only
/// queued, and [`to_text`](Self::to_text) applies them against the original
/// tokens. The plan sits behind a `RefCell` so that actions can splice while
/// iterating over a query.
///
/// ```text
/// let source = TokenSource::parse("<?php f($x);");
/// for i in source.all(TokenKind::Variable) {
///     source.splice("$y", i, 1, SpliceMode::Replace)?;
/// }
/// assert_eq!(source.to_text(), "<?php f($y);");
/// ```
#[derive(Clone, Debug)]
pub struct TokenSource {
    tokens: Vec<Token>,
    file: Option<String>,
    /// Partner index for each matched bracket.
    partners: Vec<Option<usize>>,
    /// Innermost opener enclosing each token. A closer maps to its own opener.
    enclosing: Vec<Option<usize>>,
    plan: RefCell<SplicePlan>,
}

impl TokenSource {
    pub fn new(tokens: Vec<Token>) -> Self {
        let (partners, enclosing) = bracket_structure(&tokens);
        TokenSource {
            tokens,
            file: None,
            partners,
            enclosing,
            plan: RefCell::new(SplicePlan::default()),
        }
    }

    /// Lex `text` and wrap the tokens.
    pub fn parse(text: &str) -> Self {
        Self::new(lex(text))
    }

    /// Attach the label of the file this source came from.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn kind(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|t| t.kind)
    }

    /// Original text of the token at `index`, or `""` past the end.
    pub fn text(&self, index: usize) -> &str {
        self.tokens.get(index).map_or("", |t| t.text.as_str())
    }

    /// Line of the token at `index`, or of the last token past the end.
    pub fn line(&self, index: usize) -> u32 {
        self.tokens
            .get(index)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    /// Whether the token at `index` is one of `kinds`.
    pub fn is(&self, kinds: impl Into<TokenSet>, index: usize) -> bool {
        let kinds = kinds.into();
        self.kind(index).is_some_and(|k| kinds.contains(k))
    }

    // === Iteration ===

    /// Indices of every token of one of `kinds`, in order.
    ///
    /// The iterator is lazy and reads only the immutable token sequence, so
    /// it can be restarted at any time and splicing during iteration is fine.
    pub fn all(&self, kinds: impl Into<TokenSet>) -> impl Iterator<Item = usize> + '_ {
        self.within(kinds, 0, self.tokens.len())
    }

    /// Like [`all`](Self::all), bounded to `[start, end)`.
    pub fn within(
        &self,
        kinds: impl Into<TokenSet>,
        start: usize,
        end: usize,
    ) -> impl Iterator<Item = usize> + '_ {
        let kinds = kinds.into();
        let end = end.min(self.tokens.len());
        (start.min(end)..end).filter(move |&i| kinds.contains(self.tokens[i].kind))
    }

    // === Directional scans ===

    /// First index after `from` whose kind is in `kinds`.
    pub fn next(&self, kinds: impl Into<TokenSet>, from: usize) -> Option<usize> {
        let kinds = kinds.into();
        (from.saturating_add(1)..self.tokens.len()).find(|&i| kinds.contains(self.tokens[i].kind))
    }

    /// First index after `from` whose kind is *not* in `kinds`.
    pub fn skip(&self, kinds: impl Into<TokenSet>, from: usize) -> Option<usize> {
        let kinds = kinds.into();
        (from.saturating_add(1)..self.tokens.len()).find(|&i| !kinds.contains(self.tokens[i].kind))
    }

    /// Last index before `from` whose kind is *not* in `kinds`.
    pub fn skip_back(&self, kinds: impl Into<TokenSet>, from: usize) -> Option<usize> {
        let kinds = kinds.into();
        (0..from.min(self.tokens.len()))
            .rev()
            .find(|&i| !kinds.contains(self.tokens[i].kind))
    }

    /// Next non-trivia token after `from`.
    pub fn next_significant(&self, from: usize) -> Option<usize> {
        self.skip(TRIVIA, from)
    }

    /// Previous non-trivia token before `from`.
    pub fn prev_significant(&self, from: usize) -> Option<usize> {
        self.skip_back(TRIVIA, from)
    }

    // === Bracket structure ===

    /// Index of the bracket paired with the one at `index`.
    pub fn match_bracket(&self, index: usize) -> Result<usize, StructuralError> {
        let token = self.tokens.get(index).ok_or(StructuralError::OutOfRange {
            index,
            len: self.tokens.len(),
        })?;
        if !token.kind.is_opening_bracket() && !token.kind.is_closing_bracket() {
            return Err(StructuralError::NotABracket {
                index,
                kind: token.kind,
                line: token.line,
            });
        }
        self.partners[index].ok_or(StructuralError::UnmatchedBracket {
            index,
            kind: token.kind,
            line: token.line,
        })
    }

    /// Innermost opening bracket enclosing `index`, if any.
    ///
    /// For a closing bracket this is its own opener.
    pub fn enclosing_opener(&self, index: usize) -> Option<usize> {
        self.enclosing.get(index).copied().flatten()
    }

    /// Index of the bracket that closes the structure enclosing `from`.
    ///
    /// At top level this is one past the last token.
    pub fn end_of_level(&self, from: usize) -> Result<usize, StructuralError> {
        if from >= self.tokens.len() {
            return Ok(self.tokens.len());
        }
        match self.enclosing[from] {
            Some(opener) => self.match_bracket(opener),
            None => Ok(self.tokens.len()),
        }
    }

    // === Text ===

    /// Concatenated original text of `len` tokens starting at `index`.
    ///
    /// Queued splices are never visible here.
    pub fn read(&self, index: usize, len: usize) -> String {
        let end = index.saturating_add(len).min(self.tokens.len());
        self.tokens[index.min(end)..end]
            .iter()
            .map(|t| t.text.as_str())
            .collect()
    }

    // === Splicing ===

    /// Queue an edit against the original token indices.
    ///
    /// Insertion offsets may be anything up to and including [`len`](Self::len).
    pub fn splice(
        &self,
        text: &str,
        at: usize,
        len: usize,
        mode: SpliceMode,
    ) -> Result<(), StructuralError> {
        let end = at.saturating_add(len);
        if end > self.tokens.len() {
            return Err(StructuralError::OutOfRange {
                index: end,
                len: self.tokens.len(),
            });
        }
        tracing::trace!(at, len, ?mode, text, "splice");
        self.plan.borrow_mut().queue(text, at, len, mode)
    }

    /// Number of queued edit slots.
    pub fn pending(&self) -> usize {
        self.plan.borrow().len()
    }

    /// Render the original tokens with every queued edit applied.
    pub fn to_text(&self) -> String {
        self.plan.borrow().render(&self.tokens)
    }

    /// Apply the queued edits and re-lex, so later passes see the result.
    ///
    /// Indices obtained before a flush are meaningless afterwards.
    pub fn flush(&mut self) {
        if self.plan.get_mut().is_empty() {
            return;
        }
        let text = self.to_text();
        let file = self.file.take();
        *self = TokenSource::parse(&text);
        self.file = file;
    }
}

/// Pair brackets with a stack, tolerating imbalance.
///
/// A closer only pairs with the opener on top of the stack when the kinds
/// agree; otherwise it stays unmatched and the stack is left alone.
fn bracket_structure(tokens: &[Token]) -> (Vec<Option<usize>>, Vec<Option<usize>>) {
    let mut partners = vec![None; tokens.len()];
    let mut enclosing = vec![None; tokens.len()];
    let mut stack: Vec<usize> = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        enclosing[i] = stack.last().copied();
        if token.kind.is_opening_bracket() {
            stack.push(i);
        } else if token.kind.is_closing_bracket() {
            if let Some(&open) = stack.last() {
                if tokens[open].kind.closing_pair() == Some(token.kind) {
                    stack.pop();
                    partners[open] = Some(i);
                    partners[i] = Some(open);
                }
            }
        }
    }
    (partners, enclosing)
}
