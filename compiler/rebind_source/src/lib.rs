//! Token source and structural queries for source rewriting.
//!
//! A [`TokenSource`] wraps the lossless token sequence of one source unit.
//! Rewrite passes query it by kind and by bracket structure, then queue
//! [splices](TokenSource::splice) against the original indices. Nothing is
//! applied until [`TokenSource::to_text`] renders the plan in a single pass,
//! so every query in a pass sees the same original tokens.
//!
//! # Splices
//!
//! | Mode | Length | Effect |
//! |------|--------|--------|
//! | `Replace` | > 0 | replaces `[at, at+len)`; exclusive |
//! | `Replace` | 0 | sets the insertion at `at` once |
//! | `PrependAtStart` | 0 | inserts before earlier insertions at `at` |
//! | `AppendAtEnd` | 0 | inserts after earlier insertions at `at` |
//!
//! Overlapping claims fail with [`StructuralError::OverlappingSplice`].

mod error;
pub mod namespaces;
mod source;
mod splice;

pub use error::StructuralError;
pub use namespaces::{
    collect_namespace_boundaries, collect_use_declarations, NamespaceScope, UseDeclarations,
};
pub use source::TokenSource;
pub use splice::SpliceMode;

pub use rebind_lexer::{Token, TokenKind, TokenSet, TRIVIA};
