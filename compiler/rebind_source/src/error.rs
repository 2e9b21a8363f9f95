//! Structural errors raised by token-source queries and splices.

use rebind_lexer::TokenKind;

use crate::SpliceMode;

/// A malformed token stream or an invalid splice.
///
/// Always fatal for the current transformation pass: a partially rewritten
/// source is unsafe to execute, so nothing in the engine recovers from it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    /// A bracket with no partner at the same nesting depth.
    #[error("unmatched {kind} on line {line}")]
    UnmatchedBracket {
        index: usize,
        kind: TokenKind,
        line: u32,
    },

    /// `match_bracket` was asked about a token that is not a bracket.
    #[error("{kind} on line {line} is not a bracket")]
    NotABracket {
        index: usize,
        kind: TokenKind,
        line: u32,
    },

    /// A query or splice pointed past the token sequence.
    #[error("token index {index} is out of range for {len} tokens")]
    OutOfRange { index: usize, len: usize },

    /// Two splices claim intersecting token ranges.
    #[error("splice of {len} token(s) at {at} overlaps the splice at {existing_at}")]
    OverlappingSplice {
        at: usize,
        len: usize,
        existing_at: usize,
    },

    /// `PrependAtStart` / `AppendAtEnd` only insert text.
    #[error("{mode:?} splice at {at} must not cover tokens (got length {len})")]
    InsertionWithLength {
        at: usize,
        len: usize,
        mode: SpliceMode,
    },

    /// A construct was cut short by the end of input.
    #[error("unexpected end of input after line {line} while reading {context}")]
    UnexpectedEnd { line: u32, context: &'static str },

    /// A construct contained a token that does not belong there.
    #[error("unexpected {found} on line {line} while reading {context}")]
    Unexpected {
        index: usize,
        found: TokenKind,
        line: u32,
        context: &'static str,
    },
}
