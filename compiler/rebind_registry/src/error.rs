//! Dispatch errors.

use crate::Value;

/// A context accessor ran outside of any intercepted dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("no intercepted call is active")]
pub struct EmptyContextError;

/// Failure of a dispatched call.
///
/// Errors returned by a replacement reach the caller unchanged: dispatch
/// never wraps or retries them.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CallError {
    /// No binding handled the call and no original is defined.
    #[error("call to undefined {callable}")]
    Undefined { callable: String },

    /// A dynamic callee does not name anything callable.
    #[error("value `{value}` is not callable")]
    NotCallable { value: String },

    /// A host-level exception raised by an implementation.
    #[error("uncaught {0}")]
    Thrown(Value),

    #[error(transparent)]
    EmptyContext(#[from] EmptyContextError),
}
