//! Call-interception registry.
//!
//! Maps a [`CallableId`] to a stack of revocable redefinitions. Dispatch
//! offers each call to the newest live binding first; a replacement either
//! handles it, declines (falling through to the next-older binding), or
//! relays to whatever sits below it. The callable's own definition is the
//! last resort.
//!
//! ```text
//! let registry = Registry::new();
//! registry.define(CallableId::function("greet"), |_| Ok("hello".into()));
//! let h = registry.bind(CallableId::function("greet"), |_| Ok(Outcome::handled("hi")));
//! assert_eq!(registry.dispatch(&greet, vec![], &CallSite::default())?, "hi".into());
//! h.expire();
//! ```
//!
//! All state lives in one [`Registry`] value; there is no global table.
//! While a replacement runs, its frame sits on the [`CallContext`] so that
//! it can ask what call it is standing in for.

mod binding;
mod context;
mod error;
mod identity;
mod registry;
mod stack;
mod value;

pub use binding::{Handle, Original, Outcome, Replacement};
pub use context::{CallContext, Frame};
pub use error::{CallError, EmptyContextError};
pub use identity::{CallableId, ImportScope};
pub use registry::{CallSite, Invocation, Registry};
pub use value::Value;
