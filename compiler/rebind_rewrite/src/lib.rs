//! Source rewriting for call interception.
//!
//! A [`Pipeline`] runs [`Action`]s over a [`TokenSource`]. Each action
//! queues splices against the original token indices, and the pipeline
//! applies them all at the end. The standard actions make every redefinable
//! call observable to the registry:
//!
//! ```text
//! strlen($s)       =>  \Rebind\dispatch('strlen', [$s])
//! $f($x)           =>  \Rebind\dispatch_dynamic($f, [$x])
//! "{$f()}"         =>  "{$GLOBALS['__rebind_dispatch_dynamic']($f, [])}"
//! eval($code)      =>  eval(\Rebind\transform_for_eval($code))
//! function f() {   =>  function f() {if (\Rebind\intercept(...)) { ... }
//! ```
//!
//! [`TokenSource`]: rebind_source::TokenSource

mod action;
mod calls;
mod generic;
mod hooks;
mod pipeline;
mod standard;

pub use action::{action, Action, FnAction, Named};
pub use calls::{splice_dynamic_calls, splice_named_function_calls};
pub use generic::{
    inject_false_expression_at_beginnings, prepend_code_to_functions,
    wrap_unary_construct_arguments,
};
pub use hooks::{string_literal, Hooks};
pub use pipeline::{standard_pipeline, Pipeline, RewriteError};
pub use standard::{
    expand_magic_filesystem_constants, flush, inject_call_interception_code,
    inject_script_beginning_triggers, propagate_through_eval, propagate_through_import_paths,
};
