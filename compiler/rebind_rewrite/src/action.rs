//! The rewrite-action seam.

use rebind_source::{StructuralError, TokenSource};

/// One named transformation pass.
///
/// An action's only observable effect is the splices it queues (or a
/// [`flush`](TokenSource::flush) it requests). Actions run in registration
/// order, and that order is significant: splices queued at the same offset
/// compose in the order they were queued.
pub trait Action {
    fn name(&self) -> &str;

    fn apply(&self, source: &mut TokenSource) -> Result<(), StructuralError>;

    /// Report this action under another name.
    fn named(self, name: &'static str) -> Named<Self>
    where
        Self: Sized,
    {
        Named { name, inner: self }
    }
}

/// An action reported under a different name.
pub struct Named<A> {
    name: &'static str,
    inner: A,
}

impl<A: Action> Action for Named<A> {
    fn name(&self) -> &str {
        self.name
    }

    fn apply(&self, source: &mut TokenSource) -> Result<(), StructuralError> {
        self.inner.apply(source)
    }
}

/// Closure-backed [`Action`].
pub struct FnAction<F> {
    name: &'static str,
    f: F,
}

impl<F> Action for FnAction<F>
where
    F: Fn(&mut TokenSource) -> Result<(), StructuralError>,
{
    fn name(&self) -> &str {
        self.name
    }

    fn apply(&self, source: &mut TokenSource) -> Result<(), StructuralError> {
        (self.f)(source)
    }
}

/// Wrap a closure as a named action.
pub fn action<F>(name: &'static str, f: F) -> FnAction<F>
where
    F: Fn(&mut TokenSource) -> Result<(), StructuralError>,
{
    FnAction { name, f }
}
