//! Bindings and the weak handles callers keep to them.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::{CallError, CallableId, Invocation, Value};

/// What a replacement did with a call.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Handled(Value),
    /// Not handled: dispatch falls through to the next-older binding.
    Declined,
}

impl Outcome {
    pub fn handled(value: impl Into<Value>) -> Self {
        Outcome::Handled(value.into())
    }
}

/// Body of a redefinition.
pub type Replacement = dyn Fn(&Invocation<'_>) -> Result<Outcome, CallError>;

/// The implementation a callable had before any binding.
pub type Original = dyn Fn(&[Value]) -> Result<Value, CallError>;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(crate) struct BindingFlags: u8 {
        const ONE_SHOT = 1 << 0;
        const SILENCED = 1 << 1;
        const EXPIRED = 1 << 2;
        /// A one-shot binding whose replacement is running.
        const IN_FLIGHT = 1 << 3;
    }
}

pub(crate) struct Binding {
    pub(crate) target: CallableId,
    pub(crate) replacement: Box<Replacement>,
    flags: Cell<BindingFlags>,
}

impl Binding {
    pub(crate) fn new(target: CallableId, replacement: Box<Replacement>, one_shot: bool) -> Self {
        let flags = if one_shot {
            BindingFlags::ONE_SHOT
        } else {
            BindingFlags::empty()
        };
        Binding {
            target,
            replacement,
            flags: Cell::new(flags),
        }
    }

    #[inline]
    fn has(&self, flag: BindingFlags) -> bool {
        self.flags.get().contains(flag)
    }

    fn set(&self, flag: BindingFlags, on: bool) {
        let mut flags = self.flags.get();
        flags.set(flag, on);
        self.flags.set(flags);
    }

    pub(crate) fn is_expired(&self) -> bool {
        self.has(BindingFlags::EXPIRED)
    }

    pub(crate) fn is_one_shot(&self) -> bool {
        self.has(BindingFlags::ONE_SHOT)
    }

    /// Eligible to handle a call right now.
    pub(crate) fn is_live(&self) -> bool {
        !self
            .flags
            .get()
            .intersects(BindingFlags::EXPIRED | BindingFlags::SILENCED | BindingFlags::IN_FLIGHT)
    }

    pub(crate) fn expire(&self) {
        self.set(BindingFlags::EXPIRED, true);
    }

    /// Mark a one-shot binding as running; it expires when the guard drops.
    pub(crate) fn fire_once(&self) -> OneShotGuard<'_> {
        self.set(BindingFlags::IN_FLIGHT, true);
        OneShotGuard { binding: self }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("target", &self.target)
            .field("flags", &self.flags.get())
            .finish_non_exhaustive()
    }
}

pub(crate) struct OneShotGuard<'a> {
    binding: &'a Binding,
}

impl Drop for OneShotGuard<'_> {
    fn drop(&mut self) {
        self.binding.set(BindingFlags::IN_FLIGHT, false);
        self.binding.expire();
    }
}

/// Caller-side reference to a binding.
///
/// The registry owns the binding; a handle can expire or silence it but
/// never bring an expired binding back. Every operation is a no-op once the
/// registry has pruned the binding.
#[derive(Clone, Debug)]
pub struct Handle {
    binding: Weak<Binding>,
    target: CallableId,
}

impl Handle {
    pub(crate) fn new(binding: &Rc<Binding>) -> Self {
        Handle {
            binding: Rc::downgrade(binding),
            target: binding.target.clone(),
        }
    }

    pub fn target(&self) -> &CallableId {
        &self.target
    }

    /// Idempotent. Calls already running keep the binding they captured.
    pub fn expire(&self) {
        if let Some(binding) = self.binding.upgrade() {
            binding.expire();
        }
    }

    pub fn silence(&self) {
        self.toggle_silence(true);
    }

    pub fn unsilence(&self) {
        self.toggle_silence(false);
    }

    fn toggle_silence(&self, on: bool) {
        if let Some(binding) = self.binding.upgrade() {
            if !binding.is_expired() {
                binding.set(BindingFlags::SILENCED, on);
            }
        }
    }

    pub fn is_expired(&self) -> bool {
        self.binding.upgrade().map_or(true, |b| b.is_expired())
    }

    pub fn is_silenced(&self) -> bool {
        self.binding
            .upgrade()
            .is_some_and(|b| b.has(BindingFlags::SILENCED))
    }
}
