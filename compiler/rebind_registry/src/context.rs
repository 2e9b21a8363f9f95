//! Call-context stack.
//!
//! One frame per binding currently executing, innermost last. Frames are
//! pushed through [`CallContext::enter`] and popped when the returned guard
//! drops, so every exit path (including `?` and unwinding) restores the
//! stack.

use std::cell::RefCell;
use std::rc::Rc;

use crate::{CallableId, EmptyContextError, Value};

/// An intercepted call in progress.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub callable: CallableId,
    /// Class that declares the callable; `None` for free functions.
    pub declaring_class: Option<String>,
    /// Class named at the call site (late static binding), falling back to
    /// the declaring class.
    pub called_class: Option<String>,
    pub arguments: Rc<[Value]>,
}

#[derive(Debug, Default)]
pub struct CallContext {
    frames: RefCell<Vec<Frame>>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `frame` until the guard is dropped.
    pub(crate) fn enter(&self, frame: Frame) -> FrameGuard<'_> {
        let mut frames = self.frames.borrow_mut();
        let depth = frames.len();
        frames.push(frame);
        FrameGuard {
            context: self,
            depth,
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.borrow().is_empty()
    }

    /// Snapshot of the innermost frame.
    pub fn current(&self) -> Result<Frame, EmptyContextError> {
        self.with_top(Frame::clone)
    }

    pub fn current_callable(&self) -> Result<CallableId, EmptyContextError> {
        self.with_top(|f| f.callable.clone())
    }

    pub fn current_class(&self) -> Result<Option<String>, EmptyContextError> {
        self.with_top(|f| f.declaring_class.clone())
    }

    pub fn current_called_class(&self) -> Result<Option<String>, EmptyContextError> {
        self.with_top(|f| f.called_class.clone())
    }

    /// Bare function or method name of the innermost frame.
    pub fn current_function(&self) -> Result<String, EmptyContextError> {
        self.with_top(|f| f.callable.name().to_owned())
    }

    /// `class::method` for methods, the bare name for functions.
    pub fn current_method(&self) -> Result<String, EmptyContextError> {
        self.with_top(|f| match f.callable.class() {
            Some(class) => format!("{class}::{}", f.callable.name()),
            None => f.callable.name().to_owned(),
        })
    }

    pub fn current_arguments(&self) -> Result<Rc<[Value]>, EmptyContextError> {
        self.with_top(|f| Rc::clone(&f.arguments))
    }

    fn with_top<T>(&self, f: impl FnOnce(&Frame) -> T) -> Result<T, EmptyContextError> {
        self.frames.borrow().last().map(f).ok_or(EmptyContextError)
    }
}

/// Pops its frame on drop.
#[must_use = "the frame is popped as soon as the guard is dropped"]
pub(crate) struct FrameGuard<'a> {
    context: &'a CallContext,
    depth: usize,
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        let mut frames = self.context.frames.borrow_mut();
        debug_assert_eq!(frames.len(), self.depth + 1, "call frames popped out of order");
        frames.truncate(self.depth);
    }
}
