//! The interception registry and dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::binding::{Binding, Original, Replacement};
use crate::context::Frame;
use crate::stack::ensure_sufficient_stack;
use crate::{CallContext, CallError, CallableId, Handle, Outcome, Value};

/// Newest-first view of one identity's bindings, taken at dispatch entry.
type Chain = Rc<[Rc<Binding>]>;

/// Facts about the call site that the identity alone does not carry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallSite {
    /// Class named at the call site, when it differs from the declaring one.
    pub called_class: Option<String>,
}

impl CallSite {
    pub fn called_as(class: &str) -> Self {
        CallSite {
            called_class: Some(class.trim_start_matches('\\').to_ascii_lowercase()),
        }
    }
}

/// Owner of every redefinition and of the call-context stack.
///
/// Single-threaded and re-entrant: replacements receive `&Registry` through
/// their [`Invocation`] and may dispatch, bind, or expire from inside a call.
/// No internal borrow is held while user code runs.
#[derive(Default)]
pub struct Registry {
    originals: RefCell<FxHashMap<CallableId, Rc<Original>>>,
    /// Oldest first; dispatch reads them in reverse.
    bindings: RefCell<FxHashMap<CallableId, Vec<Rc<Binding>>>>,
    context: CallContext,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> &CallContext {
        &self.context
    }

    /// Register the implementation used when no binding handles a call.
    pub fn define(
        &self,
        id: CallableId,
        original: impl Fn(&[Value]) -> Result<Value, CallError> + 'static,
    ) {
        self.originals.borrow_mut().insert(id, Rc::new(original));
    }

    /// Redefine `id` until the handle is expired.
    pub fn bind(
        &self,
        id: CallableId,
        replacement: impl Fn(&Invocation<'_>) -> Result<Outcome, CallError> + 'static,
    ) -> Handle {
        self.push_binding(id, Box::new(replacement), false)
    }

    /// Redefine `id` for exactly one call.
    pub fn bind_once(
        &self,
        id: CallableId,
        replacement: impl Fn(&Invocation<'_>) -> Result<Outcome, CallError> + 'static,
    ) -> Handle {
        self.push_binding(id, Box::new(replacement), true)
    }

    fn push_binding(&self, id: CallableId, replacement: Box<Replacement>, one_shot: bool) -> Handle {
        tracing::debug!(callable = %id, one_shot, "bind");
        let binding = Rc::new(Binding::new(id.clone(), replacement, one_shot));
        let handle = Handle::new(&binding);
        self.bindings.borrow_mut().entry(id).or_default().push(binding);
        handle
    }

    pub fn expire(&self, handle: &Handle) {
        tracing::debug!(callable = %handle.target(), "expire");
        handle.expire();
    }

    /// Expire every binding of `id`.
    pub fn expire_all(&self, id: &CallableId) {
        tracing::debug!(callable = %id, "expire all");
        if let Some(stack) = self.bindings.borrow().get(id) {
            for binding in stack {
                binding.expire();
            }
        }
    }

    pub fn silence(&self, handle: &Handle) {
        tracing::debug!(callable = %handle.target(), "silence");
        handle.silence();
    }

    pub fn unsilence(&self, handle: &Handle) {
        tracing::debug!(callable = %handle.target(), "unsilence");
        handle.unsilence();
    }

    /// Whether `id` has any binding that has not expired.
    pub fn has_bindings(&self, id: &CallableId) -> bool {
        self.bindings
            .borrow()
            .get(id)
            .is_some_and(|stack| stack.iter().any(|b| !b.is_expired()))
    }

    /// Call `id` through its bindings, ending at the original.
    pub fn dispatch(
        &self,
        id: &CallableId,
        arguments: Vec<Value>,
        site: &CallSite,
    ) -> Result<Value, CallError> {
        let chain = self.snapshot(id);
        let arguments: Rc<[Value]> = arguments.into();
        self.resume(id, site, &chain, 0, arguments)
    }

    /// Dispatch a call whose callee is a runtime value.
    pub fn dispatch_dynamic(
        &self,
        callee: &Value,
        arguments: Vec<Value>,
        site: &CallSite,
    ) -> Result<Value, CallError> {
        let id = CallableId::from_callable_value(callee)?;
        self.dispatch(&id, arguments, site)
    }

    /// Entry point for function-body prologues.
    ///
    /// `Ok(None)` tells the caller to run its own body: either nothing live
    /// is bound or every binding declined.
    pub fn intercept(
        &self,
        id: &CallableId,
        arguments: Vec<Value>,
        site: &CallSite,
    ) -> Result<Option<Value>, CallError> {
        let chain = self.snapshot(id);
        if !chain.iter().any(|b| b.is_live()) {
            return Ok(None);
        }
        self.cascade(id, site, &chain, 0, arguments.into())
    }

    /// Prune expired bindings and return the rest newest first.
    fn snapshot(&self, id: &CallableId) -> Chain {
        let mut bindings = self.bindings.borrow_mut();
        let Some(stack) = bindings.get_mut(id) else {
            return Vec::new().into();
        };
        stack.retain(|b| !b.is_expired());
        let chain: Chain = stack.iter().rev().cloned().collect();
        if stack.is_empty() {
            bindings.remove(id);
        }
        chain
    }

    /// Run the chain from `cursor`, then the original.
    fn resume(
        &self,
        id: &CallableId,
        site: &CallSite,
        chain: &Chain,
        cursor: usize,
        arguments: Rc<[Value]>,
    ) -> Result<Value, CallError> {
        match self.cascade(id, site, chain, cursor, Rc::clone(&arguments))? {
            Some(value) => Ok(value),
            None => self.call_original(id, &arguments),
        }
    }

    /// Offer the call to each live binding from `cursor` on.
    ///
    /// `Ok(None)` when the chain is exhausted.
    fn cascade(
        &self,
        id: &CallableId,
        site: &CallSite,
        chain: &Chain,
        cursor: usize,
        arguments: Rc<[Value]>,
    ) -> Result<Option<Value>, CallError> {
        ensure_sufficient_stack(|| {
            for (offset, binding) in chain.iter().enumerate().skip(cursor) {
                if !binding.is_live() {
                    continue;
                }
                tracing::trace!(callable = %id, position = offset, "binding selected");

                let _frame = self.context.enter(Frame {
                    callable: id.clone(),
                    declaring_class: id.class().map(str::to_owned),
                    called_class: site
                        .called_class
                        .clone()
                        .or_else(|| id.class().map(str::to_owned)),
                    arguments: Rc::clone(&arguments),
                });
                let _once = binding.is_one_shot().then(|| binding.fire_once());

                let invocation = Invocation {
                    registry: self,
                    callable: id,
                    site,
                    arguments: Rc::clone(&arguments),
                    chain: Rc::clone(chain),
                    cursor: offset + 1,
                };
                match (binding.replacement)(&invocation)? {
                    Outcome::Handled(value) => return Ok(Some(value)),
                    Outcome::Declined => {
                        tracing::trace!(callable = %id, position = offset, "declined");
                    }
                }
            }
            Ok(None)
        })
    }

    fn call_original(&self, id: &CallableId, arguments: &[Value]) -> Result<Value, CallError> {
        let original = self.originals.borrow().get(id).cloned();
        match original {
            Some(original) => original(arguments),
            None => Err(CallError::Undefined {
                callable: id.to_string(),
            }),
        }
    }
}

/// What a replacement receives for one call.
pub struct Invocation<'r> {
    registry: &'r Registry,
    callable: &'r CallableId,
    site: &'r CallSite,
    arguments: Rc<[Value]>,
    chain: Chain,
    /// First chain position below the running binding.
    cursor: usize,
}

impl<'r> Invocation<'r> {
    pub fn args(&self) -> &[Value] {
        &self.arguments
    }

    /// Argument at `index`, or `None` when the call passed fewer.
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.arguments.get(index)
    }

    pub fn callable(&self) -> &CallableId {
        self.callable
    }

    pub fn site(&self) -> &CallSite {
        self.site
    }

    /// The registry, for nested calls and binding changes mid-call.
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Forward the call, with its original arguments, to what this binding
    /// stands in front of.
    pub fn relay(&self) -> Result<Value, CallError> {
        self.registry.resume(
            self.callable,
            self.site,
            &self.chain,
            self.cursor,
            Rc::clone(&self.arguments),
        )
    }

    /// Like [`relay`](Self::relay) with replaced arguments.
    pub fn relay_with(&self, arguments: Vec<Value>) -> Result<Value, CallError> {
        self.registry.resume(
            self.callable,
            self.site,
            &self.chain,
            self.cursor,
            arguments.into(),
        )
    }
}
