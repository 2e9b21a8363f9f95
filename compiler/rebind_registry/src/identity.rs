//! Callable identities and import-alias resolution.
//!
//! Host names are case-insensitive and may carry a leading `\`, so every
//! identity is normalized on construction: lower-cased, root separator
//! stripped. Two spellings of the same callable always hash equal.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::{CallError, Value};

/// Normalized key of something that can be redefined.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallableId {
    /// Free function by fully qualified name.
    Function(String),
    Method {
        class: String,
        method: String,
        is_static: bool,
    },
    /// Distinct from any method so that `new C` can be intercepted.
    Constructor { class: String },
}

const CONSTRUCTOR: &str = "__construct";

fn normalize(name: &str) -> String {
    name.trim().trim_start_matches('\\').to_ascii_lowercase()
}

impl CallableId {
    pub fn function(name: &str) -> Self {
        CallableId::Function(normalize(name))
    }

    /// An instance method. `__construct` maps to [`CallableId::Constructor`].
    pub fn method(class: &str, method: &str) -> Self {
        Self::member(class, method, false)
    }

    pub fn static_method(class: &str, method: &str) -> Self {
        Self::member(class, method, true)
    }

    pub fn constructor(class: &str) -> Self {
        CallableId::Constructor {
            class: normalize(class),
        }
    }

    fn member(class: &str, method: &str, is_static: bool) -> Self {
        let method = normalize(method);
        if method == CONSTRUCTOR {
            return Self::constructor(class);
        }
        CallableId::Method {
            class: normalize(class),
            method,
            is_static,
        }
    }

    /// Parse `name`, `Class::method`, or `Class->method`.
    ///
    /// Returns `None` when any part is empty.
    pub fn parse(text: &str) -> Option<Self> {
        let (class, method, is_static) = if let Some((c, m)) = text.split_once("::") {
            (c, m, true)
        } else if let Some((c, m)) = text.split_once("->") {
            (c, m, false)
        } else {
            let name = normalize(text);
            return (!name.is_empty()).then_some(CallableId::Function(name));
        };
        if normalize(class).is_empty() || normalize(method).is_empty() {
            return None;
        }
        Some(Self::member(class, method, is_static))
    }

    /// Identity of a callee value at a dynamic call site.
    ///
    /// Accepts a name string (`"f"`, `"C::m"`) or a two-element
    /// `[class, method]` list, which denotes a static method.
    pub fn from_callable_value(callee: &Value) -> Result<Self, CallError> {
        let not_callable = || CallError::NotCallable {
            value: callee.to_string(),
        };
        match callee {
            Value::Str(text) => Self::parse(text).ok_or_else(not_callable),
            Value::List(items) => match items.as_slice() {
                [Value::Str(class), Value::Str(method)]
                    if !normalize(class).is_empty() && !normalize(method).is_empty() =>
                {
                    Ok(Self::static_method(class, method))
                }
                _ => Err(not_callable()),
            },
            _ => Err(not_callable()),
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, CallableId::Function(_))
    }

    /// Class a method or constructor belongs to.
    pub fn class(&self) -> Option<&str> {
        match self {
            CallableId::Function(_) => None,
            CallableId::Method { class, .. } | CallableId::Constructor { class } => Some(class),
        }
    }

    /// Bare function or method name.
    pub fn name(&self) -> &str {
        match self {
            CallableId::Function(name) => name,
            CallableId::Method { method, .. } => method,
            CallableId::Constructor { .. } => CONSTRUCTOR,
        }
    }
}

impl fmt::Display for CallableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallableId::Function(name) => f.write_str(name),
            CallableId::Method {
                class,
                method,
                is_static: true,
            } => write!(f, "{class}::{method}"),
            CallableId::Method { class, method, .. } => write!(f, "{class}->{method}"),
            CallableId::Constructor { class } => write!(f, "new {class}"),
        }
    }
}

/// Namespace and `use` aliases in effect where a name is written.
///
/// Keys and targets are stored normalized.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportScope {
    namespace: String,
    functions: FxHashMap<String, String>,
    classes: FxHashMap<String, String>,
}

impl ImportScope {
    pub fn new(namespace: &str) -> Self {
        ImportScope {
            namespace: normalize(namespace),
            ..Self::default()
        }
    }

    /// Record `use function target as alias;`.
    #[must_use]
    pub fn with_function_alias(mut self, alias: &str, target: &str) -> Self {
        self.functions.insert(normalize(alias), normalize(target));
        self
    }

    /// Record `use target as alias;`.
    #[must_use]
    pub fn with_class_alias(mut self, alias: &str, target: &str) -> Self {
        self.classes.insert(normalize(alias), normalize(target));
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Resolve a function name as written at a call site.
    ///
    /// Unqualified names resolve through the function aliases, then to the
    /// current namespace.
    pub fn resolve_function(&self, name: &str) -> CallableId {
        if name.trim_start().starts_with('\\') {
            return CallableId::function(name);
        }
        let lower = normalize(name);
        if lower.contains('\\') {
            return CallableId::Function(self.resolve_qualified(&lower));
        }
        match self.functions.get(&lower) {
            Some(target) => CallableId::Function(target.clone()),
            None => CallableId::Function(self.prefixed(&lower)),
        }
    }

    /// Resolve a class name as written in source to its qualified form.
    pub fn resolve_class(&self, name: &str) -> String {
        if name.trim_start().starts_with('\\') {
            return normalize(name);
        }
        let lower = normalize(name);
        if lower.contains('\\') {
            return self.resolve_qualified(&lower);
        }
        match self.classes.get(&lower) {
            Some(target) => target.clone(),
            None => self.prefixed(&lower),
        }
    }

    /// `A\b` where `A` may be an aliased namespace.
    fn resolve_qualified(&self, lower: &str) -> String {
        let (first, rest) = lower.split_once('\\').unwrap_or((lower, ""));
        match self.classes.get(first) {
            Some(target) => format!("{target}\\{rest}"),
            None => self.prefixed(lower),
        }
    }

    fn prefixed(&self, lower: &str) -> String {
        if self.namespace.is_empty() {
            lower.to_owned()
        } else {
            format!("{}\\{lower}", self.namespace)
        }
    }
}
