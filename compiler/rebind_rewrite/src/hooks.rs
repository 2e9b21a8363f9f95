//! Names of the runtime entry points that rewritten code calls into.

/// Where the host runtime exposes each entry point.
///
/// Every generated snippet is built from these, so a host that mounts the
/// runtime under another namespace only changes this value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hooks {
    /// `dispatch('name', [args])` for named calls.
    pub dispatch: String,
    /// `dispatch_dynamic($callee, [args])` for variable callees.
    pub dispatch_dynamic: String,
    /// Variable holding the dynamic dispatcher, for calls that must start
    /// with `$` such as the first call inside a `{$...}` interpolation.
    pub dispatch_dynamic_variable: String,
    /// Wraps the code string passed to `eval`.
    pub eval_wrapper: String,
    /// Complete expression run once at the start of each script.
    pub script_trigger: String,
    /// Wraps the path of `include` / `require`.
    pub import_rewriter: String,
    /// Statement prepended to every named function body.
    pub prologue: String,
}

impl Default for Hooks {
    fn default() -> Self {
        Hooks {
            dispatch: r"\Rebind\dispatch".into(),
            dispatch_dynamic: r"\Rebind\dispatch_dynamic".into(),
            dispatch_dynamic_variable: "$GLOBALS['__rebind_dispatch_dynamic']".into(),
            eval_wrapper: r"\Rebind\transform_for_eval".into(),
            script_trigger: r"\Rebind\notify_script_beginning()".into(),
            import_rewriter: r"\Rebind\rewrite_import_path".into(),
            prologue: concat!(
                r"if (\Rebind\intercept(__CLASS__, __FUNCTION__, \func_get_args(), $__rebind_result)) ",
                r"{ return $__rebind_result; }"
            )
            .into(),
        }
    }
}

/// Render `text` as a single-quoted host string literal.
pub fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        if matches!(c, '\\' | '\'') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}
