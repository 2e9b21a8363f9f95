//! The stock actions, bound to the runtime's [`Hooks`].

use std::path::Path;

use rebind_lexer::IMPORTS;
use rebind_source::{SpliceMode, TokenKind};

use crate::action::{action, Action};
use crate::generic::{
    expression_end, inject_false_expression_at_beginnings, prepend_code_to_functions,
    wrap_unary_construct_arguments,
};
use crate::hooks::{string_literal, Hooks};

/// Route the code string of every `eval` through the eval wrapper, so
/// evaluated code is rewritten too.
pub fn propagate_through_eval(hooks: &Hooks) -> impl Action {
    wrap_unary_construct_arguments(TokenKind::Eval, hooks.eval_wrapper.clone())
        .named("propagate_through_eval")
}

pub fn inject_script_beginning_triggers(hooks: &Hooks) -> impl Action {
    inject_false_expression_at_beginnings(hooks.script_trigger.clone())
        .named("inject_script_beginning_triggers")
}

pub fn inject_call_interception_code(hooks: &Hooks) -> impl Action {
    prepend_code_to_functions(hooks.prologue.clone()).named("inject_call_interception_code")
}

/// Wrap the path expression of `include`, `require` and their `_once`
/// forms in the import path rewriter.
///
/// Parentheses are not special here: `require ('a') . 'b'` wraps the
/// whole concatenation.
pub fn propagate_through_import_paths(hooks: &Hooks) -> impl Action {
    let rewriter = hooks.import_rewriter.clone();
    action("propagate_through_import_paths", move |source| {
        for import in source.all(IMPORTS) {
            let end = expression_end(source, import)?;
            source.splice(
                &format!(" {rewriter}("),
                import + 1,
                0,
                SpliceMode::AppendAtEnd,
            )?;
            source.splice(")", end, 0, SpliceMode::PrependAtStart)?;
        }
        Ok(())
    })
}

/// Replace `__DIR__` and `__FILE__` with literals of the file's original
/// location. Sources without a file name are left alone.
pub fn expand_magic_filesystem_constants() -> impl Action {
    action("expand_magic_filesystem_constants", |source| {
        let Some(file) = source.file().map(str::to_owned) else {
            return Ok(());
        };
        let dir = Path::new(&file)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| ".".to_owned());

        let dir = string_literal(&dir);
        for pos in source.all(TokenKind::MagicDir) {
            source.splice(&dir, pos, 1, SpliceMode::Replace)?;
        }
        let file = string_literal(&file);
        for pos in source.all(TokenKind::MagicFile) {
            source.splice(&file, pos, 1, SpliceMode::Replace)?;
        }
        Ok(())
    })
}

/// Apply everything queued so far, so later actions see rewritten tokens.
pub fn flush() -> impl Action {
    action("flush", |source| {
        source.flush();
        Ok(())
    })
}
