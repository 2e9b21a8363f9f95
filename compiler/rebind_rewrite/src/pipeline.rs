//! Ordered action pipelines.

use rebind_config::Config;
use rebind_source::{StructuralError, TokenSource};

use crate::action::Action;
use crate::calls::{splice_dynamic_calls, splice_named_function_calls};
use crate::hooks::Hooks;
use crate::standard::{
    expand_magic_filesystem_constants, inject_call_interception_code,
    inject_script_beginning_triggers, propagate_through_eval, propagate_through_import_paths,
};

/// An action failed; the source it was working on must not be executed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{action} failed{}: {source}", location(.file))]
pub struct RewriteError {
    pub action: String,
    pub file: Option<String>,
    #[source]
    pub source: StructuralError,
}

fn location(file: &Option<String>) -> String {
    file.as_deref().map(|f| format!(" on {f}")).unwrap_or_default()
}

/// Actions applied in registration order to one source at a time.
#[derive(Default)]
pub struct Pipeline {
    actions: Vec<Box<dyn Action>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, action: impl Action + 'static) -> &mut Self {
        self.actions.push(Box::new(action));
        self
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Names of the registered actions, in order.
    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(|a| a.name())
    }

    /// Run every action against `source`, then apply the queued splices.
    ///
    /// On error nothing is applied.
    #[tracing::instrument(level = "debug", skip_all, fields(file = source.file().unwrap_or("<string>")))]
    pub fn transform(&self, source: &mut TokenSource) -> Result<(), RewriteError> {
        for action in &self.actions {
            action.apply(source).map_err(|error| {
                tracing::debug!(action = action.name(), %error, "action failed");
                RewriteError {
                    action: action.name().to_owned(),
                    file: source.file().map(str::to_owned),
                    source: error,
                }
            })?;
        }
        tracing::trace!(splices = source.pending(), "applying splices");
        source.flush();
        Ok(())
    }

    /// Lex `code`, transform it, and return the rewritten text.
    pub fn transform_string(&self, code: &str, file: Option<&str>) -> Result<String, RewriteError> {
        let mut source = TokenSource::parse(code);
        if let Some(file) = file {
            source = source.with_file(file);
        }
        self.transform(&mut source)?;
        Ok(source.to_text())
    }

    /// Transform the body of an `eval` call, which has no open tag.
    pub fn transform_for_eval(&self, code: &str) -> Result<String, RewriteError> {
        const PREFIX: &str = "<?php ";
        let text = self.transform_string(&format!("{PREFIX}{code}"), None)?;
        Ok(text
            .strip_prefix(PREFIX)
            .map_or_else(|| text.clone(), str::to_owned))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.action_names()).finish()
    }
}

/// The standard pipeline for `config`, calling into the runtime at `hooks`.
///
/// Order: eval propagation, import paths and magic constants (when
/// enabled), script triggers, interception prologues, named calls, then
/// dynamic calls.
pub fn standard_pipeline(config: &Config, hooks: &Hooks) -> Pipeline {
    let names = config.redefinable_names();
    let dynamic_calls = !names.is_empty();
    let mut pipeline = Pipeline::new();
    pipeline.register(propagate_through_eval(hooks));
    if config.rewrite_import_paths {
        pipeline.register(propagate_through_import_paths(hooks));
    }
    if config.expand_magic_constants {
        pipeline.register(expand_magic_filesystem_constants());
    }
    pipeline
        .register(inject_script_beginning_triggers(hooks))
        .register(inject_call_interception_code(hooks))
        .register(splice_named_function_calls(names, hooks))
        .register(splice_dynamic_calls(dynamic_calls, hooks));
    pipeline
}

#[cfg(test)]
mod tests;
