//! `rewrite`: run the standard pipeline over one file.

use std::path::{Path, PathBuf};

use rebind_config::Config;
use rebind_rewrite::{standard_pipeline, Hooks};

use super::{absolute, read_file, CommandError};

#[derive(Clone, Debug, Default)]
pub struct RewriteOptions {
    /// Explicit config file. Without one the nearest `rebind.json` above
    /// the input is used, and failing that the defaults.
    pub config: Option<PathBuf>,
    pub hooks: Hooks,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RewriteOutcome {
    Rewritten(String),
    /// The config excludes the file; carries the original text.
    Skipped(String),
}

impl RewriteOutcome {
    pub fn text(&self) -> &str {
        match self {
            RewriteOutcome::Rewritten(text) | RewriteOutcome::Skipped(text) => text,
        }
    }
}

#[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn rewrite_file(path: &Path, options: &RewriteOptions) -> Result<RewriteOutcome, CommandError> {
    let path = absolute(path);
    let code = read_file(&path)?;
    let config = load_config(&path, options.config.as_deref())?;

    if !config.should_transform(&path) {
        tracing::debug!("excluded by configuration");
        return Ok(RewriteOutcome::Skipped(code));
    }

    let pipeline = standard_pipeline(&config, &options.hooks);
    let file = path.to_string_lossy();
    let text = pipeline.transform_string(&code, Some(&file))?;
    Ok(RewriteOutcome::Rewritten(text))
}

fn load_config(path: &Path, explicit: Option<&Path>) -> Result<Config, CommandError> {
    let located = match explicit {
        Some(config) => Some(absolute(config)),
        None => path.parent().and_then(Config::locate),
    };
    match located {
        Some(config) => Ok(Config::load(&config)?),
        None => {
            tracing::debug!("no configuration found, using defaults");
            Ok(Config::default())
        }
    }
}
