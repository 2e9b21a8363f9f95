//! Configuration snapshot read from `rebind.json`.
//!
//! ```json
//! {
//!     "redefinable_internals": ["strlen", "time"],
//!     "blacklist": ["vendor/"],
//!     "whitelist": ["vendor/acme/"],
//!     "expand_magic_constants": true,
//!     "rewrite_import_paths": true
//! }
//! ```
//!
//! Every key is optional. Hyphenated spellings (`redefinable-internals`)
//! are accepted as well.

use std::path::{Component, Path, PathBuf};

use rustc_hash::FxHashSet;

/// File name searched for by [`Config::locate`].
pub const CONFIG_FILE: &str = "rebind.json";

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Built-in functions whose call sites are rewritten. Empty disables
    /// built-in interception entirely.
    #[serde(alias = "redefinable-internals")]
    pub redefinable_internals: Vec<String>,
    /// Path prefixes that are never rewritten.
    pub blacklist: Vec<PathBuf>,
    /// Path prefixes rewritten even inside a blacklisted directory.
    pub whitelist: Vec<PathBuf>,
    /// Replace `__DIR__` / `__FILE__` with literals of the original path.
    #[serde(alias = "expand-magic-constants")]
    pub expand_magic_constants: bool,
    /// Route `include` / `require` paths through the import path rewriter.
    #[serde(alias = "rewrite-import-paths")]
    pub rewrite_import_paths: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("`{name}` is not a valid function name")]
    InvalidName { name: String },
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file. Relative filter paths are taken relative to the
    /// directory the file lives in.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json(&text)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for entry in config.blacklist.iter_mut().chain(config.whitelist.iter_mut()) {
            if entry.is_relative() {
                *entry = base.join(&*entry);
            }
            *entry = normalize(entry);
        }
        tracing::debug!(
            internals = config.redefinable_internals.len(),
            blacklist = config.blacklist.len(),
            whitelist = config.whitelist.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Find the nearest `rebind.json` in `start` or one of its ancestors.
    pub fn locate(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Normalized redefinable names: lower-case, no leading `\`.
    pub fn redefinable_names(&self) -> FxHashSet<String> {
        self.redefinable_internals
            .iter()
            .map(|name| name.trim_start_matches('\\').to_ascii_lowercase())
            .collect()
    }

    pub fn is_blacklisted(&self, path: &Path) -> bool {
        under_any(&self.blacklist, path)
    }

    pub fn is_whitelisted(&self, path: &Path) -> bool {
        under_any(&self.whitelist, path)
    }

    /// Whether a file at `path` should go through the rewrite pipeline.
    ///
    /// Both `path` and the filter entries are compared after
    /// [`normalize`], so `/srv/app/../vendor/x.php` is under `/srv/vendor`.
    pub fn should_transform(&self, path: &Path) -> bool {
        !self.is_blacklisted(path) || self.is_whitelisted(path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self.redefinable_internals.iter().find(|n| !is_function_name(n)) {
            Some(name) => Err(ConfigError::InvalidName { name: name.clone() }),
            None => Ok(()),
        }
    }
}

fn under_any(prefixes: &[PathBuf], path: &Path) -> bool {
    let path = normalize(path);
    prefixes
        .iter()
        .any(|prefix| path.starts_with(normalize(prefix)))
}

/// Lexically resolve `.` and `..` components without touching the file
/// system. A `..` that would climb above the root is dropped; one that
/// leads a relative path is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match result.components().next_back() {
                Some(Component::Normal(_)) => {
                    result.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => result.push(".."),
            },
            _ => result.push(component),
        }
    }
    result
}

fn is_function_name(name: &str) -> bool {
    let name = name.strip_prefix('\\').unwrap_or(name);
    !name.is_empty()
        && name.split('\\').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}
