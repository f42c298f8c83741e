use std::io;
use std::path::{Path, PathBuf};

use deck::{Syntax, SyntaxError, SyntaxOptions};
use runner::{ExecutorRegistry, ExecutorsConfig};
use serde::Deserialize;

/// Looked up next to the presented document when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "deck.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Comment prefix and stop marker.
    pub syntax: SyntaxOptions,
    /// Executors merged over the built-in ones, keyed by language.
    pub executors: ExecutorsConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl Config {
    pub fn from_toml(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn syntax(&self) -> Result<Syntax, ConfigError> {
        Ok(Syntax::from_options(&self.syntax)?)
    }

    /// Built-in executors with the configured ones merged on top.
    pub fn registry(&self) -> ExecutorRegistry {
        let mut registry = ExecutorRegistry::with_defaults();
        registry.apply_config(&self.executors);
        registry
    }
}

/// Load the config from `explicit`, else from `deck.toml` beside
/// `document`, else fall back to defaults.
pub fn load(explicit: Option<&Path>, document: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let beside = document
                .and_then(Path::parent)
                .map(|dir| dir.join(CONFIG_FILE_NAME))
                .filter(|candidate| candidate.is_file());
            match beside {
                Some(path) => path,
                None => {
                    tracing::debug!("no config file found, using defaults");
                    return Ok(Config::default());
                }
            }
        }
    };

    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loaded config");
    Config::from_toml(&contents, &path)
}
