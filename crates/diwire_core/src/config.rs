//! Run configuration loaded from TOML.
//!
//! # Invariants
//! - Every field has a default; an empty file is a valid configuration.
//! - `validate()` runs before any output is prepared.

use crate::logging::default_log_level;
use crate::output::DEFAULT_MANIFEST_NAME;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_OUTPUT_DIR: &str = "generated";
const DEFAULT_SOURCE_EXTENSION: &str = "java";

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Engine and output settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Root directory of the filesystem sink.
    pub output_dir: PathBuf,
    /// Manifest identity, written to `META-INF/<manifest_name>`.
    pub manifest_name: String,
    /// File extension of generated modules, without the dot.
    pub source_extension: String,
    /// Replaces the built-in module template when set.
    pub template: Option<PathBuf>,
    pub log_level: String,
    /// Absolute directory for rolling log files; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
            template: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl EngineConfig {
    /// Parses and validates TOML text.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let extension = self.source_extension.trim();
        if extension.is_empty() {
            return Err(ConfigError::Invalid(
                "source_extension must not be empty".to_string(),
            ));
        }
        if extension.starts_with('.') {
            return Err(ConfigError::Invalid(format!(
                "source_extension must not start with a dot, got `{extension}`"
            )));
        }

        let manifest = self.manifest_name.trim();
        if manifest.is_empty() {
            return Err(ConfigError::Invalid(
                "manifest_name must not be empty".to_string(),
            ));
        }
        if manifest.starts_with('/') || Path::new(manifest).is_absolute() {
            return Err(ConfigError::Invalid(format!(
                "manifest_name must be relative, got `{manifest}`"
            )));
        }
        if manifest.split('/').any(|segment| segment == "..") {
            return Err(ConfigError::Invalid(format!(
                "manifest_name must stay inside META-INF, got `{manifest}`"
            )));
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "output_dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}
