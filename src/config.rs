//! Run configuration (`bigdiff.toml`).
//!
//! [`RunConfig`] holds every layout decision the engine makes on disk: where
//! the working directory and output directory live, what the output files are
//! called, and how buckets and outputs are compressed. Relative directories
//! are resolved against the input directory; absolute ones are used as is.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RunConfig
// ---------------------------------------------------------------------------

/// Layout and compression settings for one run.
///
/// Parsed from TOML. Missing fields use defaults; a missing file means all
/// defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Working directory for bucket files (default: `"temp"`).
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Output directory for the two diff files (default: `"diff"`).
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// File name of the lines only in the left input (default: `"diff-left.gz"`).
    #[serde(default = "default_diff_left_file")]
    pub diff_left_file: String,

    /// File name of the lines only in the right input (default: `"diff-right.gz"`).
    #[serde(default = "default_diff_right_file")]
    pub diff_right_file: String,

    /// Extension appended to bucket file names (default: `"gz"`).
    #[serde(default = "default_bucket_extension")]
    pub bucket_extension: String,

    /// gzip level for bucket and output files, 0-9 (default: 6).
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            output_dir: default_output_dir(),
            diff_left_file: default_diff_left_file(),
            diff_right_file: default_diff_right_file(),
            bucket_extension: default_bucket_extension(),
            compression_level: default_compression_level(),
        }
    }
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("temp")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("diff")
}

fn default_diff_left_file() -> String {
    "diff-left.gz".to_owned()
}

fn default_diff_right_file() -> String {
    "diff-right.gz".to_owned()
}

fn default_bucket_extension() -> String {
    "gz".to_owned()
}

const fn default_compression_level() -> u32 {
    6
}

impl RunConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields [`RunConfig::default`].
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file cannot be read, is not valid TOML,
    /// contains unknown keys, or fails [`RunConfig::validate`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    /// Returns [`ConfigError`] on invalid TOML, unknown fields, or invalid values.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start]
                    .chars()
                    .filter(|&c| c == '\n')
                    .count()
                    + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError {
                path: None,
                message,
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that TOML typing alone cannot enforce.
    ///
    /// # Errors
    /// Returns [`ConfigError`] describing the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError {
            path: None,
            message,
        };
        if self.temp_dir.as_os_str().is_empty() {
            return Err(invalid("temp_dir must not be empty".to_owned()));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(invalid("output_dir must not be empty".to_owned()));
        }
        if self.temp_dir == self.output_dir {
            return Err(invalid(format!(
                "temp_dir and output_dir must differ (both '{}')",
                self.temp_dir.display()
            )));
        }
        for (key, name) in [
            ("diff_left_file", &self.diff_left_file),
            ("diff_right_file", &self.diff_right_file),
        ] {
            if !is_plain_file_name(name) {
                return Err(invalid(format!(
                    "{key} must be a plain file name, got '{name}'"
                )));
            }
        }
        if self.diff_left_file == self.diff_right_file {
            return Err(invalid(format!(
                "diff_left_file and diff_right_file must differ (both '{}')",
                self.diff_left_file
            )));
        }
        if self.bucket_extension.is_empty()
            || self.bucket_extension.contains(['.', '/', '\\'])
        {
            return Err(invalid(format!(
                "bucket_extension must be a non-empty extension without dots or separators, got '{}'",
                self.bucket_extension
            )));
        }
        if self.compression_level > 9 {
            return Err(invalid(format!(
                "compression_level must be between 0 and 9, got {}",
                self.compression_level
            )));
        }
        Ok(())
    }

    /// Working directory for a run over `input_dir`.
    #[must_use]
    pub fn temp_path(&self, input_dir: &Path) -> PathBuf {
        input_dir.join(&self.temp_dir)
    }

    /// Output directory for a run over `input_dir`.
    #[must_use]
    pub fn output_path(&self, input_dir: &Path) -> PathBuf {
        input_dir.join(&self.output_dir)
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// An error loading or validating a [`RunConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigError {
    /// Path to the config file, if it came from one.
    pub path: Option<PathBuf>,
    /// Human-readable description of the problem.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(p) => write!(f, "config error in {}: {}", p.display(), self.message),
            None => write!(f, "config error: {}", self.message),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
