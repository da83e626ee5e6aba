//! Sync configuration.
//!
//! Configuration can come from an `opsync.toml` file:
//!
//! ```toml
//! enum_source = "src/opcodes.hh"
//! generated = "src/lembed_generated.cpp"
//! debug_table = "src/test_parser.cpp"
//!
//! [style]
//! enum_name = "Opcode"
//! placeholder_prefix = "OP_"
//! ```
//!
//! Every key is optional. Relative paths are resolved against a root directory.

use crate::style::SymbolStyle;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Name of the configuration file looked up in the root directory.
pub const CONFIG_FILE: &str = "opsync.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// The three files to keep in sync, and how opcodes are spelled in them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Header declaring the canonical enumeration
    pub enum_source: PathBuf,
    /// Generated implementation with raw-index placeholders
    pub generated: PathBuf,
    /// File holding the debug name table block
    pub debug_table: PathBuf,
    /// Spelling conventions
    pub style: SymbolStyle,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enum_source: PathBuf::from("src/opcodes.hh"),
            generated: PathBuf::from("src/lembed_generated.cpp"),
            debug_table: PathBuf::from("src/test_parser.cpp"),
            style: SymbolStyle::default(),
        }
    }
}

impl SyncConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `explicit` if given, otherwise `root/opsync.toml` if it exists,
    /// otherwise the defaults. Paths are returned as written; see [`Self::resolve`].
    pub fn discover(root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let candidate = root.join(CONFIG_FILE);
                if candidate.is_file() {
                    debug!("using config {}", candidate.display());
                    Self::from_file(candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Join relative paths onto `root`.
    pub fn resolve(mut self, root: &Path) -> Self {
        for path in [&mut self.enum_source, &mut self.generated, &mut self.debug_table] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
        self
    }
}
