//! Configuration for loading images.
//!
//! Provides centralized configuration with sensible defaults. Every section
//! can be deserialized from JSON, and missing fields fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::error::{ElfError, Result};
use crate::io::IOLimits;
use crate::timeout::DEFAULT_TIMEOUT_SECONDS;

/// Environment variable that makes the dynamic linker print its load trace.
pub const DEFAULT_TRACE_ENV_VAR: &str = "LD_TRACE_LOADED_OBJECTS";

/// Master configuration for `ElfImage::open_with_config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Limits applied when mapping the file.
    pub io: IOLimits,
    /// Library resolution settings.
    pub libraries: LibraryConfig,
}

/// Settings for the dynamic-linker trace used to find library bases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Run the resolver while loading (default: false).
    pub resolve_on_load: bool,
    /// Seconds to wait for the traced process (default: 10).
    pub timeout_seconds: u64,
    /// Variable set in the child environment (default: LD_TRACE_LOADED_OBJECTS).
    pub trace_env_var: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            resolve_on_load: false,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            trace_env_var: DEFAULT_TRACE_ENV_VAR.to_string(),
        }
    }
}

impl LoadConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LoadConfig =
            serde_json::from_str(json).map_err(|e| ElfError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ElfError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.io.max_file_size == 0 {
            return Err(ElfError::Config("io.max_file_size must be non-zero".into()));
        }
        if self.libraries.timeout_seconds == 0 {
            return Err(ElfError::Config(
                "libraries.timeout_seconds must be non-zero".into(),
            ));
        }
        let var = &self.libraries.trace_env_var;
        if var.is_empty() || var.contains('=') || var.contains('\0') {
            return Err(ElfError::Config(format!(
                "libraries.trace_env_var {:?} is not a valid variable name",
                var
            )));
        }
        Ok(())
    }
}
