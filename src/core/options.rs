//! Synchronization settings

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::array_cache::ArrayEncoding;
use crate::util::{Error, Result};

/// Default idle time before an unreferenced cached array may be evicted.
pub const DEFAULT_SWEEP_MAX_AGE_SECS: f64 = 20.0;

/// Settings of one synchronization session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    /// Emit traversal diagnostics
    pub debug: bool,
    /// Diff every relation against an empty list
    pub ignore_last_dependencies: bool,
    /// Zip array payloads on fetch
    pub compression: bool,
    /// Return raw bytes instead of base64 text
    pub binary: bool,
    pub sweep_max_age_secs: f64,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            debug: false,
            ignore_last_dependencies: false,
            compression: true,
            binary: false,
            sweep_max_age_secs: DEFAULT_SWEEP_MAX_AGE_SECS,
        }
    }
}

impl SyncOptions {
    /// Parse options from JSON. Missing keys take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Save options to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.sweep_max_age_secs.is_finite() || self.sweep_max_age_secs < 0.0 {
            return Err(Error::InvalidOptions(format!(
                "sweep_max_age_secs must be a non-negative number, got {}",
                self.sweep_max_age_secs
            )));
        }
        Ok(())
    }

    /// Payload encoding selected by `binary` and `compression`.
    pub fn encoding(&self) -> ArrayEncoding {
        ArrayEncoding::new(self.binary, self.compression)
    }

    pub fn sweep_max_age(&self) -> Duration {
        Duration::try_from_secs_f64(self.sweep_max_age_secs).unwrap_or(Duration::ZERO)
    }
}
