//! Identity map configuration.
//!
//! # Example
//!
//! ```
//! use fxe_graph::FileConfig;
//!
//! let config = FileConfig::default()
//!     .with_first_object_id(100)
//!     .with_pin_weak_targets(true);
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{FileError, Result};

/// Settings for one open [`crate::File`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "config-file",
    derive(serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct FileConfig {
    /// First object id handed out.
    pub first_object_id: u64,
    /// Largest object id handed out; allocation past it fails.
    pub max_object_id: u64,
    /// Give every weak-reference target first wrapped by a read sync one
    /// extra [`crate::File::keep_alive`] pin, so it outlives the handles
    /// pointing at it. When off, such targets live as long as a weak handle
    /// points at them.
    pub pin_weak_targets: bool,
    /// Emit a trace event for every level a syncer visits.
    pub trace_sync: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            first_object_id: 1,
            max_object_id: u64::MAX,
            pin_weak_targets: false,
            trace_sync: false,
        }
    }
}

impl FileConfig {
    #[must_use]
    pub fn with_first_object_id(mut self, id: u64) -> Self {
        self.first_object_id = id;
        self
    }

    #[must_use]
    pub fn with_max_object_id(mut self, id: u64) -> Self {
        self.max_object_id = id;
        self
    }

    #[must_use]
    pub fn with_pin_weak_targets(mut self, pin: bool) -> Self {
        self.pin_weak_targets = pin;
        self
    }

    #[must_use]
    pub fn with_trace_sync(mut self, trace: bool) -> Self {
        self.trace_sync = trace;
        self
    }

    /// Check the settings for consistency.
    ///
    /// # Errors
    ///
    /// [`FileError::InvalidConfig`] if the id range is empty or starts at 0.
    pub fn validate(&self) -> Result<()> {
        if self.first_object_id == 0 {
            return Err(FileError::InvalidConfig(
                "first_object_id must be at least 1".into(),
            ));
        }
        if self.first_object_id > self.max_object_id {
            return Err(FileError::InvalidConfig(format!(
                "first_object_id {} exceeds max_object_id {}",
                self.first_object_id, self.max_object_id
            )));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    ///
    /// Missing keys take their default; unknown keys are rejected.
    ///
    /// # Errors
    ///
    /// [`FileError::ConfigParse`] on malformed TOML or unknown keys,
    /// [`FileError::InvalidConfig`] if validation fails.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(FileConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_id_range_is_rejected() {
        let config = FileConfig::default()
            .with_first_object_id(10)
            .with_max_object_id(9);
        assert!(matches!(config.validate(), Err(FileError::InvalidConfig(_))));
        let zero = FileConfig::default().with_first_object_id(0);
        assert!(zero.validate().is_err());
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn toml_fills_defaults_and_rejects_unknown_keys() {
        let config = FileConfig::from_toml_str("pin_weak_targets = true\n").expect("parse");
        assert!(config.pin_weak_targets);
        assert_eq!(config.first_object_id, 1);

        let err = FileConfig::from_toml_str("pin_roots = true\n").expect_err("unknown key");
        assert!(matches!(err, FileError::ConfigParse(_)));

        let err = FileConfig::from_toml_str("first_object_id = 0\n").expect_err("invalid");
        assert!(matches!(err, FileError::InvalidConfig(_)));
    }
}
