//! Errors raised by the identity map and synchronization engine.
//!
//! Lookups never fail: a miss is `Ok(None)`. Errors are reserved for
//! resource exhaustion, bad configuration, and native-side rejections.

use fxe_native::NativeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    /// The object id allocator ran past its configured maximum.
    #[error("object ids exhausted (last id {last})")]
    IdsExhausted { last: u64 },

    #[error("invalid file configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Native(#[from] NativeError),

    #[cfg(feature = "config-file")]
    #[error("failed to parse file configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result alias for graph operations.
pub type Result<T, E = FileError> = std::result::Result<T, E>;
