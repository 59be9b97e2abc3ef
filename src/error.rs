//! Error types for the binding engine
//!
//! Setup-time failures (bad addresses, collisions under a rejecting policy,
//! socket errors in `run`) surface synchronously as [`BindError`]. Per-message
//! failures on the inbound path are logged at the dispatch boundary and never
//! reach the listener loop.

use thiserror::Error;

/// Failure while converting between a [`crate::Value`] and OSC arguments
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdapterError {
    #[error("message carries no argument to decode")]
    MissingArgument,

    #[error("cannot build {expected} from OSC argument {found}")]
    TypeMismatch { expected: String, found: String },

    /// Enum member lookup failed (decode mismatch)
    #[error("'{value}' is not a member of {type_name}")]
    ValueNotFound { value: String, type_name: String },

    #[error("adapter '{adapter}' cannot encode {kind}")]
    Unsupported { adapter: String, kind: String },
}

/// Errors raised by the service, registry and transport
#[derive(Debug, Error)]
pub enum BindError {
    #[error("invalid OSC address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("an endpoint is already registered at '{0}'")]
    AddressCollision(String),

    #[error("invalid service configuration: {0}")]
    InvalidConfig(String),

    #[error("OSC listener is already running")]
    AlreadyRunning,

    #[error("bound field at '{0}' no longer exists")]
    FieldDropped(String),

    #[error("expected a {expected} value, got {found}")]
    ValueType { expected: String, found: String },

    #[error("OSC codec error: {0}")]
    Codec(String),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}

impl BindError {
    pub(crate) fn invalid_address(address: &str, reason: impl Into<String>) -> Self {
        BindError::InvalidAddress {
            address: address.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = BindError> = std::result::Result<T, E>;
