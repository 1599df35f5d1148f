use std::fmt;

use thiserror::Error;

/// The parse that a typed accessor attempted when a value did not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchKind {
    Integer,
    Long,
    Double,
    Float,
    Boolean,
    Bytes,
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MismatchKind::Integer => "an integer",
            MismatchKind::Long => "a long",
            MismatchKind::Double => "a double",
            MismatchKind::Float => "a float",
            MismatchKind::Boolean => "a boolean",
            MismatchKind::Bytes => "a byte size",
        };
        f.write_str(s)
    }
}

/// Unified error type for the keel configuration registry.
#[derive(Error, Debug)]
pub enum KeelError {
    // ── Lookup errors ──────────────────────────────────────────
    #[error("invalid configuration key: {0}")]
    KeyNotFound(String),

    #[error("configuration value of {key} is not {kind}")]
    TypeMismatch { key: String, kind: MismatchKind },

    #[error("no variant of {key} matches '{value}'")]
    EnumLookup { key: String, value: String },

    #[error("requested class could not be loaded: {name}")]
    ClassLoad {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("cyclic placeholder reference: {chain}")]
    CyclicReference { chain: String },

    #[error("placeholder {name} nested deeper than {limit} references")]
    ReferenceTooDeep { name: String, limit: usize },

    // ── Mutation errors ────────────────────────────────────────
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("config validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    // ── Source loading errors ──────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    // ── Generic wrappers ───────────────────────────────────────
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl KeelError {
    pub fn mismatch(key: impl Into<String>, kind: MismatchKind) -> Self {
        KeelError::TypeMismatch {
            key: key.into(),
            kind,
        }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        KeelError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KeelError>;
