//! Error types for HL7 v2 processing operations

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for HL7 v2 processing operations
#[derive(Debug, Error)]
pub enum PipehatError {
    /// Message text contains no MSH header segment
    #[error("message has no MSH header segment")]
    MissingHeader,

    /// Item address string failed the grammar check
    #[error("invalid item address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Malformed `address=value` filter expression
    #[error("invalid filter expression '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    /// Malformed glob pattern in a path argument
    #[error("invalid path pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// MLLP transport errors (connect, TLS, write, acknowledgment)
    #[error("transport error for {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// Generic internal errors
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Header,
    Address,
    Filter,
    Pattern,
    Io,
    Transport,
    Internal,
}

impl PipehatError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipehatError::MissingHeader => ErrorKind::Header,
            PipehatError::InvalidAddress { .. } => ErrorKind::Address,
            PipehatError::InvalidFilter { .. } => ErrorKind::Filter,
            PipehatError::InvalidPattern { .. } => ErrorKind::Pattern,
            PipehatError::Io { .. } => ErrorKind::Io,
            PipehatError::Transport { .. } => ErrorKind::Transport,
            PipehatError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (can continue processing other files)
    ///
    /// Bad input files and dead endpoints are per-file problems; malformed
    /// addresses, filters, and patterns are caller mistakes that abort the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Header | ErrorKind::Io | ErrorKind::Transport
        )
    }

    /// Create an invalid address error
    pub fn invalid_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid filter error
    pub fn invalid_filter(filter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFilter {
            filter: filter.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a transport error
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for PipehatError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}
