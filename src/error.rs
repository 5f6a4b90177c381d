//! Error types for the SableKV search client
//!
//! Provides a unified error type for command construction and reply decoding.

use thiserror::Error;

/// Result type alias using SableError
pub type Result<T> = std::result::Result<T, SableError>;

/// Unified error type for search-client operations
#[derive(Debug, Error)]
pub enum SableError {
    // -------------------------------------------------------------------------
    // I/O Errors (surfaced by transport implementations)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    /// Caller misuse detected at build or configuration time: a disallowed
    /// dialect value, an empty variadic clause that requires at least one
    /// element, a range filter upper bound without a lower bound.
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// The reply tree does not have the shape the requested clauses imply.
    /// Signals a client/server protocol mismatch, never retried here.
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    /// Reserved for transport implementations executing token sequences.
    #[error("Network error: {0}")]
    Network(String),
}
