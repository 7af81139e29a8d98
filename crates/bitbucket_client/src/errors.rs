//! Error types for Bitbucket client operations.
//!
//! This module defines the error types that can occur when translating
//! Bitbucket URLs or reading the integration configuration.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during Bitbucket client operations.
///
/// Each variant carries the offending input or a description of the
/// inconsistency so that callers can surface a useful message without
/// further context.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The target could not be parsed as an absolute URL, or its path does
    /// not have the shape of a Bitbucket browse URL.
    ///
    /// This error is surfaced synchronously and is never retried.
    #[error("Incorrect URL: {0}")]
    IncorrectUrl(String),

    /// The integration configuration is inconsistent.
    ///
    /// This error occurs when:
    /// - A self-hosted installation is configured without an API base URL
    /// - Only one half of a username/appPassword pair is provided
    /// - Configured credentials cannot be carried in an HTTP header
    #[error("Invalid Bitbucket integration config, {0}")]
    InvalidConfig(String),

    /// The target URL carries no ref, but the requested operation is
    /// scoped to a branch, tag, or commit.
    #[error("Unable to determine the ref of {0}")]
    MissingRef(String),
}
