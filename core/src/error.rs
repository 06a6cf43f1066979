//! Error types for the catalog gateway.
//!
//! # Design
//! `FetchError` keeps the status/network/parse distinction for logging, but
//! the coordinator collapses every variant into one user-facing message per
//! fetch mode.

use thiserror::Error;

/// Why a single catalog fetch failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The catalog answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response (DNS, connect, reset, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The body was not a JSON object with a list-valued (or null) `drinks`.
    #[error("unexpected response body: {0}")]
    Parse(String),
}

/// A presentation command the coordinator refused to issue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// Category filters only accept categories of records that were displayed.
    #[error("category {0:?} was never displayed")]
    CategoryNotDisplayed(String),

    /// The clicked card carries no category.
    #[error("card has no category")]
    NoCategory,
}

/// Invalid client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid catalog base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
