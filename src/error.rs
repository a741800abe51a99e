//! Error types for the fallible parts of the pipeline.
//!
//! Fetching and block parsing never fail outward (see [`crate::fetcher`] and
//! [`crate::parser`]); the enums here cover calendar encoding, persistence,
//! configuration and message delivery.

use std::path::PathBuf;

use thiserror::Error;

/// Why an event could not be turned into a calendar document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The event date is the `TBA` sentinel (or empty).
    #[error("event {id} has no announced date")]
    MissingDate { id: String },

    /// The stored date matches none of the accepted layouts.
    #[error("event {id} has an unparseable date '{date}'")]
    UnparseableDate { id: String, date: String },

    /// The local time does not exist in the reference timezone (DST gap).
    #[error("event {id} starts at '{date}', which does not exist in {tz}")]
    NonexistentLocalTime { id: String, date: String, tz: String },

    /// A batch export had nothing left after filtering.
    #[error("no events with a valid date to export")]
    NoDatedEvents,

    /// The requested event id is not in the catalog.
    #[error("no event with id {0}")]
    UnknownEvent(String),
}

/// Failure reading or writing a whole persisted document.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error on {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Invalid or unreadable configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid source URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A single message could not be delivered to a recipient.
#[derive(Error, Debug)]
#[error("delivery to {recipient} failed: {message}")]
pub struct DeliveryError {
    pub recipient: String,
    pub message: String,
}

impl DeliveryError {
    pub fn new(recipient: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self {
            recipient: recipient.into(),
            message: message.to_string(),
        }
    }
}
