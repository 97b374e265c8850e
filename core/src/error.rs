//! Error types for the country directory core.
//!
//! # Design
//! `NotFound` gets a dedicated variant because the detail screen needs to tell
//! "no country has this capital" apart from "the server misbehaved."
//! `FetchFailed` carries transport failures the host reports (no connectivity,
//! timeouts), so the presentation layer can show an error instead of spinning
//! forever.

use thiserror::Error;

/// Errors returned by `CountriesClient` parse methods and carried by the
/// directory's load status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server returned 404, or an empty result for a lookup.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The host could not complete the HTTP round-trip.
    #[error("fetch failed: {0}")]
    FetchFailed(String),
}

/// Errors from a `KeyValueStore` backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but is not a flat JSON object of strings.
    #[error("storage file is corrupt: {0}")]
    Corrupt(String),
}

/// Errors from loading a `CoreConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
