//! Stateless HTTP request builder and response parser for REST Countries.
//!
//! # Design
//! `CountriesClient` holds only a `base_url` and carries no mutable state
//! between calls. Each endpoint is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The host executes the actual HTTP round-trip, keeping the core
//! deterministic and free of I/O dependencies.

use std::fmt::Write as _;

use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::Country;

/// Public REST Countries endpoint.
pub const DEFAULT_BASE_URL: &str = "https://restcountries.com/v3.1";

/// Fields requested for the list screen. `/all` rejects requests without a
/// field list, and the pipeline needs nothing else.
pub const LIST_FIELDS: &str = "name,capital,flags,continents";

/// Synchronous, stateless client for the REST Countries API.
#[derive(Debug, Clone)]
pub struct CountriesClient {
    base_url: String,
}

impl Default for CountriesClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl CountriesClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_countries(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/all?fields={LIST_FIELDS}", self.base_url),
            headers: accept_json(),
            body: None,
        }
    }

    /// Build the detail lookup. `capital` is the row's detail key and may
    /// contain spaces or non-ASCII letters.
    pub fn build_country_by_capital(&self, capital: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/capital/{}", self.base_url, percent_encode(capital)),
            headers: accept_json(),
            body: None,
        }
    }

    pub fn parse_list_countries(&self, response: HttpResponse) -> Result<Vec<Country>, ApiError> {
        check_status(&response, 200)?;
        let countries: Vec<Country> = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        debug!(count = countries.len(), "parsed country list");
        Ok(countries)
    }

    /// Parse a capital lookup. The endpoint answers with an array; the first
    /// element wins and an empty array means no match.
    pub fn parse_country_by_capital(&self, response: HttpResponse) -> Result<Country, ApiError> {
        check_status(&response, 200)?;
        let countries: Vec<Country> = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        countries.into_iter().next().ok_or(ApiError::NotFound)
    }
}

fn accept_json() -> Vec<(String, String)> {
    vec![("accept".to_string(), "application/json".to_string())]
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

/// Percent-encode a single path segment (RFC 3986 unreserved set kept).
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for &b in input.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char);
            }
            _ => {
                let _ = write!(out, "%{b:02X}");
            }
        }
    }
    out
}
