//! Shared core for the country directory app.
//!
//! # Overview
//! Everything the mobile UI needs that is not layout: REST Countries request
//! building and response parsing (host-does-IO), the list pipeline that turns
//! raw records into lettered sections, detail formatting, and the persisted
//! light/dark theme preference.
//!
//! # Design
//! - `CountriesClient` is stateless; the host executes every HTTP round-trip.
//! - `build_sections` is a pure function; `CountryDirectory` memoizes it and
//!   tracks the load status so fetch failures reach the UI.
//! - `ThemeStore` is injected into presentation code and persists through any
//!   `KeyValueStore`.
//! - Types use owned `String` / `Vec` fields so they map cleanly onto the C
//!   ABI in `countries-ffi`.

pub mod client;
pub mod collate;
pub mod config;
pub mod detail;
pub mod directory;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod storage;
pub mod theme;
pub mod types;

pub use client::CountriesClient;
pub use config::CoreConfig;
pub use detail::{CountryDetail, CountryRow};
pub use directory::{CountryDirectory, LoadStatus, LoadToken};
pub use error::{ApiError, ConfigError, StorageError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use pipeline::{build_sections, continent_options, FilterState, Section, ALL_CONTINENTS};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use theme::{Palette, Theme, ThemeStore};
pub use types::Country;
