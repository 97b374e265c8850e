//! Stateful model behind the country list screen.
//!
//! # Design
//! `CountryDirectory` owns everything the list screen derives its rows from:
//! the raw records, the filter inputs and the load status. Sections are
//! cached and only rebuilt after an input that affects them changed, so a
//! host may ask for them on every frame.
//!
//! Loads are tagged with a generation number. `reset` (the screen going away)
//! bumps the generation, and a response that arrives afterwards is dropped
//! instead of resurrecting stale data.

use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::pipeline::{build_sections, continent_options, FilterState, Section, ALL_CONTINENTS};
use crate::types::Country;

/// Where the one-shot list fetch stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(ApiError),
}

/// Token identifying one load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadToken(u64);

impl LoadToken {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub struct CountryDirectory {
    countries: Vec<Country>,
    continents: Vec<String>,
    filter: FilterState,
    status: LoadStatus,
    generation: u64,
    sections: Vec<Section>,
    dirty: bool,
    rebuilds: u64,
}

impl Default for CountryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl CountryDirectory {
    pub fn new() -> Self {
        Self {
            countries: Vec::new(),
            continents: continent_options(&[]),
            filter: FilterState::default(),
            status: LoadStatus::Loading,
            generation: 0,
            sections: Vec::new(),
            dirty: false,
            rebuilds: 0,
        }
    }

    /// Start a load and return the token its completion must carry.
    pub fn begin_load(&mut self) -> LoadToken {
        self.generation += 1;
        self.status = LoadStatus::Loading;
        LoadToken(self.generation)
    }

    /// Apply the outcome of a load. Returns `false` when the token is stale
    /// and the outcome was discarded.
    pub fn complete_load(
        &mut self,
        token: LoadToken,
        outcome: Result<Vec<Country>, ApiError>,
    ) -> bool {
        if token.0 != self.generation {
            debug!(
                token = token.0,
                current = self.generation,
                "discarding stale country load"
            );
            return false;
        }
        match outcome {
            Ok(countries) => {
                info!(count = countries.len(), "country list loaded");
                self.continents = continent_options(&countries);
                self.countries = countries;
                self.status = LoadStatus::Ready;
                self.dirty = true;
            }
            Err(err) => {
                warn!(error = %err, "country list load failed");
                self.status = LoadStatus::Failed(err);
            }
        }
        true
    }

    /// Drop all data, as when the screen unmounts. Pending loads become stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.countries.clear();
        self.continents = continent_options(&[]);
        self.filter = FilterState::default();
        self.status = LoadStatus::Loading;
        self.sections.clear();
        self.dirty = false;
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    /// `"All"` plus every continent of the loaded list, first-seen order.
    pub fn continents(&self) -> &[String] {
        &self.continents
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn set_search_text(&mut self, text: &str) {
        if self.filter.search_text == text {
            return;
        }
        let before = self.filter.search_needle();
        self.filter.search_text = text.to_string();
        if self.filter.search_needle() != before {
            self.dirty = true;
        }
    }

    pub fn select_continent(&mut self, continent: &str) {
        if self.filter.selected_continent != continent {
            self.filter.selected_continent = continent.to_string();
            self.dirty = true;
        }
    }

    pub fn clear_continent(&mut self) {
        self.select_continent(ALL_CONTINENTS);
    }

    /// Current sections, rebuilt first if an input changed since last time.
    pub fn sections(&mut self) -> &[Section] {
        if self.dirty {
            self.sections = build_sections(&self.countries, &self.filter);
            self.dirty = false;
            self.rebuilds += 1;
            debug!(
                sections = self.sections.len(),
                search = %self.filter.search_text,
                continent = %self.filter.selected_continent,
                "rebuilt country sections"
            );
        }
        &self.sections
    }

    /// Loaded, but nothing survives the filters.
    pub fn is_empty_result(&mut self) -> bool {
        self.status == LoadStatus::Ready && self.sections().is_empty()
    }
}
