//! Derived view-model for the country list: filter, search, sort, group.
//!
//! # Design
//! `build_sections` is a pure function of the raw list and a `FilterState`.
//! It holds no state and is cheap enough to rerun on every keystroke for the
//! ~250 records REST Countries serves; `CountryDirectory` adds memoization on
//! top for hosts that render more often than inputs change.

use std::collections::BTreeMap;

use crate::collate::sort_key;
use crate::types::Country;

/// Continent filter value that disables the continent restriction.
pub const ALL_CONTINENTS: &str = "All";

/// Section title for countries without an official name.
pub const UNNAMED_SECTION: &str = "#";

/// Message the presentation layer shows when no section survives filtering.
pub const NO_RESULTS_MESSAGE: &str = "No countries found";

/// User-controlled inputs to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub search_text: String,
    pub selected_continent: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            selected_continent: ALL_CONTINENTS.to_string(),
        }
    }
}

impl FilterState {
    pub fn new(search_text: &str, selected_continent: &str) -> Self {
        Self {
            search_text: search_text.to_string(),
            selected_continent: selected_continent.to_string(),
        }
    }

    /// Search text as the matcher sees it: trimmed and lower-cased.
    pub fn search_needle(&self) -> String {
        self.search_text.trim().to_lowercase()
    }
}

/// A titled group of countries sharing the same first letter.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub data: Vec<Country>,
}

/// Selectable continent filter values: `"All"` followed by every distinct
/// continent in first-seen order.
pub fn continent_options(countries: &[Country]) -> Vec<String> {
    let mut options = vec![ALL_CONTINENTS.to_string()];
    for continent in countries.iter().flat_map(|c| &c.continents) {
        if !options.iter().any(|o| o == continent) {
            options.push(continent.clone());
        }
    }
    options
}

/// Case-insensitive substring match against the official name or the first
/// capital. `needle` must already be lower-cased; empty matches everything.
pub fn matches_search(country: &Country, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let name = country.official_name().to_lowercase();
    let capital = country.primary_capital().unwrap_or_default().to_lowercase();
    name.contains(needle) || capital.contains(needle)
}

/// Section title for a country: the upper-cased first character of its
/// official name, or `"#"` when the name is empty.
pub fn section_title(country: &Country) -> String {
    match country.official_name().chars().next() {
        Some(first) => first.to_uppercase().collect(),
        None => UNNAMED_SECTION.to_string(),
    }
}

/// Run the full pipeline and return display-ready sections.
///
/// Sections are ordered by title code point; countries within a section keep
/// the locale-aware name order.
pub fn build_sections(countries: &[Country], filter: &FilterState) -> Vec<Section> {
    let needle = filter.search_needle();
    let continent = filter.selected_continent.as_str();

    let mut retained: Vec<&Country> = countries
        .iter()
        .filter(|c| continent == ALL_CONTINENTS || c.in_continent(continent))
        .filter(|c| matches_search(c, &needle))
        .collect();
    retained.sort_by_cached_key(|c| sort_key(c.official_name()));

    let mut groups: BTreeMap<String, Vec<Country>> = BTreeMap::new();
    for country in retained {
        groups
            .entry(section_title(country))
            .or_default()
            .push(country.clone());
    }

    groups
        .into_iter()
        .map(|(title, data)| Section { title, data })
        .collect()
}
