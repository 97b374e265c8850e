//! Country records as served by REST Countries v3.1.
//!
//! # Design
//! The upstream API omits fields freely (a territory without a capital, a
//! record fetched with a narrow `fields=` list) and occasionally sends `null`.
//! Every field therefore has a default and a missing or `null` value never
//! fails the parse. Top-level fields the core does not model are kept in
//! `extra` so they survive a serialize/deserialize trip.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single country record.
///
/// Only `name.official`, `capital[0]`, `flags.png` and `continents` drive the
/// list pipeline; the remaining fields feed the detail screen.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Country {
    #[serde(deserialize_with = "nullable")]
    pub name: CountryName,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub capital: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub flags: Flags,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub continents: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub independent: Option<bool>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "BTreeMap::is_empty")]
    pub currencies: BTreeMap<String, Currency>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "BTreeMap::is_empty")]
    pub languages: BTreeMap<String, String>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub timezones: Vec<String>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Car::is_empty")]
    pub car: Car,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ccn3: Option<String>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "BTreeMap::is_empty")]
    pub gini: BTreeMap<String, f64>,
    /// Upstream fields with no typed counterpart.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Country {
    /// Official name, empty when the record has none.
    pub fn official_name(&self) -> &str {
        &self.name.official
    }

    /// First listed capital, if any.
    pub fn primary_capital(&self) -> Option<&str> {
        self.capital.first().map(String::as_str)
    }

    /// Exact, case-sensitive continent membership test.
    pub fn in_continent(&self, continent: &str) -> bool {
        self.continents.iter().any(|c| c == continent)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CountryName {
    #[serde(deserialize_with = "nullable")]
    pub official: String,
    #[serde(deserialize_with = "nullable")]
    pub common: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Flags {
    #[serde(deserialize_with = "nullable")]
    pub png: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Currency {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

/// Driving information; `side` is `"left"` or `"right"` upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Car {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub signs: Vec<String>,
}

impl Car {
    fn is_empty(&self) -> bool {
        self.side.is_none() && self.signs.is_empty()
    }
}

/// Deserialize `null` as the type's default instead of failing.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
