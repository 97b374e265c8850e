//! Display-ready rows and detail cards built from a `Country`.

use crate::types::Country;

/// Placeholder shown, and used as the lookup key, for countries without a
/// capital.
pub const NO_CAPITAL: &str = "No capital";

/// One entry of the country list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRow {
    pub title: String,
    pub subtitle: String,
    pub flag_url: String,
    /// Value passed to `CountriesClient::build_country_by_capital` when the
    /// row is opened.
    pub detail_key: String,
}

impl From<&Country> for CountryRow {
    fn from(country: &Country) -> Self {
        let capital = country
            .primary_capital()
            .filter(|c| !c.is_empty())
            .unwrap_or(NO_CAPITAL);
        Self {
            title: country.official_name().to_string(),
            subtitle: capital.to_string(),
            flag_url: country.flags.png.clone(),
            detail_key: capital.to_string(),
        }
    }
}

/// Every line of the detail screen, formatted. Empty strings mean "unknown".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CountryDetail {
    pub common_name: String,
    pub flag_url: String,
    pub population: String,
    pub region: String,
    pub capital: String,
    pub languages: String,
    pub currencies: String,
    pub independent: String,
    pub area: String,
    pub gini: String,
    pub timezones: String,
    pub numeric_code: String,
    pub driving_side: String,
}

impl From<&Country> for CountryDetail {
    fn from(country: &Country) -> Self {
        let currencies = country
            .currencies
            .values()
            .map(|c| match c.symbol.as_deref() {
                Some(symbol) if !symbol.is_empty() => format!("{} ({symbol})", c.name),
                _ => c.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");

        // Keys are years; the lexically greatest is the latest.
        let gini = country
            .gini
            .iter()
            .next_back()
            .map(|(year, value)| format!("{} ({year})", format_decimal(*value)))
            .unwrap_or_default();

        Self {
            common_name: country.name.common.clone(),
            flag_url: country.flags.png.clone(),
            population: country.population.map(group_thousands).unwrap_or_default(),
            region: country.region.clone().unwrap_or_default(),
            capital: country.capital.join(", "),
            languages: country
                .languages
                .values()
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
            currencies,
            independent: country
                .independent
                .map(|b| b.to_string().to_uppercase())
                .unwrap_or_default(),
            area: country.area.map(format_decimal).unwrap_or_default(),
            gini,
            timezones: country.timezones.join(", "),
            numeric_code: country.ccn3.clone().unwrap_or_default(),
            driving_side: country
                .car
                .side
                .as_deref()
                .map(capitalize)
                .unwrap_or_default(),
        }
    }
}

/// `31072945` -> `"31,072,945"`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Grouped integer part, at most three fraction digits, no trailing zeros.
pub fn format_decimal(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    let rounded = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');
    let int_grouped = int_part
        .parse::<u64>()
        .map(group_thousands)
        .unwrap_or_else(|_| int_part.to_string());
    let sign = if value < 0.0 && (int_grouped != "0" || !frac.is_empty()) {
        "-"
    } else {
        ""
    };
    if frac.is_empty() {
        format!("{sign}{int_grouped}")
    } else {
        format!("{sign}{int_grouped}.{frac}")
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
