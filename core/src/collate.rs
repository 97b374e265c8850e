//! Locale-aware string ordering for country names.
//!
//! Country names mix cases and diacritics ("Åland Islands", "Republic of
//! Côte d'Ivoire"), and the list must read alphabetically rather than in
//! code-point order. The comparison is tiered the way common collations are:
//!
//! 1. base letters, ignoring case and accents (`é` == `e`, `ß` == `ss`);
//! 2. accents;
//! 3. case, lower before upper;
//! 4. raw code points, so distinct strings never compare equal.
//!
//! Every tier works on the canonical decomposition (NFD), so a precomposed
//! `ô` and `o` followed by U+0302 collate identically. Letters that have no
//! decomposition (`ß`, `æ`, `ø`, `ł`, ...) are folded explicitly.

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Precomputed collation key. Ordering the keys orders the strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    primary: String,
    secondary: String,
    tertiary: Vec<bool>,
    raw: String,
}

pub fn sort_key(s: &str) -> SortKey {
    let secondary: String = s.nfd().flat_map(char::to_lowercase).collect();
    let mut primary = String::with_capacity(secondary.len());
    for c in secondary.chars().filter(|c| !is_combining_mark(*c)) {
        push_base(&mut primary, c);
    }
    SortKey {
        primary,
        secondary,
        tertiary: s
            .nfd()
            .filter(|c| !is_combining_mark(*c))
            .map(char::is_uppercase)
            .collect(),
        raw: s.to_string(),
    }
}

/// Compare two strings with the tiered ordering described above.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    sort_key(a).cmp(&sort_key(b))
}

/// Append the base form of a lower-case, already decomposed character.
fn push_base(out: &mut String, c: char) {
    match c {
        'ß' => out.push_str("ss"),
        'æ' => out.push_str("ae"),
        'œ' => out.push_str("oe"),
        'ø' => out.push('o'),
        'đ' | 'ð' => out.push('d'),
        'ħ' => out.push('h'),
        'ı' => out.push('i'),
        'ł' => out.push('l'),
        'ŧ' => out.push('t'),
        other => out.push(other),
    }
}
