//! Light/dark theme preference and its persistence.
//!
//! # Design
//! `ThemeStore` is an explicit object handed to presentation code, not an
//! ambient global. It has one writer path, `toggle`, which updates memory and
//! notifies subscribers before persisting, so the UI reacts immediately and a
//! failed write only costs the preference on next launch.
//!
//! The store does not follow later changes of the system colour scheme; the
//! system value is consulted once, at initialization, and only when nothing
//! was persisted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::storage::KeyValueStore;

/// Storage key holding the persisted theme.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown theme: {0:?}")]
pub struct UnknownTheme(pub String);

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn palette(self) -> &'static Palette {
        match self {
            Theme::Light => &LIGHT_PALETTE,
            Theme::Dark => &DARK_PALETTE,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = UnknownTheme;

    /// Only the exact persisted spellings are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(UnknownTheme(other.to_string())),
        }
    }
}

/// Colours for one theme, as `#RRGGBB` or `#RRGGBBAA` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub text: &'static str,
    pub secondary_text: &'static str,
    pub border: &'static str,
    pub divider: &'static str,
    pub input_background: &'static str,
    pub input_border: &'static str,
    pub icon: &'static str,
    pub accent: &'static str,
}

pub const LIGHT_PALETTE: Palette = Palette {
    background: "#FFFFFF",
    text: "#000000",
    secondary_text: "#666666",
    border: "#CCCCCC",
    divider: "#98A2B333",
    input_background: "#F2F4F7",
    input_border: "#000000",
    icon: "#000000",
    accent: "#4CAF50",
};

pub const DARK_PALETTE: Palette = Palette {
    background: "#000F24",
    text: "#FFFFFF",
    secondary_text: "#98A2B3",
    border: "#666666",
    divider: "#98A2B333",
    input_background: "#98A2B333",
    input_border: "#98A2B333",
    icon: "#FFD700",
    accent: "#4CAF50",
};

/// Handle returned by `ThemeStore::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }
}

type Listener = Box<dyn FnMut(Theme) + Send>;

/// Process-wide theme preference backed by a `KeyValueStore`.
pub struct ThemeStore<S> {
    storage: S,
    value: Theme,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl<S: KeyValueStore> ThemeStore<S> {
    /// Build the store from the persisted value, falling back to
    /// `system_scheme`, then to light. Storage problems are logged and read
    /// as "nothing persisted".
    pub fn initialize(storage: S, system_scheme: Option<Theme>) -> Self {
        let persisted = match storage.get(THEME_KEY) {
            Ok(Some(raw)) => match raw.parse::<Theme>() {
                Ok(theme) => Some(theme),
                Err(e) => {
                    warn!(error = %e, "ignoring persisted theme");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "failed to read persisted theme");
                None
            }
        };
        let value = persisted.or(system_scheme).unwrap_or_default();
        debug!(theme = %value, persisted = persisted.is_some(), "theme initialized");
        Self {
            storage,
            value,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn value(&self) -> Theme {
        self.value
    }

    /// Flip the theme, notify subscribers, then persist. Returns the new value.
    ///
    /// A failed write is logged and otherwise ignored; the in-memory value
    /// stands for the rest of the session.
    pub fn toggle(&mut self) -> Theme {
        self.value = self.value.toggled();
        info!(theme = %self.value, "theme toggled");
        for (_, listener) in &mut self.listeners {
            listener(self.value);
        }
        if let Err(e) = self.storage.set(THEME_KEY, self.value.as_str()) {
            warn!(error = %e, theme = %self.value, "failed to persist theme");
        }
        self.value
    }

    /// Register `listener` to run after every change.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(Theme) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S> fmt::Debug for ThemeStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeStore")
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
