//! Drink entries and the built-in drink catalog.
//!
//! Every logged drink references a kind ("water", "coffee", ...). The kind
//! resolves to [`DrinkMetadata`] through the [`MetadataLookup`] seam; unknown
//! kinds resolve to neutral water so a stale log never breaks the math.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Hydration properties of a drink kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrinkMetadata {
    /// Fraction of pure-water equivalence, 0.0..=1.2.
    pub multiplier: f64,
    pub caffeine: bool,
    pub alcohol: bool,
}

impl DrinkMetadata {
    /// Neutral metadata: plain water. Used as the fallback for unknown kinds.
    pub const NEUTRAL: DrinkMetadata = DrinkMetadata {
        multiplier: 1.0,
        caffeine: false,
        alcohol: false,
    };

    pub fn is_dehydrating(&self) -> bool {
        self.caffeine || self.alcohol
    }
}

/// Metadata resolution seam.
///
/// A total miss must yield [`DrinkMetadata::NEUTRAL`], never an error.
pub trait MetadataLookup {
    fn lookup(&self, kind: &str) -> DrinkMetadata;
}

/// A single logged drink. Immutable once logged, except for deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrinkEntry {
    /// Volume in milliliters. Always positive.
    pub amount_ml: u32,
    pub kind: String,
    pub logged_at: NaiveDateTime,
}

impl DrinkEntry {
    /// Create a validated entry.
    ///
    /// # Errors
    ///
    /// Returns an error if `amount_ml` is zero.
    pub fn new(
        amount_ml: u32,
        kind: impl Into<String>,
        logged_at: NaiveDateTime,
    ) -> Result<Self, ValidationError> {
        if amount_ml == 0 {
            return Err(ValidationError::InvalidValue {
                field: "amount_ml".into(),
                message: "volume must be positive".into(),
            });
        }
        Ok(Self {
            amount_ml,
            kind: kind.into(),
            logged_at,
        })
    }
}

/// Built-in drink kinds with their hydration multipliers.
pub struct DrinkCatalog {
    kinds: HashMap<String, DrinkMetadata>,
}

impl DrinkCatalog {
    pub fn builtin() -> Self {
        let mut kinds = HashMap::new();
        let mut add = |name: &str, multiplier: f64, caffeine: bool, alcohol: bool| {
            kinds.insert(
                name.to_string(),
                DrinkMetadata {
                    multiplier,
                    caffeine,
                    alcohol,
                },
            );
        };
        add("water", 1.0, false, false);
        add("sparkling_water", 1.0, false, false);
        add("tea", 0.98, true, false);
        add("coffee", 0.95, true, false);
        add("juice", 0.85, false, false);
        add("milk", 1.1, false, false);
        add("soda", 0.85, true, false);
        add("energy_drink", 0.8, true, false);
        add("beer", 0.7, false, true);
        add("wine", 0.5, false, true);
        Self { kinds }
    }

    /// Known kind names, sorted.
    pub fn kind_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for DrinkCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MetadataLookup for DrinkCatalog {
    fn lookup(&self, kind: &str) -> DrinkMetadata {
        self.kinds.get(kind).copied().unwrap_or(DrinkMetadata::NEUTRAL)
    }
}
