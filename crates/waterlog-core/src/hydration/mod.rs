//! Net-hydration calculation.
//!
//! Raw volumes are scaled by each drink's hydration multiplier into an
//! effective volume, then a dehydration penalty attributed to caffeinated and
//! alcoholic entries is subtracted. Everything here is a pure function of its
//! inputs; persistence and presentation live elsewhere.

use serde::{Deserialize, Serialize};

use crate::drink::{DrinkEntry, MetadataLookup};

/// Configurable band for the goal threshold.
const THRESHOLD_MIN: f64 = 0.8;
const THRESHOLD_MAX: f64 = 1.2;

/// Fluid-loss fractions per dehydrating substance.
///
/// An entry that is both caffeinated and alcoholic loses the sum of both
/// fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DehydrationPolicy {
    /// Fraction of caffeinated volume counted as fluid loss.
    pub caffeine_fraction: f64,
    /// Fraction of alcoholic volume counted as fluid loss.
    pub alcohol_fraction: f64,
}

impl Default for DehydrationPolicy {
    fn default() -> Self {
        Self {
            caffeine_fraction: 0.05,
            alcohol_fraction: 0.15,
        }
    }
}

impl DehydrationPolicy {
    fn fraction_for(&self, caffeine: bool, alcohol: bool) -> f64 {
        let mut fraction = 0.0;
        if caffeine {
            fraction += self.caffeine_fraction;
        }
        if alcohol {
            fraction += self.alcohol_fraction;
        }
        fraction
    }
}

/// The three reported totals plus the penalty behind them. Milliliters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HydrationTotals {
    /// Sum of raw logged volumes.
    pub total_actual_ml: u32,
    /// Sum of volume x hydration multiplier.
    pub total_effective_ml: f64,
    /// Penalty pool attributed to caffeinated/alcoholic entries.
    pub total_dehydration_ml: f64,
    /// Effective minus dehydration, floored at zero.
    pub net_hydration_ml: f64,
}

/// Penalty pool: per-substance fractions applied to each dehydrating entry's
/// raw volume, summed over the day.
pub fn dehydration_pool(
    entries: &[DrinkEntry],
    lookup: &dyn MetadataLookup,
    policy: &DehydrationPolicy,
) -> f64 {
    entries
        .iter()
        .map(|e| {
            let meta = lookup.lookup(&e.kind);
            f64::from(e.amount_ml) * policy.fraction_for(meta.caffeine, meta.alcohol)
        })
        .sum()
}

/// Distribute a penalty pool across the dehydrating entries, proportionally
/// to each entry's share of the dehydrating raw volume.
///
/// Returns one penalty per input entry (zero for non-dehydrating entries).
/// An empty dehydrating subset distributes nothing.
pub fn distribute_penalty(
    entries: &[DrinkEntry],
    lookup: &dyn MetadataLookup,
    pool_ml: f64,
) -> Vec<f64> {
    let sum_raw: u64 = entries
        .iter()
        .filter(|e| lookup.lookup(&e.kind).is_dehydrating())
        .map(|e| u64::from(e.amount_ml))
        .sum();
    if sum_raw == 0 {
        return vec![0.0; entries.len()];
    }
    entries
        .iter()
        .map(|e| {
            if lookup.lookup(&e.kind).is_dehydrating() {
                pool_ml * (f64::from(e.amount_ml) / sum_raw as f64)
            } else {
                0.0
            }
        })
        .collect()
}

/// Compute the day's totals from raw entries.
pub fn compute_totals(
    entries: &[DrinkEntry],
    lookup: &dyn MetadataLookup,
    policy: &DehydrationPolicy,
) -> HydrationTotals {
    let mut total_actual_ml: u32 = 0;
    let mut total_effective_ml = 0.0;
    for entry in entries {
        let meta = lookup.lookup(&entry.kind);
        total_actual_ml = total_actual_ml.saturating_add(entry.amount_ml);
        total_effective_ml += f64::from(entry.amount_ml) * meta.multiplier;
    }
    let total_dehydration_ml = dehydration_pool(entries, lookup, policy);
    // Never report negative hydration.
    let net_hydration_ml = (total_effective_ml - total_dehydration_ml).max(0.0);
    HydrationTotals {
        total_actual_ml,
        total_effective_ml,
        total_dehydration_ml,
        net_hydration_ml,
    }
}

/// Whether net hydration has reached the (threshold-scaled) daily goal.
///
/// The threshold is clamped to the user-configurable 0.8..=1.2 band.
pub fn goal_reached(totals: &HydrationTotals, goal_ml: u32, threshold: f64) -> bool {
    let threshold = threshold.clamp(THRESHOLD_MIN, THRESHOLD_MAX);
    totals.net_hydration_ml >= f64::from(goal_ml) * threshold
}
