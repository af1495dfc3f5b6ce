//! Lock-assignment settings snapshot.
//!
//! The host UI owns the live controls; the engine consumes one immutable
//! [`LockSettings`] value per assignment batch. All fields deserialize
//! with per-field defaults so a partial snapshot from the UI still yields
//! a complete configuration.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{PoolSource, SchoolDistribution, Tier};

/// Immutable per-run configuration for lock assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct LockSettings {
    /// Percentage of non-root spells that should receive a lock, 0--100.
    #[serde(default = "default_global_lock_percent")]
    pub global_lock_percent: f64,

    /// Per-tier lock percentages (novice..master), each 0--100, applied to
    /// the tier's node count when splitting a school's budget.
    #[serde(default = "default_tier_percents")]
    pub tier_percents: [f64; Tier::COUNT],

    /// How the global budget is split across schools.
    #[serde(default = "default_school_distribution")]
    pub school_distribution: SchoolDistribution,

    /// Which population candidate pools draw from.
    #[serde(default = "default_pool_source")]
    pub pool_source: PoolSource,

    /// Maximum layout distance for the `nearby` pool source.
    #[serde(default = "default_distance")]
    pub distance: f64,

    /// Blend factor between similarity and proximity for `nearby` pools,
    /// 0.0 (similarity only) to 1.0 (proximity only).
    #[serde(default = "default_proximity_bias")]
    pub proximity_bias: f64,

    /// Allow candidates from the same tier as the locked node.
    #[serde(default = "default_true")]
    pub same_tier: bool,

    /// Allow candidates from lower tiers.
    #[serde(default = "default_true")]
    pub prev_tier: bool,

    /// Allow candidates from higher tiers.
    #[serde(default)]
    pub higher_tier: bool,

    /// Allow locking to a candidate that already carries locks of its own.
    /// When `false`, lock chains cannot form.
    #[serde(default)]
    pub allow_locked_lock: bool,

    /// Whether the external scorer backend is enabled. Also consulted when
    /// an in-flight response arrives: a response received after the flag
    /// was turned off is discarded without touching the graph.
    #[serde(default)]
    pub use_remote_scorer: bool,
}

const fn default_global_lock_percent() -> f64 {
    25.0
}

const fn default_tier_percents() -> [f64; Tier::COUNT] {
    [25.0; Tier::COUNT]
}

const fn default_school_distribution() -> SchoolDistribution {
    SchoolDistribution::Proportional
}

const fn default_pool_source() -> PoolSource {
    PoolSource::SameSchool
}

const fn default_distance() -> f64 {
    5.0
}

const fn default_proximity_bias() -> f64 {
    0.5
}

const fn default_true() -> bool {
    true
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            global_lock_percent: default_global_lock_percent(),
            tier_percents: default_tier_percents(),
            school_distribution: default_school_distribution(),
            pool_source: default_pool_source(),
            distance: default_distance(),
            proximity_bias: default_proximity_bias(),
            same_tier: true,
            prev_tier: true,
            higher_tier: false,
            allow_locked_lock: false,
            use_remote_scorer: false,
        }
    }
}

impl LockSettings {
    /// Return a copy with every percentage clamped to its legal range:
    /// percents to `[0, 100]`, proximity bias to `[0, 1]`, and distance
    /// floored at 0.
    pub fn sanitized(&self) -> Self {
        let mut clamped = self.clone();
        clamped.global_lock_percent = self.global_lock_percent.clamp(0.0, 100.0);
        for pct in &mut clamped.tier_percents {
            *pct = pct.clamp(0.0, 100.0);
        }
        clamped.proximity_bias = self.proximity_bias.clamp(0.0, 1.0);
        clamped.distance = self.distance.max(0.0);
        clamped
    }
}
