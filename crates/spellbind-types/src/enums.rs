//! Enumeration types for the Spellbind lock engine.
//!
//! Covers the five-step skill tier ladder with its resolution fallbacks,
//! plus the two settings enums that shape budget distribution and
//! candidate pool construction.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// The five-step skill tier ladder.
///
/// Tier classification feeds the per-tier budget split, so the resolution
/// rules in [`Tier::resolve`] must be applied exactly: a wrong tier shifts
/// lock counts between buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Tier {
    /// Entry-level spells, typically at or near the school root.
    Novice,
    /// Early-progression spells.
    Apprentice,
    /// Mid-tree spells.
    Adept,
    /// Late-progression spells.
    Expert,
    /// Capstone spells at the deepest reaches of a school.
    Master,
}

/// Depth at or below which a node falls back to [`Tier::Novice`].
///
/// Depths 1--4 are not expected from the generator (explicit tier indices
/// occupy that numeric range); only depth 0 legitimately lands here.
pub const DEPTH_NOVICE_MAX: u32 = 4;
/// Maximum tree depth bucketed as [`Tier::Apprentice`].
pub const DEPTH_APPRENTICE_MAX: u32 = 6;
/// Maximum tree depth bucketed as [`Tier::Adept`].
pub const DEPTH_ADEPT_MAX: u32 = 9;
/// Maximum tree depth bucketed as [`Tier::Expert`]; deeper nodes are
/// [`Tier::Master`].
pub const DEPTH_EXPERT_MAX: u32 = 14;

impl Tier {
    /// Number of tiers in the ladder.
    pub const COUNT: usize = 5;

    /// All tiers in ascending order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Novice,
        Self::Apprentice,
        Self::Adept,
        Self::Expert,
        Self::Master,
    ];

    /// Zero-based index of this tier, usable against a percent table.
    pub const fn index(self) -> usize {
        match self {
            Self::Novice => 0,
            Self::Apprentice => 1,
            Self::Adept => 2,
            Self::Expert => 3,
            Self::Master => 4,
        }
    }

    /// Resolve a tier from an explicit zero-based index in `[0, 4]`.
    pub const fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Novice),
            1 => Some(Self::Apprentice),
            2 => Some(Self::Adept),
            3 => Some(Self::Expert),
            4 => Some(Self::Master),
            _ => None,
        }
    }

    /// Resolve a tier from a case-insensitive skill-level label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "novice" => Some(Self::Novice),
            "apprentice" => Some(Self::Apprentice),
            "adept" => Some(Self::Adept),
            "expert" => Some(Self::Expert),
            "master" => Some(Self::Master),
            _ => None,
        }
    }

    /// Bucket a raw tree depth into a tier.
    ///
    /// The thresholds are heuristics tuned for the original generator's
    /// branching factor, not a law of the domain; they are constants here
    /// (`DEPTH_*_MAX`) so a differently-shaped tree can retune them.
    pub const fn from_depth(depth: u32) -> Self {
        if depth <= DEPTH_NOVICE_MAX {
            Self::Novice
        } else if depth <= DEPTH_APPRENTICE_MAX {
            Self::Apprentice
        } else if depth <= DEPTH_ADEPT_MAX {
            Self::Adept
        } else if depth <= DEPTH_EXPERT_MAX {
            Self::Expert
        } else {
            Self::Master
        }
    }

    /// Resolve a node's tier from its available hints, in precedence order:
    ///
    /// 1. An explicit skill-level label (case-insensitive).
    /// 2. A numeric value in `[0, 4]`, used directly as a tier index.
    /// 3. Any other numeric value, treated as tree depth and bucketed by
    ///    [`Tier::from_depth`].
    /// 4. Default [`Tier::Novice`].
    ///
    /// The generator sometimes supplies only structural depth instead of a
    /// semantic skill tier; this precedence keeps the budget math stable
    /// across both shapes of input.
    pub fn resolve(label: Option<&str>, numeric: Option<u32>) -> Self {
        if let Some(label) = label
            && let Some(tier) = Self::from_label(label)
        {
            return tier;
        }
        if let Some(value) = numeric {
            if let Some(tier) = Self::from_index(value) {
                return tier;
            }
            return Self::from_depth(value);
        }
        Self::Novice
    }

    /// Canonical lowercase label for this tier.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Novice => "novice",
            Self::Apprentice => "apprentice",
            Self::Adept => "adept",
            Self::Expert => "expert",
            Self::Master => "master",
        }
    }
}

impl core::fmt::Display for Tier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Settings enums
// ---------------------------------------------------------------------------

/// Policy for splitting the global lock budget across schools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum SchoolDistribution {
    /// Each school receives a share proportional to its spell count.
    Proportional,
    /// Each school receives `floor(total / school_count)`; the remainder
    /// is dropped, not redistributed.
    Even,
    /// The total is distributed by independent uniform draws over schools.
    Random,
}

/// Source population for a node's lock candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PoolSource {
    /// Candidates must belong to the same school as the locked node.
    SameSchool,
    /// Candidates must lie within a layout-distance radius of the node.
    Nearby,
    /// Any node in the tree is a potential candidate.
    Any,
}
