//! Lock budget allocation across schools and tiers.
//!
//! The global budget is a percentage of the non-root population. It is
//! split across schools by the configured distribution policy, then within
//! each school across the five tiers by the per-tier percentages. Tier
//! allocations are clamped so a school never exceeds its budget; rounding
//! shortfalls are topped up from the school's remaining spells, and a tier
//! pass that lands on zero falls back to a school-wide sample.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;
use spellbind_graph::SkillGraph;
use spellbind_types::{LockSettings, SchoolDistribution, SpellId, Tier};
use tracing::debug;

/// Round a fractional allocation to a whole count, never below zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_count(value: f64) -> usize {
    if value <= 0.0 {
        0
    } else {
        value.round() as usize
    }
}

/// The global lock budget: `round(non_root_count * percent / 100)`.
#[allow(clippy::cast_precision_loss)]
pub fn total_lock_budget(graph: &SkillGraph, settings: &LockSettings) -> usize {
    let eligible = graph.non_root_count();
    round_count(eligible as f64 * settings.global_lock_percent / 100.0)
}

/// Split the global budget across schools by the configured policy.
///
/// `even` gives each school `floor(total / school_count)` and drops the
/// remainder -- intentionally not redistributed, the `proportional` and
/// `random` policies exist for that. `proportional` rounds per school and
/// may land slightly off `total`. `random` draws `total` schools uniformly
/// with replacement.
#[allow(clippy::cast_precision_loss)]
pub fn school_budgets(
    graph: &SkillGraph,
    settings: &LockSettings,
    total: usize,
    rng: &mut impl Rng,
) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for node in graph.nodes() {
        if !node.is_root {
            let count = counts.entry(node.school.clone()).or_insert(0);
            *count = count.saturating_add(1);
        }
    }
    if counts.is_empty() || total == 0 {
        return BTreeMap::new();
    }

    let total_spells: usize = counts.values().sum();
    let school_count = counts.len();

    match settings.school_distribution {
        SchoolDistribution::Even => {
            let share = total.checked_div(school_count).unwrap_or(0);
            counts.keys().map(|school| (school.clone(), share)).collect()
        }
        SchoolDistribution::Proportional => counts
            .iter()
            .map(|(school, &spells)| {
                let share = round_count(
                    total as f64 * spells as f64 / (total_spells.max(1)) as f64,
                );
                (school.clone(), share)
            })
            .collect(),
        SchoolDistribution::Random => {
            let schools: Vec<&String> = counts.keys().collect();
            let mut budgets: BTreeMap<String, usize> = BTreeMap::new();
            for _ in 0..total {
                let index = rng.random_range(0..schools.len());
                if let Some(school) = schools.get(index) {
                    let count = budgets.entry((*school).clone()).or_insert(0);
                    *count = count.saturating_add(1);
                }
            }
            budgets
        }
    }
}

/// Take a uniform random sample of `count` IDs from `pool`.
///
/// Fisher-Yates via `SliceRandom::shuffle`, then truncate. Returns the
/// whole pool when `count` exceeds it.
pub fn sample_ids(pool: &[SpellId], count: usize, rng: &mut impl Rng) -> Vec<SpellId> {
    let mut shuffled: Vec<SpellId> = pool.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(count);
    shuffled
}

/// Pick the lock recipients for one school.
///
/// The tier pass allocates `round(tier_count * tier_percent / 100)` per
/// tier, clamped so the running sum never exceeds `budget`. If the tier
/// pass selects nobody while the budget is positive, the whole budget is
/// filled by a school-wide uniform sample instead; a partial shortfall is
/// topped up from the spells not yet picked.
#[allow(clippy::cast_precision_loss)]
pub fn select_school_recipients(
    graph: &SkillGraph,
    school: &str,
    budget: usize,
    settings: &LockSettings,
    rng: &mut impl Rng,
) -> Vec<SpellId> {
    if budget == 0 {
        return Vec::new();
    }

    let members: Vec<SpellId> = graph
        .school_members(school)
        .iter()
        .filter(|n| !n.is_root)
        .map(|n| n.id.clone())
        .collect();
    if members.is_empty() {
        return Vec::new();
    }

    let mut by_tier: BTreeMap<usize, Vec<SpellId>> = BTreeMap::new();
    for node in graph.school_members(school) {
        if !node.is_root {
            by_tier
                .entry(node.tier().index())
                .or_default()
                .push(node.id.clone());
        }
    }

    let mut picked: Vec<SpellId> = Vec::new();
    let mut remaining = budget;

    for tier in Tier::ALL {
        if remaining == 0 {
            break;
        }
        let Some(tier_nodes) = by_tier.get(&tier.index()) else {
            continue;
        };
        let percent = settings
            .tier_percents
            .get(tier.index())
            .copied()
            .unwrap_or(0.0);
        let allocation = round_count(tier_nodes.len() as f64 * percent / 100.0).min(remaining);
        if allocation == 0 {
            continue;
        }
        let chosen = sample_ids(tier_nodes, allocation, rng);
        remaining = remaining.saturating_sub(chosen.len());
        picked.extend(chosen);
    }

    if picked.is_empty() {
        // The tier percentages selected nothing for a school that holds
        // budget; ignore tiers and sample the school at large.
        debug!(school, budget, "tier allocation empty; sampling school-wide");
        return sample_ids(&members, budget, rng);
    }

    if remaining > 0 {
        let leftover: Vec<SpellId> = members
            .iter()
            .filter(|id| !picked.contains(id))
            .cloned()
            .collect();
        picked.extend(sample_ids(&leftover, remaining, rng));
    }

    picked
}

/// Pick every lock recipient for the tree under the given settings.
pub fn select_recipients(
    graph: &SkillGraph,
    settings: &LockSettings,
    rng: &mut impl Rng,
) -> Vec<SpellId> {
    let total = total_lock_budget(graph, settings);
    if total == 0 {
        return Vec::new();
    }
    let budgets = school_budgets(graph, settings, total, rng);

    let mut recipients = Vec::new();
    for (school, budget) in budgets {
        recipients.extend(select_school_recipients(graph, &school, budget, settings, rng));
    }
    recipients
}
