//! Score source trait and the local TF-IDF implementation.
//!
//! The engine consumes candidate scores through the [`ScoreSource`] trait
//! so the backend can be this crate's local TF-IDF scorer, the external
//! bridge, or a test stub, without the selection logic knowing which ran.
//! The local scorer is the always-available fallback and the reference
//! semantics: an external backend is only considered correct if it is a
//! drop-in replacement for these numbers.

use spellbind_types::{
    AssignmentRequest, LockSettings, PoolScores, PoolSource, ScorePair, ScoredCandidate,
    SpellText,
};

use crate::error::ScorerError;
use crate::text::tokenize_spell;
use crate::tfidf::{compute_tfidf, cosine_similarity};

/// Decimal places kept on wire-level scores.
const SCORE_DECIMALS: f64 = 10_000.0;

/// A source of candidate scores for assignment batches.
///
/// Implementations rank every pair's candidate pool in descending score
/// order. The engine treats all backends identically downstream.
pub trait ScoreSource {
    /// Score every pair in the request.
    ///
    /// # Errors
    ///
    /// Returns [`ScorerError`] if the backend fails entirely; the caller
    /// falls back to [`LocalScorer`] in that case.
    fn score_batch(&mut self, request: &AssignmentRequest)
    -> Result<Vec<PoolScores>, ScorerError>;
}

/// The local TF-IDF + cosine similarity scorer.
///
/// Builds one corpus per query pool (the spell plus its candidates), so
/// document frequency reflects the pool being ranked rather than the whole
/// tree. Infallible: degenerate text simply scores 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalScorer;

impl LocalScorer {
    /// Create a local scorer.
    pub const fn new() -> Self {
        Self
    }

    /// Score a single (spell, pool) pair.
    ///
    /// Similarity is blended with layout proximity for `nearby` pools,
    /// mirroring the external scorer, so both backends return directly
    /// comparable final scores.
    pub fn score_pair(pair: &ScorePair, settings: &LockSettings) -> PoolScores {
        let mut documents: Vec<Vec<String>> = Vec::with_capacity(
            pair.candidates.len().saturating_add(1),
        );
        documents.push(tokenize_spell(&pair.spell));
        for candidate in &pair.candidates {
            documents.push(tokenize_spell(&SpellText::from(candidate)));
        }

        let vectors = compute_tfidf(&documents);
        let spell_vector = vectors.first().cloned().unwrap_or_default();

        let mut ranked: Vec<ScoredCandidate> = pair
            .candidates
            .iter()
            .zip(vectors.iter().skip(1))
            .map(|(candidate, vector)| {
                let similarity = cosine_similarity(&spell_vector, vector);
                let blended = blend_proximity(similarity, candidate.distance, settings);
                ScoredCandidate {
                    target_id: candidate.node_id.clone(),
                    score: round_score(blended),
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        PoolScores {
            spell_id: pair.spell_id.clone(),
            ranked,
        }
    }
}

impl ScoreSource for LocalScorer {
    fn score_batch(
        &mut self,
        request: &AssignmentRequest,
    ) -> Result<Vec<PoolScores>, ScorerError> {
        Ok(request
            .pairs
            .iter()
            .map(|pair| Self::score_pair(pair, &request.settings))
            .collect())
    }
}

/// Blend a similarity score with layout proximity for `nearby` pools.
///
/// `final = (1 - bias) * similarity + bias * max(0, 1 - dist / max_dist)`.
/// Outside `nearby` mode, or with a zero bias, similarity passes through
/// untouched.
pub fn blend_proximity(similarity: f64, distance: f64, settings: &LockSettings) -> f64 {
    if settings.pool_source != PoolSource::Nearby || settings.proximity_bias <= 0.0 {
        return similarity;
    }
    let proximity = if settings.distance > 0.0 {
        (1.0 - distance / settings.distance).max(0.0)
    } else {
        0.0
    };
    (1.0 - settings.proximity_bias) * similarity + settings.proximity_bias * proximity
}

/// Round a wire score to 4 decimal places.
fn round_score(score: f64) -> f64 {
    (score * SCORE_DECIMALS).round() / SCORE_DECIMALS
}

#[cfg(test)]
mod tests {
    use spellbind_types::{CandidateText, SpellId, SpellText};

    use super::*;

    fn make_pair(candidates: Vec<(&str, &str, f64)>) -> ScorePair {
        ScorePair {
            spell_id: SpellId::from("spell"),
            spell: SpellText {
                name: String::from("Firebolt"),
                desc: String::from("Hurls a bolt of fire that burns the target"),
                effects: vec![String::from("Fire Damage")],
            },
            candidates: candidates
                .into_iter()
                .map(|(id, name, distance)| CandidateText {
                    node_id: SpellId::from(id),
                    name: String::from(name),
                    desc: String::new(),
                    effects: Vec::new(),
                    distance,
                })
                .collect(),
        }
    }

    #[test]
    fn related_candidate_outranks_unrelated() {
        let pair = make_pair(vec![
            ("frost", "Frost Armor", 1.0),
            ("fire", "Fire Storm of Fire Damage", 1.0),
        ]);
        let scores = LocalScorer::score_pair(&pair, &LockSettings::default());
        let first = scores.ranked.first();
        assert_eq!(first.map(|c| c.target_id.clone()), Some(SpellId::from("fire")));
    }

    #[test]
    fn results_sorted_descending() {
        let pair = make_pair(vec![
            ("a", "Unrelated Ward", 1.0),
            ("b", "Firebolt Fire Damage bolt", 1.0),
            ("c", "Minor fire spark", 1.0),
        ]);
        let scores = LocalScorer::score_pair(&pair, &LockSettings::default());
        let values: Vec<f64> = scores.ranked.iter().map(|c| c.score).collect();
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| b.total_cmp(a));
        assert_eq!(values, sorted);
    }

    #[test]
    fn empty_pool_scores_empty() {
        let pair = make_pair(Vec::new());
        let scores = LocalScorer::score_pair(&pair, &LockSettings::default());
        assert!(scores.ranked.is_empty());
    }

    #[test]
    fn degenerate_spell_text_scores_zero() {
        let mut pair = make_pair(vec![("a", "Fire Damage", 1.0)]);
        pair.spell = SpellText {
            name: String::from("ab"),
            desc: String::new(),
            effects: Vec::new(),
        };
        let scores = LocalScorer::score_pair(&pair, &LockSettings::default());
        assert_eq!(scores.ranked.first().map(|c| c.score), Some(0.0));
    }

    #[test]
    fn proximity_blend_only_applies_to_nearby() {
        let settings_same_school = LockSettings::default();
        assert!((blend_proximity(0.8, 0.0, &settings_same_school) - 0.8).abs() < 1e-12);

        let nearby = LockSettings {
            pool_source: PoolSource::Nearby,
            proximity_bias: 0.5,
            distance: 10.0,
            ..LockSettings::default()
        };
        // Candidate at distance 0: proximity term is 1.0.
        let blended = blend_proximity(0.8, 0.0, &nearby);
        assert!((blended - 0.9).abs() < 1e-12, "got {blended}");

        // Candidate at max distance: proximity term is 0.0.
        let blended = blend_proximity(0.8, 10.0, &nearby);
        assert!((blended - 0.4).abs() < 1e-12, "got {blended}");

        // Beyond max distance the proximity term floors at zero.
        let blended = blend_proximity(0.8, 25.0, &nearby);
        assert!((blended - 0.4).abs() < 1e-12, "got {blended}");
    }

    #[test]
    fn batch_scores_every_pair() {
        let request = AssignmentRequest {
            pairs: vec![
                make_pair(vec![("a", "Fire Damage", 1.0)]),
                make_pair(vec![("b", "Frost Ward", 1.0)]),
            ],
            settings: LockSettings::default(),
        };
        let mut scorer = LocalScorer::new();
        let scores = scorer.score_batch(&request).unwrap_or_default();
        assert_eq!(scores.len(), 2);
    }
}
