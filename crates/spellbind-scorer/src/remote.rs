//! Fire-and-forget dispatch to the external scorer.
//!
//! Dispatching never blocks an assignment batch: [`RemoteScorer::dispatch`]
//! serializes the request, queues it on the host's bridge channel, and
//! returns a [`PendingScores`] handle immediately. The host's transport
//! task completes the per-request oneshot whenever the out-of-process
//! scorer answers (or drops it on failure). Because every request owns its
//! own reply channel, overlapping dispatches can never deliver scores to
//! the wrong batch.
//!
//! The consuming end applies two rules from the settings snapshot that was
//! live *at resolution time*: a response arriving after the remote scorer
//! was disabled is discarded without touching the graph, and anything
//! malformed degrades to the local scorer with a single warning line.

use spellbind_types::{AssignmentRequest, PoolScores, RequestId, ScoredCandidate};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::error::ScorerError;
use crate::local::LocalScorer;
use crate::protocol::{BridgeRequest, BridgeResponse, ScoreResponse};

/// One queued bridge job: the serialized request line and the reply slot.
#[derive(Debug)]
pub struct ScoreJob {
    /// The serialized [`BridgeRequest`] envelope, one line of JSON.
    pub payload: String,
    /// Where the transport task delivers the raw response line. Dropping
    /// the sender signals transport failure to the waiting handle.
    pub reply: oneshot::Sender<String>,
}

/// Dispatches scoring requests onto the host's bridge channel.
#[derive(Debug, Clone)]
pub struct RemoteScorer {
    jobs: mpsc::Sender<ScoreJob>,
}

impl RemoteScorer {
    /// Create a scorer that queues jobs on the given channel.
    pub const fn new(jobs: mpsc::Sender<ScoreJob>) -> Self {
        Self { jobs }
    }

    /// Serialize and queue a scoring request, returning immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ScorerError::BridgeUnavailable`] when the job queue is
    /// full or the transport task is gone -- the caller should score
    /// locally instead.
    pub fn dispatch(&self, request: &AssignmentRequest) -> Result<PendingScores, ScorerError> {
        let envelope = BridgeRequest::scoring(request);
        let request_id = envelope.id;
        let payload = serde_json::to_string(&envelope)?;

        let (reply_tx, reply_rx) = oneshot::channel();
        self.jobs
            .try_send(ScoreJob {
                payload,
                reply: reply_tx,
            })
            .map_err(|e| ScorerError::BridgeUnavailable {
                reason: e.to_string(),
            })?;

        debug!(request_id = %request_id, pairs = request.pairs.len(), "scoring request dispatched");
        Ok(PendingScores {
            request_id,
            reply: reply_rx,
        })
    }
}

/// Handle for one in-flight scoring request.
#[derive(Debug)]
pub struct PendingScores {
    request_id: RequestId,
    reply: oneshot::Receiver<String>,
}

/// What became of an in-flight scoring request.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    /// Usable scores, one entry per request pair.
    Scores(Vec<PoolScores>),
    /// The response was discarded because the remote scorer had been
    /// disabled between dispatch and arrival. The graph must not change.
    Discarded,
    /// The response was missing or unusable; score locally instead.
    Fallback,
}

impl PendingScores {
    /// The correlation identifier of this request.
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Await the raw response line from the transport task.
    ///
    /// Returns `None` when the transport dropped the reply channel.
    pub async fn wait(self) -> Option<String> {
        self.reply.await.ok()
    }

    /// Await the response and resolve it against the current settings.
    ///
    /// `enabled` is the *current* value of the remote-scorer toggle, not
    /// the one captured at dispatch: a response that arrives after the
    /// feature was turned off is discarded unapplied.
    pub async fn resolve(self, enabled: bool, request: &AssignmentRequest) -> ScoreOutcome {
        let request_id = self.request_id;
        let raw = self.wait().await;
        if !enabled {
            debug!(request_id = %request_id, "remote scorer disabled; discarding response");
            return ScoreOutcome::Discarded;
        }
        match raw {
            Some(line) => normalize_response(&line, request_id, request),
            None => {
                warn!(request_id = %request_id, "scorer bridge dropped the reply; falling back to local scoring");
                ScoreOutcome::Fallback
            }
        }
    }
}

/// Normalize a raw response line into per-pool scores.
///
/// Accepts either a full [`BridgeResponse`] envelope or a bare
/// [`ScoreResponse`] payload (older bridges sent the payload unwrapped).
/// Pairs the scorer skipped are filled in by the local scorer so the
/// batch stays complete; a response that is malformed, unsuccessful, or
/// addressed to a different request degrades to [`ScoreOutcome::Fallback`].
pub fn normalize_response(
    raw: &str,
    request_id: RequestId,
    request: &AssignmentRequest,
) -> ScoreOutcome {
    let payload = match serde_json::from_str::<BridgeResponse>(raw) {
        Ok(envelope) => {
            if envelope.id != request_id {
                warn!(
                    expected = %request_id,
                    received = %envelope.id,
                    "scorer response for a different request; falling back to local scoring"
                );
                return ScoreOutcome::Fallback;
            }
            if !envelope.success {
                warn!(
                    request_id = %request_id,
                    error = envelope.error.as_deref().unwrap_or("unspecified"),
                    "scorer bridge reported failure; falling back to local scoring"
                );
                return ScoreOutcome::Fallback;
            }
            envelope.result
        }
        // Older bridges send the scoring payload without an envelope.
        Err(_) => serde_json::from_str::<ScoreResponse>(raw).ok(),
    };

    let Some(response) = payload else {
        warn!(request_id = %request_id, "unparseable scorer response; falling back to local scoring");
        return ScoreOutcome::Fallback;
    };
    if !response.success {
        warn!(
            request_id = %request_id,
            error = response.error.as_deref().unwrap_or("unspecified"),
            "scorer reported failure; falling back to local scoring"
        );
        return ScoreOutcome::Fallback;
    }

    let mut by_spell = std::collections::BTreeMap::new();
    for entry in response.scores {
        by_spell.insert(entry.spell_id.clone(), entry);
    }

    let mut pools = Vec::with_capacity(request.pairs.len());
    for pair in &request.pairs {
        if let Some(entry) = by_spell.get(&pair.spell_id) {
            let mut ranked: Vec<ScoredCandidate> = entry
                .top_candidates
                .iter()
                .map(|c| ScoredCandidate {
                    target_id: c.node_id.clone(),
                    score: c.score,
                })
                .collect();
            ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
            pools.push(PoolScores {
                spell_id: pair.spell_id.clone(),
                ranked,
            });
        } else {
            // The scorer skipped this pair; keep the batch complete by
            // scoring it locally.
            debug!(spell_id = %pair.spell_id, "pair missing from scorer response; scoring locally");
            pools.push(LocalScorer::score_pair(pair, &request.settings));
        }
    }

    ScoreOutcome::Scores(pools)
}
