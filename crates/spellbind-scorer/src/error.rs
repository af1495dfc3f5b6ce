//! Error types for the `spellbind-scorer` crate.

/// Errors that can occur while scoring or talking to the scorer bridge.
#[derive(Debug, thiserror::Error)]
pub enum ScorerError {
    /// A request or response failed to serialize or deserialize.
    #[error("scorer payload error: {source}")]
    Json {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },

    /// The bridge job channel is full or its receiver is gone.
    #[error("scorer bridge unavailable: {reason}")]
    BridgeUnavailable {
        /// Why the dispatch could not be queued.
        reason: String,
    },
}
