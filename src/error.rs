//! Error types for the quest step engine

use thiserror::Error;

/// Result type used across the crate
pub type Result<T> = std::result::Result<T, QuestEngineError>;

/// Errors raised by the engine
///
/// Rendering-facing queries never surface these; they are returned by the
/// strict variants (`call`, `try_resolve`, config loading) and logged and
/// replaced with defaults everywhere else.
#[derive(Debug, Error)]
pub enum QuestEngineError {
    /// The privileged thread did not answer within the configured timeout
    #[error("client thread did not respond within {0} ms")]
    BridgeTimeout(u64),

    /// The privileged thread has stopped or dropped the request
    #[error("client thread is not running")]
    BridgeDisconnected,

    /// A blocking query was issued from the privileged thread itself
    #[error("blocking query issued from the client thread")]
    ReentrantCall,

    /// The query panicked while running on the privileged thread
    #[error("query panicked on the client thread: {0}")]
    QueryPanicked(String),

    /// Conditional steps nested deeper than the allowed limit
    #[error("step '{step}' exceeded the maximum resolution depth of {depth}")]
    ResolutionDepthExceeded { step: String, depth: usize },

    /// A quest id that was never registered
    #[error("unknown quest: {0}")]
    UnknownQuest(String),

    /// An operation that needs an active quest was called without one
    #[error("no active quest")]
    NoActiveQuest,

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}
