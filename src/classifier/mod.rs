//! Classifier port (C6): text in, Analysis out. Never fails — transport
//! errors and malformed responses degrade to the rule-based fallback.

mod heuristic;
mod llm;

pub use heuristic::HeuristicClassifier;
pub use llm::LlmClassifier;

use async_trait::async_trait;

use crate::domain::Analysis;

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify a ticket's free-text description (and optional comma
    /// separated attachment filenames) into a fully-populated `Analysis`
    /// with `ticket_id = 0` — the caller fills in the real id.
    async fn analyze(&self, description: &str, attachments: Option<&str>) -> Analysis;
}
