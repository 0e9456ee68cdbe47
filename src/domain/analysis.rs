//! Analysis entity — output of classifying a ticket.

use super::enums::{Language, Sentiment, TicketType};

#[derive(Debug, Clone)]
pub struct Analysis {
    pub id: Option<i32>,
    pub ticket_id: i32,
    pub ticket_type: TicketType,
    pub sentiment: Sentiment,
    pub priority_score: i32,
    pub language: Language,
    pub summary: String,
    pub model_tag: String,
}

impl Analysis {
    /// Clamp priority into the valid [1, 10] range — the classifier must
    /// never emit a value outside the closed enumeration.
    pub fn clamp_priority(&mut self) {
        self.priority_score = self.priority_score.clamp(1, 10);
    }
}
