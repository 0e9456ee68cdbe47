//! Analytics repository — persists classifier output per ticket.

use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;

use super::ports::AnalyticsRepositoryPort;
use crate::domain::{Analysis, Language, Sentiment, TicketType};
use crate::error::RouterError;

pub struct PgAnalyticsRepository {
    pool: Pool,
}

impl PgAnalyticsRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn save(&self, analysis: &Analysis) -> Result<Analysis, RouterError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "INSERT INTO ticket_analytics (ticket_id, ticket_type, sentiment, priority_score, \
                 language, summary, llm_model) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
                &[
                    &analysis.ticket_id,
                    &analysis.ticket_type.as_str(),
                    &analysis.sentiment.as_str(),
                    &analysis.priority_score,
                    &analysis.language.as_str(),
                    &analysis.summary,
                    &analysis.model_tag,
                ],
            )
            .await?;
        Ok(Analysis { id: Some(row.get(0)), ..analysis.clone() })
    }

    pub async fn get_by_ticket(&self, ticket_id: i32) -> Result<Option<Analysis>, RouterError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, ticket_id, ticket_type, sentiment, priority_score, language, summary, llm_model \
                 FROM ticket_analytics WHERE ticket_id = $1",
                &[&ticket_id],
            )
            .await?;
        Ok(row.as_ref().map(row_to_analysis))
    }

    pub async fn get_all(&self) -> Result<Vec<Analysis>, RouterError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, ticket_id, ticket_type, sentiment, priority_score, language, summary, llm_model \
                 FROM ticket_analytics ORDER BY id",
                &[],
            )
            .await?;
        Ok(rows.iter().map(row_to_analysis).collect())
    }
}

#[async_trait]
impl AnalyticsRepositoryPort for PgAnalyticsRepository {
    async fn save(&self, analysis: &Analysis) -> Result<Analysis, RouterError> {
        PgAnalyticsRepository::save(self, analysis).await
    }

    async fn get_by_ticket(&self, ticket_id: i32) -> Result<Option<Analysis>, RouterError> {
        PgAnalyticsRepository::get_by_ticket(self, ticket_id).await
    }

    async fn get_all(&self) -> Result<Vec<Analysis>, RouterError> {
        PgAnalyticsRepository::get_all(self).await
    }
}

fn row_to_analysis(row: &Row) -> Analysis {
    Analysis {
        id: Some(row.get(0)),
        ticket_id: row.get(1),
        ticket_type: TicketType::from_str_loose(row.get::<_, &str>(2)).unwrap_or(TicketType::Consultation),
        sentiment: match row.get::<_, &str>(3) {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        },
        priority_score: row.get(4),
        language: Language::from_str_loose(row.get::<_, &str>(5)).unwrap_or(Language::RU),
        summary: row.get(6),
        model_tag: row.get::<_, Option<String>>(7).unwrap_or_default(),
    }
}
