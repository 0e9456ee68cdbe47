//! LLM-backed classifier: an OpenAI-compatible chat-completions call with
//! bounded retries, degrading to the rule-based fallback on exhaustion.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Value};
use tracing::warn;

use super::heuristic::{heuristic_classify, looks_like_spam, post_adjust};
use super::Classifier;
use crate::domain::{Analysis, Language, Sentiment, TicketType};

const SYSTEM_PROMPT: &str = r#"You are an expert ticket classifier for a financial services company.

Analyze the customer ticket and return a JSON object with exactly these fields:

{
  "ticket_type": one of ["complaint", "data_change", "consultation", "claim", "app_malfunction", "fraud", "spam"],
  "sentiment": one of ["positive", "neutral", "negative"],
  "priority_score": integer 1-10 (10 = most urgent),
  "language": one of ["RU", "KZ", "ENG"],
  "summary": a concise 1-2 sentence summary in the same language as the ticket, ending with a concrete recommended action for the manager
}

Priority guidance: fraud/security → 9-10; blocked accounts / urgent access issues → 8-10;
complaints → 7-8; app issues → 6-7; data changes → 5-6; consultations → 3-4; spam → 1.
Return ONLY valid JSON, no markdown or extra text."#;

pub struct LlmClassifier {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_retries: u32,
    data_directory: String,
}

impl LlmClassifier {
    pub fn new(base_url: String, api_key: String, model: String, max_retries: u32, timeout: Duration, data_directory: String) -> Self {
        let client = reqwest::Client::builder().timeout(timeout).build().expect("reqwest client");
        Self { client, base_url, api_key, model, max_retries, data_directory }
    }

    fn build_user_content(&self, description: &str, attachments: Option<&str>) -> Value {
        let mut text = format!("Ticket text:\n{description}");
        let mut content = vec![json!({"type": "text", "text": &text})];

        let Some(attachments) = attachments else {
            return Value::Array(content);
        };
        text.push_str(&format!("\nAttachments: {attachments}"));
        content[0] = json!({"type": "text", "text": text});

        let image_dir = Path::new(&self.data_directory).join("images");
        if !image_dir.exists() {
            return Value::Array(content);
        }

        for filename in attachments.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            let path = image_dir.join(filename);
            let Ok(bytes) = std::fs::read(&path) else { continue };
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("jpeg").to_lowercase();
            let mime = if ["jpeg", "jpg", "png", "webp", "gif"].contains(&ext.as_str()) {
                format!("image/{ext}")
            } else {
                "image/jpeg".to_string()
            };
            let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
            content.push(json!({
                "type": "image_url",
                "image_url": { "url": format!("data:{mime};base64,{encoded}") },
            }));
        }

        Value::Array(content)
    }

    async fn call_once(&self, description: &str, attachments: Option<&str>) -> Result<Value, String> {
        let user_content = self.build_user_content(description, attachments);

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": SYSTEM_PROMPT},
                    {"role": "user", "content": user_content},
                ],
                "temperature": 0.1,
                "response_format": {"type": "json_object"},
            }))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !resp.status().is_success() {
            return Err(format!("classifier returned status {}", resp.status()));
        }

        let body: Value = resp.json().await.map_err(|e| e.to_string())?;
        let raw = body["choices"][0]["message"]["content"].as_str().ok_or("missing content field")?;
        serde_json::from_str(raw).map_err(|e| e.to_string())
    }

    fn map_to_analysis(&self, parsed: &Value) -> Analysis {
        let ticket_type = parsed["ticket_type"]
            .as_str()
            .and_then(TicketType::from_str_loose)
            .unwrap_or(TicketType::Consultation);
        let sentiment = match parsed["sentiment"].as_str() {
            Some("positive") => Sentiment::Positive,
            Some("negative") => Sentiment::Negative,
            _ => Sentiment::Neutral,
        };
        let language = parsed["language"].as_str().and_then(Language::from_str_loose).unwrap_or(Language::RU);
        let priority_score = parsed["priority_score"].as_i64().unwrap_or(5).clamp(1, 10) as i32;
        let summary = parsed["summary"].as_str().unwrap_or_default().to_string();

        Analysis {
            id: None,
            ticket_id: 0,
            ticket_type,
            sentiment,
            priority_score,
            language,
            summary,
            model_tag: self.model.clone(),
        }
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn analyze(&self, description: &str, attachments: Option<&str>) -> Analysis {
        if looks_like_spam(description) {
            return post_adjust(heuristic_classify(description), description);
        }

        for attempt in 1..=self.max_retries {
            match self.call_once(description, attachments).await {
                Ok(parsed) => return post_adjust(self.map_to_analysis(&parsed), description),
                Err(e) => warn!(attempt, max = self.max_retries, error = %e, "classifier attempt failed"),
            }
        }

        warn!("all classifier attempts exhausted, degrading to heuristic fallback");
        post_adjust(heuristic_classify(description), description)
    }
}
