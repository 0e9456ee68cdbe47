//! Application configuration, loaded from environment variables (with
//! `.env` support via `dotenvy`), mirroring the field-by-field layout
//! spec.md §6 requires.

use clap::Parser;

#[derive(Debug, Clone, Parser)]
pub struct Config {
    /// PostgreSQL connection string.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// API key for the classifier's LLM provider. Absent or empty means
    /// the rule-based fallback classifier is used for every ticket.
    #[arg(long, env = "CLASSIFIER_API_KEY", default_value = "")]
    pub classifier_api_key: String,

    /// Chat-completions model name for the classifier.
    #[arg(long, env = "CLASSIFIER_MODEL", default_value = "gpt-4o-mini")]
    pub classifier_model: String,

    /// Base URL of the classifier's OpenAI-compatible endpoint.
    #[arg(long, env = "CLASSIFIER_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub classifier_base_url: String,

    /// User-Agent header sent with every geocoder request (Nominatim
    /// requires a descriptive one).
    #[arg(long, env = "GEOCODER_USER_AGENT", default_value = "ticket-router")]
    pub geocoder_user_agent: String,

    /// Optional Google Geocoding API key; when present, the Google
    /// adapter is used instead of Nominatim.
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", default_value = "")]
    pub google_maps_api_key: String,

    /// Name of the company's operating country, used both for
    /// `Ticket::is_domestic` and the geocoder's `countrycodes` scoping.
    #[arg(long, env = "DOMESTIC_COUNTRY_NAME", default_value = "Kazakhstan")]
    pub domestic_country_name: String,

    /// ISO country code passed to the geocoder provider.
    #[arg(long, env = "DOMESTIC_COUNTRY_CODE", default_value = "kz")]
    pub domestic_country_code: String,

    /// Directory holding attachment files (e.g. `images/<file>`) that may
    /// be inlined as base64 data URIs in the classifier prompt.
    #[arg(long, env = "DATA_DIRECTORY", default_value = "data")]
    pub data_directory: String,

    /// Substring identifying the first hub office for the 50/50 fallback.
    #[arg(long, env = "HUB_OFFICE_A", default_value = "Astana-hub")]
    pub hub_office_a: String,

    /// Substring identifying the second hub office for the 50/50 fallback.
    #[arg(long, env = "HUB_OFFICE_B", default_value = "Almaty-hub")]
    pub hub_office_b: String,

    /// Whether to degrade to a sorted-by-id fallback when neither hub is
    /// configured, instead of raising `HubOfficesNotFound`. Defaults to
    /// `false` since a missing hub pair is almost always a configuration
    /// bug, not an expected runtime condition.
    #[arg(long, env = "ALLOW_SORTED_FALLBACK", default_value_t = false)]
    pub allow_sorted_fallback: bool,

    /// Maximum concurrent ticket pipelines when running the batch driver.
    #[arg(long, env = "MAX_CONCURRENT_TICKETS", default_value_t = 4)]
    pub max_concurrent_tickets: usize,

    /// Per-attempt timeout for classifier/geocoder HTTP calls, in seconds.
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 10)]
    pub http_timeout_secs: u64,

    /// Max classifier retries on parse failure, missing field, or
    /// transport error before degrading to the heuristic fallback.
    #[arg(long, env = "CLASSIFIER_MAX_RETRIES", default_value_t = 3)]
    pub classifier_max_retries: u32,
}

impl Config {
    pub fn has_llm_provider(&self) -> bool {
        !self.classifier_api_key.trim().is_empty()
    }

    pub fn has_google_geocoder(&self) -> bool {
        !self.google_maps_api_key.trim().is_empty()
    }
}
