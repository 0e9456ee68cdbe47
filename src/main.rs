use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use ticket_router::classifier::{Classifier, HeuristicClassifier, LlmClassifier};
use ticket_router::db;
use ticket_router::geocoder::{Geocoder, GoogleGeocoder, NominatimGeocoder};
use ticket_router::{batch, Config, TicketPipeline};

#[derive(Debug, Parser)]
#[command(name = "ticket-router", version, about = "Off-hours customer-ticket routing engine")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending database migrations and exit.
    Migrate,
    /// Process every unprocessed ticket once, then exit.
    Run,
    /// Resolve a location for every office that doesn't have one yet.
    ReconcileOffices,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "ticket_router=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let pool = db::build_pool(&cli.config.database_url).context("failed to build database pool")?;

    match cli.command {
        Command::Migrate => {
            db::run_migrations(&pool).await.context("migration failed")?;
            info!("migrations applied");
        }
        Command::Run => {
            let pipeline = build_pipeline(&cli.config, pool);
            let results = batch::process_unprocessed_tickets(&pipeline, cli.config.max_concurrent_tickets)
                .await
                .context("batch processing failed")?;
            let failures = results.iter().filter(|r| r.error.is_some()).count();
            if failures > 0 {
                warn!(processed = results.len(), failures, "run complete with per-ticket failures");
            } else {
                info!(processed = results.len(), "run complete");
            }
        }
        Command::ReconcileOffices => {
            let pipeline = build_pipeline(&cli.config, pool);
            let resolved = batch::reconcile_office_geocodes(&pipeline).await.context("office reconciliation failed")?;
            info!(resolved, "office reconciliation complete");
        }
    }

    Ok(())
}

fn build_pipeline(config: &Config, pool: deadpool_postgres::Pool) -> TicketPipeline {
    let timeout = Duration::from_secs(config.http_timeout_secs);

    let classifier: Arc<dyn Classifier> = if config.has_llm_provider() {
        Arc::new(LlmClassifier::new(
            config.classifier_base_url.clone(),
            config.classifier_api_key.clone(),
            config.classifier_model.clone(),
            config.classifier_max_retries,
            timeout,
            config.data_directory.clone(),
        ))
    } else {
        Arc::new(HeuristicClassifier)
    };

    let geocoder: Arc<dyn Geocoder> = if config.has_google_geocoder() {
        Arc::new(GoogleGeocoder::new(config.google_maps_api_key.clone(), config.domestic_country_code.clone(), timeout))
    } else {
        Arc::new(NominatimGeocoder::new(config.geocoder_user_agent.clone(), config.domestic_country_code.clone(), timeout))
    };

    TicketPipeline::new(
        classifier,
        geocoder,
        Arc::new(db::PgTicketRepository::new(pool.clone())),
        Arc::new(db::PgManagerRepository::new(pool.clone())),
        Arc::new(db::PgOfficeRepository::new(pool.clone())),
        Arc::new(db::PgAssignmentRepository::new(pool.clone())),
        Arc::new(db::PgAnalyticsRepository::new(pool.clone())),
        Arc::new(db::PgRoundRobinRepository::new(pool)),
        config.domestic_country_name.clone(),
        config.hub_office_a.clone(),
        config.hub_office_b.clone(),
        config.allow_sorted_fallback,
    )
}
