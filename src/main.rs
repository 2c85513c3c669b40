use forwarder::RelayService;
use quotebot_core::{CoreError, Credentials, ErrorReporter, RunSettings};
use reddit_client::RedditClient;
use telegram_client::TelegramClient;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "quotebot=info,forwarder=info,reddit_client=info,telegram_client=info,seen_store=info";

#[tokio::main]
async fn main() -> Result<(), CoreError> {
    // A missing .env is fine; the variables may come from the real environment.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    match dotenv {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
    }

    tracing::info!("Starting quotebot run");

    run().await.map_err(|e| {
        ErrorReporter::new().report_error(&e);
        e
    })
}

async fn run() -> Result<(), CoreError> {
    let credentials = Credentials::from_env();
    let missing = credentials.missing();
    if !missing.is_empty() {
        tracing::warn!("Unset credentials: {}", missing.join(", "));
    }

    let settings = RunSettings::load()?;
    tracing::debug!("Run settings: {:?}", settings);

    let reddit = RedditClient::from_credentials(&credentials)?;
    let telegram = TelegramClient::from_credentials(&credentials)?;

    let service = RelayService::new(
        reddit,
        telegram,
        credentials.telegram_channel_id.clone(),
        settings,
    );

    let report = service.run_once().await?;
    tracing::info!(
        "Run finished: {} fetched, {} sent, {} skipped",
        report.fetched,
        report.sent,
        report.skipped
    );
    Ok(())
}
