use crate::Forwarder;
use quotebot_core::{CoreError, MessageSink, QuoteSource, RunReport, RunSettings};
use seen_store::SeenStore;
use tracing::info;

/// One run of the relay: load seen-set, fetch, forward.
pub struct RelayService<Q, M> {
    source: Q,
    forwarder: Forwarder<M>,
    settings: RunSettings,
}

impl<Q: QuoteSource, M: MessageSink> RelayService<Q, M> {
    pub fn new(source: Q, sink: M, channel_id: String, settings: RunSettings) -> Self {
        let store = SeenStore::new(settings.store_path.clone());
        let forwarder = Forwarder::new(sink, channel_id, store, settings.save_policy);

        Self {
            source,
            forwarder,
            settings,
        }
    }

    pub async fn run_once(&self) -> Result<RunReport, CoreError> {
        let mut seen = self.forwarder.store().load().await?;

        let quotes = self
            .source
            .fetch_quotes(&self.settings.subreddit, self.settings.limit)
            .await?;

        if quotes.is_empty() {
            info!("No quotes found");
            return Ok(RunReport::default());
        }

        let report = self.forwarder.forward(&quotes, &mut seen).await?;
        info!(
            "Messages sent successfully ({} sent, {} skipped)",
            report.sent, report.skipped
        );
        Ok(report)
    }
}
