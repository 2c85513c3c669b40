pub mod service;


pub use service::RelayService;

use quotebot_core::{CoreError, MessageSink, Quote, RunReport, SavePolicy, SeenSet};
use seen_store::SeenStore;
use tracing::{debug, info};

/// Sends quotes that are not in the seen-set and records them there.
#[derive(Debug)]
pub struct Forwarder<M> {
    sink: M,
    channel_id: String,
    store: SeenStore,
    policy: SavePolicy,
}

impl<M: MessageSink> Forwarder<M> {
    pub fn new(sink: M, channel_id: String, store: SeenStore, policy: SavePolicy) -> Self {
        Self {
            sink,
            channel_id,
            store,
            policy,
        }
    }

    pub fn store(&self) -> &SeenStore {
        &self.store
    }

    /// Forwards `quotes` in order. The first failed send aborts the batch; what
    /// reaches disk by then depends on the save policy.
    pub async fn forward(
        &self,
        quotes: &[Quote],
        seen: &mut SeenSet,
    ) -> Result<RunReport, CoreError> {
        let mut report = RunReport {
            fetched: quotes.len(),
            ..RunReport::default()
        };

        for quote in quotes {
            if seen.contains(quote) {
                info!("Skipped as duplicate: {}", quote);
                report.skipped += 1;
                continue;
            }

            self.sink
                .send_message(&self.channel_id, quote.as_str())
                .await?;
            seen.insert(quote.clone());
            report.sent += 1;
            info!("Sent: {}", quote);

            if self.policy == SavePolicy::AfterEachSend {
                self.store.save(seen).await?;
                report.saved = true;
            }
        }

        if self.policy == SavePolicy::AfterBatch {
            self.store.save(seen).await?;
            report.saved = true;
        }

        debug!(
            "Batch done: {} sent, {} skipped, saved: {}",
            report.sent, report.skipped, report.saved
        );
        Ok(report)
    }
}
