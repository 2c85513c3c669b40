use async_trait::async_trait;

use crate::{CoreError, Quote};

/// Where quotes come from.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch up to `limit` top-ranked, non-pinned posts of `category` as quotes,
    /// in the source's ranking order.
    async fn fetch_quotes(&self, category: &str, limit: u32) -> Result<Vec<Quote>, CoreError>;
}

/// Where quotes are forwarded to.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<(), CoreError>;
}
