pub mod api;
pub mod auth;


pub use api::{quotes_from_listing, RedditApiClient, RedditListing, RedditPostData};
pub use auth::{RedditAuthenticator, RedditOAuth2Config, RedditToken};

use async_trait::async_trait;
use quotebot_core::{CoreError, Credentials, Quote, QuoteSource};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Reddit as a quote source: app-only auth plus the `hot` listing.
#[derive(Debug)]
pub struct RedditClient {
    config: RedditOAuth2Config,
    api: RedditApiClient,
    authenticator: RedditAuthenticator,
    token: Mutex<Option<RedditToken>>,
}

impl RedditClient {
    pub fn new(config: RedditOAuth2Config) -> Result<Self, CoreError> {
        Self::with_urls(config, api::REDDIT_API_BASE, auth::REDDIT_TOKEN_URL)
    }

    /// Client against other API and token endpoints, such as a local test server.
    pub fn with_urls(
        config: RedditOAuth2Config,
        api_base: &str,
        token_url: &str,
    ) -> Result<Self, CoreError> {
        let api = RedditApiClient::with_base_url(config.user_agent.clone(), api_base)?;
        let authenticator = RedditAuthenticator::with_token_url(&config, token_url)?;

        Ok(Self {
            config,
            api,
            authenticator,
            token: Mutex::new(None),
        })
    }

    pub fn from_credentials(credentials: &Credentials) -> Result<Self, CoreError> {
        Self::new(RedditOAuth2Config::new(
            credentials.reddit_client_id.clone(),
            credentials.reddit_client_secret.clone(),
            credentials.reddit_user_agent.clone(),
        ))
    }

    pub fn config(&self) -> &RedditOAuth2Config {
        &self.config
    }

    pub async fn set_token(&self, token: RedditToken) {
        *self.token.lock().await = Some(token);
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token
            .lock()
            .await
            .as_ref()
            .map(|token| !token.is_expired())
            .unwrap_or(false)
    }

    /// Returns a valid access token, requesting a new one when none is cached
    /// or the cached one expired.
    pub async fn ensure_authenticated(&self) -> Result<String, CoreError> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
            debug!("Cached Reddit token expired");
        }

        let token = self.authenticator.request_token().await?;
        let access_token = token.access_token.clone();
        *guard = Some(token);
        Ok(access_token)
    }

    pub async fn fetch_posts(
        &self,
        subreddit: &str,
        limit: u32,
    ) -> Result<RedditListing<RedditPostData>, CoreError> {
        let access_token = self.ensure_authenticated().await?;
        self.api.get_hot_posts(&access_token, subreddit, limit).await
    }
}

#[async_trait]
impl QuoteSource for RedditClient {
    async fn fetch_quotes(&self, category: &str, limit: u32) -> Result<Vec<Quote>, CoreError> {
        let listing = self.fetch_posts(category, limit).await?;
        let quotes = quotes_from_listing(&listing);
        info!(
            "Fetched {} quotes from r/{} ({} posts listed)",
            quotes.len(),
            category,
            listing.data.children.len()
        );
        Ok(quotes)
    }
}
