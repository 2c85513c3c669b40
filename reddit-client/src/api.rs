use quotebot_core::{CoreError, Quote, RedditApiError};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

pub const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

// Only the fields a quote is built from are read; Reddit sends many more.
#[derive(Debug, Clone, Deserialize)]
pub struct RedditListing<T> {
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditListingChild<T> {
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub stickied: bool,
}

impl From<&RedditPostData> for Quote {
    fn from(post: &RedditPostData) -> Self {
        Quote::from_post(&post.title, &post.selftext)
    }
}

/// Non-pinned posts of a listing as quotes, in listing order.
pub fn quotes_from_listing(listing: &RedditListing<RedditPostData>) -> Vec<Quote> {
    listing
        .data
        .children
        .iter()
        .map(|child| &child.data)
        .filter(|post| {
            if post.stickied {
                debug!("Skipping stickied post {}", post.id);
            }
            !post.stickied
        })
        .map(Quote::from)
        .collect()
}

/// Maps a non-success status to the matching API error.
pub fn error_for_status(
    status: StatusCode,
    retry_after: Option<&str>,
    endpoint: &str,
) -> RedditApiError {
    match status.as_u16() {
        429 => {
            let retry_after = retry_after
                .and_then(|value| value.trim().parse::<f64>().ok())
                .map(|secs| secs.ceil() as u64)
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            warn!("Rate limited, retry after {} seconds", retry_after);
            RedditApiError::RateLimitExceeded { retry_after }
        }
        401 => RedditApiError::InvalidToken,
        403 => RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        },
        404 => RedditApiError::NotFound {
            resource: endpoint.to_string(),
        },
        code if status.is_server_error() => RedditApiError::ServerError { status_code: code },
        code => RedditApiError::InvalidResponse {
            details: format!("Unexpected status {} for {}", code, endpoint),
        },
    }
}

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    base_url: Url,
    user_agent: String,
}

impl RedditApiClient {
    pub fn new(user_agent: String) -> Result<Self, CoreError> {
        Self::with_base_url(user_agent, REDDIT_API_BASE)
    }

    pub fn with_base_url(user_agent: String, base_url: &str) -> Result<Self, CoreError> {
        let base_url = Url::parse(base_url).map_err(|e| CoreError::Internal {
            message: format!("Invalid Reddit API base URL {}: {}", base_url, e),
        })?;

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            user_agent,
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, CoreError> {
        self.base_url.join(endpoint).map_err(|e| CoreError::Internal {
            message: format!("Invalid Reddit endpoint {}: {}", endpoint, e),
        })
    }

    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: Option<&[(&str, &str)]>,
    ) -> Result<Response, CoreError> {
        let url = self.endpoint_url(endpoint)?;

        let mut request_builder = self
            .http_client
            .request(method.clone(), url)
            .bearer_auth(access_token);

        if let Some(params) = query_params {
            request_builder = request_builder.query(params);
        }

        info!("Making Reddit API request: {} {}", method, endpoint);
        let response = match request_builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for {} {}: {}", method, endpoint, e);
                if e.is_timeout() {
                    return Err(CoreError::RedditApi(RedditApiError::RequestTimeout));
                }
                return Err(CoreError::Network(e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            error!("Request failed with status: {} for {}", status, endpoint);
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|value| value.to_str().ok());
            return Err(CoreError::RedditApi(error_for_status(
                status,
                retry_after,
                endpoint,
            )));
        }

        debug!("Request successful: {} {}", status, endpoint);
        Ok(response)
    }

    pub async fn get_hot_posts(
        &self,
        access_token: &str,
        subreddit: &str,
        limit: u32,
    ) -> Result<RedditListing<RedditPostData>, CoreError> {
        let endpoint = format!("/r/{}/hot", subreddit);
        let limit_str = limit.to_string();
        let params = [("limit", limit_str.as_str()), ("raw_json", "1")];

        let response = self
            .make_request(Method::GET, &endpoint, access_token, Some(&params[..]))
            .await?;

        let listing: RedditListing<RedditPostData> = response.json().await.map_err(|e| {
            error!("Failed to parse subreddit posts: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse posts for r/{}", subreddit),
            })
        })?;

        info!(
            "Retrieved {} posts from r/{}",
            listing.data.children.len(),
            subreddit
        );
        Ok(listing)
    }
}
