//! Application-only OAuth2 for Reddit.
//!
//! Reading public listings does not need a user login: the app exchanges its
//! client id and secret for a bearer token (client-credentials grant).

use oauth2::basic::BasicClient;
use oauth2::{
    AuthType, AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, RequestTokenError,
    TokenResponse, TokenUrl,
};
use quotebot_core::{CoreError, RedditApiError};
use std::fmt;
use std::time::{Duration, SystemTime};
use tracing::{debug, error, info};

pub const REDDIT_AUTH_URL: &str = "https://www.reddit.com/api/v1/authorize";
pub const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

// Used when the token response omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);
// Treat a token as expired slightly early so it cannot lapse mid-request.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);
const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct RedditOAuth2Config {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl RedditOAuth2Config {
    pub fn new(client_id: String, client_secret: String, user_agent: String) -> Self {
        Self {
            client_id,
            client_secret,
            user_agent,
        }
    }
}

impl fmt::Debug for RedditOAuth2Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditOAuth2Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: SystemTime,
    pub scope: Vec<String>,
}

impl RedditToken {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() + EXPIRY_MARGIN >= self.expires_at
    }
}

#[derive(Debug)]
pub struct RedditAuthenticator {
    oauth_client: BasicClient,
    user_agent: String,
}

impl RedditAuthenticator {
    pub fn new(config: &RedditOAuth2Config) -> Result<Self, CoreError> {
        Self::with_token_url(config, REDDIT_TOKEN_URL)
    }

    pub fn with_token_url(config: &RedditOAuth2Config, token_url: &str) -> Result<Self, CoreError> {
        let auth_url = AuthUrl::new(REDDIT_AUTH_URL.to_string()).map_err(|e| {
            CoreError::Internal {
                message: format!("Invalid auth URL: {}", e),
            }
        })?;
        let token_url = TokenUrl::new(token_url.to_string()).map_err(|e| {
            CoreError::Internal {
                message: format!("Invalid token URL: {}", e),
            }
        })?;

        let oauth_client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            auth_url,
            Some(token_url),
        )
        .set_auth_type(AuthType::BasicAuth);

        Ok(Self {
            oauth_client,
            user_agent: config.user_agent.clone(),
        })
    }

    pub async fn request_token(&self) -> Result<RedditToken, CoreError> {
        info!("Requesting Reddit application token");
        let user_agent = self.user_agent.clone();

        let response = self
            .oauth_client
            .exchange_client_credentials()
            .request_async(|request| token_http_client(user_agent, request))
            .await
            .map_err(|e| match e {
                RequestTokenError::ServerResponse(response) => {
                    error!("Reddit rejected client credentials: {}", response.error());
                    CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                        reason: response.error().to_string(),
                    })
                }
                RequestTokenError::Request(e) => {
                    error!("Token request failed: {}", e);
                    if e.is_timeout() {
                        CoreError::RedditApi(RedditApiError::RequestTimeout)
                    } else {
                        CoreError::Network(e)
                    }
                }
                RequestTokenError::Parse(e, body) => {
                    error!("Unexpected token response: {}", e);
                    CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                        reason: String::from_utf8_lossy(&body).into_owned(),
                    })
                }
                RequestTokenError::Other(reason) => {
                    error!("Token request failed: {}", reason);
                    CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason })
                }
            })?;

        let lifetime = response.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME);
        let scope = response
            .scopes()
            .map(|scopes| scopes.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default();

        debug!("Reddit token valid for {:?}", lifetime);
        Ok(RedditToken {
            access_token: response.access_token().secret().clone(),
            expires_at: SystemTime::now() + lifetime,
            scope,
        })
    }
}

/// Sends the token request with the app's user agent; Reddit throttles requests
/// that arrive with a generic one.
async fn token_http_client(
    user_agent: String,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(TOKEN_REQUEST_TIMEOUT)
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    let response = client
        .request(request.method, request.url.as_str())
        .headers(request.headers)
        .body(request.body)
        .send()
        .await?;

    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}
