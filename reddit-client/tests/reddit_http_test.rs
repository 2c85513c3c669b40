use mockito::Matcher;
use quotebot_core::{CoreError, Quote, QuoteSource, RedditApiError};
use reddit_client::{quotes_from_listing, RedditApiClient, RedditClient, RedditOAuth2Config};

const USER_AGENT: &str = "quotebot-test/1.0";

const HOT_LISTING: &str = r#"{
    "kind": "Listing",
    "data": {
        "after": null,
        "dist": 3,
        "children": [
            {"kind": "t3", "data": {"id": "p1", "title": "Rules", "selftext": "Read them", "stickied": true}},
            {"kind": "t3", "data": {"id": "p2", "title": "T", "selftext": "B", "stickied": false, "score": 10}},
            {"kind": "t3", "data": {"id": "p3", "title": "No body"}}
        ]
    }
}"#;

const TOKEN_RESPONSE: &str =
    r#"{"access_token": "app-token", "token_type": "bearer", "expires_in": 86400, "scope": "*"}"#;

fn test_config() -> RedditOAuth2Config {
    RedditOAuth2Config::new(
        "client-id".to_string(),
        "client-secret".to_string(),
        USER_AGENT.to_string(),
    )
}

fn hot_query(limit: &str) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("limit".into(), limit.into()),
        Matcher::UrlEncoded("raw_json".into(), "1".into()),
    ])
}

#[tokio::test]
async fn test_get_hot_posts_with_mock() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/r/quotes/hot")
        .match_query(hot_query("5"))
        .match_header("authorization", "Bearer app-token")
        .match_header("user-agent", USER_AGENT)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(HOT_LISTING)
        .create_async()
        .await;

    let client = RedditApiClient::with_base_url(USER_AGENT.to_string(), &server.url()).unwrap();
    let listing = client.get_hot_posts("app-token", "quotes", 5).await.unwrap();

    assert_eq!(listing.data.children.len(), 3);
    assert_eq!(
        quotes_from_listing(&listing),
        vec![Quote::from("T\n\nB"), Quote::from("No body\n\n")]
    );

    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_subreddit_is_not_found() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/r/banned/hot")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"reason": "banned", "message": "Not Found", "error": 404}"#)
        .create_async()
        .await;

    let client = RedditApiClient::with_base_url(USER_AGENT.to_string(), &server.url()).unwrap();
    let result = client.get_hot_posts("app-token", "banned", 5).await;

    match result {
        Err(CoreError::RedditApi(RedditApiError::NotFound { resource })) => {
            assert_eq!(resource, "/r/banned/hot")
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }

    mock.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/r/quotes/hot")
        .match_query(Matcher::Any)
        .with_status(429)
        .with_header("retry-after", "7")
        .create_async()
        .await;

    let client = RedditApiClient::with_base_url(USER_AGENT.to_string(), &server.url()).unwrap();
    let result = client.get_hot_posts("app-token", "quotes", 5).await;

    assert!(matches!(
        result,
        Err(CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: 7 }))
    ));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_unparsable_listing_is_invalid_response() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/r/quotes/hot")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let client = RedditApiClient::with_base_url(USER_AGENT.to_string(), &server.url()).unwrap();
    let result = client.get_hot_posts("app-token", "quotes", 5).await;

    assert!(matches!(
        result,
        Err(CoreError::RedditApi(RedditApiError::InvalidResponse { .. }))
    ));
}

#[tokio::test]
async fn test_fetch_quotes_authenticates_once() {
    let mut server = mockito::Server::new_async().await;

    let token_mock = server
        .mock("POST", "/api/v1/access_token")
        .match_header("authorization", Matcher::Regex("^Basic ".to_string()))
        .match_header("user-agent", USER_AGENT)
        .match_body(Matcher::Regex("grant_type=client_credentials".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(TOKEN_RESPONSE)
        .expect(1)
        .create_async()
        .await;

    let listing_mock = server
        .mock("GET", "/r/quotes/hot")
        .match_query(hot_query("3"))
        .match_header("authorization", "Bearer app-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(HOT_LISTING)
        .expect(2)
        .create_async()
        .await;

    let token_url = format!("{}/api/v1/access_token", server.url());
    let client = RedditClient::with_urls(test_config(), &server.url(), &token_url).unwrap();

    let first = client.fetch_quotes("quotes", 3).await.unwrap();
    assert_eq!(first, vec![Quote::from("T\n\nB"), Quote::from("No body\n\n")]);
    assert!(client.is_authenticated().await);

    let second = client.fetch_quotes("quotes", 3).await.unwrap();
    assert_eq!(second, first);

    token_mock.assert_async().await;
    listing_mock.assert_async().await;
}

#[tokio::test]
async fn test_rejected_credentials_fail_before_listing() {
    let mut server = mockito::Server::new_async().await;

    let token_mock = server
        .mock("POST", "/api/v1/access_token")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "invalid_client"}"#)
        .create_async()
        .await;

    let listing_mock = server
        .mock("GET", "/r/quotes/hot")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let token_url = format!("{}/api/v1/access_token", server.url());
    let client = RedditClient::with_urls(test_config(), &server.url(), &token_url).unwrap();
    let result = client.fetch_quotes("quotes", 5).await;

    assert!(matches!(
        result,
        Err(CoreError::RedditApi(RedditApiError::AuthenticationFailed { .. }))
    ));
    assert!(!client.is_authenticated().await);

    token_mock.assert_async().await;
    listing_mock.assert_async().await;
}
