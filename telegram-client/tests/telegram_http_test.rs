use mockito::Matcher;
use quotebot_core::{CoreError, MessageSink, TelegramApiError};
use serde_json::json;
use telegram_client::TelegramClient;

const BOT_TOKEN: &str = "123456:TEST-TOKEN";

fn send_path() -> String {
    format!("/bot{}/sendMessage", BOT_TOKEN)
}

#[tokio::test]
async fn test_send_message_with_mock() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", send_path().as_str())
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "chat_id": "@dailyquotes",
            "text": "Be one.\n\nMarcus Aurelius"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "ok": true,
                "result": {
                    "message_id": 1,
                    "date": 1700000000,
                    "chat": {"id": -1001234567890, "type": "channel", "title": "Daily Quotes"},
                    "text": "Be one.\n\nMarcus Aurelius"
                }
            }"#,
        )
        .create_async()
        .await;

    let client = TelegramClient::with_base_url(BOT_TOKEN.to_string(), &server.url()).unwrap();
    let message = client
        .send_message("@dailyquotes", "Be one.\n\nMarcus Aurelius")
        .await
        .unwrap();

    assert_eq!(message.message_id, 1);
    assert_eq!(message.chat.id, -1001234567890);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_message_sink_delivers() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", send_path().as_str())
        .with_status(200)
        .with_body(r#"{"ok": true, "result": {"message_id": 9, "chat": {"id": -100}}}"#)
        .expect(1)
        .create_async()
        .await;

    let client = TelegramClient::with_base_url(BOT_TOKEN.to_string(), &server.url()).unwrap();
    let sink: &dyn MessageSink = &client;
    sink.send_message("@dailyquotes", "Q1\n\n").await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_bad_request_carries_description() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", send_path().as_str())
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok": false, "error_code": 400, "description": "Bad Request: chat not found"}"#)
        .create_async()
        .await;

    let client = TelegramClient::with_base_url(BOT_TOKEN.to_string(), &server.url()).unwrap();
    let result = client.send_message("@missing", "text").await;

    match result {
        Err(CoreError::TelegramApi(TelegramApiError::BadRequest { description })) => {
            assert_eq!(description, "Bad Request: chat not found")
        }
        other => panic!("Expected BadRequest, got {:?}", other),
    }
}

#[tokio::test]
async fn test_flood_control_reads_retry_after() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", send_path().as_str())
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"ok": false, "error_code": 429, "description": "Too Many Requests: retry after 3", "parameters": {"retry_after": 3}}"#,
        )
        .create_async()
        .await;

    let client = TelegramClient::with_base_url(BOT_TOKEN.to_string(), &server.url()).unwrap();
    let result = client.send_message("@dailyquotes", "text").await;

    assert!(matches!(
        result,
        Err(CoreError::TelegramApi(TelegramApiError::RateLimitExceeded { retry_after: 3 }))
    ));
}

#[tokio::test]
async fn test_network_error_hides_token() {
    // Nothing listens on port 1.
    let client = TelegramClient::with_base_url(BOT_TOKEN.to_string(), "http://127.0.0.1:1").unwrap();
    let result = client.send_message("@dailyquotes", "text").await;

    match result {
        Err(e @ CoreError::Network(_)) => assert!(!e.to_string().contains("TEST-TOKEN")),
        other => panic!("Expected a network error, got {:?}", other),
    }
}
