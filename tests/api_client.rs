mod common;

use common::{message, serve_once, setup_logging};
use yaschat::api::models::{LegacyMessage, Participants};
use yaschat::session::login;
use yaschat::{ApiClient, ApiError, AppState, AuthError, MessagingApi};

fn request_line(request: &str) -> &str {
    request.lines().next().unwrap_or_default()
}

#[tokio::test]
async fn conversations_query_is_encoded_and_null_is_empty() {
    setup_logging();
    let (url, server) = serve_once(200, "null\n").await;
    let client = ApiClient::new(&url).unwrap();

    let convs = client.conversations("alice smith").await.unwrap();
    assert!(convs.is_empty());
    let request = server.await.unwrap();
    assert_eq!(request_line(&request), "GET /api/conversations?name=alice+smith HTTP/1.1");
}

#[tokio::test]
async fn conversations_decode_server_order() {
    let body = r#"[
        {"conversation_id":"bob-zed","participants":["zed","bob"],
         "last_message":{"id":"9","from_name":"zed","to_name":"bob","content":"yo","timestamp":"2024-05-01T09:30:00Z"}},
        {"conversation_id":"alice-bob","participants":["alice","bob"],
         "last_message":{"id":"","from_name":"","to_name":"","content":"","timestamp":""}}
    ]"#;
    let (url, server) = serve_once(200, body).await;
    let client = ApiClient::new(&url).unwrap();

    let convs = client.conversations("bob").await.unwrap();
    server.await.unwrap();
    assert_eq!(convs[0].conversation_id, "bob-zed");
    assert_eq!(convs[0].contact_name("bob"), Some("zed"));
    assert_eq!(convs[0].last_message.content, "yo");
    assert!(convs[1].last_message.is_blank());
}

#[tokio::test]
async fn create_conversation_accepts_status_only_reply() {
    let (url, server) = serve_once(201, "{\"message\": \"Conversation created successfully\"}\n").await;
    let client = ApiClient::new(&url).unwrap();

    let created = client
        .create_conversation(&Participants::new("bob", "alice"))
        .await
        .unwrap();
    assert_eq!(created, None);
    let request = server.await.unwrap();
    assert_eq!(request_line(&request), "POST /api/conversations HTTP/1.1");
    assert!(request.ends_with(r#"{"participants":["alice","bob"]}"#));
}

#[tokio::test]
async fn create_conversation_error_keeps_body() {
    let (url, server) = serve_once(500, "{\"error\": \"Unable to open CSV file\"}").await;
    let client = ApiClient::new(&url).unwrap();

    let err = client
        .create_conversation(&Participants::new("alice", "bob"))
        .await
        .unwrap_err();
    server.await.unwrap();
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
    assert_eq!(err.server_message().as_deref(), Some("Unable to open CSV file"));
}

#[tokio::test]
async fn send_message_posts_to_the_conversation() {
    let (url, server) = serve_once(201, "{\"message\": \"Message created successfully\"}").await;
    let client = ApiClient::new(&url).unwrap();

    let msg = message("1714555800000", "alice", "bob", "hello");
    client.send_message("alice-bob", &msg).await.unwrap();
    let request = server.await.unwrap();
    assert_eq!(request_line(&request), "POST /api/conversations/alice-bob/messages HTTP/1.1");
    assert!(request.contains(r#""from_name":"alice""#));
    assert!(request.contains(r#""to_name":"bob""#));
}

#[tokio::test]
async fn login_rejection_uses_error_text() {
    let dir = tempfile::tempdir().unwrap();
    let (url, server) = serve_once(400, "{\"error\": \"Invalid request payload\"}\n").await;
    let client = ApiClient::new(&url).unwrap();
    let mut state = AppState::load_from(&dir.path().join("yaschat.toml"));

    match login(&client, &mut state, "alice").await {
        Err(AuthError::Rejected(message)) => assert_eq!(message, "Invalid request payload"),
        other => panic!("unexpected {other:?}"),
    }
    let request = server.await.unwrap();
    assert_eq!(request_line(&request), "POST /api/login HTTP/1.1");
    assert!(request.ends_with(r#"{"name":"alice"}"#));
}

#[tokio::test]
async fn legacy_messages_use_flat_endpoint() {
    let body = r#"[{"from":"Alice","to":"Bob","subject":"Hello","content":"Hi Bob!"}]"#;
    let (url, server) = serve_once(200, body).await;
    let client = ApiClient::new(&url).unwrap();

    let messages = client.legacy_messages("Alice", "Bob").await.unwrap();
    let request = server.await.unwrap();
    assert_eq!(request_line(&request), "GET /messages?from=Alice&to=Bob HTTP/1.1");
    assert_eq!(messages[0].subject, "Hello");
}

#[tokio::test]
async fn incomplete_legacy_message_is_not_sent() {
    // No server: a request would fail with a network error.
    let client = ApiClient::new("http://127.0.0.1:9").unwrap();
    let message = LegacyMessage {
        from: "Alice".into(),
        to: "Bob".into(),
        subject: String::new(),
        content: "Hi".into(),
    };
    assert!(!client.legacy_send(&message).await.unwrap());
}

#[tokio::test]
async fn complete_legacy_message_is_posted() {
    let (url, server) = serve_once(201, "{\"message\": \"Message created successfully\"}").await;
    let client = ApiClient::new(&url).unwrap();
    let message = LegacyMessage {
        from: "Alice".into(),
        to: "Bob".into(),
        subject: "Hello".into(),
        content: "Hi Bob!".into(),
    };

    assert!(client.legacy_send(&message).await.unwrap());
    let request = server.await.unwrap();
    assert_eq!(request_line(&request), "POST /message HTTP/1.1");
    assert!(request.ends_with(r#"{"from":"Alice","to":"Bob","subject":"Hello","content":"Hi Bob!"}"#));
}
