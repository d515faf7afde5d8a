// Shared helpers for the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, Once};

use async_trait::async_trait;
use log::LevelFilter;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use yaschat::api::models::{Conversation, Message, Participants};
use yaschat::{ApiError, AppState, MessagingApi, UserSession};

static INIT_LOGGER: Once = Once::new();

pub fn setup_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .try_init();
    });
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login(String),
    Conversations(String),
    Create(Vec<String>),
    Messages(String),
    Send(String, Message),
}

/// In-memory stand-in for the messaging server that records every call.
#[derive(Default)]
pub struct FakeApi {
    pub calls: Mutex<Vec<Call>>,
    pub conversations: Mutex<Vec<Conversation>>,
    pub messages: Mutex<HashMap<String, Vec<Message>>>,
    pub reject_login: Mutex<Option<String>>,
    pub echo_created: AtomicBool,
    pub offline: AtomicBool,
    pub fail_sends: AtomicBool,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn message_fetches(&self, conversation_id: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Messages(id) if id == conversation_id))
            .count()
    }

    pub fn sends(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::Send(..))).count()
    }

    pub fn with_conversation(self, a: &str, b: &str, history: Vec<Message>) -> Self {
        let conv = Conversation::from_participants(&Participants::new(a, b));
        self.messages
            .lock()
            .unwrap()
            .insert(conv.conversation_id.clone(), history);
        self.conversations.lock().unwrap().push(conv);
        self
    }

    fn record(&self, call: Call) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::Status { status: 503, body: "offline".into() });
        }
        Ok(())
    }
}

#[async_trait]
impl MessagingApi for FakeApi {
    async fn login(&self, name: &str) -> Result<(), ApiError> {
        self.record(Call::Login(name.to_string()))?;
        match self.reject_login.lock().unwrap().clone() {
            Some(message) => Err(ApiError::Status {
                status: 400,
                body: serde_json::json!({ "message": message }).to_string(),
            }),
            None => Ok(()),
        }
    }

    async fn conversations(&self, user_name: &str) -> Result<Vec<Conversation>, ApiError> {
        self.record(Call::Conversations(user_name.to_string()))?;
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.has_participant(user_name))
            .cloned()
            .collect())
    }

    async fn create_conversation(
        &self,
        participants: &Participants,
    ) -> Result<Option<Conversation>, ApiError> {
        self.record(Call::Create(participants.to_vec()))?;
        let conv = Conversation::from_participants(participants);
        self.conversations.lock().unwrap().push(conv.clone());
        if self.echo_created.load(Ordering::SeqCst) {
            Ok(Some(conv))
        } else {
            Ok(None)
        }
    }

    async fn messages(&self, conversation_id: &str) -> Result<Vec<Message>, ApiError> {
        self.record(Call::Messages(conversation_id.to_string()))?;
        Ok(self
            .messages
            .lock()
            .unwrap()
            .get(conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn send_message(&self, conversation_id: &str, message: &Message) -> Result<(), ApiError> {
        self.record(Call::Send(conversation_id.to_string(), message.clone()))?;
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(ApiError::Status { status: 500, body: "disk full".into() });
        }
        self.messages
            .lock()
            .unwrap()
            .entry(conversation_id.to_string())
            .or_default()
            .push(message.clone());
        Ok(())
    }
}

/// Session as if restored from an earlier login.
pub fn session(name: &str) -> UserSession {
    let mut state = AppState::new();
    state.user_name = Some(name.to_string());
    yaschat::session::restore(&state).unwrap()
}

pub fn message(id: &str, from: &str, to: &str, content: &str) -> Message {
    Message {
        id: id.to_string(),
        from_name: from.to_string(),
        to_name: to.to_string(),
        content: content.to_string(),
        timestamp: "2024-05-01T09:30:00.000Z".to_string(),
    }
}

/// Answers exactly one HTTP request with `status` and `body`.
///
/// Returns the base url and a handle yielding the raw request text.
pub async fn serve_once(status: u16, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });
    (format!("http://{addr}"), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
            let len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= pos + 4 + len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
