pub mod client;
pub mod error;
pub mod models;

use async_trait::async_trait;

pub use client::ApiClient;
pub use error::ApiError;
use models::{Conversation, Message, Participants};

/// Conversation-oriented endpoints of the messaging server.
///
/// `ApiClient` is the HTTP implementation; stores only talk to this trait.
#[async_trait]
pub trait MessagingApi: Send + Sync {
    async fn login(&self, name: &str) -> Result<(), ApiError>;

    async fn conversations(&self, user_name: &str) -> Result<Vec<Conversation>, ApiError>;

    /// Returns the created conversation when the server echoes one back.
    async fn create_conversation(
        &self,
        participants: &Participants,
    ) -> Result<Option<Conversation>, ApiError>;

    async fn messages(&self, conversation_id: &str) -> Result<Vec<Message>, ApiError>;

    async fn send_message(&self, conversation_id: &str, message: &Message) -> Result<(), ApiError>;
}
