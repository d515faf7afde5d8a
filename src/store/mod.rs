pub mod conversations;
pub mod messages;
pub mod selection;

use std::sync::Arc;

use log::info;
use thiserror::Error;

use crate::api::models::{Conversation, Message};
use crate::api::{ApiError, MessagingApi};
use crate::session::UserSession;
pub use conversations::ConversationStore;
pub use messages::{DeliveryStatus, LocalMessage, MessageStore};
pub use selection::Selection;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("not logged in")]
    NotLoggedIn,

    #[error("no conversation selected")]
    NoSelection,

    #[error("no conversation with {0}")]
    UnknownContact(String),

    #[error("invalid contact {0:?}")]
    InvalidContact(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A message appended locally whose POST has not been issued yet.
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub conversation_id: String,
    pub message: Message,
}

pub struct ChatController {
    api: Arc<dyn MessagingApi>,
    session: Option<UserSession>,
    conversations: ConversationStore,
    selection: Selection,
    messages: MessageStore,
}

impl ChatController {
    pub fn new(api: Arc<dyn MessagingApi>) -> Self {
        Self {
            api,
            session: None,
            conversations: ConversationStore::new(),
            selection: Selection::new(),
            messages: MessageStore::new(),
        }
    }

    pub fn api(&self) -> Arc<dyn MessagingApi> {
        Arc::clone(&self.api)
    }

    pub fn session(&self) -> Option<&UserSession> {
        self.session.as_ref()
    }

    pub fn conversations(&self) -> &[Conversation] {
        self.conversations.items()
    }

    pub fn selected(&self) -> Option<&Conversation> {
        self.selection.active()
    }

    pub fn messages(&self) -> &[LocalMessage] {
        self.messages.items()
    }

    fn user(&self) -> Result<&UserSession, ChatError> {
        self.session.as_ref().ok_or(ChatError::NotLoggedIn)
    }

    /// Switch the active user. A new or changed user reloads the conversation list.
    pub async fn set_session(&mut self, session: Option<UserSession>) -> Result<(), ChatError> {
        if self.session == session {
            return Ok(());
        }
        self.session = session;
        self.conversations.clear();
        self.clear_selection();
        if self.session.is_some() {
            self.refresh_conversations().await?;
        }
        Ok(())
    }

    pub async fn refresh_conversations(&mut self) -> Result<(), ChatError> {
        let name = self.user()?.name().to_string();
        self.conversations.refresh(self.api.as_ref(), &name).await
    }

    pub async fn create_conversation(&mut self, contact: &str) -> Result<Conversation, ChatError> {
        let name = self.user()?.name().to_string();
        let conv = self
            .conversations
            .create(self.api.as_ref(), &name, contact)
            .await?;
        Ok(conv.clone())
    }

    /// Cached conversation by contact name, or by conversation id.
    pub fn find_contact(&self, contact: &str) -> Result<&Conversation, ChatError> {
        let me = self.user()?.name();
        let contact = contact.trim();
        self.conversations
            .find_by_contact(me, contact)
            .or_else(|| self.conversations.find(contact))
            .ok_or_else(|| ChatError::UnknownContact(contact.to_string()))
    }

    /// Make `conversation` active and fetch its messages. Always fetches, even on reselect.
    pub async fn select_conversation(&mut self, conversation: Conversation) -> Result<(), ChatError> {
        let id = conversation.conversation_id.clone();
        self.selection.select(conversation);
        self.messages.load(self.api.as_ref(), &id).await
    }

    pub async fn select_contact(&mut self, contact: &str) -> Result<(), ChatError> {
        let conv = self.find_contact(contact)?.clone();
        self.select_conversation(conv).await
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.messages.reset(None);
    }

    /// Append `content` to the open conversation as a pending message.
    ///
    /// Returns `None` for blank content. The caller is expected to POST the
    /// returned message and pass the result to [`ChatController::acknowledge`].
    pub fn queue_message(&mut self, content: &str) -> Result<Option<OutgoingMessage>, ChatError> {
        let me = self.session.as_ref().ok_or(ChatError::NotLoggedIn)?;
        let conversation = self.selection.active().ok_or(ChatError::NoSelection)?;
        let Some(message) = self.messages.compose(me, conversation, content)? else {
            return Ok(None);
        };
        let outgoing = OutgoingMessage {
            conversation_id: conversation.conversation_id.clone(),
            message: message.clone(),
        };
        self.messages.push_pending(message);
        Ok(Some(outgoing))
    }

    pub fn acknowledge(&mut self, message_id: &str, result: &Result<(), ApiError>) -> Option<DeliveryStatus> {
        self.messages.acknowledge(message_id, result)
    }

    /// Optimistically append and send `content`, then record the outcome.
    pub async fn send_message(&mut self, content: &str) -> Result<Option<Message>, ChatError> {
        let Some(outgoing) = self.queue_message(content)? else {
            return Ok(None);
        };
        let result = self
            .api
            .send_message(&outgoing.conversation_id, &outgoing.message)
            .await;
        self.acknowledge(&outgoing.message.id, &result);
        result?;
        info!("Sent message {} to {}", outgoing.message.id, outgoing.message.to_name);
        Ok(Some(outgoing.message))
    }
}
