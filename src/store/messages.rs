use chrono::Utc;
use log::{debug, error, warn};

use crate::api::models::{Conversation, Message};
use crate::api::{ApiError, MessagingApi};
use crate::session::UserSession;
use crate::store::ChatError;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DeliveryStatus {
    Pending,   // appended locally, POST in flight
    Confirmed, // fetched from or accepted by the server
    Failed,    // POST failed, kept in the list
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMessage {
    pub message: Message,
    pub status: DeliveryStatus,
}

/// Time-based message ids that never repeat within one client.
#[derive(Debug, Default)]
pub struct MessageIds {
    last: i64,
}

impl MessageIds {
    pub fn next(&mut self) -> String {
        self.next_at(Utc::now().timestamp_millis())
    }

    pub fn next_at(&mut self, now_millis: i64) -> String {
        self.last = now_millis.max(self.last + 1);
        self.last.to_string()
    }
}

/// Messages of the selected conversation.
#[derive(Debug, Default)]
pub struct MessageStore {
    conversation_id: Option<String>,
    items: Vec<LocalMessage>,
    ids: MessageIds,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn items(&self) -> &[LocalMessage] {
        &self.items
    }

    /// Point the store at another conversation (or none) and drop the old list.
    pub fn reset(&mut self, conversation_id: Option<&str>) {
        self.conversation_id = conversation_id.map(str::to_string);
        self.items.clear();
    }

    /// Install a fetched list. Lists for a conversation that is no longer shown are dropped.
    pub fn apply_fetched(&mut self, conversation_id: &str, messages: Vec<Message>) -> bool {
        if self.conversation_id() != Some(conversation_id) {
            debug!("Discarding stale messages for {conversation_id}");
            return false;
        }
        self.items = messages
            .into_iter()
            .map(|message| LocalMessage { message, status: DeliveryStatus::Confirmed })
            .collect();
        true
    }

    /// Fetch the full message list of `conversation_id`. No paging, no delta.
    ///
    /// Switching conversations clears the old list first. Reloading the same one
    /// keeps the current list until the fetch succeeds.
    pub async fn load(&mut self, api: &dyn MessagingApi, conversation_id: &str) -> Result<(), ChatError> {
        if self.conversation_id() != Some(conversation_id) {
            self.reset(Some(conversation_id));
        }
        match api.messages(conversation_id).await {
            Ok(messages) => {
                debug!("Fetched {} messages for {conversation_id}", messages.len());
                self.apply_fetched(conversation_id, messages);
                Ok(())
            }
            Err(e) => {
                error!("Error fetching messages: {e}");
                Err(e.into())
            }
        }
    }

    /// Build the outgoing message for `content`. Blank content yields `None`.
    pub fn compose(
        &mut self,
        me: &UserSession,
        conversation: &Conversation,
        content: &str,
    ) -> Result<Option<Message>, ChatError> {
        if content.trim().is_empty() {
            return Ok(None);
        }
        let to_name = conversation
            .contact_name(me.name())
            .ok_or_else(|| ChatError::InvalidContact(me.name().to_string()))?;

        Ok(Some(Message {
            id: self.ids.next(),
            from_name: me.name().to_string(),
            to_name: to_name.to_string(),
            content: content.to_string(),
            timestamp: crate::utils::iso_timestamp(Utc::now()),
        }))
    }

    pub fn push_pending(&mut self, message: Message) {
        self.items.push(LocalMessage { message, status: DeliveryStatus::Pending });
    }

    /// Record the outcome of a send. A failed message stays in the list.
    pub fn acknowledge(&mut self, id: &str, result: &Result<(), ApiError>) -> Option<DeliveryStatus> {
        let Some(entry) = self.items.iter_mut().rev().find(|m| m.message.id == id) else {
            debug!("Acknowledgement for message {id} no longer shown");
            return None;
        };
        entry.status = match result {
            Ok(()) => DeliveryStatus::Confirmed,
            Err(e) => {
                warn!("Message {id} failed: {e}");
                DeliveryStatus::Failed
            }
        };
        Some(entry.status)
    }
}
