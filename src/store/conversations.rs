use log::{debug, error, info};

use crate::api::models::{Conversation, Participants};
use crate::api::MessagingApi;
use crate::store::ChatError;

/// Conversations of the current user, in the order the server returned them.
#[derive(Debug, Default)]
pub struct ConversationStore {
    items: Vec<Conversation>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Conversation] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn find(&self, conversation_id: &str) -> Option<&Conversation> {
        self.items.iter().find(|c| c.conversation_id == conversation_id)
    }

    /// First cached conversation between `me` and `contact`.
    pub fn find_by_contact(&self, me: &str, contact: &str) -> Option<&Conversation> {
        self.items
            .iter()
            .find(|c| c.has_participant(me) && c.contact_name(me) == Some(contact))
    }

    /// Replace the cache with the server's list. On error the cache is left as is.
    pub async fn refresh(&mut self, api: &dyn MessagingApi, user_name: &str) -> Result<(), ChatError> {
        match api.conversations(user_name).await {
            Ok(items) => {
                debug!("Fetched {} conversations for {user_name}", items.len());
                self.items = items;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching conversations: {e}");
                Err(e.into())
            }
        }
    }

    /// Create a conversation with `contact` and append it to the cache.
    ///
    /// Existing conversations with the same pair are not checked.
    pub async fn create(
        &mut self,
        api: &dyn MessagingApi,
        current_user: &str,
        contact: &str,
    ) -> Result<&Conversation, ChatError> {
        let contact = contact.trim();
        if contact.is_empty() || contact == current_user {
            return Err(ChatError::InvalidContact(contact.to_string()));
        }

        let participants = Participants::new(current_user, contact);
        let conversation = match api.create_conversation(&participants).await {
            Ok(Some(conv)) => conv,
            Ok(None) => Conversation::from_participants(&participants),
            Err(e) => {
                error!("Error creating conversation: {e}");
                return Err(e.into());
            }
        };
        info!("Created conversation {}", conversation.conversation_id);

        self.items.push(conversation);
        Ok(&self.items[self.items.len() - 1])
    }
}
