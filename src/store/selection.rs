use crate::api::models::Conversation;

/// The active conversation. Either none or exactly one is selected.
#[derive(Debug, Default)]
pub struct Selection {
    active: Option<Conversation>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&Conversation> {
        self.active.as_ref()
    }

    /// Make `conversation` active, replacing any previous selection in one step.
    ///
    /// Reselecting the current conversation still counts as a change.
    pub fn select(&mut self, conversation: Conversation) -> Option<Conversation> {
        self.active.replace(conversation)
    }

    pub fn clear(&mut self) -> Option<Conversation> {
        self.active.take()
    }
}
