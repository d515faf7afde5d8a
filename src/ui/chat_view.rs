use std::fmt::Write as _;

use crate::api::models::Conversation;
use crate::store::{DeliveryStatus, LocalMessage};

pub struct ChatView<'a> {
    me: &'a str,
    conversation: &'a Conversation,
    messages: &'a [LocalMessage],
}

impl<'a> ChatView<'a> {
    pub fn new(me: &'a str, conversation: &'a Conversation, messages: &'a [LocalMessage]) -> Self {
        Self { me, conversation, messages }
    }

    pub fn header(&self) -> String {
        format!("== {} ==", self.conversation.contact_name(self.me).unwrap_or(self.me))
    }

    /// One line per message. Own messages are indented, blank ones skipped.
    pub fn render(&self) -> String {
        let mut out = self.header();
        out.push('\n');
        for entry in self.messages.iter().filter(|m| !m.message.is_blank()) {
            out.push_str(&Self::line(self.me, entry));
            out.push('\n');
        }
        out
    }

    pub fn line(me: &str, entry: &LocalMessage) -> String {
        let msg = &entry.message;
        let mut line = String::new();
        if msg.from_name == me {
            let _ = write!(line, "{:>24} {}", "", msg.content);
        } else {
            let _ = write!(line, "{}: {}", msg.from_name, msg.content);
        }
        match entry.status {
            DeliveryStatus::Pending => line.push_str(" …"),
            DeliveryStatus::Failed => line.push_str(" (not delivered)"),
            DeliveryStatus::Confirmed => {}
        }
        line
    }
}
