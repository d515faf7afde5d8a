use std::fmt::Write as _;

use crate::api::models::Conversation;

/// Conversation list: contact name, then the last message and its local time.
pub struct Sidebar<'a> {
    me: &'a str,
    items: &'a [Conversation],
}

impl<'a> Sidebar<'a> {
    pub fn new(me: &'a str, items: &'a [Conversation]) -> Self {
        Self { me, items }
    }

    pub fn render(&self) -> String {
        if self.items.is_empty() {
            return "No conversations found\n".to_string();
        }
        let mut out = String::new();
        for conv in self.items {
            let contact = conv.contact_name(self.me).unwrap_or(self.me);
            let last = &conv.last_message;
            if last.is_blank() {
                let _ = writeln!(out, "{contact}");
            } else {
                let _ = writeln!(
                    out,
                    "{contact}\n    {} · {}",
                    last.content,
                    crate::utils::local_time(&last.timestamp)
                );
            }
        }
        out
    }
}
