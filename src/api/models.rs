use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Message {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub from_name: String,
    #[serde(default)]
    pub to_name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
}

impl Message {
    /// True for the placeholder rows the server keeps for freshly created conversations.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub conversation_id: String,
    pub participants: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_message: Message,
}

impl Conversation {
    /// Conversation as the server would derive it from a canonical participant pair.
    pub fn from_participants(participants: &Participants) -> Self {
        let [a, b] = participants.as_array();
        Self {
            conversation_id: format!("{}-{}", a, b),
            participants: participants.to_vec(),
            last_message: Message::default(),
        }
    }

    /// The participant that is not `me`. Linear scan in server order.
    pub fn contact_name(&self, me: &str) -> Option<&str> {
        self.participants
            .iter()
            .map(String::as_str)
            .find(|name| *name != me)
    }

    pub fn has_participant(&self, name: &str) -> bool {
        self.participants.iter().any(|p| p == name)
    }
}

/// Exactly two participant names, kept in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participants([String; 2]);

impl Participants {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let mut pair = [a.into(), b.into()];
        pair.sort();
        Self(pair)
    }

    pub fn as_array(&self) -> &[String; 2] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.to_vec()
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct NewConversation {
    pub participants: Vec<String>,
}

/// Flat message record of the older `/messages` + `/message` endpoints.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct LegacyMessage {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub content: String,
}

impl LegacyMessage {
    pub fn is_complete(&self) -> bool {
        [&self.from, &self.to, &self.subject, &self.content]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

/// The reference server encodes empty lists as `null`.
pub fn decode_list<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> serde_json::Result<Vec<T>> {
    let list: Option<Vec<T>> = serde_json::from_slice(bytes)?;
    Ok(list.unwrap_or_default())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
