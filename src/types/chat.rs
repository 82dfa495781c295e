// src/types/chat.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

const LOCAL_ID_PREFIX: &str = "local-";

/// Servers hand out ids either as strings or as integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TopicId(String);

impl<'de> Deserialize<'de> for TopicId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_id(deserializer).map(Self)
    }
}

impl TopicId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_id(deserializer).map(Self)
    }
}

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id for a message that exists only on this client.
    pub fn local() -> Self {
        Self(format!("{}{}", LOCAL_ID_PREFIX, uuid::Uuid::new_v4()))
    }

    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Topic {
    pub id: TopicId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "Assistant",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReferenceDocument {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "file_name", alias = "document_name", alias = "name")]
    pub title: String,
    #[serde(default, alias = "content", alias = "chunk")]
    pub snippet: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub reference_documents: Vec<ReferenceDocument>,
    pub images: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Optimistic copy of what the user just typed.
    pub fn local_user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::local(),
            role: Role::User,
            content: content.into(),
            reference_documents: Vec::new(),
            images: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn local_assistant(content: impl Into<String>, references: Vec<ReferenceDocument>) -> Self {
        Self {
            id: MessageId::local(),
            role: Role::Assistant,
            content: content.into(),
            reference_documents: references,
            images: Vec::new(),
            timestamp: Utc::now(),
        }
    }
}
