// src/types/api.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::chat::{Message, MessageId, ReferenceDocument, Role, TopicId};

#[derive(Serialize, Debug)]
pub struct CreateTopicRequest {
    pub title: String,
}

#[derive(Serialize, Debug)]
pub struct AskAgentRequest {
    pub query: String,
    pub topic_id: TopicId,
    pub save_history: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AskAgentResponse {
    pub answer: String,
    #[serde(default)]
    pub reference_documents: Vec<ReferenceDocument>,
}

#[derive(Deserialize, Debug, Default)]
pub struct MessageMetadata {
    #[serde(default)]
    pub images: Vec<String>,
}

/// A message row as returned by `GET /chat/topics/{id}/messages`.
#[derive(Deserialize, Debug)]
pub struct MessageRow {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub reference_documents: Option<Vec<ReferenceDocument>>,
    #[serde(default)]
    pub metadata: Option<MessageMetadata>,
    #[serde(alias = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            role: row.role,
            content: row.content,
            reference_documents: row.reference_documents.unwrap_or_default(),
            images: row.metadata.map(|m| m.images).unwrap_or_default(),
            timestamp: row.created_at,
        }
    }
}
