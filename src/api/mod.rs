// src/api/mod.rs

//! Contract of the remote topic/message/agent service.

pub mod http;
pub mod validate;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AskAgentResponse, Message, Topic, TopicId};

pub use http::HttpChatBackend;

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// `GET /chat/topics`
    async fn list_topics(&self) -> Result<Vec<Topic>>;

    /// `POST /chat/topics {title}`
    async fn create_topic(&self, title: &str) -> Result<Topic>;

    /// `DELETE /chat/topics/{id}`
    async fn delete_topic(&self, topic_id: &TopicId) -> Result<()>;

    /// `GET /chat/topics/{id}/messages`
    async fn list_messages(&self, topic_id: &TopicId) -> Result<Vec<Message>>;

    /// `POST /agent/ {query, topic_id, save_history}`
    async fn ask_agent(
        &self,
        query: &str,
        topic_id: &TopicId,
        save_history: bool,
    ) -> Result<AskAgentResponse>;
}
