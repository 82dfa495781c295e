// src/test_support.rs

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::api::ChatBackend;
use crate::error::{ChatError, Result};
use crate::types::{
    AskAgentResponse, Message, MessageId, ReferenceDocument, Role, Topic, TopicId,
};

pub fn topic(id: &str, title: &str) -> Topic {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    Topic {
        id: TopicId::new(id),
        title: title.to_string(),
        created_at: at,
        updated_at: at,
    }
}

pub fn message(id: &str, role: Role, content: &str) -> Message {
    Message {
        id: MessageId::new(id),
        role,
        content: content.to_string(),
        reference_documents: Vec::new(),
        images: Vec::new(),
        timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
    }
}

pub fn reference(title: &str) -> ReferenceDocument {
    ReferenceDocument {
        id: None,
        title: title.to_string(),
        snippet: None,
        score: None,
    }
}

pub fn agent_reply(answer: &str, references: usize) -> AskAgentResponse {
    AskAgentResponse {
        answer: answer.to_string(),
        reference_documents: (1..=references)
            .map(|i| reference(&format!("doc-{}.pdf", i)))
            .collect(),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    ListTopics,
    CreateTopic(String),
    DeleteTopic(String),
    ListMessages(String),
    AskAgent {
        query: String,
        topic_id: String,
        save_history: bool,
    },
}

/// In-memory backend that records every call in order.
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    topics: Mutex<Vec<Topic>>,
    messages: Mutex<HashMap<String, Vec<Message>>>,
    next_id: Mutex<u32>,
    fail_create: bool,
    fail_ask: bool,
    fail_delete: bool,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_topics(topics: Vec<Topic>) -> Self {
        let backend = Self::default();
        *backend.topics.lock().unwrap() = topics;
        backend
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn failing_ask(mut self) -> Self {
        self.fail_ask = true;
        self
    }

    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn set_messages(&self, topic_id: &str, messages: Vec<Message>) {
        self.messages
            .lock()
            .unwrap()
            .insert(topic_id.to_string(), messages);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn server_error() -> ChatError {
        ChatError::Http {
            status: 502,
            body: "upstream unavailable".to_string(),
        }
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn list_topics(&self) -> Result<Vec<Topic>> {
        self.record(Call::ListTopics);
        Ok(self.topics.lock().unwrap().clone())
    }

    async fn create_topic(&self, title: &str) -> Result<Topic> {
        self.record(Call::CreateTopic(title.to_string()));
        if self.fail_create {
            return Err(Self::server_error());
        }
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            format!("topic-{}", next)
        };
        let created = topic(&id, title);
        self.topics.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn delete_topic(&self, topic_id: &TopicId) -> Result<()> {
        self.record(Call::DeleteTopic(topic_id.to_string()));
        if self.fail_delete {
            return Err(Self::server_error());
        }
        self.topics.lock().unwrap().retain(|t| &t.id != topic_id);
        Ok(())
    }

    async fn list_messages(&self, topic_id: &TopicId) -> Result<Vec<Message>> {
        self.record(Call::ListMessages(topic_id.to_string()));
        Ok(self
            .messages
            .lock()
            .unwrap()
            .get(topic_id.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn ask_agent(
        &self,
        query: &str,
        topic_id: &TopicId,
        save_history: bool,
    ) -> Result<AskAgentResponse> {
        self.record(Call::AskAgent {
            query: query.to_string(),
            topic_id: topic_id.to_string(),
            save_history,
        });
        if self.fail_ask {
            return Err(Self::server_error());
        }
        Ok(agent_reply(&format!("answer to {}", query), 1))
    }
}
