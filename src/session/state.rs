// src/session/state.rs

use crate::types::{MessageId, TopicId};

/// A user message waiting for the topic it will be sent to.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingSend {
    pub message_id: MessageId,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionState {
    /// No topic and no messages.
    Empty,
    /// Unsaved session; nothing exists server-side yet.
    Temporary,
    /// `POST /chat/topics` is in flight. Every send made meanwhile is queued
    /// here and goes to the id the single create call returns.
    CreatingTopic {
        title: String,
        queued: Vec<PendingSend>,
    },
    /// Bound to a real topic. `loading` holds the ticket of the message fetch
    /// still outstanding for it, if any.
    Persisted {
        topic_id: TopicId,
        loading: Option<u64>,
    },
}

impl SessionState {
    pub fn topic_id(&self) -> Option<&TopicId> {
        match self {
            SessionState::Persisted { topic_id, .. } => Some(topic_id),
            _ => None,
        }
    }

    pub fn is_creating(&self) -> bool {
        matches!(self, SessionState::CreatingTopic { .. })
    }

    /// Whether a message list fetched under `ticket` for `topic` may be
    /// applied now.
    pub fn accepts_load(&self, topic: &TopicId, ticket: u64) -> bool {
        match self {
            SessionState::Persisted {
                topic_id,
                loading: Some(pending),
            } => topic_id == topic && *pending == ticket,
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Empty => "empty",
            SessionState::Temporary => "temporary",
            SessionState::CreatingTopic { .. } => "creating_topic",
            SessionState::Persisted { .. } => "persisted",
        }
    }
}
