// src/session/machine.rs

use std::collections::{HashSet, VecDeque};

use tracing::{debug, info};

use super::state::{PendingSend, SessionState};
use super::title::topic_title;
use crate::error::{ChatError, Result};
use crate::types::{AskAgentResponse, Message, MessageId, Topic, TopicId};

/// Inputs to the machine: user actions and the results of effects it asked for.
#[derive(Debug)]
pub enum Event {
    RefreshTopics,
    StartNewSession,
    SelectTopic(TopicId),
    SendMessage(String),
    DeleteTopic(TopicId),
    ToggleReferences(MessageId),
    SetDraft(String),
    Close,

    TopicsLoaded(Result<Vec<Topic>>),
    MessagesLoaded {
        topic_id: TopicId,
        ticket: u64,
        result: Result<Vec<Message>>,
    },
    TopicCreated(Result<Topic>),
    AgentAnswered {
        topic_id: TopicId,
        message_id: MessageId,
        result: Result<AskAgentResponse>,
    },
    TopicDeleted {
        topic_id: TopicId,
        result: Result<()>,
    },
}

/// Remote work the machine wants done. Each one comes back as an [`Event`].
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    FetchTopics,
    FetchMessages { topic_id: TopicId, ticket: u64 },
    CreateTopic { title: String },
    AskAgent {
        topic_id: TopicId,
        message_id: MessageId,
        query: String,
    },
    DeleteTopic { topic_id: TopicId },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Non-blocking message for the user.
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

const BUSY_CREATING: &str = "A new topic is still being created. Try again once it is ready.";

pub struct ChatMachine {
    state: SessionState,
    topics: Vec<Topic>,
    messages: Vec<Message>,
    draft: String,
    expanded: HashSet<MessageId>,
    failed: HashSet<MessageId>,
    awaiting: Vec<(TopicId, MessageId)>,
    notices: VecDeque<Notice>,
    next_ticket: u64,
    title_max_chars: usize,
}

impl ChatMachine {
    pub fn new(title_max_chars: usize) -> Self {
        Self {
            state: SessionState::Empty,
            topics: Vec::new(),
            messages: Vec::new(),
            draft: String::new(),
            expanded: HashSet::new(),
            failed: HashSet::new(),
            awaiting: Vec::new(),
            notices: VecDeque::new(),
            next_ticket: 1,
            title_max_chars,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_expanded(&self, message_id: &MessageId) -> bool {
        self.expanded.contains(message_id)
    }

    /// The ask for this user message failed; the bubble is kept.
    pub fn is_undelivered(&self, message_id: &MessageId) -> bool {
        self.failed.contains(message_id)
    }

    /// An answer is outstanding for what is on screen right now.
    pub fn is_awaiting_answer(&self) -> bool {
        match &self.state {
            SessionState::CreatingTopic { .. } => true,
            SessionState::Persisted { topic_id, .. } => {
                self.awaiting.iter().any(|(t, _)| t == topic_id)
            }
            _ => false,
        }
    }

    pub fn is_loading_messages(&self) -> bool {
        matches!(
            self.state,
            SessionState::Persisted {
                loading: Some(_),
                ..
            }
        )
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::RefreshTopics => vec![Effect::FetchTopics],
            Event::StartNewSession => self.start_new_session(),
            Event::SelectTopic(topic_id) => self.select_topic(topic_id),
            Event::SendMessage(text) => self.send_message(&text),
            Event::DeleteTopic(topic_id) => self.delete_topic(topic_id),
            Event::ToggleReferences(message_id) => {
                if !self.expanded.remove(&message_id) {
                    self.expanded.insert(message_id);
                }
                Vec::new()
            }
            Event::SetDraft(text) => {
                self.draft = text;
                Vec::new()
            }
            Event::Close => self.close(),
            Event::TopicsLoaded(result) => self.on_topics_loaded(result),
            Event::MessagesLoaded {
                topic_id,
                ticket,
                result,
            } => self.on_messages_loaded(topic_id, ticket, result),
            Event::TopicCreated(result) => self.on_topic_created(result),
            Event::AgentAnswered {
                topic_id,
                message_id,
                result,
            } => self.on_agent_answered(topic_id, message_id, result),
            Event::TopicDeleted { topic_id, result } => self.on_topic_deleted(topic_id, result),
        }
    }

    fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notices.push_back(Notice {
            level,
            text: text.into(),
        });
    }

    fn notify_failure(&mut self, what: &str, err: &ChatError) {
        let level = if err.is_invalid_response() {
            NoticeLevel::Warning
        } else {
            NoticeLevel::Error
        };
        self.notify(level, format!("{}: {}", what, err));
    }

    fn clear_view(&mut self) {
        self.messages.clear();
        self.expanded.clear();
        self.failed.clear();
    }

    fn start_new_session(&mut self) -> Vec<Effect> {
        if self.state.is_creating() {
            self.notify(NoticeLevel::Info, BUSY_CREATING);
            return Vec::new();
        }
        self.state = SessionState::Temporary;
        self.clear_view();
        self.draft.clear();
        Vec::new()
    }

    fn select_topic(&mut self, topic_id: TopicId) -> Vec<Effect> {
        match &self.state {
            SessionState::CreatingTopic { .. } => {
                self.notify(NoticeLevel::Info, BUSY_CREATING);
                return Vec::new();
            }
            SessionState::Persisted { topic_id: current, .. } if *current == topic_id => {
                return Vec::new();
            }
            _ => {}
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.state = SessionState::Persisted {
            topic_id: topic_id.clone(),
            loading: Some(ticket),
        };
        self.clear_view();
        vec![Effect::FetchMessages { topic_id, ticket }]
    }

    fn send_message(&mut self, text: &str) -> Vec<Effect> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        if matches!(self.state, SessionState::Empty) {
            self.start_new_session();
        }

        let message = Message::local_user(text);
        let pending = PendingSend {
            message_id: message.id.clone(),
            text: text.to_string(),
        };
        self.messages.push(message);
        self.draft.clear();

        match &mut self.state {
            SessionState::Empty | SessionState::Temporary => {
                let title = topic_title(text, self.title_max_chars);
                info!(title = %title, "creating topic for first message");
                self.state = SessionState::CreatingTopic {
                    title: title.clone(),
                    queued: vec![pending],
                };
                vec![Effect::CreateTopic { title }]
            }
            SessionState::CreatingTopic { queued, .. } => {
                debug!(queued = queued.len() + 1, "send queued behind topic creation");
                queued.push(pending);
                Vec::new()
            }
            SessionState::Persisted { topic_id, .. } => {
                let topic_id = topic_id.clone();
                self.awaiting
                    .push((topic_id.clone(), pending.message_id.clone()));
                vec![Effect::AskAgent {
                    topic_id,
                    message_id: pending.message_id,
                    query: pending.text,
                }]
            }
        }
    }

    fn delete_topic(&mut self, topic_id: TopicId) -> Vec<Effect> {
        // The topic being created has no id yet, so any id here is safe to delete.
        vec![Effect::DeleteTopic { topic_id }]
    }

    fn close(&mut self) -> Vec<Effect> {
        if let SessionState::CreatingTopic { queued, .. } = &self.state {
            debug!(dropped = queued.len(), "closed while creating topic");
        }
        self.state = SessionState::Empty;
        self.clear_view();
        self.draft.clear();
        self.awaiting.clear();
        Vec::new()
    }

    fn remember_topic(&mut self, topic: Topic) {
        if !self.topics.iter().any(|t| t.id == topic.id) {
            self.topics.insert(0, topic);
        }
    }

    fn on_topics_loaded(&mut self, result: Result<Vec<Topic>>) -> Vec<Effect> {
        match result {
            Ok(mut topics) => {
                topics.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
                debug!(count = topics.len(), "topics loaded");
                self.topics = topics;
            }
            Err(err) => {
                if err.is_invalid_response() {
                    self.topics.clear();
                }
                self.notify_failure("Could not load topics", &err);
            }
        }
        Vec::new()
    }

    fn on_messages_loaded(
        &mut self,
        topic_id: TopicId,
        ticket: u64,
        result: Result<Vec<Message>>,
    ) -> Vec<Effect> {
        if !self.state.accepts_load(&topic_id, ticket) {
            debug!(topic = %topic_id, ticket, state = self.state.name(), "dropping stale message load");
            return Vec::new();
        }
        if let SessionState::Persisted { loading, .. } = &mut self.state {
            *loading = None;
        }

        match result {
            Ok(fetched) => {
                // Anything already on screen was appended locally after the
                // select. The server may already hold the same turn, so a
                // local message is dropped when it matches a fetched one.
                let local: Vec<Message> = self.messages.drain(..).collect();
                let local = unsaved_local(&fetched, local);
                if !local.is_empty() {
                    debug!(kept = local.len(), "merging local messages after fetched history");
                }
                self.messages = fetched;
                self.messages.extend(local);
            }
            Err(err) => self.notify_failure("Could not load messages", &err),
        }
        Vec::new()
    }

    fn on_topic_created(&mut self, result: Result<Topic>) -> Vec<Effect> {
        let queued = match std::mem::replace(&mut self.state, SessionState::Empty) {
            SessionState::CreatingTopic { queued, .. } => queued,
            other => {
                // Closed while the create was in flight.
                self.state = other;
                match result {
                    Ok(topic) => {
                        debug!(topic = %topic.id, "topic created after session was left");
                        self.remember_topic(topic);
                    }
                    Err(err) => debug!(error = %err, "topic creation failed after session was left"),
                }
                return Vec::new();
            }
        };

        match result {
            Ok(topic) => {
                let topic_id = topic.id.clone();
                info!(topic = %topic_id, "topic created");
                self.remember_topic(topic);
                self.state = SessionState::Persisted {
                    topic_id: topic_id.clone(),
                    loading: None,
                };
                queued
                    .into_iter()
                    .map(|pending| {
                        self.awaiting
                            .push((topic_id.clone(), pending.message_id.clone()));
                        Effect::AskAgent {
                            topic_id: topic_id.clone(),
                            message_id: pending.message_id,
                            query: pending.text,
                        }
                    })
                    .collect()
            }
            Err(err) => {
                let dropped: HashSet<MessageId> =
                    queued.iter().map(|p| p.message_id.clone()).collect();
                self.messages.retain(|m| !dropped.contains(&m.id));
                self.draft = queued
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("\n");
                self.state = SessionState::Temporary;
                self.notify_failure("Could not create topic", &err);
                Vec::new()
            }
        }
    }

    fn on_agent_answered(
        &mut self,
        topic_id: TopicId,
        message_id: MessageId,
        result: Result<AskAgentResponse>,
    ) -> Vec<Effect> {
        self.awaiting
            .retain(|(t, m)| !(t == &topic_id && m == &message_id));
        let active = self.state.topic_id() == Some(&topic_id);

        match result {
            Ok(response) if active => {
                self.messages.push(Message::local_assistant(
                    response.answer,
                    response.reference_documents,
                ));
            }
            Ok(_) => {
                debug!(topic = %topic_id, "answer for inactive topic kept server-side only");
            }
            Err(err) => {
                if active {
                    self.failed.insert(message_id);
                }
                self.notify_failure("The assistant could not answer", &err);
            }
        }
        Vec::new()
    }

    fn on_topic_deleted(&mut self, topic_id: TopicId, result: Result<()>) -> Vec<Effect> {
        match result {
            Ok(()) => {
                self.topics.retain(|t| t.id != topic_id);
                self.awaiting.retain(|(t, _)| t != &topic_id);
                if self.state.topic_id() == Some(&topic_id) {
                    info!(topic = %topic_id, "active topic deleted");
                    self.state = SessionState::Empty;
                    self.clear_view();
                }
            }
            Err(err) => self.notify_failure("Could not delete topic", &err),
        }
        Vec::new()
    }
}

/// Local messages that `fetched` does not already contain. Server copies
/// carry their own ids, so local ones are matched on role and content, each
/// fetched message absorbing at most one local copy.
fn unsaved_local(fetched: &[Message], local: Vec<Message>) -> Vec<Message> {
    let ids: HashSet<&MessageId> = fetched.iter().map(|m| &m.id).collect();
    let mut unmatched: Vec<&Message> = fetched.iter().collect();

    local
        .into_iter()
        .filter(|m| {
            if ids.contains(&m.id) {
                return false;
            }
            if !m.id.is_local() {
                return true;
            }
            match unmatched
                .iter()
                .rposition(|f| f.role == m.role && f.content == m.content)
            {
                Some(pos) => {
                    unmatched.remove(pos);
                    false
                }
                None => true,
            }
        })
        .collect()
}
