// src/session/effects.rs

use std::collections::VecDeque;

use tracing::debug;

use super::machine::{ChatMachine, Effect, Event};
use crate::api::ChatBackend;

/// Run one effect against the backend and turn its outcome into the event
/// the machine expects back.
pub async fn execute<B: ChatBackend + ?Sized>(backend: &B, effect: Effect) -> Event {
    debug!(?effect, "executing effect");
    match effect {
        Effect::FetchTopics => Event::TopicsLoaded(backend.list_topics().await),
        Effect::FetchMessages { topic_id, ticket } => {
            let result = backend.list_messages(&topic_id).await;
            Event::MessagesLoaded {
                topic_id,
                ticket,
                result,
            }
        }
        Effect::CreateTopic { title } => Event::TopicCreated(backend.create_topic(&title).await),
        Effect::AskAgent {
            topic_id,
            message_id,
            query,
        } => {
            let result = backend.ask_agent(&query, &topic_id, true).await;
            Event::AgentAnswered {
                topic_id,
                message_id,
                result,
            }
        }
        Effect::DeleteTopic { topic_id } => {
            let result = backend.delete_topic(&topic_id).await;
            Event::TopicDeleted { topic_id, result }
        }
    }
}

/// Apply `event` and run every effect it causes, one at a time, until the
/// machine is idle. For callers that do not run their own event loop.
pub async fn dispatch<B: ChatBackend + ?Sized>(machine: &mut ChatMachine, backend: &B, event: Event) {
    let mut queue: VecDeque<Effect> = machine.handle(event).into();
    while let Some(effect) = queue.pop_front() {
        let result = execute(backend, effect).await;
        queue.extend(machine.handle(result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;
    use crate::test_support::{message, topic, Call, FakeBackend};
    use crate::types::{Role, TopicId};

    #[tokio::test]
    async fn test_first_send_calls_create_then_agent_once_each() {
        let backend = FakeBackend::new();
        let mut m = ChatMachine::new(25);

        dispatch(&mut m, &backend, Event::StartNewSession).await;
        dispatch(
            &mut m,
            &backend,
            Event::SendMessage("Will the quarterly report be ready by Friday?".into()),
        )
        .await;

        assert_eq!(
            backend.calls(),
            vec![
                Call::CreateTopic("Will the quarterly report...".into()),
                Call::AskAgent {
                    query: "Will the quarterly report be ready by Friday?".into(),
                    topic_id: "topic-1".into(),
                    save_history: true,
                },
            ]
        );
        assert_eq!(m.state().topic_id(), Some(&TopicId::new("topic-1")));
        assert_eq!(m.messages().len(), 2);
        assert_eq!(m.messages()[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_creation_failure_makes_no_agent_call() {
        let backend = FakeBackend::new().failing_create();
        let mut m = ChatMachine::new(25);

        dispatch(&mut m, &backend, Event::StartNewSession).await;
        dispatch(&mut m, &backend, Event::SendMessage("hello".into())).await;

        assert_eq!(backend.calls(), vec![Call::CreateTopic("hello".into())]);
        assert_eq!(m.state(), &SessionState::Temporary);
    }

    #[tokio::test]
    async fn test_agent_failure_keeps_topic_selected() {
        let backend = FakeBackend::new().failing_ask();
        let mut m = ChatMachine::new(25);

        dispatch(&mut m, &backend, Event::SendMessage("hello".into())).await;

        assert_eq!(m.topics().len(), 1);
        assert_eq!(m.state().topic_id(), Some(&m.topics()[0].id));
        assert_eq!(m.messages().len(), 1);
        assert!(m.is_undelivered(&m.messages()[0].id));
        assert_eq!(m.drain_notices().len(), 1);
    }

    #[tokio::test]
    async fn test_follow_up_send_does_not_refetch() {
        let backend = FakeBackend::with_topics(vec![topic("a", "A")]);
        backend.set_messages("a", vec![message("1", Role::User, "old")]);
        let mut m = ChatMachine::new(25);

        dispatch(&mut m, &backend, Event::RefreshTopics).await;
        dispatch(&mut m, &backend, Event::SelectTopic(TopicId::new("a"))).await;
        dispatch(&mut m, &backend, Event::SendMessage("new".into())).await;

        assert_eq!(
            backend.calls(),
            vec![
                Call::ListTopics,
                Call::ListMessages("a".into()),
                Call::AskAgent {
                    query: "new".into(),
                    topic_id: "a".into(),
                    save_history: true,
                },
            ]
        );
        let contents: Vec<&str> = m.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["old", "new", "answer to new"]);
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_topic() {
        let backend = FakeBackend::with_topics(vec![topic("a", "A")]).failing_delete();
        let mut m = ChatMachine::new(25);

        dispatch(&mut m, &backend, Event::RefreshTopics).await;
        dispatch(&mut m, &backend, Event::SelectTopic(TopicId::new("a"))).await;
        dispatch(&mut m, &backend, Event::DeleteTopic(TopicId::new("a"))).await;

        assert_eq!(m.topics().len(), 1);
        assert_eq!(m.state().topic_id(), Some(&TopicId::new("a")));
    }
}
