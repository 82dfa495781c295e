// src/view/sidebar.rs

use crate::session::{ChatMachine, SessionState};
use crate::types::TopicId;

pub fn render_sidebar(machine: &ChatMachine) -> Vec<String> {
    let active = machine.state().topic_id();
    let mut lines = vec!["Topics".to_string()];

    if let SessionState::CreatingTopic { title, .. } = machine.state() {
        lines.push(format!("  + {} (creating…)", title));
    }

    if machine.topics().is_empty() {
        lines.push("  (no topics yet)".to_string());
    }

    for (i, topic) in machine.topics().iter().enumerate() {
        let marker = if Some(&topic.id) == active { '*' } else { ' ' };
        lines.push(format!("{} {:>2}. {}", marker, i + 1, topic.title));
    }
    lines
}

/// Resolve what the user typed after `/open` or `/delete`: a 1-based
/// sidebar index, or a raw topic id.
pub fn resolve_topic(machine: &ChatMachine, arg: &str) -> Option<TopicId> {
    let arg = arg.trim();
    if arg.is_empty() {
        return None;
    }
    if let Ok(n) = arg.parse::<usize>() {
        if let Some(topic) = n.checked_sub(1).and_then(|i| machine.topics().get(i)) {
            return Some(topic.id.clone());
        }
    }
    machine
        .topics()
        .iter()
        .find(|t| t.id.as_str() == arg)
        .map(|t| t.id.clone())
        .or_else(|| Some(TopicId::new(arg)))
}
