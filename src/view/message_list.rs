// src/view/message_list.rs

use crate::session::ChatMachine;
use crate::types::{Message, Role};

pub const MORE_CONTROL: &str = "…";
pub const HIDE_CONTROL: &str = "hide";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReferenceControl {
    /// Collapsed; selecting it shows the rest.
    More,
    /// Expanded; selecting it collapses again.
    Hide,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MessageView {
    pub index: usize,
    pub role: Role,
    pub content: String,
    pub images: Vec<String>,
    pub references: Vec<String>,
    pub control: Option<ReferenceControl>,
    pub undelivered: bool,
}

/// Lay out one message. References beyond `preview_limit` are hidden
/// unless `expanded`.
pub fn render_message(
    index: usize,
    message: &Message,
    expanded: bool,
    undelivered: bool,
    preview_limit: usize,
) -> MessageView {
    let total = message.reference_documents.len();
    let collapsible = total > preview_limit;
    let shown = if collapsible && !expanded {
        preview_limit
    } else {
        total
    };

    let references = message
        .reference_documents
        .iter()
        .take(shown)
        .enumerate()
        .map(|(i, doc)| {
            if doc.title.is_empty() {
                format!("document {}", i + 1)
            } else {
                doc.title.clone()
            }
        })
        .collect();

    let control = match (collapsible, expanded) {
        (false, _) => None,
        (true, false) => Some(ReferenceControl::More),
        (true, true) => Some(ReferenceControl::Hide),
    };

    MessageView {
        index,
        role: message.role,
        content: message.content.clone(),
        images: message.images.clone(),
        references,
        control,
        undelivered,
    }
}

impl MessageView {
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let marker = if self.undelivered { " (not delivered)" } else { "" };
        lines.push(format!("[{}] {}{}:", self.index, self.role.label(), marker));
        lines.extend(self.content.lines().map(|l| format!("    {}", l)));

        for image in &self.images {
            lines.push(format!("    [image] {}", image));
        }

        if !self.references.is_empty() {
            lines.push("    References:".to_string());
            for (i, title) in self.references.iter().enumerate() {
                lines.push(format!("      {}. {}", i + 1, title));
            }
        }

        match self.control {
            Some(ReferenceControl::More) => {
                lines.push(format!("      {}  (/refs {} to show all)", MORE_CONTROL, self.index))
            }
            Some(ReferenceControl::Hide) => {
                lines.push(format!("      {}  (/refs {})", HIDE_CONTROL, self.index))
            }
            None => {}
        }
        lines
    }
}

/// The whole conversation pane, placeholders included.
pub fn render_message_list(machine: &ChatMachine, preview_limit: usize) -> Vec<String> {
    let mut lines = Vec::new();

    if machine.is_loading_messages() {
        lines.push("Loading messages…".to_string());
    }

    for (i, message) in machine.messages().iter().enumerate() {
        let view = render_message(
            i + 1,
            message,
            machine.is_expanded(&message.id),
            machine.is_undelivered(&message.id),
            preview_limit,
        );
        lines.extend(view.to_lines());
    }

    if machine.is_awaiting_answer() {
        lines.push("Thinking…".to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Event;
    use crate::test_support::{message, reference};

    fn with_references(count: usize) -> Message {
        let mut msg = message("m1", Role::Assistant, "Here you go");
        msg.reference_documents = (1..=count)
            .map(|i| reference(&format!("doc-{}.pdf", i)))
            .collect();
        msg
    }

    #[test]
    fn test_four_references_collapse_then_expand() {
        let msg = with_references(4);

        let collapsed = render_message(1, &msg, false, false, 3);
        assert_eq!(collapsed.references.len(), 3);
        assert_eq!(collapsed.control, Some(ReferenceControl::More));
        assert!(collapsed.to_lines().iter().any(|l| l.contains(MORE_CONTROL)));

        let expanded = render_message(1, &msg, true, false, 3);
        assert_eq!(expanded.references.len(), 4);
        assert_eq!(expanded.control, Some(ReferenceControl::Hide));
        let lines = expanded.to_lines();
        assert!(lines.iter().any(|l| l.contains(HIDE_CONTROL)));
        assert!(!lines.iter().any(|l| l.contains(MORE_CONTROL)));
    }

    #[test]
    fn test_three_or_fewer_never_show_control() {
        for count in 0..=3 {
            let msg = with_references(count);
            for expanded in [false, true] {
                let view = render_message(1, &msg, expanded, false, 3);
                assert_eq!(view.control, None);
                assert_eq!(view.references.len(), count);
            }
        }
    }

    #[test]
    fn test_untitled_reference_gets_placeholder_name() {
        let mut msg = message("m1", Role::Assistant, "x");
        msg.reference_documents = vec![reference("")];
        let view = render_message(1, &msg, false, false, 3);
        assert_eq!(view.references, vec!["document 1".to_string()]);
    }

    #[test]
    fn test_images_and_undelivered_marker() {
        let mut msg = message("m1", Role::User, "look");
        msg.images = vec!["https://cdn.example/a.png".to_string()];
        let lines = render_message(2, &msg, false, true, 3).to_lines();
        assert_eq!(lines[0], "[2] You (not delivered):");
        assert!(lines.contains(&"    [image] https://cdn.example/a.png".to_string()));
    }

    #[test]
    fn test_list_shows_thinking_while_creating() {
        let mut m = ChatMachine::new(25);
        m.handle(Event::SendMessage("hello".into()));
        let lines = render_message_list(&m, 3);
        assert_eq!(lines.first().map(String::as_str), Some("[1] You:"));
        assert_eq!(lines.last().map(String::as_str), Some("Thinking…"));
    }
}
