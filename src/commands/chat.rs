// src/commands/chat.rs

use crate::session::{ChatMachine, Event};
use crate::view::resolve_topic;

pub const HELP: &str = r#"Commands:
  /new              start a new conversation
  /topics           reload the topic list
  /open <n|id>      open a topic
  /delete <n|id>    delete a topic
  /refs <n>         show or hide the references of message n
  /close            close the chat
  /help             show this help
  /quit             exit
Anything else is sent to the assistant."#;

#[derive(Debug)]
pub enum Command {
    Event(Event),
    Help,
    Quit,
    Invalid(String),
}

/// Turn one line of terminal input into what the front-end should do.
pub fn parse_command(line: &str, machine: &ChatMachine) -> Command {
    let line = line.trim();
    if !line.starts_with('/') {
        return Command::Event(Event::SendMessage(line.to_string()));
    }

    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    };

    match name {
        "/new" => Command::Event(Event::StartNewSession),
        "/topics" => Command::Event(Event::RefreshTopics),
        "/close" => Command::Event(Event::Close),
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        "/open" => match resolve_topic(machine, arg) {
            Some(topic_id) => Command::Event(Event::SelectTopic(topic_id)),
            None => Command::Invalid("Usage: /open <n|id>".to_string()),
        },
        "/delete" => match resolve_topic(machine, arg) {
            Some(topic_id) => Command::Event(Event::DeleteTopic(topic_id)),
            None => Command::Invalid("Usage: /delete <n|id>".to_string()),
        },
        "/refs" => {
            let message = arg
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| machine.messages().get(i));
            match message {
                Some(message) => Command::Event(Event::ToggleReferences(message.id.clone())),
                None => Command::Invalid("Usage: /refs <message number>".to_string()),
            }
        }
        other => Command::Invalid(format!("Unknown command {}. Type /help.", other)),
    }
}
