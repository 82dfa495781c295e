// src/app.rs

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::api::ChatBackend;
use crate::commands::{parse_command, Command, HELP};
use crate::error::Result;
use crate::session::{execute, ChatMachine, Effect, Event, NoticeLevel};
use crate::settings::AppSettings;
use crate::view::{render_message_list, render_sidebar};

/// Spawn each effect; its result comes back on `tx` as an event.
fn spawn_effects(
    backend: &Arc<dyn ChatBackend>,
    tx: &mpsc::UnboundedSender<Event>,
    effects: Vec<Effect>,
) {
    for effect in effects {
        let backend = Arc::clone(backend);
        let tx = tx.clone();
        tokio::spawn(async move {
            let event = execute(backend.as_ref(), effect).await;
            if tx.send(event).is_err() {
                debug!("front-end gone, dropping effect result");
            }
        });
    }
}

fn render(machine: &mut ChatMachine, preview_limit: usize) {
    println!("{}", "─".repeat(60));
    for line in render_sidebar(machine) {
        println!("{}", line);
    }
    println!();
    for line in render_message_list(machine, preview_limit) {
        println!("{}", line);
    }
    for notice in machine.drain_notices() {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        println!("[{}] {}", tag, notice.text);
    }
}

/// Terminal front-end: one task owns the machine, stdin lines and effect
/// results are applied in arrival order.
pub async fn run_terminal(settings: &AppSettings, backend: Arc<dyn ChatBackend>) -> Result<()> {
    let preview_limit = settings.display.reference_preview_limit;
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let mut machine = ChatMachine::new(settings.display.title_max_chars);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    let effects = machine.handle(Event::RefreshTopics);
    spawn_effects(&backend, &tx, effects);

    loop {
        tokio::select! {
            line = input.next_line() => {
                let Some(line) = line? else {
                    info!("stdin closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line, &machine) {
                    Command::Quit => break,
                    Command::Help => println!("{}", HELP),
                    Command::Invalid(msg) => println!("{}", msg),
                    Command::Event(event) => {
                        let effects = machine.handle(event);
                        spawn_effects(&backend, &tx, effects);
                        render(&mut machine, preview_limit);
                    }
                }
            }
            Some(event) = rx.recv() => {
                let effects = machine.handle(event);
                spawn_effects(&backend, &tx, effects);
                render(&mut machine, preview_limit);
            }
        }
    }

    Ok(())
}
