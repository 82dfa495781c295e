// src/view/mod.rs

pub mod message_list;
pub mod sidebar;

pub use message_list::{render_message, render_message_list, MessageView, ReferenceControl};
pub use sidebar::{render_sidebar, resolve_topic};
