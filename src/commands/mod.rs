// src/commands/mod.rs

pub mod chat;

pub use chat::*;
