// src/session/mod.rs

//! Chat session controller.
//!
//! [`ChatMachine`] is a pure transition function over [`SessionState`]:
//! user actions and remote results go in as [`Event`]s, remote work comes
//! out as [`Effect`]s. Whoever drives it (the terminal loop, or
//! [`effects::dispatch`]) runs the effects and feeds the results back.

pub mod effects;
pub mod machine;
pub mod state;
pub mod title;

pub use effects::{dispatch, execute};
pub use machine::{ChatMachine, Effect, Event, Notice, NoticeLevel};
pub use state::{PendingSend, SessionState};
pub use title::topic_title;
