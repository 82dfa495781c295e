// src/lib.rs

pub mod api;
pub mod app;
pub mod auth;
pub mod commands;
pub mod error;
pub mod session;
pub mod settings;
pub mod types;
pub mod view;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use tracing::info;

use crate::api::HttpChatBackend;
use crate::auth::EnvToken;
use crate::error::Result;

pub use error::ChatError;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "topic_chat_lib=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub async fn run() -> Result<()> {
    let settings = settings::load_settings()?.with_env_overrides();
    info!(base_url = %settings.api.base_url, "starting chat client");

    let tokens = Arc::new(EnvToken::new(settings.api.token_env.clone()));
    let backend = Arc::new(HttpChatBackend::new(&settings.api.base_url, tokens));

    app::run_terminal(&settings, backend).await
}
