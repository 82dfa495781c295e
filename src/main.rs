// src/main.rs

#[tokio::main]
async fn main() {
    topic_chat_lib::init_tracing();

    if let Err(e) = topic_chat_lib::run().await {
        tracing::error!(error = %e, "topic-chat exited with an error");
        std::process::exit(1);
    }
}
