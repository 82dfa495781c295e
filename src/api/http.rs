// src/api/http.rs

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use tracing::{debug, warn};

use super::validate::{decode_list, decode_object};
use super::ChatBackend;
use crate::auth::TokenSource;
use crate::error::{ChatError, Result};
use crate::types::{
    AskAgentRequest, AskAgentResponse, CreateTopicRequest, Message, MessageRow, Topic, TopicId,
};

pub struct HttpChatBackend {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl HttpChatBackend {
    pub fn new(base_url: &str, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn topic_path(topic_id: &TopicId) -> String {
        format!("/chat/topics/{}", urlencoding::encode(topic_id.as_str()))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.tokens.bearer_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and return the body text of a 2xx response.
    async fn send(&self, endpoint: &str, builder: RequestBuilder) -> Result<String> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "request failed");
            return Err(ChatError::Http {
                status: status.as_u16(),
                body,
            });
        }

        debug!(endpoint, status = status.as_u16(), bytes = body.len(), "request ok");
        Ok(body)
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn list_topics(&self) -> Result<Vec<Topic>> {
        let endpoint = "GET /chat/topics";
        let body = self
            .send(endpoint, self.request(Method::GET, "/chat/topics"))
            .await?;
        decode_list(endpoint, &body)
    }

    async fn create_topic(&self, title: &str) -> Result<Topic> {
        let endpoint = "POST /chat/topics";
        let builder = self
            .request(Method::POST, "/chat/topics")
            .json(&CreateTopicRequest {
                title: title.to_string(),
            });
        let body = self.send(endpoint, builder).await?;
        decode_object(endpoint, &body)
    }

    async fn delete_topic(&self, topic_id: &TopicId) -> Result<()> {
        let builder = self.request(Method::DELETE, &Self::topic_path(topic_id));
        self.send("DELETE /chat/topics/{id}", builder).await?;
        Ok(())
    }

    async fn list_messages(&self, topic_id: &TopicId) -> Result<Vec<Message>> {
        let endpoint = "GET /chat/topics/{id}/messages";
        let path = format!("{}/messages", Self::topic_path(topic_id));
        let body = self.send(endpoint, self.request(Method::GET, &path)).await?;
        let rows: Vec<MessageRow> = decode_list(endpoint, &body)?;
        Ok(rows.into_iter().map(Message::from).collect())
    }

    async fn ask_agent(
        &self,
        query: &str,
        topic_id: &TopicId,
        save_history: bool,
    ) -> Result<AskAgentResponse> {
        let endpoint = "POST /agent/";
        let builder = self.request(Method::POST, "/agent/").json(&AskAgentRequest {
            query: query.to_string(),
            topic_id: topic_id.clone(),
            save_history,
        });
        let body = self.send(endpoint, builder).await?;
        decode_object(endpoint, &body)
    }
}
