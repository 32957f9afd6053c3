use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::prompt::build_chat_request;

/// How much of an error body is kept for logs.
const ERROR_BODY_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum MistralError {
    #[error("Request to Mistral failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mistral returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Mistral response is not valid JSON: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("No response received from AI model")]
    NoChoices,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<MessageContent>,
}

/// Mistral answers with a plain string, or with typed chunks for some models.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Chunks(Vec<ContentChunk>),
}

#[derive(Debug, Deserialize)]
struct ContentChunk {
    #[serde(default)]
    text: Option<String>,
}

impl MessageContent {
    fn into_text(self) -> String {
        match self {
            MessageContent::Text(text) => text,
            MessageContent::Chunks(chunks) => chunks
                .into_iter()
                .filter_map(|chunk| chunk.text)
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

#[derive(Clone)]
pub struct MistralClient {
    http: Client,
    base_url: String,
    model: String,
}

impl MistralClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, MistralError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends the photo with the recipe prompt and returns the model's raw text.
    pub async fn complete(
        &self,
        api_key: &str,
        image_data_url: &str,
    ) -> Result<String, MistralError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = build_chat_request(&self.model, image_data_url);

        debug!(model = %self.model, "Sending request to Mistral");

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Mistral request rejected");
            return Err(MistralError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_CHARS).collect(),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(MessageContent::into_text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(MistralError::NoChoices)?;

        debug!(%content, "Mistral response");

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_content(body: &str) -> Option<String> {
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(MessageContent::into_text)
    }

    #[test]
    fn string_content_is_returned_verbatim() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"dishName\":\"Soup\"}"}}]}"#;
        assert_eq!(first_content(body).as_deref(), Some(r#"{"dishName":"Soup"}"#));
    }

    #[test]
    fn chunked_content_is_joined() {
        let body = r#"{"choices":[{"message":{"content":[
            {"type":"text","text":"DISH_NAME: Soup\n"},
            {"type":"reference","reference_ids":[1]},
            {"type":"text","text":"RECIPE: <p>Boil</p>"}
        ]}}]}"#;
        assert_eq!(
            first_content(body).as_deref(),
            Some("DISH_NAME: Soup\nRECIPE: <p>Boil</p>")
        );
    }

    #[test]
    fn missing_choices_deserialize_as_empty() {
        assert_eq!(first_content(r#"{"object":"chat.completion"}"#), None);
        assert_eq!(first_content(r#"{"choices":[{"message":{"content":null}}]}"#), None);
    }

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let client = MistralClient::new(
            "http://localhost:9999/",
            "pixtral-12b",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(client.base_url, "http://localhost:9999");
        assert_eq!(client.model(), "pixtral-12b");
    }
}
