//! Client for any endpoint speaking the OpenAI chat-completion protocol; the
//! base url comes from the credentials so self-hosted relays work too.

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use logging::new_client;
use tokio::sync::mpsc::UnboundedSender;
use tracing::error;

use crate::provider::{LLMProvider, LLMProviderAPIKeys, OpenAICompatibleConfig};

use super::types::{
    LLMClient, LLMClientCompletionRequest, LLMClientCompletionResponse, LLMClientError,
};

#[derive(serde::Serialize, Debug, Clone)]
struct OpenAICompatibleMessage {
    role: String,
    content: String,
}

#[derive(serde::Serialize, Debug, Clone)]
struct OpenAICompatibleRequestChat {
    messages: Vec<OpenAICompatibleMessage>,
    model: String,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    stream: bool,
}

#[derive(serde::Deserialize, Debug)]
struct OpenAICompatibleChoiceDelta {
    content: Option<String>,
}

#[derive(serde::Deserialize, Debug)]
struct OpenAICompatibleChoice {
    delta: OpenAICompatibleChoiceDelta,
}

#[derive(serde::Deserialize, Debug)]
struct OpenAICompatibleChunk {
    #[serde(default)]
    choices: Vec<OpenAICompatibleChoice>,
}

pub struct OpenAICompatibleClient {
    client: reqwest_middleware::ClientWithMiddleware,
}

impl OpenAICompatibleClient {
    pub fn new() -> Self {
        Self {
            client: new_client(),
        }
    }

    fn chat_endpoint(config: &OpenAICompatibleConfig) -> String {
        format!("{}/chat/completions", config.api_base.trim_end_matches('/'))
    }

    fn generate_config(
        &self,
        api_key: LLMProviderAPIKeys,
    ) -> Result<OpenAICompatibleConfig, LLMClientError> {
        match api_key {
            LLMProviderAPIKeys::OpenAICompatible(config) => Ok(config),
            _ => Err(LLMClientError::WrongAPIKeyType),
        }
    }
}

#[async_trait]
impl LLMClient for OpenAICompatibleClient {
    fn client(&self) -> &LLMProvider {
        &LLMProvider::OpenAICompatible
    }

    async fn completion(
        &self,
        api_key: LLMProviderAPIKeys,
        request: LLMClientCompletionRequest,
    ) -> Result<String, LLMClientError> {
        let (sender, _receiver) = tokio::sync::mpsc::unbounded_channel();
        self.stream_completion(api_key, request, sender)
            .await
            .map(|answer| answer.answer_up_until_now().to_owned())
    }

    async fn stream_completion(
        &self,
        api_key: LLMProviderAPIKeys,
        request: LLMClientCompletionRequest,
        sender: UnboundedSender<LLMClientCompletionResponse>,
    ) -> Result<LLMClientCompletionResponse, LLMClientError> {
        let config = self.generate_config(api_key)?;
        // Compatible endpoints accept arbitrary model names, so no mapping.
        let model = request.model().to_string();
        let body = OpenAICompatibleRequestChat {
            messages: request
                .messages()
                .iter()
                .map(|message| OpenAICompatibleMessage {
                    role: message.role().to_string(),
                    content: message.content().to_owned(),
                })
                .collect(),
            model: model.to_owned(),
            temperature: request.temperature(),
            max_tokens: request.get_max_tokens(),
            stream: true,
        };
        let response = self
            .client
            .post(OpenAICompatibleClient::chat_endpoint(&config))
            .bearer_auth(config.api_key)
            .json(&body)
            .send()
            .await?;

        match response.status() {
            reqwest::StatusCode::UNAUTHORIZED => {
                return Err(LLMClientError::UnauthorizedAccess);
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                return Err(LLMClientError::RateLimitExceeded);
            }
            status if !status.is_success() => {
                error!("openai-compatible api replied with status: {}", status);
                return Err(LLMClientError::FailedToGetResponse);
            }
            _ => {}
        }

        let mut response_stream = response.bytes_stream().eventsource();
        let mut buffered_string = String::new();
        while let Some(event) = response_stream.next().await {
            match event {
                Ok(event) => {
                    if &event.data == "[DONE]" {
                        continue;
                    }
                    let value = serde_json::from_str::<OpenAICompatibleChunk>(&event.data)?;
                    if let Some(content) = value
                        .choices
                        .first()
                        .and_then(|choice| choice.delta.content.as_ref())
                    {
                        buffered_string.push_str(content);
                        if let Err(e) = sender.send(LLMClientCompletionResponse::new(
                            buffered_string.to_owned(),
                            Some(content.to_owned()),
                            model.to_owned(),
                        )) {
                            error!("failed to send completion response: {}", e);
                            return Err(LLMClientError::SendError(e));
                        }
                    }
                }
                Err(e) => {
                    error!("openai-compatible stream error encountered: {:?}", e);
                    return Err(LLMClientError::StreamError(e.to_string()));
                }
            }
        }

        Ok(LLMClientCompletionResponse::new(
            buffered_string,
            None,
            model,
        ))
    }
}
