//! Client for the Groq inference API, which speaks the OpenAI-style
//! chat-completion protocol over server sent events.

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use logging::new_client;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error};

use crate::provider::{LLMProvider, LLMProviderAPIKeys};

use super::types::{
    LLMClient, LLMClientCompletionRequest, LLMClientCompletionResponse, LLMClientError, LLMType,
};

#[derive(serde::Serialize, Debug, Clone)]
struct GroqMessage {
    role: String,
    content: String,
}

#[derive(serde::Serialize, Debug, Clone)]
struct GroqRequestChat {
    messages: Vec<GroqMessage>,
    model: String,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    stream: bool,
}

impl GroqRequestChat {
    fn from_request(request: &LLMClientCompletionRequest, model: String) -> GroqRequestChat {
        GroqRequestChat {
            messages: request
                .messages()
                .iter()
                .map(|message| GroqMessage {
                    role: message.role().to_string(),
                    content: message.content().to_owned(),
                })
                .collect(),
            model,
            temperature: request.temperature(),
            max_tokens: request.get_max_tokens(),
            stream: true,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
struct GroqUsage {
    prompt_tokens: usize,
    total_tokens: usize,
    completion_tokens: usize,
}

#[derive(serde::Deserialize, Debug)]
struct GroqChoiceDelta {
    content: Option<String>,
}

#[derive(serde::Deserialize, Debug)]
struct GroqChoice {
    delta: GroqChoiceDelta,
}

// The terminal chunk carries usage but no choices, so both are optional.
#[derive(serde::Deserialize, Debug)]
struct GroqChatCompletionChunk {
    #[serde(default)]
    choices: Vec<GroqChoice>,
    usage: Option<GroqUsage>,
}

pub struct GroqClient {
    client: reqwest_middleware::ClientWithMiddleware,
    base_url: String,
}

impl GroqClient {
    pub fn new() -> Self {
        Self {
            client: new_client(),
            base_url: "https://api.groq.com/openai/v1".to_owned(),
        }
    }

    fn chat_endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn model_str(model: &LLMType) -> Option<String> {
        match model {
            LLMType::Llama3_3_70bVersatile => Some("llama-3.3-70b-versatile".to_owned()),
            LLMType::Llama3_1_8bInstant => Some("llama-3.1-8b-instant".to_owned()),
            LLMType::Gemma2_9bIt => Some("gemma2-9b-it".to_owned()),
            LLMType::Custom(name) => Some(name.to_owned()),
        }
    }

    fn generate_groq_bearer_token(
        &self,
        api_key: LLMProviderAPIKeys,
    ) -> Result<String, LLMClientError> {
        match api_key {
            LLMProviderAPIKeys::Groq(api_key) => Ok(api_key.api_key),
            _ => Err(LLMClientError::WrongAPIKeyType),
        }
    }
}

#[async_trait]
impl LLMClient for GroqClient {
    fn client(&self) -> &LLMProvider {
        &LLMProvider::Groq
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
        let model =
            GroqClient::model_str(request.model()).ok_or(LLMClientError::UnSupportedModel)?;
        let bearer_token = self.generate_groq_bearer_token(api_key)?;
        let body = GroqRequestChat::from_request(&request, model.to_owned());
        let response = self
            .client
            .post(self.chat_endpoint())
            .bearer_auth(bearer_token)
            .json(&body)
            .send()
            .await?;

        match response.status() {
            reqwest::StatusCode::UNAUTHORIZED => {
                error!("unauthorized access to the groq api");
                return Err(LLMClientError::UnauthorizedAccess);
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                return Err(LLMClientError::RateLimitExceeded);
            }
            status if !status.is_success() => {
                error!("groq api replied with status: {}", status);
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
                    let value = serde_json::from_str::<GroqChatCompletionChunk>(&event.data)?;
                    if let Some(usage) = value.usage {
                        debug!("groq::stream_completion::usage: {:?}", usage);
                    }
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
                    error!("groq stream error encountered: {:?}", e);
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
