use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

use crate::provider::{LLMProvider, LLMProviderAPIKeys};

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LLMType {
    Llama3_3_70bVersatile,
    Llama3_1_8bInstant,
    Gemma2_9bIt,
    Custom(String),
}

impl LLMType {
    /// Maps a model string from configuration onto a known model, falling
    /// back to `Custom` for anything we do not recognize.
    pub fn from_model_str(model: &str) -> LLMType {
        match model {
            "llama-3.3-70b-versatile" => LLMType::Llama3_3_70bVersatile,
            "llama-3.1-8b-instant" => LLMType::Llama3_1_8bInstant,
            "gemma2-9b-it" => LLMType::Gemma2_9bIt,
            other => LLMType::Custom(other.to_owned()),
        }
    }
}

impl std::fmt::Display for LLMType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMType::Llama3_3_70bVersatile => write!(f, "llama-3.3-70b-versatile"),
            LLMType::Llama3_1_8bInstant => write!(f, "llama-3.1-8b-instant"),
            LLMType::Gemma2_9bIt => write!(f, "gemma2-9b-it"),
            LLMType::Custom(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LLMClientRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for LLMClientRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMClientRole::System => write!(f, "system"),
            LLMClientRole::User => write!(f, "user"),
            LLMClientRole::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LLMClientMessage {
    role: LLMClientRole,
    content: String,
}

impl LLMClientMessage {
    pub fn new(role: LLMClientRole, content: String) -> Self {
        Self { role, content }
    }

    pub fn system(content: String) -> Self {
        Self::new(LLMClientRole::System, content)
    }

    pub fn user(content: String) -> Self {
        Self::new(LLMClientRole::User, content)
    }

    pub fn assistant(content: String) -> Self {
        Self::new(LLMClientRole::Assistant, content)
    }

    pub fn role(&self) -> &LLMClientRole {
        &self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Clone)]
pub struct LLMClientCompletionRequest {
    model: LLMType,
    messages: Vec<LLMClientMessage>,
    temperature: f32,
    max_tokens: Option<usize>,
}

impl LLMClientCompletionRequest {
    pub fn new(model: LLMType, messages: Vec<LLMClientMessage>, temperature: f32) -> Self {
        Self {
            model,
            messages,
            temperature,
            max_tokens: None,
        }
    }

    pub fn set_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn model(&self) -> &LLMType {
        &self.model
    }

    pub fn messages(&self) -> &[LLMClientMessage] {
        &self.messages
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn get_max_tokens(&self) -> Option<usize> {
        self.max_tokens
    }
}

/// One streamed update: the accumulated answer so far plus the delta which
/// just arrived. The final response carries the full answer and no delta.
#[derive(Debug, Clone)]
pub struct LLMClientCompletionResponse {
    answer_up_until_now: String,
    delta: Option<String>,
    model: String,
}

impl LLMClientCompletionResponse {
    pub fn new(answer_up_until_now: String, delta: Option<String>, model: String) -> Self {
        Self {
            answer_up_until_now,
            delta,
            model,
        }
    }

    pub fn answer_up_until_now(&self) -> &str {
        &self.answer_up_until_now
    }

    pub fn delta(&self) -> Option<&str> {
        self.delta.as_deref()
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Error, Debug)]
pub enum LLMClientError {
    #[error("failed to get response back from the provider")]
    FailedToGetResponse,

    #[error("reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("http client error: {0}")]
    ReqwestMiddlewareError(#[from] reqwest_middleware::Error),

    #[error("serde failure: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("send failure over channel: {0}")]
    SendError(#[from] tokio::sync::mpsc::error::SendError<LLMClientCompletionResponse>),

    #[error("model not supported by this provider")]
    UnSupportedModel,

    #[error("no client registered for this provider")]
    UnSupportedProvider,

    #[error("wrong api key type for this provider")]
    WrongAPIKeyType,

    #[error("unauthorized access to the provider")]
    UnauthorizedAccess,

    #[error("provider rate limit exceeded")]
    RateLimitExceeded,

    #[error("provider stream error: {0}")]
    StreamError(String),
}

#[async_trait]
pub trait LLMClient {
    fn client(&self) -> &LLMProvider;

    /// Streams the completion, sending every delta over `sender` the moment
    /// it arrives. Resolves to the final accumulated response.
    async fn stream_completion(
        &self,
        api_key: LLMProviderAPIKeys,
        request: LLMClientCompletionRequest,
        sender: UnboundedSender<LLMClientCompletionResponse>,
    ) -> Result<LLMClientCompletionResponse, LLMClientError>;

    /// Non-streaming convenience wrapper over `stream_completion`.
    async fn completion(
        &self,
        api_key: LLMProviderAPIKeys,
        request: LLMClientCompletionRequest,
    ) -> Result<String, LLMClientError>;
}

#[cfg(test)]
mod tests {
    use super::LLMType;

    #[test]
    fn model_str_roundtrips_for_known_models() {
        let model = LLMType::from_model_str("llama-3.3-70b-versatile");
        assert_eq!(model, LLMType::Llama3_3_70bVersatile);
        assert_eq!(model.to_string(), "llama-3.3-70b-versatile");
    }

    #[test]
    fn unknown_models_become_custom() {
        let model = LLMType::from_model_str("some-internal-model");
        assert_eq!(model, LLMType::Custom("some-internal-model".to_owned()));
        assert_eq!(model.to_string(), "some-internal-model");
    }
}
