//! The providers we can talk to, and the credentials each one expects.

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LLMProvider {
    Groq,
    OpenAICompatible,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GroqAPIKey {
    pub api_key: String,
}

impl GroqAPIKey {
    pub fn new(api_key: String) -> Self {
        Self { api_key }
    }
}

/// Credentials for any endpoint speaking the OpenAI chat-completion protocol,
/// for example a self-hosted relay.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OpenAICompatibleConfig {
    pub api_key: String,
    pub api_base: String,
}

impl OpenAICompatibleConfig {
    pub fn new(api_key: String, api_base: String) -> Self {
        Self { api_key, api_base }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum LLMProviderAPIKeys {
    Groq(GroqAPIKey),
    OpenAICompatible(OpenAICompatibleConfig),
}

impl LLMProviderAPIKeys {
    pub fn provider(&self) -> LLMProvider {
        match self {
            LLMProviderAPIKeys::Groq(_) => LLMProvider::Groq,
            LLMProviderAPIKeys::OpenAICompatible(_) => LLMProvider::OpenAICompatible,
        }
    }
}
