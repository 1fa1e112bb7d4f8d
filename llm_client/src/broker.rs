//! Maps providers to their clients so callers only have to hand over
//! credentials and a request.

use std::collections::HashMap;

use tokio::sync::mpsc::UnboundedSender;

use crate::clients::groq::GroqClient;
use crate::clients::openai_compatible::OpenAICompatibleClient;
use crate::clients::types::{
    LLMClient, LLMClientCompletionRequest, LLMClientCompletionResponse, LLMClientError,
};
use crate::provider::{LLMProvider, LLMProviderAPIKeys};

pub struct LLMBroker {
    providers: HashMap<LLMProvider, Box<dyn LLMClient + Send + Sync>>,
}

impl LLMBroker {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
        .add_provider(LLMProvider::Groq, Box::new(GroqClient::new()))
        .add_provider(
            LLMProvider::OpenAICompatible,
            Box::new(OpenAICompatibleClient::new()),
        )
    }

    /// Registers a client for a provider, replacing any existing one. Tests
    /// use this to swap in scripted clients.
    pub fn add_provider(
        mut self,
        provider: LLMProvider,
        client: Box<dyn LLMClient + Send + Sync>,
    ) -> Self {
        self.providers.insert(provider, client);
        self
    }

    fn get_client(
        &self,
        api_key: &LLMProviderAPIKeys,
    ) -> Result<&(dyn LLMClient + Send + Sync), LLMClientError> {
        self.providers
            .get(&api_key.provider())
            .map(|client| client.as_ref())
            .ok_or(LLMClientError::UnSupportedProvider)
    }

    pub async fn stream_completion(
        &self,
        api_key: LLMProviderAPIKeys,
        request: LLMClientCompletionRequest,
        sender: UnboundedSender<LLMClientCompletionResponse>,
    ) -> Result<LLMClientCompletionResponse, LLMClientError> {
        let client = self.get_client(&api_key)?;
        client.stream_completion(api_key, request, sender).await
    }

    pub async fn completion(
        &self,
        api_key: LLMProviderAPIKeys,
        request: LLMClientCompletionRequest,
    ) -> Result<String, LLMClientError> {
        let client = self.get_client(&api_key)?;
        client.completion(api_key, request).await
    }
}
