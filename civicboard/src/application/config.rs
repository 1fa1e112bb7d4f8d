use std::path::PathBuf;

use clap::Parser;
use llm_client::clients::types::LLMType;
use llm_client::provider::{GroqAPIKey, LLMProviderAPIKeys, OpenAICompatibleConfig};

use crate::quiz::scoring::WeightPolicy;

#[derive(Parser, Debug, Clone, serde::Serialize, serde::Deserialize)]
#[clap(name = "civicboard", about = "Webserver for the civic engagement platform")]
pub struct Configuration {
    /// Host to bind the webserver to
    #[clap(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind the webserver to
    #[clap(long, default_value_t = 3000)]
    pub port: u16,

    /// Directory where the sqlite database and log files live
    #[clap(long, default_value_os_t = default_data_dir())]
    pub data_dir: PathBuf,

    /// Model requested from the completion provider for chat turns
    #[clap(long, default_value = "llama-3.3-70b-versatile")]
    pub chat_model: String,

    /// Base url of an OpenAI-compatible provider; Groq is used when unset
    #[clap(long)]
    pub llm_api_base: Option<String>,

    /// Weighting policy applied when scoring quiz submissions
    #[clap(long, value_enum, default_value_t = WeightPolicy::AgreementLabel)]
    pub scoring_policy: WeightPolicy,

    /// Log to stdout only instead of the rolling file in the data directory
    #[clap(long)]
    pub disable_file_logging: bool,
}

impl Configuration {
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("civicboard.db")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn chat_model_type(&self) -> LLMType {
        LLMType::from_model_str(&self.chat_model)
    }

    /// Resolves provider credentials from the environment, `None` when no
    /// credential is configured.
    pub fn provider_api_keys(&self) -> Option<LLMProviderAPIKeys> {
        match &self.llm_api_base {
            Some(api_base) => std::env::var("LLM_API_KEY").ok().map(|api_key| {
                LLMProviderAPIKeys::OpenAICompatible(OpenAICompatibleConfig::new(
                    api_key,
                    api_base.to_owned(),
                ))
            }),
            None => std::env::var("GROQ_API_KEY")
                .ok()
                .map(|api_key| LLMProviderAPIKeys::Groq(GroqAPIKey::new(api_key))),
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self::parse_from(["webserver"])
    }
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("de", "civicboard", "civicboard")
        .map(|dirs| dirs.data_dir().to_owned())
        .unwrap_or_else(|| PathBuf::from(".civicboard"))
}
