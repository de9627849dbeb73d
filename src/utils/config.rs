use crate::llm::Provider;
use crate::types::{AppError, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Service configuration, loaded from the environment (with `.env` support).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server binding.
    pub server: ServerConfig,
    /// LLM provider selection and credentials.
    pub llm: LLMConfig,
    /// Web search provider selection and limits.
    pub search: SearchConfig,
    /// Research execution settings.
    pub research: ResearchConfig,
}

/// HTTP server binding.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

/// LLM provider selection and credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    /// `"ollama"` (default) or `"openai"`.
    pub provider: String,
    /// OpenAI API key; required when `provider` is `"openai"`.
    pub openai_api_key: Option<String>,
    /// OpenAI-compatible API base URL.
    pub openai_api_base: String,
    /// Model used with the OpenAI provider.
    pub openai_model: String,
    /// Ollama server URL.
    pub ollama_url: String,
    /// Model used with the Ollama provider.
    pub ollama_model: String,
}

/// Web search provider selection and scanning limits.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// `"daedra"` (default) or `"serper"`.
    pub provider: String,
    /// Serper API key; required when `provider` is `"serper"`.
    pub serper_api_key: Option<String>,
    /// Serper search endpoint.
    pub serper_url: String,
    /// How many candidate URLs to request per step.
    pub result_cap: usize,
    /// How many of the candidates are actually visited per step.
    pub sources_per_step: usize,
}

/// Research execution settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ResearchConfig {
    /// Directory artifacts are written under (`{output_dir}/{run_id}/...`).
    pub output_dir: String,
    /// Optional per-step timeout in seconds. Default: none, so a hung external
    /// call hangs its step indefinitely, as the original system did.
    pub step_timeout_secs: Option<u64>,
}

impl Config {
    /// Loads the configuration from environment variables, reading a `.env`
    /// file first when present. Every value has a default except provider
    /// credentials.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .map_err(|e| AppError::Internal(format!("invalid PORT: {e}")))?,
            },
            llm: LLMConfig {
                provider: env::var("LLM_PROVIDER").unwrap_or_else(|_| "ollama".to_string()),
                openai_api_key: env::var("OPENAI_API_KEY").ok(),
                openai_api_base: env::var("OPENAI_API_BASE")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                openai_model: env::var("OPENAI_MODEL")
                    .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
                ollama_url: env::var("OLLAMA_URL")
                    .unwrap_or_else(|_| "http://localhost:11434".to_string()),
                ollama_model: env::var("OLLAMA_MODEL")
                    .unwrap_or_else(|_| "llama3.2".to_string()),
            },
            search: SearchConfig {
                provider: env::var("SEARCH_PROVIDER").unwrap_or_else(|_| "daedra".to_string()),
                serper_api_key: env::var("SERPER_API_KEY").ok(),
                serper_url: env::var("SERPER_URL")
                    .unwrap_or_else(|_| "https://google.serper.dev/search".to_string()),
                result_cap: env::var("SEARCH_RESULT_CAP")
                    .unwrap_or_else(|_| "40".to_string())
                    .parse()
                    .map_err(|e| AppError::Internal(format!("invalid SEARCH_RESULT_CAP: {e}")))?,
                sources_per_step: env::var("SOURCES_PER_STEP")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .map_err(|e| AppError::Internal(format!("invalid SOURCES_PER_STEP: {e}")))?,
            },
            research: ResearchConfig {
                output_dir: env::var("OUTPUT_DIR").unwrap_or_else(|_| "./output".to_string()),
                step_timeout_secs: match env::var("STEP_TIMEOUT_SECS") {
                    Ok(raw) => Some(raw.parse().map_err(|e| {
                        AppError::Internal(format!("invalid STEP_TIMEOUT_SECS: {e}"))
                    })?),
                    Err(_) => None,
                },
            },
        })
    }

    /// The configured LLM provider.
    pub fn llm_provider(&self) -> Result<Provider> {
        match self.llm.provider.as_str() {
            "openai" => {
                let api_key = self.llm.openai_api_key.clone().ok_or_else(|| {
                    AppError::Internal(
                        "OPENAI_API_KEY is required when LLM_PROVIDER=openai".to_string(),
                    )
                })?;
                Ok(Provider::OpenAI {
                    api_key,
                    api_base: self.llm.openai_api_base.clone(),
                    model: self.llm.openai_model.clone(),
                })
            }
            "ollama" => Ok(Provider::Ollama {
                base_url: self.llm.ollama_url.clone(),
                model: self.llm.ollama_model.clone(),
            }),
            other => Err(AppError::Internal(format!(
                "unknown LLM_PROVIDER '{other}' (expected 'ollama' or 'openai')"
            ))),
        }
    }

    /// The per-step timeout, if one is configured.
    pub fn step_timeout(&self) -> Option<Duration> {
        self.research.step_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            llm: LLMConfig {
                provider: "ollama".to_string(),
                openai_api_key: None,
                openai_api_base: "https://api.openai.com/v1".to_string(),
                openai_model: "gpt-4o-mini".to_string(),
                ollama_url: "http://localhost:11434".to_string(),
                ollama_model: "llama3.2".to_string(),
            },
            search: SearchConfig {
                provider: "daedra".to_string(),
                serper_api_key: None,
                serper_url: "https://google.serper.dev/search".to_string(),
                result_cap: 40,
                sources_per_step: 10,
            },
            research: ResearchConfig {
                output_dir: "./output".to_string(),
                step_timeout_secs: None,
            },
        }
    }

    #[test]
    fn ollama_provider_is_built_from_config() {
        let config = test_config();
        let provider = config.llm_provider().unwrap();
        assert_eq!(provider.name(), "Ollama");
    }

    #[test]
    fn openai_provider_requires_api_key() {
        let mut config = test_config();
        config.llm.provider = "openai".to_string();
        assert!(config.llm_provider().is_err());

        config.llm.openai_api_key = Some("sk-test".to_string());
        assert_eq!(config.llm_provider().unwrap().name(), "OpenAI");
    }

    #[test]
    fn step_timeout_defaults_to_none() {
        let mut config = test_config();
        assert_eq!(config.step_timeout(), None);

        config.research.step_timeout_secs = Some(90);
        assert_eq!(config.step_timeout(), Some(Duration::from_secs(90)));
    }
}
