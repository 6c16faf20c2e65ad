use openrouter_api::{
    models::provider_preferences::ProviderPreferences,
    models::provider_preferences::ProviderSort,
    types::chat::{ChatCompletionRequest, Message},
};
use serde::Serialize;

use super::GenerationError;

pub const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 8192;
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// OpenRouter's web plugin shorthand: the provider fetches/searches the web itself.
const ONLINE_SUFFIX: &str = ":online";

#[derive(Debug)]
pub struct OpenRouterClient {
    client: openrouter_api::OpenRouterClient<openrouter_api::Ready>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelConfig {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

impl ModelConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: Some(DEFAULT_TEMPERATURE),
            max_tokens: Some(DEFAULT_MAX_TOKENS),
        }
    }

    /// Same configuration with web access enabled on the model.
    pub fn online(&self) -> Self {
        let mut config = self.clone();
        if !config.model.ends_with(ONLINE_SUFFIX) {
            config.model.push_str(ONLINE_SUFFIX);
        }
        config
    }
}

pub fn api_key_present() -> bool {
    std::env::var(API_KEY_ENV).is_ok_and(|key| !key.trim().is_empty())
}

impl OpenRouterClient {
    pub fn new() -> Result<Self, GenerationError> {
        let client = openrouter_api::OpenRouterClient::quick().map_err(|e| {
            GenerationError::Client(format!("Failed to create OpenRouter client: {}", e))
        })?;

        Ok(Self { client })
    }

    /// Sends one system + user exchange and returns the text of the first choice.
    pub async fn complete(
        &self,
        system: &str,
        prompt: &str,
        config: &ModelConfig,
    ) -> Result<String, GenerationError> {
        let messages = vec![Message::text("system", system), Message::text("user", prompt)];

        let provider = ProviderPreferences::new().with_sort(ProviderSort::Throughput);

        let request = ChatCompletionRequest {
            model: config.model.clone(),
            messages,
            provider: Some(provider),
            stream: None,
            response_format: None,
            tools: None,
            tool_choice: None,
            models: None,
            transforms: None,
            route: None,
            user: None,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: None,
            top_k: None,
            frequency_penalty: None,
            presence_penalty: None,
            repetition_penalty: None,
            min_p: None,
            top_a: None,
            seed: None,
            stop: None,
            logit_bias: None,
            logprobs: None,
            top_logprobs: None,
            prediction: None,
            parallel_tool_calls: None,
            verbosity: None,
        };

        let response = self
            .client
            .chat()
            .map_err(|e| {
                GenerationError::Client(format!("OpenRouter chat API unavailable: {}", e))
            })?
            .chat_completion(request)
            .await
            .map_err(|e| GenerationError::Service(format!("OpenRouter API error: {}", e)))?;

        let Some(choice) = response.choices.first() else {
            return Err(GenerationError::Service(
                "No response choices received".to_string(),
            ));
        };

        match &choice.message.content {
            openrouter_api::MessageContent::Text(text) => Ok(text.clone()),
            openrouter_api::MessageContent::Parts(parts) => {
                let text_parts: Vec<String> = parts
                    .iter()
                    .filter_map(|p| {
                        if let openrouter_api::ContentPart::Text(tc) = p {
                            Some(tc.text.clone())
                        } else {
                            None
                        }
                    })
                    .collect();
                Ok(text_parts.join("\n"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_online_suffix_added_once() {
        let config = ModelConfig::new("openai/gpt-4o-mini");
        let online = config.online();
        assert_eq!(online.model, "openai/gpt-4o-mini:online");
        assert_eq!(online.online().model, "openai/gpt-4o-mini:online");
        assert_eq!(config.model, "openai/gpt-4o-mini");
    }

    #[test]
    fn test_default_model_config() {
        let config = ModelConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.temperature, Some(DEFAULT_TEMPERATURE));
    }

    #[test]
    fn test_model_config_serialization_skips_none() {
        let config = ModelConfig {
            model: "m".to_string(),
            temperature: None,
            max_tokens: None,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"model":"m"}"#);
    }
}
