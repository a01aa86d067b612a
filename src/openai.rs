//! OpenAI client for embeddings and chat completions.
//!
//! One client implements both capability contracts consumed by the
//! orchestrator: [`Embedder`] via `/v1/embeddings` and [`AnswerGenerator`]
//! via `/v1/chat/completions`. Responses are normalized here; embedding
//! vectors are re-ordered by the provider's `index` field so output order
//! always matches input order regardless of response ordering.

use std::time::Duration;

use serde::Deserialize;

use crate::embed::Embedder;
use crate::error::{EmbedError, GenerateError};
use crate::generate::AnswerGenerator;

/// Configuration for the OpenAI client.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key.
    pub api_key: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Embedding model name.
    pub embedding_model: String,
    /// Chat completion model name.
    pub chat_model: String,
    /// Maximum texts per embedding request.
    pub embedding_batch_size: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".into(),
            embedding_model: "text-embedding-3-small".into(),
            chat_model: "gpt-4o-mini".into(),
            embedding_batch_size: 64,
            timeout_secs: 60,
        }
    }
}

/// Client for the OpenAI REST API.
pub struct OpenAiClient {
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: OpenAiConfig) -> Self {
        Self { config }
    }

    fn agent(&self) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingRecord>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRecord {
    index: usize,
    embedding: Vec<f32>,
}

impl Embedder for OpenAiClient {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.len() > self.config.embedding_batch_size {
            return Err(EmbedError::BatchTooLarge {
                size: texts.len(),
                limit: self.config.embedding_batch_size,
            });
        }
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.config.base_url);
        let body = serde_json::json!({
            "model": self.config.embedding_model,
            "input": texts,
        });

        let response = self
            .agent()
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.config.api_key))
            .send_json(body)
            .map_err(|e| EmbedError::RequestFailed {
                message: request_error_message(e),
            })?;

        let parsed: EmbeddingResponse =
            response
                .into_json()
                .map_err(|e| EmbedError::MalformedResponse {
                    message: e.to_string(),
                })?;

        if parsed.data.len() != texts.len() {
            return Err(EmbedError::CountMismatch {
                sent: texts.len(),
                received: parsed.data.len(),
            });
        }

        // The API is ordered in practice, but the contract only promises the
        // `index` field, so re-order by it.
        let mut records = parsed.data;
        records.sort_by_key(|r| r.index);
        Ok(records.into_iter().map(|r| r.embedding).collect())
    }

    fn max_batch(&self) -> usize {
        self.config.embedding_batch_size
    }
}

impl AnswerGenerator for OpenAiClient {
    fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, GenerateError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = serde_json::json!({
            "model": self.config.chat_model,
            "temperature": temperature,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });

        let response = self
            .agent()
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.config.api_key))
            .send_json(body)
            .map_err(|e| GenerateError::RequestFailed {
                message: request_error_message(e),
            })?;

        let json: serde_json::Value =
            response
                .into_json()
                .map_err(|e| GenerateError::MalformedResponse {
                    message: e.to_string(),
                })?;

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| GenerateError::MalformedResponse {
                message: "missing 'choices[0].message.content' field".into(),
            })
    }
}

fn request_error_message(error: ureq::Error) -> String {
    match error {
        ureq::Error::Status(code, response) => format!(
            "provider returned status {code}: {}",
            response.into_string().unwrap_or_default()
        ),
        ureq::Error::Transport(t) => t.to_string(),
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.config.base_url)
            .field("embedding_model", &self.config.embedding_model)
            .field("chat_model", &self.config.chat_model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_client() -> OpenAiClient {
        OpenAiClient::new(OpenAiConfig {
            base_url: "http://127.0.0.1:1".into(), // unreachable port
            timeout_secs: 1,
            ..Default::default()
        })
    }

    #[test]
    fn embed_when_unreachable_returns_error() {
        let client = unreachable_client();
        let result = client.embed(&["hello".to_string()]);
        assert!(matches!(result, Err(EmbedError::RequestFailed { .. })));
    }

    #[test]
    fn complete_when_unreachable_returns_error() {
        let client = unreachable_client();
        let result = client.complete("system", "user", 0.2);
        assert!(matches!(result, Err(GenerateError::RequestFailed { .. })));
    }

    #[test]
    fn oversized_batch_rejected_without_request() {
        let client = unreachable_client();
        let texts: Vec<String> = (0..65).map(|i| i.to_string()).collect();
        let err = client.embed(&texts).unwrap_err();
        assert!(matches!(
            err,
            EmbedError::BatchTooLarge { size: 65, limit: 64 }
        ));
    }

    #[test]
    fn empty_batch_needs_no_request() {
        let client = unreachable_client();
        assert!(client.embed(&[]).unwrap().is_empty());
    }

    #[test]
    fn embedding_records_reordered_by_index() {
        let raw = r#"{"data":[
            {"index":1,"embedding":[2.0]},
            {"index":0,"embedding":[1.0]}
        ]}"#;
        let mut parsed: EmbeddingResponse = serde_json::from_str(raw).unwrap();
        parsed.data.sort_by_key(|r| r.index);
        assert_eq!(parsed.data[0].embedding, vec![1.0]);
        assert_eq!(parsed.data[1].embedding, vec![2.0]);
    }

    #[test]
    fn default_config_values() {
        let config = OpenAiConfig::default();
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.embedding_batch_size, 64);
        assert_eq!(config.chat_model, "gpt-4o-mini");
    }
}
