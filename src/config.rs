//! Startup configuration, loaded from the environment and validated eagerly.
//!
//! Missing credentials or invariant-violating chunk parameters fail process
//! startup immediately; nothing in the request path re-reads the environment.

use crate::error::ConfigError;

/// Central configuration for the papyrus-rag pipeline.
///
/// Constructed once per process and shared read-only across requests.
#[derive(Debug, Clone)]
pub struct Settings {
    /// OpenAI API key (required).
    pub openai_api_key: String,
    /// Pinecone API key (required).
    pub pinecone_api_key: String,
    /// Pinecone index name.
    pub pinecone_index_name: String,
    /// Serverless cloud placement for index creation.
    pub pinecone_cloud: String,
    /// Serverless region for index creation.
    pub pinecone_region: String,
    /// Chat completion model identifier.
    pub openai_chat_model: String,
    /// Embedding model identifier.
    pub openai_embedding_model: String,
    /// Output dimensionality of the embedding model.
    pub embedding_dimensions: usize,
    /// Window size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive windows, in characters.
    pub chunk_overlap: usize,
    /// Maximum texts per embedding call.
    pub embedding_batch_size: usize,
    /// Default number of matches retrieved per question.
    pub retrieval_top_k: usize,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from an arbitrary key lookup.
    ///
    /// Split out from [`Settings::from_env`] so tests can supply values
    /// without mutating the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let settings = Self {
            openai_api_key: require(&lookup, "OPENAI_API_KEY")?,
            pinecone_api_key: require(&lookup, "PINECONE_API_KEY")?,
            pinecone_index_name: optional(&lookup, "PINECONE_INDEX_NAME", "papyrus-index"),
            pinecone_cloud: optional(&lookup, "PINECONE_CLOUD", "aws"),
            pinecone_region: optional(&lookup, "PINECONE_REGION", "us-east-1"),
            openai_chat_model: optional(&lookup, "OPENAI_CHAT_MODEL", "gpt-4o-mini"),
            openai_embedding_model: optional(
                &lookup,
                "OPENAI_EMBEDDING_MODEL",
                "text-embedding-3-small",
            ),
            embedding_dimensions: numeric(&lookup, "EMBEDDING_DIMENSIONS", 1536)?,
            chunk_size: numeric(&lookup, "CHUNK_SIZE", 1200)?,
            chunk_overlap: numeric(&lookup, "CHUNK_OVERLAP", 200)?,
            embedding_batch_size: numeric(&lookup, "EMBEDDING_BATCH_SIZE", 64)?,
            retrieval_top_k: numeric(&lookup, "RETRIEVAL_TOP_K", 5)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check cross-field invariants.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "CHUNK_SIZE".into(),
                message: "must be positive".into(),
            });
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::InvalidValue {
                name: "CHUNK_OVERLAP".into(),
                message: format!(
                    "must be strictly smaller than CHUNK_SIZE ({})",
                    self.chunk_size
                ),
            });
        }
        if self.embedding_batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "EMBEDDING_BATCH_SIZE".into(),
                message: "must be positive".into(),
            });
        }
        if self.retrieval_top_k == 0 {
            return Err(ConfigError::InvalidValue {
                name: "RETRIEVAL_TOP_K".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.embedding_dimensions == 0 {
            return Err(ConfigError::InvalidValue {
                name: "EMBEDDING_DIMENSIONS".into(),
                message: "must be positive".into(),
            });
        }
        Ok(())
    }
}

fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<String, ConfigError> {
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingCredential { name: key.into() }),
    }
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

fn numeric(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: usize,
) -> Result<usize, ConfigError> {
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => {
            value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: key.into(),
                message: format!("expected an integer, got \"{value}\""),
            })
        }
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("OPENAI_API_KEY", "sk-test"),
            ("PINECONE_API_KEY", "pc-test"),
        ])
    }

    fn load(env: &HashMap<&str, &str>) -> Result<Settings, ConfigError> {
        Settings::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_applied() {
        let settings = load(&base_env()).unwrap();
        assert_eq!(settings.chunk_size, 1200);
        assert_eq!(settings.chunk_overlap, 200);
        assert_eq!(settings.embedding_batch_size, 64);
        assert_eq!(settings.retrieval_top_k, 5);
        assert_eq!(settings.embedding_dimensions, 1536);
        assert_eq!(settings.pinecone_index_name, "papyrus-index");
        assert_eq!(settings.openai_chat_model, "gpt-4o-mini");
    }

    #[test]
    fn missing_credential_fails() {
        let mut env = base_env();
        env.remove("OPENAI_API_KEY");
        let err = load(&env).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { name } if name == "OPENAI_API_KEY"));
    }

    #[test]
    fn blank_credential_fails() {
        let mut env = base_env();
        env.insert("PINECONE_API_KEY", "  ");
        assert!(load(&env).is_err());
    }

    #[test]
    fn overlap_must_be_below_chunk_size() {
        let mut env = base_env();
        env.insert("CHUNK_SIZE", "10");
        env.insert("CHUNK_OVERLAP", "10");
        let err = load(&env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name, .. } if name == "CHUNK_OVERLAP"));
    }

    #[test]
    fn non_numeric_value_fails() {
        let mut env = base_env();
        env.insert("CHUNK_SIZE", "twelve");
        assert!(load(&env).is_err());
    }

    #[test]
    fn explicit_overrides_win() {
        let mut env = base_env();
        env.insert("CHUNK_SIZE", "800");
        env.insert("RETRIEVAL_TOP_K", "3");
        let settings = load(&env).unwrap();
        assert_eq!(settings.chunk_size, 800);
        assert_eq!(settings.retrieval_top_k, 3);
    }
}
