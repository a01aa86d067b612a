//! Namespaced vector index capability and its Pinecone REST adapter.
//!
//! Provider response shapes are normalized into fixed internal types
//! ([`QueryMatch`], [`RecordMetadata`]) immediately at this boundary; the
//! orchestrator never sees a provider payload.
//!
//! Index creation and readiness polling are a one-time startup concern,
//! handled in [`PineconeIndex::connect`]. Request-path calls assume a ready
//! index and surface provider failures without masking them.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::IndexError;

/// Metadata stored alongside each vector and returned with query matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Full chunk text.
    pub text: String,
    /// 1-based page number of the chunk.
    pub page: u32,
    /// Per-page chunk ordinal.
    pub chunk_index: u32,
    /// Original filename of the ingested document.
    pub source: String,
    /// Owning document id (equal to the record's namespace).
    pub doc_id: String,
}

/// One vector record: id, values, metadata.
#[derive(Debug, Clone, Serialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: RecordMetadata,
}

/// One ranked similarity match, already normalized.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<RecordMetadata>,
}

/// Capability contract for a namespaced vector store.
///
/// `query` returns matches ordered by descending similarity; an unknown or
/// empty namespace yields `Ok(vec![])`, never an error.
pub trait VectorIndex: Send + Sync {
    /// Replace-or-insert records by id within a namespace. No-op for an
    /// empty record list.
    fn upsert(&self, records: &[VectorRecord], namespace: &str) -> Result<(), IndexError>;

    /// Similarity query within a namespace, metadata included.
    fn query(
        &self,
        vector: &[f32],
        namespace: &str,
        top_k: usize,
    ) -> Result<Vec<QueryMatch>, IndexError>;
}

/// Configuration for the Pinecone adapter.
#[derive(Debug, Clone)]
pub struct PineconeConfig {
    /// API key for both control and data planes.
    pub api_key: String,
    /// Index name to describe or create.
    pub index_name: String,
    /// Serverless cloud for index creation.
    pub cloud: String,
    /// Serverless region for index creation.
    pub region: String,
    /// Vector dimension for index creation.
    pub dimension: usize,
    /// Control-plane base URL.
    pub control_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Overall readiness-poll timeout in seconds.
    pub readiness_timeout_secs: u64,
    /// Sleep between readiness polls in seconds.
    pub readiness_poll_secs: u64,
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            index_name: "papyrus-index".into(),
            cloud: "aws".into(),
            region: "us-east-1".into(),
            dimension: 1536,
            control_url: "https://api.pinecone.io".into(),
            timeout_secs: 30,
            readiness_timeout_secs: 120,
            readiness_poll_secs: 2,
        }
    }
}

const API_VERSION: &str = "2025-01";

/// Pinecone-backed [`VectorIndex`] over the REST API.
#[derive(Debug)]
pub struct PineconeIndex {
    api_key: String,
    /// Data-plane base URL (`https://{host}`), resolved at connect time.
    data_url: String,
    timeout_secs: u64,
}

impl PineconeIndex {
    /// Connect to the index, creating it if absent and waiting until ready.
    ///
    /// This is the startup precondition for every upsert/query: after
    /// `connect` returns, the request path never re-checks readiness.
    pub fn connect(config: &PineconeConfig) -> Result<Self, IndexError> {
        let description = match describe_index(config)? {
            Some(description) => description,
            None => {
                tracing::info!(index = %config.index_name, "index not found, creating");
                create_index(config)?;
                wait_until_ready(config)?
            }
        };

        let description = if description.ready() {
            description
        } else {
            wait_until_ready(config)?
        };

        tracing::info!(index = %config.index_name, host = %description.host, "index ready");
        Ok(Self {
            api_key: config.api_key.clone(),
            data_url: format!("https://{}", description.host),
            timeout_secs: config.timeout_secs,
        })
    }

    #[cfg(test)]
    fn test_handle(data_url: &str) -> Self {
        Self {
            api_key: "test-key".into(),
            data_url: data_url.into(),
            timeout_secs: 1,
        }
    }

    fn agent(&self) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
    }
}

impl VectorIndex for PineconeIndex {
    fn upsert(&self, records: &[VectorRecord], namespace: &str) -> Result<(), IndexError> {
        if records.is_empty() {
            return Ok(());
        }

        let url = format!("{}/vectors/upsert", self.data_url);
        let body = serde_json::json!({
            "vectors": records,
            "namespace": namespace,
        });

        let response = self
            .agent()
            .post(&url)
            .set("Api-Key", &self.api_key)
            .set("X-Pinecone-API-Version", API_VERSION)
            .send_json(body)
            .map_err(map_data_error)?;

        tracing::debug!(
            namespace,
            records = records.len(),
            status = response.status(),
            "upserted vectors"
        );
        Ok(())
    }

    fn query(
        &self,
        vector: &[f32],
        namespace: &str,
        top_k: usize,
    ) -> Result<Vec<QueryMatch>, IndexError> {
        let url = format!("{}/query", self.data_url);
        let body = serde_json::json!({
            "vector": vector,
            "namespace": namespace,
            "topK": top_k,
            "includeMetadata": true,
        });

        let response = self
            .agent()
            .post(&url)
            .set("Api-Key", &self.api_key)
            .set("X-Pinecone-API-Version", API_VERSION)
            .send_json(body)
            .map_err(map_data_error)?;

        let parsed: QueryResponse =
            response
                .into_json()
                .map_err(|e| IndexError::MalformedResponse {
                    message: e.to_string(),
                })?;

        tracing::debug!(namespace, top_k, matches = parsed.matches.len(), "queried index");
        Ok(parsed.matches)
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    host: String,
    #[serde(default)]
    status: IndexStatus,
}

#[derive(Debug, Default, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

impl IndexDescription {
    fn ready(&self) -> bool {
        self.status.ready
    }
}

/// Describe the index; `Ok(None)` when it does not exist yet.
fn describe_index(config: &PineconeConfig) -> Result<Option<IndexDescription>, IndexError> {
    let url = format!("{}/indexes/{}", config.control_url, config.index_name);
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build();

    match agent
        .get(&url)
        .set("Api-Key", &config.api_key)
        .set("X-Pinecone-API-Version", API_VERSION)
        .call()
    {
        Ok(response) => {
            let description: IndexDescription =
                response
                    .into_json()
                    .map_err(|e| IndexError::MalformedResponse {
                        message: e.to_string(),
                    })?;
            Ok(Some(description))
        }
        Err(ureq::Error::Status(404, _)) => Ok(None),
        Err(e) => Err(map_control_error(e)),
    }
}

/// Create a serverless index with cosine metric.
fn create_index(config: &PineconeConfig) -> Result<(), IndexError> {
    let url = format!("{}/indexes", config.control_url);
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build();

    let body = serde_json::json!({
        "name": config.index_name,
        "dimension": config.dimension,
        "metric": "cosine",
        "spec": {
            "serverless": {
                "cloud": config.cloud,
                "region": config.region,
            }
        }
    });

    agent
        .post(&url)
        .set("Api-Key", &config.api_key)
        .set("X-Pinecone-API-Version", API_VERSION)
        .send_json(body)
        .map_err(map_control_error)?;
    Ok(())
}

/// Poll until the index reports ready, with a fixed sleep and overall timeout.
fn wait_until_ready(config: &PineconeConfig) -> Result<IndexDescription, IndexError> {
    let started = Instant::now();
    let deadline = Duration::from_secs(config.readiness_timeout_secs);

    loop {
        if let Some(description) = describe_index(config)? {
            if description.ready() {
                return Ok(description);
            }
        }
        if started.elapsed() >= deadline {
            return Err(IndexError::NotReady {
                name: config.index_name.clone(),
                timeout_secs: config.readiness_timeout_secs,
            });
        }
        tracing::debug!(index = %config.index_name, "index not ready yet, polling");
        std::thread::sleep(Duration::from_secs(config.readiness_poll_secs));
    }
}

fn map_control_error(error: ureq::Error) -> IndexError {
    match error {
        ureq::Error::Status(code, response) => IndexError::RequestFailed {
            message: format!(
                "control plane returned status {code}: {}",
                response.into_string().unwrap_or_default()
            ),
        },
        ureq::Error::Transport(t) => IndexError::Unavailable {
            message: t.to_string(),
        },
    }
}

fn map_data_error(error: ureq::Error) -> IndexError {
    match error {
        ureq::Error::Status(code, response) => IndexError::RequestFailed {
            message: format!(
                "index returned status {code}: {}",
                response.into_string().unwrap_or_default()
            ),
        },
        ureq::Error::Transport(t) => IndexError::Unavailable {
            message: t.to_string(),
        },
    }
}
