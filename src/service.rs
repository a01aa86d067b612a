//! High-level orchestration: ingest PDFs, answer questions via RAG.
//!
//! [`RagService`] composes the capability contracts (embedding, vector index,
//! generation) into two workflows:
//!
//! - `ingest(pdf_bytes, filename)`: extract -> chunk -> embed -> upsert under
//!   a fresh per-document namespace.
//! - `answer(doc_id, question, ...)`: embed question -> query namespace ->
//!   assemble context prompt -> generate grounded answer.
//!
//! The service is constructed once, holds no mutable state, and is shared
//! read-only across calls; the capability calls are the only blocking points.
//! Each stage is fail-fast: an embedding failure aborts the whole ingest
//! before anything is upserted, so a document is never half-indexed without
//! the caller seeing an error.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::chunk::{ChunkParams, build_chunks};
use crate::config::Settings;
use crate::embed::{Embedder, embed_all};
use crate::error::{EmbedError, PapyrusResult, ServiceError};
use crate::extract::extract_pages;
use crate::generate::AnswerGenerator;
use crate::index::{PineconeConfig, PineconeIndex, RecordMetadata, VectorIndex, VectorRecord};
use crate::openai::{OpenAiClient, OpenAiConfig};

/// Fixed system instruction for grounded answering.
const SYSTEM_INSTRUCTION: &str =
    "You are an assistant that answers questions using only the provided context. \
     If the answer is not contained in the context, state that clearly instead of improvising.";

/// Canned response when retrieval finds nothing. Returned without calling the
/// generator, so an empty namespace can never produce a fabricated answer.
const NO_CONTEXT_ANSWER: &str =
    "I could not find relevant context in the index for that question.";

/// Default sampling temperature: low-variance, mostly deterministic answers.
const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Reference previews are capped at this many characters.
const PREVIEW_CHARS: usize = 200;

/// Result of a successful ingest.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReceipt {
    /// Fresh opaque document id; also the document's index namespace.
    pub doc_id: String,
    /// Number of vectors upserted (equals the number of chunks).
    pub chunks_indexed: usize,
    /// Original filename.
    pub source: String,
}

/// One retrieved passage backing an answer.
#[derive(Debug, Clone, Serialize)]
pub struct Reference {
    /// 1-based position in the ranked results, as returned by the index.
    pub rank: usize,
    /// Page the passage came from.
    pub page: u32,
    /// Similarity score of the match.
    pub score: f32,
    /// First 200 characters of the matched text.
    pub text_preview: String,
}

/// A generated answer with its supporting references.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerOutcome {
    pub answer: String,
    pub doc_id: String,
    pub references: Vec<Reference>,
}

/// The RAG orchestrator.
///
/// Immutable after construction; capability handles are created once per
/// process and reused across concurrent calls.
pub struct RagService {
    settings: Settings,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    generator: Arc<dyn AnswerGenerator>,
}

impl RagService {
    /// Build a service from explicit capability handles.
    ///
    /// This is the seam the integration tests use to substitute in-memory
    /// capabilities for the real providers.
    pub fn new(
        settings: Settings,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Self {
        Self {
            settings,
            embedder,
            index,
            generator,
        }
    }

    /// Build a service wired to OpenAI and Pinecone.
    ///
    /// Connecting ensures the index exists and is ready, so failures here are
    /// startup failures, not per-request surprises.
    pub fn connect(settings: Settings) -> PapyrusResult<Self> {
        let openai = Arc::new(OpenAiClient::new(OpenAiConfig {
            api_key: settings.openai_api_key.clone(),
            embedding_model: settings.openai_embedding_model.clone(),
            chat_model: settings.openai_chat_model.clone(),
            embedding_batch_size: settings.embedding_batch_size,
            ..Default::default()
        }));
        let index = Arc::new(PineconeIndex::connect(&PineconeConfig {
            api_key: settings.pinecone_api_key.clone(),
            index_name: settings.pinecone_index_name.clone(),
            cloud: settings.pinecone_cloud.clone(),
            region: settings.pinecone_region.clone(),
            dimension: settings.embedding_dimensions,
            ..Default::default()
        })?);
        Ok(Self::new(settings, openai.clone(), index, openai))
    }

    /// The effective settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Ingest a PDF: extract, chunk, embed, and index it under a fresh
    /// per-document namespace.
    pub fn ingest(&self, pdf_bytes: &[u8], filename: &str) -> PapyrusResult<IngestReceipt> {
        let pages = extract_pages(pdf_bytes)?;
        if pages.is_empty() {
            return Err(ServiceError::NoReadableText {
                filename: filename.to_string(),
            }
            .into());
        }

        let params = ChunkParams {
            chunk_size: self.settings.chunk_size,
            overlap: self.settings.chunk_overlap,
        };
        let chunks = build_chunks(&pages, &params)?;
        if chunks.is_empty() {
            return Err(ServiceError::NoChunksProduced {
                filename: filename.to_string(),
            }
            .into());
        }

        let doc_id = Uuid::new_v4().to_string();
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();

        // Any batch failure aborts the ingest before anything is upserted.
        let vectors = embed_all(self.embedder.as_ref(), &texts)?;

        let records: Vec<VectorRecord> = chunks
            .iter()
            .zip(vectors)
            .enumerate()
            .map(|(i, (chunk, values))| VectorRecord {
                id: format!("{doc_id}-{i}"),
                values,
                metadata: RecordMetadata {
                    text: chunk.text.clone(),
                    page: chunk.page,
                    chunk_index: chunk.index,
                    source: filename.to_string(),
                    doc_id: doc_id.clone(),
                },
            })
            .collect();

        self.index.upsert(&records, &doc_id)?;

        tracing::info!(
            doc_id = %doc_id,
            source = filename,
            pages = pages.len(),
            chunks = records.len(),
            "ingested document"
        );
        Ok(IngestReceipt {
            doc_id,
            chunks_indexed: records.len(),
            source: filename.to_string(),
        })
    }

    /// Answer a question against a previously ingested document.
    pub fn answer(
        &self,
        doc_id: &str,
        question: &str,
        top_k: Option<usize>,
        temperature: Option<f32>,
    ) -> PapyrusResult<AnswerOutcome> {
        if doc_id.trim().is_empty() {
            return Err(ServiceError::InvalidRequest {
                message: "doc_id is required".into(),
            }
            .into());
        }
        if question.trim().is_empty() {
            return Err(ServiceError::InvalidRequest {
                message: "question is required".into(),
            }
            .into());
        }

        // The question goes through the same capability as the chunks,
        // as a single-element batch.
        let query_vector = embed_all(self.embedder.as_ref(), &[question.to_string()])?
            .into_iter()
            .next()
            .ok_or(EmbedError::CountMismatch {
                sent: 1,
                received: 0,
            })?;

        let top_k = top_k.unwrap_or(self.settings.retrieval_top_k);
        let matches = self.index.query(&query_vector, doc_id, top_k)?;

        if matches.is_empty() {
            // Deliberate short-circuit: no retrieval, no generation. An
            // unknown namespace yields zero matches, not an error.
            tracing::info!(doc_id, "no matches in namespace, returning canned answer");
            return Ok(AnswerOutcome {
                answer: NO_CONTEXT_ANSWER.to_string(),
                doc_id: doc_id.to_string(),
                references: Vec::new(),
            });
        }

        let mut context_lines = Vec::with_capacity(matches.len());
        let mut references = Vec::with_capacity(matches.len());
        for (rank, m) in matches.iter().enumerate() {
            // Normalized-shape tolerance: a match without metadata still
            // counts, it just carries nothing to show.
            let (text, page) = match &m.metadata {
                Some(meta) => (meta.text.as_str(), meta.page),
                None => ("", 0),
            };
            context_lines.push(format!("[Page {page}] {text}"));
            references.push(Reference {
                rank: rank + 1,
                page,
                score: m.score,
                text_preview: text.chars().take(PREVIEW_CHARS).collect(),
            });
        }

        let context_block = context_lines.join("\n\n");
        let user_prompt = build_user_prompt(&context_block, question);
        let temperature = temperature.unwrap_or(DEFAULT_TEMPERATURE);

        let completion = self
            .generator
            .complete(SYSTEM_INSTRUCTION, &user_prompt, temperature)?;

        tracing::info!(
            doc_id,
            matches = references.len(),
            top_k,
            "answered question"
        );
        Ok(AnswerOutcome {
            answer: completion.trim().to_string(),
            doc_id: doc_id.to_string(),
            references,
        })
    }
}

/// Assemble the user prompt: context block, verbatim question, citation nudge.
fn build_user_prompt(context_block: &str, question: &str) -> String {
    format!(
        "Context:\n{context_block}\n\n\
         Question: {question}\n\
         Answer using the context above and cite page numbers when helpful."
    )
}

/// The canned answer returned when retrieval finds nothing.
pub fn no_context_answer() -> &'static str {
    NO_CONTEXT_ANSWER
}
