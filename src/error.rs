//! Rich diagnostic error types for the papyrus-rag pipeline.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.
//!
//! The taxonomy separates client-shaped failures (bad document, bad request,
//! bad configuration) from capability-layer failures (embedding provider,
//! vector index, generation provider). The orchestrator never reinterprets a
//! capability failure; it surfaces it with the underlying cause intact.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the papyrus-rag pipeline.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain (error codes, help text, source chains) through to the
/// caller.
#[derive(Debug, Error, Diagnostic)]
pub enum PapyrusError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Chunk(#[from] ChunkError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Embed(#[from] EmbedError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Service(#[from] ServiceError),
}

/// Convenience alias for pipeline results.
pub type PapyrusResult<T> = std::result::Result<T, PapyrusError>;

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("required environment variable '{name}' is missing")]
    #[diagnostic(
        code(papyrus::config::missing_credential),
        help(
            "Export the variable before starting. Both OPENAI_API_KEY and \
             PINECONE_API_KEY are required; there is no lazy or partial startup."
        )
    )]
    MissingCredential { name: String },

    #[error("invalid value for '{name}': {message}")]
    #[diagnostic(
        code(papyrus::config::invalid_value),
        help(
            "Fix the environment variable and restart. Chunking parameters are \
             validated here so a bad window configuration fails at startup \
             instead of on the first request."
        )
    )]
    InvalidValue { name: String, message: String },
}

// ---------------------------------------------------------------------------
// PDF extraction errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ExtractError {
    #[error("malformed document: {message}")]
    #[diagnostic(
        code(papyrus::extract::malformed_document),
        help(
            "The uploaded bytes could not be parsed as a PDF. Verify the file \
             is a valid PDF and not truncated or corrupted."
        )
    )]
    MalformedDocument { message: String },
}

// ---------------------------------------------------------------------------
// Chunking errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ChunkError {
    #[error("chunk_size must be positive, got {chunk_size}")]
    #[diagnostic(
        code(papyrus::chunk::invalid_chunk_size),
        help("Set CHUNK_SIZE to a positive character count (default 1200).")
    )]
    InvalidChunkSize { chunk_size: usize },

    #[error("overlap ({overlap}) must be strictly smaller than chunk_size ({chunk_size})")]
    #[diagnostic(
        code(papyrus::chunk::invalid_overlap),
        help(
            "An overlap equal to or larger than the window size would stall the \
             sliding window. Set CHUNK_OVERLAP below CHUNK_SIZE (default 200 vs 1200)."
        )
    )]
    InvalidOverlap { chunk_size: usize, overlap: usize },
}

// ---------------------------------------------------------------------------
// Embedding capability errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EmbedError {
    #[error("embedding request failed: {message}")]
    #[diagnostic(
        code(papyrus::embed::request_failed),
        help(
            "The embedding provider rejected the request or was unreachable. \
             Check the API key, network, and provider status. Retry policy is a \
             deployment concern; the call is idempotent for an identical batch."
        )
    )]
    RequestFailed { message: String },

    #[error("failed to parse embedding response: {message}")]
    #[diagnostic(
        code(papyrus::embed::malformed_response),
        help("The provider returned an unexpected response shape.")
    )]
    MalformedResponse { message: String },

    #[error("embedding count mismatch: sent {sent} texts, got {received} vectors")]
    #[diagnostic(
        code(papyrus::embed::count_mismatch),
        help(
            "The provider must return exactly one vector per input text. A \
             mismatch would silently misalign chunks and vectors, so the whole \
             call is rejected."
        )
    )]
    CountMismatch { sent: usize, received: usize },

    #[error("batch of {size} texts exceeds the provider limit of {limit}")]
    #[diagnostic(
        code(papyrus::embed::batch_too_large),
        help("Partition the input with embed_all() instead of calling embed() directly.")
    )]
    BatchTooLarge { size: usize, limit: usize },
}

// ---------------------------------------------------------------------------
// Vector index capability errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum IndexError {
    #[error("vector index unavailable: {message}")]
    #[diagnostic(
        code(papyrus::index::unavailable),
        help(
            "The index host was unreachable. Check PINECONE_API_KEY, the index \
             name, and that `papyrus setup` has been run once for this index."
        )
    )]
    Unavailable { message: String },

    #[error("index '{name}' was not ready within {timeout_secs}s")]
    #[diagnostic(
        code(papyrus::index::not_ready),
        help(
            "Index provisioning is a one-time startup concern. A freshly created \
             serverless index usually becomes ready within a minute; re-run setup \
             or raise the readiness timeout."
        )
    )]
    NotReady { name: String, timeout_secs: u64 },

    #[error("index request failed: {message}")]
    #[diagnostic(
        code(papyrus::index::request_failed),
        help("An upsert or query was rejected by the index. The provider message is preserved above.")
    )]
    RequestFailed { message: String },

    #[error("failed to parse index response: {message}")]
    #[diagnostic(
        code(papyrus::index::malformed_response),
        help("The index returned an unexpected response shape.")
    )]
    MalformedResponse { message: String },
}

// ---------------------------------------------------------------------------
// Generation capability errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GenerateError {
    #[error("generation request failed: {message}")]
    #[diagnostic(
        code(papyrus::generate::request_failed),
        help(
            "The chat completion provider rejected the request or was \
             unreachable. Check the API key and the configured chat model."
        )
    )]
    RequestFailed { message: String },

    #[error("failed to parse generation response: {message}")]
    #[diagnostic(
        code(papyrus::generate::malformed_response),
        help("The provider returned a completion without readable content.")
    )]
    MalformedResponse { message: String },
}

// ---------------------------------------------------------------------------
// Orchestration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ServiceError {
    #[error("no readable text in \"{filename}\"")]
    #[diagnostic(
        code(papyrus::service::no_readable_text),
        help(
            "The PDF parsed fine but contains no extractable text, e.g. a \
             scanned image-only document with no text layer. OCR is out of \
             scope; provide a text-bearing PDF."
        )
    )]
    NoReadableText { filename: String },

    #[error("no chunks produced from \"{filename}\"")]
    #[diagnostic(
        code(papyrus::service::no_chunks_produced),
        help(
            "Extraction yielded pages but windowing produced nothing, which \
             only happens for pathological whitespace-only content."
        )
    )]
    NoChunksProduced { filename: String },

    #[error("invalid request: {message}")]
    #[diagnostic(
        code(papyrus::service::invalid_request),
        help("Both doc_id and question must be non-empty.")
    )]
    InvalidRequest { message: String },
}
