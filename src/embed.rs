//! Embedding capability contract and the batch-partitioning strategy.
//!
//! Providers enforce a per-call input limit, so [`embed_all`] partitions large
//! inputs into consecutive batches, calls the capability once per batch, and
//! concatenates the results in the original order. There is no internal retry;
//! each batch call is idempotent for identical input, so a retrying decorator
//! can wrap an [`Embedder`] without changing call semantics.

use crate::error::EmbedError;

/// Capability that turns texts into vectors, one per input, same order.
///
/// Implementations must reject batches larger than [`Embedder::max_batch`]
/// with [`EmbedError::BatchTooLarge`] rather than truncating.
pub trait Embedder: Send + Sync {
    /// Embed up to `max_batch()` texts in one provider call.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Maximum number of texts per call.
    fn max_batch(&self) -> usize;
}

/// Embed an arbitrary number of texts, batching per the provider limit.
///
/// Fails fast on the first batch error; callers treat any failure as aborting
/// the whole operation, so no partial output is ever returned.
pub fn embed_all(embedder: &dyn Embedder, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
    let batch_size = embedder.max_batch().max(1);
    let mut vectors = Vec::with_capacity(texts.len());

    for batch in texts.chunks(batch_size) {
        let mut embedded = embedder.embed(batch)?;
        if embedded.len() != batch.len() {
            return Err(EmbedError::CountMismatch {
                sent: batch.len(),
                received: embedded.len(),
            });
        }
        vectors.append(&mut embedded);
    }

    tracing::debug!(
        texts = texts.len(),
        batch_size,
        batches = texts.len().div_ceil(batch_size),
        "embedded texts"
    );
    Ok(vectors)
}
