use async_trait::async_trait;
use retrieval_core::{Chunk, EmbeddedChunk, Result};

/// Embedding model inference, kept as an interface only (spec §1, §4.2).
///
/// `embed` must preserve input order and length; failure is fatal to the
/// batch that called it (spec §4.2).
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, chunks: Vec<Chunk>) -> Result<Vec<EmbeddedChunk>>;

    /// Dimensionality of `full_embedding` vectors this embedder produces.
    /// Callers validate upstream vectors against this before writing to
    /// the engine (spec §3 invariant: "every persisted chunk has a valid
    /// vector set").
    fn dimension(&self) -> usize;
}
