use crate::traits::Embedder;
use async_trait::async_trait;
use retrieval_core::{Chunk, EmbeddedChunk, Result};

/// Deterministic embedder for tests: derives a fixed-length vector from a
/// simple hash of the chunk content so equal content always embeds to the
/// same vector, without depending on a real model.
pub struct MockEmbedder {
    dimension: usize,
    mini_chunks_per_chunk: usize,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            mini_chunks_per_chunk: 0,
        }
    }

    pub fn with_mini_chunks(mut self, count: usize) -> Self {
        self.mini_chunks_per_chunk = count;
        self
    }

    fn vector_for(&self, seed: &str) -> Vec<f32> {
        let mut state: u64 = 1469598103934665603;
        for byte in seed.bytes() {
            state ^= byte as u64;
            state = state.wrapping_mul(1099511628211);
        }
        (0..self.dimension)
            .map(|i| {
                state = state.wrapping_add(i as u64).wrapping_mul(2862933555777941757);
                ((state >> 33) as i32 % 1000) as f32 / 1000.0
            })
            .collect()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, chunks: Vec<Chunk>) -> Result<Vec<EmbeddedChunk>> {
        Ok(chunks
            .into_iter()
            .map(|chunk| {
                let full_embedding = self.vector_for(&chunk.content);
                let mini_chunk_embeddings = (0..self.mini_chunks_per_chunk)
                    .map(|i| self.vector_for(&format!("{}/{i}", chunk.content)))
                    .collect();
                EmbeddedChunk {
                    chunk,
                    full_embedding,
                    mini_chunk_embeddings,
                }
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retrieval_core::Chunk;

    fn chunk(content: &str) -> Chunk {
        Chunk {
            document_id: "doc1".into(),
            chunk_id: 0,
            blurb: content.into(),
            content: content.into(),
            source_links: vec![(0, None)],
            section_continuation: false,
        }
    }

    #[tokio::test]
    async fn preserves_order_and_length() {
        let embedder = MockEmbedder::new(8);
        let chunks = vec![chunk("a"), chunk("b"), chunk("c")];
        let embedded = embedder.embed(chunks).await.unwrap();
        assert_eq!(embedded.len(), 3);
        assert_eq!(embedded[0].chunk.content, "a");
        assert_eq!(embedded[2].chunk.content, "c");
        assert!(embedded.iter().all(|e| e.full_embedding.len() == 8));
    }

    #[tokio::test]
    async fn same_content_same_vector() {
        let embedder = MockEmbedder::new(8);
        let a = embedder.embed(vec![chunk("hello")]).await.unwrap();
        let b = embedder.embed(vec![chunk("hello")]).await.unwrap();
        assert_eq!(a[0].full_embedding, b[0].full_embedding);
    }
}
