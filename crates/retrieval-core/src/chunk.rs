use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A chunked, ordered unit of a document's content.
///
/// `source_document` is deliberately *not* an owning reference to a
/// [`crate::Document`] — chunks outlive the per-batch document list and
/// decoration (access/document-sets) joins back to the source purely by
/// `document_id` (spec §9, "Back-references from Chunk to Document").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub document_id: String,
    pub chunk_id: usize,
    pub blurb: String,
    pub content: String,
    /// Character offset within `content` -> section link. Keys are
    /// insertion-ordered, strictly increasing, and all `< content.len()`
    /// (spec §3 invariants, §8 "Link-offset monotonicity").
    pub source_links: Vec<(usize, Option<String>)>,
    pub section_continuation: bool,
}

impl Chunk {
    /// Validate the `source_links` monotonicity invariant. Exposed so
    /// callers (tests, the pipeline) can assert it without duplicating the
    /// check logic.
    pub fn source_links_are_monotonic(&self) -> bool {
        let mut prev: Option<usize> = None;
        for (offset, _) in &self.source_links {
            if *offset >= self.content.len() {
                return false;
            }
            if let Some(p) = prev {
                if *offset <= p {
                    return false;
                }
            }
            prev = Some(*offset);
        }
        true
    }
}

/// A [`Chunk`] with its embedding vectors attached. Produced by the
/// `Embedder` interface (spec §4.2); order and length must match the input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub full_embedding: Vec<f32>,
    pub mini_chunk_embeddings: Vec<Vec<f32>>,
}

/// Sentinel ACL entry meaning "visible to everyone".
pub const PUBLIC_ACL_ENTRY: &str = "__public__";

/// Document-level fields carried alongside each of its chunks so the engine
/// adapter can build a self-contained write request without re-fetching the
/// owning [`crate::Document`] (spec §6 persisted fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkDocumentMetadata {
    pub semantic_identifier: String,
    pub source_type: String,
    pub title: String,
    /// Epoch seconds, or `-1` for untimed documents (spec §4.5).
    pub doc_updated_at: i64,
    pub primary_owners: BTreeSet<String>,
    pub secondary_owners: BTreeSet<String>,
    pub hidden: bool,
    /// The owning document's connector-supplied metadata map, persisted
    /// as-is (spec §6 `metadata` field).
    pub metadata: HashMap<String, String>,
}

/// An [`EmbeddedChunk`] decorated with the access-control and document-set
/// membership fetched from the record of truth (spec §4.3 step 7), plus the
/// owning document's metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataAwareChunk {
    pub embedded: EmbeddedChunk,
    pub access: BTreeSet<String>,
    pub document_sets: BTreeSet<String>,
    pub document_metadata: ChunkDocumentMetadata,
}

impl MetadataAwareChunk {
    pub fn document_id(&self) -> &str {
        &self.embedded.chunk.document_id
    }

    pub fn chunk_id(&self) -> usize {
        self.embedded.chunk.chunk_id
    }
}

/// The field set persisted per chunk in the search engine (spec §6). This
/// is the literal shape of the `"fields"` object in a write request, kept
/// as its own type so the HTTP adapter builds it once and the same value
/// can be asserted against in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineChunk {
    pub document_id: String,
    pub chunk_id: usize,
    pub blurb: String,
    pub content: String,
    pub content_summary: String,
    pub source_type: String,
    /// JSON-encoded `{offset: link}` map (spec §6: `source_links` is a JSON
    /// string field in the engine schema, not a native structure).
    pub source_links: String,
    pub semantic_identifier: String,
    pub title: String,
    pub section_continuation: bool,
    /// JSON-encoded document metadata map.
    pub metadata: String,
    pub embeddings: std::collections::BTreeMap<String, Vec<f32>>,
    pub boost: f32,
    /// Epoch seconds, or `-1` for untimed documents (spec §4.5).
    pub doc_updated_at: i64,
    pub primary_owners: BTreeSet<String>,
    pub secondary_owners: BTreeSet<String>,
    pub access_control_list: std::collections::BTreeMap<String, u32>,
    pub document_sets: std::collections::BTreeMap<String, u32>,
    pub hidden: bool,
}

pub const DEFAULT_BOOST: f32 = 1.0;
pub const UNTIMED_SENTINEL: i64 = -1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_links_pass() {
        let chunk = Chunk {
            document_id: "d".into(),
            chunk_id: 0,
            blurb: "b".into(),
            content: "hello world".into(),
            source_links: vec![(0, Some("a".into())), (6, Some("b".into()))],
            section_continuation: false,
        };
        assert!(chunk.source_links_are_monotonic());
    }

    #[test]
    fn non_monotonic_links_fail() {
        let chunk = Chunk {
            document_id: "d".into(),
            chunk_id: 0,
            blurb: "b".into(),
            content: "hello world".into(),
            source_links: vec![(6, Some("a".into())), (0, Some("b".into()))],
            section_continuation: false,
        };
        assert!(!chunk.source_links_are_monotonic());
    }

    #[test]
    fn offset_past_content_len_fails() {
        let chunk = Chunk {
            document_id: "d".into(),
            chunk_id: 0,
            blurb: "b".into(),
            content: "hi".into(),
            source_links: vec![(0, None), (5, None)],
            section_continuation: false,
        };
        assert!(!chunk.source_links_are_monotonic());
    }
}
