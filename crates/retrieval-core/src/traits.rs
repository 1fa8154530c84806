use crate::Result;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};

/// External tokenizer collaborator (spec §1: tokenizer implementations are
/// out of scope for the core). The chunker only needs token counts and a
/// sentence-ish boundary split to do its token-budget accounting; it never
/// depends on a concrete subword vocabulary.
pub trait Tokenizer: Send + Sync {
    /// Number of tokens `text` would occupy under this tokenizer's model.
    fn count_tokens(&self, text: &str) -> usize;

    /// Split `text` into sentence-like spans, in order, with no loss of
    /// content (joining the returned spans with `""` reconstructs `text`
    /// modulo surrounding whitespace trimmed off each span).
    fn split_sentences<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// A trivial whitespace-based [`Tokenizer`] for tests and local
/// experimentation. Never wired in as the indexing service's production
/// default — callers must supply a real tokenizer explicitly.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }

    fn split_sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut sentences = Vec::new();
        let mut start = 0;
        let bytes = text.as_bytes();
        for (i, b) in bytes.iter().enumerate() {
            if matches!(b, b'.' | b'!' | b'?') {
                let end = i + 1;
                let span = text[start..end].trim();
                if !span.is_empty() {
                    sentences.push(&text[start..end]);
                }
                start = end;
            }
        }
        if start < text.len() {
            let rest = text[start..].trim();
            if !rest.is_empty() {
                sentences.push(&text[start..]);
            }
        }
        if sentences.is_empty() && !text.is_empty() {
            sentences.push(text);
        }
        sentences
    }
}

/// Per-document ACL/document-set state as tracked in the external
/// relational store of record (spec §1, §4.3 steps 5-6).
#[derive(Debug, Clone, Default)]
pub struct DocumentAccessInfo {
    pub access: BTreeSet<String>,
    pub document_sets: BTreeSet<String>,
}

/// Metadata upserted into the record of truth for one document
/// (spec §4.3 step 2).
#[derive(Debug, Clone)]
pub struct DocumentMetadataRecord {
    pub connector_id: i64,
    pub credential_id: i64,
    pub document_id: String,
    pub semantic_identifier: String,
    pub first_non_empty_link: Option<String>,
    pub primary_owners: BTreeSet<String>,
    pub secondary_owners: BTreeSet<String>,
}

/// The relational store of record the indexing pipeline locks and reads
/// from (spec §1: "relational persistence of access control and
/// document-set membership" is named as an external collaborator). A real
/// implementation lives outside this crate; tests use an in-memory stub.
#[async_trait]
pub trait RecordOfTruth: Send + Sync {
    /// Acquire advisory per-document locks, ascending by id, held for the
    /// duration of the batch (spec §4.3 step 1, §5 "Lock discipline").
    async fn lock_documents(&self, document_ids: &[String]) -> Result<()>;

    /// Release locks acquired by [`RecordOfTruth::lock_documents`] for this
    /// batch. Must be called on every exit path (success or failure).
    async fn unlock_documents(&self, document_ids: &[String]) -> Result<()>;

    async fn upsert_metadata(&self, records: &[DocumentMetadataRecord]) -> Result<()>;

    async fn fetch_access(
        &self,
        document_ids: &[String],
    ) -> Result<HashMap<String, BTreeSet<String>>>;

    async fn fetch_document_sets(
        &self,
        document_ids: &[String],
    ) -> Result<HashMap<String, BTreeSet<String>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_tokenizer_counts_words() {
        let t = WhitespaceTokenizer;
        assert_eq!(t.count_tokens("one two three"), 3);
    }

    #[test]
    fn whitespace_tokenizer_splits_sentences() {
        let t = WhitespaceTokenizer;
        let sentences = t.split_sentences("Hello world. How are you? Fine!");
        assert_eq!(sentences.len(), 3);
    }
}
