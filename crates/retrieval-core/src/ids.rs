//! Deterministic engine chunk ids.
//!
//! Per spec §3/§6: a persisted chunk's engine id is a namespace UUID (v5)
//! derived from `"{document_id}__{chunk_id}"`. It depends only on those two
//! values and is stable across reindex cycles (spec §8, "UUID determinism").

use uuid::Uuid;

/// Namespace used to derive chunk ids. Arbitrary but fixed: changing it
/// would silently orphan every previously-indexed chunk.
pub const CHUNK_ID_NAMESPACE: Uuid = Uuid::from_bytes([
    0x2f, 0x6a, 0x8e, 0x91, 0x4c, 0x3d, 0x4b, 0x1a, 0x9e, 0x77, 0x1d, 0x5b, 0x6a, 0x9c, 0x0e, 0x44,
]);

/// Derive the engine-side chunk id for `(document_id, chunk_id)`.
pub fn chunk_uuid(document_id: &str, chunk_id: usize) -> Uuid {
    let name = format!("{document_id}__{chunk_id}");
    Uuid::new_v5(&CHUNK_ID_NAMESPACE, name.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_across_calls() {
        let a = chunk_uuid("doc1", 0);
        let b = chunk_uuid("doc1", 0);
        assert_eq!(a, b);
    }

    #[test]
    fn depends_on_both_document_and_chunk_id() {
        let a = chunk_uuid("doc1", 0);
        let b = chunk_uuid("doc1", 1);
        let c = chunk_uuid("doc2", 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
