//! Builds the persisted engine field record from a decorated chunk
//! (spec §6 "Persisted engine fields") and the unicode-repair step used on
//! HTTP 400 (spec §7 "Client data corruption").

use retrieval_core::{EngineChunk, MetadataAwareChunk, DEFAULT_BOOST};
use std::collections::BTreeMap;

pub fn build_engine_chunk(chunk: &MetadataAwareChunk) -> EngineChunk {
    let inner = &chunk.embedded.chunk;

    let source_links: BTreeMap<String, String> = inner
        .source_links
        .iter()
        .filter_map(|(offset, link)| link.as_ref().map(|l| (offset.to_string(), l.clone())))
        .collect();

    let mut embeddings = BTreeMap::new();
    embeddings.insert("full_chunk".to_string(), chunk.embedded.full_embedding.clone());
    for (i, mini) in chunk.embedded.mini_chunk_embeddings.iter().enumerate() {
        embeddings.insert(format!("mini_chunk_{i}"), mini.clone());
    }

    let access_control_list = chunk.access.iter().map(|entry| (entry.clone(), 1)).collect();
    let document_sets = chunk.document_sets.iter().map(|set| (set.clone(), 1)).collect();

    let meta = &chunk.document_metadata;
    let metadata = serde_json::to_string(&meta.metadata).unwrap_or_else(|_| "{}".to_string());

    EngineChunk {
        document_id: inner.document_id.clone(),
        chunk_id: inner.chunk_id,
        blurb: inner.blurb.clone(),
        content: inner.content.clone(),
        content_summary: inner.content.clone(),
        source_type: meta.source_type.clone(),
        source_links: serde_json::to_string(&source_links).unwrap_or_default(),
        semantic_identifier: meta.semantic_identifier.clone(),
        title: meta.title.clone(),
        section_continuation: inner.section_continuation,
        metadata,
        embeddings,
        boost: DEFAULT_BOOST,
        doc_updated_at: meta.doc_updated_at,
        primary_owners: meta.primary_owners.clone(),
        secondary_owners: meta.secondary_owners.clone(),
        access_control_list,
        document_sets,
        hidden: meta.hidden,
    }
}

/// Strip invalid Unicode codepoints (lone surrogates, etc.) from the
/// text-bearing fields the engine rejected with HTTP 400, so the one-shot
/// repair-and-retry in spec §7 has something to resubmit.
pub fn strip_invalid_unicode(chunk: &mut EngineChunk) {
    chunk.blurb = strip_invalid_codepoints(&chunk.blurb);
    chunk.semantic_identifier = strip_invalid_codepoints(&chunk.semantic_identifier);
    chunk.content = strip_invalid_codepoints(&chunk.content);
    chunk.content_summary = strip_invalid_codepoints(&chunk.content_summary);
}

fn strip_invalid_codepoints(text: &str) -> String {
    text.chars().filter(|c| !c.is_control() || matches!(c, '\n' | '\t')).collect()
}
