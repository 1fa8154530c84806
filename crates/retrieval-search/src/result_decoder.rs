use crate::models::InferenceChunk;
use chrono::TimeZone;
use retrieval_core::chunk::UNTIMED_SENTINEL;
use retrieval_core::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

const SECTION_SEPARATOR: &str = "<sep />";
const DEFAULT_MAX_SUMMARY_LENGTH: usize = 400;

/// Raw hit as the engine returns it: fields nested under `"fields"`
/// alongside a top-level relevance score (spec §6 search response shape).
#[derive(Debug, Clone, Deserialize)]
pub struct EngineHit {
    pub fields: EngineHitFields,
    #[serde(default)]
    pub relevance: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineHitFields {
    pub document_id: String,
    pub chunk_id: usize,
    pub blurb: String,
    #[serde(default)]
    pub content: Option<String>,
    pub source_type: String,
    /// JSON-encoded `{offset: link}` map, as persisted (spec §6).
    #[serde(default)]
    pub source_links: Option<String>,
    pub semantic_identifier: String,
    #[serde(default)]
    pub section_continuation: bool,
    #[serde(default = "default_boost")]
    pub boost: f32,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub doc_updated_at: Option<i64>,
    /// JSON-encoded document metadata map, as persisted.
    #[serde(default)]
    pub metadata: Option<String>,
    /// Dynamic, match-highlighted summary with `<sep />`-joined fragments.
    #[serde(default)]
    pub content_summary: Option<String>,
    #[serde(default)]
    pub matchfeatures: Option<serde_json::Value>,
}

fn default_boost() -> f32 {
    1.0
}

/// Decode a raw engine hit into an [`InferenceChunk`]. Returns `None` (and
/// logs a warning) for a hit that lacks `content` — spec §7 "Engine
/// corruption": such hits are dropped rather than surfaced as an error, since
/// the rest of the result set is still usable.
pub fn hit_to_inference_chunk(hit: &EngineHit) -> Option<InferenceChunk> {
    let content = match hit.fields.content.as_deref() {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => {
            tracing::warn!(
                document_id = %hit.fields.document_id,
                chunk_id = hit.fields.chunk_id,
                "engine hit is missing content, skipping"
            );
            return None;
        }
    };

    let source_links: BTreeMap<usize, String> = hit
        .fields
        .source_links
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default();

    let metadata = hit
        .fields
        .metadata
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or(serde_json::Value::Null);

    let updated_at = updated_at_from_epoch(hit.fields.doc_updated_at);

    let match_highlights = hit
        .fields
        .content_summary
        .as_deref()
        .map(|summary| process_dynamic_summary(summary, DEFAULT_MAX_SUMMARY_LENGTH))
        .unwrap_or_default();

    let recency_bias = hit
        .fields
        .matchfeatures
        .as_ref()
        .and_then(|v| v.get("recency_bias"))
        .and_then(|v| v.as_f64())
        .map(|v| v as f32)
        .unwrap_or(1.0);

    Some(InferenceChunk {
        document_id: hit.fields.document_id.clone(),
        chunk_id: hit.fields.chunk_id,
        blurb: hit.fields.blurb.clone(),
        content,
        source_type: hit.fields.source_type.clone(),
        source_links,
        semantic_identifier: hit.fields.semantic_identifier.clone(),
        section_continuation: hit.fields.section_continuation,
        boost: hit.fields.boost,
        hidden: hit.fields.hidden,
        recency_bias,
        score: hit.relevance,
        metadata,
        match_highlights,
        updated_at,
    })
}

fn updated_at_from_epoch(epoch_secs: Option<i64>) -> Option<DateTime<Utc>> {
    match epoch_secs {
        None | Some(UNTIMED_SENTINEL) => None,
        Some(secs) => Utc.timestamp_opt(secs, 0).single(),
    }
}

/// Split a dynamic summary on the engine's literal `<sep />` fragment
/// separator and accumulate fragments up to `max_summary_length`
/// characters. The fragment that would overflow is truncated at its last
/// whole word, with a single trailing punctuation character stripped
/// before the ellipsis is appended; a fragment with no word boundary at
/// all (a single overlong word) is dropped and the ellipsis instead joins
/// onto the previous fragment (spec §4.6 "Dynamic summary truncation").
pub fn process_dynamic_summary(dynamic_summary: &str, max_summary_length: usize) -> Vec<String> {
    if dynamic_summary.is_empty() {
        return Vec::new();
    }

    let mut sections: Vec<String> = Vec::new();
    let mut current_length = 0usize;

    for section in dynamic_summary.split(SECTION_SEPARATOR) {
        let section_chars: Vec<char> = section.chars().collect();
        let section_length = section_chars.len();

        if current_length + section_length >= max_summary_length {
            let take = max_summary_length.saturating_sub(current_length);
            let truncated: String = section_chars.into_iter().take(take).collect();
            let truncated = truncated.trim_start().to_string();

            match truncated.find(' ') {
                None => {
                    if let Some(last) = sections.last_mut() {
                        last.push_str("...");
                    }
                }
                Some(_) => {
                    let mut word_truncated = match truncated.rfind(' ') {
                        Some(idx) => truncated[..idx].to_string(),
                        None => truncated,
                    };
                    if word_truncated.ends_with(|c: char| c.is_ascii_punctuation()) {
                        word_truncated.pop();
                    }
                    word_truncated.push_str("...");
                    sections.push(word_truncated);
                }
            }
            break;
        }

        sections.push(section.to_string());
        current_length += section_length;
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(content: Option<&str>) -> EngineHit {
        EngineHit {
            relevance: 0.75,
            fields: EngineHitFields {
                document_id: "doc1".into(),
                chunk_id: 0,
                blurb: "a blurb".into(),
                content: content.map(str::to_string),
                source_type: "web".into(),
                source_links: Some(r#"{"0":"https://example.com"}"#.into()),
                semantic_identifier: "Example Doc".into(),
                section_continuation: false,
                boost: 1.0,
                hidden: false,
                doc_updated_at: Some(1_700_000_000),
                metadata: Some(r#"{"team":"search"}"#.into()),
                content_summary: Some("first part<sep />second part".into()),
                matchfeatures: Some(serde_json::json!({"recency_bias": 0.8})),
            },
        }
    }

    #[test]
    fn missing_content_is_skipped() {
        assert!(hit_to_inference_chunk(&hit(None)).is_none());
    }

    #[test]
    fn empty_content_is_skipped() {
        assert!(hit_to_inference_chunk(&hit(Some(""))).is_none());
    }

    #[test]
    fn decodes_full_hit() {
        let chunk = hit_to_inference_chunk(&hit(Some("hello world"))).unwrap();
        assert_eq!(chunk.document_id, "doc1");
        assert_eq!(chunk.content, "hello world");
        assert_eq!(chunk.source_links.get(&0).unwrap(), "https://example.com");
        assert_eq!(chunk.metadata["team"], "search");
        assert_eq!(chunk.match_highlights, vec!["first part", "second part"]);
        assert!((chunk.recency_bias - 0.8).abs() < f32::EPSILON);
        assert!(chunk.updated_at.is_some());
    }

    #[test]
    fn untimed_sentinel_decodes_to_none() {
        let mut raw = hit(Some("hello"));
        raw.fields.doc_updated_at = Some(UNTIMED_SENTINEL);
        let chunk = hit_to_inference_chunk(&raw).unwrap();
        assert!(chunk.updated_at.is_none());
    }

    #[test]
    fn empty_summary_yields_no_sections() {
        assert!(process_dynamic_summary("", 400).is_empty());
    }

    #[test]
    fn short_summary_passes_through_unsplit() {
        let sections = process_dynamic_summary("one fragment", 400);
        assert_eq!(sections, vec!["one fragment"]);
    }

    #[test]
    fn splits_on_literal_separator() {
        let sections = process_dynamic_summary("alpha<sep />beta<sep />gamma", 400);
        assert_eq!(sections, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn truncates_overflowing_fragment_at_word_boundary() {
        let long = "word ".repeat(20);
        let sections = process_dynamic_summary(&long, 12);
        assert_eq!(sections.len(), 1);
        assert!(sections[0].ends_with("..."));
        assert!(sections[0].len() <= 16);
    }

    #[test]
    fn strips_trailing_punctuation_before_ellipsis() {
        let sections = process_dynamic_summary("hello world, foo bar baz qux", 13);
        assert_eq!(sections, vec!["hello world..."]);
    }

    #[test]
    fn overlong_word_with_no_space_is_dropped_and_joins_previous_fragment() {
        let summary = "first section<sep />superlongwordwithnospaceatallwhatsoever";
        let sections = process_dynamic_summary(summary, 20);
        assert_eq!(sections, vec!["first section..."]);
    }

    #[test]
    fn overlong_word_with_no_previous_fragment_yields_nothing() {
        let sections = process_dynamic_summary("superlongwordwithnospaceatallwhatsoever", 5);
        assert!(sections.is_empty());
    }
}
