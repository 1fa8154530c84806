use crate::models::{IndexFilters, RetrievalMode, StructuredQuery};
use retrieval_core::{DateTime, RetrievalError, Result, Utc};
use std::collections::BTreeMap;

/// Knobs the query builder needs that are otherwise config-loaded (spec §6
/// configuration inputs: `DOC_TIME_DECAY`, `FAVOR_RECENT_DECAY_MULTIPLIER`,
/// `UNTIMED_DOC_CUTOFF_DAYS`, `SEARCH_DISTANCE_CUTOFF`).
#[derive(Debug, Clone, Copy)]
pub struct RetrievalQueryConfig {
    pub doc_time_decay: f64,
    pub favor_recent_decay_multiplier: f64,
    pub untimed_doc_cutoff_days: i64,
    /// Accepted for forward compatibility with a distance-based ANN cutoff;
    /// the engine's ranking profile does not currently consume it (same
    /// dead parameter the source carries on `semantic_retrieval`/
    /// `hybrid_retrieval` — see DESIGN.md open question).
    pub search_distance_cutoff: Option<f64>,
}

impl Default for RetrievalQueryConfig {
    fn default() -> Self {
        Self {
            doc_time_decay: 0.5,
            favor_recent_decay_multiplier: 0.5,
            untimed_doc_cutoff_days: 92,
            search_distance_cutoff: None,
        }
    }
}

/// Builds the filter-prefixed YQL and per-mode structured query (spec
/// §4.4-§4.5). Stateless: every call is a pure function of its inputs.
pub struct QueryBuilder;

const YQL_PROJECTION: &str = "documentid, document_id, chunk_id, blurb, content, \
    source_type, source_links, semantic_identifier, section_continuation, \
    boost, hidden, doc_updated_at, metadata, content_summary";

impl QueryBuilder {
    pub fn build(
        mode: RetrievalMode,
        index_name: &str,
        query: &str,
        filters: &IndexFilters,
        favor_recent: bool,
        num_to_retrieve: usize,
        edit_keyword_query: bool,
        query_embedding: Option<&[f32]>,
        config: &RetrievalQueryConfig,
    ) -> Result<StructuredQuery> {
        Self::build_at(
            Utc::now(),
            mode,
            index_name,
            query,
            filters,
            favor_recent,
            num_to_retrieve,
            edit_keyword_query,
            query_embedding,
            config,
        )
    }

    /// Same as [`QueryBuilder::build`] but with an explicit `now`, for
    /// deterministic tests of the time-cutoff boundary (spec §8 scenario 5).
    #[allow(clippy::too_many_arguments)]
    pub fn build_at(
        now: DateTime<Utc>,
        mode: RetrievalMode,
        index_name: &str,
        query: &str,
        filters: &IndexFilters,
        favor_recent: bool,
        num_to_retrieve: usize,
        edit_keyword_query: bool,
        query_embedding: Option<&[f32]>,
        config: &RetrievalQueryConfig,
    ) -> Result<StructuredQuery> {
        if query.trim().is_empty() {
            return Err(RetrievalError::validation("query", "empty query received"));
        }
        if mode.is_vector_mode() && query_embedding.is_none() {
            return Err(RetrievalError::validation(
                "query_embedding",
                "semantic/hybrid retrieval requires a query embedding",
            ));
        }

        let yql_base = format!("select {YQL_PROJECTION} from {index_name} where ");
        let where_clause = build_filters(filters, mode.includes_hidden(), now, config);
        let match_clause = match mode {
            RetrievalMode::Keyword | RetrievalMode::Admin => {
                r#"({grammar: "weakAnd"}userInput(@query) or ({defaultIndex: "content_summary"}userInput(@query)))"#
                    .to_string()
            }
            RetrievalMode::Semantic => {
                let target_hits = 10 * num_to_retrieve;
                format!(
                    r#"(({{targetHits: {target_hits}}}nearestNeighbor(embeddings, query_embedding)) or ({{defaultIndex: "content_summary"}}userInput(@query)))"#
                )
            }
            RetrievalMode::Hybrid => {
                let target_hits = (10 * num_to_retrieve).max(1000);
                format!(
                    r#"(({{targetHits: {target_hits}}}nearestNeighbor(embeddings, query_embedding)) or ({{grammar: "weakAnd"}}userInput(@query)) or ({{defaultIndex: "content_summary"}}userInput(@query)))"#
                )
            }
        };

        let final_query = if edit_keyword_query {
            edit_keyword_query_text(query)
        } else {
            query.to_string()
        };

        let decay_multiplier = if favor_recent {
            config.favor_recent_decay_multiplier
        } else {
            1.0
        };

        let mut input_query_params = BTreeMap::new();
        input_query_params.insert(
            "decay_factor".to_string(),
            format!("{}", config.doc_time_decay * decay_multiplier),
        );
        if let Some(embedding) = query_embedding {
            input_query_params.insert("query_embedding".to_string(), serialize_vector(embedding));
        }

        Ok(StructuredQuery {
            yql: format!("{yql_base}{where_clause}{match_clause}"),
            query: final_query,
            ranking_profile: mode.ranking_profile(),
            hits: num_to_retrieve,
            offset: 0,
            input_query_params,
        })
    }
}

/// Drop empty values; if none remain, contribute nothing to the filter
/// (spec §4.5 "OR-filter helper").
fn build_or_filter(key: &str, vals: &Option<Vec<String>>) -> String {
    let Some(vals) = vals else {
        return String::new();
    };
    let valid: Vec<&str> = vals.iter().map(String::as_str).filter(|v| !v.is_empty()).collect();
    if valid.is_empty() {
        return String::new();
    }
    let clauses: Vec<String> = valid
        .iter()
        .map(|v| format!(r#"{key} contains "{v}""#))
        .collect();
    format!("({}) and ", clauses.join(" or "))
}

/// Untimed-doc policy (spec §4.5, §8 "Untimed-doc policy"): documents
/// without `doc_updated_at` are assigned sentinel `-1` in the engine, and
/// are included only when the cutoff is old enough to be past the grace
/// window (`UNTIMED_DOC_CUTOFF_DAYS`, default 92).
fn build_time_filter(
    cutoff: &Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    untimed_doc_cutoff_days: i64,
) -> String {
    let Some(cutoff) = cutoff else {
        return String::new();
    };
    let grace = chrono::Duration::days(untimed_doc_cutoff_days);
    let include_untimed = now - grace > *cutoff;
    let cutoff_secs = cutoff.timestamp();
    if include_untimed {
        format!("!(doc_updated_at < {cutoff_secs}) and ")
    } else {
        format!("(doc_updated_at >= {cutoff_secs}) and ")
    }
}

fn build_filters(
    filters: &IndexFilters,
    include_hidden: bool,
    now: DateTime<Utc>,
    config: &RetrievalQueryConfig,
) -> String {
    let mut out = String::new();
    if !include_hidden {
        out.push_str("!(hidden=true) and ");
    }
    out.push_str(&build_or_filter("access_control_list", &filters.access_control_list));
    out.push_str(&build_or_filter("source_type", &filters.source_type));
    out.push_str(&build_or_filter("document_sets", &filters.document_set));
    out.push_str(&build_time_filter(
        &filters.time_cutoff,
        now,
        config.untimed_doc_cutoff_days,
    ));
    out
}

/// Placeholder for the external query-processing/stopword-removal step
/// (spec §1 excludes NLP/tokenizer implementations); kept trivial so
/// `edit_keyword_query` has an observable effect without pulling in an NLP
/// dependency the core doesn't otherwise need.
fn edit_keyword_query_text(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn serialize_vector(vector: &[f32]) -> String {
    let parts: Vec<String> = vector.iter().map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn cfg() -> RetrievalQueryConfig {
        RetrievalQueryConfig::default()
    }

    #[test]
    fn empty_query_is_rejected() {
        let err = QueryBuilder::build(
            RetrievalMode::Keyword,
            "chunks",
            "   ",
            &IndexFilters::default(),
            false,
            10,
            false,
            None,
            &cfg(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn keyword_query_composition_matches_scenario_6() {
        let filters = IndexFilters {
            access_control_list: Some(vec!["u:alice".into(), "__public__".into()]),
            source_type: Some(vec!["slack".into()]),
            document_set: None,
            time_cutoff: None,
        };
        let built = QueryBuilder::build(
            RetrievalMode::Keyword,
            "chunks",
            "hello",
            &filters,
            false,
            10,
            false,
            None,
            &cfg(),
        )
        .unwrap();
        assert!(built.yql.starts_with(
            r#"select documentid, document_id, chunk_id, blurb, content, source_type, source_links, semantic_identifier, section_continuation, boost, hidden, doc_updated_at, metadata, content_summary from chunks where !(hidden=true) and (access_control_list contains "u:alice" or access_control_list contains "__public__") and (source_type contains "slack") and "#
        ));
    }

    #[test]
    fn acl_filter_always_present_for_non_admin_modes() {
        let filters = IndexFilters {
            access_control_list: Some(vec!["u:bob".into()]),
            ..Default::default()
        };
        for mode in [RetrievalMode::Keyword, RetrievalMode::Semantic, RetrievalMode::Hybrid] {
            let embedding = if mode.is_vector_mode() { Some(vec![0.1, 0.2]) } else { None };
            let built = QueryBuilder::build(
                mode,
                "chunks",
                "hi",
                &filters,
                false,
                10,
                false,
                embedding.as_deref(),
                &cfg(),
            )
            .unwrap();
            assert!(built.yql.contains(r#"access_control_list contains "u:bob""#));
        }
    }

    #[test]
    fn admin_mode_skips_hidden_filter() {
        let built = QueryBuilder::build(
            RetrievalMode::Admin,
            "chunks",
            "hi",
            &IndexFilters::default(),
            false,
            10,
            false,
            None,
            &cfg(),
        )
        .unwrap();
        assert!(!built.yql.contains("!(hidden=true)"));
    }

    #[test]
    fn time_filter_includes_untimed_past_grace_window() {
        let now = Utc::now();
        let cutoff = now - Duration::days(93);
        let filters = IndexFilters {
            time_cutoff: Some(cutoff),
            ..Default::default()
        };
        let built = QueryBuilder::build_at(
            now,
            RetrievalMode::Keyword,
            "chunks",
            "hi",
            &filters,
            false,
            10,
            false,
            None,
            &cfg(),
        )
        .unwrap();
        assert!(built.yql.contains("!(doc_updated_at <"));
    }

    #[test]
    fn time_filter_excludes_untimed_within_grace_window() {
        let now = Utc::now();
        let cutoff = now - Duration::days(30);
        let filters = IndexFilters {
            time_cutoff: Some(cutoff),
            ..Default::default()
        };
        let built = QueryBuilder::build_at(
            now,
            RetrievalMode::Keyword,
            "chunks",
            "hi",
            &filters,
            false,
            10,
            false,
            None,
            &cfg(),
        )
        .unwrap();
        assert!(built.yql.contains("doc_updated_at >="));
        assert!(!built.yql.contains("!(doc_updated_at"));
    }

    #[test]
    fn semantic_requires_embedding() {
        let err = QueryBuilder::build(
            RetrievalMode::Semantic,
            "chunks",
            "hi",
            &IndexFilters::default(),
            false,
            10,
            false,
            None,
            &cfg(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn hybrid_target_hits_floor_is_1000() {
        let built = QueryBuilder::build(
            RetrievalMode::Hybrid,
            "chunks",
            "hi",
            &IndexFilters::default(),
            false,
            5,
            false,
            Some(&[0.1, 0.2]),
            &cfg(),
        )
        .unwrap();
        assert!(built.yql.contains("targetHits: 1000"));
    }
}
