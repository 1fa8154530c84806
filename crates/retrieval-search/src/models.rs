use retrieval_core::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One of the four retrieval modes (spec §4.4 query table, §9 design note
/// "Ranking-profile polymorphism": modeled as a tagged variant rather than
/// an inheritance hierarchy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetrievalMode {
    Keyword,
    Semantic,
    Hybrid,
    Admin,
}

impl RetrievalMode {
    /// Engine-side ranking profile name this mode dispatches to (spec §6).
    pub fn ranking_profile(self) -> &'static str {
        match self {
            RetrievalMode::Keyword => "keyword_search",
            RetrievalMode::Semantic => "semantic_search",
            RetrievalMode::Hybrid => "hybrid_search",
            RetrievalMode::Admin => "admin_search",
        }
    }

    /// Admin mode includes hidden chunks and skips the ACL-mandatory
    /// posture of the other three modes' hidden filter (spec §4.5).
    pub fn includes_hidden(self) -> bool {
        matches!(self, RetrievalMode::Admin)
    }

    /// Whether this mode issues an ANN `nearestNeighbor` clause.
    pub fn is_vector_mode(self) -> bool {
        matches!(self, RetrievalMode::Semantic | RetrievalMode::Hybrid)
    }
}

/// Filter constraints applied before the match clause (spec §4.5). `None`
/// and `Some(vec![])` are both "no constraint" for a given dimension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexFilters {
    pub access_control_list: Option<Vec<String>>,
    pub source_type: Option<Vec<String>>,
    pub document_set: Option<Vec<String>>,
    pub time_cutoff: Option<DateTime<Utc>>,
}

/// A fully built structured query ready to be sent to the engine's search
/// endpoint (spec §6: `GET {base}/search/?yql=...&query=...&...`).
#[derive(Debug, Clone)]
pub struct StructuredQuery {
    pub yql: String,
    pub query: String,
    pub ranking_profile: &'static str,
    pub hits: usize,
    pub offset: usize,
    /// `input.query(...)` parameters, e.g. `decay_factor`, `query_embedding`.
    pub input_query_params: BTreeMap<String, String>,
}

/// A retrieved chunk, decoded from a raw engine hit (spec §4.6, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceChunk {
    pub document_id: String,
    pub chunk_id: usize,
    pub blurb: String,
    pub content: String,
    pub source_type: String,
    pub source_links: BTreeMap<usize, String>,
    pub semantic_identifier: String,
    pub section_continuation: bool,
    pub boost: f32,
    pub hidden: bool,
    pub recency_bias: f32,
    pub score: f64,
    pub metadata: serde_json::Value,
    pub match_highlights: Vec<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
