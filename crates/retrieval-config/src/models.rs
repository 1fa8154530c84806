use serde::{Deserialize, Serialize};

/// Addressing and deployment settings for the search engine (spec §6
/// "Configuration inputs": `HOST, PORT, TENANT_PORT, INDEX_NAME,
/// DEPLOYMENT_ZIP_PATH`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub host: String,
    pub port: u16,
    pub tenant_port: u16,
    pub index_name: String,
    pub deployment_zip_path: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            tenant_port: 19071,
            index_name: "danswer_chunk".to_string(),
            deployment_zip_path: None,
        }
    }
}

impl EngineConfig {
    pub fn content_base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn config_base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.tenant_port)
    }
}

/// Chunking and indexing batch settings (spec §6: `CHUNK_SIZE,
/// CHUNK_OVERLAP, BLURB_SIZE, MINI_CHUNK_SIZE, BATCH_SIZE=128,
/// N_WORKERS=32, MAX_SUMMARY_LEN=400`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub blurb_size: usize,
    pub mini_chunk_size: usize,
    pub batch_size: usize,
    pub n_workers: usize,
    pub max_summary_len: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 0,
            blurb_size: 100,
            mini_chunk_size: 150,
            batch_size: 128,
            n_workers: 32,
            max_summary_len: 400,
        }
    }
}

/// Query-time settings (spec §6: `DOC_TIME_DECAY,
/// FAVOR_RECENT_DECAY_MULTIPLIER, NUM_RETURNED_HITS, EDIT_KEYWORD_QUERY,
/// SEARCH_DISTANCE_CUTOFF, UNTIMED_DOC_CUTOFF_DAYS=92`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub doc_time_decay: f64,
    pub favor_recent_decay_multiplier: f64,
    pub num_returned_hits: usize,
    pub edit_keyword_query: bool,
    pub search_distance_cutoff: Option<f64>,
    pub untimed_doc_cutoff_days: i64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            doc_time_decay: 0.5,
            favor_recent_decay_multiplier: 0.5,
            num_returned_hits: 50,
            edit_keyword_query: true,
            search_distance_cutoff: None,
            untimed_doc_cutoff_days: 92,
        }
    }
}

/// Top-level configuration, the unit `figment` extracts into.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub indexing: IndexingConfig,
    pub retrieval: RetrievalConfig,
}
