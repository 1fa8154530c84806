//! Engine adapter: the HTTP surface between the pipeline and the search
//! engine's document/query API (spec §4.4 — "the hard part").

mod engine_client;
mod engine_fields;

use async_trait::async_trait;
use retrieval_config::{EngineConfig, IndexingConfig, RetrievalConfig};
use retrieval_core::{chunk_uuid, MetadataAwareChunk, RetrievalError, Result};
use retrieval_observability::{ComponentHealth, HealthCheck, HealthStatus};
use retrieval_search::{hit_to_inference_chunk, EngineHit, IndexFilters, InferenceChunk, QueryBuilder, RetrievalMode, RetrievalQueryConfig};
use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub use engine_fields::{build_engine_chunk, strip_invalid_unicode};

/// Outcome of indexing a single chunk (spec §4.4 step 7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOutcome {
    pub document_id: String,
    pub chunk_id: usize,
    pub already_existed: bool,
}

/// A partial-field update targeting a set of document ids (spec §4.4
/// "update"). Every field is optional; at least one should be set or the
/// request is skipped and logged.
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    pub document_ids: Vec<String>,
    pub boost: Option<f32>,
    pub document_sets: Option<BTreeSet<String>>,
    pub access: Option<BTreeSet<String>>,
    pub hidden: Option<bool>,
}

impl UpdateRequest {
    fn assign_fields(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut fields = serde_json::Map::new();
        if let Some(boost) = self.boost {
            fields.insert(
                "boost".to_string(),
                serde_json::json!({ "assign": boost }),
            );
        }
        if let Some(sets) = &self.document_sets {
            let map: serde_json::Map<String, serde_json::Value> =
                sets.iter().map(|s| (s.clone(), serde_json::json!(1))).collect();
            fields.insert(
                "document_sets".to_string(),
                serde_json::json!({ "assign": map }),
            );
        }
        if let Some(access) = &self.access {
            let map: serde_json::Map<String, serde_json::Value> =
                access.iter().map(|a| (a.clone(), serde_json::json!(1))).collect();
            fields.insert(
                "access_control_list".to_string(),
                serde_json::json!({ "assign": map }),
            );
        }
        if let Some(hidden) = self.hidden {
            fields.insert(
                "hidden".to_string(),
                serde_json::json!({ "assign": hidden }),
            );
        }
        fields
    }
}

const NAMESPACE: &str = "default";

/// URL construction and the document-scan/delete-all routine, kept as a
/// cheaply `Clone`+`'static` bundle so [`DocumentIndex::index`]'s spawned
/// tasks can share it without borrowing from `&self` (spec §4.4 steps 3,
/// "delete all chunks").
#[derive(Clone)]
struct Endpoints {
    client: reqwest::Client,
    content_base_url: String,
    search_url: String,
    index_name: String,
    batch_size: usize,
}

impl Endpoints {
    fn document_url(&self, uuid: uuid::Uuid) -> String {
        format!(
            "{}/document/v1/{NAMESPACE}/{}/docid/{uuid}",
            self.content_base_url, self.index_name
        )
    }

    fn scan_yql(&self, document_id: &str) -> String {
        format!(
            "select documentid from {} where document_id contains '{document_id}'",
            self.index_name
        )
    }

    /// Page through every chunk id for `document_id` via YQL against the
    /// search endpoint, with the mandatory 10-second engine-side timeout
    /// (spec §4.4 "delete all chunks", §5).
    async fn scan_document_ids(&self, document_id: &str, offset: usize) -> Result<Vec<uuid::Uuid>> {
        let yql = self.scan_yql(document_id);
        let offset_str = offset.to_string();
        let hits_str = self.batch_size.to_string();
        let body = engine_client::get_json_with_query(
            &self.client,
            &self.search_url,
            &[
                ("yql", yql.as_str()),
                ("timeout", "10s"),
                ("offset", offset_str.as_str()),
                ("hits", hits_str.as_str()),
            ],
        )
        .await?;
        let hits = body
            .get("root")
            .and_then(|root| root.get("children"))
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        Ok(hits
            .iter()
            .filter_map(|hit| hit.get("fields").and_then(|f| f.get("documentid")).and_then(|v| v.as_str()))
            .filter_map(|id| id.rsplit("::").next())
            .filter_map(|uuid_str| uuid::Uuid::parse_str(uuid_str).ok())
            .collect())
    }

    /// Delete every persisted chunk for `document_id` (spec §4.4 "delete
    /// all chunks"). Returns success iff every delete returned HTTP 200.
    async fn delete_all_chunks(&self, document_id: &str) -> Result<bool> {
        let mut offset = 0usize;
        let mut all_ok = true;
        loop {
            let page = self.scan_document_ids(document_id, offset).await?;
            let page_len = page.len();
            for uuid in &page {
                let ok = engine_client::delete(&self.client, &self.document_url(*uuid)).await?;
                all_ok = all_ok && ok;
            }
            if page_len < self.batch_size {
                break;
            }
            offset += page_len;
        }
        Ok(all_ok)
    }
}

/// The engine adapter (spec §4.4). Holds an HTTP client and the
/// configuration needed to address a specific deployment and index.
pub struct DocumentIndex {
    endpoints: Endpoints,
    engine: EngineConfig,
    indexing: IndexingConfig,
    retrieval: RetrievalConfig,
}

impl DocumentIndex {
    pub fn new(engine: EngineConfig, indexing: IndexingConfig, retrieval: RetrievalConfig) -> Self {
        let endpoints = Endpoints {
            client: reqwest::Client::new(),
            content_base_url: engine.content_base_url(),
            search_url: format!("{}/search/", engine.content_base_url()),
            index_name: engine.index_name.clone(),
            batch_size: indexing.batch_size,
        };
        Self {
            endpoints,
            engine,
            indexing,
            retrieval,
        }
    }

    fn search_url(&self) -> String {
        self.endpoints.search_url.clone()
    }

    fn prepare_and_activate_url(&self) -> String {
        format!(
            "{}/application/v2/tenant/default/prepareandactivate",
            self.engine.config_base_url()
        )
    }

    /// Index a flat sequence of decorated chunks (spec §4.4 steps 1-7).
    /// Chunks of the same document must be contiguous and ascending by
    /// `chunk_id` — callers must not reorder across documents.
    #[tracing::instrument(skip_all, fields(chunk_count = chunks.len()))]
    pub async fn index(&self, chunks: Vec<MetadataAwareChunk>) -> Result<Vec<IndexOutcome>> {
        let already_existing_documents: Arc<Mutex<HashSet<String>>> =
            Arc::new(Mutex::new(HashSet::new()));
        let semaphore = Arc::new(Semaphore::new(self.indexing.n_workers));

        let mut outcomes = Vec::with_capacity(chunks.len());
        for sub_batch in chunks.chunks(self.indexing.batch_size) {
            let mut tasks = Vec::with_capacity(sub_batch.len());
            for chunk in sub_batch {
                let permit = semaphore.clone().acquire_owned().await.map_err(|e| {
                    RetrievalError::internal(format!("worker pool closed: {e}"))
                })?;
                let chunk = chunk.clone();
                let already_existing = already_existing_documents.clone();
                let endpoints = self.endpoints.clone();
                tasks.push(tokio::spawn(async move {
                    let _permit = permit;
                    index_one_chunk(&endpoints, chunk, &already_existing).await
                }));
            }
            for task in tasks {
                let outcome = task
                    .await
                    .map_err(|e| RetrievalError::internal(format!("indexing task panicked: {e}")))??;
                outcomes.push(outcome);
            }
        }

        Ok(outcomes)
    }

    /// Delete every persisted chunk for `document_id` (spec §4.4 "delete
    /// all chunks"). Returns success iff every delete returned HTTP 200.
    pub async fn delete_all_chunks(&self, document_id: &str) -> Result<bool> {
        self.endpoints.delete_all_chunks(document_id).await
    }

    /// Apply a partial-field update to every chunk of every document named
    /// by `request` (spec §4.4 "update"). Skips and logs requests with no
    /// fields set; any per-chunk write failure is fatal.
    #[tracing::instrument(skip_all, fields(document_count = request.document_ids.len()))]
    pub async fn update(&self, request: &UpdateRequest) -> Result<()> {
        let fields = request.assign_fields();
        if fields.is_empty() {
            tracing::warn!(document_ids = ?request.document_ids, "update request has no fields set, skipping");
            return Ok(());
        }

        let semaphore = Arc::new(Semaphore::new(self.indexing.n_workers));
        for document_id in &request.document_ids {
            let mut offset = 0usize;
            loop {
                let page = self.endpoints.scan_document_ids(document_id, offset).await?;
                let page_len = page.len();
                let mut tasks = Vec::with_capacity(page.len());
                for uuid in page {
                    let permit = semaphore.clone().acquire_owned().await.map_err(|e| {
                        RetrievalError::internal(format!("worker pool closed: {e}"))
                    })?;
                    let client = self.endpoints.client.clone();
                    let url = self.endpoints.document_url(uuid);
                    let body = serde_json::json!({ "fields": fields });
                    let document_id = document_id.clone();
                    tasks.push(tokio::spawn(async move {
                        let _permit = permit;
                        engine_client::put_with_retry(&client, &url, body, |b| b)
                            .await
                            .map_err(|e| {
                                RetrievalError::external_service(
                                    "engine",
                                    format!("update failed for document {document_id}: {e}"),
                                )
                            })
                    }));
                }
                for task in tasks {
                    task.await
                        .map_err(|e| RetrievalError::internal(format!("update task panicked: {e}")))??;
                }
                if page_len < self.indexing.batch_size {
                    break;
                }
                offset += page_len;
            }
        }
        Ok(())
    }

    /// Delete every chunk of every document in `doc_ids` (spec §4.4
    /// "delete"). Any per-document failure is fatal.
    pub async fn delete(&self, doc_ids: &[String]) -> Result<()> {
        for document_id in doc_ids {
            let ok = self.endpoints.delete_all_chunks(document_id).await?;
            if !ok {
                return Err(RetrievalError::consistency(
                    document_id.clone(),
                    "failed to delete pre-existing chunks",
                ));
            }
        }
        Ok(())
    }

    /// Run a retrieval query against the engine (spec §4.4 "query").
    #[allow(clippy::too_many_arguments)]
    #[tracing::instrument(skip(self, filters, query_embedding), fields(mode = ?mode, num_to_retrieve))]
    pub async fn query(
        &self,
        mode: RetrievalMode,
        query: &str,
        filters: &IndexFilters,
        favor_recent: bool,
        num_to_retrieve: usize,
        query_embedding: Option<&[f32]>,
    ) -> Result<Vec<InferenceChunk>> {
        let config = RetrievalQueryConfig {
            doc_time_decay: self.retrieval.doc_time_decay,
            favor_recent_decay_multiplier: self.retrieval.favor_recent_decay_multiplier,
            untimed_doc_cutoff_days: self.retrieval.untimed_doc_cutoff_days,
            search_distance_cutoff: self.retrieval.search_distance_cutoff,
        };
        let structured = QueryBuilder::build(
            mode,
            &self.engine.index_name,
            query,
            filters,
            favor_recent,
            num_to_retrieve,
            self.retrieval.edit_keyword_query,
            query_embedding,
            &config,
        )?;

        let mut request = self.endpoints.client.get(self.search_url()).query(&[
            ("yql", structured.yql.as_str()),
            ("query", structured.query.as_str()),
            ("ranking", structured.ranking_profile),
            ("hits", &structured.hits.to_string()),
            ("offset", &structured.offset.to_string()),
        ]);
        for (key, value) in &structured.input_query_params {
            request = request.query(&[(format!("input.query({key})"), value.clone())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RetrievalError::network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(RetrievalError::external_service(
                "engine",
                format!("query failed with status {}", response.status()),
            ));
        }
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RetrievalError::serialization(e.to_string()))?;

        let hits: Vec<EngineHit> = body
            .get("root")
            .and_then(|root| root.get("children"))
            .and_then(|children| serde_json::from_value(children.clone()).ok())
            .unwrap_or_default();

        Ok(hits.iter().filter_map(hit_to_inference_chunk).collect())
    }

    /// Deploy the engine schema (spec §4.4 "ensure_indices_exist").
    /// Idempotent; a non-200 response is fatal.
    pub async fn ensure_indices_exist(&self) -> Result<()> {
        let Some(path) = &self.engine.deployment_zip_path else {
            return Err(RetrievalError::configuration(
                "deployment_zip_path is required to deploy the engine schema",
            ));
        };
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RetrievalError::internal(format!("reading deployment zip: {e}")))?;
        engine_client::post_zip(&self.endpoints.client, &self.prepare_and_activate_url(), bytes).await
    }

    /// A [`HealthCheck`] that probes the engine's search endpoint,
    /// surfaced by the CLI's `status` command.
    pub fn health_check(self: &Arc<Self>) -> Arc<dyn HealthCheck> {
        Arc::new(EngineHealthCheck {
            document_index: self.clone(),
        })
    }
}

struct EngineHealthCheck {
    document_index: Arc<DocumentIndex>,
}

#[async_trait]
impl HealthCheck for EngineHealthCheck {
    fn name(&self) -> &str {
        "engine"
    }

    async fn check(&self) -> ComponentHealth {
        let url = self.document_index.search_url();
        let now = retrieval_core::Utc::now();
        match self.document_index.endpoints.client.get(&url).send().await {
            Ok(response) if response.status().is_success() || response.status().as_u16() == 400 => {
                ComponentHealth {
                    name: self.name().to_string(),
                    status: HealthStatus::Healthy,
                    message: "engine reachable".to_string(),
                    checked_at: now,
                }
            }
            Ok(response) => ComponentHealth {
                name: self.name().to_string(),
                status: HealthStatus::Degraded,
                message: format!("engine responded with status {}", response.status()),
                checked_at: now,
            },
            Err(error) => ComponentHealth {
                name: self.name().to_string(),
                status: HealthStatus::Unhealthy,
                message: format!("engine unreachable: {error}"),
                checked_at: now,
            },
        }
    }
}

async fn index_one_chunk(
    endpoints: &Endpoints,
    chunk: MetadataAwareChunk,
    already_existing_documents: &Mutex<HashSet<String>>,
) -> Result<IndexOutcome> {
    let document_id = chunk.document_id().to_string();
    let chunk_id = chunk.chunk_id();
    let uuid = chunk_uuid(&document_id, chunk_id);
    let url = endpoints.document_url(uuid);

    let chunk_existed = engine_client::probe_exists(&endpoints.client, &url).await?;
    if chunk_existed {
        let first_seen = {
            let mut set = already_existing_documents.lock().unwrap();
            if set.contains(&document_id) {
                false
            } else {
                set.insert(document_id.clone());
                true
            }
        };
        if first_seen {
            let deleted = endpoints.delete_all_chunks(&document_id).await?;
            if !deleted {
                return Err(RetrievalError::consistency(
                    document_id.clone(),
                    "failed to delete pre-existing chunks",
                ));
            }
        }
    }

    let engine_chunk = build_engine_chunk(&chunk);
    let body = serde_json::json!({ "fields": engine_chunk });
    engine_client::put_with_retry(&endpoints.client, &url, body, |mut value| {
        if let Some(fields) = value.get_mut("fields") {
            if let Ok(mut engine_chunk) = serde_json::from_value::<retrieval_core::EngineChunk>(fields.clone()) {
                strip_invalid_unicode(&mut engine_chunk);
                *fields = serde_json::to_value(engine_chunk).unwrap_or(fields.clone());
            }
        }
        value
    })
    .await?;

    let already_existed = already_existing_documents.lock().unwrap().contains(&document_id);
    Ok(IndexOutcome {
        document_id,
        chunk_id,
        already_existed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_with_no_fields_is_empty() {
        let request = UpdateRequest {
            document_ids: vec!["doc1".into()],
            ..Default::default()
        };
        assert!(request.assign_fields().is_empty());
    }

    #[test]
    fn update_request_boost_assigns_a_single_field() {
        let request = UpdateRequest {
            document_ids: vec!["doc1".into()],
            boost: Some(2.0),
            ..Default::default()
        };
        let fields = request.assign_fields();
        assert_eq!(fields["boost"]["assign"], serde_json::json!(2.0));
    }
}
