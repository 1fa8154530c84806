//! End-to-end tests against an in-process `axum` server standing in for
//! the Vespa engine (SPEC_FULL §6.1 ambient test tooling), covering the
//! fresh-insert and re-index scenarios from spec.md §8.

use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use retrieval_config::{EngineConfig, IndexingConfig, RetrievalConfig};
use retrieval_core::traits::WhitespaceTokenizer;
use retrieval_core::{Document, Section, SourceType};
use retrieval_indexer::{DocumentIndex, InMemoryRecordOfTruth, IndexingPipeline};
use retrieval_vector::MockEmbedder;
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct EngineState {
    documents: HashMap<String, serde_json::Value>,
}

type SharedState = Arc<Mutex<EngineState>>;

async fn get_document(
    State(state): State<SharedState>,
    AxumPath(id): AxumPath<String>,
) -> StatusCode {
    if state.lock().unwrap().documents.contains_key(&id) {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn put_document(
    State(state): State<SharedState>,
    AxumPath(id): AxumPath<String>,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    state.lock().unwrap().documents.insert(id, body);
    StatusCode::OK
}

async fn delete_document(
    State(state): State<SharedState>,
    AxumPath(id): AxumPath<String>,
) -> StatusCode {
    state.lock().unwrap().documents.remove(&id);
    StatusCode::OK
}

/// Stands in for Vespa's `/search/` endpoint, used both for YQL chunk-id
/// scans (`select documentid from ... where document_id contains '...'`)
/// and regular retrieval queries.
async fn search(
    State(state): State<SharedState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Json<serde_json::Value> {
    let yql = params.get("yql").cloned().unwrap_or_default();
    if !yql.starts_with("select documentid from") {
        return Json(serde_json::json!({ "root": { "children": [] } }));
    }

    let document_id = yql
        .rsplit("document_id contains '")
        .next()
        .and_then(|rest| rest.strip_suffix('\''))
        .unwrap_or_default()
        .to_string();

    let state = state.lock().unwrap();
    let children: Vec<serde_json::Value> = state
        .documents
        .iter()
        .filter(|(_, body)| {
            body.get("fields")
                .and_then(|f| f.get("document_id"))
                .and_then(|v| v.as_str())
                == Some(document_id.as_str())
        })
        .map(|(uuid, _)| {
            serde_json::json!({ "fields": { "documentid": format!("id:default:danswer_chunk::{uuid}") } })
        })
        .collect();

    Json(serde_json::json!({ "root": { "children": children } }))
}

async fn spawn_engine() -> (SocketAddr, SharedState) {
    let state: SharedState = Arc::new(Mutex::new(EngineState::default()));
    let router = Router::new()
        .route(
            "/document/v1/default/:index/docid/:id",
            get(get_document).put(put_document).delete(delete_document),
        )
        .route("/search/", get(search))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, state)
}

fn sample_document(id: &str) -> Document {
    Document {
        id: id.to_string(),
        semantic_identifier: format!("{id} title"),
        source_type: SourceType::File,
        sections: vec![Section::new("hello world, this is a test document.")],
        metadata: Default::default(),
        primary_owners: Default::default(),
        secondary_owners: Default::default(),
        doc_updated_at: None,
    }
}

fn pipeline_against(addr: SocketAddr) -> IndexingPipeline {
    let engine = EngineConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        ..EngineConfig::default()
    };
    let document_index = Arc::new(DocumentIndex::new(
        engine,
        IndexingConfig::default(),
        RetrievalConfig::default(),
    ));
    IndexingPipeline::new(
        Arc::new(InMemoryRecordOfTruth::new()),
        Arc::new(MockEmbedder::new(8)),
        document_index,
        Arc::new(WhitespaceTokenizer),
        512,
        0,
        100,
    )
}

#[tokio::test]
async fn fresh_document_is_written_and_not_already_existed() {
    let (addr, state) = spawn_engine().await;
    let pipeline = pipeline_against(addr);

    let outcome = pipeline
        .run(&[sample_document("doc1")])
        .await
        .expect("pipeline run should succeed");

    assert_eq!(outcome.new_document_count, 1);
    assert_eq!(outcome.chunk_count, 1);
    assert_eq!(state.lock().unwrap().documents.len(), 1);
}

#[tokio::test]
async fn reindexing_the_same_document_replaces_its_chunks() {
    let (addr, state) = spawn_engine().await;
    let pipeline = pipeline_against(addr);

    pipeline
        .run(&[sample_document("doc1")])
        .await
        .expect("first run should succeed");
    assert_eq!(state.lock().unwrap().documents.len(), 1);

    pipeline
        .run(&[sample_document("doc1")])
        .await
        .expect("second run should succeed");

    // Re-indexing writes the same single chunk id again; no duplicates left
    // behind by the delete-all-before-write step.
    assert_eq!(state.lock().unwrap().documents.len(), 1);
}
