//! Low-level HTTP plumbing against the engine's document/query API
//! (spec §4.4, §6). Kept separate from [`super::DocumentIndex`] so the
//! retry/backoff mechanics are testable without the worker-pool logic
//! around them.

use retrieval_core::{RetrievalError, Result};
use std::time::Duration;

/// Whether a chunk's engine id currently exists (spec §4.4 step 2).
pub async fn probe_exists(client: &reqwest::Client, url: &str) -> Result<bool> {
    let response = client.get(url).send().await.map_err(network_error)?;
    match response.status().as_u16() {
        200 => Ok(true),
        404 => Ok(false),
        status => Err(RetrievalError::external_service(
            "engine",
            format!("unexpected status probing {url}: {status}"),
        )),
    }
}

/// PUT `body` to `url`, repairing and retrying once on HTTP 400, and
/// retrying up to 3 tries total (1s, 2s backoff) on 5xx/network errors
/// (spec §4.4 steps 5-6, §7 "Transient network").
pub async fn put_with_retry<F>(
    client: &reqwest::Client,
    url: &str,
    body: serde_json::Value,
    mut repair: F,
) -> Result<()>
where
    F: FnMut(serde_json::Value) -> serde_json::Value,
{
    let mut body = body;
    let mut repaired_once = false;
    let mut delay = Duration::from_secs(1);

    for attempt in 0..3 {
        let result = client.put(url).json(&body).send().await;
        match result {
            Ok(response) if response.status().is_success() => return Ok(()),
            Ok(response) if response.status().as_u16() == 400 && !repaired_once => {
                repaired_once = true;
                body = repair(body);
                continue;
            }
            Ok(response) if response.status().is_server_error() && attempt < 2 => {
                tracing::debug!(attempt, status = %response.status(), "retrying transient write failure");
                tokio::time::sleep(delay).await;
                delay *= 2;
                continue;
            }
            Ok(response) => {
                return Err(RetrievalError::external_service(
                    "engine",
                    format!("write to {url} failed with status {}", response.status()),
                ));
            }
            Err(error) if attempt < 2 => {
                tracing::debug!(attempt, %error, "retrying after network error");
                tokio::time::sleep(delay).await;
                delay *= 2;
                continue;
            }
            Err(error) => return Err(network_error(error)),
        }
    }

    Err(RetrievalError::external_service(
        "engine",
        format!("write to {url} exhausted retry budget"),
    ))
}

pub async fn delete(client: &reqwest::Client, url: &str) -> Result<bool> {
    let response = client.delete(url).send().await.map_err(network_error)?;
    Ok(response.status().is_success())
}

pub async fn get_json(client: &reqwest::Client, url: &str) -> Result<serde_json::Value> {
    let response = client.get(url).send().await.map_err(network_error)?;
    if !response.status().is_success() {
        return Err(RetrievalError::external_service(
            "engine",
            format!("GET {url} failed with status {}", response.status()),
        ));
    }
    response.json().await.map_err(|e| RetrievalError::serialization(e.to_string()))
}

/// GET `url` with query parameters, used for YQL scan/search requests
/// (spec §4.4, §5 — these carry an explicit `timeout` param rather than a
/// client-side deadline).
pub async fn get_json_with_query(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<serde_json::Value> {
    let response = client.get(url).query(query).send().await.map_err(network_error)?;
    if !response.status().is_success() {
        return Err(RetrievalError::external_service(
            "engine",
            format!("GET {url} failed with status {}", response.status()),
        ));
    }
    response.json().await.map_err(|e| RetrievalError::serialization(e.to_string()))
}

pub async fn post_zip(client: &reqwest::Client, url: &str, bytes: Vec<u8>) -> Result<()> {
    let response = client
        .post(url)
        .header("Content-Type", "application/zip")
        .body(bytes)
        .send()
        .await
        .map_err(network_error)?;
    if response.status().is_success() {
        Ok(())
    } else {
        Err(RetrievalError::external_service(
            "engine",
            format!("prepare-and-activate failed with status {}", response.status()),
        ))
    }
}

fn network_error(error: reqwest::Error) -> RetrievalError {
    RetrievalError::network(error.to_string())
}
