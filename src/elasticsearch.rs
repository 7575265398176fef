//! Elasticsearch REST backend.
//!
//! Implements [`SearchBackend`] over the Elasticsearch HTTP API using
//! `reqwest`:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | get by id | `GET /{index}/_doc/{id}` (404 → absent) |
//! | search | `POST /{index}/_search` with a `multi_match` query and `from`/`size` |
//! | bulk upsert | `POST /{index}/_bulk` (NDJSON `index` actions) |
//! | refresh | `POST /{index}/_refresh` |
//! | health | `GET /_cluster/health` |
//!
//! Transport failures map to [`Error::BackendUnavailable`]; error statuses
//! map to [`Error::Backend`]. Nothing is retried.

use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use product_search_core::backend::{
    BulkItem, BulkOutcome, Hit, SearchBackend, SearchHits, SearchQuery,
};
use product_search_core::{Error, Result};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::BackendConfig;

/// Subset of `GET /_cluster/health`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterHealth {
    pub cluster_name: String,
    /// `green`, `yellow`, or `red`.
    pub status: String,
    #[serde(default)]
    pub number_of_nodes: u64,
}

impl ClusterHealth {
    pub fn is_healthy(&self) -> bool {
        self.status != "red"
    }
}

pub struct ElasticsearchBackend {
    client: reqwest::Client,
    base_url: Url,
    username: Option<String>,
    password: Option<String>,
}

impl ElasticsearchBackend {
    pub fn new(config: &BackendConfig) -> anyhow::Result<Self> {
        let url = match config.url.as_deref() {
            Some(u) => u,
            None => bail!("backend.url is required for the elasticsearch backend"),
        };
        let base_url =
            Url::parse(url).with_context(|| format!("Invalid backend.url: {}", url))?;
        if base_url.cannot_be_a_base() {
            bail!("Invalid backend.url: {}", url);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Query cluster health.
    pub async fn health(&self) -> Result<ClusterHealth> {
        let resp = self.send(self.request(Method::GET, &["_cluster", "health"])).await?;
        let body = read_json(check(resp).await?).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Drop `index`. A missing index is not an error.
    pub async fn delete_index(&self, index: &str) -> Result<()> {
        let resp = self.send(self.request(Method::DELETE, &[index])).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check(resp).await?;
        Ok(())
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!(%method, %url, "elasticsearch request");
        let req = self.client.request(method, url);
        match &self.username {
            Some(user) => req.basic_auth(user, self.password.as_ref()),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        req.send()
            .await
            .map_err(|e| Error::unavailable("request to elasticsearch failed", e))
    }
}

/// Turn a non-success status into [`Error::Backend`].
async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(Error::Backend {
        status: status.as_u16(),
        message,
    })
}

async fn read_json(resp: Response) -> Result<Value> {
    let text = resp
        .text()
        .await
        .map_err(|e| Error::unavailable("failed to read elasticsearch response", e))?;
    Ok(serde_json::from_str(&text)?)
}

fn malformed(what: &str) -> Error {
    Error::Backend {
        status: 200,
        message: format!("malformed response: {}", what),
    }
}

/// Request body for one search window.
pub fn search_body(query: &SearchQuery<'_>) -> Value {
    json!({
        "from": query.offset,
        "size": query.limit,
        "track_total_hits": true,
        "query": {
            "multi_match": {
                "query": query.text,
                "fields": query.fields,
            }
        }
    })
}

/// NDJSON body for a bulk upsert: one `index` action line and one source
/// line per item, newline-terminated.
pub fn bulk_body(items: &[BulkItem]) -> Result<String> {
    let mut body = String::new();
    for item in items {
        let action = match &item.id {
            Some(id) => json!({ "index": { "_id": id } }),
            None => json!({ "index": {} }),
        };
        body.push_str(&serde_json::to_string(&action)?);
        body.push('\n');
        body.push_str(&serde_json::to_string(&item.source)?);
        body.push('\n');
    }
    Ok(body)
}

fn parse_hit(value: &Value) -> Result<Hit> {
    let id = value
        .get("_id")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("hit without _id"))?;
    let source = value
        .get("_source")
        .cloned()
        .ok_or_else(|| malformed("hit without _source"))?;
    Ok(Hit {
        id: id.to_string(),
        source,
    })
}

pub fn parse_search_response(body: &Value) -> Result<SearchHits> {
    let hits = body.get("hits").ok_or_else(|| malformed("missing hits"))?;

    // 7.x+ reports `{ "value": n, "relation": .. }`; older versions a bare number.
    let total_hits = match hits.get("total") {
        Some(Value::Object(t)) => t.get("value").and_then(Value::as_u64),
        Some(t) => t.as_u64(),
        None => None,
    }
    .ok_or_else(|| malformed("missing hits.total"))?;

    let hits = hits
        .get("hits")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("missing hits.hits"))?
        .iter()
        .map(parse_hit)
        .collect::<Result<Vec<_>>>()?;

    Ok(SearchHits { total_hits, hits })
}

pub fn parse_bulk_response(body: &Value) -> Result<Vec<BulkOutcome>> {
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("missing items"))?;

    items
        .iter()
        .enumerate()
        .map(|(position, item)| -> Result<BulkOutcome> {
            let result = item
                .as_object()
                .and_then(|op| op.values().next())
                .ok_or_else(|| malformed("empty bulk item"))?;
            let id = result
                .get("_id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let error = result.get("error").map(|e| {
                e.get("reason")
                    .or_else(|| e.get("type"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string())
            });
            Ok(BulkOutcome {
                position,
                id,
                error,
            })
        })
        .collect()
}

#[async_trait]
impl SearchBackend for ElasticsearchBackend {
    async fn get_by_id(&self, index: &str, id: &str) -> Result<Option<Hit>> {
        let resp = self.send(self.request(Method::GET, &[index, "_doc", id])).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = read_json(check(resp).await?).await?;
        if body.get("found").and_then(Value::as_bool) == Some(false) {
            return Ok(None);
        }
        Ok(Some(parse_hit(&body)?))
    }

    async fn search(&self, index: &str, query: &SearchQuery<'_>) -> Result<SearchHits> {
        let req = self
            .request(Method::POST, &[index, "_search"])
            .json(&search_body(query));
        let resp = self.send(req).await?;
        // Searching an index that does not exist yet matches nothing.
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(SearchHits::default());
        }
        let body = read_json(check(resp).await?).await?;
        parse_search_response(&body)
    }

    async fn bulk_upsert(&self, index: &str, items: &[BulkItem]) -> Result<Vec<BulkOutcome>> {
        let req = self
            .request(Method::POST, &[index, "_bulk"])
            .header("Content-Type", "application/x-ndjson")
            .body(bulk_body(items)?);
        let resp = self.send(req).await?;
        let body = read_json(check(resp).await?).await?;
        parse_bulk_response(&body)
    }

    async fn refresh(&self, index: &str) -> Result<()> {
        let resp = self.send(self.request(Method::POST, &[index, "_refresh"])).await?;
        check(resp).await?;
        Ok(())
    }
}
