pub mod query;
pub mod render;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::ElasticSettings;
use crate::core::errors::SearchFault;

pub use query::SearchRequest;

/// One document returned by the backend. The source mapping is read-only and
/// only lives long enough to be formatted.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub source: Map<String, Value>,
    pub score: Option<f64>,
}

impl SearchHit {
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.source.get(name).and_then(|v| v.as_str())
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.source.get(name)
    }
}

/// Thin REST adapter over the hosted Elasticsearch cluster. Holds the
/// connection settings and a shared reqwest client; all operations return
/// typed faults instead of strings so callers decide the user-facing text.
#[derive(Clone)]
pub struct EsClient {
    base_url: String,
    username: String,
    password: String,
    client: Client,
}

impl EsClient {
    pub fn new(settings: &ElasticSettings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!settings.verify_certs)
            .build()?;

        Ok(Self {
            base_url: settings.base_url(),
            username: settings.username.clone(),
            password: settings.password.clone(),
            client,
        })
    }

    /// Liveness check against the cluster root. A reachable cluster that
    /// refuses the request (bad credentials, security not ready) reports
    /// `Ok(false)`; only transport failures become faults.
    pub async fn ping(&self) -> Result<bool, SearchFault> {
        let res = self
            .client
            .head(&self.base_url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(SearchFault::connectivity)?;

        Ok(res.status().is_success())
    }

    /// Number of documents in `index`. A missing index is its own condition
    /// so the tool layer can say "index not found" rather than "cluster down".
    pub async fn count(&self, index: &str) -> Result<u64, SearchFault> {
        let url = format!("{}/{}/_count", self.base_url, index);
        let res = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(SearchFault::connectivity)?;

        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SearchFault::IndexNotFound(index.to_string()));
        }
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(SearchFault::Backend(format!("{}: {}", status, body)));
        }

        let payload: CountResponse = res.json().await.map_err(backend_fault)?;
        Ok(payload.count)
    }

    /// Executes a built request against `index`. Zero matching documents is
    /// an empty vec, not a fault.
    pub async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<Vec<SearchHit>, SearchFault> {
        let url = format!("{}/{}/_search", self.base_url, index);
        let body = request.to_body();

        let res = self
            .client
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await
            .map_err(SearchFault::connectivity)?;

        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SearchFault::IndexNotFound(index.to_string()));
        }
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(SearchFault::Backend(format!("{}: {}", status, body)));
        }

        let payload: SearchResponse = res.json().await.map_err(backend_fault)?;

        let hits = payload
            .hits
            .hits
            .into_iter()
            .map(|raw| SearchHit {
                source: match raw.source {
                    Value::Object(map) => map,
                    _ => Map::new(),
                },
                score: raw.score,
            })
            .collect();

        Ok(hits)
    }
}

fn backend_fault<E: std::fmt::Display>(err: E) -> SearchFault {
    SearchFault::Backend(err.to_string())
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Deserialize)]
struct RawHit {
    #[serde(rename = "_source", default)]
    source: Value,
    #[serde(rename = "_score", default)]
    score: Option<f64>,
}
