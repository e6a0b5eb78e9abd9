//! HTTP client for the daemon's external controller API
//!
//! Thin JSON transport: joins percent-encoded path segments onto the
//! configured base URL, attaches the bearer secret when one is set, and
//! maps every failure mode (connect failure, non-2xx status, timeout,
//! malformed body) to the single `Error::Transport` kind. The daemon is
//! local, so failures are treated as immediately actionable and nothing
//! is retried.

use crate::proxy::{DelayResult, ProxyEntry, ProxySnapshot, RawProxy};
use crate::{Error, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client bound to one daemon endpoint
pub struct ApiClient {
    base: url::Url,
    secret: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ProxiesResponse {
    #[serde(default)]
    proxies: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct DelayResponse {
    #[serde(default)]
    delay: Option<i64>,
}

impl ApiClient {
    /// Create a client with the default timeout.
    pub fn new(host: &str, secret: Option<String>) -> Result<Self> {
        Self::with_timeout(host, secret, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit per-request timeout.
    pub fn with_timeout(host: &str, secret: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(ApiClient {
            base: normalize_base(host)?,
            secret,
            client,
        })
    }

    /// Fetch the full proxy map as one classified snapshot.
    pub async fn proxies(&self) -> Result<ProxySnapshot> {
        let resp = self.send(Method::GET, &["proxies"], None, &[]).await?;
        let value = Self::read_json(resp).await?;
        let parsed: ProxiesResponse = serde_json::from_value(value)
            .map_err(|e| Error::transport(format!("unexpected /proxies response: {}", e)))?;

        let mut entries = Vec::with_capacity(parsed.proxies.len());
        for (key, value) in parsed.proxies {
            entries.push(decode_entry(value, &key)?);
        }
        Ok(ProxySnapshot::new(entries))
    }

    /// Fetch a single entry fresh; a 404 maps to the topology `NotFound`
    /// error, every other non-2xx stays a transport failure.
    pub async fn proxy(&self, name: &str) -> Result<ProxyEntry> {
        let resp = self.send(Method::GET, &["proxies", name], None, &[]).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(Error::not_found(name));
        }
        let value = Self::read_json(resp).await?;
        decode_entry(value, name)
    }

    /// Switch a group's active member. Idempotent at the daemon: selecting
    /// the already-active node is a no-op success.
    pub async fn select(&self, group: &str, node: &str) -> Result<Value> {
        let body = json!({ "name": node });
        let resp = self
            .send(Method::PUT, &["proxies", group], Some(body), &[])
            .await?;
        Self::read_json(resp).await
    }

    /// Probe one node's delay against `test_url`.
    pub async fn delay(&self, name: &str, test_url: &str, timeout_ms: u64) -> Result<DelayResult> {
        let query = [
            ("timeout", timeout_ms.to_string()),
            ("url", test_url.to_string()),
        ];
        let resp = self
            .send(Method::GET, &["proxies", name, "delay"], None, &query)
            .await?;
        let value = Self::read_json(resp).await?;
        let parsed: DelayResponse = serde_json::from_value(value)
            .map_err(|e| Error::transport(format!("unexpected delay response: {}", e)))?;
        Ok(DelayResult::from_wire(name, parsed.delay))
    }

    /// Join path segments onto the base URL, percent-encoding each
    /// segment individually (names may contain spaces, slashes, or
    /// non-ASCII).
    fn endpoint(&self, segments: &[&str]) -> Result<url::Url> {
        let path = segments
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        Ok(self.base.join(&path)?)
    }

    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Value>,
        query: &[(&str, String)],
    ) -> Result<Response> {
        let url = self.endpoint(segments)?;
        debug!("{} {}", method, url);

        let mut req = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(ref secret) = self.secret {
            req = req.header(AUTHORIZATION, format!("Bearer {}", secret));
        }
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        Ok(req.send().await?)
    }

    /// Enforce a 2xx status and parse the body. An empty body is success
    /// with an empty object: mutating calls return no content.
    async fn read_json(resp: Response) -> Result<Value> {
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::transport(format!("HTTP {}: {}", status, body.trim())));
        }
        if body.is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        serde_json::from_str(&body)
            .map_err(|e| Error::transport(format!("malformed JSON body: {}", e)))
    }
}

/// Typed decode of one wire entry; the map key backfills a missing name.
fn decode_entry(value: Value, name: &str) -> Result<ProxyEntry> {
    let mut raw: RawProxy = serde_json::from_value(value)
        .map_err(|e| Error::transport(format!("unexpected proxy entry '{}': {}", name, e)))?;
    if raw.name.is_empty() {
        raw.name = name.to_string();
    }
    Ok(ProxyEntry::classify(raw))
}

/// Normalize `host[:port]` into a base URL. A bare address gains an
/// `http://` scheme; a trailing slash makes `Url::join` append instead of
/// replace.
fn normalize_base(host: &str) -> Result<url::Url> {
    let trimmed = host.trim_end_matches('/');
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };
    url::Url::parse(&format!("{}/", with_scheme))
        .map_err(|e| Error::transport(format!("invalid host '{}': {}", host, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_adds_scheme() {
        let url = normalize_base("127.0.0.1:9090").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9090/");
    }

    #[test]
    fn test_normalize_base_keeps_scheme() {
        let url = normalize_base("https://router.local:9090/").unwrap();
        assert_eq!(url.as_str(), "https://router.local:9090/");
    }

    #[test]
    fn test_normalize_base_rejects_garbage() {
        assert!(normalize_base("").is_err());
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = ApiClient::new("127.0.0.1:9090", None).unwrap();
        let url = client.endpoint(&["proxies", "My/Node 1"]).unwrap();
        assert_eq!(url.path(), "/proxies/My%2FNode%201");

        let url = client.endpoint(&["proxies", "Proxy", "delay"]).unwrap();
        assert_eq!(url.path(), "/proxies/Proxy/delay");
    }

    #[test]
    fn test_endpoint_encodes_non_ascii() {
        let client = ApiClient::new("127.0.0.1:9090", None).unwrap();
        let url = client.endpoint(&["proxies", "香港 01"]).unwrap();
        assert_eq!(url.path(), "/proxies/%E9%A6%99%E6%B8%AF%2001");
    }

    #[test]
    fn test_decode_entry_backfills_name() {
        let entry = decode_entry(json!({ "type": "Direct", "udp": true }), "DIRECT").unwrap();
        assert_eq!(entry.name(), "DIRECT");
        assert!(!entry.is_group());
    }

    #[test]
    fn test_decode_entry_requires_type() {
        let err = decode_entry(json!({ "name": "x" }), "x").unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
