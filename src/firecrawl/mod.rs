//! Client for the Firecrawl structured-extraction service.
//!
//! Two endpoints are used: `/v1/map` to discover item URLs and `/v1/extract`
//! to pull a typed component payload out of a page. Extraction responses are
//! duck-typed JSON; they are normalized into a tagged [`ExtractOutcome`] and
//! only treated as usable after the `name` field validates, which is the gate
//! for stage one of the extraction ladder.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::page_extractor::schema::{ComponentPayload, PropInfo};

/// Production endpoint of the extraction service.
pub const DEFAULT_ENDPOINT: &str = "https://api.firecrawl.dev";

/// Natural-language instruction sent alongside the field schema.
const EXTRACT_PROMPT: &str = "Extract detailed information about this React component from the page. \
Look for the component name in the heading. \
Find any code examples in code blocks or syntax-highlighted areas. \
Locate prop information in the props table if it exists. \
Check for dependencies listed at the bottom of the page.";

/// Outcome of a structured extraction attempt.
///
/// `Unusable` covers both transport-level success with a degenerate payload
/// (missing name, error marker) and service-reported failures; the caller
/// falls through to the browser ladder either way.
#[derive(Debug)]
pub enum ExtractOutcome {
    Usable(ComponentPayload),
    Unusable { reason: String },
}

/// HTTP client for the extraction service.
#[derive(Debug, Clone)]
pub struct FirecrawlClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl FirecrawlClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT)
    }

    /// Construct against a non-default endpoint (used by tests).
    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Field schema for component extraction, mirroring the gallery's page
    /// structure: name/description/code plus a props table and a dependency
    /// list.
    fn component_schema() -> Value {
        json!({
            "name": {
                "type": "string",
                "description": "The name of the component, found in h1 or h2"
            },
            "description": {
                "type": "string",
                "description": "Brief description of the component, often found in a paragraph under the heading"
            },
            "code": {
                "type": "string",
                "description": "The code example for the component, found in code blocks"
            },
            "props": {
                "type": "array",
                "description": "List of props from the props table",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "type": { "type": "string" },
                        "defaultValue": { "type": "string" },
                        "description": { "type": "string" }
                    }
                }
            },
            "dependencies": {
                "type": "array",
                "description": "List of dependencies required for this component",
                "items": { "type": "string" }
            }
        })
    }

    /// Discover URLs under `url` via the mapping endpoint.
    pub async fn map_site(&self, url: &str, limit: usize) -> Result<Vec<String>> {
        let response = self
            .http
            .post(format!("{}/v1/map", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "url": url,
                "includeSubdomains": false,
                "limit": limit,
                "sitemapOnly": false,
            }))
            .send()
            .await
            .context("map request failed")?
            .error_for_status()
            .context("map request rejected")?;

        let body: Value = response.json().await.context("map response not JSON")?;

        // The service has shipped both {links: [...]} and a bare array.
        let links = body
            .get("links")
            .and_then(Value::as_array)
            .or_else(|| body.as_array())
            .context("map response carried no links array")?;

        Ok(links
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect())
    }

    /// Run structured extraction against one item URL.
    ///
    /// Transport errors propagate; payload-shape problems are folded into
    /// `ExtractOutcome::Unusable` so the caller can fall back.
    pub async fn extract_component(&self, url: &str) -> Result<ExtractOutcome> {
        let response = self
            .http
            .post(format!("{}/v1/extract", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "urls": [url],
                "schema": Self::component_schema(),
                "prompt": EXTRACT_PROMPT,
            }))
            .send()
            .await
            .context("extract request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            return Ok(ExtractOutcome::Unusable {
                reason: format!("extraction service returned {status}"),
            });
        }

        let body: Value = response.json().await.context("extract response not JSON")?;

        if body.get("error").is_some_and(|e| !e.is_null()) {
            return Ok(ExtractOutcome::Unusable {
                reason: format!("service error: {}", body["error"]),
            });
        }

        // Some responses nest the record under "data", some return it flat.
        let record = body.get("data").unwrap_or(&body);

        match payload_from_extraction(record, url) {
            Some(payload) => {
                debug!("Structured extraction succeeded for {url}");
                Ok(ExtractOutcome::Usable(payload))
            }
            None => Ok(ExtractOutcome::Unusable {
                reason: "extraction returned incomplete data".to_string(),
            }),
        }
    }
}

/// Normalize a duck-typed extraction record into a [`ComponentPayload`].
///
/// Returns `None` unless a non-empty `name` is present and no error marker is
/// set. Props arrive either as an array of `{name, type, defaultValue,
/// description}` rows (the schema shape) or as a name-keyed object; both are
/// accepted.
pub fn payload_from_extraction(record: &Value, url: &str) -> Option<ComponentPayload> {
    if record.get("error").is_some_and(|e| e.as_bool() == Some(true)) {
        return None;
    }

    let name = record.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    let description = record
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let code = record
        .get("code")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let dependencies = record
        .get("dependencies")
        .and_then(Value::as_array)
        .map(|deps| {
            deps.iter()
                .filter_map(|d| d.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    let props = record.get("props").map(normalize_props).unwrap_or_default();

    Some(ComponentPayload {
        name: name.to_string(),
        description,
        props,
        dependencies,
        code,
        url: url.to_string(),
        ..ComponentPayload::default()
    })
}

fn normalize_props(props: &Value) -> BTreeMap<String, PropInfo> {
    let mut normalized = BTreeMap::new();

    match props {
        Value::Array(rows) => {
            for row in rows {
                let Some(name) = row.get("name").and_then(Value::as_str) else {
                    continue;
                };
                normalized.insert(
                    name.to_string(),
                    PropInfo {
                        prop_type: str_field(row, "type"),
                        default_value: row
                            .get("defaultValue")
                            .or_else(|| row.get("default"))
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        description: str_field(row, "description"),
                    },
                );
            }
        }
        Value::Object(map) => {
            for (name, details) in map {
                normalized.insert(
                    name.clone(),
                    PropInfo {
                        prop_type: str_field(details, "type"),
                        default_value: str_field(details, "default"),
                        description: str_field(details, "description"),
                    },
                );
            }
        }
        other => {
            if !other.is_null() {
                warn!("Ignoring props of unexpected shape: {other}");
            }
        }
    }

    normalized
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn map_site_parses_links() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/map")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"links": ["https://x.dev/components/a", "https://x.dev/backgrounds/b"]}"#)
            .create_async()
            .await;

        let client = FirecrawlClient::with_endpoint("test-key", server.url());
        let links = client.map_site("https://x.dev", 100).await.expect("map");
        assert_eq!(links.len(), 2);
        assert_eq!(links[0], "https://x.dev/components/a");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn extract_usable_payload() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/extract")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"success": true, "data": {
                    "name": "Stepper",
                    "description": "A stepper component",
                    "code": "export default function Stepper() {}",
                    "props": [{"name": "initialStep", "type": "number", "defaultValue": "1", "description": "start"}],
                    "dependencies": ["framer-motion"]
                }}"#,
            )
            .create_async()
            .await;

        let client = FirecrawlClient::with_endpoint("test-key", server.url());
        let outcome = client
            .extract_component("https://x.dev/components/stepper")
            .await
            .expect("extract");

        match outcome {
            ExtractOutcome::Usable(payload) => {
                assert_eq!(payload.name, "Stepper");
                assert_eq!(payload.dependencies, vec!["framer-motion".to_string()]);
                let prop = payload.props.get("initialStep").expect("prop present");
                assert_eq!(prop.prop_type, "number");
                assert_eq!(prop.default_value, "1");
            }
            ExtractOutcome::Unusable { reason } => panic!("expected usable, got: {reason}"),
        }
    }

    #[tokio::test]
    async fn extract_missing_name_is_unusable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/extract")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"description": "nameless"}}"#)
            .create_async()
            .await;

        let client = FirecrawlClient::with_endpoint("test-key", server.url());
        let outcome = client.extract_component("https://x.dev/y").await.expect("extract");
        assert!(matches!(outcome, ExtractOutcome::Unusable { .. }));
    }

    #[tokio::test]
    async fn extract_service_error_status_is_unusable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/extract")
            .with_status(402)
            .with_body("payment required")
            .create_async()
            .await;

        let client = FirecrawlClient::with_endpoint("test-key", server.url());
        let outcome = client.extract_component("https://x.dev/y").await.expect("extract");
        match outcome {
            ExtractOutcome::Unusable { reason } => assert!(reason.contains("402")),
            ExtractOutcome::Usable(_) => panic!("expected unusable"),
        }
    }

    #[test]
    fn props_object_shape_is_accepted() {
        let record = json!({
            "name": "Dock",
            "props": {"magnify": {"type": "boolean", "default": "true", "description": "zoom"}}
        });
        let payload = payload_from_extraction(&record, "u").expect("usable");
        assert_eq!(payload.props.get("magnify").expect("prop").prop_type, "boolean");
    }

    #[test]
    fn error_marker_rejects_record() {
        let record = json!({"name": "X", "error": true});
        assert!(payload_from_extraction(&record, "u").is_none());
    }
}
