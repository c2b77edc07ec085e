//! Source store backed by a remote `/api/sources` server

use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;

use super::models::*;
use super::store::{Result, SourceStore, SourceStoreError};
use crate::server::wire::{SourceBody, StatusResponse};

/// `GET /api/sources` body, kept loose so one bad entry can be skipped
#[derive(Deserialize)]
struct RawSourceList {
    #[serde(default)]
    sources: Vec<Value>,
}

/// Talks to another instance of the API server (or anything speaking the
/// same JSON shapes) with a blocking client.
pub struct HttpSourceStore {
    base_url: Url,
    client: Client,
}

impl HttpSourceStore {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| SourceStoreError::SourceLoad {
            name: base_url.to_string(),
            reason: format!("invalid server URL: {}", e),
        })?;
        Ok(Self {
            base_url,
            client: Client::new(),
        })
    }

    /// `{base}/api/sources[/{name}]` with the name percent-encoded as one segment
    fn sources_url(&self, name: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| SourceStoreError::SourceLoad {
                name: self.base_url.to_string(),
                reason: "server URL cannot be a base".to_string(),
            })?;
            segments.pop_if_empty().extend(["api", "sources"]);
            if let Some(name) = name {
                segments.push(name);
            }
        }
        Ok(url)
    }

    fn unreachable(&self, err: reqwest::Error) -> SourceStoreError {
        SourceStoreError::SourceLoad {
            name: self.base_url.to_string(),
            reason: err.to_string(),
        }
    }

    /// Map a non-success status to the matching store error
    fn check(&self, name: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let reason = response
            .json::<StatusResponse>()
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| status.to_string());

        Err(match status {
            StatusCode::NOT_FOUND => SourceStoreError::SourceNotFound(name.to_string()),
            StatusCode::BAD_REQUEST => SourceStoreError::Validation(reason),
            _ => SourceStoreError::SourceLoad {
                name: name.to_string(),
                reason,
            },
        })
    }

    fn read_body(&self, name: &str, response: Response) -> Result<String> {
        response.text().map_err(|e| load_error(name, e))
    }
}

fn load_error(name: &str, reason: impl ToString) -> SourceStoreError {
    SourceStoreError::SourceLoad {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Turn one JSON source into a `Source`, applying the same word-list rules
/// as sources read from disk. Empty lists pass as already-completed sources.
fn decode_source(name: &str, value: Value) -> Result<Source> {
    let source: Source = serde_json::from_value(value).map_err(|e| load_error(name, e))?;
    if !source.words.is_empty() {
        validate_words(&source.words).map_err(|p| load_error(&source.name, p))?;
    }
    Ok(source)
}

impl SourceStore for HttpSourceStore {
    fn list_sources(&self) -> Result<Vec<Source>> {
        let url = self.sources_url(None)?;
        let response = self.client.get(url).send().map_err(|e| self.unreachable(e))?;
        let text = self.read_body("*", self.check("*", response)?)?;
        let body: RawSourceList = serde_json::from_str(&text).map_err(|e| load_error("*", e))?;

        let mut sources = Vec::with_capacity(body.sources.len());
        for value in body.sources {
            let name = value
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("<unnamed>")
                .to_string();
            match decode_source(&name, value) {
                Ok(source) => sources.push(source),
                Err(e) => log::warn!("Skipping remote source '{}': {}", name, e),
            }
        }
        Ok(sources)
    }

    fn get_source(&self, name: &str) -> Result<Source> {
        let url = self.sources_url(Some(name))?;
        let response = self.client.get(url).send().map_err(|e| self.unreachable(e))?;
        let text = self.read_body(name, self.check(name, response)?)?;
        let value: Value = serde_json::from_str(&text).map_err(|e| load_error(name, e))?;
        decode_source(name, value)
    }

    fn save_source(
        &self,
        name: &str,
        words: Vec<WordEntry>,
        origin_link: Option<String>,
    ) -> Result<Source> {
        validate_source_name(name).map_err(SourceStoreError::Validation)?;
        validate_words(&words)?;

        let url = self.sources_url(Some(name))?;
        let body = SourceBody {
            name: None,
            words,
            origin_link,
        };
        let response = self
            .client
            .put(url)
            .json(&body)
            .send()
            .map_err(|e| self.unreachable(e))?;
        self.check(name, response)?;

        log::info!("Saved source '{}' to {}", name, self.base_url);
        Ok(Source::new(name, body.words).with_origin_link(body.origin_link))
    }

    fn delete_source(&self, name: &str) -> Result<()> {
        let url = self.sources_url(Some(name))?;
        let response = self.client.delete(url).send().map_err(|e| self.unreachable(e))?;
        self.check(name, response)?;
        Ok(())
    }
}
