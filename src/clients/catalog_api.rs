//! Client for the upstream Counter-Strike item catalog.
//!
//! Each kind is published as one JSON document at `{base}/{kind}.json`.
//! Decoding is lenient about shape: the collection may be a bare array or
//! wrapped in an object under the kind's plural name, `team` may be a string
//! or an object carrying `name`, and crate references may be strings or
//! objects. Records without an `id` or `name` are dropped.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::domain::ItemKind;
use crate::models::{Agent, Crate, Key, Skin};

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Request for {kind} failed: {source}")]
    Http {
        kind: ItemKind,
        #[source]
        source: reqwest::Error,
    },

    #[error("Upstream returned {status} for {kind}")]
    Status { kind: ItemKind, status: StatusCode },

    #[error("Invalid {kind} payload: {message}")]
    Decode { kind: ItemKind, message: String },
}

impl UpstreamError {
    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        match self {
            Self::Http { kind, .. } | Self::Status { kind, .. } | Self::Decode { kind, .. } => {
                *kind
            }
        }
    }
}

/// Source of the full catalog, one fetch per kind.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_skins(&self) -> Result<Vec<Skin>, UpstreamError>;

    async fn fetch_agents(&self) -> Result<Vec<Agent>, UpstreamError>;

    async fn fetch_crates(&self) -> Result<Vec<Crate>, UpstreamError>;

    async fn fetch_keys(&self) -> Result<Vec<Key>, UpstreamError>;
}

#[derive(Clone)]
pub struct CatalogApiClient {
    client: Client,
    base_url: String,
}

impl CatalogApiClient {
    #[must_use]
    pub fn with_shared_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn endpoint(&self, kind: ItemKind) -> String {
        format!("{}/{}.json", self.base_url, kind.plural())
    }

    #[instrument(skip(self))]
    async fn fetch_payload(&self, kind: ItemKind) -> Result<Value, UpstreamError> {
        let url = self.endpoint(kind);
        debug!(url = %url, "Fetching catalog collection");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| UpstreamError::Http { kind, source })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, url = %url, "Catalog request rejected");
            return Err(UpstreamError::Status { kind, status });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| UpstreamError::Decode {
                kind,
                message: e.to_string(),
            })
    }

    async fn fetch_kind<T: Send>(
        &self,
        kind: ItemKind,
        build: impl Fn(&Value, String, String) -> T + Send,
    ) -> Result<Vec<T>, UpstreamError> {
        let payload = self.fetch_payload(kind).await?;
        let items = decode_collection(&payload, kind, build)?;
        info!(
            event = "catalog_fetch_finished",
            kind = kind.as_str(),
            count = items.len(),
            "Fetched catalog collection"
        );
        Ok(items)
    }
}

#[async_trait]
impl CatalogSource for CatalogApiClient {
    async fn fetch_skins(&self) -> Result<Vec<Skin>, UpstreamError> {
        self.fetch_kind(ItemKind::Skin, build_skin).await
    }

    async fn fetch_agents(&self) -> Result<Vec<Agent>, UpstreamError> {
        self.fetch_kind(ItemKind::Agent, build_agent).await
    }

    async fn fetch_crates(&self) -> Result<Vec<Crate>, UpstreamError> {
        self.fetch_kind(ItemKind::Crate, build_crate).await
    }

    async fn fetch_keys(&self) -> Result<Vec<Key>, UpstreamError> {
        self.fetch_kind(ItemKind::Key, build_key).await
    }
}

/// Decodes one collection payload, skipping records without `id` or `name`.
pub fn decode_collection<T>(
    payload: &Value,
    kind: ItemKind,
    build: impl Fn(&Value, String, String) -> T,
) -> Result<Vec<T>, UpstreamError> {
    let records = match payload {
        Value::Array(records) => records,
        Value::Object(map) => map
            .get(kind.plural())
            .and_then(Value::as_array)
            .ok_or_else(|| UpstreamError::Decode {
                kind,
                message: format!("expected an array under \"{}\"", kind.plural()),
            })?,
        other => {
            return Err(UpstreamError::Decode {
                kind,
                message: format!("expected an array or object, got {}", json_type(other)),
            });
        }
    };

    let mut skipped = 0usize;
    let items: Vec<T> = records
        .iter()
        .filter_map(|record| {
            let identity = text(record, "id").zip(text(record, "name"));
            if identity.is_none() {
                skipped += 1;
            }
            identity.map(|(id, name)| build(record, id, name))
        })
        .collect();

    if skipped > 0 {
        warn!(
            kind = kind.as_str(),
            skipped, "Dropped catalog records without id or name"
        );
    }

    Ok(items)
}

pub fn build_skin(record: &Value, id: String, name: String) -> Skin {
    Skin {
        id,
        name,
        description: text(record, "description"),
        image: text(record, "image"),
        crates: crate_refs(record),
        team: team(record),
    }
}

pub fn build_agent(record: &Value, id: String, name: String) -> Agent {
    Agent {
        id,
        name,
        description: text(record, "description"),
        image: text(record, "image"),
        team: team(record),
    }
}

pub fn build_crate(record: &Value, id: String, name: String) -> Crate {
    Crate {
        id,
        name,
        description: text(record, "description"),
        image: text(record, "image"),
    }
}

pub fn build_key(record: &Value, id: String, name: String) -> Key {
    Key {
        id,
        name,
        description: text(record, "description"),
        image: text(record, "image"),
        crates: crate_refs(record),
    }
}

fn text(record: &Value, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn team(record: &Value) -> Option<String> {
    match record.get("team")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        obj @ Value::Object(_) => text(obj, "name"),
        _ => None,
    }
}

/// Crate references as ids, falling back to names for objects without one.
fn crate_refs(record: &Value) -> Vec<String> {
    let Some(entries) = record.get("crates").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            obj @ Value::Object(_) => text(obj, "id").or_else(|| text(obj, "name")),
            _ => None,
        })
        .collect()
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
