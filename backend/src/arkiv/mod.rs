//! Arkiv ledger integration.
//!
//! The ledger stores immutable, expiring entities: an opaque byte payload
//! plus string key/value attributes used for filtering. Writes return a
//! ledger-assigned entity key and transaction hash; there is no update or
//! delete, records disappear by TTL expiry.

pub mod attachment;
pub mod client;
pub mod dao;
pub mod entity;
pub mod membership;
pub mod payload;
pub mod proposal;
pub mod task;
pub mod time;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use entity::RawEntity;

#[derive(Debug, Error)]
pub enum ArkivError {
    #[error("ledger transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("ledger rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("unexpected ledger response: {0}")]
    Decode(String),
    #[error("payload encoding failed: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("invalid private key: {0}")]
    InvalidKey(String),
}

/// A string key/value pair attached to an entity for querying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A single entity write: payload bytes, attributes and a TTL in seconds.
#[derive(Debug, Clone)]
pub struct CreateEntityRequest {
    pub payload: Vec<u8>,
    pub content_type: String,
    pub attributes: Vec<Attribute>,
    pub expires_in: u64,
}

/// What the ledger hands back for a successful write.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityReceipt {
    pub entity_key: String,
    pub tx_hash: String,
}

/// Equality-filtered entity query.
#[derive(Debug, Clone)]
pub struct EntityQuery {
    pub filters: Vec<Attribute>,
    pub with_attributes: bool,
    pub with_payload: bool,
    pub limit: u32,
}

impl Default for EntityQuery {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            with_attributes: true,
            with_payload: true,
            limit: 100,
        }
    }
}

impl EntityQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Attribute::new(key, value));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// Narrow seam over the ledger, injected into request handlers so tests can
/// substitute an in-memory implementation.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn create_entity(&self, request: CreateEntityRequest)
        -> Result<EntityReceipt, ArkivError>;

    /// Batch write; used by seeding scripts, never by the HTTP surface.
    async fn create_entities(
        &self,
        requests: Vec<CreateEntityRequest>,
    ) -> Result<Vec<EntityReceipt>, ArkivError>;

    async fn get_entity(&self, entity_key: &str) -> Result<RawEntity, ArkivError>;

    async fn query_entities(&self, query: EntityQuery) -> Result<Vec<RawEntity>, ArkivError>;
}
