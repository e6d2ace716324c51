//! JSON-RPC client for the Arkiv ledger.
//!
//! One client per process, shared by all requests. The wallet address is
//! derived locally from the configured private key; transaction signing and
//! execution happen on the ledger node.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use base64::prelude::{Engine, BASE64_STANDARD};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tiny_keccak::{Hasher, Keccak};

use super::entity::RawEntity;
use super::{ArkivError, CreateEntityRequest, EntityQuery, EntityReceipt, Ledger};

pub struct RpcLedger {
    http: reqwest::Client,
    rpc_url: String,
    address: String,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    entities: Vec<RawEntity>,
}

impl RpcLedger {
    pub fn new(rpc_url: impl Into<String>, private_key_hex: &str) -> Result<Self, ArkivError> {
        Ok(Self {
            http: reqwest::Client::new(),
            rpc_url: rpc_url.into(),
            address: derive_address(private_key_hex)?,
            next_id: AtomicU64::new(1),
        })
    }

    /// EVM-style address of the wallet backing this client.
    pub fn address(&self) -> &str {
        &self.address
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ArkivError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": [params],
        });

        let response: RpcResponse<T> = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(ArkivError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        response
            .result
            .ok_or_else(|| ArkivError::Decode(format!("{} returned neither result nor error", method)))
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn create_entity(
        &self,
        request: CreateEntityRequest,
    ) -> Result<EntityReceipt, ArkivError> {
        self.call("arkiv_createEntity", create_entity_params(&self.address, &request))
            .await
    }

    async fn create_entities(
        &self,
        requests: Vec<CreateEntityRequest>,
    ) -> Result<Vec<EntityReceipt>, ArkivError> {
        let params = json!({
            "from": self.address,
            "entities": requests
                .iter()
                .map(|r| create_entity_params(&self.address, r))
                .collect::<Vec<_>>(),
        });
        self.call("arkiv_createEntities", params).await
    }

    async fn get_entity(&self, entity_key: &str) -> Result<RawEntity, ArkivError> {
        self.call("arkiv_getEntity", json!({ "entityKey": entity_key }))
            .await
    }

    async fn query_entities(&self, query: EntityQuery) -> Result<Vec<RawEntity>, ArkivError> {
        let result: QueryResult = self.call("arkiv_queryEntities", query_params(&query)).await?;
        Ok(result.entities)
    }
}

fn create_entity_params(address: &str, request: &CreateEntityRequest) -> Value {
    json!({
        "from": address,
        "payload": BASE64_STANDARD.encode(&request.payload),
        "contentType": request.content_type,
        "attributes": request.attributes,
        "expiresIn": request.expires_in,
    })
}

fn query_params(query: &EntityQuery) -> Value {
    json!({
        "where": query
            .filters
            .iter()
            .map(|f| json!({ "eq": { "key": f.key, "value": f.value } }))
            .collect::<Vec<_>>(),
        "withAttributes": query.with_attributes,
        "withPayload": query.with_payload,
        "limit": query.limit,
    })
}

/// Derives the EVM address for a secp256k1 private key: keccak-256 of the
/// uncompressed public key, last 20 bytes.
pub fn derive_address(private_key_hex: &str) -> Result<String, ArkivError> {
    let stripped = private_key_hex.trim_start_matches("0x");
    let key_bytes = hex::decode(stripped).map_err(|e| ArkivError::InvalidKey(e.to_string()))?;

    let secret = secp256k1::SecretKey::from_slice(&key_bytes)
        .map_err(|e| ArkivError::InvalidKey(e.to_string()))?;
    let secp = secp256k1::Secp256k1::new();
    let public = secp256k1::PublicKey::from_secret_key(&secp, &secret);
    let uncompressed = public.serialize_uncompressed();

    let mut keccak = Keccak::v256();
    let mut digest = [0u8; 32];
    keccak.update(&uncompressed[1..]);
    keccak.finalize(&mut digest);

    Ok(format!("0x{}", hex::encode(&digest[12..])))
}
