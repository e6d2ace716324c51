//! DAO registrar.

use super::payload::{self, DaoPayloadV1};
use super::{ArkivError, Attribute, CreateEntityRequest, EntityReceipt, Ledger};

/// Fixed DAO TTL; renewal is expected to go through entity extension later.
pub const DAO_TTL_SECS: u64 = 60 * 60 * 24 * 30;

pub fn dao_create_request(input: &DaoPayloadV1) -> Result<CreateEntityRequest, ArkivError> {
    Ok(CreateEntityRequest {
        payload: payload::encode(input)?,
        content_type: "application/json".to_string(),
        attributes: vec![
            Attribute::new("type", "dao"),
            Attribute::new("ownerAddress", &input.owner_address),
            Attribute::new("daoName", &input.name),
        ],
        expires_in: DAO_TTL_SECS,
    })
}

pub async fn register_dao(
    ledger: &dyn Ledger,
    input: &DaoPayloadV1,
) -> Result<EntityReceipt, ArkivError> {
    let receipt = ledger.create_entity(dao_create_request(input)?).await?;
    log::info!(
        "DAO registered on Arkiv: key={} tx={}",
        receipt.entity_key,
        receipt.tx_hash
    );
    Ok(receipt)
}
