//! Proposal registrar.

use super::payload::{self, ProposalPayloadV1};
use super::time::compute_expires_in;
use super::{ArkivError, Attribute, CreateEntityRequest, EntityReceipt, Ledger};

/// TTL when a proposal has no deadline.
pub const PROPOSAL_FALLBACK_TTL_SECS: u64 = 60 * 60 * 24;

pub fn proposal_create_request(
    input: &ProposalPayloadV1,
) -> Result<CreateEntityRequest, ArkivError> {
    let expires_in = compute_expires_in(input.deadline.as_deref())
        .unwrap_or(PROPOSAL_FALLBACK_TTL_SECS);

    Ok(CreateEntityRequest {
        payload: payload::encode(input)?,
        content_type: "application/json".to_string(),
        attributes: vec![
            Attribute::new("type", "proposal"),
            Attribute::new("daoKey", &input.dao_key),
            Attribute::new("status", input.status.as_str()),
        ],
        expires_in,
    })
}

pub async fn register_proposal(
    ledger: &dyn Ledger,
    input: &ProposalPayloadV1,
) -> Result<EntityReceipt, ArkivError> {
    let receipt = ledger.create_entity(proposal_create_request(input)?).await?;
    log::info!(
        "Proposal registered on Arkiv: key={} tx={}",
        receipt.entity_key,
        receipt.tx_hash
    );
    Ok(receipt)
}
