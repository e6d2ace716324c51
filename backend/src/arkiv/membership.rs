//! Membership (user-on-dao) registrar.

use super::payload::{self, MembershipPayloadV1};
use super::{ArkivError, Attribute, CreateEntityRequest, EntityReceipt, Ledger};

pub const MEMBERSHIP_TTL_SECS: u64 = 60 * 60 * 24 * 30;

pub fn membership_create_request(
    input: &MembershipPayloadV1,
) -> Result<CreateEntityRequest, ArkivError> {
    Ok(CreateEntityRequest {
        payload: payload::encode(input)?,
        content_type: "application/json".to_string(),
        attributes: vec![
            Attribute::new("type", "user-on-dao"),
            Attribute::new("userAddress", &input.user_address),
            Attribute::new("daoKey", &input.dao_key),
            Attribute::new("role", input.role.as_str()),
        ],
        expires_in: MEMBERSHIP_TTL_SECS,
    })
}

pub async fn register_membership(
    ledger: &dyn Ledger,
    input: &MembershipPayloadV1,
) -> Result<EntityReceipt, ArkivError> {
    let receipt = ledger
        .create_entity(membership_create_request(input)?)
        .await?;
    log::info!(
        "Membership registered on Arkiv: key={} tx={}",
        receipt.entity_key,
        receipt.tx_hash
    );
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arkiv::payload::{MemberRole, PAYLOAD_VERSION};

    #[test]
    fn membership_request_links_dao_and_role() {
        let input = MembershipPayloadV1 {
            user_address: "0xuser".to_string(),
            dao_key: "0xdao".to_string(),
            role: MemberRole::Owner,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            version: PAYLOAD_VERSION,
        };
        let request = membership_create_request(&input).unwrap();
        assert!(request
            .attributes
            .contains(&Attribute::new("type", "user-on-dao")));
        assert!(request.attributes.contains(&Attribute::new("daoKey", "0xdao")));
        assert!(request.attributes.contains(&Attribute::new("role", "OWNER")));
    }
}
