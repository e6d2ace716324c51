//! Attachment registrar: records uploaded-file metadata against a task.

use super::payload::{self, AttachmentPayloadV1};
use super::{ArkivError, Attribute, CreateEntityRequest, EntityReceipt, Ledger};

/// Attachments outlive the tasks they document.
pub const ATTACHMENT_TTL_SECS: u64 = 60 * 60 * 24 * 365;

pub fn attachment_create_request(
    input: &AttachmentPayloadV1,
) -> Result<CreateEntityRequest, ArkivError> {
    Ok(CreateEntityRequest {
        payload: payload::encode(input)?,
        content_type: "application/json".to_string(),
        attributes: vec![
            Attribute::new("type", "attachment"),
            Attribute::new("cid", &input.cid),
            Attribute::new("taskId", &input.task_id),
            Attribute::new("filename", &input.filename),
            Attribute::new("gatewayUrl", &input.gateway_url),
        ],
        expires_in: ATTACHMENT_TTL_SECS,
    })
}

pub async fn register_attachment(
    ledger: &dyn Ledger,
    input: &AttachmentPayloadV1,
) -> Result<EntityReceipt, ArkivError> {
    let receipt = ledger
        .create_entity(attachment_create_request(input)?)
        .await?;
    log::info!(
        "Attachment registered on Arkiv: key={} tx={}",
        receipt.entity_key,
        receipt.tx_hash
    );
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arkiv::payload::PAYLOAD_VERSION;

    #[test]
    fn attachment_request_uses_long_ttl_and_cid_attributes() {
        let input = AttachmentPayloadV1 {
            cid: "bafybeidemo".to_string(),
            filename: "whitepaper.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size: 184_292,
            task_id: "task-42".to_string(),
            gateway_url: "https://ipfs.io/ipfs/bafybeidemo".to_string(),
            space_did: None,
            uploaded_at: "2026-01-01T00:00:00Z".to_string(),
            version: PAYLOAD_VERSION,
        };
        let request = attachment_create_request(&input).unwrap();
        assert_eq!(request.expires_in, ATTACHMENT_TTL_SECS);
        assert!(request.attributes.contains(&Attribute::new("cid", "bafybeidemo")));
        assert!(request.attributes.contains(&Attribute::new("taskId", "task-42")));
    }
}
