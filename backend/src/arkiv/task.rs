//! Task registrar.
//!
//! Tasks carry a deadline just like proposals, and the TTL follows it
//! through the same policy so a task never outlives the window it was
//! scoped to.

use super::payload::{self, TaskPayloadV1};
use super::time::compute_expires_in;
use super::{ArkivError, Attribute, CreateEntityRequest, EntityReceipt, Ledger};

pub const TASK_FALLBACK_TTL_SECS: u64 = 60 * 60 * 24;

pub fn task_create_request(input: &TaskPayloadV1) -> Result<CreateEntityRequest, ArkivError> {
    let expires_in =
        compute_expires_in(input.deadline.as_deref()).unwrap_or(TASK_FALLBACK_TTL_SECS);

    Ok(CreateEntityRequest {
        payload: payload::encode(input)?,
        content_type: "application/json".to_string(),
        attributes: vec![
            Attribute::new("type", "task"),
            Attribute::new("proposalKey", &input.proposal_key),
            Attribute::new("daoKey", &input.dao_key),
            Attribute::new("status", input.status.as_str()),
        ],
        expires_in,
    })
}

pub async fn register_task(
    ledger: &dyn Ledger,
    input: &TaskPayloadV1,
) -> Result<EntityReceipt, ArkivError> {
    let receipt = ledger.create_entity(task_create_request(input)?).await?;
    log::info!(
        "Task registered on Arkiv: key={} tx={}",
        receipt.entity_key,
        receipt.tx_hash
    );
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arkiv::payload::{TaskStatus, PAYLOAD_VERSION};
    use chrono::{Duration, Utc};

    fn task(deadline: Option<String>) -> TaskPayloadV1 {
        TaskPayloadV1 {
            id: 1,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            deadline,
            title: "demo".to_string(),
            budget: None,
            description: None,
            proposal_key: "0xproposal".to_string(),
            dao_key: "0xdao".to_string(),
            status: TaskStatus::Todo,
            version: PAYLOAD_VERSION,
        }
    }

    #[test]
    fn task_ttl_follows_the_same_deadline_policy_as_proposals() {
        let deadline = (Utc::now() + Duration::hours(1)).to_rfc3339();
        let request = task_create_request(&task(Some(deadline))).unwrap();
        assert!((3598..=3600).contains(&request.expires_in));

        let request = task_create_request(&task(None)).unwrap();
        assert_eq!(request.expires_in, TASK_FALLBACK_TTL_SECS);
    }

    #[test]
    fn task_request_references_both_parents() {
        let request = task_create_request(&task(None)).unwrap();
        assert!(request
            .attributes
            .contains(&Attribute::new("proposalKey", "0xproposal")));
        assert!(request.attributes.contains(&Attribute::new("daoKey", "0xdao")));
        assert!(request.attributes.contains(&Attribute::new("status", "todo")));
    }
}
