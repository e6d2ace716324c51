//! Seeds a demo board on Arkiv: one DAO with an OWNER membership, an open
//! proposal and a couple of tasks (written in one batch), then reads the
//! board back to show the normalized view.

use anyhow::Context;
use chrono::{Duration, Utc};

use dao_ops_backend::arkiv::client::RpcLedger;
use dao_ops_backend::arkiv::dao::register_dao;
use dao_ops_backend::arkiv::entity::normalize_entity;
use dao_ops_backend::arkiv::membership::register_membership;
use dao_ops_backend::arkiv::payload::{
    DaoPayloadV1, MemberRole, MembershipPayloadV1, ProposalPayloadV1, ProposalStatus,
    TaskPayloadV1, TaskStatus, PAYLOAD_VERSION,
};
use dao_ops_backend::arkiv::proposal::register_proposal;
use dao_ops_backend::arkiv::task::task_create_request;
use dao_ops_backend::arkiv::{EntityQuery, Ledger};
use dao_ops_backend::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::from_env().context("invalid configuration")?;
    let ledger = RpcLedger::new(&config.arkiv_rpc_url, &config.arkiv_private_key)?;
    let owner_address = ledger.address().to_string();
    let now = Utc::now();
    let created_at = now.to_rfc3339();

    println!("Owner address (wallet): {}", owner_address);

    let dao_receipt = register_dao(
        &ledger,
        &DaoPayloadV1 {
            id: 1,
            created_at: created_at.clone(),
            name: "Roxium DAO Ops".to_string(),
            description: Some("Operations board demo".to_string()),
            owner_address: owner_address.clone(),
            version: PAYLOAD_VERSION,
        },
    )
    .await?;
    let dao_key = dao_receipt.entity_key;
    println!("DAO registered: {}", dao_key);

    register_membership(
        &ledger,
        &MembershipPayloadV1 {
            user_address: owner_address.clone(),
            dao_key: dao_key.clone(),
            role: MemberRole::Owner,
            created_at: created_at.clone(),
            version: PAYLOAD_VERSION,
        },
    )
    .await?;

    let deadline = (now + Duration::hours(1)).to_rfc3339();
    let proposal_receipt = register_proposal(
        &ledger,
        &ProposalPayloadV1 {
            id: 1,
            created_at: created_at.clone(),
            deadline: Some(deadline.clone()),
            title: "Move the daily standup to 9:30".to_string(),
            budget: Some(0.0),
            description: Some("Team vote on the new standup slot".to_string()),
            dao_key: dao_key.clone(),
            status: ProposalStatus::Open,
            version: PAYLOAD_VERSION,
        },
    )
    .await?;
    let proposal_key = proposal_receipt.entity_key;
    println!("Proposal registered: {}", proposal_key);

    // Tasks go out as one batch write.
    let task_titles = ["Survey team availability", "Update the shared DAO calendar"];
    let task_requests = task_titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            task_create_request(&TaskPayloadV1 {
                id: (i + 1) as u64,
                created_at: created_at.clone(),
                deadline: Some(deadline.clone()),
                title: title.to_string(),
                budget: Some(0.0),
                description: None,
                proposal_key: proposal_key.clone(),
                dao_key: dao_key.clone(),
                status: TaskStatus::Todo,
                version: PAYLOAD_VERSION,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let task_receipts = ledger.create_entities(task_requests).await?;
    for receipt in &task_receipts {
        println!("Task registered: {} (tx {})", receipt.entity_key, receipt.tx_hash);
    }

    // Read the proposal back and show its decoded payload.
    let proposal_entity = ledger.get_entity(&proposal_key).await?;
    let normalized = normalize_entity(&proposal_entity);
    println!(
        "Proposal payload: {}",
        serde_json::to_string_pretty(&normalized.payload)?
    );

    let tasks = ledger
        .query_entities(
            EntityQuery::new()
                .where_eq("type", "task")
                .where_eq("proposalKey", &proposal_key)
                .limit(20),
        )
        .await?;
    println!("Tasks found for proposal {}: {}", proposal_key, tasks.len());
    for task in &tasks {
        let normalized = normalize_entity(task);
        println!(
            "  - key={:?} status={:?}",
            normalized.entity_key,
            normalized.attributes.get("status")
        );
    }

    println!("Board seeded.");
    Ok(())
}
