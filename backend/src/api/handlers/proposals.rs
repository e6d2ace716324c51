//! Proposal routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::api::errors::{ApiError, ApiResult, ValidationErrors};
use crate::api::server::AppState;
use crate::api::validation;
use crate::arkiv::entity::{normalize_entity, NormalizedEntity};
use crate::arkiv::payload::{next_record_id, ProposalPayloadV1, ProposalStatus, PAYLOAD_VERSION};
use crate::arkiv::proposal::register_proposal;
use crate::arkiv::EntityQuery;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalRequest {
    pub dao_key: String,
    pub title: String,
    pub description: Option<String>,
    pub budget: Option<f64>,
    pub deadline: Option<String>,
    #[serde(default)]
    pub status: ProposalStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalResponse {
    pub proposal_key: String,
    pub dao_key: String,
    pub tx_hash: String,
}

/// POST /api/arkiv/proposals
pub async fn create_proposal(
    State(state): State<AppState>,
    Json(request): Json<CreateProposalRequest>,
) -> ApiResult<(StatusCode, Json<CreateProposalResponse>)> {
    let mut errors = ValidationErrors::new();
    if let Err(e) = validation::require_non_empty("daoKey", &request.dao_key) {
        errors.push(e);
    }
    if let Err(e) = validation::require_non_empty("title", &request.title) {
        errors.push(e);
    }
    if let Some(deadline) = &request.deadline {
        if let Err(e) = validation::validate_deadline(deadline) {
            errors.push(e);
        }
    }
    if !errors.is_empty() {
        return Err(errors.to_api_error());
    }

    let proposal = ProposalPayloadV1 {
        id: next_record_id(),
        created_at: chrono::Utc::now().to_rfc3339(),
        deadline: request.deadline,
        title: request.title,
        budget: request.budget,
        description: request.description,
        dao_key: request.dao_key.clone(),
        status: request.status,
        version: PAYLOAD_VERSION,
    };
    let receipt = register_proposal(state.ledger.as_ref(), &proposal)
        .await
        .map_err(|e| ApiError::upstream("Failed to create proposal in Arkiv", &e))?;

    Ok((
        StatusCode::CREATED,
        Json(CreateProposalResponse {
            proposal_key: receipt.entity_key,
            dao_key: request.dao_key,
            tx_hash: receipt.tx_hash,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct ProposalListResponse {
    pub count: usize,
    pub proposals: Vec<NormalizedEntity>,
}

/// GET /api/arkiv/proposals
pub async fn list_proposals(
    State(state): State<AppState>,
) -> ApiResult<Json<ProposalListResponse>> {
    let entities = state
        .ledger
        .query_entities(EntityQuery::new().where_eq("type", "proposal").limit(500))
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch proposals from Arkiv", &e))?;

    let proposals: Vec<NormalizedEntity> = entities.iter().map(normalize_entity).collect();
    Ok(Json(ProposalListResponse {
        count: proposals.len(),
        proposals,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalsByDaoResponse {
    pub dao_key: String,
    pub proposals: Vec<NormalizedEntity>,
}

/// GET /api/arkiv/proposals/by-dao/:daoKey
pub async fn list_proposals_by_dao(
    State(state): State<AppState>,
    Path(dao_key): Path<String>,
) -> ApiResult<Json<ProposalsByDaoResponse>> {
    let entities = state
        .ledger
        .query_entities(
            EntityQuery::new()
                .where_eq("type", "proposal")
                .where_eq("daoKey", &dao_key)
                .limit(200),
        )
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch proposals from Arkiv", &e))?;

    Ok(Json(ProposalsByDaoResponse {
        dao_key,
        proposals: entities.iter().map(normalize_entity).collect(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDetailResponse {
    pub proposal_key: String,
    pub dao_key: Option<String>,
    pub proposal: NormalizedEntity,
    pub tasks: Vec<NormalizedEntity>,
}

/// GET /api/arkiv/proposals/:proposalKey — the proposal plus its tasks.
pub async fn get_proposal(
    State(state): State<AppState>,
    Path(proposal_key): Path<String>,
) -> ApiResult<Json<ProposalDetailResponse>> {
    let entity = state
        .ledger
        .get_entity(&proposal_key)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch proposal from Arkiv", &e))?;
    let proposal = normalize_entity(&entity);
    let dao_key = proposal.attributes.get("daoKey").cloned();

    let tasks = state
        .ledger
        .query_entities(
            EntityQuery::new()
                .where_eq("type", "task")
                .where_eq("proposalKey", &proposal_key)
                .limit(500),
        )
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch proposal tasks from Arkiv", &e))?;

    Ok(Json(ProposalDetailResponse {
        proposal_key,
        dao_key,
        proposal,
        tasks: tasks.iter().map(normalize_entity).collect(),
    }))
}
