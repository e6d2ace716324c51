//! DAO routes: creation (with automatic OWNER membership), listing, detail
//! and the kanban-style board view.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::api::errors::{ApiError, ApiResult, ValidationErrors};
use crate::api::server::AppState;
use crate::api::validation;
use crate::arkiv::dao::register_dao;
use crate::arkiv::entity::{normalize_entity, NormalizedEntity};
use crate::arkiv::membership::register_membership;
use crate::arkiv::payload::{
    next_record_id, DaoPayloadV1, MemberRole, MembershipPayloadV1, PAYLOAD_VERSION,
};
use crate::arkiv::EntityQuery;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDaoRequest {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to the backend wallet's address.
    pub owner_address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDaoResponse {
    pub dao_key: String,
    pub dao_tx_hash: String,
    pub membership_key: String,
    pub membership_tx_hash: String,
    pub owner_address: String,
}

/// POST /api/arkiv/daos
pub async fn create_dao(
    State(state): State<AppState>,
    Json(request): Json<CreateDaoRequest>,
) -> ApiResult<(StatusCode, Json<CreateDaoResponse>)> {
    let mut errors = ValidationErrors::new();
    if let Err(e) = validation::require_non_empty("name", &request.name) {
        errors.push(e);
    }
    if !errors.is_empty() {
        return Err(errors.to_api_error());
    }

    let now = chrono::Utc::now().to_rfc3339();
    let owner = request
        .owner_address
        .filter(|addr| !addr.trim().is_empty())
        .unwrap_or_else(|| state.wallet_address.clone());

    let dao = DaoPayloadV1 {
        id: next_record_id(),
        created_at: now.clone(),
        name: request.name,
        description: request.description,
        owner_address: owner.clone(),
        version: PAYLOAD_VERSION,
    };
    let dao_receipt = register_dao(state.ledger.as_ref(), &dao)
        .await
        .map_err(|e| ApiError::upstream("Failed to create DAO in Arkiv", &e))?;

    let membership = MembershipPayloadV1 {
        user_address: owner.clone(),
        dao_key: dao_receipt.entity_key.clone(),
        role: MemberRole::Owner,
        created_at: now,
        version: PAYLOAD_VERSION,
    };
    let membership_receipt = register_membership(state.ledger.as_ref(), &membership)
        .await
        .map_err(|e| ApiError::upstream("Failed to create OWNER membership in Arkiv", &e))?;

    Ok((
        StatusCode::CREATED,
        Json(CreateDaoResponse {
            dao_key: dao_receipt.entity_key,
            dao_tx_hash: dao_receipt.tx_hash,
            membership_key: membership_receipt.entity_key,
            membership_tx_hash: membership_receipt.tx_hash,
            owner_address: owner,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct DaoListResponse {
    pub count: usize,
    pub daos: Vec<NormalizedEntity>,
}

/// GET /api/arkiv/daos
pub async fn list_daos(State(state): State<AppState>) -> ApiResult<Json<DaoListResponse>> {
    let entities = state
        .ledger
        .query_entities(EntityQuery::new().where_eq("type", "dao").limit(500))
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch DAOs from Arkiv", &e))?;

    let daos: Vec<NormalizedEntity> = entities.iter().map(normalize_entity).collect();
    Ok(Json(DaoListResponse {
        count: daos.len(),
        daos,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaoDetailResponse {
    pub dao_key: String,
    pub dao: NormalizedEntity,
    pub memberships: Vec<NormalizedEntity>,
}

/// GET /api/arkiv/daos/:daoKey
pub async fn get_dao(
    State(state): State<AppState>,
    Path(dao_key): Path<String>,
) -> ApiResult<Json<DaoDetailResponse>> {
    let entity = state
        .ledger
        .get_entity(&dao_key)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch DAO from Arkiv", &e))?;

    let memberships = state
        .ledger
        .query_entities(
            EntityQuery::new()
                .where_eq("type", "user-on-dao")
                .where_eq("daoKey", &dao_key)
                .limit(200),
        )
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch DAO memberships from Arkiv", &e))?;

    Ok(Json(DaoDetailResponse {
        dao_key,
        dao: normalize_entity(&entity),
        memberships: memberships.iter().map(normalize_entity).collect(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaoBoardResponse {
    pub dao_key: String,
    pub dao: NormalizedEntity,
    pub proposals: Vec<NormalizedEntity>,
    pub tasks: Vec<NormalizedEntity>,
}

/// GET /api/arkiv/daos/:daoKey/board
pub async fn get_board(
    State(state): State<AppState>,
    Path(dao_key): Path<String>,
) -> ApiResult<Json<DaoBoardResponse>> {
    let entity = state
        .ledger
        .get_entity(&dao_key)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch DAO from Arkiv", &e))?;

    let proposals = state
        .ledger
        .query_entities(
            EntityQuery::new()
                .where_eq("type", "proposal")
                .where_eq("daoKey", &dao_key)
                .limit(200),
        )
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch DAO proposals from Arkiv", &e))?;

    let tasks = state
        .ledger
        .query_entities(
            EntityQuery::new()
                .where_eq("type", "task")
                .where_eq("daoKey", &dao_key)
                .limit(500),
        )
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch DAO tasks from Arkiv", &e))?;

    Ok(Json(DaoBoardResponse {
        dao_key,
        dao: normalize_entity(&entity),
        proposals: proposals.iter().map(normalize_entity).collect(),
        tasks: tasks.iter().map(normalize_entity).collect(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_address: String,
    #[serde(default)]
    pub role: MemberRole,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberResponse {
    pub membership_key: String,
    pub tx_hash: String,
}

/// POST /api/arkiv/daos/:daoKey/members
pub async fn add_member(
    State(state): State<AppState>,
    Path(dao_key): Path<String>,
    Json(request): Json<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<AddMemberResponse>)> {
    let mut errors = ValidationErrors::new();
    if let Err(e) = validation::require_non_empty("userAddress", &request.user_address) {
        errors.push(e);
    }
    if !errors.is_empty() {
        return Err(errors.to_api_error());
    }

    let membership = MembershipPayloadV1 {
        user_address: request.user_address,
        dao_key,
        role: request.role,
        created_at: chrono::Utc::now().to_rfc3339(),
        version: PAYLOAD_VERSION,
    };
    let receipt = register_membership(state.ledger.as_ref(), &membership)
        .await
        .map_err(|e| ApiError::upstream("Failed to add DAO member in Arkiv", &e))?;

    Ok((
        StatusCode::CREATED,
        Json(AddMemberResponse {
            membership_key: receipt.entity_key,
            tx_hash: receipt.tx_hash,
        }),
    ))
}
