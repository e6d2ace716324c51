//! Domain payload types and their byte codec.
//!
//! Every payload carries the versioned envelope (`version`, `createdAt`).
//! Serialization is plain JSON; the ledger treats the result as opaque
//! bytes.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub const PAYLOAD_VERSION: u8 = 1;

/// Record id for new payloads; millisecond timestamps, matching the ids the
/// frontend already expects. Uniqueness across rapid calls is not required.
pub fn next_record_id() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(value)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(bytes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberRole {
    Owner,
    #[default]
    Contributor,
    Viewer,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "OWNER",
            MemberRole::Contributor => "CONTRIBUTOR",
            MemberRole::Viewer => "VIEWER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    #[default]
    Open,
    Closed,
    Archived,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Open => "open",
            ProposalStatus::Closed => "closed",
            ProposalStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaoPayloadV1 {
    pub id: u64,
    pub created_at: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub owner_address: String,
    pub version: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipPayloadV1 {
    pub user_address: String,
    pub dao_key: String,
    pub role: MemberRole,
    pub created_at: String,
    pub version: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalPayloadV1 {
    pub id: u64,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Entity key of the owning DAO; not validated against the ledger.
    pub dao_key: String,
    pub status: ProposalStatus,
    pub version: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayloadV1 {
    pub id: u64,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub proposal_key: String,
    pub dao_key: String,
    pub status: TaskStatus,
    pub version: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentPayloadV1 {
    pub cid: String,
    pub filename: String,
    pub mime_type: String,
    pub size: u64,
    /// External task id, not a ledger key.
    pub task_id: String,
    pub gateway_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_did: Option<String>,
    pub uploaded_at: String,
    pub version: u8,
}
