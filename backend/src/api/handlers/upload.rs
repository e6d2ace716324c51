//! File upload: multipart in, IPFS content address out.

use axum::extract::{Multipart, State};
use axum::response::Json;
use serde::Serialize;

use crate::api::errors::{ApiError, ApiResult};
use crate::api::server::AppState;
use crate::api::validation;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub data: UploadData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadData {
    pub cid: String,
    pub filename: String,
    pub size: u64,
    pub mime_type: String,
    pub gateway_url: String,
    pub uploaded_at: String,
}

struct FilePart {
    bytes: Vec<u8>,
    filename: String,
    mime_type: String,
}

/// POST /api/upload (multipart/form-data: `file`, `taskId`, optional
/// `documentType` hint). Validation happens before any content-store call.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut file: Option<FilePart> = None;
    let mut task_id: Option<String> = None;
    let mut document_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(&format!("malformed multipart body: {}", e)))?
    {
        match field.name().unwrap_or_default() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(&format!("failed to read file: {}", e)))?;
                file = Some(FilePart {
                    bytes: bytes.to_vec(),
                    filename,
                    mime_type,
                });
            }
            "taskId" => {
                task_id = Some(field.text().await.map_err(|e| {
                    ApiError::bad_request(&format!("failed to read taskId: {}", e))
                })?);
            }
            "documentType" => {
                document_type = Some(field.text().await.map_err(|e| {
                    ApiError::bad_request(&format!("failed to read documentType: {}", e))
                })?);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ApiError::bad_request("no file provided"))?;
    let task_id = task_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("taskId is required"))?;
    if !validation::is_allowed_mime_type(&file.mime_type) {
        return Err(ApiError::bad_request(&format!(
            "file type not allowed: {}. Only PDFs and images are accepted",
            file.mime_type
        )));
    }
    if let Some(hint) = &document_type {
        log::debug!("documentType hint for task {}: {}", task_id, hint);
    }

    let result = state
        .files
        .upload_file(file.bytes, &file.filename, &file.mime_type)
        .await
        .map_err(|e| ApiError::upstream("Failed to upload file to IPFS", &e))?;

    log::info!(
        "Uploaded {} for task {}: cid={}",
        result.filename,
        task_id,
        result.cid
    );

    Ok(Json(UploadResponse {
        success: true,
        data: UploadData {
            cid: result.cid,
            filename: result.filename,
            size: result.size,
            mime_type: result.mime_type,
            gateway_url: result.gateway_url,
            uploaded_at: result.uploaded_at.to_rfc3339(),
        },
    }))
}
