//! HTTP surface tests against an in-memory ledger and content store.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use dao_ops_backend::api::{create_router, AppState};
use dao_ops_backend::arkiv::entity::RawEntity;
use dao_ops_backend::arkiv::{
    ArkivError, Attribute, CreateEntityRequest, EntityQuery, EntityReceipt, Ledger,
};
use dao_ops_backend::ipfs::{FileStore, IpfsError, IpfsUploadResult};

const WALLET: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

#[derive(Clone)]
struct StoredEntity {
    key: String,
    attributes: Vec<Attribute>,
    payload: Vec<u8>,
}

/// Ledger stand-in that keeps every written entity in memory and answers
/// queries by exact attribute match.
#[derive(Default)]
struct MockLedger {
    entities: Mutex<Vec<StoredEntity>>,
    next_key: AtomicU64,
}

impl MockLedger {
    fn store(&self, request: CreateEntityRequest) -> EntityReceipt {
        let n = self.next_key.fetch_add(1, Ordering::SeqCst) + 1;
        let key = format!("0x{:064x}", n);
        self.entities.lock().unwrap().push(StoredEntity {
            key: key.clone(),
            attributes: request.attributes,
            payload: request.payload,
        });
        EntityReceipt {
            entity_key: key,
            tx_hash: format!("0x{:064x}", n + 0xa000),
        }
    }

    fn to_raw(entity: &StoredEntity) -> RawEntity {
        serde_json::from_value(json!({
            "entityKey": entity.key,
            "attributes": entity.attributes,
            "payload": entity.payload,
        }))
        .unwrap()
    }

    fn attributes_of(&self, key: &str) -> Vec<Attribute> {
        self.entities
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.attributes.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn create_entity(
        &self,
        request: CreateEntityRequest,
    ) -> Result<EntityReceipt, ArkivError> {
        Ok(self.store(request))
    }

    async fn create_entities(
        &self,
        requests: Vec<CreateEntityRequest>,
    ) -> Result<Vec<EntityReceipt>, ArkivError> {
        Ok(requests.into_iter().map(|r| self.store(r)).collect())
    }

    async fn get_entity(&self, entity_key: &str) -> Result<RawEntity, ArkivError> {
        let entities = self.entities.lock().unwrap();
        entities
            .iter()
            .find(|e| e.key == entity_key)
            .map(Self::to_raw)
            .ok_or_else(|| ArkivError::Rpc {
                code: -32000,
                message: format!("entity not found: {}", entity_key),
            })
    }

    async fn query_entities(&self, query: EntityQuery) -> Result<Vec<RawEntity>, ArkivError> {
        let entities = self.entities.lock().unwrap();
        Ok(entities
            .iter()
            .filter(|e| {
                query
                    .filters
                    .iter()
                    .all(|filter| e.attributes.contains(filter))
            })
            .take(query.limit as usize)
            .map(Self::to_raw)
            .collect())
    }
}

/// Content store stand-in that counts uploads and returns a fixed CID.
#[derive(Default)]
struct MockFileStore {
    uploads: AtomicUsize,
}

#[async_trait]
impl FileStore for MockFileStore {
    async fn upload_file(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> Result<IpfsUploadResult, IpfsError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(IpfsUploadResult {
            cid: "bafybeimockcid".to_string(),
            size: bytes.len() as u64,
            mime_type: mime_type.to_string(),
            filename: filename.to_string(),
            uploaded_at: chrono::Utc::now(),
            gateway_url: "https://ipfs.io/ipfs/bafybeimockcid".to_string(),
        })
    }

    async fn get_file(&self, _cid: &str) -> Result<Vec<u8>, IpfsError> {
        Err(IpfsError::Api("not used in these tests".to_string()))
    }
}

struct TestApp {
    router: axum::Router,
    ledger: Arc<MockLedger>,
    files: Arc<MockFileStore>,
}

fn test_app() -> TestApp {
    let ledger = Arc::new(MockLedger::default());
    let files = Arc::new(MockFileStore::default());
    let state = AppState {
        ledger: ledger.clone(),
        files: files.clone(),
        wallet_address: WALLET.to_string(),
    };
    TestApp {
        router: create_router(state),
        ledger,
        files,
    }
}

async fn send_json(router: &axum::Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

async fn send_get(router: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn multipart_request(uri: &str, parts: &[(&str, Option<(&str, &str)>, &[u8])]) -> Request<Body> {
    let boundary = "test-boundary-7MA4YWxk";
    let mut body = Vec::new();
    for (name, file, content) in parts {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        match file {
            Some((filename, mime_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: {}\r\n\r\n",
                        name, filename, mime_type
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app();
    let (status, body) = send_get(&app.router, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "dao-ops-backend");
}

#[tokio::test]
async fn create_dao_registers_owner_membership_with_matching_dao_key() {
    let app = test_app();
    let (status, body) = send_json(
        &app.router,
        "POST",
        "/api/arkiv/daos",
        json!({"name": "Test DAO", "description": "a test"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ownerAddress"], WALLET);

    let dao_key = body["daoKey"].as_str().unwrap().to_string();
    let membership_key = body["membershipKey"].as_str().unwrap();
    assert_ne!(dao_key, membership_key);

    let attrs = app.ledger.attributes_of(membership_key);
    assert!(attrs.contains(&Attribute::new("type", "user-on-dao")));
    assert!(attrs.contains(&Attribute::new("daoKey", dao_key.clone())));
    assert!(attrs.contains(&Attribute::new("role", "OWNER")));
    assert!(attrs.contains(&Attribute::new("userAddress", WALLET)));
}

#[tokio::test]
async fn create_dao_without_name_is_rejected() {
    let app = test_app();
    let (status, body) = send_json(
        &app.router,
        "POST",
        "/api/arkiv/daos",
        json!({"name": "   "}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["details"]["errors"][0]["field"], "name");
    assert!(app.ledger.entities.lock().unwrap().is_empty());
}

#[tokio::test]
async fn dao_listing_counts_only_dao_entities() {
    let app = test_app();
    for name in ["Alpha", "Beta"] {
        let (status, _) = send_json(
            &app.router,
            "POST",
            "/api/arkiv/daos",
            json!({"name": name}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // each create also wrote a membership; listing must not include those
    let (status, body) = send_get(&app.router, "/api/arkiv/daos").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["daos"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn dao_detail_includes_added_members() {
    let app = test_app();
    let (_, created) = send_json(
        &app.router,
        "POST",
        "/api/arkiv/daos",
        json!({"name": "Member DAO"}),
    )
    .await;
    let dao_key = created["daoKey"].as_str().unwrap().to_string();

    let (status, added) = send_json(
        &app.router,
        "POST",
        &format!("/api/arkiv/daos/{}/members", dao_key),
        json!({"userAddress": "0x0000000000000000000000000000000000000001"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(added["membershipKey"].is_string());

    let (status, detail) = send_get(&app.router, &format!("/api/arkiv/daos/{}", dao_key)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["daoKey"], dao_key);
    let memberships = detail["memberships"].as_array().unwrap();
    assert_eq!(memberships.len(), 2);
    // role defaults to CONTRIBUTOR when omitted
    let roles: Vec<&str> = memberships
        .iter()
        .map(|m| m["attributes"]["role"].as_str().unwrap())
        .collect();
    assert!(roles.contains(&"OWNER"));
    assert!(roles.contains(&"CONTRIBUTOR"));
}

#[tokio::test]
async fn proposal_create_and_query_by_dao() {
    let app = test_app();
    let (_, created_dao) = send_json(
        &app.router,
        "POST",
        "/api/arkiv/daos",
        json!({"name": "Proposal DAO"}),
    )
    .await;
    let dao_key = created_dao["daoKey"].as_str().unwrap().to_string();

    let (status, created) = send_json(
        &app.router,
        "POST",
        "/api/arkiv/proposals",
        json!({
            "daoKey": dao_key,
            "title": "Fund the docs sprint",
            "budget": 1500.0,
            "deadline": "2027-01-01T00:00:00Z"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["daoKey"], dao_key);
    let proposal_key = created["proposalKey"].as_str().unwrap().to_string();

    let (status, by_dao) = send_get(
        &app.router,
        &format!("/api/arkiv/proposals/by-dao/{}", dao_key),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let proposals = by_dao["proposals"].as_array().unwrap();
    assert_eq!(proposals.len(), 1);
    assert_eq!(proposals[0]["entityKey"], proposal_key);
    assert_eq!(proposals[0]["attributes"]["status"], "open");
    // payload comes back decoded as JSON
    assert_eq!(proposals[0]["payload"]["title"], "Fund the docs sprint");
}

#[tokio::test]
async fn proposal_create_rejects_bad_deadline() {
    let app = test_app();
    let (status, body) = send_json(
        &app.router,
        "POST",
        "/api/arkiv/proposals",
        json!({"daoKey": "0xabc", "title": "t", "deadline": "next tuesday"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["errors"][0]["field"], "deadline");
}

#[tokio::test]
async fn proposal_detail_collects_its_tasks() {
    let app = test_app();
    let (_, created) = send_json(
        &app.router,
        "POST",
        "/api/arkiv/proposals",
        json!({"daoKey": "0xdao", "title": "With tasks"}),
    )
    .await;
    let proposal_key = created["proposalKey"].as_str().unwrap().to_string();

    for title in ["first task", "second task"] {
        let (status, _) = send_json(
            &app.router,
            "POST",
            "/api/arkiv/tasks",
            json!({
                "proposalKey": proposal_key,
                "daoKey": "0xdao",
                "title": title
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, detail) = send_get(
        &app.router,
        &format!("/api/arkiv/proposals/{}", proposal_key),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["daoKey"], "0xdao");
    assert_eq!(detail["tasks"].as_array().unwrap().len(), 2);

    let (status, by_proposal) = send_get(
        &app.router,
        &format!("/api/arkiv/tasks/by-proposal/{}", proposal_key),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_proposal["tasks"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn task_detail_round_trips_the_status() {
    let app = test_app();
    let (_, created) = send_json(
        &app.router,
        "POST",
        "/api/arkiv/tasks",
        json!({
            "proposalKey": "0xprop",
            "daoKey": "0xdao",
            "title": "ship it",
            "status": "in-progress"
        }),
    )
    .await;
    let task_key = created["taskKey"].as_str().unwrap().to_string();

    let (status, detail) = send_get(&app.router, &format!("/api/arkiv/tasks/{}", task_key)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["task"]["attributes"]["status"], "in-progress");
    assert_eq!(detail["task"]["attributes"]["proposalKey"], "0xprop");
}

#[tokio::test]
async fn missing_entity_is_reported_as_upstream_failure() {
    let app = test_app();
    let (status, body) = send_get(&app.router, "/api/arkiv/tasks/0xdeadbeef").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to fetch task from Arkiv");
}

#[tokio::test]
async fn upload_accepts_pdf_and_returns_gateway_url() {
    let app = test_app();
    let request = multipart_request(
        "/api/upload",
        &[
            (
                "file",
                Some(("whitepaper.pdf", "application/pdf")),
                b"%PDF-1.7 fake",
            ),
            ("taskId", None, b"task-42"),
            ("documentType", None, b"whitepaper"),
        ],
    );
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["cid"], "bafybeimockcid");
    assert_eq!(body["data"]["filename"], "whitepaper.pdf");
    assert!(body["data"]["gatewayUrl"]
        .as_str()
        .unwrap()
        .contains("bafybeimockcid"));
    assert_eq!(app.files.uploads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn upload_rejects_disallowed_mime_type_before_storing() {
    let app = test_app();
    let request = multipart_request(
        "/api/upload",
        &[
            (
                "file",
                Some(("payload.exe", "application/x-msdownload")),
                b"MZ",
            ),
            ("taskId", None, b"task-42"),
        ],
    );
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("not allowed"));
    assert_eq!(app.files.uploads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upload_requires_a_task_id() {
    let app = test_app();
    let request = multipart_request(
        "/api/upload",
        &[(
            "file",
            Some(("photo.png", "image/png")),
            b"\x89PNG fake".as_slice(),
        )],
    );
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "taskId is required");
    assert_eq!(app.files.uploads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upload_requires_a_file() {
    let app = test_app();
    let request = multipart_request("/api/upload", &[("taskId", None, b"task-42")]);
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "no file provided");
}

#[tokio::test]
async fn board_view_groups_proposals_and_tasks_under_the_dao() {
    let app = test_app();
    let (_, created_dao) = send_json(
        &app.router,
        "POST",
        "/api/arkiv/daos",
        json!({"name": "Board DAO"}),
    )
    .await;
    let dao_key = created_dao["daoKey"].as_str().unwrap().to_string();

    let (_, created_proposal) = send_json(
        &app.router,
        "POST",
        "/api/arkiv/proposals",
        json!({"daoKey": dao_key, "title": "board proposal"}),
    )
    .await;
    let proposal_key = created_proposal["proposalKey"].as_str().unwrap().to_string();

    send_json(
        &app.router,
        "POST",
        "/api/arkiv/tasks",
        json!({"proposalKey": proposal_key, "daoKey": dao_key, "title": "board task"}),
    )
    .await;

    let (status, board) = send_get(
        &app.router,
        &format!("/api/arkiv/daos/{}/board", dao_key),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["daoKey"], dao_key);
    assert_eq!(board["proposals"].as_array().unwrap().len(), 1);
    assert_eq!(board["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(board["dao"]["payload"]["name"], "Board DAO");
}

#[tokio::test]
async fn task_tracking_stubs_answer_not_implemented() {
    let app = test_app();

    let (status, body) = send_json(
        &app.router,
        "POST",
        "/api/tasks/task-1/status",
        json!({"status": "done"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["code"], 501);

    let (status, _) = send_get(&app.router, "/api/tasks/task-1/attachments").await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);

    let (status, _) = send_get(&app.router, "/api/tasks/task-1/history").await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn repeated_registrations_yield_distinct_keys() {
    let app = test_app();
    let mut keys = Vec::new();
    for _ in 0..3 {
        let (_, body) = send_json(
            &app.router,
            "POST",
            "/api/arkiv/daos",
            json!({"name": "Same Name"}),
        )
        .await;
        keys.push(body["daoKey"].as_str().unwrap().to_string());
    }
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 3);
}
