use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use omni_agency::api::{ApiClient, CaregiverService, FilePart, ShiftService};
use omni_agency::error::{ActionError, ApiError};
use omni_agency::facilities::{self, FacilityForm};
use omni_agency::model::{GeoPoint, NotifyRequest, ShiftPatch, ShiftStatus};
use omni_agency::route::Route;
use omni_agency::session::Session;
use omni_agency::verification::VerificationDialog;

#[derive(Debug, Clone, Default)]
struct Hit {
    method: &'static str,
    path: String,
    auth: Option<String>,
    body: Value,
    fields: Vec<(String, String)>,
    files: Vec<(String, String)>,
}

#[derive(Clone, Default)]
struct Stub {
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl Stub {
    async fn record(&self, hit: Hit) {
        self.hits.lock().await.push(hit);
    }

    async fn hits(&self) -> Vec<Hit> {
        self.hits.lock().await.clone()
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}

async fn facilities_for_agency(
    State(stub): State<Stub>,
    Path(agency_id): Path<String>,
    headers: HeaderMap,
) -> Json<Value> {
    stub.record(Hit {
        method: "GET",
        path: format!("/api/facilities/agency/{agency_id}"),
        auth: bearer(&headers),
        ..Default::default()
    })
    .await;
    Json(json!([{
        "_id": "f1",
        "name": "Maple House",
        "location": { "latitude": "40.5", "longitude": -73.25 },
        "textLocation": "1 Main St",
        "email": "desk@maple.example",
        "phone": "555-0100"
    }]))
}

async fn create_facility(
    State(stub): State<Stub>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut fields = Vec::new();
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let _ = field.bytes().await.unwrap();
                files.push((name, file_name));
            }
            None => fields.push((name, field.text().await.unwrap())),
        }
    }
    stub.record(Hit {
        method: "POST",
        path: "/api/facilities".into(),
        auth: bearer(&headers),
        fields,
        files,
        ..Default::default()
    })
    .await;
    (
        StatusCode::CREATED,
        Json(json!({ "_id": "f2", "name": "Oak Lodge" })),
    )
}

async fn shift_by_id(Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    match id.as_str() {
        "missing" => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Shift not found", "statusCode": 404 })),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": ["id must be a mongodb id", "id is too short"] })),
        ),
    }
}

async fn update_shift(
    State(stub): State<Stub>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    stub.record(Hit {
        method: "PATCH",
        path: format!("/api/shifts/{id}"),
        auth: bearer(&headers),
        body,
        ..Default::default()
    })
    .await;
    Json(json!({ "message": "Shift updated successfully" }))
}

async fn applied_caregivers(
    State(stub): State<Stub>,
    Path(agency_id): Path<String>,
    headers: HeaderMap,
) -> Json<Value> {
    stub.record(Hit {
        method: "GET",
        path: format!("/auth-svc/agencies/{agency_id}/applied-caregivers"),
        auth: bearer(&headers),
        ..Default::default()
    })
    .await;
    Json(json!([{
        "_id": "c1",
        "name": "Ana",
        "approvedStatus": false,
        "uploadedDocuments": [{
            "_id": "d1",
            "agencyId": "a1",
            "documentTypeId": { "_id": "t1", "name": "CPR Card" },
            "fileUrl": "https://files.example/d1.pdf",
            "status": "pending"
        }]
    }]))
}

async fn caregiver_details(
    State(stub): State<Stub>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    stub.record(Hit {
        method: "GET",
        path: format!(
            "/api/caregivers/details/{id}?agencyId={}",
            query.get("agencyId").cloned().unwrap_or_default()
        ),
        ..Default::default()
    })
    .await;
    Json(json!({
        "profile": { "name": "Ana", "email": "ana@example.com", "phone": "555" },
        "documents": [],
        "assignedShifts": [],
        "canceledShifts": []
    }))
}

async fn verify_document(
    State(stub): State<Stub>,
    Path((caregiver_id, type_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    stub.record(Hit {
        method: "PATCH",
        path: format!("/api/caregiverdocuments/status/{caregiver_id}/{type_id}"),
        auth: bearer(&headers),
        body,
        ..Default::default()
    })
    .await;
    Json(json!({ "ok": true }))
}

async fn notify(
    State(stub): State<Stub>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    stub.record(Hit {
        method: "POST",
        path: format!("/api/users/notify/{id}"),
        body,
        ..Default::default()
    })
    .await;
    StatusCode::NO_CONTENT
}

async fn spawn_backend() -> (ApiClient, Stub) {
    let stub = Stub::default();
    let app = Router::new()
        .route("/api/facilities", post(create_facility))
        .route("/api/facilities/agency/:agency_id", get(facilities_for_agency))
        .route("/api/shifts/:id", get(shift_by_id).patch(update_shift))
        .route(
            "/auth-svc/agencies/:agency_id/applied-caregivers",
            get(applied_caregivers),
        )
        .route("/api/caregivers/details/:id", get(caregiver_details))
        .route(
            "/api/caregiverdocuments/status/:caregiver_id/:type_id",
            patch(verify_document),
        )
        .route("/api/users/notify/:id", post(notify))
        .with_state(stub.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = ApiClient::new(
        &format!("http://{addr}/api"),
        &format!("http://{addr}/auth-svc/"),
        Duration::from_secs(5),
    )
    .unwrap();
    (client, stub)
}

fn session() -> Session {
    Session::new("tok-123", "a1")
}

#[tokio::test]
async fn bearer_token_is_attached() {
    use omni_agency::api::FacilityService;

    let (api, stub) = spawn_backend().await;
    let facilities = api.fetch_facilities(&session(), "a1").await.unwrap();
    assert_eq!(facilities[0].location, GeoPoint::new(40.5, -73.25));

    let hits = stub.hits().await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, "/api/facilities/agency/a1");
    assert_eq!(hits[0].auth.as_deref(), Some("Bearer tok-123"));
}

#[tokio::test]
async fn missing_token_sends_nothing() {
    use omni_agency::api::FacilityService;

    let (api, stub) = spawn_backend().await;
    let err = api
        .fetch_facilities(&Session::anonymous(), "a1")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotAuthenticated));
    assert_eq!(err.to_string(), "Authentication token not found. Please log in.");
    assert!(stub.hits().await.is_empty());
}

#[tokio::test]
async fn backend_message_is_surfaced() {
    let (api, _stub) = spawn_backend().await;

    let err = api.fetch_shift(&session(), "missing").await.unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
    match &err {
        ApiError::Status { message, .. } => assert_eq!(message, "Shift not found"),
        other => panic!("unexpected {other:?}"),
    }

    let err = api.fetch_shift(&session(), "x").await.unwrap_err();
    match err {
        ApiError::Status { message, .. } => {
            assert_eq!(message, "id must be a mongodb id; id is too short")
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn create_facility_sends_multipart_and_redirects() {
    let (api, stub) = spawn_backend().await;
    let form = FacilityForm {
        name: "Oak Lodge".into(),
        location: GeoPoint::new(51.5, -0.12),
        text_location: "3 High St".into(),
        telephone: "555-0199".into(),
        email: "desk@oak.example".into(),
        building_name: String::new(),
        floor: String::new(),
        description: "Rehab".into(),
    };
    let image = FilePart {
        file_name: "front.png".into(),
        content_type: "image/png",
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    };

    let route = facilities::create_facility(&api, &session(), &form, Some(image))
        .await
        .unwrap();
    assert_eq!(route, Route::Facilities);
    assert_eq!(route.path(), "/dashboard/facilities");

    let hits = stub.hits().await;
    assert_eq!(hits.len(), 1);
    let hit = &hits[0];
    assert_eq!(hit.auth.as_deref(), Some("Bearer tok-123"));
    let field = |name: &str| {
        hit.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    };
    assert_eq!(field("name").as_deref(), Some("Oak Lodge"));
    assert_eq!(field("location[latitude]").as_deref(), Some("51.5"));
    assert_eq!(field("location[longitude]").as_deref(), Some("-0.12"));
    assert_eq!(field("agencyId").as_deref(), Some("a1"));
    assert_eq!(hit.files, vec![("image".to_string(), "front.png".to_string())]);
}

#[tokio::test]
async fn incomplete_facility_is_not_sent() {
    let (api, stub) = spawn_backend().await;
    let err = facilities::create_facility(&api, &session(), &FacilityForm::default(), None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Please fill out all required fields.");
    assert!(matches!(err, ActionError::Validation(_)));
    assert!(stub.hits().await.is_empty());
}

#[tokio::test]
async fn caregivers_come_from_auth_host_and_verify_body() {
    let (api, stub) = spawn_backend().await;
    let caregivers = api.fetch_caregivers(&session(), "a1").await.unwrap();
    assert_eq!(caregivers.len(), 1);

    let mut dialog = VerificationDialog::open(&caregivers[0]);
    dialog
        .submit(&api, &session(), false, Some("blurry scan"))
        .await
        .unwrap();
    assert!(!dialog.is_open());

    let hits = stub.hits().await;
    assert_eq!(hits[0].path, "/auth-svc/agencies/a1/applied-caregivers");
    assert_eq!(hits[1].method, "PATCH");
    assert_eq!(hits[1].path, "/api/caregiverdocuments/status/c1/t1");
    assert_eq!(hits[1].auth.as_deref(), Some("Bearer tok-123"));
    assert_eq!(
        hits[1].body,
        json!({ "status": "rejected", "comments": "blurry scan" })
    );
}

#[tokio::test]
async fn details_query_and_empty_notify_response() {
    let (api, stub) = spawn_backend().await;
    let details = api
        .fetch_caregiver_details(&session(), "c1", "a1")
        .await
        .unwrap();
    assert_eq!(details.profile.name, "Ana");

    api.notify_caregiver(
        &session(),
        "c1",
        &NotifyRequest {
            message: "New shift available".into(),
        },
    )
    .await
    .unwrap();

    let hits = stub.hits().await;
    assert_eq!(hits[0].path, "/api/caregivers/details/c1?agencyId=a1");
    assert_eq!(hits[1].body, json!({ "message": "New shift available" }));
}

#[tokio::test]
async fn shift_update_accepts_acknowledgement_body() {
    let (api, stub) = spawn_backend().await;
    let patch = ShiftPatch {
        title: Some("Weekend nights".into()),
        status: Some(ShiftStatus::Active),
        ..Default::default()
    };
    api.update_shift(&session(), "s1", &patch).await.unwrap();

    let hits = stub.hits().await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, "/api/shifts/s1");
    assert_eq!(hits[0].auth.as_deref(), Some("Bearer tok-123"));
    assert_eq!(hits[0].body["title"], "Weekend nights");
    assert_eq!(hits[0].body["status"], "active");
}
