use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

use omni_agency::api::{FacilityService, MultipartPayload, ShiftService};
use omni_agency::error::{ActionError, ApiError, ValidationError};
use omni_agency::model::{
    CreateShiftRequest, Facility, NursePayRate, NurseType, Shift, ShiftPatch, ShiftStatus,
};
use omni_agency::session::Session;
use omni_agency::shifts::{combine_local, ShiftBoard, ShiftDraft, ShiftEditForm, ShiftTab};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    FetchFacilities(String),
    FetchShifts(String),
    Create(CreateShiftRequest),
    Update(String, ShiftPatch),
    Delete(String),
}

/// Serves a scripted sequence of shift lists and records every call.
#[derive(Clone, Default)]
struct RecordingBackend {
    shift_lists: Arc<Mutex<VecDeque<Vec<Shift>>>>,
    calls: Arc<Mutex<Vec<Call>>>,
    fail_create: bool,
}

impl RecordingBackend {
    fn with_shift_lists(lists: Vec<Vec<Shift>>) -> Self {
        Self {
            shift_lists: Arc::new(Mutex::new(VecDeque::from(lists))),
            ..Default::default()
        }
    }

    async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }
}

fn shift(id: &str, status: &str) -> Shift {
    serde_json::from_value(json!({
        "_id": id,
        "title": format!("shift {id}"),
        "facilityId": { "_id": "f1", "name": "Maple House" },
        "date": "2024-05-01T00:00:00Z",
        "startTime": "2024-05-01T17:00:00Z",
        "endTime": "2024-05-01T21:00:00Z",
        "status": status,
        "caregiversNeeded": 2,
        "nurseType": ["RN"],
        "basePriceByNurseType": [{ "nurseType": "RN", "payRate": 40 }]
    }))
    .unwrap()
}

#[async_trait]
impl FacilityService for RecordingBackend {
    async fn create_facility(
        &self,
        _session: &Session,
        _payload: MultipartPayload,
    ) -> Result<Facility, ApiError> {
        unreachable!("not used by the shift board")
    }

    async fn fetch_facilities(
        &self,
        session: &Session,
        agency_id: &str,
    ) -> Result<Vec<Facility>, ApiError> {
        session.token()?;
        self.calls
            .lock()
            .await
            .push(Call::FetchFacilities(agency_id.to_string()));
        Ok(vec![Facility {
            id: Some("f1".into()),
            name: "Maple House".into(),
            ..Default::default()
        }])
    }

    async fn fetch_facility(&self, _session: &Session, _id: &str) -> Result<Facility, ApiError> {
        unreachable!("not used by the shift board")
    }

    async fn update_facility(
        &self,
        _session: &Session,
        _id: &str,
        _payload: MultipartPayload,
    ) -> Result<Facility, ApiError> {
        unreachable!("not used by the shift board")
    }

    async fn delete_facility(&self, _session: &Session, _id: &str) -> Result<(), ApiError> {
        unreachable!("not used by the shift board")
    }
}

#[async_trait]
impl ShiftService for RecordingBackend {
    async fn create_shift(
        &self,
        session: &Session,
        req: &CreateShiftRequest,
    ) -> Result<Shift, ApiError> {
        session.token()?;
        self.calls.lock().await.push(Call::Create(req.clone()));
        if self.fail_create {
            return Err(ApiError::from_status(
                reqwest::StatusCode::BAD_REQUEST,
                r#"{"message":"Facility not found"}"#,
                "Error creating shift",
            ));
        }
        Ok(shift("new", "open"))
    }

    async fn fetch_shifts(
        &self,
        session: &Session,
        agency_id: &str,
    ) -> Result<Vec<Shift>, ApiError> {
        session.token()?;
        self.calls
            .lock()
            .await
            .push(Call::FetchShifts(agency_id.to_string()));
        let mut lists = self.shift_lists.lock().await;
        Ok(if lists.len() > 1 {
            lists.pop_front().unwrap_or_default()
        } else {
            lists.front().cloned().unwrap_or_default()
        })
    }

    async fn fetch_shifts_by_facility(
        &self,
        _session: &Session,
        _facility_id: &str,
    ) -> Result<Vec<Shift>, ApiError> {
        Ok(Vec::new())
    }

    async fn fetch_shift(&self, _session: &Session, id: &str) -> Result<Shift, ApiError> {
        Ok(shift(id, "open"))
    }

    async fn update_shift(
        &self,
        session: &Session,
        id: &str,
        patch: &ShiftPatch,
    ) -> Result<(), ApiError> {
        session.token()?;
        self.calls
            .lock()
            .await
            .push(Call::Update(id.to_string(), patch.clone()));
        Ok(())
    }

    async fn delete_shift(&self, session: &Session, id: &str) -> Result<(), ApiError> {
        session.token()?;
        self.calls.lock().await.push(Call::Delete(id.to_string()));
        Ok(())
    }
}

fn session() -> Session {
    Session::new("tok", "a1")
}

fn draft() -> ShiftDraft {
    ShiftDraft {
        title: "Weekend nights".into(),
        facility_id: Some("f1".into()),
        date: NaiveDate::from_ymd_opt(2024, 6, 8),
        start_time: NaiveTime::from_hms_opt(20, 0, 0),
        end_time: NaiveTime::from_hms_opt(23, 30, 0),
        base_price: 35.0,
        caregivers_needed: 3,
        nurse_types: vec![NurseType::RN, NurseType::HHA],
        pay_rates: vec![
            NursePayRate { nurse_type: NurseType::RN, pay_rate: 55.0 },
            NursePayRate { nurse_type: NurseType::HHA, pay_rate: 0.0 },
        ],
        status: None,
    }
}

#[tokio::test]
async fn facilities_load_before_shifts() {
    let backend = RecordingBackend::with_shift_lists(vec![vec![
        shift("a", "open"),
        shift("b", "active"),
        shift("c", "canceled"),
    ]]);
    let mut board = ShiftBoard::load(&backend, session()).await.unwrap();

    assert_eq!(
        backend.calls().await,
        vec![
            Call::FetchFacilities("a1".into()),
            Call::FetchShifts("a1".into())
        ]
    );
    assert_eq!(board.facilities().len(), 1);
    assert_eq!(board.visible().len(), 3);

    board.set_tab(ShiftTab::from_id("active-shifts"));
    let visible: Vec<&str> = board.visible().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(visible, vec!["b"]);
    assert_eq!(board.shifts().len(), 3);
}

#[tokio::test]
async fn create_sends_positive_rates_and_refetches() {
    let backend = RecordingBackend::with_shift_lists(vec![
        vec![shift("a", "open")],
        vec![shift("a", "open"), shift("new", "open")],
    ]);
    let mut board = ShiftBoard::load(&backend, session()).await.unwrap();
    let created = board.create(&draft()).await.unwrap();
    assert_eq!(created.id, "new");
    assert_eq!(board.shifts().len(), 2);

    let calls = backend.calls().await;
    assert_eq!(calls.len(), 4);
    let Call::Create(req) = &calls[2] else {
        panic!("expected create, got {:?}", calls[2]);
    };
    assert_eq!(
        req.base_price_by_nurse_type,
        vec![NursePayRate { nurse_type: NurseType::RN, pay_rate: 55.0 }]
    );
    let date = NaiveDate::from_ymd_opt(2024, 6, 8).unwrap();
    assert_eq!(
        req.start_time,
        combine_local(date, NaiveTime::from_hms_opt(20, 0, 0).unwrap()).unwrap()
    );
    assert_eq!(req.status, ShiftStatus::Open);
    assert_eq!(calls[3], Call::FetchShifts("a1".into()));
}

#[tokio::test]
async fn invalid_draft_is_not_sent() {
    let backend = RecordingBackend::with_shift_lists(vec![vec![]]);
    let mut board = ShiftBoard::load(&backend, session()).await.unwrap();
    let mut bad = draft();
    bad.nurse_types.clear();
    let err = board.create(&bad).await.unwrap_err();
    assert!(matches!(
        err,
        ActionError::Validation(ValidationError::NoNurseType)
    ));
    assert_eq!(backend.calls().await.len(), 2);
}

#[tokio::test]
async fn backend_failure_skips_refetch() {
    let backend = RecordingBackend {
        fail_create: true,
        ..RecordingBackend::with_shift_lists(vec![vec![]])
    };
    let mut board = ShiftBoard::load(&backend, session()).await.unwrap();
    let err = board.create(&draft()).await.unwrap_err();
    assert_eq!(err.to_string(), "Facility not found (HTTP 400 Bad Request)");
    let calls = backend.calls().await;
    assert_eq!(calls.len(), 3);
    assert!(matches!(calls[2], Call::Create(_)));
}

#[tokio::test]
async fn anonymous_session_cannot_load() {
    let backend = RecordingBackend::default();
    let err = ShiftBoard::load(&backend, Session::anonymous()).await.err().unwrap();
    assert!(matches!(err, ApiError::MissingAgency));
    assert!(backend.calls().await.is_empty());
}

#[tokio::test]
async fn update_sends_status_only_when_moved() {
    let backend = RecordingBackend::with_shift_lists(vec![vec![shift("a", "open")]]);
    let mut board = ShiftBoard::load(&backend, session()).await.unwrap();

    let form = ShiftEditForm::from_shift(board.find("a").unwrap());
    board.update("a", &form).await.unwrap();

    let mut moved = form.clone();
    moved.status = ShiftStatus::Active;
    board.update("a", &moved).await.unwrap();

    let mut illegal = form.clone();
    illegal.status = ShiftStatus::Completed;
    let err = board.update("a", &illegal).await.unwrap_err();
    assert!(matches!(
        err,
        ActionError::Validation(ValidationError::IllegalTransition { .. })
    ));

    let patches: Vec<ShiftPatch> = backend
        .calls()
        .await
        .into_iter()
        .filter_map(|c| match c {
            Call::Update(_, patch) => Some(patch),
            _ => None,
        })
        .collect();
    assert_eq!(patches.len(), 2);
    assert_eq!(patches[0].status, None);
    let expected_start = combine_local(form.date.unwrap(), form.start_time.unwrap()).unwrap();
    assert_eq!(patches[0].start_time, Some(expected_start));
    assert!(patches[0].title.is_none());
    assert_eq!(patches[1].status, Some(ShiftStatus::Active));
}

#[tokio::test]
async fn delete_refetches() {
    let backend = RecordingBackend::with_shift_lists(vec![
        vec![shift("a", "open"), shift("b", "open")],
        vec![shift("b", "open")],
    ]);
    let mut board = ShiftBoard::load(&backend, session()).await.unwrap();
    board.delete("a").await.unwrap();
    assert_eq!(board.shifts().len(), 1);
    let calls = backend.calls().await;
    assert_eq!(calls[2], Call::Delete("a".into()));
    assert_eq!(calls[3], Call::FetchShifts("a1".into()));
}
