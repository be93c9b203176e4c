use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use serde_json::json;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{body_partial_json, method, path, query_param};

use booking_cell::models::{BookAppointmentRequest, BookingError, PatientFormData};
use booking_cell::services::BookingService;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};
use workflow_cell::models::{BookingPayload, WorkflowError, WorkflowResponse};
use workflow_cell::services::WorkflowDispatcher;

const PATIENT_ID: &str = "4f0a7c2e-1111-4a5b-9c3d-000000000001";
const SLOT_ID: &str = "slot-1";
const SLOT_DATE: &str = "2030-06-10";

fn form(returning: bool) -> PatientFormData {
    PatientFormData {
        first_name: "Jordan".to_string(),
        last_name: "Rivera".to_string(),
        date_of_birth: "1990-04-12".to_string(),
        email: "jordan@example.com".to_string(),
        phone: "5551234567".to_string(),
        returning_patient: returning,
        sex: "female".to_string(),
        referring_doctor: "Dr. Patel".to_string(),
        reason_for_visit: Some("Cleaning".to_string()),
    }
}

fn request(returning: bool) -> BookAppointmentRequest {
    BookAppointmentRequest {
        patient: form(returning),
        slot_id: SLOT_ID.to_string(),
    }
}

fn service_for(mock_server: &MockServer) -> BookingService {
    BookingService::new(&TestConfig::with_mock_server(&mock_server.uri()).to_app_config())
}

async fn mount_slot(mock_server: &MockServer, status: &str) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointment_slots"))
        .and(query_param("id", format!("eq.{}", SLOT_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::slot_response(
                SLOT_ID, SLOT_DATE, "9:00 AM", "9:30 AM", status,
                "prov-1", "Dr. Chen", "loc-1", "Downtown",
            )
        ])))
        .mount(mock_server)
        .await;
}

async fn mount_existing_patient(mock_server: &MockServer, returning: bool) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::patient_response(PATIENT_ID, "jordan@example.com", "555-123-4567", returning)
        ])))
        .mount(mock_server)
        .await;
}

async fn mount_confirmed_bookings(mock_server: &MockServer, dates: &[Option<&str>]) {
    let rows: Vec<_> = dates
        .iter()
        .map(|d| MockSupabaseResponses::booking_with_slot_date_response(PATIENT_ID, *d))
        .collect();

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("patient_id", format!("eq.{}", PATIENT_ID)))
        .and(query_param("status", "eq.confirmed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(rows)))
        .mount(mock_server)
        .await;
}

async fn expect_slot_update(mock_server: &MockServer, status: &str, times: u64) {
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointment_slots"))
        .and(query_param("id", format!("eq.{}", SLOT_ID)))
        .and(body_partial_json(json!({ "status": status })))
        .respond_with(ResponseTemplate::new(204))
        .expect(times)
        .mount(mock_server)
        .await;
}

async fn mount_function(mock_server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/functions/v1/uipath-booking"))
        .respond_with(response)
        .mount(mock_server)
        .await;
}

async fn mount_booking_insert(mock_server: &MockServer, response: ResponseTemplate, times: u64) {
    Mock::given(method("POST"))
        .and(path("/rest/v1/bookings"))
        .and(body_partial_json(json!([{
            "patient_id": PATIENT_ID,
            "appointment_slot_id": SLOT_ID,
            "status": "confirmed"
        }])))
        .respond_with(response)
        .expect(times)
        .mount(mock_server)
        .await;
}

struct TimingOutDispatcher;

#[async_trait]
impl WorkflowDispatcher for TimingOutDispatcher {
    async fn dispatch(&self, _payload: &BookingPayload) -> Result<WorkflowResponse, WorkflowError> {
        Err(WorkflowError::Timeout { timeout_seconds: 300 })
    }
}

#[tokio::test]
async fn test_new_patient_booking_completes_every_step() {
    let mock_server = MockServer::start().await;

    mount_slot(&mock_server, "available").await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .and(body_partial_json(json!([{
            "first_name": "Jordan",
            "email": "jordan@example.com",
            "contact": "555-123-4567",
            "returning_patient": false
        }])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::patient_response(PATIENT_ID, "jordan@example.com", "555-123-4567", false)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_confirmed_bookings(&mock_server, &[]).await;
    expect_slot_update(&mock_server, "booked", 1).await;
    expect_slot_update(&mock_server, "available", 0).await;
    mount_function(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(MockSupabaseResponses::booking_function_success()),
    ).await;
    mount_booking_insert(&mock_server, ResponseTemplate::new(201).set_body_json(json!([{}])), 1).await;

    let confirmation = service_for(&mock_server).book(request(false)).await.unwrap();

    assert_eq!(confirmation.process_id, Some(482_913));
    assert_eq!(confirmation.state.as_deref(), Some("Pending"));
    assert_eq!(confirmation.patient_id, PATIENT_ID);
    assert_eq!(confirmation.slot_id, SLOT_ID);
    assert!(confirmation.booking_recorded);
}

#[tokio::test]
async fn test_workflow_payload_carries_slot_and_patient_details() {
    let mock_server = MockServer::start().await;

    mount_slot(&mock_server, "available").await;
    mount_existing_patient(&mock_server, true).await;
    mount_confirmed_bookings(&mock_server, &[]).await;
    expect_slot_update(&mock_server, "booked", 1).await;

    Mock::given(method("POST"))
        .and(path("/functions/v1/uipath-booking"))
        .and(body_partial_json(json!({
            "patient": {
                "firstName": "Jordan",
                "phone": "555-123-4567",
                "dateOfBirth": "1990-04-12",
                "gender": "female",
                "reasonForVisit": "Cleaning"
            },
            "appointment": {
                "date": SLOT_DATE,
                "startTime": "9:00 AM",
                "endTime": "9:30 AM",
                "slotId": SLOT_ID,
                "locationId": "loc-1",
                "providerId": "prov-1"
            },
            "location": { "id": "loc-1", "name": "Downtown" },
            "provider": { "id": "prov-1", "name": "Dr. Chen" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockSupabaseResponses::booking_function_success()))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_booking_insert(&mock_server, ResponseTemplate::new(201).set_body_json(json!([{}])), 1).await;

    assert!(service_for(&mock_server).book(request(true)).await.is_ok());
}

#[tokio::test]
async fn test_returning_flag_is_set_on_existing_patient() {
    let mock_server = MockServer::start().await;

    mount_slot(&mock_server, "available").await;
    mount_existing_patient(&mock_server, false).await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", format!("eq.{}", PATIENT_ID)))
        .and(body_partial_json(json!({ "returning_patient": true })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_confirmed_bookings(&mock_server, &[]).await;
    expect_slot_update(&mock_server, "booked", 1).await;
    mount_function(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(MockSupabaseResponses::booking_function_success()),
    ).await;
    mount_booking_insert(&mock_server, ResponseTemplate::new(201).set_body_json(json!([{}])), 1).await;

    assert!(service_for(&mock_server).book(request(true)).await.is_ok());
}

#[tokio::test]
async fn test_nearby_confirmed_booking_is_refused_before_reserving() {
    let mock_server = MockServer::start().await;

    mount_slot(&mock_server, "available").await;
    mount_existing_patient(&mock_server, true).await;
    // 2030-06-13 is exactly three days after the requested date
    mount_confirmed_bookings(&mock_server, &[None, Some("2030-05-01"), Some("2030-06-13")]).await;
    expect_slot_update(&mock_server, "booked", 0).await;

    let result = service_for(&mock_server).book(request(true)).await;

    assert_matches!(result, Err(BookingError::DuplicateBooking));
}

#[tokio::test]
async fn test_booking_outside_window_is_allowed() {
    let mock_server = MockServer::start().await;

    mount_slot(&mock_server, "available").await;
    mount_existing_patient(&mock_server, true).await;
    mount_confirmed_bookings(&mock_server, &[Some("2030-06-06"), Some("2030-06-14")]).await;
    expect_slot_update(&mock_server, "booked", 1).await;
    mount_function(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(MockSupabaseResponses::booking_function_success()),
    ).await;
    mount_booking_insert(&mock_server, ResponseTemplate::new(201).set_body_json(json!([{}])), 1).await;

    assert!(service_for(&mock_server).book(request(true)).await.is_ok());
}

#[tokio::test]
async fn test_workflow_failure_releases_the_slot() {
    let mock_server = MockServer::start().await;

    mount_slot(&mock_server, "available").await;
    mount_existing_patient(&mock_server, true).await;
    mount_confirmed_bookings(&mock_server, &[]).await;
    expect_slot_update(&mock_server, "booked", 1).await;
    expect_slot_update(&mock_server, "available", 1).await;
    mount_function(
        &mock_server,
        ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "error": "Robot is offline"
        })),
    ).await;
    mount_booking_insert(&mock_server, ResponseTemplate::new(201), 0).await;

    let result = service_for(&mock_server).book(request(true)).await;

    assert_matches!(
        result,
        Err(BookingError::Workflow(WorkflowError::Rejected(msg))) if msg == "Robot is offline"
    );
}

#[tokio::test]
async fn test_workflow_timeout_releases_the_slot() {
    let mock_server = MockServer::start().await;

    mount_slot(&mock_server, "available").await;
    mount_existing_patient(&mock_server, true).await;
    mount_confirmed_bookings(&mock_server, &[]).await;
    expect_slot_update(&mock_server, "booked", 1).await;
    expect_slot_update(&mock_server, "available", 1).await;

    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let service = BookingService::with_dispatcher(&config, Arc::new(TimingOutDispatcher));

    let result = service.book(request(true)).await;

    assert_matches!(result, Err(BookingError::Workflow(WorkflowError::Timeout { .. })));
}

#[tokio::test]
async fn test_booking_record_failure_is_not_surfaced() {
    let mock_server = MockServer::start().await;

    mount_slot(&mock_server, "available").await;
    mount_existing_patient(&mock_server, true).await;
    mount_confirmed_bookings(&mock_server, &[]).await;
    expect_slot_update(&mock_server, "booked", 1).await;
    expect_slot_update(&mock_server, "available", 0).await;
    mount_function(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(MockSupabaseResponses::booking_function_success()),
    ).await;
    mount_booking_insert(&mock_server, ResponseTemplate::new(409).set_body_string("duplicate key"), 1).await;

    let confirmation = service_for(&mock_server).book(request(true)).await.unwrap();

    assert!(!confirmation.booking_recorded);
    assert_eq!(confirmation.process_id, Some(482_913));
}

#[tokio::test]
async fn test_already_booked_slot_is_rejected() {
    let mock_server = MockServer::start().await;

    mount_slot(&mock_server, "booked").await;
    expect_slot_update(&mock_server, "booked", 0).await;

    let result = service_for(&mock_server).book(request(false)).await;

    assert_matches!(result, Err(BookingError::SlotNotAvailable));
}

#[tokio::test]
async fn test_unknown_slot_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointment_slots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let result = service_for(&mock_server).book(request(false)).await;

    assert_matches!(result, Err(BookingError::SlotNotFound));
}

#[tokio::test]
async fn test_invalid_form_never_reaches_the_store() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut bad = request(false);
    bad.patient.email = "not-an-email".to_string();

    let result = service_for(&mock_server).book(bad).await;

    assert_matches!(result, Err(BookingError::Validation(errors)) if errors == vec!["Please enter a valid email address".to_string()]);
}
