use std::sync::Arc;

use assert_matches::assert_matches;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use patient_cell::models::*;
use patient_cell::{patient_routes, record_routes, ClinicalRecordService, PatientService};
use shared_database::RestClient;
use shared_utils::test_utils::{MockAgendaResponses, TestConfig};

fn client_for(mock_server: &MockServer) -> Arc<RestClient> {
    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    Arc::new(RestClient::new(&config).unwrap())
}

async fn setup_patient_mocks(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/pacientes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockAgendaResponses::patient(1, "Ana Souza", "11 98888-0000"),
            MockAgendaResponses::patient_with_record(2, "Bruno Lima", "", 30)
        ])))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/prontuarios/30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockAgendaResponses::clinical_record(
            30,
            "B. Lima",
            "11 97777-0000",
        )))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_list_patients() {
    let mock_server = MockServer::start().await;
    setup_patient_mocks(&mock_server).await;

    let service = PatientService::new(client_for(&mock_server));
    let directory = service.directory().await.unwrap();

    assert_eq!(directory.len(), 2);
    assert_eq!(directory.display_name(2), "Bruno Lima");
    assert_eq!(directory.get(2).and_then(Patient::record_id), Some(30));
}

#[tokio::test]
async fn test_unknown_patient() {
    let mock_server = MockServer::start().await;
    setup_patient_mocks(&mock_server).await;

    let service = PatientService::new(client_for(&mock_server));
    assert_eq!(service.get_patient(77).await, Err(PatientError::NotFound(77)));
}

#[tokio::test]
async fn test_open_linked_record_applies_patient_identity() {
    let mock_server = MockServer::start().await;
    setup_patient_mocks(&mock_server).await;
    let client = client_for(&mock_server);

    let patient = PatientService::new(client.clone()).get_patient(2).await.unwrap();
    let record = ClinicalRecordService::new(client).open_for_patient(&patient).await.unwrap();

    assert_eq!(record.id, Some(30));
    assert_eq!(record.full_name.as_deref(), Some("Bruno Lima"));
    // Patient has no phone, so the record keeps its own.
    assert_eq!(record.phone.as_deref(), Some("11 97777-0000"));
    assert_eq!(record.sessions.len(), 1);
    assert_eq!(record.sections["queixaPrincipal"], "Dor lombar");
}

#[tokio::test]
async fn test_open_without_record_starts_blank() {
    let mock_server = MockServer::start().await;
    setup_patient_mocks(&mock_server).await;
    let client = client_for(&mock_server);

    let patient = PatientService::new(client.clone()).get_patient(1).await.unwrap();
    let record = ClinicalRecordService::new(client).open_for_patient(&patient).await.unwrap();

    assert_eq!(record.id, None);
    assert_eq!(record.full_name.as_deref(), Some("Ana Souza"));
    assert_eq!(record.phone.as_deref(), Some("11 98888-0000"));
}

#[tokio::test]
async fn test_save_routes_by_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/prontuarios/30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockAgendaResponses::clinical_record(
            30,
            "Bruno Lima",
            "11 97777-0000",
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/prontuarios"))
        .and(body_json(json!({ "nomeCompleto": "Ana Souza", "telefone": "", "sessoes": [] })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 31,
            "nomeCompleto": "Ana Souza",
            "telefone": "",
            "sessoes": []
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = ClinicalRecordService::new(client_for(&mock_server));

    let existing = ClinicalRecord {
        id: Some(30),
        full_name: Some("Bruno Lima".to_string()),
        ..ClinicalRecord::default()
    };
    assert_eq!(service.save_record(existing).await.unwrap().id, Some(30));

    let fresh = ClinicalRecord {
        full_name: Some("Ana Souza".to_string()),
        phone: Some(String::new()),
        ..ClinicalRecord::default()
    };
    assert_eq!(service.save_record(fresh).await.unwrap().id, Some(31));
}

#[tokio::test]
async fn test_missing_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/prontuarios/8"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let service = ClinicalRecordService::new(client_for(&mock_server));
    assert_matches!(service.get_record(8).await, Err(PatientError::RecordNotFound(8)));
}

#[tokio::test]
async fn test_patient_routes() {
    let mock_server = MockServer::start().await;
    setup_patient_mocks(&mock_server).await;
    let app = patient_routes(client_for(&mock_server));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/2/record").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["nomeCompleto"], "Bruno Lima");

    let response = app
        .oneshot(Request::builder().uri("/99").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_record_route_surfaces_backend_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/prontuarios"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let app = record_routes(client_for(&mock_server));
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "nomeCompleto": "Ana Souza", "sessoes": [] }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}