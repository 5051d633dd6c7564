use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::handlers::*;
use appointment_cell::services::store::HttpAgendaStore;
use appointment_cell::{agenda_routes, SchedulingController};
use shared_models::error::AppError;
use shared_utils::test_utils::{MockAgendaResponses, TestConfig};

async fn setup_agenda_mocks(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/agendamentos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockAgendaResponses::appointment(1, 7, "2025-03-10", "09:45")
        ])))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/horarios-bloqueados"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockAgendaResponses::blocked_slot("2025-03-10", 14)
        ])))
        .mount(mock_server)
        .await;
}

async fn create_test_controller(mock_server: &MockServer) -> Arc<SchedulingController> {
    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    let store = HttpAgendaStore::from_config(&config).unwrap();
    let controller = SchedulingController::new(Arc::new(store), config.slot_overlap);
    controller.hydrate().await.unwrap();
    Arc::new(controller)
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_get_week_handler() {
    let mock_server = MockServer::start().await;
    setup_agenda_mocks(&mock_server).await;
    let controller = create_test_controller(&mock_server).await;

    let query = DateQuery {
        date: NaiveDate::from_ymd_opt(2025, 3, 16),
    };
    let Json(body) = get_week(State(controller), Query(query)).await.unwrap();

    assert_eq!(body["week"]["days"][0], "2025-03-10");
    assert_eq!(body["week"]["days"][6], "2025-03-16");
    assert_eq!(body["rows"][0]["label"], "08:00");
}

#[tokio::test]
async fn test_get_slot_handler_rejects_invalid_hour() {
    let mock_server = MockServer::start().await;
    setup_agenda_mocks(&mock_server).await;
    let controller = create_test_controller(&mock_server).await;

    let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let result = get_slot(State(controller), Path((date, 25))).await;

    match result {
        Err(AppError::BadRequest(msg)) => assert!(msg.contains("25")),
        other => panic!("Expected BadRequest, got {:?}", other.map(|Json(v)| v)),
    }
}

#[tokio::test]
async fn test_create_on_blocked_slot_returns_conflict() {
    let mock_server = MockServer::start().await;
    setup_agenda_mocks(&mock_server).await;
    Mock::given(method("POST"))
        .and(path("/agendamentos"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;
    let app = agenda_routes(create_test_controller(&mock_server).await);

    let response = app
        .oneshot(json_request(
            "POST",
            "/appointments",
            json!({ "paciente_id": 7, "date": "2025-03-10", "time": "14:15", "type": "Fisioterapia" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Slot 2025-03-10:14 is blocked. Choose another time.");
}

#[tokio::test]
async fn test_create_returns_created() {
    let mock_server = MockServer::start().await;
    setup_agenda_mocks(&mock_server).await;
    Mock::given(method("POST"))
        .and(path("/agendamentos"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(MockAgendaResponses::appointment(2, 7, "2025-03-11", "10:00")),
        )
        .mount(&mock_server)
        .await;
    let app = agenda_routes(create_test_controller(&mock_server).await);

    let response = app
        .oneshot(json_request(
            "POST",
            "/appointments",
            json!({ "paciente_id": 7, "date": "2025-03-11", "time": "10:00", "type": "Fisioterapia" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["id"], 2);
    assert_eq!(body["time"], "10:00");
}

#[tokio::test]
async fn test_toggle_route_on_occupied_slot() {
    let mock_server = MockServer::start().await;
    setup_agenda_mocks(&mock_server).await;
    let app = agenda_routes(create_test_controller(&mock_server).await);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/slots/2025-03-10/9/toggle")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["outcome"], "unchanged");
    assert_eq!(body["slot"]["can_toggle_block"], false);
    assert_eq!(body["slot"]["key"], "2025-03-10:09");
}

#[tokio::test]
async fn test_remote_failure_maps_to_bad_gateway_and_notice() {
    let mock_server = MockServer::start().await;
    setup_agenda_mocks(&mock_server).await;
    Mock::given(method("DELETE"))
        .and(path("/agendamentos/1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    let controller = create_test_controller(&mock_server).await;
    let app = agenda_routes(controller.clone());

    let response = app
        .clone()
        .oneshot(Request::builder().method("DELETE").uri("/appointments/1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(controller.appointments().await.len(), 1);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/notice").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = read_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("HTTP 500"));

    let response = app
        .oneshot(Request::builder().method("DELETE").uri("/notice").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(controller.last_error().await.is_none());
}

#[tokio::test]
async fn test_move_to_unknown_appointment() {
    let mock_server = MockServer::start().await;
    setup_agenda_mocks(&mock_server).await;
    let app = agenda_routes(create_test_controller(&mock_server).await);

    let response = app
        .oneshot(json_request("POST", "/appointments/99/move", json!({ "date": "2025-03-12", "hour": 10 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_update_is_rejected() {
    let mock_server = MockServer::start().await;
    setup_agenda_mocks(&mock_server).await;
    let controller = create_test_controller(&mock_server).await;

    let result = update_appointment(State(controller), Path(1), Json(Default::default())).await;

    let response = result.unwrap_err().into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_year_view_marks_busy_days() {
    let mock_server = MockServer::start().await;
    setup_agenda_mocks(&mock_server).await;
    let controller = create_test_controller(&mock_server).await;

    let Json(body) = get_year(State(controller), Query(YearQuery { year: Some(2025) })).await.unwrap();

    assert_eq!(body["months"].as_array().unwrap().len(), 12);
    assert_eq!(body["months"][2]["busy_days"], json!([10]));
}