use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::{agenda_routes, SchedulingController};
use patient_cell::{patient_routes, record_routes};
use shared_database::RestClient;

pub fn create_router(controller: Arc<SchedulingController>, client: Arc<RestClient>) -> Router {
    Router::new()
        .route("/", get(|| async { "Fisio Manager API is running!" }))
        .nest("/agenda", agenda_routes(controller))
        .nest("/patients", patient_routes(client.clone()))
        .nest("/records", record_routes(client))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use shared_utils::test_utils::{MockAgendaResponses, TestConfig};

    use super::*;

    async fn app_for(mock_server: &MockServer) -> Router {
        let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
        let controller = Arc::new(SchedulingController::from_config(&config).unwrap());
        controller.hydrate().await.unwrap();
        create_router(controller, Arc::new(RestClient::new(&config).unwrap()))
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_cells_are_nested() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/agendamentos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                MockAgendaResponses::appointment(1, 7, "2025-03-10", "09:45")
            ])))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/horarios-bloqueados"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pacientes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                MockAgendaResponses::patient(7, "Ana Souza", "11 98888-0000")
            ])))
            .mount(&mock_server)
            .await;

        let app = app_for(&mock_server).await;

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/agenda/month?date=2025-03-01").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["grid"]["first_weekday"], 6);
        assert_eq!(body["days"][9]["appointments"][0]["paciente_id"], 7);

        let response = app
            .oneshot(Request::builder().uri("/patients/7").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["nome"], "Ana Souza");
    }
}