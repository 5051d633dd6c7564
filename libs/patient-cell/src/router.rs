use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use shared_database::RestClient;

use crate::handlers::*;

pub fn patient_routes(client: Arc<RestClient>) -> Router {
    Router::new()
        .route("/", get(list_patients))
        .route("/{id}", get(get_patient))
        .route("/{id}/record", get(open_patient_record))
        .with_state(client)
}

pub fn record_routes(client: Arc<RestClient>) -> Router {
    Router::new()
        .route("/", put(save_record))
        .with_state(client)
}