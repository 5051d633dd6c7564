use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_database::RestClient;
use shared_models::error::AppError;

use crate::models::{ClinicalRecord, PatientError};
use crate::services::{ClinicalRecordService, PatientService};

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound(_) | PatientError::RecordNotFound(_) => AppError::NotFound(err.to_string()),
            PatientError::Remote(remote) => AppError::from(remote),
        }
    }
}

#[axum::debug_handler]
pub async fn list_patients(State(client): State<Arc<RestClient>>) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(client);
    let patients = service.list_patients().await?;

    Ok(Json(json!({
        "patients": patients,
        "total": patients.len()
    })))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(client): State<Arc<RestClient>>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(client);
    let patient = service.get_patient(patient_id).await?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn open_patient_record(
    State(client): State<Arc<RestClient>>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let patient = PatientService::new(client.clone()).get_patient(patient_id).await?;
    let record = ClinicalRecordService::new(client).open_for_patient(&patient).await?;

    Ok(Json(json!(record)))
}

#[axum::debug_handler]
pub async fn save_record(
    State(client): State<Arc<RestClient>>,
    Json(record): Json<ClinicalRecord>,
) -> Result<Json<Value>, AppError> {
    let service = ClinicalRecordService::new(client);
    let saved = service.save_record(record).await?;

    Ok(Json(json!(saved)))
}