// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, Local, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use shared_models::error::AppError;

use crate::models::{AppointmentError, AppointmentUpdate, NewAppointment};
use crate::services::controller::SchedulingController;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

/// Drop target of a drag-and-drop move.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub date: NaiveDate,
    pub hour: u32,
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::SlotBlocked(_) | AppointmentError::SlotOccupied(_) => AppError::Conflict(err.to_string()),
            AppointmentError::NotFound(_) => AppError::NotFound(err.to_string()),
            AppointmentError::InvalidHour(_) | AppointmentError::InvalidTime(_) | AppointmentError::Calendar(_) => {
                AppError::BadRequest(err.to_string())
            }
            AppointmentError::Remote(remote) => AppError::from(remote),
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ==============================================================================
// CALENDAR VIEWS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_week(
    State(controller): State<Arc<SchedulingController>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Value>, AppError> {
    let reference = query.date.unwrap_or_else(today);
    debug!("Week agenda requested for {}", reference);

    let agenda = controller.week_agenda(reference).await?;
    Ok(Json(json!(agenda)))
}

#[axum::debug_handler]
pub async fn get_month(
    State(controller): State<Arc<SchedulingController>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Value>, AppError> {
    let reference = query.date.unwrap_or_else(today);
    debug!("Month agenda requested for {}", reference);

    let agenda = controller.month_agenda(reference).await?;
    Ok(Json(json!(agenda)))
}

#[axum::debug_handler]
pub async fn get_year(
    State(controller): State<Arc<SchedulingController>>,
    Query(query): Query<YearQuery>,
) -> Result<Json<Value>, AppError> {
    let year = query.year.unwrap_or_else(|| today().year());
    debug!("Year agenda requested for {}", year);

    let agenda = controller.year_agenda(year).await?;
    Ok(Json(json!(agenda)))
}

#[axum::debug_handler]
pub async fn refresh(State(controller): State<Arc<SchedulingController>>) -> Result<Json<Value>, AppError> {
    controller.hydrate().await?;
    Ok(Json(json!(controller.snapshot().await)))
}

// ==============================================================================
// SLOTS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_slot(
    State(controller): State<Arc<SchedulingController>>,
    Path((date, hour)): Path<(NaiveDate, u32)>,
) -> Result<Json<Value>, AppError> {
    let slot = controller.slot(date, hour).await?;
    Ok(Json(json!(slot)))
}

#[axum::debug_handler]
pub async fn toggle_slot(
    State(controller): State<Arc<SchedulingController>>,
    Path((date, hour)): Path<(NaiveDate, u32)>,
) -> Result<Json<Value>, AppError> {
    let outcome = controller.toggle_block(date, hour).await?;
    let slot = controller.slot(date, hour).await?;

    Ok(Json(json!({
        "outcome": outcome,
        "slot": slot
    })))
}

// ==============================================================================
// APPOINTMENTS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_appointments(State(controller): State<Arc<SchedulingController>>) -> Result<Json<Value>, AppError> {
    let appointments = controller.appointments().await;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(controller): State<Arc<SchedulingController>>,
    Json(request): Json<NewAppointment>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = controller.create_appointment(request).await?;
    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(controller): State<Arc<SchedulingController>>,
    Path(id): Path<i64>,
    Json(request): Json<AppointmentUpdate>,
) -> Result<Json<Value>, AppError> {
    if request.is_empty() {
        return Err(AppError::ValidationError("Update carries no fields".to_string()));
    }

    let appointment = controller.update_appointment(id, request).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn move_appointment(
    State(controller): State<Arc<SchedulingController>>,
    Path(id): Path<i64>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = controller.move_to_slot(id, request.date, request.hour).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(controller): State<Arc<SchedulingController>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    controller.delete_appointment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ==============================================================================
// NOTICE
// ==============================================================================

#[axum::debug_handler]
pub async fn get_notice(State(controller): State<Arc<SchedulingController>>) -> Json<Value> {
    Json(json!({ "message": controller.last_error().await }))
}

#[axum::debug_handler]
pub async fn dismiss_notice(State(controller): State<Arc<SchedulingController>>) -> StatusCode {
    controller.clear_error().await;
    StatusCode::NO_CONTENT
}