// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::services::controller::SchedulingController;

pub fn agenda_routes(controller: Arc<SchedulingController>) -> Router {
    Router::new()
        // Calendar views
        .route("/week", get(handlers::get_week))
        .route("/month", get(handlers::get_month))
        .route("/year", get(handlers::get_year))
        .route("/refresh", post(handlers::refresh))

        // Slot blocking
        .route("/slots/{date}/{hour}", get(handlers::get_slot))
        .route("/slots/{date}/{hour}/toggle", post(handlers::toggle_slot))

        // Appointments
        .route(
            "/appointments",
            get(handlers::list_appointments).post(handlers::create_appointment),
        )
        .route(
            "/appointments/{id}",
            post(handlers::update_appointment).delete(handlers::delete_appointment),
        )
        .route("/appointments/{id}/move", post(handlers::move_appointment))

        // Last error shown to the user
        .route("/notice", get(handlers::get_notice).delete(handlers::dismiss_notice))
        .with_state(controller)
}