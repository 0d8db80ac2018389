// --- File: crates/lashdiary_scheduling/src/routes.rs ---

use crate::handlers::{
    available_slots_handler, book_consultation_handler, book_showcase_handler,
    cancel_booking_handler, list_bookings_handler, SchedulingState,
};
use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

/// Creates a router containing all routes for the scheduling feature.
/// The backend service constructs the state (store + collaborators) and
/// nests this under its `/api` prefix.
pub fn routes(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/labs/slots", get(available_slots_handler))
        .route("/labs/showcase/book", post(book_showcase_handler))
        .route("/labs/consultations/book", post(book_consultation_handler))
        .route("/labs/admin/bookings", get(list_bookings_handler))
        .route(
            "/labs/admin/bookings/{booking_id}/cancel",
            patch(cancel_booking_handler),
        )
        .with_state(state)
}
