// File: crates/lashdiary_scheduling/src/handlers.rs
use crate::booking::{
    book_consultation, book_showcase, cancel_showcase_booking, BookingConfirmation,
    ConsultationRequest, ShowcaseBookingRequest, CONSULTATIONS_KEY, SHOWCASE_BOOKINGS_KEY,
};
use crate::logic::{available_labels, business_tz, parse_calendar_date, TimeGrid};
use crate::models::{BookingStatus, Consultation, ShowcaseBooking};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use lashdiary_common::services::{BoxedError, CalendarService, NotificationService};
use lashdiary_common::{HttpStatusCode, SchedulingError};
use lashdiary_config::AppConfig;
use lashdiary_store::JsonStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

// Define shared state needed by scheduling handlers
#[derive(Clone)]
pub struct SchedulingState {
    pub config: Arc<AppConfig>,
    pub store: Arc<JsonStore>,
    /// Best-effort calendar sync; `None` means the collaborator is disabled.
    pub calendar: Option<Arc<dyn CalendarService<Error = BoxedError>>>,
    /// Best-effort email notifier; `None` means the collaborator is disabled.
    pub notifier: Option<Arc<dyn NotificationService<Error = BoxedError>>>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct SlotsQuery {
    /// Date in YYYY-MM-DD format
    pub date: String,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AvailableSlotsResponse {
    pub date: String,
    /// Bookable labels for the date, e.g. `"3:30 PM"`.
    pub slots: Vec<String>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<BookingConfirmation>,
    pub message: String,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct BookingsQuery {
    /// Whether to include cancelled bookings in the listing.
    pub include_cancelled: Option<bool>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookedListResponse {
    pub bookings: Vec<ShowcaseBooking>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CancellationResponse {
    pub success: bool,
    pub message: String,
}

/// Handler to list the still-bookable slot labels for a date.
#[axum::debug_handler]
pub async fn available_slots_handler(
    State(state): State<Arc<SchedulingState>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<AvailableSlotsResponse>, (StatusCode, String)> {
    let date = parse_calendar_date(&query.date).map_err(reject)?;
    let tz = business_tz(&state.config).map_err(reject)?;
    let grid = TimeGrid::from_config(&state.config.booking).map_err(reject)?;

    let consultations: Vec<Consultation> = state
        .store
        .read(CONSULTATIONS_KEY, Vec::new())
        .await
        .map_err(reject_store)?;
    let showcase: Vec<ShowcaseBooking> = state
        .store
        .read(SHOWCASE_BOOKINGS_KEY, Vec::new())
        .await
        .map_err(reject_store)?;

    let now = Utc::now().with_timezone(&tz);
    let slots = available_labels(date, now, &grid, &consultations, &showcase, tz);
    Ok(Json(AvailableSlotsResponse {
        date: query.date,
        slots,
    }))
}

/// Handler to book a showcase meeting.
#[axum::debug_handler]
pub async fn book_showcase_handler(
    State(state): State<Arc<SchedulingState>>,
    Json(payload): Json<ShowcaseBookingRequest>,
) -> Result<Json<BookingResponse>, (StatusCode, String)> {
    match book_showcase(&state, payload).await {
        Ok(confirmation) => {
            info!(booking_id = %confirmation.booking_id, "showcase meeting booked");
            Ok(Json(BookingResponse {
                success: true,
                booking: Some(confirmation),
                message: "Showcase meeting booked successfully.".to_string(),
            }))
        }
        Err(err) => Err(reject(err)),
    }
}

/// Handler to book a consultation.
#[axum::debug_handler]
pub async fn book_consultation_handler(
    State(state): State<Arc<SchedulingState>>,
    Json(payload): Json<ConsultationRequest>,
) -> Result<Json<BookingResponse>, (StatusCode, String)> {
    match book_consultation(&state, payload).await {
        Ok(confirmation) => {
            info!(booking_id = %confirmation.booking_id, "consultation booked");
            Ok(Json(BookingResponse {
                success: true,
                booking: Some(confirmation),
                message: "Consultation booked successfully.".to_string(),
            }))
        }
        Err(err) => Err(reject(err)),
    }
}

/// Handler to list showcase bookings for the admin dashboard.
#[axum::debug_handler]
pub async fn list_bookings_handler(
    State(state): State<Arc<SchedulingState>>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<BookedListResponse>, (StatusCode, String)> {
    let include_cancelled = query.include_cancelled.unwrap_or(false);
    let mut bookings: Vec<ShowcaseBooking> = state
        .store
        .read(SHOWCASE_BOOKINGS_KEY, Vec::new())
        .await
        .map_err(reject_store)?;
    if !include_cancelled {
        bookings.retain(|b| b.status != BookingStatus::Cancelled);
    }
    Ok(Json(BookedListResponse { bookings }))
}

/// Handler to cancel a showcase booking, freeing its slot.
#[axum::debug_handler]
pub async fn cancel_booking_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<CancellationResponse>, (StatusCode, String)> {
    match cancel_showcase_booking(&state, booking_id).await {
        Ok(()) => Ok(Json(CancellationResponse {
            success: true,
            message: "Booking cancelled.".to_string(),
        })),
        Err(err) => Err(reject(err)),
    }
}

/// Translate a pipeline error into an HTTP rejection. Client errors keep
/// their actionable message; server-side failures are logged and replaced
/// with a generic message.
fn reject(err: SchedulingError) -> (StatusCode, String) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = match &err {
        SchedulingError::Validation(m)
        | SchedulingError::NotFound(m)
        | SchedulingError::Conflict(m) => m.clone(),
        _ => {
            error!("booking request failed: {}", err);
            "Something went wrong on our side. Please try again.".to_string()
        }
    };
    (status, message)
}

fn reject_store(err: lashdiary_store::StoreError) -> (StatusCode, String) {
    reject(SchedulingError::Store(err.to_string()))
}
