// File: crates/lashdiary_scheduling/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::booking::{BookingConfirmation, ConsultationRequest, ShowcaseBookingRequest};
use crate::handlers::{
    AvailableSlotsResponse, BookedListResponse, BookingResponse, CancellationResponse,
};
use crate::models::{BookingStatus, ConsultationStatus, MeetingType, ShowcaseBooking};

#[utoipa::path(
    get,
    path = "/labs/slots",
    params(
        ("date" = String, Query, description = "Date in YYYY-MM-DD format", example = "2025-07-15", format = "date")
    ),
    responses(
        (status = 200, description = "Still-bookable slot labels for the date", body = AvailableSlotsResponse),
        (status = 400, description = "Malformed date", body = String)
    )
)]
fn doc_available_slots_handler() {}

#[utoipa::path(
    post,
    path = "/labs/showcase/book",
    request_body(content = ShowcaseBookingRequest, example = json!({
        "token": "T1",
        "client_name": "Amina W.",
        "client_email": "amina@example.com",
        "meeting_type": "online",
        "date": "2025-07-15",
        "time": "3:30 PM"
    })),
    responses(
        (status = 200, description = "Booking committed", body = BookingResponse),
        (status = 400, description = "Missing or malformed fields", body = String),
        (status = 404, description = "Unknown or expired booking token", body = String),
        (status = 409, description = "Slot already taken", body = String)
    )
)]
fn doc_book_showcase_handler() {}

#[utoipa::path(
    post,
    path = "/labs/consultations/book",
    request_body(content = ConsultationRequest),
    responses(
        (status = 200, description = "Consultation committed", body = BookingResponse),
        (status = 400, description = "Missing or malformed fields", body = String),
        (status = 409, description = "Slot already taken", body = String)
    )
)]
fn doc_book_consultation_handler() {}

#[utoipa::path(
    get,
    path = "/labs/admin/bookings",
    params(
        ("include_cancelled" = Option<bool>, Query, description = "Whether to include cancelled bookings")
    ),
    responses(
        (status = 200, description = "Showcase bookings", body = BookedListResponse)
    )
)]
fn doc_list_bookings_handler() {}

#[utoipa::path(
    patch,
    path = "/labs/admin/bookings/{booking_id}/cancel",
    params(
        ("booking_id" = String, Path, description = "The ID of the booking to cancel")
    ),
    responses(
        (status = 200, description = "Cancellation result", body = CancellationResponse,
         example = json!({
             "success": true,
             "message": "Booking cancelled."
         })
        ),
        (status = 404, description = "Booking not found", body = String)
    )
)]
fn doc_cancel_booking_handler() {}

/// OpenAPI documentation for the scheduling routes.
#[derive(OpenApi)]
#[openapi(
    paths(
        doc_available_slots_handler,
        doc_book_showcase_handler,
        doc_book_consultation_handler,
        doc_list_bookings_handler,
        doc_cancel_booking_handler,
    ),
    components(schemas(
        AvailableSlotsResponse,
        BookingResponse,
        CancellationResponse,
        BookingConfirmation,
        BookedListResponse,
        ShowcaseBookingRequest,
        ConsultationRequest,
        ShowcaseBooking,
        MeetingType,
        BookingStatus,
        ConsultationStatus,
    )),
    tags((name = "Scheduling", description = "LashDiary Labs meeting booking endpoints"))
)]
pub struct SchedulingApiDoc;
