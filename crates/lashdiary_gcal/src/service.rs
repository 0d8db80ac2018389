// --- File: crates/lashdiary_gcal/src/service.rs ---
//! Google Calendar service implementation.
//!
//! This module provides an implementation of the CalendarService trait for
//! Google Calendar. The booking pipeline consumes it strictly best-effort:
//! any error returned here is logged by the caller, never surfaced to the
//! client.

use chrono::{DateTime, Utc};
use google_calendar3::api::{Event, EventDateTime};
use lashdiary_common::services::{CalendarEvent, CalendarEventResult, CalendarService};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::auth::HubType;

/// Errors that can occur when interacting with Google Calendar.
#[derive(Error, Debug)]
pub enum GcalServiceError {
    #[error("Google API Error: {0}")]
    ApiError(#[from] google_calendar3::Error),
    #[error("Failed to parse time: {0}")]
    TimeParseError(String),
    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Google Calendar service implementation.
pub struct GoogleCalendarService {
    calendar_hub: Arc<HubType>,
}

impl GoogleCalendarService {
    /// Create a new Google Calendar service.
    pub fn new(calendar_hub: Arc<HubType>) -> Self {
        Self { calendar_hub }
    }
}

impl CalendarService for GoogleCalendarService {
    type Error = GcalServiceError;

    /// Creates a calendar event for a committed booking.
    ///
    /// The start and end instants arrive as ISO-8601 strings with an
    /// explicit offset (the booking pipeline produces them from the
    /// canonical business-zone instant) and are stored on the event in
    /// UTC. The booking id and client contact ride along in the event
    /// description so the business owner can cross-reference from the
    /// calendar UI.
    fn book_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> std::pin::Pin<
        Box<
            dyn std::future::Future<Output = Result<CalendarEventResult, Self::Error>> + Send + '_,
        >,
    > {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let start_dt = DateTime::parse_from_rfc3339(&event.start_time)
                .map_err(|e| {
                    GcalServiceError::TimeParseError(format!("Invalid start_time: {}", e))
                })?
                .with_timezone(&Utc);
            let end_dt = DateTime::parse_from_rfc3339(&event.end_time)
                .map_err(|e| GcalServiceError::TimeParseError(format!("Invalid end_time: {}", e)))?
                .with_timezone(&Utc);

            if end_dt <= start_dt {
                return Err(GcalServiceError::CalculationError(
                    "End time must be after start time".to_string(),
                ));
            }

            // Fold the booking reference into the description
            let mut description = event.description.clone().unwrap_or_default();
            if let Some(booking_id) = &event.booking_id {
                if !description.is_empty() {
                    description.push('\n');
                }
                description.push_str(&format!("Booking reference: {}", booking_id));
            }
            if let Some(client_email) = &event.client_email {
                description.push_str(&format!("\nClient: {}", client_email));
            }

            let new_event = Event {
                summary: Some(event.summary),
                description: Some(description),
                location: event.location,
                start: Some(EventDateTime {
                    date_time: Some(start_dt),
                    time_zone: Some("UTC".to_string()),
                    ..Default::default()
                }),
                end: Some(EventDateTime {
                    date_time: Some(end_dt),
                    time_zone: Some("UTC".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            };

            let (_response, created_event) = calendar_hub
                .events()
                .insert(new_event, &calendar_id)
                .doit()
                .await?;

            info!(event_id = ?created_event.id, "calendar event created");
            Ok(CalendarEventResult {
                event_id: created_event.id,
                status: created_event
                    .status
                    .unwrap_or_else(|| "confirmed".to_string()),
            })
        })
    }

    /// Marks a previously created event as cancelled without deleting it,
    /// so the calendar keeps a trace of the slot's history.
    fn cancel_event(
        &self,
        calendar_id: &str,
        event_id: &str,
    ) -> std::pin::Pin<
        Box<
            dyn std::future::Future<Output = Result<CalendarEventResult, Self::Error>> + Send + '_,
        >,
    > {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let patch = Event {
                status: Some("cancelled".to_string()),
                ..Default::default()
            };

            let (_response, updated_event) = calendar_hub
                .events()
                .patch(patch, &calendar_id, &event_id)
                .doit()
                .await?;

            info!(event_id = ?updated_event.id, "calendar event cancelled");
            Ok(CalendarEventResult {
                event_id: updated_event.id,
                status: updated_event
                    .status
                    .unwrap_or_else(|| "cancelled".to_string()),
            })
        })
    }
}
