// --- File: crates/lashdiary_scheduling/src/booking.rs ---
//! Booking commit pipeline.
//!
//! Both booking kinds go through the same sequence: validate the request,
//! normalize it to a canonical slot, then re-run the conflict scan and
//! append the record inside the store's commit locks. The collection
//! write is the durability point; everything after it (calendar event,
//! parent back-reference, emails) is best-effort with a bounded retry and
//! can never fail a committed booking.

use crate::handlers::SchedulingState;
use crate::logic::{business_tz, canonical_instant, slot_key, slot_taken};
use crate::models::{
    BookingStatus, BookingSubject, Consultation, ConsultationStatus, MeetingType, OrderRecord,
    ProjectRecord, ShowcaseBooking,
};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use lashdiary_common::services::{CalendarEvent, EmailAttachment};
use lashdiary_common::{conflict, not_found, validation_error, SchedulingError};
use lashdiary_store::{JsonStore, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Collection keys in the data store.
pub const CONSULTATIONS_KEY: &str = "consultations";
pub const SHOWCASE_BOOKINGS_KEY: &str = "showcase_bookings";
pub const PROJECTS_KEY: &str = "projects";
pub const ORDERS_KEY: &str = "orders";

const SIDE_EFFECT_ATTEMPTS: u32 = 3;
const SIDE_EFFECT_BACKOFF_MS: u64 = 250;

/// Showcase meeting booking submission. Fields arrive as options so a
/// missing required field is reported as a validation error with a usable
/// message instead of a generic body-rejection.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Deserialize)]
pub struct ShowcaseBookingRequest {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub client_phone: Option<String>,
    /// Defaults to an online meeting when absent.
    #[serde(default)]
    pub meeting_type: Option<MeetingType>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub client_timezone: Option<String>,
    #[serde(default)]
    pub client_country: Option<String>,
}

/// Consultation booking submission.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Deserialize)]
pub struct ConsultationRequest {
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

/// What the caller gets back once a booking is durable.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub booking_id: Uuid,
    pub status: String,
}

/// Book a showcase meeting against the shared time grid.
pub async fn book_showcase(
    state: &SchedulingState,
    request: ShowcaseBookingRequest,
) -> Result<BookingConfirmation, SchedulingError> {
    let token = require_field(request.token, "token")?;
    let client_name = require_field(request.client_name, "clientName")?;
    let client_email = require_email(request.client_email)?;
    let date = require_field(request.date, "date")?;
    let time = require_field(request.time, "time")?;
    let meeting_type = request.meeting_type.unwrap_or(MeetingType::Online);

    let subject = resolve_subject(&state.store, &token).await?;

    let tz = business_tz(&state.config)?;
    let key = slot_key(&date, &time)?;
    let instant = canonical_instant(key.date, key.time, tz)?;

    let record = ShowcaseBooking {
        id: Uuid::new_v4(),
        token,
        client_name,
        client_email,
        client_phone: request.client_phone.filter(|p| !p.trim().is_empty()),
        meeting_type,
        appointment_date: instant.fixed_offset(),
        appointment_time: key.time.label_12h(),
        client_timezone: request.client_timezone,
        client_country: request.client_country,
        status: BookingStatus::Pending,
        calendar_event_id: None,
        created_at: Utc::now(),
    };

    // Check-then-append under both commit locks, consultations first
    // (every commit path takes them in this order).
    {
        let _consultations_guard = state
            .store
            .lock(CONSULTATIONS_KEY)
            .await
            .map_err(store_err)?;
        let _showcase_guard = state
            .store
            .lock(SHOWCASE_BOOKINGS_KEY)
            .await
            .map_err(store_err)?;

        let consultations: Vec<Consultation> = state
            .store
            .read(CONSULTATIONS_KEY, Vec::new())
            .await
            .map_err(store_err)?;
        let mut bookings: Vec<ShowcaseBooking> = state
            .store
            .read(SHOWCASE_BOOKINGS_KEY, Vec::new())
            .await
            .map_err(store_err)?;

        if slot_taken(&key, &consultations, &bookings, tz) {
            return Err(conflict(
                "That time slot is already taken. Please pick another slot.",
            ));
        }
        bookings.push(record.clone());
        state
            .store
            .write(SHOWCASE_BOOKINGS_KEY, &bookings)
            .await
            .map_err(store_err)?;
    }
    info!(booking_id = %record.id, slot = %format!("{} {}", key.date, key.time), "showcase booking committed");

    fire_showcase_side_effects(state, &record, &subject, instant).await;

    Ok(BookingConfirmation {
        booking_id: record.id,
        status: "pending".to_string(),
    })
}

/// Book a pre-sales consultation against the shared time grid.
pub async fn book_consultation(
    state: &SchedulingState,
    request: ConsultationRequest,
) -> Result<BookingConfirmation, SchedulingError> {
    let client_name = require_field(request.client_name, "clientName")?;
    let client_email = require_email(request.client_email)?;
    let date = require_field(request.date, "date")?;
    let time = require_field(request.time, "time")?;

    let tz = business_tz(&state.config)?;
    let key = slot_key(&date, &time)?;
    // Anchoring validates that the local time actually exists.
    let _instant = canonical_instant(key.date, key.time, tz)?;

    let record = Consultation {
        id: Uuid::new_v4(),
        client_name,
        client_email,
        preferred_date: key.date,
        preferred_time: key.time.label_12h(),
        status: ConsultationStatus::Active,
        created_at: Utc::now(),
    };

    {
        let _consultations_guard = state
            .store
            .lock(CONSULTATIONS_KEY)
            .await
            .map_err(store_err)?;
        let _showcase_guard = state
            .store
            .lock(SHOWCASE_BOOKINGS_KEY)
            .await
            .map_err(store_err)?;

        let mut consultations: Vec<Consultation> = state
            .store
            .read(CONSULTATIONS_KEY, Vec::new())
            .await
            .map_err(store_err)?;
        let bookings: Vec<ShowcaseBooking> = state
            .store
            .read(SHOWCASE_BOOKINGS_KEY, Vec::new())
            .await
            .map_err(store_err)?;

        if slot_taken(&key, &consultations, &bookings, tz) {
            return Err(conflict(
                "That time slot is already taken. Please pick another slot.",
            ));
        }
        consultations.push(record.clone());
        state
            .store
            .write(CONSULTATIONS_KEY, &consultations)
            .await
            .map_err(store_err)?;
    }
    info!(booking_id = %record.id, slot = %format!("{} {}", key.date, key.time), "consultation committed");

    fire_consultation_side_effects(state, &record).await;

    Ok(BookingConfirmation {
        booking_id: record.id,
        status: "active".to_string(),
    })
}

/// Cancel a showcase booking, freeing its slot. The status flip is the
/// durable part; removing the event from the external calendar is
/// best-effort like every other side effect.
pub async fn cancel_showcase_booking(
    state: &SchedulingState,
    booking_id: Uuid,
) -> Result<(), SchedulingError> {
    let cancelled: Option<ShowcaseBooking> = state
        .store
        .update(
            SHOWCASE_BOOKINGS_KEY,
            Vec::new(),
            move |bookings: &mut Vec<ShowcaseBooking>| {
                bookings.iter_mut().find(|b| b.id == booking_id).map(|b| {
                    b.status = BookingStatus::Cancelled;
                    b.clone()
                })
            },
        )
        .await
        .map_err(store_err)?;

    let Some(record) = cancelled else {
        return Err(not_found("No booking with that id."));
    };
    info!(booking_id = %record.id, "showcase booking cancelled");

    if let (Some(calendar), Some(event_id)) =
        (&state.calendar, record.calendar_event_id.as_deref())
    {
        if let Some(calendar_id) = state
            .config
            .gcal
            .as_ref()
            .and_then(|g| g.calendar_id.as_deref())
        {
            with_retry("calendar cancellation", || {
                calendar.cancel_event(calendar_id, event_id)
            })
            .await;
        }
    }

    Ok(())
}

/// Resolve a booking-link token to its project or order. Unknown tokens
/// and archived subjects are not-found errors.
async fn resolve_subject(store: &JsonStore, token: &str) -> Result<BookingSubject, SchedulingError> {
    let projects: Vec<ProjectRecord> = store
        .read(PROJECTS_KEY, Vec::new())
        .await
        .map_err(store_err)?;
    if let Some(project) = projects.into_iter().find(|p| p.token == token) {
        return live_subject(BookingSubject::Project(project));
    }

    let orders: Vec<OrderRecord> = store
        .read(ORDERS_KEY, Vec::new())
        .await
        .map_err(store_err)?;
    if let Some(order) = orders.into_iter().find(|o| o.token == token) {
        return live_subject(BookingSubject::Order(order));
    }

    Err(not_found("No project or order matches this booking link."))
}

fn live_subject(subject: BookingSubject) -> Result<BookingSubject, SchedulingError> {
    if subject.is_expired() {
        return Err(not_found("This booking link has expired."));
    }
    Ok(subject)
}

// --- Best-Effort Side Effects ---

async fn fire_showcase_side_effects(
    state: &SchedulingState,
    record: &ShowcaseBooking,
    subject: &BookingSubject,
    instant: DateTime<Tz>,
) {
    sync_calendar(state, record, subject, instant).await;
    link_parent(state, record, subject).await;
    send_showcase_emails(state, record).await;
}

async fn sync_calendar(
    state: &SchedulingState,
    record: &ShowcaseBooking,
    subject: &BookingSubject,
    instant: DateTime<Tz>,
) {
    let Some(calendar) = &state.calendar else {
        return;
    };
    let Some(calendar_id) = state
        .config
        .gcal
        .as_ref()
        .and_then(|g| g.calendar_id.as_deref())
    else {
        warn!("calendar service wired up but no calendar_id configured; skipping sync");
        return;
    };

    let duration =
        Duration::minutes(i64::from(state.config.booking.default_meeting_duration_minutes));
    let event = CalendarEvent {
        start_time: instant.to_rfc3339(),
        end_time: (instant + duration).to_rfc3339(),
        summary: format!("Showcase meeting: {}", record.client_name),
        description: Some(format!(
            "Walkthrough of {} with {} ({}). Booking {}.",
            subject.display_name(),
            record.client_name,
            record.client_email,
            record.id
        )),
        location: Some(match record.meeting_type {
            MeetingType::Online => "Online".to_string(),
            MeetingType::Physical => "LashDiary studio".to_string(),
        }),
        booking_id: Some(record.id.to_string()),
        client_email: Some(record.client_email.clone()),
    };

    let result = with_retry("calendar sync", || {
        calendar.book_event(calendar_id, event.clone())
    })
    .await;

    if let Some(created) = result {
        if let Some(event_id) = created.event_id {
            let booking_id = record.id;
            let outcome = state
                .store
                .update(
                    SHOWCASE_BOOKINGS_KEY,
                    Vec::new(),
                    move |bookings: &mut Vec<ShowcaseBooking>| {
                        if let Some(booking) = bookings.iter_mut().find(|b| b.id == booking_id) {
                            booking.calendar_event_id = Some(event_id);
                        }
                    },
                )
                .await;
            if let Err(err) = outcome {
                error!(booking_id = %record.id, error = %err, "failed to record calendar event id");
            }
        }
    }
}

/// Tie the booking back to the project or order it belongs to.
async fn link_parent(state: &SchedulingState, record: &ShowcaseBooking, subject: &BookingSubject) {
    let booking_id = record.id;
    let token = record.token.clone();
    let outcome = match subject {
        BookingSubject::Project(_) => {
            state
                .store
                .update(
                    PROJECTS_KEY,
                    Vec::new(),
                    move |projects: &mut Vec<ProjectRecord>| {
                        if let Some(project) = projects.iter_mut().find(|p| p.token == token) {
                            project.showcase_booking_id = Some(booking_id);
                        }
                    },
                )
                .await
        }
        BookingSubject::Order(_) => {
            state
                .store
                .update(
                    ORDERS_KEY,
                    Vec::new(),
                    move |orders: &mut Vec<OrderRecord>| {
                        if let Some(order) = orders.iter_mut().find(|o| o.token == token) {
                            order.showcase_booking_id = Some(booking_id);
                        }
                    },
                )
                .await
        }
    };
    if let Err(err) = outcome {
        error!(booking_id = %record.id, error = %err, "failed to link booking to its parent entity");
    }
}

async fn send_showcase_emails(state: &SchedulingState, record: &ShowcaseBooking) {
    let Some(notifier) = &state.notifier else {
        return;
    };
    let Some(notifier_config) = state.config.notifier.as_ref() else {
        warn!("notifier wired up but no notifier config section; skipping emails");
        return;
    };

    let no_attachments: &[EmailAttachment] = &[];

    with_retry("client confirmation email", || {
        notifier.send_email(
            &record.client_email,
            "Your LashDiary Labs showcase meeting is booked",
            &showcase_confirmation_html(record),
            no_attachments,
        )
    })
    .await;

    with_retry("owner notification email", || {
        notifier.send_email(
            &notifier_config.owner_address,
            &format!("New showcase meeting: {}", record.client_name),
            &showcase_owner_html(record),
            no_attachments,
        )
    })
    .await;
}

async fn fire_consultation_side_effects(state: &SchedulingState, record: &Consultation) {
    let Some(notifier) = &state.notifier else {
        return;
    };
    let Some(notifier_config) = state.config.notifier.as_ref() else {
        warn!("notifier wired up but no notifier config section; skipping emails");
        return;
    };

    let no_attachments: &[EmailAttachment] = &[];

    with_retry("client confirmation email", || {
        notifier.send_email(
            &record.client_email,
            "Your LashDiary consultation is booked",
            &consultation_confirmation_html(record),
            no_attachments,
        )
    })
    .await;

    with_retry("owner notification email", || {
        notifier.send_email(
            &notifier_config.owner_address,
            &format!("New consultation: {}", record.client_name),
            &consultation_owner_html(record),
            no_attachments,
        )
    })
    .await;
}

/// Run a best-effort side effect with bounded retry and doubled backoff.
/// Exhausted retries log an error and yield `None`; they never propagate.
async fn with_retry<T, E, F, Fut>(what: &str, mut op: F) -> Option<T>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut backoff = std::time::Duration::from_millis(SIDE_EFFECT_BACKOFF_MS);
    for attempt in 1..=SIDE_EFFECT_ATTEMPTS {
        match op().await {
            Ok(value) => return Some(value),
            Err(err) if attempt < SIDE_EFFECT_ATTEMPTS => {
                warn!(what, attempt, error = %err, "side effect failed, retrying");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            Err(err) => {
                error!(what, error = %err, "side effect dropped after retries");
            }
        }
    }
    None
}

fn require_field(value: Option<String>, name: &str) -> Result<String, SchedulingError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(validation_error(format!("missing required field: {name}"))),
    }
}

fn require_email(value: Option<String>) -> Result<String, SchedulingError> {
    let email = require_field(value, "clientEmail")?;
    // Deliverability is the mail provider's problem; this only catches
    // obviously-not-an-address input.
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(validation_error(format!(
            "clientEmail {email:?} is not a valid email address"
        )));
    }
    Ok(email)
}

fn store_err(err: StoreError) -> SchedulingError {
    SchedulingError::Store(err.to_string())
}

// --- Email Bodies ---

fn showcase_confirmation_html(record: &ShowcaseBooking) -> String {
    let place = match record.meeting_type {
        MeetingType::Online => "online (we will send you a meeting link before the call)",
        MeetingType::Physical => "at the LashDiary studio",
    };
    format!(
        "<h2>Hi {name},</h2>\
         <p>Your showcase meeting is booked for <strong>{date}</strong> at \
         <strong>{time}</strong> (East Africa Time), {place}.</p>\
         <p>Need to reschedule? Just reply to this email.</p>\
         <p>— The LashDiary Labs team</p>",
        name = record.client_name,
        date = record.appointment_date.format("%A, %-d %B %Y"),
        time = record.appointment_time,
    )
}

fn showcase_owner_html(record: &ShowcaseBooking) -> String {
    format!(
        "<p><strong>{name}</strong> ({email}) booked a showcase meeting for \
         {date} at {time}.</p>\
         <p>Meeting type: {kind:?}. Booking id: {id}.</p>",
        name = record.client_name,
        email = record.client_email,
        date = record.appointment_date.format("%Y-%m-%d"),
        time = record.appointment_time,
        kind = record.meeting_type,
        id = record.id,
    )
}

fn consultation_confirmation_html(record: &Consultation) -> String {
    format!(
        "<h2>Hi {name},</h2>\
         <p>Your consultation is booked for <strong>{date}</strong> at \
         <strong>{time}</strong> (East Africa Time).</p>\
         <p>— The LashDiary team</p>",
        name = record.client_name,
        date = record.preferred_date.format("%A, %-d %B %Y"),
        time = record.preferred_time,
    )
}

fn consultation_owner_html(record: &Consultation) -> String {
    format!(
        "<p><strong>{name}</strong> ({email}) booked a consultation for \
         {date} at {time}.</p>",
        name = record.client_name,
        email = record.client_email,
        date = record.preferred_date,
        time = record.preferred_time,
    )
}
