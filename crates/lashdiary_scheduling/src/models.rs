// --- File: crates/lashdiary_scheduling/src/models.rs ---
//! Persisted record shapes for the two booking collections and the
//! entities showcase bookings hang off.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How the meeting is held.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingType {
    Online,
    Physical,
}

/// Consultation lifecycle. Anything but `Cancelled` blocks the slot.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsultationStatus {
    Active,
    Cancelled,
}

/// Showcase booking lifecycle. `Pending` blocks the slot just like
/// `Confirmed`; only `Cancelled` frees it. The rule is deliberately the
/// same as for consultations.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

/// A pre-sales consultation slot.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultation {
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub id: Uuid,
    pub client_name: String,
    pub client_email: String,
    /// Business-zone calendar date, `YYYY-MM-DD`.
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "2025-07-15"))]
    pub preferred_date: NaiveDate,
    /// Human time label as presented to the client, e.g. `"9:30 AM"`.
    pub preferred_time: String,
    pub status: ConsultationStatus,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub created_at: DateTime<Utc>,
}

/// A post-delivery showcase meeting for a website-build project or order.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowcaseBooking {
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub id: Uuid,
    /// The booking-link token that resolved to the parent project/order.
    pub token: String,
    pub client_name: String,
    pub client_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_phone: Option<String>,
    pub meeting_type: MeetingType,
    /// Appointment instant, ISO-8601 with the business offset.
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "2025-07-15T15:30:00+03:00"))]
    pub appointment_date: DateTime<FixedOffset>,
    /// Human time label for the same instant, e.g. `"3:30 PM"`.
    pub appointment_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_country: Option<String>,
    pub status: BookingStatus,
    /// Set after a successful best-effort calendar sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_event_id: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub created_at: DateTime<Utc>,
}

/// A website-build project awaiting its showcase meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub token: String,
    pub client_name: String,
    pub client_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showcase_booking_id: Option<Uuid>,
}

/// A website-build order awaiting its showcase meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub token: String,
    pub client_name: String,
    pub client_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showcase_booking_id: Option<Uuid>,
}

/// The entity a showcase booking belongs to, resolved once from the
/// request token at the boundary. Downstream code pattern-matches on this
/// instead of probing record fields.
#[derive(Debug, Clone)]
pub enum BookingSubject {
    Project(ProjectRecord),
    Order(OrderRecord),
}

impl BookingSubject {
    /// Archived subjects no longer accept bookings; their token is treated
    /// as expired.
    pub fn is_expired(&self) -> bool {
        let status = match self {
            BookingSubject::Project(p) => p.status.as_str(),
            BookingSubject::Order(o) => o.status.as_str(),
        };
        status.eq_ignore_ascii_case("archived")
    }

    /// Short human name for email and calendar text.
    pub fn display_name(&self) -> &str {
        match self {
            BookingSubject::Project(p) => p.project_name.as_deref().unwrap_or("website project"),
            BookingSubject::Order(o) => o.package.as_deref().unwrap_or("website order"),
        }
    }
}
