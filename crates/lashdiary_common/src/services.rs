// --- File: crates/lashdiary_common/src/services.rs ---
//! Service abstractions for external collaborators.
//!
//! This module provides trait definitions for the external services the
//! booking pipeline talks to. The traits decouple the scheduling logic from
//! concrete implementations (Google Calendar, Zoho Mail) so that the commit
//! path can be tested against in-memory doubles.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// A trait for calendar sync operations.
///
/// The booking commit calls this strictly best-effort: a failure is logged
/// and the booking stands.
pub trait CalendarService: Send + Sync {
    /// Error type returned by calendar service operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create a calendar event for a committed booking.
    fn book_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error>;

    /// Mark a previously created event as cancelled.
    fn cancel_event(
        &self,
        calendar_id: &str,
        event_id: &str,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error>;
}

/// A trait for notification service operations.
pub trait NotificationService: Send + Sync {
    /// Error type returned by notification service operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send an HTML email, optionally with attachments.
    fn send_email(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        attachments: &[EmailAttachment],
    ) -> BoxFuture<'_, NotificationResult, Self::Error>;
}

/// A factory for creating service instances.
///
/// The backend binary implements this against the runtime feature flags;
/// tests implement it with doubles. A `None` means the collaborator is
/// disabled and the corresponding side effect is skipped.
pub trait ServiceFactory: Send + Sync {
    /// Get a calendar service instance.
    fn calendar_service(&self) -> Option<Arc<dyn CalendarService<Error = BoxedError>>>;

    /// Get a notification service instance.
    fn notification_service(&self) -> Option<Arc<dyn NotificationService<Error = BoxedError>>>;
}

/// Event payload handed to the calendar service for a committed booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Start instant, ISO-8601 with explicit offset.
    pub start_time: String,
    /// End instant, ISO-8601 with explicit offset.
    pub end_time: String,
    /// The summary or title of the event.
    pub summary: String,
    /// An optional description of the event.
    pub description: Option<String>,
    /// Where the meeting happens ("Online" or a street address).
    pub location: Option<String>,
    /// The booking record this event belongs to.
    pub booking_id: Option<String>,
    /// The client's email, attached for the business owner's reference.
    pub client_email: Option<String>,
}

/// Represents the result of a calendar event operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEventResult {
    /// The ID of the event.
    pub event_id: Option<String>,
    /// The status of the event.
    pub status: String,
}

/// An email attachment, content base64-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAttachment {
    pub filename: String,
    pub mime_type: String,
    pub content_base64: String,
}

/// Represents the result of a notification operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    /// The ID of the notification.
    pub id: String,
    /// The status of the notification.
    pub status: String,
}
