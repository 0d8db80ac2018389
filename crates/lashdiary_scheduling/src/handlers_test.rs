#[cfg(test)]
mod tests {
    use crate::booking::{ShowcaseBookingRequest, PROJECTS_KEY};
    use crate::handlers::{
        available_slots_handler, book_showcase_handler, list_bookings_handler, BookingsQuery,
        SchedulingState, SlotsQuery,
    };
    use crate::models::{MeetingType, ProjectRecord};
    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::Json;
    use lashdiary_config::{AppConfig, BookingConfig, ServerConfig, StoreConfig};
    use lashdiary_store::JsonStore;
    use std::sync::Arc;

    async fn state() -> (tempfile::TempDir, Arc<SchedulingState>) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonStore::at_path(dir.path()).unwrap());
        store
            .write(
                PROJECTS_KEY,
                &vec![ProjectRecord {
                    token: "T1".to_string(),
                    client_name: "Amina W.".to_string(),
                    client_email: "amina@example.com".to_string(),
                    project_name: Some("Salon site".to_string()),
                    status: "delivered".to_string(),
                    showcase_booking_id: None,
                }],
            )
            .await
            .unwrap();
        let config = Arc::new(AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            booking: BookingConfig::default(),
            store: StoreConfig {
                data_dir: dir.path().display().to_string(),
            },
            use_gcal: false,
            use_notifier: false,
            gcal: None,
            notifier: None,
        });
        let state = Arc::new(SchedulingState {
            config,
            store,
            calendar: None,
            notifier: None,
        });
        (dir, state)
    }

    fn request(date: &str, time: &str) -> ShowcaseBookingRequest {
        ShowcaseBookingRequest {
            token: Some("T1".to_string()),
            client_name: Some("Amina W.".to_string()),
            client_email: Some("a@example.com".to_string()),
            client_phone: None,
            meeting_type: Some(MeetingType::Online),
            date: Some(date.to_string()),
            time: Some(time.to_string()),
            client_timezone: None,
            client_country: None,
        }
    }

    #[tokio::test]
    async fn booking_flow_maps_errors_to_status_codes() {
        let (_dir, state) = state().await;

        // Missing token -> 400 with an actionable message
        let mut missing = request("2030-01-02", "10:00 AM");
        missing.token = None;
        let (status, message) = book_showcase_handler(State(state.clone()), Json(missing))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("token"), "message was {message:?}");

        // Unknown token -> 404
        let mut unknown = request("2030-01-02", "10:00 AM");
        unknown.token = Some("NOPE".to_string());
        let (status, _) = book_showcase_handler(State(state.clone()), Json(unknown))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);

        // First booking succeeds
        let Json(response) =
            book_showcase_handler(State(state.clone()), Json(request("2030-01-02", "10:00 AM")))
                .await
                .unwrap();
        assert!(response.success);
        assert!(response.booking.is_some());

        // Same slot again -> 409
        let (status, message) =
            book_showcase_handler(State(state.clone()), Json(request("2030-01-02", "10:00 AM")))
                .await
                .unwrap_err();
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(
            message.to_lowercase().contains("another"),
            "conflict message should tell the client to pick another slot, was {message:?}"
        );
    }

    #[tokio::test]
    async fn slots_listing_reflects_bookings() {
        let (_dir, state) = state().await;

        let Json(before) = available_slots_handler(
            State(state.clone()),
            Query(SlotsQuery {
                date: "2030-01-02".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(before.slots.len(), 8);
        assert!(before.slots.contains(&"10:00 AM".to_string()));

        book_showcase_handler(State(state.clone()), Json(request("2030-01-02", "10:00 AM")))
            .await
            .unwrap();

        let Json(after) = available_slots_handler(
            State(state.clone()),
            Query(SlotsQuery {
                date: "2030-01-02".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(after.slots.len(), 7);
        assert!(!after.slots.contains(&"10:00 AM".to_string()));

        // Malformed dates are rejected, not defaulted
        let (status, _) = available_slots_handler(
            State(state.clone()),
            Query(SlotsQuery {
                date: "someday".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admin_listing_returns_committed_bookings() {
        let (_dir, state) = state().await;
        book_showcase_handler(State(state.clone()), Json(request("2030-01-02", "3:30 PM")))
            .await
            .unwrap();

        let Json(listing) = list_bookings_handler(
            State(state.clone()),
            Query(BookingsQuery {
                include_cancelled: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(listing.bookings.len(), 1);
        assert_eq!(listing.bookings[0].appointment_time, "3:30 PM");
    }
}
