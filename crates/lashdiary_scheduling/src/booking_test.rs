#[cfg(test)]
mod tests {
    use crate::booking::{
        book_consultation, book_showcase, cancel_showcase_booking, ConsultationRequest,
        ShowcaseBookingRequest, CONSULTATIONS_KEY, PROJECTS_KEY, SHOWCASE_BOOKINGS_KEY,
    };
    use crate::handlers::SchedulingState;
    use crate::models::{BookingStatus, MeetingType, ProjectRecord, ShowcaseBooking};
    use lashdiary_common::services::{
        BoxFuture, BoxedError, CalendarEvent, CalendarEventResult, CalendarService,
        EmailAttachment, NotificationResult, NotificationService,
    };
    use lashdiary_common::SchedulingError;
    use lashdiary_config::{
        AppConfig, BookingConfig, GcalConfig, NotifierConfig, ServerConfig, StoreConfig,
    };
    use lashdiary_store::JsonStore;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    // Hand-rolled service doubles; the commit pipeline only needs to see
    // the trait surface.

    #[derive(Default)]
    struct RecordingCalendar {
        bookings: AtomicUsize,
    }

    impl CalendarService for RecordingCalendar {
        type Error = BoxedError;

        fn book_event(
            &self,
            _calendar_id: &str,
            _event: CalendarEvent,
        ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
            self.bookings.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {
                Ok(CalendarEventResult {
                    event_id: Some("evt-1".to_string()),
                    status: "confirmed".to_string(),
                })
            })
        }

        fn cancel_event(
            &self,
            _calendar_id: &str,
            _event_id: &str,
        ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
            Box::pin(async {
                Ok(CalendarEventResult {
                    event_id: Some("evt-1".to_string()),
                    status: "cancelled".to_string(),
                })
            })
        }
    }

    #[derive(Default)]
    struct FailingNotifier {
        attempts: AtomicUsize,
    }

    impl NotificationService for FailingNotifier {
        type Error = BoxedError;

        fn send_email(
            &self,
            _to: &str,
            _subject: &str,
            _html_body: &str,
            _attachments: &[EmailAttachment],
        ) -> BoxFuture<'_, NotificationResult, Self::Error> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {
                Err(BoxedError(Box::new(std::io::Error::other("mail api down"))))
            })
        }
    }

    fn test_config(data_dir: &Path) -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            booking: BookingConfig::default(),
            store: StoreConfig {
                data_dir: data_dir.display().to_string(),
            },
            use_gcal: false,
            use_notifier: false,
            gcal: None,
            notifier: None,
        }
    }

    async fn seeded_state() -> (tempfile::TempDir, SchedulingState) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonStore::at_path(dir.path()).unwrap());
        store
            .write(
                PROJECTS_KEY,
                &vec![
                    ProjectRecord {
                        token: "T1".to_string(),
                        client_name: "Amina W.".to_string(),
                        client_email: "amina@example.com".to_string(),
                        project_name: Some("Salon site".to_string()),
                        status: "delivered".to_string(),
                        showcase_booking_id: None,
                    },
                    ProjectRecord {
                        token: "OLD".to_string(),
                        client_name: "Former Client".to_string(),
                        client_email: "old@example.com".to_string(),
                        project_name: None,
                        status: "archived".to_string(),
                        showcase_booking_id: None,
                    },
                ],
            )
            .await
            .unwrap();
        let config = Arc::new(test_config(dir.path()));
        let state = SchedulingState {
            config,
            store,
            calendar: None,
            notifier: None,
        };
        (dir, state)
    }

    fn showcase_request(date: &str, time: &str) -> ShowcaseBookingRequest {
        ShowcaseBookingRequest {
            token: Some("T1".to_string()),
            client_name: Some("Amina W.".to_string()),
            client_email: Some("a@example.com".to_string()),
            client_phone: None,
            meeting_type: Some(MeetingType::Online),
            date: Some(date.to_string()),
            time: Some(time.to_string()),
            client_timezone: Some("Africa/Nairobi".to_string()),
            client_country: Some("KE".to_string()),
        }
    }

    fn consultation_request(date: &str, time: &str) -> ConsultationRequest {
        ConsultationRequest {
            client_name: Some("Joy K.".to_string()),
            client_email: Some("joy@example.com".to_string()),
            date: Some(date.to_string()),
            time: Some(time.to_string()),
        }
    }

    #[tokio::test]
    async fn booking_commits_and_the_same_slot_then_conflicts() {
        let (_dir, state) = seeded_state().await;

        let confirmation = book_showcase(&state, showcase_request("2024-07-15", "3:30 PM"))
            .await
            .unwrap();
        assert_eq!(confirmation.status, "pending");

        let bookings: Vec<ShowcaseBooking> = state
            .store
            .read(SHOWCASE_BOOKINGS_KEY, Vec::new())
            .await
            .unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].id, confirmation.booking_id);
        assert_eq!(bookings[0].appointment_time, "3:30 PM");
        assert_eq!(
            bookings[0].appointment_date.to_rfc3339(),
            "2024-07-15T15:30:00+03:00"
        );
        assert_eq!(bookings[0].status, BookingStatus::Pending);

        // Resubmitting the identical request must conflict, not duplicate
        let second = book_showcase(&state, showcase_request("2024-07-15", "3:30 PM")).await;
        assert!(matches!(second, Err(SchedulingError::Conflict(_))));
        let bookings: Vec<ShowcaseBooking> = state
            .store
            .read(SHOWCASE_BOOKINGS_KEY, Vec::new())
            .await
            .unwrap();
        assert_eq!(bookings.len(), 1);
    }

    #[tokio::test]
    async fn conflicts_are_symmetric_between_collections() {
        let (_dir, state) = seeded_state().await;

        book_consultation(&state, consultation_request("2024-06-01", "9:30 AM"))
            .await
            .unwrap();
        let blocked = book_showcase(&state, showcase_request("2024-06-01", "9:30 AM")).await;
        assert!(matches!(blocked, Err(SchedulingError::Conflict(_))));

        book_showcase(&state, showcase_request("2024-06-01", "11:00 AM"))
            .await
            .unwrap();
        let blocked = book_consultation(&state, consultation_request("2024-06-01", "11:00 AM")).await;
        assert!(matches!(blocked, Err(SchedulingError::Conflict(_))));
    }

    #[tokio::test]
    async fn equivalent_labels_conflict_regardless_of_spelling() {
        let (_dir, state) = seeded_state().await;
        book_showcase(&state, showcase_request("2024-06-01", "3:30 PM"))
            .await
            .unwrap();
        // Same canonical slot, different upstream spellings
        for label in ["3:30 pm", "15:30", "3:30PM"] {
            let result = book_showcase(&state, showcase_request("2024-06-01", label)).await;
            assert!(
                matches!(result, Err(SchedulingError::Conflict(_))),
                "label {label:?} should conflict"
            );
        }
    }

    #[tokio::test]
    async fn cancelled_records_do_not_block() {
        let (_dir, state) = seeded_state().await;

        let confirmation = book_showcase(&state, showcase_request("2024-06-01", "2:00 PM"))
            .await
            .unwrap();
        cancel_showcase_booking(&state, confirmation.booking_id)
            .await
            .unwrap();

        let bookings: Vec<ShowcaseBooking> = state
            .store
            .read(SHOWCASE_BOOKINGS_KEY, Vec::new())
            .await
            .unwrap();
        assert_eq!(bookings[0].status, BookingStatus::Cancelled);

        book_showcase(&state, showcase_request("2024-06-01", "2:00 PM"))
            .await
            .expect("a cancelled booking must free its slot");
    }

    #[tokio::test]
    async fn cancelling_an_unknown_booking_is_not_found() {
        let (_dir, state) = seeded_state().await;
        let result = cancel_showcase_booking(&state, uuid::Uuid::new_v4()).await;
        assert!(matches!(result, Err(SchedulingError::NotFound(_))));
    }

    #[tokio::test]
    async fn unknown_and_expired_tokens_are_not_found() {
        let (_dir, state) = seeded_state().await;

        let mut request = showcase_request("2024-06-01", "9:30 AM");
        request.token = Some("NOPE".to_string());
        assert!(matches!(
            book_showcase(&state, request).await,
            Err(SchedulingError::NotFound(_))
        ));

        let mut request = showcase_request("2024-06-01", "9:30 AM");
        request.token = Some("OLD".to_string());
        assert!(matches!(
            book_showcase(&state, request).await,
            Err(SchedulingError::NotFound(_))
        ));

        // Nothing may have been written
        let bookings: Vec<ShowcaseBooking> = state
            .store
            .read(SHOWCASE_BOOKINGS_KEY, Vec::new())
            .await
            .unwrap();
        assert!(bookings.is_empty());
    }

    #[tokio::test]
    async fn missing_required_fields_are_validation_errors() {
        let (_dir, state) = seeded_state().await;
        let base = || showcase_request("2024-06-01", "9:30 AM");

        for (name, request) in [
            ("token", {
                let mut r = base();
                r.token = None;
                r
            }),
            ("clientName", {
                let mut r = base();
                r.client_name = Some("   ".to_string());
                r
            }),
            ("clientEmail", {
                let mut r = base();
                r.client_email = None;
                r
            }),
            ("date", {
                let mut r = base();
                r.date = None;
                r
            }),
            ("time", {
                let mut r = base();
                r.time = None;
                r
            }),
        ] {
            let result = book_showcase(&state, request).await;
            assert!(
                matches!(result, Err(SchedulingError::Validation(_))),
                "missing {name} must be a validation error, got {result:?}"
            );
        }
    }

    #[tokio::test]
    async fn malformed_dates_and_labels_never_book_a_default_slot() {
        let (_dir, state) = seeded_state().await;

        for (date, time) in [
            ("2024-06-01", "half past ten"),
            ("2024-06-01", "25:00"),
            ("2024-06", "9:30 AM"),
            ("2024-02-30", "9:30 AM"),
            ("soon", "9:30 AM"),
        ] {
            let result = book_showcase(&state, showcase_request(date, time)).await;
            assert!(
                matches!(result, Err(SchedulingError::Validation(_))),
                "({date:?}, {time:?}) must be rejected, got {result:?}"
            );
        }

        // In particular nothing was silently normalized to 10:00
        let bookings: Vec<ShowcaseBooking> = state
            .store
            .read(SHOWCASE_BOOKINGS_KEY, Vec::new())
            .await
            .unwrap();
        assert!(bookings.is_empty());
    }

    #[tokio::test]
    async fn booking_links_back_to_its_project() {
        let (_dir, state) = seeded_state().await;
        let confirmation = book_showcase(&state, showcase_request("2024-06-01", "9:30 AM"))
            .await
            .unwrap();

        let projects: Vec<ProjectRecord> =
            state.store.read(PROJECTS_KEY, Vec::new()).await.unwrap();
        let project = projects.iter().find(|p| p.token == "T1").unwrap();
        assert_eq!(project.showcase_booking_id, Some(confirmation.booking_id));
    }

    #[tokio::test]
    async fn calendar_event_id_is_recorded_after_sync() {
        let (dir, mut state) = seeded_state().await;
        let calendar = Arc::new(RecordingCalendar::default());
        state.calendar = Some(calendar.clone());
        let mut config = test_config(dir.path());
        config.use_gcal = true;
        config.gcal = Some(GcalConfig {
            key_path: None,
            calendar_id: Some("primary".to_string()),
        });
        state.config = Arc::new(config);

        let confirmation = book_showcase(&state, showcase_request("2024-06-01", "9:30 AM"))
            .await
            .unwrap();
        assert_eq!(calendar.bookings.load(Ordering::SeqCst), 1);

        let bookings: Vec<ShowcaseBooking> = state
            .store
            .read(SHOWCASE_BOOKINGS_KEY, Vec::new())
            .await
            .unwrap();
        let booking = bookings
            .iter()
            .find(|b| b.id == confirmation.booking_id)
            .unwrap();
        assert_eq!(booking.calendar_event_id.as_deref(), Some("evt-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn notifier_failures_never_fail_a_committed_booking() {
        let (dir, mut state) = seeded_state().await;
        let notifier = Arc::new(FailingNotifier::default());
        state.notifier = Some(notifier.clone());
        let mut config = test_config(dir.path());
        config.use_notifier = true;
        config.notifier = Some(NotifierConfig {
            api_base: "https://mail.zoho.com/api".to_string(),
            account_id: "acc".to_string(),
            from_address: "labs@lashdiary.co.ke".to_string(),
            owner_address: "owner@lashdiary.co.ke".to_string(),
        });
        state.config = Arc::new(config);

        book_showcase(&state, showcase_request("2024-06-01", "9:30 AM"))
            .await
            .expect("the booking is durable once the collection write succeeds");

        // Two emails, three attempts each, all dropped
        assert_eq!(notifier.attempts.load(Ordering::SeqCst), 6);
        let bookings: Vec<ShowcaseBooking> = state
            .store
            .read(SHOWCASE_BOOKINGS_KEY, Vec::new())
            .await
            .unwrap();
        assert_eq!(bookings.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_requests_for_one_slot_produce_exactly_one_booking() {
        let (_dir, state) = seeded_state().await;
        let state = Arc::new(state);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                book_showcase(&state, showcase_request("2024-06-01", "9:30 AM")).await
            }));
        }

        let mut ok = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(SchedulingError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(conflicts, 7);

        let bookings: Vec<ShowcaseBooking> = state
            .store
            .read(SHOWCASE_BOOKINGS_KEY, Vec::new())
            .await
            .unwrap();
        assert_eq!(bookings.len(), 1);
    }

    #[tokio::test]
    async fn consultations_persist_with_normalized_labels() {
        let (_dir, state) = seeded_state().await;
        book_consultation(&state, consultation_request("2024-06-01", "15:30"))
            .await
            .unwrap();

        let consultations: Vec<crate::models::Consultation> = state
            .store
            .read(CONSULTATIONS_KEY, Vec::new())
            .await
            .unwrap();
        assert_eq!(consultations.len(), 1);
        // The stored label is the canonical 12-hour rendering
        assert_eq!(consultations[0].preferred_time, "3:30 PM");
    }
}
