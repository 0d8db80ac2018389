// --- File: crates/services/lashdiary_backend/src/service_factory.rs ---
//! Service factory implementation.
//!
//! This module provides an implementation of the ServiceFactory trait for
//! the backend service. The factory initializes collaborators based on the
//! compile-time features and the runtime flags in the configuration, and
//! wraps each concrete service so its error type erases to `BoxedError`.
use lashdiary_config::AppConfig;
use std::sync::Arc;
#[allow(unused_imports)] // used only by certain feature combinations
use {
    lashdiary_common::is_feature_enabled,
    lashdiary_common::services::{
        BoxFuture, BoxedError, CalendarEvent, CalendarEventResult, CalendarService,
        EmailAttachment, NotificationResult, NotificationService, ServiceFactory,
    },
    tracing::{error, info},
};

#[cfg(feature = "gcal")]
use lashdiary_gcal::{auth::create_calendar_hub, service::GoogleCalendarService};

#[cfg(feature = "notifier")]
use lashdiary_notify::ZohoNotificationService;

/// Service factory for the LashDiary Labs backend.
pub struct LabsServiceFactory {
    #[allow(dead_code)]
    config: Arc<AppConfig>,
    #[cfg(feature = "gcal")]
    calendar_service: Option<Arc<dyn CalendarService<Error = BoxedError>>>,
    #[cfg(feature = "notifier")]
    notification_service: Option<Arc<dyn NotificationService<Error = BoxedError>>>,
}

#[cfg(feature = "gcal")]
struct BoxedCalendarService {
    inner: GoogleCalendarService,
}

#[cfg(feature = "gcal")]
impl CalendarService for BoxedCalendarService {
    type Error = BoxedError;

    fn book_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let inner = &self.inner;
        Box::pin(async move {
            inner
                .book_event(&calendar_id, event)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }

    fn cancel_event(
        &self,
        calendar_id: &str,
        event_id: &str,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();
        let inner = &self.inner;
        Box::pin(async move {
            inner
                .cancel_event(&calendar_id, &event_id)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }
}

#[cfg(feature = "notifier")]
struct BoxedNotificationService {
    inner: ZohoNotificationService,
}

#[cfg(feature = "notifier")]
impl NotificationService for BoxedNotificationService {
    type Error = BoxedError;

    fn send_email(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        attachments: &[EmailAttachment],
    ) -> BoxFuture<'_, NotificationResult, Self::Error> {
        let to = to.to_string();
        let subject = subject.to_string();
        let html_body = html_body.to_string();
        let attachments = attachments.to_vec();
        let inner = &self.inner;
        Box::pin(async move {
            inner
                .send_email(&to, &subject, &html_body, &attachments)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }
}

impl LabsServiceFactory {
    /// Create a new service factory, initializing each collaborator whose
    /// compile-time feature and runtime flag are both on.
    pub async fn new(config: Arc<AppConfig>) -> Self {
        #[allow(unused_mut)]
        let mut factory = Self {
            config: config.clone(),
            #[cfg(feature = "gcal")]
            calendar_service: None,
            #[cfg(feature = "notifier")]
            notification_service: None,
        };

        #[cfg(feature = "gcal")]
        {
            if is_feature_enabled(&config, config.use_gcal, config.gcal.as_ref()) {
                info!("Initializing Google Calendar service...");
                match create_calendar_hub(config.gcal.as_ref().unwrap()).await {
                    Ok(hub) => {
                        let service = GoogleCalendarService::new(Arc::new(hub));
                        factory.calendar_service =
                            Some(Arc::new(BoxedCalendarService { inner: service }));
                        info!("Google Calendar service initialized.");
                    }
                    Err(e) => {
                        error!(
                            "Failed to initialize Google Calendar service: {}. Calendar sync disabled.",
                            e
                        );
                    }
                }
            } else {
                info!("Calendar sync compiled in, but disabled via runtime config or missing gcal config section.");
            }
        }

        #[cfg(feature = "notifier")]
        {
            if is_feature_enabled(&config, config.use_notifier, config.notifier.as_ref()) {
                info!("Initializing Zoho Mail notification service...");
                let service = ZohoNotificationService::new(config.clone());
                factory.notification_service =
                    Some(Arc::new(BoxedNotificationService { inner: service }));
                info!("Zoho Mail notification service initialized.");
            } else {
                info!("Notifier compiled in, but disabled via runtime config or missing notifier config section.");
            }
        }

        factory
    }
}

impl ServiceFactory for LabsServiceFactory {
    fn calendar_service(&self) -> Option<Arc<dyn CalendarService<Error = BoxedError>>> {
        #[cfg(feature = "gcal")]
        {
            if let Some(service) = self.calendar_service.clone() {
                return Some(service);
            }
        }
        None
    }

    fn notification_service(&self) -> Option<Arc<dyn NotificationService<Error = BoxedError>>> {
        #[cfg(feature = "notifier")]
        {
            if let Some(service) = self.notification_service.clone() {
                return Some(service);
            }
        }
        None
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Mock service factory for testing: no collaborators are wired up,
    /// so every best-effort side effect is skipped.
    pub struct MockServiceFactory;

    impl ServiceFactory for MockServiceFactory {
        fn calendar_service(&self) -> Option<Arc<dyn CalendarService<Error = BoxedError>>> {
            None
        }

        fn notification_service(&self) -> Option<Arc<dyn NotificationService<Error = BoxedError>>> {
            None
        }
    }

    #[test]
    fn mock_factory_has_no_collaborators() {
        let factory = MockServiceFactory;
        assert!(factory.calendar_service().is_none());
        assert!(factory.notification_service().is_none());
    }

    #[tokio::test]
    async fn factory_without_runtime_flags_wires_nothing() {
        let config = Arc::new(AppConfig {
            server: lashdiary_config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            booking: lashdiary_config::BookingConfig::default(),
            store: lashdiary_config::StoreConfig {
                data_dir: "data".to_string(),
            },
            use_gcal: false,
            use_notifier: false,
            gcal: None,
            notifier: None,
        });
        let factory = LabsServiceFactory::new(config).await;
        assert!(factory.calendar_service().is_none());
        assert!(factory.notification_service().is_none());
    }
}
