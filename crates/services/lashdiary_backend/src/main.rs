// File: services/lashdiary_backend/src/main.rs
mod app_state;
mod service_factory;

use app_state::AppState;
use axum::{routing::get, Router};
use lashdiary_common::services::ServiceFactory;
use lashdiary_config::load_config;
use lashdiary_scheduling::handlers::SchedulingState;
use lashdiary_scheduling::routes as scheduling_routes;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[tokio::main]
async fn main() {
    lashdiary_common::logging::init();

    let config = Arc::new(load_config().expect("Failed to load config"));
    let state = AppState::new(config.clone())
        .await
        .expect("Failed to initialize application state");

    let scheduling_state = Arc::new(SchedulingState {
        config: config.clone(),
        store: state.store.clone(),
        calendar: state.service_factory.calendar_service(),
        notifier: state.service_factory.notification_service(),
    });

    // The booking pages are served from a separate frontend origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the LashDiary Labs API!" }))
        .merge(scheduling_routes::routes(scheduling_state));

    #[allow(unused_mut)] // mutable only when the openapi feature is enabled
    let mut app = Router::new().nest("/api", api_router).layer(cors);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use lashdiary_scheduling::doc::SchedulingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "LashDiary Labs API",
                version = "0.1.0",
                description = "Booking endpoints for consultations and showcase meetings",
            ),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(SchedulingApiDoc::openapi());
        info!("📖 Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
