// File: crates/lashdiary_gcal/src/auth.rs
use google_calendar3::{
    hyper_rustls::{self, HttpsConnectorBuilder},
    hyper_util::client::legacy::connect::HttpConnector,
    hyper_util::client::legacy::Client,
    yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator},
    CalendarHub,
};
use lashdiary_config::GcalConfig;
use std::{error::Error, path::Path};

// Type aliases for clarity
type Connector = hyper_rustls::HttpsConnector<HttpConnector>;

pub type HubType = CalendarHub<Connector>;

/// Builds an authenticated Calendar client from the service-account key
/// file named in the config.
pub async fn create_calendar_hub(
    config: &GcalConfig,
) -> Result<HubType, Box<dyn Error + Send + Sync>> {
    let key_path = config
        .key_path
        .as_deref()
        .ok_or("Missing key_path in GcalConfig")?;

    let sa_key = read_service_account_key(Path::new(key_path)).await?;

    let auth = ServiceAccountAuthenticator::builder(sa_key).build().await?;

    let https = HttpsConnectorBuilder::new()
        .with_native_roots()?
        .https_or_http()
        .enable_http1()
        .build();

    // Create client without specifying body type
    let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(https);

    let hub = CalendarHub::new(client, auth);

    Ok(hub)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_path_is_an_error() {
        let config = GcalConfig {
            key_path: None,
            calendar_id: Some("primary".to_string()),
        };
        let result = create_calendar_hub(&config).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn nonexistent_key_file_is_an_error() {
        let config = GcalConfig {
            key_path: Some("/does/not/exist.json".to_string()),
            calendar_id: Some("primary".to_string()),
        };
        let result = create_calendar_hub(&config).await;
        assert!(result.is_err());
    }
}
