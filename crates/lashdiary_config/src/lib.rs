// --- File: crates/lashdiary_config/src/lib.rs ---
pub mod models;

pub use models::*;

use chrono::NaiveTime;
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::str::FromStr;

static DOTENV: OnceCell<()> = OnceCell::new();

/// Loads `.env` exactly once per process. Safe to call from any crate that
/// needs env-backed secrets before the config is built.
pub fn ensure_dotenv_loaded() {
    DOTENV.get_or_init(|| {
        // A missing .env file is fine; real deployments set env vars directly.
        let _ = dotenv::dotenv();
    });
}

/// Loads the application configuration.
///
/// Sources, later overriding earlier: `config/default.yml` (optional),
/// then environment variables with the `APP_` prefix and `__` section
/// separator (e.g. `APP_SERVER__PORT=8080`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let config: AppConfig = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()?;

    validate(&config)?;
    Ok(config)
}

/// Sanity-checks the booking grid so bad config fails at startup rather
/// than at the first booking request.
fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let booking = &config.booking;

    Tz::from_str(&booking.time_zone).map_err(|_| {
        ConfigError::Message(format!("unknown booking.time_zone: {}", booking.time_zone))
    })?;

    let day_start = parse_grid_time(&booking.day_start, "booking.day_start")?;
    let day_end = parse_grid_time(&booking.day_end, "booking.day_end")?;
    if day_end <= day_start {
        return Err(ConfigError::Message(
            "booking.day_end must be after booking.day_start".to_string(),
        ));
    }

    if booking.slot_interval_minutes == 0 {
        return Err(ConfigError::Message(
            "booking.slot_interval_minutes must be positive".to_string(),
        ));
    }
    let window_minutes = (day_end - day_start).num_minutes() as u32;
    if window_minutes % booking.slot_interval_minutes != 0 {
        return Err(ConfigError::Message(format!(
            "booking.slot_interval_minutes ({}) does not divide the {} minute working window",
            booking.slot_interval_minutes, window_minutes
        )));
    }

    if config.store.data_dir.trim().is_empty() {
        return Err(ConfigError::Message(
            "store.data_dir must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn parse_grid_time(value: &str, field: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| ConfigError::Message(format!("{field} must be HH:MM, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            booking: BookingConfig::default(),
            store: StoreConfig {
                data_dir: "data".to_string(),
            },
            use_gcal: false,
            use_notifier: false,
            gcal: None,
            notifier: None,
        }
    }

    #[test]
    fn default_booking_grid_is_valid() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn rejects_unknown_timezone() {
        let mut config = base_config();
        config.booking.time_zone = "Mars/Olympus_Mons".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_interval_not_dividing_window() {
        let mut config = base_config();
        // 09:00-17:00 is 480 minutes; 7 does not divide it
        config.booking.slot_interval_minutes = 7;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_inverted_day_window() {
        let mut config = base_config();
        config.booking.day_start = "18:00".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_malformed_grid_time() {
        let mut config = base_config();
        config.booking.day_start = "9am".to_string();
        assert!(validate(&config).is_err());
    }
}
