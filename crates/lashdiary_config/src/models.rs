// --- File: crates/lashdiary_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Booking Grid Config ---
// The business-wide time grid both appointment kinds share. Times are
// local to `time_zone`; labels presented to clients are derived from it.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingConfig {
    /// IANA timezone of the business. All canonical instants carry this
    /// zone's offset.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    /// First bookable slot of the day, "HH:MM".
    #[serde(default = "default_day_start")]
    pub day_start: String,
    /// End of the bookable day, "HH:MM". The last slot starts one
    /// interval before this.
    #[serde(default = "default_day_end")]
    pub day_end: String,
    /// Spacing of the slot grid in minutes.
    #[serde(default = "default_slot_interval")]
    pub slot_interval_minutes: u32,
    /// Calendar event length for a booked meeting.
    #[serde(default = "default_meeting_duration")]
    pub default_meeting_duration_minutes: u32,
}

fn default_time_zone() -> String {
    "Africa/Nairobi".to_string()
}

fn default_day_start() -> String {
    "09:00".to_string()
}

fn default_day_end() -> String {
    "17:00".to_string()
}

fn default_slot_interval() -> u32 {
    60
}

fn default_meeting_duration() -> u32 {
    30
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            day_start: default_day_start(),
            day_end: default_day_end(),
            slot_interval_minutes: default_slot_interval(),
            default_meeting_duration_minutes: default_meeting_duration(),
        }
    }
}

// --- Data Store Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    /// Directory holding the JSON collection files.
    pub data_dir: String,
}

// --- Google Calendar Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GcalConfig {
    pub key_path: Option<String>,
    pub calendar_id: Option<String>,
}

// --- Email Notifier Config ---
// Holds non-secret Zoho Mail config. The OAuth token is loaded directly
// from the ZOHO_MAIL_TOKEN env var, never from the config file.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotifierConfig {
    pub api_base: String,
    pub account_id: String,
    pub from_address: String,
    /// The business owner's inbox for booking notifications.
    pub owner_address: String,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // Booking grid defaults apply when the section is absent
    #[serde(default)]
    pub booking: BookingConfig,

    pub store: StoreConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_gcal: bool,
    #[serde(default)]
    pub use_notifier: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub gcal: Option<GcalConfig>,
    #[serde(default)]
    pub notifier: Option<NotifierConfig>,
}
