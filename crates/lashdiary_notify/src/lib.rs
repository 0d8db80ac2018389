// --- File: crates/lashdiary_notify/src/lib.rs ---
pub mod service;

pub use service::{ZohoError, ZohoNotificationService};
