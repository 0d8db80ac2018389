// --- File: crates/lashdiary_common/src/features.rs ---
//! Feature flag handling for the LashDiary backend.
//!
//! Features are used in two ways:
//!
//! 1. Compile-time feature flags using `#[cfg(feature = "...")]` to keep
//!    collaborator crates (gcal, notifier) out of builds that do not need
//!    them.
//! 2. Runtime flags in the configuration (`use_gcal`, `use_notifier`) that
//!    decide whether a compiled-in collaborator is actually wired up.
//!
//! A collaborator is live only when both its crate is compiled in and its
//! runtime flag is set alongside a config section.

use lashdiary_config::AppConfig;
use std::sync::Arc;

/// Check if a feature is enabled at runtime based on configuration.
///
/// # Arguments
///
/// * `config` - The application configuration
/// * `use_feature` - The configuration flag that enables the feature
/// * `feature_config` - The configuration section for the feature
///
/// # Returns
///
/// `true` if the feature is enabled, `false` otherwise
pub fn is_feature_enabled<T>(
    _config: &Arc<AppConfig>,
    use_feature: bool,
    feature_config: Option<&T>,
) -> bool {
    use_feature && feature_config.is_some()
}

/// Check if the Google Calendar sync is enabled at runtime.
#[cfg(feature = "gcal")]
pub fn is_gcal_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config, config.use_gcal, config.gcal.as_ref())
}

/// Check if the email notifier is enabled at runtime.
#[cfg(feature = "notifier")]
pub fn is_notifier_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config, config.use_notifier, config.notifier.as_ref())
}
