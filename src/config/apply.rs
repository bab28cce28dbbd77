use crate::error::{ConfigError, ValidationError};
use crate::overlay::OverlaySettings;
use crate::persistence::{MAX_RETRIES_LIMIT, RetryPolicy};
use crate::session::{KeyBindings, SessionSettings};
use crate::speed::{DEFAULT_MAX, DEFAULT_MIN, DEFAULT_STEP, SpeedLadder};

use super::types::{ConfigFile, KeysConfig, LadderConfig, OverlayConfig, PersistenceConfig};

/// Validates configuration values into session settings, starting from the
/// defaults.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] naming the first invalid value.
pub fn apply_config(config: &ConfigFile) -> Result<SessionSettings, ConfigError> {
    let mut settings = SessionSettings::default();
    if let Some(ladder) = config.ladder.as_ref() {
        settings.ladder = apply_ladder(ladder)?;
    }
    if let Some(persistence) = config.persistence.as_ref() {
        apply_persistence(&mut settings, persistence)?;
    }
    if let Some(overlay) = config.overlay.as_ref() {
        settings.overlay = apply_overlay(overlay)?;
    }
    if let Some(keys) = config.keys.as_ref() {
        settings.bindings = apply_keys(keys)?;
    }
    Ok(settings)
}

fn apply_ladder(ladder: &LadderConfig) -> Result<SpeedLadder, ConfigError> {
    SpeedLadder::new(
        ladder.min.unwrap_or(DEFAULT_MIN),
        ladder.max.unwrap_or(DEFAULT_MAX),
        ladder.step.unwrap_or(DEFAULT_STEP),
    )
    .map_err(|err| invalid("ladder", err))
}

fn apply_persistence(
    settings: &mut SessionSettings,
    persistence: &PersistenceConfig,
) -> Result<(), ConfigError> {
    if let Some(prefix) = persistence.key_prefix.as_ref() {
        settings.key_prefix.clone_from(prefix);
    }
    let mut retry = RetryPolicy::default();
    if let Some(max_retries) = persistence.max_retries {
        if max_retries > MAX_RETRIES_LIMIT {
            return Err(invalid(
                "persistence.max_retries",
                ValidationError::TooManyRetries {
                    value: max_retries,
                    max: MAX_RETRIES_LIMIT,
                },
            ));
        }
        retry.max_retries = max_retries;
    }
    if let Some(base) = persistence.backoff_base.as_ref() {
        retry.backoff_base = base
            .to_duration()
            .map_err(|err| invalid("persistence.backoff_base", err))?;
    }
    settings.retry = retry;
    Ok(())
}

fn apply_overlay(overlay: &OverlayConfig) -> Result<OverlaySettings, ConfigError> {
    let mut settings = OverlaySettings::default();
    if let Some(delay) = overlay.fade_delay.as_ref() {
        settings.fade_delay = delay
            .to_duration()
            .map_err(|err| invalid("overlay.fade_delay", err))?;
    }
    if let Some(value) = overlay.dimmed_opacity {
        if value.is_nan() || value <= 0.0 || value > 1.0 {
            return Err(invalid(
                "overlay.dimmed_opacity",
                ValidationError::OpacityOutOfRange { value },
            ));
        }
        settings.dimmed_opacity = value;
    }
    Ok(settings)
}

fn apply_keys(keys: &KeysConfig) -> Result<KeyBindings, ConfigError> {
    let defaults = KeyBindings::default();
    let pick = |configured: Option<&Vec<String>>, fallback: &[String]| {
        configured.cloned().unwrap_or_else(|| fallback.to_vec())
    };
    KeyBindings::new(
        pick(keys.decrease.as_ref(), defaults.decrease()),
        pick(keys.increase.as_ref(), defaults.increase()),
        pick(keys.reset.as_ref(), defaults.reset()),
    )
    .map_err(|err| invalid("keys", err))
}

fn invalid(field: &'static str, source: ValidationError) -> ConfigError {
    ConfigError::InvalidField { field, source }
}
