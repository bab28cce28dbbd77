use std::time::Duration;

use serde::Deserialize;

use crate::error::ValidationError;

/// On-disk configuration. Every section and field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub ladder: Option<LadderConfig>,
    pub persistence: Option<PersistenceConfig>,
    pub overlay: Option<OverlayConfig>,
    pub keys: Option<KeysConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LadderConfig {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PersistenceConfig {
    pub key_prefix: Option<String>,
    pub max_retries: Option<u32>,
    pub backoff_base: Option<DurationValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OverlayConfig {
    pub fade_delay: Option<DurationValue>,
    pub dimmed_opacity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    pub decrease: Option<Vec<String>>,
    pub increase: Option<Vec<String>>,
    pub reset: Option<Vec<String>>,
}

/// Either a bare number of seconds or text such as `"250ms"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => super::parse_duration_value(text),
        }
    }
}
