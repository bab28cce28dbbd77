use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Ladder {field} must be a finite number.")]
    LadderNotFinite { field: &'static str },
    #[error("Ladder minimum must be > 0 (got {min}).")]
    LadderMinNotPositive { min: f64 },
    #[error("Ladder step must be > 0 (got {step}).")]
    LadderStepNotPositive { step: f64 },
    #[error("Ladder maximum {max} is below minimum {min}.")]
    LadderMaxBelowMin { min: f64, max: f64 },
    #[error("Ladder would hold {len} rungs; at most {max} are allowed.")]
    LadderTooLong { len: f64, max: usize },
    #[error("Key binding '{command}' must list at least one key.")]
    EmptyKeyBinding { command: &'static str },
    #[error("Key '{key}' is bound to more than one command.")]
    ConflictingKeyBinding { key: String },
    #[error("Opacity must be within (0, 1] (got {value}).")]
    OpacityOutOfRange { value: f64 },
    #[error("Retry count must be <= {max} (got {value}).")]
    TooManyRetries { value: u32, max: u32 },
    #[error("Invalid boolean value '{value}'.")]
    InvalidBoolean { value: String },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
}
