//! Discrete playback-speed ladder and the stepping operations over it.
mod ladder;

#[cfg(test)]
mod tests;

pub use ladder::{
    BASELINE_SPEED, DEFAULT_MAX, DEFAULT_MIN, DEFAULT_STEP, MAX_LADDER_LEN, SpeedLadder,
};

/// A user-facing speed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedOp {
    Increase,
    Decrease,
    Reset,
}

impl SpeedOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SpeedOp::Increase => "increase",
            SpeedOp::Decrease => "decrease",
            SpeedOp::Reset => "reset",
        }
    }
}

/// Formats a playback rate the way the overlay label renders it.
#[must_use]
pub fn format_speed(rate: f64) -> String {
    format!("{rate:.2}x")
}
