//! Lease/expire duration parsing.
//!
//! Firmware revisions echo lease times either as a bare minute count
//! (`720`) or as `HH:MM` (`12:00`). Both normalize to seconds.

use thiserror::Error;

/// Errors produced while parsing a duration token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("invalid duration '{0}': expected minutes or HH:MM")]
    Invalid(String),
    #[error("invalid duration '{0}': negative, minutes >= 60, or too large for seconds")]
    OutOfRange(String),
}

/// Parse a bare minute count or an `HH:MM` string into seconds.
pub fn parse_duration_seconds(value: &str) -> Result<u32, DurationError> {
    let value = value.trim();

    if let Some((hours_part, minutes_part)) = value.split_once(':') {
        let hours: i64 = hours_part
            .parse()
            .map_err(|_| DurationError::Invalid(value.to_string()))?;
        let minutes: i64 = minutes_part
            .parse()
            .map_err(|_| DurationError::Invalid(value.to_string()))?;
        if hours < 0 || minutes < 0 || minutes >= 60 {
            return Err(DurationError::OutOfRange(value.to_string()));
        }
        let total = hours
            .checked_mul(60)
            .and_then(|h| h.checked_add(minutes))
            .ok_or_else(|| DurationError::OutOfRange(value.to_string()))?;
        return to_seconds(total, value);
    }

    let minutes: i64 = value
        .parse()
        .map_err(|_| DurationError::Invalid(value.to_string()))?;
    if minutes < 0 {
        return Err(DurationError::OutOfRange(value.to_string()));
    }
    to_seconds(minutes, value)
}

/// Total minutes to seconds, rejecting anything that cannot fit a `u32`.
fn to_seconds(total_minutes: i64, value: &str) -> Result<u32, DurationError> {
    total_minutes
        .checked_mul(60)
        .and_then(|seconds| u32::try_from(seconds).ok())
        .ok_or_else(|| DurationError::OutOfRange(value.to_string()))
}
