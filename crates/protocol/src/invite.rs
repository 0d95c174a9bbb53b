use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Error returned when an invite code fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InviteCodeError {
    #[error("invite code is not a number: {0:?}")]
    NotANumber(String),
    #[error("invite code out of range (expected 1-65535): {0}")]
    OutOfRange(u64),
}

/// The short numeric code naming one shared file on the relay.
///
/// The relay hands one out per upload; the receiving side types it in.
/// Valid codes are `1..=65535`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct InviteCode(u16);

impl InviteCode {
    /// Validates `code` and wraps it. Zero is rejected.
    pub fn new(code: u16) -> Result<Self, InviteCodeError> {
        if code == 0 {
            return Err(InviteCodeError::OutOfRange(0));
        }
        Ok(Self(code))
    }

    /// The numeric value.
    pub fn value(&self) -> u16 {
        self.0
    }
}

impl FromStr for InviteCode {
    type Err = InviteCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: u64 = trimmed
            .parse()
            .map_err(|_| InviteCodeError::NotANumber(trimmed.to_string()))?;
        if value == 0 || value > u64::from(u16::MAX) {
            return Err(InviteCodeError::OutOfRange(value));
        }
        Ok(Self(value as u16))
    }
}

impl fmt::Display for InviteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
