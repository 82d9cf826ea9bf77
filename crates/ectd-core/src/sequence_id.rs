//! # Sequence Identifiers
//!
//! Defines `SequenceId`, the zero-padded 4-digit sequence number that names
//! one submission package within a lineage (`0000`..`9999`).
//!
//! The width cap is regulatory convention: transmission gateways reject
//! sequence directories wider than four digits, so overflow is an error
//! here rather than a silent widening.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use crate::error::SequenceIdError;

/// Upper bound of the 4-digit sequence space.
const MAX_SEQUENCE: u32 = 9999;

/// A zero-padded 4-digit sequence identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceId(u32);

impl SequenceId {
    /// Parse a sequence identifier from a decimal string.
    ///
    /// Accepts any non-negative decimal integer string whose value fits the
    /// 4-digit space (`"0"`, `"0003"`, `"42"` are all valid and render as
    /// `0000`, `0003`, `0042`).
    ///
    /// # Errors
    ///
    /// Returns [`SequenceIdError::InvalidBaseSequence`] for non-numeric input
    /// or values above 9999.
    pub fn parse(input: &str) -> Result<Self, SequenceIdError> {
        let trimmed = input.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SequenceIdError::InvalidBaseSequence(input.to_string()));
        }
        let value: u32 = trimmed
            .parse()
            .map_err(|_| SequenceIdError::InvalidBaseSequence(input.to_string()))?;
        Self::from_value(value)
    }

    /// Construct from a numeric value.
    pub fn from_value(value: u32) -> Result<Self, SequenceIdError> {
        if value > MAX_SEQUENCE {
            return Err(SequenceIdError::InvalidBaseSequence(value.to_string()));
        }
        Ok(Self(value))
    }

    /// The numeric value of this identifier.
    pub fn value(&self) -> u32 {
        self.0
    }

    /// The next sequence identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceIdError::SequenceOverflow`] when this identifier is
    /// already `9999`.
    pub fn next(&self) -> Result<SequenceId, SequenceIdError> {
        if self.0 >= MAX_SEQUENCE {
            return Err(SequenceIdError::SequenceOverflow(self.to_string()));
        }
        Ok(Self(self.0 + 1))
    }

    /// The storage directory name for this sequence (identical to the
    /// rendered identifier, e.g. `0004`).
    pub fn dir_name(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for SequenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl FromStr for SequenceId {
    type Err = SequenceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SequenceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SequenceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        SequenceId::parse(&raw).map_err(de::Error::custom)
    }
}
