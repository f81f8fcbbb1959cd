//! Content fingerprints for captured tool output.
//!
//! A [`Fingerprint`] is a CRC-32 over the *normalised* text of a baseline.
//! Pseudo-terminals echo carriage returns that are not part of the logical
//! text, so every fingerprint is computed after [`normalize_baseline`].

use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 32-bit cyclic-redundancy fingerprint, rendered as `0xXXXXXXXX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Fingerprint(u32);

impl Fingerprint {
    /// The all-zero sentinel stored in skeleton definitions.
    pub const UNVERIFIED: Fingerprint = Fingerprint(0);

    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Fingerprint text exactly as given (no normalisation).
    pub fn of_text(text: &str) -> Self {
        Self(crc32fast::hash(text.as_bytes()))
    }

    /// Normalise `text` as a baseline and fingerprint the result.
    pub fn of_baseline(text: &str) -> Self {
        Self::of_text(&normalize_baseline(text))
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn is_unverified(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.is_empty() || digits.len() > 8 {
            return Err(DomainError::InvalidFingerprint(s.to_string()));
        }

        u32::from_str_radix(digits, 16)
            .map(Fingerprint)
            .map_err(|_| DomainError::InvalidFingerprint(s.to_string()))
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Convert `\r\n` and bare `\r` to `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Canonical baseline form: normalised line endings, no trailing blank
/// lines or trailing whitespace, and a single final newline when non-empty.
///
/// Idempotent: `normalize_baseline(normalize_baseline(x)) == normalize_baseline(x)`.
pub fn normalize_baseline(text: &str) -> String {
    let normalized = normalize_line_endings(text);
    let trimmed = normalized.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}\n", trimmed)
    }
}
