//! Capture results and decoding of raw terminal output.
//!
//! The capture engine returns bytes; turning them into text is the caller's
//! job. [`decode_output`] applies the requested encoding and error policy and
//! normalises line endings, because pseudo-terminals translate `\n` into
//! `\r\n` on output.

use crate::core::error::DomainError;
use crate::tool::normalize_line_endings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exit code reported for a generic capture failure.
pub const EXIT_CAPTURE_FAILED: i32 = -1;
/// Exit code reported when the final wait for the child timed out.
pub const EXIT_TIMED_OUT: i32 = -2;
/// Exit code assigned by callers when captured bytes cannot be decoded.
pub const EXIT_DECODE_FAILED: i32 = -3;

/// Default terminal geometry for captures.
pub const DEFAULT_ROWS: u16 = 50;
pub const DEFAULT_COLS: u16 = 200;

/// Raw output of one capture. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResult {
    pub stdout: Vec<u8>,
    pub exit_code: i32,
}

impl CaptureResult {
    pub fn new(stdout: Vec<u8>, exit_code: i32) -> Self {
        Self { stdout, exit_code }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Lossy UTF-8 text with normalised line endings.
    pub fn text_lossy(&self) -> String {
        normalize_line_endings(&String::from_utf8_lossy(&self.stdout))
    }
}

/// Map an exit code (including negative sentinels) to a value a shell can
/// observe: sentinels wrap the way the OS truncates them (`-1` → 255).
pub fn shell_exit_code(code: i32) -> i32 {
    if code < 0 {
        (256 + code.max(-255)) & 0xFF
    } else {
        code.min(255)
    }
}

/// Text encodings understood by [`decode_output`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextEncoding {
    #[default]
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "latin-1")]
    Latin1,
}

impl TextEncoding {
    pub fn as_str(&self) -> &str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin-1",
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TextEncoding {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" => Ok(TextEncoding::Latin1),
            _ => Err(DomainError::UnsupportedEncoding(s.to_string())),
        }
    }
}

/// What to do with bytes that are invalid in the chosen encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeErrorPolicy {
    /// Fail on the first invalid sequence
    Strict,
    /// Drop invalid sequences
    Ignore,
    /// Substitute U+FFFD
    #[default]
    Replace,
}

impl DecodeErrorPolicy {
    pub fn as_str(&self) -> &str {
        match self {
            DecodeErrorPolicy::Strict => "strict",
            DecodeErrorPolicy::Ignore => "ignore",
            DecodeErrorPolicy::Replace => "replace",
        }
    }
}

impl FromStr for DecodeErrorPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(DecodeErrorPolicy::Strict),
            "ignore" => Ok(DecodeErrorPolicy::Ignore),
            "replace" => Ok(DecodeErrorPolicy::Replace),
            _ => Err(DomainError::UnknownErrorPolicy(s.to_string())),
        }
    }
}

/// Decode captured bytes and normalise line endings.
pub fn decode_output(
    bytes: &[u8],
    encoding: TextEncoding,
    policy: DecodeErrorPolicy,
) -> Result<String, DomainError> {
    let text = match encoding {
        // Every byte is a valid Latin-1 code point.
        TextEncoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        TextEncoding::Utf8 => decode_utf8(bytes, policy)?,
    };
    Ok(normalize_line_endings(&text))
}

fn decode_utf8(bytes: &[u8], policy: DecodeErrorPolicy) -> Result<String, DomainError> {
    match policy {
        DecodeErrorPolicy::Strict => std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| DomainError::Decode {
                encoding: TextEncoding::Utf8.to_string(),
                offset: e.valid_up_to(),
            }),
        DecodeErrorPolicy::Replace => Ok(String::from_utf8_lossy(bytes).into_owned()),
        DecodeErrorPolicy::Ignore => {
            let mut text = String::with_capacity(bytes.len());
            for chunk in bytes.utf8_chunks() {
                text.push_str(chunk.valid());
            }
            Ok(text)
        }
    }
}
