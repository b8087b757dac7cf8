// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversion errors.

use crate::dynamic::TypeDescriptor;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Why a conversion failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No usable source value (empty optional, empty `any`, malformed value).
    InvalidSource,
    /// No writable destination.
    InvalidDestination,
    /// Numeric value out of destination range.
    Overflow,
    /// Text does not match the target scalar grammar.
    ParseFailure,
    /// Fixed-size sequence or byte-width mismatch.
    LengthMismatch,
    /// Strict mode is on and the nominal types differ.
    StrictTypeMismatch,
    /// No rule applies to this type pair.
    Unsupported,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InvalidSource => "invalid source value",
            Self::InvalidDestination => "invalid destination",
            Self::Overflow => "value out of range",
            Self::ParseFailure => "parse failure",
            Self::LengthMismatch => "length mismatch",
            Self::StrictTypeMismatch => "strict type mismatch",
            Self::Unsupported => "unsupported conversion",
        })
    }
}

/// A failed conversion, reported at the leaf where it happened.
#[derive(Debug, Clone, Error)]
#[error("cannot convert {from} to {to}: {kind}{}", reason_suffix(.reason))]
pub struct ConversionError {
    kind: ErrorKind,
    from: Arc<TypeDescriptor>,
    to: Arc<TypeDescriptor>,
    reason: Option<String>,
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(": {}", r))
        .unwrap_or_default()
}

impl ConversionError {
    pub fn new(kind: ErrorKind, from: &Arc<TypeDescriptor>, to: &Arc<TypeDescriptor>) -> Self {
        Self {
            kind,
            from: Arc::clone(from),
            to: Arc::clone(to),
            reason: None,
        }
    }

    /// Attach a human-readable reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn invalid_source(from: &Arc<TypeDescriptor>, to: &Arc<TypeDescriptor>) -> Self {
        Self::new(ErrorKind::InvalidSource, from, to)
    }

    pub fn invalid_destination(from: &Arc<TypeDescriptor>, to: &Arc<TypeDescriptor>) -> Self {
        Self::new(ErrorKind::InvalidDestination, from, to)
    }

    pub fn overflow(from: &Arc<TypeDescriptor>, to: &Arc<TypeDescriptor>) -> Self {
        Self::new(ErrorKind::Overflow, from, to)
    }

    pub fn parse_failure(from: &Arc<TypeDescriptor>, to: &Arc<TypeDescriptor>) -> Self {
        Self::new(ErrorKind::ParseFailure, from, to)
    }

    pub fn length_mismatch(from: &Arc<TypeDescriptor>, to: &Arc<TypeDescriptor>) -> Self {
        Self::new(ErrorKind::LengthMismatch, from, to)
    }

    pub fn strict_mismatch(from: &Arc<TypeDescriptor>, to: &Arc<TypeDescriptor>) -> Self {
        Self::new(ErrorKind::StrictTypeMismatch, from, to)
    }

    pub fn unsupported(from: &Arc<TypeDescriptor>, to: &Arc<TypeDescriptor>) -> Self {
        Self::new(ErrorKind::Unsupported, from, to)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Source type at the failing leaf.
    pub fn from_type(&self) -> &Arc<TypeDescriptor> {
        &self.from
    }

    /// Destination type at the failing leaf.
    pub fn to_type(&self) -> &Arc<TypeDescriptor> {
        &self.to
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::PrimitiveKind;

    #[test]
    fn test_error_message() {
        let from = TypeDescriptor::builtin(PrimitiveKind::I64);
        let to = TypeDescriptor::builtin(PrimitiveKind::U8);
        let err = ConversionError::overflow(&from, &to);
        assert_eq!(err.to_string(), "cannot convert i64 to u8: value out of range");
        assert_eq!(err.kind(), ErrorKind::Overflow);

        let err = ConversionError::parse_failure(&to, &from).with_reason("invalid digit");
        assert_eq!(
            err.to_string(),
            "cannot convert u8 to i64: parse failure: invalid digit"
        );
        assert_eq!(err.reason(), Some("invalid digit"));
        assert_eq!(err.from_type().name(), "u8");
    }
}
