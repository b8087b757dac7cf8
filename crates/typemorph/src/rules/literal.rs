// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Numeric literal grammar for text -> number conversions.
//!
//! Integers: optional sign, then `0x`, `0o`, `0b` or a leading `0`
//! (octal) prefix, then digits. Underscores may separate digits, and
//! follow a prefix, but only in prefixed literals.

/// Why a literal was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LiteralError {
    /// Not a literal of the expected grammar.
    Syntax,
    /// Well-formed, but too large to represent.
    Range,
}

/// Parse an integer literal.
pub(crate) fn parse_int(text: &str) -> Result<i128, LiteralError> {
    let (negative, radix, digits) = int_parts(text)?;
    let mut value: i128 = 0;
    for c in digits.chars() {
        let digit = c.to_digit(radix).ok_or(LiteralError::Syntax)?;
        value = value
            .checked_mul(radix as i128)
            .and_then(|v| v.checked_add(digit as i128))
            .ok_or(LiteralError::Range)?;
    }
    Ok(if negative { -value } else { value })
}

/// Sign, radix and separator-free digits of an integer literal.
pub(crate) fn int_parts(text: &str) -> Result<(bool, u32, String), LiteralError> {
    let (negative, body) = split_sign(text);
    let (radix, digits, prefixed) = split_radix(body);
    if digits.is_empty() || digits.ends_with('_') || digits.contains("__") {
        return Err(LiteralError::Syntax);
    }
    if !prefixed && digits.contains('_') {
        return Err(LiteralError::Syntax);
    }
    let digits: String = digits.chars().filter(|c| *c != '_').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(LiteralError::Syntax);
    }
    Ok((negative, radix, digits))
}

/// Parse a floating-point literal.
///
/// Accepts decimal literals with an optional exponent, `inf` with an
/// optional sign, and anything [`parse_int`] accepts. A finite literal too
/// large for `f64` is a range error.
pub(crate) fn parse_float(text: &str) -> Result<f64, LiteralError> {
    let (negative, body) = split_sign(text);
    if body.eq_ignore_ascii_case("inf") {
        return Ok(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let decimal = !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if decimal {
        if let Ok(value) = text.parse::<f64>() {
            if value.is_infinite() {
                return Err(LiteralError::Range);
            }
            return Ok(value);
        }
    }
    parse_int(text).map(|n| n as f64)
}

fn split_sign(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = text.strip_prefix('+') {
        (false, rest)
    } else {
        (false, text)
    }
}

fn split_radix(body: &str) -> (u32, &str, bool) {
    let lower = body.get(..2).map(str::to_ascii_lowercase);
    match lower.as_deref() {
        Some("0x") => (16, &body[2..], true),
        Some("0o") => (8, &body[2..], true),
        Some("0b") => (2, &body[2..], true),
        _ if body.len() > 1 && body.starts_with('0') => (8, &body[1..], true),
        _ => (10, body, false),
    }
}
