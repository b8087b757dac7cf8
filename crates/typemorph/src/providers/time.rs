// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Timestamps.
//!
//! Text uses RFC 3339. Integers of 32 bits or more are Unix seconds; floats
//! are Unix seconds with a fractional part. Booleans, narrow integers,
//! records and maps have no timestamp form. Anything else goes through the
//! `i64` seconds value.

use crate::classify::StructuralKind;
use crate::dynamic::{DynamicValue, PrimitiveKind, TypeDescriptor};
use crate::error::ConversionError;
use crate::mapper::{Mapper, Routine, Source};
use crate::registry::Provider;
use crate::rules::{float_value, int_value};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::sync::Arc;

/// A UTC instant with nanosecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Timestamp(pub DateTime<Utc>);

host_value!(Timestamp, "timestamp");

impl Timestamp {
    /// Instant `secs` seconds and `nanos` nanoseconds after the Unix epoch.
    pub fn from_unix(secs: i64, nanos: u32) -> Option<Self> {
        DateTime::from_timestamp(secs, nanos).map(Self)
    }

    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

/// Provider for [`Timestamp`], in both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampProvider;

impl Provider for TimestampProvider {
    fn routine(
        &self,
        _: &Mapper,
        src: &Arc<TypeDescriptor>,
        dst: &Arc<TypeDescriptor>,
    ) -> Option<Routine> {
        let timestamp = Timestamp::descriptor();
        match (**src == *timestamp, **dst == *timestamp) {
            (true, true) => Some(super::copy_routine("timestamp-copy")),
            (true, false) => outbound(dst),
            (false, true) => inbound(src),
            (false, false) => None,
        }
    }
}

#[derive(Clone, Copy)]
enum Form {
    Text,
    Seconds(PrimitiveKind),
    Float(PrimitiveKind),
    /// Through the `i64` seconds value.
    Indirect,
}

fn form(desc: &TypeDescriptor) -> Option<Form> {
    let kind = StructuralKind::of(desc);
    let wide = desc
        .primitive_kind()
        .and_then(|p| p.size())
        .is_some_and(|width| width >= 4);
    match kind {
        StructuralKind::Text => Some(Form::Text),
        StructuralKind::Signed | StructuralKind::Unsigned if wide => {
            desc.primitive_kind().map(Form::Seconds)
        }
        StructuralKind::Float => desc.primitive_kind().map(Form::Float),
        StructuralKind::Bool
        | StructuralKind::Signed
        | StructuralKind::Unsigned
        | StructuralKind::Record
        | StructuralKind::Map => None,
        _ => Some(Form::Indirect),
    }
}

fn source_timestamp(source: &Source<'_>, to: &Arc<TypeDescriptor>) -> Result<Timestamp, ConversionError> {
    super::held::<Timestamp>(source, to).copied()
}

fn outbound(dst: &TypeDescriptor) -> Option<Routine> {
    let routine = match form(dst)? {
        Form::Text => Routine::new("timestamp-to-text", |_, source, mut target| {
            let ts = source_timestamp(&source, target.ty())?;
            target.set(DynamicValue::String(ts.to_rfc3339()));
            Ok(())
        }),
        Form::Seconds(kind) => Routine::new("timestamp-to-seconds", move |_, source, mut target| {
            let ts = source_timestamp(&source, target.ty())?;
            let value = int_value(kind, ts.unix_seconds() as i128)
                .ok_or_else(|| ConversionError::overflow(source.ty(), target.ty()))?;
            target.set(value);
            Ok(())
        }),
        Form::Float(kind) => Routine::new("timestamp-to-float", move |_, source, mut target| {
            let ts = source_timestamp(&source, target.ty())?;
            let secs = ts.unix_seconds() as f64 + f64::from(ts.0.timestamp_subsec_nanos()) / 1e9;
            let value = float_value(kind, secs)
                .ok_or_else(|| ConversionError::overflow(source.ty(), target.ty()))?;
            target.set(value);
            Ok(())
        }),
        Form::Indirect => Routine::new("timestamp-indirect", |mapper, source, target| {
            let ts = source_timestamp(&source, target.ty())?;
            let (ty, value) = target.into_parts();
            let seconds = TypeDescriptor::builtin(PrimitiveKind::I64);
            mapper.convert_value(&seconds, &DynamicValue::I64(ts.unix_seconds()), ty, value)
        }),
    };
    Some(routine)
}

fn inbound(src: &TypeDescriptor) -> Option<Routine> {
    let routine = match form(src)? {
        Form::Text => Routine::new("text-to-timestamp", |_, source, mut target| {
            let text = source
                .value()
                .as_str()
                .ok_or_else(|| ConversionError::invalid_source(source.ty(), target.ty()))?;
            let parsed = DateTime::parse_from_rfc3339(text).map_err(|e| {
                ConversionError::parse_failure(source.ty(), target.ty()).with_reason(e.to_string())
            })?;
            target.set(DynamicValue::opaque(Timestamp(parsed.with_timezone(&Utc))));
            Ok(())
        }),
        Form::Seconds(_) => Routine::new("seconds-to-timestamp", |_, source, mut target| {
            let ts = source
                .value()
                .as_i128()
                .and_then(|n| i64::try_from(n).ok())
                .and_then(|secs| Timestamp::from_unix(secs, 0))
                .ok_or_else(|| ConversionError::overflow(source.ty(), target.ty()))?;
            target.set(DynamicValue::opaque(ts));
            Ok(())
        }),
        Form::Float(_) => Routine::new("float-to-timestamp", |_, source, mut target| {
            let ts = source
                .value()
                .as_f64()
                .and_then(split_seconds)
                .ok_or_else(|| ConversionError::overflow(source.ty(), target.ty()))?;
            target.set(DynamicValue::opaque(ts));
            Ok(())
        }),
        Form::Indirect => Routine::new("indirect-timestamp", |mapper, source, mut target| {
            let seconds = TypeDescriptor::builtin(PrimitiveKind::I64);
            let mut value = DynamicValue::I64(0);
            mapper.convert_value(source.ty(), source.value(), &seconds, &mut value)?;
            let ts = value
                .as_i128()
                .and_then(|n| i64::try_from(n).ok())
                .and_then(|secs| Timestamp::from_unix(secs, 0))
                .ok_or_else(|| ConversionError::overflow(source.ty(), target.ty()))?;
            target.set(DynamicValue::opaque(ts));
            Ok(())
        }),
    };
    Some(routine)
}

fn split_seconds(f: f64) -> Option<Timestamp> {
    if !f.is_finite() || f.abs() >= 9.2e18 {
        return None;
    }
    let secs = f.floor();
    let nanos = ((f - secs) * 1e9).round().min(999_999_999.0) as u32;
    Timestamp::from_unix(secs as i64, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::{named, DynamicData};
    use crate::error::ErrorKind;

    fn mapper() -> Mapper {
        Mapper::builder().with_default_providers().build()
    }

    fn at(secs: i64) -> DynamicData {
        DynamicData::from_native(Timestamp::from_unix(secs, 0).unwrap())
    }

    #[test]
    fn test_text_round_trip() {
        let mapper = mapper();
        let text: String = mapper.convert_native(&at(86_400)).unwrap();
        assert_eq!(text, "1970-01-02T00:00:00Z");

        let src = DynamicData::from_native("2024-02-29T12:30:00.5+02:00".to_string());
        let ts: Timestamp = mapper.convert_native(&src).unwrap();
        assert_eq!(ts.unix_seconds(), 1_709_202_600);
        assert_eq!(ts.to_rfc3339(), "2024-02-29T10:30:00.500Z");

        let bad = DynamicData::from_native("yesterday".to_string());
        let err = mapper.convert_native::<Timestamp>(&bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
    }

    #[test]
    fn test_seconds() {
        let mapper = mapper();
        assert_eq!(mapper.convert_native::<i64>(&at(-5)).unwrap(), -5);
        assert_eq!(mapper.convert_native::<u32>(&at(7)).unwrap(), 7);
        let err = mapper.convert_native::<u32>(&at(-5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);

        let ts: Timestamp = mapper.convert_native(&DynamicData::from_native(60u64)).unwrap();
        assert_eq!(ts.unix_seconds(), 60);
        let err = mapper
            .convert_native::<Timestamp>(&DynamicData::from_native(i64::MAX))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
    }

    #[test]
    fn test_fractional_seconds() {
        let mapper = mapper();
        let ts: Timestamp = mapper.convert_native(&DynamicData::from_native(1.25f64)).unwrap();
        assert_eq!(ts.unix_seconds(), 1);
        assert_eq!(ts.0.timestamp_subsec_nanos(), 250_000_000);
        assert_eq!(
            mapper
                .convert_native::<f64>(&DynamicData::from_native(ts))
                .unwrap(),
            1.25
        );
    }

    #[test]
    fn test_declined_kinds() {
        let mapper = mapper();
        let err = mapper.convert_native::<bool>(&at(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        let err = mapper
            .convert_native::<Timestamp>(&DynamicData::from_native(1u16))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_aliases_and_byte_form() {
        let mapper = mapper();
        let epoch = named("Epoch", &TypeDescriptor::builtin(PrimitiveKind::I64));
        let mut dst = DynamicData::new(&epoch);
        mapper.convert(&at(99), &mut dst).unwrap();
        assert_eq!(dst.value(), &DynamicValue::I64(99));

        let bytes: Vec<u8> = mapper.convert_native(&at(1)).unwrap();
        assert_eq!(bytes, [0, 0, 0, 0, 0, 0, 0, 1]);
    }
}
