//! Calendar codecs.
//!
//! Everything is stored as TEXT in UTC so a stored value never depends on the
//! session time zone:
//! - dates: `YYYY-MM-DD`
//! - times: `HH:MM:SS[.ffffff]`
//! - timestamps: `YYYY-MM-DD HH:MM:SS[.ffffff]` (UTC)

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use super::{
    BoundReadCodec, BoundWriteCodec, mismatch, put, self_bound, take, take_text, unexpected_null,
};
use crate::cursor::{ParamSink, Position, Row};
use crate::error::{Error, Result};
use crate::value::{SqlValue, quote_text};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const DATETIME_T_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

fn invalid<T>(column: usize, text: &str) -> Error {
    Error::InvalidValue(format!(
        "column {column}: `{text}` is not a valid {}",
        std::any::type_name::<T>()
    ))
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, DATETIME_T_FORMAT))
        .ok()
}

/// Implement the write side for a type rendered to text by `$format`.
macro_rules! text_writer {
    ($codec:ty => $t:ty, $format:expr) => {
        impl BoundWriteCodec<$t> for $codec {
            fn arity(&self) -> usize {
                1
            }

            fn bind(&self, sink: &mut dyn ParamSink, pos: &mut Position, value: &$t) -> Result<()> {
                let format: fn(&$t) -> String = $format;
                put(sink, pos, SqlValue::Text(format(value)))
            }

            fn render_literal(&self, value: &$t) -> Result<Vec<String>> {
                let format: fn(&$t) -> String = $format;
                Ok(vec![quote_text(&format(value))])
            }
        }
    };
}

/// `NaiveDate` as `YYYY-MM-DD` text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateCodec;

impl BoundReadCodec<NaiveDate> for DateCodec {
    fn arity(&self) -> usize {
        1
    }

    fn get(&self, row: &dyn Row, pos: &mut Position) -> Result<NaiveDate> {
        let (column, text) = take_text::<NaiveDate>(row, pos)?;
        NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| invalid::<NaiveDate>(column, text))
    }
}

text_writer!(DateCodec => NaiveDate, |d| d.format(DATE_FORMAT).to_string());
self_bound!(DateCodec => NaiveDate);

/// `NaiveTime` as `HH:MM:SS[.ffffff]` text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeCodec;

impl BoundReadCodec<NaiveTime> for TimeCodec {
    fn arity(&self) -> usize {
        1
    }

    fn get(&self, row: &dyn Row, pos: &mut Position) -> Result<NaiveTime> {
        let (column, text) = take_text::<NaiveTime>(row, pos)?;
        NaiveTime::parse_from_str(text, TIME_FORMAT).map_err(|_| invalid::<NaiveTime>(column, text))
    }
}

text_writer!(TimeCodec => NaiveTime, |t| t.format(TIME_FORMAT).to_string());
self_bound!(TimeCodec => NaiveTime);

/// `NaiveDateTime` as `YYYY-MM-DD HH:MM:SS[.ffffff]` text. A `T` separator is
/// accepted on read.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeCodec;

impl BoundReadCodec<NaiveDateTime> for DateTimeCodec {
    fn arity(&self) -> usize {
        1
    }

    fn get(&self, row: &dyn Row, pos: &mut Position) -> Result<NaiveDateTime> {
        let (column, text) = take_text::<NaiveDateTime>(row, pos)?;
        parse_datetime(text).ok_or_else(|| invalid::<NaiveDateTime>(column, text))
    }
}

text_writer!(DateTimeCodec => NaiveDateTime, |dt| dt.format(DATETIME_FORMAT).to_string());
self_bound!(DateTimeCodec => NaiveDateTime);

/// `DateTime<Utc>` as UTC timestamp text.
///
/// Reads also accept RFC 3339 text (any offset, converted to UTC) and integer
/// unix seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcCodec;

fn read_utc<T>(row: &dyn Row, pos: &mut Position) -> Result<DateTime<Utc>> {
    match take(row, pos)? {
        (column, SqlValue::Text(text)) => parse_datetime(text)
            .map(|naive| naive.and_utc())
            .or_else(|| {
                DateTime::parse_from_rfc3339(text)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            })
            .ok_or_else(|| invalid::<T>(column, text)),
        (_, SqlValue::Integer(secs)) => {
            DateTime::from_timestamp(*secs, 0).ok_or_else(|| Error::OutOfRange {
                type_name: std::any::type_name::<T>(),
                value: secs.to_string(),
            })
        }
        (column, SqlValue::Null) => Err(unexpected_null::<T>(column)),
        (column, other) => Err(mismatch::<T>(column, other)),
    }
}

fn utc_text(dt: &DateTime<Utc>) -> String {
    dt.naive_utc().format(DATETIME_FORMAT).to_string()
}

impl BoundReadCodec<DateTime<Utc>> for UtcCodec {
    fn arity(&self) -> usize {
        1
    }

    fn get(&self, row: &dyn Row, pos: &mut Position) -> Result<DateTime<Utc>> {
        read_utc::<DateTime<Utc>>(row, pos)
    }
}

text_writer!(UtcCodec => DateTime<Utc>, utc_text);
self_bound!(UtcCodec => DateTime<Utc>);

/// `DateTime<FixedOffset>` normalized to UTC on write; reads come back with a
/// `+00:00` offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedOffsetCodec;

impl BoundReadCodec<DateTime<FixedOffset>> for FixedOffsetCodec {
    fn arity(&self) -> usize {
        1
    }

    fn get(&self, row: &dyn Row, pos: &mut Position) -> Result<DateTime<FixedOffset>> {
        read_utc::<DateTime<FixedOffset>>(row, pos).map(|dt| dt.fixed_offset())
    }
}

text_writer!(FixedOffsetCodec => DateTime<FixedOffset>, |dt| utc_text(&dt.with_timezone(&Utc)));
self_bound!(FixedOffsetCodec => DateTime<FixedOffset>);
