//! Scalar adapters: canonical text forms for types whose default JSON shape
//! is lossy.
//!
//! The sql date/time variants are calendar values without instant semantics;
//! an instant-based encoding would drag in timezones the value never had.
//! Each adapter is a total `value ↔ string` pair.

use crate::error::{Error, Result};
use crate::value::Locale;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fmt::Write as _;

const SQL_DATE_FORMAT: &str = "%Y-%m-%d";
const SQL_TIME_FORMAT: &str = "%H:%M:%S";
const SQL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const LOCAL_TIME_FORMAT: &str = "%H:%M:%S%.f";
const LOCAL_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Format a sql date as `yyyy-MM-dd`.
#[must_use]
pub fn format_sql_date(date: &NaiveDate) -> String {
    date.format(SQL_DATE_FORMAT).to_string()
}

/// Parse a `yyyy-MM-dd` string.
pub fn parse_sql_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, SQL_DATE_FORMAT)
        .map_err(|e| Error::Schema(format!("invalid sql date {s:?}: {e}")))
}

/// Format a sql time as `HH:mm:ss`. Sub-second precision is dropped, the
/// type has none.
#[must_use]
pub fn format_sql_time(time: &NaiveTime) -> String {
    time.format(SQL_TIME_FORMAT).to_string()
}

/// Parse an `HH:mm:ss` string.
pub fn parse_sql_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, SQL_TIME_FORMAT)
        .map_err(|e| Error::Schema(format!("invalid sql time {s:?}: {e}")))
}

/// Format a sql timestamp as `yyyy-MM-dd HH:mm:ss.fffffffff`.
///
/// The fraction keeps nanosecond precision with trailing zeros trimmed, but
/// always carries at least one digit (`.0` for whole seconds), matching the
/// historical wire form.
#[must_use]
pub fn format_sql_timestamp(ts: &NaiveDateTime) -> String {
    let mut out = ts.format(SQL_TIMESTAMP_FORMAT).to_string();
    let mut frac = format!("{:09}", ts.nanosecond() % 1_000_000_000);
    while frac.len() > 1 && frac.ends_with('0') {
        frac.pop();
    }
    let _ = write!(out, ".{frac}");
    out
}

/// Parse a `yyyy-MM-dd HH:mm:ss[.fraction]` string.
pub fn parse_sql_timestamp(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .map_err(|e| Error::Schema(format!("invalid sql timestamp {s:?}: {e}")))
}

/// Format a local time as ISO `HH:mm:ss[.fraction]`.
#[must_use]
pub fn format_local_time(time: &NaiveTime) -> String {
    time.format(LOCAL_TIME_FORMAT).to_string()
}

/// Parse an ISO local time.
pub fn parse_local_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, LOCAL_TIME_FORMAT)
        .map_err(|e| Error::Schema(format!("invalid local time {s:?}: {e}")))
}

/// Format a local date-time as ISO `yyyy-MM-ddTHH:mm:ss[.fraction]`.
#[must_use]
pub fn format_local_date_time(ts: &NaiveDateTime) -> String {
    ts.format(LOCAL_DATE_TIME_FORMAT).to_string()
}

/// Parse an ISO local date-time.
pub fn parse_local_date_time(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, LOCAL_DATE_TIME_FORMAT)
        .map_err(|e| Error::Schema(format!("invalid local date-time {s:?}: {e}")))
}

/// Format a locale as `language[_COUNTRY[_variant]]`.
#[must_use]
pub fn format_locale(locale: &Locale) -> String {
    let mut out = locale.language().to_owned();
    if let Some(country) = locale.country() {
        let _ = write!(out, "_{country}");
        if let Some(variant) = locale.variant() {
            let _ = write!(out, "_{variant}");
        }
    }
    out
}

/// Parse a `language[_COUNTRY[_variant]]` string.
///
/// A leading underscore (language-less locale) and forms with more than three
/// components are rejected with [`Error::InvalidArgument`].
pub fn parse_locale(s: &str) -> Result<Locale> {
    if s.is_empty() || s.starts_with('_') {
        return Err(Error::InvalidArgument(format!(
            "unsupported locale format: {s:?}"
        )));
    }
    let parts: Vec<&str> = s.split('_').collect();
    match parts.as_slice() {
        [language] => Ok(Locale::new(*language)),
        [language, country] => Ok(Locale::with_country(*language, *country)),
        [language, country, variant] => Ok(Locale::with_variant(*language, *country, *variant)),
        _ => Err(Error::InvalidArgument(format!(
            "unsupported locale format: {s:?}"
        ))),
    }
}

/// Check that `s` looks like an ISO-8601 duration or period (an optional
/// sign followed by `P`). Full grammar validation is left to the consumer;
/// the codec only guards against obviously foreign tokens.
pub fn check_iso_8601_prefix(s: &str) -> Result<()> {
    let body = s
        .strip_prefix('+')
        .or_else(|| s.strip_prefix('-'))
        .unwrap_or(s);
    if body.starts_with('P') && body.len() > 1 {
        Ok(())
    } else {
        Err(Error::Schema(format!("invalid ISO-8601 amount: {s:?}")))
    }
}
