//! Nullable timestamp type.

use chrono::{DateTime, Datelike, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use tracing::trace;

use crate::error::{NullError, NullResult};

/// A timestamp that may be null. It supports SQL and JSON serialization.
///
/// A null `NullTime` marshals to JSON `null`. A zero timestamp (the Unix
/// epoch, which is also `DateTime::<Utc>::default()`) decoded from JSON is
/// considered null as well.
///
/// Only years 0 through 9999 can be marshaled, so that every encoded value is
/// valid RFC 3339 and decodes back.
///
/// While the value is null the stored timestamp is meaningless: equality,
/// hashing and every accessor ignore it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTime {
    time: DateTime<Utc>,
    valid: bool,
}

impl NullTime {
    /// Creates a new NullTime.
    pub fn new(time: DateTime<Utc>, valid: bool) -> Self {
        Self { time, valid }
    }

    /// Creates a NullTime that will never be null.
    pub fn from_time(time: DateTime<Utc>) -> Self {
        Self::new(time, true)
    }

    /// Creates a NullTime that is null if `time` is `None`.
    pub fn from_option(time: Option<DateTime<Utc>>) -> Self {
        match time {
            Some(t) => Self::from_time(t),
            None => Self::null(),
        }
    }

    /// Returns the null value.
    pub fn null() -> Self {
        Self::new(DateTime::default(), false)
    }

    /// Changes this value's timestamp and marks it non-null.
    pub fn set_valid(&mut self, time: DateTime<Utc>) {
        self.time = time;
        self.valid = true;
    }

    /// Returns a reference to the timestamp, or `None` if this value is null.
    pub fn ptr(&self) -> Option<&DateTime<Utc>> {
        if !self.valid {
            return None;
        }
        Some(&self.time)
    }

    /// Reports whether this value is non-null.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Reports whether this value is null.
    ///
    /// This is about omission, not about the timestamp: a non-null zero
    /// timestamp is not "zero" here. Use it with
    /// `#[serde(skip_serializing_if = "NullTime::is_zero")]`.
    pub fn is_zero(&self) -> bool {
        !self.valid
    }

    /// Returns the timestamp, or the zero timestamp if this value is null.
    pub fn value_or_zero(&self) -> DateTime<Utc> {
        if !self.valid {
            return DateTime::default();
        }
        self.time
    }

    /// Converts into an `Option`, `None` if null.
    pub fn into_option(self) -> Option<DateTime<Utc>> {
        self.valid.then_some(self.time)
    }

    /// Decodes JSON bytes into this value.
    ///
    /// Accepts `null`, an RFC 3339 string, or a `{"Time": .., "Valid": ..}`
    /// record. A decoded zero timestamp leaves the value null.
    pub fn unmarshal_json(&mut self, data: &[u8]) -> NullResult<()> {
        let value = match serde_json::from_slice(data) {
            Ok(v) => v,
            Err(e) => {
                self.valid = false;
                return Err(e.into());
            }
        };
        self.unmarshal_value(value)
    }

    /// Decodes an already-parsed JSON value into this value.
    ///
    /// On `null` the value becomes null and the timestamp is left alone.
    /// Otherwise validity is recomputed from the outcome: it is set only if
    /// decoding succeeded and the timestamp is not zero.
    pub fn unmarshal_value(&mut self, value: Value) -> NullResult<()> {
        let result = match value {
            Value::Null => {
                self.valid = false;
                return Ok(());
            }
            Value::String(s) => parse_timestamp(&s).map(|t| self.time = t),
            Value::Object(fields) => self.unmarshal_record(&fields),
            other => Err(type_mismatch(json_type_name(&other))),
        };

        self.valid = result.is_ok() && !is_zero_time(&self.time);
        if result.is_ok() && !self.valid {
            trace!("null: zero timestamp decoded as null");
        }
        result
    }

    /// Decodes a `{Time, Valid}` record. Keys match case-insensitively and
    /// the record's own `Valid` is checked for shape only. A record time of
    /// `0001-01-01T00:00:00Z` is the zero time of Go-style encoders and is
    /// read as zero.
    fn unmarshal_record(&mut self, fields: &Map<String, Value>) -> NullResult<()> {
        for (key, value) in fields {
            if key.eq_ignore_ascii_case("time") {
                match value {
                    Value::String(s) => {
                        let t = parse_timestamp(s)?;
                        self.time = if t == record_zero_time() {
                            DateTime::default()
                        } else {
                            t
                        };
                    }
                    Value::Null => {}
                    other => return Err(type_mismatch(json_type_name(other))),
                }
            } else if key.eq_ignore_ascii_case("valid") {
                match value {
                    Value::Bool(_) | Value::Null => {}
                    other => return Err(type_mismatch(json_type_name(other))),
                }
            }
        }
        Ok(())
    }

    /// Text decoding hook. The input is ignored: the timestamp is kept as is
    /// and validity becomes "timestamp is not zero".
    ///
    /// Use [`str::parse`] to build a `NullTime` from text.
    pub fn unmarshal_text(&mut self, _text: &[u8]) {
        self.valid = !is_zero_time(&self.time);
    }

    /// Encodes this value as JSON bytes.
    pub fn marshal_json(&self) -> NullResult<Vec<u8>> {
        if let Some(t) = self.ptr() {
            check_year(t)?;
        }
        Ok(serde_json::to_vec(self)?)
    }
}

/// Reports whether `t` is the zero timestamp.
pub fn is_zero_time(t: &DateTime<Utc>) -> bool {
    *t == DateTime::<Utc>::default()
}

fn record_zero_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// RFC 3339 has four-digit years only; chrono writes others with a sign.
fn check_year(t: &DateTime<Utc>) -> NullResult<()> {
    let year = t.year();
    if !(0..=9999).contains(&year) {
        return Err(NullError::YearOutOfRange { year });
    }
    Ok(())
}

fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_timestamp(s: &str) -> NullResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            trace!(reason = %e, "null: string is not a timestamp");
            NullError::TypeMismatch {
                type_name: "string",
                reason: Some(e),
            }
        })
}

fn type_mismatch(type_name: &'static str) -> NullError {
    trace!(type_name = type_name, "null: unexpected json type");
    NullError::TypeMismatch {
        type_name,
        reason: None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl PartialEq for NullTime {
    fn eq(&self, other: &Self) -> bool {
        match (self.valid, other.valid) {
            (true, true) => self.time == other.time,
            (false, false) => true,
            _ => false,
        }
    }
}

impl Eq for NullTime {}

impl Hash for NullTime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.valid.hash(state);
        if self.valid {
            self.time.hash(state);
        }
    }
}

/// Years outside 0 through 9999 print with a sign and do not parse back.
impl fmt::Display for NullTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ptr() {
            Some(t) => f.write_str(&format_timestamp(t)),
            None => f.write_str("null"),
        }
    }
}

impl FromStr for NullTime {
    type Err = NullError;

    /// Parses RFC 3339 text. Blank text and `null` give the null value; a zero
    /// timestamp is null too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "null" {
            return Ok(Self::null());
        }
        let time = DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc);
        Ok(Self::new(time, !is_zero_time(&time)))
    }
}

impl Serialize for NullTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.ptr() {
            Some(t) => {
                check_year(t).map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&format_timestamp(t))
            }
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for NullTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let mut t = NullTime::null();
        t.unmarshal_value(value).map_err(serde::de::Error::custom)?;
        Ok(t)
    }
}

impl From<DateTime<Utc>> for NullTime {
    fn from(t: DateTime<Utc>) -> Self {
        Self::from_time(t)
    }
}

impl From<Option<DateTime<Utc>>> for NullTime {
    fn from(t: Option<DateTime<Utc>>) -> Self {
        Self::from_option(t)
    }
}

impl From<NullTime> for Option<DateTime<Utc>> {
    fn from(t: NullTime) -> Self {
        t.into_option()
    }
}
