//! The context value model: a closed set of kinds the codec can round-trip.
//!
//! Instead of reflecting over arbitrary objects, every supported value kind is
//! an explicit [`ContextValue`] variant. Custom aggregates carry a caller
//! registered tag plus a JSON payload (see [`CustomValue`]).

use crate::adapter;
use crate::error::{Error, Result};
use crate::parameter::{JobParameter, JobParameters};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;

/// A single value stored in an [`ExecutionContext`].
///
/// Each variant maps to exactly one wire tag (see
/// [`type_tag`](Self::type_tag)), so a decoded value always comes back as the
/// variant it was written from. The exceptions are collection *elements*,
/// which are decoded generically (string / long / double / boolean / null /
/// nested collection) because element-level type information is not recorded
/// on the wire.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ContextValue {
    /// JSON null. Only legal inside collection payloads; writing a top-level
    /// null fails with [`Error::InvalidArgument`].
    Null,
    /// UTF-8 string.
    String(String),
    /// Boolean.
    Boolean(bool),
    /// 8-bit signed integer.
    Byte(i8),
    /// 16-bit signed integer.
    Short(i16),
    /// 32-bit signed integer.
    Int(i32),
    /// 64-bit signed integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Arbitrary-precision integer, kept as its decimal digit string.
    BigInteger(String),
    /// Arbitrary-precision decimal, kept as its literal digit string.
    BigDecimal(String),
    /// Instant as milliseconds since the Unix epoch.
    Date(i64),
    /// Calendar date with no time component, `yyyy-MM-dd` on the wire.
    SqlDate(NaiveDate),
    /// Wall-clock time with no date component, `HH:mm:ss` on the wire.
    SqlTime(NaiveTime),
    /// Date-time with up to nanosecond precision,
    /// `yyyy-MM-dd HH:mm:ss.fffffffff` on the wire.
    SqlTimestamp(NaiveDateTime),
    /// ISO local date.
    LocalDate(NaiveDate),
    /// ISO local time.
    LocalTime(NaiveTime),
    /// ISO local date-time.
    LocalDateTime(NaiveDateTime),
    /// ISO date-time with a UTC offset.
    OffsetDateTime(DateTime<FixedOffset>),
    /// Zoned date-time kept as its verbatim text form; zone rules are not
    /// interpreted, the text round-trips as-is.
    ZonedDateTime(String),
    /// ISO-8601 duration text (`PT5M`).
    Duration(String),
    /// ISO-8601 period text (`P1Y2M3D`).
    Period(String),
    /// URL kept as text.
    Url(String),
    /// URI kept as text.
    Uri(String),
    /// Locale, `language[_COUNTRY[_variant]]` on the wire.
    Locale(Locale),
    /// A single job parameter record.
    Parameter(JobParameter),
    /// The job parameters aggregate.
    Parameters(JobParameters),
    /// Ordered sequence. Elements are decoded generically.
    List(Vec<ContextValue>),
    /// Set, kept in encounter order. Elements are decoded generically.
    Set(Vec<ContextValue>),
    /// Nested string-keyed mapping. Values are decoded generically.
    Map(IndexMap<String, ContextValue>),
    /// Caller-defined aggregate under a registered tag.
    Custom(CustomValue),
}

impl ContextValue {
    /// The wire tag written into the envelope's `@class` field.
    ///
    /// Built-in kinds keep the qualified names used by the original wire
    /// format so historical documents stay readable; collection kinds always
    /// name the canonical public implementation. `None` for [`Null`], which
    /// has no envelope form.
    ///
    /// [`Null`]: Self::Null
    #[must_use]
    pub fn type_tag(&self) -> Option<&str> {
        Some(match self {
            ContextValue::Null => return None,
            ContextValue::String(_) => "java.lang.String",
            ContextValue::Boolean(_) => "java.lang.Boolean",
            ContextValue::Byte(_) => "java.lang.Byte",
            ContextValue::Short(_) => "java.lang.Short",
            ContextValue::Int(_) => "java.lang.Integer",
            ContextValue::Long(_) => "java.lang.Long",
            ContextValue::Float(_) => "java.lang.Float",
            ContextValue::Double(_) => "java.lang.Double",
            ContextValue::BigInteger(_) => "java.math.BigInteger",
            ContextValue::BigDecimal(_) => "java.math.BigDecimal",
            ContextValue::Date(_) => "java.util.Date",
            ContextValue::SqlDate(_) => "java.sql.Date",
            ContextValue::SqlTime(_) => "java.sql.Time",
            ContextValue::SqlTimestamp(_) => "java.sql.Timestamp",
            ContextValue::LocalDate(_) => "java.time.LocalDate",
            ContextValue::LocalTime(_) => "java.time.LocalTime",
            ContextValue::LocalDateTime(_) => "java.time.LocalDateTime",
            ContextValue::OffsetDateTime(_) => "java.time.OffsetDateTime",
            ContextValue::ZonedDateTime(_) => "java.time.ZonedDateTime",
            ContextValue::Duration(_) => "java.time.Duration",
            ContextValue::Period(_) => "java.time.Period",
            ContextValue::Url(_) => "java.net.URL",
            ContextValue::Uri(_) => "java.net.URI",
            ContextValue::Locale(_) => "java.util.Locale",
            ContextValue::Parameter(_) => "org.springframework.batch.core.JobParameter",
            ContextValue::Parameters(_) => "org.springframework.batch.core.JobParameters",
            ContextValue::List(_) => "java.util.ArrayList",
            ContextValue::Set(_) => "java.util.HashSet",
            ContextValue::Map(_) => "java.util.LinkedHashMap",
            ContextValue::Custom(custom) => return Some(custom.tag()),
        })
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        ContextValue::String(s.to_owned())
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        ContextValue::String(s)
    }
}

impl From<i64> for ContextValue {
    fn from(n: i64) -> Self {
        ContextValue::Long(n)
    }
}

impl From<f64> for ContextValue {
    fn from(n: f64) -> Self {
        ContextValue::Double(n)
    }
}

impl From<bool> for ContextValue {
    fn from(b: bool) -> Self {
        ContextValue::Boolean(b)
    }
}

/// A caller-defined aggregate: a registered tag plus its JSON payload.
///
/// The payload is plain JSON data; [`encode`](Self::encode) and
/// [`decode`](Self::decode) bridge to concrete serde types. The tag must be
/// registered with the serializer's [`TypeRegistry`](crate::TypeRegistry)
/// for documents containing it to decode.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomValue {
    tag: String,
    payload: serde_json::Value,
}

impl CustomValue {
    /// Wrap an already-built JSON payload under `tag`.
    pub fn new(tag: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            tag: tag.into(),
            payload,
        }
    }

    /// Encode a serde value as the payload for `tag`.
    pub fn encode<T: serde::Serialize>(tag: impl Into<String>, value: &T) -> Result<Self> {
        let payload = serde_json::to_value(value)?;
        Ok(Self {
            tag: tag.into(),
            payload,
        })
    }

    /// Decode the payload into a concrete serde type.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.payload.clone()).map_err(Error::from)
    }

    /// The registry tag this payload is stored under.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The raw JSON payload.
    #[must_use]
    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }
}

/// A locale identifier: language plus optional country and variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
    country: Option<String>,
    variant: Option<String>,
}

impl Locale {
    /// Language-only locale, e.g. `de`.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            country: None,
            variant: None,
        }
    }

    /// Language and country, e.g. `de_CH`.
    pub fn with_country(language: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            country: Some(country.into()),
            variant: None,
        }
    }

    /// Language, country and variant, e.g. `de_CH_1996`.
    pub fn with_variant(
        language: impl Into<String>,
        country: impl Into<String>,
        variant: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            country: Some(country.into()),
            variant: Some(variant.into()),
        }
    }

    /// Parse the `language[_COUNTRY[_variant]]` text form.
    ///
    /// A leading underscore or more than three components fails with
    /// [`Error::InvalidArgument`].
    pub fn parse(s: &str) -> Result<Self> {
        adapter::parse_locale(s)
    }

    /// The language component.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// The country component, if present.
    #[must_use]
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// The variant component, if present.
    #[must_use]
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&adapter::format_locale(self))
    }
}

/// An insertion-ordered snapshot of per-run state: string keys to
/// [`ContextValue`]s.
///
/// Duplicate keys are impossible by construction (inserting an existing key
/// replaces its value). Iteration order is insertion order, and
/// [`ContextSerializer::write`](crate::ContextSerializer::write) emits keys
/// in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionContext {
    entries: IndexMap<String, ContextValue>,
}

impl ExecutionContext {
    /// An empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, returning the previous value if the key
    /// existed. The key keeps its original insertion position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: ContextValue) -> Option<ContextValue> {
        self.entries.insert(key.into(), value)
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.entries.get(key)
    }

    /// Remove a key, returning its value if it was present. Preserves the
    /// order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<ContextValue> {
        self.entries.shift_remove(key)
    }

    /// `true` if the key exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when the context has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl FromIterator<(String, ContextValue)> for ExecutionContext {
    fn from_iter<I: IntoIterator<Item = (String, ContextValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ExecutionContext {
    type Item = (String, ContextValue);
    type IntoIter = indexmap::map::IntoIter<String, ContextValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Extend<(String, ContextValue)> for ExecutionContext {
    fn extend<I: IntoIterator<Item = (String, ContextValue)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}
