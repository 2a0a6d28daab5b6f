//! Fail-closed tag resolution for envelope decoding.
//!
//! Lookup order: platform table, framework table, caller registrations.
//! There is no ambient fallback; an unregistered tag is a
//! [`ClassNotFound`](crate::Error::ClassNotFound) error.

use crate::error::{Error, Result};
use std::collections::HashSet;

/// The decoded kind a wire tag resolves to. Drives payload decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TypeKind {
    /// UTF-8 string.
    String,
    /// Boolean.
    Boolean,
    /// 8-bit signed integer.
    Byte,
    /// 16-bit signed integer.
    Short,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Arbitrary-precision integer.
    BigInteger,
    /// Arbitrary-precision decimal.
    BigDecimal,
    /// Epoch-millis instant.
    Date,
    /// Calendar date, `yyyy-MM-dd`.
    SqlDate,
    /// Wall-clock time, `HH:mm:ss`.
    SqlTime,
    /// Nanosecond-precision date-time, `yyyy-MM-dd HH:mm:ss.fffffffff`.
    SqlTimestamp,
    /// ISO local date.
    LocalDate,
    /// ISO local time.
    LocalTime,
    /// ISO local date-time.
    LocalDateTime,
    /// ISO date-time with offset.
    OffsetDateTime,
    /// Zoned date-time, verbatim text.
    ZonedDateTime,
    /// ISO-8601 duration text.
    Duration,
    /// ISO-8601 period text.
    Period,
    /// URL text.
    Url,
    /// URI text.
    Uri,
    /// Locale text.
    Locale,
    /// Job parameter record.
    Parameter,
    /// Job parameters aggregate.
    Parameters,
    /// Ordered sequence.
    List,
    /// Set.
    Set,
    /// Nested string-keyed mapping.
    Map,
    /// Caller-registered aggregate; the payload stays generic JSON.
    Custom,
}

/// Platform tags. Collection entries accept the abstract interface, the
/// common public implementations, and the non-public variants library
/// factories hand out; writes only ever emit the canonical public
/// implementation tag.
fn platform_kind(tag: &str) -> Option<TypeKind> {
    Some(match tag {
        "java.lang.String" => TypeKind::String,
        "java.lang.Boolean" => TypeKind::Boolean,
        "java.lang.Byte" => TypeKind::Byte,
        "java.lang.Short" => TypeKind::Short,
        "java.lang.Integer" => TypeKind::Int,
        "java.lang.Long" => TypeKind::Long,
        "java.lang.Float" => TypeKind::Float,
        "java.lang.Double" => TypeKind::Double,
        "java.math.BigInteger" => TypeKind::BigInteger,
        "java.math.BigDecimal" => TypeKind::BigDecimal,

        "java.util.Date" => TypeKind::Date,
        "java.util.Locale" => TypeKind::Locale,
        "java.net.URL" => TypeKind::Url,
        "java.net.URI" => TypeKind::Uri,

        "java.sql.Date" => TypeKind::SqlDate,
        "java.sql.Time" => TypeKind::SqlTime,
        "java.sql.Timestamp" => TypeKind::SqlTimestamp,

        "java.time.LocalDate" => TypeKind::LocalDate,
        "java.time.LocalTime" => TypeKind::LocalTime,
        "java.time.LocalDateTime" => TypeKind::LocalDateTime,
        "java.time.OffsetDateTime" => TypeKind::OffsetDateTime,
        "java.time.ZonedDateTime" => TypeKind::ZonedDateTime,
        "java.time.Duration" => TypeKind::Duration,
        "java.time.Period" => TypeKind::Period,

        "java.util.List"
        | "java.util.ArrayList"
        | "java.util.LinkedList"
        | "java.util.Arrays$ArrayList"
        | "java.util.Collections$SingletonList"
        | "java.util.Collections$UnmodifiableList"
        | "java.util.Collections$UnmodifiableRandomAccessList"
        | "java.util.Collections$EmptyList"
        | "java.util.ImmutableCollections$List12"
        | "java.util.ImmutableCollections$ListN" => TypeKind::List,

        "java.util.Set"
        | "java.util.HashSet"
        | "java.util.LinkedHashSet"
        | "java.util.TreeSet"
        | "java.util.Collections$SingletonSet"
        | "java.util.Collections$UnmodifiableSet"
        | "java.util.Collections$EmptySet"
        | "java.util.ImmutableCollections$Set12"
        | "java.util.ImmutableCollections$SetN" => TypeKind::Set,

        "java.util.Map"
        | "java.util.HashMap"
        | "java.util.LinkedHashMap"
        | "java.util.TreeMap"
        | "java.util.Collections$SingletonMap"
        | "java.util.Collections$UnmodifiableMap"
        | "java.util.Collections$EmptyMap"
        | "java.util.ImmutableCollections$Map1"
        | "java.util.ImmutableCollections$MapN" => TypeKind::Map,

        _ => return None,
    })
}

fn framework_kind(tag: &str) -> Option<TypeKind> {
    match tag {
        "org.springframework.batch.core.JobParameter" => Some(TypeKind::Parameter),
        "org.springframework.batch.core.JobParameters" => Some(TypeKind::Parameters),
        _ => None,
    }
}

/// Maps wire tags to decodable kinds.
///
/// The built-in tables cover the platform and framework tags; callers add
/// their own aggregate tags with [`register`](Self::register). Resolution
/// fails closed: a tag no table knows cannot be decoded.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    custom: HashSet<String>,
}

impl TypeRegistry {
    /// A registry with the built-in tables and no custom tags.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom aggregate tag. Payloads under this tag decode as
    /// generic JSON wrapped in [`CustomValue`](crate::CustomValue). Built-in
    /// tags shadow custom registrations.
    pub fn register(&mut self, tag: impl Into<String>) -> &mut Self {
        self.custom.insert(tag.into());
        self
    }

    /// `true` if `tag` resolves, through any table.
    #[must_use]
    pub fn is_registered(&self, tag: &str) -> bool {
        self.resolve(tag).is_ok()
    }

    /// Resolve a wire tag: platform table, then framework table, then custom
    /// registrations.
    pub fn resolve(&self, tag: &str) -> Result<TypeKind> {
        platform_kind(tag)
            .or_else(|| framework_kind(tag))
            .or_else(|| self.custom.contains(tag).then_some(TypeKind::Custom))
            .ok_or_else(|| Error::ClassNotFound(tag.to_owned()))
    }
}
