//! The envelope codec: the type-preserving layer over the JSON engine.
//!
//! Every top-level entry is wrapped in `{"@class": <tag>, "value": <payload>}`
//! with `@class` strictly first, so the decoder can resolve the kind before
//! the payload arrives and hand the payload to a kind-specific seed. Entries
//! stream through serde; the full document is never materialized.
//!
//! Collection payloads are the exception to type preservation: their elements
//! carry no tags and decode generically (string, long, double, boolean, null,
//! nested collection).

use crate::adapter;
use crate::convert::ConversionService;
use crate::error::{Error, ErrorSlot};
use crate::parameter::{ParameterSeed, ParameterSer, ParametersSeed, ParametersSer};
use crate::registry::{TypeKind, TypeRegistry};
use crate::value::{ContextValue, CustomValue, ExecutionContext};
use chrono::DateTime;
use indexmap::IndexMap;
use serde::de::{DeserializeSeed, MapAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

const CLASS_KEY: &str = "@class";
const VALUE_KEY: &str = "value";

// ---------------------------------------------------------------------------
// Write side
// ---------------------------------------------------------------------------

pub(crate) struct RootSer<'a> {
    pub(crate) context: &'a ExecutionContext,
    pub(crate) convert: &'a dyn ConversionService,
    pub(crate) slot: &'a ErrorSlot,
}

impl Serialize for RootSer<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.context.len()))?;
        for (key, value) in self.context.iter() {
            map.serialize_entry(
                key,
                &EnvelopeSer {
                    value,
                    convert: self.convert,
                    slot: self.slot,
                },
            )?;
        }
        map.end()
    }
}

struct EnvelopeSer<'a> {
    value: &'a ContextValue,
    convert: &'a dyn ConversionService,
    slot: &'a ErrorSlot,
}

impl Serialize for EnvelopeSer<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tag = self.value.type_tag().ok_or_else(|| {
            self.slot.park_ser(Error::InvalidArgument(
                "null has no envelope form".to_owned(),
            ))
        })?;
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(CLASS_KEY, tag)?;
        map.serialize_entry(
            VALUE_KEY,
            &PayloadSer {
                value: self.value,
                convert: self.convert,
                slot: self.slot,
            },
        )?;
        map.end()
    }
}

/// The natural JSON shape of a value, without the envelope. Also used for
/// collection elements, which is exactly why element types are not preserved.
struct PayloadSer<'a> {
    value: &'a ContextValue,
    convert: &'a dyn ConversionService,
    slot: &'a ErrorSlot,
}

impl Serialize for PayloadSer<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.value {
            ContextValue::Null => serializer.serialize_none(),
            ContextValue::String(s) => serializer.serialize_str(s),
            ContextValue::Boolean(b) => serializer.serialize_bool(*b),
            ContextValue::Byte(n) => serializer.serialize_i8(*n),
            ContextValue::Short(n) => serializer.serialize_i16(*n),
            ContextValue::Int(n) => serializer.serialize_i32(*n),
            ContextValue::Long(n) => serializer.serialize_i64(*n),
            ContextValue::Float(n) => serializer.serialize_f32(*n),
            ContextValue::Double(n) => serializer.serialize_f64(*n),
            ContextValue::BigInteger(digits) | ContextValue::BigDecimal(digits) => {
                let number: serde_json::Number = serde_json::from_str(digits).map_err(|e| {
                    self.slot
                        .park_ser(Error::Conversion(format!("bad number literal {digits:?}: {e}")))
                })?;
                number.serialize(serializer)
            }
            ContextValue::Date(millis) => serializer.serialize_i64(*millis),
            ContextValue::SqlDate(d) => serializer.serialize_str(&adapter::format_sql_date(d)),
            ContextValue::SqlTime(t) => serializer.serialize_str(&adapter::format_sql_time(t)),
            ContextValue::SqlTimestamp(ts) => {
                serializer.serialize_str(&adapter::format_sql_timestamp(ts))
            }
            ContextValue::LocalDate(d) => serializer.serialize_str(&adapter::format_sql_date(d)),
            ContextValue::LocalTime(t) => serializer.serialize_str(&adapter::format_local_time(t)),
            ContextValue::LocalDateTime(ts) => {
                serializer.serialize_str(&adapter::format_local_date_time(ts))
            }
            ContextValue::OffsetDateTime(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            ContextValue::ZonedDateTime(s)
            | ContextValue::Duration(s)
            | ContextValue::Period(s)
            | ContextValue::Url(s)
            | ContextValue::Uri(s) => serializer.serialize_str(s),
            ContextValue::Locale(locale) => {
                serializer.serialize_str(&adapter::format_locale(locale))
            }
            ContextValue::Parameter(param) => ParameterSer {
                param,
                convert: self.convert,
                slot: self.slot,
            }
            .serialize(serializer),
            ContextValue::Parameters(params) => ParametersSer {
                params,
                convert: self.convert,
                slot: self.slot,
            }
            .serialize(serializer),
            ContextValue::List(items) | ContextValue::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&PayloadSer {
                        value: item,
                        convert: self.convert,
                        slot: self.slot,
                    })?;
                }
                seq.end()
            }
            ContextValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, item) in entries {
                    map.serialize_entry(
                        key,
                        &PayloadSer {
                            value: item,
                            convert: self.convert,
                            slot: self.slot,
                        },
                    )?;
                }
                map.end()
            }
            ContextValue::Custom(custom) => custom.payload().serialize(serializer),
        }
    }
}

// ---------------------------------------------------------------------------
// Read side
// ---------------------------------------------------------------------------

pub(crate) struct RootSeed<'a> {
    pub(crate) registry: &'a TypeRegistry,
    pub(crate) convert: &'a dyn ConversionService,
    pub(crate) slot: &'a ErrorSlot,
}

impl<'de> DeserializeSeed<'de> for RootSeed<'_> {
    type Value = ExecutionContext;

    fn deserialize<D: serde::Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for RootSeed<'_> {
    type Value = ExecutionContext;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("an execution context document")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut context = ExecutionContext::new();
        while let Some(key) = map.next_key::<String>()? {
            let value = map.next_value_seed(EnvelopeSeed {
                registry: self.registry,
                convert: self.convert,
                slot: self.slot,
            })?;
            context.insert(key, value);
        }
        Ok(context)
    }
}

struct EnvelopeSeed<'a> {
    registry: &'a TypeRegistry,
    convert: &'a dyn ConversionService,
    slot: &'a ErrorSlot,
}

impl<'de> DeserializeSeed<'de> for EnvelopeSeed<'_> {
    type Value = ContextValue;

    fn deserialize<D: serde::Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for EnvelopeSeed<'_> {
    type Value = ContextValue;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("an envelope object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        // "@class" must come first, the payload cannot be decoded without it.
        match map.next_key::<String>()? {
            Some(key) if key == CLASS_KEY => {}
            Some(key) => {
                return Err(self.slot.park_de(Error::Schema(format!(
                    "envelope must start with {CLASS_KEY:?}, found {key:?}"
                ))));
            }
            None => {
                return Err(self
                    .slot
                    .park_de(Error::Schema(format!("envelope is missing {CLASS_KEY:?}"))));
            }
        }
        let tag: String = map.next_value()?;
        let kind = self
            .registry
            .resolve(&tag)
            .map_err(|e| self.slot.park_de(e))?;

        match map.next_key::<String>()? {
            Some(key) if key == VALUE_KEY => {}
            Some(key) => {
                return Err(self.slot.park_de(Error::Schema(format!(
                    "unexpected envelope key: {key:?}"
                ))));
            }
            None => {
                return Err(self
                    .slot
                    .park_de(Error::Schema(format!("envelope is missing {VALUE_KEY:?}"))));
            }
        }
        let value = map.next_value_seed(PayloadSeed {
            kind,
            tag: &tag,
            registry: self.registry,
            convert: self.convert,
            slot: self.slot,
        })?;

        if let Some(extra) = map.next_key::<String>()? {
            return Err(self.slot.park_de(Error::Schema(format!(
                "unexpected envelope key: {extra:?}"
            ))));
        }
        Ok(value)
    }
}

/// Decodes a payload at the kind its envelope announced.
struct PayloadSeed<'a> {
    kind: TypeKind,
    tag: &'a str,
    registry: &'a TypeRegistry,
    convert: &'a dyn ConversionService,
    slot: &'a ErrorSlot,
}

impl<'de> DeserializeSeed<'de> for PayloadSeed<'_> {
    type Value = ContextValue;

    fn deserialize<D: serde::Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Self::Value, D::Error> {
        let slot = self.slot;
        match self.kind {
            TypeKind::String => String::deserialize(deserializer).map(ContextValue::String),
            TypeKind::Boolean => bool::deserialize(deserializer).map(ContextValue::Boolean),
            TypeKind::Byte => i8::deserialize(deserializer).map(ContextValue::Byte),
            TypeKind::Short => i16::deserialize(deserializer).map(ContextValue::Short),
            TypeKind::Int => i32::deserialize(deserializer).map(ContextValue::Int),
            TypeKind::Long => i64::deserialize(deserializer).map(ContextValue::Long),
            TypeKind::Float => f32::deserialize(deserializer).map(ContextValue::Float),
            TypeKind::Double => f64::deserialize(deserializer).map(ContextValue::Double),
            TypeKind::BigInteger => {
                let number = serde_json::Number::deserialize(deserializer)?;
                let literal = number.to_string();
                let digits = literal.strip_prefix('-').unwrap_or(&literal);
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(slot.park_de(Error::Schema(format!(
                        "{literal} is not an integer"
                    ))));
                }
                Ok(ContextValue::BigInteger(literal))
            }
            TypeKind::BigDecimal => {
                let number = serde_json::Number::deserialize(deserializer)?;
                Ok(ContextValue::BigDecimal(number.to_string()))
            }
            TypeKind::Date => i64::deserialize(deserializer).map(ContextValue::Date),
            TypeKind::SqlDate => {
                let text = String::deserialize(deserializer)?;
                adapter::parse_sql_date(&text)
                    .map(ContextValue::SqlDate)
                    .map_err(|e| slot.park_de(e))
            }
            TypeKind::SqlTime => {
                let text = String::deserialize(deserializer)?;
                adapter::parse_sql_time(&text)
                    .map(ContextValue::SqlTime)
                    .map_err(|e| slot.park_de(e))
            }
            TypeKind::SqlTimestamp => {
                let text = String::deserialize(deserializer)?;
                adapter::parse_sql_timestamp(&text)
                    .map(ContextValue::SqlTimestamp)
                    .map_err(|e| slot.park_de(e))
            }
            TypeKind::LocalDate => {
                let text = String::deserialize(deserializer)?;
                adapter::parse_sql_date(&text)
                    .map(ContextValue::LocalDate)
                    .map_err(|e| slot.park_de(e))
            }
            TypeKind::LocalTime => {
                let text = String::deserialize(deserializer)?;
                adapter::parse_local_time(&text)
                    .map(ContextValue::LocalTime)
                    .map_err(|e| slot.park_de(e))
            }
            TypeKind::LocalDateTime => {
                let text = String::deserialize(deserializer)?;
                adapter::parse_local_date_time(&text)
                    .map(ContextValue::LocalDateTime)
                    .map_err(|e| slot.park_de(e))
            }
            TypeKind::OffsetDateTime => {
                let text = String::deserialize(deserializer)?;
                DateTime::parse_from_rfc3339(&text)
                    .map(ContextValue::OffsetDateTime)
                    .map_err(|e| {
                        slot.park_de(Error::Schema(format!(
                            "invalid offset date-time {text:?}: {e}"
                        )))
                    })
            }
            TypeKind::ZonedDateTime => {
                String::deserialize(deserializer).map(ContextValue::ZonedDateTime)
            }
            TypeKind::Duration => {
                let text = String::deserialize(deserializer)?;
                adapter::check_iso_8601_prefix(&text).map_err(|e| slot.park_de(e))?;
                Ok(ContextValue::Duration(text))
            }
            TypeKind::Period => {
                let text = String::deserialize(deserializer)?;
                adapter::check_iso_8601_prefix(&text).map_err(|e| slot.park_de(e))?;
                Ok(ContextValue::Period(text))
            }
            TypeKind::Url => String::deserialize(deserializer).map(ContextValue::Url),
            TypeKind::Uri => String::deserialize(deserializer).map(ContextValue::Uri),
            TypeKind::Locale => {
                let text = String::deserialize(deserializer)?;
                adapter::parse_locale(&text)
                    .map(ContextValue::Locale)
                    .map_err(|e| slot.park_de(e))
            }
            TypeKind::Parameter => ParameterSeed {
                registry: self.registry,
                convert: self.convert,
                slot,
            }
            .deserialize(deserializer)
            .map(ContextValue::Parameter),
            TypeKind::Parameters => ParametersSeed {
                registry: self.registry,
                convert: self.convert,
                slot,
            }
            .deserialize(deserializer)
            .map(ContextValue::Parameters),
            TypeKind::List | TypeKind::Set => {
                let raw = serde_json::Value::deserialize(deserializer)?;
                let serde_json::Value::Array(items) = raw else {
                    return Err(slot.park_de(Error::Schema(format!(
                        "expected array payload for {}", self.tag
                    ))));
                };
                let items = items.into_iter().map(generic_value).collect();
                Ok(if self.kind == TypeKind::Set {
                    ContextValue::Set(items)
                } else {
                    ContextValue::List(items)
                })
            }
            TypeKind::Map => {
                let raw = serde_json::Value::deserialize(deserializer)?;
                let serde_json::Value::Object(entries) = raw else {
                    return Err(slot.park_de(Error::Schema(format!(
                        "expected object payload for {}", self.tag
                    ))));
                };
                Ok(ContextValue::Map(generic_map(entries)))
            }
            _ => {
                let payload = serde_json::Value::deserialize(deserializer)?;
                Ok(ContextValue::Custom(CustomValue::new(self.tag, payload)))
            }
        }
    }
}

/// Decode a tagless JSON value the way the original decoded generic objects:
/// integral numbers become longs, everything else keeps its JSON shape.
fn generic_value(value: serde_json::Value) -> ContextValue {
    match value {
        serde_json::Value::Null => ContextValue::Null,
        serde_json::Value::Bool(b) => ContextValue::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => ContextValue::Long(i),
            None => match n.as_f64() {
                Some(f) => ContextValue::Double(f),
                None => ContextValue::BigDecimal(n.to_string()),
            },
        },
        serde_json::Value::String(s) => ContextValue::String(s),
        serde_json::Value::Array(items) => {
            ContextValue::List(items.into_iter().map(generic_value).collect())
        }
        serde_json::Value::Object(entries) => ContextValue::Map(generic_map(entries)),
    }
}

fn generic_map(entries: serde_json::Map<String, serde_json::Value>) -> IndexMap<String, ContextValue> {
    entries
        .into_iter()
        .map(|(k, v)| (k, generic_value(v)))
        .collect()
}
