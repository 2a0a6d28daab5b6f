//! Job parameter records and their wire codec.
//!
//! A parameter serializes as `{"type": t, "value": v, "identifying": b}`.
//! Two wire variants exist: the current form where `type` is a qualified tag
//! and `value` is coerced through the conversion service, and a legacy
//! read-only form where `type` is one of `STRING`, `DATE`, `LONG`, `DOUBLE`.
//! Writes always produce the current form.

use crate::convert::{ConversionService, RawScalar};
use crate::error::{Error, ErrorSlot, Result};
use crate::registry::TypeRegistry;
use indexmap::IndexMap;
use serde::de::{DeserializeSeed, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

const TYPE_KEY: &str = "type";
const VALUE_KEY: &str = "value";
const IDENTIFYING_KEY: &str = "identifying";

/// The scalar payload of a [`JobParameter`].
///
/// Narrower than [`ContextValue`](crate::ContextValue): parameters carry
/// scalars only, with the declared type recorded separately in the record's
/// type tag. Integer widths below 64 bits collapse into [`Long`]; the tag
/// preserves the declared width.
///
/// [`Long`]: Self::Long
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ParameterValue {
    /// Absent value.
    Null,
    /// String payload.
    String(String),
    /// Integral payload.
    Long(i64),
    /// Floating-point payload.
    Double(f64),
    /// Boolean payload.
    Boolean(bool),
    /// Instant payload as milliseconds since the Unix epoch.
    Date(i64),
    /// Arbitrary-precision integer, kept as its digit string.
    BigInteger(String),
    /// Arbitrary-precision decimal, kept as its literal digit string.
    BigDecimal(String),
}

/// A single job parameter: a declared type tag, a scalar value, and whether
/// the parameter contributes to instance identity.
#[derive(Debug, Clone, PartialEq)]
pub struct JobParameter {
    type_name: String,
    value: ParameterValue,
    identifying: bool,
}

impl JobParameter {
    /// Build a parameter from its parts. `type_name` is a registry tag; the
    /// built-in scalar tags (`java.lang.String`, `java.lang.Long`, …) resolve
    /// out of the box, custom tags need a conversion service that knows them.
    pub fn new(
        type_name: impl Into<String>,
        value: ParameterValue,
        identifying: bool,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            value,
            identifying,
        }
    }

    /// A string parameter.
    pub fn string(value: impl Into<String>, identifying: bool) -> Self {
        Self::new(
            "java.lang.String",
            ParameterValue::String(value.into()),
            identifying,
        )
    }

    /// A 64-bit integer parameter.
    #[must_use]
    pub fn long(value: i64, identifying: bool) -> Self {
        Self::new("java.lang.Long", ParameterValue::Long(value), identifying)
    }

    /// A 64-bit float parameter.
    #[must_use]
    pub fn double(value: f64, identifying: bool) -> Self {
        Self::new(
            "java.lang.Double",
            ParameterValue::Double(value),
            identifying,
        )
    }

    /// A date parameter from epoch milliseconds.
    #[must_use]
    pub fn date(epoch_millis: i64, identifying: bool) -> Self {
        Self::new(
            "java.util.Date",
            ParameterValue::Date(epoch_millis),
            identifying,
        )
    }

    /// The declared type tag.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The scalar value.
    #[must_use]
    pub fn value(&self) -> &ParameterValue {
        &self.value
    }

    /// Whether this parameter contributes to instance identity.
    #[must_use]
    pub fn is_identifying(&self) -> bool {
        self.identifying
    }
}

/// The job parameters aggregate: an insertion-ordered mapping from parameter
/// name to [`JobParameter`]. Flattens to a plain JSON object on the wire with
/// no extra framing; empty aggregates round-trip to `{}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobParameters {
    params: IndexMap<String, JobParameter>,
}

impl JobParameters {
    /// An empty aggregate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, replacing any existing one of the same name.
    pub fn insert(&mut self, name: impl Into<String>, parameter: JobParameter) {
        self.params.insert(name.into(), parameter);
    }

    /// Look up a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&JobParameter> {
        self.params.get(name)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// `true` when the aggregate holds no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterate parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &JobParameter)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, JobParameter)> for JobParameters {
    fn from_iter<I: IntoIterator<Item = (String, JobParameter)>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for JobParameters {
    type Item = (String, JobParameter);
    type IntoIter = indexmap::map::IntoIter<String, JobParameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.into_iter()
    }
}

// ---------------------------------------------------------------------------
// Wire codec
// ---------------------------------------------------------------------------

/// Legacy closed-enum type tags, kept readable for historical documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LegacyTag {
    String,
    Date,
    Long,
    Double,
}

impl LegacyTag {
    fn of(tag: &str) -> Option<(Self, &'static str)> {
        match tag {
            "STRING" => Some((LegacyTag::String, "java.lang.String")),
            "DATE" => Some((LegacyTag::Date, "java.util.Date")),
            "LONG" => Some((LegacyTag::Long, "java.lang.Long")),
            "DOUBLE" => Some((LegacyTag::Double, "java.lang.Double")),
            _ => None,
        }
    }

    /// Legacy payloads have fixed shapes: STRING→string, LONG→integer,
    /// DOUBLE→number, DATE→epoch-millis number. Null stays null.
    fn decode(self, raw: RawScalar) -> Result<ParameterValue> {
        match (self, raw) {
            (_, RawScalar::Null) => Ok(ParameterValue::Null),
            (LegacyTag::String, RawScalar::Text(s)) => Ok(ParameterValue::String(s)),
            (LegacyTag::Long, RawScalar::Number(n)) => n
                .as_i64()
                .map(ParameterValue::Long)
                .ok_or_else(|| Error::Schema(format!("expected integer LONG value, got {n}"))),
            (LegacyTag::Double, RawScalar::Number(n)) => n
                .as_f64()
                .map(ParameterValue::Double)
                .ok_or_else(|| Error::Schema(format!("expected numeric DOUBLE value, got {n}"))),
            (LegacyTag::Date, RawScalar::Number(n)) => n
                .as_i64()
                .map(ParameterValue::Date)
                .ok_or_else(|| Error::Schema(format!("expected epoch-millis DATE value, got {n}"))),
            (tag, raw) => Err(Error::Schema(format!(
                "wrong payload shape for legacy {tag:?} parameter: {}",
                raw.describe()
            ))),
        }
    }
}

pub(crate) struct ParameterSer<'a> {
    pub(crate) param: &'a JobParameter,
    pub(crate) convert: &'a dyn ConversionService,
    pub(crate) slot: &'a ErrorSlot,
}

impl Serialize for ParameterSer<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(TYPE_KEY, self.param.type_name())?;
        map.serialize_entry(
            VALUE_KEY,
            &ValueSer {
                value: self.param.value(),
                convert: self.convert,
                slot: self.slot,
            },
        )?;
        map.serialize_entry(IDENTIFYING_KEY, &self.param.is_identifying())?;
        map.end()
    }
}

/// Recognized scalars emit their natural JSON shape; dates and anything else
/// go through the conversion service to a string.
struct ValueSer<'a> {
    value: &'a ParameterValue,
    convert: &'a dyn ConversionService,
    slot: &'a ErrorSlot,
}

impl Serialize for ValueSer<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.value {
            ParameterValue::Null => serializer.serialize_none(),
            ParameterValue::String(s) => serializer.serialize_str(s),
            ParameterValue::Long(n) => serializer.serialize_i64(*n),
            ParameterValue::Double(n) => serializer.serialize_f64(*n),
            ParameterValue::Boolean(b) => serializer.serialize_bool(*b),
            ParameterValue::BigInteger(digits) | ParameterValue::BigDecimal(digits) => {
                let number: serde_json::Number = serde_json::from_str(digits).map_err(|e| {
                    self.slot
                        .park_ser(Error::Conversion(format!("bad number literal {digits:?}: {e}")))
                })?;
                number.serialize(serializer)
            }
            value @ ParameterValue::Date(_) => {
                let text = self
                    .convert
                    .to_text(value)
                    .map_err(|e| self.slot.park_ser(e))?;
                serializer.serialize_str(&text)
            }
        }
    }
}

pub(crate) struct ParameterSeed<'a> {
    pub(crate) registry: &'a TypeRegistry,
    pub(crate) convert: &'a dyn ConversionService,
    pub(crate) slot: &'a ErrorSlot,
}

impl<'de> DeserializeSeed<'de> for ParameterSeed<'_> {
    type Value = JobParameter;

    fn deserialize<D: serde::Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<Self::Value, D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for ParameterSeed<'_> {
    type Value = JobParameter;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a job parameter object")
    }

    fn visit_map<A: MapAccess<'de>>(
        self,
        mut map: A,
    ) -> std::result::Result<Self::Value, A::Error> {
        let mut target: Option<(String, Option<LegacyTag>)> = None;
        let mut value: Option<ParameterValue> = None;
        let mut identifying: Option<bool> = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                TYPE_KEY => {
                    let tag: String = map.next_value()?;
                    target = Some(
                        self.resolve_type(tag)
                            .map_err(|e| self.slot.park_de(e))?,
                    );
                }
                VALUE_KEY => {
                    // One-pass decode: the target type drives coercion, so a
                    // document placing "value" ahead of "type" is rejected.
                    let Some((type_name, legacy)) = &target else {
                        return Err(self.slot.park_de(Error::Schema(
                            "parameter \"value\" arrived before \"type\"".to_owned(),
                        )));
                    };
                    let raw: serde_json::Value = map.next_value()?;
                    let raw = RawScalar::from_json(raw).map_err(|e| self.slot.park_de(e))?;
                    let decoded = match legacy {
                        Some(tag) => tag.decode(raw),
                        None => self.convert.coerce(raw, type_name),
                    };
                    value = Some(decoded.map_err(|e| self.slot.park_de(e))?);
                }
                IDENTIFYING_KEY => {
                    let raw: serde_json::Value = map.next_value()?;
                    match raw {
                        serde_json::Value::Bool(b) => identifying = Some(b),
                        other => {
                            return Err(self.slot.park_de(Error::Schema(format!(
                                "expected boolean for \"identifying\", got {other}"
                            ))));
                        }
                    }
                }
                other => {
                    return Err(self.slot.park_de(Error::Schema(format!(
                        "unexpected parameter key: {other:?}"
                    ))));
                }
            }
        }

        let (type_name, _) = target.ok_or_else(|| {
            self.slot
                .park_de(Error::Schema("parameter object is missing \"type\"".to_owned()))
        })?;
        Ok(JobParameter::new(
            type_name,
            value.unwrap_or(ParameterValue::Null),
            identifying.unwrap_or(true),
        ))
    }
}

impl ParameterSeed<'_> {
    fn resolve_type(&self, tag: String) -> Result<(String, Option<LegacyTag>)> {
        if let Some((legacy, canonical)) = LegacyTag::of(&tag) {
            return Ok((canonical.to_owned(), Some(legacy)));
        }
        if self.registry.resolve(&tag).is_ok() {
            return Ok((tag, None));
        }
        // An unresolved dotless all-caps tag reads as a botched legacy enum
        // constant rather than a type name.
        if !tag.contains('.') && tag.chars().all(|c| c.is_ascii_uppercase() || c == '_') {
            Err(Error::Schema(format!("unknown parameter type tag: {tag:?}")))
        } else {
            Err(Error::ClassNotFound(tag))
        }
    }
}

/// Flattens the aggregate to `name → parameter record`.
pub(crate) struct ParametersSer<'a> {
    pub(crate) params: &'a JobParameters,
    pub(crate) convert: &'a dyn ConversionService,
    pub(crate) slot: &'a ErrorSlot,
}

impl Serialize for ParametersSer<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.params.len()))?;
        for (name, param) in self.params.iter() {
            map.serialize_entry(
                name,
                &ParameterSer {
                    param,
                    convert: self.convert,
                    slot: self.slot,
                },
            )?;
        }
        map.end()
    }
}

pub(crate) struct ParametersSeed<'a> {
    pub(crate) registry: &'a TypeRegistry,
    pub(crate) convert: &'a dyn ConversionService,
    pub(crate) slot: &'a ErrorSlot,
}

impl<'de> DeserializeSeed<'de> for ParametersSeed<'_> {
    type Value = JobParameters;

    fn deserialize<D: serde::Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<Self::Value, D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for ParametersSeed<'_> {
    type Value = JobParameters;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a job parameters object")
    }

    fn visit_map<A: MapAccess<'de>>(
        self,
        mut map: A,
    ) -> std::result::Result<Self::Value, A::Error> {
        let mut params = JobParameters::new();
        while let Some(name) = map.next_key::<String>()? {
            let param = map.next_value_seed(ParameterSeed {
                registry: self.registry,
                convert: self.convert,
                slot: self.slot,
            })?;
            params.insert(name, param);
        }
        Ok(params)
    }
}
