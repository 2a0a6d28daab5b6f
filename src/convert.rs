//! The pluggable conversion service: scalar coercion between wire tokens and
//! typed parameter values.
//!
//! Implement [`ConversionService`] to teach the codec about parameter types
//! of your own; [`DefaultConversionService`] covers the built-in scalar tags.

use crate::error::{Error, Result};
use crate::parameter::ParameterValue;

/// A raw JSON scalar as it appears on the wire, before coercion.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum RawScalar {
    /// JSON null.
    Null,
    /// JSON true/false.
    Bool(bool),
    /// JSON number with its exact digits preserved.
    Number(serde_json::Number),
    /// JSON string.
    Text(String),
}

impl RawScalar {
    /// Classify a decoded JSON value; arrays and objects are not scalars and
    /// fail with a schema error.
    pub(crate) fn from_json(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Null => Ok(RawScalar::Null),
            serde_json::Value::Bool(b) => Ok(RawScalar::Bool(b)),
            serde_json::Value::Number(n) => Ok(RawScalar::Number(n)),
            serde_json::Value::String(s) => Ok(RawScalar::Text(s)),
            serde_json::Value::Array(_) => {
                Err(Error::Schema("expected scalar parameter value, got array".to_owned()))
            }
            serde_json::Value::Object(_) => {
                Err(Error::Schema("expected scalar parameter value, got object".to_owned()))
            }
        }
    }

    /// Short token name for error messages.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            RawScalar::Null => "null",
            RawScalar::Bool(_) => "boolean",
            RawScalar::Number(_) => "number",
            RawScalar::Text(_) => "string",
        }
    }
}

/// Coerces wire scalars to typed parameter values and back.
///
/// The codec calls [`coerce`](Self::coerce) when decoding the current
/// parameter wire variant, and [`to_text`](Self::to_text) when a value has no
/// natural JSON scalar shape (dates, custom types). Implementations hold no
/// per-operation state and are shared across threads.
pub trait ConversionService: Send + Sync {
    /// Coerce a raw scalar to the value of the `target` type tag.
    fn coerce(&self, raw: RawScalar, target: &str) -> Result<ParameterValue>;

    /// Render a value as the string emitted on the wire.
    fn to_text(&self, value: &ParameterValue) -> Result<String>;
}

/// Default conversions for the built-in scalar tags: boxed integers and
/// floats, booleans, strings, big numbers, and epoch-millis dates.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConversionService;

impl DefaultConversionService {
    /// A fresh instance; the service is stateless.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn integral(raw: RawScalar, target: &str) -> Result<i64> {
        let n = match raw {
            RawScalar::Number(n) => n
                .as_i64()
                .ok_or_else(|| Error::Conversion(format!("{n} is not an integer")))?,
            RawScalar::Text(s) => s
                .parse::<i64>()
                .map_err(|e| Error::Conversion(format!("cannot parse {s:?} as integer: {e}")))?,
            other => {
                return Err(Error::Conversion(format!(
                    "cannot convert {} to {target}",
                    other.describe()
                )));
            }
        };
        let (lo, hi) = match target {
            "java.lang.Byte" => (i64::from(i8::MIN), i64::from(i8::MAX)),
            "java.lang.Short" => (i64::from(i16::MIN), i64::from(i16::MAX)),
            "java.lang.Integer" => (i64::from(i32::MIN), i64::from(i32::MAX)),
            _ => (i64::MIN, i64::MAX),
        };
        if n < lo || n > hi {
            return Err(Error::Conversion(format!("{n} is out of range for {target}")));
        }
        Ok(n)
    }

    fn floating(raw: RawScalar, target: &str) -> Result<f64> {
        match raw {
            RawScalar::Number(n) => n
                .as_f64()
                .ok_or_else(|| Error::Conversion(format!("{n} is not representable as {target}"))),
            RawScalar::Text(s) => s
                .parse::<f64>()
                .map_err(|e| Error::Conversion(format!("cannot parse {s:?} as {target}: {e}"))),
            other => Err(Error::Conversion(format!(
                "cannot convert {} to {target}",
                other.describe()
            ))),
        }
    }

    fn number_literal(raw: RawScalar, target: &str, integral_only: bool) -> Result<String> {
        let literal = match raw {
            RawScalar::Number(n) => n.to_string(),
            RawScalar::Text(s) => s,
            other => {
                return Err(Error::Conversion(format!(
                    "cannot convert {} to {target}",
                    other.describe()
                )));
            }
        };
        let digits = literal
            .strip_prefix('-')
            .or_else(|| literal.strip_prefix('+'))
            .unwrap_or(&literal);
        let valid = if integral_only {
            !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
        } else {
            serde_json::from_str::<serde_json::Number>(&literal).is_ok()
        };
        if !valid {
            return Err(Error::Conversion(format!(
                "{literal:?} is not a valid {target} literal"
            )));
        }
        Ok(literal)
    }
}

impl ConversionService for DefaultConversionService {
    fn coerce(&self, raw: RawScalar, target: &str) -> Result<ParameterValue> {
        if raw == RawScalar::Null {
            return Ok(ParameterValue::Null);
        }
        match target {
            "java.lang.String" => Ok(ParameterValue::String(match raw {
                RawScalar::Text(s) => s,
                RawScalar::Number(n) => n.to_string(),
                RawScalar::Bool(b) => b.to_string(),
                RawScalar::Null => unreachable!("null handled above"),
            })),
            "java.lang.Byte" | "java.lang.Short" | "java.lang.Integer" | "java.lang.Long" => {
                Self::integral(raw, target).map(ParameterValue::Long)
            }
            "java.lang.Float" | "java.lang.Double" => {
                Self::floating(raw, target).map(ParameterValue::Double)
            }
            "java.lang.Boolean" => match raw {
                RawScalar::Bool(b) => Ok(ParameterValue::Boolean(b)),
                RawScalar::Text(s) => match s.as_str() {
                    "true" => Ok(ParameterValue::Boolean(true)),
                    "false" => Ok(ParameterValue::Boolean(false)),
                    _ => Err(Error::Conversion(format!("cannot parse {s:?} as boolean"))),
                },
                other => Err(Error::Conversion(format!(
                    "cannot convert {} to java.lang.Boolean",
                    other.describe()
                ))),
            },
            "java.math.BigInteger" => {
                Self::number_literal(raw, target, true).map(ParameterValue::BigInteger)
            }
            "java.math.BigDecimal" => {
                Self::number_literal(raw, target, false).map(ParameterValue::BigDecimal)
            }
            "java.util.Date" => Self::integral(raw, target).map(ParameterValue::Date),
            _ => Err(Error::Conversion(format!(
                "no converter from {} to {target}",
                raw.describe()
            ))),
        }
    }

    fn to_text(&self, value: &ParameterValue) -> Result<String> {
        match value {
            ParameterValue::String(s) => Ok(s.clone()),
            ParameterValue::Long(n) => Ok(n.to_string()),
            ParameterValue::Double(n) => Ok(n.to_string()),
            ParameterValue::Boolean(b) => Ok(b.to_string()),
            ParameterValue::Date(millis) => Ok(millis.to_string()),
            ParameterValue::BigInteger(digits) | ParameterValue::BigDecimal(digits) => {
                Ok(digits.clone())
            }
            ParameterValue::Null => {
                Err(Error::Conversion("cannot render a null parameter value".to_owned()))
            }
        }
    }
}
