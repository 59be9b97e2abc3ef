//! Default adapter - one native scalar argument

use super::{describe_arg, first_arg, OscAdapter};
use crate::error::AdapterError;
use crate::value::{Value, ValueType};
use rosc::{OscMessage, OscType};
use std::path::PathBuf;

/// Catch-all adapter: the value becomes a single OSC argument of its own type
///
/// Decoding builds the target type from the first argument, coercing between
/// numeric kinds, booleans and strings the way a dynamic constructor would
/// (`"42"` → 42, `3.9` → 3, `1` → true).
///
/// Strings become booleans by content rather than by emptiness: `"true"`,
/// `"1"` and `"on"` are true, `"false"`, `"0"`, `"off"` and `""` are false,
/// anything else is a type mismatch.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAdapter;

impl OscAdapter for DefaultAdapter {
    fn name(&self) -> &str {
        "default"
    }

    fn handles(&self, _value: &Value) -> bool {
        true
    }

    fn encode(&self, address: &str, value: &Value) -> Result<OscMessage, AdapterError> {
        let arg = match value {
            Value::Int(i) => OscType::Int(*i),
            Value::Long(l) => OscType::Long(*l),
            Value::Float(f) => OscType::Float(*f),
            Value::Double(d) => OscType::Double(*d),
            Value::Bool(b) => OscType::Bool(*b),
            Value::Str(s) => OscType::String(s.clone()),
            Value::Path(p) => OscType::String(p.to_string_lossy().into_owned()),
            Value::Enum(member) => OscType::String(member.name.to_string()),
            Value::Vector2(_) | Value::Vector3(_) | Value::Vector4(_) => {
                return Err(AdapterError::Unsupported {
                    adapter: self.name().to_string(),
                    kind: value.kind().to_string(),
                })
            }
        };

        Ok(OscMessage {
            addr: address.to_string(),
            args: vec![arg],
        })
    }

    fn decode(&self, expected: &ValueType, args: &[OscType]) -> Result<Option<Value>, AdapterError> {
        let arg = first_arg(args)?;
        let mismatch = || AdapterError::TypeMismatch {
            expected: expected.to_string(),
            found: describe_arg(arg),
        };

        let value = match expected {
            ValueType::Int => Value::Int(as_i64(arg).and_then(|v| i32::try_from(v).ok()).ok_or_else(mismatch)?),
            ValueType::Long => Value::Long(as_i64(arg).ok_or_else(mismatch)?),
            ValueType::Float => Value::Float(as_f64(arg).ok_or_else(mismatch)? as f32),
            ValueType::Double => Value::Double(as_f64(arg).ok_or_else(mismatch)?),
            ValueType::Bool => Value::Bool(as_bool(arg).ok_or_else(mismatch)?),
            ValueType::Str => Value::Str(as_string(arg).ok_or_else(mismatch)?),
            ValueType::Path => Value::Path(PathBuf::from(as_string(arg).ok_or_else(mismatch)?)),
            ValueType::Vector2 | ValueType::Vector3 | ValueType::Vector4 | ValueType::Enum { .. } => {
                return Err(mismatch())
            }
        };

        Ok(Some(value))
    }
}

fn as_i64(arg: &OscType) -> Option<i64> {
    match arg {
        OscType::Int(i) => Some(i64::from(*i)),
        OscType::Long(l) => Some(*l),
        OscType::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        OscType::Double(d) if d.is_finite() => Some(d.trunc() as i64),
        OscType::Bool(b) => Some(i64::from(*b)),
        OscType::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(arg: &OscType) -> Option<f64> {
    match arg {
        OscType::Int(i) => Some(f64::from(*i)),
        OscType::Long(l) => Some(*l as f64),
        OscType::Float(f) => Some(f64::from(*f)),
        OscType::Double(d) => Some(*d),
        OscType::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        OscType::String(s) => s.trim().parse().ok(),
        OscType::Inf => Some(f64::INFINITY),
        _ => None,
    }
}

fn as_bool(arg: &OscType) -> Option<bool> {
    match arg {
        OscType::Bool(b) => Some(*b),
        OscType::Int(i) => Some(*i != 0),
        OscType::Long(l) => Some(*l != 0),
        OscType::Float(f) => Some(*f != 0.0),
        OscType::Double(d) => Some(*d != 0.0),
        OscType::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "on" => Some(true),
            "false" | "0" | "off" | "" => Some(false),
            _ => None,
        },
        OscType::Nil => Some(false),
        _ => None,
    }
}

fn as_string(arg: &OscType) -> Option<String> {
    match arg {
        OscType::String(s) => Some(s.clone()),
        OscType::Char(c) => Some(c.to_string()),
        OscType::Int(i) => Some(i.to_string()),
        OscType::Long(l) => Some(l.to_string()),
        OscType::Float(f) => Some(f.to_string()),
        OscType::Double(d) => Some(d.to_string()),
        OscType::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
