//! Vector adapter - one float32 argument per component

use super::{describe_arg, OscAdapter};
use crate::error::AdapterError;
use crate::value::{Value, ValueType, Vector2, Vector3, Vector4};
use rosc::{OscMessage, OscType};

/// Encodes 2D/3D/4D vectors as consecutive floats (x, y, [z], [t])
///
/// Decoding takes the arity from the *target* type. A target that is not a
/// vector decodes to `None` instead of failing.
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorAdapter;

impl OscAdapter for VectorAdapter {
    fn name(&self) -> &str {
        "vector"
    }

    fn handles(&self, value: &Value) -> bool {
        matches!(
            value,
            Value::Vector2(_) | Value::Vector3(_) | Value::Vector4(_)
        )
    }

    fn encode(&self, address: &str, value: &Value) -> Result<OscMessage, AdapterError> {
        let components = value
            .vector_components()
            .ok_or_else(|| AdapterError::Unsupported {
                adapter: self.name().to_string(),
                kind: value.kind().to_string(),
            })?;

        Ok(OscMessage {
            addr: address.to_string(),
            args: components.into_iter().map(OscType::Float).collect(),
        })
    }

    fn decode(&self, expected: &ValueType, args: &[OscType]) -> Result<Option<Value>, AdapterError> {
        let arity = match expected {
            ValueType::Vector2 => 2,
            ValueType::Vector3 => 3,
            ValueType::Vector4 => 4,
            _ => return Ok(None),
        };

        if args.len() < arity {
            return Err(AdapterError::MissingArgument);
        }

        let c = args[..arity]
            .iter()
            .map(|arg| component(expected, arg))
            .collect::<Result<Vec<f32>, _>>()?;

        Ok(Some(match arity {
            2 => Value::Vector2(Vector2::new(c[0], c[1])),
            3 => Value::Vector3(Vector3::new(c[0], c[1], c[2])),
            _ => Value::Vector4(Vector4::new(c[0], c[1], c[2], c[3])),
        }))
    }
}

fn component(expected: &ValueType, arg: &OscType) -> Result<f32, AdapterError> {
    match arg {
        OscType::Float(f) => Ok(*f),
        OscType::Double(d) => Ok(*d as f32),
        OscType::Int(i) => Ok(*i as f32),
        OscType::Long(l) => Ok(*l as f32),
        other => Err(AdapterError::TypeMismatch {
            expected: expected.to_string(),
            found: describe_arg(other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_3d_as_three_floats() {
        let v = Value::Vector3(Vector3::new(1.0, 2.0, 3.0));
        let msg = VectorAdapter.encode("/pos", &v).unwrap();
        assert_eq!(
            msg.args,
            vec![OscType::Float(1.0), OscType::Float(2.0), OscType::Float(3.0)]
        );
    }

    #[test]
    fn test_decode_uses_target_arity() {
        let args = [OscType::Float(1.0), OscType::Float(2.0), OscType::Float(3.0)];
        assert_eq!(
            VectorAdapter.decode(&ValueType::Vector3, &args).unwrap(),
            Some(Value::Vector3(Vector3::new(1.0, 2.0, 3.0)))
        );
        // Extra arguments beyond the target arity are ignored
        assert_eq!(
            VectorAdapter.decode(&ValueType::Vector2, &args).unwrap(),
            Some(Value::Vector2(Vector2::new(1.0, 2.0)))
        );
    }

    #[test]
    fn test_fourth_component_is_t() {
        let v = Vector4::new(0.5, 1.5, 2.5, 3.5);
        let msg = VectorAdapter.encode("/q", &Value::Vector4(v)).unwrap();
        let back = VectorAdapter.decode(&ValueType::Vector4, &msg.args).unwrap();
        assert_eq!(back, Some(Value::Vector4(v)));
        assert_eq!(v.t, 3.5);
    }

    #[test]
    fn test_unsupported_target_yields_none() {
        let args = [OscType::Float(1.0)];
        assert_eq!(VectorAdapter.decode(&ValueType::Int, &args), Ok(None));
    }

    #[test]
    fn test_too_few_components() {
        let args = [OscType::Float(1.0), OscType::Float(2.0)];
        assert_eq!(
            VectorAdapter.decode(&ValueType::Vector3, &args),
            Err(AdapterError::MissingArgument)
        );
    }
}
