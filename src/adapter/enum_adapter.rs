//! Enum adapter - members travel by symbolic name

use super::{describe_arg, first_arg, OscAdapter};
use crate::error::AdapterError;
use crate::value::{EnumMember, Value, ValueType};
use rosc::{OscMessage, OscType};

#[derive(Debug, Clone, Copy, Default)]
pub struct EnumAdapter;

impl OscAdapter for EnumAdapter {
    fn name(&self) -> &str {
        "enum"
    }

    fn handles(&self, value: &Value) -> bool {
        matches!(value, Value::Enum(_))
    }

    fn encode(&self, address: &str, value: &Value) -> Result<OscMessage, AdapterError> {
        match value {
            Value::Enum(member) => Ok(OscMessage {
                addr: address.to_string(),
                args: vec![OscType::String(member.name.to_string())],
            }),
            other => Err(AdapterError::Unsupported {
                adapter: self.name().to_string(),
                kind: other.kind().to_string(),
            }),
        }
    }

    fn decode(&self, expected: &ValueType, args: &[OscType]) -> Result<Option<Value>, AdapterError> {
        let ValueType::Enum { type_name, members } = expected else {
            return Err(AdapterError::TypeMismatch {
                expected: expected.to_string(),
                found: "enum member name".to_string(),
            });
        };

        let name = match first_arg(args)? {
            OscType::String(s) => s.as_str(),
            other => {
                return Err(AdapterError::ValueNotFound {
                    value: describe_arg(other),
                    type_name: type_name.to_string(),
                })
            }
        };

        members
            .iter()
            .find(|member| **member == name)
            .map(|member| {
                Some(Value::Enum(EnumMember {
                    type_name: *type_name,
                    name: *member,
                }))
            })
            .ok_or_else(|| AdapterError::ValueNotFound {
                value: name.to_string(),
                type_name: type_name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{FieldValue, OscEnum};

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Color {
        Red,
        Green,
        Blue,
    }
    crate::osc_enum!(Color { Red, Green, Blue });

    #[test]
    fn test_encode_uses_member_name() {
        let msg = EnumAdapter.encode("/color", &Color::Green.to_value()).unwrap();
        assert_eq!(msg.args, vec![OscType::String("Green".into())]);
    }

    #[test]
    fn test_decode_by_name() {
        let expected = Color::Red.value_type();
        let decoded = EnumAdapter
            .decode(&expected, &[OscType::String("Blue".into())])
            .unwrap()
            .unwrap();
        assert_eq!(Color::from_value(decoded), Some(Color::Blue));
    }

    #[test]
    fn test_decode_unknown_member_is_value_not_found() {
        let expected = Color::Red.value_type();
        let err = EnumAdapter
            .decode(&expected, &[OscType::String("Purple".into())])
            .unwrap_err();
        assert_eq!(
            err,
            AdapterError::ValueNotFound {
                value: "Purple".into(),
                type_name: Color::TYPE_NAME.into(),
            }
        );
    }

    #[test]
    fn test_roundtrip_every_member() {
        let expected = Color::Red.value_type();
        for color in [Color::Red, Color::Green, Color::Blue] {
            let msg = EnumAdapter.encode("/c", &color.to_value()).unwrap();
            let back = EnumAdapter.decode(&expected, &msg.args).unwrap().unwrap();
            assert_eq!(Color::from_value(back), Some(color));
        }
    }
}
