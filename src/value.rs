//! Value model shared by fields, adapters and the registry
//!
//! [`Value`] is the closed set of kinds a bound field can hold. Typed Rust
//! values cross into it through [`FieldValue`]; user enums join via
//! [`OscEnum`] (usually implemented with [`crate::osc_enum!`]).

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// 2D vector (x, y)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

/// 3D vector (x, y, z)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// 4D vector; the fourth component is `t`, not `w`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub t: f32,
}

impl Vector2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Vector3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Vector4 {
    pub fn new(x: f32, y: f32, z: f32, t: f32) -> Self {
        Self { x, y, z, t }
    }
}

/// A member of a user enum, carried by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnumMember {
    pub type_name: &'static str,
    pub name: &'static str,
}

/// Runtime value of a bound field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Str(String),
    Path(PathBuf),
    Vector2(Vector2),
    Vector3(Vector3),
    Vector4(Vector4),
    Enum(EnumMember),
}

impl Value {
    /// Vector components in declaration order, `None` for non-vectors
    pub fn vector_components(&self) -> Option<Vec<f32>> {
        match self {
            Value::Vector2(v) => Some(vec![v.x, v.y]),
            Value::Vector3(v) => Some(vec![v.x, v.y, v.z]),
            Value::Vector4(v) => Some(vec![v.x, v.y, v.z, v.t]),
            _ => None,
        }
    }

    /// Short kind name used in logs and error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
            Value::Path(_) => "path",
            Value::Vector2(_) => "vector2d",
            Value::Vector3(_) => "vector3d",
            Value::Vector4(_) => "vector4d",
            Value::Enum(_) => "enum",
        }
    }
}

/// Type descriptor captured when a field is registered
///
/// Decoding needs the *target* type, not the incoming arguments, to decide
/// what to build (vector arity, enum members).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Long,
    Float,
    Double,
    Bool,
    Str,
    Path,
    Vector2,
    Vector3,
    Vector4,
    Enum {
        type_name: &'static str,
        members: &'static [&'static str],
    },
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Int => write!(f, "int"),
            ValueType::Long => write!(f, "long"),
            ValueType::Float => write!(f, "float"),
            ValueType::Double => write!(f, "double"),
            ValueType::Bool => write!(f, "bool"),
            ValueType::Str => write!(f, "str"),
            ValueType::Path => write!(f, "path"),
            ValueType::Vector2 => write!(f, "vector2d"),
            ValueType::Vector3 => write!(f, "vector3d"),
            ValueType::Vector4 => write!(f, "vector4d"),
            ValueType::Enum { type_name, .. } => write!(f, "enum {}", type_name),
        }
    }
}

/// Conversion between a typed field value and [`Value`]
pub trait FieldValue: Clone + Send + Sync + 'static {
    fn to_value(&self) -> Value;

    /// Returns `None` when `value` is not of this type's kind
    fn from_value(value: Value) -> Option<Self>;

    fn value_type(&self) -> ValueType;
}

macro_rules! scalar_field_value {
    ($ty:ty, $variant:ident) => {
        impl FieldValue for $ty {
            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn value_type(&self) -> ValueType {
                ValueType::$variant
            }
        }
    };
}

scalar_field_value!(i32, Int);
scalar_field_value!(i64, Long);
scalar_field_value!(f32, Float);
scalar_field_value!(f64, Double);
scalar_field_value!(bool, Bool);
scalar_field_value!(String, Str);
scalar_field_value!(PathBuf, Path);
scalar_field_value!(Vector2, Vector2);
scalar_field_value!(Vector3, Vector3);
scalar_field_value!(Vector4, Vector4);

/// Enum whose members travel over OSC by name
pub trait OscEnum: Copy + Send + Sync + 'static {
    const TYPE_NAME: &'static str;
    const MEMBERS: &'static [&'static str];

    fn name(&self) -> &'static str;
    fn from_name(name: &str) -> Option<Self>;
}

impl<E: OscEnum> FieldValue for E {
    fn to_value(&self) -> Value {
        Value::Enum(EnumMember {
            type_name: E::TYPE_NAME,
            name: self.name(),
        })
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Enum(member) if member.type_name == E::TYPE_NAME => E::from_name(member.name),
            _ => None,
        }
    }

    fn value_type(&self) -> ValueType {
        ValueType::Enum {
            type_name: E::TYPE_NAME,
            members: E::MEMBERS,
        }
    }
}

/// Implement [`OscEnum`] for a fieldless enum
///
/// ```
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Color { Red, Green, Blue }
/// field_osc::osc_enum!(Color { Red, Green, Blue });
/// ```
#[macro_export]
macro_rules! osc_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::OscEnum for $ty {
            const TYPE_NAME: &'static str = stringify!($ty);
            const MEMBERS: &'static [&'static str] = &[$(stringify!($variant)),+];

            fn name(&self) -> &'static str {
                match self {
                    $($ty::$variant => stringify!($variant),)+
                }
            }

            fn from_name(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($variant) => Some($ty::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Mode {
        Idle,
        Live,
    }
    crate::osc_enum!(Mode { Idle, Live });

    #[test]
    fn test_enum_value_roundtrip_by_name() {
        let value = Mode::Live.to_value();
        assert_eq!(
            value,
            Value::Enum(EnumMember {
                type_name: "Mode",
                name: "Live"
            })
        );
        assert_eq!(Mode::from_value(value), Some(Mode::Live));
        assert_eq!(
            Mode::Idle.value_type(),
            ValueType::Enum {
                type_name: "Mode",
                members: &["Idle", "Live"]
            }
        );
    }

    #[test]
    fn test_from_value_rejects_other_kinds() {
        assert_eq!(i32::from_value(Value::Float(1.0)), None);
        assert_eq!(String::from_value(Value::Int(1)), None);
        assert_eq!(Mode::from_value(Value::Str("Live".into())), None);
    }

    #[test]
    fn test_vector_components_order() {
        let v = Value::Vector4(Vector4::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(v.vector_components(), Some(vec![1.0, 2.0, 3.0, 4.0]));
        assert_eq!(Value::Int(3).vector_components(), None);
    }

    #[test]
    fn test_value_type_display() {
        assert_eq!(ValueType::Int.to_string(), "int");
        assert_eq!(ValueType::Vector3.to_string(), "vector3d");
        assert_eq!(Mode::Idle.value_type().to_string(), "enum Mode");
    }
}
