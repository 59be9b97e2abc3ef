//! Path adapter - filesystem paths travel as strings

use super::{describe_arg, first_arg, OscAdapter};
use crate::error::AdapterError;
use crate::value::{Value, ValueType};
use rosc::{OscMessage, OscType};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default)]
pub struct PathAdapter;

impl OscAdapter for PathAdapter {
    fn name(&self) -> &str {
        "path"
    }

    fn handles(&self, value: &Value) -> bool {
        matches!(value, Value::Path(_))
    }

    fn encode(&self, address: &str, value: &Value) -> Result<OscMessage, AdapterError> {
        match value {
            Value::Path(path) => Ok(OscMessage {
                addr: address.to_string(),
                args: vec![OscType::String(path.to_string_lossy().into_owned())],
            }),
            other => Err(AdapterError::Unsupported {
                adapter: self.name().to_string(),
                kind: other.kind().to_string(),
            }),
        }
    }

    fn decode(&self, expected: &ValueType, args: &[OscType]) -> Result<Option<Value>, AdapterError> {
        match first_arg(args)? {
            OscType::String(s) => Ok(Some(Value::Path(PathBuf::from(s)))),
            other => Err(AdapterError::TypeMismatch {
                expected: expected.to_string(),
                found: describe_arg(other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_roundtrip() {
        let path = PathBuf::from("/var/data/take 01.wav");
        let msg = PathAdapter.encode("/file", &Value::Path(path.clone())).unwrap();
        assert_eq!(msg.args, vec![OscType::String("/var/data/take 01.wav".into())]);

        let back = PathAdapter.decode(&ValueType::Path, &msg.args).unwrap();
        assert_eq!(back, Some(Value::Path(path)));
    }

    #[test]
    fn test_decode_requires_string() {
        assert!(matches!(
            PathAdapter.decode(&ValueType::Path, &[OscType::Int(1)]),
            Err(AdapterError::TypeMismatch { .. })
        ));
        assert_eq!(
            PathAdapter.decode(&ValueType::Path, &[]),
            Err(AdapterError::MissingArgument)
        );
    }
}
