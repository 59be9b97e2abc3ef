//! Adapter chain - per-type OSC encode/decode strategies
//!
//! Resolution is first-match-wins over an explicit ordered list, with the
//! default adapter as catch-all. The built-in order is:
//!
//! 1. [`EnumAdapter`] - members travel by name
//! 2. [`PathAdapter`] - paths travel as strings
//! 3. [`VectorAdapter`] - one float per component
//! 4. [`DefaultAdapter`] - single native scalar argument
//!
//! Vectors must resolve before the default adapter, which would otherwise try
//! to squeeze them into a single argument.

mod default;
mod enum_adapter;
mod path;
mod vector;

pub use default::DefaultAdapter;
pub use enum_adapter::EnumAdapter;
pub use path::PathAdapter;
pub use vector::VectorAdapter;

use crate::error::AdapterError;
use crate::value::{Value, ValueType};
use rosc::{OscMessage, OscType};
use std::sync::Arc;

/// Encode/decode strategy for one family of value types
///
/// Note: `handles` must be pure; it runs once per registration to pick the
/// adapter for a field.
pub trait OscAdapter: Send + Sync {
    /// Adapter name (e.g., "enum", "vector"), shown in diagnostics
    fn name(&self) -> &str;

    /// Whether this adapter is responsible for `value`
    fn handles(&self, value: &Value) -> bool;

    /// Build a ready-to-send message for `address`
    fn encode(&self, address: &str, value: &Value) -> Result<OscMessage, AdapterError>;

    /// Rebuild a value of type `expected` from raw OSC arguments
    ///
    /// `Ok(None)` means the adapter has no representation for `expected`
    /// (e.g., a vector of unsupported arity); the caller skips the update.
    fn decode(&self, expected: &ValueType, args: &[OscType]) -> Result<Option<Value>, AdapterError>;
}

/// Ordered adapter list with a catch-all default
#[derive(Clone)]
pub struct AdapterChain {
    adapters: Vec<Arc<dyn OscAdapter>>,
    default: Arc<dyn OscAdapter>,
}

impl AdapterChain {
    /// Chain with only the default adapter
    pub fn empty() -> Self {
        Self {
            adapters: Vec::new(),
            default: Arc::new(DefaultAdapter),
        }
    }

    /// Append an adapter after the existing ones
    pub fn push(&mut self, adapter: Arc<dyn OscAdapter>) {
        self.adapters.push(adapter);
    }

    /// Put an adapter ahead of every existing one
    pub fn insert_front(&mut self, adapter: Arc<dyn OscAdapter>) {
        self.adapters.insert(0, adapter);
    }

    /// Replace the catch-all adapter
    pub fn set_default(&mut self, adapter: Arc<dyn OscAdapter>) {
        self.default = adapter;
    }

    /// First adapter whose predicate matches, else the default
    pub fn resolve(&self, value: &Value) -> Arc<dyn OscAdapter> {
        self.adapters
            .iter()
            .find(|adapter| adapter.handles(value))
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }

    /// Adapter names in resolution order, default last
    pub fn names(&self) -> Vec<String> {
        self.adapters
            .iter()
            .chain(std::iter::once(&self.default))
            .map(|a| a.name().to_string())
            .collect()
    }
}

impl Default for AdapterChain {
    fn default() -> Self {
        let mut chain = Self::empty();
        chain.push(Arc::new(EnumAdapter));
        chain.push(Arc::new(PathAdapter));
        chain.push(Arc::new(VectorAdapter));
        chain
    }
}

/// Human-readable tag for an OSC argument (error messages)
pub(crate) fn describe_arg(arg: &OscType) -> String {
    match arg {
        OscType::Int(i) => format!("int {}", i),
        OscType::Long(l) => format!("long {}", l),
        OscType::Float(f) => format!("float {}", f),
        OscType::Double(d) => format!("double {}", d),
        OscType::Bool(b) => format!("bool {}", b),
        OscType::String(s) => format!("string {:?}", s),
        OscType::Nil => "nil".to_string(),
        OscType::Inf => "inf".to_string(),
        other => format!("{:?}", other),
    }
}

pub(crate) fn first_arg(args: &[OscType]) -> Result<&OscType, AdapterError> {
    args.first().ok_or(AdapterError::MissingArgument)
}
