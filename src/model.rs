//! Explicit model binding
//!
//! Models list their OSC-exposed fields through an [`Endpoints`] builder:
//!
//! ```
//! use field_osc::{DataField, Direction, Endpoints, OscEndpoint, OscModel};
//!
//! struct Config {
//!     name: DataField<String>,
//!     age: DataField<i32>,
//! }
//!
//! impl OscModel for Config {
//!     fn endpoints(&self) -> Endpoints {
//!         Endpoints::new()
//!             .bind("name", &self.name, OscEndpoint::default())
//!             .bind("age", &self.age, OscEndpoint::new().direction(Direction::Receive))
//!     }
//! }
//! ```
//!
//! Only [`DataField`] handles can be bound, so an endpoint can never be
//! attached to something that is not observable.

use crate::field::{BoundField, DataField};
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which way values flow for an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Local changes are sent to the peer
    Send,
    /// Inbound messages update the field
    Receive,
    /// Send | Receive
    #[default]
    Bidirectional,
}

impl Direction {
    pub fn sends(self) -> bool {
        matches!(self, Direction::Send | Direction::Bidirectional)
    }

    pub fn receives(self) -> bool {
        matches!(self, Direction::Receive | Direction::Bidirectional)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Send => write!(f, "send"),
            Direction::Receive => write!(f, "receive"),
            Direction::Bidirectional => write!(f, "bidirectional"),
        }
    }
}

/// Binding metadata attached to a field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OscEndpoint {
    /// Address segment override; the field name is used when absent
    pub name: Option<String>,
    pub direction: Direction,
}

impl OscEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Address segment for a field: the override wins over the field name
    pub fn segment<'a>(&'a self, field_name: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(field_name)
    }
}

/// One bound field of a model
pub struct Endpoint {
    pub field_name: String,
    pub(crate) field: Arc<dyn BoundField>,
    pub annotation: OscEndpoint,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("field_name", &self.field_name)
            .field("value", &self.field.current_value())
            .field("annotation", &self.annotation)
            .finish()
    }
}

/// Ordered list of a model's bound fields
#[derive(Debug, Default)]
pub struct Endpoints {
    entries: Vec<Endpoint>,
}

impl Endpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `field` under its declared `field_name`
    pub fn bind<T: FieldValue>(
        mut self,
        field_name: impl Into<String>,
        field: &DataField<T>,
        annotation: OscEndpoint,
    ) -> Self {
        self.entries.push(Endpoint {
            field_name: field_name.into(),
            field: field.bound(),
            annotation,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.entries.iter()
    }
}

impl IntoIterator for Endpoints {
    type Item = Endpoint;
    type IntoIter = std::vec::IntoIter<Endpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A structured object exposing bound fields
pub trait OscModel {
    fn endpoints(&self) -> Endpoints;
}

impl OscModel for Endpoints {
    fn endpoints(&self) -> Endpoints {
        Endpoints {
            entries: self
                .entries
                .iter()
                .map(|e| Endpoint {
                    field_name: e.field_name.clone(),
                    field: e.field.clone(),
                    annotation: e.annotation.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_flags() {
        assert!(Direction::Send.sends() && !Direction::Send.receives());
        assert!(!Direction::Receive.sends() && Direction::Receive.receives());
        assert!(Direction::Bidirectional.sends() && Direction::Bidirectional.receives());
        assert_eq!(OscEndpoint::default().direction, Direction::Bidirectional);
    }

    #[test]
    fn test_override_name_wins() {
        let plain = OscEndpoint::new();
        let renamed = OscEndpoint::new().name("years");
        assert_eq!(plain.segment("age"), "age");
        assert_eq!(renamed.segment("age"), "years");
    }

    #[test]
    fn test_builder_keeps_declaration_order() {
        let name = DataField::new(String::from("Cat"));
        let age = DataField::new(21);
        let endpoints = Endpoints::new()
            .bind("name", &name, OscEndpoint::default())
            .bind("age", &age, OscEndpoint::new().direction(Direction::Send));

        let names: Vec<_> = endpoints.iter().map(|e| e.field_name.as_str()).collect();
        assert_eq!(names, vec!["name", "age"]);
        assert_eq!(endpoints.len(), 2);
        assert_eq!(name.subscriber_count(), 0);
    }
}
