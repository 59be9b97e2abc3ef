//! Field OSC - bind observable application fields to OSC endpoints
//!
//! Local changes on a bound [`DataField`] are encoded and sent to the peer;
//! inbound OSC messages are decoded and assigned back, without echoing them.
//!
//! ```no_run
//! use field_osc::{DataField, Endpoints, OscEndpoint, OscService, ServiceConfig};
//!
//! let age = DataField::new(21);
//! let model = Endpoints::new().bind("age", &age, OscEndpoint::default());
//!
//! let service = OscService::new(ServiceConfig::default());
//! service.add_route("/config", &model)?;
//! service.run(false)?;
//!
//! age.set_value(42); // sends /config/age 42
//! service.stop();
//! # Ok::<(), field_osc::BindError>(())
//! ```

pub mod adapter;
pub mod address;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod field;
pub mod model;
pub mod registry;
pub mod service;
pub mod transport;
pub mod value;

pub use adapter::{AdapterChain, DefaultAdapter, EnumAdapter, OscAdapter, PathAdapter, VectorAdapter};
pub use address::{create_address, validate_address};
pub use config::{DuplicatePolicy, ServiceConfig};
pub use dispatcher::DispatchOutcome;
pub use error::{AdapterError, BindError, Result};
pub use field::{DataField, SubscriptionId};
pub use model::{Direction, Endpoints, OscEndpoint, OscModel};
pub use registry::RegistrationInfo;
pub use service::OscService;
pub use transport::{OutboundSink, UdpSink};
pub use value::{EnumMember, FieldValue, OscEnum, Value, ValueType, Vector2, Vector3, Vector4};
