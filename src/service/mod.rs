//! OSC service - the binding engine
//!
//! The service owns:
//! - The endpoint registry (address → registration)
//! - The inbound dispatcher (address → handlers)
//! - The adapter chain used to pick a codec per field
//! - The outbound sink and the listener thread
//!
//! Endpoints may be added before or after `run`; outbound changes are
//! silently dropped until a sink exists.

mod inbound;
mod lifecycle;
mod outbound;


use crate::adapter::AdapterChain;
use crate::address::{create_address, validate_address};
use crate::config::{DuplicatePolicy, ServiceConfig};
use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::error::{BindError, Result};
use crate::field::{BoundField, DataField};
use crate::model::{OscEndpoint, OscModel};
use crate::registry::{EndpointRegistry, Registration, RegistrationInfo};
use crate::transport::{ListenerThread, OutboundSink};
use crate::value::FieldValue;
use parking_lot::{Mutex, RwLock};
use rosc::OscMessage;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared slot for the outbound transport
pub(crate) type SinkSlot = Arc<RwLock<Option<Arc<dyn OutboundSink>>>>;

/// Inbound listener state while the service is running
pub(crate) enum ListenerState {
    /// Listener on its own thread
    Background(ListenerThread),
    /// Listener occupying a caller's thread inside `run(true)`
    Foreground {
        shutdown: Arc<AtomicBool>,
        local_addr: std::net::SocketAddr,
    },
}

/// Bidirectional OSC binding service
pub struct OscService {
    pub(crate) config: ServiceConfig,
    pub(crate) registry: Arc<EndpointRegistry>,
    pub(crate) dispatcher: Arc<Dispatcher>,
    pub(crate) adapters: RwLock<AdapterChain>,
    pub(crate) sink: SinkSlot,
    pub(crate) listener: Mutex<Option<ListenerState>>,
}

impl OscService {
    /// Create a service; nothing is opened until [`OscService::run`]
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            registry: Arc::new(EndpointRegistry::new()),
            dispatcher: Arc::new(Dispatcher::new()),
            adapters: RwLock::new(AdapterChain::default()),
            sink: Arc::new(RwLock::new(None)),
            listener: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// Mutable access to the adapter chain
    ///
    /// Adapters are resolved when an endpoint is added; changing the chain
    /// does not affect existing endpoints.
    pub fn adapters_mut(&self) -> parking_lot::RwLockWriteGuard<'_, AdapterChain> {
        self.adapters.write()
    }

    /// Join segments into a canonical OSC address (see [`create_address`])
    pub fn create_address<I, S>(segments: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        create_address(segments)
    }

    /// Register every bound field of `model` below `base`
    ///
    /// The annotation's name override, when set, replaces the field name in
    /// the address.
    pub fn add_route(&self, base: &str, model: &impl OscModel) -> Result<()> {
        let endpoints = model.endpoints();
        debug!(base, count = endpoints.len(), "Adding OSC route");

        for endpoint in endpoints {
            let address = create_address([base, endpoint.annotation.segment(&endpoint.field_name)]);
            self.add_bound_endpoint(&address, endpoint.field, endpoint.annotation)?;
        }
        Ok(())
    }

    /// Bind a single field at `address`
    pub fn add_endpoint<T: FieldValue>(
        &self,
        address: &str,
        field: &DataField<T>,
        annotation: OscEndpoint,
    ) -> Result<()> {
        self.add_bound_endpoint(address, field.bound(), annotation)
    }

    fn add_bound_endpoint(
        &self,
        address: &str,
        field: Arc<dyn BoundField>,
        annotation: OscEndpoint,
    ) -> Result<()> {
        validate_address(address)?;

        if let Some(previous) = self.registry.lookup(address) {
            self.resolve_collision(&previous)?;
        }

        let value = field.current_value();
        let value_type = field.value_type();
        let adapter = self.adapters.read().resolve(&value);
        let weak = Arc::downgrade(&field);

        let subscription = annotation
            .direction
            .sends()
            .then(|| self.wire_outbound(address, &field, adapter.clone()));

        if annotation.direction.receives() {
            self.wire_inbound(address, weak.clone(), value_type.clone(), adapter.clone());
        }

        info!(
            address,
            direction = %annotation.direction,
            value_type = %value_type,
            adapter = adapter.name(),
            "OSC endpoint registered"
        );

        self.registry.register(Registration::new(
            address.to_string(),
            weak,
            annotation,
            value_type,
            adapter,
            subscription,
        ));
        Ok(())
    }

    fn resolve_collision(&self, previous: &Registration) -> Result<()> {
        let address = previous.address.as_str();
        match self.config.duplicate_policy {
            DuplicatePolicy::Reject => Err(BindError::AddressCollision(address.to_string())),
            DuplicatePolicy::Replace => {
                if let (Some(id), Some(field)) = (previous.subscription, previous.field.upgrade()) {
                    field.unsubscribe_value(id);
                }
                let cleared = self.dispatcher.clear(address);
                debug!(address, cleared, "Replaced previous OSC endpoint");
                Ok(())
            }
            DuplicatePolicy::AllowMultiple => {
                warn!(
                    address,
                    "OSC endpoint re-registered; previous handlers stay wired"
                );
                Ok(())
            }
        }
    }

    /// Dispatch one inbound message to its handlers
    ///
    /// Used by the listener; callers with their own transport can feed
    /// messages here directly. Handler errors are logged, never returned.
    pub fn dispatch(&self, message: &OscMessage) -> DispatchOutcome {
        self.dispatcher.dispatch(message)
    }

    /// Install an outbound transport, replacing any existing one
    pub fn attach_sink(&self, sink: Arc<dyn OutboundSink>) {
        *self.sink.write() = Some(sink);
    }

    pub fn has_sink(&self) -> bool {
        self.sink.read().is_some()
    }

    /// Re-notify every live field bound for sending
    ///
    /// Pushes the current state to the peer, e.g. right after `run`.
    /// Returns the number of fields fired.
    pub fn refresh(&self) -> usize {
        let mut fired = 0;
        for registration in self.registry.snapshot() {
            if !registration.annotation.direction.sends() {
                continue;
            }
            if let Some(field) = registration.field.upgrade() {
                field.fire_value();
                fired += 1;
            }
        }
        debug!(fired, "OSC refresh complete");
        fired
    }

    /// Human-readable listing of every registration, one per line
    ///
    /// Diagnostic output only; the format is not stable.
    pub fn describe(&self) -> String {
        self.registry
            .snapshot()
            .iter()
            .map(|r| {
                let mut line = format!(
                    "{} [{}] {} ({})",
                    r.address,
                    r.annotation.direction,
                    r.value_type,
                    r.adapter_name()
                );
                if !r.is_live() {
                    line.push_str(" <dropped>");
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Registration listing as JSON (diagnostics)
    pub fn describe_json(&self) -> serde_json::Value {
        let infos: Vec<RegistrationInfo> =
            self.registry.snapshot().iter().map(|r| r.info()).collect();
        serde_json::json!({
            "host": self.config.host,
            "in_port": self.config.in_port,
            "out_port": self.config.out_port,
            "running": self.is_running(),
            "endpoints": infos,
        })
    }
}

impl Default for OscService {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}
