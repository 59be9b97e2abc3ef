//! Inbound path - OSC message → field assignment

use super::OscService;
use crate::adapter::OscAdapter;
use crate::dispatcher::InboundHandler;
use crate::error::Result;
use crate::field::{upgrade, BoundField};
use crate::registry::EndpointRegistry;
use crate::value::ValueType;
use rosc::OscType;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

impl OscService {
    /// Map the inbound handler for `address` in the dispatcher
    pub(super) fn wire_inbound(
        &self,
        address: &str,
        field: Weak<dyn BoundField>,
        value_type: ValueType,
        adapter: Arc<dyn OscAdapter>,
    ) {
        let registry = self.registry.clone();
        let send_on_receive = self.config.send_on_receive;
        let owned_address = address.to_string();

        let handler: InboundHandler = Arc::new(move |args: &[OscType]| {
            apply_inbound(
                &registry,
                &owned_address,
                &field,
                &value_type,
                adapter.as_ref(),
                send_on_receive,
                args,
            )
        });

        self.dispatcher.map(address, handler);
    }
}

/// Decode `args` and assign the result to the field
///
/// Unless `send_on_receive` is set, the assignment runs with the
/// registration silenced so its change notification is not sent back out.
fn apply_inbound(
    registry: &EndpointRegistry,
    address: &str,
    field: &Weak<dyn BoundField>,
    value_type: &ValueType,
    adapter: &dyn OscAdapter,
    send_on_receive: bool,
    args: &[OscType],
) -> Result<()> {
    let Some(value) = adapter.decode(value_type, args)? else {
        warn!(
            address,
            adapter = adapter.name(),
            target = %value_type,
            "Adapter has no representation for target type, update skipped"
        );
        return Ok(());
    };

    let field = upgrade(field, address)?;
    debug!(address, value = ?value, "Applying OSC value");

    if send_on_receive {
        return field.assign(value);
    }

    match registry.lookup(address) {
        Some(registration) => registration.silenced(|| field.assign(value)),
        None => field.assign(value),
    }
}
