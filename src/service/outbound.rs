//! Outbound path - field change → OSC message

use super::{OscService, SinkSlot};
use crate::adapter::OscAdapter;
use crate::field::{BoundField, SubscriptionId};
use crate::registry::{EndpointRegistry, Registration};
use crate::value::Value;
use std::sync::Arc;
use tracing::{trace, warn};

impl OscService {
    /// Subscribe the outbound handler for `address` to the field's changes
    pub(super) fn wire_outbound(
        &self,
        address: &str,
        field: &Arc<dyn BoundField>,
        adapter: Arc<dyn OscAdapter>,
    ) -> SubscriptionId {
        let registry = self.registry.clone();
        let sink = self.sink.clone();
        let address = address.to_string();

        field.subscribe_value(Arc::new(move |value: &Value| {
            send_change(&registry, &sink, &address, adapter.as_ref(), value);
        }))
    }
}

/// Encode and send one change unless the sink is missing or the
/// registration at `address` is currently silenced
fn send_change(
    registry: &EndpointRegistry,
    sink: &SinkSlot,
    address: &str,
    adapter: &dyn OscAdapter,
    value: &Value,
) {
    let Some(sink) = sink.read().clone() else {
        trace!(address, "No OSC client yet, change not sent");
        return;
    };

    // Hold the guard through the send so an inbound update on another thread
    // cannot interleave with this check
    let registration = registry.lookup(address);
    let guard = registration.as_deref().map(Registration::guard);
    if guard.as_ref().is_some_and(|silent| silent.get()) {
        trace!(address, "Change came from OSC input, not echoing");
        return;
    }

    let message = match adapter.encode(address, value) {
        Ok(message) => message,
        Err(e) => {
            warn!(address, error = %e, "Failed to encode OSC message");
            return;
        }
    };

    if let Err(e) = sink.send(&message) {
        warn!(address, error = %e, "Failed to send OSC message");
    }
}
