//! Inbound dispatch - address → handler list
//!
//! This is the per-message isolation boundary: a failing handler is logged
//! and counted, the remaining handlers and later messages are unaffected.

use crate::error::Result;
use dashmap::DashMap;
use rosc::{OscMessage, OscType};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Handler invoked with the raw arguments of a matching message
pub type InboundHandler = Arc<dyn Fn(&[OscType]) -> Result<()> + Send + Sync>;

/// Result of dispatching one message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    /// Handlers that completed successfully
    pub handled: usize,
    /// Handlers that returned an error (logged and dropped)
    pub failed: usize,
}

impl DispatchOutcome {
    pub fn matched(&self) -> bool {
        self.handled + self.failed > 0
    }
}

#[derive(Default)]
pub struct Dispatcher {
    routes: DashMap<String, Vec<InboundHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler for `address` (multiple handlers per address are allowed)
    pub fn map(&self, address: &str, handler: InboundHandler) {
        self.routes
            .entry(address.to_string())
            .or_default()
            .push(handler);
    }

    /// Drop every handler mapped at `address`
    pub fn clear(&self, address: &str) -> usize {
        self.routes
            .remove(address)
            .map(|(_, handlers)| handlers.len())
            .unwrap_or(0)
    }

    pub fn handler_count(&self, address: &str) -> usize {
        self.routes.get(address).map(|h| h.len()).unwrap_or(0)
    }

    /// Run every handler mapped at the message's address
    pub fn dispatch(&self, message: &OscMessage) -> DispatchOutcome {
        // Clone the list out so no map shard stays locked while handlers run
        let handlers = match self.routes.get(&message.addr) {
            Some(handlers) => handlers.value().clone(),
            None => {
                debug!(address = %message.addr, "No handler for OSC address, dropping");
                return DispatchOutcome::default();
            }
        };

        trace!(address = %message.addr, args = ?message.args, "Dispatching OSC message");

        let mut outcome = DispatchOutcome::default();
        for handler in handlers {
            match handler(&message.args) {
                Ok(()) => outcome.handled += 1,
                Err(e) => {
                    warn!(address = %message.addr, error = %e, "Dropped inbound OSC message");
                    outcome.failed += 1;
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AdapterError, BindError};
    use parking_lot::Mutex;

    fn message(addr: &str, args: Vec<OscType>) -> OscMessage {
        OscMessage {
            addr: addr.to_string(),
            args,
        }
    }

    #[test]
    fn test_dispatch_to_matching_address() {
        let dispatcher = Dispatcher::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        dispatcher.map(
            "/config/age",
            Arc::new(move |args: &[OscType]| {
                sink.lock().push(args.to_vec());
                Ok(())
            }),
        );

        let outcome = dispatcher.dispatch(&message("/config/age", vec![OscType::Int(42)]));
        assert_eq!(outcome, DispatchOutcome { handled: 1, failed: 0 });
        assert_eq!(*seen.lock(), vec![vec![OscType::Int(42)]]);

        let outcome = dispatcher.dispatch(&message("/config/name", vec![]));
        assert!(!outcome.matched());
    }

    #[test]
    fn test_failing_handler_is_isolated() {
        let dispatcher = Dispatcher::new();
        let calls = Arc::new(Mutex::new(0));

        dispatcher.map(
            "/x",
            Arc::new(|_: &[OscType]| Err(BindError::Adapter(AdapterError::MissingArgument))),
        );
        let counter = calls.clone();
        dispatcher.map(
            "/x",
            Arc::new(move |_: &[OscType]| {
                *counter.lock() += 1;
                Ok(())
            }),
        );

        let outcome = dispatcher.dispatch(&message("/x", vec![]));
        assert_eq!(outcome, DispatchOutcome { handled: 1, failed: 1 });

        dispatcher.dispatch(&message("/x", vec![]));
        assert_eq!(*calls.lock(), 2);
    }

    #[test]
    fn test_clear_removes_handlers() {
        let dispatcher = Dispatcher::new();
        dispatcher.map("/x", Arc::new(|_: &[OscType]| Ok(())));
        dispatcher.map("/x", Arc::new(|_: &[OscType]| Ok(())));
        assert_eq!(dispatcher.handler_count("/x"), 2);

        assert_eq!(dispatcher.clear("/x"), 2);
        assert_eq!(dispatcher.handler_count("/x"), 0);
        assert!(!dispatcher.dispatch(&message("/x", vec![])).matched());
    }
}
