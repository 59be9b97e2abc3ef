//! Endpoint registry - address → registration map
//!
//! Each registration carries its own suppression guard. The inbound handler
//! holds the guard while it assigns a received value; the outbound handler
//! takes the same guard before deciding to send. Because the guard is
//! re-entrant, the outbound check triggered *by* the assignment (same thread)
//! sees the flag set, while a concurrent local change on another thread waits
//! for the assignment to finish and then sends normally.

use crate::adapter::OscAdapter;
use crate::field::{BoundField, SubscriptionId};
use crate::model::OscEndpoint;
use crate::value::ValueType;
use dashmap::DashMap;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use serde::Serialize;
use std::cell::Cell;
use std::sync::{Arc, Weak};

/// Stored binding between an address and a local field
pub struct Registration {
    pub address: String,
    pub annotation: OscEndpoint,
    /// Field type captured at registration (decode target)
    pub value_type: ValueType,
    pub(crate) field: Weak<dyn BoundField>,
    pub(crate) adapter: Arc<dyn OscAdapter>,
    /// Outbound change subscription on the field, if the direction sends
    pub(crate) subscription: Option<SubscriptionId>,
    silent: ReentrantMutex<Cell<bool>>,
}

impl Registration {
    pub(crate) fn new(
        address: String,
        field: Weak<dyn BoundField>,
        annotation: OscEndpoint,
        value_type: ValueType,
        adapter: Arc<dyn OscAdapter>,
        subscription: Option<SubscriptionId>,
    ) -> Self {
        Self {
            address,
            annotation,
            value_type,
            field,
            adapter,
            subscription,
            silent: ReentrantMutex::new(Cell::new(false)),
        }
    }

    pub fn adapter_name(&self) -> &str {
        self.adapter.name()
    }

    /// Whether the bound field still exists
    pub fn is_live(&self) -> bool {
        self.field.strong_count() > 0
    }

    pub fn is_silent(&self) -> bool {
        self.silent.lock().get()
    }

    /// Lock the suppression guard (re-entrant on the current thread)
    pub(crate) fn guard(&self) -> ReentrantMutexGuard<'_, Cell<bool>> {
        self.silent.lock()
    }

    /// Run `f` with the suppression flag raised; the flag is cleared even if
    /// `f` panics
    pub(crate) fn silenced<R>(&self, f: impl FnOnce() -> R) -> R {
        struct Reset<'a>(&'a Cell<bool>);
        impl Drop for Reset<'_> {
            fn drop(&mut self) {
                self.0.set(false);
            }
        }

        let guard = self.silent.lock();
        guard.set(true);
        let _reset = Reset(&guard);
        f()
    }

    pub fn info(&self) -> RegistrationInfo {
        RegistrationInfo {
            address: self.address.clone(),
            direction: self.annotation.direction.to_string(),
            value_type: self.value_type.to_string(),
            adapter: self.adapter_name().to_string(),
            live: self.is_live(),
        }
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("address", &self.address)
            .field("direction", &self.annotation.direction)
            .field("value_type", &self.value_type)
            .field("adapter", &self.adapter_name())
            .field("silent", &self.is_silent())
            .finish()
    }
}

/// Serializable view of a registration (diagnostics)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationInfo {
    pub address: String,
    pub direction: String,
    pub value_type: String,
    pub adapter: String,
    pub live: bool,
}

/// Authoritative address → registration mapping for one service
#[derive(Default)]
pub struct EndpointRegistry {
    entries: DashMap<String, Arc<Registration>>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry at the registration's address
    ///
    /// Returns the replaced registration, if any.
    pub fn register(&self, registration: Registration) -> Option<Arc<Registration>> {
        self.entries
            .insert(registration.address.clone(), Arc::new(registration))
    }

    pub fn lookup(&self, address: &str) -> Option<Arc<Registration>> {
        self.entries.get(address).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, address: &str) -> bool {
        self.entries.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All registrations sorted by address
    pub fn snapshot(&self) -> Vec<Arc<Registration>> {
        let mut all: Vec<_> = self.entries.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.address.cmp(&b.address));
        all
    }
}
