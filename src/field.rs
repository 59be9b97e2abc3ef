//! Observable data fields
//!
//! A [`DataField`] holds a typed value and notifies subscribers after every
//! assignment. Handles are cheap to clone and share the same storage.
//!
//! Subscribers run on the thread that performed the assignment, after the
//! field's own locks are released, so a subscriber may read or assign the
//! field again without deadlocking.

use crate::error::{BindError, Result};
use crate::value::{FieldValue, Value, ValueType};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Callback invoked with the new value after each change
pub type ChangeCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Type-erased change callback used by the binding engine
pub type ValueCallback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Handle returned by [`DataField::on_change`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct FieldInner<T> {
    value: RwLock<T>,
    subscribers: RwLock<Vec<(SubscriptionId, ChangeCallback<T>)>>,
    next_id: AtomicU64,
}

/// Observable value container
pub struct DataField<T> {
    inner: Arc<FieldInner<T>>,
}

impl<T> Clone for DataField<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: FieldValue> DataField<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(FieldInner {
                value: RwLock::new(value),
                subscribers: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Current value (cloned)
    pub fn value(&self) -> T {
        self.inner.value.read().clone()
    }

    /// Assign a new value and notify all subscribers
    pub fn set_value(&self, value: T) {
        self.inner.set(value);
    }

    /// Notify all subscribers with the current value without changing it
    pub fn fire(&self) {
        self.inner.fire();
    }

    /// Subscribe to changes
    pub fn on_change(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionId {
        self.inner.subscribe(Arc::new(callback))
    }

    /// Remove a subscription; returns false if it was not present
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.read().len()
    }

    /// Type-erased handle for the binding engine
    pub(crate) fn bound(&self) -> Arc<dyn BoundField> {
        self.inner.clone()
    }
}

impl<T: FieldValue + std::fmt::Debug> std::fmt::Debug for DataField<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataField")
            .field("value", &*self.inner.value.read())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<T: FieldValue> FieldInner<T> {
    fn set(&self, value: T) {
        *self.value.write() = value;
        self.fire();
    }

    fn fire(&self) {
        let current = self.value.read().clone();
        let subscribers: Vec<ChangeCallback<T>> = self
            .subscribers
            .read()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();

        for callback in subscribers {
            callback(&current);
        }
    }

    fn subscribe(&self, callback: ChangeCallback<T>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push((id, callback));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }
}

/// Field seen through the [`Value`] model
///
/// The registry keeps `Weak<dyn BoundField>` so it never extends a field's
/// lifetime past its model.
pub trait BoundField: Send + Sync {
    fn current_value(&self) -> Value;

    fn value_type(&self) -> ValueType;

    /// Assign a decoded value; fails if its kind does not match the field
    fn assign(&self, value: Value) -> Result<()>;

    fn subscribe_value(&self, callback: ValueCallback) -> SubscriptionId;

    fn unsubscribe_value(&self, id: SubscriptionId) -> bool;

    fn fire_value(&self);
}

impl<T: FieldValue> BoundField for FieldInner<T> {
    fn current_value(&self) -> Value {
        self.value.read().to_value()
    }

    fn value_type(&self) -> ValueType {
        self.value.read().value_type()
    }

    fn assign(&self, value: Value) -> Result<()> {
        let expected = self.value_type();
        let found = value.kind();
        match T::from_value(value) {
            Some(typed) => {
                self.set(typed);
                Ok(())
            }
            None => Err(BindError::ValueType {
                expected: expected.to_string(),
                found: found.to_string(),
            }),
        }
    }

    fn subscribe_value(&self, callback: ValueCallback) -> SubscriptionId {
        self.subscribe(Arc::new(move |v: &T| callback(&v.to_value())))
    }

    fn unsubscribe_value(&self, id: SubscriptionId) -> bool {
        self.unsubscribe(id)
    }

    fn fire_value(&self) {
        self.fire();
    }
}

/// Upgrade helper that names the address in the error
pub(crate) fn upgrade(field: &Weak<dyn BoundField>, address: &str) -> Result<Arc<dyn BoundField>> {
    field
        .upgrade()
        .ok_or_else(|| BindError::FieldDropped(address.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_set_value_notifies_subscribers() {
        let field = DataField::new(21);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        field.on_change(move |v| sink.lock().push(*v));

        field.set_value(42);
        field.set_value(42);

        assert_eq!(field.value(), 42);
        assert_eq!(*seen.lock(), vec![42, 42]);
    }

    #[test]
    fn test_fire_renotifies_current_value() {
        let field = DataField::new(String::from("Cat"));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        field.on_change(move |v: &String| sink.lock().push(v.clone()));

        field.fire();

        assert_eq!(*seen.lock(), vec!["Cat".to_string()]);
        assert_eq!(field.value(), "Cat");
    }

    #[test]
    fn test_unsubscribe() {
        let field = DataField::new(true);
        let id = field.on_change(|_| {});
        assert_eq!(field.subscriber_count(), 1);
        assert!(field.unsubscribe(id));
        assert!(!field.unsubscribe(id));
        assert_eq!(field.subscriber_count(), 0);
    }

    #[test]
    fn test_subscriber_may_reenter_field() {
        let field = DataField::new(1);
        let handle = field.clone();
        let seen = Arc::new(Mutex::new(0));
        let sink = seen.clone();
        field.on_change(move |_| *sink.lock() = handle.value());

        field.set_value(7);

        assert_eq!(*seen.lock(), 7);
    }

    #[test]
    fn test_bound_field_assign_checks_kind() {
        let field = DataField::new(1.5f32);
        let bound = field.bound();

        bound.assign(Value::Float(2.5)).unwrap();
        assert_eq!(field.value(), 2.5);

        let err = bound.assign(Value::Str("nope".into())).unwrap_err();
        assert!(matches!(err, BindError::ValueType { .. }));
        assert_eq!(field.value(), 2.5);
    }

    #[test]
    fn test_weak_handle_does_not_keep_field_alive() {
        let field = DataField::new(3);
        let weak = Arc::downgrade(&field.bound());
        assert!(upgrade(&weak, "/a").is_ok());

        drop(field);

        assert!(matches!(upgrade(&weak, "/a"), Err(BindError::FieldDropped(_))));
    }
}
