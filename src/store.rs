use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

/// Key/value store shared by every lifecycle callback of one controller
///
/// Cloning the handle shares the underlying map. Callbacks may read and
/// write freely; there is no transactional behavior.
#[derive(Debug, Clone, Default)]
pub struct Store {
    values: Rc<RefCell<HashMap<String, Value>>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.borrow_mut().insert(key.into(), value.into())
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.values.borrow_mut().remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.values.borrow_mut().clear();
    }

    /// Whether two handles share the same map
    pub fn ptr_eq(&self, other: &Store) -> bool {
        Rc::ptr_eq(&self.values, &other.values)
    }
}
