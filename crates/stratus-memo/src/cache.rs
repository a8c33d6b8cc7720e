//! Per-context memoization caches.
//!
//! Both flavors are cheap handles around shared interior state. Cloning a
//! handle yields the same cache (see `ptr_eq`). Handles are `!Send`: a cache
//! belongs to the thread that created it.

use std::any::Any;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use crate::key::CacheKey;

/// Type-erased value store shared by both cache flavors.
#[derive(Default)]
struct Store {
    entries: RefCell<HashMap<CacheKey, Rc<dyn Any>>>,
}

impl Store {
    fn get_shared(&self, key: &CacheKey) -> Option<Rc<dyn Any>> {
        self.entries.borrow().get(key).cloned()
    }

    fn get<T: Any + Clone>(&self, key: &CacheKey) -> Option<T> {
        self.entries
            .borrow()
            .get(key)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    fn put(&self, key: CacheKey, value: Rc<dyn Any>) {
        self.entries.borrow_mut().insert(key, value);
    }

    fn contains(&self, key: &CacheKey) -> bool {
        self.entries.borrow().contains_key(key)
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

#[derive(Default)]
struct ResourceState {
    store: Store,
    attributes: RefCell<HashMap<CacheKey, BTreeMap<String, serde_json::Value>>>,
}

/// Cache of constructed resource objects and their loaded attributes.
#[derive(Clone, Default)]
pub struct ResourceCache {
    state: Rc<ResourceState>,
}

impl ResourceCache {
    /// Create an empty resource cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value, if one of type `T` is stored under `key`.
    pub fn get<T: Any + Clone>(&self, key: &CacheKey) -> Option<T> {
        self.state.store.get(key)
    }

    /// Get the stored value without committing to a type.
    pub fn get_shared(&self, key: &CacheKey) -> Option<Rc<dyn Any>> {
        self.state.store.get_shared(key)
    }

    /// Store a value. Last write wins.
    pub fn put<T: Any>(&self, key: impl Into<CacheKey>, value: T) {
        self.state.store.put(key.into(), Rc::new(value));
    }

    /// Check whether a value is stored under `key`.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.state.store.contains(key)
    }

    /// Number of distinct resources holding a value, attributes or both.
    pub fn len(&self) -> usize {
        let entries = self.state.store.entries.borrow();
        let attributes = self.state.attributes.borrow();
        entries
            .keys()
            .chain(attributes.keys())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Check whether no value and no attribute is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge loaded attributes for the resource identified by `key`.
    ///
    /// Attributes already cached for the resource are kept unless `attributes`
    /// names them again.
    pub fn store<I, K>(&self, key: impl Into<CacheKey>, attributes: I)
    where
        I: IntoIterator<Item = (K, serde_json::Value)>,
        K: Into<String>,
    {
        self.state
            .attributes
            .borrow_mut()
            .entry(key.into())
            .or_default()
            .extend(attributes.into_iter().map(|(k, v)| (k.into(), v)));
    }

    /// Get one cached attribute of a resource.
    pub fn attribute(&self, key: &CacheKey, name: &str) -> Option<serde_json::Value> {
        self.state
            .attributes
            .borrow()
            .get(key)
            .and_then(|attrs| attrs.get(name))
            .cloned()
    }

    /// Check whether an attribute of a resource is cached.
    pub fn is_cached(&self, key: &CacheKey, name: &str) -> bool {
        self.state
            .attributes
            .borrow()
            .get(key)
            .is_some_and(|attrs| attrs.contains_key(name))
    }

    /// Remove every value and attribute.
    pub fn clear(&self) {
        self.state.store.clear();
        self.state.attributes.borrow_mut().clear();
    }

    /// Check whether two handles refer to the same cache.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCache")
            .field("values", &self.len())
            .field("resources", &self.state.attributes.borrow().len())
            .finish()
    }
}

#[derive(Default)]
struct ResponseState {
    store: Store,
    /// Operation that produced each entry, in insertion order.
    log: RefCell<Vec<(String, CacheKey)>>,
}

/// Cache of raw service responses keyed by request fingerprint.
#[derive(Clone, Default)]
pub struct ResponseCache {
    state: Rc<ResponseState>,
}

impl ResponseCache {
    /// Create an empty response cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a response, if one of type `T` is stored under `key`.
    pub fn get<T: Any + Clone>(&self, key: &CacheKey) -> Option<T> {
        self.state.store.get(key)
    }

    /// Get the stored value without committing to a type.
    pub fn get_shared(&self, key: &CacheKey) -> Option<Rc<dyn Any>> {
        self.state.store.get_shared(key)
    }

    /// Store a response that is not tied to a named operation.
    pub fn put<T: Any>(&self, key: impl Into<CacheKey>, value: T) {
        let key = key.into();
        self.forget(&key);
        self.state.store.put(key, Rc::new(value));
    }

    /// Store a response produced by `operation`. Last write wins.
    pub fn add<T: Any>(&self, operation: impl Into<String>, key: impl Into<CacheKey>, value: T) {
        let key = key.into();
        self.forget(&key);
        self.state
            .log
            .borrow_mut()
            .push((operation.into(), key.clone()));
        self.state.store.put(key, Rc::new(value));
    }

    /// Every cached response produced by one of `operations`, oldest first.
    pub fn select<T: Any + Clone>(&self, operations: &[&str]) -> Vec<T> {
        self.state
            .log
            .borrow()
            .iter()
            .filter(|(operation, _)| operations.contains(&operation.as_str()))
            .filter_map(|(_, key)| self.state.store.get(key))
            .collect()
    }

    /// Check whether a response is stored under `key`.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.state.store.contains(key)
    }

    /// Number of stored responses.
    pub fn len(&self) -> usize {
        self.state.store.len()
    }

    /// Check whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every response.
    pub fn clear(&self) {
        self.state.store.clear();
        self.state.log.borrow_mut().clear();
    }

    /// Check whether two handles refer to the same cache.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    fn forget(&self, key: &CacheKey) {
        self.state.log.borrow_mut().retain(|(_, logged)| logged != key);
    }
}

impl fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache")
            .field("responses", &self.len())
            .finish()
    }
}
