//! Instance lookup for non-static commands.
//!
//! The default [`InstanceRegistry`] holds weak references to host objects
//! registered under display names. Objects dropped by the host disappear from
//! lookups without being unregistered.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::member::{Instance, TypeInfo};

/// Finds live instances of a declaring type by name.
pub trait InstanceFinder {
    /// Find an instance of `ty` whose name equals or starts with `query`,
    /// ignoring case.
    fn find(&mut self, ty: &TypeInfo, query: &str) -> Option<Instance>;

    /// Names of every live instance of `ty`.
    fn names(&self, ty: &TypeInfo) -> Vec<String>;
}

struct Entry {
    name: String,
    type_id: TypeId,
    object: Weak<RefCell<dyn Any>>,
}

struct CachedLookup {
    at: Instant,
    object: Weak<RefCell<dyn Any>>,
}

#[derive(Default)]
struct Inner {
    entries: Vec<Entry>,
    cache: FxHashMap<(TypeId, String), CachedLookup>,
}

/// Name-indexed registry of weakly held host objects.
///
/// Clones share the same registry, so a host can keep a handle after giving
/// one to the console.
#[derive(Clone)]
pub struct InstanceRegistry {
    inner: Rc<RefCell<Inner>>,
    ttl: Duration,
}

impl InstanceRegistry {
    /// Create a registry caching lookups for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Rc::default(),
            ttl,
        }
    }

    /// Register an object under a display name.
    pub fn register<T: Any>(&self, name: impl Into<String>, object: &Rc<RefCell<T>>) {
        let erased: Instance = object.clone();
        let mut inner = self.inner.borrow_mut();
        inner.entries.push(Entry {
            name: name.into(),
            type_id: TypeId::of::<T>(),
            object: Rc::downgrade(&erased),
        });
        inner.cache.clear();
    }

    /// Forget every object registered under `name`.
    pub fn unregister(&self, name: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.entries.retain(|e| !e.name.eq_ignore_ascii_case(name));
        inner.cache.clear();
    }

    /// Number of live registered objects.
    pub fn len(&self) -> usize {
        let mut inner = self.inner.borrow_mut();
        inner.entries.retain(|e| e.object.strong_count() > 0);
        inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(inner: &mut Inner, type_id: TypeId, query: &str) -> Option<Instance> {
        inner.entries.retain(|e| e.object.strong_count() > 0);
        let query = query.to_lowercase();
        let candidates = || inner.entries.iter().filter(|e| e.type_id == type_id);

        candidates()
            .find(|e| e.name.to_lowercase() == query)
            .or_else(|| candidates().find(|e| e.name.to_lowercase().starts_with(&query)))
            .and_then(|e| e.object.upgrade())
    }
}

impl InstanceFinder for InstanceRegistry {
    fn find(&mut self, ty: &TypeInfo, query: &str) -> Option<Instance> {
        let mut inner = self.inner.borrow_mut();
        let cache_key = (ty.id(), query.to_lowercase());

        if let Some(cached) = inner.cache.get(&cache_key)
            && cached.at.elapsed() < self.ttl
            && let Some(object) = cached.object.upgrade()
        {
            trace!(query, ty = ty.name(), "instance cache hit");
            return Some(object);
        }

        let found = Self::lookup(&mut inner, ty.id(), query)?;
        inner.cache.insert(
            cache_key,
            CachedLookup {
                at: Instant::now(),
                object: Rc::downgrade(&found),
            },
        );
        Some(found)
    }

    fn names(&self, ty: &TypeInfo) -> Vec<String> {
        self.inner
            .borrow()
            .entries
            .iter()
            .filter(|e| e.type_id == ty.id() && e.object.strong_count() > 0)
            .map(|e| e.name.clone())
            .collect()
    }
}

impl std::fmt::Debug for InstanceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceRegistry")
            .field("entries", &self.inner.borrow().entries.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}
