//! LRU cache for parsed objects, consulted by the object database before it
//! touches the loose-object store.

use std::num::NonZeroUsize;

use lit_hash::ObjectId;
use lru::LruCache;

use crate::Object;

#[derive(Debug)]
pub struct ObjectCache {
    cache: LruCache<ObjectId, Object>,
}

impl ObjectCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap()),
            ),
        }
    }

    /// Get a cached object, promoting it to most-recently-used.
    pub fn get(&mut self, oid: &ObjectId) -> Option<&Object> {
        self.cache.get(oid)
    }

    /// Peek without promoting.
    pub fn peek(&self, oid: &ObjectId) -> Option<&Object> {
        self.cache.peek(oid)
    }

    /// Insert an object, returning the evicted entry if the cache was full.
    pub fn insert(&mut self, oid: ObjectId, obj: Object) -> Option<(ObjectId, Object)> {
        self.cache.push(oid, obj)
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.cache.contains(oid)
    }
}
