//! Loader-Backed Node Cache
//!
//! Bounded, LRU-evicting cache mapping node identity to node value, sitting
//! in front of the durable `NodeStore`. On a miss the cache reads through to
//! the store and populates itself; store absence surfaces as an explicit
//! `NodeNotFound` result rather than a generic failure wrapper.
//!
//! # Consistency
//!
//! The store stays authoritative: eviction is never a correctness problem
//! because any miss is resolvable by a store read. Writers keep the cache
//! coherent with `replace()` (invalidate-then-insert after every persisted
//! write), so a reader observes either the pre- or post-write value of a
//! node, never a torn one.
//!
//! # Concurrency
//!
//! The cache is internally synchronized; callers need no external locking.
//! The lock is never held across the store read, so two tasks missing on the
//! same key may both load it. Duplicate loads are idempotent reads of
//! authoritative state and both converge to the same entry.

use crate::db::NodeStore;
use crate::models::{Node, NodeId};
use crate::services::error::TreeServiceError;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::trace;

/// Bounded read-through cache over the durable node store
pub struct NodeCache {
    /// LRU entries, guarded for concurrent access
    entries: Mutex<LruCache<NodeId, Node>>,

    /// Loader target for cache misses
    store: Arc<dyn NodeStore>,
}

impl NodeCache {
    /// Create a cache holding at most `capacity` entries
    ///
    /// # Errors
    ///
    /// Rejects a zero capacity, which would make every lookup a store read.
    pub fn new(store: Arc<dyn NodeStore>, capacity: usize) -> Result<Self, TreeServiceError> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            TreeServiceError::invalid_configuration("cache_capacity must be > 0")
        })?;

        Ok(Self {
            entries: Mutex::new(LruCache::new(capacity)),
            store,
        })
    }

    /// Fetch a node, loading it from the store on a miss
    ///
    /// # Errors
    ///
    /// - `NodeNotFound(id)` when the store has no such node
    /// - `Store(..)` when the underlying read fails
    pub async fn get(&self, id: NodeId) -> Result<Node, TreeServiceError> {
        if let Some(node) = self.entries.lock().await.get(&id) {
            trace!(node_id = %id, "cache hit");
            return Ok(*node);
        }

        // Miss: load outside the lock. Concurrent misses for the same key
        // may each read the store; both insert the same authoritative value.
        trace!(node_id = %id, "cache miss, loading from store");
        let loaded = self
            .store
            .get_node(id)
            .await?
            .ok_or(TreeServiceError::NodeNotFound { id })?;

        self.entries.lock().await.put(id, loaded);
        Ok(loaded)
    }

    /// Invalidate-then-insert the entry for a freshly persisted node
    ///
    /// Called after every successful store write so readers never see a
    /// superseded value for this identity.
    pub async fn replace(&self, node: &Node) {
        let mut entries = self.entries.lock().await;
        entries.pop(&node.id);
        entries.put(node.id, *node);
    }

    /// Remove the entry for an identity, if present
    pub async fn invalidate(&self, id: NodeId) {
        self.entries.lock().await.pop(&id);
    }

    /// Look at a cached value without touching recency or the store
    ///
    /// Diagnostic accessor; operations go through `get`.
    pub async fn peek(&self, id: NodeId) -> Option<Node> {
        self.entries.lock().await.peek(&id).copied()
    }

    /// Number of currently cached entries
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the cache currently holds no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StoreError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    /// In-memory NodeStore stub that counts loads and can simulate outages
    struct StubStore {
        nodes: std::sync::Mutex<HashMap<NodeId, Node>>,
        next_id: AtomicU64,
        loads: AtomicUsize,
        unavailable: std::sync::atomic::AtomicBool,
    }

    impl StubStore {
        fn new() -> Self {
            Self {
                nodes: std::sync::Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                loads: AtomicUsize::new(0),
                unavailable: std::sync::atomic::AtomicBool::new(false),
            }
        }

        fn set_unavailable(&self) {
            self.unavailable.store(true, Ordering::SeqCst);
        }

        fn load_count(&self) -> usize {
            self.loads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NodeStore for StubStore {
        async fn create_node(&self, parent_id: Option<NodeId>) -> Result<Node, StoreError> {
            let id = NodeId::from(self.next_id.fetch_add(1, Ordering::SeqCst));
            let node = Node::new(id, parent_id);
            self.nodes.lock().unwrap().insert(id, node);
            Ok(node)
        }

        async fn get_node(&self, id: NodeId) -> Result<Option<Node>, StoreError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(StoreError::sql_execution("storage unavailable"));
            }
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.nodes.lock().unwrap().get(&id).copied())
        }

        async fn update_node(&self, node: &Node) -> Result<Node, StoreError> {
            self.nodes.lock().unwrap().insert(node.id, *node);
            Ok(*node)
        }

        async fn get_root_node(&self) -> Result<Option<Node>, StoreError> {
            Ok(self
                .nodes
                .lock()
                .unwrap()
                .values()
                .find(|n| n.is_root())
                .copied())
        }
    }

    #[tokio::test]
    async fn test_miss_loads_from_store_then_hits() {
        let store = Arc::new(StubStore::new());
        let node = store.create_node(None).await.unwrap();

        let cache = NodeCache::new(store.clone(), 10).unwrap();

        let first = cache.get(node.id).await.unwrap();
        assert_eq!(first, node);
        assert_eq!(store.load_count(), 1);

        // Second read is served from the cache
        let second = cache.get(node.id).await.unwrap();
        assert_eq!(second, node);
        assert_eq!(store.load_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_key_is_node_not_found() {
        let store = Arc::new(StubStore::new());
        let cache = NodeCache::new(store, 10).unwrap();

        let err = cache.get(NodeId::from(9999)).await.unwrap_err();
        match err {
            TreeServiceError::NodeNotFound { id } => assert_eq!(id, NodeId::from(9999)),
            other => panic!("expected NodeNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_not_folded_into_not_found() {
        let store = Arc::new(StubStore::new());
        let node = store.create_node(None).await.unwrap();
        store.set_unavailable();

        let cache = NodeCache::new(store, 10).unwrap();
        let err = cache.get(node.id).await.unwrap_err();
        assert!(matches!(err, TreeServiceError::Store(_)));
    }

    #[tokio::test]
    async fn test_eviction_beyond_capacity_still_resolves_via_store() {
        let store = Arc::new(StubStore::new());
        let root = store.create_node(None).await.unwrap();
        let mut ids = vec![root.id];
        for _ in 0..4 {
            ids.push(store.create_node(Some(root.id)).await.unwrap().id);
        }

        let cache = NodeCache::new(store.clone(), 2).unwrap();
        for id in &ids {
            cache.get(*id).await.unwrap();
        }
        assert_eq!(cache.len().await, 2);

        // Evicted entries are gone from the cache but still readable
        assert!(cache.peek(ids[0]).await.is_none());
        let reread = cache.get(ids[0]).await.unwrap();
        assert_eq!(reread.id, ids[0]);
    }

    #[tokio::test]
    async fn test_replace_supersedes_cached_value() {
        let store = Arc::new(StubStore::new());
        let root = store.create_node(None).await.unwrap();
        let other = store.create_node(Some(root.id)).await.unwrap();
        let node = store.create_node(Some(root.id)).await.unwrap();

        let cache = NodeCache::new(store.clone(), 10).unwrap();
        cache.get(node.id).await.unwrap();

        let moved = node.reparented(other.id);
        store.update_node(&moved).await.unwrap();
        cache.replace(&moved).await;

        // Read reflects the write without another store load
        let loads_before = store.load_count();
        let cached = cache.get(node.id).await.unwrap();
        assert_eq!(cached.parent_id, Some(other.id));
        assert_eq!(store.load_count(), loads_before);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let store = Arc::new(StubStore::new());
        let node = store.create_node(None).await.unwrap();

        let cache = NodeCache::new(store.clone(), 10).unwrap();
        cache.get(node.id).await.unwrap();
        cache.invalidate(node.id).await;

        assert!(cache.peek(node.id).await.is_none());
        cache.get(node.id).await.unwrap();
        assert_eq!(store.load_count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_misses_converge() {
        let store = Arc::new(StubStore::new());
        let node = store.create_node(None).await.unwrap();
        let cache = Arc::new(NodeCache::new(store.clone(), 10).unwrap());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move { cache.get(node.id).await }));
        }
        for handle in handles {
            let fetched = handle.await.unwrap().unwrap();
            assert_eq!(fetched, node);
        }

        // A single entry remains whatever interleaving happened
        assert_eq!(cache.len().await, 1);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let store = Arc::new(StubStore::new());
        let result = NodeCache::new(store, 0);
        assert!(matches!(
            result,
            Err(TreeServiceError::InvalidConfiguration(_))
        ));
    }
}
