//! Tree Service - Cache-Backed Tree Store Orchestration
//!
//! `TreeService` owns the tree-shape invariants:
//!
//! - exactly one root exists; it is bootstrapped at construction and its
//!   identity never changes for the process lifetime
//! - every non-root node's parent reference resolves to an existing node at
//!   the moment it is created or moved
//! - after every persisted write the cache entry for the written identity is
//!   invalidated and re-inserted, so readers converge on the new value
//!
//! # Bootstrap
//!
//! There is no implicit global initialization: `bootstrap()` is the explicit
//! one-shot state machine. It looks for a persisted root (keyed by
//! absence-of-parent), creates one if the store is fresh, and only then hands
//! back a ready service. Repeated bootstraps against the same store reuse the
//! existing root rather than creating a second one.
//!
//! # Concurrency
//!
//! Operations run concurrently against the shared cache and store. Two
//! concurrent moves of the same node race and the last store write wins; the
//! cache reflects whichever write completed last. Moves are not checked for
//! cycles (a node can be moved into its own subtree) - both are inherited,
//! documented behaviors of this service, not oversights in callers.
//!
//! # Examples
//!
//! ```no_run
//! use arbor_core::db::{DatabaseService, TursoStore};
//! use arbor_core::services::{TreeService, TreeServiceConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(DatabaseService::new("./data/arbor.db".into()).await?);
//!     let store = Arc::new(TursoStore::new(db));
//!     let service = TreeService::bootstrap(store, TreeServiceConfig::default()).await?;
//!
//!     let tree = service.get_tree().await?;
//!     let child = service.create_node(tree.id).await?;
//!     println!("created node {}", child.id);
//!     Ok(())
//! }
//! ```

use crate::db::NodeStore;
use crate::models::{Node, NodeId};
use crate::services::error::TreeServiceError;
use crate::services::node_cache::NodeCache;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Process-wide default for the cache entry bound
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Configuration for `TreeService`
#[derive(Debug, Clone)]
pub struct TreeServiceConfig {
    /// Maximum number of entries the node cache may hold
    pub cache_capacity: usize,
}

impl Default for TreeServiceConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Cache-backed tree store
///
/// Construction via [`TreeService::bootstrap`] guarantees the root exists
/// before any operation is served; `root_id` is immutable thereafter.
pub struct TreeService {
    /// Authoritative durable store
    store: Arc<dyn NodeStore>,

    /// Bounded read-through cache over `store`
    cache: NodeCache,

    /// Identity of the bootstrapped root, fixed for the process lifetime
    root_id: NodeId,
}

impl TreeService {
    /// Bootstrap the service against a durable store
    ///
    /// Discovers the persisted root (the node with no parent reference) or
    /// creates one exactly once if the store is fresh, populates the cache
    /// with it, and returns a ready service.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` for a zero cache capacity
    /// - `Store(..)` if root discovery or creation fails
    pub async fn bootstrap(
        store: Arc<dyn NodeStore>,
        config: TreeServiceConfig,
    ) -> Result<Self, TreeServiceError> {
        let cache = NodeCache::new(store.clone(), config.cache_capacity)?;

        let root = match store.get_root_node().await? {
            Some(root) => {
                debug!(root_id = %root.id, "existing root discovered");
                root
            }
            None => {
                let root = store.create_node(None).await?;
                info!(root_id = %root.id, "no root found, created tree root");
                root
            }
        };

        cache.replace(&root).await;

        Ok(Self {
            store,
            cache,
            root_id: root.id,
        })
    }

    /// Identity of the tree root
    pub fn root_id(&self) -> NodeId {
        self.root_id
    }

    /// Fetch the root of the tree
    ///
    /// The root is guaranteed present post-bootstrap, so a not-found here is
    /// an internal consistency bug: it is logged and surfaced as
    /// `RootInvariantViolated`, never as a normal caller `NodeNotFound`.
    pub async fn get_tree(&self) -> Result<Node, TreeServiceError> {
        match self.get_node(self.root_id).await {
            Ok(root) => Ok(root),
            Err(TreeServiceError::NodeNotFound { id }) => {
                error!(root_id = %id, "bootstrapped root is no longer resolvable");
                Err(TreeServiceError::RootInvariantViolated { id })
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch a node by ID, reading through the cache
    ///
    /// # Errors
    ///
    /// `NodeNotFound(id)` when the store has no such node.
    pub async fn get_node(&self, id: NodeId) -> Result<Node, TreeServiceError> {
        self.cache.get(id).await
    }

    /// Create a new node under `parent_id`
    ///
    /// The parent must resolve before anything is written; the parent node
    /// itself is not mutated. The freshly assigned identity is cached via
    /// invalidate-then-insert before the node is returned.
    ///
    /// # Errors
    ///
    /// `NodeNotFound(parent_id)` if the parent does not exist - in which case
    /// no store write has happened.
    pub async fn create_node(&self, parent_id: NodeId) -> Result<Node, TreeServiceError> {
        self.cache.get(parent_id).await?;

        let node = self.store.create_node(Some(parent_id)).await?;
        self.cache.replace(&node).await;

        debug!(node_id = %node.id, parent_id = %parent_id, "node created");
        Ok(node)
    }

    /// Move a node under a new parent
    ///
    /// Both the node and the target parent are resolved before any mutation,
    /// so a failed move is never partially applied. Cycles are not checked;
    /// concurrent moves of the same node are last-write-wins.
    ///
    /// # Errors
    ///
    /// `NodeNotFound` carrying whichever identity failed to resolve, with no
    /// store write performed.
    pub async fn move_node(
        &self,
        node_id: NodeId,
        new_parent_id: NodeId,
    ) -> Result<Node, TreeServiceError> {
        let node = self.cache.get(node_id).await?;
        self.cache.get(new_parent_id).await?;

        let moved = self.store.update_node(&node.reparented(new_parent_id)).await?;
        self.cache.replace(&moved).await;

        debug!(node_id = %node_id, new_parent_id = %new_parent_id, "node moved");
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DatabaseService, TursoStore};

    async fn create_test_service() -> TreeService {
        let db = Arc::new(DatabaseService::new_in_memory().await.unwrap());
        let store = Arc::new(TursoStore::new(db));
        TreeService::bootstrap(store, TreeServiceConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_bootstrap_creates_root_once() {
        let service = create_test_service().await;

        let tree = service.get_tree().await.unwrap();
        assert!(tree.is_root());
        assert_eq!(tree.id, service.root_id());

        // Repeated fetches return the same identity
        let again = service.get_tree().await.unwrap();
        assert_eq!(again.id, tree.id);
    }

    #[tokio::test]
    async fn test_bootstrap_reuses_persisted_root() {
        let db = Arc::new(DatabaseService::new_in_memory().await.unwrap());

        let first = TreeService::bootstrap(
            Arc::new(TursoStore::new(db.clone())),
            TreeServiceConfig::default(),
        )
        .await
        .unwrap();
        let root_id = first.root_id();
        drop(first);

        // Second bootstrap over the same database must not create a second root
        let second = TreeService::bootstrap(
            Arc::new(TursoStore::new(db)),
            TreeServiceConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(second.root_id(), root_id);
    }

    #[tokio::test]
    async fn test_create_node_validates_parent_first() {
        let service = create_test_service().await;

        let err = service.create_node(NodeId::from(9999)).await.unwrap_err();
        match err {
            TreeServiceError::NodeNotFound { id } => assert_eq!(id, NodeId::from(9999)),
            other => panic!("expected NodeNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_then_read_converges() {
        let service = create_test_service().await;

        let n1 = service.create_node(service.root_id()).await.unwrap();
        assert_eq!(n1.parent_id, Some(service.root_id()));

        let reread = service.get_node(n1.id).await.unwrap();
        assert_eq!(reread, n1);
    }

    #[tokio::test]
    async fn test_move_node_updates_parent() {
        let service = create_test_service().await;
        let root_id = service.root_id();

        let n1 = service.create_node(root_id).await.unwrap();
        let n2 = service.create_node(n1.id).await.unwrap();

        let moved = service.move_node(n2.id, root_id).await.unwrap();
        assert_eq!(moved.id, n2.id);
        assert_eq!(moved.parent_id, Some(root_id));

        let reread = service.get_node(n2.id).await.unwrap();
        assert_eq!(reread.parent_id, Some(root_id));
    }

    #[tokio::test]
    async fn test_move_to_missing_parent_is_not_applied() {
        let service = create_test_service().await;

        let n1 = service.create_node(service.root_id()).await.unwrap();
        let err = service
            .move_node(n1.id, NodeId::from(9999))
            .await
            .unwrap_err();
        match err {
            TreeServiceError::NodeNotFound { id } => assert_eq!(id, NodeId::from(9999)),
            other => panic!("expected NodeNotFound, got {other:?}"),
        }

        // Original parent reference is intact
        let reread = service.get_node(n1.id).await.unwrap();
        assert_eq!(reread.parent_id, Some(service.root_id()));
    }

    #[tokio::test]
    async fn test_move_missing_node_reports_node_identity() {
        let service = create_test_service().await;

        let err = service
            .move_node(NodeId::from(4242), service.root_id())
            .await
            .unwrap_err();
        match err {
            TreeServiceError::NodeNotFound { id } => assert_eq!(id, NodeId::from(4242)),
            other => panic!("expected NodeNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_idempotent_reread() {
        let service = create_test_service().await;
        let n1 = service.create_node(service.root_id()).await.unwrap();

        let a = service.get_node(n1.id).await.unwrap();
        let b = service.get_node(n1.id).await.unwrap();
        let c = service.get_node(n1.id).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[tokio::test]
    async fn test_small_cache_capacity_still_serves_all_nodes() {
        let db = Arc::new(DatabaseService::new_in_memory().await.unwrap());
        let store = Arc::new(TursoStore::new(db));
        let service = TreeService::bootstrap(store, TreeServiceConfig { cache_capacity: 2 })
            .await
            .unwrap();

        let mut created = Vec::new();
        for _ in 0..10 {
            created.push(service.create_node(service.root_id()).await.unwrap());
        }

        // Far more nodes than cache slots; every one still resolves
        for node in &created {
            let reread = service.get_node(node.id).await.unwrap();
            assert_eq!(&reread, node);
        }
    }
}
