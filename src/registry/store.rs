//! The per-category feature store and its snapshot reconciliation.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::domain::{FeatureId, FeatureKind};

/// A tracked entity record owned by a [`FeatureStore`].
pub trait Feature: Send + Sync + 'static {
    /// The category this entity type belongs to.
    const KIND: FeatureKind;

    /// The entity's immutable identifier.
    fn id(&self) -> &FeatureId;

    /// Lifecycle hook, invoked exactly once after construction and before
    /// the entity is inserted into the store or exposed to any listener.
    fn init(&self) {}
}

/// What one reconciliation pass changed.
#[derive(Debug)]
pub struct ReconcileOutcome<T> {
    /// Newly constructed entities, in ascending identifier order.
    pub added: Vec<Arc<T>>,
    /// Identifiers whose entities were dropped.
    pub removed: Vec<FeatureId>,
}

impl<T> ReconcileOutcome<T> {
    /// True when the snapshot changed nothing.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Owns the current identifier-to-entity mapping for one feature category.
///
/// The store is the sole long-lived strong owner of its entities; readers
/// only ever receive [`Weak`] views (or short-lived [`Arc`] clones via
/// [`snapshot_owned`](Self::snapshot_owned)). Removing an identifier drops
/// the owning `Arc` and thereby revokes every outstanding weak view.
///
/// Invariant: after [`reconcile`](Self::reconcile) returns, the key set of
/// the mapping equals exactly the identifier set of that snapshot.
#[derive(Debug)]
pub struct FeatureStore<T> {
    entries: RwLock<HashMap<FeatureId, Arc<T>>>,
}

impl<T: Feature> FeatureStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Reconcile the store against a complete, de-duplicated snapshot.
    ///
    /// Pure set difference against the current key set: identifiers absent
    /// from `new_ids` are removed immediately (no grace period), and
    /// identifiers not yet present are constructed via `make`. An empty
    /// snapshot removes everything.
    ///
    /// New entities are constructed and `init`-ed before the write lock is
    /// taken; removals and insertions are then applied under a single
    /// write acquisition, so concurrent readers observe either the pre- or
    /// the post-reconciliation mapping, never an intermediate one. The
    /// caller must serialize reconciles per category (the transport
    /// contract); readers need no such discipline.
    pub fn reconcile<F>(&self, new_ids: BTreeSet<FeatureId>, mut make: F) -> ReconcileOutcome<T>
    where
        F: FnMut(&FeatureId) -> Arc<T>,
    {
        let current: BTreeSet<FeatureId> = self.entries.read().keys().cloned().collect();

        let removed: Vec<FeatureId> = current.difference(&new_ids).cloned().collect();
        let added: Vec<Arc<T>> = new_ids
            .difference(&current)
            .map(|id| {
                let entity = make(id);
                entity.init();
                entity
            })
            .collect();

        let dropped: Vec<Arc<T>>;
        {
            let mut entries = self.entries.write();
            dropped = removed
                .iter()
                .filter_map(|id| entries.remove(id))
                .collect();
            for entity in &added {
                entries.insert(entity.id().clone(), Arc::clone(entity));
            }
        }
        // Entity destructors run here, after the lock is released.
        drop(dropped);

        ReconcileOutcome { added, removed }
    }

    /// Point-in-time copy of non-owning views of every tracked entity.
    pub fn snapshot(&self) -> HashMap<FeatureId, Weak<T>> {
        self.entries
            .read()
            .iter()
            .map(|(id, entity)| (id.clone(), Arc::downgrade(entity)))
            .collect()
    }

    /// Point-in-time copy of owned handles to every tracked entity.
    ///
    /// The returned references stay readable for as long as the map is
    /// held, even across a later reconciliation that removes them.
    pub fn snapshot_owned(&self) -> HashMap<FeatureId, Arc<T>> {
        self.entries
            .read()
            .iter()
            .map(|(id, entity)| (id.clone(), Arc::clone(entity)))
            .collect()
    }

    /// Non-owning view of one entity, if currently tracked.
    pub fn get(&self, id: &FeatureId) -> Option<Weak<T>> {
        self.entries.read().get(id).map(Arc::downgrade)
    }

    /// Number of currently tracked entities.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<T: Feature> Default for FeatureStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Probe {
        id: FeatureId,
        inits: Arc<AtomicUsize>,
    }

    impl Feature for Probe {
        const KIND: FeatureKind = FeatureKind::Face;

        fn id(&self) -> &FeatureId {
            &self.id
        }

        fn init(&self) {
            self.inits.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn ids(tokens: &[&str]) -> BTreeSet<FeatureId> {
        tokens.iter().map(|t| FeatureId::new(*t)).collect()
    }

    fn make_probe(inits: &Arc<AtomicUsize>) -> impl FnMut(&FeatureId) -> Arc<Probe> + '_ {
        move |id| {
            Arc::new(Probe {
                id: id.clone(),
                inits: Arc::clone(inits),
            })
        }
    }

    #[test]
    fn test_diff_against_current_state() {
        let store = FeatureStore::<Probe>::new();
        let inits = Arc::new(AtomicUsize::new(0));

        let outcome = store.reconcile(ids(&["a", "b"]), make_probe(&inits));
        assert_eq!(outcome.added.len(), 2);
        assert!(outcome.removed.is_empty());
        assert_eq!(store.len(), 2);

        let outcome = store.reconcile(ids(&["b", "c"]), make_probe(&inits));
        assert_eq!(outcome.added.len(), 1);
        assert_eq!(outcome.added[0].id(), &FeatureId::new("c"));
        assert_eq!(outcome.removed, vec![FeatureId::new("a")]);

        let keys: BTreeSet<FeatureId> = store.snapshot().into_keys().collect();
        assert_eq!(keys, ids(&["b", "c"]));
    }

    #[test]
    fn test_same_snapshot_twice_is_idempotent() {
        let store = FeatureStore::<Probe>::new();
        let inits = Arc::new(AtomicUsize::new(0));

        store.reconcile(ids(&["a", "b"]), make_probe(&inits));
        let outcome = store.reconcile(ids(&["a", "b"]), make_probe(&inits));

        assert!(outcome.is_empty());
        assert_eq!(inits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_empty_snapshot_removes_everything() {
        let store = FeatureStore::<Probe>::new();
        let inits = Arc::new(AtomicUsize::new(0));

        store.reconcile(ids(&["a", "b", "c"]), make_probe(&inits));
        let outcome = store.reconcile(BTreeSet::new(), make_probe(&inits));

        assert_eq!(outcome.removed.len(), 3);
        assert!(store.is_empty());
    }

    #[test]
    fn test_reintroduced_id_is_a_fresh_entity() {
        let store = FeatureStore::<Probe>::new();
        let inits = Arc::new(AtomicUsize::new(0));

        store.reconcile(ids(&["a"]), make_probe(&inits));
        let first = store.snapshot_owned()[&FeatureId::new("a")].clone();

        store.reconcile(BTreeSet::new(), make_probe(&inits));
        store.reconcile(ids(&["a"]), make_probe(&inits));
        let second = store.snapshot_owned()[&FeatureId::new("a")].clone();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(inits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_added_is_sorted_ascending() {
        let store = FeatureStore::<Probe>::new();
        let inits = Arc::new(AtomicUsize::new(0));

        let outcome = store.reconcile(ids(&["c", "a", "b"]), make_probe(&inits));
        let order: Vec<&str> = outcome.added.iter().map(|e| e.id().as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_removal_revokes_weak_views() {
        let store = FeatureStore::<Probe>::new();
        let inits = Arc::new(AtomicUsize::new(0));

        store.reconcile(ids(&["a"]), make_probe(&inits));
        let weak = store.get(&FeatureId::new("a")).unwrap();
        assert!(weak.upgrade().is_some());

        store.reconcile(BTreeSet::new(), make_probe(&inits));
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_init_runs_before_insertion() {
        let store = FeatureStore::<Probe>::new();
        let inits = Arc::new(AtomicUsize::new(0));

        // make() observes the store as it was before this reconcile pass.
        let inits_clone = Arc::clone(&inits);
        store.reconcile(ids(&["a"]), |id| {
            assert!(store.is_empty());
            Arc::new(Probe {
                id: id.clone(),
                inits: Arc::clone(&inits_clone),
            })
        });
        assert_eq!(inits.load(Ordering::SeqCst), 1);
        assert_eq!(store.len(), 1);
    }
}
