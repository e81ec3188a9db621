//! The reconciliation engine façade.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Weak};

use crate::domain::{Body, Face, FeatureId, FeatureKind, Person, Voice};
use crate::registry::{Feature, FeatureStore, ListenerSet};
use crate::transport::{SnapshotPublisher, SnapshotReceiver, TransportHandle};
use crate::RegistryConfig;

/// Live registry of perceived human features.
///
/// Owns one [`FeatureStore`] and one [`ListenerSet`] per category and
/// drives them from incoming identifier snapshots. This is the one type
/// application code holds on to:
///
/// ```
/// use human_registry::{FeatureKind, HumanRegistry};
///
/// let registry = HumanRegistry::with_defaults();
/// registry.on_face(|face| {
///     if let Some(face) = face.upgrade() {
///         println!("face {} appeared", face.id());
///     }
/// });
///
/// registry.apply_snapshot(FeatureKind::Face, &["f1".into(), "f2".into()]);
/// assert_eq!(registry.faces().len(), 2);
/// ```
///
/// The registry is a cheap clonable handle; clones share state. Read
/// accessors may be called from any thread, concurrently with snapshot
/// application. Snapshot application for a single category must be
/// serialized by the transport; different categories may race freely.
#[derive(Clone)]
pub struct HumanRegistry {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    config: RegistryConfig,
    transport: TransportHandle,

    faces: FeatureStore<Face>,
    bodies: FeatureStore<Body>,
    voices: FeatureStore<Voice>,
    persons: FeatureStore<Person>,

    on_face: ListenerSet<Weak<Face>>,
    on_body: ListenerSet<Weak<Body>>,
    on_voice: ListenerSet<Weak<Voice>>,
    on_person: ListenerSet<Arc<Person>>,

    weak_self: Weak<EngineInner>,
}

/// Non-owning lookup handle back into a [`HumanRegistry`].
///
/// Held by every [`Person`] the engine creates, so a person can resolve
/// which face, body, or voice currently belongs to it without keeping the
/// engine alive. Once the engine is dropped, every lookup through this
/// handle returns `None`.
#[derive(Debug, Clone)]
pub struct RegistryRef(Weak<EngineInner>);

impl RegistryRef {
    /// Recover a full registry handle, if the engine is still alive.
    pub fn upgrade(&self) -> Option<HumanRegistry> {
        self.0.upgrade().map(|inner| HumanRegistry { inner })
    }

    pub(crate) fn face(&self, id: &FeatureId) -> Option<Weak<Face>> {
        self.0.upgrade().and_then(|inner| inner.faces.get(id))
    }

    pub(crate) fn body(&self, id: &FeatureId) -> Option<Weak<Body>> {
        self.0.upgrade().and_then(|inner| inner.bodies.get(id))
    }

    pub(crate) fn voice(&self, id: &FeatureId) -> Option<Weak<Voice>> {
        self.0.upgrade().and_then(|inner| inner.voices.get(id))
    }
}

impl HumanRegistry {
    /// Create a registry with the provided configuration.
    pub fn new(config: RegistryConfig) -> Self {
        let transport = TransportHandle::new(config.namespace_root.clone());
        let inner = Arc::new_cyclic(|weak| EngineInner {
            config,
            transport,
            faces: FeatureStore::new(),
            bodies: FeatureStore::new(),
            voices: FeatureStore::new(),
            persons: FeatureStore::new(),
            on_face: ListenerSet::new(),
            on_body: ListenerSet::new(),
            on_voice: ListenerSet::new(),
            on_person: ListenerSet::new(),
            weak_self: weak.clone(),
        });
        tracing::debug!(root = %inner.transport.root(), "human registry initialised");
        Self { inner }
    }

    /// Create a registry with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(RegistryConfig::default())
    }

    /// The transport handle entities were constructed with.
    pub fn transport(&self) -> &TransportHandle {
        &self.inner.transport
    }

    /// A non-owning handle onto this registry.
    pub fn weak_handle(&self) -> RegistryRef {
        RegistryRef(Arc::downgrade(&self.inner))
    }

    /// Create a snapshot channel sized per this registry's configuration.
    ///
    /// Hand the receiver to [`run`](Self::run) and the publisher to the
    /// transport layer.
    pub fn snapshot_channel(&self) -> (SnapshotPublisher, SnapshotReceiver) {
        crate::transport::snapshot_channel(self.inner.config.snapshot_queue)
    }

    /// Apply one category's fresh identifier snapshot.
    ///
    /// This is the single state-transition operation: the raw tokens are
    /// de-duplicated into a set (empty tokens dropped), diffed against the
    /// category's current state, departed entities destroyed, new entities
    /// constructed and `init`-ed, and the category's listeners notified
    /// once per addition in ascending identifier order. Removals trigger
    /// no notification.
    ///
    /// Runs synchronously on the calling thread and never blocks on I/O.
    pub fn apply_snapshot(&self, kind: FeatureKind, tokens: &[String]) {
        let mut new_ids = BTreeSet::new();
        for token in tokens {
            match FeatureId::parse(token) {
                Some(id) => {
                    new_ids.insert(id);
                }
                None => tracing::trace!(kind = %kind, "dropping empty identifier token"),
            }
        }

        let inner = &self.inner;
        match kind {
            FeatureKind::Face => {
                let transport = inner.transport.clone();
                reconcile_category(
                    &inner.faces,
                    &inner.on_face,
                    new_ids,
                    move |id| Arc::new(Face::new(id.clone(), transport.clone())),
                    Arc::downgrade,
                );
            }
            FeatureKind::Body => {
                let transport = inner.transport.clone();
                reconcile_category(
                    &inner.bodies,
                    &inner.on_body,
                    new_ids,
                    move |id| Arc::new(Body::new(id.clone(), transport.clone())),
                    Arc::downgrade,
                );
            }
            FeatureKind::Voice => {
                let transport = inner.transport.clone();
                reconcile_category(
                    &inner.voices,
                    &inner.on_voice,
                    new_ids,
                    move |id| Arc::new(Voice::new(id.clone(), transport.clone())),
                    Arc::downgrade,
                );
            }
            FeatureKind::Person => {
                let transport = inner.transport.clone();
                let registry = RegistryRef(inner.weak_self.clone());
                reconcile_category(
                    &inner.persons,
                    &inner.on_person,
                    new_ids,
                    move |id| {
                        Arc::new(Person::new(id.clone(), transport.clone(), registry.clone()))
                    },
                    Arc::clone,
                );
            }
        }
    }

    /// Drive the registry from a snapshot channel until it closes.
    pub async fn run(&self, mut snapshots: SnapshotReceiver) {
        while let Some(update) = snapshots.recv().await {
            self.apply_snapshot(update.kind, &update.ids);
        }
        tracing::info!("snapshot channel closed, stopping registry pump");
    }

    /// Currently tracked faces, as non-owning views.
    ///
    /// A view may stop upgrading at any moment once a later snapshot drops
    /// its identifier; validate with [`Weak::upgrade`] before use.
    pub fn faces(&self) -> HashMap<FeatureId, Weak<Face>> {
        self.inner.faces.snapshot()
    }

    /// Currently tracked bodies, as non-owning views.
    pub fn bodies(&self) -> HashMap<FeatureId, Weak<Body>> {
        self.inner.bodies.snapshot()
    }

    /// Currently tracked voices, as non-owning views.
    pub fn voices(&self) -> HashMap<FeatureId, Weak<Voice>> {
        self.inner.voices.snapshot()
    }

    /// Currently tracked persons.
    ///
    /// Unlike the other categories, persons are returned as owned handles:
    /// each reference stays readable for as long as the returned map is
    /// held, even if a later snapshot removes the person. A reference held
    /// across such a removal is a detached stale copy; its cross-category
    /// lookups degrade to `None` as the registry moves on.
    pub fn persons(&self) -> HashMap<FeatureId, Arc<Person>> {
        self.inner.persons.snapshot_owned()
    }

    /// Register a callback invoked once per newly tracked face.
    ///
    /// Registrations are permanent (no unsubscribe) and callbacks must not
    /// assume the feature still exists when they run a view they stored.
    pub fn on_face<F>(&self, callback: F)
    where
        F: Fn(Weak<Face>) + Send + Sync + 'static,
    {
        self.inner.on_face.register(callback);
    }

    /// Register a callback invoked once per newly tracked body.
    pub fn on_body<F>(&self, callback: F)
    where
        F: Fn(Weak<Body>) + Send + Sync + 'static,
    {
        self.inner.on_body.register(callback);
    }

    /// Register a callback invoked once per newly tracked voice.
    pub fn on_voice<F>(&self, callback: F)
    where
        F: Fn(Weak<Voice>) + Send + Sync + 'static,
    {
        self.inner.on_voice.register(callback);
    }

    /// Register a callback invoked once per newly tracked person.
    pub fn on_person<F>(&self, callback: F)
    where
        F: Fn(Arc<Person>) + Send + Sync + 'static,
    {
        self.inner.on_person.register(callback);
    }
}

/// Reconcile one category and notify its listeners.
///
/// The four categories are the same generic store/listener pair wired to
/// different entity types; only construction and the handle shape differ.
fn reconcile_category<T, H, M, C>(
    store: &FeatureStore<T>,
    listeners: &ListenerSet<H>,
    new_ids: BTreeSet<FeatureId>,
    make: M,
    to_handle: C,
) where
    T: Feature,
    H: Clone,
    M: FnMut(&FeatureId) -> Arc<T>,
    C: Fn(&Arc<T>) -> H,
{
    let outcome = store.reconcile(new_ids, make);
    if !outcome.is_empty() {
        tracing::debug!(
            kind = %T::KIND,
            added = outcome.added.len(),
            removed = outcome.removed.len(),
            tracked = store.len(),
            "tracked set reconciled"
        );
    }

    let handles: Vec<H> = outcome.added.iter().map(to_handle).collect();
    listeners.notify(&handles);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_person_resolves_associated_face() {
        let registry = HumanRegistry::with_defaults();
        registry.apply_snapshot(FeatureKind::Face, &tokens(&["f1"]));
        registry.apply_snapshot(FeatureKind::Person, &tokens(&["p1"]));

        let persons = registry.persons();
        let person = &persons[&FeatureId::new("p1")];
        assert!(person.face().is_none());

        person.set_face_id(Some(FeatureId::new("f1")));
        let face = person.face().and_then(|f| f.upgrade()).expect("face tracked");
        assert_eq!(face.id(), &FeatureId::new("f1"));

        // The face departs; the association dangles and resolves to nothing.
        registry.apply_snapshot(FeatureKind::Face, &tokens(&[]));
        assert!(person.face().and_then(|f| f.upgrade()).is_none());
    }

    #[test]
    fn test_person_lookup_fails_safe_after_engine_drop() {
        let registry = HumanRegistry::with_defaults();
        registry.apply_snapshot(FeatureKind::Voice, &tokens(&["v1"]));
        registry.apply_snapshot(FeatureKind::Person, &tokens(&["p1"]));

        let person = registry.persons()[&FeatureId::new("p1")].clone();
        person.set_voice_id(Some(FeatureId::new("v1")));
        assert!(person.voice().is_some());

        drop(registry);
        assert!(person.voice().is_none());
        assert_eq!(person.id(), &FeatureId::new("p1"));
    }

    #[test]
    fn test_weak_handle_upgrade() {
        let registry = HumanRegistry::with_defaults();
        let weak = registry.weak_handle();
        assert!(weak.upgrade().is_some());

        drop(registry);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_duplicate_and_empty_tokens_collapse() {
        let registry = HumanRegistry::with_defaults();
        registry.apply_snapshot(FeatureKind::Body, &tokens(&["b1", "b1", "", "b2"]));
        assert_eq!(registry.bodies().len(), 2);
    }

    #[test]
    fn test_categories_are_independent() {
        let registry = HumanRegistry::with_defaults();
        registry.apply_snapshot(FeatureKind::Face, &tokens(&["x"]));
        registry.apply_snapshot(FeatureKind::Voice, &tokens(&["x"]));

        registry.apply_snapshot(FeatureKind::Face, &tokens(&[]));
        assert!(registry.faces().is_empty());
        assert_eq!(registry.voices().len(), 1);
    }
}
