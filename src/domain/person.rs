//! Person entity record.

use std::sync::Weak;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::engine::RegistryRef;
use crate::registry::Feature;
use crate::transport::TransportHandle;

use super::{Body, Face, FeatureId, FeatureKind, Voice};

/// A composite person aggregating features from the other categories.
///
/// A person holds a [`RegistryRef`] back into the engine that created it,
/// used to resolve which face, body, or voice currently belongs to this
/// person. The back-reference is a lookup relation, never an ownership
/// edge: the engine must outlive every person it created, and once the
/// engine is gone all cross-category lookups return `None`.
///
/// Which feature is associated with a person is decided upstream; the
/// perception collaborator records the association here through the
/// `set_*_id` methods.
#[derive(Debug)]
pub struct Person {
    id: FeatureId,
    first_seen: DateTime<Utc>,
    transport: TransportHandle,
    namespace: RwLock<Option<String>>,
    registry: RegistryRef,
    face_id: RwLock<Option<FeatureId>>,
    body_id: RwLock<Option<FeatureId>>,
    voice_id: RwLock<Option<FeatureId>>,
}

impl Person {
    /// Create a record for a newly tracked person identifier.
    pub fn new(id: FeatureId, transport: TransportHandle, registry: RegistryRef) -> Self {
        Self {
            id,
            first_seen: Utc::now(),
            transport,
            namespace: RwLock::new(None),
            registry,
            face_id: RwLock::new(None),
            body_id: RwLock::new(None),
            voice_id: RwLock::new(None),
        }
    }

    /// The person identifier.
    pub fn id(&self) -> &FeatureId {
        &self.id
    }

    /// When this identifier first entered the registry.
    pub fn first_seen(&self) -> &DateTime<Utc> {
        &self.first_seen
    }

    /// Transport namespace for this person, available after `init`.
    pub fn namespace(&self) -> Option<String> {
        self.namespace.read().clone()
    }

    /// Identifier of the face currently associated with this person.
    pub fn face_id(&self) -> Option<FeatureId> {
        self.face_id.read().clone()
    }

    /// Identifier of the body currently associated with this person.
    pub fn body_id(&self) -> Option<FeatureId> {
        self.body_id.read().clone()
    }

    /// Identifier of the voice currently associated with this person.
    pub fn voice_id(&self) -> Option<FeatureId> {
        self.voice_id.read().clone()
    }

    /// Record which face belongs to this person (`None` clears it).
    pub fn set_face_id(&self, face_id: Option<FeatureId>) {
        tracing::debug!(person_id = %self.id, face_id = ?face_id, "face association updated");
        *self.face_id.write() = face_id;
    }

    /// Record which body belongs to this person (`None` clears it).
    pub fn set_body_id(&self, body_id: Option<FeatureId>) {
        tracing::debug!(person_id = %self.id, body_id = ?body_id, "body association updated");
        *self.body_id.write() = body_id;
    }

    /// Record which voice belongs to this person (`None` clears it).
    pub fn set_voice_id(&self, voice_id: Option<FeatureId>) {
        tracing::debug!(person_id = %self.id, voice_id = ?voice_id, "voice association updated");
        *self.voice_id.write() = voice_id;
    }

    /// The face currently associated with this person, if any.
    ///
    /// `None` when no association is recorded, when the face has since
    /// left the registry, or when the engine has been torn down.
    pub fn face(&self) -> Option<Weak<Face>> {
        let id = self.face_id.read().clone()?;
        self.registry.face(&id)
    }

    /// The body currently associated with this person, if any.
    pub fn body(&self) -> Option<Weak<Body>> {
        let id = self.body_id.read().clone()?;
        self.registry.body(&id)
    }

    /// The voice currently associated with this person, if any.
    pub fn voice(&self) -> Option<Weak<Voice>> {
        let id = self.voice_id.read().clone()?;
        self.registry.voice(&id)
    }
}

impl Feature for Person {
    const KIND: FeatureKind = FeatureKind::Person;

    fn id(&self) -> &FeatureId {
        &self.id
    }

    fn init(&self) {
        let ns = self.transport.namespace(FeatureKind::Person, &self.id);
        tracing::debug!(person_id = %self.id, namespace = %ns, "person record initialised");
        *self.namespace.write() = Some(ns);
    }
}
