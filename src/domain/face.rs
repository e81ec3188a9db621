//! Face entity record.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::registry::Feature;
use crate::transport::TransportHandle;

use super::{FeatureId, FeatureKind};

/// A currently tracked face.
///
/// The record itself carries no facial attributes; landmark and expression
/// decoding belongs to the perception collaborator, which reaches the
/// feature through the namespace resolved at [`init`](Feature::init).
#[derive(Debug)]
pub struct Face {
    id: FeatureId,
    first_seen: DateTime<Utc>,
    transport: TransportHandle,
    namespace: RwLock<Option<String>>,
}

impl Face {
    /// Create a record for a newly tracked face identifier.
    pub fn new(id: FeatureId, transport: TransportHandle) -> Self {
        Self {
            id,
            first_seen: Utc::now(),
            transport,
            namespace: RwLock::new(None),
        }
    }

    /// The face identifier.
    pub fn id(&self) -> &FeatureId {
        &self.id
    }

    /// When this identifier first entered the registry.
    pub fn first_seen(&self) -> &DateTime<Utc> {
        &self.first_seen
    }

    /// Transport namespace for this face, available after `init`.
    pub fn namespace(&self) -> Option<String> {
        self.namespace.read().clone()
    }
}

impl Feature for Face {
    const KIND: FeatureKind = FeatureKind::Face;

    fn id(&self) -> &FeatureId {
        &self.id
    }

    fn init(&self) {
        let ns = self.transport.namespace(FeatureKind::Face, &self.id);
        tracing::debug!(face_id = %self.id, namespace = %ns, "face record initialised");
        *self.namespace.write() = Some(ns);
    }
}
