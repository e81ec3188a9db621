//! Body entity record.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::registry::Feature;
use crate::transport::TransportHandle;

use super::{FeatureId, FeatureKind};

/// A currently tracked body. Skeleton decoding is the perception
/// collaborator's concern.
#[derive(Debug)]
pub struct Body {
    id: FeatureId,
    first_seen: DateTime<Utc>,
    transport: TransportHandle,
    namespace: RwLock<Option<String>>,
}

impl Body {
    /// Create a record for a newly tracked body identifier.
    pub fn new(id: FeatureId, transport: TransportHandle) -> Self {
        Self {
            id,
            first_seen: Utc::now(),
            transport,
            namespace: RwLock::new(None),
        }
    }

    /// The body identifier.
    pub fn id(&self) -> &FeatureId {
        &self.id
    }

    /// When this identifier first entered the registry.
    pub fn first_seen(&self) -> &DateTime<Utc> {
        &self.first_seen
    }

    /// Transport namespace for this body, available after `init`.
    pub fn namespace(&self) -> Option<String> {
        self.namespace.read().clone()
    }
}

impl Feature for Body {
    const KIND: FeatureKind = FeatureKind::Body;

    fn id(&self) -> &FeatureId {
        &self.id
    }

    fn init(&self) {
        let ns = self.transport.namespace(FeatureKind::Body, &self.id);
        *self.namespace.write() = Some(ns);
    }
}
