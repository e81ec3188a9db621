//! Voice entity record.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::registry::Feature;
use crate::transport::TransportHandle;

use super::{FeatureId, FeatureKind};

/// A currently tracked voice.
///
/// Besides its identity, a voice carries a speech-activity flag the
/// perception collaborator updates while the record is alive. Audio
/// feature decoding stays out of scope.
#[derive(Debug)]
pub struct Voice {
    id: FeatureId,
    first_seen: DateTime<Utc>,
    transport: TransportHandle,
    namespace: RwLock<Option<String>>,
    speaking: RwLock<bool>,
}

impl Voice {
    /// Create a record for a newly tracked voice identifier.
    pub fn new(id: FeatureId, transport: TransportHandle) -> Self {
        Self {
            id,
            first_seen: Utc::now(),
            transport,
            namespace: RwLock::new(None),
            speaking: RwLock::new(false),
        }
    }

    /// The voice identifier.
    pub fn id(&self) -> &FeatureId {
        &self.id
    }

    /// When this identifier first entered the registry.
    pub fn first_seen(&self) -> &DateTime<Utc> {
        &self.first_seen
    }

    /// Transport namespace for this voice, available after `init`.
    pub fn namespace(&self) -> Option<String> {
        self.namespace.read().clone()
    }

    /// Whether speech activity is currently detected on this voice.
    pub fn is_speaking(&self) -> bool {
        *self.speaking.read()
    }

    /// Update the speech-activity flag.
    pub fn set_speaking(&self, speaking: bool) {
        let mut current = self.speaking.write();
        if *current != speaking {
            tracing::debug!(voice_id = %self.id, speaking, "speech activity changed");
        }
        *current = speaking;
    }
}

impl Feature for Voice {
    const KIND: FeatureKind = FeatureKind::Voice;

    fn id(&self) -> &FeatureId {
        &self.id
    }

    fn init(&self) {
        let ns = self.transport.namespace(FeatureKind::Voice, &self.id);
        *self.namespace.write() = Some(ns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaking_flag() {
        let voice = Voice::new(FeatureId::new("v1"), TransportHandle::new("/humans"));
        assert!(!voice.is_speaking());

        voice.set_speaking(true);
        assert!(voice.is_speaking());

        voice.set_speaking(false);
        assert!(!voice.is_speaking());
    }
}
