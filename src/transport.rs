//! Transport boundary: snapshot events in, per-feature namespaces out.
//!
//! The perception pipeline announces membership changes as flat identifier
//! lists, one [`TrackedIds`] event per category. How those lists are
//! encoded on the wire is the transport's own business; this module only
//! defines the decoded event and a bounded channel to hand events to the
//! engine. A new snapshot supersedes the previous one rather than
//! appending to it, so a small queue is enough.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::domain::{FeatureId, FeatureKind};
use crate::{RegistryError, Result};

/// A snapshot-update event: the complete set of identifiers currently
/// tracked upstream for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedIds {
    /// The category this snapshot belongs to.
    pub kind: FeatureKind,
    /// Raw identifier tokens, possibly with duplicates; order carries no
    /// meaning.
    pub ids: Vec<String>,
}

impl TrackedIds {
    /// Build a snapshot event from raw tokens.
    pub fn new(kind: FeatureKind, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            kind,
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// Receiving half of the snapshot channel, consumed by
/// [`HumanRegistry::run`](crate::HumanRegistry::run).
pub type SnapshotReceiver = mpsc::Receiver<TrackedIds>;

/// Producer-side handle the transport uses to push snapshot events.
#[derive(Debug, Clone)]
pub struct SnapshotPublisher {
    tx: mpsc::Sender<TrackedIds>,
}

impl SnapshotPublisher {
    /// Publish a snapshot for one category.
    ///
    /// Fails with [`RegistryError::TransportClosed`] once the consuming
    /// engine has been dropped.
    pub async fn publish(
        &self,
        kind: FeatureKind,
        ids: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<()> {
        self.tx
            .send(TrackedIds::new(kind, ids))
            .await
            .map_err(|_| RegistryError::TransportClosed)
    }
}

/// Create a bounded snapshot channel between the transport and the engine.
pub fn snapshot_channel(capacity: usize) -> (SnapshotPublisher, SnapshotReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (SnapshotPublisher { tx }, rx)
}

/// Cheap clonable handle onto the perception transport.
///
/// Every entity record receives one at construction and uses it to resolve
/// its per-feature namespace, the address under which the feature's own
/// attribute streams live upstream.
#[derive(Debug, Clone)]
pub struct TransportHandle {
    inner: Arc<TransportInner>,
}

#[derive(Debug)]
struct TransportInner {
    root: String,
}

impl TransportHandle {
    /// Create a handle rooted at the given namespace (e.g. `/humans`).
    pub fn new(root: impl Into<String>) -> Self {
        let mut root = root.into();
        while root.ends_with('/') {
            root.pop();
        }
        Self {
            inner: Arc::new(TransportInner { root }),
        }
    }

    /// The namespace root all topics live under.
    pub fn root(&self) -> &str {
        &self.inner.root
    }

    /// The topic carrying one category's tracked-identifier snapshots.
    pub fn tracked_topic(&self, kind: FeatureKind) -> String {
        format!("{}/{}/tracked", self.inner.root, kind.topic())
    }

    /// The namespace of one tracked feature.
    pub fn namespace(&self, kind: FeatureKind, id: &FeatureId) -> String {
        format!("{}/{}/{}", self.inner.root, kind.topic(), id)
    }
}

impl Default for TransportHandle {
    fn default() -> Self {
        Self::new("/humans")
    }
}
