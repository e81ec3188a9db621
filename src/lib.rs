//! # human-registry
//!
//! A live registry of perceived human features — faces, bodies, voices,
//! and composite persons — whose membership is announced asynchronously by
//! an external perception pipeline as flat lists of opaque identifiers.
//!
//! The core is snapshot reconciliation: every incoming identifier list for
//! a category is diffed against that category's current state, departed
//! entities are destroyed, newly appeared ones are constructed, and
//! subscribed listeners are notified once per addition. Each of the four
//! categories runs this lifecycle independently, and the current state is
//! always observable as a consistent, read-safe snapshot.
//!
//! ## Architecture
//!
//! ```text
//! perception pipeline ──TrackedIds──▶ HumanRegistry
//!                                       ├─ FeatureStore<Face>    ─┬─ ListenerSet
//!                                       ├─ FeatureStore<Body>    ─┤
//!                                       ├─ FeatureStore<Voice>   ─┤
//!                                       └─ FeatureStore<Person>  ─┘
//!                                             ▲
//!                  application code ── faces()/persons()/on_face()...
//! ```
//!
//! Readers never own entities: faces, bodies, and voices are handed out as
//! [`Weak`](std::sync::Weak) views that must be upgraded before use, since
//! any later snapshot may have destroyed the record. Persons are the
//! exception and are handed out as stable read references (see
//! [`HumanRegistry::persons`]).
//!
//! ## Example
//!
//! ```no_run
//! use human_registry::{FeatureKind, HumanRegistry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = HumanRegistry::with_defaults();
//!     registry.on_person(|person| {
//!         println!("person {} is now tracked", person.id());
//!     });
//!
//!     let (publisher, receiver) = registry.snapshot_channel();
//!     tokio::spawn({
//!         let registry = registry.clone();
//!         async move { registry.run(receiver).await }
//!     });
//!
//!     publisher
//!         .publish(FeatureKind::Person, ["p1", "p2"])
//!         .await
//!         .expect("registry alive");
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod domain;
mod engine;
pub mod registry;
pub mod transport;

pub use domain::{Body, Face, FeatureId, FeatureKind, Person, Voice};
pub use engine::{HumanRegistry, RegistryRef};
pub use registry::{Feature, FeatureStore, ListenerSet, ReconcileOutcome};
pub use transport::{
    snapshot_channel, SnapshotPublisher, SnapshotReceiver, TrackedIds, TransportHandle,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Unified error type for registry operations.
///
/// The reconciliation core itself is infallible by design: malformed
/// tokens collapse silently, listener failures are isolated, and stale
/// views degrade to `None`. Errors only arise at the edges.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// An identifier token failed validation
    #[error("invalid feature identifier: {0:?}")]
    InvalidId(String),

    /// The snapshot channel's consuming end is gone
    #[error("snapshot transport closed")]
    TransportClosed,
}

/// Configuration for a [`HumanRegistry`].
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Namespace root all feature topics live under
    pub namespace_root: String,
    /// Capacity of the snapshot channel (a fresh snapshot supersedes the
    /// previous one, so a small queue suffices)
    pub snapshot_queue: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            namespace_root: "/humans".to_string(),
            snapshot_queue: 8,
        }
    }
}

impl RegistryConfig {
    /// Create a new configuration builder
    pub fn builder() -> RegistryConfigBuilder {
        RegistryConfigBuilder::default()
    }
}

/// Builder for [`RegistryConfig`]
#[derive(Debug, Default)]
pub struct RegistryConfigBuilder {
    config: RegistryConfig,
}

impl RegistryConfigBuilder {
    /// Set the namespace root
    pub fn namespace_root(mut self, root: impl Into<String>) -> Self {
        self.config.namespace_root = root.into();
        self
    }

    /// Set the snapshot channel capacity (minimum 1)
    pub fn snapshot_queue(mut self, capacity: usize) -> Self {
        self.config.snapshot_queue = capacity.max(1);
        self
    }

    /// Build the configuration
    pub fn build(self) -> RegistryConfig {
        self.config
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Body, Face, FeatureId, FeatureKind, HumanRegistry, Person, RegistryConfig, RegistryError,
        Result, SnapshotPublisher, TrackedIds, TransportHandle, Voice,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = RegistryConfig::builder()
            .namespace_root("/lab/humans")
            .snapshot_queue(32)
            .build();

        assert_eq!(config.namespace_root, "/lab/humans");
        assert_eq!(config.snapshot_queue, 32);
    }

    #[test]
    fn test_queue_capacity_clamping() {
        let config = RegistryConfig::builder().snapshot_queue(0).build();
        assert_eq!(config.snapshot_queue, 1);
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
