//! Per-category state: the reconciling feature store and listener sets.

mod listeners;
mod store;

pub use listeners::ListenerSet;
pub use store::{Feature, FeatureStore, ReconcileOutcome};
