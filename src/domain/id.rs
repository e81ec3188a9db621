//! Feature identifiers.

use serde::{Deserialize, Serialize};

/// Identifier of one tracked feature within one category's namespace.
///
/// Identifiers are opaque string tokens minted by the upstream perception
/// pipeline; the registry never interprets them beyond equality and
/// ordering (byte-wise string comparison). Two categories may reuse the
/// same token for unrelated features.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeatureId(String);

impl FeatureId {
    /// Wrap a pre-validated, non-empty token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Parse a raw token from an incoming snapshot.
    ///
    /// Empty tokens are not valid identifiers and yield `None`; callers
    /// drop them rather than fail the whole snapshot.
    pub fn parse(token: &str) -> Option<Self> {
        if token.is_empty() {
            None
        } else {
            Some(Self(token.to_string()))
        }
    }

    /// Validating constructor for callers that want the failure surfaced.
    pub fn try_new(token: impl Into<String>) -> crate::Result<Self> {
        let token = token.into();
        if token.is_empty() {
            Err(crate::RegistryError::InvalidId(token))
        } else {
            Ok(Self(token))
        }
    }

    /// Borrow the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureId {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}
