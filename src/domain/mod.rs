//! Domain model: feature categories, identifiers, and entity records.
//!
//! One entity record type exists per feature category. Records are created
//! by the engine when an identifier first appears in a snapshot, owned by
//! the category's store for exactly as long as the identifier stays
//! tracked, and dropped the moment it disappears. Everything feature
//! specific (what a face looks like, what a voice said) belongs to the
//! external perception collaborator; records here stay deliberately thin.

mod body;
mod face;
mod id;
mod person;
mod voice;

pub use body::Body;
pub use face::Face;
pub use id::FeatureId;
pub use person::Person;
pub use voice::Voice;

use serde::{Deserialize, Serialize};

/// The four tracked feature categories.
///
/// Each category has an independent lifecycle: snapshots for one category
/// never affect another's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    /// A detected face.
    Face,
    /// A detected body.
    Body,
    /// A detected voice.
    Voice,
    /// A composite person aggregating the other categories.
    Person,
}

impl FeatureKind {
    /// Singular lowercase name, used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Face => "face",
            Self::Body => "body",
            Self::Voice => "voice",
            Self::Person => "person",
        }
    }

    /// Plural topic segment under the transport namespace root.
    pub fn topic(&self) -> &'static str {
        match self {
            Self::Face => "faces",
            Self::Body => "bodies",
            Self::Voice => "voices",
            Self::Person => "persons",
        }
    }
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_topics() {
        assert_eq!(FeatureKind::Face.topic(), "faces");
        assert_eq!(FeatureKind::Body.topic(), "bodies");
        assert_eq!(FeatureKind::Voice.topic(), "voices");
        assert_eq!(FeatureKind::Person.topic(), "persons");
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(FeatureKind::Voice.to_string(), "voice");
    }
}
