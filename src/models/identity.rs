//! Entity identity
//!
//! Ids are minted by the storage layer. Entities built in memory start out
//! unpersisted and carry no id until they are saved.

use std::fmt;

use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Identity of an entity: either not yet saved, or saved under a storage id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Identity {
    #[default]
    Unpersisted,
    Persisted(Uuid),
}

impl Identity {
    /// Mint a fresh storage id
    pub fn generate() -> Uuid {
        Uuid::new_v4()
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, Identity::Persisted(_))
    }

    /// The storage id, if any
    pub fn uuid(&self) -> Option<Uuid> {
        match self {
            Identity::Unpersisted => None,
            Identity::Persisted(id) => Some(*id),
        }
    }
}

impl From<Uuid> for Identity {
    fn from(id: Uuid) -> Self {
        Identity::Persisted(id)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Unpersisted => f.write_str("unpersisted"),
            Identity::Persisted(id) => id.fmt(f),
        }
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.uuid().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unpersisted() {
        assert_eq!(Identity::default(), Identity::Unpersisted);
        assert!(!Identity::default().is_persisted());
        assert_eq!(Identity::default().uuid(), None);
    }

    #[test]
    fn test_persisted_round_trips_uuid() {
        let id = Identity::generate();
        let identity = Identity::from(id);
        assert!(identity.is_persisted());
        assert_eq!(identity.uuid(), Some(id));
    }

    #[test]
    fn test_unpersisted_identities_compare_equal() {
        assert_eq!(Identity::Unpersisted, Identity::Unpersisted);
        assert_ne!(Identity::Unpersisted, Identity::from(Identity::generate()));
    }

    #[test]
    fn test_serializes_as_optional_uuid() {
        assert_eq!(serde_json::to_string(&Identity::Unpersisted).unwrap(), "null");
        let id = Identity::generate();
        assert_eq!(
            serde_json::to_string(&Identity::Persisted(id)).unwrap(),
            format!("\"{}\"", id)
        );
    }
}
