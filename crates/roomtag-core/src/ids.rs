//! Identifiers
//!
//! Element ids come from the documents themselves and are only meaningful
//! inside the document that issued them. A linked room id and a host view id
//! may well share a numeric value; the newtypes keep them apart.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! element_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw element id
            #[inline]
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Raw element id
            #[inline]
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                Self(i64::from(value))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

element_id! {
    /// Room element id in the linked document
    RoomId
}

element_id! {
    /// Plan view element id in the host document
    ViewId
}

element_id! {
    /// Link instance element id in the host document
    LinkId
}

element_id! {
    /// Level element id (host or linked; never compared across documents)
    LevelId
}

element_id! {
    /// Tag element id created in the host document
    TagId
}

/// Opaque handle naming a document (host or linked)
///
/// Typically the document title or path. Links carry the handle of their
/// target so the caller can resolve it to a loaded document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentRef(String);

impl DocumentRef {
    /// Create new document handle
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Handle as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Unique identifier of one reconciliation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate new run ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_ids_display_raw_value() {
        assert_eq!(RoomId::new(311_204).to_string(), "311204");
        assert_eq!(ViewId::from(-1).value(), -1);
    }

    #[test]
    fn element_ids_serialize_transparently() {
        let json = serde_json::to_string(&TagId::new(42)).unwrap();
        assert_eq!(json, "42");
        let back: RoomId = serde_json::from_str("7").unwrap();
        assert_eq!(back, RoomId::new(7));
    }

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(RunId::new(), RunId::new());
    }
}
