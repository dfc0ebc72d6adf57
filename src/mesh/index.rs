//! Index types for board elements.
//!
//! Every entity of a [`Board`](super::Board) lives in an arena and is addressed
//! by a type-safe index wrapper. Indices stay stable for the lifetime of the
//! board: removing an entity leaves a tombstone rather than shifting its
//! neighbours, so ids held by callers never silently change meaning.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Raw storage type shared by all element ids.
type RawIndex = u32;

const INVALID: RawIndex = RawIndex::MAX;

/// Common behaviour of the typed element ids, used by [`Arena`](super::Arena).
pub trait ElementId: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// Create an id from an arena slot.
    fn from_slot(slot: usize) -> Self;

    /// The arena slot this id addresses.
    fn slot(self) -> usize;
}

/// A type-safe vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId(RawIndex);

/// A type-safe half-edge index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId(RawIndex);

/// A type-safe face index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId(RawIndex);

/// A type-safe edge index (the undirected edge owning two half-edges).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId(RawIndex);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl $name {
            /// Create a new index from a raw value.
            ///
            /// # Panics
            /// Panics if the value does not fit the index storage.
            #[inline]
            pub fn new(index: usize) -> Self {
                assert!(index < INVALID as usize, "index {} too large", index);
                Self(index as RawIndex)
            }

            /// Create an invalid/null index, used while links are still being wired.
            #[inline]
            pub fn invalid() -> Self {
                Self(INVALID)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Check if this is a valid (non-null) index.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != INVALID
            }
        }

        impl ElementId for $name {
            #[inline]
            fn from_slot(slot: usize) -> Self {
                Self::new(slot)
            }

            #[inline]
            fn slot(self) -> usize {
                self.index()
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                Debug::fmt(self, f)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(HalfEdgeId, "HE");
impl_index_type!(FaceId, "F");
impl_index_type!(EdgeId, "E");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_id() {
        let v = VertexId::new(42);
        assert_eq!(v.index(), 42);
        assert!(v.is_valid());

        let invalid = VertexId::invalid();
        assert!(!invalid.is_valid());
        assert_eq!(VertexId::default(), invalid);
    }

    #[test]
    fn test_slot_round_trip() {
        let he = HalfEdgeId::from_slot(7);
        assert_eq!(he.slot(), 7);
        assert_eq!(EdgeId::from(3).index(), 3);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", FaceId::new(5)), "F(5)");
        assert_eq!(format!("{}", HalfEdgeId::invalid()), "HE(INVALID)");
    }
}
