//! Typed element identifiers
//!
//! Every element kind of a [`HalfEdgeMesh`](crate::HalfEdgeMesh) is addressed by a
//! dense `u32` index into its pool. Removed ids go on a free list and are handed
//! out again by the next allocation of the same kind.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $name {
            /// Sentinel for "no element"
            pub const INVALID: Self = Self(u32::MAX);

            #[inline]
            pub fn new(index: usize) -> Self {
                Self(index as u32)
            }

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!($prefix, "{}"), self.0)
                } else {
                    f.write_str(concat!($prefix, "-"))
                }
            }
        }
    };
}

define_id!(
    /// Identifies a vertex
    VertexId,
    "v"
);
define_id!(
    /// Identifies an undirected edge
    EdgeId,
    "e"
);
define_id!(
    /// Identifies a directed half-edge
    HalfEdgeId,
    "h"
);
define_id!(
    /// Identifies a face (real or boundary)
    FaceId,
    "f"
);
