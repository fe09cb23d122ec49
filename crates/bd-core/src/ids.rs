//! Strongly typed identifier wrappers.
//!
//! Block ids are assigned by the owning scheme in creation order, so a block's
//! id is also its index into the scheme's block table.  There is no global
//! instance counter: two schemes built the same way hand out the same ids.

use std::fmt;

/// Declare a `u32` id newtype whose `Display` form is `<prefix><n>`.
macro_rules! typed_id {
    ($(#[$attr:meta])* $name:ident, $prefix:literal) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl $name {
            /// Placeholder for a slot that has not been assigned yet.
            pub const INVALID: $name = $name(u32::MAX);

            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            pub fn is_valid(self) -> bool {
                self != Self::INVALID
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
                    f.write_str(concat!($prefix, "?"))
                }
            }
        }
    };
}

typed_id! {
    /// Creation-order index of a block inside its scheme.
    BlockId, "#"
}

typed_id! {
    /// Index of a pinned override value in one type arena (see port freeze).
    SlotId, "slot "
}
