//! Integer types usable as a table's index type.
//!
//! The index type stores each bucket's displacement and bounds the largest
//! capacity a table may grow to. A table indexed by `u8` never holds more
//! than 255 buckets; growth beyond that saturates at 255.

use core::fmt::Debug;

mod sealed {
    pub trait Sealed {}
}

/// An unsigned integer type used to store probe displacements.
///
/// Implemented for `u8`, `u16`, `u32`, `u64` and `usize`. This trait is
/// sealed.
pub trait BucketIndex: Copy + Ord + Debug + sealed::Sealed {
    /// The largest bucket count representable by this type, clamped to
    /// `usize::MAX`.
    const MAX_CAPACITY: usize;

    /// The zero displacement.
    const ZERO: Self;

    /// Converts from `usize`.
    ///
    /// Callers only pass values below [`Self::MAX_CAPACITY`].
    fn from_usize(value: usize) -> Self;

    /// Converts to `usize`.
    fn into_usize(self) -> usize;
}

macro_rules! impl_bucket_index {
    ($($t:ty),*) => {$(
        impl sealed::Sealed for $t {}

        impl BucketIndex for $t {
            const MAX_CAPACITY: usize = if <$t>::MAX as u128 > usize::MAX as u128 {
                usize::MAX
            } else {
                <$t>::MAX as usize
            };

            const ZERO: Self = 0;

            #[inline(always)]
            fn from_usize(value: usize) -> Self {
                debug_assert!(value <= Self::MAX_CAPACITY);
                value as $t
            }

            #[inline(always)]
            fn into_usize(self) -> usize {
                self as usize
            }
        }
    )*};
}

impl_bucket_index!(u8, u16, u32, u64, usize);
