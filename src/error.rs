use core::alloc::Layout;
use core::fmt;

/// The error type for fallible growth operations such as
/// [`RobinHoodTable::try_reserve`](crate::RobinHoodTable::try_reserve) and
/// [`HashMap::try_insert`](crate::HashMap::try_insert).
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TryReserveError {
    /// The bucket array for the requested capacity does not fit in the
    /// address space.
    CapacityOverflow,

    /// The memory allocator returned an error.
    AllocError {
        /// The layout of the bucket array that could not be allocated.
        layout: Layout,
    },
}

impl fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryReserveError::CapacityOverflow => {
                f.write_str("bucket array size exceeds the maximum allocation size")
            }
            TryReserveError::AllocError { layout } => write!(
                f,
                "memory allocation of {} bytes for the bucket array failed",
                layout.size()
            ),
        }
    }
}

impl core::error::Error for TryReserveError {}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn display_mentions_layout_size() {
        let layout = Layout::array::<u64>(16).unwrap();
        let err = TryReserveError::AllocError { layout };
        assert_eq!(
            err.to_string(),
            "memory allocation of 128 bytes for the bucket array failed"
        );
        assert!(
            TryReserveError::CapacityOverflow
                .to_string()
                .contains("maximum allocation size")
        );
    }
}
