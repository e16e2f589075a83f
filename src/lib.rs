#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod capacity;
mod error;
mod index;

/// A HashMap implementation using Robin Hood hashing.
///
/// This module provides a `HashMap` that wraps the `RobinHoodTable` and
/// provides a standard key-value map interface with configurable hashers.
pub mod hash_map;

pub mod hash_table;

/// A hash set implementation using Robin Hood hashing.
///
/// This module provides a `HashSet` that wraps the `RobinHoodTable` and
/// provides a standard set interface with configurable hashers.
pub mod hash_set;

mod hash_table_proptest;

pub use error::TryReserveError;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_set::HashSet;
pub use hash_table::RobinHoodTable;
pub use index::BucketIndex;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when none is specified.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used when none is specified.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// The hasher builder used when none is specified.
        ///
        /// Without `std` or `foldhash` there is no source of random keys, so
        /// this hasher is not resistant to collision attacks.
        #[allow(deprecated)]
        pub type DefaultHashBuilder = core::hash::BuildHasherDefault<core::hash::SipHasher>;
    }
}
