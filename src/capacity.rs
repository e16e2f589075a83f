//! Capacity selection: the prime ladder and the load-factor policy.

/// Bucket count chosen on the first insertion into an empty table.
pub(crate) const INITIAL_CAPACITY: usize = 11;

/// Ascending primes used as bucket counts. Growth picks the smallest entry
/// that is at least twice the current capacity.
const PRIME_LADDER: [u64; 64] = [
    2,
    3,
    5,
    11,
    17,
    37,
    67,
    131,
    257,
    521,
    1031,
    2053,
    4099,
    8209,
    16411,
    32771,
    65537,
    131101,
    262147,
    524309,
    1048583,
    2097169,
    4194319,
    8388617,
    16777259,
    33554467,
    67108879,
    134217757,
    268435459,
    536870923,
    1073741827,
    2147483659,
    4294967311,
    8589934609,
    17179869209,
    34359738421,
    68719476767,
    137438953481,
    274877906951,
    549755813911,
    1099511627791,
    2199023255579,
    4398046511119,
    8796093022237,
    17592186044423,
    35184372088891,
    70368744177679,
    140737488355333,
    281474976710677,
    562949953421381,
    1125899906842679,
    2251799813685269,
    4503599627370517,
    9007199254740997,
    18014398509482143,
    36028797018963971,
    72057594037928017,
    144115188075855881,
    288230376151711813,
    576460752303423619,
    1152921504606847009,
    2305843009213693967,
    4611686018427388039,
    9223372036854775837,
];

cfg_if::cfg_if! {
    if #[cfg(feature = "load-factor-seventy-five")] {
        const LOAD_NUMERATOR: u128 = 3;
        const LOAD_DENOMINATOR: u128 = 4;
    } else if #[cfg(feature = "load-factor-eighty")] {
        const LOAD_NUMERATOR: u128 = 4;
        const LOAD_DENOMINATOR: u128 = 5;
    } else if #[cfg(feature = "load-factor-eighty-five")] {
        const LOAD_NUMERATOR: u128 = 17;
        const LOAD_DENOMINATOR: u128 = 20;
    } else {
        const LOAD_NUMERATOR: u128 = 3;
        const LOAD_DENOMINATOR: u128 = 4;
    }
}

/// Returns `true` if holding `len` entries in `capacity` buckets exceeds the
/// maximum load factor.
#[inline(always)]
pub(crate) fn exceeds_load(len: usize, capacity: usize) -> bool {
    len as u128 * LOAD_DENOMINATOR > capacity as u128 * LOAD_NUMERATOR
}

/// The number of entries `capacity` buckets hold before the next insertion
/// triggers growth.
#[inline(always)]
pub(crate) fn max_load(capacity: usize) -> usize {
    (capacity as u128 * LOAD_NUMERATOR / LOAD_DENOMINATOR) as usize
}

/// Picks the capacity that follows `capacity`.
///
/// Returns `ceiling` when doubling overflows or when no ladder prime fits
/// below `ceiling`. Returns `capacity` unchanged once it has reached the
/// ceiling.
pub(crate) fn next_capacity(capacity: usize, ceiling: usize) -> usize {
    if capacity >= ceiling {
        return capacity;
    }

    let Some(required) = capacity.checked_mul(2) else {
        return ceiling;
    };

    PRIME_LADDER
        .iter()
        .copied()
        .find(|&prime| prime >= required as u64)
        .and_then(|prime| usize::try_from(prime).ok())
        .filter(|&prime| prime <= ceiling)
        .unwrap_or(ceiling)
}
