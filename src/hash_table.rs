//! The raw Robin Hood table underlying [`HashMap`](crate::HashMap) and
//! [`HashSet`](crate::HashSet).
//!
//! Values are located through a caller-supplied `u64` hash and an equality
//! predicate. Collisions are resolved with linear probing; an entry that has
//! travelled further from its ideal slot evicts a resident that has
//! travelled strictly less. Removal shifts the rest of the probe chain back
//! one slot, so the table never contains tombstones.

use alloc::alloc::handle_alloc_error;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::alloc::Layout;
use core::fmt::Debug;
use core::iter::FusedIterator;

use crate::capacity::INITIAL_CAPACITY;
use crate::capacity::exceeds_load;
use crate::capacity::max_load;
use crate::capacity::next_capacity;
use crate::error::TryReserveError;
use crate::index::BucketIndex;

#[derive(Clone)]
struct Bucket<T, I> {
    hash: u64,
    displacement: I,
    value: T,
}

type Slot<T, I> = Option<Bucket<T, I>>;

#[cold]
#[inline(never)]
#[track_caller]
fn probe_overrun() -> ! {
    panic!("probe sequence exceeded table capacity: hash or equality is inconsistent")
}

#[cold]
#[inline(never)]
#[track_caller]
fn displacement_overflow() -> ! {
    panic!("displacement reached table capacity during insertion")
}

#[cold]
#[inline(never)]
#[track_caller]
fn capacity_exhausted(capacity: usize) -> ! {
    panic!("table is full at its maximum capacity of {capacity} buckets")
}

#[inline(always)]
fn ideal_slot(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

#[inline(always)]
fn next_slot(index: usize, capacity: usize) -> usize {
    if index + 1 == capacity { 0 } else { index + 1 }
}

fn allocate_buckets<T, I>(capacity: usize) -> Result<Box<[Slot<T, I>]>, TryReserveError> {
    let layout =
        Layout::array::<Slot<T, I>>(capacity).map_err(|_| TryReserveError::CapacityOverflow)?;

    let mut buckets = Vec::new();
    buckets
        .try_reserve_exact(capacity)
        .map_err(|_| TryReserveError::AllocError { layout })?;
    buckets.resize_with(capacity, || None);

    Ok(buckets.into_boxed_slice())
}

/// Places `value` into `buckets`, which must not already hold an equal value
/// and must have at least one empty slot.
///
/// Returns the index the new value landed in. Entries evicted along the way
/// keep probing with the displacement they already had.
fn place<T, I: BucketIndex>(buckets: &mut [Slot<T, I>], hash: u64, value: T) -> usize {
    let capacity = buckets.len();
    let mut candidate = Bucket {
        hash,
        displacement: I::ZERO,
        value,
    };
    let mut index = ideal_slot(hash, capacity);
    let mut displacement = 0usize;
    let mut landed = None;

    loop {
        let slot = &mut buckets[index];
        match slot {
            None => {
                candidate.displacement = I::from_usize(displacement);
                *slot = Some(candidate);
                return landed.unwrap_or(index);
            }
            Some(resident) => {
                let resident_displacement = resident.displacement.into_usize();
                if resident_displacement < displacement {
                    candidate.displacement = I::from_usize(displacement);
                    core::mem::swap(resident, &mut candidate);
                    displacement = resident_displacement;
                    landed.get_or_insert(index);
                }
            }
        }

        index = next_slot(index, capacity);
        displacement += 1;
        if displacement >= capacity {
            displacement_overflow();
        }
    }
}

/// Unwraps the result of a fallible growth, treating failure the way the
/// standard collections do.
#[inline]
fn infallible<R>(result: Result<R, TryReserveError>) -> R {
    match result {
        Ok(value) => value,
        Err(TryReserveError::CapacityOverflow) => panic!("capacity overflow"),
        Err(TryReserveError::AllocError { layout }) => handle_alloc_error(layout),
    }
}

/// Debug statistics for hash table analysis.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of elements currently in the table
    pub populated: usize,
    /// Number of buckets allocated
    pub capacity: usize,
    /// Number of elements the table holds before the next growth
    pub max_load: usize,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
    /// Largest displacement of any element
    pub max_displacement: usize,
    /// Mean displacement over all elements
    pub mean_displacement: f64,
    /// Total memory in bytes used by the bucket array
    pub total_bytes: usize,
    /// Memory in bytes held by empty buckets
    pub wasted_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor, grows after {})",
            self.populated,
            self.capacity,
            self.load_factor * 100.0,
            self.max_load
        );
        println!(
            "Displacement: max {} / mean {:.3}",
            self.max_displacement, self.mean_displacement
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}

/// A hash table using Robin Hood hashing with backward-shift deletion.
///
/// `RobinHoodTable<T, I>` stores values of type `T` and provides insertion,
/// lookup, and removal operations. Like a raw table, it requires you to
/// provide both the hash value and an equality predicate for each operation.
/// The index type `I` stores per-bucket displacements and bounds the
/// largest capacity the table grows to (see [`BucketIndex`]).
///
/// Capacities are taken from a ladder of primes. The first insertion
/// allocates 11 buckets; every growth picks the smallest ladder prime at
/// least twice the current capacity and reinserts all entries.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use robin_hash::hash_table::Entry;
/// # use robin_hash::hash_table::RobinHoodTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table: RobinHoodTable<Person> = RobinHoodTable::new();
/// let hash = hash_id(123);
///
/// match table.entry(hash, |p: &Person| p.id == 123) {
///     Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
/// assert_eq!(table.capacity(), 11);
/// ```
#[derive(Clone)]
pub struct RobinHoodTable<T, I = usize> {
    buckets: Box<[Slot<T, I>]>,
    populated: usize,
    release: Option<fn(&mut T)>,
}

impl<T, I: BucketIndex> Debug for RobinHoodTable<T, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::ToString;

        let capacity = self.capacity();
        f.debug_struct("RobinHoodTable")
            .field("populated", &self.populated)
            .field("capacity", &capacity)
            .field(
                "slots",
                &self
                    .buckets
                    .iter()
                    .map(|slot| match slot {
                        Some(b) => format!(
                            "{}+{}",
                            ideal_slot(b.hash, capacity),
                            b.displacement.into_usize()
                        ),
                        None => "..".to_string(),
                    })
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<T, I> Drop for RobinHoodTable<T, I> {
    fn drop(&mut self) {
        if let Some(release) = self.release {
            for bucket in self.buckets.iter_mut().flatten() {
                release(&mut bucket.value);
            }
        }
    }
}

impl<T, I> Default for RobinHoodTable<T, I> {
    fn default() -> Self {
        Self {
            buckets: Box::default(),
            populated: 0,
            release: None,
        }
    }
}

impl<T, I: BucketIndex> RobinHoodTable<T, I> {
    /// Creates an empty table. No memory is allocated until the first
    /// insertion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::RobinHoodTable;
    /// #
    /// let table: RobinHoodTable<String> = RobinHoodTable::new();
    /// assert_eq!(table.capacity(), 0);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table able to hold at least `capacity` values without
    /// growing.
    ///
    /// The bucket count is still taken from the prime ladder, so the table
    /// may hold more than requested.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::RobinHoodTable;
    /// #
    /// let table: RobinHoodTable<String> = RobinHoodTable::with_capacity(100);
    /// assert!(table.max_load() >= 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        let mut table = Self::new();
        table.reserve(capacity);
        table
    }

    /// Creates an empty table that calls `release` on every value leaving
    /// the table through [`remove`], [`retain`], [`clear`], [`reset`],
    /// draining, consuming iteration, or drop.
    ///
    /// Values replaced through [`insert`] are returned instead and do not
    /// pass through the hook.
    ///
    /// [`remove`]: RobinHoodTable::remove
    /// [`retain`]: RobinHoodTable::retain
    /// [`clear`]: RobinHoodTable::clear
    /// [`reset`]: RobinHoodTable::reset
    /// [`insert`]: RobinHoodTable::insert
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::RobinHoodTable;
    /// #
    /// let mut table: RobinHoodTable<String> =
    ///     RobinHoodTable::with_release_hook(|s: &mut String| s.clear());
    /// table.insert(7, "seven".to_string(), |s| s == "seven");
    ///
    /// let removed = table.remove(7, |s| s == "seven");
    /// assert_eq!(removed.as_deref(), Some(""));
    /// ```
    pub fn with_release_hook(release: fn(&mut T)) -> Self {
        let mut table = Self::default();
        table.release = Some(release);
        table
    }

    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of buckets currently allocated.
    ///
    /// This is `0` for a table that has never held a value, a prime from the
    /// capacity ladder otherwise, or `I::MAX_CAPACITY` once growth has
    /// saturated.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the number of elements the table can hold before the next
    /// insertion of a new value triggers growth.
    pub fn max_load(&self) -> usize {
        max_load(self.capacity())
    }

    /// Returns an iterator over all values in the table.
    ///
    /// Values are yielded in bucket order, which is unrelated to insertion
    /// order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::RobinHoodTable;
    /// #
    /// let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
    /// table.insert(1, 10, |&v| v == 10);
    /// table.insert(2, 20, |&v| v == 20);
    ///
    /// let mut values: Vec<u64> = table.iter().copied().collect();
    /// values.sort();
    /// assert_eq!(values, [10, 20]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T, I> {
        Iter {
            inner: self.buckets.iter(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator yielding mutable references to all values.
    ///
    /// Changing a value in a way that alters its hash or equality leaves the
    /// table unable to find it.
    pub fn iter_mut(&mut self) -> IterMut<'_, T, I> {
        IterMut {
            inner: self.buckets.iter_mut(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator that removes and yields all values from the table.
    ///
    /// The allocated capacity is kept. Values not consumed before the
    /// iterator is dropped are released and dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::RobinHoodTable;
    /// #
    /// let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
    /// table.insert(1, 10, |&v| v == 10);
    ///
    /// let values: Vec<u64> = table.drain().collect();
    /// assert!(table.is_empty());
    /// assert_eq!(values, [10]);
    /// assert_eq!(table.capacity(), 11);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, T, I> {
        Drain {
            inner: self.buckets.iter_mut(),
            populated: &mut self.populated,
            release: self.release,
        }
    }

    /// Removes all elements from the table, keeping its capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::RobinHoodTable;
    /// #
    /// let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
    /// table.insert(1, 10, |&v| v == 10);
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 11);
    /// ```
    pub fn clear(&mut self) {
        if self.populated == 0 {
            return;
        }

        for slot in self.buckets.iter_mut() {
            if let Some(mut bucket) = slot.take() {
                if let Some(release) = self.release {
                    release(&mut bucket.value);
                }
            }
        }
        self.populated = 0;
    }

    /// Removes all elements and releases the bucket array, returning the
    /// table to its freshly-constructed, zero-capacity state.
    ///
    /// The release hook stays installed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::RobinHoodTable;
    /// #
    /// let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
    /// table.insert(1, 10, |&v| v == 10);
    /// table.reset();
    /// assert_eq!(table.capacity(), 0);
    ///
    /// table.insert(1, 10, |&v| v == 10);
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn reset(&mut self) {
        self.clear();
        self.buckets = Box::default();
    }

    /// Finds a value in the table by hash and equality predicate.
    ///
    /// Never allocates; a zero-capacity table reports every value as absent.
    ///
    /// # Panics
    ///
    /// Panics if the probe sequence runs past the table's capacity, which
    /// only happens when the table has been corrupted by an inconsistent
    /// hash or equality.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::RobinHoodTable;
    /// #
    /// let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
    /// assert_eq!(table.find(42, |&n| n == 42), None);
    ///
    /// table.insert(42, 42, |&n| n == 42);
    /// assert_eq!(table.find(42, |&n| n == 42), Some(&42));
    /// ```
    #[inline]
    pub fn find(&self, hash: u64, eq: impl Fn(&T) -> bool) -> Option<&T> {
        let index = self.find_index(hash, eq)?;
        self.buckets[index].as_ref().map(|b| &b.value)
    }

    /// Finds a value in the table by hash and equality predicate, returning a
    /// mutable reference.
    #[inline]
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&T) -> bool) -> Option<&mut T> {
        let index = self.find_index(hash, eq)?;
        self.buckets[index].as_mut().map(|b| &mut b.value)
    }

    /// Inserts `value`, replacing and returning an existing value for which
    /// `eq` holds.
    ///
    /// Growth happens only when a new value is placed, never when an
    /// existing one is replaced.
    ///
    /// # Panics
    ///
    /// Panics if the table is full at `I::MAX_CAPACITY` buckets, or if the
    /// bucket array size overflows. Aborts through
    /// [`handle_alloc_error`](alloc::alloc::handle_alloc_error) when the
    /// allocator fails; use [`try_insert`](RobinHoodTable::try_insert) to
    /// observe that instead.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::RobinHoodTable;
    /// #
    /// let mut table: RobinHoodTable<(u64, &str)> = RobinHoodTable::new();
    /// assert_eq!(table.insert(1, (1, "a"), |e| e.0 == 1), None);
    /// assert_eq!(table.insert(1, (1, "b"), |e| e.0 == 1), Some((1, "a")));
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn insert(&mut self, hash: u64, value: T, eq: impl Fn(&T) -> bool) -> Option<T> {
        match self.entry(hash, eq) {
            Entry::Occupied(mut entry) => Some(core::mem::replace(entry.get_mut(), value)),
            Entry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    /// Fallible version of [`insert`](RobinHoodTable::insert).
    ///
    /// Returns an error instead of aborting when the bucket array cannot be
    /// allocated. The table is unchanged on error, and `value` is dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::RobinHoodTable;
    /// #
    /// let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
    /// assert_eq!(table.try_insert(5, 5, |&n| n == 5), Ok(None));
    /// ```
    pub fn try_insert(
        &mut self,
        hash: u64,
        value: T,
        eq: impl Fn(&T) -> bool,
    ) -> Result<Option<T>, TryReserveError> {
        match self.entry(hash, eq) {
            Entry::Occupied(mut entry) => Ok(Some(core::mem::replace(entry.get_mut(), value))),
            Entry::Vacant(entry) => entry.try_insert(value).map(|_| None),
        }
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// Looking up the entry never grows the table; a vacant entry grows it,
    /// if needed, when a value is inserted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::Entry;
    /// # use robin_hash::hash_table::RobinHoodTable;
    /// #
    /// let mut table: RobinHoodTable<String> = RobinHoodTable::new();
    ///
    /// match table.entry(3, |s| s == "hello") {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert("hello".to_string());
    ///     }
    ///     Entry::Occupied(mut entry) => {
    ///         entry.get_mut().push('!');
    ///     }
    /// }
    ///
    /// table.entry(3, |s| s == "hello").or_insert("hello".to_string());
    /// assert_eq!(table.len(), 1);
    /// ```
    #[inline]
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&T) -> bool) -> Entry<'_, T, I> {
        match self.find_index(hash, eq) {
            Some(index) => Entry::Occupied(OccupiedEntry { table: self, index }),
            None => Entry::Vacant(VacantEntry { table: self, hash }),
        }
    }

    /// Removes and returns a value from the table.
    ///
    /// Returns `None`, leaving the table untouched, if no value matches. The
    /// release hook, if any, runs on the value before it is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::RobinHoodTable;
    /// #
    /// let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
    /// table.insert(42, 42, |&n| n == 42);
    ///
    /// assert_eq!(table.remove(42, |&n| n == 42), Some(42));
    /// assert_eq!(table.remove(42, |&n| n == 42), None);
    /// assert!(table.is_empty());
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&T) -> bool) -> Option<T> {
        let index = self.find_index(hash, eq)?;
        Some(self.remove_at(index))
    }

    /// Retains only the values for which `f` returns `true`.
    ///
    /// `f` is called exactly once per value. Removed values pass through the
    /// release hook and are dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::RobinHoodTable;
    /// #
    /// let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
    /// for n in 0..10 {
    ///     table.insert(n, n, |&v| v == n);
    /// }
    /// table.retain(|v| *v % 2 == 0);
    /// assert_eq!(table.len(), 5);
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(&mut T) -> bool) {
        if self.populated == 0 {
            return;
        }

        // Entries only ever shift backward, and a slot that is empty or holds
        // an undisplaced entry never receives a displaced one. Starting there
        // means the walk never meets an entry twice.
        let capacity = self.capacity();
        let start = self
            .buckets
            .iter()
            .position(|slot| slot.as_ref().is_none_or(|b| b.displacement == I::ZERO))
            .unwrap_or(0);

        let mut index = start;
        let mut visited = 0;
        while visited < capacity {
            let keep = match &mut self.buckets[index] {
                Some(bucket) => f(&mut bucket.value),
                None => true,
            };

            if keep {
                visited += 1;
                index = next_slot(index, capacity);
            } else {
                drop(self.remove_at(index));
            }
        }
    }

    /// Reserves capacity for at least `additional` more elements.
    ///
    /// # Panics
    ///
    /// Panics if the new bucket array size overflows or cannot be reached
    /// under `I::MAX_CAPACITY`. Aborts if the allocator fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::RobinHoodTable;
    /// #
    /// let mut table: RobinHoodTable<i32> = RobinHoodTable::new();
    /// table.reserve(50);
    /// assert_eq!(table.capacity(), 131);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        infallible(self.try_reserve(additional));
    }

    /// Tries to reserve capacity for at least `additional` more elements.
    ///
    /// The capacity climbs the prime ladder until the load factor admits
    /// `len() + additional` elements, saturating at `I::MAX_CAPACITY`. The
    /// table is rehashed at most once.
    ///
    /// # Errors
    ///
    /// Returns [`TryReserveError::CapacityOverflow`] if the elements cannot
    /// fit even at the saturated capacity or the bucket array size overflows,
    /// and [`TryReserveError::AllocError`] if the allocator fails. The table
    /// is unchanged on error.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let required = self
            .populated
            .checked_add(additional)
            .ok_or(TryReserveError::CapacityOverflow)?;

        let mut capacity = self.capacity();
        if capacity == 0 {
            if required == 0 {
                return Ok(());
            }
            capacity = INITIAL_CAPACITY.min(I::MAX_CAPACITY);
        }

        while exceeds_load(required, capacity) {
            let next = next_capacity(capacity, I::MAX_CAPACITY);
            if next == capacity {
                break;
            }
            capacity = next;
        }

        if required > capacity {
            return Err(TryReserveError::CapacityOverflow);
        }

        if capacity != self.capacity() {
            self.rehash(capacity)?;
        }

        Ok(())
    }

    /// Makes room for one more value ahead of placing it.
    fn try_reserve_for_insert(&mut self) -> Result<(), TryReserveError> {
        let capacity = self.capacity();
        if capacity == I::MAX_CAPACITY && self.populated == capacity {
            capacity_exhausted(capacity);
        }
        self.try_reserve(1)
    }

    /// Moves every value into a fresh array of `capacity` buckets, scanning
    /// the old array in slot order.
    #[cold]
    fn rehash(&mut self, capacity: usize) -> Result<(), TryReserveError> {
        debug_assert!(capacity >= self.populated);

        let new_buckets = allocate_buckets::<T, I>(capacity)?;
        let old_buckets = core::mem::replace(&mut self.buckets, new_buckets);
        for bucket in old_buckets.into_vec().into_iter().flatten() {
            place(&mut self.buckets, bucket.hash, bucket.value);
        }

        Ok(())
    }

    #[inline]
    fn find_index(&self, hash: u64, eq: impl Fn(&T) -> bool) -> Option<usize> {
        if self.populated == 0 {
            return None;
        }

        let capacity = self.capacity();
        let mut index = ideal_slot(hash, capacity);
        for steps in 0..capacity {
            let bucket = self.buckets[index].as_ref()?;

            if bucket.hash == hash && eq(&bucket.value) {
                return Some(index);
            }

            // Had the value been here, it would have evicted this entry.
            if bucket.displacement.into_usize() < steps {
                return None;
            }

            index = next_slot(index, capacity);
        }

        // A completely full table may legitimately be walked end to end.
        if self.populated == capacity {
            return None;
        }

        probe_overrun()
    }

    /// Removes the value at `index`, then pulls the rest of its probe chain
    /// back one slot.
    fn remove_at(&mut self, mut index: usize) -> T {
        let Some(mut removed) = self.buckets[index].take() else {
            unreachable!("remove_at called on an empty slot");
        };
        self.populated -= 1;
        if let Some(release) = self.release {
            release(&mut removed.value);
        }

        let capacity = self.capacity();
        loop {
            let next = next_slot(index, capacity);
            let mut shifted = match self.buckets[next].take() {
                Some(bucket) if bucket.displacement != I::ZERO => bucket,
                home => {
                    self.buckets[next] = home;
                    break;
                }
            };

            shifted.displacement = I::from_usize(shifted.displacement.into_usize() - 1);
            self.buckets[index] = Some(shifted);
            index = next;
        }

        removed.value
    }

    /// Computes a histogram of displacements for the current table state.
    ///
    /// Entry `d` of the returned vector counts the elements sitting `d` slots
    /// past their ideal slot. The vector is as long as the largest
    /// displacement plus one, and empty for an empty table.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> Vec<usize> {
        let mut hist = Vec::new();
        for bucket in self.buckets.iter().flatten() {
            let displacement = bucket.displacement.into_usize();
            if hist.len() <= displacement {
                hist.resize(displacement + 1, 0);
            }
            hist[displacement] += 1;
        }
        hist
    }

    /// Returns detailed performance and utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let capacity = self.capacity();
        let (max_displacement, total_displacement) = self
            .buckets
            .iter()
            .flatten()
            .map(|b| b.displacement.into_usize())
            .fold((0, 0usize), |(max, total), d| (max.max(d), total + d));

        DebugStats {
            populated: self.populated,
            capacity,
            max_load: self.max_load(),
            load_factor: if capacity == 0 {
                0.0
            } else {
                self.populated as f64 / capacity as f64
            },
            max_displacement,
            mean_displacement: if self.populated == 0 {
                0.0
            } else {
                total_displacement as f64 / self.populated as f64
            },
            total_bytes: capacity * core::mem::size_of::<Slot<T, I>>(),
            wasted_bytes: (capacity - self.populated) * core::mem::size_of::<Slot<T, I>>(),
        }
    }

    /// Pretty-prints the displacement histogram horizontally using stdout.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_probe_histogram(&self) {
        let hist = self.probe_histogram();
        let max = hist.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!("probe histogram ({} entries):", self.populated);
        for (displacement, &count) in hist.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {} ({})", displacement, "█".repeat(width), count);
        }
    }

    /// Returns each slot's displacement, `None` for empty slots.
    #[cfg(test)]
    pub(crate) fn displacements(&self) -> Vec<Option<usize>> {
        self.buckets
            .iter()
            .map(|slot| slot.as_ref().map(|b| b.displacement.into_usize()))
            .collect()
    }

    /// Returns the slot holding the value matching `eq`.
    #[cfg(test)]
    pub(crate) fn slot_of(&self, hash: u64, eq: impl Fn(&T) -> bool) -> Option<usize> {
        self.find_index(hash, eq)
    }

    /// Checks every structural invariant, panicking on the first violation.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let capacity = self.capacity();
        assert_eq!(
            self.buckets.iter().flatten().count(),
            self.populated,
            "populated count drifted: {self:?}"
        );
        assert!(self.populated <= capacity);

        for (index, slot) in self.buckets.iter().enumerate() {
            let Some(bucket) = slot else { continue };
            let displacement = bucket.displacement.into_usize();
            let ideal = ideal_slot(bucket.hash, capacity);
            assert_eq!(
                (ideal + displacement) % capacity,
                index,
                "displacement of slot {index} is wrong: {self:?}"
            );

            // Every slot between the ideal slot and this one is occupied, and
            // no resident along the way is poorer than this entry was there.
            let mut probe = ideal;
            for steps in 0..displacement {
                let resident = self.buckets[probe]
                    .as_ref()
                    .unwrap_or_else(|| panic!("gap inside probe chain of slot {index}"));
                assert!(
                    resident.displacement.into_usize() >= steps,
                    "slot {probe} should have been evicted for slot {index}: {self:?}"
                );
                probe = next_slot(probe, capacity);
            }
        }
    }
}

impl<T, I: BucketIndex> IntoIterator for RobinHoodTable<T, I> {
    type Item = T;
    type IntoIter = IntoIter<T, I>;

    fn into_iter(mut self) -> Self::IntoIter {
        let remaining = core::mem::take(&mut self.populated);
        IntoIter {
            inner: core::mem::take(&mut self.buckets).into_vec().into_iter(),
            remaining,
            release: self.release,
        }
    }
}

impl<'a, T, I: BucketIndex> IntoIterator for &'a RobinHoodTable<T, I> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, I>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`RobinHoodTable`].
///
/// [`entry`]: RobinHoodTable::entry
pub enum Entry<'a, T, I = usize> {
    /// A vacant entry - no matching value is present in the table
    Vacant(VacantEntry<'a, T, I>),
    /// An occupied entry - a matching value is present in the table
    Occupied(OccupiedEntry<'a, T, I>),
}

impl<'a, T, I: BucketIndex> Entry<'a, T, I> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value in the entry.
    pub fn or_insert(self, default: T) -> &'a mut T {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the value in the entry.
    pub fn or_insert_with(self, default: impl FnOnce() -> T) -> &'a mut T {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Calls `f` on the value of an occupied entry.
    pub fn and_modify(self, f: impl FnOnce(&mut T)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }
}

/// A view into a vacant entry in a [`RobinHoodTable`].
pub struct VacantEntry<'a, T, I = usize> {
    table: &'a mut RobinHoodTable<T, I>,
    hash: u64,
}

impl<'a, T, I: BucketIndex> VacantEntry<'a, T, I> {
    /// Inserts `value`, growing the table first if the load factor requires
    /// it.
    ///
    /// # Panics
    ///
    /// Panics if the table is full at `I::MAX_CAPACITY` buckets.
    pub fn insert(self, value: T) -> &'a mut T {
        infallible(self.table.try_reserve_for_insert());
        self.place(value)
    }

    /// Fallible version of [`insert`](VacantEntry::insert). `value` is
    /// dropped on error.
    pub fn try_insert(self, value: T) -> Result<&'a mut T, TryReserveError> {
        self.table.try_reserve_for_insert()?;
        Ok(self.place(value))
    }

    fn place(self, value: T) -> &'a mut T {
        let index = place(&mut self.table.buckets, self.hash, value);
        self.table.populated += 1;
        match &mut self.table.buckets[index] {
            Some(bucket) => &mut bucket.value,
            None => unreachable!("value vanished after placement"),
        }
    }
}

/// A view into an occupied entry in a [`RobinHoodTable`].
pub struct OccupiedEntry<'a, T, I = usize> {
    table: &'a mut RobinHoodTable<T, I>,
    index: usize,
}

impl<'a, T, I: BucketIndex> OccupiedEntry<'a, T, I> {
    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &T {
        match &self.table.buckets[self.index] {
            Some(bucket) => &bucket.value,
            None => unreachable!("occupied entry points at an empty slot"),
        }
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut T {
        match &mut self.table.buckets[self.index] {
            Some(bucket) => &mut bucket.value,
            None => unreachable!("occupied entry points at an empty slot"),
        }
    }

    /// Converts the entry into a mutable reference bound to the table's
    /// lifetime.
    pub fn into_mut(self) -> &'a mut T {
        match &mut self.table.buckets[self.index] {
            Some(bucket) => &mut bucket.value,
            None => unreachable!("occupied entry points at an empty slot"),
        }
    }

    /// Removes the value from the table and returns it.
    ///
    /// The release hook, if any, runs on the value first.
    pub fn remove(self) -> T {
        self.table.remove_at(self.index)
    }
}

/// An iterator over the values in a [`RobinHoodTable`].
///
/// This struct is created by the [`iter`] method on [`RobinHoodTable`].
///
/// [`iter`]: RobinHoodTable::iter
pub struct Iter<'a, T, I = usize> {
    inner: core::slice::Iter<'a, Slot<T, I>>,
    remaining: usize,
}

impl<T, I> Clone for Iter<'_, T, I> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, T, I> Iterator for Iter<'a, T, I> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let bucket = self.inner.find_map(|slot| slot.as_ref())?;
        self.remaining -= 1;
        Some(&bucket.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, I> ExactSizeIterator for Iter<'_, T, I> {}

impl<T, I> FusedIterator for Iter<'_, T, I> {}

/// A mutable iterator over the values in a [`RobinHoodTable`].
///
/// This struct is created by the [`iter_mut`] method on [`RobinHoodTable`].
///
/// [`iter_mut`]: RobinHoodTable::iter_mut
pub struct IterMut<'a, T, I = usize> {
    inner: core::slice::IterMut<'a, Slot<T, I>>,
    remaining: usize,
}

impl<'a, T, I> Iterator for IterMut<'a, T, I> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let bucket = self.inner.find_map(|slot| slot.as_mut())?;
        self.remaining -= 1;
        Some(&mut bucket.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, I> ExactSizeIterator for IterMut<'_, T, I> {}

impl<T, I> FusedIterator for IterMut<'_, T, I> {}

/// A draining iterator over the values in a [`RobinHoodTable`].
///
/// This struct is created by the [`drain`] method on [`RobinHoodTable`].
/// It yields owned values and empties the table as it iterates.
///
/// [`drain`]: RobinHoodTable::drain
pub struct Drain<'a, T, I = usize> {
    inner: core::slice::IterMut<'a, Slot<T, I>>,
    // Counts down per yielded value, so a leaked `Drain` leaves the table
    // consistent with the values it did not take.
    populated: &'a mut usize,
    release: Option<fn(&mut T)>,
}

impl<T, I> Drop for Drain<'_, T, I> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

impl<T, I> Iterator for Drain<'_, T, I> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if *self.populated == 0 {
            return None;
        }

        let mut bucket = self.inner.find_map(|slot| slot.take())?;
        *self.populated -= 1;
        if let Some(release) = self.release {
            release(&mut bucket.value);
        }
        Some(bucket.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (*self.populated, Some(*self.populated))
    }
}

impl<T, I> ExactSizeIterator for Drain<'_, T, I> {}

impl<T, I> FusedIterator for Drain<'_, T, I> {}

/// An owning iterator over the values of a [`RobinHoodTable`].
pub struct IntoIter<T, I = usize> {
    inner: alloc::vec::IntoIter<Slot<T, I>>,
    remaining: usize,
    release: Option<fn(&mut T)>,
}

impl<T, I> Drop for IntoIter<T, I> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

impl<T, I> Iterator for IntoIter<T, I> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let mut bucket = self.inner.find_map(|slot| slot)?;
        self.remaining -= 1;
        if let Some(release) = self.release {
            release(&mut bucket.value);
        }
        Some(bucket.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, I> ExactSizeIterator for IntoIter<T, I> {}

impl<T, I> FusedIterator for IntoIter<T, I> {}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use core::hash::Hasher;
    use core::sync::atomic::AtomicUsize;
    use core::sync::atomic::Ordering;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    struct HashState {
        k0: u64,
        k1: u64,
    }

    impl HashState {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k0: rng.try_next_u64().unwrap(),
                k1: rng.try_next_u64().unwrap(),
            }
        }

        fn build_hasher(&self) -> SipHasher {
            SipHasher::new_with_keys(self.k0, self.k1)
        }
    }

    #[derive(Debug, PartialEq, Eq, Clone)]
    struct Item {
        key: u64,
        value: i32,
    }

    fn hash_key(state: &HashState, key: u64) -> u64 {
        let mut h = state.build_hasher();
        h.write_u64(key);
        h.finish()
    }

    fn insert_item(table: &mut RobinHoodTable<Item>, hash: u64, key: u64, value: i32) {
        match table.entry(hash, |v: &Item| v.key == key) {
            Entry::Vacant(v) => {
                v.insert(Item { key, value });
            }
            Entry::Occupied(_) => panic!("unexpected occupied on first insert: {:#?}", table),
        }
    }

    #[test]
    fn insert_and_find() {
        let state = HashState::default();
        let mut table: RobinHoodTable<Item> = RobinHoodTable::new();
        for k in 0..32u64 {
            let hash = hash_key(&state, k);
            insert_item(&mut table, hash, k, (k as i32) * 2);
            assert_eq!(
                table.find(hash, |v| v.key == k),
                Some(&Item {
                    key: k,
                    value: (k as i32) * 2
                }),
                "{:#?}",
                table
            );
        }
        assert_eq!(table.len(), 32);
        table.assert_invariants();

        for k in 0..32u64 {
            let hash = hash_key(&state, k);
            assert_eq!(table.find(hash, |v| v.key == k).map(|v| v.value), Some(k as i32 * 2));
        }

        let miss_hash = hash_key(&state, 999);
        assert!(table.find(miss_hash, |v| v.key == 999).is_none());
    }

    #[test]
    fn lookup_on_unallocated_table_does_not_allocate() {
        let mut table: RobinHoodTable<String> = RobinHoodTable::new();
        assert_eq!(table.find(17, |s| s == "missing"), None);
        assert_eq!(table.find_mut(17, |s| s == "missing"), None);
        assert_eq!(table.remove(17, |s| s == "missing"), None);
        assert!(matches!(table.entry(17, |s| s == "missing"), Entry::Vacant(_)));
        assert_eq!(table.capacity(), 0);
    }

    #[test]
    fn first_insert_allocates_eleven_buckets() {
        let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
        table.insert(3, 3, |&v| v == 3);
        assert_eq!(table.capacity(), 11);
    }

    #[test]
    fn duplicate_entry_is_occupied() {
        let state = HashState::default();
        let mut table: RobinHoodTable<Item> = RobinHoodTable::new();
        let k = 42u64;
        let hash = hash_key(&state, k);
        insert_item(&mut table, hash, k, 7);

        match table.entry(hash, |v| v.key == k) {
            Entry::Occupied(mut occ) => {
                let prev_value = occ.get().value;
                *occ.get_mut() = Item { key: k, value: 11 };
                assert_eq!(prev_value, 7, "{:#?}", table);
            }
            Entry::Vacant(_) => panic!("should be occupied: {}#{:02X} in {:#?}", k, hash, table),
        }
        let found = table.find(hash, |v| v.key == k).unwrap();
        assert_eq!(found.value, 11);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn overwrite_keeps_count() {
        let mut table: RobinHoodTable<(u64, &str)> = RobinHoodTable::new();
        table.insert(9, (9, "v1"), |e| e.0 == 9);
        let before = table.len();
        assert_eq!(table.insert(9, (9, "v2"), |e| e.0 == 9), Some((9, "v1")));
        assert_eq!(table.len(), before);
        assert_eq!(table.find(9, |e| e.0 == 9), Some(&(9, "v2")));
    }

    #[test]
    fn overwrite_does_not_grow_a_table_at_its_threshold() {
        let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
        for k in 0..8u64 {
            table.insert(k, k, |&v| v == k);
        }
        assert_eq!(table.capacity(), 11);
        table.insert(3, 3, |&v| v == 3);
        assert_eq!(table.capacity(), 11);
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn growth_triggers_on_ninth_insert() {
        let state = HashState::default();
        let mut table: RobinHoodTable<Item> = RobinHoodTable::new();
        for k in 1..=20u64 {
            insert_item(&mut table, hash_key(&state, k), k, k as i32 * 10);
            match k {
                1..=8 => assert_eq!(table.capacity(), 11, "after insert {k}"),
                _ => assert_eq!(table.capacity(), 37, "after insert {k}"),
            }
        }
        assert_eq!(table.len(), 20);
        assert_eq!(
            table.find(hash_key(&state, 5), |v| v.key == 5).map(|v| v.value),
            Some(50)
        );
        table.assert_invariants();
    }

    #[test]
    fn find_mut_and_modify() {
        let state = HashState::default();
        let mut table: RobinHoodTable<Item> = RobinHoodTable::new();
        for k in 0..5u64 {
            insert_item(&mut table, hash_key(&state, k), k, 1);
        }

        for k in 0..5u64 {
            let hash = hash_key(&state, k);
            if let Some(v) = table.find_mut(hash, |v| v.key == k) {
                v.value += 9;
            }
        }
        for k in 0..5u64 {
            let hash = hash_key(&state, k);
            let v = table.find(hash, |v| v.key == k).unwrap();
            assert_eq!(v.value, 10);
        }
    }

    #[test]
    fn remove_items() {
        let state = HashState::default();
        let mut table: RobinHoodTable<Item> = RobinHoodTable::new();
        for k in 0..8u64 {
            insert_item(&mut table, hash_key(&state, k), k, k as i32);
        }
        assert_eq!(table.len(), 8);
        for k in [0u64, 3, 7] {
            let hash = hash_key(&state, k);
            let removed = table.remove(hash, |v| v.key == k).expect("should remove");
            assert_eq!(removed.key, k);
            table.assert_invariants();
        }
        assert_eq!(table.len(), 5);

        let hash = hash_key(&state, 1000);
        assert!(table.remove(hash, |v| v.key == 1000).is_none());
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn backward_shift_compacts_chain() {
        // Hashes 0, 11 and 22 all want slot 0 of an 11-bucket table.
        let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
        for h in [0u64, 11, 22] {
            table.insert(h, h, |&v| v == h);
        }
        assert_eq!(table.slot_of(11, |&v| v == 11), Some(1));
        assert_eq!(table.slot_of(22, |&v| v == 22), Some(2));
        assert_eq!(&table.displacements()[..4], &[Some(0), Some(1), Some(2), None]);

        assert_eq!(table.remove(0, |&v| v == 0), Some(0));
        assert_eq!(&table.displacements()[..4], &[Some(0), Some(1), None, None]);
        assert_eq!(table.slot_of(11, |&v| v == 11), Some(0));
        assert_eq!(table.slot_of(22, |&v| v == 22), Some(1));
        table.assert_invariants();
    }

    #[test]
    fn backward_shift_stops_at_home_entry() {
        // Slot 0 chain: 0, 11. Slot 2 holds an undisplaced entry (hash 2).
        let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
        for h in [0u64, 11, 2] {
            table.insert(h, h, |&v| v == h);
        }
        assert_eq!(&table.displacements()[..3], &[Some(0), Some(1), Some(0)]);

        table.remove(0, |&v| v == 0);
        assert_eq!(&table.displacements()[..3], &[Some(0), None, Some(0)]);
        assert_eq!(table.slot_of(2, |&v| v == 2), Some(2));
    }

    #[test]
    fn robin_hood_evicts_richer_resident() {
        // 1 sits at home in slot 1. 0 and 11 both want slot 0; 11 reaches slot
        // 1 with displacement 1 and evicts 1, which moves to slot 2.
        let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
        for h in [0u64, 1, 11] {
            table.insert(h, h, |&v| v == h);
        }
        assert_eq!(table.slot_of(11, |&v| v == 11), Some(1));
        assert_eq!(table.slot_of(1, |&v| v == 1), Some(2));
        assert_eq!(&table.displacements()[..3], &[Some(0), Some(1), Some(1)]);
        table.assert_invariants();
    }

    #[test]
    fn probe_chain_wraps_around() {
        let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
        for h in [10u64, 21, 32] {
            table.insert(h, h, |&v| v == h);
        }
        assert_eq!(table.slot_of(21, |&v| v == 21), Some(0));
        assert_eq!(table.slot_of(32, |&v| v == 32), Some(1));

        table.remove(10, |&v| v == 10);
        assert_eq!(table.slot_of(21, |&v| v == 21), Some(10));
        assert_eq!(table.slot_of(32, |&v| v == 32), Some(0));
        table.assert_invariants();
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn insert_many() {
        let state = HashState::default();
        let mut table: RobinHoodTable<Item> = RobinHoodTable::new();
        for k in 0..100000u64 {
            insert_item(&mut table, hash_key(&state, k), k, k as i32);
        }

        assert_eq!(table.len(), 100000);
        for k in 0..100000u64 {
            let hash = hash_key(&state, k);
            assert_eq!(
                table.find(hash, |v| v.key == k),
                Some(&Item {
                    key: k,
                    value: k as i32
                })
            );
        }
        table.assert_invariants();
    }

    #[test]
    fn explicit_collision() {
        let mut table: RobinHoodTable<Item> = RobinHoodTable::new();
        let hash = 0;
        for k in 0..65u64 {
            insert_item(&mut table, hash, k, k as i32);
        }

        assert_eq!(table.len(), 65);
        for k in 0..65u64 {
            assert_eq!(
                table.find(hash, |v| v.key == k).map(|v| v.value),
                Some(k as i32),
                "{:#?}",
                table
            );
        }
        table.assert_invariants();

        for k in (0..65u64).step_by(2) {
            assert!(table.remove(hash, |v| v.key == k).is_some());
        }
        assert_eq!(table.len(), 32);
        table.assert_invariants();
        for k in (1..65u64).step_by(2) {
            assert!(table.find(hash, |v| v.key == k).is_some());
        }
    }

    #[test]
    fn iter_and_drain() {
        let state = HashState::default();
        let mut table: RobinHoodTable<Item> = RobinHoodTable::new();
        for k in 10..20u64 {
            insert_item(&mut table, hash_key(&state, k), k, k as i32);
        }

        assert_eq!(table.iter().len(), 10);
        let mut seen = table.iter().map(|v| v.key).collect::<Vec<_>>();
        seen.sort_unstable();
        assert_eq!(seen, (10..20).collect::<Vec<_>>());

        let first_pass = table.iter();
        let second_pass = first_pass.clone();
        assert_eq!(first_pass.count(), second_pass.count());

        let capacity = table.capacity();
        let mut drained = table.drain().map(|v| v.key).collect::<Vec<_>>();
        drained.sort_unstable();
        assert_eq!(drained, (10..20).collect::<Vec<_>>());
        assert!(table.is_empty());
        assert_eq!(table.capacity(), capacity);
        assert_eq!(table.iter().count(), 0);
    }

    #[test]
    fn partially_consumed_drain_empties_table() {
        let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
        for k in 0..6u64 {
            table.insert(k, k, |&v| v == k);
        }
        let first = table.drain().next();
        assert!(first.is_some());
        assert!(table.is_empty());
        assert!(table.displacements().iter().all(Option::is_none));
    }

    #[test]
    fn leaked_drain_leaves_consistent_table() {
        let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
        for k in 0..8u64 {
            table.insert(k, k, |&v| v == k);
        }

        let mut drain = table.drain();
        assert_eq!(drain.next().map(|v| v < 8), Some(true));
        core::mem::forget(drain);
        assert_eq!(table.len(), 7);
        table.assert_invariants();

        core::mem::forget(table.drain());
        assert_eq!(table.len(), 7);
        table.insert(100, 100, |&v| v == 100);
        for k in 0..8u64 {
            table.insert(k, k, |&v| v == k);
        }
        assert_eq!(table.len(), 9);
        assert_eq!(table.iter().count(), 9);
        table.assert_invariants();
    }

    #[test]
    fn iter_mut_updates_values() {
        let mut table: RobinHoodTable<(u64, i32)> = RobinHoodTable::new();
        for k in 0..10u64 {
            table.insert(k, (k, 0), |e| e.0 == k);
        }
        for entry in table.iter_mut() {
            entry.1 = entry.0 as i32 + 1;
        }
        for k in 0..10u64 {
            assert_eq!(table.find(k, |e| e.0 == k).unwrap().1, k as i32 + 1);
        }
    }

    #[test]
    fn into_iter_yields_everything() {
        let mut table: RobinHoodTable<String> = RobinHoodTable::new();
        for (h, s) in ["a", "b", "c"].iter().enumerate() {
            table.insert(h as u64, s.to_string(), |v| v == s);
        }
        let mut all: Vec<String> = table.into_iter().collect();
        all.sort();
        assert_eq!(all, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    }

    #[test]
    fn clear_keeps_capacity() {
        let state = HashState::default();
        let mut table: RobinHoodTable<Item> = RobinHoodTable::new();
        for k in 0..50u64 {
            insert_item(&mut table, hash_key(&state, k), k, k as i32);
        }
        let capacity = table.capacity();
        table.clear();
        assert_eq!(table.len(), 0);
        assert_eq!(table.capacity(), capacity);

        insert_item(&mut table, hash_key(&state, 1), 1, 1);
        assert_eq!(table.capacity(), capacity);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn reset_returns_to_zero_capacity() {
        let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
        for k in 0..20u64 {
            table.insert(k, k, |&v| v == k);
        }
        table.reset();
        assert_eq!(table.capacity(), 0);
        assert!(table.is_empty());
        assert_eq!(table.find(4, |&v| v == 4), None);

        table.insert(4, 4, |&v| v == 4);
        assert_eq!(table.capacity(), 11);
        assert_eq!(table.find(4, |&v| v == 4), Some(&4));
    }

    static RELEASED: AtomicUsize = AtomicUsize::new(0);

    fn count_release(_: &mut u64) {
        RELEASED.fetch_add(1, Ordering::Relaxed);
    }

    fn released() -> usize {
        RELEASED.load(Ordering::Relaxed)
    }

    #[test]
    fn release_hook_runs_once_per_departure() {
        let mut table: RobinHoodTable<u64> = RobinHoodTable::with_release_hook(count_release);
        for k in 0..30u64 {
            table.insert(k, k, |&v| v == k);
        }
        assert_eq!(released(), 0);

        // Overwrites hand the old value back instead.
        table.insert(3, 3, |&v| v == 3);
        assert_eq!(released(), 0);

        table.remove(3, |&v| v == 3);
        table.remove(3, |&v| v == 3);
        assert_eq!(released(), 1);

        table.retain(|v| *v >= 10);
        assert_eq!(released(), 10);

        let drained = table.drain().take(5).count();
        assert_eq!(drained, 5);
        assert_eq!(released(), 30);

        for k in 0..4u64 {
            table.insert(k, k, |&v| v == k);
        }
        table.clear();
        assert_eq!(released(), 34);

        for k in 0..4u64 {
            table.insert(k, k, |&v| v == k);
        }
        table.reset();
        assert_eq!(released(), 38);

        table.insert(1, 1, |&v| v == 1);
        drop(table);
        assert_eq!(released(), 39);
    }

    #[test]
    fn retain_visits_each_value_once() {
        let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
        // Heavy collisions so removals shift long chains, including across
        // the wrap point.
        for k in 0..60u64 {
            table.insert(k % 7 + 100, k, |&v| v == k);
        }
        let mut calls = 0;
        table.retain(|v| {
            calls += 1;
            *v % 3 != 0
        });
        assert_eq!(calls, 60);
        assert_eq!(table.len(), 40);
        table.assert_invariants();
        for k in 0..60u64 {
            assert_eq!(table.find(k % 7 + 100, |&v| v == k).is_some(), k % 3 != 0);
        }
    }

    #[test]
    fn reserve_climbs_the_ladder_once() {
        let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
        table.reserve(0);
        assert_eq!(table.capacity(), 0);

        table.reserve(50);
        assert_eq!(table.capacity(), 131);
        for k in 0..50u64 {
            table.insert(k, k, |&v| v == k);
        }
        assert_eq!(table.capacity(), 131);
    }

    #[test]
    fn small_index_saturates() {
        let mut table: RobinHoodTable<u64, u8> = RobinHoodTable::new();
        for k in 0..255u64 {
            table.insert(k, k, |&v| v == k);
        }
        assert_eq!(table.capacity(), 255);
        assert_eq!(table.len(), 255);
        for k in 0..255u64 {
            assert_eq!(table.find(k, |&v| v == k), Some(&k));
        }
        assert_eq!(table.find(1000, |&v| v == 1000), None);

        // Updates still work on a full table.
        assert_eq!(table.insert(7, 7, |&v| v == 7), Some(7));

        assert_eq!(table.try_reserve(1), Err(TryReserveError::CapacityOverflow));
        assert_eq!(table.remove(0, |&v| v == 0), Some(0));
        assert_eq!(table.insert(0, 0, |&v| v == 0), None);
    }

    #[test]
    #[should_panic(expected = "maximum capacity")]
    fn inserting_past_saturation_panics() {
        let mut table: RobinHoodTable<u64, u8> = RobinHoodTable::new();
        for k in 0..256u64 {
            table.insert(k, k, |&v| v == k);
        }
    }

    #[test]
    fn oversized_reservation_reports_overflow() {
        let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
        assert_eq!(
            table.try_reserve(usize::MAX / 2),
            Err(TryReserveError::CapacityOverflow)
        );
        assert_eq!(table.capacity(), 0);
        assert_eq!(table.try_reserve(usize::MAX), Err(TryReserveError::CapacityOverflow));
    }

    #[test]
    fn entry_or_insert_with() {
        let state = HashState::default();
        let mut table: RobinHoodTable<Item> = RobinHoodTable::new();
        let k = 5u64;
        let hash = hash_key(&state, k);

        let v = table
            .entry(hash, |v| v.key == k)
            .or_insert_with(|| Item { key: k, value: 1 });
        v.value += 1;

        let v = table
            .entry(hash, |v| v.key == k)
            .and_modify(|v| v.value *= 10)
            .or_insert(Item { key: k, value: 0 });
        assert_eq!(v.value, 20);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn occupied_entry_remove_shifts_chain() {
        let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
        for h in [4u64, 15, 26] {
            table.insert(h, h, |&v| v == h);
        }
        match table.entry(4, |&v| v == 4) {
            Entry::Occupied(entry) => assert_eq!(entry.remove(), 4),
            Entry::Vacant(_) => panic!("expected occupied"),
        }
        assert_eq!(table.slot_of(15, |&v| v == 15), Some(4));
        assert_eq!(table.slot_of(26, |&v| v == 26), Some(5));
        table.assert_invariants();
    }

    #[test]
    fn clone_is_independent() {
        let mut table: RobinHoodTable<String> = RobinHoodTable::new();
        for k in 0..12u64 {
            table.insert(k, k.to_string(), |v| *v == k.to_string());
        }
        let mut copy = table.clone();
        copy.remove(3, |v| v == "3");
        assert_eq!(copy.len(), 11);
        assert_eq!(table.len(), 12);
        assert_eq!(table.find(3, |v| v == "3").map(String::as_str), Some("3"));
        copy.assert_invariants();
    }

    #[test]
    fn stats_report_displacements() {
        let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
        for h in [0u64, 11, 22, 5] {
            table.insert(h, h, |&v| v == h);
        }
        assert_eq!(table.probe_histogram(), vec![2, 1, 1]);

        let stats = table.debug_stats();
        assert_eq!(stats.populated, 4);
        assert_eq!(stats.capacity, 11);
        assert_eq!(stats.max_displacement, 2);
        assert!((stats.mean_displacement - 0.75).abs() < f64::EPSILON);
        #[cfg(feature = "std")]
        {
            stats.print();
            table.print_probe_histogram();
        }
    }

    #[test]
    fn debug_output_shows_slot_layout() {
        let mut table: RobinHoodTable<u64> = RobinHoodTable::new();
        table.insert(0, 0, |&v| v == 0);
        table.insert(11, 11, |&v| v == 11);
        let out = alloc::format!("{:?}", table);
        assert!(out.contains("\"0+0\""), "{out}");
        assert!(out.contains("\"0+1\""), "{out}");
        assert!(out.contains("\"..\""), "{out}");
    }
}
