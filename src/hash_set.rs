use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;

use crate::DefaultHashBuilder;
use crate::error::TryReserveError;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::RobinHoodTable;
use crate::index::BucketIndex;

/// A hash set implemented using the Robin Hood [`RobinHoodTable`] as the
/// underlying storage.
///
/// `HashSet<T, S, I>` stores values of type `T` where `T` implements
/// `Hash + Eq` and uses a configurable hasher builder `S` to hash values. The
/// index type `I` bounds the number of buckets the set grows to.
///
/// # Performance Characteristics
///
/// - **Memory**: the size of `T`, a u64 for the hash and an `I` for the
///   displacement per bucket, padded to alignment.
#[derive(Clone)]
pub struct HashSet<T, S = DefaultHashBuilder, I = usize> {
    table: RobinHoodTable<T, I>,
    hash_builder: S,
}

impl<T, S, I> PartialEq for HashSet<T, S, I>
where
    T: Hash + Eq,
    S: BuildHasher,
    I: BucketIndex,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S, I> Eq for HashSet<T, S, I>
where
    T: Hash + Eq,
    S: BuildHasher,
    I: BucketIndex,
{
}

impl<T, S, I> Debug for HashSet<T, S, I>
where
    T: Debug,
    I: BucketIndex,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> HashSet<T, DefaultHashBuilder, usize> {
    /// Creates an empty set using the default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashSet;
    ///
    /// let set: HashSet<i32> = HashSet::new();
    /// assert!(set.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates a set able to hold at least `capacity` values without growing,
    /// using the default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashSet;
    ///
    /// let set: HashSet<i32> = HashSet::with_capacity(100);
    /// assert!(set.capacity() >= 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }

    /// Creates an empty set using the default hasher builder that calls
    /// `release` on every value leaving the set.
    pub fn with_release_hook(release: fn(&mut T)) -> Self {
        Self::with_config(0, DefaultHashBuilder::default(), Some(release))
    }
}

impl<T, S> HashSet<T, S, usize> {
    /// Creates a new hash set with the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasherDefault;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// use robin_hash::HashSet;
    ///
    /// let mut set = HashSet::with_hasher(BuildHasherDefault::<SipHasher>::default());
    /// set.insert(1);
    /// assert!(set.contains(&1));
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_config(0, hash_builder, None)
    }

    /// Creates a new hash set with the specified capacity and hasher builder.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self::with_config(capacity, hash_builder, None)
    }

    /// Creates a new hash set with the given hasher builder that calls
    /// `release` on every value leaving the set.
    pub fn with_hasher_and_release_hook(hash_builder: S, release: fn(&mut T)) -> Self {
        Self::with_config(0, hash_builder, Some(release))
    }
}

impl<T, S, I> HashSet<T, S, I>
where
    I: BucketIndex,
{
    /// Creates a set with any index type, reserving room for `capacity`
    /// values and optionally installing a release hook.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` values cannot fit under `I::MAX_CAPACITY`
    /// buckets.
    pub fn with_config(capacity: usize, hash_builder: S, release: Option<fn(&mut T)>) -> Self {
        let mut table = match release {
            Some(release) => RobinHoodTable::with_release_hook(release),
            None => RobinHoodTable::new(),
        };
        table.reserve(capacity);
        Self {
            table,
            hash_builder,
        }
    }

    /// Returns a reference to the set's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of elements the set can hold without growing.
    pub fn capacity(&self) -> usize {
        self.table.max_load()
    }

    /// Clears the set, removing all values. Keeps the allocated memory for
    /// reuse.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.insert(1);
    /// set.clear();
    /// assert!(set.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Removes all values and frees the bucket array.
    pub fn reset(&mut self) {
        self.table.reset();
    }

    /// An iterator visiting all elements in arbitrary order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.insert(1);
    /// set.insert(2);
    ///
    /// let mut values: Vec<_> = set.iter().copied().collect();
    /// values.sort();
    /// assert_eq!(values, vec![1, 2]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T, I> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Clears the set, returning all elements as an iterator. Keeps the
    /// allocated memory for reuse.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.insert(1);
    /// set.insert(2);
    ///
    /// let drained: Vec<_> = set.drain().collect();
    /// assert_eq!(drained.len(), 2);
    /// assert!(set.is_empty());
    /// ```
    pub fn drain(&mut self) -> Drain<'_, T, I> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Retains only the elements specified by the predicate.
    ///
    /// In other words, remove all elements `e` for which `f(&e)` returns
    /// `false`. The elements are visited in unsorted (and unspecified)
    /// order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = (1..=4).collect();
    /// set.retain(|&x| x % 2 == 0);
    /// assert_eq!(set.len(), 2);
    /// assert!(set.contains(&2));
    /// assert!(set.contains(&4));
    /// ```
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.table.retain(|v| f(v));
    }
}

impl<T, S, I> HashSet<T, S, I>
where
    T: Hash + Eq,
    S: BuildHasher,
    I: BucketIndex,
{
    /// Reserves capacity for at least `additional` more elements.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Tries to reserve capacity for at least `additional` more elements.
    ///
    /// # Errors
    ///
    /// Returns [`TryReserveError`] if the capacity overflows or the allocator
    /// reports a failure.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.table.try_reserve(additional)
    }

    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. If an equal value is
    /// already present, the stored value is kept and `value` is dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// assert_eq!(set.insert(37), true);
    /// assert_eq!(set.insert(37), false);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(hash, |v| v == &value) {
            TableEntry::Occupied(_) => false,
            TableEntry::Vacant(entry) => {
                entry.insert(value);
                true
            }
        }
    }

    /// Fallible version of [`insert`](HashSet::insert).
    ///
    /// # Errors
    ///
    /// Returns [`TryReserveError`] when adding a new value needs a larger
    /// bucket array that cannot be allocated.
    pub fn try_insert(&mut self, value: T) -> Result<bool, TryReserveError> {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(hash, |v| v == &value) {
            TableEntry::Occupied(_) => Ok(false),
            TableEntry::Vacant(entry) => entry.try_insert(value).map(|_| true),
        }
    }

    /// Returns `true` if the set contains a value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashSet;
    ///
    /// let mut set: HashSet<String> = HashSet::new();
    /// set.insert("a".to_string());
    /// assert!(set.contains("a"));
    /// assert!(!set.contains("b"));
    /// ```
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(value).is_some()
    }

    /// Returns a reference to the value in the set, if any, that is equal to
    /// the given value.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(value);
        self.table.find(hash, |v| v.borrow() == value)
    }

    /// Removes a value from the set. Returns whether the value was
    /// present in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.insert(1);
    /// assert_eq!(set.remove(&1), true);
    /// assert_eq!(set.remove(&1), false);
    /// ```
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.take(value).is_some()
    }

    /// Adds a value to the set, replacing the existing value, if any, that is
    /// equal to the given one. Returns the replaced value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.insert(1);
    /// assert_eq!(set.replace(1), Some(1));
    /// assert_eq!(set.replace(2), None);
    /// assert_eq!(set.len(), 2);
    /// ```
    pub fn replace(&mut self, value: T) -> Option<T> {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(hash, |v| v == &value) {
            TableEntry::Occupied(mut entry) => Some(core::mem::replace(entry.get_mut(), value)),
            TableEntry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    /// Removes and returns the value in the set, if any, that is equal to the
    /// given one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.insert(1);
    /// assert_eq!(set.take(&1), Some(1));
    /// assert_eq!(set.take(&1), None);
    /// ```
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(value);
        self.table.remove(hash, |v| v.borrow() == value)
    }

    /// Returns `true` if `self` has no elements in common with `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashSet;
    ///
    /// let a: HashSet<i32> = [1, 2, 3].into_iter().collect();
    /// let mut b: HashSet<i32> = HashSet::new();
    /// assert!(a.is_disjoint(&b));
    /// b.insert(4);
    /// assert!(a.is_disjoint(&b));
    /// b.insert(1);
    /// assert!(!a.is_disjoint(&b));
    /// ```
    pub fn is_disjoint(&self, other: &Self) -> bool {
        if self.len() <= other.len() {
            self.iter().all(|v| !other.contains(v))
        } else {
            other.iter().all(|v| !self.contains(v))
        }
    }

    /// Returns `true` if the set is a subset of another, i.e., `other`
    /// contains at least all the values in `self`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.iter().all(|v| other.contains(v))
    }

    /// Returns `true` if the set is a superset of another, i.e., `self`
    /// contains at least all the values in `other`.
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// Visits the values representing the union, i.e., all the values in
    /// `self` or `other`, without duplicates.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashSet;
    ///
    /// let a: HashSet<i32> = [1, 2].into_iter().collect();
    /// let b: HashSet<i32> = [2, 3].into_iter().collect();
    ///
    /// let mut union: Vec<_> = a.union(&b).copied().collect();
    /// union.sort();
    /// assert_eq!(union, [1, 2, 3]);
    /// ```
    pub fn union<'a>(&'a self, other: &'a Self) -> Union<'a, T, S, I> {
        let (larger, smaller) = if self.len() >= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        Union {
            iter: larger.iter().chain(smaller.difference(larger)),
        }
    }

    /// Visits the values representing the intersection, i.e., the values
    /// that are both in `self` and `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashSet;
    ///
    /// let a: HashSet<i32> = [1, 2].into_iter().collect();
    /// let b: HashSet<i32> = [2, 3].into_iter().collect();
    ///
    /// let intersection: Vec<_> = a.intersection(&b).copied().collect();
    /// assert_eq!(intersection, [2]);
    /// ```
    pub fn intersection<'a>(&'a self, other: &'a Self) -> Intersection<'a, T, S, I> {
        if self.len() <= other.len() {
            Intersection {
                iter: self.iter(),
                other,
            }
        } else {
            Intersection {
                iter: other.iter(),
                other: self,
            }
        }
    }

    /// Visits the values representing the difference, i.e., the values that
    /// are in `self` but not in `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashSet;
    ///
    /// let a: HashSet<i32> = [1, 2].into_iter().collect();
    /// let b: HashSet<i32> = [2, 3].into_iter().collect();
    ///
    /// let difference: Vec<_> = a.difference(&b).copied().collect();
    /// assert_eq!(difference, [1]);
    /// ```
    pub fn difference<'a>(&'a self, other: &'a Self) -> Difference<'a, T, S, I> {
        Difference {
            iter: self.iter(),
            other,
        }
    }

    /// Visits the values representing the symmetric difference, i.e., the
    /// values that are in `self` or in `other` but not in both.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashSet;
    ///
    /// let a: HashSet<i32> = [1, 2].into_iter().collect();
    /// let b: HashSet<i32> = [2, 3].into_iter().collect();
    ///
    /// let mut sym_diff: Vec<_> = a.symmetric_difference(&b).copied().collect();
    /// sym_diff.sort();
    /// assert_eq!(sym_diff, [1, 3]);
    /// ```
    pub fn symmetric_difference<'a>(&'a self, other: &'a Self) -> SymmetricDifference<'a, T, S, I> {
        SymmetricDifference {
            iter: self.difference(other).chain(other.difference(self)),
        }
    }

    /// Returns the raw table backing this set.
    #[cfg(any(test, feature = "stats"))]
    pub fn raw_table(&self) -> &RobinHoodTable<T, I> {
        &self.table
    }
}

impl<T, S, I> Default for HashSet<T, S, I>
where
    S: Default,
    I: BucketIndex,
{
    fn default() -> Self {
        Self::with_config(0, S::default(), None)
    }
}

impl<T, S, I> FromIterator<T> for HashSet<T, S, I>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
    I: BucketIndex,
{
    fn from_iter<It: IntoIterator<Item = T>>(iter: It) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<T, S, I> Extend<T> for HashSet<T, S, I>
where
    T: Hash + Eq,
    S: BuildHasher,
    I: BucketIndex,
{
    fn extend<It: IntoIterator<Item = T>>(&mut self, iter: It) {
        let iter = iter.into_iter();
        let hint = if self.is_empty() {
            iter.size_hint().0
        } else {
            iter.size_hint().0.div_ceil(2)
        };
        // An unreachable hint leaves growth to the individual inserts.
        self.table.try_reserve(hint).ok();
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T, S, I> Extend<&'a T> for HashSet<T, S, I>
where
    T: Hash + Eq + Copy + 'a,
    S: BuildHasher,
    I: BucketIndex,
{
    fn extend<It: IntoIterator<Item = &'a T>>(&mut self, iter: It) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, S, I: BucketIndex> IntoIterator for HashSet<T, S, I> {
    type Item = T;
    type IntoIter = IntoIter<T, I>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, S, I: BucketIndex> IntoIterator for &'a HashSet<T, S, I> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, I>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the values of a `HashSet`.
pub struct Iter<'a, T, I = usize> {
    inner: crate::hash_table::Iter<'a, T, I>,
}

impl<T, I> Clone for Iter<'_, T, I> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T, I> Iterator for Iter<'a, T, I> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, I> ExactSizeIterator for Iter<'_, T, I> {}

impl<T, I> FusedIterator for Iter<'_, T, I> {}

/// A draining iterator over the values of a `HashSet`.
pub struct Drain<'a, T, I = usize> {
    inner: crate::hash_table::Drain<'a, T, I>,
}

impl<T, I> Iterator for Drain<'_, T, I> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, I> ExactSizeIterator for Drain<'_, T, I> {}

/// An owning iterator over the values of a `HashSet`.
pub struct IntoIter<T, I = usize> {
    inner: crate::hash_table::IntoIter<T, I>,
}

impl<T, I> Iterator for IntoIter<T, I> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, I> ExactSizeIterator for IntoIter<T, I> {}

/// An iterator over the union of two sets.
pub struct Union<'a, T, S, I = usize> {
    iter: core::iter::Chain<Iter<'a, T, I>, Difference<'a, T, S, I>>,
}

impl<'a, T, S, I> Iterator for Union<'a, T, S, I>
where
    T: Hash + Eq,
    S: BuildHasher,
    I: BucketIndex,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

/// An iterator over the intersection of two sets.
pub struct Intersection<'a, T, S, I = usize> {
    iter: Iter<'a, T, I>,
    other: &'a HashSet<T, S, I>,
}

impl<'a, T, S, I> Iterator for Intersection<'a, T, S, I>
where
    T: Hash + Eq,
    S: BuildHasher,
    I: BucketIndex,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if self.other.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the difference of two sets.
pub struct Difference<'a, T, S, I = usize> {
    iter: Iter<'a, T, I>,
    other: &'a HashSet<T, S, I>,
}

impl<'a, T, S, I> Iterator for Difference<'a, T, S, I>
where
    T: Hash + Eq,
    S: BuildHasher,
    I: BucketIndex,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if !self.other.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the symmetric difference of two sets.
pub struct SymmetricDifference<'a, T, S, I = usize> {
    iter: core::iter::Chain<Difference<'a, T, S, I>, Difference<'a, T, S, I>>,
}

impl<'a, T, S, I> Iterator for SymmetricDifference<'a, T, S, I>
where
    T: Hash + Eq,
    S: BuildHasher,
    I: BucketIndex,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}
