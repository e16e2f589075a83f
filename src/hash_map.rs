use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;
use core::ops::Index;

use crate::DefaultHashBuilder;
use crate::error::TryReserveError;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::RobinHoodTable;
use crate::index::BucketIndex;

/// A hash map implemented using the Robin Hood [`RobinHoodTable`] as the
/// underlying storage.
///
/// `HashMap<K, V, S, I>` stores key-value pairs where keys implement
/// `Hash + Eq` and uses a configurable hasher builder `S` to hash keys. The
/// index type `I` bounds the number of buckets and sets the per-bucket
/// displacement width; a map indexed by `u8` stops growing at 255 buckets.
///
/// # Performance Characteristics
///
/// - **Memory**: the size of `(K, V)`, a u64 for the hash and an `I` for the
///   displacement per bucket, padded to alignment
/// - **Lookup**: bounded by the longest probe chain, with early exit on the
///   first resident closer to home than the probe
#[derive(Clone)]
pub struct HashMap<K, V, S = DefaultHashBuilder, I = usize> {
    table: RobinHoodTable<(K, V), I>,
    hash_builder: S,
}

impl<K, V, S, I> Debug for HashMap<K, V, S, I>
where
    K: Debug,
    V: Debug,
    I: BucketIndex,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> HashMap<K, V, DefaultHashBuilder, usize> {
    /// Creates an empty map using the default hasher builder. No memory is
    /// allocated until the first insertion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let map: HashMap<i32, String> = HashMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 0);
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates a map able to hold at least `capacity` entries without
    /// growing, using the default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let map: HashMap<i32, String> = HashMap::with_capacity(100);
    /// assert!(map.capacity() >= 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }

    /// Creates an empty map using the default hasher builder that calls
    /// `release` on every entry leaving the map.
    ///
    /// See [`RobinHoodTable::with_release_hook`] for when the hook runs.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map: HashMap<u32, Vec<u8>> =
    ///     HashMap::with_release_hook(|(_, buf)| buf.fill(0));
    /// map.insert(1, vec![1, 2, 3]);
    /// assert_eq!(map.remove(&1), Some(vec![0, 0, 0]));
    /// ```
    pub fn with_release_hook(release: fn(&mut (K, V))) -> Self {
        Self::with_hasher_and_release_hook(DefaultHashBuilder::default(), release)
    }
}

impl<K, V, S> HashMap<K, V, S, usize> {
    /// Creates a new hash map with the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use robin_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> = HashMap::with_hasher(SimpleHasher);
    /// assert!(map.is_empty());
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_config(0, hash_builder, None)
    }

    /// Creates a new hash map with the given hasher builder that calls
    /// `release` on every entry leaving the map.
    pub fn with_hasher_and_release_hook(hash_builder: S, release: fn(&mut (K, V))) -> Self {
        Self::with_config(0, hash_builder, Some(release))
    }

    /// Creates a new hash map with the specified capacity and hasher builder.
    ///
    /// The actual capacity may be larger than requested since bucket counts
    /// are taken from a ladder of primes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use robin_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> = HashMap::with_capacity_and_hasher(100, SimpleHasher);
    /// assert!(map.capacity() >= 100);
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self::with_config(capacity, hash_builder, None)
    }
}

impl<K, V, S, I> HashMap<K, V, S, I>
where
    I: BucketIndex,
{
    /// Creates a map with any index type, reserving room for `capacity`
    /// entries and optionally installing a release hook.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` entries cannot fit under `I::MAX_CAPACITY`
    /// buckets.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::DefaultHashBuilder;
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map: HashMap<u8, char, DefaultHashBuilder, u8> =
    ///     HashMap::with_config(16, DefaultHashBuilder::default(), None);
    /// map.insert(1, 'a');
    /// assert_eq!(map.get(&1), Some(&'a'));
    /// ```
    pub fn with_config(
        capacity: usize,
        hash_builder: S,
        release: Option<fn(&mut (K, V))>,
    ) -> Self {
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

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of elements the map can hold without growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// assert_eq!(map.capacity(), 0);
    /// map.insert(1, "a");
    /// assert!(map.capacity() >= 8);
    /// ```
    pub fn capacity(&self) -> usize {
        self.table.max_load()
    }

    /// Clears the map, removing all key-value pairs. Keeps the allocated
    /// memory for reuse.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// let capacity = map.capacity();
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), capacity);
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Removes all key-value pairs and frees the bucket array.
    ///
    /// The map stays usable and allocates again on the next insertion.
    pub fn reset(&mut self) {
        self.table.reset();
    }

    /// Returns an iterator over the key-value pairs of the map, in arbitrary
    /// order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// let mut pairs: Vec<_> = map.iter().collect();
    /// pairs.sort();
    /// assert_eq!(pairs, [(&1, &"a"), (&2, &"b")]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V, I> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the key-value pairs of the map with mutable
    /// references to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V, I> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys of the map, in arbitrary order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// let mut keys: Vec<_> = map.keys().copied().collect();
    /// keys.sort();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V, I> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map, in arbitrary order.
    pub fn values(&self) -> Values<'_, K, V, I> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values of the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert("a", 1);
    /// map.insert("b", 2);
    /// for v in map.values_mut() {
    ///     *v *= 10;
    /// }
    /// assert_eq!(map["a"], 10);
    /// ```
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V, I> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Clears the map, returning all key-value pairs as an iterator. Keeps
    /// the allocated memory for reuse.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// let mut drained: Vec<_> = map.drain().collect();
    /// drained.sort();
    /// assert_eq!(drained, [(1, "a"), (2, "b")]);
    /// assert!(map.is_empty());
    /// ```
    pub fn drain(&mut self) -> Drain<'_, K, V, I> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Retains only the entries for which `f` returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map: HashMap<i32, i32> = (0..8).map(|x| (x, x * 10)).collect();
    /// map.retain(|&k, _| k % 2 == 0);
    /// assert_eq!(map.len(), 4);
    /// ```
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.table.retain(|(k, v)| f(k, v));
    }

    /// Returns the raw table backing this map.
    #[cfg(any(test, feature = "stats"))]
    pub fn raw_table(&self) -> &RobinHoodTable<(K, V), I> {
        &self.table
    }
}

impl<K, V, S, I> HashMap<K, V, S, I>
where
    K: Hash + Eq,
    S: BuildHasher,
    I: BucketIndex,
{
    /// Reserves capacity for at least `additional` more elements.
    ///
    /// # Panics
    ///
    /// Panics if the new allocation size overflows.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map: HashMap<i32, i32> = HashMap::new();
    /// map.reserve(10);
    /// assert!(map.capacity() >= 10);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Tries to reserve capacity for at least `additional` more elements.
    ///
    /// # Errors
    ///
    /// Returns [`TryReserveError`] if the capacity overflows or the allocator
    /// reports a failure. The map is unchanged on error.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.table.try_reserve(additional)
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, `None` is returned. If the
    /// map did have this key present, the value is updated and the old value
    /// is returned; the key itself is not updated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(mut entry) => {
                let old_value = core::mem::replace(&mut entry.get_mut().1, value);
                Some(old_value)
            }
            TableEntry::Vacant(entry) => {
                entry.insert((key, value));
                None
            }
        }
    }

    /// Fallible version of [`insert`](HashMap::insert).
    ///
    /// # Errors
    ///
    /// Returns [`TryReserveError`] when placing a new key needs a larger
    /// bucket array that cannot be allocated. The map is unchanged and the
    /// pair is dropped on error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// assert_eq!(map.try_insert(1, "a"), Ok(None));
    /// assert_eq!(map.try_insert(1, "b"), Ok(Some("a")));
    /// ```
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>, TryReserveError> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(mut entry) => {
                Ok(Some(core::mem::replace(&mut entry.get_mut().1, value)))
            }
            TableEntry::Vacant(entry) => entry.try_insert((key, value)).map(|_| None),
        }
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the key-value pair corresponding to the supplied key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert("apple".to_string(), 3);
    /// assert_eq!(map.get_key_value("apple"), Some((&"apple".to_string(), &3)));
    /// ```
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find(hash, |(k, _)| k.borrow() == key)
            .map(|(k, v)| (k, v))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// if let Some(x) = map.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map.get(&1), Some(&"b"));
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find_mut(hash, |(k, _)| k.borrow() == key)
            .map(|(_, v)| v)
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert!(map.contains_key(&1));
    /// assert!(!map.contains_key(&2));
    /// ```
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).is_some()
    }

    /// Removes a key from the map, returning the value at the key if the key
    /// was previously in the map.
    ///
    /// The release hook, if any, runs on the entry before it is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was previously in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove_entry(&1), Some((1, "a")));
    /// assert_eq!(map.remove_entry(&1), None);
    /// ```
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.remove(hash, |(k, _)| k.borrow() == key)
    }

    /// Gets the given key's corresponding entry in the map for in-place
    /// manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::HashMap;
    /// #
    /// let mut letters = HashMap::new();
    /// for ch in "a short treatise on fungi".chars() {
    ///     *letters.entry(ch).or_insert(0) += 1;
    /// }
    /// assert_eq!(letters[&'s'], 2);
    /// assert_eq!(letters[&'t'], 3);
    /// assert_eq!(letters.get(&'y'), None);
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, I> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        }
    }
}

impl<K, V, S, I> Default for HashMap<K, V, S, I>
where
    S: Default,
    I: BucketIndex,
{
    fn default() -> Self {
        Self::with_config(0, S::default(), None)
    }
}

impl<K, V, S, I> PartialEq for HashMap<K, V, S, I>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
    I: BucketIndex,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|ov| v == ov))
    }
}

impl<K, V, S, I> Eq for HashMap<K, V, S, I>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
    I: BucketIndex,
{
}

impl<K, Q, V, S, I> Index<&Q> for HashMap<K, V, S, I>
where
    K: Hash + Eq + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
    I: BucketIndex,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not found in HashMap"),
        }
    }
}

impl<K, V, S, I> FromIterator<(K, V)> for HashMap<K, V, S, I>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
    I: BucketIndex,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, S, I> Extend<(K, V)> for HashMap<K, V, S, I>
where
    K: Hash + Eq,
    S: BuildHasher,
    I: BucketIndex,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        let iter = iter.into_iter();
        // Some of the incoming keys may already be present.
        let hint = if self.is_empty() {
            iter.size_hint().0
        } else {
            iter.size_hint().0.div_ceil(2)
        };
        // An unreachable hint leaves growth to the individual inserts.
        self.table.try_reserve(hint).ok();
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V, S, I> Extend<(&'a K, &'a V)> for HashMap<K, V, S, I>
where
    K: Hash + Eq + Copy,
    V: Copy,
    S: BuildHasher,
    I: BucketIndex,
{
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        self.extend(iter.into_iter().map(|(&k, &v)| (k, v)));
    }
}

impl<K, V, S, I: BucketIndex> IntoIterator for HashMap<K, V, S, I> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, I>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, V, S, I: BucketIndex> IntoIterator for &'a HashMap<K, V, S, I> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, I>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S, I: BucketIndex> IntoIterator for &'a mut HashMap<K, V, S, I> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V, I>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V, I = usize> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V, I>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V, I>),
}

impl<'a, K, V, I: BucketIndex> Entry<'a, K, V, I> {
    /// Inserts a default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Like [`or_insert_with`](Entry::or_insert_with), but the closure
    /// receives the entry's key.
    pub fn or_insert_with_key<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce(&K) -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let value = default(entry.key());
                entry.insert(value)
            }
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V, I> Entry<'a, K, V, I>
where
    V: Default,
    I: BucketIndex,
{
    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V, I = usize> {
    entry: crate::hash_table::VacantEntry<'a, (K, V), I>,
    key: K,
}

impl<'a, K, V, I: BucketIndex> VacantEntry<'a, K, V, I> {
    /// Gets a reference to the key that would be used when inserting a value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    ///
    /// # Panics
    ///
    /// Panics if the map is full at its index type's maximum capacity.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.entry.insert((self.key, value)).1
    }

    /// Fallible version of [`insert`](VacantEntry::insert).
    pub fn try_insert(self, value: V) -> Result<&'a mut V, TryReserveError> {
        self.entry
            .try_insert((self.key, value))
            .map(|(_, v)| v)
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V, I = usize> {
    entry: crate::hash_table::OccupiedEntry<'a, (K, V), I>,
}

impl<'a, K, V, I: BucketIndex> OccupiedEntry<'a, K, V, I> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.entry.get().0
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.entry.get().1
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().1
    }

    /// Inserts a value into the entry and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(&mut self.entry.get_mut().1, value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.entry.remove().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.entry.remove()
    }
}

/// An iterator over the key-value pairs of a `HashMap`.
pub struct Iter<'a, K, V, I = usize> {
    inner: crate::hash_table::Iter<'a, (K, V), I>,
}

impl<K, V, I> Clone for Iter<'_, K, V, I> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V, I> Iterator for Iter<'a, K, V, I> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, I> ExactSizeIterator for Iter<'_, K, V, I> {}

impl<K, V, I> FusedIterator for Iter<'_, K, V, I> {}

/// A mutable iterator over the key-value pairs of a `HashMap`.
pub struct IterMut<'a, K, V, I = usize> {
    inner: crate::hash_table::IterMut<'a, (K, V), I>,
}

impl<'a, K, V, I> Iterator for IterMut<'a, K, V, I> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, I> ExactSizeIterator for IterMut<'_, K, V, I> {}

impl<K, V, I> FusedIterator for IterMut<'_, K, V, I> {}

/// An iterator over the keys of a `HashMap`.
pub struct Keys<'a, K, V, I = usize> {
    inner: Iter<'a, K, V, I>,
}

impl<'a, K, V, I> Iterator for Keys<'a, K, V, I> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, I> ExactSizeIterator for Keys<'_, K, V, I> {}

/// An iterator over the values of a `HashMap`.
pub struct Values<'a, K, V, I = usize> {
    inner: Iter<'a, K, V, I>,
}

impl<'a, K, V, I> Iterator for Values<'a, K, V, I> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, I> ExactSizeIterator for Values<'_, K, V, I> {}

/// A mutable iterator over the values of a `HashMap`.
pub struct ValuesMut<'a, K, V, I = usize> {
    inner: IterMut<'a, K, V, I>,
}

impl<'a, K, V, I> Iterator for ValuesMut<'a, K, V, I> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, I> ExactSizeIterator for ValuesMut<'_, K, V, I> {}

/// A draining iterator over the key-value pairs of a `HashMap`.
pub struct Drain<'a, K, V, I = usize> {
    inner: crate::hash_table::Drain<'a, (K, V), I>,
}

impl<K, V, I> Iterator for Drain<'_, K, V, I> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, I> ExactSizeIterator for Drain<'_, K, V, I> {}

/// An owning iterator over the key-value pairs of a `HashMap`.
pub struct IntoIter<K, V, I = usize> {
    inner: crate::hash_table::IntoIter<(K, V), I>,
}

impl<K, V, I> Iterator for IntoIter<K, V, I> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, I> ExactSizeIterator for IntoIter<K, V, I> {}
