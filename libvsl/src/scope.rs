use std::borrow::Borrow;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Chained hash table with an optional parent for fallback lookups.
///
/// The bucket count is fixed at construction. Each bucket holds a chain of
/// entries; new entries go to the head of their chain, so when a key is
/// inserted twice into the same table `lookup_local` sees the most recent
/// value.
///
/// The parent is borrowed, never owned: a child table can only be built
/// while its parent is alive and must be dropped before it. Dropping a table
/// releases its buckets and chains, and whatever the values own. Tables used
/// purely for name resolution store plain handles, so dropping them never
/// touches the symbols those handles point to.
#[derive(Debug)]
pub struct ScopedTable<'p, K, V> {
    buckets: Vec<Vec<Entry<K, V>>>,
    len: usize,
    parent: Option<&'p ScopedTable<'p, K, V>>,
}

impl<'p, K, V> ScopedTable<'p, K, V>
    where K: Hash + Eq
{
    pub fn new(capacity: usize) -> Self {
        Self::with_parent(capacity, None)
    }

    pub fn with_parent(capacity: usize, parent: Option<&'p ScopedTable<'p, K, V>>) -> Self {
        let capacity = capacity.max(1);
        let mut buckets = Vec::with_capacity(capacity);
        buckets.resize_with(capacity, Vec::new);
        trace!("new table: {} buckets, parent: {}", capacity, parent.is_some());
        Self {
            buckets: buckets,
            len: 0,
            parent: parent,
        }
    }

    pub fn parent(&self) -> Option<&'p ScopedTable<'p, K, V>> {
        self.parent
    }

    /// Number of tables on the chain, counting this one.
    pub fn depth(&self) -> usize {
        1 + self.parent.map_or(0, |parent| parent.depth())
    }

    pub fn insert(&mut self, key: K, value: V) {
        let bucket = self.bucket_of(&key);
        // The tail of the vector is the head of the chain.
        self.buckets[bucket].push(Entry {
            key: key,
            value: value,
        });
        self.len += 1;
    }

    /// Searches this table only.
    pub fn lookup_local<Q>(&self, key: &Q) -> Option<&V>
        where K: Borrow<Q>,
              Q: Hash + Eq + ?Sized
    {
        self.buckets[self.bucket_of(key)]
            .iter()
            .rev()
            .find(|entry| entry.key.borrow() == key)
            .map(|entry| &entry.value)
    }

    pub fn lookup_local_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
        where K: Borrow<Q>,
              Q: Hash + Eq + ?Sized
    {
        let bucket = self.bucket_of(key);
        self.buckets[bucket]
            .iter_mut()
            .rev()
            .find(|entry| entry.key.borrow() == key)
            .map(|entry| &mut entry.value)
    }

    /// Searches this table, then each parent in turn.
    pub fn lookup_chain<Q>(&self, key: &Q) -> Option<&V>
        where K: Borrow<Q>,
              Q: Hash + Eq + ?Sized
    {
        match self.lookup_local(key) {
            Some(value) => Some(value),
            None => self.parent.and_then(|parent| parent.lookup_chain(key)),
        }
    }

    /// Every key stored in this table, in bucket order. The order carries no
    /// meaning beyond covering each entry exactly once.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries().map(|entry| &entry.key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries().map(|entry| &entry.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries().map(|entry| (&entry.key, &entry.value))
    }

    /// Consumes the table, handing every entry to the caller.
    pub fn into_entries(self) -> impl Iterator<Item = (K, V)> {
        self.buckets
            .into_iter()
            .flat_map(|chain| chain.into_iter())
            .map(|entry| (entry.key, entry.value))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn entries(&self) -> impl Iterator<Item = &Entry<K, V>> {
        self.buckets.iter().flat_map(|chain| chain.iter())
    }

    fn bucket_of<Q>(&self, key: &Q) -> usize
        where Q: Hash + ?Sized
    {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.buckets.len() as u64) as usize
    }
}

#[test]
fn test_lookup_local_misses_parent_entries() {
    let mut global = ScopedTable::new(4);
    global.insert("x".to_string(), 1);
    let local: ScopedTable<String, i32> = ScopedTable::with_parent(4, Some(&global));

    assert_eq!(local.lookup_local("x"), None);
    assert_eq!(local.lookup_chain("x"), Some(&1));
}

#[test]
fn test_lookup_chain_prefers_innermost() {
    let mut global = ScopedTable::new(4);
    global.insert("a".to_string(), "global");
    global.insert("b".to_string(), "global");
    let mut function = ScopedTable::with_parent(4, Some(&global));
    function.insert("a".to_string(), "function");
    let mut block = ScopedTable::with_parent(4, Some(&function));
    block.insert("b".to_string(), "block");

    assert_eq!(block.lookup_chain("a"), Some(&"function"));
    assert_eq!(block.lookup_chain("b"), Some(&"block"));
    assert_eq!(function.lookup_chain("b"), Some(&"global"));
    assert_eq!(block.lookup_chain("c"), None);
    assert_eq!(block.depth(), 3);
}

#[test]
fn test_single_bucket_chains_every_key() {
    let mut table = ScopedTable::new(1);
    for seq in 0..10usize {
        table.insert(seq, seq * 10);
    }

    assert_eq!(table.bucket_count(), 1);
    assert_eq!(table.len(), 10);
    for seq in 0..10usize {
        assert_eq!(table.lookup_local(&seq), Some(&(seq * 10)));
    }
}

#[test]
fn test_zero_capacity_still_usable() {
    let mut table = ScopedTable::new(0);
    table.insert(7usize, "seven");
    assert_eq!(table.bucket_count(), 1);
    assert_eq!(table.lookup_local(&7usize), Some(&"seven"));
}

#[test]
fn test_keys_cover_every_entry_once() {
    let mut table = ScopedTable::new(3);
    for seq in 0..20usize {
        table.insert(seq, ());
    }
    let mut keys: Vec<usize> = table.keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, (0..20).collect::<Vec<_>>());
}

#[test]
fn test_repeated_key_returns_latest_insert() {
    let mut table = ScopedTable::new(2);
    table.insert("n".to_string(), 1);
    table.insert("n".to_string(), 2);

    assert_eq!(table.lookup_local("n"), Some(&2));
    assert_eq!(table.len(), 2);
}

#[test]
fn test_lookup_local_mut_updates_in_place() {
    let mut table = ScopedTable::new(8);
    table.insert(3usize, vec![1]);
    table.lookup_local_mut(&3usize).unwrap().push(2);
    assert_eq!(table.lookup_local(&3usize), Some(&vec![1, 2]));
}

#[test]
fn test_into_entries_yields_owned_values() {
    let mut table = ScopedTable::new(4);
    table.insert(0usize, "zero".to_string());
    table.insert(1usize, "one".to_string());
    let mut entries: Vec<(usize, String)> = table.into_entries().collect();
    entries.sort();
    assert_eq!(entries, vec![(0, "zero".to_string()), (1, "one".to_string())]);
}
