//! Insertion-ordered multimap.

/// A map from keys to lists of values.
///
/// Keys keep the order in which they were first inserted; values keep the
/// order in which they were put under their key, duplicates included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMultimap<K, V> {
    entries: Vec<(K, Vec<V>)>,
}

impl<K, V> Default for ListMultimap<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: PartialEq, V> ListMultimap<K, V> {
    /// Create an empty multimap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` under `key`.
    pub fn put(&mut self, key: K, value: V) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Values stored under `key`, in insertion order.
    #[must_use]
    pub fn get(&self, key: &K) -> &[V] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or_default()
    }

    /// Keys in first-insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Iterate over `(key, values)` groups.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Total number of values across all keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, v)| v.len()).sum()
    }

    /// Whether no value has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
