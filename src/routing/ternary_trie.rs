use std::cmp::Ordering;

/// Node capacity of a freshly created trie.
pub const DEFAULT_CAPACITY: usize = 128;

/// A node holds one key byte. `lo`/`hi` lead to siblings with a smaller or
/// larger byte at the same depth, `eq` to the next byte of the key.
#[derive(Debug, Clone)]
struct Node<V> {
    byte: u8,
    lo: Option<usize>,
    eq: Option<usize>,
    hi: Option<usize>,
    value: Option<V>,
}

impl<V> Node<V> {
    fn new(byte: u8) -> Self {
        Self {
            byte,
            lo: None,
            eq: None,
            hi: None,
            value: None,
        }
    }
}

/// Where a newly allocated node gets linked in.
#[derive(Debug, Clone, Copy)]
enum Link {
    Root,
    Lo(usize),
    Eq(usize),
    Hi(usize),
}

/// Array-backed ternary search trie with a fixed node capacity.
///
/// Used as a literal-key index: exact lookup plus longest-prefix lookup over
/// a sub-range of a query string. Keys are compared byte-wise.
///
/// The trie never grows on its own. `put` reports `false` when the key does
/// not fit, and the owner replaces the trie with [`TernaryTrie::grown`].
/// Removed keys keep their nodes until the next `clear` or `grown`.
#[derive(Debug, Clone)]
pub struct TernaryTrie<V> {
    /// Node 0 is the root once anything has been inserted.
    nodes: Vec<Node<V>>,
    /// The empty key needs no node.
    empty_key: Option<V>,
    capacity: usize,
    len: usize,
}

impl<V> Default for TernaryTrie<V> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl<V> TernaryTrie<V> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::new(),
            empty_key: None,
            capacity,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated nodes, never more than `capacity`.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert or replace the value for `key`.
    ///
    /// Returns `false` without modifying the trie if the nodes required by
    /// `key` exceed the remaining capacity.
    pub fn put(&mut self, key: &str, value: V) -> bool {
        self.put_bytes(key.as_bytes(), value)
    }

    fn put_bytes(&mut self, key: &[u8], value: V) -> bool {
        if key.is_empty() {
            if self.empty_key.replace(value).is_none() {
                self.len += 1;
            }
            return true;
        }

        if self.nodes.len() + self.nodes_needed(key) > self.capacity {
            return false;
        }

        let mut link = Link::Root;
        let mut i = 0;
        loop {
            let idx = match self.follow(link) {
                Some(idx) => idx,
                None => self.attach(link, key[i]),
            };
            let node = &mut self.nodes[idx];
            match key[i].cmp(&node.byte) {
                Ordering::Less => link = Link::Lo(idx),
                Ordering::Greater => link = Link::Hi(idx),
                Ordering::Equal => {
                    i += 1;
                    if i == key.len() {
                        if node.value.replace(value).is_none() {
                            self.len += 1;
                        }
                        return true;
                    }
                    link = Link::Eq(idx);
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.get_range(key, 0, key.len())
    }

    /// Exact lookup of `query[offset..offset + len]`.
    pub fn get_range(&self, query: &str, offset: usize, len: usize) -> Option<&V> {
        let key = query.as_bytes().get(offset..offset.checked_add(len)?)?;
        if key.is_empty() {
            return self.empty_key.as_ref();
        }
        self.find(key).and_then(|idx| self.nodes[idx].value.as_ref())
    }

    /// Value of the longest stored key that is a prefix of
    /// `query[offset..offset + len]`.
    pub fn get_best(&self, query: &str, offset: usize, len: usize) -> Option<&V> {
        let key = query.as_bytes().get(offset..offset.checked_add(len)?)?;
        let mut best = self.empty_key.as_ref();
        let mut cur = self.root();
        let mut i = 0;
        while i < key.len() {
            let Some(idx) = cur else { break };
            let node = &self.nodes[idx];
            match key[i].cmp(&node.byte) {
                Ordering::Less => cur = node.lo,
                Ordering::Greater => cur = node.hi,
                Ordering::Equal => {
                    i += 1;
                    if let Some(value) = node.value.as_ref() {
                        best = Some(value);
                    }
                    cur = node.eq;
                }
            }
        }
        best
    }

    /// Remove `key`, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let removed = if key.is_empty() {
            self.empty_key.take()
        } else {
            let idx = self.find(key.as_bytes())?;
            self.nodes[idx].value.take()
        };
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.empty_key = None;
        self.len = 0;
    }

    /// Copy of this trie with its capacity multiplied by `factor`
    /// (always at least one node larger). Only live keys are copied, so
    /// nodes left behind by `remove` are reclaimed.
    pub fn grown(&self, factor: f64) -> Self
    where
        V: Clone,
    {
        let scaled = (self.capacity as f64 * factor).ceil() as usize;
        let mut grown = Self::with_capacity(scaled.max(self.capacity + 1));
        if let Some(value) = self.empty_key.as_ref() {
            grown.put_bytes(&[], value.clone());
        }
        for (key, value) in self.entries() {
            // Live keys never need more nodes than the source trie holds.
            let fitted = grown.put_bytes(&key, value.clone());
            debug_assert!(fitted);
        }
        grown
    }

    /// Non-empty keys with their values.
    fn entries(&self) -> Vec<(Vec<u8>, &V)> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<(usize, Vec<u8>)> = Vec::new();
        if let Some(root) = self.root() {
            stack.push((root, Vec::new()));
        }
        while let Some((idx, prefix)) = stack.pop() {
            let node = &self.nodes[idx];
            let mut key = prefix.clone();
            key.push(node.byte);
            if let Some(hi) = node.hi {
                stack.push((hi, prefix.clone()));
            }
            if let Some(eq) = node.eq {
                stack.push((eq, key.clone()));
            }
            if let Some(value) = node.value.as_ref() {
                out.push((key, value));
            }
            if let Some(lo) = node.lo {
                stack.push((lo, prefix));
            }
        }
        out
    }

    fn root(&self) -> Option<usize> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    fn follow(&self, link: Link) -> Option<usize> {
        match link {
            Link::Root => self.root(),
            Link::Lo(idx) => self.nodes[idx].lo,
            Link::Eq(idx) => self.nodes[idx].eq,
            Link::Hi(idx) => self.nodes[idx].hi,
        }
    }

    fn attach(&mut self, link: Link, byte: u8) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(Node::new(byte));
        match link {
            Link::Root => {}
            Link::Lo(parent) => self.nodes[parent].lo = Some(idx),
            Link::Eq(parent) => self.nodes[parent].eq = Some(idx),
            Link::Hi(parent) => self.nodes[parent].hi = Some(idx),
        }
        idx
    }

    /// Node holding the last byte of a non-empty `key`.
    fn find(&self, key: &[u8]) -> Option<usize> {
        let mut cur = self.root();
        let mut i = 0;
        while let Some(idx) = cur {
            let node = &self.nodes[idx];
            match key[i].cmp(&node.byte) {
                Ordering::Less => cur = node.lo,
                Ordering::Greater => cur = node.hi,
                Ordering::Equal => {
                    i += 1;
                    if i == key.len() {
                        return Some(idx);
                    }
                    cur = node.eq;
                }
            }
        }
        None
    }

    /// How many nodes `put` would allocate for a non-empty `key`.
    fn nodes_needed(&self, key: &[u8]) -> usize {
        let mut cur = self.root();
        let mut i = 0;
        while let Some(idx) = cur {
            let node = &self.nodes[idx];
            match key[i].cmp(&node.byte) {
                Ordering::Less => cur = node.lo,
                Ordering::Greater => cur = node.hi,
                Ordering::Equal => {
                    i += 1;
                    if i == key.len() {
                        return 0;
                    }
                    cur = node.eq;
                }
            }
        }
        key.len() - i
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let mut trie = TernaryTrie::default();
        assert!(trie.put("/login", 1));
        assert!(trie.put("/logout", 2));
        assert!(trie.put("/api", 3));

        assert_eq!(trie.get("/login"), Some(&1));
        assert_eq!(trie.get("/logout"), Some(&2));
        assert_eq!(trie.get("/api"), Some(&3));
        assert_eq!(trie.get("/log"), None);
        assert_eq!(trie.get("/api/x"), None);
        assert_eq!(trie.len(), 3);
    }

    #[test]
    fn test_put_replaces_value() {
        let mut trie = TernaryTrie::default();
        assert!(trie.put("/a", 1));
        assert!(trie.put("/a", 2));
        assert_eq!(trie.get("/a"), Some(&2));
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn test_get_best_longest_prefix_wins() {
        let mut trie = TernaryTrie::default();
        trie.put("/api", "api");
        trie.put("/api/v2", "v2");
        trie.put("/b", "b");

        let q = "/api/v2/users";
        assert_eq!(trie.get_best(q, 0, q.len()), Some(&"v2"));
        let q = "/api/v1/users";
        assert_eq!(trie.get_best(q, 0, q.len()), Some(&"api"));
        let q = "/c";
        assert_eq!(trie.get_best(q, 0, q.len()), None);
    }

    #[test]
    fn test_get_best_respects_range() {
        let mut trie = TernaryTrie::default();
        trie.put("/api", "api");
        trie.put("/api/v2", "v2");

        // Only the first 6 bytes ("/api/v") are considered.
        let q = "/api/v2/users";
        assert_eq!(trie.get_best(q, 0, 6), Some(&"api"));
        assert_eq!(trie.get_best(q, 0, 3), None);
        // Out-of-range queries find nothing.
        assert_eq!(trie.get_best(q, 0, q.len() + 1), None);
    }

    #[test]
    fn test_empty_key_is_fallback_for_best() {
        let mut trie = TernaryTrie::with_capacity(0);
        assert!(trie.put("", "all"));
        assert_eq!(trie.node_count(), 0);
        assert_eq!(trie.get_best("/x", 0, 2), Some(&"all"));
        assert_eq!(trie.get(""), Some(&"all"));
    }

    #[test]
    fn test_get_range_exact() {
        let mut trie = TernaryTrie::default();
        trie.put("json", 1);
        let path = "/data/x.json";
        let dot = path.find('.').unwrap();
        assert_eq!(trie.get_range(path, dot + 1, path.len() - dot - 1), Some(&1));
        assert_eq!(trie.get_range(path, dot, path.len() - dot), None);
    }

    #[test]
    fn test_capacity_exhaustion_leaves_trie_untouched() {
        let mut trie = TernaryTrie::with_capacity(4);
        assert!(trie.put("abc", 1));
        assert!(trie.put("abd", 2));
        assert_eq!(trie.node_count(), 4);

        assert!(!trie.put("xy", 3));
        assert_eq!(trie.node_count(), 4);
        assert_eq!(trie.len(), 2);
        assert_eq!(trie.get("xy"), None);

        // Existing keys need no new nodes.
        assert!(trie.put("abc", 10));
        assert_eq!(trie.get("abc"), Some(&10));
    }

    #[test]
    fn test_grown_copy_keeps_contents() {
        let mut trie = TernaryTrie::with_capacity(4);
        trie.put("abc", 1);
        trie.put("abd", 2);
        assert!(!trie.put("xy", 3));

        let mut bigger = trie.grown(1.5);
        assert_eq!(bigger.capacity(), 6);
        assert!(bigger.put("xy", 3));
        assert_eq!(bigger.get("abc"), Some(&1));
        assert_eq!(bigger.get("abd"), Some(&2));
        assert_eq!(bigger.get("xy"), Some(&3));
        assert_eq!(bigger.len(), 3);
    }

    #[test]
    fn test_grown_drops_removed_keys() {
        let mut trie = TernaryTrie::with_capacity(8);
        trie.put("", 0);
        trie.put("/a/b", 1);
        trie.put("/c", 2);
        trie.put("/ab", 3);
        assert_eq!(trie.remove("/a/b"), Some(1));
        assert_eq!(trie.node_count(), 6);

        let bigger = trie.grown(1.5);
        assert_eq!(bigger.capacity(), 12);
        // "/", "c", "a", "b" remain.
        assert_eq!(bigger.node_count(), 4);
        assert_eq!(bigger.len(), 3);
        assert_eq!(bigger.get(""), Some(&0));
        assert_eq!(bigger.get("/a/b"), None);
        assert_eq!(bigger.get("/c"), Some(&2));
        assert_eq!(bigger.get("/ab"), Some(&3));
        let q = "/a/bc";
        assert_eq!(bigger.get_best(q, 0, q.len()), Some(&0));
    }

    #[test]
    fn test_insert_remove_churn_reclaims_nodes_on_growth() {
        let mut trie = TernaryTrie::with_capacity(8);
        let mut growths = 0;
        for i in 0..200 {
            let key = format!("/k{i}");
            if !trie.put(&key, i) {
                trie = trie.grown(1.5);
                growths += 1;
                assert!(trie.put(&key, i));
                // Only the key just inserted is live.
                assert_eq!(trie.node_count(), key.len());
            }
            assert_eq!(trie.remove(&key), Some(i));
        }
        assert!(growths > 0);
        assert!(trie.is_empty());
    }

    #[test]
    fn test_grown_always_adds_capacity() {
        let trie: TernaryTrie<u32> = TernaryTrie::with_capacity(1);
        assert_eq!(trie.grown(1.0).capacity(), 2);
        let trie: TernaryTrie<u32> = TernaryTrie::with_capacity(0);
        assert_eq!(trie.grown(1.5).capacity(), 1);
    }

    #[test]
    fn test_remove() {
        let mut trie = TernaryTrie::default();
        trie.put("/api", 1);
        trie.put("/api/v2", 2);

        assert_eq!(trie.remove("/api/v2"), Some(2));
        assert_eq!(trie.remove("/api/v2"), None);
        assert_eq!(trie.remove("/nope"), None);
        assert_eq!(trie.len(), 1);

        let q = "/api/v2/x";
        assert_eq!(trie.get_best(q, 0, q.len()), Some(&1));
    }

    #[test]
    fn test_clear() {
        let mut trie = TernaryTrie::with_capacity(8);
        trie.put("/a", 1);
        trie.put("", 0);
        trie.clear();
        assert!(trie.is_empty());
        assert_eq!(trie.node_count(), 0);
        assert_eq!(trie.get("/a"), None);
        assert_eq!(trie.get(""), None);
        assert_eq!(trie.capacity(), 8);
    }
}
