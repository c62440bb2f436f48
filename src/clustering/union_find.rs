// src/clustering/union_find.rs - disjoint-set arena over record indices

/// Union-find over a fixed arena of record indices.
///
/// `union` always attaches the higher-index root under the lower-index
/// root, so cluster representatives are identical across runs regardless of
/// the order unions arrive in a connected component.
#[derive(Debug)]
pub struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    pub fn new(size: usize) -> Self {
        UnionFind {
            parent: (0..size).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of `x`'s set, with full path compression.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = x;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Merges the sets containing `a` and `b`.
    pub fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return;
        }
        if root_a < root_b {
            self.parent[root_b] = root_a;
        } else {
            self.parent[root_a] = root_b;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singletons() {
        let mut uf = UnionFind::new(3);
        assert_eq!(uf.find(0), 0);
        assert_eq!(uf.find(1), 1);
        assert_eq!(uf.find(2), 2);
    }

    #[test]
    fn test_transitive_union() {
        let mut uf = UnionFind::new(4);
        uf.union(0, 1);
        uf.union(1, 2);
        assert_eq!(uf.find(0), uf.find(2));
        assert_ne!(uf.find(0), uf.find(3));
    }

    #[test]
    fn test_lower_index_root_wins() {
        let mut uf = UnionFind::new(5);
        uf.union(4, 2);
        assert_eq!(uf.find(4), 2);
        uf.union(2, 0);
        assert_eq!(uf.find(4), 0);
        // Union order does not change the representative
        let mut other = UnionFind::new(5);
        other.union(2, 0);
        other.union(4, 2);
        assert_eq!(other.find(4), 0);
    }

    #[test]
    fn test_union_is_idempotent() {
        let mut uf = UnionFind::new(2);
        uf.union(0, 1);
        uf.union(0, 1);
        uf.union(1, 0);
        assert_eq!(uf.find(1), 0);
    }
}
