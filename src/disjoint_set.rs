/// Union-find over the cell indices `0..n` with path compression and union by rank.
///
/// There is no removal. `find` always answers with a root, a cell that is its own parent.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u32>,
    sets_count: usize,
}

impl DisjointSet {
    /// `n` singleton sets.
    pub fn new(n: usize) -> DisjointSet {
        DisjointSet {
            parent: (0..n).collect(),
            rank: vec![0; n],
            sets_count: n,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Number of disjoint sets left.
    #[inline]
    pub fn sets_count(&self) -> usize {
        self.sets_count
    }

    /// Representative of the set holding `x`. Every node on the way up is re-pointed directly at
    /// the root.
    ///
    /// Panics if `x` is out of range.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Merge the sets holding `x` and `y`. On equal rank the root of `y` goes under the root of
    /// `x`. Returns false if they were already one set.
    pub fn union_sets(&mut self, x: usize, y: usize) -> bool {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return false;
        }

        if self.rank[root_x] < self.rank[root_y] {
            self.parent[root_x] = root_y;
        } else if self.rank[root_x] > self.rank[root_y] {
            self.parent[root_y] = root_x;
        } else {
            self.parent[root_y] = root_x;
            self.rank[root_x] += 1;
        }
        self.sets_count -= 1;
        true
    }

    pub fn same_set(&mut self, x: usize, y: usize) -> bool {
        self.find(x) == self.find(y)
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::{quickcheck, TestResult};

    use super::*;

    #[test]
    fn starts_as_singletons() {
        let mut sets = DisjointSet::new(5);
        assert_eq!(sets.len(), 5);
        assert_eq!(sets.sets_count(), 5);
        for x in 0..5 {
            assert_eq!(sets.find(x), x);
        }
        assert!(DisjointSet::new(0).is_empty());
    }

    #[test]
    fn equal_rank_ties_attach_second_to_first() {
        let mut sets = DisjointSet::new(4);
        assert!(sets.union_sets(2, 3));
        assert_eq!(sets.find(3), 2);

        assert!(sets.union_sets(0, 1));
        // both roots have rank 1 now
        assert!(sets.union_sets(0, 2));
        for x in 0..4 {
            assert_eq!(sets.find(x), 0);
        }
        assert_eq!(sets.sets_count(), 1);
    }

    #[test]
    fn lower_rank_goes_under_higher_rank() {
        let mut sets = DisjointSet::new(3);
        sets.union_sets(1, 2);
        // 0 is a rank 0 singleton, 1 a rank 1 root
        sets.union_sets(0, 1);
        assert_eq!(sets.find(0), 1);
    }

    #[test]
    fn repeated_union_is_a_no_op() {
        let mut sets = DisjointSet::new(3);
        assert!(sets.union_sets(0, 1));
        assert!(!sets.union_sets(1, 0));
        assert_eq!(sets.sets_count(), 2);
        assert!(sets.same_set(0, 1));
        assert!(!sets.same_set(0, 2));
    }

    #[test]
    fn long_chains_are_compressed() {
        let n = 10_000;
        let mut sets = DisjointSet::new(n);
        for x in 1..n {
            sets.union_sets(x - 1, x);
        }
        let root = sets.find(n - 1);
        for x in 0..n {
            assert_eq!(sets.find(x), root);
        }
    }

    #[test]
    fn find_returns_a_root_and_unions_agree_with_naive_labels() {
        fn prop(n: u8, unions: Vec<(u8, u8)>) -> TestResult {
            let n = n as usize;
            if n == 0 {
                return TestResult::discard();
            }
            let mut sets = DisjointSet::new(n);
            let mut labels = (0..n).collect::<Vec<_>>();

            for (a, b) in unions {
                let (a, b) = (a as usize % n, b as usize % n);
                sets.union_sets(a, b);
                let (from, to) = (labels[b], labels[a]);
                for label in labels.iter_mut() {
                    if *label == from {
                        *label = to;
                    }
                }
            }

            for x in 0..n {
                let root = sets.find(x);
                if sets.find(root) != root {
                    return TestResult::failed();
                }
                for y in 0..n {
                    if sets.same_set(x, y) != (labels[x] == labels[y]) {
                        return TestResult::failed();
                    }
                }
            }
            let mut distinct = labels.clone();
            distinct.sort();
            distinct.dedup();
            TestResult::from_bool(distinct.len() == sets.sets_count())
        }
        quickcheck(prop as fn(u8, Vec<(u8, u8)>) -> TestResult);
    }
}
