use crate::{
    core::geo::Point,
    spatial::index::{SpatialIndex, SpatialItem},
};

/// Distance-based marker grouping.
///
/// Two points closer than `distance` (strictly) always end up in the same
/// group, and groups are the transitive closure of that relation, so points
/// further apart than `distance` still share a group when a chain of closer
/// neighbours links them.
#[derive(Debug, Clone)]
pub struct Clustering {
    distance: f64,
}

impl Clustering {
    pub fn new(distance: f64) -> Self {
        Self { distance }
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Groups `points` and returns the member indices of every group.
    ///
    /// Members are listed in input order and groups are ordered by their
    /// first member, so the output only depends on the input sequence.
    pub fn group(&self, points: &[Point]) -> Vec<Vec<usize>> {
        single_linkage(points, self.distance)
    }
}

/// See [`Clustering::group`].
pub fn single_linkage(points: &[Point], distance: f64) -> Vec<Vec<usize>> {
    if points.is_empty() {
        return Vec::new();
    }
    if distance.is_nan() || distance <= 0.0 {
        return (0..points.len()).map(|i| vec![i]).collect();
    }

    let index = SpatialIndex::bulk_load(
        points
            .iter()
            .enumerate()
            .map(|(i, p)| SpatialItem::new(i, *p, ()))
            .collect(),
    );

    let mut sets = DisjointSet::new(points.len());
    for (i, point) in points.iter().enumerate() {
        for neighbour in index.within(point, distance) {
            if neighbour.key > i {
                sets.union(i, neighbour.key);
            }
        }
    }

    // Walk in input order so the first member fixes the group's slot
    let mut slot_of_root = vec![usize::MAX; points.len()];
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for i in 0..points.len() {
        let root = sets.find(i);
        if slot_of_root[root] == usize::MAX {
            slot_of_root[root] = groups.len();
            groups.push(Vec::new());
        }
        groups[slot_of_root[root]].push(i);
    }
    groups
}

struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}
