use crate::core::{bounds::Bounds, geo::Point};

use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// A point item that can be indexed via an R-tree
#[derive(Debug, Clone)]
pub struct SpatialItem<T> {
    /// Caller-chosen key, used for deterministic tie-breaking
    pub key: usize,
    pub position: Point,
    pub data: T,
}

impl<T> SpatialItem<T> {
    pub fn new(key: usize, position: Point, data: T) -> Self {
        Self { key, position, data }
    }
}

impl<T> PartialEq for SpatialItem<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for SpatialItem<T> {}

// --- rstar integration -------------------------------------------------------------------------

impl<T> RTreeObject for SpatialItem<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.position.x, self.position.y])
    }
}

impl<T> PointDistance for SpatialItem<T> {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position.x - point[0];
        let dy = self.position.y - point[1];
        dx * dx + dy * dy
    }
}

/// R-tree over points in a single pixel space
pub struct SpatialIndex<T> {
    rtree: RTree<SpatialItem<T>>,
    bounds: Option<Bounds>,
}

impl<T> SpatialIndex<T> {
    pub fn new() -> Self {
        Self {
            rtree: RTree::new(),
            bounds: None,
        }
    }

    /// Builds the tree in one pass; faster than repeated inserts
    pub fn bulk_load(items: Vec<SpatialItem<T>>) -> Self {
        let mut bounds: Option<Bounds> = None;
        for item in &items {
            match bounds.as_mut() {
                Some(b) => b.extend(&item.position),
                None => bounds = Some(Bounds::new(item.position, item.position)),
            }
        }
        Self {
            rtree: RTree::bulk_load(items),
            bounds,
        }
    }

    pub fn insert(&mut self, item: SpatialItem<T>) {
        match self.bounds.as_mut() {
            Some(b) => b.extend(&item.position),
            None => self.bounds = Some(Bounds::new(item.position, item.position)),
        }
        self.rtree.insert(item);
    }

    pub fn query(&self, bounds: &Bounds) -> Vec<&SpatialItem<T>> {
        let envelope = AABB::from_corners([bounds.min.x, bounds.min.y], [bounds.max.x, bounds.max.y]);
        self.rtree.locate_in_envelope_intersecting(&envelope).collect()
    }

    /// Items strictly closer than `radius` to `center`
    pub fn within(&self, center: &Point, radius: f64) -> impl Iterator<Item = &SpatialItem<T>> {
        let r2 = radius * radius;
        let query = [center.x, center.y];
        // rstar's radius query is inclusive and squared
        self.rtree
            .locate_within_distance(query, r2)
            .filter(move |item| item.distance_2(&query) < r2)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpatialItem<T>> {
        self.rtree.iter()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn clear(&mut self) {
        self.rtree = RTree::new();
        self.bounds = None;
    }
}

impl<T> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}
