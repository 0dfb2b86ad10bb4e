use crate::{
    core::{
        bounds::Bounds,
        config::ClusterConfig,
        geo::{LatLng, LatLngBounds, Point},
    },
    data::{
        catalog::LocationCatalog,
        icons::IconResolver,
        location::{Location, LocationId},
    },
    layers::style::{style, VisualStyle},
    prelude::{FxHasher, HashSet},
    spatial::{
        clustering::Clustering,
        index::{SpatialIndex, SpatialItem},
    },
    Result,
};
use serde::{Deserialize, Serialize};
use std::hash::Hasher;

/// A location ready to be drawn: projected once and decorated with its icon
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableFeature {
    pub location: Location,
    /// Web Mercator world pixels at zoom 0
    pub world: Point,
    pub icon: String,
}

impl RenderableFeature {
    pub fn new(location: Location, icon: impl Into<String>) -> Self {
        let world = location.position.to_world();
        Self {
            location,
            world,
            icon: icon.into(),
        }
    }

    pub fn id(&self) -> LocationId {
        self.location.id
    }

    pub fn position(&self) -> LatLng {
        self.location.position
    }
}

/// Several features drawn as one badge
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub id: u64,
    /// Render position, the centroid of the members in world space
    pub position: LatLng,
    pub world: Point,
    pub members: Vec<RenderableFeature>,
    /// Geographic extent of the members, used to zoom into the cluster
    pub bounds: LatLngBounds,
}

impl Cluster {
    /// Builds a cluster from members in catalog order
    pub fn from_members(members: Vec<RenderableFeature>) -> Self {
        let n = members.len().max(1) as f64;
        let sum = members
            .iter()
            .fold(Point::new(0.0, 0.0), |acc, f| acc.add(&f.world));
        let world = sum.multiply(1.0 / n);
        let position = LatLng::from_world(world);
        let bounds = LatLngBounds::from_points(members.iter().map(|f| &f.location.position))
            .unwrap_or_else(|| LatLngBounds::new(position, position));

        let mut hasher = FxHasher::default();
        for member in &members {
            hasher.write_u64(member.id().0);
        }

        Self {
            id: hasher.finish(),
            position,
            world,
            members,
            bounds,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member_ids(&self) -> Vec<LocationId> {
        self.members.iter().map(RenderableFeature::id).collect()
    }
}

/// One drawable unit of the marker layer
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerGroup {
    Singleton(RenderableFeature),
    Cluster(Cluster),
}

impl MarkerGroup {
    /// Location id for a singleton, membership hash for a cluster
    pub fn id(&self) -> u64 {
        match self {
            MarkerGroup::Singleton(feature) => feature.id().0,
            MarkerGroup::Cluster(cluster) => cluster.id,
        }
    }

    pub fn world(&self) -> Point {
        match self {
            MarkerGroup::Singleton(feature) => feature.world,
            MarkerGroup::Cluster(cluster) => cluster.world,
        }
    }

    pub fn position(&self) -> LatLng {
        match self {
            MarkerGroup::Singleton(feature) => feature.position(),
            MarkerGroup::Cluster(cluster) => cluster.position,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            MarkerGroup::Singleton(_) => 1,
            MarkerGroup::Cluster(cluster) => cluster.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn members(&self) -> &[RenderableFeature] {
        match self {
            MarkerGroup::Singleton(feature) => std::slice::from_ref(feature),
            MarkerGroup::Cluster(cluster) => &cluster.members,
        }
    }

    pub fn member_ids(&self) -> Vec<LocationId> {
        self.members().iter().map(RenderableFeature::id).collect()
    }
}

/// Serializable view of the layer at one zoom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    pub zoom: f64,
    pub groups: Vec<GroupSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSnapshot {
    pub id: u64,
    pub members: Vec<LocationId>,
    pub style: VisualStyle,
}

struct ClusteredView {
    zoom: f64,
    groups: Vec<MarkerGroup>,
    /// Group positions in world pixels at `zoom`, keyed by group index
    index: SpatialIndex<()>,
    /// Largest glyph extent around an anchor, in pixels
    reach: f64,
}

/// Marker and cluster layer over a location catalog
pub struct MarkerLayer {
    config: ClusterConfig,
    features: Vec<RenderableFeature>,
    collapsed: usize,
    view: Option<ClusteredView>,
}

impl MarkerLayer {
    pub fn new(config: ClusterConfig) -> Self {
        Self {
            config,
            features: Vec::new(),
            collapsed: 0,
            view: None,
        }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ClusterConfig) {
        if config != self.config {
            self.config = config;
            self.view = None;
        }
    }

    /// Rebuilds every feature from the catalog.
    ///
    /// Locations sharing exact coordinates collapse into the first one in
    /// catalog order; the rest are counted in [`MarkerLayer::collapsed`].
    pub fn rebuild(&mut self, catalog: &LocationCatalog, icons: &IconResolver) {
        let mut seen = HashSet::default();
        let mut features = Vec::with_capacity(catalog.len());
        let mut collapsed = 0;

        for location in catalog.iter() {
            if !seen.insert(location.position.key()) {
                log::debug!(
                    "location {} ({}) shares coordinates with an earlier record, skipped",
                    location.id,
                    location.name
                );
                collapsed += 1;
                continue;
            }
            let icon = icons.resolve(&location.category);
            features.push(RenderableFeature::new(location.clone(), icon));
        }

        if collapsed > 0 {
            log::debug!("{} co-located records collapsed", collapsed);
        }
        log::debug!("marker layer rebuilt with {} features", features.len());

        self.features = features;
        self.collapsed = collapsed;
        self.view = None;
    }

    pub fn features(&self) -> &[RenderableFeature] {
        &self.features
    }

    pub fn feature(&self, id: LocationId) -> Option<&RenderableFeature> {
        self.features.iter().find(|f| f.id() == id)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Number of catalog records hidden behind an identical coordinate
    pub fn collapsed(&self) -> usize {
        self.collapsed
    }

    /// Groups the features for `zoom`; reuses the last result when the zoom
    /// has not changed since.
    pub fn cluster(&mut self, zoom: f64) -> &[MarkerGroup] {
        let stale = match &self.view {
            Some(view) => view.zoom.to_bits() != zoom.to_bits(),
            None => true,
        };
        if stale {
            self.view = Some(self.compute(zoom));
        }
        self.view.as_ref().map(|v| v.groups.as_slice()).unwrap_or(&[])
    }

    /// Groups from the last [`MarkerLayer::cluster`] call
    pub fn groups(&self) -> &[MarkerGroup] {
        self.view.as_ref().map(|v| v.groups.as_slice()).unwrap_or(&[])
    }

    /// Zoom the current groups were computed for
    pub fn clustered_zoom(&self) -> Option<f64> {
        self.view.as_ref().map(|v| v.zoom)
    }

    /// Group whose drawn glyph lies closest to `world_point` (world pixels at
    /// `zoom`), within `tolerance` pixels. Icons are hit along the whole pin
    /// above their anchor, badges across their full disc. Equal distances
    /// resolve to the earlier group.
    pub fn hit_test(&mut self, world_point: Point, zoom: f64, tolerance: f64) -> Option<&MarkerGroup> {
        self.cluster(zoom);
        let view = self.view.as_ref()?;
        let window = Bounds::new(world_point, world_point).expanded(tolerance + view.reach);
        view.index
            .query(&window)
            .into_iter()
            .filter_map(|item| {
                let group = view.groups.get(item.key)?;
                let offset = world_point.subtract(&item.position);
                let distance = style(group).glyph.distance_to(&offset);
                (distance <= tolerance).then_some((distance, item.key, group))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, _, group)| group)
    }

    /// Groups whose anchor lies inside `area` (world pixels at `zoom`), in
    /// group order
    pub fn visible(&mut self, zoom: f64, area: &Bounds) -> Vec<&MarkerGroup> {
        self.cluster(zoom);
        let Some(view) = self.view.as_ref() else {
            return Vec::new();
        };
        let mut keys: Vec<usize> = view.index.query(area).iter().map(|item| item.key).collect();
        keys.sort_unstable();
        keys.into_iter().filter_map(|key| view.groups.get(key)).collect()
    }

    pub fn snapshot(&mut self, zoom: f64) -> LayerSnapshot {
        let groups = self
            .cluster(zoom)
            .iter()
            .map(|group| GroupSnapshot {
                id: group.id(),
                members: group.member_ids(),
                style: style(group),
            })
            .collect();
        LayerSnapshot { zoom, groups }
    }

    /// Binary encoding of [`MarkerLayer::snapshot`], equal for equal layers
    pub fn fingerprint(&mut self, zoom: f64) -> Result<Vec<u8>> {
        let snapshot = self.snapshot(zoom);
        Ok(bincode::serialize(&snapshot)?)
    }

    fn compute(&self, zoom: f64) -> ClusteredView {
        let scale = 2_f64.powf(zoom);
        let disabled = self
            .config
            .disable_at_zoom
            .map_or(false, |limit| zoom >= limit);

        let partition = if disabled {
            (0..self.features.len()).map(|i| vec![i]).collect()
        } else {
            let points: Vec<Point> = self.features.iter().map(|f| f.world.multiply(scale)).collect();
            Clustering::new(self.config.distance_px).group(&points)
        };

        let groups: Vec<MarkerGroup> = partition
            .into_iter()
            .map(|members| {
                if members.len() == 1 {
                    MarkerGroup::Singleton(self.features[members[0]].clone())
                } else {
                    let members = members.into_iter().map(|i| self.features[i].clone()).collect();
                    MarkerGroup::Cluster(Cluster::from_members(members))
                }
            })
            .collect();

        let index = SpatialIndex::bulk_load(
            groups
                .iter()
                .enumerate()
                .map(|(i, g)| SpatialItem::new(i, g.world().multiply(scale), ()))
                .collect(),
        );

        log::debug!(
            "clustered {} features into {} groups at zoom {:.2}",
            self.features.len(),
            groups.len(),
            zoom
        );

        let reach = groups
            .iter()
            .map(|group| style(group).glyph.reach())
            .fold(0.0, f64::max);

        ClusteredView {
            zoom,
            groups,
            index,
            reach,
        }
    }
}

impl Default for MarkerLayer {
    fn default() -> Self {
        Self::new(ClusterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> LocationCatalog {
        LocationCatalog::new(vec![
            Location::new(1, "India Gate", "monument", LatLng::new(28.6129, 77.2295)),
            Location::new(2, "Rashtrapati Bhavan", "government", LatLng::new(28.6143, 77.1994)),
            Location::new(3, "Taj Mahal", "monument", LatLng::new(27.1751, 78.0421)),
            Location::new(4, "Luxury Stay", "hotel", LatLng::new(28.61, 77.22)),
            Location::new(5, "National Museum", "museum", LatLng::new(28.61, 77.22)),
        ])
        .unwrap()
    }

    fn layer() -> MarkerLayer {
        let mut layer = MarkerLayer::default();
        layer.rebuild(&catalog(), &IconResolver::builtin());
        layer
    }

    #[test]
    fn test_rebuild_collapses_identical_coordinates() {
        let layer = layer();
        assert_eq!(layer.len(), 4);
        assert_eq!(layer.collapsed(), 1);
        assert!(layer.feature(LocationId(4)).is_some());
        assert!(layer.feature(LocationId(5)).is_none());
    }

    #[test]
    fn test_rebuild_resolves_icons() {
        let layer = layer();
        let gate = layer.feature(LocationId(1)).unwrap();
        assert_eq!(gate.icon, IconResolver::builtin().resolve("monument"));
    }

    #[test]
    fn test_low_zoom_groups_delhi() {
        let mut layer = layer();
        let groups = layer.cluster(6.0).to_vec();

        // Delhi records merge, Agra stays on its own
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].member_ids(), vec![LocationId(1), LocationId(2), LocationId(4)]);
        assert!(matches!(&groups[1], MarkerGroup::Singleton(f) if f.id() == LocationId(3)));
    }

    #[test]
    fn test_high_zoom_separates() {
        let mut layer = layer();
        let groups = layer.cluster(16.0);
        assert_eq!(groups.len(), 4);
        assert!(groups.iter().all(|g| matches!(g, MarkerGroup::Singleton(_))));
    }

    #[test]
    fn test_disable_at_zoom() {
        let mut layer = layer();
        layer.set_config(ClusterConfig {
            disable_at_zoom: Some(6.5),
            ..ClusterConfig::default()
        });
        assert_eq!(layer.cluster(7.0).len(), 4);
        assert_eq!(layer.cluster(6.0).len(), 2);
    }

    #[test]
    fn test_every_feature_in_exactly_one_group() {
        let mut layer = layer();
        for zoom in [0.0, 5.0, 9.5, 12.0, 18.0] {
            let mut ids: Vec<_> = layer.cluster(zoom).iter().flat_map(|g| g.member_ids()).collect();
            ids.sort();
            assert_eq!(ids, vec![LocationId(1), LocationId(2), LocationId(3), LocationId(4)]);
        }
    }

    #[test]
    fn test_cluster_bounds_cover_members() {
        let mut layer = layer();
        let groups = layer.cluster(6.0);
        let MarkerGroup::Cluster(cluster) = &groups[0] else {
            panic!("expected a cluster");
        };
        assert!(cluster.members.iter().all(|m| cluster.bounds.contains(&m.position())));
        assert!(cluster.bounds.contains(&cluster.position));
    }

    #[test]
    fn test_hit_test() {
        let mut layer = layer();
        let zoom = 16.0;
        let taj = LatLng::new(27.1751, 78.0421).to_world().multiply(2_f64.powf(zoom));

        let hit = layer.hit_test(taj.add(&Point::new(5.0, -5.0)), zoom, 16.0).unwrap();
        assert_eq!(hit.id(), 3);

        assert!(layer.hit_test(taj.add(&Point::new(100.0, 0.0)), zoom, 16.0).is_none());
    }

    #[test]
    fn test_hit_test_reaches_pin_head() {
        let mut layer = layer();
        let zoom = 16.0;
        let taj = LatLng::new(27.1751, 78.0421).to_world().multiply(2_f64.powf(zoom));
        let height = 512.0 * 0.07;

        let head = layer.hit_test(taj.add(&Point::new(0.0, -height)), zoom, 16.0).unwrap();
        assert_eq!(head.id(), 3);
        let top = layer.hit_test(taj.add(&Point::new(2.0, -height - 12.0)), zoom, 16.0).unwrap();
        assert_eq!(top.id(), 3);

        // Below the tip the pin has no extent
        assert!(layer.hit_test(taj.add(&Point::new(0.0, 20.0)), zoom, 16.0).is_none());
        assert!(layer.hit_test(taj.add(&Point::new(0.0, -90.0)), zoom, 16.0).is_none());
    }

    #[test]
    fn test_visible_groups() {
        let mut layer = layer();
        let zoom = 16.0;
        let taj = LatLng::new(27.1751, 78.0421).to_world().multiply(2_f64.powf(zoom));
        let around_taj = Bounds::new(taj, taj).expanded(50.0);

        let visible: Vec<u64> = layer.visible(zoom, &around_taj).iter().map(|g| g.id()).collect();
        assert_eq!(visible, vec![3]);
        assert!(layer
            .visible(zoom, &Bounds::from_coords(0.0, 0.0, 10.0, 10.0))
            .is_empty());
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let mut a = layer();
        let mut b = layer();
        assert_eq!(a.fingerprint(6.0).unwrap(), b.fingerprint(6.0).unwrap());
        assert_ne!(a.fingerprint(6.0).unwrap(), a.fingerprint(16.0).unwrap());

        // Rebuilding from the same inputs is idempotent
        a.rebuild(&catalog(), &IconResolver::builtin());
        assert_eq!(a.fingerprint(6.0).unwrap(), b.fingerprint(6.0).unwrap());
    }
}
