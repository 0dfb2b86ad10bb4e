//! Core constants derived from common web-map conventions and the defaults
//! the original POI map shipped with. Keeping them in a single place makes it
//! easier to tweak engine-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Web Mercator sphere radius in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude limit of the Web Mercator projection.
pub const MAX_LATITUDE: f64 = 85.051_128_779_8;

/// Pixel radius under which two markers are grouped into one cluster.
pub const DEFAULT_CLUSTER_DISTANCE_PX: f64 = 40.0;

/// Pointer slop, in pixels, when hit-testing markers and badges.
pub const DEFAULT_HIT_TOLERANCE_PX: f64 = 16.0;

/// Zoom used when centering on a selected location.
pub const DETAIL_ZOOM: f64 = 15.0;

/// Zoom used when centering on a geocoding result.
pub const SEARCH_ZOOM: f64 = 14.0;

/// Zoom used when centering on the user's position.
pub const LOCATE_ZOOM: f64 = 17.0;

/// Padding, in pixels, kept around a cluster when fitting the view to it.
pub const FIT_PADDING_PX: f64 = 40.0;

/// Initial map center (New Delhi) and zoom.
pub const DEFAULT_CENTER: (f64, f64) = (28.6139, 77.209);
pub const DEFAULT_ZOOM: f64 = 5.0;

/// Category assigned to locations produced by a geocoding lookup.
pub const SEARCH_RESULT_CATEGORY: &str = "Search Result";

/// Facet entry that disables category filtering in the panel.
pub const ALL_CATEGORIES: &str = "All";

/// Edge length of the category icon sources, in pixels.
pub const MARKER_ICON_SOURCE_PX: f32 = 512.0;

/// Marker icon scale applied to the category PNGs.
pub const MARKER_ICON_SCALE: f32 = 0.07;

/// Anchor inside the icon (hot-spot), as a fraction of its size.
pub const MARKER_ICON_ANCHOR: (f32, f32) = (0.5, 1.0);

/// Radius of the count badge drawn for multi-member clusters.
pub const CLUSTER_BADGE_RADIUS: f32 = 15.0;
