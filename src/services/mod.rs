//! Remote and host services used by the map: geocoding and geolocation.
//! Both are asynchronous and run outside the map's owning thread.

pub mod geocoding;
pub mod geolocation;

pub use geocoding::{GeocodeError, GeocodeHit, Geocoder, PhotonGeocoder};
pub use geolocation::{
    request_position, FixedPosition, GeolocationError, GeolocationProvider, Position,
    PositionOptions, Unsupported,
};
