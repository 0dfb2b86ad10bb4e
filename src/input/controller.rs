use crate::{
    core::{
        config::InteractionConfig,
        geo::{LatLng, LatLngBounds},
    },
    data::location::Location,
    input::{
        events::{MapEvent, Notice, NoticeKind},
        selection::{SelectionState, UserFix},
    },
    layers::{marker::MarkerGroup, user_location::UserLocationLayer},
    prelude::Duration,
    services::geolocation::{GeolocationError, Position},
    ui::popup::{Popup, PopupContent},
};
use std::fmt;

/// Animated viewport change requested by the controller
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCommand {
    FlyTo {
        center: LatLng,
        zoom: f64,
        duration: Duration,
    },
    FitBounds {
        bounds: LatLngBounds,
        padding: f64,
        duration: Duration,
    },
}

/// Callback told about every successful geolocation
pub type LocateCallback = Box<dyn FnMut(LatLng) + Send>;

/// Owns the selection, the popup and the user marker, and turns marker hits,
/// panel selections and async completions into viewport commands.
///
/// The controller never touches the viewport itself; the map applies the
/// returned [`ViewCommand`]s.
pub struct InteractionController {
    config: InteractionConfig,
    selection: SelectionState,
    popup: Popup,
    user_layer: UserLocationLayer,
    events: Vec<MapEvent>,
    on_locate: Option<LocateCallback>,
}

impl InteractionController {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            selection: SelectionState::Idle,
            popup: Popup::new(),
            user_layer: UserLocationLayer::new(),
            events: Vec::new(),
            on_locate: None,
        }
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: InteractionConfig) {
        self.config = config;
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn popup(&self) -> &Popup {
        &self.popup
    }

    pub fn user_layer(&self) -> &UserLocationLayer {
        &self.user_layer
    }

    pub fn set_on_locate(&mut self, callback: impl FnMut(LatLng) + Send + 'static) {
        self.on_locate = Some(Box::new(callback));
    }

    /// Reacts to a click that hit `group`, or nothing.
    ///
    /// Empty space dismisses the popup, a cluster zooms to its members and a
    /// single marker is selected.
    pub fn handle_hit(&mut self, hit: Option<&MarkerGroup>) -> Option<ViewCommand> {
        match hit {
            None => {
                self.dismiss();
                None
            }
            Some(MarkerGroup::Cluster(cluster)) => {
                log::debug!("cluster of {} clicked, fitting bounds", cluster.len());
                self.events.push(MapEvent::FitBounds {
                    bounds: cluster.bounds.clone(),
                });
                Some(ViewCommand::FitBounds {
                    bounds: cluster.bounds.clone(),
                    padding: self.config.fit_padding_px,
                    duration: self.config.fit_duration(),
                })
            }
            Some(MarkerGroup::Singleton(feature)) => Some(self.select_location(&feature.location)),
        }
    }

    /// Selects a catalog location and flies to it at detail zoom
    pub fn select_location(&mut self, location: &Location) -> ViewCommand {
        self.select(location, self.config.detail_zoom, self.config.select_duration())
    }

    /// Selects a freshly added search result
    pub fn select_search_result(&mut self, location: &Location) -> ViewCommand {
        self.select(location, self.config.search_zoom, self.config.search_duration())
    }

    pub fn select(&mut self, location: &Location, zoom: f64, duration: Duration) -> ViewCommand {
        self.selection.select(location.clone());
        self.popup
            .show(location.position, PopupContent::for_location(location));

        self.events.push(MapEvent::LocationSelected { id: location.id });
        self.events.push(MapEvent::PopupOpened {
            anchor: location.position,
            title: location.name.clone(),
        });
        self.events.push(MapEvent::FlyTo {
            center: location.position,
            zoom,
        });

        ViewCommand::FlyTo {
            center: location.position,
            zoom,
            duration,
        }
    }

    /// Hides the popup and clears the selection
    pub fn dismiss(&mut self) {
        if self.popup.is_visible() {
            self.popup.hide();
            self.events.push(MapEvent::PopupHidden);
        }
        self.selection.clear();
    }

    pub fn begin_locate(&mut self) {
        self.selection.begin_locate();
    }

    /// Applies the outcome of a geolocation request.
    ///
    /// Failures raise a notice and put back whatever was selected before the
    /// request; nothing else changes.
    pub fn complete_locate(
        &mut self,
        result: std::result::Result<Position, GeolocationError>,
    ) -> Option<ViewCommand> {
        match result {
            Ok(position) => {
                let fix = UserFix {
                    position: position.coords,
                    accuracy_m: position.accuracy_m,
                };
                log::info!(
                    "user located at {:.5}, {:.5} (±{:.0} m)",
                    fix.position.lat,
                    fix.position.lng,
                    fix.accuracy_m
                );

                self.user_layer.place(fix.position, fix.accuracy_m);
                self.selection.located(fix);
                self.popup
                    .show(fix.position, PopupContent::for_user(fix.accuracy_m));

                self.events.push(MapEvent::UserLocated {
                    position: fix.position,
                    accuracy_m: fix.accuracy_m,
                });
                self.events.push(MapEvent::PopupOpened {
                    anchor: fix.position,
                    title: self.popup.content.title.clone(),
                });
                self.events.push(MapEvent::FlyTo {
                    center: fix.position,
                    zoom: self.config.locate_zoom,
                });

                if let Some(callback) = self.on_locate.as_mut() {
                    callback(fix.position);
                }

                Some(ViewCommand::FlyTo {
                    center: fix.position,
                    zoom: self.config.locate_zoom,
                    duration: self.config.locate_duration(),
                })
            }
            Err(err) => {
                log::warn!("geolocation failed: {}", err);
                self.selection.restore();
                self.notify(err.notice_kind());
                None
            }
        }
    }

    /// Removes the user marker. A `UserLocated` focus returns to `Idle` with
    /// its popup hidden; a pending request keeps running. Returns whether a
    /// marker was removed.
    pub fn reset_user_location(&mut self) -> bool {
        if matches!(self.selection, SelectionState::UserLocated(_)) {
            self.dismiss();
        }
        if !self.user_layer.is_visible() {
            return false;
        }
        self.user_layer.clear();
        self.events.push(MapEvent::UserLocationCleared);
        true
    }

    pub fn notify(&mut self, kind: NoticeKind) {
        self.events.push(MapEvent::Notice(Notice::new(kind)));
    }

    pub fn push_event(&mut self, event: MapEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<MapEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

impl fmt::Debug for InteractionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionController")
            .field("selection", &self.selection)
            .field("popup", &self.popup)
            .field("user_layer", &self.user_layer)
            .field("pending_events", &self.events.len())
            .field("on_locate", &self.on_locate.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::marker::{Cluster, RenderableFeature};
    use std::sync::{Arc, Mutex};

    fn gate() -> Location {
        Location::new(1, "India Gate", "monument", LatLng::new(28.6129, 77.2295))
            .with_description("War memorial")
    }

    fn singleton() -> MarkerGroup {
        MarkerGroup::Singleton(RenderableFeature::new(gate(), "https://example.org/m.png"))
    }

    #[test]
    fn test_singleton_hit_selects_and_flies() {
        let mut controller = InteractionController::default();
        let command = controller.handle_hit(Some(&singleton())).unwrap();

        assert_eq!(
            command,
            ViewCommand::FlyTo {
                center: gate().position,
                zoom: 15.0,
                duration: Duration::from_millis(800),
            }
        );
        assert_eq!(controller.selection().selected(), Some(&gate()));
        assert!(controller.popup().is_visible());
        assert_eq!(controller.popup().content.subtitle, "monument");
        assert_eq!(controller.popup().content.description.as_deref(), Some("War memorial"));
    }

    #[test]
    fn test_cluster_hit_fits_bounds_without_popup() {
        let cluster = Cluster::from_members(vec![
            RenderableFeature::new(gate(), "a"),
            RenderableFeature::new(
                Location::new(2, "Rashtrapati Bhavan", "government", LatLng::new(28.6143, 77.1994)),
                "b",
            ),
        ]);
        let mut controller = InteractionController::default();
        let command = controller.handle_hit(Some(&MarkerGroup::Cluster(cluster.clone())));

        match command {
            Some(ViewCommand::FitBounds { bounds, padding, .. }) => {
                assert_eq!(bounds, cluster.bounds);
                assert_eq!(padding, 40.0);
            }
            other => panic!("expected FitBounds, got {:?}", other),
        }
        assert!(!controller.popup().is_visible());
        assert!(controller.selection().is_idle());
    }

    #[test]
    fn test_empty_hit_hides_popup() {
        let mut controller = InteractionController::default();
        controller.handle_hit(Some(&singleton()));
        controller.drain_events();

        assert!(controller.handle_hit(None).is_none());
        assert!(!controller.popup().is_visible());
        assert!(controller.selection().is_idle());
        assert_eq!(controller.popup().content.title, "India Gate");
        assert_eq!(controller.drain_events(), vec![MapEvent::PopupHidden]);
    }

    #[test]
    fn test_locate_success_places_marker_and_calls_back() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let mut controller = InteractionController::default();
        controller.set_on_locate(move |pos| sink.lock().unwrap().push(pos));
        controller.begin_locate();

        let here = LatLng::new(28.5, 77.1);
        let command = controller.complete_locate(Ok(Position {
            coords: here,
            accuracy_m: 12.0,
        }));

        assert!(matches!(command, Some(ViewCommand::FlyTo { zoom, .. }) if zoom == 17.0));
        assert_eq!(*seen.lock().unwrap(), vec![here]);
        assert_eq!(controller.user_layer().marker().unwrap().position, here);
        assert_eq!(controller.popup().content.title, "You are here");
        assert_eq!(controller.popup().content.subtitle, "Accuracy: ~12m");
    }

    #[test]
    fn test_reset_user_location_returns_to_idle() {
        let mut controller = InteractionController::default();
        controller.begin_locate();
        controller.complete_locate(Ok(Position {
            coords: LatLng::new(28.5, 77.1),
            accuracy_m: 12.0,
        }));
        controller.drain_events();

        assert!(controller.reset_user_location());
        assert!(controller.selection().is_idle());
        assert!(!controller.popup().is_visible());
        assert!(!controller.user_layer().is_visible());
        assert_eq!(
            controller.drain_events(),
            vec![MapEvent::PopupHidden, MapEvent::UserLocationCleared]
        );

        assert!(!controller.reset_user_location());
        assert!(controller.drain_events().is_empty());
    }

    #[test]
    fn test_reset_keeps_selected_location() {
        let mut controller = InteractionController::default();
        controller.begin_locate();
        controller.complete_locate(Ok(Position {
            coords: LatLng::new(28.5, 77.1),
            accuracy_m: 12.0,
        }));
        controller.select_location(&gate());
        controller.drain_events();

        assert!(controller.reset_user_location());
        assert_eq!(controller.selection().selected_id(), Some(gate().id));
        assert!(controller.popup().is_visible());
        assert_eq!(controller.drain_events(), vec![MapEvent::UserLocationCleared]);
    }

    #[test]
    fn test_locate_failure_restores_and_notifies() {
        let mut controller = InteractionController::default();
        controller.select_location(&gate());
        controller.begin_locate();
        controller.drain_events();

        let command = controller.complete_locate(Err(GeolocationError::PermissionDenied));

        assert!(command.is_none());
        assert_eq!(controller.selection().selected_id(), Some(gate().id));
        assert!(controller.user_layer().marker().is_none());
        assert_eq!(
            controller.drain_events(),
            vec![MapEvent::Notice(Notice::new(NoticeKind::PermissionDenied))]
        );
    }
}
