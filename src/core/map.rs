use crate::{
    animation::transitions::ViewTransition,
    core::{
        config::MapConfig,
        geo::{LatLng, Point},
        viewport::Viewport,
    },
    data::{
        catalog::LocationCatalog,
        icons::IconResolver,
        location::{Location, LocationId},
    },
    input::{
        controller::{InteractionController, ViewCommand},
        events::{InputEvent, KeyCode, MapEvent, MouseButton},
        selection::SelectionState,
    },
    layers::{
        marker::{MarkerGroup, MarkerLayer},
        user_location::UserLocationLayer,
    },
    prelude::{Arc, Duration},
    runtime::{self, AsyncSpawner},
    services::{
        geocoding::{GeocodeResult, Geocoder},
        geolocation::{request_position, GeolocationProvider, PositionOptions, PositionResult},
    },
    tiles::basemap::{Basemap, BasemapRegistry},
    ui::{
        panel::{Panel, PanelEvent},
        popup::Popup,
    },
    MapError, Result,
};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

/// Arrow keys pan by this many pixels
const KEY_PAN_PX: f64 = 80.0;

/// Result of a one-shot task, delivered back to the owning thread
#[derive(Debug)]
pub(crate) enum Completion {
    Search { query: String, result: GeocodeResult },
    Locate(PositionResult),
}

/// An interactive POI map.
///
/// The map is owned by a single thread. Geocoding and geolocation run as
/// spawned tasks whose results queue up until [`PoiMap::process_completions`]
/// (or [`PoiMap::wait_for_completion`]) applies them, so every state change
/// happens on the owner's thread. When two requests overlap, the one that
/// completes last wins.
pub struct PoiMap {
    config: MapConfig,
    viewport: Viewport,
    catalog: LocationCatalog,
    icons: IconResolver,
    markers: MarkerLayer,
    controller: InteractionController,
    basemaps: BasemapRegistry,
    panel: Panel,
    transition: Option<ViewTransition>,
    geocoder: Arc<dyn Geocoder>,
    geolocation: Arc<dyn GeolocationProvider>,
    spawner: Option<Arc<dyn AsyncSpawner>>,
    completions_tx: Sender<Completion>,
    completions_rx: Receiver<Completion>,
    in_flight: usize,
    hovering: bool,
    disposed: bool,
}

impl PoiMap {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        config: MapConfig,
        viewport: Viewport,
        catalog: LocationCatalog,
        icons: IconResolver,
        basemaps: BasemapRegistry,
        geocoder: Arc<dyn Geocoder>,
        geolocation: Arc<dyn GeolocationProvider>,
        spawner: Option<Arc<dyn AsyncSpawner>>,
    ) -> Self {
        let mut markers = MarkerLayer::new(config.clustering.clone());
        markers.rebuild(&catalog, &icons);
        let controller = InteractionController::new(config.interaction.clone());
        let (completions_tx, completions_rx) = crossbeam_channel::unbounded();

        log::info!(
            "map ready: {} locations, basemap {}",
            catalog.len(),
            basemaps.active().name
        );

        Self {
            config,
            viewport,
            catalog,
            icons,
            markers,
            controller,
            basemaps,
            panel: Panel::new(),
            transition: None,
            geocoder,
            geolocation,
            spawner,
            completions_tx,
            completions_rx,
            in_flight: 0,
            hovering: false,
            disposed: false,
        }
    }

    /// Map with the built-in catalog and default services
    pub fn new(config: MapConfig) -> Result<Self> {
        crate::core::builder::MapBuilder::new().with_config(config).build()
    }

    pub fn builder() -> crate::core::builder::MapBuilder {
        crate::core::builder::MapBuilder::new()
    }

    // --- input ---------------------------------------------------------------------------------

    pub fn handle_input(&mut self, input: InputEvent) -> Result<()> {
        self.ensure_live()?;

        match input {
            InputEvent::Click {
                position,
                button: MouseButton::Left,
            } => {
                let hit = self.group_at(position);
                let command = self.controller.handle_hit(hit.as_ref());
                self.apply_command(command);
            }
            InputEvent::Click { .. } => {}
            InputEvent::MouseMove { position } => {
                self.hovering = self.group_at(position).is_some();
            }
            InputEvent::DragStart { .. } => {
                self.transition = None;
            }
            InputEvent::Drag { delta } => {
                self.viewport.pan(delta);
            }
            InputEvent::DragEnd => self.emit_view_changed(),
            InputEvent::Scroll { delta, position } => {
                self.transition = None;
                self.viewport.zoom_to(self.viewport.zoom + delta, Some(position));
                self.emit_view_changed();
            }
            InputEvent::KeyPress { key, .. } => match key {
                KeyCode::Escape => self.controller.dismiss(),
                KeyCode::Plus => self.zoom_by(1.0),
                KeyCode::Minus => self.zoom_by(-1.0),
                KeyCode::ArrowUp => self.pan_by(0.0, KEY_PAN_PX),
                KeyCode::ArrowDown => self.pan_by(0.0, -KEY_PAN_PX),
                KeyCode::ArrowLeft => self.pan_by(KEY_PAN_PX, 0.0),
                KeyCode::ArrowRight => self.pan_by(-KEY_PAN_PX, 0.0),
                _ => {}
            },
            InputEvent::Resize { size } => self.viewport.set_size(size),
        }
        Ok(())
    }

    /// Routes a side panel action into the map
    pub fn handle_panel_event(&mut self, event: PanelEvent) -> Result<()> {
        match event {
            PanelEvent::SelectionRequested(id) => self.select_by_id(id),
            PanelEvent::SearchSubmitted(query) => self.submit_search(&query).map(|_| ()),
        }
    }

    /// Marker group under a container pixel, within the hit tolerance
    pub fn group_at(&mut self, pixel: Point) -> Option<MarkerGroup> {
        let world = self.viewport.pixel_to_world(&pixel);
        let tolerance = self.config.clustering.hit_tolerance_px;
        self.markers
            .hit_test(world, self.viewport.zoom, tolerance)
            .cloned()
    }

    /// Whether the pointer is over a marker, for the front end's cursor
    pub fn hovering(&self) -> bool {
        self.hovering
    }

    // --- selection -----------------------------------------------------------------------------

    pub fn select_location(&mut self, location: &Location) -> Result<()> {
        self.ensure_live()?;
        let command = self.controller.select_location(location);
        self.apply_command(Some(command));
        Ok(())
    }

    pub fn select_by_id(&mut self, id: LocationId) -> Result<()> {
        self.ensure_live()?;
        let location = self
            .catalog
            .get(id)
            .cloned()
            .ok_or(MapError::UnknownLocation(id.0))?;
        self.select_location(&location)
    }

    /// Hides the popup and clears the selection
    pub fn dismiss(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.controller.dismiss();
        Ok(())
    }

    /// Removes the user marker; see [`InteractionController::reset_user_location`]
    pub fn reset_user_location(&mut self) -> Result<bool> {
        self.ensure_live()?;
        Ok(self.controller.reset_user_location())
    }

    // --- async services ------------------------------------------------------------------------

    /// Starts a geocoding lookup in the background. Returns `false` without
    /// sending anything when the query is blank.
    pub fn submit_search(&mut self, query: &str) -> Result<bool> {
        self.ensure_live()?;
        let query = query.trim().to_string();
        if query.is_empty() {
            return Ok(false);
        }

        let geocoder = self.geocoder.clone();
        let tx = self.completions_tx.clone();
        self.spawn_task(async move {
            let result = geocoder.geocode(&query).await;
            let _ = tx.send(Completion::Search { query, result });
        })?;
        Ok(true)
    }

    /// Geocodes `query` and applies the result before returning. The new
    /// location is returned on success; failures surface as notices.
    pub async fn search(&mut self, query: &str) -> Result<Option<Location>> {
        self.ensure_live()?;
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }
        let result = self.geocoder.geocode(query).await;
        self.ensure_live()?;
        Ok(self.apply_search(query, result))
    }

    /// Starts a geolocation request in the background
    pub fn locate(&mut self) -> Result<()> {
        self.ensure_live()?;
        let provider = self.geolocation.clone();
        let options = PositionOptions::from(&self.config.geolocation);
        let tx = self.completions_tx.clone();

        self.spawn_task(async move {
            let result = request_position(provider.as_ref(), &options).await;
            let _ = tx.send(Completion::Locate(result));
        })?;
        self.controller.begin_locate();
        Ok(())
    }

    /// Requests the user position and applies it before returning
    pub async fn locate_now(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.controller.begin_locate();
        let options = PositionOptions::from(&self.config.geolocation);
        let result = request_position(self.geolocation.as_ref(), &options).await;
        self.ensure_live()?;
        self.apply_locate(result);
        Ok(())
    }

    /// Applies every completed task without blocking; returns how many
    pub fn process_completions(&mut self) -> usize {
        if self.disposed {
            return 0;
        }
        let mut applied = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.apply_completion(completion);
            applied += 1;
        }
        applied
    }

    /// Blocks until one task completes or `timeout` passes, then applies it
    /// along with anything else already queued.
    ///
    /// Must not be called from the thread that drives a current-thread tokio
    /// runtime, since the task could never make progress.
    pub fn wait_for_completion(&mut self, timeout: Duration) -> Result<bool> {
        self.ensure_live()?;
        match self.completions_rx.recv_timeout(timeout) {
            Ok(completion) => {
                self.apply_completion(completion);
                self.process_completions();
                Ok(true)
            }
            Err(RecvTimeoutError::Timeout) => Ok(false),
            Err(RecvTimeoutError::Disconnected) => Err(MapError::Disposed),
        }
    }

    /// Number of spawned tasks whose results have not been applied yet
    pub fn pending_tasks(&self) -> usize {
        self.in_flight
    }

    /// Called with the user position after every successful geolocation
    pub fn on_locate(&mut self, callback: impl FnMut(LatLng) + Send + 'static) {
        self.controller.set_on_locate(callback);
    }

    fn spawn_task<F>(&mut self, future: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let handle = match &self.spawner {
            Some(spawner) => spawner.spawn_boxed(Box::pin(future)),
            None => runtime::spawn(future),
        }?;
        // Tasks run to completion on their own; the handle is not kept
        drop(handle);
        self.in_flight += 1;
        Ok(())
    }

    fn apply_completion(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match completion {
            Completion::Search { query, result } => {
                self.apply_search(&query, result);
            }
            Completion::Locate(result) => self.apply_locate(result),
        }
    }

    fn apply_search(&mut self, query: &str, result: GeocodeResult) -> Option<Location> {
        match result {
            Ok(hit) => {
                log::info!("'{}' resolved to {}", query, hit.name);
                let location = self.catalog.append_search_result(hit.name, hit.position);
                self.markers.rebuild(&self.catalog, &self.icons);
                self.controller.push_event(MapEvent::SearchResultAdded {
                    location: location.clone(),
                });
                self.controller.push_event(MapEvent::CatalogChanged {
                    len: self.catalog.len(),
                });

                let command = self.controller.select_search_result(&location);
                self.apply_command(Some(command));
                Some(location)
            }
            Err(err) => {
                log::warn!("search for '{}' failed: {}", query, err);
                self.controller.notify(err.notice_kind());
                None
            }
        }
    }

    fn apply_locate(&mut self, result: PositionResult) {
        let command = self.controller.complete_locate(result);
        self.apply_command(command);
    }

    // --- viewport ------------------------------------------------------------------------------

    fn apply_command(&mut self, command: Option<ViewCommand>) {
        let Some(command) = command else {
            return;
        };
        let (center, zoom, duration) = match command {
            ViewCommand::FlyTo {
                center,
                zoom,
                duration,
            } => (center, zoom, duration),
            ViewCommand::FitBounds {
                bounds,
                padding,
                duration,
            } => {
                let (center, zoom) = self.viewport.fit(&bounds, padding);
                (center, zoom, duration)
            }
        };
        let zoom = zoom.clamp(self.viewport.min_zoom, self.viewport.max_zoom);

        self.transition = Some(ViewTransition::new(
            self.viewport.center,
            self.viewport.zoom,
            center,
            zoom,
            duration,
            self.config.interaction.easing,
        ));
    }

    /// Steps the running view transition by `dt`. Returns `true` while the
    /// view is still moving.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let Some(transition) = self.transition.as_mut() else {
            return false;
        };
        let frame = transition.advance(dt);
        self.viewport.set_zoom(frame.zoom);
        self.viewport.set_center(frame.center);
        if frame.done {
            self.transition = None;
            self.emit_view_changed();
        }
        !frame.done
    }

    /// Jumps the running transition to its end
    pub fn settle(&mut self) {
        if let Some(mut transition) = self.transition.take() {
            let frame = transition.finish();
            self.viewport.set_zoom(frame.zoom);
            self.viewport.set_center(frame.center);
            self.emit_view_changed();
        }
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Moves the view immediately, cancelling any transition
    pub fn set_view(&mut self, center: LatLng, zoom: f64) -> Result<()> {
        self.ensure_live()?;
        if !center.is_valid() {
            return Err(MapError::InvalidCoordinates(format!("{:?}", center)));
        }
        self.transition = None;
        self.viewport.set_zoom(zoom);
        self.viewport.set_center(center);
        self.emit_view_changed();
        Ok(())
    }

    fn zoom_by(&mut self, delta: f64) {
        self.transition = None;
        self.viewport.zoom_to(self.viewport.zoom.round() + delta, None);
        self.emit_view_changed();
    }

    fn pan_by(&mut self, dx: f64, dy: f64) {
        self.transition = None;
        self.viewport.pan(Point::new(dx, dy));
        self.emit_view_changed();
    }

    fn emit_view_changed(&mut self) {
        self.controller.push_event(MapEvent::ViewChanged {
            center: self.viewport.center,
            zoom: self.viewport.zoom,
        });
    }

    // --- layers --------------------------------------------------------------------------------

    /// Marker groups for the current zoom
    pub fn groups(&mut self) -> &[MarkerGroup] {
        self.markers.cluster(self.viewport.zoom)
    }

    /// Marker groups inside the viewport grown by `margin` pixels, so that
    /// glyphs straddling the edge are still drawn
    pub fn visible_groups(&mut self, margin: f64) -> Vec<MarkerGroup> {
        let area = self.viewport.world_bounds().expanded(margin);
        self.markers
            .visible(self.viewport.zoom, &area)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Binary fingerprint of the marker layer at the current zoom
    pub fn fingerprint(&mut self) -> Result<Vec<u8>> {
        self.markers.fingerprint(self.viewport.zoom)
    }

    /// Replaces the catalog and rebuilds the markers
    pub fn replace_catalog(&mut self, catalog: LocationCatalog) -> Result<()> {
        self.ensure_live()?;
        self.catalog = catalog;
        self.markers.rebuild(&self.catalog, &self.icons);
        self.controller.push_event(MapEvent::CatalogChanged {
            len: self.catalog.len(),
        });
        Ok(())
    }

    // --- basemaps ------------------------------------------------------------------------------

    /// Switches the tile source; markers, clusters and selection are untouched
    pub fn set_basemap(&mut self, name: &str) -> Result<()> {
        self.ensure_live()?;
        if self.basemaps.set_active(name)? {
            log::info!("basemap switched to {}", name);
            self.controller.push_event(MapEvent::BasemapChanged {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    pub fn basemap(&self) -> &Basemap {
        self.basemaps.active()
    }

    pub fn basemaps(&self) -> &BasemapRegistry {
        &self.basemaps
    }

    /// URLs of the active basemap's tiles covering the viewport
    pub fn tile_urls(&self) -> Vec<String> {
        let basemap = self.basemaps.active();
        self.viewport
            .visible_tiles()
            .into_iter()
            .filter(|tile| tile.z <= basemap.max_zoom())
            .map(|tile| basemap.tile_url(tile))
            .collect()
    }

    // --- state ---------------------------------------------------------------------------------

    pub fn drain_events(&mut self) -> Vec<MapEvent> {
        self.controller.drain_events()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn catalog(&self) -> &LocationCatalog {
        &self.catalog
    }

    pub fn icons(&self) -> &IconResolver {
        &self.icons
    }

    pub fn markers(&self) -> &MarkerLayer {
        &self.markers
    }

    pub fn selection(&self) -> &SelectionState {
        self.controller.selection()
    }

    pub fn popup(&self) -> &Popup {
        self.controller.popup()
    }

    pub fn user_layer(&self) -> &UserLocationLayer {
        self.controller.user_layer()
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut Panel {
        &mut self.panel
    }

    /// Tears the map down. Pending results are discarded and every later
    /// operation fails with [`MapError::Disposed`].
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.transition = None;
        let dropped = self.completions_rx.try_iter().count();
        log::debug!(
            "map disposed ({} pending results dropped, {} tasks still running)",
            dropped,
            self.in_flight.saturating_sub(dropped)
        );
        self.in_flight = 0;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn ensure_live(&self) -> Result<()> {
        if self.disposed {
            Err(MapError::Disposed)
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Debug for PoiMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoiMap")
            .field("viewport", &self.viewport)
            .field("locations", &self.catalog.len())
            .field("basemap", &self.basemaps.active().name)
            .field("selection", self.controller.selection())
            .field("in_flight", &self.in_flight)
            .field("disposed", &self.disposed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::MapBuilder;
    use crate::services::geolocation::Unsupported;

    fn map() -> PoiMap {
        MapBuilder::new()
            .with_geolocation(Arc::new(Unsupported))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builtin_map() {
        let map = map();
        assert_eq!(map.catalog().len(), 51);
        // Luxury Stay and National Museum share a coordinate
        assert_eq!(map.markers().len(), 50);
        assert_eq!(map.markers().collapsed(), 1);
        assert_eq!(map.basemap().name, "Voyager");
        assert_eq!(map.viewport().zoom, 5.0);
    }

    #[test]
    fn test_select_by_id_flies_to_detail_zoom() {
        let mut map = map();
        map.select_by_id(LocationId(1)).unwrap();
        assert!(map.is_animating());
        assert!(map.popup().is_visible());

        assert!(map.advance(Duration::from_millis(400)));
        assert!(!map.advance(Duration::from_millis(400)));

        let taj = map.catalog().get(LocationId(1)).unwrap().position;
        assert_eq!(map.viewport().zoom, 15.0);
        assert!((map.viewport().center.lat - taj.lat).abs() < 1e-9);
        assert!((map.viewport().center.lng - taj.lng).abs() < 1e-9);
    }

    #[test]
    fn test_select_unknown_id() {
        let mut map = map();
        assert!(matches!(
            map.select_by_id(LocationId(999)),
            Err(MapError::UnknownLocation(999))
        ));
    }

    #[test]
    fn test_escape_dismisses_popup() {
        let mut map = map();
        map.select_by_id(LocationId(2)).unwrap();
        map.handle_input(InputEvent::key(KeyCode::Escape)).unwrap();

        assert!(!map.popup().is_visible());
        assert!(map.selection().is_idle());
    }

    #[test]
    fn test_keyboard_zoom() {
        let mut map = map();
        map.handle_input(InputEvent::key(KeyCode::Plus)).unwrap();
        assert_eq!(map.viewport().zoom, 6.0);
        map.handle_input(InputEvent::key(KeyCode::Minus)).unwrap();
        map.handle_input(InputEvent::key(KeyCode::Minus)).unwrap();
        assert_eq!(map.viewport().zoom, 4.0);
    }

    #[test]
    fn test_visible_groups_follow_the_view() {
        let mut map = map();
        let everything = map.groups().len();
        assert_eq!(map.visible_groups(0.0).len(), everything);

        // Zoomed into the Taj Mahal only it stays on screen
        let taj = map.catalog().get(LocationId(1)).unwrap().position;
        map.set_view(taj, 16.0).unwrap();
        let visible = map.visible_groups(40.0);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id(), 1);
    }

    #[test]
    fn test_arrow_keys_pan() {
        let mut map = map();
        let start = map.viewport().center;
        map.handle_input(InputEvent::key(KeyCode::ArrowUp)).unwrap();
        assert!(map.viewport().center.lat > start.lat);
        map.handle_input(InputEvent::key(KeyCode::ArrowRight)).unwrap();
        assert!(map.viewport().center.lng > start.lng);
    }

    #[test]
    fn test_blank_search_sends_nothing() {
        let mut map = map();
        assert!(!map.submit_search("   ").unwrap());
        assert_eq!(map.pending_tasks(), 0);
    }

    #[test]
    fn test_tile_urls_follow_basemap() {
        let mut map = map();
        let voyager = map.tile_urls();
        assert!(!voyager.is_empty());
        assert!(voyager.iter().all(|u| u.contains("cartocdn.com")));

        map.set_basemap("Satellite").unwrap();
        assert!(map.tile_urls().iter().all(|u| u.contains("arcgisonline.com")));
        assert!(map.set_basemap("Terrain").is_err());
    }

    #[test]
    fn test_dispose_rejects_operations() {
        let mut map = map();
        map.dispose();
        assert!(map.is_disposed());
        assert!(matches!(map.select_by_id(LocationId(1)), Err(MapError::Disposed)));
        assert!(matches!(map.submit_search("Agra"), Err(MapError::Disposed)));
        assert!(matches!(map.set_basemap("Satellite"), Err(MapError::Disposed)));
        assert_eq!(map.process_completions(), 0);
    }
}
