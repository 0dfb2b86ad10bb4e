use crate::{
    core::{geo::Point, map::PoiMap},
    input::events::{InputEvent, KeyCode, MouseButton},
    layers::{
        marker::MarkerGroup,
        style::{style, Glyph, Label, Rgba},
    },
};
use egui::{Align2, Color32, CursorIcon, FontId, Pos2, Rect, Response, Sense, Stroke, Ui, Vec2};
use std::time::Duration;

/// Immediate-mode view over a [`PoiMap`].
///
/// Translates egui pointer and keyboard input into [`InputEvent`]s, steps the
/// view transition, applies finished background tasks, then paints markers,
/// the user position and the popup.
///
/// ```ignore
/// ui.add(poimap::ui::MapView::new(&mut map));
/// ```
pub struct MapView<'a> {
    map: &'a mut PoiMap,
    show_controls: bool,
    show_attribution: bool,
}

impl<'a> MapView<'a> {
    pub fn new(map: &'a mut PoiMap) -> Self {
        Self {
            map,
            show_controls: true,
            show_attribution: true,
        }
    }

    /// Set whether to show zoom and locate controls (default: true)
    pub fn controls(mut self, show: bool) -> Self {
        self.show_controls = show;
        self
    }

    /// Set whether to show attribution (default: true)
    pub fn attribution(mut self, show: bool) -> Self {
        self.show_attribution = show;
        self
    }

    fn send(&mut self, event: InputEvent) {
        if let Err(e) = self.map.handle_input(event) {
            log::warn!("map input dropped: {}", e);
        }
    }

    fn handle_input(&mut self, ui: &Ui, rect: Rect, response: &Response) {
        let size = Point::new(rect.width() as f64, rect.height() as f64);
        if self.map.viewport().size != size {
            self.send(InputEvent::Resize { size });
        }
        let local = |pos: Pos2| Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64);

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.send(InputEvent::Click {
                    position: local(pos),
                    button: MouseButton::Left,
                });
            }
        }

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.send(InputEvent::DragStart { position: local(pos) });
            }
        }
        if response.dragged() {
            let delta = response.drag_delta();
            if delta.length_sq() > 0.0 {
                self.send(InputEvent::Drag {
                    delta: Point::new(delta.x as f64, delta.y as f64),
                });
            }
        }
        if response.drag_released() {
            self.send(InputEvent::DragEnd);
        }

        if let Some(pos) = response.hover_pos() {
            self.send(InputEvent::MouseMove { position: local(pos) });

            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll.abs() > 0.1 {
                self.send(InputEvent::Scroll {
                    delta: (scroll as f64 * 0.01).clamp(-1.0, 1.0),
                    position: local(pos),
                });
            }

            let keys = ui.input(|i| {
                [
                    (egui::Key::Escape, KeyCode::Escape),
                    (egui::Key::PlusEquals, KeyCode::Plus),
                    (egui::Key::Minus, KeyCode::Minus),
                    (egui::Key::ArrowUp, KeyCode::ArrowUp),
                    (egui::Key::ArrowDown, KeyCode::ArrowDown),
                    (egui::Key::ArrowLeft, KeyCode::ArrowLeft),
                    (egui::Key::ArrowRight, KeyCode::ArrowRight),
                ]
                .into_iter()
                .filter(|(key, _)| i.key_pressed(*key))
                .map(|(_, code)| code)
                .collect::<Vec<_>>()
            });
            for code in keys {
                self.send(InputEvent::key(code));
            }
        }
    }

    fn controls_ui(&mut self, ui: &mut Ui, rect: Rect) {
        let button = Vec2::splat(30.0);
        let zoom_in = Rect::from_min_size(rect.right_top() + Vec2::new(-40.0, 10.0), button);
        let zoom_out = Rect::from_min_size(rect.right_top() + Vec2::new(-40.0, 45.0), button);
        let locate = Rect::from_min_size(rect.right_top() + Vec2::new(-40.0, 90.0), button);

        if ui.put(zoom_in, egui::Button::new("+")).clicked() {
            self.send(InputEvent::key(KeyCode::Plus));
        }
        if ui.put(zoom_out, egui::Button::new("−")).clicked() {
            self.send(InputEvent::key(KeyCode::Minus));
        }
        let locating = self.map.selection().is_locating();
        let locate_button = ui
            .put(locate, egui::Button::new("◎").selected(locating))
            .on_hover_text("Show my location");
        if locate_button.clicked() && !locating {
            if let Err(e) = self.map.locate() {
                log::warn!("locate failed to start: {}", e);
            }
        }
    }

    fn paint(&mut self, ui: &Ui, rect: Rect) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_rgb(0xe8, 0xec, 0xf0));

        let groups: Vec<MarkerGroup> = self.map.visible_groups(40.0);
        let viewport = self.map.viewport();
        let to_screen = |p: Point| rect.min + Vec2::new(p.x as f32, p.y as f32);

        for group in &groups {
            let at = to_screen(viewport.lat_lng_to_pixel(&group.position()));
            let visual = style(group);
            match &visual.glyph {
                Glyph::Badge {
                    radius,
                    fill,
                    stroke,
                    stroke_width,
                } => {
                    painter.circle(
                        at,
                        *radius,
                        Color32::from(*fill),
                        Stroke::new(*stroke_width, Color32::from(*stroke)),
                    );
                }
                Glyph::Icon { .. } => {
                    // Icons are not fetched; a pin of the icon's drawn height
                    // stands in for the image and matches its hit area
                    let (height, head_radius) = visual.glyph.pin().unwrap_or((0.0, 0.0));
                    let head = at - Vec2::new(0.0, height);
                    painter.line_segment([head, at], Stroke::new(2.0, Color32::from(Rgba::ACCENT)));
                    painter.circle(
                        head,
                        head_radius,
                        Color32::from(Rgba::ACCENT),
                        Stroke::new(2.0, Color32::WHITE),
                    );
                }
            }
            paint_label(&painter, at, &visual.label, visual.is_badge());
        }

        if let Some(marker) = self.map.user_layer().marker() {
            let marker_style = self.map.user_layer().style();
            let at = to_screen(viewport.lat_lng_to_pixel(&marker.position));
            let accuracy = marker.accuracy_radius_px(viewport.resolution()) as f32;
            painter.circle(
                at,
                accuracy,
                Color32::from(marker_style.accuracy_fill),
                Stroke::new(
                    marker_style.accuracy_stroke_width,
                    Color32::from(marker_style.accuracy_stroke),
                ),
            );
            painter.circle(
                at,
                marker_style.radius,
                Color32::from(marker_style.fill),
                Stroke::new(marker_style.stroke_width, Color32::from(marker_style.stroke)),
            );
        }

        if let Some(anchor) = self.map.popup().visible_anchor() {
            let content = &self.map.popup().content;
            let at = to_screen(viewport.lat_lng_to_pixel(&anchor)) - Vec2::new(0.0, 30.0);
            let mut text = format!("{}\n{}", content.title, content.subtitle);
            if let Some(description) = &content.description {
                text.push('\n');
                text.push_str(description);
            }
            let font = FontId::proportional(13.0);
            let text_size = painter
                .layout_no_wrap(text.clone(), font.clone(), Color32::BLACK)
                .size();
            let frame = Rect::from_center_size(
                at - Vec2::new(0.0, text_size.y / 2.0 + 8.0),
                text_size + Vec2::splat(16.0),
            );
            painter.rect(frame, 6.0, Color32::WHITE, Stroke::new(1.0, Color32::GRAY));
            painter.text(frame.center(), Align2::CENTER_CENTER, text, font, Color32::BLACK);
        }

        if self.show_attribution {
            let basemap = self.map.basemap();
            painter.text(
                rect.right_bottom() - Vec2::new(4.0, 4.0),
                Align2::RIGHT_BOTTOM,
                format!("{} | {}", basemap.name, basemap.attribution),
                FontId::proportional(10.0),
                Color32::DARK_GRAY,
            );
        }
    }
}

fn paint_label(painter: &egui::Painter, at: Pos2, label: &Label, centered: bool) {
    let font = FontId::proportional(if centered { 14.0 } else { 12.0 });
    let pos = if centered {
        at
    } else {
        at + Vec2::new(0.0, label.offset_y)
    };

    if let Some(stroke) = label.stroke {
        let halo = Color32::from(stroke);
        let w = label.stroke_width / 2.0;
        for offset in [Vec2::new(-w, 0.0), Vec2::new(w, 0.0), Vec2::new(0.0, -w), Vec2::new(0.0, w)] {
            painter.text(pos + offset, Align2::CENTER_CENTER, &label.text, font.clone(), halo);
        }
    }
    painter.text(pos, Align2::CENTER_CENTER, &label.text, font, Color32::from(label.fill));
}

impl egui::Widget for MapView<'_> {
    fn ui(mut self, ui: &mut Ui) -> Response {
        let desired_size = ui.available_size();
        let (rect, response) = ui.allocate_exact_size(desired_size, Sense::click_and_drag());

        self.handle_input(ui, rect, &response);

        let dt = Duration::from_secs_f32(ui.input(|i| i.stable_dt).clamp(0.0, 0.1));
        let animating = self.map.advance(dt);
        self.map.process_completions();

        if self.map.hovering() {
            ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
        }

        self.paint(ui, rect);
        if self.show_controls {
            self.controls_ui(ui, rect);
        }

        if animating {
            ui.ctx().request_repaint();
        } else if self.map.pending_tasks() > 0 {
            ui.ctx().request_repaint_after(Duration::from_millis(100));
        }
        response
    }
}

pub trait MapWidgetExt {
    fn poi_map(&mut self, map: &mut PoiMap) -> Response;
}

impl MapWidgetExt for Ui {
    fn poi_map(&mut self, map: &mut PoiMap) -> Response {
        self.add(MapView::new(map))
    }
}
