use crate::{
    core::map::PoiMap,
    data::location::LocationId,
    ui::panel::PanelEvent,
};
use egui::{Response, Ui};

/// Side panel widget: search box, category picker, location list and
/// basemap switcher. State lives in the map's [`Panel`](crate::ui::panel::Panel).
pub struct Sidebar<'a> {
    map: &'a mut PoiMap,
}

impl<'a> Sidebar<'a> {
    pub fn new(map: &'a mut PoiMap) -> Self {
        Self { map }
    }

    fn search_ui(&mut self, ui: &mut Ui) -> Option<PanelEvent> {
        let mut submit = false;
        ui.horizontal(|ui| {
            let edit = ui.text_edit_singleline(self.map.panel_mut().query_mut());
            submit |= edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            submit |= ui.button("Search").clicked();
        });
        if submit {
            self.map.panel().submit_search()
        } else {
            None
        }
    }

    fn category_ui(&mut self, ui: &mut Ui) {
        let labels = self.map.panel().categories(self.map.catalog());
        let current = labels
            .iter()
            .find(|label| self.map.panel().filter().is_label(label))
            .cloned()
            .unwrap_or_default();

        let mut chosen = None;
        egui::ComboBox::from_label("Category")
            .selected_text(current.as_str())
            .show_ui(ui, |ui| {
                for label in &labels {
                    if ui.selectable_label(*label == current, label).clicked() {
                        chosen = Some(label.clone());
                    }
                }
            });
        if let Some(label) = chosen {
            self.map.panel_mut().set_category(&label);
        }
    }

    fn list_ui(&mut self, ui: &mut Ui) -> Option<PanelEvent> {
        let selected = self.map.selection().selected_id();
        let rows: Vec<(LocationId, String, String)> = self
            .map
            .panel()
            .visible_locations(self.map.catalog())
            .into_iter()
            .map(|l| (l.id, l.name.clone(), l.category.clone()))
            .collect();

        let mut event = None;
        egui::ScrollArea::vertical()
            .max_height(ui.available_height() - 80.0)
            .show(ui, |ui| {
                for (id, name, category) in rows {
                    let row = ui
                        .selectable_label(selected == Some(id), name)
                        .on_hover_text(category);
                    if row.clicked() {
                        event = Some(self.map.panel().select(id));
                    }
                }
            });
        event
    }

    fn basemap_ui(&mut self, ui: &mut Ui) {
        let active = self.map.basemap().name.clone();
        let names: Vec<String> = self.map.basemaps().names().into_iter().map(String::from).collect();

        ui.horizontal(|ui| {
            for name in names {
                if ui.radio(name == active, name.as_str()).clicked() {
                    if let Err(e) = self.map.set_basemap(&name) {
                        log::warn!("basemap switch failed: {}", e);
                    }
                }
            }
        });
    }

    pub fn show(mut self, ui: &mut Ui) -> Response {
        ui.vertical(|ui| {
            ui.heading("Places");
            let mut events = Vec::new();
            events.extend(self.search_ui(ui));
            self.category_ui(ui);
            ui.separator();
            events.extend(self.list_ui(ui));
            ui.separator();
            self.basemap_ui(ui);

            for event in events {
                if let Err(e) = self.map.handle_panel_event(event) {
                    log::warn!("panel action failed: {}", e);
                }
            }
        })
        .response
    }
}
