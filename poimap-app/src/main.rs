use anyhow::Context;
use poimap::{
    runtime::spawners::TokioSpawner,
    ui::{MapView, Sidebar},
    MapBuilder, MapConfig, MapEvent, Notice, PoiMap,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long a notice stays on screen
const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Standalone POI map viewer.
///
/// Usage: `poimap-app [config.json]`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading configuration from {}", path);
            MapConfig::from_file(&path)
                .with_context(|| format!("reading configuration {}", path))?
        }
        None => MapConfig::default(),
    };

    let map = MapBuilder::new()
        .with_config(config)
        .with_spawner(Arc::new(TokioSpawner::with_handle(
            tokio::runtime::Handle::current(),
        )))
        .on_locate(|pos| log::info!("user located at {:.5}, {:.5}", pos.lat, pos.lng))
        .build()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("POI Map"),
        ..Default::default()
    };

    eframe::run_native(
        "poimap-app",
        options,
        Box::new(|_cc| Box::new(PoiMapApp::new(map))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {}", e))?;

    Ok(())
}

/// The main application struct
struct PoiMapApp {
    map: PoiMap,
    notice: Option<(Notice, Instant)>,
    show_sidebar: bool,
}

impl PoiMapApp {
    fn new(map: PoiMap) -> Self {
        Self {
            map,
            notice: None,
            show_sidebar: true,
        }
    }

    fn pump_events(&mut self) {
        for event in self.map.drain_events() {
            match event {
                MapEvent::Notice(notice) => {
                    log::info!("notice: {}", notice);
                    self.notice = Some((notice, Instant::now()));
                }
                other => log::debug!("{:?}", other),
            }
        }
        if matches!(&self.notice, Some((_, shown)) if shown.elapsed() > NOTICE_TTL) {
            self.notice = None;
        }
    }
}

impl eframe::App for PoiMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.show_sidebar, "Sidebar");
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let viewport = self.map.viewport();
                    ui.label(format!(
                        "Center: {:.4}, {:.4} | Zoom: {:.2}",
                        viewport.center.lat, viewport.center.lng, viewport.zoom
                    ));
                });
            });
        });

        if let Some((notice, _)) = &self.notice {
            egui::TopBottomPanel::bottom("notice_panel").show(ctx, |ui| {
                ui.colored_label(egui::Color32::from_rgb(0xb9, 0x1c, 0x1c), &notice.message);
            });
        }

        if self.show_sidebar {
            egui::SidePanel::left("sidebar")
                .resizable(true)
                .default_width(260.0)
                .show(ctx, |ui| {
                    Sidebar::new(&mut self.map).show(ui);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add(MapView::new(&mut self.map));
        });

        self.pump_events();
        if self.notice.is_some() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}
