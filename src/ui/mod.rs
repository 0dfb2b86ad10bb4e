pub mod panel;
pub mod popup;

#[cfg(feature = "egui")]
pub mod sidebar;
#[cfg(feature = "egui")]
pub mod widget;

pub use panel::{CategoryFilter, Panel, PanelEvent};
pub use popup::{Popup, PopupContent};

#[cfg(feature = "egui")]
pub use sidebar::Sidebar;
#[cfg(feature = "egui")]
pub use widget::{MapView, MapWidgetExt};
