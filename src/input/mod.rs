pub mod controller;
pub mod events;
pub mod selection;

// Re-export the essential types
pub use controller::{InteractionController, LocateCallback, ViewCommand};
pub use events::{InputEvent, KeyCode, KeyModifiers, MapEvent, MouseButton, Notice, NoticeKind};
pub use selection::{SelectionState, UserFix};
