//! Viewport animation: easing curves and center/zoom transitions.

pub mod transitions;

pub use transitions::{EasingType, ViewFrame, ViewTransition};
