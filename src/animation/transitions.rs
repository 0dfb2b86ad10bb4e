use crate::core::geo::{LatLng, Point};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Easing curves applied to normalized animation progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EasingType {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Smooth,
}

impl EasingType {
    /// Apply easing function to a normalized time value (0.0 to 1.0)
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingType::Linear => t,
            EasingType::EaseIn => t * t * t,
            EasingType::EaseOut => {
                let t = t - 1.0;
                t * t * t + 1.0
            }
            EasingType::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            // Smooth step (3t^2 - 2t^3)
            EasingType::Smooth => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Center and zoom at one instant of a transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewFrame {
    pub center: LatLng,
    pub zoom: f64,
    pub done: bool,
}

/// An eased move of the viewport from one center/zoom to another.
///
/// Time is supplied by the caller through [`ViewTransition::advance`], so the
/// same transition replays identically in tests and in a frame loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTransition {
    from_world: Point,
    to_world: Point,
    from_zoom: f64,
    to_zoom: f64,
    duration: Duration,
    elapsed: Duration,
    easing: EasingType,
}

impl ViewTransition {
    pub fn new(
        from_center: LatLng,
        from_zoom: f64,
        to_center: LatLng,
        to_zoom: f64,
        duration: Duration,
        easing: EasingType,
    ) -> Self {
        Self {
            from_world: from_center.to_world(),
            to_world: to_center.to_world(),
            from_zoom,
            to_zoom,
            duration,
            elapsed: Duration::ZERO,
            easing,
        }
    }

    /// Final center of the transition
    pub fn target_center(&self) -> LatLng {
        LatLng::from_world(self.to_world)
    }

    /// Final zoom of the transition
    pub fn target_zoom(&self) -> f64 {
        self.to_zoom
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Moves the clock forward by `dt` and returns the frame to display
    pub fn advance(&mut self, dt: Duration) -> ViewFrame {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.frame()
    }

    /// Jumps to the end of the transition
    pub fn finish(&mut self) -> ViewFrame {
        self.elapsed = self.duration;
        self.frame()
    }

    fn frame(&self) -> ViewFrame {
        if self.is_finished() {
            return ViewFrame {
                center: self.target_center(),
                zoom: self.to_zoom,
                done: true,
            };
        }

        let progress = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let t = self.easing.apply(progress);
        let world = self
            .from_world
            .add(&self.to_world.subtract(&self.from_world).multiply(t));

        ViewFrame {
            center: LatLng::from_world(world),
            zoom: self.from_zoom + (self.to_zoom - self.from_zoom) * t,
            done: false,
        }
    }
}
