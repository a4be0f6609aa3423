//! Horizontal camera pan with first-order easing

const EASE_RATE: f32 = 0.1;
const SETTLE_EPSILON: f32 = 0.5;

#[derive(Debug, Clone, Default)]
pub struct Camera {
    x: f32,
    target_x: f32,
    moving: bool,
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn target_x(&self) -> f32 {
        self.target_x
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn pan_by(&mut self, delta: f32) {
        self.set_target(self.target_x + delta);
    }

    pub fn reset(&mut self) {
        self.set_target(0.0);
    }

    pub fn set_target(&mut self, target: f32) {
        self.target_x = target;
        self.moving = true;
    }

    /// One easing step; snaps and settles once within epsilon
    pub fn update(&mut self) {
        if !self.moving {
            return;
        }
        let diff = self.target_x - self.x;
        if diff.abs() < SETTLE_EPSILON {
            self.x = self.target_x;
            self.moving = false;
        } else {
            self.x += diff * EASE_RATE;
        }
    }
}
