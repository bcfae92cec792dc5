//! Per-frame input snapshot fed to the character controller.

use nalgebra::Vector3;

/// Raw movement intent for one frame, in the character's local terms:
/// forward/right axes in [-1, 1] plus jump edges.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    /// Forward (+) / backward (-) axis
    pub move_forward: f32,
    /// Right (+) / left (-) axis
    pub move_right: f32,
    /// Jump was pressed this frame
    pub jump_pressed: bool,
    /// Jump is still held (used to cut short variable-height jumps)
    pub jump_held: bool,
}

impl InputFrame {
    pub fn new(move_forward: f32, move_right: f32) -> Self {
        Self {
            move_forward,
            move_right,
            jump_pressed: false,
            jump_held: false,
        }
    }

    pub fn with_jump(mut self) -> Self {
        self.jump_pressed = true;
        self.jump_held = true;
        self
    }

    /// World-space direction when no camera is available: world -Z is
    /// forward, +X is right. Returns `None` for a dead-zone frame.
    pub fn world_direction(&self) -> Option<Vector3<f32>> {
        let direction = Vector3::new(self.move_right, 0.0, -self.move_forward);
        if direction.norm() > 0.0 {
            Some(direction.normalize())
        } else {
            None
        }
    }
}
