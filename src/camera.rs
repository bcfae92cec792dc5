//! Camera-relative movement basis.

use nalgebra::Vector3;

/// Minimal camera state the movement layer cares about: yaw and pitch in
/// degrees. Movement input is resolved against the camera's horizontal
/// basis so "forward" always means "away from the camera".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraRig {
    pub yaw: f32,
    pub pitch: f32,
}

impl CameraRig {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }

    /// Horizontal forward vector for the current yaw. Pitch is ignored so
    /// looking down never slows walking.
    pub fn forward(&self) -> Vector3<f32> {
        let yaw = self.yaw.to_radians();
        Vector3::new(yaw.sin(), 0.0, yaw.cos())
    }

    /// Horizontal right vector, `forward x up`.
    pub fn right(&self) -> Vector3<f32> {
        let forward = self.forward();
        Vector3::new(-forward.z, 0.0, forward.x)
    }

    /// Combines the input axes into a world-space direction. Returns `None`
    /// for a dead-zone frame.
    pub fn movement_direction(&self, forward_axis: f32, right_axis: f32) -> Option<Vector3<f32>> {
        let direction = self.forward() * forward_axis + self.right() * right_axis;
        if direction.norm() > 0.0 {
            Some(direction.normalize())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_yaw_faces_positive_z() {
        let rig = CameraRig::new(0.0, 0.0);
        let forward = rig.forward();
        assert!((forward - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-6);
        let right = rig.right();
        assert!((right - Vector3::new(-1.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_yaw_rotates_basis() {
        let rig = CameraRig::new(90.0, 0.0);
        assert!((rig.forward() - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-6);
        assert!((rig.right() - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_pitch_never_leaks_into_movement() {
        let level = CameraRig::new(30.0, 0.0);
        let looking_down = CameraRig::new(30.0, -80.0);
        assert_eq!(level.forward(), looking_down.forward());
    }

    #[test]
    fn test_movement_direction_normalized() {
        let rig = CameraRig::new(45.0, 0.0);
        let direction = rig.movement_direction(1.0, 1.0).unwrap();
        assert!((direction.norm() - 1.0).abs() < 1e-6);
        assert_eq!(direction.y, 0.0);
    }

    #[test]
    fn test_dead_zone_yields_none() {
        assert!(CameraRig::new(10.0, 0.0).movement_direction(0.0, 0.0).is_none());
    }
}
