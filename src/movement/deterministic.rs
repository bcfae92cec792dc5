//! Closed-form kinematic movement with no backend dependency.

use log::debug;
use nalgebra::{Point3, Vector3};

use crate::config::MovementConfig;
use crate::constants::{character, deterministic as consts};
use crate::movement::{
    constrain_input_vector, scale_input_acceleration, MovementComponent, MovementError,
    MovementMode,
};
use crate::port::SharedQueryPort;

/// Deterministic character movement: a pure closed-form integrator against
/// a fixed ground plane.
///
/// The defining guarantee is reproducibility: identical input sequences and
/// delta times produce bit-for-bit identical trajectories, because nothing
/// here consults the (optional, unused) query port or any other
/// non-deterministic source.
pub struct DeterministicMovementComponent {
    config: MovementConfig,
    mode: MovementMode,

    position: Point3<f32>,
    velocity: Vector3<f32>,
    yaw: f32,

    radius: f32,
    height: f32,

    grounded: bool,
    jumping: bool,

    accumulated_input: Vector3<f32>,

    /// Character center height when resting on the ground plane
    ground_level: f32,

    // Held only so strategy switches can hand the port onward; never queried.
    port: Option<SharedQueryPort>,
}

impl DeterministicMovementComponent {
    pub fn new() -> Self {
        Self {
            config: MovementConfig::default(),
            mode: MovementMode::Walking,
            position: Point3::new(0.0, character::DEFAULT_CENTER_Y, 0.0),
            velocity: Vector3::zeros(),
            yaw: 0.0,
            radius: character::DEFAULT_RADIUS,
            height: character::DEFAULT_HEIGHT,
            grounded: true,
            jumping: false,
            accumulated_input: Vector3::zeros(),
            ground_level: character::DEFAULT_CENTER_Y,
            port: None,
        }
    }

    /// Sets the character center height that counts as resting on ground.
    pub fn set_ground_level(&mut self, ground_level: f32) {
        self.ground_level = ground_level;
    }

    pub fn ground_level(&self) -> f32 {
        self.ground_level
    }

    fn process_movement_input(&mut self, input: Vector3<f32>, dt: f32) {
        if input.norm() < consts::INPUT_EPSILON {
            return;
        }
        let direction = input.normalize();

        let base = if self.grounded {
            consts::GROUND_ACCELERATION
        } else {
            consts::AIR_ACCELERATION
        };
        let acceleration = scale_input_acceleration(
            direction * base * dt,
            self.mode,
            self.config.air_control,
        );

        let new_horizontal = Vector3::new(
            self.velocity.x + acceleration.x,
            0.0,
            self.velocity.z + acceleration.z,
        );
        let speed = new_horizontal.norm();
        let limited = if speed > self.config.max_walk_speed {
            new_horizontal * (self.config.max_walk_speed / speed)
        } else {
            new_horizontal
        };
        self.velocity.x = limited.x;
        self.velocity.z = limited.z;
    }

    fn apply_gravity(&mut self, dt: f32) {
        if !self.grounded {
            self.velocity.y += consts::GRAVITY * self.config.gravity_scale * dt;
        }
    }

    fn check_ground_collision(&mut self) {
        let rest_height = self.ground_level;
        let within_bounds = self.position.x >= -consts::GROUND_HALF_EXTENT
            && self.position.x <= consts::GROUND_HALF_EXTENT
            && self.position.z >= -consts::GROUND_HALF_EXTENT
            && self.position.z <= consts::GROUND_HALF_EXTENT;

        if within_bounds && self.position.y <= rest_height && self.velocity.y <= 0.0 {
            self.position.y = rest_height;
            self.velocity.y = 0.0;
            if !self.grounded {
                self.grounded = true;
                self.jumping = false;
                self.mode = MovementMode::Walking;
                debug!("deterministic movement: landed at y={}", self.position.y);
            }
        } else if !within_bounds || self.position.y > rest_height + consts::LANDING_HYSTERESIS {
            if self.grounded {
                self.grounded = false;
                self.mode = MovementMode::Falling;
                debug!("deterministic movement: airborne at y={}", self.position.y);
            }
        }
        // Inside the hysteresis band and within bounds: keep current state.
    }

    fn apply_friction(&mut self, had_input: bool, dt: f32) {
        let horizontal = Vector3::new(self.velocity.x, 0.0, self.velocity.z);
        let speed = horizontal.norm();

        if self.grounded {
            if speed > consts::MIN_SPEED_THRESHOLD {
                let effective = if had_input {
                    consts::FRICTION
                } else {
                    consts::BRAKING_FRICTION
                };
                let friction_force = effective * dt;
                if speed > friction_force {
                    let decel = -horizontal.normalize() * friction_force;
                    self.velocity.x += decel.x;
                    self.velocity.z += decel.z;
                } else {
                    // Multiplicative stop, never overshooting past zero
                    let stop_factor = (1.0 - friction_force / speed).max(0.0);
                    self.velocity.x *= stop_factor;
                    self.velocity.z *= stop_factor;
                }
            } else {
                self.velocity.x = 0.0;
                self.velocity.z = 0.0;
            }
        } else if speed > 0.0 {
            let air_resistance = consts::AIR_FRICTION * dt;
            if speed > air_resistance {
                let decel = -horizontal.normalize() * air_resistance;
                self.velocity.x += decel.x;
                self.velocity.z += decel.z;
            } else {
                let stop_factor = (1.0 - air_resistance / speed).max(0.0);
                self.velocity.x *= stop_factor;
                self.velocity.z *= stop_factor;
            }
        }
    }
}

impl Default for DeterministicMovementComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl MovementComponent for DeterministicMovementComponent {
    fn initialize(&mut self, port: Option<SharedQueryPort>) -> Result<(), MovementError> {
        // A query port is optional here and never consulted.
        self.port = port;
        debug!("deterministic movement component initialized");
        Ok(())
    }

    fn update(&mut self, delta_time: f32) {
        let input = std::mem::replace(&mut self.accumulated_input, Vector3::zeros());
        let had_input = input.norm() > 0.0;

        self.process_movement_input(input, delta_time);
        self.apply_gravity(delta_time);
        self.position += self.velocity * delta_time;
        self.check_ground_collision();
        self.apply_friction(had_input, delta_time);
    }

    fn shutdown(&mut self) {
        self.port = None;
    }

    fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
    }

    fn position(&self) -> Point3<f32> {
        self.position
    }

    fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
    }

    fn yaw(&self) -> f32 {
        self.yaw
    }

    fn velocity(&self) -> Vector3<f32> {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vector3<f32>) {
        self.velocity = velocity;
    }

    fn add_velocity(&mut self, delta_velocity: Vector3<f32>) {
        self.velocity += delta_velocity;
    }

    fn movement_mode(&self) -> MovementMode {
        self.mode
    }

    fn is_grounded(&self) -> bool {
        self.grounded
    }

    fn is_jumping(&self) -> bool {
        self.jumping
    }

    fn is_falling(&self) -> bool {
        !self.grounded && self.velocity.y < 0.0
    }

    fn config(&self) -> &MovementConfig {
        &self.config
    }

    fn set_config(&mut self, config: MovementConfig) {
        self.config = config;
    }

    fn set_character_size(&mut self, radius: f32, height: f32) {
        self.radius = radius;
        self.height = height;
    }

    fn character_radius(&self) -> f32 {
        self.radius
    }

    fn character_height(&self) -> f32 {
        self.height
    }

    fn jump(&mut self) {
        if !self.config.can_jump || !self.grounded {
            return;
        }
        self.velocity.y = self.config.jump_z_velocity;
        self.grounded = false;
        self.jumping = true;
        self.mode = MovementMode::Falling;
        debug!(
            "deterministic movement: jumping with velocity {}",
            self.config.jump_z_velocity
        );
    }

    fn stop_jumping(&mut self) {
        // Jump commands apply at call time; there is no buffered request to clear.
    }

    fn add_movement_input(&mut self, world_direction: Vector3<f32>, scale: f32) {
        self.accumulated_input += constrain_input_vector(world_direction * scale);
    }

    fn type_name(&self) -> &'static str {
        "DeterministicMovementComponent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_starts_grounded_at_rest_height() {
        let component = DeterministicMovementComponent::new();
        assert!(component.is_grounded());
        assert_eq!(component.position().y, 0.9);
        assert_eq!(component.velocity(), Vector3::zeros());
    }

    #[test]
    fn test_input_accelerates_toward_max_walk_speed() {
        let mut component = DeterministicMovementComponent::new();
        component.initialize(None).unwrap();

        for _ in 0..120 {
            component.add_movement_input(Vector3::new(1.0, 0.0, 0.0), 1.0);
            component.update(DT);
        }

        let speed = component.velocity().xz().norm();
        assert!(speed > 0.0, "character should be moving");
        assert!(
            speed <= component.config().max_walk_speed + 1e-4,
            "speed {} must not exceed max walk speed",
            speed
        );
        assert!(component.position().x > 0.5);
    }

    #[test]
    fn test_braking_friction_stops_character() {
        let mut component = DeterministicMovementComponent::new();
        component.initialize(None).unwrap();

        for _ in 0..60 {
            component.add_movement_input(Vector3::new(1.0, 0.0, 0.0), 1.0);
            component.update(DT);
        }
        // Release input; braking friction takes over.
        for _ in 0..120 {
            component.update(DT);
        }

        assert!(
            component.velocity().xz().norm() < 1e-3,
            "character should stop without input"
        );
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let mut component = DeterministicMovementComponent::new();
        component.initialize(None).unwrap();

        component.jump();
        assert!(component.is_jumping());
        assert_eq!(component.velocity().y, component.config().jump_z_velocity);
        assert_eq!(component.movement_mode(), MovementMode::Falling);

        let airborne_velocity = component.velocity();
        component.jump(); // Airborne: must have no effect
        assert_eq!(component.velocity(), airborne_velocity);
    }

    #[test]
    fn test_jump_disabled_by_config() {
        let mut component = DeterministicMovementComponent::new();
        let mut config = MovementConfig::default();
        config.can_jump = false;
        component.set_config(config);

        component.jump();
        assert!(!component.is_jumping());
        assert_eq!(component.velocity().y, 0.0);
    }

    #[test]
    fn test_jump_arc_returns_to_ground() {
        let mut component = DeterministicMovementComponent::new();
        component.initialize(None).unwrap();

        component.jump();
        // jump_z=10, gravity=-15: apex at 2/3 s, landing at ~4/3 s
        for _ in 0..80 {
            component.update(DT);
        }

        assert!(component.is_grounded(), "should have landed by 1.33s");
        assert!(component.velocity().y.abs() < 1e-4);
        assert!((component.position().y - 0.9).abs() < 1e-4);
        assert!(!component.is_jumping());
    }

    #[test]
    fn test_walks_off_ground_plane_and_falls() {
        let mut component = DeterministicMovementComponent::new();
        component.initialize(None).unwrap();
        component.set_position(Point3::new(49.9, 0.9, 0.0));

        for _ in 0..120 {
            component.add_movement_input(Vector3::new(1.0, 0.0, 0.0), 1.0);
            component.update(DT);
        }

        assert!(component.position().x > 50.0);
        assert!(!component.is_grounded(), "outside the plane means airborne");
        assert_eq!(component.movement_mode(), MovementMode::Falling);
        assert!(component.velocity().y < 0.0);
        assert!(component.is_falling());
    }

    #[test]
    fn test_identical_runs_produce_identical_trajectories() {
        let run = || {
            let mut component = DeterministicMovementComponent::new();
            component.initialize(None).unwrap();
            for frame in 0..200 {
                if frame == 30 {
                    component.jump();
                }
                if frame % 3 != 0 {
                    component.add_movement_input(Vector3::new(0.7, 0.0, -0.3), 1.0);
                }
                component.update(DT);
            }
            (component.position(), component.velocity())
        };

        let (pos_a, vel_a) = run();
        let (pos_b, vel_b) = run();
        // Bit-for-bit equality, not epsilon comparison
        assert_eq!(pos_a, pos_b);
        assert_eq!(vel_a, vel_b);
    }

    #[test]
    fn test_falling_iff_airborne_and_descending() {
        let mut component = DeterministicMovementComponent::new();
        component.initialize(None).unwrap();
        component.jump();

        for _ in 0..80 {
            component.update(DT);
            let falling = component.is_falling();
            let expected = !component.is_grounded() && component.velocity().y < 0.0;
            assert_eq!(falling, expected);
        }
    }

    #[test]
    fn test_character_size_stored_verbatim() {
        let mut component = DeterministicMovementComponent::new();
        component.set_character_size(-0.5, -2.0);
        assert_eq!(component.character_radius(), -0.5);
        assert_eq!(component.character_height(), -2.0);
    }
}
