//! Force-driven movement over a backend-simulated rigid body.

use log::{debug, error};
use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::config::MovementConfig;
use crate::constants::{character, physics as consts};
use crate::movement::{
    constrain_input_vector, scale_input_acceleration, MovementComponent, MovementError,
    MovementMode,
};
use crate::port::{CapsuleShape, ObjectId, RigidBodyDesc, SharedQueryPort};

/// Physics-driven character movement: input becomes forces and impulses on
/// a backend-owned dynamic rigid body.
///
/// The backend is the single source of truth for position and velocity;
/// the local copies are a per-frame cache read back after each step. The
/// body is locked to yaw-only rotation and damped so it neither slides nor
/// tumbles like a loose crate.
pub struct PhysicsMovementComponent {
    config: MovementConfig,
    mode: MovementMode,

    position: Point3<f32>,
    velocity: Vector3<f32>,
    yaw: f32,

    radius: f32,
    height: f32,

    mass: f32,
    friction: f32,
    restitution: f32,
    linear_damping: f32,
    angular_damping: f32,

    jumping: bool,

    accumulated_input: Vector3<f32>,
    accumulated_forces: Vector3<f32>,
    accumulated_impulses: Vector3<f32>,

    port: Option<SharedQueryPort>,
    body: Option<ObjectId>,
}

impl PhysicsMovementComponent {
    pub fn new() -> Self {
        Self {
            config: MovementConfig::default(),
            mode: MovementMode::Walking,
            position: Point3::new(0.0, character::DEFAULT_CENTER_Y, 0.0),
            velocity: Vector3::zeros(),
            yaw: 0.0,
            radius: character::DEFAULT_RADIUS,
            height: character::DEFAULT_HEIGHT,
            mass: consts::MASS,
            friction: consts::FRICTION,
            restitution: consts::RESTITUTION,
            linear_damping: consts::LINEAR_DAMPING,
            angular_damping: consts::ANGULAR_DAMPING,
            jumping: false,
            accumulated_input: Vector3::zeros(),
            accumulated_forces: Vector3::zeros(),
            accumulated_impulses: Vector3::zeros(),
            port: None,
            body: None,
        }
    }

    /// Takes effect on the next initialize; the body is not rebuilt live.
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass;
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction;
    }

    pub fn set_restitution(&mut self, restitution: f32) {
        self.restitution = restitution;
    }

    pub fn set_linear_damping(&mut self, damping: f32) {
        self.linear_damping = damping;
        if let (Some(port), Some(body)) = (&self.port, self.body) {
            port.borrow_mut().set_linear_damping(body, damping);
        }
    }

    pub fn set_angular_damping(&mut self, damping: f32) {
        self.angular_damping = damping;
        if let (Some(port), Some(body)) = (&self.port, self.body) {
            port.borrow_mut().set_angular_damping(body, damping);
        }
    }

    fn yaw_rotation(&self) -> UnitQuaternion<f32> {
        UnitQuaternion::from_euler_angles(0.0, self.yaw.to_radians(), 0.0)
    }

    fn create_rigid_body(&mut self) -> Result<(), MovementError> {
        let Some(port) = self.port.clone() else {
            return Err(MovementError::QueryPortRequired("PhysicsMovementComponent"));
        };
        if self.body.is_some() {
            return Ok(());
        }

        let desc = RigidBodyDesc {
            position: self.position,
            rotation: UnitQuaternion::identity(),
            velocity: self.velocity,
            mass: self.mass,
            friction: self.friction,
            restitution: self.restitution,
            linear_damping: self.linear_damping,
            angular_damping: self.angular_damping,
        };
        let shape = CapsuleShape {
            radius: self.radius,
            height: self.height,
        };

        let mut port = port.borrow_mut();
        let Some(body) = port.create_rigid_body(&desc, shape) else {
            error!("failed to create rigid body for physics movement component");
            return Err(MovementError::ResourceCreation("character rigid body"));
        };

        // Keep the character upright: yaw rotation only, heavy damping.
        port.set_angular_factor(body, Vector3::new(0.0, 1.0, 0.0));
        port.set_linear_damping(body, self.linear_damping);
        port.set_angular_damping(body, self.angular_damping);

        self.body = Some(body);
        Ok(())
    }

    fn destroy_rigid_body(&mut self) {
        if let (Some(port), Some(body)) = (&self.port, self.body.take()) {
            port.borrow_mut().destroy_rigid_body(body);
        }
    }

    fn process_movement_input(&mut self, input: Vector3<f32>) {
        if input.norm() > 0.0 {
            let direction = input.normalize();
            let force = scale_input_acceleration(
                direction * self.config.max_acceleration * self.mass,
                self.mode,
                self.config.air_control,
            );
            self.accumulated_forces += force;
        } else if self.is_grounded() {
            // Braking force opposing current horizontal velocity
            let horizontal = Vector3::new(self.velocity.x, 0.0, self.velocity.z);
            let speed = horizontal.norm();
            if speed > consts::BRAKING_SPEED_THRESHOLD {
                self.accumulated_forces +=
                    -horizontal.normalize() * self.config.braking_deceleration * self.mass;
            }
        }
    }

    fn apply_movement_forces(&mut self) {
        let (Some(port), Some(body)) = (&self.port, self.body) else {
            return;
        };
        let mut port = port.borrow_mut();
        if self.accumulated_forces.norm() > consts::FORCE_EPSILON {
            port.apply_force(body, self.accumulated_forces);
        }
        if self.accumulated_impulses.norm() > consts::FORCE_EPSILON {
            port.apply_impulse(body, self.accumulated_impulses);
        }
    }

    fn update_physics_state(&mut self) {
        let (Some(port), Some(body)) = (&self.port, self.body) else {
            return;
        };

        {
            let port = port.borrow();
            if let Some((position, _rotation)) = port.rigid_body_transform(body) {
                self.position = position;
            }
            if let Some((linear, _angular)) = port.rigid_body_velocity(body) {
                self.velocity = linear;
            }
        }

        let was_grounded = self.mode == MovementMode::Walking;
        let grounded = self.is_grounded();
        if grounded && !was_grounded {
            self.mode = MovementMode::Walking;
            self.jumping = false;
            debug!("physics movement: landed");
        } else if !grounded && was_grounded {
            self.mode = MovementMode::Falling;
            debug!("physics movement: airborne");
        }
    }
}

impl Default for PhysicsMovementComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl MovementComponent for PhysicsMovementComponent {
    fn initialize(&mut self, port: Option<SharedQueryPort>) -> Result<(), MovementError> {
        let Some(port) = port else {
            error!("physics movement component requires a collision query port");
            return Err(MovementError::QueryPortRequired("PhysicsMovementComponent"));
        };
        self.port = Some(port);
        self.create_rigid_body()?;
        debug!("physics movement component initialized");
        Ok(())
    }

    fn update(&mut self, _delta_time: f32) {
        let input = std::mem::replace(&mut self.accumulated_input, Vector3::zeros());

        self.process_movement_input(input);
        self.apply_movement_forces();
        self.accumulated_forces = Vector3::zeros();
        self.accumulated_impulses = Vector3::zeros();

        self.update_physics_state();
    }

    fn shutdown(&mut self) {
        self.destroy_rigid_body();
        self.port = None;
    }

    fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
        if let (Some(port), Some(body)) = (&self.port, self.body) {
            port.borrow_mut()
                .set_rigid_body_transform(body, position, self.yaw_rotation());
        }
    }

    fn position(&self) -> Point3<f32> {
        self.position
    }

    fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
        if let (Some(port), Some(body)) = (&self.port, self.body) {
            port.borrow_mut()
                .set_rigid_body_transform(body, self.position, self.yaw_rotation());
        }
    }

    fn yaw(&self) -> f32 {
        self.yaw
    }

    fn velocity(&self) -> Vector3<f32> {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vector3<f32>) {
        // A dynamic body's velocity cannot be set instantaneously; the cache
        // is updated and the next frame's read-back wins. Use add_velocity
        // to change the simulated velocity through an impulse.
        self.velocity = velocity;
    }

    fn add_velocity(&mut self, delta_velocity: Vector3<f32>) {
        // impulse = mass * delta-v
        self.accumulated_impulses += delta_velocity * self.mass;
    }

    fn movement_mode(&self) -> MovementMode {
        self.mode
    }

    fn is_grounded(&self) -> bool {
        let (Some(port), Some(body)) = (&self.port, self.body) else {
            return false;
        };
        port.borrow_mut()
            .is_rigid_body_grounded(body, consts::GROUNDED_CHECK_DISTANCE)
    }

    fn is_jumping(&self) -> bool {
        self.jumping
    }

    fn is_falling(&self) -> bool {
        !self.is_grounded() && self.velocity.y < 0.0
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
        if !self.config.can_jump || !self.is_grounded() {
            return;
        }
        // One-shot upward impulse; velocity cannot be set directly on a
        // dynamic body.
        let impulse = Vector3::new(0.0, self.mass * self.config.jump_z_velocity, 0.0);
        self.accumulated_impulses += impulse;
        self.jumping = true;
        debug!("physics movement: jump impulse {}", impulse.y);
    }

    fn stop_jumping(&mut self) {
        // Physics jumps are one-shot impulses; nothing to cancel.
    }

    fn add_movement_input(&mut self, world_direction: Vector3<f32>, scale: f32) {
        self.accumulated_input += constrain_input_vector(world_direction * scale);
    }

    fn type_name(&self) -> &'static str {
        "PhysicsMovementComponent"
    }
}

impl Drop for PhysicsMovementComponent {
    fn drop(&mut self) {
        self.destroy_rigid_body();
    }
}
