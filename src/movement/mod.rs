//! Movement strategies and the shared component contract.

pub mod deterministic;
pub mod factory;
pub mod hybrid;
pub mod physics;

pub use deterministic::DeterministicMovementComponent;
pub use factory::{MovementComponentFactory, MovementStrategy};
pub use hybrid::HybridMovementComponent;
pub use physics::PhysicsMovementComponent;

use nalgebra::{Point3, Vector3};

use crate::config::MovementConfig;
use crate::port::SharedQueryPort;

/// Movement mode: the single source of truth for whether a character is
/// currently governed by ground rules or air rules. Transitions happen only
/// through ground-detection logic, never arbitrarily.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementMode {
    /// Standard ground-based movement
    Walking,
    /// Airborne movement with gravity
    Falling,
    /// Free-form movement without gravity
    Flying,
    /// Water-based movement (future)
    Swimming,
    /// Custom movement mode
    Custom,
}

/// Errors surfaced by movement component lifecycle operations
#[derive(Debug)]
pub enum MovementError {
    /// The strategy requires a collision query port and none was supplied
    QueryPortRequired(&'static str),
    /// The backend failed to create a required resource
    ResourceCreation(&'static str),
}

impl std::fmt::Display for MovementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovementError::QueryPortRequired(component) => {
                write!(f, "{component} requires a collision query port")
            }
            MovementError::ResourceCreation(what) => {
                write!(f, "Failed to create backend resource: {what}")
            }
        }
    }
}

impl std::error::Error for MovementError {}

/// The polymorphic movement contract implemented by all three strategies.
///
/// Callers accumulate input through [`add_movement_input`] and
/// [`jump`] between frames; each [`update`] consumes exactly the input
/// accumulated since the previous one.
///
/// [`add_movement_input`]: MovementComponent::add_movement_input
/// [`jump`]: MovementComponent::jump
/// [`update`]: MovementComponent::update
pub trait MovementComponent {
    /// Acquires backend resources. Must not be followed by `update` calls
    /// if it fails. Safe to call more than once.
    fn initialize(&mut self, port: Option<SharedQueryPort>) -> Result<(), MovementError>;

    /// Advances the character one frame.
    fn update(&mut self, delta_time: f32);

    /// Releases backend resources synchronously. A no-op when nothing was
    /// initialized.
    fn shutdown(&mut self);

    // Transform
    fn set_position(&mut self, position: Point3<f32>);
    fn position(&self) -> Point3<f32>;
    /// Yaw in degrees; pitch and roll are locked for upright characters.
    fn set_yaw(&mut self, yaw: f32);
    fn yaw(&self) -> f32;

    // Velocity
    fn velocity(&self) -> Vector3<f32>;
    fn set_velocity(&mut self, velocity: Vector3<f32>);
    fn add_velocity(&mut self, delta_velocity: Vector3<f32>);

    // Movement state
    fn movement_mode(&self) -> MovementMode;
    fn is_grounded(&self) -> bool;
    fn is_jumping(&self) -> bool;
    fn is_falling(&self) -> bool;

    // Configuration
    fn config(&self) -> &MovementConfig;
    fn set_config(&mut self, config: MovementConfig);
    /// Stores the capsule dimensions verbatim; no validation is performed.
    fn set_character_size(&mut self, radius: f32, height: f32);
    fn character_radius(&self) -> f32;
    fn character_height(&self) -> f32;

    // Movement commands
    /// Jumps if grounded and permitted by config; otherwise has no effect.
    fn jump(&mut self);
    fn stop_jumping(&mut self);
    /// Accumulates a world-space movement direction into the per-frame
    /// input vector, constrained so its magnitude never exceeds 1.
    fn add_movement_input(&mut self, world_direction: Vector3<f32>, scale: f32);

    fn type_name(&self) -> &'static str;
}

/// Clamps an input vector's magnitude to 1.0. Never amplifies.
pub fn constrain_input_vector(input: Vector3<f32>) -> Vector3<f32> {
    let magnitude = input.norm();
    if magnitude > 1.0 {
        input / magnitude
    } else {
        input
    }
}

/// The single place air-control policy is enforced: acceleration is
/// unchanged while walking and scaled by `air_control` while falling.
pub fn scale_input_acceleration(
    acceleration: Vector3<f32>,
    mode: MovementMode,
    air_control: f32,
) -> Vector3<f32> {
    match mode {
        MovementMode::Falling => acceleration * air_control,
        _ => acceleration,
    }
}

/// Removes the component of a movement vector that points into a collision
/// normal, leaving only the tangential component.
pub fn slide_along_surface(movement: Vector3<f32>, normal: Vector3<f32>) -> Vector3<f32> {
    movement - normal * movement.dot(&normal)
}
