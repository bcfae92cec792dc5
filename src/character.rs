//! High-level character orchestration: owns a movement component, routes
//! input to it, and handles spawn/respawn bookkeeping.

use log::{info, warn};
use nalgebra::{Point3, Vector3};

use crate::camera::CameraRig;
use crate::constants::character as consts;
use crate::input::InputFrame;
use crate::movement::{
    MovementComponent, MovementComponentFactory, MovementError, MovementMode, MovementStrategy,
};
use crate::port::SharedQueryPort;

/// Coarse state for gameplay code that does not care about movement modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementState {
    Grounded,
    Airborne,
}

/// Capsule visualization data for debug rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugVolume {
    pub position: Point3<f32>,
    /// Full extents: (diameter, height, diameter)
    pub size: Vector3<f32>,
    /// RGBA, one color per strategy
    pub color: [f32; 4],
}

/// Owns one movement component and presents a strategy-agnostic surface:
/// input routing, live strategy switching with state carry-over, and
/// fall-out-of-world respawn.
pub struct CharacterController {
    component: Option<Box<dyn MovementComponent>>,
    port: Option<SharedQueryPort>,
    radius: f32,
    height: f32,
    spawn_position: Point3<f32>,
    fall_limit: f32,
}

impl CharacterController {
    pub fn new() -> Self {
        Self {
            component: None,
            port: None,
            radius: consts::DEFAULT_RADIUS,
            height: consts::DEFAULT_HEIGHT,
            spawn_position: Point3::new(0.0, consts::DEFAULT_CENTER_Y, 0.0),
            fall_limit: consts::DEFAULT_FALL_LIMIT,
        }
    }

    /// Initializes with the default hybrid strategy.
    pub fn initialize(&mut self, port: Option<SharedQueryPort>) -> Result<(), MovementError> {
        self.initialize_with(MovementStrategy::Hybrid, port)
    }

    pub fn initialize_with(
        &mut self,
        strategy: MovementStrategy,
        port: Option<SharedQueryPort>,
    ) -> Result<(), MovementError> {
        self.port = port;
        let mut component = MovementComponentFactory::create(strategy);
        component.set_character_size(self.radius, self.height);
        component.set_position(self.spawn_position);
        component.initialize(self.port.clone())?;
        info!("character controller initialized with {}", component.type_name());
        self.component = Some(component);
        Ok(())
    }

    pub fn update(&mut self, delta_time: f32) {
        if let Some(component) = &mut self.component {
            component.update(delta_time);
        }
        if self.has_fallen() {
            warn!("character fell below y={}, respawning", self.fall_limit);
            self.reset_to_spawn();
        }
    }

    pub fn shutdown(&mut self) {
        if let Some(component) = &mut self.component {
            component.shutdown();
        }
        self.component = None;
        self.port = None;
    }

    /// Feeds one frame of input, resolving direction against the camera
    /// when one is present and facing the character along the move.
    pub fn apply_input(&mut self, input: &InputFrame, camera: Option<&CameraRig>) {
        let Some(component) = &mut self.component else {
            return;
        };

        let direction = match camera {
            Some(rig) => rig.movement_direction(input.move_forward, input.move_right),
            None => input.world_direction(),
        };
        if let Some(direction) = direction {
            component.set_yaw(direction.x.atan2(direction.z).to_degrees());
            component.add_movement_input(direction, 1.0);
        }

        if input.jump_pressed {
            component.jump();
        } else if !input.jump_held {
            component.stop_jumping();
        }
    }

    /// Replaces the live movement component, carrying position, velocity
    /// and yaw across. The old component is shut down before the new one
    /// is initialized so backend resources never coexist.
    pub fn set_movement_component(
        &mut self,
        mut component: Box<dyn MovementComponent>,
    ) -> Result<(), MovementError> {
        let carried = self.component.take().map(|mut old| {
            let state = (old.position(), old.velocity(), old.yaw());
            old.shutdown();
            state
        });

        component.set_character_size(self.radius, self.height);
        component.initialize(self.port.clone())?;
        if let Some((position, velocity, yaw)) = carried {
            component.set_position(position);
            component.set_velocity(velocity);
            component.set_yaw(yaw);
        } else {
            component.set_position(self.spawn_position);
        }
        info!("movement component switched to {}", component.type_name());
        self.component = Some(component);
        Ok(())
    }

    /// Convenience wrapper over [`set_movement_component`] for the built-in
    /// strategies.
    ///
    /// [`set_movement_component`]: CharacterController::set_movement_component
    pub fn switch_to(&mut self, strategy: MovementStrategy) -> Result<(), MovementError> {
        self.set_movement_component(MovementComponentFactory::create(strategy))
    }

    pub fn movement_state(&self) -> MovementState {
        match self.component.as_ref().map(|c| c.movement_mode()) {
            Some(MovementMode::Walking) => MovementState::Grounded,
            _ => MovementState::Airborne,
        }
    }

    pub fn position(&self) -> Point3<f32> {
        self.component
            .as_ref()
            .map(|c| c.position())
            .unwrap_or(self.spawn_position)
    }

    pub fn set_position(&mut self, position: Point3<f32>) {
        if let Some(component) = &mut self.component {
            component.set_position(position);
        }
    }

    pub fn velocity(&self) -> Vector3<f32> {
        self.component
            .as_ref()
            .map(|c| c.velocity())
            .unwrap_or_else(Vector3::zeros)
    }

    pub fn yaw(&self) -> f32 {
        self.component.as_ref().map(|c| c.yaw()).unwrap_or(0.0)
    }

    pub fn is_grounded(&self) -> bool {
        self.component.as_ref().is_some_and(|c| c.is_grounded())
    }

    pub fn is_jumping(&self) -> bool {
        self.component.as_ref().is_some_and(|c| c.is_jumping())
    }

    pub fn component(&self) -> Option<&dyn MovementComponent> {
        self.component.as_deref()
    }

    pub fn component_mut(&mut self) -> Option<&mut (dyn MovementComponent + 'static)> {
        self.component.as_deref_mut()
    }

    // Config passthroughs for the fields gameplay code tweaks most.

    pub fn set_move_speed(&mut self, speed: f32) {
        if let Some(component) = &mut self.component {
            let mut config = *component.config();
            config.max_walk_speed = speed;
            component.set_config(config);
        }
    }

    pub fn set_jump_speed(&mut self, speed: f32) {
        if let Some(component) = &mut self.component {
            let mut config = *component.config();
            config.jump_z_velocity = speed;
            component.set_config(config);
        }
    }

    pub fn set_max_slope_angle(&mut self, degrees: f32) {
        if let Some(component) = &mut self.component {
            let mut config = *component.config();
            config.max_slope_angle = degrees;
            component.set_config(config);
        }
    }

    pub fn set_max_step_height(&mut self, height: f32) {
        if let Some(component) = &mut self.component {
            let mut config = *component.config();
            config.max_step_height = height;
            component.set_config(config);
        }
    }

    /// Stored verbatim, exactly as given.
    pub fn set_character_size(&mut self, radius: f32, height: f32) {
        self.radius = radius;
        self.height = height;
        if let Some(component) = &mut self.component {
            component.set_character_size(radius, height);
        }
    }

    pub fn character_radius(&self) -> f32 {
        self.radius
    }

    pub fn character_height(&self) -> f32 {
        self.height
    }

    pub fn set_spawn_position(&mut self, position: Point3<f32>) {
        self.spawn_position = position;
    }

    pub fn set_fall_limit(&mut self, limit: f32) {
        self.fall_limit = limit;
    }

    pub fn has_fallen(&self) -> bool {
        self.position().y < self.fall_limit
    }

    pub fn reset_to_spawn(&mut self) {
        if let Some(component) = &mut self.component {
            component.set_position(self.spawn_position);
            component.set_velocity(Vector3::zeros());
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.component
            .as_ref()
            .map(|c| c.type_name())
            .unwrap_or("NoMovementComponent")
    }

    pub fn debug_volume(&self) -> DebugVolume {
        let color = match self.type_name() {
            "DeterministicMovementComponent" => [1.0, 0.2, 0.4, 1.0],
            "HybridMovementComponent" => [1.0, 0.0, 0.8, 1.0],
            "PhysicsMovementComponent" => [0.8, 0.0, 0.2, 1.0],
            _ => [0.5, 0.5, 0.5, 1.0],
        };
        DebugVolume {
            position: self.position(),
            size: Vector3::new(self.radius * 2.0, self.height, self.radius * 2.0),
            color,
        }
    }
}

impl Default for CharacterController {
    fn default() -> Self {
        Self::new()
    }
}
