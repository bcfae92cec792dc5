//! Collision-aware kinematic movement: sweep tests and slide resolution
//! against backend geometry, with kinematic gravity and ground snapping.

use log::{debug, error};
use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::config::MovementConfig;
use crate::constants::{character, hybrid as consts};
use crate::movement::{
    constrain_input_vector, slide_along_surface, MovementComponent, MovementError, MovementMode,
};
use crate::port::{CapsuleShape, CollisionQueryPort, ObjectId, SharedQueryPort};

/// Result of a capsule sweep along an intended movement.
#[derive(Debug, Clone, Copy)]
struct CollisionInfo {
    has_collision: bool,
    contact_point: Point3<f32>,
    contact_normal: Vector3<f32>,
    /// Always 0 for sweeps, which stop at first contact; overlap-based
    /// resolution would fill it in.
    penetration_depth: f32,
    distance: f32,
    body: Option<ObjectId>,
}

impl CollisionInfo {
    fn none() -> Self {
        Self {
            has_collision: false,
            contact_point: Point3::origin(),
            contact_normal: Vector3::y(),
            penetration_depth: 0.0,
            distance: 0.0,
            body: None,
        }
    }
}

/// Result of probing a blocking obstacle for a climbable step.
#[derive(Debug, Clone, Copy)]
struct StepInfo {
    can_step_up: bool,
    step_height: f32,
    step_position: Point3<f32>,
}

/// Kinematic character movement that consults the collision query port
/// before committing displacement. Blocked movement slides along the
/// contact surface; low obstacles within the configured step height are
/// climbed; slopes steeper than the configured limit are refused.
///
/// The component owns a ghost proxy in the backend so other systems can
/// overlap-query the character without it participating in dynamics.
pub struct HybridMovementComponent {
    config: MovementConfig,
    mode: MovementMode,

    position: Point3<f32>,
    velocity: Vector3<f32>,
    yaw: f32,

    radius: f32,
    height: f32,

    grounded: bool,
    jumping: bool,
    ground_level: f32,

    accumulated_input: Vector3<f32>,

    port: Option<SharedQueryPort>,
    ghost: Option<ObjectId>,

    sweep_test_count: u32,
}

impl HybridMovementComponent {
    pub fn new() -> Self {
        Self {
            config: MovementConfig::default(),
            mode: MovementMode::Walking,
            position: Point3::new(0.0, character::DEFAULT_CENTER_Y, 0.0),
            velocity: Vector3::zeros(),
            yaw: 0.0,
            radius: character::DEFAULT_RADIUS,
            height: character::DEFAULT_HEIGHT,
            grounded: false,
            jumping: false,
            ground_level: 0.0,
            accumulated_input: Vector3::zeros(),
            port: None,
            ghost: None,
            sweep_test_count: 0,
        }
    }

    /// Number of capsule sweeps issued during the last update.
    pub fn sweep_test_count(&self) -> u32 {
        self.sweep_test_count
    }

    fn capsule(&self) -> CapsuleShape {
        CapsuleShape {
            radius: self.radius,
            height: self.height,
        }
    }

    fn yaw_rotation(&self) -> UnitQuaternion<f32> {
        UnitQuaternion::from_euler_angles(0.0, self.yaw.to_radians(), 0.0)
    }

    fn create_ghost_object(&mut self) -> Result<(), MovementError> {
        let Some(port) = self.port.clone() else {
            return Err(MovementError::QueryPortRequired("HybridMovementComponent"));
        };
        if self.ghost.is_some() {
            return Ok(());
        }
        let ghost = port
            .borrow_mut()
            .create_ghost_object(self.capsule(), self.position);
        let Some(ghost) = ghost else {
            error!("failed to create ghost object for hybrid movement component");
            return Err(MovementError::ResourceCreation("character ghost object"));
        };
        self.ghost = Some(ghost);
        Ok(())
    }

    fn destroy_ghost_object(&mut self) {
        if let (Some(port), Some(ghost)) = (&self.port, self.ghost.take()) {
            port.borrow_mut().destroy_ghost_object(ghost);
        }
    }

    fn sweep_test(
        &mut self,
        port: &mut dyn CollisionQueryPort,
        from: Point3<f32>,
        to: Point3<f32>,
    ) -> CollisionInfo {
        self.sweep_test_count += 1;
        match port.sweep_capsule(from, to, self.radius, self.height) {
            Some(hit) => CollisionInfo {
                has_collision: true,
                contact_point: hit.point,
                contact_normal: hit.normal,
                penetration_depth: 0.0,
                distance: hit.distance,
                body: hit.body,
            },
            None => CollisionInfo::none(),
        }
    }

    /// Probes whether the obstacle ahead is a low ledge the character can
    /// climb: a forward ray at step height must be clear, then a downward
    /// ray finds the ledge surface.
    fn check_step_up(
        &self,
        port: &mut dyn CollisionQueryPort,
        movement: Vector3<f32>,
    ) -> StepInfo {
        let mut info = StepInfo {
            can_step_up: false,
            step_height: 0.0,
            step_position: self.position,
        };

        let horizontal = Vector3::new(movement.x, 0.0, movement.z);
        let move_distance = horizontal.norm();
        if move_distance < consts::MIN_STEP_HEIGHT {
            return info;
        }
        let direction = horizontal / move_distance;

        let probe_origin = Point3::new(
            self.position.x,
            self.position.y - self.height / 2.0 + self.config.max_step_height,
            self.position.z,
        );
        let forward_clear = port
            .raycast(probe_origin, direction, self.radius + move_distance)
            .is_none();
        if !forward_clear {
            return info;
        }

        let top = probe_origin + direction * (self.radius + move_distance);
        let drop = port.raycast(
            top,
            -Vector3::y(),
            self.config.max_step_height + consts::SKIN_WIDTH,
        );
        if let Some(hit) = drop {
            let step_height = self.config.max_step_height - hit.distance;
            if step_height > consts::MIN_STEP_HEIGHT && step_height <= self.config.max_step_height {
                info.can_step_up = true;
                info.step_height = step_height;
                info.step_position = Point3::new(
                    self.position.x + movement.x,
                    self.position.y + step_height,
                    self.position.z + movement.z,
                );
            }
        }
        info
    }

    fn is_walkable_slope(&self, normal: Vector3<f32>) -> bool {
        let angle = normal.y.clamp(-1.0, 1.0).acos().to_degrees();
        angle <= self.config.max_slope_angle
    }

    /// Resolves a blocked horizontal movement: climb a step if one is
    /// there, otherwise slide along the contact surface.
    fn resolve_movement(
        &mut self,
        port: &mut dyn CollisionQueryPort,
        movement: Vector3<f32>,
        collision: CollisionInfo,
    ) -> Vector3<f32> {
        let step = self.check_step_up(port, movement);
        if step.can_step_up {
            debug!("hybrid movement: stepping up {:.3}", step.step_height);
            return step.step_position - self.position;
        }

        // Every slid displacement keeps the penetration-avoidance margin.
        let slide = slide_along_surface(movement, collision.contact_normal) * consts::SLIDE_MARGIN;

        if collision.contact_normal.y > consts::WALKABLE_NORMAL_Y
            && self.is_walkable_slope(collision.contact_normal)
        {
            // Walkable slope: project the movement onto it and keep going.
            return slide;
        }

        let target = self.position + slide;
        let recheck = self.sweep_test(port, self.position, target);
        if recheck.has_collision {
            // Sliding is blocked too; advance only up to the first contact.
            let safe = (collision.distance - collision.penetration_depth - consts::SKIN_WIDTH)
                .max(0.0);
            let norm = movement.norm();
            if norm > 0.0 {
                return movement / norm * safe;
            }
            return Vector3::zeros();
        }
        slide
    }

    /// Raycast straight down to find and track the supporting surface.
    fn check_ground_collision(&mut self, port: &mut dyn CollisionQueryPort) {
        let probe = port.raycast(self.position, -Vector3::y(), self.height + 0.5);
        match probe {
            Some(hit) => {
                self.ground_level = hit.point.y + self.height / 2.0;
                if self.position.y <= self.ground_level && self.velocity.y <= 0.0 {
                    self.position.y = self.ground_level;
                    self.velocity.y = 0.0;
                    if !self.grounded {
                        debug!("hybrid movement: landed at y={:.3}", self.ground_level);
                    }
                    self.grounded = true;
                    self.jumping = false;
                } else if self.position.y > self.ground_level + consts::LANDING_HYSTERESIS {
                    self.grounded = false;
                }
            }
            None => {
                self.grounded = false;
            }
        }
    }

    /// Short downward probe for the live grounded state: the surface must
    /// be within reach and walkable.
    fn grounded_probe(&self, port: &mut dyn CollisionQueryPort) -> bool {
        let max = self.height / 2.0 + consts::GROUND_CHECK_DISTANCE;
        match port.raycast(self.position, -Vector3::y(), max) {
            Some(hit) => {
                hit.normal.y > consts::WALKABLE_NORMAL_Y
                    && hit.distance - self.height / 2.0 <= consts::GROUND_CHECK_DISTANCE
            }
            None => false,
        }
    }

    fn update_ghost_transform(&self, port: &mut dyn CollisionQueryPort) {
        if let Some(ghost) = self.ghost {
            port.set_ghost_object_transform(ghost, self.position, self.yaw_rotation());
        }
    }
}

impl Default for HybridMovementComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl MovementComponent for HybridMovementComponent {
    fn initialize(&mut self, port: Option<SharedQueryPort>) -> Result<(), MovementError> {
        let Some(port) = port else {
            error!("hybrid movement component requires a collision query port");
            return Err(MovementError::QueryPortRequired("HybridMovementComponent"));
        };
        self.port = Some(port);
        self.create_ghost_object()?;
        debug!("hybrid movement component initialized");
        Ok(())
    }

    fn update(&mut self, delta_time: f32) {
        let Some(port) = self.port.clone() else {
            return;
        };
        let mut port = port.borrow_mut();
        let port: &mut dyn CollisionQueryPort = &mut *port;
        self.sweep_test_count = 0;

        let input = std::mem::replace(&mut self.accumulated_input, Vector3::zeros());

        if !self.grounded_probe(port) {
            self.velocity.y += consts::GRAVITY * self.config.gravity_scale * delta_time;
        }

        let mut horizontal = Vector3::new(input.x, 0.0, input.z);
        if horizontal.norm() > 0.0 {
            horizontal = horizontal.normalize() * self.config.max_walk_speed * delta_time;
        }

        if horizontal.norm() > consts::MOVEMENT_EPSILON {
            let target = self.position + horizontal;
            let collision = self.sweep_test(port, self.position, target);
            let resolved = if collision.has_collision {
                debug!(
                    "hybrid movement: blocked by {:?} at {:?}",
                    collision.body, collision.contact_point
                );
                self.resolve_movement(port, horizontal, collision)
            } else {
                horizontal
            };
            self.position += resolved;
            self.velocity.x = resolved.x / delta_time;
            self.velocity.z = resolved.z / delta_time;
        } else {
            self.velocity.x = 0.0;
            self.velocity.z = 0.0;
        }

        self.position.y += self.velocity.y * delta_time;

        self.check_ground_collision(port);

        let grounded = self.grounded_probe(port);
        if grounded && self.mode == MovementMode::Falling {
            self.mode = MovementMode::Walking;
        } else if !grounded && self.mode == MovementMode::Walking && !self.grounded {
            self.mode = MovementMode::Falling;
        }

        self.update_ghost_transform(port);
    }

    fn shutdown(&mut self) {
        self.destroy_ghost_object();
        self.port = None;
    }

    fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
        if let Some(port) = self.port.clone() {
            self.update_ghost_transform(&mut *port.borrow_mut());
        }
    }

    fn position(&self) -> Point3<f32> {
        self.position
    }

    fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
        if let Some(port) = self.port.clone() {
            self.update_ghost_transform(&mut *port.borrow_mut());
        }
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

    /// Live downward probe, never the cached flag: a freshly-placed
    /// component in mid-air is airborne before its first update.
    fn is_grounded(&self) -> bool {
        match self.port.clone() {
            Some(port) => self.grounded_probe(&mut *port.borrow_mut()),
            None => self.grounded,
        }
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
        self.velocity.y = self.config.jump_z_velocity;
        self.grounded = false;
        self.jumping = true;
        self.mode = MovementMode::Falling;
        debug!("hybrid movement: jump at vy={}", self.config.jump_z_velocity);
    }

    fn stop_jumping(&mut self) {
        self.jumping = false;
    }

    fn add_movement_input(&mut self, world_direction: Vector3<f32>, scale: f32) {
        self.accumulated_input += constrain_input_vector(world_direction * scale);
    }

    fn type_name(&self) -> &'static str {
        "HybridMovementComponent"
    }
}

impl Drop for HybridMovementComponent {
    fn drop(&mut self) {
        self.destroy_ghost_object();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RapierPort;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DT: f32 = 1.0 / 60.0;

    fn flat_port() -> Rc<RefCell<RapierPort>> {
        let mut port = RapierPort::new();
        port.add_static_ground(0.0, 100.0);
        Rc::new(RefCell::new(port))
    }

    fn component_on(port: &Rc<RefCell<RapierPort>>) -> HybridMovementComponent {
        let mut component = HybridMovementComponent::new();
        component.set_position(Point3::new(0.0, 0.9, 0.0));
        component
            .initialize(Some(port.clone()))
            .expect("hybrid initialize should succeed");
        component
    }

    #[test]
    fn test_initialize_requires_port() {
        let mut component = HybridMovementComponent::new();
        assert!(matches!(
            component.initialize(None),
            Err(MovementError::QueryPortRequired(_))
        ));
    }

    #[test]
    fn test_walks_on_flat_ground() {
        let port = flat_port();
        let mut component = component_on(&port);

        for _ in 0..60 {
            component.add_movement_input(Vector3::new(1.0, 0.0, 0.0), 1.0);
            component.update(DT);
        }

        // One second of walking at max speed.
        let expected = component.config().max_walk_speed;
        assert!((component.position().x - expected).abs() < 0.05);
        assert!((component.position().y - 0.9).abs() < 0.01);
        assert!(component.is_grounded());
        assert_eq!(component.movement_mode(), MovementMode::Walking);
    }

    #[test]
    fn test_wall_blocks_movement() {
        let port = flat_port();
        port.borrow_mut().add_static_box(
            Point3::new(5.0, 2.0, 0.0),
            Vector3::new(1.0, 2.0, 4.0),
        );
        let mut component = component_on(&port);

        for _ in 0..120 {
            component.add_movement_input(Vector3::new(1.0, 0.0, 0.0), 1.0);
            component.update(DT);
        }

        // Wall face is at x=4; the capsule surface must stop at or before it.
        assert!(
            component.position().x + component.character_radius() <= 4.0 + 0.05,
            "character penetrated the wall: x={}",
            component.position().x
        );
    }

    #[test]
    fn test_slides_along_wall() {
        let port = flat_port();
        port.borrow_mut().add_static_box(
            Point3::new(5.0, 2.0, 0.0),
            Vector3::new(1.0, 2.0, 4.0),
        );
        let mut component = component_on(&port);

        // Push diagonally into the wall; the z component should survive.
        for _ in 0..120 {
            component.add_movement_input(Vector3::new(1.0, 0.0, 1.0), 1.0);
            component.update(DT);
        }

        assert!(
            component.position().z > 1.0,
            "sliding should preserve tangential motion, z={}",
            component.position().z
        );
    }

    #[test]
    fn test_steps_onto_low_ledge() {
        let port = flat_port();
        // 0.2 high step ahead, below the default 0.3 max step height.
        port.borrow_mut().add_static_box(
            Point3::new(3.0, 0.1, 0.0),
            Vector3::new(1.0, 0.1, 4.0),
        );
        let mut component = component_on(&port);

        let mut highest: f32 = 0.0;
        for _ in 0..120 {
            component.add_movement_input(Vector3::new(1.0, 0.0, 0.0), 1.0);
            component.update(DT);
            highest = highest.max(component.position().y);
        }

        assert!(
            highest > 1.0,
            "character should have climbed the step, highest y={highest}"
        );
        assert!(component.position().x > 2.5);
    }

    #[test]
    fn test_jump_and_land() {
        let port = flat_port();
        let mut component = component_on(&port);
        component.update(DT);
        assert!(component.is_grounded());

        component.jump();
        assert!(component.is_jumping());
        assert_eq!(component.movement_mode(), MovementMode::Falling);

        let mut apex: f32 = 0.0;
        let mut landed_at = None;
        for frame in 0..120 {
            component.update(DT);
            apex = apex.max(component.position().y);
            if component.movement_mode() == MovementMode::Walking && landed_at.is_none() {
                landed_at = Some(frame);
            }
        }

        assert!(apex > 2.0, "jump apex too low: {apex}");
        assert!(landed_at.is_some(), "character never landed");
        assert!((component.position().y - 0.9).abs() < 0.01);
        assert!(!component.is_jumping());
    }

    #[test]
    fn test_fresh_airborne_component_cannot_jump() {
        let port = flat_port();
        let mut component = HybridMovementComponent::new();
        component.set_position(Point3::new(0.0, 7.0, 0.0));
        component
            .initialize(Some(port))
            .expect("hybrid initialize should succeed");

        // No update has run yet; the live probe must still see mid-air.
        assert!(!component.is_grounded());
        component.jump();
        assert!(!component.is_jumping());
        assert_eq!(component.velocity().y, 0.0);
    }

    #[test]
    fn test_grounded_and_falling_agree_near_ground() {
        let port = flat_port();
        let mut component = component_on(&port);
        component.update(DT);
        component.jump();

        // Through the whole arc, including the final descent inside the
        // ground-check window, the two queries must stay consistent.
        for _ in 0..120 {
            component.update(DT);
            let expected = !component.is_grounded() && component.velocity().y < 0.0;
            assert_eq!(component.is_falling(), expected);
            assert!(
                !(component.is_grounded() && component.is_falling()),
                "grounded and falling at once (y={}, vy={})",
                component.position().y,
                component.velocity().y
            );
        }
    }

    #[test]
    fn test_airborne_jump_ignored() {
        let port = flat_port();
        let mut component = component_on(&port);
        component.update(DT);
        component.jump();
        component.update(DT);

        let vy = component.velocity().y;
        component.jump();
        assert!((component.velocity().y - vy).abs() < f32::EPSILON);
    }

    #[test]
    fn test_falls_without_support() {
        let port = flat_port();
        let mut component = component_on(&port);
        component.set_position(Point3::new(0.0, 10.0, 0.0));

        for _ in 0..10 {
            component.update(DT);
        }
        assert!(component.velocity().y < 0.0);
        assert!(component.is_falling());
        assert_eq!(component.movement_mode(), MovementMode::Falling);

        for _ in 0..200 {
            component.update(DT);
        }
        assert!(component.is_grounded());
        assert!((component.position().y - 0.9).abs() < 0.01);
    }

    #[test]
    fn test_wall_slide_keeps_margin() {
        let port = flat_port();
        port.borrow_mut().add_static_box(
            Point3::new(5.0, 2.0, 0.0),
            Vector3::new(1.0, 2.0, 10.0),
        );
        let mut component = component_on(&port);

        // Press diagonally until the wall fully absorbs the x component.
        for _ in 0..60 {
            component.add_movement_input(Vector3::new(1.0, 0.0, 1.0), 1.0);
            component.update(DT);
        }
        let z_before = component.position().z;
        for _ in 0..30 {
            component.add_movement_input(Vector3::new(1.0, 0.0, 1.0), 1.0);
            component.update(DT);
        }
        let lateral = component.position().z - z_before;

        // Half a second of the tangential component, scaled by the margin.
        let tangential = component.config().max_walk_speed * std::f32::consts::FRAC_1_SQRT_2 * 0.5;
        assert!(
            lateral <= tangential * consts::SLIDE_MARGIN + 0.05,
            "slide must keep the penetration margin, moved {lateral} of {tangential}"
        );
        assert!(lateral > tangential * 0.7, "slide stalled, moved {lateral}");
    }

    #[test]
    fn test_sweep_count_resets_each_update() {
        let port = flat_port();
        let mut component = component_on(&port);

        component.add_movement_input(Vector3::new(1.0, 0.0, 0.0), 1.0);
        component.update(DT);
        assert!(component.sweep_test_count() >= 1);

        component.update(DT);
        assert_eq!(component.sweep_test_count(), 0);
    }

    #[test]
    fn test_shutdown_releases_ghost() {
        let port = flat_port();
        let mut component = component_on(&port);
        component.shutdown();
        component.shutdown();
        // Drop after shutdown must not double-free the ghost.
        drop(component);
    }
}
