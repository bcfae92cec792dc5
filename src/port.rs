//! Collision query port consumed by the movement strategies.
//!
//! The movement layer never owns a dynamics solver. Everything it needs
//! from one (rays, sweeps, overlaps, rigid bodies, ghost proxies) goes
//! through this trait, so the backend stays swappable.

use nalgebra::{Point3, UnitQuaternion, Vector3};
use std::cell::RefCell;
use std::rc::Rc;

/// Opaque identifier for an object owned by the query port: a static part,
/// a simulated rigid body, or a collision-only ghost proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub(crate) u64);

/// Capsule dimensions for characters: total height includes both caps.
#[derive(Debug, Clone, Copy)]
pub struct CapsuleShape {
    pub radius: f32,
    pub height: f32,
}

/// Descriptor for a backend-simulated dynamic body.
#[derive(Debug, Clone, Copy)]
pub struct RigidBodyDesc {
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub velocity: Vector3<f32>,
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

/// Result of a raycast query. Lives for one call, never persisted.
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    pub point: Point3<f32>,
    pub normal: Vector3<f32>,
    pub distance: f32,
    pub body: Option<ObjectId>,
}

/// Result of a capsule sweep. `fraction` is the hit time along the sweep
/// in [0, 1]; `distance` is the same expressed in world units.
#[derive(Debug, Clone, Copy)]
pub struct SweepHit {
    pub point: Point3<f32>,
    pub normal: Vector3<f32>,
    pub distance: f32,
    pub fraction: f32,
    pub body: Option<ObjectId>,
}

/// One overlapping body reported by a sphere overlap query.
#[derive(Debug, Clone, Copy)]
pub struct OverlapHit {
    pub body: ObjectId,
    pub contact_point: Point3<f32>,
    pub contact_normal: Vector3<f32>,
    pub penetration_depth: f32,
}

/// Query and resource operations a physics backend must supply.
///
/// Absence of a hit is always a valid, non-error outcome: operations on
/// handles that were destroyed externally no-op or report a miss rather
/// than failing.
pub trait CollisionQueryPort {
    fn raycast(
        &mut self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RaycastHit>;

    fn sweep_capsule(
        &mut self,
        from: Point3<f32>,
        to: Point3<f32>,
        radius: f32,
        height: f32,
    ) -> Option<SweepHit>;

    fn overlap_sphere(&mut self, center: Point3<f32>, radius: f32) -> Vec<OverlapHit>;

    // Rigid bodies (dynamic, backend-simulated)
    fn create_rigid_body(&mut self, desc: &RigidBodyDesc, shape: CapsuleShape) -> Option<ObjectId>;
    fn destroy_rigid_body(&mut self, body: ObjectId);
    fn set_rigid_body_transform(
        &mut self,
        body: ObjectId,
        position: Point3<f32>,
        rotation: UnitQuaternion<f32>,
    );
    fn apply_force(&mut self, body: ObjectId, force: Vector3<f32>);
    fn apply_impulse(&mut self, body: ObjectId, impulse: Vector3<f32>);
    /// Per-axis rotation gate: a zero component locks rotation on that axis.
    fn set_angular_factor(&mut self, body: ObjectId, factor: Vector3<f32>);
    fn set_linear_damping(&mut self, body: ObjectId, damping: f32);
    fn set_angular_damping(&mut self, body: ObjectId, damping: f32);
    fn rigid_body_transform(&self, body: ObjectId) -> Option<(Point3<f32>, UnitQuaternion<f32>)>;
    fn rigid_body_velocity(&self, body: ObjectId) -> Option<(Vector3<f32>, Vector3<f32>)>;
    fn is_rigid_body_grounded(&mut self, body: ObjectId, check_distance: f32) -> bool;

    // Ghost proxies (collision-only, never simulated)
    fn create_ghost_object(&mut self, shape: CapsuleShape, position: Point3<f32>)
        -> Option<ObjectId>;
    fn destroy_ghost_object(&mut self, ghost: ObjectId);
    fn set_ghost_object_transform(
        &mut self,
        ghost: ObjectId,
        position: Point3<f32>,
        rotation: UnitQuaternion<f32>,
    );
}

/// Shared handle to a query port. The movement layer is single-threaded and
/// frame-stepped, so interior mutability through `RefCell` is sufficient;
/// components keep a clone so shutdown and drop can release their backend
/// resources.
pub type SharedQueryPort = Rc<RefCell<dyn CollisionQueryPort>>;
