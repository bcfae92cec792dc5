//! Rapier3D implementation of the collision query port.

use log::debug;
use nalgebra::{Point3, UnitQuaternion, Vector3};
use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::parry::shape::{Ball, Capsule};
use rapier3d::prelude::*;
use std::collections::HashMap;

use crate::constants::world as consts;
use crate::port::{
    CapsuleShape, CollisionQueryPort, ObjectId, OverlapHit, RaycastHit, RigidBodyDesc, SweepHit,
};

// Collision groups: characters query against static geometry only, so a
// character never hits its own ghost proxy or another character's body.
const GROUP_STATIC: Group = Group::GROUP_1; // Walls, floors, obstacles
const GROUP_CHARACTER: Group = Group::GROUP_2; // Character bodies and ghost proxies

/// Wrapper around a Rapier3D world implementing [`CollisionQueryPort`].
///
/// Owns the full set/pipeline bundle so it can both answer queries (for the
/// hybrid strategy) and step dynamics (for the physics strategy). The
/// engine loop calls [`RapierPort::step`] once per frame, after all
/// movement components have issued their force and impulse commands.
pub struct RapierPort {
    pub gravity: Vector<Real>,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,

    /// Maps port object ids to rigid body handles (static parts and dynamic bodies)
    id_to_body: HashMap<u64, RigidBodyHandle>,
    /// Maps port object ids to standalone ghost colliders
    id_to_ghost: HashMap<u64, ColliderHandle>,
    /// Maps collider handles back to port object ids (for hit reporting)
    collider_to_id: HashMap<ColliderHandle, u64>,
    /// Capsule dimensions per dynamic body (for grounded probes)
    body_shapes: HashMap<u64, CapsuleShape>,

    next_id: u64,
    /// Set whenever colliders move or change; queries refresh lazily.
    queries_dirty: bool,
}

impl RapierPort {
    /// Creates a new port with default downward gravity.
    pub fn new() -> Self {
        Self {
            gravity: vector![0.0, -consts::DEFAULT_GRAVITY, 0.0],
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            id_to_body: HashMap::new(),
            id_to_ghost: HashMap::new(),
            collider_to_id: HashMap::new(),
            body_shapes: HashMap::new(),
            next_id: 1,
            queries_dirty: true,
        }
    }

    /// Sets world gravity (positive magnitude, applied downward).
    pub fn set_gravity(&mut self, gravity: f32) {
        self.gravity = vector![0.0, -gravity, 0.0];
    }

    /// Steps the dynamics simulation forward by `dt` seconds.
    ///
    /// Per-frame forces accumulated through [`CollisionQueryPort::apply_force`]
    /// are consumed by this step and cleared afterwards, so components
    /// re-issue them every frame.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
        for (_, body) in self.rigid_body_set.iter_mut() {
            if body.is_dynamic() {
                body.reset_forces(false);
            }
        }
        self.queries_dirty = false;
    }

    /// Adds a static box obstacle; returns its id for hit reporting.
    pub fn add_static_box(&mut self, position: Point3<f32>, half_extents: Vector3<f32>) -> ObjectId {
        let id = self.alloc_id();
        let body = RigidBodyBuilder::fixed()
            .translation(vector![position.x, position.y, position.z])
            .build();
        let handle = self.rigid_body_set.insert(body);
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .collision_groups(InteractionGroups::new(GROUP_STATIC, Group::ALL))
            .build();
        let collider_handle =
            self.collider_set
                .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        self.id_to_body.insert(id, handle);
        self.collider_to_id.insert(collider_handle, id);
        self.queries_dirty = true;
        ObjectId(id)
    }

    /// Adds a large flat ground slab whose top surface sits at `top_y`.
    pub fn add_static_ground(&mut self, top_y: f32, half_extent: f32) -> ObjectId {
        self.add_static_box(
            Point3::new(0.0, top_y - 0.5, 0.0),
            Vector3::new(half_extent, 0.5, half_extent),
        )
    }

    /// Refreshes the query acceleration structure if anything moved.
    fn refresh_queries(&mut self) {
        if self.queries_dirty {
            self.query_pipeline.update(&self.collider_set);
            self.queries_dirty = false;
        }
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn hit_id(&self, collider: ColliderHandle) -> Option<ObjectId> {
        self.collider_to_id.get(&collider).map(|&id| ObjectId(id))
    }

    /// Filter for character-originated queries: static geometry only, no
    /// sensors, so ghost proxies and other characters never obstruct.
    fn character_query_filter() -> QueryFilter<'static> {
        QueryFilter::default()
            .exclude_sensors()
            .groups(InteractionGroups::new(GROUP_CHARACTER, GROUP_STATIC))
    }

    fn capsule_for(shape: CapsuleShape) -> Capsule {
        let half_height = (shape.height - 2.0 * shape.radius).max(0.0) / 2.0;
        Capsule::new_y(half_height, shape.radius)
    }
}

impl Default for RapierPort {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionQueryPort for RapierPort {
    fn raycast(
        &mut self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RaycastHit> {
        let length = direction.norm();
        if length < consts::EPSILON {
            return None;
        }
        self.refresh_queries();

        let ray = Ray::new(point![origin.x, origin.y, origin.z], direction / length);
        let (collider, intersection) = self.query_pipeline.cast_ray_and_get_normal(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            max_distance,
            true, // solid
            Self::character_query_filter(),
        )?;

        let point = ray.point_at(intersection.time_of_impact);
        Some(RaycastHit {
            point: Point3::new(point.x, point.y, point.z),
            normal: Vector3::new(
                intersection.normal.x,
                intersection.normal.y,
                intersection.normal.z,
            ),
            distance: intersection.time_of_impact,
            body: self.hit_id(collider),
        })
    }

    fn sweep_capsule(
        &mut self,
        from: Point3<f32>,
        to: Point3<f32>,
        radius: f32,
        height: f32,
    ) -> Option<SweepHit> {
        let displacement = to - from;
        let length = displacement.norm();
        if length < consts::EPSILON {
            return None;
        }
        self.refresh_queries();

        let capsule = Self::capsule_for(CapsuleShape { radius, height });
        // Swept with identity rotation, so the reported contact normal is
        // frame-independent.
        let start = Isometry::translation(from.x, from.y, from.z);
        let velocity = vector![displacement.x, displacement.y, displacement.z];
        let direction = displacement / length;
        let options = ShapeCastOptions {
            max_time_of_impact: 1.0,
            target_distance: 0.0,
            stop_at_penetration: false,
            compute_impact_geometry_on_penetration: true,
        };

        // A contact whose surface the motion merely runs along is not an
        // obstruction: a capsule resting on its floor must sweep freely
        // sideways. Such grazes are skipped and the cast repeated until a
        // blocking contact (or nothing) remains.
        let mut grazed: Vec<ColliderHandle> = Vec::new();
        for _ in 0..4 {
            let cast = {
                let allow =
                    |handle: ColliderHandle, _: &Collider| !grazed.contains(&handle);
                let filter = Self::character_query_filter().predicate(&allow);
                self.query_pipeline.cast_shape(
                    &self.rigid_body_set,
                    &self.collider_set,
                    &start,
                    &velocity,
                    &capsule,
                    options,
                    filter,
                )
            };
            let (collider_handle, hit) = cast?;

            // Obstacle surface normal points back toward the swept capsule.
            // Rapier's `cast_shape` reports `normal1` on the world collider,
            // already oriented toward the cast shape.
            let normal = Vector3::new(hit.normal1.x, hit.normal1.y, hit.normal1.z);
            if direction.dot(&normal) >= -consts::EPSILON {
                grazed.push(collider_handle);
                continue;
            }

            let fraction = hit.time_of_impact;
            let center_at_impact = from + displacement * fraction;
            let contact_point = self
                .collider_set
                .get(collider_handle)
                .map(|collider| {
                    let projection = collider.shape().project_point(
                        collider.position(),
                        &point![center_at_impact.x, center_at_impact.y, center_at_impact.z],
                        true,
                    );
                    Point3::new(projection.point.x, projection.point.y, projection.point.z)
                })
                .unwrap_or(center_at_impact);

            return Some(SweepHit {
                point: contact_point,
                normal,
                distance: fraction * length,
                fraction,
                body: self.hit_id(collider_handle),
            });
        }
        None
    }

    fn overlap_sphere(&mut self, center: Point3<f32>, radius: f32) -> Vec<OverlapHit> {
        self.refresh_queries();

        let ball = Ball::new(radius);
        let position = Isometry::translation(center.x, center.y, center.z);
        let mut hits = Vec::new();

        self.query_pipeline.intersections_with_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &position,
            &ball,
            Self::character_query_filter(),
            |collider_handle| {
                if let (Some(id), Some(collider)) = (
                    self.collider_to_id.get(&collider_handle),
                    self.collider_set.get(collider_handle),
                ) {
                    let projection = collider.shape().project_point(
                        collider.position(),
                        &point![center.x, center.y, center.z],
                        false,
                    );
                    let surface = Point3::new(
                        projection.point.x,
                        projection.point.y,
                        projection.point.z,
                    );
                    let offset = center - surface;
                    let separation = offset.norm();
                    let (normal, penetration) = if projection.is_inside {
                        // Center is inside the shape: the whole radius plus
                        // the interior distance overlaps, and the exit
                        // direction is toward the nearest boundary point.
                        let normal = if separation > consts::EPSILON {
                            -offset / separation
                        } else {
                            Vector3::y()
                        };
                        (normal, radius + separation)
                    } else {
                        let normal = if separation > consts::EPSILON {
                            offset / separation
                        } else {
                            Vector3::y()
                        };
                        (normal, (radius - separation).max(0.0))
                    };
                    hits.push(OverlapHit {
                        body: ObjectId(*id),
                        contact_point: surface,
                        contact_normal: normal,
                        penetration_depth: penetration,
                    });
                }
                true // continue searching
            },
        );

        hits
    }

    fn create_rigid_body(&mut self, desc: &RigidBodyDesc, shape: CapsuleShape) -> Option<ObjectId> {
        let id = self.alloc_id();
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![desc.position.x, desc.position.y, desc.position.z])
            .rotation(desc.rotation.scaled_axis())
            .linvel(vector![desc.velocity.x, desc.velocity.y, desc.velocity.z])
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping)
            .build();
        let handle = self.rigid_body_set.insert(body);

        let capsule = Self::capsule_for(shape);
        let collider = ColliderBuilder::new(SharedShape::new(capsule))
            .mass(desc.mass)
            .friction(desc.friction)
            .restitution(desc.restitution)
            .collision_groups(InteractionGroups::new(GROUP_CHARACTER, GROUP_STATIC))
            .build();
        let collider_handle =
            self.collider_set
                .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        self.id_to_body.insert(id, handle);
        self.collider_to_id.insert(collider_handle, id);
        self.body_shapes.insert(id, shape);
        self.queries_dirty = true;
        debug!("created dynamic character body {id}");
        Some(ObjectId(id))
    }

    fn destroy_rigid_body(&mut self, body: ObjectId) {
        if let Some(handle) = self.id_to_body.remove(&body.0) {
            if let Some(rb) = self.rigid_body_set.get(handle) {
                for &collider in rb.colliders() {
                    self.collider_to_id.remove(&collider);
                }
            }
            self.rigid_body_set.remove(
                handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            );
            self.body_shapes.remove(&body.0);
            self.queries_dirty = true;
            debug!("destroyed dynamic character body {}", body.0);
        }
    }

    fn set_rigid_body_transform(
        &mut self,
        body: ObjectId,
        position: Point3<f32>,
        rotation: UnitQuaternion<f32>,
    ) {
        let Some(&handle) = self.id_to_body.get(&body.0) else {
            return;
        };
        if let Some(rb) = self.rigid_body_set.get_mut(handle) {
            let iso = Isometry::from_parts(
                Translation::new(position.x, position.y, position.z),
                rotation,
            );
            rb.set_position(iso, true);
        }
        self.rigid_body_set
            .propagate_modified_body_positions_to_colliders(&mut self.collider_set);
        self.queries_dirty = true;
    }

    fn apply_force(&mut self, body: ObjectId, force: Vector3<f32>) {
        if let Some(&handle) = self.id_to_body.get(&body.0) {
            if let Some(rb) = self.rigid_body_set.get_mut(handle) {
                rb.add_force(vector![force.x, force.y, force.z], true);
            }
        }
    }

    fn apply_impulse(&mut self, body: ObjectId, impulse: Vector3<f32>) {
        if let Some(&handle) = self.id_to_body.get(&body.0) {
            if let Some(rb) = self.rigid_body_set.get_mut(handle) {
                rb.apply_impulse(vector![impulse.x, impulse.y, impulse.z], true);
            }
        }
    }

    fn set_angular_factor(&mut self, body: ObjectId, factor: Vector3<f32>) {
        if let Some(&handle) = self.id_to_body.get(&body.0) {
            if let Some(rb) = self.rigid_body_set.get_mut(handle) {
                rb.set_enabled_rotations(factor.x > 0.0, factor.y > 0.0, factor.z > 0.0, true);
            }
        }
    }

    fn set_linear_damping(&mut self, body: ObjectId, damping: f32) {
        if let Some(&handle) = self.id_to_body.get(&body.0) {
            if let Some(rb) = self.rigid_body_set.get_mut(handle) {
                rb.set_linear_damping(damping);
            }
        }
    }

    fn set_angular_damping(&mut self, body: ObjectId, damping: f32) {
        if let Some(&handle) = self.id_to_body.get(&body.0) {
            if let Some(rb) = self.rigid_body_set.get_mut(handle) {
                rb.set_angular_damping(damping);
            }
        }
    }

    fn rigid_body_transform(&self, body: ObjectId) -> Option<(Point3<f32>, UnitQuaternion<f32>)> {
        let handle = self.id_to_body.get(&body.0)?;
        let rb = self.rigid_body_set.get(*handle)?;
        let translation = rb.translation();
        Some((
            Point3::new(translation.x, translation.y, translation.z),
            *rb.rotation(),
        ))
    }

    fn rigid_body_velocity(&self, body: ObjectId) -> Option<(Vector3<f32>, Vector3<f32>)> {
        let handle = self.id_to_body.get(&body.0)?;
        let rb = self.rigid_body_set.get(*handle)?;
        let linvel = rb.linvel();
        let angvel = rb.angvel();
        Some((
            Vector3::new(linvel.x, linvel.y, linvel.z),
            Vector3::new(angvel.x, angvel.y, angvel.z),
        ))
    }

    fn is_rigid_body_grounded(&mut self, body: ObjectId, check_distance: f32) -> bool {
        let Some(&handle) = self.id_to_body.get(&body.0) else {
            return false;
        };
        let Some(shape) = self.body_shapes.get(&body.0).copied() else {
            return false;
        };
        let Some(rb) = self.rigid_body_set.get(handle) else {
            return false;
        };
        let origin = *rb.translation();
        self.refresh_queries();

        let ray = Ray::new(point![origin.x, origin.y, origin.z], vector![0.0, -1.0, 0.0]);
        let max_distance = shape.height * 0.5 + check_distance;
        let filter = Self::character_query_filter().exclude_rigid_body(handle);
        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .is_some()
    }

    fn create_ghost_object(
        &mut self,
        shape: CapsuleShape,
        position: Point3<f32>,
    ) -> Option<ObjectId> {
        let id = self.alloc_id();
        // Standalone sensor collider: queried for sweeps and overlaps but
        // never simulated, and its transform updates without a pipeline step.
        let capsule = Self::capsule_for(shape);
        let collider = ColliderBuilder::new(SharedShape::new(capsule))
            .sensor(true)
            .translation(vector![position.x, position.y, position.z])
            .collision_groups(InteractionGroups::new(GROUP_CHARACTER, GROUP_STATIC))
            .build();
        let handle = self.collider_set.insert(collider);
        self.id_to_ghost.insert(id, handle);
        self.collider_to_id.insert(handle, id);
        self.queries_dirty = true;
        debug!("created ghost proxy {id}");
        Some(ObjectId(id))
    }

    fn destroy_ghost_object(&mut self, ghost: ObjectId) {
        if let Some(handle) = self.id_to_ghost.remove(&ghost.0) {
            self.collider_to_id.remove(&handle);
            self.collider_set.remove(
                handle,
                &mut self.island_manager,
                &mut self.rigid_body_set,
                false,
            );
            self.queries_dirty = true;
            debug!("destroyed ghost proxy {}", ghost.0);
        }
    }

    fn set_ghost_object_transform(
        &mut self,
        ghost: ObjectId,
        position: Point3<f32>,
        rotation: UnitQuaternion<f32>,
    ) {
        if let Some(&handle) = self.id_to_ghost.get(&ghost.0) {
            if let Some(collider) = self.collider_set.get_mut(handle) {
                collider.set_position(Isometry::from_parts(
                    Translation::new(position.x, position.y, position.z),
                    rotation,
                ));
                self.queries_dirty = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_world() -> RapierPort {
        let mut port = RapierPort::new();
        port.add_static_ground(0.0, 100.0);
        port
    }

    #[test]
    fn test_raycast_finds_ground() {
        let mut port = flat_world();
        let hit = port
            .raycast(Point3::new(0.0, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0), 10.0)
            .expect("should detect floor");
        assert!((hit.distance - 5.0).abs() < 0.01, "distance {}", hit.distance);
        assert!(hit.normal.y > 0.9, "floor normal should point up");
        assert!(hit.body.is_some());
    }

    #[test]
    fn test_raycast_miss_is_none() {
        let mut port = flat_world();
        let hit = port.raycast(Point3::new(0.0, 5.0, 0.0), Vector3::new(0.0, 1.0, 0.0), 10.0);
        assert!(hit.is_none(), "upward ray should miss");
    }

    #[test]
    fn test_sweep_capsule_stops_at_wall() {
        let mut port = flat_world();
        port.add_static_box(Point3::new(5.0, 1.0, 0.0), Vector3::new(1.0, 1.0, 1.0));

        let hit = port
            .sweep_capsule(
                Point3::new(0.0, 0.9, 0.0),
                Point3::new(6.0, 0.9, 0.0),
                0.3,
                1.8,
            )
            .expect("sweep should hit the wall");
        // Wall face at x=4, capsule radius 0.3: center stops near x=3.7
        assert!(hit.fraction > 0.0 && hit.fraction < 1.0);
        assert!(
            (hit.distance - 3.7).abs() < 0.1,
            "hit distance should be ~3.7, got {}",
            hit.distance
        );
        assert!(hit.normal.x < -0.9, "wall normal should face the sweep");
    }

    #[test]
    fn test_sweep_capsule_free_path() {
        let mut port = flat_world();
        let hit = port.sweep_capsule(
            Point3::new(0.0, 0.9, 0.0),
            Point3::new(3.0, 0.9, 0.0),
            0.3,
            1.8,
        );
        assert!(hit.is_none(), "open floor should not block a level sweep");
    }

    #[test]
    fn test_sweep_capsule_downward_hits_floor() {
        let mut port = flat_world();
        let hit = port
            .sweep_capsule(
                Point3::new(0.0, 3.0, 0.0),
                Point3::new(0.0, 0.5, 0.0),
                0.3,
                1.8,
            )
            .expect("descending sweep should land on the floor");
        assert!(hit.normal.y > 0.9, "floor normal should point up");
        // Capsule lower bound is 0.9 below center: contact when center hits 0.9
        assert!(
            (hit.distance - 2.1).abs() < 0.05,
            "landing distance should be ~2.1, got {}",
            hit.distance
        );
    }

    #[test]
    fn test_overlap_sphere_reports_penetration() {
        let mut port = flat_world();
        let hits = port.overlap_sphere(Point3::new(0.0, 0.4, 0.0), 0.5);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].penetration_depth > 0.05);
        assert!(hits[0].contact_normal.y > 0.9);
    }

    #[test]
    fn test_ghost_object_lifecycle() {
        let mut port = flat_world();
        let shape = CapsuleShape { radius: 0.3, height: 1.8 };
        let ghost = port
            .create_ghost_object(shape, Point3::new(0.0, 0.9, 0.0))
            .expect("ghost creation");

        // Ghosts are sensors outside the static group: a character sweep
        // straight through the proxy's position must not hit it.
        let hit = port.sweep_capsule(
            Point3::new(-2.0, 0.9, 0.0),
            Point3::new(2.0, 0.9, 0.0),
            0.3,
            1.8,
        );
        assert!(hit.is_none(), "ghost proxies must not obstruct sweeps");

        port.set_ghost_object_transform(
            ghost,
            Point3::new(1.0, 0.9, 0.0),
            UnitQuaternion::identity(),
        );
        port.destroy_ghost_object(ghost);
        // Destroying twice is a no-op, not an error.
        port.destroy_ghost_object(ghost);
    }

    #[test]
    fn test_rigid_body_falls_under_gravity() {
        let mut port = flat_world();
        let desc = RigidBodyDesc {
            position: Point3::new(0.0, 5.0, 0.0),
            rotation: UnitQuaternion::identity(),
            velocity: Vector3::zeros(),
            mass: 70.0,
            friction: 1.5,
            restitution: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.95,
        };
        let body = port
            .create_rigid_body(&desc, CapsuleShape { radius: 0.3, height: 1.8 })
            .expect("body creation");

        for _ in 0..30 {
            port.step(1.0 / 60.0);
        }

        let (position, _) = port.rigid_body_transform(body).unwrap();
        assert!(position.y < 5.0, "body should fall, got y={}", position.y);
        port.destroy_rigid_body(body);
        assert!(port.rigid_body_transform(body).is_none());
    }

    #[test]
    fn test_rigid_body_grounded_probe() {
        let mut port = flat_world();
        let desc = RigidBodyDesc {
            position: Point3::new(0.0, 0.91, 0.0),
            rotation: UnitQuaternion::identity(),
            velocity: Vector3::zeros(),
            mass: 70.0,
            friction: 1.5,
            restitution: 0.0,
            linear_damping: 1.2,
            angular_damping: 0.95,
        };
        let body = port
            .create_rigid_body(&desc, CapsuleShape { radius: 0.3, height: 1.8 })
            .unwrap();
        assert!(port.is_rigid_body_grounded(body, 0.1));

        port.set_rigid_body_transform(
            body,
            Point3::new(0.0, 5.0, 0.0),
            UnitQuaternion::identity(),
        );
        assert!(!port.is_rigid_body_grounded(body, 0.1));
    }

    #[test]
    fn test_missing_handles_are_misses() {
        let mut port = RapierPort::new();
        let bogus = ObjectId(9999);
        assert!(port.rigid_body_transform(bogus).is_none());
        assert!(port.rigid_body_velocity(bogus).is_none());
        assert!(!port.is_rigid_body_grounded(bogus, 0.1));
        // All of these must silently no-op.
        port.apply_force(bogus, Vector3::new(1.0, 0.0, 0.0));
        port.apply_impulse(bogus, Vector3::new(1.0, 0.0, 0.0));
        port.set_linear_damping(bogus, 0.5);
        port.destroy_rigid_body(bogus);
        port.destroy_ghost_object(bogus);
    }
}
