//! Strategy selection for movement components.

use crate::movement::deterministic::DeterministicMovementComponent;
use crate::movement::hybrid::HybridMovementComponent;
use crate::movement::physics::PhysicsMovementComponent;
use crate::movement::MovementComponent;

/// Which movement implementation to instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementStrategy {
    /// Closed-form kinematic integration against a fixed ground plane.
    Deterministic,
    /// Force-driven dynamic rigid body simulated by the backend.
    Physics,
    /// Kinematic integration with sweep-based collision resolution.
    Hybrid,
}

/// Creates movement components behind the common trait so callers can swap
/// strategies without knowing concrete types.
pub struct MovementComponentFactory;

impl MovementComponentFactory {
    pub fn create(strategy: MovementStrategy) -> Box<dyn MovementComponent> {
        match strategy {
            MovementStrategy::Deterministic => Box::new(DeterministicMovementComponent::new()),
            MovementStrategy::Physics => Box::new(PhysicsMovementComponent::new()),
            MovementStrategy::Hybrid => Box::new(HybridMovementComponent::new()),
        }
    }
}
