//! Strider character movement library
//!
//! Three interchangeable movement strategies behind one contract:
//! a closed-form deterministic integrator, a force-driven dynamic body,
//! and a hybrid kinematic controller that resolves collisions through
//! sweep and raycast queries against a ghost proxy.

pub mod backend;
pub mod camera;
pub mod character;
pub mod config;
pub mod constants;
pub mod input;
pub mod movement;
pub mod port;

pub use backend::RapierPort;
pub use camera::CameraRig;
pub use character::CharacterController;
pub use config::{MovementConfig, MovementConfigError};
pub use input::InputFrame;
pub use movement::{
    MovementComponent, MovementComponentFactory, MovementError, MovementMode, MovementStrategy,
};
pub use port::{CollisionQueryPort, SharedQueryPort};
