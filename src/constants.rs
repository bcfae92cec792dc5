//! Movement and collision constants.
//! Centralizing these prevents bugs from duplicated hardcoded values.

/// Character capsule defaults
pub mod character {
    /// Default capsule radius (m)
    pub const DEFAULT_RADIUS: f32 = 0.3;

    /// Default capsule total height (m)
    pub const DEFAULT_HEIGHT: f32 = 1.8;

    /// Default spawn position Y (capsule center resting on the ground plane)
    pub const DEFAULT_CENTER_Y: f32 = 0.9;

    /// Y below which a character is considered to have fallen out of the world
    pub const DEFAULT_FALL_LIMIT: f32 = -10.0;
}

/// Closed-form deterministic integrator tunables
pub mod deterministic {
    /// Gravity acceleration (m/s²)
    pub const GRAVITY: f32 = -15.0;

    /// Ground acceleration (m/s²)
    pub const GROUND_ACCELERATION: f32 = 25.0;

    /// Air acceleration before air-control scaling (m/s²)
    pub const AIR_ACCELERATION: f32 = 8.0;

    /// Ground friction applied while input is held
    pub const FRICTION: f32 = 15.0;

    /// Extra friction when no input is present, for smooth stopping
    pub const BRAKING_FRICTION: f32 = 25.0;

    /// Air resistance applied to horizontal velocity while airborne
    pub const AIR_FRICTION: f32 = 2.0;

    /// Horizontal speed below which the character stops completely
    pub const MIN_SPEED_THRESHOLD: f32 = 0.1;

    /// Half-extent of the fixed ground plane on X and Z
    pub const GROUND_HALF_EXTENT: f32 = 50.0;

    /// Height band above the ground inside which grounded state is kept
    pub const LANDING_HYSTERESIS: f32 = 0.1;

    /// Accumulated input magnitude below which movement input is ignored
    pub const INPUT_EPSILON: f32 = 0.001;
}

/// Hybrid kinematic controller tunables
pub mod hybrid {
    /// Gravity acceleration (m/s²), stronger than deterministic for a snappier feel
    pub const GRAVITY: f32 = -20.0;

    /// Collision skin width (m)
    pub const SKIN_WIDTH: f32 = 0.02;

    /// Ground detection distance below the capsule lower bound (m)
    pub const GROUND_CHECK_DISTANCE: f32 = 0.1;

    /// Minimum vertical component of a contact normal for it to count as ground
    pub const WALKABLE_NORMAL_Y: f32 = 0.5;

    /// Scale applied to slid movement to avoid re-penetration next frame
    pub const SLIDE_MARGIN: f32 = 0.9;

    /// Minimum step height worth committing to (m)
    pub const MIN_STEP_HEIGHT: f32 = 0.01;

    /// Height band above detected ground inside which grounded state is kept
    pub const LANDING_HYSTERESIS: f32 = 0.1;

    /// Per-frame displacement magnitude below which no sweep is issued
    pub const MOVEMENT_EPSILON: f32 = 0.001;
}

/// Dynamic rigid-body strategy tunables
pub mod physics {
    /// Character body mass (kg)
    pub const MASS: f32 = 70.0;

    /// Body friction, high for control
    pub const FRICTION: f32 = 1.5;

    /// Restitution, zero so characters never bounce
    pub const RESTITUTION: f32 = 0.0;

    /// Linear damping for smooth stopping
    pub const LINEAR_DAMPING: f32 = 1.2;

    /// Angular damping, very high for upright stability
    pub const ANGULAR_DAMPING: f32 = 0.95;

    /// Downward probe distance for the backend grounded query (m)
    pub const GROUNDED_CHECK_DISTANCE: f32 = 0.1;

    /// Horizontal speed above which braking force is applied
    pub const BRAKING_SPEED_THRESHOLD: f32 = 0.1;

    /// Force/impulse magnitude below which nothing is sent to the backend
    pub const FORCE_EPSILON: f32 = 0.001;
}

/// Backend world defaults
pub mod world {
    /// Default gravity magnitude for the rapier backend (m/s²)
    pub const DEFAULT_GRAVITY: f32 = 9.81;

    /// Small epsilon for float comparisons
    pub const EPSILON: f32 = 0.001;
}
