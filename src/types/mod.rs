//! Shared types: errors, options and defaults.

pub mod error;
pub mod options;

pub use error::{DagError, DagResult};
pub use options::{DagOptions, EdgeAdditionStrategy};

/// Default resolution parameter (gamma) of the Leiden quality models.
pub const DEFAULT_RESOLUTION: f64 = 1.0;

/// Default softmax temperature used during Leiden refinement.
pub const DEFAULT_SMOOTHING: f64 = 1.0;

/// Default weight of each planarizer force (base, wind, gravity).
pub const DEFAULT_FORCE_WEIGHT: f64 = 1.0 / 3.0;

/// Upper bound on planarizer relaxation rounds.
pub const MAX_PLANARIZATION_ROUNDS: usize = 10;
