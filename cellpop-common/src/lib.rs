pub mod config;
pub mod sim_params;
pub mod snapshot;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use config::{SimulationConfig, TimingConfig, InitialConditions, CellParamsConfig, GridConfig, OutputConfig};
pub use sim_params::SimParams;
pub use snapshot::{CellRecord, PopulationSnapshot};
pub use vecmath::{Point, angle_to_vec, wrap_angle, point_segment_distance, segment_distance};

/// Radius of a freshly divided (minimal interphase) cell.
pub const MIN_RADIUS: f64 = 1.0;
/// Radius at which an interphase cell stops growing and enters mitosis.
pub const MAX_RADIUS: f64 = std::f64::consts::SQRT_2;
/// Smallest axis length of a mitotic cell, `2 * MAX_RADIUS`.
pub const MIN_MITOTIC_AXIS_LENGTH: f64 = 2.0 * std::f64::consts::SQRT_2;
/// Axis length at which mitosis completes: two touching disks of `MIN_RADIUS`.
pub const MAX_AXIS_LENGTH: f64 = 4.0;
