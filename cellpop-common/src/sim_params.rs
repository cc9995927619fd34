use serde::{Deserialize, Serialize};

/// Simulation parameters derived from the configuration, used frequently during trials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimParams {
    // Population & placement
    pub population_size: u32,
    pub placement_radius: f64, // Radius of the disk the initial cells are scattered in
    pub mitosis_fraction: f64,
    pub bucket_size: f64,

    // Time
    pub dt: f64,

    // Trial move magnitudes
    pub max_translation: f64,
    pub max_rotate: f64,
    pub max_deform: f64,

    // Interaction potential
    pub compression_delta: f64, // Cutoff surface gap
    pub resistance_epsilon: f64, // Interaction strength

    // Growth
    pub growth_rates: Vec<f64>,
    pub inherit_growth: bool,
    pub growth_trial_probability: f64,

    // Neighborhood queries (center-to-center radii)
    pub interaction_search_radius: f64,
    pub overlap_search_radius: f64,
}
