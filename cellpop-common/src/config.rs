use serde::{Deserialize, Serialize};
use anyhow::Result;
use crate::sim_params::SimParams;
use std::path::Path;

// Configuration for timing
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimingConfig {
    pub run_time: f64,
    pub time_increment: f64,
    pub record_increment: f64,
    pub output_increment: f64,
    /// Wall-clock limit after which the run is cooperatively cancelled.
    #[serde(default)]
    pub max_wall_seconds: Option<f64>,
}

// Initial conditions for the simulation, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct InitialConditions {
    pub population_size: u32,
    pub density: f64,
    pub seed: u64,
    /// Share of the initial cells seeded at a random point of mitosis.
    #[serde(default = "default_mitosis_fraction")]
    pub mitosis_fraction: f64,
}

// Parameters for cell behavior and interaction, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CellParamsConfig {
    pub max_translation: f64,
    pub max_rotate: f64,
    pub max_deform: f64,
    /// Maximum surface gap at which two cells still interact.
    pub compression_delta: f64,
    /// Interaction strength.
    pub resistance_epsilon: f64,
    /// Candidate growth rates, sampled uniformly.
    pub growth_rates: Vec<f64>,
    #[serde(default)]
    pub inherit_growth: bool,
    /// Probability that a trial is a growth step rather than a perturbation.
    #[serde(default = "default_growth_trial_probability")]
    pub growth_trial_probability: f64,
}

// Spatial index settings
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GridConfig {
    #[serde(default = "default_bucket_size")]
    pub bucket_size: f64,
}

// Configuration for output settings, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub base_filename: String,
    #[serde(default = "default_true")]
    pub save_snapshots: bool,
    #[serde(default)]
    pub save_final_population: bool,
    pub format: Option<String>, // Output format: "json", "bincode", "messagepack"
}

/// Buckets between a cell and the edge of its neighborhood search square.
pub const MAX_SEARCH_BUCKETS: f64 = 64.0;

fn default_mitosis_fraction() -> f64 {
    0.25
}

fn default_growth_trial_probability() -> f64 {
    0.5
}

fn default_bucket_size() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

// Main simulation configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SimulationConfig {
    pub timing: TimingConfig,
    pub initial_conditions: InitialConditions,
    pub cell_params: CellParamsConfig,
    #[serde(default)]
    pub grid: GridConfig,
    pub output: OutputConfig,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            run_time: 10.0,
            time_increment: 1.0,
            record_increment: 1.0,
            output_increment: 5.0,
            max_wall_seconds: None,
        }
    }
}

impl Default for InitialConditions {
    fn default() -> Self {
        InitialConditions {
            population_size: 20,
            density: 0.05,
            seed: 0,
            mitosis_fraction: default_mitosis_fraction(),
        }
    }
}

impl Default for CellParamsConfig {
    fn default() -> Self {
        CellParamsConfig {
            max_translation: 0.1,
            max_rotate: 0.5,
            max_deform: 0.1,
            compression_delta: 0.2,
            resistance_epsilon: 0.05,
            growth_rates: vec![0.01, 0.02, 0.03],
            inherit_growth: false,
            growth_trial_probability: default_growth_trial_probability(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig { bucket_size: default_bucket_size() }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            base_filename: "cellpop".to_string(),
            save_snapshots: true,
            save_final_population: false,
            format: None,
        }
    }
}

impl SimulationConfig {
    /// Loads the simulation configuration from a TOML file and validates it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config = Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid config '{}': {}", path_ref.display(), e))?;
        Ok(config)
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that would only fail mid-simulation.
    pub fn validate(&self) -> Result<()> {
        let t = &self.timing;
        if !(t.time_increment > 0.0) {
            anyhow::bail!("time_increment must be positive.");
        }
        if !(t.run_time >= 0.0) {
            anyhow::bail!("run_time must not be negative.");
        }
        if !(t.record_increment > 0.0) || !(t.output_increment > 0.0) {
            anyhow::bail!("record_increment and output_increment must be positive.");
        }
        if let Some(limit) = t.max_wall_seconds {
            if !(limit >= 0.0) {
                anyhow::bail!("max_wall_seconds must not be negative.");
            }
        }

        let ic = &self.initial_conditions;
        if ic.population_size == 0 {
            anyhow::bail!("population_size must be greater than 0.");
        }
        if !(ic.density > 0.0) {
            anyhow::bail!("density must be positive.");
        }
        if !(0.0..=1.0).contains(&ic.mitosis_fraction) {
            anyhow::bail!("mitosis_fraction must lie in [0, 1].");
        }

        let cp = &self.cell_params;
        if !(cp.compression_delta > 0.0) {
            anyhow::bail!("compression_delta must be positive.");
        }
        if !(cp.resistance_epsilon >= 0.0) {
            anyhow::bail!("resistance_epsilon must not be negative.");
        }
        for (name, value) in [
            ("max_translation", cp.max_translation),
            ("max_rotate", cp.max_rotate),
            ("max_deform", cp.max_deform),
        ] {
            if !(value >= 0.0) {
                anyhow::bail!("{} must not be negative.", name);
            }
        }
        if cp.growth_rates.is_empty() {
            anyhow::bail!("growth_rates must contain at least one rate.");
        }
        if cp.growth_rates.iter().any(|r| !(*r >= 0.0)) {
            anyhow::bail!("growth_rates must not contain negative rates.");
        }
        if !(0.0..=1.0).contains(&cp.growth_trial_probability) {
            anyhow::bail!("growth_trial_probability must lie in [0, 1].");
        }

        if !(self.grid.bucket_size > 0.0) {
            anyhow::bail!("bucket_size must be positive.");
        }
        // Every trial scans the bucket square around its cell.
        let search_radius = cp.compression_delta.max(cp.max_translation) + crate::MAX_AXIS_LENGTH;
        if search_radius / self.grid.bucket_size > MAX_SEARCH_BUCKETS {
            anyhow::bail!(
                "Neighborhood search radius {} spans more than {} buckets of size {}; raise bucket_size or lower compression_delta/max_translation.",
                search_radius,
                MAX_SEARCH_BUCKETS,
                self.grid.bucket_size
            );
        }
        Ok(())
    }

    /// Converts the configuration into simulation parameters used at runtime.
    pub fn get_sim_params(&self) -> SimParams {
        let cp = &self.cell_params;
        let population_size = self.initial_conditions.population_size;

        let placement_radius = (population_size as f64 / self.initial_conditions.density).sqrt();

        // Two cells interact when their surface gap is within the cutoff; each
        // body reaches at most half the max axis length from its center.
        let interaction_search_radius = cp.compression_delta + crate::MAX_AXIS_LENGTH;
        // Conservative: the largest center displacement any trial can produce.
        let overlap_search_radius = cp.max_translation + crate::MAX_AXIS_LENGTH;

        SimParams {
            population_size,
            placement_radius,
            mitosis_fraction: self.initial_conditions.mitosis_fraction,
            bucket_size: self.grid.bucket_size,
            dt: self.timing.time_increment,
            max_translation: cp.max_translation,
            max_rotate: cp.max_rotate,
            max_deform: cp.max_deform,
            compression_delta: cp.compression_delta,
            resistance_epsilon: cp.resistance_epsilon,
            growth_rates: cp.growth_rates.clone(),
            inherit_growth: cp.inherit_growth,
            growth_trial_probability: cp.growth_trial_probability,
            interaction_search_radius,
            overlap_search_radius,
        }
    }
}
