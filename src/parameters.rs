use crate::random::RandomSource;
use crate::solver::DeformationSolver;
use anyhow::Result;
use cellpop_common::{SimParams, SimulationConfig};

/// Everything a cell consults while it moves: the derived parameters and the
/// deformation solver. Built once from a validated configuration and read-only
/// afterwards.
#[derive(Debug, Clone)]
pub struct Parameters {
    pub sim: SimParams,
    pub solver: DeformationSolver,
}

impl Parameters {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sim: config.get_sim_params(),
            solver: DeformationSolver::new(),
        })
    }

    /// A growth rate drawn uniformly from the candidate set.
    pub fn random_growth_rate<R: RandomSource + ?Sized>(&self, rng: &mut R) -> f64 {
        let rates = &self.sim.growth_rates;
        rates[rng.index(rates.len())]
    }
}
