use crate::population::{Population, StepStats};
use crate::random::RandomSource;
use anyhow::Result;
use cellpop_common::{PopulationSnapshot, SimulationConfig};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared stop flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    /// Stopped between timesteps; every recorded snapshot is a complete step.
    Cancelled,
}

/// Advances a population through simulated time, recording snapshots and
/// reporting progress at the configured increments.
pub struct Simulation<R: RandomSource = StdRng> {
    config: SimulationConfig,
    population: Population<R>,
    time: f64,
    record_time: f64,
    output_time: f64,
    steps_completed: u64,
    last_stats: StepStats,
}

impl Simulation<StdRng> {
    /// Seeds the generator from the configuration.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let rng = StdRng::seed_from_u64(config.initial_conditions.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: RandomSource> Simulation<R> {
    pub fn with_rng(config: SimulationConfig, rng: R) -> Result<Self> {
        let population = Population::new(&config, rng)?;
        Ok(Self::from_population(config, population))
    }

    /// Wraps an already built population; time starts at zero.
    pub fn from_population(config: SimulationConfig, population: Population<R>) -> Self {
        Self {
            config,
            population,
            time: 0.0,
            record_time: 0.0,
            output_time: 0.0,
            steps_completed: 0,
            last_stats: StepStats::default(),
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn steps_completed(&self) -> u64 {
        self.steps_completed
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn population(&self) -> &Population<R> {
        &self.population
    }

    pub fn last_stats(&self) -> StepStats {
        self.last_stats
    }

    pub fn snapshots(&self) -> &[PopulationSnapshot] {
        self.population.snapshots()
    }

    pub fn is_finished(&self) -> bool {
        self.time > self.config.timing.run_time
    }

    /// One iteration of the time loop: record and report if due, then run a
    /// timestep. Returns `false` without doing anything once the run time is
    /// exceeded.
    pub fn advance(&mut self) -> Result<bool> {
        if self.is_finished() {
            return Ok(false);
        }
        let timing = &self.config.timing;
        if self.time >= self.record_time {
            self.population.record_population(self.time);
            debug!("Recorded snapshot at t = {:.2}.", self.time);
            self.record_time += timing.record_increment;
        }
        if self.time >= self.output_time {
            info!("time = {:.2} | size = {}", self.time, self.population.size());
            self.output_time += timing.output_increment;
        }

        self.last_stats = self.population.one_time_step()?;
        self.time += self.population.params().sim.dt;
        self.steps_completed += 1;
        Ok(true)
    }

    /// Runs until the configured run time is exceeded or `cancel` is set.
    /// The flag is checked between timesteps, never inside one. A configured
    /// wall-clock limit sets the flag when it expires.
    pub fn run(&mut self, cancel: &CancelToken) -> Result<RunOutcome> {
        let started = Instant::now();
        let wall_limit = self
            .config
            .timing
            .max_wall_seconds
            .map(Duration::from_secs_f64);
        info!(
            "Starting simulation loop: run time {}, dt {}, {} cells.",
            self.config.timing.run_time,
            self.population.params().sim.dt,
            self.population.size()
        );

        loop {
            if wall_limit.is_some_and(|limit| started.elapsed() >= limit) {
                warn!("Wall-clock limit reached after {:.2} s.", started.elapsed().as_secs_f64());
                cancel.cancel();
            }
            if cancel.is_cancelled() {
                warn!(
                    "Simulation cancelled at t = {:.2} with {} cells after {} steps.",
                    self.time,
                    self.population.size(),
                    self.steps_completed
                );
                return Ok(RunOutcome::Cancelled);
            }
            if !self.advance()? {
                break;
            }
        }

        info!("final time = {:.2}", self.time);
        info!("final size = {}", self.population.size());
        info!(
            "Simulation finished in {:.3} seconds ({} trials).",
            started.elapsed().as_secs_f64(),
            self.population.trials_performed()
        );
        Ok(RunOutcome::Completed)
    }
}
