use crate::cell::{Cell, CONTACT_TOLERANCE};
use crate::parameters::Parameters;
use crate::random::RandomSource;
use crate::spatial_hash::{Handle, IndexError, SpatialHash};
use anyhow::Result;
use cellpop_common::{
    PopulationSnapshot, Point, SimulationConfig, MAX_AXIS_LENGTH, MAX_RADIUS, MIN_MITOTIC_AXIS_LENGTH,
};
use log::{debug, info, trace};
use rand::rngs::StdRng;
use std::f64::consts::TAU;

/// Minimum surface gap between cells when they are first scattered.
const PLACEMENT_GAP: f64 = 2.0;
/// Rejected locations tolerated for a single cell before placement gives up.
const MAX_PLACEMENT_ATTEMPTS: u32 = 100_000;

/// Interaction energy of a cell with its neighborhood.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Energy {
    Finite(f64),
    /// Some pair geometrically overlaps. Only ever a reject signal.
    Overlap,
}

/// Pairwise potential at surface gap `gap`: `epsilon * ((2 gap / cutoff - 1)^2 - 1)`
/// inside the cutoff, zero beyond it.
pub fn interaction_energy(gap: f64, cutoff: f64, epsilon: f64) -> Energy {
    if gap > cutoff {
        Energy::Finite(0.0)
    } else if gap < -CONTACT_TOLERANCE {
        Energy::Overlap
    } else {
        let part = (2.0 * gap.max(0.0) / cutoff - 1.0).powi(2);
        Energy::Finite(epsilon * (part - 1.0))
    }
}

/// Metropolis rule: always accept `delta <= 0`, otherwise accept with
/// probability `exp(-delta)`. Draws from `rng` only in the second case.
pub fn metropolis_accept<R: RandomSource + ?Sized>(delta: f64, rng: &mut R) -> bool {
    if delta <= 0.0 {
        true
    } else {
        rng.uniform(0.0, 1.0) < (-delta).exp()
    }
}

/// How a single trial resolved.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrialOutcome {
    /// Growth or deformation, kept without an energy test.
    Growth,
    Accepted,
    /// Reverted because the move made the cell overlap a neighbor.
    OverlapRejected,
    /// Reverted by the energy test or the neighbor-count rule.
    EnergyRejected,
}

/// Counters for one timestep.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct StepStats {
    pub trials: u32,
    pub growth: u32,
    pub accepted: u32,
    pub overlap_rejected: u32,
    pub energy_rejected: u32,
    pub divisions: u32,
}

impl StepStats {
    fn count(&mut self, outcome: TrialOutcome) {
        self.trials += 1;
        match outcome {
            TrialOutcome::Growth => self.growth += 1,
            TrialOutcome::Accepted => self.accepted += 1,
            TrialOutcome::OverlapRejected => self.overlap_rejected += 1,
            TrialOutcome::EnergyRejected => self.energy_rejected += 1,
        }
    }
}

/// Owns the cells and runs the Monte Carlo trials over them.
pub struct Population<R: RandomSource = StdRng> {
    params: Parameters,
    cells: SpatialHash<Cell>,
    /// Single source for every draw, in trial order.
    rng: R,
    recorded_snapshots: Vec<PopulationSnapshot>,
    trials_performed: u64,
}

impl<R: RandomSource> Population<R> {
    /// Scatters `population_size` cells in a disk sized by the target density,
    /// gives each a growth rate, and puts each at a random point of its cycle.
    pub fn new(config: &SimulationConfig, rng: R) -> Result<Self> {
        let mut population = Self::empty(config, rng)?;
        population.place_initial_cells()?;
        population.assign_growth_rates();
        population.seed_cells()?;
        info!(
            "Population initialized with {} cells in a disk of radius {:.2}.",
            population.size(),
            population.params.sim.placement_radius
        );
        Ok(population)
    }

    /// A population made of exactly the given cells.
    pub fn from_cells(config: &SimulationConfig, rng: R, cells: Vec<Cell>) -> Result<Self> {
        let mut population = Self::empty(config, rng)?;
        for cell in cells {
            population.insert(cell)?;
        }
        Ok(population)
    }

    fn empty(config: &SimulationConfig, rng: R) -> Result<Self> {
        let params = Parameters::new(config)?;
        debug!("Simulation Parameters: {:#?}", params.sim);
        let cells = SpatialHash::new(params.sim.bucket_size)?;
        Ok(Self {
            params,
            cells,
            rng,
            recorded_snapshots: Vec::new(),
            trials_performed: 0,
        })
    }

    fn insert(&mut self, cell: Cell) -> Result<Handle> {
        Ok(self.cells.insert(cell.coord(), cell)?)
    }

    fn place_initial_cells(&mut self) -> Result<()> {
        let count = self.params.sim.population_size;
        let radius = self.params.sim.placement_radius;
        for _ in 0..count {
            let location = self.random_location(radius)?;
            self.insert(Cell::new(location))?;
        }
        Ok(())
    }

    /// Uniform location in a disk of `radius` around the origin that keeps
    /// `PLACEMENT_GAP` clear of every placed cell.
    fn random_location(&mut self, radius: f64) -> Result<Point> {
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let dist = self.rng.uniform(0.0, 1.0);
            let ang = self.rng.uniform(0.0, TAU);
            let candidate = Cell::new(Point::new(
                radius * dist.sqrt() * ang.cos(),
                radius * dist.sqrt() * ang.sin(),
            ));
            if self.valid_placement(&candidate) {
                return Ok(candidate.coord());
            }
        }
        anyhow::bail!(
            "Could not place cell {} of {} after {} attempts; density {} is too high.",
            self.size() + 1,
            self.params.sim.population_size,
            MAX_PLACEMENT_ATTEMPTS,
            self.params.sim.population_size as f64 / (radius * radius),
        )
    }

    fn valid_placement(&self, cell: &Cell) -> bool {
        self.cells
            .range(cell.coord(), PLACEMENT_GAP + MAX_AXIS_LENGTH)
            .all(|(_, other)| other.cell_distance(cell) >= PLACEMENT_GAP)
    }

    fn assign_growth_rates(&mut self) {
        let handles: Vec<Handle> = self.cells.iter().map(|(h, _)| h).collect();
        for h in handles {
            let rate = self.params.random_growth_rate(&mut self.rng);
            if let Some(cell) = self.cells.get_mut(h) {
                cell.set_growth(rate);
            }
        }
    }

    fn seed_cells(&mut self) -> Result<()> {
        let handles: Vec<Handle> = self.cells.iter().map(|(h, _)| h).collect();
        for h in handles {
            let unif = self.rng.uniform(0.0, 1.0);
            if unif < 1.0 - self.params.sim.mitosis_fraction {
                let radius = self.rng.uniform(1.0, MAX_RADIUS);
                self.cell_mut(h)?.set_interphase_radius(radius);
            } else {
                let axis_length = self.rng.uniform(MIN_MITOTIC_AXIS_LENGTH, MAX_AXIS_LENGTH);
                let axis_angle = self.rng.uniform(0.0, TAU);
                let cell = self.cells.get_mut(h).ok_or(IndexError::UnknownHandle(h))?;
                cell.enter_mitosis(axis_length, axis_angle, &self.params)?;
            }
        }
        Ok(())
    }

    /// One timestep: as many trials as there are cells when the step begins.
    pub fn one_time_step(&mut self) -> Result<StepStats> {
        let trials = self.size();
        let mut stats = StepStats::default();
        for _ in 0..trials {
            self.update(&mut stats)?;
        }
        debug!(
            "Timestep: {} trials ({} growth, {} accepted, {} overlap-rejected, {} energy-rejected), {} divisions, size {}.",
            stats.trials,
            stats.growth,
            stats.accepted,
            stats.overlap_rejected,
            stats.energy_rejected,
            stats.divisions,
            self.size()
        );
        Ok(stats)
    }

    fn update(&mut self, stats: &mut StepStats) -> Result<()> {
        let h = self.cells.random_handle(&mut self.rng)?;
        let outcome = self.attempt_trial(h)?;
        stats.count(outcome);
        if self.check_mitosis(h)? {
            stats.divisions += 1;
        }
        self.trials_performed += 1;
        Ok(())
    }

    /// Proposes one move for cell `h` and keeps or reverts it.
    pub fn attempt_trial(&mut self, h: Handle) -> Result<TrialOutcome> {
        let pre_energy = self.total_interaction(h)?;
        let pre_neighbors = self.neighbor_count(h)?;
        let saved = self.cell(h)?.clone();

        let growth = {
            let cell = self.cells.get_mut(h).ok_or(IndexError::UnknownHandle(h))?;
            cell.do_trial(&self.params, &mut self.rng)?
        };

        // Overlap is never kept, not even for growth steps.
        let overlap = {
            let cell = self.cell(h)?;
            self.cells
                .range(saved.coord(), self.params.sim.overlap_search_radius)
                .any(|(other_h, other)| other_h != h && other.overlaps(cell))
        };
        if overlap {
            *self.cell_mut(h)? = saved.clone();
        }
        let coord = self.cell(h)?.coord();
        self.cells.update(h, coord)?;

        if overlap {
            trace!("Trial on {:?} rejected: overlap.", h);
            return Ok(TrialOutcome::OverlapRejected);
        }
        if growth {
            return Ok(TrialOutcome::Growth);
        }

        let post_energy = self.total_interaction(h)?;
        let accepted = match (pre_energy, post_energy) {
            (_, Energy::Overlap) => false,
            (Energy::Overlap, Energy::Finite(_)) => true,
            (Energy::Finite(pre), Energy::Finite(post)) => metropolis_accept(post - pre, &mut self.rng),
        };
        if !accepted || self.neighbor_count(h)? > pre_neighbors {
            trace!("Trial on {:?} rejected: energy {:?} -> {:?}.", h, pre_energy, post_energy);
            *self.cell_mut(h)? = saved.clone();
            self.cells.update(h, saved.coord())?;
            return Ok(TrialOutcome::EnergyRejected);
        }
        Ok(TrialOutcome::Accepted)
    }

    /// Divides cell `h` if it has finished mitosis. Returns whether it did.
    pub fn check_mitosis(&mut self, h: Handle) -> Result<bool> {
        if !self.cell(h)?.ready_to_divide() {
            return Ok(false);
        }
        let rate = if self.params.sim.inherit_growth {
            self.cell(h)?.growth()
        } else {
            self.params.random_growth_rate(&mut self.rng)
        };

        let mut daughter = self.cell_mut(h)?.divide();
        daughter.set_growth(rate);
        let parent_coord = self.cell(h)?.coord();
        let daughter_h = self.insert(daughter)?;
        self.cells.update(h, parent_coord)?;
        trace!("Cell {:?} divided into {:?}.", h, daughter_h);
        Ok(true)
    }

    /// Sum of pair potentials between cell `h` and every cell within the cutoff.
    /// Stops at the first overlapping pair.
    pub fn total_interaction(&self, h: Handle) -> Result<Energy> {
        let cell = self.cell(h)?;
        let cutoff = self.params.sim.compression_delta;
        let epsilon = self.params.sim.resistance_epsilon;
        let mut sum = 0.0;
        for (other_h, other) in self.cells.range(cell.coord(), self.params.sim.interaction_search_radius) {
            if other_h == h {
                continue;
            }
            match interaction_energy(cell.cell_distance(other), cutoff, epsilon) {
                Energy::Overlap => return Ok(Energy::Overlap),
                Energy::Finite(e) => sum += e,
            }
        }
        Ok(Energy::Finite(sum))
    }

    /// Cells whose surface gap to cell `h` is within the interaction cutoff.
    pub fn neighbor_count(&self, h: Handle) -> Result<usize> {
        let cell = self.cell(h)?;
        let cutoff = self.params.sim.compression_delta;
        Ok(self
            .cells
            .range(cell.coord(), self.params.sim.interaction_search_radius)
            .filter(|(other_h, other)| *other_h != h && cell.cell_distance(other) <= cutoff)
            .count())
    }

    pub fn cell(&self, h: Handle) -> Result<&Cell, IndexError> {
        self.cells.get(h).ok_or(IndexError::UnknownHandle(h))
    }

    fn cell_mut(&mut self, h: Handle) -> Result<&mut Cell, IndexError> {
        self.cells.get_mut(h).ok_or(IndexError::UnknownHandle(h))
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &Cell)> + '_ {
        self.cells.iter()
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Trials run since construction.
    pub fn trials_performed(&self) -> u64 {
        self.trials_performed
    }

    /// Appends a snapshot of every live cell.
    pub fn record_population(&mut self, time: f64) {
        let cells = self.cells.iter().map(|(_, c)| c.record()).collect();
        self.recorded_snapshots.push(PopulationSnapshot { time, cells });
    }

    pub fn snapshots(&self) -> &[PopulationSnapshot] {
        &self.recorded_snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use std::collections::VecDeque;

    /// Replays fixed fractions of each requested interval, in order.
    struct Scripted(VecDeque<f64>);

    impl Scripted {
        fn new(fractions: &[f64]) -> Self {
            Self(fractions.iter().copied().collect())
        }
    }

    impl RandomSource for Scripted {
        fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
            let u = self.0.pop_front().expect("ran out of scripted draws");
            lo + u * (hi - lo)
        }
    }

    fn config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.initial_conditions.population_size = 25;
        config.initial_conditions.density = 0.04;
        config.cell_params.max_translation = 0.3;
        config.cell_params.growth_rates = vec![0.02, 0.04];
        config
    }

    fn assert_no_overlap<R: RandomSource>(population: &Population<R>) {
        let cells: Vec<&Cell> = population.iter().map(|(_, c)| c).collect();
        for (i, a) in cells.iter().enumerate() {
            for b in &cells[i + 1..] {
                assert!(!a.overlaps(b), "overlap: {:?} {:?} gap {}", a, b, a.cell_distance(b));
            }
        }
    }

    fn assert_keys_in_sync<R: RandomSource>(population: &Population<R>) {
        for (h, cell) in population.iter() {
            assert_eq!(population.cells.key(h).unwrap(), cell.coord());
        }
    }

    #[test]
    fn potential_shape() {
        let (cutoff, eps) = (0.2, 0.5);
        assert_eq!(interaction_energy(0.3, cutoff, eps), Energy::Finite(0.0));
        assert_eq!(interaction_energy(cutoff, cutoff, eps), Energy::Finite(0.0));
        assert_eq!(interaction_energy(0.0, cutoff, eps), Energy::Finite(0.0));
        match interaction_energy(0.1, cutoff, eps) {
            Energy::Finite(e) => assert_abs_diff_eq!(e, -eps, epsilon = 1e-12),
            Energy::Overlap => panic!("not an overlap"),
        }
        assert_eq!(interaction_energy(-0.01, cutoff, eps), Energy::Overlap);
    }

    #[test]
    fn metropolis_always_accepts_downhill() {
        let mut rng = StdRng::seed_from_u64(1);
        for delta in [-3.0, -0.1, 0.0] {
            assert!((0..1_000).all(|_| metropolis_accept(delta, &mut rng)));
        }
    }

    #[test]
    fn metropolis_acceptance_rate_converges() {
        let mut rng = StdRng::seed_from_u64(2);
        for delta in [0.1f64, 0.7, 2.0] {
            let n = 200_000;
            let accepted = (0..n).filter(|_| metropolis_accept(delta, &mut rng)).count();
            let rate = accepted as f64 / n as f64;
            assert_abs_diff_eq!(rate, (-delta).exp(), epsilon = 0.01);
        }
    }

    #[test]
    fn new_population_is_placed_without_overlap() {
        let config = config();
        let population = Population::new(&config, StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(population.size(), 25);
        assert_no_overlap(&population);
        assert_keys_in_sync(&population);
        let rates = &population.params().sim.growth_rates;
        let limit = population.params().sim.placement_radius;
        for (_, cell) in population.iter() {
            assert!(rates.contains(&cell.growth()));
            assert!(cell.coord().length() <= limit);
        }
    }

    #[test]
    fn placement_fails_when_too_dense() {
        let mut config = config();
        config.initial_conditions.population_size = 50;
        config.initial_conditions.density = 10.0;
        assert!(Population::new(&config, StdRng::seed_from_u64(7)).is_err());
    }

    #[test]
    fn no_overlap_persists_across_timesteps() {
        let config = config();
        let mut population = Population::new(&config, StdRng::seed_from_u64(11)).unwrap();
        for _ in 0..40 {
            population.one_time_step().unwrap();
            assert_no_overlap(&population);
            assert_keys_in_sync(&population);
        }
        assert!(population.size() >= 25);
    }

    #[test]
    fn timestep_runs_one_trial_per_cell_at_start() {
        let config = config();
        let params = Parameters::new(&config).unwrap();
        let cells: Vec<Cell> = (0..5)
            .map(|i| {
                let mut cell = Cell::with_growth(Point::new(12.0 * i as f64, 0.0), 0.02);
                cell.enter_mitosis(MAX_AXIS_LENGTH, 0.0, &params).unwrap();
                cell
            })
            .collect();
        let mut population = Population::from_cells(&config, StdRng::seed_from_u64(3), cells).unwrap();

        let stats = population.one_time_step().unwrap();
        assert_eq!(stats.trials, 5);
        assert_eq!(population.trials_performed(), 5);
        assert!(stats.divisions >= 1);
        assert_eq!(population.size(), 5 + stats.divisions as usize);
        assert_no_overlap(&population);
        assert_keys_in_sync(&population);

        let next = population.one_time_step().unwrap();
        assert_eq!(next.trials as usize, 5 + stats.divisions as usize);
    }

    #[test]
    fn division_inherits_growth_when_configured() {
        let mut config = config();
        config.cell_params.inherit_growth = true;
        let params = Parameters::new(&config).unwrap();
        let mut cell = Cell::with_growth(Point::new(0.5, 0.5), 0.123);
        cell.enter_mitosis(MAX_AXIS_LENGTH, 1.0, &params).unwrap();
        let mut population = Population::from_cells(&config, StdRng::seed_from_u64(4), vec![cell]).unwrap();

        let (h, _) = population.iter().next().unwrap();
        assert!(population.check_mitosis(h).unwrap());
        assert_eq!(population.size(), 2);
        for (_, cell) in population.iter() {
            assert_eq!(cell.growth(), 0.123);
            assert_eq!(cell.radius(), 1.0);
            assert!(!cell.ready_to_divide());
        }
        assert_no_overlap(&population);
        assert_keys_in_sync(&population);
    }

    #[test]
    fn division_samples_fresh_growth_otherwise() {
        let mut config = config();
        config.cell_params.growth_rates = vec![0.5];
        let params = Parameters::new(&config).unwrap();
        let mut cell = Cell::with_growth(Point::zero(), 0.123);
        cell.enter_mitosis(MAX_AXIS_LENGTH, 0.0, &params).unwrap();
        let mut population = Population::from_cells(&config, StdRng::seed_from_u64(4), vec![cell]).unwrap();

        let (h, _) = population.iter().next().unwrap();
        assert!(population.check_mitosis(h).unwrap());
        let mut rates: Vec<f64> = population.iter().map(|(_, c)| c.growth()).collect();
        rates.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(rates, vec![0.123, 0.5]);
    }

    #[test]
    fn trial_into_neighbor_is_reverted() {
        let mut config = config();
        config.cell_params.max_translation = 5.0;
        config.cell_params.growth_trial_probability = 0.0;
        // Two cells just touching: many translations push one into the other.
        let cells = vec![Cell::new(Point::new(0.0, 0.0)), Cell::new(Point::new(2.0, 0.0))];
        let mut population = Population::from_cells(&config, StdRng::seed_from_u64(5), cells).unwrap();
        let (h, _) = population.iter().next().unwrap();
        let mut rejected = 0;
        for _ in 0..200 {
            let before = population.cell(h).unwrap().clone();
            if population.attempt_trial(h).unwrap() == TrialOutcome::OverlapRejected {
                rejected += 1;
                assert_eq!(population.cell(h).unwrap(), &before);
            }
            assert_no_overlap(&population);
            assert_keys_in_sync(&population);
        }
        assert!(rejected > 0);
    }

    #[test]
    fn rejected_trials_restore_state_and_key() {
        let mut config = config();
        config.cell_params.growth_trial_probability = 0.0;
        config.cell_params.resistance_epsilon = 1_000.0;
        config.cell_params.compression_delta = 0.5;
        // Gap 0.25 sits at the bottom of the well, so almost every move costs energy.
        let cells = vec![Cell::new(Point::new(0.0, 0.0)), Cell::new(Point::new(2.25, 0.0))];
        let mut population = Population::from_cells(&config, StdRng::seed_from_u64(6), cells).unwrap();
        let (h, _) = population.iter().next().unwrap();
        let mut rejected = 0;
        for _ in 0..100 {
            let before = population.cell(h).unwrap().clone();
            match population.attempt_trial(h).unwrap() {
                TrialOutcome::EnergyRejected | TrialOutcome::OverlapRejected => {
                    rejected += 1;
                    assert_eq!(population.cell(h).unwrap(), &before);
                }
                TrialOutcome::Accepted => assert_ne!(population.cell(h).unwrap(), &before),
                TrialOutcome::Growth => panic!("growth trials are disabled"),
            }
            assert_keys_in_sync(&population);
        }
        assert!(rejected > 50);
    }

    #[test]
    fn neighbor_count_uses_cutoff() {
        let config = config();
        let cells = vec![
            Cell::new(Point::new(0.0, 0.0)),
            Cell::new(Point::new(2.1, 0.0)),
            Cell::new(Point::new(0.0, 2.5)),
        ];
        let population = Population::from_cells(&config, StdRng::seed_from_u64(6), cells).unwrap();
        let (h, _) = population.iter().next().unwrap();
        // Default cutoff is 0.2: only the cell 0.1 away counts.
        assert_eq!(population.neighbor_count(h).unwrap(), 1);
        match population.total_interaction(h).unwrap() {
            Energy::Finite(e) => assert!(e < 0.0),
            Energy::Overlap => panic!("no overlap expected"),
        }
    }

    #[test]
    fn downhill_move_gaining_a_neighbor_is_rejected() {
        let mut config = config();
        config.cell_params.growth_trial_probability = 0.0;
        config.cell_params.max_translation = 0.2;
        config.cell_params.compression_delta = 0.2;
        config.cell_params.resistance_epsilon = 1.0;
        let cells = vec![
            Cell::new(Point::new(0.0, 0.0)),
            Cell::new(Point::new(2.1, 0.0)),
            Cell::new(Point::new(0.0, 2.25)),
        ];
        // Growth check, move pick, translation of 0.1 straight up.
        let rng = Scripted::new(&[0.5, 0.0, 0.5, 0.25]);
        let mut population = Population::from_cells(&config, rng, cells).unwrap();
        let (h, before) = population.iter().next().map(|(h, c)| (h, c.clone())).unwrap();
        assert_eq!(population.total_interaction(h).unwrap(), Energy::Finite(-1.0));
        assert_eq!(population.neighbor_count(h).unwrap(), 1);

        assert_eq!(population.attempt_trial(h).unwrap(), TrialOutcome::EnergyRejected);
        assert_eq!(population.cell(h).unwrap(), &before);
        assert_keys_in_sync(&population);
        assert!(population.rng.0.is_empty());
    }

    #[test]
    fn growth_step_into_neighbor_is_reverted() {
        let mut config = config();
        config.cell_params.max_deform = 0.5;
        let params = Parameters::new(&config).unwrap();
        let mut dividing = Cell::with_growth(Point::zero(), 0.02);
        dividing.enter_mitosis(3.0, 0.0, &params).unwrap();
        // Surface 0.05 beyond the tip of the axis.
        let cells = vec![dividing, Cell::new(Point::new(2.55, 0.0))];
        // Growth check passes, then an elongation of almost 0.5.
        let rng = Scripted::new(&[0.1, 0.999]);
        let mut population = Population::from_cells(&config, rng, cells).unwrap();
        let (h, before) = population.iter().next().map(|(h, c)| (h, c.clone())).unwrap();

        assert_eq!(population.attempt_trial(h).unwrap(), TrialOutcome::OverlapRejected);
        let after = population.cell(h).unwrap();
        assert_eq!(after, &before);
        assert_eq!(after.axis_length(), 3.0);
        assert_no_overlap(&population);
        assert_keys_in_sync(&population);
    }

    #[test]
    fn move_out_of_overlap_is_accepted() {
        let mut config = config();
        config.cell_params.growth_trial_probability = 0.5;
        config.cell_params.max_translation = 0.3;
        // Already overlapping by 0.1.
        let cells = vec![Cell::new(Point::new(0.0, 0.0)), Cell::new(Point::new(1.9, 0.0))];
        // Perturbation, move pick, translation of 0.15 away from the neighbor.
        let rng = Scripted::new(&[0.9, 0.0, 0.5, 0.5]);
        let mut population = Population::from_cells(&config, rng, cells).unwrap();
        let (h, _) = population.iter().next().unwrap();
        assert_eq!(population.total_interaction(h).unwrap(), Energy::Overlap);

        assert_eq!(population.attempt_trial(h).unwrap(), TrialOutcome::Accepted);
        let coord = population.cell(h).unwrap().coord();
        assert_abs_diff_eq!(coord.x, -0.15, epsilon = 1e-12);
        assert_abs_diff_eq!(coord.y, 0.0, epsilon = 1e-12);
        assert!(matches!(population.total_interaction(h).unwrap(), Energy::Finite(_)));
        assert_keys_in_sync(&population);
    }

    #[test]
    fn record_population_appends_snapshot() {
        let config = config();
        let mut population = Population::new(&config, StdRng::seed_from_u64(8)).unwrap();
        population.record_population(0.0);
        population.one_time_step().unwrap();
        population.record_population(1.0);
        let snapshots = population.snapshots();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].time, 0.0);
        assert_eq!(snapshots[0].len(), 25);
        assert_eq!(snapshots[1].len(), population.size());
        assert_eq!(snapshots[1].flatten().len(), 6 * population.size());
    }
}
