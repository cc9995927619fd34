//! Off-lattice Monte Carlo model of a 2D population of cells that grow,
//! deform through mitosis and divide.

pub mod cell;
pub mod driver;
pub mod output;
pub mod parameters;
pub mod population;
pub mod random;
pub mod solver;
pub mod spatial_hash;

pub use cell::{Cell, CellPhase, Move};
pub use driver::{CancelToken, RunOutcome, Simulation};
pub use parameters::Parameters;
pub use population::{Energy, Population, StepStats, TrialOutcome};
pub use random::RandomSource;
pub use solver::{DeformationSolver, SolverError};
pub use spatial_hash::{Handle, IndexError, SpatialHash};
