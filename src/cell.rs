use crate::parameters::Parameters;
use crate::random::RandomSource;
use crate::solver::SolverError;
use cellpop_common::{
    angle_to_vec, segment_distance, wrap_angle, CellRecord, Point, MAX_AXIS_LENGTH, MAX_RADIUS,
    MIN_MITOTIC_AXIS_LENGTH, MIN_RADIUS,
};
use std::f64::consts::TAU;

/// Surface gaps within this of zero count as touching, not overlapping.
pub const CONTACT_TOLERANCE: f64 = 1e-9;

/// Where a cell is in its cycle. Derived from the geometry, never stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CellPhase {
    /// A single disk growing towards `MAX_RADIUS`.
    Interphase,
    /// Two fused disks elongating towards `MAX_AXIS_LENGTH`.
    Mitosis,
}

/// A single trial move.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Move {
    Growth,
    Deformation,
    Rotation,
    Translation,
}

impl CellPhase {
    /// The move taken on a growth trial. Growth trials skip the energy test.
    pub fn growth_move(self) -> Move {
        match self {
            CellPhase::Interphase => Move::Growth,
            CellPhase::Mitosis => Move::Deformation,
        }
    }

    /// The moves a perturbation trial picks from uniformly.
    pub fn perturbations(self) -> &'static [Move] {
        match self {
            // A disk looks the same at every angle.
            CellPhase::Interphase => &[Move::Translation],
            CellPhase::Mitosis => &[Move::Translation, Move::Rotation],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    coord: Point,
    radius: f64,
    axis_length: f64,
    axis_angle: f64,
    growth: f64,
    ready_to_divide: bool,
}

impl Cell {
    /// A minimal interphase cell that does not grow.
    pub fn new(coord: Point) -> Self {
        Self::with_growth(coord, 0.0)
    }

    pub fn with_growth(coord: Point, growth: f64) -> Self {
        Self {
            coord,
            radius: MIN_RADIUS,
            axis_length: 2.0 * MIN_RADIUS,
            axis_angle: 0.0,
            growth,
            ready_to_divide: false,
        }
    }

    pub fn coord(&self) -> Point {
        self.coord
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn axis_length(&self) -> f64 {
        self.axis_length
    }

    pub fn axis_angle(&self) -> f64 {
        self.axis_angle
    }

    pub fn growth(&self) -> f64 {
        self.growth
    }

    pub fn ready_to_divide(&self) -> bool {
        self.ready_to_divide
    }

    pub fn set_growth(&mut self, growth: f64) {
        self.growth = growth;
    }

    pub fn phase(&self) -> CellPhase {
        if self.axis_length >= MIN_MITOTIC_AXIS_LENGTH {
            CellPhase::Mitosis
        } else {
            CellPhase::Interphase
        }
    }

    /// Puts the cell in interphase with the given radius, clamped to the valid range.
    pub fn set_interphase_radius(&mut self, radius: f64) {
        self.radius = radius.clamp(MIN_RADIUS, MAX_RADIUS);
        self.axis_length = 2.0 * self.radius;
        self.ready_to_divide = false;
    }

    /// Puts the cell part-way through mitosis. The radius follows from the solver.
    pub fn enter_mitosis(
        &mut self,
        axis_length: f64,
        axis_angle: f64,
        params: &Parameters,
    ) -> Result<(), SolverError> {
        let axis_length = axis_length.min(MAX_AXIS_LENGTH);
        self.radius = params.solver.radius(axis_length)?;
        self.axis_length = axis_length;
        self.axis_angle = wrap_angle(axis_angle);
        self.ready_to_divide = axis_length >= MAX_AXIS_LENGTH;
        Ok(())
    }

    /// Grows an interphase cell by its growth rate, up to `MAX_RADIUS`. Reaching
    /// the maximum puts the cell at the start of mitosis.
    pub fn grow(&mut self) {
        if self.phase() != CellPhase::Interphase {
            return;
        }
        self.radius = (self.radius + self.growth).min(MAX_RADIUS);
        self.axis_length = 2.0 * self.radius;
    }

    /// Elongates a mitotic cell by up to `max_deform` and re-solves its radius.
    pub fn deform<R: RandomSource + ?Sized>(
        &mut self,
        params: &Parameters,
        rng: &mut R,
    ) -> Result<(), SolverError> {
        if self.phase() != CellPhase::Mitosis {
            return Ok(());
        }
        let stretched = self.axis_length + rng.uniform(0.0, params.sim.max_deform);
        let axis_length = stretched.min(MAX_AXIS_LENGTH);
        self.radius = params.solver.radius(axis_length)?;
        self.axis_length = axis_length;
        if axis_length >= MAX_AXIS_LENGTH {
            self.ready_to_divide = true;
        }
        Ok(())
    }

    pub fn rotate<R: RandomSource + ?Sized>(&mut self, params: &Parameters, rng: &mut R) {
        let max = params.sim.max_rotate;
        self.axis_angle = wrap_angle(self.axis_angle + rng.uniform(-max, max));
    }

    /// Moves the cell by a random displacement no longer than `max_translation`.
    pub fn translate<R: RandomSource + ?Sized>(&mut self, params: &Parameters, rng: &mut R) {
        let length = rng.uniform(0.0, params.sim.max_translation);
        let direction = angle_to_vec(rng.uniform(0.0, TAU));
        self.coord = self.coord + direction * length;
    }

    pub fn apply<R: RandomSource + ?Sized>(
        &mut self,
        mv: Move,
        params: &Parameters,
        rng: &mut R,
    ) -> Result<(), SolverError> {
        match mv {
            Move::Growth => self.grow(),
            Move::Deformation => self.deform(params, rng)?,
            Move::Rotation => self.rotate(params, rng),
            Move::Translation => self.translate(params, rng),
        }
        Ok(())
    }

    /// Performs one random move. Returns `true` if it was a growth step.
    pub fn do_trial<R: RandomSource + ?Sized>(
        &mut self,
        params: &Parameters,
        rng: &mut R,
    ) -> Result<bool, SolverError> {
        let phase = self.phase();
        if !self.ready_to_divide && rng.uniform(0.0, 1.0) < params.sim.growth_trial_probability {
            self.apply(phase.growth_move(), params, rng)?;
            return Ok(true);
        }
        let moves = phase.perturbations();
        let mv = moves[rng.index(moves.len())];
        self.apply(mv, params, rng)?;
        Ok(false)
    }

    /// Splits the cell at the middle of its axis. This cell becomes the daughter
    /// at the positive end of the axis; the one at the negative end is returned.
    /// Both start over as minimal interphase cells with this cell's growth rate,
    /// centered so that the two daughters just touch.
    pub fn divide(&mut self) -> Cell {
        let half = (self.axis_length / 2.0 - MIN_RADIUS).max(0.0);
        let offset = angle_to_vec(self.axis_angle) * half;
        let daughter = Cell::with_growth(self.coord - offset, self.growth);
        *self = Cell::with_growth(self.coord + offset, self.growth);
        daughter
    }

    /// Signed gap between the surfaces of two cells: positive when apart,
    /// negative when overlapping.
    pub fn cell_distance(&self, other: &Cell) -> f64 {
        let (p1, q1) = self.disk_centers();
        let (p2, q2) = other.disk_centers();
        segment_distance(p1, q1, p2, q2) - (self.radius + other.radius)
    }

    pub fn overlaps(&self, other: &Cell) -> bool {
        self.cell_distance(other) < -CONTACT_TOLERANCE
    }

    /// The two ends of the axis segment. They coincide in interphase.
    fn disk_centers(&self) -> (Point, Point) {
        let half = (self.axis_length / 2.0 - self.radius).max(0.0);
        let offset = angle_to_vec(self.axis_angle) * half;
        (self.coord - offset, self.coord + offset)
    }

    pub fn record(&self) -> CellRecord {
        CellRecord {
            x: self.coord.x,
            y: self.coord.y,
            radius: self.radius,
            axis_length: self.axis_length,
            axis_angle: self.axis_angle,
            growth: self.growth,
        }
    }
}
