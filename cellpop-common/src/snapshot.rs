use serde::{Serialize, Deserialize};

/// One live cell at the moment a snapshot was taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub axis_length: f64,
    pub axis_angle: f64,
    pub growth: f64,
}

/// The population at a recording time. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    /// Simulated time at which the snapshot was taken.
    pub time: f64,
    pub cells: Vec<CellRecord>,
}

impl PopulationSnapshot {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Six values per cell: x, y, radius, axis length, axis angle, growth.
    pub fn flatten(&self) -> Vec<f64> {
        self.cells
            .iter()
            .flat_map(|c| [c.x, c.y, c.radius, c.axis_length, c.axis_angle, c.growth])
            .collect()
    }
}
