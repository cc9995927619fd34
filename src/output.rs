use anyhow::{Context, Result};
use cellpop_common::{CellRecord, OutputConfig, PopulationSnapshot};
use log::{error, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// On-disk encoding for the recorded snapshots.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Bincode,
    MessagePack,
}

impl SnapshotFormat {
    /// Reads the configured format name. Unknown names fall back to JSON.
    pub fn from_config(format: Option<&str>) -> Self {
        match format.unwrap_or("json") {
            "json" => SnapshotFormat::Json,
            "bincode" => SnapshotFormat::Bincode,
            "messagepack" => SnapshotFormat::MessagePack,
            other => {
                error!("Unknown output format: {}. Using JSON instead.", other);
                SnapshotFormat::Json
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            SnapshotFormat::Json => "json",
            SnapshotFormat::Bincode => "bin",
            SnapshotFormat::MessagePack => "msgpack",
        }
    }
}

/// Writes every snapshot to `<dir>/<base_filename>_snapshots.<ext>` and
/// returns the path written.
pub fn save_snapshots(dir: &Path, output: &OutputConfig, snapshots: &[PopulationSnapshot]) -> Result<PathBuf> {
    let format = SnapshotFormat::from_config(output.format.as_deref());
    let path = dir.join(format!("{}_snapshots.{}", output.base_filename, format.extension()));
    let file = File::create(&path)
        .with_context(|| format!("Error creating snapshot file '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        SnapshotFormat::Json => serde_json::to_writer(&mut writer, snapshots)
            .context("Error serializing snapshots to JSON")?,
        SnapshotFormat::Bincode => bincode::serialize_into(&mut writer, snapshots)
            .context("Error serializing snapshots to bincode")?,
        SnapshotFormat::MessagePack => rmp_serde::encode::write(&mut writer, snapshots)
            .context("Error serializing snapshots to MessagePack")?,
    }
    writer.flush()?;
    info!("{} snapshots saved to {} ({:?} format)", snapshots.len(), path.display(), format);
    Ok(path)
}

/// Writes one CSV row per cell to `<dir>/<base_filename>_final_population.csv`.
pub fn save_final_population(dir: &Path, output: &OutputConfig, cells: &[CellRecord]) -> Result<PathBuf> {
    let path = dir.join(format!("{}_final_population.csv", output.base_filename));
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Error creating CSV file '{}'", path.display()))?;
    writer.write_record(["x", "y", "radius", "axis_length", "axis_angle", "growth"])?;
    for cell in cells {
        writer.write_record(&[
            format!("{:.6}", cell.x),
            format!("{:.6}", cell.y),
            format!("{:.6}", cell.radius),
            format!("{:.6}", cell.axis_length),
            format!("{:.6}", cell.axis_angle),
            format!("{}", cell.growth),
        ])?;
    }
    writer.flush()?;
    info!("Final population ({} cells) saved to {}", cells.len(), path.display());
    Ok(path)
}
