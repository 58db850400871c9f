//! Geometry export for external plotting tools.
//!
//! The simulator's obligation ends at producing plain lists in a documented
//! order: walk traces in visit order, tube geometry and the vector field in
//! tube-major segment-minor order, persistence/entropy pairs in sweep order.
//! Everything is written as JSON; whatever consumes it owns the rendering.

use anyhow::Context;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::molecular::field::MicrotubuleField;
use crate::molecular::geometry::Point3;

/// Export sink rooted at one output directory.
pub struct Exporter {
    dir: PathBuf,
}

#[derive(Serialize)]
struct SweepEntry {
    persistence_length: f64,
    structural_entropy: f64,
}

impl Exporter {
    /// Create the sink, making sure the output directory exists.
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create export directory {}", dir.display()))?;
        Ok(Exporter { dir })
    }

    fn write_json(&self, filename: &str, value: &impl Serialize) -> anyhow::Result<PathBuf> {
        let path = self.dir.join(filename);
        let data = serde_json::to_string_pretty(value).context("Failed to serialize export data")?;
        fs::write(&path, data).with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("exported {}", path.display());
        Ok(path)
    }

    /// Tube segments, tube-major segment-minor, as `tubes.json`.
    pub fn write_tube_geometry(&self, field: &MicrotubuleField) -> anyhow::Result<PathBuf> {
        self.write_json("tubes.json", &field.segments())
    }

    /// One direction sample per segment, segment order, as
    /// `vector_field.json`.
    pub fn write_vector_field(&self, field: &MicrotubuleField) -> anyhow::Result<PathBuf> {
        self.write_json("vector_field.json", &field.vector_field())
    }

    /// Inter-tube contact points, scan order, as `overlaps.json`.
    pub fn write_overlaps(&self, field: &MicrotubuleField) -> anyhow::Result<PathBuf> {
        self.write_json("overlaps.json", &field.all_segment_overlaps())
    }

    /// A motor's visited positions, visit order, as `walk_trace.json`.
    pub fn write_walk_trace(&self, trace: &[Point3]) -> anyhow::Result<PathBuf> {
        self.write_json("walk_trace.json", &trace)
    }

    /// Persistence-length sweep results, sweep order, as
    /// `persistence_sweep.json`.
    pub fn write_persistence_sweep(&self, sweep: &[(f64, f64)]) -> anyhow::Result<PathBuf> {
        let entries: Vec<SweepEntry> = sweep
            .iter()
            .map(|&(persistence_length, structural_entropy)| SweepEntry {
                persistence_length,
                structural_entropy,
            })
            .collect();
        self.write_json("persistence_sweep.json", &entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecular::field::TubeCharacteristics;
    use crate::molecular::geometry::Segment3;

    fn temp_exporter(tag: &str) -> Exporter {
        let dir = std::env::temp_dir().join(format!("nanolink-export-test-{}", tag));
        Exporter::new(dir).unwrap()
    }

    #[test]
    fn walk_trace_preserves_visit_order() {
        let exporter = temp_exporter("trace");
        let trace = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 2.0, 0.0)];
        let path = exporter.write_walk_trace(&trace).unwrap();

        let restored: Vec<Point3> = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(restored, trace);
    }

    #[test]
    fn tube_geometry_preserves_segment_order() {
        let segments = vec![
            Segment3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)),
            Segment3::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)),
        ];
        let ts = TubeCharacteristics {
            num_tubes: 1,
            tube_length: 2.0,
            segments_per_tube: 2,
            intra_tube_angle: 30.0,
            inter_tube_angle: 10.0,
            density: 10.0,
            persistence_length: 50.0,
            volume: 25.0,
        };
        let field = MicrotubuleField::from_segments(segments.clone(), ts);

        let exporter = temp_exporter("tubes");
        let path = exporter.write_tube_geometry(&field).unwrap();
        let restored: Vec<Segment3> = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(restored, segments);
    }
}
