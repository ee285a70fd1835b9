// Per-Sample JSONL Time Series Recorder
// Streams one JSON line per observer report for independent analysis

use exclusion_engine::metrics::EmpiricalMeasure;
use exclusion_engine::{LatticeView, Observer};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct SampleSnapshot {
    pub time: f64,
    /// Time of the last event at or before `time`.
    pub event_time: f64,
    pub positions: Vec<usize>,
    pub measure: Vec<f64>,
}

impl SampleSnapshot {
    pub fn from_view(view: &LatticeView<'_>, timestamp: f64, grid_points: usize) -> Self {
        let measure = EmpiricalMeasure::from_view(view);
        Self {
            time: timestamp,
            event_time: view.current_time(),
            measure: measure.evaluate_grid(grid_points),
            positions: measure.positions().to_vec(),
        }
    }
}

/// Writes snapshots as they arrive. Observers cannot fail, so the first
/// write error is held and surfaced by [`finish`](Self::finish).
pub struct TimeSeriesRecorder {
    writer: BufWriter<File>,
    grid_points: usize,
    written: usize,
    error: Option<std::io::Error>,
}

impl TimeSeriesRecorder {
    pub fn create(path: &Path, grid_points: usize) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
            grid_points,
            written: 0,
            error: None,
        })
    }

    /// Flush and report the number of lines written.
    pub fn finish(mut self) -> std::io::Result<usize> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()?;
        Ok(self.written)
    }

    fn write_line(&mut self, snapshot: &SampleSnapshot) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, snapshot)?;
        self.writer.write_all(b"\n")
    }
}

impl Observer for TimeSeriesRecorder {
    fn on_event(&mut self, view: &LatticeView<'_>, timestamp: f64) {
        if self.error.is_some() {
            return;
        }
        let snapshot = SampleSnapshot::from_view(view, timestamp, self.grid_points);
        match self.write_line(&snapshot) {
            Ok(()) => self.written += 1,
            Err(e) => self.error = Some(e),
        }
    }
}
