use crate::applier::ApplyReport;
use serde::Serialize;
use std::time::Duration;

/// Aggregate counters, reset only when the renderer is rebuilt
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderStats {
    pub total_patches: usize,
    pub batch_count: usize,
    pub average_batch_size: f64,
    #[serde(serialize_with = "serialize_millis")]
    pub total_render_time: Duration,
    pub queue_size: usize,
    pub is_rendering: bool,
    pub failed_patches: usize,
    pub skipped_patches: usize,
}

impl RenderStats {
    /// Account for one drained batch of `size` patches
    pub fn record_batch(&mut self, size: usize, report: &ApplyReport, elapsed: Duration) {
        self.total_patches += size;
        self.batch_count += 1;
        self.average_batch_size = self.total_patches as f64 / self.batch_count as f64;
        self.total_render_time += elapsed;
        self.failed_patches += report.failed;
        self.skipped_patches += report.skipped;
    }
}

fn serialize_millis<S: serde::Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(value.as_micros() as f64 / 1000.0)
}
