//! The health record posted to the collector each reporting tick.

use crate::error::ReportError;
use serde::Serialize;

/// One telemetry report. Constructed fresh every tick; nothing is persisted.
///
/// The collector's schema is fixed: exactly these six keys, in JSON.
/// `cpu_usage` and `stack_hwm` are *placeholder* readings: the device fills
/// them with synthetic values rather than real measurements, and they must
/// stay that way until the collector contract says otherwise.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryRecord {
    pub device_id: String,
    /// Simulated CPU load percentage.
    pub cpu_usage: u8,
    pub heap_free: u32,
    pub min_heap_free: u32,
    pub task_count: u32,
    /// Simulated stack high-water mark.
    pub stack_hwm: u32,
}

impl TelemetryRecord {
    /// Serialize for the `application/json` POST body.
    pub fn to_json(&self) -> Result<String, ReportError> {
        serde_json::to_string(self).map_err(|e| ReportError(e.to_string()))
    }
}
