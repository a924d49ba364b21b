//! Per-operation timing.
//!
//! A [`ProfileOp`] guard wraps every forward and backward kernel call. While
//! profiling is enabled (through `TINYAD_DEBUG` or [`set_enabled`]) each guard
//! logs its duration and input shapes at debug level and adds it to a
//! process-wide table.
//! Nothing here influences results.

use crate::storage::Storage;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        LazyLock, Mutex, MutexGuard,
    },
    time::Instant,
};
use tinyad_core::config;

static ENABLED: AtomicBool = AtomicBool::new(false);
static STATS: LazyLock<Mutex<HashMap<String, OpStats>>> = LazyLock::new(|| Mutex::new(HashMap::new()));

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OpStats {
    pub calls: u64,
    pub total_ms: f64,
}

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || config::debug_enabled()
}

fn stats() -> MutexGuard<'static, HashMap<String, OpStats>> {
    STATS.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct ProfileOp {
    name: String,
    shapes: Vec<Vec<usize>>,
    start: Option<Instant>,
}

impl ProfileOp {
    /// Guard for a forward call over `inputs`.
    pub fn forward(name: &str, inputs: &[Storage]) -> Self {
        Self::start(|| name.to_string(), inputs)
    }

    /// Guard for a backward call receiving `grad`.
    pub fn backward(name: &str, grad: &Storage) -> Self {
        Self::start(|| format!("back_{}", name), std::slice::from_ref(grad))
    }

    fn start(name: impl FnOnce() -> String, inputs: &[Storage]) -> Self {
        if is_enabled() {
            Self {
                name: name(),
                shapes: inputs.iter().map(|s| s.shape().to_vec()).collect(),
                start: Some(Instant::now()),
            }
        } else {
            Self {
                name: String::new(),
                shapes: Vec::new(),
                start: None,
            }
        }
    }

    /// Input shapes recorded for the log line; empty while disabled.
    pub fn shapes(&self) -> &[Vec<usize>] {
        &self.shapes
    }
}

impl Drop for ProfileOp {
    fn drop(&mut self) {
        let Some(start) = self.start else {
            return;
        };
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        log::debug!("{:>16} : {:>9.3} ms {:?}", self.name, elapsed_ms, self.shapes);

        let mut table = stats();
        let entry = table.entry(std::mem::take(&mut self.name)).or_default();
        entry.calls += 1;
        entry.total_ms += elapsed_ms;
    }
}

/// Recorded operations, slowest first.
pub fn report() -> Vec<(String, OpStats)> {
    let mut rows: Vec<_> = stats().iter().map(|(name, s)| (name.clone(), *s)).collect();
    rows.sort_by(|a, b| b.1.total_ms.total_cmp(&a.1.total_ms));
    rows
}

pub fn log_report() {
    for (name, s) in report() {
        log::info!("{:>16} : {:>6} calls {:>10.3} ms", name, s.calls, s.total_ms);
    }
}

pub fn reset() {
    stats().clear();
}
