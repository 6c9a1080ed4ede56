//! Wait-time estimation for waiting-list entries.
//!
//! An estimate is taken from historical visits under similar conditions plus
//! the live queue ahead of the entry. Without usable history it falls back to
//! a queue-position heuristic clamped to configured bounds.

use crate::queue::{CalculationMode, QueueEntry};
use crate::store::EntryStore;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod accuracy;
pub mod adjuster;
pub mod historical;
pub mod simple;

pub const DEFAULT_HISTORICAL_DAYS: u32 = 7;
pub const DEFAULT_HOUR_TOLERANCE: u32 = 1;
pub const DEFAULT_QUEUE_TIME_PER_PERSON: u32 = 1;
pub const DEFAULT_SIMPLE_TIME_PER_PERSON: u32 = 1;
pub const DEFAULT_MINIMUM_WAIT_TIME: u32 = 10;
pub const DEFAULT_MAXIMUM_WAIT_TIME: u32 = 60;

pub const MANUAL_SOURCE: &str = "manual entry by host";

/// Tuning parameters, read from the `[estimation]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Days of completed visits to look back over.
    pub historical_days: u32,
    /// Allowed distance in hours between a sample and the entry.
    pub hour_tolerance: u32,
    /// Minutes added per entry ahead when history is available.
    pub queue_time_per_person: u32,
    /// Minutes per higher-priority entry in the fallback heuristic.
    pub simple_time_per_person: u32,
    pub minimum_wait_time: u32,
    pub maximum_wait_time: u32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            historical_days: DEFAULT_HISTORICAL_DAYS,
            hour_tolerance: DEFAULT_HOUR_TOLERANCE,
            queue_time_per_person: DEFAULT_QUEUE_TIME_PER_PERSON,
            simple_time_per_person: DEFAULT_SIMPLE_TIME_PER_PERSON,
            minimum_wait_time: DEFAULT_MINIMUM_WAIT_TIME,
            maximum_wait_time: DEFAULT_MAXIMUM_WAIT_TIME,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub minutes: f64,
    /// Human readable description of where the value came from.
    pub source: String,
}

impl Estimate {
    pub fn new(minutes: f64, source: impl Into<String>) -> Self {
        Self {
            minutes,
            source: source.into(),
        }
    }

    /// No estimate applies (entry already called or finished).
    pub fn none() -> Self {
        Self::new(0.0, "")
    }

    pub fn manual(minutes: f64) -> Self {
        Self::new(minutes, MANUAL_SOURCE)
    }
}

/// Computes the wait estimate for `entry` against the current contents of `store`.
///
/// Pure with respect to the store: the same snapshot always yields the same estimate.
pub fn compute_estimate<S>(entry: &QueueEntry, store: &S, config: &EstimatorConfig) -> Estimate
where
    S: EntryStore + ?Sized,
{
    if !entry.status.is_estimable() {
        return Estimate::none();
    }
    if entry.calculation_mode == CalculationMode::Manual {
        return Estimate::manual(entry.manual_wait_minutes);
    }
    automatic_estimate(entry, store, config)
}

/// Historical average plus queue adjustment, else the queue-position fallback.
/// Ignores the calculation mode.
pub fn automatic_estimate<S>(entry: &QueueEntry, store: &S, config: &EstimatorConfig) -> Estimate
where
    S: EntryStore + ?Sized,
{
    match historical::find_match(entry, store, config) {
        Some(found) if found.minutes > 0.0 => {
            let adjustment = adjuster::adjustment(entry, store, config.queue_time_per_person);
            debug!(
                entry_id = entry.id,
                tier = ?found.tier,
                samples = found.samples,
                historical = found.minutes,
                adjustment,
                "Historical wait estimate"
            );
            Estimate::new(found.minutes + adjustment, found.source())
        }
        _ => {
            let estimate = simple::estimate(entry, store, config);
            debug!(
                entry_id = entry.id,
                minutes = estimate.minutes,
                "No historical match, using queue position"
            );
            estimate
        }
    }
}
