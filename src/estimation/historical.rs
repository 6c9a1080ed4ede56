//! Average wait of past completed visits under similar conditions.
//!
//! Candidates are completed visits from the look-back window, preferring the
//! same party size. Matching then walks an ordered chain of tiers and stops at
//! the first tier with any samples.

use crate::estimation::EstimatorConfig;
use crate::queue::{QueueEntry, QueueStatus};
use crate::store::{EntryQuery, EntryStore};
use time::{Duration, OffsetDateTime, Weekday};

/// Read-only projection of a completed visit used for averaging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoricalSample {
    pub created_at: OffsetDateTime,
    pub party_size: u32,
    pub actual_wait_minutes: f64,
}

impl HistoricalSample {
    /// Only seated or done visits with a positive measured wait qualify.
    pub fn from_entry(entry: &QueueEntry) -> Option<Self> {
        if !QueueStatus::COMPLETED.contains(&entry.status) {
            return None;
        }
        let created_at = entry.created_at?;
        let actual_wait_minutes = entry.final_wait_minutes()?;
        (actual_wait_minutes > 0.0).then_some(Self {
            created_at,
            party_size: entry.party_size,
            actual_wait_minutes,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Same weekday and hour within tolerance.
    WeekdayAndHour,
    /// Hour within tolerance on any weekday.
    Hour,
    /// Same weekday at any hour.
    Weekday,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoricalMatch {
    pub minutes: f64,
    pub tier: MatchTier,
    pub samples: usize,
    pub weekday: Weekday,
    pub hour: u8,
}

impl HistoricalMatch {
    pub fn source(&self) -> String {
        format!(
            "Based on {} {}:00 historical data",
            short_weekday(self.weekday),
            self.hour
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Target {
    weekday: Weekday,
    hour: u8,
    hour_tolerance: u32,
}

impl Target {
    fn same_weekday(&self, sample: &HistoricalSample) -> bool {
        sample.created_at.weekday() == self.weekday
    }

    fn near_hour(&self, sample: &HistoricalSample) -> bool {
        let distance = (i32::from(sample.created_at.hour()) - i32::from(self.hour)).unsigned_abs();
        distance <= self.hour_tolerance
    }
}

struct Tier {
    tier: MatchTier,
    matches: fn(&Target, &HistoricalSample) -> bool,
    reduce: fn(&[&HistoricalSample]) -> f64,
}

const TIERS: [Tier; 3] = [
    Tier {
        tier: MatchTier::WeekdayAndHour,
        matches: same_weekday_near_hour,
        reduce: mean_wait,
    },
    Tier {
        tier: MatchTier::Hour,
        matches: Target::near_hour,
        reduce: mean_wait,
    },
    Tier {
        tier: MatchTier::Weekday,
        matches: Target::same_weekday,
        reduce: mean_wait,
    },
];

fn same_weekday_near_hour(target: &Target, sample: &HistoricalSample) -> bool {
    target.same_weekday(sample) && target.near_hour(sample)
}

impl Tier {
    fn apply(&self, target: &Target, candidates: &[HistoricalSample]) -> Option<HistoricalMatch> {
        let matched: Vec<&HistoricalSample> = candidates
            .iter()
            .filter(|sample| (self.matches)(target, *sample))
            .collect();
        if matched.is_empty() {
            return None;
        }
        Some(HistoricalMatch {
            minutes: (self.reduce)(&matched),
            tier: self.tier,
            samples: matched.len(),
            weekday: target.weekday,
            hour: target.hour,
        })
    }
}

fn mean_wait(samples: &[&HistoricalSample]) -> f64 {
    let total: f64 = samples.iter().map(|s| s.actual_wait_minutes).sum();
    round_tenth(total / samples.len() as f64)
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn short_weekday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
        Weekday::Sunday => "Sun",
    }
}

/// Historical average for `entry`, or 0 when no tier matches.
pub fn estimate<S>(entry: &QueueEntry, store: &S, config: &EstimatorConfig) -> f64
where
    S: EntryStore + ?Sized,
{
    find_match(entry, store, config).map_or(0.0, |found| found.minutes)
}

pub fn find_match<S>(
    entry: &QueueEntry,
    store: &S,
    config: &EstimatorConfig,
) -> Option<HistoricalMatch>
where
    S: EntryStore + ?Sized,
{
    let created_at = entry.created_at?;
    let window_start = created_at - Duration::days(i64::from(config.historical_days));
    let window = EntryQuery::new()
        .statuses(&QueueStatus::COMPLETED)
        .created_from(window_start)
        .created_before(created_at);

    let mut candidates = samples(store, &window.clone().party_size(entry.party_size));
    if candidates.is_empty() {
        candidates = samples(store, &window);
    }
    if candidates.is_empty() {
        return None;
    }

    let target = Target {
        weekday: created_at.weekday(),
        hour: created_at.hour(),
        hour_tolerance: config.hour_tolerance,
    };
    TIERS.iter().find_map(|tier| tier.apply(&target, &candidates))
}

fn samples<S>(store: &S, query: &EntryQuery) -> Vec<HistoricalSample>
where
    S: EntryStore + ?Sized,
{
    store
        .find_entries(query)
        .iter()
        .filter_map(HistoricalSample::from_entry)
        .collect()
}
