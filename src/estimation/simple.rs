//! Queue-position heuristic used when no historical data matches.
//!
//! Unlike the queue adjustment, only strictly higher priorities count here;
//! same-priority arrivals ahead are ignored.

use crate::estimation::{Estimate, EstimatorConfig};
use crate::queue::{QueueEntry, QueueStatus};
use crate::store::{EntryQuery, EntryStore, PriorityFilter};

pub fn higher_priority_count<S>(entry: &QueueEntry, store: &S) -> usize
where
    S: EntryStore + ?Sized,
{
    let Some(created_at) = entry.created_at else {
        return 0;
    };
    let query = EntryQuery::new()
        .statuses(&QueueStatus::ACTIVE)
        .created_before(created_at)
        .excluding(entry.id)
        .priority(PriorityFilter::Above(entry.priority));
    store.count_entries(&query)
}

/// `ahead * simple_time_per_person`, clamped to `[minimum_wait_time, maximum_wait_time]`.
pub fn estimate<S>(entry: &QueueEntry, store: &S, config: &EstimatorConfig) -> Estimate
where
    S: EntryStore + ?Sized,
{
    let ahead = higher_priority_count(entry, store);
    clamp_to_bounds(ahead, config)
}

fn clamp_to_bounds(ahead: usize, config: &EstimatorConfig) -> Estimate {
    let base = ahead as f64 * f64::from(config.simple_time_per_person);
    let minimum = f64::from(config.minimum_wait_time);
    let maximum = f64::from(config.maximum_wait_time);

    if base < minimum {
        Estimate::new(
            minimum,
            format!(
                "Minimum wait time ({} min) - {ahead} customers ahead",
                config.minimum_wait_time
            ),
        )
    } else if base > maximum {
        Estimate::new(
            maximum,
            format!(
                "Maximum wait time limit ({} min) - {ahead} customers ahead",
                config.maximum_wait_time
            ),
        )
    } else {
        Estimate::new(
            base,
            format!("Based on current queue position ({ahead} customers ahead)"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::fixtures::waiting;
    use crate::store::{EntryWriter, MemoryStore};
    use time::Duration;
    use time::macros::datetime;

    fn store_with_higher_priority(count: i64) -> MemoryStore {
        let mut store = MemoryStore::new();
        for n in 0..count {
            let created_at = datetime!(2026-03-09 12:00 UTC) + Duration::minutes(n);
            store.save(waiting(n as u64 + 1, created_at, 3));
        }
        store
    }

    #[test]
    fn short_queue_is_floored_to_minimum() {
        let store = store_with_higher_priority(2);
        let entry = waiting(1000, datetime!(2026-03-09 18:00 UTC), 0);

        let estimate = estimate(&entry, &store, &EstimatorConfig::default());

        assert_eq!(estimate.minutes, 10.0);
        assert_eq!(
            estimate.source,
            "Minimum wait time (10 min) - 2 customers ahead"
        );
    }

    #[test]
    fn long_queue_is_capped_at_maximum() {
        let store = store_with_higher_priority(70);
        let entry = waiting(1000, datetime!(2026-03-09 18:00 UTC), 0);

        let estimate = estimate(&entry, &store, &EstimatorConfig::default());

        assert_eq!(estimate.minutes, 60.0);
        assert!(estimate.source.starts_with("Maximum wait time limit (60 min)"));
        assert!(estimate.source.contains("70 customers ahead"));
    }

    #[test]
    fn mid_queue_uses_raw_position() {
        let store = store_with_higher_priority(25);
        let entry = waiting(1000, datetime!(2026-03-09 18:00 UTC), 0);

        let estimate = estimate(&entry, &store, &EstimatorConfig::default());

        assert_eq!(estimate.minutes, 25.0);
        assert_eq!(
            estimate.source,
            "Based on current queue position (25 customers ahead)"
        );
    }

    #[test]
    fn same_priority_entries_ahead_are_not_counted() {
        let mut store = MemoryStore::new();
        store.save(waiting(1, datetime!(2026-03-09 17:00 UTC), 0));
        store.save(waiting(2, datetime!(2026-03-09 17:10 UTC), 0));
        let entry = waiting(3, datetime!(2026-03-09 18:00 UTC), 0);

        assert_eq!(higher_priority_count(&entry, &store), 0);
    }

    #[test]
    fn clamp_follows_configured_rate_and_bounds() {
        let config = EstimatorConfig {
            simple_time_per_person: 5,
            minimum_wait_time: 0,
            maximum_wait_time: 30,
            ..EstimatorConfig::default()
        };
        for n in 0..12 {
            let expected = (n as f64 * 5.0).clamp(0.0, 30.0);
            assert_eq!(clamp_to_bounds(n, &config).minutes, expected);
        }
    }
}
