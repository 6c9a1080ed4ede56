use crate::queue::{QueueEntry, QueueStatus};
use crate::store::EntryQuery;
use serde::Serialize;
use time::{Date, Duration};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStatistics {
    pub waiting_count: usize,
    pub seated_count: usize,
    pub total_count: usize,
    /// Average wait of today's seated entries, one decimal.
    pub avg_wait_time: f64,
}

/// Entries created on `day` (UTC).
pub fn day_query(day: Date) -> EntryQuery {
    let start = day.midnight().assume_utc();
    EntryQuery::new()
        .created_from(start)
        .created_before(start + Duration::days(1))
}

pub fn summarize(entries: &[QueueEntry]) -> DashboardStatistics {
    let waiting_count = entries.iter().filter(|e| e.status.is_active()).count();
    let seated_waits: Vec<f64> = entries
        .iter()
        .filter(|e| e.status == QueueStatus::Seated)
        .filter_map(QueueEntry::final_wait_minutes)
        .filter(|minutes| *minutes > 0.0)
        .collect();
    let seated_count = entries
        .iter()
        .filter(|e| e.status == QueueStatus::Seated)
        .count();
    let avg_wait_time = if seated_waits.is_empty() {
        0.0
    } else {
        let mean = seated_waits.iter().sum::<f64>() / seated_waits.len() as f64;
        (mean * 10.0).round() / 10.0
    };

    DashboardStatistics {
        waiting_count,
        seated_count,
        total_count: entries.len(),
        avg_wait_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::fixtures::{seated, waiting};
    use crate::store::{EntryStore, EntryWriter, MemoryStore};
    use time::macros::{date, datetime};

    #[test]
    fn summarizes_only_the_requested_day() {
        let mut store = MemoryStore::new();
        store.save(waiting(1, datetime!(2026-03-09 18:00 UTC), 0));
        let mut called = waiting(2, datetime!(2026-03-09 18:10 UTC), 0);
        called.status = QueueStatus::Called;
        store.save(called);
        let mut first = seated(3, datetime!(2026-03-09 12:00 UTC), 2, 10);
        first.status = QueueStatus::Seated;
        store.save(first);
        let mut second = seated(4, datetime!(2026-03-09 13:00 UTC), 2, 15);
        second.status = QueueStatus::Seated;
        store.save(second);
        // Done visits count toward the total only.
        store.save(seated(5, datetime!(2026-03-09 11:00 UTC), 2, 40));
        store.save(waiting(6, datetime!(2026-03-08 23:59 UTC), 0));

        let entries = store.find_entries(&day_query(date!(2026-03-09)));
        let stats = summarize(&entries);

        assert_eq!(
            stats,
            DashboardStatistics {
                waiting_count: 2,
                seated_count: 2,
                total_count: 5,
                avg_wait_time: 12.5,
            }
        );
    }

    #[test]
    fn empty_day_has_zero_average() {
        let stats = summarize(&[]);
        assert_eq!(stats.total_count, 0);
        assert_eq!(stats.avg_wait_time, 0.0);
    }
}
