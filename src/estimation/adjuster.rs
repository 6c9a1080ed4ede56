//! Extra minutes for the live queue ahead of an entry.

use crate::queue::{QueueEntry, QueueStatus};
use crate::store::{EntryQuery, EntryStore, PriorityFilter};

/// Active entries that arrived earlier and are served first under
/// `(priority desc, created_at asc)`. Later arrivals never count, whatever their priority.
pub fn ahead_count<S>(entry: &QueueEntry, store: &S) -> usize
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
        .priority(PriorityFilter::AheadOf {
            priority: entry.priority,
            created_at,
        });
    store.count_entries(&query)
}

pub fn adjustment<S>(entry: &QueueEntry, store: &S, minutes_per_person: u32) -> f64
where
    S: EntryStore + ?Sized,
{
    ahead_count(entry, store) as f64 * f64::from(minutes_per_person)
}
