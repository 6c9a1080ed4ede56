use crate::queue::{CustomerId, EntryId, FloorId, Priority, QueueStatus, TableId};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMode {
    #[default]
    Auto,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    pub id: TableId,
    pub seats: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub id: EntryId,
    pub customer_id: Option<CustomerId>,
    /// Missing only for records imported without a creation time.
    pub created_at: Option<OffsetDateTime>,
    pub party_size: u32,
    pub priority: Priority,
    pub status: QueueStatus,
    pub floor_id: Option<FloorId>,
    pub table: Option<Table>,
    pub table_assigned_at: Option<OffsetDateTime>,
    pub seated_at: Option<OffsetDateTime>,
    pub cancelled_at: Option<OffsetDateTime>,
    pub calculation_mode: CalculationMode,
    pub manual_wait_minutes: f64,
    pub estimated_wait_minutes: f64,
    pub wait_source: String,
}

impl QueueEntry {
    pub fn new(
        id: EntryId,
        created_at: OffsetDateTime,
        party_size: u32,
        priority: Priority,
    ) -> Self {
        Self {
            id,
            customer_id: None,
            created_at: Some(created_at),
            party_size,
            priority,
            status: QueueStatus::Waiting,
            floor_id: None,
            table: None,
            table_assigned_at: None,
            seated_at: None,
            cancelled_at: None,
            calculation_mode: CalculationMode::Auto,
            manual_wait_minutes: 0.0,
            estimated_wait_minutes: 0.0,
            wait_source: String::new(),
        }
    }

    pub fn has_table(&self) -> bool {
        self.table.is_some()
    }

    /// Wait measured up to the seated (or cancelled) timestamp, if the visit has one.
    pub fn final_wait_minutes(&self) -> Option<f64> {
        let created_at = self.created_at?;
        let end = self.seated_at.or(self.cancelled_at)?;
        Some(minutes_between(created_at, end))
    }

    /// Elapsed wait; still running while the entry is in the live queue.
    pub fn actual_wait_minutes(&self, now: OffsetDateTime) -> f64 {
        let Some(created_at) = self.created_at else {
            return 0.0;
        };
        if let Some(minutes) = self.final_wait_minutes() {
            return minutes;
        }
        if self.status.is_active() {
            minutes_between(created_at, now)
        } else {
            0.0
        }
    }
}

fn minutes_between(start: OffsetDateTime, end: OffsetDateTime) -> f64 {
    (end - start).as_seconds_f64() / 60.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn entry() -> QueueEntry {
        QueueEntry::new(1, datetime!(2026-03-02 19:00 UTC), 4, Priority::default())
    }

    #[test]
    fn waiting_entry_reports_running_wait() {
        let entry = entry();
        let wait = entry.actual_wait_minutes(datetime!(2026-03-02 19:12:30 UTC));
        assert_eq!(wait, 12.5);
        assert_eq!(entry.final_wait_minutes(), None);
    }

    #[test]
    fn seated_entry_reports_wait_until_seating() {
        let mut entry = entry();
        entry.status = QueueStatus::Seated;
        entry.seated_at = Some(datetime!(2026-03-02 19:25 UTC));

        assert_eq!(entry.final_wait_minutes(), Some(25.0));
        assert_eq!(entry.actual_wait_minutes(datetime!(2026-03-02 23:00 UTC)), 25.0);
    }

    #[test]
    fn cancelled_entry_uses_cancellation_time() {
        let mut entry = entry();
        entry.status = QueueStatus::Cancelled;
        entry.cancelled_at = Some(datetime!(2026-03-02 19:05 UTC));

        assert_eq!(entry.final_wait_minutes(), Some(5.0));
    }

    #[test]
    fn done_without_end_time_has_no_wait() {
        let mut entry = entry();
        entry.status = QueueStatus::Done;
        assert_eq!(entry.actual_wait_minutes(datetime!(2026-03-02 20:00 UTC)), 0.0);
    }

    #[test]
    fn missing_creation_time_has_no_wait() {
        let mut entry = entry();
        entry.created_at = None;
        entry.seated_at = Some(datetime!(2026-03-02 19:25 UTC));
        assert_eq!(entry.final_wait_minutes(), None);
        assert_eq!(entry.actual_wait_minutes(datetime!(2026-03-02 20:00 UTC)), 0.0);
    }
}
