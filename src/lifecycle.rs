//! Entry lifecycle controller.
//!
//! Owns the store and the estimator configuration, applies status changes
//! through the state machine, and keeps `estimated_wait_minutes` current while
//! an entry is waiting or ready. Once called, the estimate is frozen.

use crate::error::AppError;
use crate::estimation::accuracy::SeatingFeedback;
use crate::estimation::{Estimate, EstimatorConfig, automatic_estimate, compute_estimate};
use crate::queue::{
    CalculationMode, CustomerId, EntryId, FloorId, Priority, QueueEntry, QueueStatus, Table,
};
use crate::stats::{DashboardStatistics, day_query, summarize};
use crate::store::{EntryQuery, EntryWriter};
use time::{Date, OffsetDateTime};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEntry {
    pub party_size: u32,
    pub priority: Priority,
    pub customer_id: Option<CustomerId>,
    pub floor_id: Option<FloorId>,
    pub calculation_mode: CalculationMode,
    pub manual_wait_minutes: f64,
    /// Overrides the arrival time, e.g. when back-filling history.
    pub created_at: Option<OffsetDateTime>,
}

/// Result of a table assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignedTable {
    pub entry: QueueEntry,
    /// Seated entry still holding the same table; the assignment goes through anyway.
    pub occupied_by: Option<EntryId>,
}

#[derive(Debug)]
pub struct WaitingList<S> {
    store: S,
    config: EstimatorConfig,
}

impl<S: EntryWriter> WaitingList<S> {
    pub fn new(store: S, config: EstimatorConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn get(&self, id: EntryId) -> Result<QueueEntry, AppError> {
        self.store.get(id).ok_or(AppError::NotFound(id))
    }

    /// Live queue in service order.
    pub fn queue(&self) -> Vec<QueueEntry> {
        self.store
            .find_entries(&EntryQuery::new().statuses(&QueueStatus::ACTIVE))
    }

    pub fn estimate(&self, entry: &QueueEntry) -> Estimate {
        compute_estimate(entry, &self.store, &self.config)
    }

    pub fn add_entry(
        &mut self,
        new_entry: NewEntry,
        now: OffsetDateTime,
    ) -> Result<QueueEntry, AppError> {
        if new_entry.party_size == 0 {
            return Err(AppError::InvalidPartySize(new_entry.party_size));
        }
        check_manual_wait(new_entry.manual_wait_minutes)?;
        let id = self.store.next_id();
        let created_at = new_entry.created_at.unwrap_or(now);
        let mut entry = QueueEntry::new(id, created_at, new_entry.party_size, new_entry.priority);
        entry.customer_id = new_entry.customer_id;
        entry.floor_id = new_entry.floor_id;
        entry.calculation_mode = new_entry.calculation_mode;
        entry.manual_wait_minutes = new_entry.manual_wait_minutes;

        // Manual mode without a value starts from the automatic estimate.
        let estimate = if entry.calculation_mode == CalculationMode::Manual
            && entry.manual_wait_minutes > 0.0
        {
            Estimate::manual(entry.manual_wait_minutes)
        } else {
            automatic_estimate(&entry, &self.store, &self.config)
        };
        entry.estimated_wait_minutes = estimate.minutes;
        entry.wait_source = estimate.source;
        self.store.save(entry.clone());
        info!(
            entry_id = id,
            party_size = entry.party_size,
            priority = entry.priority.value(),
            minutes = entry.estimated_wait_minutes,
            source = %entry.wait_source,
            "Entry added to waiting list"
        );
        Ok(entry)
    }

    pub fn change_party_size(
        &mut self,
        id: EntryId,
        party_size: u32,
    ) -> Result<QueueEntry, AppError> {
        if party_size == 0 {
            return Err(AppError::InvalidPartySize(party_size));
        }
        let mut entry = self.editable(id)?;
        if let Some(table) = entry.table {
            check_capacity(table, party_size)?;
        }
        entry.party_size = party_size;
        self.refresh_estimate(&mut entry);
        self.store.save(entry.clone());
        Ok(entry)
    }

    /// Moving to another floor drops the table assigned on the previous one.
    pub fn set_floor(
        &mut self,
        id: EntryId,
        floor_id: Option<FloorId>,
    ) -> Result<QueueEntry, AppError> {
        let mut entry = self.editable(id)?;
        if entry.floor_id != floor_id {
            entry.floor_id = floor_id;
            entry.table = None;
            entry.table_assigned_at = None;
        }
        self.refresh_estimate(&mut entry);
        self.store.save(entry.clone());
        Ok(entry)
    }

    pub fn set_calculation_mode(
        &mut self,
        id: EntryId,
        mode: CalculationMode,
        manual_wait_minutes: f64,
    ) -> Result<QueueEntry, AppError> {
        check_manual_wait(manual_wait_minutes)?;
        let mut entry = self.editable(id)?;
        entry.calculation_mode = mode;
        entry.manual_wait_minutes = manual_wait_minutes;
        self.refresh_estimate(&mut entry);
        self.store.save(entry.clone());
        Ok(entry)
    }

    /// Assigns a table; a waiting entry becomes ready.
    pub fn assign_table(
        &mut self,
        id: EntryId,
        table: Table,
        now: OffsetDateTime,
    ) -> Result<AssignedTable, AppError> {
        let mut entry = self.get(id)?;
        if !entry.status.is_active() {
            warn!(entry_id = id, status = %entry.status, "Rejected table assignment");
            return Err(AppError::TableAssignment(entry.status));
        }
        check_capacity(table, entry.party_size)?;
        let occupied_by = self
            .store
            .find_entries(
                &EntryQuery::new()
                    .statuses(&[QueueStatus::Seated])
                    .table(table.id)
                    .excluding(id),
            )
            .first()
            .map(|occupant| occupant.id);
        if let Some(occupant) = occupied_by {
            warn!(
                entry_id = id,
                table_id = table.id,
                occupied_by = occupant,
                "Table assigned while still occupied"
            );
        }

        entry.table = Some(table);
        entry.table_assigned_at = Some(now);
        if entry.status == QueueStatus::Waiting {
            entry.status = QueueStatus::Ready;
        }
        self.refresh_estimate(&mut entry);
        self.store.save(entry.clone());
        info!(
            entry_id = id,
            table_id = table.id,
            status = %entry.status,
            "Table assigned"
        );
        Ok(AssignedTable { entry, occupied_by })
    }

    /// Explicit recalculation requested by the host.
    pub fn recalculate(&mut self, id: EntryId) -> Result<QueueEntry, AppError> {
        let mut entry = self.get(id)?;
        if !entry.status.is_estimable() {
            return Err(AppError::NotEstimable(entry.status));
        }
        if entry.calculation_mode == CalculationMode::Manual {
            return Err(AppError::ManualMode);
        }
        self.refresh_estimate(&mut entry);
        self.store.save(entry.clone());
        info!(
            entry_id = id,
            minutes = entry.estimated_wait_minutes,
            source = %entry.wait_source,
            "Wait time recalculated"
        );
        Ok(entry)
    }

    pub fn mark_ready(&mut self, id: EntryId, now: OffsetDateTime) -> Result<QueueEntry, AppError> {
        self.transition(id, QueueStatus::Ready, now)
    }

    pub fn call(&mut self, id: EntryId, now: OffsetDateTime) -> Result<QueueEntry, AppError> {
        self.transition(id, QueueStatus::Called, now)
    }

    /// Seats the party and compares the observed wait with the estimate.
    pub fn seat(
        &mut self,
        id: EntryId,
        now: OffsetDateTime,
    ) -> Result<(QueueEntry, Option<SeatingFeedback>), AppError> {
        let entry = self.transition(id, QueueStatus::Seated, now)?;
        let feedback =
            SeatingFeedback::evaluate(entry.actual_wait_minutes(now), entry.estimated_wait_minutes);
        Ok((entry, feedback))
    }

    pub fn mark_done(&mut self, id: EntryId, now: OffsetDateTime) -> Result<QueueEntry, AppError> {
        self.transition(id, QueueStatus::Done, now)
    }

    pub fn cancel(&mut self, id: EntryId, now: OffsetDateTime) -> Result<QueueEntry, AppError> {
        self.transition(id, QueueStatus::Cancelled, now)
    }

    pub fn mark_no_show(
        &mut self,
        id: EntryId,
        now: OffsetDateTime,
    ) -> Result<QueueEntry, AppError> {
        let entry = self.transition(id, QueueStatus::NoShow, now)?;
        if let Some(customer_id) = entry.customer_id {
            let count = self.store.record_no_show(customer_id);
            info!(customer_id, no_shows = count, "Customer no-show recorded");
        }
        Ok(entry)
    }

    pub fn no_show_count(&self, customer_id: CustomerId) -> u32 {
        self.store.no_show_count(customer_id)
    }

    pub fn dashboard(&self, day: Date) -> DashboardStatistics {
        summarize(&self.store.find_entries(&day_query(day)))
    }

    /// Context edits are limited to entries still in the live queue.
    fn editable(&self, id: EntryId) -> Result<QueueEntry, AppError> {
        let entry = self.get(id)?;
        if !entry.status.is_active() {
            warn!(entry_id = id, status = %entry.status, "Rejected edit of closed entry");
            return Err(AppError::NotEditable(entry.status));
        }
        Ok(entry)
    }

    fn transition(
        &mut self,
        id: EntryId,
        next: QueueStatus,
        now: OffsetDateTime,
    ) -> Result<QueueEntry, AppError> {
        let mut entry = self.get(id)?;
        if let Err(err) = entry.status.validate_transition(next, entry.has_table()) {
            warn!(entry_id = id, from = %entry.status, to = %next, error = %err, "Rejected status change");
            return Err(err);
        }
        let previous = entry.status;
        entry.status = next;
        match next {
            QueueStatus::Seated => entry.seated_at = Some(now),
            QueueStatus::Cancelled | QueueStatus::NoShow => entry.cancelled_at = Some(now),
            _ => {}
        }
        self.store.save(entry.clone());
        info!(entry_id = id, from = %previous, to = %next, "Status changed");
        Ok(entry)
    }

    fn refresh_estimate(&self, entry: &mut QueueEntry) {
        if !entry.status.is_estimable() {
            return;
        }
        let estimate = self.estimate(entry);
        entry.estimated_wait_minutes = estimate.minutes;
        entry.wait_source = estimate.source;
    }
}

fn check_manual_wait(minutes: f64) -> Result<(), AppError> {
    if !minutes.is_finite() || minutes < 0.0 {
        return Err(AppError::InvalidManualWait(minutes));
    }
    Ok(())
}

fn check_capacity(table: Table, party_size: u32) -> Result<(), AppError> {
    if party_size > table.seats {
        return Err(AppError::TableCapacity {
            seats: table.seats,
            party_size,
        });
    }
    Ok(())
}
