use crate::queue::{EntryId, QueueStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("waiting list entry {0} not found")]
    NotFound(EntryId),
    #[error("cannot move entry from {from} to {to}")]
    InvalidTransition { from: QueueStatus, to: QueueStatus },
    #[error("a table must be assigned before seating")]
    TableRequired,
    #[error("tables can only be assigned to waiting, ready or called entries (status: {0})")]
    TableAssignment(QueueStatus),
    #[error("table with {seats} seats cannot accommodate a party of {party_size}")]
    TableCapacity { seats: u32, party_size: u32 },
    #[error("wait time can only be calculated for waiting or ready entries (status: {0})")]
    NotEstimable(QueueStatus),
    #[error("only waiting, ready or called entries can be edited (status: {0})")]
    NotEditable(QueueStatus),
    #[error("wait time cannot be recalculated in manual mode")]
    ManualMode,
    #[error("party size must be at least 1 (got {0})")]
    InvalidPartySize(u32),
    #[error("manual wait time must be a non-negative number of minutes (got {0})")]
    InvalidManualWait(f64),
    #[error("priority must be between 0 and 5 (got {0})")]
    InvalidPriority(u8),
    #[error("state lock poisoned")]
    StateLock,
}
