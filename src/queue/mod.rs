//! Waiting-list domain types.
//!
//! A [`QueueEntry`] is one party waiting for a table. Entries are served in
//! `(priority desc, created_at asc)` order; see [`queue_order`].

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub mod entry;
pub mod status;

pub use entry::{CalculationMode, QueueEntry, Table};
pub use status::QueueStatus;

pub type EntryId = u64;
pub type CustomerId = u64;
pub type TableId = u32;
pub type FloorId = u32;

/// Star rating from 0 (no priority) to 5 (VIP).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, AppError> {
        if value > Self::MAX {
            return Err(AppError::InvalidPriority(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Priority {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

/// Service order of the live queue: higher priority first, then first come first served.
pub fn queue_order(a: &QueueEntry, b: &QueueEntry) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}
