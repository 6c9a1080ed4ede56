//! Persistence seam for waiting-list entries.
//!
//! The estimator only needs [`EntryStore::find_entries`]; the lifecycle controller
//! additionally writes through [`EntryWriter`]. [`MemoryStore`] backs both in-process.

use crate::queue::{CustomerId, EntryId, Priority, QueueEntry, QueueStatus, TableId, queue_order};
use std::collections::{BTreeMap, HashMap};
use time::OffsetDateTime;

/// Priority comparison applied by a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriorityFilter {
    /// Strictly higher priority only.
    Above(Priority),
    /// Served before an entry with this priority and arrival time.
    AheadOf {
        priority: Priority,
        created_at: OffsetDateTime,
    },
}

impl PriorityFilter {
    fn matches(&self, entry: &QueueEntry) -> bool {
        match *self {
            PriorityFilter::Above(priority) => entry.priority > priority,
            PriorityFilter::AheadOf {
                priority,
                created_at,
            } => {
                entry.priority > priority
                    || (entry.priority == priority
                        && entry.created_at.is_some_and(|c| c < created_at))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryQuery {
    pub statuses: Option<Vec<QueueStatus>>,
    /// Inclusive lower bound on creation time.
    pub created_from: Option<OffsetDateTime>,
    /// Exclusive upper bound on creation time.
    pub created_before: Option<OffsetDateTime>,
    pub party_size: Option<u32>,
    pub table_id: Option<TableId>,
    pub exclude: Option<EntryId>,
    pub priority: Option<PriorityFilter>,
}

impl EntryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(mut self, statuses: &[QueueStatus]) -> Self {
        self.statuses = Some(statuses.to_vec());
        self
    }

    pub fn created_from(mut self, from: OffsetDateTime) -> Self {
        self.created_from = Some(from);
        self
    }

    pub fn created_before(mut self, before: OffsetDateTime) -> Self {
        self.created_before = Some(before);
        self
    }

    pub fn party_size(mut self, party_size: u32) -> Self {
        self.party_size = Some(party_size);
        self
    }

    /// Entries holding the table with this id.
    pub fn table(mut self, table_id: TableId) -> Self {
        self.table_id = Some(table_id);
        self
    }

    pub fn excluding(mut self, id: EntryId) -> Self {
        self.exclude = Some(id);
        self
    }

    pub fn priority(mut self, filter: PriorityFilter) -> Self {
        self.priority = Some(filter);
        self
    }

    /// Time bounds never match an entry without a creation time.
    pub fn matches(&self, entry: &QueueEntry) -> bool {
        if let Some(statuses) = &self.statuses
            && !statuses.contains(&entry.status)
        {
            return false;
        }
        if self.exclude == Some(entry.id) {
            return false;
        }
        if let Some(party_size) = self.party_size
            && entry.party_size != party_size
        {
            return false;
        }
        if let Some(table_id) = self.table_id
            && entry.table.map(|table| table.id) != Some(table_id)
        {
            return false;
        }
        if self.created_from.is_some() || self.created_before.is_some() {
            let Some(created_at) = entry.created_at else {
                return false;
            };
            if self.created_from.is_some_and(|from| created_at < from) {
                return false;
            }
            if self.created_before.is_some_and(|before| created_at >= before) {
                return false;
            }
        }
        match &self.priority {
            Some(filter) => filter.matches(entry),
            None => true,
        }
    }
}

/// Read access to stored entries.
pub trait EntryStore {
    /// Entries matching `query`, ordered by `(priority desc, created_at asc)`.
    fn find_entries(&self, query: &EntryQuery) -> Vec<QueueEntry>;

    fn get(&self, id: EntryId) -> Option<QueueEntry>;

    fn count_entries(&self, query: &EntryQuery) -> usize {
        self.find_entries(query).len()
    }
}

/// Write access used by the lifecycle controller.
pub trait EntryWriter: EntryStore {
    fn next_id(&mut self) -> EntryId;

    /// Inserts or replaces the entry with the same id.
    fn save(&mut self, entry: QueueEntry);

    /// Bumps the customer's no-show counter and returns the new value.
    fn record_no_show(&mut self, customer_id: CustomerId) -> u32;

    fn no_show_count(&self, customer_id: CustomerId) -> u32;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<EntryId, QueueEntry>,
    last_id: EntryId,
    no_shows: HashMap<CustomerId, u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntryStore for MemoryStore {
    fn find_entries(&self, query: &EntryQuery) -> Vec<QueueEntry> {
        let mut found: Vec<QueueEntry> = self
            .entries
            .values()
            .filter(|entry| query.matches(entry))
            .cloned()
            .collect();
        found.sort_by(queue_order);
        found
    }

    fn get(&self, id: EntryId) -> Option<QueueEntry> {
        self.entries.get(&id).cloned()
    }

    fn count_entries(&self, query: &EntryQuery) -> usize {
        self.entries.values().filter(|e| query.matches(e)).count()
    }
}

impl EntryWriter for MemoryStore {
    fn next_id(&mut self) -> EntryId {
        self.last_id += 1;
        self.last_id
    }

    fn save(&mut self, entry: QueueEntry) {
        self.last_id = self.last_id.max(entry.id);
        self.entries.insert(entry.id, entry);
    }

    fn record_no_show(&mut self, customer_id: CustomerId) -> u32 {
        let count = self.no_shows.entry(customer_id).or_insert(0);
        *count += 1;
        *count
    }

    fn no_show_count(&self, customer_id: CustomerId) -> u32 {
        self.no_shows.get(&customer_id).copied().unwrap_or(0)
    }
}
