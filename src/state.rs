use crate::error::AppError;
use crate::estimation::EstimatorConfig;
use crate::lifecycle::WaitingList;
use crate::queue::QueueEntry;
use crate::store::MemoryStore;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;

pub type SharedState = Arc<RwLock<AppState>>;

#[derive(Debug)]
pub struct AppState {
    waiting_list: WaitingList<MemoryStore>,
    queue_tx: watch::Sender<Vec<QueueEntry>>,
}

impl AppState {
    pub fn new(config: EstimatorConfig) -> Self {
        let (queue_tx, _queue_rx) = watch::channel(Vec::new());
        Self {
            waiting_list: WaitingList::new(MemoryStore::new(), config),
            queue_tx,
        }
    }

    pub fn waiting_list(&self) -> &WaitingList<MemoryStore> {
        &self.waiting_list
    }

    /// Receives the live queue, in service order, after every successful change.
    pub fn subscribe_queue(&self) -> watch::Receiver<Vec<QueueEntry>> {
        self.queue_tx.subscribe()
    }

    /// Applies a change to the waiting list and publishes the resulting queue.
    pub fn update<T, F>(&mut self, change: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut WaitingList<MemoryStore>) -> Result<T, AppError>,
    {
        let output = change(&mut self.waiting_list)?;
        self.queue_tx.send_replace(self.waiting_list.queue());
        Ok(output)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(EstimatorConfig::default())
    }
}

pub fn shared(config: EstimatorConfig) -> SharedState {
    Arc::new(RwLock::new(AppState::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::NewEntry;
    use time::macros::datetime;

    fn party(size: u32) -> NewEntry {
        NewEntry {
            party_size: size,
            ..NewEntry::default()
        }
    }

    #[test]
    fn update_publishes_queue_snapshot() -> Result<(), AppError> {
        let mut state = AppState::default();
        let receiver = state.subscribe_queue();

        let entry = state.update(|list| list.add_entry(party(3), datetime!(2026-03-09 19:00 UTC)))?;

        let queue = receiver.borrow();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].id, entry.id);
        Ok(())
    }

    #[test]
    fn update_without_subscribers_succeeds() -> Result<(), AppError> {
        let mut state = AppState::default();
        state.update(|list| list.add_entry(party(2), datetime!(2026-03-09 19:00 UTC)))?;
        assert_eq!(state.waiting_list().queue().len(), 1);
        Ok(())
    }

    #[test]
    fn failed_update_leaves_snapshot_untouched() {
        let mut state = AppState::default();
        let receiver = state.subscribe_queue();

        let result = state.update(|list| list.add_entry(party(0), datetime!(2026-03-09 19:00 UTC)));

        assert!(matches!(result, Err(AppError::InvalidPartySize(0))));
        assert!(receiver.borrow().is_empty());
        assert!(!receiver.has_changed().unwrap_or(true));
    }
}
