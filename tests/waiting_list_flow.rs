use time::macros::datetime;
use time::{Duration, OffsetDateTime};
use waitlist_eta::error::AppError;
use waitlist_eta::estimation::EstimatorConfig;
use waitlist_eta::lifecycle::NewEntry;
use waitlist_eta::queue::{EntryId, Priority, QueueStatus, Table};
use waitlist_eta::state::AppState;

fn arrival(party_size: u32, priority: u8, created_at: OffsetDateTime) -> Result<NewEntry, AppError> {
    Ok(NewEntry {
        party_size,
        priority: Priority::new(priority)?,
        created_at: Some(created_at),
        ..NewEntry::default()
    })
}

fn seat_visit(
    state: &mut AppState,
    created_at: OffsetDateTime,
    wait: Duration,
) -> Result<EntryId, AppError> {
    let entry = state.update(|list| list.add_entry(arrival(2, 0, created_at)?, created_at))?;
    let seated_at = created_at + wait;
    state.update(|list| {
        list.assign_table(entry.id, Table { id: 1, seats: 4 }, seated_at)?;
        list.seat(entry.id, seated_at)
    })?;
    Ok(entry.id)
}

#[test]
fn last_weeks_visits_drive_tonights_estimate() -> Result<(), AppError> {
    let mut state = AppState::new(EstimatorConfig::default());
    let queue_rx = state.subscribe_queue();

    seat_visit(&mut state, datetime!(2026-03-02 19:10 UTC), Duration::minutes(20))?;
    seat_visit(&mut state, datetime!(2026-03-02 19:20 UTC), Duration::minutes(30))?;

    let now = datetime!(2026-03-09 19:00 UTC);
    let first = state.update(|list| list.add_entry(arrival(2, 0, now)?, now))?;
    let second = state.update(|list| {
        list.add_entry(arrival(2, 0, now + Duration::minutes(5))?, now)
    })?;

    assert_eq!(first.estimated_wait_minutes, 25.0);
    assert_eq!(first.wait_source, "Based on Mon 19:00 historical data");
    // One party already waiting ahead adds a minute.
    assert_eq!(second.estimated_wait_minutes, 26.0);

    let queue: Vec<EntryId> = queue_rx.borrow().iter().map(|entry| entry.id).collect();
    assert_eq!(queue, vec![first.id, second.id]);
    Ok(())
}

#[test]
fn empty_history_falls_back_to_queue_position() -> Result<(), AppError> {
    let mut state = AppState::new(EstimatorConfig::default());
    let now = datetime!(2026-03-09 19:00 UTC);

    let earlier = now - Duration::minutes(10);
    state.update(|list| list.add_entry(arrival(2, 4, earlier)?, earlier))?;
    let regular = state.update(|list| list.add_entry(arrival(2, 0, now)?, now))?;

    assert_eq!(regular.estimated_wait_minutes, 10.0);
    assert_eq!(
        regular.wait_source,
        "Minimum wait time (10 min) - 1 customers ahead"
    );
    Ok(())
}

#[test]
fn no_show_leaves_queue_and_counts_against_customer() -> Result<(), AppError> {
    let mut state = AppState::new(EstimatorConfig::default());
    let queue_rx = state.subscribe_queue();
    let now = datetime!(2026-03-09 19:00 UTC);
    let mut new_entry = arrival(3, 0, now)?;
    new_entry.customer_id = Some(77);

    let entry = state.update(|list| list.add_entry(new_entry, now))?;
    state.update(|list| list.call(entry.id, now))?;
    let missed = state.update(|list| list.mark_no_show(entry.id, now + Duration::minutes(15)))?;

    assert_eq!(missed.status, QueueStatus::NoShow);
    assert_eq!(state.waiting_list().no_show_count(77), 1);
    assert!(queue_rx.borrow().is_empty());
    Ok(())
}
