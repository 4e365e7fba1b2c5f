use std::collections::HashMap;

use tracing::debug;

use super::types::{Appointment, CandidateSlot, SlotKey};

/// Index of the occupied (date, start, end, room) slots of a schedule.
///
/// Rows whose date, hours or room cannot be read are left out.
pub fn occupied_index(schedule: &[Appointment]) -> HashMap<SlotKey, &Appointment> {
    schedule
        .iter()
        .filter_map(|row| SlotKey::of(row).map(|key| (key, row)))
        .collect()
}

/// Drops the candidates that are already taken in `schedule`.
pub fn remove_conflicts(slots: Vec<CandidateSlot>, schedule: &[Appointment]) -> Vec<CandidateSlot> {
    let occupied = occupied_index(schedule);
    if occupied.is_empty() {
        return slots;
    }

    let before = slots.len();
    let free: Vec<CandidateSlot> = slots
        .into_iter()
        .filter(|slot| match SlotKey::of(slot) {
            Some(key) => !occupied.contains_key(&key),
            None => true,
        })
        .collect();

    debug!(occupied = occupied.len(), removed = before - free.len(), "removed occupied slots");
    free
}
