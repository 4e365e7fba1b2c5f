use std::collections::BTreeMap;

use crate::schedule::temporal::{parse_date, weekday_label};
use crate::schedule::{Appointment, CandidateSlot};

/// Formats a slot as "Seg 01/04/2024 08:00:00-09:30:00 [B1.04]"
pub fn format_slot(slot: &CandidateSlot) -> String {
    let weekday = parse_date(&slot.date).map(weekday_label).unwrap_or("?");
    format!(
        "{} {} {}-{} [{}]",
        weekday, slot.date, slot.start_time, slot.end_time, slot.room
    )
}

/// Prints candidate slots, numbered from 0 as the selection workflow expects
pub fn print_slots(title: &str, slots: &[CandidateSlot]) {
    println!("\n=== {} ===", title);
    println!("Free slots found: {}", slots.len());
    for (index, slot) in slots.iter().enumerate() {
        println!("  {:>4}  {}", index, format_slot(slot));
    }
}

/// Lessons per semester week, undated rows under `None`
pub fn semester_week_counts(schedule: &[Appointment]) -> BTreeMap<Option<u32>, usize> {
    let mut counts = BTreeMap::new();
    for row in schedule {
        *counts.entry(row.week_of_semester).or_insert(0) += 1;
    }
    counts
}

/// Prints the annotated schedule as a per-week summary
pub fn print_week_summary(schedule: &[Appointment]) {
    println!("\n=== Schedule by semester week ===");
    println!("Total lessons: {}", schedule.len());
    for (week, count) in semester_week_counts(schedule) {
        match week {
            Some(week) => println!("  Week {:>2} -> {} lessons", week, count),
            None => println!("  [NO DATE] -> {} lessons", count),
        }
    }
}
