use chrono::{Datelike, NaiveDate, Weekday};
use tracing::{debug, warn};

use super::catalog::SlotCatalog;
use super::rules::{DateStrategy, InclusionRules};
use super::temporal::end_of_iso_week;
use super::types::CandidateSlot;

/// First and last day to generate slots for, per the rules' date strategy.
///
/// A date range missing its end collapses to its start day; a missing anchor
/// (or range start), or a week running past chrono's last date, leaves
/// nothing to generate.
pub fn generation_window(rules: &InclusionRules) -> Option<(NaiveDate, NaiveDate)> {
    match rules.date_strategy {
        DateStrategy::SameDay => {
            let anchor = rules.anchor_date()?;
            Some((anchor, anchor))
        }
        DateStrategy::SameWeek => {
            let anchor = rules.anchor_date()?;
            Some((anchor, end_of_iso_week(anchor)?))
        }
        DateStrategy::DateRange => {
            let start = rules.range_start?.date();
            let end = rules.range_end.map(|end| end.date()).unwrap_or(start);
            Some((start, end))
        }
        DateStrategy::None => {
            let start = rules.start_date?;
            Some((start, start))
        }
    }
}

/// Days in `[start, end]` without Sundays, or just `start` if none remain.
pub fn candidate_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let days: Vec<NaiveDate> = start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| day.weekday() != Weekday::Sun)
        .collect();

    if days.is_empty() {
        vec![start]
    } else {
        days
    }
}

/// Every start × end × room × day combination with start before end.
pub fn generate_slots(rules: &InclusionRules, catalog: &SlotCatalog) -> Vec<CandidateSlot> {
    let Some((start, end)) = generation_window(rules) else {
        warn!(strategy = ?rules.date_strategy, "no date to generate slots for");
        return Vec::new();
    };
    let days = candidate_days(start, end);

    let mut slots = Vec::new();
    for &start_time in &catalog.start_times {
        for &end_time in &catalog.end_times {
            if start_time >= end_time {
                continue;
            }
            for room in &catalog.rooms {
                for &day in &days {
                    slots.push(CandidateSlot::new(start_time, end_time, &room.name, day));
                }
            }
        }
    }

    debug!(%start, %end, days = days.len(), generated = slots.len(), "generated candidate slots");
    slots
}
