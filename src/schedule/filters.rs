//! Exclusion and inclusion predicates over candidate slots.
//!
//! Which predicates run is decided once per search from the populated rule
//! fields (see [`resolve_exclusions`] and [`resolve_inclusions`]). Every
//! predicate answers `false` when a field it needs is missing on either side.

use chrono::Datelike;
use tracing::debug;

use super::catalog::SlotCatalog;
use super::rules::{field, DateStrategy, ExclusionRules, InclusionRules};
use super::temporal::{minutes_between, parse_date, parse_hour, parse_weekday, DayPeriod};
use super::types::{same_name, CandidateSlot, SlotKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionFilter {
    StartHour,
    EndHour,
    HourRange,
    Weekday,
    Shift,
    Room,
    TakenSlot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InclusionFilter {
    Room,
    Feature,
    SameDay,
    SameWeek,
    DateRange,
    Duration,
}

type ExclusionTrigger = fn(&ExclusionRules) -> bool;
type InclusionTrigger = fn(&InclusionRules) -> bool;

/// Registration order of the exclusion filters and the rule fields that enable them.
const EXCLUSION_TABLE: [(ExclusionTrigger, ExclusionFilter); 7] = [
    (only_start_hour, ExclusionFilter::StartHour),
    (only_end_hour, ExclusionFilter::EndHour),
    (both_hours, ExclusionFilter::HourRange),
    (weekday_set, ExclusionFilter::Weekday),
    (shift_set, ExclusionFilter::Shift),
    (excluded_rooms_set, ExclusionFilter::Room),
    (taken_slots_set, ExclusionFilter::TakenSlot),
];

/// Registration order of the inclusion filters; at most one date filter applies.
const INCLUSION_TABLE: [(InclusionTrigger, InclusionFilter); 6] = [
    (rooms_set, InclusionFilter::Room),
    (features_set, InclusionFilter::Feature),
    (same_day_strategy, InclusionFilter::SameDay),
    (same_week_strategy, InclusionFilter::SameWeek),
    (date_range_strategy, InclusionFilter::DateRange),
    (duration_set, InclusionFilter::Duration),
];

fn only_start_hour(rules: &ExclusionRules) -> bool {
    field(&rules.start_time).is_some() && field(&rules.end_time).is_none()
}

fn only_end_hour(rules: &ExclusionRules) -> bool {
    field(&rules.end_time).is_some() && field(&rules.start_time).is_none()
}

fn both_hours(rules: &ExclusionRules) -> bool {
    field(&rules.start_time).is_some() && field(&rules.end_time).is_some()
}

fn weekday_set(rules: &ExclusionRules) -> bool {
    field(&rules.weekday).is_some()
}

fn shift_set(rules: &ExclusionRules) -> bool {
    field(&rules.shift).is_some()
}

fn excluded_rooms_set(rules: &ExclusionRules) -> bool {
    !rules.rooms.is_empty()
}

fn taken_slots_set(rules: &ExclusionRules) -> bool {
    !rules.taken_slots.is_empty()
}

fn rooms_set(rules: &InclusionRules) -> bool {
    !rules.rooms.is_empty()
}

fn features_set(rules: &InclusionRules) -> bool {
    !rules.features.is_empty()
}

fn same_day_strategy(rules: &InclusionRules) -> bool {
    rules.date_strategy == DateStrategy::SameDay
}

fn same_week_strategy(rules: &InclusionRules) -> bool {
    rules.date_strategy == DateStrategy::SameWeek
}

fn date_range_strategy(rules: &InclusionRules) -> bool {
    rules.date_strategy == DateStrategy::DateRange
}

fn duration_set(rules: &InclusionRules) -> bool {
    rules.duration_minutes.is_some()
}

/// Exclusion filters enabled by `rules`, in registration order.
pub fn resolve_exclusions(rules: &ExclusionRules) -> Vec<ExclusionFilter> {
    EXCLUSION_TABLE
        .iter()
        .filter(|(enabled, _)| enabled(rules))
        .map(|(_, filter)| *filter)
        .collect()
}

/// Inclusion filters enabled by `rules`, in registration order.
///
/// Besides room, feature and the date filter picked by the date strategy,
/// a set `duration_minutes` enables [`InclusionFilter::Duration`], which
/// keeps only slots of exactly that length.
pub fn resolve_inclusions(rules: &InclusionRules) -> Vec<InclusionFilter> {
    INCLUSION_TABLE
        .iter()
        .filter(|(enabled, _)| enabled(rules))
        .map(|(_, filter)| *filter)
        .collect()
}

impl ExclusionFilter {
    pub fn matches(self, rules: &ExclusionRules, slot: &CandidateSlot) -> bool {
        match self {
            ExclusionFilter::StartHour => is_start_hour(rules, slot),
            ExclusionFilter::EndHour => is_end_hour(rules, slot),
            ExclusionFilter::HourRange => is_between_hours(rules, slot),
            ExclusionFilter::Weekday => is_weekday(rules, slot),
            ExclusionFilter::Shift => is_shift(rules, slot),
            ExclusionFilter::Room => is_excluded_room(rules, slot),
            ExclusionFilter::TakenSlot => is_taken_slot(rules, slot),
        }
    }
}

impl InclusionFilter {
    pub fn matches(self, rules: &InclusionRules, slot: &CandidateSlot, catalog: &SlotCatalog) -> bool {
        match self {
            InclusionFilter::Room => has_room(rules, slot),
            InclusionFilter::Feature => has_feature(rules, slot, catalog),
            InclusionFilter::SameDay => is_same_day(rules, slot),
            InclusionFilter::SameWeek => is_same_week(rules, slot),
            InclusionFilter::DateRange => is_between_dates(rules, slot),
            InclusionFilter::Duration => has_duration(rules, slot),
        }
    }
}

/// Keeps the slots no exclusion filter rejects.
pub fn apply_exclusions(slots: Vec<CandidateSlot>, rules: &ExclusionRules) -> Vec<CandidateSlot> {
    let filters = resolve_exclusions(rules);
    debug!(?filters, "exclusion filters");
    if filters.is_empty() {
        return slots;
    }
    slots
        .into_iter()
        .filter(|slot| !filters.iter().any(|filter| filter.matches(rules, slot)))
        .collect()
}

/// Keeps the slots every inclusion filter accepts.
pub fn apply_inclusions(
    slots: Vec<CandidateSlot>,
    rules: &InclusionRules,
    catalog: &SlotCatalog,
) -> Vec<CandidateSlot> {
    let filters = resolve_inclusions(rules);
    debug!(?filters, "inclusion filters");
    if filters.is_empty() {
        return slots;
    }
    slots
        .into_iter()
        .filter(|slot| filters.iter().all(|filter| filter.matches(rules, slot, catalog)))
        .collect()
}

// ---- exclusion predicates ----

pub fn is_start_hour(rules: &ExclusionRules, slot: &CandidateSlot) -> bool {
    match (field(&rules.start_time).and_then(parse_hour), parse_hour(&slot.start_time)) {
        (Some(rule), Some(start)) => rule == start,
        _ => false,
    }
}

pub fn is_end_hour(rules: &ExclusionRules, slot: &CandidateSlot) -> bool {
    match (field(&rules.end_time).and_then(parse_hour), parse_hour(&slot.end_time)) {
        (Some(rule), Some(end)) => rule == end,
        _ => false,
    }
}

/// True when the slot overlaps the excluded hour window (touching ends do not overlap).
pub fn is_between_hours(rules: &ExclusionRules, slot: &CandidateSlot) -> bool {
    let from = field(&rules.start_time).and_then(parse_hour);
    let to = field(&rules.end_time).and_then(parse_hour);
    let start = parse_hour(&slot.start_time);
    let end = parse_hour(&slot.end_time);
    match (from, to, start, end) {
        (Some(from), Some(to), Some(start), Some(end)) => start < to && end > from,
        _ => false,
    }
}

pub fn is_weekday(rules: &ExclusionRules, slot: &CandidateSlot) -> bool {
    let weekday = field(&rules.weekday).and_then(parse_weekday);
    match (weekday, parse_date(&slot.date)) {
        (Some(weekday), Some(date)) => date.weekday() == weekday,
        _ => false,
    }
}

pub fn is_shift(rules: &ExclusionRules, slot: &CandidateSlot) -> bool {
    let shift = field(&rules.shift).and_then(DayPeriod::parse);
    match (shift, parse_hour(&slot.start_time)) {
        (Some(shift), Some(start)) => DayPeriod::of(start) == shift,
        _ => false,
    }
}

pub fn is_excluded_room(rules: &ExclusionRules, slot: &CandidateSlot) -> bool {
    rules.rooms.iter().any(|room| same_name(room, &slot.room))
}

pub fn is_taken_slot(rules: &ExclusionRules, slot: &CandidateSlot) -> bool {
    match SlotKey::of(slot) {
        Some(key) => rules
            .taken_slots
            .iter()
            .any(|taken| SlotKey::of(taken).as_ref() == Some(&key)),
        None => false,
    }
}

// ---- inclusion predicates ----

pub fn has_room(rules: &InclusionRules, slot: &CandidateSlot) -> bool {
    rules.rooms.iter().any(|room| same_name(room, &slot.room))
}

/// True when the slot's room carries at least one requested feature.
pub fn has_feature(rules: &InclusionRules, slot: &CandidateSlot, catalog: &SlotCatalog) -> bool {
    let Some(room) = catalog.room(&slot.room) else {
        return false;
    };
    rules.features.iter().any(|feature| room.has_feature(feature))
}

pub fn is_same_day(rules: &InclusionRules, slot: &CandidateSlot) -> bool {
    match (rules.anchor_date(), parse_date(&slot.date)) {
        (Some(anchor), Some(date)) => anchor == date,
        _ => false,
    }
}

pub fn is_same_week(rules: &InclusionRules, slot: &CandidateSlot) -> bool {
    match (rules.anchor_date(), parse_date(&slot.date)) {
        (Some(anchor), Some(date)) => anchor.iso_week() == date.iso_week(),
        _ => false,
    }
}

/// Calendar-day check: both range ends are inclusive whatever their time of day.
pub fn is_between_dates(rules: &InclusionRules, slot: &CandidateSlot) -> bool {
    let start = rules.range_start.map(|start| start.date());
    let end = rules.range_end.map(|end| end.date());
    match (start, end, parse_date(&slot.date)) {
        (Some(start), Some(end), Some(date)) => start <= date && date <= end,
        _ => false,
    }
}

pub fn has_duration(rules: &InclusionRules, slot: &CandidateSlot) -> bool {
    match (rules.duration_minutes, parse_hour(&slot.start_time), parse_hour(&slot.end_time)) {
        (Some(minutes), Some(start), Some(end)) => minutes_between(start, end) == i64::from(minutes),
        _ => false,
    }
}
