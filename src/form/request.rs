use serde::{Deserialize, Serialize};

use crate::schedule::rules::{field, DateStrategy, ExclusionRules, InclusionRules};
use crate::schedule::temporal::{parse_hour, parse_weekday, DayPeriod};

/// Longest explicit date range a search may cover, in calendar days.
pub const MAX_RANGE_DAYS: i64 = 31;

/// Slot search request from the frontend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotSearchRequest {
    pub inclusion: InclusionRules,
    pub exclusion: ExclusionRules,
}

/// Pick request from the frontend
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PickRequest {
    pub index: usize,
}

/// Validates a slot search request before any slot is generated
pub fn validate_search(req: &SlotSearchRequest) -> Result<(), String> {
    let inc = &req.inclusion;

    if inc.lessons_needed == Some(0) {
        return Err("Number of lessons must be at least 1".to_string());
    }
    if inc.duration_minutes == Some(0) {
        return Err("Lesson duration must be positive".to_string());
    }

    match inc.date_strategy {
        DateStrategy::SameDay | DateStrategy::SameWeek => {
            if inc.anchor.is_none() {
                return Err("An anchor date is required for the chosen date strategy".to_string());
            }
        }
        DateStrategy::DateRange => match (inc.range_start, inc.range_end) {
            (Some(start), Some(end)) if start > end => {
                return Err("Date range ends before it starts".to_string());
            }
            (Some(start), Some(end)) => {
                let days = (end.date() - start.date()).num_days() + 1;
                if days > MAX_RANGE_DAYS {
                    return Err(format!(
                        "Date range covers {} days; at most {} are allowed",
                        days, MAX_RANGE_DAYS
                    ));
                }
            }
            _ => return Err("Date range requires both a start and an end".to_string()),
        },
        DateStrategy::None => {
            if inc.start_date.is_none() {
                return Err("A start date is required".to_string());
            }
        }
    }

    let exc = &req.exclusion;
    let start = match field(&exc.start_time) {
        Some(value) => Some(parse_hour(value).ok_or(format!("Invalid start hour: {}", value))?),
        None => None,
    };
    let end = match field(&exc.end_time) {
        Some(value) => Some(parse_hour(value).ok_or(format!("Invalid end hour: {}", value))?),
        None => None,
    };
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err("Excluded hours must start before they end".to_string());
        }
    }
    if let Some(weekday) = field(&exc.weekday) {
        if parse_weekday(weekday).is_none() {
            return Err(format!("Unknown weekday: {}", weekday));
        }
    }
    if let Some(shift) = field(&exc.shift) {
        if DayPeriod::parse(shift).is_none() {
            return Err(format!("Unknown shift: {}", shift));
        }
    }

    Ok(())
}
