use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::types::CandidateSlot;

/// How the candidate days are derived from the inclusion rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateStrategy {
    /// Only the anchor day
    SameDay,
    /// From the anchor day to the end of its ISO week
    #[serde(alias = "same-iso-week")]
    SameWeek,
    /// Between `range_start` and `range_end`
    #[serde(alias = "explicit-date-range")]
    DateRange,
    /// Only `start_date`, with no date filter
    #[default]
    None,
}

/// Constraints every offered slot must satisfy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InclusionRules {
    pub course_unit: Option<String>,
    pub lessons_needed: Option<u32>,
    pub duration_minutes: Option<u32>,
    #[serde(alias = "salas")]
    pub rooms: Vec<String>,
    #[serde(alias = "caracteristicas")]
    pub features: Vec<String>,
    pub date_strategy: DateStrategy,
    pub anchor: Option<NaiveDateTime>,
    pub range_start: Option<NaiveDateTime>,
    pub range_end: Option<NaiveDateTime>,
    pub start_date: Option<NaiveDate>,
}

impl InclusionRules {
    pub fn anchor_date(&self) -> Option<NaiveDate> {
        self.anchor.map(|anchor| anchor.date())
    }
}

/// Reasons to reject a slot; each populated field activates one filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionRules {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub weekday: Option<String>,
    pub shift: Option<String>,
    pub rooms: Vec<String>,
    /// Slots already picked in the current selection
    pub taken_slots: Vec<CandidateSlot>,
}

impl ExclusionRules {
    /// Copy of these rules that also rejects `slots`.
    pub fn with_taken(&self, slots: &[CandidateSlot]) -> Self {
        let mut rules = self.clone();
        rules.taken_slots.extend(slots.iter().cloned());
        rules
    }
}

/// Trimmed value of an optional text field, `None` when blank.
pub fn field(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
