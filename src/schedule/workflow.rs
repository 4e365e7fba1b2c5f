use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::WorkflowError;

use super::catalog::SlotCatalog;
use super::lookup::lookup_slots_in;
use super::rules::{ExclusionRules, InclusionRules};
use super::types::{Appointment, CandidateSlot};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionState {
    #[default]
    Closed,
    CollectingRules,
    ShowingCandidates,
    CollectingNextSelection,
}

impl fmt::Display for SelectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectionState::Closed => "closed",
            SelectionState::CollectingRules => "collecting rules",
            SelectionState::ShowingCandidates => "showing candidates",
            SelectionState::CollectingNextSelection => "collecting the next selection",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum PickOutcome {
    NeedMore { remaining: u32 },
    Completed { selections: Vec<CandidateSlot> },
}

/// Picks replacement slots one at a time until the requested lesson count
/// is reached. Every refined search excludes the slots picked so far.
#[derive(Debug, Clone, Default)]
pub struct SelectionWorkflow {
    state: SelectionState,
    inclusion: InclusionRules,
    exclusion: ExclusionRules,
    selections: Vec<CandidateSlot>,
    candidates: Vec<CandidateSlot>,
}

impl SelectionWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn selections(&self) -> &[CandidateSlot] {
        &self.selections
    }

    pub fn candidates(&self) -> &[CandidateSlot] {
        &self.candidates
    }

    /// Requested lesson count; unset or zero means one lesson.
    pub fn lessons_needed(&self) -> u32 {
        self.inclusion.lessons_needed.filter(|n| *n > 0).unwrap_or(1)
    }

    pub fn remaining(&self) -> u32 {
        let picked = u32::try_from(self.selections.len()).unwrap_or(u32::MAX);
        self.lessons_needed().saturating_sub(picked)
    }

    pub fn open(&mut self) -> Result<(), WorkflowError> {
        self.expect_state(SelectionState::Closed, "open a selection")?;
        *self = Self {
            state: SelectionState::CollectingRules,
            ..Self::default()
        };
        Ok(())
    }

    /// Runs the first search with the submitted rules.
    pub fn search(
        &mut self,
        catalog: &SlotCatalog,
        inclusion: InclusionRules,
        exclusion: ExclusionRules,
        schedule: &[Appointment],
    ) -> Result<&[CandidateSlot], WorkflowError> {
        self.expect_state(SelectionState::CollectingRules, "search")?;
        self.inclusion = inclusion;
        self.exclusion = exclusion;
        self.run_search(catalog, schedule);
        Ok(&self.candidates)
    }

    /// Takes the candidate at `index`.
    pub fn pick(&mut self, index: usize) -> Result<PickOutcome, WorkflowError> {
        self.expect_state(SelectionState::ShowingCandidates, "pick a slot")?;
        let slot = self
            .candidates
            .get(index)
            .cloned()
            .ok_or(WorkflowError::SelectionOutOfRange {
                index,
                available: self.candidates.len(),
            })?;

        info!(date = %slot.date, start = %slot.start_time, room = %slot.room, "slot picked");
        self.selections.push(slot);
        self.candidates.clear();

        let remaining = self.remaining();
        if remaining == 0 {
            self.state = SelectionState::Closed;
            Ok(PickOutcome::Completed {
                selections: self.selections.clone(),
            })
        } else {
            self.state = SelectionState::CollectingNextSelection;
            Ok(PickOutcome::NeedMore { remaining })
        }
    }

    /// Searches again with the picked slots folded into the exclusion rules.
    pub fn refine(
        &mut self,
        catalog: &SlotCatalog,
        schedule: &[Appointment],
    ) -> Result<&[CandidateSlot], WorkflowError> {
        self.expect_state(SelectionState::CollectingNextSelection, "refine the search")?;
        self.run_search(catalog, schedule);
        Ok(&self.candidates)
    }

    /// Abandons the selection from any state.
    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    fn run_search(&mut self, catalog: &SlotCatalog, schedule: &[Appointment]) {
        let exclusion = self.exclusion.with_taken(&self.selections);
        self.candidates = lookup_slots_in(catalog, &self.inclusion, &exclusion, schedule);
        self.state = SelectionState::ShowingCandidates;
    }

    fn expect_state(&self, expected: SelectionState, action: &'static str) -> Result<(), WorkflowError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(WorkflowError::InvalidTransition {
                action,
                state: self.state.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::rules::DateStrategy;
    use crate::schedule::temporal::parse_hour;
    use crate::schedule::types::Room;
    use chrono::NaiveDate;

    fn catalog() -> SlotCatalog {
        SlotCatalog::new(
            vec![parse_hour("08:00").unwrap()],
            vec![parse_hour("09:30").unwrap()],
            vec![Room::named("R1"), Room::named("R2")],
        )
    }

    fn rules(lessons: u32) -> InclusionRules {
        InclusionRules {
            lessons_needed: Some(lessons),
            date_strategy: DateStrategy::SameDay,
            anchor: NaiveDate::from_ymd_opt(2024, 4, 1).and_then(|d| d.and_hms_opt(8, 0, 0)),
            ..InclusionRules::default()
        }
    }

    #[test]
    fn full_selection_round() {
        let mut workflow = SelectionWorkflow::new();
        workflow.open().unwrap();
        assert_eq!(workflow.state(), SelectionState::CollectingRules);

        let found = workflow
            .search(&catalog(), rules(2), ExclusionRules::default(), &[])
            .unwrap()
            .len();
        assert_eq!(found, 2);

        let outcome = workflow.pick(0).unwrap();
        assert_eq!(outcome, PickOutcome::NeedMore { remaining: 1 });
        assert_eq!(workflow.state(), SelectionState::CollectingNextSelection);

        let refined = workflow.refine(&catalog(), &[]).unwrap().to_vec();
        assert_eq!(refined.len(), 1);
        assert_ne!(refined[0], workflow.selections()[0]);

        match workflow.pick(0).unwrap() {
            PickOutcome::Completed { selections } => assert_eq!(selections.len(), 2),
            other => panic!("expected completion, got {:?}", other),
        }
        assert_eq!(workflow.state(), SelectionState::Closed);
    }

    #[test]
    fn invalid_transitions_are_rejected() {
        let mut workflow = SelectionWorkflow::new();
        assert!(matches!(workflow.pick(0), Err(WorkflowError::InvalidTransition { .. })));
        assert!(workflow.refine(&catalog(), &[]).is_err());

        workflow.open().unwrap();
        assert!(workflow.open().is_err());
        workflow
            .search(&catalog(), rules(1), ExclusionRules::default(), &[])
            .unwrap();
        assert_eq!(
            workflow.pick(5),
            Err(WorkflowError::SelectionOutOfRange { index: 5, available: 2 })
        );
    }

    #[test]
    fn cancel_resets_everything() {
        let mut workflow = SelectionWorkflow::new();
        workflow.open().unwrap();
        workflow
            .search(&catalog(), rules(3), ExclusionRules::default(), &[])
            .unwrap();
        workflow.pick(1).unwrap();
        workflow.cancel();

        assert_eq!(workflow.state(), SelectionState::Closed);
        assert!(workflow.selections().is_empty());
        assert_eq!(workflow.remaining(), 1);
        workflow.open().unwrap();
    }

    #[test]
    fn zero_lessons_means_one() {
        let mut workflow = SelectionWorkflow::new();
        workflow.open().unwrap();
        workflow
            .search(&catalog(), rules(0), ExclusionRules::default(), &[])
            .unwrap();
        assert_eq!(workflow.lessons_needed(), 1);
        assert!(matches!(workflow.pick(0).unwrap(), PickOutcome::Completed { .. }));
    }
}
