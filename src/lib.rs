//! Timetable slot search.
//!
//! Annotates an imported course schedule with ISO and semester week numbers
//! and finds free (date, hours, room) slots for new lessons under inclusion
//! and exclusion rules.

pub mod config;
pub mod display;
pub mod error;
pub mod form;
pub mod logging;
pub mod parser;
pub mod schedule;
pub mod web;

pub use error::{Result, TimetableError, WorkflowError};
pub use schedule::{
    annotate_weeks, lookup_slots, lookup_slots_in, Appointment, CandidateSlot, ExclusionRules,
    InclusionRules, Room, SelectionWorkflow, SlotCatalog,
};
