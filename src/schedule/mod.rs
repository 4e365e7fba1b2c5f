pub mod types;
pub mod temporal;
pub mod weeks;
pub mod rules;
pub mod catalog;
pub mod filters;
pub mod generator;
pub mod conflicts;
pub mod lookup;
pub mod workflow;
pub mod occupancy;

pub use types::{Appointment, CandidateSlot, Room, SlotKey};
pub use rules::{DateStrategy, ExclusionRules, InclusionRules};
pub use catalog::SlotCatalog;
pub use weeks::{add_semester_week_number, add_week_number, annotate_weeks};
pub use lookup::{lookup_slots, lookup_slots_in};
pub use workflow::{PickOutcome, SelectionState, SelectionWorkflow};
pub use occupancy::{occupancy, OccupancyReport};
