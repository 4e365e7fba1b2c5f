use tracing::info;

use super::catalog::SlotCatalog;
use super::conflicts::remove_conflicts;
use super::filters::{apply_exclusions, apply_inclusions};
use super::generator::generate_slots;
use super::rules::{ExclusionRules, InclusionRules};
use super::types::{Appointment, CandidateSlot};

/// Free slots satisfying the rules, using the built-in catalog.
pub fn lookup_slots(
    inclusion: &InclusionRules,
    exclusion: &ExclusionRules,
    schedule: &[Appointment],
) -> Vec<CandidateSlot> {
    lookup_slots_in(&SlotCatalog::default(), inclusion, exclusion, schedule)
}

/// Generates candidates from `catalog`, drops the excluded ones, keeps the
/// included ones and removes those already booked in `schedule`.
///
/// The result keeps generation order.
pub fn lookup_slots_in(
    catalog: &SlotCatalog,
    inclusion: &InclusionRules,
    exclusion: &ExclusionRules,
    schedule: &[Appointment],
) -> Vec<CandidateSlot> {
    let generated = generate_slots(inclusion, catalog);
    let generated_count = generated.len();

    let allowed = apply_exclusions(generated, exclusion);
    let allowed_count = allowed.len();

    let included = apply_inclusions(allowed, inclusion, catalog);
    let included_count = included.len();

    let free = remove_conflicts(included, schedule);

    info!(
        generated = generated_count,
        after_exclusion = allowed_count,
        after_inclusion = included_count,
        free = free.len(),
        "slot lookup finished"
    );
    free
}
