use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::schedule::types::{Appointment, CandidateSlot};

/// Writes records as `;`-separated CSV with a header row taken from the
/// serialized field names.
pub fn write_records<T: Serialize, W: Write>(records: &[T], writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().delimiter(b';').from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Exports candidate slots to a CSV file the schedule parser can read back
pub fn write_slots_csv(slots: &[CandidateSlot], csv_path: &Path) -> Result<()> {
    let file = std::fs::File::create(csv_path)?;
    write_records(slots, file)?;
    info!(path = %csv_path.display(), slots = slots.len(), "exported candidate slots");
    Ok(())
}

/// Exports an annotated schedule, week columns included
pub fn write_schedule_csv(schedule: &[Appointment], csv_path: &Path) -> Result<()> {
    let file = std::fs::File::create(csv_path)?;
    write_records(schedule, file)?;
    info!(path = %csv_path.display(), rows = schedule.len(), "exported schedule");
    Ok(())
}
