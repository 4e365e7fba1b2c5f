use tracing::debug;

use super::temporal::{compare_dates, week_of};
use super::types::Appointment;

/// Annotates every row with the ISO week of its date.
///
/// Rows without a parseable date get no week (written as "").
pub fn add_week_number(schedule: &[Appointment]) -> Vec<Appointment> {
    schedule
        .iter()
        .map(|row| {
            let mut row = row.clone();
            row.week_of_year = week_of(&row.date);
            row
        })
        .collect()
}

/// Numbers semester weeks over the schedule sorted by date.
///
/// The counter starts at 0 and moves up by one whenever the ISO week differs
/// from the previous dated row, so a gap of several weeks still counts as a
/// single step. Undated rows sort last and get no semester week. Returns the
/// rows in date order.
pub fn add_semester_week_number(schedule: &[Appointment]) -> Vec<Appointment> {
    let mut rows = schedule.to_vec();
    rows.sort_by(|a, b| compare_dates(&a.date, &b.date));

    let mut semester_week = 0;
    let mut previous_week: Option<u32> = None;
    for row in rows.iter_mut() {
        match row.week_of_year {
            Some(week) => {
                if previous_week != Some(week) {
                    semester_week += 1;
                    previous_week = Some(week);
                }
                row.week_of_semester = Some(semester_week);
            }
            None => row.week_of_semester = None,
        }
    }

    debug!(rows = rows.len(), semester_weeks = semester_week, "numbered semester weeks");
    rows
}

/// Both passes, in the order the views expect.
pub fn annotate_weeks(schedule: &[Appointment]) -> Vec<Appointment> {
    add_semester_week_number(&add_week_number(schedule))
}
