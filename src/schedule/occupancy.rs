use std::collections::BTreeMap;

use chrono::{Datelike, Timelike};
use serde::Serialize;

use super::temporal::{parse_date, parse_hour, parse_weekday};
use super::types::Appointment;

const WEEKDAY_LABELS: [&str; 7] = ["Seg", "Ter", "Qua", "Qui", "Sex", "Sáb", "Dom"];

/// Number of lessons starting in one (weekday, hour) cell of the heatmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupancyCell {
    pub weekday: String,
    pub hour: u32,
    pub lessons: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OccupancyReport {
    /// Cells ordered by weekday (Monday first), then hour
    pub by_slot: Vec<OccupancyCell>,
    pub by_room: BTreeMap<String, u32>,
    /// Rows with no readable weekday or start hour
    pub unplaced: u32,
}

/// Counts lessons per weekday/hour and per room.
///
/// The weekday comes from the lesson date, or from the "Dia da semana"
/// column when the date is missing.
pub fn occupancy(schedule: &[Appointment]) -> OccupancyReport {
    let mut cells: BTreeMap<(u32, u32), u32> = BTreeMap::new();
    let mut report = OccupancyReport::default();

    for row in schedule {
        let room = row.room.trim();
        if !room.is_empty() {
            *report.by_room.entry(room.to_string()).or_insert(0) += 1;
        }

        let weekday = parse_date(&row.date)
            .map(|date| date.weekday())
            .or_else(|| parse_weekday(&row.weekday));
        match (weekday, parse_hour(&row.start_time)) {
            (Some(weekday), Some(start)) => {
                *cells
                    .entry((weekday.num_days_from_monday(), start.hour()))
                    .or_insert(0) += 1;
            }
            _ => report.unplaced += 1,
        }
    }

    report.by_slot = cells
        .into_iter()
        .map(|((day, hour), lessons)| OccupancyCell {
            weekday: WEEKDAY_LABELS[day as usize].to_string(),
            hour,
            lessons,
        })
        .collect();
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, weekday: &str, start: &str, room: &str) -> Appointment {
        Appointment {
            date: date.to_string(),
            weekday: weekday.to_string(),
            start_time: start.to_string(),
            room: room.to_string(),
            ..Appointment::default()
        }
    }

    #[test]
    fn counts_per_cell_and_room() {
        let schedule = vec![
            row("02/04/2024", "Ter", "08:00:00", "B1.04"),
            row("09/04/2024", "Ter", "08:30:00", "B1.04"),
            row("", "Seg", "14:30:00", "C5.06"),
            row("01/04/2024", "", "", ""),
        ];
        let report = occupancy(&schedule);

        assert_eq!(
            report.by_slot,
            vec![
                OccupancyCell { weekday: "Seg".into(), hour: 14, lessons: 1 },
                OccupancyCell { weekday: "Ter".into(), hour: 8, lessons: 2 },
            ]
        );
        assert_eq!(report.by_room.get("B1.04"), Some(&2));
        assert_eq!(report.by_room.get("C5.06"), Some(&1));
        assert_eq!(report.unplaced, 1);
    }
}
