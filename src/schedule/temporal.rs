use std::cmp::Ordering;
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%d/%m/%Y";
pub const HOUR_FORMAT: &str = "%H:%M:%S";

/// Parses a "DD/MM/YYYY" date (ISO "YYYY-MM-DD" is accepted too).
///
/// Day and month are not range-checked: they roll over like calendar
/// arithmetic does, so "31/02/2024" is 2 March 2024 and "00/03/2024" is the
/// last day of February.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() == 3 {
        let day: i64 = parts[0].trim().parse().ok()?;
        let month: i64 = parts[1].trim().parse().ok()?;
        let year: i32 = parts[2].trim().parse().ok()?;
        return rolled_date(year, month, day);
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// `None` once the rolled date leaves chrono's range.
fn rolled_date(year: i32, month: i64, day: i64) -> Option<NaiveDate> {
    let months = i64::from(year)
        .checked_mul(12)?
        .checked_add(month.checked_sub(1)?)?;
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month = u32::try_from(months.rem_euclid(12) + 1).ok()?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_signed(Duration::try_days(day.checked_sub(1)?)?)
}

/// Parses "HH:MM:SS" or "HH:MM".
pub fn parse_hour(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, HOUR_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Orders two date strings; missing or unparseable dates sort last.
pub fn compare_dates(a: &str, b: &str) -> Ordering {
    match (parse_date(a), parse_date(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// ISO-8601 week number (1-53).
pub fn iso_week(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// ISO week of a date string, if it parses.
pub fn week_of(s: &str) -> Option<u32> {
    parse_date(s).map(iso_week)
}

/// The Sunday closing the ISO week of `date`, if chrono can represent it.
pub fn end_of_iso_week(date: NaiveDate) -> Option<NaiveDate> {
    let days_left = 6 - i64::from(date.weekday().num_days_from_monday());
    date.checked_add_signed(Duration::try_days(days_left)?)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_hour(time: NaiveTime) -> String {
    time.format(HOUR_FORMAT).to_string()
}

/// Lesson length in minutes; negative when the hours are reversed.
pub fn minutes_between(start: NaiveTime, end: NaiveTime) -> i64 {
    (end - start).num_minutes()
}

/// Short weekday name as written in the schedule's "Dia da semana" column.
pub fn weekday_label(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Seg",
        Weekday::Tue => "Ter",
        Weekday::Wed => "Qua",
        Weekday::Thu => "Qui",
        Weekday::Fri => "Sex",
        Weekday::Sat => "Sáb",
        Weekday::Sun => "Dom",
    }
}

/// Parses Portuguese ("Seg", "Segunda-feira", ...) or English weekday names.
pub fn parse_weekday(label: &str) -> Option<Weekday> {
    let label = label.trim().trim_end_matches('.').to_lowercase();
    let stem = label.split('-').next().unwrap_or("");
    match stem {
        "seg" | "segunda" => Some(Weekday::Mon),
        "ter" | "terça" | "terca" => Some(Weekday::Tue),
        "qua" | "quarta" => Some(Weekday::Wed),
        "qui" | "quinta" => Some(Weekday::Thu),
        "sex" | "sexta" => Some(Weekday::Fri),
        "sáb" | "sab" | "sábado" | "sabado" => Some(Weekday::Sat),
        "dom" | "domingo" => Some(Weekday::Sun),
        _ => label.parse::<Weekday>().ok(),
    }
}

/// Period of the day a lesson starts in (the schedule's shift label).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayPeriod {
    Morning,
    Afternoon,
    Evening,
}

impl DayPeriod {
    pub fn of(time: NaiveTime) -> Self {
        match time.hour() {
            0..=12 => DayPeriod::Morning,
            13..=17 => DayPeriod::Afternoon,
            _ => DayPeriod::Evening,
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "manhã" | "manha" | "morning" => Some(DayPeriod::Morning),
            "tarde" | "afternoon" => Some(DayPeriod::Afternoon),
            "noite" | "evening" | "night" => Some(DayPeriod::Evening),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayPeriod::Morning => "Manhã",
            DayPeriod::Afternoon => "Tarde",
            DayPeriod::Evening => "Noite",
        }
    }
}

impl fmt::Display for DayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
