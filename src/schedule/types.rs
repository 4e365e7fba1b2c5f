use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::temporal::{format_date, format_hour, parse_date, parse_hour};

// Column headers of the imported schedule
pub const COURSE: &str = "Curso";
pub const COURSE_UNIT: &str = "Unidade Curricular";
pub const SHIFT: &str = "Turno";
pub const CLASS_GROUP: &str = "Turma";
pub const ENROLLED: &str = "Inscritos no turno";
pub const WEEKDAY: &str = "Dia da semana";
pub const START_TIME: &str = "Hora início da aula";
pub const END_TIME: &str = "Hora fim da aula";
pub const DATE: &str = "Data da aula";
pub const REQUESTED_FEATURE: &str = "Características da sala pedida para a aula";
pub const ROOM: &str = "Sala atribuída à aula";
pub const WEEK_OF_YEAR: &str = "Semana do Ano";
pub const WEEK_OF_SEMESTER: &str = "Semana do Semestre";

// Column headers of the room inventory
pub const BUILDING: &str = "Edifício";
pub const ROOM_NAME: &str = "Nome sala";
pub const CAPACITY: &str = "Capacidade Normal";
pub const EXAM_CAPACITY: &str = "Capacidade Exame";
pub const FEATURE_COUNT: &str = "Nº características";

/// One row of the imported schedule.
///
/// Cells are kept as the raw strings of the source table; an empty string
/// means the value is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(rename = "Curso", default)]
    pub course: String,
    #[serde(rename = "Unidade Curricular", default)]
    pub course_unit: String,
    #[serde(rename = "Turno", default)]
    pub shift: String,
    #[serde(rename = "Turma", default)]
    pub class_group: String,
    #[serde(rename = "Inscritos no turno", default)]
    pub enrolled: Option<u32>,
    #[serde(rename = "Dia da semana", default)]
    pub weekday: String,
    #[serde(rename = "Hora início da aula", default)]
    pub start_time: String,
    #[serde(rename = "Hora fim da aula", default)]
    pub end_time: String,
    #[serde(rename = "Data da aula", default)]
    pub date: String,
    #[serde(rename = "Características da sala pedida para a aula", default)]
    pub requested_feature: String,
    #[serde(rename = "Sala atribuída à aula", default)]
    pub room: String,
    /// ISO week of `date`; `None` (written as "") when the date is missing
    #[serde(rename = "Semana do Ano", default, with = "week_field")]
    pub week_of_year: Option<u32>,
    #[serde(rename = "Semana do Semestre", default, with = "week_field")]
    pub week_of_semester: Option<u32>,
}

/// A synthesized (date, start, end, room) offer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateSlot {
    #[serde(rename = "Hora início da aula", default)]
    pub start_time: String,
    #[serde(rename = "Hora fim da aula", default)]
    pub end_time: String,
    #[serde(rename = "Sala atribuída à aula", default)]
    pub room: String,
    #[serde(rename = "Data da aula", default)]
    pub date: String,
}

impl CandidateSlot {
    pub fn new(start: NaiveTime, end: NaiveTime, room: &str, date: NaiveDate) -> Self {
        Self {
            start_time: format_hour(start),
            end_time: format_hour(end),
            room: room.to_string(),
            date: format_date(date),
        }
    }
}

/// A room of the inventory with its capacities and feature flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    #[serde(rename = "Edifício", default)]
    pub building: String,
    #[serde(rename = "Nome sala")]
    pub name: String,
    #[serde(rename = "Capacidade Normal", default)]
    pub capacity: Option<u32>,
    #[serde(rename = "Capacidade Exame", default)]
    pub exam_capacity: Option<u32>,
    #[serde(default)]
    pub features: BTreeSet<String>,
}

impl Room {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| same_name(f, feature))
    }
}

/// Case-insensitive comparison of trimmed names; empty names never match.
pub fn same_name(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    !a.is_empty() && a.to_lowercase() == b.to_lowercase()
}

/// Read access to the four fields that place a lesson in time and space.
pub trait SlotFields {
    fn date(&self) -> &str;
    fn start_time(&self) -> &str;
    fn end_time(&self) -> &str;
    fn room(&self) -> &str;
}

impl SlotFields for Appointment {
    fn date(&self) -> &str {
        &self.date
    }
    fn start_time(&self) -> &str {
        &self.start_time
    }
    fn end_time(&self) -> &str {
        &self.end_time
    }
    fn room(&self) -> &str {
        &self.room
    }
}

impl SlotFields for CandidateSlot {
    fn date(&self) -> &str {
        &self.date
    }
    fn start_time(&self) -> &str {
        &self.start_time
    }
    fn end_time(&self) -> &str {
        &self.end_time
    }
    fn room(&self) -> &str {
        &self.room
    }
}

/// Identity of an occupied or offered slot.
///
/// Two records denote the same slot when date, hours and room agree, no
/// matter how the strings were written ("08:00" and "08:00:00" are equal).
/// Rooms compare like [`same_name`], trimmed and case-insensitive; the room
/// keeps its original spelling for display.
#[derive(Debug, Clone)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub room: String,
}

impl SlotKey {
    /// Returns `None` when any of the four parts is missing or unparseable.
    pub fn of<T: SlotFields + ?Sized>(item: &T) -> Option<Self> {
        let room = item.room().trim();
        if room.is_empty() {
            return None;
        }
        Some(Self {
            date: parse_date(item.date())?,
            start: parse_hour(item.start_time())?,
            end: parse_hour(item.end_time())?,
            room: room.to_string(),
        })
    }

    fn folded_room(&self) -> String {
        self.room.trim().to_lowercase()
    }
}

impl PartialEq for SlotKey {
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date
            && self.start == other.start
            && self.end == other.end
            && self.folded_room() == other.folded_room()
    }
}

impl Eq for SlotKey {}

impl Hash for SlotKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.date.hash(state);
        self.start.hash(state);
        self.end.hash(state);
        self.folded_room().hash(state);
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.date.format("%Y-%m-%d"),
            self.start.format("%H:%M"),
            self.end.format("%H:%M"),
            self.room
        )
    }
}

/// Week numbers are written as "" when unknown, never as 0.
mod week_field {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(week) => serializer.serialize_u32(*week),
            None => serializer.serialize_str(""),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Number(week)) => Ok(Some(week)),
            Some(Raw::Text(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    Ok(None)
                } else {
                    text.parse().map(Some).map_err(D::Error::custom)
                }
            }
        }
    }
}
