use chrono::NaiveTime;
use tracing::warn;

use super::types::{same_name, Room};

/// Course start hours offered by the timetable.
const START_TIMES: [(u32, u32); 9] = [
    (8, 0),
    (9, 30),
    (11, 0),
    (13, 0),
    (14, 30),
    (16, 0),
    (18, 0),
    (19, 30),
    (21, 0),
];

/// Course end hours offered by the timetable.
const END_TIMES: [(u32, u32); 9] = [
    (9, 30),
    (11, 0),
    (12, 30),
    (14, 30),
    (16, 0),
    (17, 30),
    (19, 30),
    (21, 0),
    (22, 30),
];

const ROOMS: [&str; 18] = [
    "AA2.25",
    "AA2.26",
    "AA3.23",
    "B1.04",
    "B1.05",
    "B2.03",
    "B2.04",
    "B2.05",
    "C5.06",
    "C5.07",
    "C5.08",
    "C6.09",
    "D1.07",
    "D1.09",
    "D1.10",
    "Auditório B104",
    "Auditório J.J. Laginha",
    "Auditório Silva Leal",
];

/// The fixed enumerations candidate slots are drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCatalog {
    pub start_times: Vec<NaiveTime>,
    pub end_times: Vec<NaiveTime>,
    pub rooms: Vec<Room>,
}

impl Default for SlotCatalog {
    fn default() -> Self {
        Self {
            start_times: hours(&START_TIMES),
            end_times: hours(&END_TIMES),
            rooms: ROOMS.iter().map(|name| Room::named(name)).collect(),
        }
    }
}

impl SlotCatalog {
    pub fn new(start_times: Vec<NaiveTime>, end_times: Vec<NaiveTime>, rooms: Vec<Room>) -> Self {
        Self {
            start_times,
            end_times,
            rooms,
        }
    }

    /// Replaces the room list with an imported inventory.
    ///
    /// An empty inventory keeps the current rooms.
    pub fn with_rooms(mut self, rooms: Vec<Room>) -> Self {
        if rooms.is_empty() {
            warn!("empty room inventory, keeping the built-in room list");
            return self;
        }
        self.rooms = rooms;
        self
    }

    /// Looks a room up by trimmed, case-insensitive name.
    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|room| same_name(&room.name, name))
    }
}

fn hours(table: &[(u32, u32)]) -> Vec<NaiveTime> {
    table
        .iter()
        .filter_map(|&(h, m)| NaiveTime::from_hms_opt(h, m, 0))
        .collect()
}
