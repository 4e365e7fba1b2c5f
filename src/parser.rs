use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

use crate::error::{Result, TimetableError};
use crate::schedule::types::{
    Appointment, Room, BUILDING, CAPACITY, CLASS_GROUP, COURSE, COURSE_UNIT, DATE, END_TIME,
    ENROLLED, EXAM_CAPACITY, FEATURE_COUNT, REQUESTED_FEATURE, ROOM, ROOM_NAME, SHIFT, START_TIME,
    WEEKDAY, WEEK_OF_SEMESTER, WEEK_OF_YEAR,
};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Loads a schedule from a CSV file
pub fn load_schedule<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Appointment>> {
    let data = std::fs::read(csv_path.as_ref())?;
    info!(path = %csv_path.as_ref().display(), bytes = data.len(), "loading schedule");
    parse_schedule(&data)
}

/// Parses schedule CSV content (`;` or `,` separated, header row first).
///
/// The time, date and room columns are required; the others may be absent.
/// Fully blank lines are skipped.
pub fn parse_schedule(data: &[u8]) -> Result<Vec<Appointment>> {
    let data = strip_bom(data);
    let mut reader = ReaderBuilder::new()
        .delimiter(sniff_delimiter(data))
        .flexible(true)
        .trim(Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let required = |name: &str| require_column(&headers, name, "schedule");

    let start_col = required(START_TIME)?;
    let end_col = required(END_TIME)?;
    let date_col = required(DATE)?;
    let room_col = required(ROOM)?;
    let course_col = find_column(&headers, COURSE);
    let unit_col = find_column(&headers, COURSE_UNIT);
    let shift_col = find_column(&headers, SHIFT);
    let class_col = find_column(&headers, CLASS_GROUP);
    let enrolled_col = find_column(&headers, ENROLLED);
    let weekday_col = find_column(&headers, WEEKDAY);
    let feature_col = find_column(&headers, REQUESTED_FEATURE);
    let week_col = find_column(&headers, WEEK_OF_YEAR);
    let semester_week_col = find_column(&headers, WEEK_OF_SEMESTER);

    let mut schedule = Vec::new();
    let mut skipped = 0;
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|cell| cell.is_empty()) {
            skipped += 1;
            continue;
        }

        schedule.push(Appointment {
            course: cell(&record, course_col),
            course_unit: cell(&record, unit_col),
            shift: cell(&record, shift_col),
            class_group: cell(&record, class_col),
            enrolled: parse_number(&cell(&record, enrolled_col)),
            weekday: cell(&record, weekday_col),
            start_time: cell(&record, Some(start_col)),
            end_time: cell(&record, Some(end_col)),
            date: cell(&record, Some(date_col)),
            requested_feature: cell(&record, feature_col),
            room: cell(&record, Some(room_col)),
            week_of_year: parse_number(&cell(&record, week_col)),
            week_of_semester: parse_number(&cell(&record, semester_week_col)),
        });
    }

    debug!(rows = schedule.len(), skipped, "parsed schedule");
    Ok(schedule)
}

/// Loads a room inventory from a CSV file
pub fn load_rooms<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Room>> {
    let data = std::fs::read(csv_path.as_ref())?;
    info!(path = %csv_path.as_ref().display(), bytes = data.len(), "loading rooms");
    parse_rooms(&data)
}

/// Parses a room inventory.
///
/// Every column besides building, name, capacities and feature count is a
/// feature; a non-empty cell (usually "X") means the room has it.
pub fn parse_rooms(data: &[u8]) -> Result<Vec<Room>> {
    let data = strip_bom(data);
    let mut reader = ReaderBuilder::new()
        .delimiter(sniff_delimiter(data))
        .flexible(true)
        .trim(Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let name_col = require_column(&headers, ROOM_NAME, "rooms")?;
    let building_col = find_column(&headers, BUILDING);
    let capacity_col = find_column(&headers, CAPACITY);
    let exam_col = find_column(&headers, EXAM_CAPACITY);
    let count_col = find_column(&headers, FEATURE_COUNT);

    let fixed = [Some(name_col), building_col, capacity_col, exam_col, count_col];
    let feature_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, header)| !header.is_empty() && !fixed.contains(&Some(*i)))
        .map(|(i, header)| (i, header.to_string()))
        .collect();

    let mut rooms = Vec::new();
    for result in reader.records() {
        let record = result?;
        let name = cell(&record, Some(name_col));
        if name.is_empty() {
            continue;
        }

        let features = feature_cols
            .iter()
            .filter(|(i, _)| !cell(&record, Some(*i)).is_empty())
            .map(|(_, feature)| feature.clone())
            .collect();

        rooms.push(Room {
            building: cell(&record, building_col),
            name,
            capacity: parse_number(&cell(&record, capacity_col)),
            exam_capacity: parse_number(&cell(&record, exam_col)),
            features,
        });
    }

    debug!(rooms = rooms.len(), features = feature_cols.len(), "parsed room inventory");
    Ok(rooms)
}

fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(UTF8_BOM).unwrap_or(data)
}

/// Picks `;` when the header line has more semicolons than commas.
fn sniff_delimiter(data: &[u8]) -> u8 {
    let header = data.split(|b| *b == b'\n').next().unwrap_or(data);
    let semicolons = header.iter().filter(|b| **b == b';').count();
    let commas = header.iter().filter(|b| **b == b',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Finds a column by exact (case-insensitive) header, then by containment
fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    let wanted = name.to_lowercase();
    headers
        .iter()
        .position(|h| h.trim().to_lowercase() == wanted)
        .or_else(|| headers.iter().position(|h| h.to_lowercase().contains(&wanted)))
}

fn require_column(headers: &StringRecord, name: &str, source_name: &str) -> Result<usize> {
    find_column(headers, name).ok_or_else(|| TimetableError::MissingColumn {
        column: name.to_string(),
        source_name: source_name.to_string(),
    })
}

fn cell(record: &StringRecord, col: Option<usize>) -> String {
    col.and_then(|i| record.get(i))
        .unwrap_or("")
        .trim()
        .to_string()
}

/// Parses a number, returning None if empty or invalid
fn parse_number(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEDULE: &str = "\u{feff}Curso;Unidade Curricular;Turno;Turma;Inscritos no turno;Dia da semana;Hora início da aula;Hora fim da aula;Data da aula;Características da sala pedida para a aula;Sala atribuída à aula
ME;Teoria dos Jogos e dos Contratos;01789TP01;MEA1;30;Sex;13:00:00;14:30:00;02/12/2022;Sala Aulas Mestrado;AA2.25
;;;;;;;;;;
LETI;Redes;L0705TP02;ET-C1;;Qua;09:30:00;11:00:00;;Sala de Aulas normal;
";

    #[test]
    fn parses_semicolon_schedule_with_bom() {
        let rows = parse_schedule(SCHEDULE.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.course, "ME");
        assert_eq!(first.enrolled, Some(30));
        assert_eq!(first.weekday, "Sex");
        assert_eq!(first.start_time, "13:00:00");
        assert_eq!(first.date, "02/12/2022");
        assert_eq!(first.room, "AA2.25");
        assert_eq!(first.week_of_year, None);

        assert_eq!(rows[1].enrolled, None);
        assert_eq!(rows[1].date, "");
        assert_eq!(rows[1].room, "");
    }

    #[test]
    fn missing_required_column_is_reported() {
        let err = parse_schedule(b"Curso,Sala atribu\xc3\xadda \xc3\xa0 aula\nME,AA2.25\n").unwrap_err();
        match err {
            TimetableError::MissingColumn { column, .. } => assert_eq!(column, START_TIME),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn parses_rooms_with_feature_columns() {
        let csv = "Edifício,Nome sala,Capacidade Normal,Capacidade Exame,Nº características,Anfiteatro aulas,Laboratório de Informática,Sala de Aulas normal
Ala Autónoma (ISCTE-IUL),Auditório Afonso de Barros,80,39,4,X,,X
Edifício II,C5.06,40,20,1,,X,
,,,,,,,
";
        let rooms = parse_rooms(csv.as_bytes()).unwrap();
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].capacity, Some(80));
        assert!(rooms[0].has_feature("Anfiteatro aulas"));
        assert!(rooms[0].has_feature("Sala de Aulas normal"));
        assert!(!rooms[0].has_feature("Laboratório de Informática"));
        assert_eq!(rooms[1].features.len(), 1);
        assert_eq!(rooms[1].exam_capacity, Some(20));
    }

    #[test]
    fn delimiter_is_sniffed_from_header() {
        assert_eq!(sniff_delimiter(b"a;b;c\n1,2;3"), b';');
        assert_eq!(sniff_delimiter(b"a,b,c\n1;2;3"), b',');
    }
}
