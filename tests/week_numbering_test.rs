// Week annotation over imported schedules

use timetable_slots::schedule::{add_semester_week_number, add_week_number, annotate_weeks, Appointment};

fn row(date: &str) -> Appointment {
    Appointment {
        date: date.to_string(),
        ..Appointment::default()
    }
}

#[test]
fn test_week_of_year_for_dated_and_undated_rows() {
    let rows = add_week_number(&[row("01/01/2024"), row("data inválida")]);
    assert_eq!(rows[0].week_of_year, Some(1));
    assert_eq!(rows[1].week_of_year, None);

    let json = serde_json::to_value(&rows[1]).unwrap();
    assert_eq!(json["Semana do Ano"], "");
}

#[test]
fn test_semester_weeks_are_monotonic_steps() {
    let dates = [
        "18/09/2023", "20/09/2023", "25/09/2023", "09/10/2023", "10/10/2023", "06/11/2023",
        "08/01/2024", "15/01/2024",
    ];
    // shuffled input order
    let input: Vec<Appointment> = dates.iter().rev().map(|d| row(d)).collect();
    let rows = annotate_weeks(&input);

    let semester: Vec<u32> = rows.iter().map(|r| r.week_of_semester.unwrap()).collect();
    assert_eq!(semester, vec![1, 1, 2, 3, 3, 4, 5, 6]);

    for pair in rows.windows(2) {
        let step = pair[1].week_of_semester.unwrap() - pair[0].week_of_semester.unwrap();
        let week_changed = pair[0].week_of_year != pair[1].week_of_year;
        assert_eq!(step, u32::from(week_changed));
    }
}

#[test]
fn test_semester_pass_without_week_numbers_leaves_blanks() {
    let rows = add_semester_week_number(&[row("01/01/2024"), row("08/01/2024")]);
    assert!(rows.iter().all(|r| r.week_of_semester.is_none()));
}

#[test]
fn test_mixed_dated_and_undated_rows() {
    let rows = annotate_weeks(&[row(""), row("03/01/2024"), row("xx"), row("01/01/2024")]);
    let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, vec!["01/01/2024", "03/01/2024", "", "xx"]);
    assert_eq!(rows[0].week_of_semester, Some(1));
    assert_eq!(rows[1].week_of_semester, Some(1));
    assert_eq!(rows[2].week_of_semester, None);
    assert_eq!(rows[3].week_of_year, None);
}
