use std::path::Path;

use timetable_slots::config::AppConfig;
use timetable_slots::display::{print_slots, print_week_summary};
use timetable_slots::form::{validate_search, write_schedule_csv, write_slots_csv, SlotSearchRequest};
use timetable_slots::parser::{load_rooms, load_schedule};
use timetable_slots::schedule::{annotate_weeks, lookup_slots_in, SlotCatalog};
use timetable_slots::web::{self, AppState};
use timetable_slots::{logging, TimetableError};
use tracing::info;

const USAGE: &str = "usage:
  timetable-slots web [port]
  timetable-slots annotate <schedule.csv> [out.csv]
  timetable-slots lookup <schedule.csv> <rules.json> [rooms.csv] [out.csv]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("web") => run_web(args.get(2).map(String::as_str)).await?,
        Some("annotate") => run_annotate(&args[2..])?,
        Some("lookup") => run_lookup(&args[2..])?,
        _ => println!("{}", USAGE),
    }
    Ok(())
}

async fn run_web(port: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?.with_port_arg(port)?;

    let schedule = match &config.schedule_csv {
        Some(path) => load_schedule(path)?,
        None => Vec::new(),
    };
    let rooms = match &config.rooms_csv {
        Some(path) => load_rooms(path)?,
        None => Vec::new(),
    };
    info!(rows = schedule.len(), rooms = rooms.len(), "initial data loaded");

    println!("Access the site at http://localhost:{}", config.port);
    web::start_server(config, AppState::new(schedule, rooms)).await?;
    Ok(())
}

fn run_annotate(args: &[String]) -> Result<(), TimetableError> {
    let Some(csv_path) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    let schedule = annotate_weeks(&load_schedule(csv_path)?);
    print_week_summary(&schedule);

    if let Some(out) = args.get(1) {
        write_schedule_csv(&schedule, Path::new(out))?;
        println!("Annotated schedule saved to {}", out);
    }
    Ok(())
}

fn run_lookup(args: &[String]) -> Result<(), TimetableError> {
    let (Some(csv_path), Some(rules_path)) = (args.first(), args.get(1)) else {
        println!("{}", USAGE);
        return Ok(());
    };

    let schedule = load_schedule(csv_path)?;
    let request: SlotSearchRequest = serde_json::from_str(&std::fs::read_to_string(rules_path)?)?;
    if let Err(message) = validate_search(&request) {
        println!("Invalid rules: {}", message);
        return Ok(());
    }

    let catalog = match args.get(2) {
        Some(rooms_path) => SlotCatalog::default().with_rooms(load_rooms(rooms_path)?),
        None => SlotCatalog::default(),
    };
    let slots = lookup_slots_in(&catalog, &request.inclusion, &request.exclusion, &schedule);

    let title = match &request.inclusion.course_unit {
        Some(unit) => format!("Free slots for {}", unit),
        None => "Free slots".to_string(),
    };
    print_slots(&title, &slots);

    if let Some(out) = args.get(3) {
        write_slots_csv(&slots, Path::new(out))?;
        println!("Slots saved to {}", out);
    }
    Ok(())
}
