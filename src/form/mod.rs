pub mod request;
pub mod export;

pub use request::{validate_search, PickRequest, SlotSearchRequest, MAX_RANGE_DAYS};
pub use export::{write_records, write_schedule_csv, write_slots_csv};
