use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use actix_files::Files;
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::WorkflowError;
use crate::form::{validate_search, PickRequest, SlotSearchRequest};
use crate::parser::{parse_rooms, parse_schedule};
use crate::schedule::workflow::{PickOutcome, SelectionState};
use crate::schedule::{
    annotate_weeks, lookup_slots_in, occupancy, Appointment, CandidateSlot, Room,
    SelectionWorkflow, SlotCatalog,
};

const WORKFLOW_KEY: &str = "selection_id";
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// In-memory session state: the current schedule, the room inventory and
/// the open slot selections. Uploads replace the schedule or rooms wholesale.
/// A selection is dropped as soon as it closes, by completion or cancel.
pub struct AppState {
    pub schedule: Mutex<Vec<Appointment>>,
    pub rooms: Mutex<Vec<Room>>,
    workflows: Mutex<HashMap<u64, SelectionWorkflow>>,
    next_workflow_id: AtomicU64,
}

impl AppState {
    pub fn new(schedule: Vec<Appointment>, rooms: Vec<Room>) -> Self {
        Self {
            schedule: Mutex::new(annotate_weeks(&schedule)),
            rooms: Mutex::new(rooms),
            workflows: Mutex::new(HashMap::new()),
            next_workflow_id: AtomicU64::new(1),
        }
    }

    fn catalog(&self) -> SlotCatalog {
        SlotCatalog::default().with_rooms(lock(&self.rooms).clone())
    }

    fn schedule_snapshot(&self) -> Vec<Appointment> {
        lock(&self.schedule).clone()
    }

    /// Number of selections currently open across all sessions.
    pub fn open_selections(&self) -> usize {
        lock(&self.workflows).len()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Serialize)]
pub struct SlotsResponse {
    count: usize,
    slots: Vec<CandidateSlot>,
}

#[derive(Serialize)]
pub struct SelectionResponse {
    state: SelectionState,
    lessons_needed: u32,
    remaining: u32,
    selections: Vec<CandidateSlot>,
    candidates: Vec<CandidateSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<PickOutcome>,
}

impl SelectionResponse {
    fn of(workflow: &SelectionWorkflow, outcome: Option<PickOutcome>) -> Self {
        Self {
            state: workflow.state(),
            lessons_needed: workflow.lessons_needed(),
            remaining: workflow.remaining(),
            selections: workflow.selections().to_vec(),
            candidates: workflow.candidates().to_vec(),
            outcome,
        }
    }
}

fn error_json(message: String) -> serde_json::Value {
    serde_json::json!({"success": false, "error": message})
}

fn workflow_error(err: WorkflowError) -> HttpResponse {
    warn!(error = %err, "selection request rejected");
    match err {
        WorkflowError::InvalidTransition { .. } => HttpResponse::Conflict().json(error_json(err.to_string())),
        WorkflowError::SelectionOutOfRange { .. } => HttpResponse::BadRequest().json(error_json(err.to_string())),
    }
}

// Schedule upload endpoint (CSV body)
async fn upload_schedule(body: web::Bytes, state: web::Data<AppState>) -> Result<HttpResponse> {
    match parse_schedule(&body) {
        Ok(rows) => {
            let annotated = annotate_weeks(&rows);
            let count = annotated.len();
            *lock(&state.schedule) = annotated;
            info!(rows = count, "schedule replaced");
            Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "rows": count})))
        }
        Err(e) => {
            warn!(error = %e, "schedule upload rejected");
            Ok(HttpResponse::BadRequest().json(error_json(format!("Failed to process CSV: {}", e))))
        }
    }
}

async fn get_schedule(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(&*lock(&state.schedule)))
}

// Room inventory upload endpoint (CSV body)
async fn upload_rooms(body: web::Bytes, state: web::Data<AppState>) -> Result<HttpResponse> {
    match parse_rooms(&body) {
        Ok(rooms) => {
            let count = rooms.len();
            *lock(&state.rooms) = rooms;
            info!(rooms = count, "room inventory replaced");
            Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "rooms": count})))
        }
        Err(e) => {
            warn!(error = %e, "room upload rejected");
            Ok(HttpResponse::BadRequest().json(error_json(format!("Failed to process CSV: {}", e))))
        }
    }
}

async fn get_rooms(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(&*lock(&state.rooms)))
}

// One-shot slot lookup
async fn lookup(req: web::Json<SlotSearchRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    if let Err(message) = validate_search(&req) {
        return Ok(HttpResponse::BadRequest().json(error_json(message)));
    }

    let catalog = state.catalog();
    let schedule = state.schedule_snapshot();
    let slots = lookup_slots_in(&catalog, &req.inclusion, &req.exclusion, &schedule);

    Ok(HttpResponse::Ok().json(SlotsResponse {
        count: slots.len(),
        slots,
    }))
}

async fn get_occupancy(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(occupancy(&lock(&state.schedule))))
}

/// Workflow id stored in the session cookie, allocated on first use
fn workflow_id(session: &Session, state: &AppState) -> Result<u64> {
    if let Some(id) = session.get::<u64>(WORKFLOW_KEY)? {
        return Ok(id);
    }
    let id = state.next_workflow_id.fetch_add(1, Ordering::Relaxed);
    session.insert(WORKFLOW_KEY, id)?;
    Ok(id)
}

/// Workflow id already bound to the session, if any
fn existing_workflow_id(session: &Session) -> Result<Option<u64>> {
    Ok(session.get::<u64>(WORKFLOW_KEY)?)
}

fn closed_view() -> SelectionResponse {
    SelectionResponse::of(&SelectionWorkflow::default(), None)
}

/// Runs `action` on the session's open selection, or on a closed stand-in
/// when there is none. A selection that ends up closed is dropped.
fn with_open_workflow<R>(
    session: &Session,
    state: &AppState,
    action: impl FnOnce(&mut SelectionWorkflow) -> R,
) -> Result<R> {
    let id = existing_workflow_id(session)?;
    let mut workflows = lock(&state.workflows);
    let mut detached = SelectionWorkflow::new();
    let open = match id {
        Some(id) => workflows.get_mut(&id),
        None => None,
    };
    let workflow = match open {
        Some(workflow) => workflow,
        None => &mut detached,
    };

    let result = action(&mut *workflow);
    if workflow.state() == SelectionState::Closed {
        if let Some(id) = id {
            workflows.remove(&id);
        }
    }
    Ok(result)
}

async fn selection_open(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let id = workflow_id(&session, &state)?;
    let mut workflows = lock(&state.workflows);
    let workflow = workflows.entry(id).or_default();

    Ok(match workflow.open() {
        Ok(()) => HttpResponse::Ok().json(SelectionResponse::of(workflow, None)),
        Err(e) => workflow_error(e),
    })
}

async fn selection_search(
    req: web::Json<SlotSearchRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if let Err(message) = validate_search(&req) {
        return Ok(HttpResponse::BadRequest().json(error_json(message)));
    }
    let req = req.into_inner();
    let catalog = state.catalog();
    let schedule = state.schedule_snapshot();

    with_open_workflow(&session, &state, |workflow| {
        let searched = workflow
            .search(&catalog, req.inclusion, req.exclusion, &schedule)
            .map(|_| ());
        match searched {
            Ok(()) => HttpResponse::Ok().json(SelectionResponse::of(workflow, None)),
            Err(e) => workflow_error(e),
        }
    })
}

async fn selection_pick(
    req: web::Json<PickRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    with_open_workflow(&session, &state, |workflow| match workflow.pick(req.index) {
        Ok(outcome) => HttpResponse::Ok().json(SelectionResponse::of(workflow, Some(outcome))),
        Err(e) => workflow_error(e),
    })
}

async fn selection_refine(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let catalog = state.catalog();
    let schedule = state.schedule_snapshot();

    with_open_workflow(&session, &state, |workflow| {
        let refined = workflow.refine(&catalog, &schedule).map(|_| ());
        match refined {
            Ok(()) => HttpResponse::Ok().json(SelectionResponse::of(workflow, None)),
            Err(e) => workflow_error(e),
        }
    })
}

async fn selection_cancel(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    if let Some(id) = existing_workflow_id(&session)? {
        if lock(&state.workflows).remove(&id).is_some() {
            info!(workflow = id, "selection cancelled");
        }
    }
    Ok(HttpResponse::Ok().json(closed_view()))
}

async fn get_selection(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let id = existing_workflow_id(&session)?;
    let workflows = lock(&state.workflows);
    let view = match id.and_then(|id| workflows.get(&id)) {
        Some(workflow) => SelectionResponse::of(workflow, None),
        None => closed_view(),
    };
    Ok(HttpResponse::Ok().json(view))
}

/// Registers the JSON API routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
        .route("/api/schedule", web::post().to(upload_schedule))
        .route("/api/schedule", web::get().to(get_schedule))
        .route("/api/rooms", web::post().to(upload_rooms))
        .route("/api/rooms", web::get().to(get_rooms))
        .route("/api/slots", web::post().to(lookup))
        .route("/api/occupancy", web::get().to(get_occupancy))
        .route("/api/selection", web::get().to(get_selection))
        .route("/api/selection/open", web::post().to(selection_open))
        .route("/api/selection/search", web::post().to(selection_search))
        .route("/api/selection/pick", web::post().to(selection_pick))
        .route("/api/selection/refine", web::post().to(selection_refine))
        .route("/api/selection/cancel", web::post().to(selection_cancel));
}

/// Cookie session carrying the selection id; plain HTTP is allowed.
pub fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_secure(false)
        .build()
}

pub async fn start_server(config: AppConfig, state: AppState) -> std::io::Result<()> {
    let app_state = web::Data::new(state);
    let key = Key::generate();
    let static_dir = config.static_dir.clone();
    let serve_static = static_dir.is_dir();
    if !serve_static {
        warn!(dir = %static_dir.display(), "static directory not found, serving the API only");
    }

    info!(bind = %config.bind, port = config.port, "starting web server");
    HttpServer::new(move || {
        let app = App::new()
            .app_data(app_state.clone())
            .wrap(session_middleware(key.clone()))
            .wrap(middleware::Logger::default())
            .configure(configure);
        if serve_static {
            app.service(Files::new("/", static_dir.clone()).index_file("index.html"))
        } else {
            app
        }
    })
    .bind((config.bind.as_str(), config.port))?
    .run()
    .await
}
