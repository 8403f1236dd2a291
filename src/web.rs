use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::config::{AppConfig, ScheduleRules};
use crate::display::render_schedule;
use crate::export::ScheduleReport;
use crate::parser::{build_roster, read_roster_csv, RosterEntry};
use crate::schedule::{AssignmentEngine, RandomPreferences, Roster, ScheduleGrid};

/// Outcome of the last assignment run. Only complete runs are stored.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub roster: Roster,
    pub grid: ScheduleGrid,
}

/// The submitted roster and the result computed from it. Both live under
/// one lock so a reader never sees a result from an older submission.
#[derive(Debug, Default)]
pub struct Session {
    roster: Option<Roster>,
    generation: u64,
    result: Option<RunResult>,
}

impl Session {
    /// Replaces the roster and drops any result computed from the old one.
    pub fn submit(&mut self, roster: Roster) {
        self.roster = Some(roster);
        self.generation += 1;
        self.result = None;
    }

    /// Copy of the current roster to run the engine on, tagged with its
    /// submission.
    pub fn snapshot(&self) -> Option<(u64, Roster)> {
        self.roster.clone().map(|roster| (self.generation, roster))
    }

    /// Stores `result` unless a newer roster was submitted since
    /// `generation` was taken. Returns whether it was stored.
    pub fn publish(&mut self, generation: u64, result: RunResult) -> bool {
        if generation != self.generation {
            return false;
        }
        self.result = Some(result);
        true
    }

    pub fn roster(&self) -> Option<&Roster> {
        self.roster.as_ref()
    }

    pub fn result(&self) -> Option<&RunResult> {
        self.result.as_ref()
    }
}

// In-memory only: one submitted roster and the last result.
pub struct AppState {
    pub rules: ScheduleRules,
    pub default_seed: Option<u64>,
    pub admin_password: Option<String>,
    pub session: Mutex<Session>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            rules: config.rules.clone(),
            default_seed: config.seed,
            admin_password: config.server.admin_password.clone(),
            session: Mutex::new(Session::default()),
        }
    }
}

#[derive(Deserialize)]
pub struct RosterRequest {
    pub names: Vec<String>,
    pub seed: Option<u64>,
}

#[derive(Deserialize)]
pub struct SeedQuery {
    pub seed: Option<u64>,
}

#[derive(Serialize)]
pub struct RosterResponse {
    success: bool,
    employees: usize,
}

#[derive(Serialize)]
pub struct AssignResponse {
    success: bool,
    assignments: usize,
    shortfalls: usize,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| actix_web::error::ErrorInternalServerError("state lock poisoned"))
}

fn authorized(req: &HttpRequest, state: &AppState) -> bool {
    let Some(expected) = state.admin_password.as_deref() else {
        return true;
    };
    let password = req
        .headers()
        .get("X-Admin-Password")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    password == expected
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({
        "success": false,
        "error": "Unauthorized"
    }))
}

fn store_roster(
    entries: &[RosterEntry],
    seed: Option<u64>,
    state: &AppState,
) -> Result<HttpResponse> {
    let preferences = match seed.or(state.default_seed) {
        Some(seed) => RandomPreferences::seeded(seed),
        None => RandomPreferences::from_entropy(),
    };
    match build_roster(entries, &state.rules, preferences) {
        Ok(roster) => {
            let employees = roster.len();
            info!(employees, "roster submitted");
            lock(&state.session)?.submit(roster);
            Ok(HttpResponse::Ok().json(RosterResponse {
                success: true,
                employees,
            }))
        }
        Err(e) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": format!("Invalid roster: {}", e)
        }))),
    }
}

// Step 1: submit a roster as JSON
async fn submit_roster(
    req: HttpRequest,
    body: web::Json<RosterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !authorized(&req, &state) {
        return Ok(unauthorized());
    }
    let entries: Vec<RosterEntry> = body.names.iter().map(RosterEntry::new).collect();
    store_roster(&entries, body.seed, &state)
}

// Step 1, CSV flavour: same columns as the command-line roster file
async fn upload_roster_csv(
    req: HttpRequest,
    query: web::Query<SeedQuery>,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !authorized(&req, &state) {
        return Ok(unauthorized());
    }
    match read_roster_csv(body.as_ref()) {
        Ok(entries) => store_roster(&entries, query.seed, &state),
        Err(e) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": format!("Failed to process CSV: {}", e)
        }))),
    }
}

// Step 2: run the assignment on a copy of the submitted roster
async fn run_assignment(state: web::Data<AppState>) -> Result<HttpResponse> {
    let Some((generation, mut roster)) = lock(&state.session)?.snapshot() else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": "No roster submitted"
        })));
    };

    let engine = AssignmentEngine::new(state.rules.clone());
    let grid = engine.run(&mut roster);
    let response = AssignResponse {
        success: true,
        assignments: grid.total_assignments(),
        shortfalls: engine.shortfalls(&grid).len(),
    };
    if !lock(&state.session)?.publish(generation, RunResult { roster, grid }) {
        warn!(generation, "roster replaced during assignment, result discarded");
        return Ok(HttpResponse::Conflict().json(serde_json::json!({
            "success": false,
            "error": "Roster changed during assignment"
        })));
    }

    Ok(HttpResponse::Ok().json(response))
}

fn not_assigned() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({"error": "Schedule not available"}))
}

// Step 3: fetch the result
async fn get_schedule(state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = lock(&state.session)?;
    match session.result() {
        Some(run) => {
            let report = ScheduleReport::new(&run.grid, &run.roster, &state.rules);
            Ok(HttpResponse::Ok().json(report))
        }
        None => Ok(not_assigned()),
    }
}

async fn get_schedule_text(state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = lock(&state.session)?;
    match session.result() {
        Some(run) => Ok(HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body(render_schedule(&run.grid, &state.rules.days, &state.rules.shifts))),
        None => Ok(not_assigned()),
    }
}

async fn get_shortfalls(state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = lock(&state.session)?;
    match session.result() {
        Some(run) => {
            let engine = AssignmentEngine::new(state.rules.clone());
            Ok(HttpResponse::Ok().json(engine.shortfalls(&run.grid)))
        }
        None => Ok(not_assigned()),
    }
}

async fn get_employees(state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = lock(&state.session)?;
    match session.result() {
        Some(run) => {
            let report = ScheduleReport::new(&run.grid, &run.roster, &state.rules);
            Ok(HttpResponse::Ok().json(report.employees))
        }
        None => Ok(not_assigned()),
    }
}

/// Routes, shared by the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/roster", web::post().to(submit_roster))
        .route("/api/roster/csv", web::post().to(upload_roster_csv))
        .route("/api/assign", web::post().to(run_assignment))
        .route("/api/schedule", web::get().to(get_schedule))
        .route("/api/schedule/text", web::get().to(get_schedule_text))
        .route("/api/shortfalls", web::get().to(get_shortfalls))
        .route("/api/employees", web::get().to(get_employees));
}

pub async fn start_server(config: &AppConfig) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(config));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind((config.server.bind.as_str(), config.server.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::EmployeeReport;
    use crate::schedule::{Day, ShiftType, Shortfall, TaxonomyOrder};
    use actix_web::http::StatusCode;
    use actix_web::test;

    fn state(password: Option<&str>) -> web::Data<AppState> {
        let mut config = AppConfig::default();
        config.seed = Some(7);
        config.server.admin_password = password.map(str::to_string);
        web::Data::new(AppState::new(&config))
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(configure)).await
        };
    }

    #[actix_web::test]
    async fn submit_assign_fetch() {
        let state = state(None);
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/roster")
            .set_json(serde_json::json!({
                "names": ["Alice", "Bob", "Carol", "Dan", "Eve", "Fay", "Gus"]
            }))
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["employees"], 7);

        let req = test::TestRequest::post().uri("/api/assign").to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["success"], true);

        let req = test::TestRequest::get().uri("/api/schedule").to_request();
        let report: ScheduleReport = test::call_and_read_body_json(&app, req).await;
        assert_eq!(report.days.len(), 7);
        assert_eq!(report.employees.len(), 7);
        assert!(report.employees.iter().all(|e| e.days_worked <= 5));

        let req = test::TestRequest::get().uri("/api/schedule/text").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert!(String::from_utf8_lossy(&body).contains("[ MONDAY ]"));
    }

    #[actix_web::test]
    async fn fetch_before_assign_is_not_found() {
        let state = state(None);
        let app = app!(state);

        let req = test::TestRequest::get().uri("/api/schedule").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post().uri("/api/assign").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn invalid_roster_is_bad_request() {
        let state = state(None);
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/roster")
            .set_json(serde_json::json!({"names": ["Alice", "Alice"]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(state.session.lock().unwrap().roster().is_none());
    }

    #[actix_web::test]
    async fn password_guards_submission() {
        let state = state(Some("secret"));
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/roster")
            .set_json(serde_json::json!({"names": ["Alice", "Bob"]}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/roster")
            .insert_header(("X-Admin-Password", "secret"))
            .set_json(serde_json::json!({"names": ["Alice", "Bob"]}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn csv_upload_and_shortfalls() {
        let state = state(None);
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/roster/csv?seed=3")
            .set_payload(
                "name,monday\n\
                 Alice,Evening;Morning;Afternoon\n\
                 Bob,Morning;Evening;Afternoon\n",
            )
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post().uri("/api/assign").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/shortfalls").to_request();
        let shortfalls: Vec<Shortfall> = test::call_and_read_body_json(&app, req).await;
        let monday: Vec<_> = shortfalls.iter().filter(|s| s.day == Day::Monday).collect();
        assert_eq!(monday.len(), 3);

        let req = test::TestRequest::get().uri("/api/employees").to_request();
        let employees: Vec<EmployeeReport> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(employees[0].name, "Alice");
        assert_eq!(employees[0].assignments[&Day::Monday], Some(ShiftType::Evening));
    }

    #[actix_web::test]
    async fn resubmitting_clears_previous_result() {
        let state = state(None);
        let app = app!(state);

        for uri in ["/api/roster", "/api/assign"] {
            let req = test::TestRequest::post()
                .uri(uri)
                .set_json(serde_json::json!({"names": ["Alice", "Bob"]}))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }
        assert!(state.session.lock().unwrap().result().is_some());

        let req = test::TestRequest::post()
            .uri("/api/roster")
            .set_json(serde_json::json!({"names": ["Carol", "Dan"]}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        assert!(state.session.lock().unwrap().result().is_none());
    }

    fn roster_of(names: &[&str]) -> Roster {
        Roster::build(names.iter().copied(), &ScheduleRules::default(), &mut TaxonomyOrder).unwrap()
    }

    #[::core::prelude::v1::test]
    fn result_from_replaced_roster_is_dropped() {
        let mut session = Session::default();
        session.submit(roster_of(&["Alice", "Bob"]));
        let (generation, mut roster) = session.snapshot().unwrap();

        // A new roster lands while the engine is still running on the old one.
        session.submit(roster_of(&["Carol", "Dan"]));
        let grid = AssignmentEngine::default().run(&mut roster);
        assert!(!session.publish(generation, RunResult { roster, grid }));
        assert!(session.result().is_none());

        let (generation, mut roster) = session.snapshot().unwrap();
        assert_eq!(roster.employees()[0].name(), "Carol");
        let grid = AssignmentEngine::default().run(&mut roster);
        assert!(session.publish(generation, RunResult { roster, grid }));
        assert_eq!(session.result().unwrap().roster.employees()[0].name(), "Carol");
    }
}
