use std::sync::{Mutex, MutexGuard};

use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use serde::{Deserialize, Serialize};

use crate::display::format_squads;
use crate::export::squads_to_csv;
use crate::parser::Member;
use crate::session::{Session, SlotRef};
use crate::squad::{Encounter, Role, Squad, Vocation, VocationCounts};

/// One coordinator session shared by all handlers
pub struct AppState {
    pub session: Mutex<Session>,
}

impl AppState {
    pub fn new() -> AppState {
        AppState { session: Mutex::new(Session::new()) }
    }
}

impl Default for AppState {
    fn default() -> Self {
        AppState::new()
    }
}

fn lock(state: &AppState) -> Result<MutexGuard<'_, Session>> {
    state
        .session
        .lock()
        .map_err(|_| actix_web::error::ErrorInternalServerError("session state poisoned"))
}

#[derive(Deserialize)]
pub struct GenerateRequest {
    spec: String,
}

#[derive(Deserialize)]
pub struct PriorityRequest {
    priority: u32,
}

#[derive(Deserialize)]
pub struct RoleRequest {
    encounter: Encounter,
    role: Role,
    #[serde(default)]
    remove: bool,
}

#[derive(Deserialize)]
pub struct VocationPriorityRequest {
    encounter: Encounter,
    vocations: Vec<Vocation>,
}

#[derive(Deserialize)]
pub struct ReorderRequest {
    from: usize,
    to: usize,
}

#[derive(Deserialize)]
pub struct MoveRequest {
    from: SlotRef,
    to: SlotRef,
}

/// A squad plus its refreshed per-vocation counts
#[derive(Serialize)]
pub struct SquadView<'a> {
    #[serde(flatten)]
    squad: &'a Squad,
    counts: VocationCounts,
}

#[derive(Serialize)]
pub struct SquadsResponse<'a> {
    squads: Vec<SquadView<'a>>,
}

impl<'a> SquadsResponse<'a> {
    fn new(squads: &'a [Squad]) -> SquadsResponse<'a> {
        SquadsResponse {
            squads: squads
                .iter()
                .map(|squad| SquadView { squad, counts: squad.vocation_counts() })
                .collect(),
        }
    }
}

#[derive(Serialize)]
pub struct MembersResponse<'a> {
    members: &'a [Member],
}

fn bad_request(message: impl ToString) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({"success": false, "error": message.to_string()}))
}

fn not_found(message: impl ToString) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({"success": false, "error": message.to_string()}))
}

// Roster import: the body is the raw sign-up text
async fn import(body: String, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut session = lock(&state)?;
    match session.import(&body) {
        Ok(count) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": format!("Imported {} player(s).", count),
            "members": count
        }))),
        Err(e) => Ok(bad_request(e)),
    }
}

async fn get_members(state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = lock(&state)?;
    Ok(HttpResponse::Ok().json(MembersResponse { members: session.members() }))
}

// Drag-to-reorder in the roster list; priorities follow the new positions
async fn reorder_members(req: web::Json<ReorderRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut session = lock(&state)?;
    match session.reorder_member(req.from, req.to) {
        Ok(()) => Ok(HttpResponse::Ok().json(MembersResponse { members: session.members() })),
        Err(e) => Ok(bad_request(e)),
    }
}

async fn set_priority(
    id: web::Path<i64>,
    req: web::Json<PriorityRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut session = lock(&state)?;
    match session.set_priority(id.into_inner(), req.priority) {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({"success": true}))),
        Err(e) => Ok(not_found(e)),
    }
}

async fn edit_role(
    id: web::Path<i64>,
    req: web::Json<RoleRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut session = lock(&state)?;
    let id = id.into_inner();
    let result = if req.remove {
        session.remove_role(id, req.encounter, req.role)
    } else {
        session.add_role(id, req.encounter, req.role)
    };
    match result {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({"success": true}))),
        Err(e) => Ok(not_found(e)),
    }
}

async fn set_vocation_priority(
    id: web::Path<i64>,
    req: web::Json<VocationPriorityRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut session = lock(&state)?;
    match session.set_vocation_priority(id.into_inner(), req.encounter, &req.vocations) {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({"success": true}))),
        Err(e) => Ok(not_found(e)),
    }
}

async fn generate(req: web::Json<GenerateRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut session = lock(&state)?;
    match session.generate(&req.spec) {
        Ok(squads) if squads.is_empty() => Ok(bad_request(
            "Could not form any teams. Check sign-ups and boss codes.",
        )),
        Ok(squads) => Ok(HttpResponse::Ok().json(SquadsResponse::new(squads))),
        Err(e) => Ok(bad_request(e)),
    }
}

// Re-runs the last encounter codes after roster edits
async fn regenerate(state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut session = lock(&state)?;
    match session.regenerate() {
        Ok(squads) if squads.is_empty() => Ok(bad_request(
            "Could not form any teams. Check sign-ups and boss codes.",
        )),
        Ok(squads) => Ok(HttpResponse::Ok().json(SquadsResponse::new(squads))),
        Err(e) => Ok(bad_request(e)),
    }
}

async fn revalidate(state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut session = lock(&state)?;
    session.revalidate_all();
    Ok(HttpResponse::Ok().json(SquadsResponse::new(session.squads())))
}

async fn get_squads(state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = lock(&state)?;
    Ok(HttpResponse::Ok().json(SquadsResponse::new(session.squads())))
}

// Manual reassignment; every accepted move comes back with refreshed flags and counts
async fn move_candidate(req: web::Json<MoveRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut session = lock(&state)?;
    match session.move_candidate(req.from, req.to) {
        Ok(()) => Ok(HttpResponse::Ok().json(SquadsResponse::new(session.squads()))),
        Err(e) => Ok(bad_request(e)),
    }
}

async fn export_text(state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = lock(&state)?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(format_squads(session.squads())))
}

async fn export_csv(state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = lock(&state)?;
    let csv = squads_to_csv(session.squads()).map_err(actix_web::error::ErrorInternalServerError)?;
    Ok(HttpResponse::Ok().content_type("text/csv; charset=utf-8").body(csv))
}

/// Registers every API route; shared by the server and the handler tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/import", web::post().to(import))
        .route("/api/members", web::get().to(get_members))
        .route("/api/members/reorder", web::post().to(reorder_members))
        .route("/api/members/{id}/priority", web::post().to(set_priority))
        .route("/api/members/{id}/roles", web::post().to(edit_role))
        .route("/api/members/{id}/vocation-priority", web::post().to(set_vocation_priority))
        .route("/api/generate", web::post().to(generate))
        .route("/api/regenerate", web::post().to(regenerate))
        .route("/api/revalidate", web::post().to(revalidate))
        .route("/api/squads", web::get().to(get_squads))
        .route("/api/move", web::post().to(move_candidate))
        .route("/api/export", web::get().to(export_text))
        .route("/api/export.csv", web::get().to(export_csv));
}

pub async fn start_server(bind: &str, port: u16) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new());

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind((bind, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};

    const ROSTER: &str = "Alice (EK) P\nBob (ED) P\nCarol (MS) P\nDave (RP) P\nErin (EK) Z";

    macro_rules! app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(configure)).await
        };
    }

    #[actix_web::test]
    async fn import_then_generate_then_export() {
        let state = web::Data::new(AppState::new());
        let app = app!(state);

        let req = test::TestRequest::post().uri("/api/import").set_payload(ROSTER).to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["members"], 5);

        let req = test::TestRequest::post()
            .uri("/api/generate")
            .set_json(serde_json::json!({"spec": "P1"}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let squads = body["squads"].as_array().unwrap();
        assert_eq!(squads.len(), 2);
        assert_eq!(squads[0]["encounter"], "P");
        assert_eq!(squads[0]["meets_requirements"], true);
        assert_eq!(squads[0]["counts"]["EK"], 1);

        let req = test::TestRequest::get().uri("/api/export").to_request();
        let text = test::call_and_read_body(&app, req).await;
        assert!(std::str::from_utf8(&text).unwrap().starts_with("**Pale — Team 1 (4/10)**"));

        let req = test::TestRequest::get().uri("/api/export.csv").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn empty_import_is_rejected() {
        let state = web::Data::new(AppState::new());
        let app = app!(state);
        let req = test::TestRequest::post().uri("/api/import").set_payload("").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn cross_encounter_move_is_rejected() {
        let state = web::Data::new(AppState::new());
        let app = app!(state);
        {
            let mut session = state.session.lock().unwrap();
            session.import(ROSTER).unwrap();
            session.generate("P1 Z1").unwrap();
        }
        let req = test::TestRequest::post()
            .uri("/api/move")
            .set_json(serde_json::json!({
                "from": {"squad": 0, "position": {"kind": "member", "index": 0}},
                "to": {"squad": 2, "position": {"kind": "member", "index": 0}}
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/move")
            .set_json(serde_json::json!({
                "from": {"squad": 0, "position": {"kind": "member", "index": 0}},
                "to": {"squad": 1, "position": {"kind": "backup", "index": 0}}
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["squads"][0]["meets_requirements"], false);
        assert_eq!(body["squads"][1]["backups"].as_array().map(Vec::len), Some(1));
    }

    #[actix_web::test]
    async fn member_edits_by_id() {
        let state = web::Data::new(AppState::new());
        let app = app!(state);
        let id = {
            let mut session = state.session.lock().unwrap();
            session.import(ROSTER).unwrap();
            session.members()[1].id
        };

        let req = test::TestRequest::post()
            .uri(&format!("/api/members/{id}/roles"))
            .set_json(serde_json::json!({"encounter": "P", "role": "Red Knight"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri(&format!("/api/members/{id}/priority"))
            .set_json(serde_json::json!({"priority": 9}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/api/members/1/priority")
            .set_json(serde_json::json!({"priority": 9}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/api/members").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["members"][1]["priority"], 9);
        assert_eq!(body["members"][1]["boss_roles"]["P"][0], "Red Knight");
    }

    #[actix_web::test]
    async fn regenerate_reuses_last_codes() {
        let state = web::Data::new(AppState::new());
        let app = app!(state);

        let req = test::TestRequest::post().uri("/api/regenerate").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let id = {
            let mut session = state.session.lock().unwrap();
            session.import(ROSTER).unwrap();
            session.generate("P1").unwrap();
            session.members().iter().find(|m| m.name == "Carol").unwrap().id
        };
        let req = test::TestRequest::post()
            .uri(&format!("/api/members/{id}/priority"))
            .set_json(serde_json::json!({"priority": 0}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post().uri("/api/regenerate").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let squads = body["squads"].as_array().unwrap();
        assert_eq!(squads.len(), 2);
        assert_eq!(squads[0]["encounter"], "P");
        let carol = squads[0]["members"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["name"] == "Carol")
            .unwrap();
        assert_eq!(carol["priority"], 0);
    }

    #[actix_web::test]
    async fn reorder_renumbers_roster_priorities() {
        let state = web::Data::new(AppState::new());
        let app = app!(state);
        state.session.lock().unwrap().import(ROSTER).unwrap();

        let req = test::TestRequest::post()
            .uri("/api/members/reorder")
            .set_json(serde_json::json!({"from": 4, "to": 0}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["members"][0]["name"], "Erin");
        assert_eq!(body["members"][0]["priority"], 0);
        assert_eq!(body["members"][1]["name"], "Alice");
        assert_eq!(body["members"][1]["priority"], 1);

        let req = test::TestRequest::post()
            .uri("/api/members/reorder")
            .set_json(serde_json::json!({"from": 0, "to": 5}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn revalidate_refreshes_stale_flags() {
        let state = web::Data::new(AppState::new());
        let app = app!(state);
        {
            let mut session = state.session.lock().unwrap();
            session.import(ROSTER).unwrap();
            session.generate("P1").unwrap();
        }
        // a saved session whose flags no longer match its members
        let mut saved = serde_json::to_value(&*state.session.lock().unwrap()).unwrap();
        saved["squads"][0]["meets_requirements"] = serde_json::Value::Bool(false);
        *state.session.lock().unwrap() = serde_json::from_value(saved).unwrap();

        let req = test::TestRequest::post().uri("/api/revalidate").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["squads"][0]["meets_requirements"], true);
        assert_eq!(body["squads"][1]["meets_requirements"], false);
    }
}
