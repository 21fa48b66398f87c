//! Single binary web server: JSON API over the tournament engine.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Set SNAPSHOT_PATH to keep state across restarts (JSON file, rewritten
//! every SNAPSHOT_INTERVAL_SECS and on shutdown).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::NaiveDate;
use kendo_tournament::{
    BoutEngine, BoutId, Clock, Court, CourtService, CourtStatePatch, ErrorKind, GroupId, MatchType,
    MemberId, MemoryStore, RosterService, ScoreType, ServerConfig, Side, SystemClock,
    TournamentId, TournamentOrchestrator, TournamentResult, TournamentStore, TournamentUpdate,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Services shared by all workers.
struct Services {
    bouts: BoutEngine,
    tournaments: TournamentOrchestrator,
    roster: RosterService,
    courts: CourtService,
}

type AppState = Data<Services>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
struct CountResponse {
    count: usize,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    date: NaiveDate,
}

#[derive(Deserialize)]
struct CreateGroupBody {
    group_id: GroupId,
    name: String,
    #[serde(default)]
    is_hantei: bool,
}

#[derive(Deserialize)]
struct CreateMemberBody {
    first_name: String,
    last_name: String,
    group_id: GroupId,
    #[serde(default)]
    is_guest: bool,
}

#[derive(Deserialize)]
struct AddParticipantBody {
    member_id: MemberId,
    group_id: GroupId,
}

#[derive(Deserialize)]
struct AddMembersBody {
    member_ids: Vec<MemberId>,
}

#[derive(Deserialize)]
struct GroupCourtBody {
    court: Court,
}

#[derive(Deserialize)]
struct GroupMatchTypeBody {
    match_type: MatchType,
}

#[derive(Deserialize)]
struct GroupTimerBody {
    timer_duration: u32,
}

#[derive(Deserialize)]
struct PlayerBody {
    player: Side,
}

#[derive(Deserialize)]
struct ScoreBody {
    player: Side,
    score_type: ScoreType,
    elapsed: Option<u32>,
}

#[derive(Deserialize)]
struct HansokuBody {
    player: Side,
    elapsed: Option<u32>,
}

#[derive(Deserialize)]
struct TimerAddBody {
    seconds: u32,
}

#[derive(Deserialize)]
struct ForfeitBody {
    forfeiting_player: Side,
}

#[derive(Deserialize)]
struct HanteiRoundBody {
    round: u32,
    combo: String,
    aka_flags: u8,
    shiro_flags: u8,
}

#[derive(Deserialize)]
struct CurrentBoutBody {
    bout_id: Option<BoutId>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and division id
#[derive(Deserialize)]
struct TournamentGroupPath {
    id: TournamentId,
    group_id: GroupId,
}

/// Path segments: tournament id and court (A, B or A+B)
#[derive(Deserialize)]
struct TournamentCourtPath {
    id: TournamentId,
    court: Court,
}

/// Path segments: tournament id and member id
#[derive(Deserialize)]
struct TournamentMemberPath {
    id: TournamentId,
    member_id: MemberId,
}

#[derive(Deserialize)]
struct BoutPath {
    id: BoutId,
}

#[derive(Deserialize)]
struct GroupPath {
    group_id: GroupId,
}

/// Map an engine result to a JSON response; error kinds pick the status code.
fn respond<T: Serialize>(result: TournamentResult<T>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => {
            let body = serde_json::json!({ "error": e.to_string() });
            match e.kind() {
                ErrorKind::NotFound => HttpResponse::NotFound().json(body),
                ErrorKind::InvalidInput => HttpResponse::BadRequest().json(body),
                ErrorKind::InvalidState | ErrorKind::Conflict => HttpResponse::Conflict().json(body),
                ErrorKind::Storage => {
                    log::error!("Storage failure: {}", e);
                    HttpResponse::InternalServerError()
                        .json(serde_json::json!({ "error": "Internal server error" }))
                }
            }
        }
    }
}

fn count(result: TournamentResult<usize>) -> HttpResponse {
    respond(result.map(|count| CountResponse { count }))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "kendo-tournament",
    })
}

#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState) -> HttpResponse {
    respond(state.tournaments.tournaments())
}

#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    respond(state.tournaments.create_tournament(&body.name, body.date))
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.tournaments.tournament(path.id))
}

#[put("/api/tournaments/{id}")]
async fn api_update_tournament(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<TournamentUpdate>,
) -> HttpResponse {
    respond(state.tournaments.update_tournament(path.id, body.into_inner()))
}

#[delete("/api/tournaments/{id}")]
async fn api_remove_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.tournaments.remove(path.id))
}

#[post("/api/tournaments/{id}/start")]
async fn api_start_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.tournaments.start_tournament(path.id))
}

#[post("/api/tournaments/{id}/complete")]
async fn api_complete_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.tournaments.complete_tournament(path.id))
}

#[post("/api/tournaments/{id}/matches/generate")]
async fn api_generate_matches(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.tournaments.generate_matches(path.id))
}

#[post("/api/tournaments/{id}/matches/refresh")]
async fn api_refresh_participants(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.tournaments.refresh_participants(path.id))
}

#[post("/api/tournaments/{id}/reset")]
async fn api_reset_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    count(state.tournaments.reset(path.id))
}

#[get("/api/tournaments/{id}/bouts")]
async fn api_tournament_bouts(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.tournaments.bouts(path.id))
}

#[get("/api/tournaments/{id}/bouts/active")]
async fn api_active_bouts(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.tournaments.active_bouts(path.id))
}

#[get("/api/tournaments/{id}/courts/{court}/bouts")]
async fn api_court_bouts(state: AppState, path: Path<TournamentCourtPath>) -> HttpResponse {
    respond(state.tournaments.bouts_for_court(path.id, path.court))
}

#[get("/api/tournaments/{id}/courts/{court}/state")]
async fn api_court_state(state: AppState, path: Path<TournamentCourtPath>) -> HttpResponse {
    respond(state.courts.court_state(path.id, path.court))
}

#[put("/api/tournaments/{id}/courts/{court}/state")]
async fn api_upsert_court_state(
    state: AppState,
    path: Path<TournamentCourtPath>,
    body: Json<CourtStatePatch>,
) -> HttpResponse {
    respond(state.courts.upsert(path.id, path.court, body.into_inner()))
}

#[put("/api/tournaments/{id}/courts/{court}/current")]
async fn api_set_current_bout(
    state: AppState,
    path: Path<TournamentCourtPath>,
    body: Json<CurrentBoutBody>,
) -> HttpResponse {
    respond(state.courts.set_current_bout(path.id, path.court, body.bout_id))
}

#[put("/api/tournaments/{id}/groups/{group_id}/court")]
async fn api_set_group_court(
    state: AppState,
    path: Path<TournamentGroupPath>,
    body: Json<GroupCourtBody>,
) -> HttpResponse {
    count(state.tournaments.set_group_court(path.id, &path.group_id, body.court))
}

#[put("/api/tournaments/{id}/groups/{group_id}/match-type")]
async fn api_set_group_match_type(
    state: AppState,
    path: Path<TournamentGroupPath>,
    body: Json<GroupMatchTypeBody>,
) -> HttpResponse {
    count(
        state
            .tournaments
            .set_group_match_type(path.id, &path.group_id, body.match_type),
    )
}

#[put("/api/tournaments/{id}/groups/{group_id}/timer")]
async fn api_set_group_timer(
    state: AppState,
    path: Path<TournamentGroupPath>,
    body: Json<GroupTimerBody>,
) -> HttpResponse {
    count(
        state
            .tournaments
            .set_group_timer(path.id, &path.group_id, body.timer_duration),
    )
}

#[get("/api/tournaments/{id}/groups/{group_id}/standings")]
async fn api_group_standings(state: AppState, path: Path<TournamentGroupPath>) -> HttpResponse {
    respond(state.tournaments.standings(path.id, &path.group_id))
}

#[post("/api/tournaments/{id}/groups/{group_id}/sudden-death")]
async fn api_recheck_sudden_death(state: AppState, path: Path<TournamentGroupPath>) -> HttpResponse {
    respond(state.tournaments.recheck_sudden_death(path.id, &path.group_id))
}

#[get("/api/tournaments/{id}/participants")]
async fn api_participants(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.roster.participants(path.id))
}

#[post("/api/tournaments/{id}/participants")]
async fn api_add_participant(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<AddParticipantBody>,
) -> HttpResponse {
    respond(
        state
            .roster
            .add_participant(path.id, body.member_id, &body.group_id),
    )
}

#[post("/api/tournaments/{id}/participants/bulk")]
async fn api_add_members(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<AddMembersBody>,
) -> HttpResponse {
    count(state.roster.add_members(path.id, &body.member_ids))
}

#[delete("/api/tournaments/{id}/participants/{member_id}")]
async fn api_remove_participant(state: AppState, path: Path<TournamentMemberPath>) -> HttpResponse {
    respond(state.roster.remove_participant_by_member(path.id, path.member_id))
}

#[get("/api/groups")]
async fn api_groups(state: AppState) -> HttpResponse {
    respond(state.roster.groups())
}

#[post("/api/groups")]
async fn api_create_group(state: AppState, body: Json<CreateGroupBody>) -> HttpResponse {
    respond(
        state
            .roster
            .create_group(&body.group_id, &body.name, body.is_hantei),
    )
}

#[delete("/api/groups/{group_id}")]
async fn api_remove_group(state: AppState, path: Path<GroupPath>) -> HttpResponse {
    respond(state.roster.remove_group(&path.group_id))
}

#[get("/api/members")]
async fn api_members(state: AppState) -> HttpResponse {
    respond(state.roster.members())
}

#[post("/api/members")]
async fn api_create_member(state: AppState, body: Json<CreateMemberBody>) -> HttpResponse {
    respond(state.roster.create_member(
        &body.first_name,
        &body.last_name,
        &body.group_id,
        body.is_guest,
    ))
}

#[get("/api/bouts/{id}")]
async fn api_get_bout(state: AppState, path: Path<BoutPath>) -> HttpResponse {
    respond(state.bouts.bout(path.id))
}

#[post("/api/bouts/{id}/start")]
async fn api_start_bout(state: AppState, path: Path<BoutPath>) -> HttpResponse {
    respond(state.bouts.start(path.id))
}

#[post("/api/bouts/{id}/score")]
async fn api_add_score(state: AppState, path: Path<BoutPath>, body: Json<ScoreBody>) -> HttpResponse {
    respond(
        state
            .bouts
            .add_score(path.id, body.player, body.score_type, body.elapsed),
    )
}

#[post("/api/bouts/{id}/hansoku")]
async fn api_add_hansoku(state: AppState, path: Path<BoutPath>, body: Json<HansokuBody>) -> HttpResponse {
    respond(state.bouts.add_hansoku(path.id, body.player, body.elapsed))
}

#[post("/api/bouts/{id}/undo-score")]
async fn api_undo_score(state: AppState, path: Path<BoutPath>, body: Json<PlayerBody>) -> HttpResponse {
    respond(state.bouts.undo_score(path.id, body.player))
}

#[post("/api/bouts/{id}/undo-hansoku")]
async fn api_undo_hansoku(state: AppState, path: Path<BoutPath>, body: Json<PlayerBody>) -> HttpResponse {
    respond(state.bouts.undo_hansoku(path.id, body.player))
}

#[post("/api/bouts/{id}/timer/toggle")]
async fn api_toggle_timer(state: AppState, path: Path<BoutPath>) -> HttpResponse {
    respond(state.bouts.toggle_timer(path.id))
}

#[post("/api/bouts/{id}/timer/add")]
async fn api_add_timer_time(state: AppState, path: Path<BoutPath>, body: Json<TimerAddBody>) -> HttpResponse {
    respond(state.bouts.add_timer_time(path.id, body.seconds))
}

#[post("/api/bouts/{id}/winner")]
async fn api_declare_winner(state: AppState, path: Path<BoutPath>, body: Json<PlayerBody>) -> HttpResponse {
    respond(state.bouts.declare_winner(path.id, body.player))
}

#[post("/api/bouts/{id}/tie")]
async fn api_declare_tie(state: AppState, path: Path<BoutPath>) -> HttpResponse {
    respond(state.bouts.declare_tie(path.id))
}

#[post("/api/bouts/{id}/forfeit")]
async fn api_declare_forfeit(state: AppState, path: Path<BoutPath>, body: Json<ForfeitBody>) -> HttpResponse {
    respond(state.bouts.declare_forfeit(path.id, body.forfeiting_player))
}

#[post("/api/bouts/{id}/hantei/rounds")]
async fn api_add_hantei_round(
    state: AppState,
    path: Path<BoutPath>,
    body: Json<HanteiRoundBody>,
) -> HttpResponse {
    respond(state.bouts.add_hantei_round(
        path.id,
        body.round,
        &body.combo,
        body.aka_flags,
        body.shiro_flags,
    ))
}

#[post("/api/bouts/{id}/hantei/undo")]
async fn api_undo_hantei_round(state: AppState, path: Path<BoutPath>) -> HttpResponse {
    respond(state.bouts.undo_hantei_round(path.id))
}

#[post("/api/bouts/{id}/hantei/winner")]
async fn api_declare_hantei_winner(
    state: AppState,
    path: Path<BoutPath>,
    body: Json<PlayerBody>,
) -> HttpResponse {
    respond(state.bouts.declare_hantei_winner(path.id, body.player))
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

fn save_snapshot(store: &MemoryStore, config: &ServerConfig) {
    if let Some(path) = &config.snapshot_path {
        if let Err(e) = store.save_snapshot(path) {
            log::warn!("Could not write snapshot to {}: {}", path.display(), e);
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let store = match &config.snapshot_path {
        Some(path) if path.exists() => {
            let loaded = MemoryStore::load_snapshot(path)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
            log::info!("Restored state from {}", path.display());
            Arc::new(loaded)
        }
        _ => Arc::new(MemoryStore::new()),
    };
    let shared: Arc<dyn TournamentStore> = store.clone();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let services = Data::new(Services {
        bouts: BoutEngine::new(shared.clone(), clock.clone()),
        tournaments: TournamentOrchestrator::new(
            shared.clone(),
            clock,
            config.tournament_defaults.clone(),
        ),
        roster: RosterService::new(shared.clone()),
        courts: CourtService::new(shared),
    });
    if let Err(e) = services.roster.ensure_sensei_group() {
        log::warn!("Could not create the Sensei division: {}", e);
    }

    // Background task: rewrite the snapshot file periodically
    if config.snapshot_path.is_some() {
        let store_snapshot = store.clone();
        let config_snapshot = config.clone();
        actix_web::rt::spawn(async move {
            let mut interval = actix_web::rt::time::interval(config_snapshot.snapshot_interval);
            loop {
                interval.tick().await;
                save_snapshot(&store_snapshot, &config_snapshot);
            }
        });
    }

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(services.clone())
            .service(api_health)
            .service(favicon)
            .service(api_list_tournaments)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_update_tournament)
            .service(api_remove_tournament)
            .service(api_start_tournament)
            .service(api_complete_tournament)
            .service(api_generate_matches)
            .service(api_refresh_participants)
            .service(api_reset_tournament)
            .service(api_tournament_bouts)
            .service(api_active_bouts)
            .service(api_court_bouts)
            .service(api_court_state)
            .service(api_upsert_court_state)
            .service(api_set_current_bout)
            .service(api_set_group_court)
            .service(api_set_group_match_type)
            .service(api_set_group_timer)
            .service(api_group_standings)
            .service(api_recheck_sudden_death)
            .service(api_participants)
            .service(api_add_participant)
            .service(api_add_members)
            .service(api_remove_participant)
            .service(api_groups)
            .service(api_create_group)
            .service(api_remove_group)
            .service(api_members)
            .service(api_create_member)
            .service(api_get_bout)
            .service(api_start_bout)
            .service(api_add_score)
            .service(api_add_hansoku)
            .service(api_undo_score)
            .service(api_undo_hansoku)
            .service(api_toggle_timer)
            .service(api_add_timer_time)
            .service(api_declare_winner)
            .service(api_declare_tie)
            .service(api_declare_forfeit)
            .service(api_add_hantei_round)
            .service(api_undo_hantei_round)
            .service(api_declare_hantei_winner)
    })
    .bind(bind)?
    .run()
    .await?;

    save_snapshot(&store, &config);
    Ok(())
}
