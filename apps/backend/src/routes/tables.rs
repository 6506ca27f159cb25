//! Table HTTP routes: management, actions, advancement and sync.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::actions::ActionKind;
use crate::domain::hand_phase::HandPhase;
use crate::domain::player_status::PlayerStatus;
use crate::error::AppError;
use crate::repos::seats::Seat;
use crate::services::hand_flow::{HandFlowService, SubmitAction};
use crate::services::sync::{SyncService, TableView};
use crate::services::tables::{CreateTable, SeatPlayer, TableService};
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct TableCreated {
    table: TableView,
    version: i32,
}

#[derive(Debug, Serialize)]
struct SeatResponse {
    seat_index: u8,
    player_id: i64,
    stack: i64,
    status: PlayerStatus,
}

impl From<&Seat> for SeatResponse {
    fn from(seat: &Seat) -> Self {
        Self {
            seat_index: seat.seat_index,
            player_id: seat.player_id,
            stack: seat.stack,
            status: seat.status,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ActionRequest {
    player_id: i64,
    action: ActionKind,
    amount: Option<i64>,
    expected_version: Option<i32>,
}

#[derive(Debug, Serialize)]
struct ActionResponse {
    seq: i32,
    kind: ActionKind,
    amount: i64,
    phase: HandPhase,
    next_actor: Option<u8>,
    phase_changed: bool,
    hand_complete: bool,
    table_version: i32,
}

#[derive(Debug, Deserialize)]
struct SyncQuery {
    player_id: Option<i64>,
    version: Option<i32>,
    last_event_id: Option<i64>,
}

/// POST /api/tables
async fn create_table(
    app_state: web::Data<AppState>,
    body: web::Json<CreateTable>,
) -> Result<HttpResponse, AppError> {
    let table = TableService
        .create_table(&app_state, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(TableCreated {
        table: TableView::from(&table),
        version: table.version,
    }))
}

/// POST /api/tables/{table_id}/seats
async fn seat_player(
    app_state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<SeatPlayer>,
) -> Result<HttpResponse, AppError> {
    let seat = TableService
        .seat_player(&app_state, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(SeatResponse::from(&seat)))
}

/// POST /api/tables/{table_id}/players/{player_id}/sit_out
async fn sit_out(
    app_state: web::Data<AppState>,
    path: web::Path<(i64, i64)>,
) -> Result<web::Json<SeatResponse>, AppError> {
    let (table_id, player_id) = path.into_inner();
    let seat = TableService.sit_out(&app_state, table_id, player_id).await?;
    Ok(web::Json(SeatResponse::from(&seat)))
}

/// POST /api/tables/{table_id}/players/{player_id}/sit_in
async fn sit_in(
    app_state: web::Data<AppState>,
    path: web::Path<(i64, i64)>,
) -> Result<web::Json<SeatResponse>, AppError> {
    let (table_id, player_id) = path.into_inner();
    let seat = TableService.sit_in(&app_state, table_id, player_id).await?;
    Ok(web::Json(SeatResponse::from(&seat)))
}

/// POST /api/tables/{table_id}/actions
async fn submit_action(
    app_state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<ActionRequest>,
) -> Result<web::Json<ActionResponse>, AppError> {
    let body = body.into_inner();
    let outcome = HandFlowService
        .submit_action(
            &app_state,
            SubmitAction {
                table_id: path.into_inner(),
                player_id: body.player_id,
                action: body.action,
                amount: body.amount,
                expected_version: body.expected_version,
            },
        )
        .await?;
    Ok(web::Json(ActionResponse {
        seq: outcome.action.seq,
        kind: outcome.action.kind,
        amount: outcome.action.amount,
        phase: outcome.hand.phase,
        next_actor: outcome.next_actor,
        phase_changed: outcome.phase_changed,
        hand_complete: outcome.hand_complete,
        table_version: outcome.table_version,
    }))
}

/// POST /api/tables/{table_id}/advance
async fn advance(
    app_state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let report = HandFlowService
        .advance(&app_state, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(report))
}

/// GET /api/tables/{table_id}/sync?player_id=&version=&last_event_id=
async fn sync(
    app_state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<SyncQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let response = SyncService
        .poll(
            &app_state,
            path.into_inner(),
            query.player_id,
            query.version,
            query.last_event_id,
        )
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::post().to(create_table))
        .route("/{table_id}/seats", web::post().to(seat_player))
        .route(
            "/{table_id}/players/{player_id}/sit_out",
            web::post().to(sit_out),
        )
        .route(
            "/{table_id}/players/{player_id}/sit_in",
            web::post().to(sit_in),
        )
        .route("/{table_id}/actions", web::post().to(submit_action))
        .route("/{table_id}/advance", web::post().to(advance))
        .route("/{table_id}/sync", web::get().to(sync));
}
