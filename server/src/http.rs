//! HTTP surface mapping game actions onto registry operations
//!
//! Each handler resolves the caller from the session cookie, takes the
//! registry lock once, runs a single operation and renders the result.
//! Errors become `{"error": ...}` bodies with the status code from
//! [`GameError::status_code`].

use crate::error::GameError;
use crate::registry::{GameRegistry, SharedRegistry};
use crate::session::{clear_session_cookie, session_cookie, Session, SessionKeys};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info, warn};
use shared::{
    AddScoreRequest, ErrorResponse, GameView, KillRecord, LeaderboardEntry, LoginRequest,
    PlayerRequest, SuccessResponse,
};

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub registry: SharedRegistry,
    pub sessions: SessionKeys,
}

impl AppState {
    pub fn new(registry: GameRegistry, sessions: SessionKeys) -> Self {
        Self {
            registry: registry.into_shared(),
            sessions,
        }
    }

    fn require_session(&self, headers: &HeaderMap) -> Result<Session, GameError> {
        self.sessions
            .session_from_headers(headers)
            .ok_or(GameError::Unauthenticated)
    }

    fn require_admin(&self, headers: &HeaderMap) -> Result<Session, GameError> {
        let session = self.require_session(headers)?;
        if !session.is_admin {
            warn!("{} attempted an admin action", session.username);
            return Err(GameError::Unauthorized);
        }
        Ok(session)
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        if self.is_game_rejection() {
            warn!("Rejected game action: {}", self);
        }
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Unwraps a JSON body, reporting malformed input as a validation error
///
/// Without this axum would answer 415/422 with a plain-text body.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, GameError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(GameError::Validation(format!(
            "Invalid request body: {}",
            rejection.body_text()
        ))),
    }
}

/// Builds the router with every game and admin endpoint
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/login", post(login))
        .route("/session", get(check_session))
        .route("/target", get(target))
        .route("/kill", post(kill))
        .route("/pass", post(pass))
        .route("/leaderboard", get(leaderboard))
        .route("/kill-log", get(kill_log))
        .route("/logout", post(logout))
        .route("/admin/reset", post(admin_reset))
        .route("/admin/remove-player", post(admin_remove_player))
        .route("/admin/add-score", post(admin_add_score))
        .route("/admin/reset-passes", post(admin_reset_passes))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, GameError> {
    // A body that is absent or unreadable means no username was given.
    let request = json_body(payload)
        .map_err(|_| GameError::Validation("Username is required".to_string()))?;
    let username = request.username.trim();
    if username.is_empty() {
        return Err(GameError::Validation("Username is required".to_string()));
    }

    let (view, session) = {
        let mut registry = state.registry.lock().await;
        if registry.is_admin(username) {
            info!("Admin {} logged in", username);
            (GameView::admin(username), Session::new(username, true))
        } else {
            let snapshot = registry.register_or_reactivate(username)?;
            (
                GameView::from_snapshot(&snapshot),
                Session::new(&snapshot.username, false),
            )
        }
    };

    let token = match state.sessions.issue(&session) {
        Ok(token) => token,
        Err(e) => {
            error!("Failed to issue session for {}: {}", session.username, e);
            return Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response());
        }
    };

    let cookie = session_cookie(&token, state.sessions.max_age_secs());
    Ok(([(SET_COOKIE, cookie)], Json(view)).into_response())
}

async fn check_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<GameView>, GameError> {
    let session = state.require_session(&headers)?;
    if session.is_admin {
        return Ok(Json(GameView::admin(&session.username)));
    }

    // A signed cookie for a player who was removed or logged out is stale.
    let snapshot = state
        .registry
        .lock()
        .await
        .snapshot(&session.username)
        .map_err(|_| GameError::Unauthenticated)?;
    Ok(Json(GameView::from_snapshot(&snapshot)))
}

async fn target(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<GameView>, GameError> {
    let session = state.require_session(&headers)?;
    let snapshot = state.registry.lock().await.snapshot(&session.username)?;
    Ok(Json(GameView::from_snapshot(&snapshot)))
}

async fn kill(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<GameView>, GameError> {
    let session = state.require_session(&headers)?;
    let snapshot = state.registry.lock().await.record_kill(&session.username)?;
    Ok(Json(GameView::from_snapshot(&snapshot)))
}

async fn pass(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<GameView>, GameError> {
    let session = state.require_session(&headers)?;
    let snapshot = state.registry.lock().await.pass_target(&session.username)?;
    Ok(Json(GameView::from_snapshot(&snapshot)))
}

async fn leaderboard(State(state): State<AppState>) -> Json<Vec<LeaderboardEntry>> {
    Json(state.registry.lock().await.leaderboard())
}

async fn kill_log(State(state): State<AppState>) -> Json<Vec<KillRecord>> {
    Json(state.registry.lock().await.kill_log())
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(session) = state.sessions.session_from_headers(&headers) {
        if !session.is_admin {
            state.registry.lock().await.deactivate(&session.username);
        }
    }

    (
        [(SET_COOKIE, clear_session_cookie())],
        Json(SuccessResponse::ok()),
    )
        .into_response()
}

async fn admin_reset(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>, GameError> {
    state.require_admin(&headers)?;
    state.registry.lock().await.reset_all();
    Ok(Json(SuccessResponse::ok()))
}

async fn admin_remove_player(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<PlayerRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, GameError> {
    state.require_admin(&headers)?;
    let request = json_body(payload)?;
    state
        .registry
        .lock()
        .await
        .remove_player(request.username.trim())?;
    Ok(Json(SuccessResponse::ok()))
}

async fn admin_add_score(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AddScoreRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, GameError> {
    state.require_admin(&headers)?;
    let request = json_body(payload)?;
    state
        .registry
        .lock()
        .await
        .adjust_score(request.username.trim(), request.points)?;
    Ok(Json(SuccessResponse::ok()))
}

async fn admin_reset_passes(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<PlayerRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, GameError> {
    state.require_admin(&headers)?;
    let request = json_body(payload)?;
    state
        .registry
        .lock()
        .await
        .reset_passes(request.username.trim())?;
    Ok(Json(SuccessResponse::ok()))
}
