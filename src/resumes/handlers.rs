use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{error, instrument};
use uuid::Uuid;

use crate::{
    auth::{
        guards::{require_roles, AuthUser},
        store::Role,
    },
    state::AppState,
};

use super::dto::{CreateResumeRequest, ListQuery, UpdateResumeRequest, UpdateStatusRequest};
use super::repo::{self, Resume, ResumeDetails, ResumeLog, ResumeLogView};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/resumes", get(list_resumes).post(create_resume))
        .route(
            "/resumes/:id",
            get(get_resume).put(update_resume).delete(delete_resume),
        )
        .route("/resumes/:id/status", patch(update_status))
        .route("/resumes/:id/logs", get(get_logs))
}

#[instrument(skip(state, user, payload))]
async fn create_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateResumeRequest>,
) -> Result<(StatusCode, Json<Resume>), (StatusCode, String)> {
    if payload.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "title is required".into()));
    }
    if payload.content.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "content is required".into()));
    }

    let resume = repo::create(&state.db, user.id, &payload.title, &payload.content)
        .await
        .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(resume)))
}

#[instrument(skip(state, user))]
async fn list_resumes(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<ResumeDetails>>, (StatusCode, String)> {
    // Recruiters see every resume, applicants only their own.
    let scope = (user.role != Role::Recruiter).then_some(user.id);
    let rows = repo::list(&state.db, scope, q.sort).await.map_err(internal)?;
    Ok(Json(rows))
}

#[instrument(skip(state, user))]
async fn get_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeDetails>, (StatusCode, String)> {
    let scope = (user.role != Role::Recruiter).then_some(user.id);
    let resume = repo::find_details(&state.db, id, scope)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Resume not found".to_string()))?;
    Ok(Json(resume))
}

#[instrument(skip(state, user, payload))]
async fn update_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateResumeRequest>,
) -> Result<Json<Resume>, (StatusCode, String)> {
    if payload.title.is_none() && payload.content.is_none() {
        return Err((StatusCode::BAD_REQUEST, "nothing to update".into()));
    }

    let resume = repo::update(
        &state.db,
        id,
        user.id,
        payload.title.as_deref(),
        payload.content.as_deref(),
    )
    .await
    .map_err(internal)?
    .ok_or((StatusCode::NOT_FOUND, "Resume not found".to_string()))?;
    Ok(Json(resume))
}

#[instrument(skip(state, user))]
async fn delete_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let deleted = repo::delete(&state.db, id, user.id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Resume not found".to_string()))?;
    Ok(Json(json!({ "id": deleted })))
}

#[instrument(skip(state, user, payload))]
async fn update_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<ResumeLog>, (StatusCode, String)> {
    require_roles(&user, &[Role::Recruiter]).map_err(|e| (e.status(), e.to_string()))?;
    if payload.reason.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "reason is required".into()));
    }

    let log = repo::update_status_with_log(&state.db, id, user.id, payload.status, &payload.reason)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Resume not found".to_string()))?;
    Ok(Json(log))
}

#[instrument(skip(state, user))]
async fn get_logs(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ResumeLogView>>, (StatusCode, String)> {
    require_roles(&user, &[Role::Recruiter]).map_err(|e| (e.status(), e.to_string()))?;
    let logs = repo::list_logs(&state.db, id).await.map_err(internal)?;
    Ok(Json(logs))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "resumes query failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".into())
}
