//! Workout logs and body-progress tracking for the authenticated user.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    db::ProgressEntry,
    error::AppError,
    routes::auth::extract_user_id,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct WorkoutLogPayload {
    pub workout_id: Option<i64>,
    pub duration_minutes: Option<i64>,
    pub notes: Option<String>,
    pub rating: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressPayload {
    #[serde(default)]
    pub date: String,
    pub weight: Option<f64>,
    pub body_fat_percentage: Option<f64>,
    pub muscle_mass: Option<f64>,
    pub notes: Option<String>,
}

/// POST /api/workout-logs
pub async fn log_workout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<WorkoutLogPayload>,
) -> Result<Json<Value>, AppError> {
    let user_id = extract_user_id(&state, &headers)?;
    let workout_id = payload
        .workout_id
        .ok_or_else(|| AppError::Validation("Workout ID required".to_string()))?;

    state
        .db
        .insert_workout_log(
            &user_id,
            workout_id,
            payload.duration_minutes,
            payload.notes.as_deref(),
            payload.rating,
        )
        .await?;

    Ok(Json(json!({ "success": true, "message": "Workout logged successfully" })))
}

/// GET /api/progress?start_date=&end_date=
pub async fn get_progress(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ProgressQuery>,
) -> Result<Json<Value>, AppError> {
    let user_id = extract_user_id(&state, &headers)?;

    let range = match (query.start_date.as_deref(), query.end_date.as_deref()) {
        (Some(start), Some(end)) => Some((start, end)),
        _ => None,
    };
    let progress = state.db.progress_for_user(&user_id, range).await?;

    Ok(Json(json!({ "success": true, "progress": progress })))
}

/// POST /api/progress. One entry per date, later posts overwrite.
pub async fn add_progress(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ProgressPayload>,
) -> Result<Json<Value>, AppError> {
    let user_id = extract_user_id(&state, &headers)?;
    if payload.date.trim().is_empty() {
        return Err(AppError::Validation("Date required".to_string()));
    }

    state
        .db
        .upsert_progress(&ProgressEntry {
            user_id,
            date: payload.date,
            weight: payload.weight,
            body_fat_percentage: payload.body_fat_percentage,
            muscle_mass: payload.muscle_mass,
            notes: payload.notes,
        })
        .await?;

    Ok(Json(json!({ "success": true, "message": "Progress updated successfully" })))
}
