//! Read-only training-program and meal-plan catalogs.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{error::AppError, routes::auth::extract_user_id, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ProgramQuery {
    pub goal_type: Option<String>,
    pub difficulty_level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MealPlanQuery {
    pub goal_type: Option<String>,
}

/// GET /api/training-programs?goal_type=&difficulty_level=
pub async fn list_programs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ProgramQuery>,
) -> Result<Json<Value>, AppError> {
    extract_user_id(&state, &headers)?;
    let programs = state
        .db
        .list_programs(query.goal_type.as_deref(), query.difficulty_level.as_deref())
        .await?;
    Ok(Json(json!({ "success": true, "programs": programs })))
}

/// GET /api/training-programs/:id returns the program plus its workouts
/// in week/day order.
pub async fn get_program(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    extract_user_id(&state, &headers)?;
    let program = state
        .db
        .get_program(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Training program not found".to_string()))?;
    let workouts = state.db.workouts_for_program(id).await?;
    Ok(Json(json!({ "success": true, "program": program, "workouts": workouts })))
}

/// GET /api/meal-plans?goal_type=
pub async fn list_meal_plans(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MealPlanQuery>,
) -> Result<Json<Value>, AppError> {
    extract_user_id(&state, &headers)?;
    let meal_plans = state.db.list_meal_plans(query.goal_type.as_deref()).await?;
    Ok(Json(json!({ "success": true, "meal_plans": meal_plans })))
}
