use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    db::ProfileUpdate,
    error::AppError,
    routes::auth::extract_user_id,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ProfilePayload {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub fitness_goal: Option<String>,
    pub activity_level: Option<String>,
}

/// GET /api/profile
pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let user_id = extract_user_id(&state, &headers)?;
    let user = state
        .db
        .get_user_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(json!({ "success": true, "user": user })))
}

/// PUT /api/profile
pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ProfilePayload>,
) -> Result<Json<Value>, AppError> {
    let user_id = extract_user_id(&state, &headers)?;
    if payload.first_name.trim().is_empty() || payload.last_name.trim().is_empty() {
        return Err(AppError::Validation("First and last name required".to_string()));
    }

    state
        .db
        .update_profile(
            &user_id,
            &ProfileUpdate {
                first_name: payload.first_name,
                last_name: payload.last_name,
                date_of_birth: payload.date_of_birth,
                gender: payload.gender,
                height: payload.height,
                weight: payload.weight,
                fitness_goal: payload.fitness_goal,
                activity_level: payload.activity_level,
            },
        )
        .await?;

    Ok(Json(json!({ "success": true, "message": "Profile updated successfully" })))
}
