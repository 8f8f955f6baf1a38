use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::header, Json};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    db::User,
    error::AppError,
    routes::codes::generate_numeric_code,
    state::AppState,
};

const VALID_ROLES: &[&str] = &["client", "professional", "admin"];

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ActivationRequest {
    pub email: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub role: String,
    pub exp: usize,
}

/// POST /register
///
/// Creates an inactive account and emails a 6-digit activation code.
/// Activation codes have no expiry; they live until consumed or replaced.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<Value>, AppError> {
    if !req.email.contains('@') || req.email.trim().is_empty() {
        return Err(AppError::Validation("Valid email required".to_string()));
    }
    if req.password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
        return Err(AppError::Validation("First and last name required".to_string()));
    }
    if !VALID_ROLES.contains(&req.user_type.as_str()) {
        return Err(AppError::Validation("Invalid user type".to_string()));
    }

    if state.db.get_user_by_email(&req.email).await?.is_some() {
        return Err(AppError::Validation("Email already registered".to_string()));
    }

    // Hash password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(e.to_string()))?
        .to_string();

    let activation_code = generate_numeric_code();
    let user = User {
        id: Uuid::new_v4().to_string(),
        email: req.email.clone(),
        password_hash,
        first_name: req.first_name.clone(),
        last_name: req.last_name,
        role: req.user_type,
        is_active: false,
        activation_code: Some(activation_code.clone()),
        date_of_birth: None,
        gender: None,
        height: None,
        weight: None,
        fitness_goal: None,
        activity_level: None,
        created_at: None,
    };
    state.db.create_user(&user).await?;

    state
        .mailer
        .send_activation_code(&req.email, &req.first_name, &activation_code)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Registration successful. Please check your email for activation code."
    })))
}

/// POST /send-activation-code
///
/// Replaces the stored activation code and re-emails it.
pub async fn send_activation_code(
    State(state): State<AppState>,
    Json(req): Json<ActivationRequest>,
) -> Result<Json<Value>, AppError> {
    if req.email.trim().is_empty() {
        return Err(AppError::Validation("Email required".to_string()));
    }

    let activation_code = generate_numeric_code();
    if !state.db.set_activation_code(&req.email, &activation_code).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let user = state
        .db
        .get_user_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    state
        .mailer
        .send_activation_code(&req.email, &user.first_name, &activation_code)
        .await?;

    Ok(Json(json!({ "success": true })))
}

/// POST /verify-activation-code
pub async fn verify_activation_code(
    State(state): State<AppState>,
    Json(req): Json<ActivationRequest>,
) -> Result<Json<Value>, AppError> {
    if req.email.trim().is_empty() || req.code.trim().is_empty() {
        return Err(AppError::Validation("Email and code required".to_string()));
    }

    let user = state
        .db
        .get_user_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if user.activation_code.as_deref() != Some(req.code.as_str()) {
        return Err(AppError::Validation("Invalid code".to_string()));
    }

    state.db.activate_user(&req.email).await?;
    tracing::info!("Account activated for {}", req.email);
    Ok(Json(json!({ "success": true })))
}

/// POST /login
///
/// Only activated accounts may log in.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation("Email and password required".to_string()));
    }

    let user = state
        .db
        .get_user_by_email(&req.email)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| {
            AppError::Auth("Invalid credentials or account not activated".to_string())
        })?;

    let parsed_hash =
        PasswordHash::new(&user.password_hash).map_err(|e| AppError::Internal(e.to_string()))?;
    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Auth("Invalid credentials".to_string()))?;

    let token = generate_token(&user, &state.config.auth)?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        user,
    }))
}

fn generate_token(user: &User, auth_config: &crate::config::AuthConfig) -> Result<String, AppError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(auth_config.token_expiry_hours as i64))
        .ok_or_else(|| AppError::Internal("Failed to calculate expiration".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        role: user.role.clone(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth_config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    jsonwebtoken::decode::<Claims>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(secret.as_bytes()),
        &jsonwebtoken::Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Auth(e.to_string()))
}

/// Pull the caller's user id out of a `Bearer` Authorization header.
pub fn extract_user_id(
    state: &AppState,
    headers: &axum::http::HeaderMap,
) -> Result<String, AppError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Auth("Access token required".to_string()))?;

    let claims = verify_token(token, &state.config.auth.jwt_secret)?;
    Ok(claims.sub)
}
