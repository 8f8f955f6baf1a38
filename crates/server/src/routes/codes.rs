//! Email verification codes: one outstanding 6-digit code per address,
//! valid for 10 minutes, consumed on first successful check.

use axum::{extract::State, Json};
use chrono::Utc;
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    db::CodeCheck,
    error::AppError,
    state::AppState,
};

/// Uniform 6-digit numeric code, 100000..=999999.
pub fn generate_numeric_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

/// POST /send-code
///
/// Stores the code before dispatching the email. A delivery failure does
/// not roll the code back; the client retries issuance, which replaces it.
pub async fn send_code(
    State(state): State<AppState>,
    Json(req): Json<SendCodeRequest>,
) -> Result<Json<Value>, AppError> {
    if req.email.trim().is_empty() {
        return Err(AppError::Validation("Email required".to_string()));
    }

    let code = generate_numeric_code();
    let now_ms = Utc::now().timestamp_millis();
    state.db.store_code(&req.email, &code, now_ms).await?;

    state.mailer.send_verification_code(&req.email, &code).await?;

    tracing::info!("Verification code issued for {}", req.email);
    Ok(Json(json!({ "success": true, "message": "Verification code sent" })))
}

/// POST /verify-code
pub async fn verify_code(
    State(state): State<AppState>,
    Json(req): Json<VerifyCodeRequest>,
) -> Result<Json<Value>, AppError> {
    if req.email.trim().is_empty() || req.code.trim().is_empty() {
        return Err(AppError::Validation("Email and code required".to_string()));
    }

    let now_ms = Utc::now().timestamp_millis();
    match state.db.check_code(&req.email, &req.code, now_ms).await? {
        CodeCheck::Verified => Ok(Json(
            json!({ "success": true, "message": "Code verified successfully" }),
        )),
        CodeCheck::Expired => Err(AppError::Validation("Code expired".to_string())),
        CodeCheck::Mismatch => Err(AppError::Validation("Invalid code".to_string())),
        CodeCheck::NotFound => Err(AppError::Validation(
            "No code found for this email".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..1000 {
            let code = generate_numeric_code();
            assert_eq!(code.len(), 6);
            let n: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&n));
        }
    }
}
