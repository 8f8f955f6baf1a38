//! Fitness events: trainer-owned rows with soft delete, capacity-checked
//! registration, and presence-based likes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    db::{EventChanges, EventWrite, NewEvent, Registration},
    error::AppError,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub event_date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub event_type: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub trainer_id: String,
    #[serde(default)]
    pub trainer_name: String,
    pub max_participants: Option<i64>,
    pub registration_fee: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UserIdPayload {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct TrainerIdPayload {
    #[serde(default)]
    pub trainer_id: String,
}

/// Accepts RFC 3339 or a bare `YYYY-MM-DDTHH:MM:SS` / `YYYY-MM-DD HH:MM:SS`
/// timestamp (treated as UTC).
fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// Event dates are stored in one fixed UTC form (`2031-06-01T07:00:00Z`)
/// so the listing's TEXT comparison orders chronologically. Every write
/// and the listing bound must go through this.
fn canonical_utc(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Events must be scheduled strictly in the future. Returns the
/// canonical form to store.
fn validate_event_date(raw: &str, now: DateTime<Utc>) -> Result<String, AppError> {
    let event_date = parse_event_date(raw)
        .ok_or_else(|| AppError::Validation("Invalid event date".to_string()))?;
    if event_date <= now {
        return Err(AppError::Validation(
            "Event date must be in the future".to_string(),
        ));
    }
    Ok(canonical_utc(event_date))
}

fn require_fields(payload: &EventPayload) -> Result<(), AppError> {
    let required = [
        &payload.title,
        &payload.description,
        &payload.event_date,
        &payload.location,
        &payload.event_type,
        &payload.trainer_id,
        &payload.trainer_name,
    ];
    if required.iter().any(|f| f.trim().is_empty()) {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }
    Ok(())
}

/// GET /api/events?type=&limit=&offset=
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let now = canonical_utc(Utc::now());
    let events = state
        .db
        .list_events(
            query.event_type.as_deref(),
            &now,
            query.limit.unwrap_or(20),
            query.offset.unwrap_or(0),
        )
        .await?;
    Ok(Json(json!({ "success": true, "events": events })))
}

/// GET /api/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let event = state
        .db
        .get_event(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
    Ok(Json(json!({ "success": true, "event": event })))
}

/// POST /api/events
pub async fn create_event(
    State(state): State<AppState>,
    Json(payload): Json<EventPayload>,
) -> Result<Json<Value>, AppError> {
    require_fields(&payload)?;
    let event_date = validate_event_date(&payload.event_date, Utc::now())?;

    let event_id = state
        .db
        .create_event(&NewEvent {
            title: payload.title,
            description: payload.description,
            event_date,
            location: payload.location,
            event_type: payload.event_type,
            image_url: payload.image_url,
            trainer_id: payload.trainer_id,
            trainer_name: payload.trainer_name,
            max_participants: payload.max_participants,
            registration_fee: payload.registration_fee.unwrap_or(0.0),
        })
        .await?;

    tracing::info!("Event {} created", event_id);
    Ok(Json(json!({ "success": true, "eventId": event_id })))
}

/// PUT /api/events/:id. Only the creating trainer may update.
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<EventPayload>,
) -> Result<Json<Value>, AppError> {
    if payload.trainer_id.trim().is_empty() {
        return Err(AppError::Validation("Trainer ID required".to_string()));
    }
    let event_date = parse_event_date(&payload.event_date)
        .map(canonical_utc)
        .ok_or_else(|| AppError::Validation("Invalid event date".to_string()))?;

    let changes = EventChanges {
        title: payload.title,
        description: payload.description,
        event_date,
        location: payload.location,
        event_type: payload.event_type,
        image_url: payload.image_url,
        max_participants: payload.max_participants,
        registration_fee: payload.registration_fee.unwrap_or(0.0),
    };

    match state.db.update_event(id, &payload.trainer_id, &changes).await? {
        EventWrite::Done => Ok(Json(json!({ "success": true }))),
        EventWrite::NotFound => Err(AppError::NotFound("Event not found".to_string())),
        EventWrite::Forbidden => Err(AppError::Forbidden(
            "Not authorized to update this event".to_string(),
        )),
    }
}

/// DELETE /api/events/:id. Soft delete, owner only.
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<TrainerIdPayload>,
) -> Result<Json<Value>, AppError> {
    if payload.trainer_id.trim().is_empty() {
        return Err(AppError::Validation("Trainer ID required".to_string()));
    }

    match state.db.soft_delete_event(id, &payload.trainer_id).await? {
        EventWrite::Done => Ok(Json(json!({ "success": true }))),
        EventWrite::NotFound => Err(AppError::NotFound("Event not found".to_string())),
        EventWrite::Forbidden => Err(AppError::Forbidden(
            "Not authorized to delete this event".to_string(),
        )),
    }
}

/// POST /api/events/:id/register
pub async fn register_for_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserIdPayload>,
) -> Result<Json<Value>, AppError> {
    if payload.user_id.trim().is_empty() {
        return Err(AppError::Validation("User ID required".to_string()));
    }

    match state.db.register_participant(id, &payload.user_id).await? {
        Registration::Registered => Ok(Json(json!({ "success": true }))),
        Registration::Full => Err(AppError::Validation("Event is full".to_string())),
        Registration::NotFound => Err(AppError::NotFound("Event not found".to_string())),
    }
}

/// POST /api/events/:id/like
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserIdPayload>,
) -> Result<Json<Value>, AppError> {
    if payload.user_id.trim().is_empty() {
        return Err(AppError::Validation("User ID required".to_string()));
    }

    let liked = state.db.toggle_like(id, &payload.user_id).await?;
    Ok(Json(json!({ "success": true, "liked": liked })))
}

/// GET /api/events/professional/:trainer_id
pub async fn professional_events(
    State(state): State<AppState>,
    Path(trainer_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let events = state
        .db
        .events_by_trainer(
            &trainer_id,
            query.limit.unwrap_or(20),
            query.offset.unwrap_or(0),
        )
        .await?;
    Ok(Json(json!({ "success": true, "events": events })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn future_date_accepted() {
        assert!(validate_event_date("2026-06-01T12:00:01Z", now()).is_ok());
        assert!(validate_event_date("2026-06-02 09:00:00", now()).is_ok());
    }

    #[test]
    fn accepted_dates_are_stored_in_one_canonical_form() {
        // Space-separated and bare formats are read as UTC.
        assert_eq!(
            validate_event_date("2031-06-01 07:00:00", now()).unwrap(),
            "2031-06-01T07:00:00Z"
        );
        assert_eq!(
            validate_event_date("2031-06-01T07:00:00", now()).unwrap(),
            "2031-06-01T07:00:00Z"
        );
        // Non-UTC offsets are converted, not stored verbatim.
        assert_eq!(
            validate_event_date("2031-08-29T13:00:00-05:00", now()).unwrap(),
            "2031-08-29T18:00:00Z"
        );
    }

    #[tokio::test]
    async fn space_format_event_date_survives_listing() {
        let db = Database::connect("sqlite::memory:", 1).await.unwrap();
        db.run_migrations().await.unwrap();

        let event_date = validate_event_date("2031-06-01 07:00:00", now()).unwrap();
        db.create_event(&NewEvent {
            title: "Sunrise Bootcamp".to_string(),
            description: "Outdoor HIIT session".to_string(),
            event_date,
            location: "Riverside Park".to_string(),
            event_type: "bootcamp".to_string(),
            image_url: None,
            trainer_id: "t1".to_string(),
            trainer_name: "Alex Carter".to_string(),
            max_participants: None,
            registration_fee: 0.0,
        })
        .await
        .unwrap();

        // An hour before the event: it must show up in the listing.
        let bound = canonical_utc(Utc.with_ymd_and_hms(2031, 6, 1, 6, 0, 0).unwrap());
        let events = db.list_events(None, &bound, 20, 0).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_date, "2031-06-01T07:00:00Z");

        // An hour after: it must not.
        let bound = canonical_utc(Utc.with_ymd_and_hms(2031, 6, 1, 8, 0, 0).unwrap());
        let events = db.list_events(None, &bound, 20, 0).await.unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn past_and_present_dates_rejected() {
        assert!(validate_event_date("2026-06-01T12:00:00Z", now()).is_err());
        assert!(validate_event_date("2026-05-31T12:00:00Z", now()).is_err());
    }

    #[test]
    fn garbage_date_rejected() {
        assert!(validate_event_date("next tuesday", now()).is_err());
        assert!(validate_event_date("", now()).is_err());
    }

    #[test]
    fn missing_fields_rejected() {
        let payload = EventPayload {
            title: "Bootcamp".to_string(),
            description: "".to_string(),
            event_date: "2031-01-01T00:00:00Z".to_string(),
            location: "Park".to_string(),
            event_type: "bootcamp".to_string(),
            image_url: None,
            trainer_id: "t1".to_string(),
            trainer_name: "Alex".to_string(),
            max_participants: None,
            registration_fee: None,
        };
        assert!(require_fields(&payload).is_err());
    }
}
