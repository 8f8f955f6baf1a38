use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub activation_code: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub fitness_goal: Option<String>,
    pub activity_level: Option<String>,
    pub created_at: Option<String>,
}

/// Fields the profile endpoint may overwrite.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub fitness_goal: Option<String>,
    pub activity_level: Option<String>,
}

/// An event row joined with its aggregated participant and like counts.
/// Counts are always derived at read time, never stored.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub event_date: String,
    pub location: String,
    pub event_type: String,
    pub image_url: Option<String>,
    pub trainer_id: String,
    pub trainer_name: String,
    pub max_participants: Option<i64>,
    pub registration_fee: f64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub participant_count: i64,
    pub likes_count: i64,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub event_date: String,
    pub location: String,
    pub event_type: String,
    pub image_url: Option<String>,
    pub trainer_id: String,
    pub trainer_name: String,
    pub max_participants: Option<i64>,
    pub registration_fee: f64,
}

/// Mutable event fields for updates. Ownership is checked separately.
#[derive(Debug, Clone)]
pub struct EventChanges {
    pub title: String,
    pub description: String,
    pub event_date: String,
    pub location: String,
    pub event_type: String,
    pub image_url: Option<String>,
    pub max_participants: Option<i64>,
    pub registration_fee: f64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrainingProgram {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub goal_type: String,
    pub difficulty_level: String,
    pub duration_weeks: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Workout {
    pub id: i64,
    pub program_id: i64,
    pub week_number: i64,
    pub day_number: i64,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MealPlan {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub goal_type: String,
    pub daily_calories: Option<i64>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProgressEntry {
    pub user_id: String,
    pub date: String,
    pub weight: Option<f64>,
    pub body_fat_percentage: Option<f64>,
    pub muscle_mass: Option<f64>,
    pub notes: Option<String>,
}
