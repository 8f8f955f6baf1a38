use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, QueryBuilder, Sqlite, SqlitePool};
use std::path::Path;

mod models;

pub use models::*;

/// Verification codes are valid for 10 minutes from issuance.
pub const CODE_TTL_MS: i64 = 10 * 60 * 1000;

/// Outcome of checking a submitted verification code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
    /// Code matched and was consumed (row deleted).
    Verified,
    /// Code was older than the TTL; the row was deleted.
    Expired,
    /// Code did not match; the row is kept so the user can retry.
    Mismatch,
    /// No outstanding code for this email.
    NotFound,
}

/// Outcome of an event registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Registered,
    Full,
    NotFound,
}

/// Outcome of an owner-gated event mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventWrite {
    Done,
    NotFound,
    Forbidden,
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(path: &str) -> Result<Self> {
        // Ensure the directory exists
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", path);
        Self::connect(&database_url, 10).await
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS codes (
                email TEXT PRIMARY KEY,
                code TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                role TEXT NOT NULL CHECK (role IN ('client', 'professional', 'admin')),
                is_active INTEGER NOT NULL DEFAULT 0,
                activation_code TEXT,
                date_of_birth TEXT,
                gender TEXT,
                height REAL,
                weight REAL,
                fitness_goal TEXT,
                activity_level TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS fitness_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                event_date TEXT NOT NULL,
                location TEXT NOT NULL,
                event_type TEXT NOT NULL,
                image_url TEXT,
                trainer_id TEXT NOT NULL,
                trainer_name TEXT NOT NULL,
                max_participants INTEGER,
                registration_fee REAL NOT NULL DEFAULT 0,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS event_participants (
                event_id INTEGER NOT NULL REFERENCES fitness_events(id),
                user_id TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'registered' CHECK (status IN ('registered', 'cancelled')),
                registered_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (event_id, user_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS event_likes (
                event_id INTEGER NOT NULL REFERENCES fitness_events(id),
                user_id TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (event_id, user_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS training_programs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                goal_type TEXT NOT NULL,
                difficulty_level TEXT NOT NULL,
                duration_weeks INTEGER NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS workouts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                program_id INTEGER NOT NULL REFERENCES training_programs(id),
                week_number INTEGER NOT NULL,
                day_number INTEGER NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                duration_minutes INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS meal_plans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                goal_type TEXT NOT NULL,
                daily_calories INTEGER,
                is_active INTEGER NOT NULL DEFAULT 1
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS workout_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL REFERENCES users(id),
                workout_id INTEGER NOT NULL,
                duration_minutes INTEGER,
                notes TEXT,
                rating INTEGER,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_progress (
                user_id TEXT NOT NULL REFERENCES users(id),
                date TEXT NOT NULL,
                weight REAL,
                body_fat_percentage REAL,
                muscle_mass REAL,
                notes TEXT,
                PRIMARY KEY (user_id, date)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("Database migrations completed");
        Ok(())
    }

    // Verification code operations

    /// Store a fresh code for the email, replacing any outstanding one.
    /// At most one code per email is ever valid.
    pub async fn store_code(&self, email: &str, code: &str, created_at_ms: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO codes (email, code, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(email) DO UPDATE SET
                code = excluded.code,
                created_at = excluded.created_at
            "#,
        )
        .bind(email)
        .bind(code)
        .bind(created_at_ms)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Check a submitted code against the stored one. Consumes the row on
    /// success; deletes it on expiry; keeps it on mismatch so the user can
    /// retry.
    pub async fn check_code(&self, email: &str, submitted: &str, now_ms: i64) -> Result<CodeCheck> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT code, created_at FROM codes WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        let Some((code, created_at)) = row else {
            return Ok(CodeCheck::NotFound);
        };

        if now_ms - created_at > CODE_TTL_MS {
            self.delete_code(email).await?;
            return Ok(CodeCheck::Expired);
        }

        if code == submitted {
            self.delete_code(email).await?;
            return Ok(CodeCheck::Verified);
        }

        Ok(CodeCheck::Mismatch)
    }

    async fn delete_code(&self, email: &str) -> Result<()> {
        sqlx::query("DELETE FROM codes WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // User operations

    pub async fn create_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name, role, is_active, activation_code)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.role)
        .bind(user.is_active)
        .bind(&user.activation_code)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Overwrite the activation code for an existing user. Returns false
    /// when no user has that email.
    pub async fn set_activation_code(&self, email: &str, code: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET activation_code = ? WHERE email = ?")
            .bind(code)
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark the user active and consume the activation code.
    pub async fn activate_user(&self, email: &str) -> Result<()> {
        sqlx::query("UPDATE users SET is_active = 1, activation_code = NULL WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                first_name = ?, last_name = ?, date_of_birth = ?, gender = ?,
                height = ?, weight = ?, fitness_goal = ?, activity_level = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.date_of_birth)
        .bind(&update.gender)
        .bind(update.height)
        .bind(update.weight)
        .bind(&update.fitness_goal)
        .bind(&update.activity_level)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // Event operations

    pub async fn create_event(&self, event: &NewEvent) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO fitness_events
                (title, description, event_date, location, event_type, image_url,
                 trainer_id, trainer_name, max_participants, registration_fee)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.event_date)
        .bind(&event.location)
        .bind(&event.event_type)
        .bind(&event.image_url)
        .bind(&event.trainer_id)
        .bind(&event.trainer_name)
        .bind(event.max_participants)
        .bind(event.registration_fee)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    const EVENT_SUMMARY_SELECT: &'static str = r#"
        SELECT fe.id, fe.title, fe.description, fe.event_date, fe.location,
               fe.event_type, fe.image_url, fe.trainer_id, fe.trainer_name,
               fe.max_participants, fe.registration_fee, fe.created_at, fe.updated_at,
               COUNT(DISTINCT ep.user_id) AS participant_count,
               COUNT(DISTINCT el.user_id) AS likes_count
        FROM fitness_events fe
        LEFT JOIN event_participants ep ON fe.id = ep.event_id AND ep.status = 'registered'
        LEFT JOIN event_likes el ON fe.id = el.event_id
    "#;

    /// Upcoming active events with aggregated counts, optionally filtered
    /// by type.
    pub async fn list_events(
        &self,
        event_type: Option<&str>,
        now: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EventSummary>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(Self::EVENT_SUMMARY_SELECT);
        qb.push(" WHERE fe.is_active = 1 AND fe.event_date > ");
        qb.push_bind(now);
        if let Some(event_type) = event_type {
            qb.push(" AND fe.event_type = ");
            qb.push_bind(event_type);
        }
        qb.push(" GROUP BY fe.id ORDER BY fe.event_date ASC LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let events = qb.build_query_as::<EventSummary>().fetch_all(&self.pool).await?;
        Ok(events)
    }

    pub async fn get_event(&self, id: i64) -> Result<Option<EventSummary>> {
        let query = format!(
            "{} WHERE fe.id = ? AND fe.is_active = 1 GROUP BY fe.id",
            Self::EVENT_SUMMARY_SELECT
        );
        let event = sqlx::query_as::<_, EventSummary>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    /// A trainer's own active events, newest first.
    pub async fn events_by_trainer(
        &self,
        trainer_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EventSummary>> {
        let query = format!(
            "{} WHERE fe.trainer_id = ? AND fe.is_active = 1 \
             GROUP BY fe.id ORDER BY fe.created_at DESC LIMIT ? OFFSET ?",
            Self::EVENT_SUMMARY_SELECT
        );
        let events = sqlx::query_as::<_, EventSummary>(&query)
            .bind(trainer_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn event_owner(&self, id: i64) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT trainer_id FROM fitness_events WHERE id = ? AND is_active = 1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(trainer_id,)| trainer_id))
    }

    /// Overwrite mutable fields. Only the owning trainer may do this.
    pub async fn update_event(
        &self,
        id: i64,
        trainer_id: &str,
        changes: &EventChanges,
    ) -> Result<EventWrite> {
        match self.event_owner(id).await? {
            None => return Ok(EventWrite::NotFound),
            Some(owner) if owner != trainer_id => return Ok(EventWrite::Forbidden),
            Some(_) => {}
        }

        sqlx::query(
            r#"
            UPDATE fitness_events SET
                title = ?, description = ?, event_date = ?, location = ?, event_type = ?,
                image_url = ?, max_participants = ?, registration_fee = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(&changes.event_date)
        .bind(&changes.location)
        .bind(&changes.event_type)
        .bind(&changes.image_url)
        .bind(changes.max_participants)
        .bind(changes.registration_fee)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(EventWrite::Done)
    }

    /// Soft delete: the row is kept for history, is_active flips to 0.
    /// Participant and like rows are left untouched.
    pub async fn soft_delete_event(&self, id: i64, trainer_id: &str) -> Result<EventWrite> {
        match self.event_owner(id).await? {
            None => return Ok(EventWrite::NotFound),
            Some(owner) if owner != trainer_id => return Ok(EventWrite::Forbidden),
            Some(_) => {}
        }

        sqlx::query("UPDATE fitness_events SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(EventWrite::Done)
    }

    /// Register a user for an event. The capacity check and the upsert run
    /// in one transaction so concurrent registrations cannot both squeeze
    /// past the last free slot.
    pub async fn register_participant(&self, event_id: i64, user_id: &str) -> Result<Registration> {
        let mut tx = self.pool.begin().await?;

        let event: Option<(Option<i64>,)> = sqlx::query_as(
            "SELECT max_participants FROM fitness_events WHERE id = ? AND is_active = 1",
        )
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((max_participants,)) = event else {
            return Ok(Registration::NotFound);
        };

        if let Some(max) = max_participants {
            let (count,): (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM event_participants WHERE event_id = ? AND status = 'registered'",
            )
            .bind(event_id)
            .fetch_one(&mut *tx)
            .await?;
            if count >= max {
                return Ok(Registration::Full);
            }
        }

        sqlx::query(
            r#"
            INSERT INTO event_participants (event_id, user_id, status)
            VALUES (?, ?, 'registered')
            ON CONFLICT(event_id, user_id) DO UPDATE SET status = 'registered'
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Registration::Registered)
    }

    /// Delete-first toggle: removing an existing like reports false,
    /// otherwise a like is inserted and reported true. The composite
    /// primary key absorbs concurrent duplicate inserts.
    pub async fn toggle_like(&self, event_id: i64, user_id: &str) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM event_likes WHERE event_id = ? AND user_id = ?")
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if deleted.rows_affected() > 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO event_likes (event_id, user_id)
            VALUES (?, ?)
            ON CONFLICT(event_id, user_id) DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(true)
    }

    pub async fn registered_count(&self, event_id: i64) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM event_participants WHERE event_id = ? AND status = 'registered'",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn likes_count(&self, event_id: i64) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM event_likes WHERE event_id = ?")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    // Catalog operations

    pub async fn list_programs(
        &self,
        goal_type: Option<&str>,
        difficulty_level: Option<&str>,
    ) -> Result<Vec<TrainingProgram>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, title, description, goal_type, difficulty_level, duration_weeks \
             FROM training_programs WHERE is_active = 1",
        );
        if let Some(goal_type) = goal_type {
            qb.push(" AND goal_type = ");
            qb.push_bind(goal_type);
        }
        if let Some(difficulty_level) = difficulty_level {
            qb.push(" AND difficulty_level = ");
            qb.push_bind(difficulty_level);
        }

        let programs = qb
            .build_query_as::<TrainingProgram>()
            .fetch_all(&self.pool)
            .await?;
        Ok(programs)
    }

    pub async fn get_program(&self, id: i64) -> Result<Option<TrainingProgram>> {
        let program = sqlx::query_as::<_, TrainingProgram>(
            "SELECT id, title, description, goal_type, difficulty_level, duration_weeks \
             FROM training_programs WHERE id = ? AND is_active = 1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(program)
    }

    pub async fn workouts_for_program(&self, program_id: i64) -> Result<Vec<Workout>> {
        let workouts = sqlx::query_as::<_, Workout>(
            "SELECT id, program_id, week_number, day_number, title, description, duration_minutes \
             FROM workouts WHERE program_id = ? ORDER BY week_number, day_number",
        )
        .bind(program_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(workouts)
    }

    pub async fn list_meal_plans(&self, goal_type: Option<&str>) -> Result<Vec<MealPlan>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, title, description, goal_type, daily_calories \
             FROM meal_plans WHERE is_active = 1",
        );
        if let Some(goal_type) = goal_type {
            qb.push(" AND goal_type = ");
            qb.push_bind(goal_type);
        }

        let plans = qb.build_query_as::<MealPlan>().fetch_all(&self.pool).await?;
        Ok(plans)
    }

    // Tracking operations

    pub async fn insert_workout_log(
        &self,
        user_id: &str,
        workout_id: i64,
        duration_minutes: Option<i64>,
        notes: Option<&str>,
        rating: Option<i64>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO workout_logs (user_id, workout_id, duration_minutes, notes, rating) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(workout_id)
        .bind(duration_minutes)
        .bind(notes)
        .bind(rating)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn progress_for_user(
        &self,
        user_id: &str,
        range: Option<(&str, &str)>,
    ) -> Result<Vec<ProgressEntry>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT user_id, date, weight, body_fat_percentage, muscle_mass, notes \
             FROM user_progress WHERE user_id = ",
        );
        qb.push_bind(user_id);
        if let Some((start, end)) = range {
            qb.push(" AND date BETWEEN ");
            qb.push_bind(start);
            qb.push(" AND ");
            qb.push_bind(end);
        }
        qb.push(" ORDER BY date DESC");

        let entries = qb
            .build_query_as::<ProgressEntry>()
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    /// One progress row per (user, date); re-posting the same date
    /// overwrites the measurements.
    pub async fn upsert_progress(&self, entry: &ProgressEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_progress (user_id, date, weight, body_fat_percentage, muscle_mass, notes)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, date) DO UPDATE SET
                weight = excluded.weight,
                body_fat_percentage = excluded.body_fat_percentage,
                muscle_mass = excluded.muscle_mass,
                notes = excluded.notes
            "#,
        )
        .bind(&entry.user_id)
        .bind(&entry.date)
        .bind(entry.weight)
        .bind(entry.body_fat_percentage)
        .bind(entry.muscle_mass)
        .bind(&entry.notes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // In-memory SQLite is per-connection, so tests pin the pool to one.
    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:", 1).await.unwrap();
        db.run_migrations().await.unwrap();
        db
    }

    fn sample_event(trainer_id: &str, max_participants: Option<i64>) -> NewEvent {
        NewEvent {
            title: "Sunrise Bootcamp".to_string(),
            description: "Outdoor HIIT session at the riverside park".to_string(),
            event_date: "2031-06-01T07:00:00Z".to_string(),
            location: "Riverside Park".to_string(),
            event_type: "bootcamp".to_string(),
            image_url: None,
            trainer_id: trainer_id.to_string(),
            trainer_name: "Alex Carter".to_string(),
            max_participants,
            registration_fee: 15.0,
        }
    }

    #[tokio::test]
    async fn reissued_code_invalidates_previous() {
        let db = test_db().await;
        let t = 1_000_000;
        db.store_code("a@b.com", "111111", t).await.unwrap();
        db.store_code("a@b.com", "222222", t + 1).await.unwrap();

        // The first code must never verify once a second has been issued.
        assert_eq!(
            db.check_code("a@b.com", "111111", t + 2).await.unwrap(),
            CodeCheck::Mismatch
        );
        assert_eq!(
            db.check_code("a@b.com", "222222", t + 2).await.unwrap(),
            CodeCheck::Verified
        );
    }

    #[tokio::test]
    async fn code_valid_just_inside_ttl() {
        let db = test_db().await;
        let t = 1_000_000;
        db.store_code("a@b.com", "482913", t).await.unwrap();
        assert_eq!(
            db.check_code("a@b.com", "482913", t + CODE_TTL_MS - 1_000)
                .await
                .unwrap(),
            CodeCheck::Verified
        );
    }

    #[tokio::test]
    async fn code_expired_just_past_ttl() {
        let db = test_db().await;
        let t = 1_000_000;
        db.store_code("a@b.com", "482913", t).await.unwrap();
        assert_eq!(
            db.check_code("a@b.com", "482913", t + CODE_TTL_MS + 1_000)
                .await
                .unwrap(),
            CodeCheck::Expired
        );
        // Expiry deletes the row, so the next attempt sees nothing.
        assert_eq!(
            db.check_code("a@b.com", "482913", t + CODE_TTL_MS + 2_000)
                .await
                .unwrap(),
            CodeCheck::NotFound
        );
    }

    #[tokio::test]
    async fn verified_code_is_single_use() {
        let db = test_db().await;
        let t = 1_000_000;
        db.store_code("a@b.com", "482913", t).await.unwrap();
        assert_eq!(
            db.check_code("a@b.com", "482913", t + 300_000).await.unwrap(),
            CodeCheck::Verified
        );
        assert_eq!(
            db.check_code("a@b.com", "482913", t + 300_001).await.unwrap(),
            CodeCheck::NotFound
        );
    }

    #[tokio::test]
    async fn mismatch_keeps_code_for_retry() {
        let db = test_db().await;
        let t = 1_000_000;
        db.store_code("a@b.com", "482913", t).await.unwrap();
        assert_eq!(
            db.check_code("a@b.com", "000000", t + 1).await.unwrap(),
            CodeCheck::Mismatch
        );
        assert_eq!(
            db.check_code("a@b.com", "482913", t + 2).await.unwrap(),
            CodeCheck::Verified
        );
    }

    #[tokio::test]
    async fn double_registration_is_idempotent() {
        let db = test_db().await;
        let event_id = db.create_event(&sample_event("t1", None)).await.unwrap();

        assert_eq!(
            db.register_participant(event_id, "u1").await.unwrap(),
            Registration::Registered
        );
        assert_eq!(
            db.register_participant(event_id, "u1").await.unwrap(),
            Registration::Registered
        );
        assert_eq!(db.registered_count(event_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn full_event_rejects_new_participant() {
        let db = test_db().await;
        let event_id = db.create_event(&sample_event("t1", Some(2))).await.unwrap();

        assert_eq!(
            db.register_participant(event_id, "u1").await.unwrap(),
            Registration::Registered
        );
        assert_eq!(
            db.register_participant(event_id, "u2").await.unwrap(),
            Registration::Registered
        );
        assert_eq!(
            db.register_participant(event_id, "u3").await.unwrap(),
            Registration::Full
        );
        assert_eq!(db.registered_count(event_id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn registering_for_missing_event_fails() {
        let db = test_db().await;
        assert_eq!(
            db.register_participant(999, "u1").await.unwrap(),
            Registration::NotFound
        );
    }

    #[tokio::test]
    async fn like_toggle_round_trip() {
        let db = test_db().await;
        let event_id = db.create_event(&sample_event("t1", None)).await.unwrap();

        assert!(db.toggle_like(event_id, "u1").await.unwrap());
        assert_eq!(db.likes_count(event_id).await.unwrap(), 1);
        assert!(!db.toggle_like(event_id, "u1").await.unwrap());
        assert_eq!(db.likes_count(event_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn only_owner_may_update_event() {
        let db = test_db().await;
        let event_id = db.create_event(&sample_event("t1", None)).await.unwrap();

        let changes = EventChanges {
            title: "Evening Bootcamp".to_string(),
            description: "Moved to 6pm".to_string(),
            event_date: "2031-06-01T18:00:00Z".to_string(),
            location: "Riverside Park".to_string(),
            event_type: "bootcamp".to_string(),
            image_url: None,
            max_participants: Some(30),
            registration_fee: 15.0,
        };

        assert_eq!(
            db.update_event(event_id, "t2", &changes).await.unwrap(),
            EventWrite::Forbidden
        );
        assert_eq!(
            db.update_event(event_id, "t1", &changes).await.unwrap(),
            EventWrite::Done
        );

        let event = db.get_event(event_id).await.unwrap().unwrap();
        assert_eq!(event.title, "Evening Bootcamp");
        assert_eq!(event.max_participants, Some(30));
    }

    #[tokio::test]
    async fn soft_delete_is_owner_gated_and_terminal() {
        let db = test_db().await;
        let event_id = db.create_event(&sample_event("t1", None)).await.unwrap();
        db.register_participant(event_id, "u1").await.unwrap();

        assert_eq!(
            db.soft_delete_event(event_id, "t2").await.unwrap(),
            EventWrite::Forbidden
        );
        assert_eq!(
            db.soft_delete_event(event_id, "t1").await.unwrap(),
            EventWrite::Done
        );

        // Gone from reads and writes...
        assert!(db.get_event(event_id).await.unwrap().is_none());
        assert_eq!(
            db.register_participant(event_id, "u2").await.unwrap(),
            Registration::NotFound
        );
        assert_eq!(
            db.update_event(
                event_id,
                "t1",
                &EventChanges {
                    title: "x".to_string(),
                    description: "x".to_string(),
                    event_date: "2031-06-01T07:00:00Z".to_string(),
                    location: "x".to_string(),
                    event_type: "bootcamp".to_string(),
                    image_url: None,
                    max_participants: None,
                    registration_fee: 0.0,
                },
            )
            .await
            .unwrap(),
            EventWrite::NotFound
        );
        // ...but participant rows are retained for history.
        assert_eq!(db.registered_count(event_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn listing_skips_inactive_and_past_events() {
        let db = test_db().await;
        let upcoming = db.create_event(&sample_event("t1", None)).await.unwrap();

        let mut past = sample_event("t1", None);
        past.event_date = "2020-01-01T07:00:00Z".to_string();
        db.create_event(&past).await.unwrap();

        let deleted = db.create_event(&sample_event("t1", None)).await.unwrap();
        db.soft_delete_event(deleted, "t1").await.unwrap();

        let events = db
            .list_events(None, "2026-01-01T00:00:00Z", 20, 0)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, upcoming);
    }

    #[tokio::test]
    async fn event_summary_carries_aggregated_counts() {
        let db = test_db().await;
        let event_id = db.create_event(&sample_event("t1", None)).await.unwrap();
        db.register_participant(event_id, "u1").await.unwrap();
        db.register_participant(event_id, "u2").await.unwrap();
        db.toggle_like(event_id, "u1").await.unwrap();

        let event = db.get_event(event_id).await.unwrap().unwrap();
        assert_eq!(event.participant_count, 2);
        assert_eq!(event.likes_count, 1);
    }

    fn sample_user(email: &str) -> User {
        User {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash: "$argon2$stub".to_string(),
            first_name: "Mia".to_string(),
            last_name: "Lopez".to_string(),
            role: "client".to_string(),
            is_active: false,
            activation_code: Some("123456".to_string()),
            date_of_birth: None,
            gender: None,
            height: None,
            weight: None,
            fitness_goal: None,
            activity_level: None,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn activation_flips_user_active_and_clears_code() {
        let db = test_db().await;
        db.create_user(&sample_user("m@l.com")).await.unwrap();

        db.activate_user("m@l.com").await.unwrap();
        let user = db.get_user_by_email("m@l.com").await.unwrap().unwrap();
        assert!(user.is_active);
        assert!(user.activation_code.is_none());
    }

    #[tokio::test]
    async fn resend_overwrites_activation_code() {
        let db = test_db().await;
        db.create_user(&sample_user("m@l.com")).await.unwrap();

        assert!(db.set_activation_code("m@l.com", "654321").await.unwrap());
        let user = db.get_user_by_email("m@l.com").await.unwrap().unwrap();
        assert_eq!(user.activation_code.as_deref(), Some("654321"));

        assert!(!db.set_activation_code("nobody@x.com", "111111").await.unwrap());
    }

    #[tokio::test]
    async fn progress_upserts_per_date() {
        let db = test_db().await;
        let user = sample_user("p@l.com");
        db.create_user(&user).await.unwrap();
        let entry = ProgressEntry {
            user_id: user.id.clone(),
            date: "2026-08-01".to_string(),
            weight: Some(82.5),
            body_fat_percentage: Some(18.0),
            muscle_mass: None,
            notes: None,
        };
        db.upsert_progress(&entry).await.unwrap();

        let updated = ProgressEntry {
            weight: Some(81.9),
            notes: Some("deload week".to_string()),
            ..entry.clone()
        };
        db.upsert_progress(&updated).await.unwrap();

        let rows = db.progress_for_user(&user.id, None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].weight, Some(81.9));
        assert_eq!(rows[0].notes.as_deref(), Some("deload week"));
    }
}
