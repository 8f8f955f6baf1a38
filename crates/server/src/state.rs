use crate::{config::Config, db::Database, mailer::Mailer};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
    pub mailer: Mailer,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        let mailer = Mailer::new(config.smtp.clone());
        Self { db, config, mailer }
    }
}
