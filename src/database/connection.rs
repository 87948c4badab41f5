use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;

use super::migrations::Migrator;

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url);

    // Every in-memory connection opens its own empty database
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    opt.max_connections(max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug);

    Database::connect(opt).await
}

pub fn get_database_url(database_path: Option<&str>) -> String {
    match database_path {
        Some(":memory:") => "sqlite::memory:".to_string(),
        Some(path) => format!("sqlite://{}?mode=rwc", path),
        None => "sqlite://stitchboard.db?mode=rwc".to_string(),
    }
}

/// Brings the schema up to date.
pub async fn setup_database(db: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(db, None).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_mapping() {
        assert_eq!(get_database_url(Some(":memory:")), "sqlite::memory:");
        assert_eq!(
            get_database_url(Some("/tmp/yarn.db")),
            "sqlite:///tmp/yarn.db?mode=rwc"
        );
        assert_eq!(get_database_url(None), "sqlite://stitchboard.db?mode=rwc");
    }
}
