//! Parley Database Crate
//!
//! SQLite persistence for the messaging core: connection management,
//! migrations, the append-only message log, and the room index.

use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;

// Re-export repositories
pub use repos::{MessageRepository, RoomRepository, DEFAULT_CONVERSATION_LIMIT};

// Re-export entities
pub use entities::{
    message::{Message, MessageType, SendMessageRequest},
    room::ChatRoom,
};

// Re-export types
pub use types::{
    errors::{MessagingError, MessagingResult},
    pair::PairKey,
};

/// Initialize the database with migrations
pub async fn initialize_database(
    config: &parley_config::DatabaseConfig,
) -> MessagingResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| MessagingError::StorageUnavailable(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| MessagingError::Migration(e.to_string()))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_config::DatabaseConfig;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_database_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let config = DatabaseConfig {
            url: db_url,
            max_connections: 1,
        };

        let pool = initialize_database(&config).await.unwrap();
        sqlx::query("SELECT COUNT(*) FROM messages")
            .fetch_one(&pool)
            .await
            .unwrap();
    }
}
