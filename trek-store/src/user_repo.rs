use async_trait::async_trait;
use sqlx::SqlitePool;
use trek_core::repository::UserRepository;
use trek_core::{StoreResult, User};
use tracing::debug;

use crate::store_error;

pub struct StoreUserRepository {
    pool: SqlitePool,
}

impl StoreUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
        }
    }
}

#[async_trait]
impl UserRepository for StoreUserRepository {
    async fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<i64> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;

        let id = result.last_insert_rowid();
        debug!("User {} stored with id {}", username, id);
        Ok(id)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(User::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbClient;
    use trek_core::StoreError;

    async fn repo() -> StoreUserRepository {
        let db = DbClient::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        StoreUserRepository::new(db.pool)
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = repo().await;
        let id = repo.create_user("alice", "hash-1").await.unwrap();

        let user = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.password_hash, "hash-1");
        assert!(repo.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let repo = repo().await;
        repo.create_user("alice", "hash-1").await.unwrap();

        let err = repo.create_user("alice", "hash-2").await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));

        // The failed insert must not clobber the original row
        let user = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(user.password_hash, "hash-1");
    }
}
