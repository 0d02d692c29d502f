use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::warn;

use super::dto::{UserCreate, UserUpdate};
use super::repo_types::User;

/// Persistence seam for user profiles. Every call is one unit of work.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, sqlx::Error>;
    async fn get(&self, id: i64) -> Result<Option<User>, sqlx::Error>;
    async fn insert(&self, new_user: UserCreate) -> Result<User, sqlx::Error>;
    async fn update(&self, id: i64, patch: UserUpdate) -> Result<Option<User>, sqlx::Error>;
    /// Returns `false` when no row had this id.
    async fn delete(&self, id: i64) -> Result<bool, sqlx::Error>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Commit on success, roll back on failure. The connection goes back to the
/// pool when `tx` is dropped at the end of this call either way.
async fn finish<T>(
    tx: Transaction<'_, Postgres>,
    outcome: Result<T, sqlx::Error>,
) -> Result<T, sqlx::Error> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(e)
        }
    }
}

async fn insert_row(conn: &mut PgConnection, new_user: &UserCreate) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, bio)
        VALUES ($1, $2, $3)
        RETURNING id, name, email, bio, created_at, updated_at
        "#,
    )
    .bind(&new_user.name)
    .bind(&new_user.email)
    .bind(&new_user.bio)
    .fetch_one(conn)
    .await
}

async fn update_row(
    conn: &mut PgConnection,
    id: i64,
    patch: &UserUpdate,
) -> Result<Option<User>, sqlx::Error> {
    let current = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, bio, created_at, updated_at
        FROM users
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(current) = current else {
        return Ok(None);
    };
    let fields = patch.apply_to(&current);

    let updated = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
           SET name = $2, email = $3, bio = $4,
               updated_at = GREATEST(now(), created_at)
         WHERE id = $1
        RETURNING id, name, email, bio, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(fields.name)
    .bind(fields.email)
    .bind(fields.bio)
    .fetch_one(&mut *conn)
    .await?;
    Ok(Some(updated))
}

async fn delete_row(conn: &mut PgConnection, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, bio, created_at, updated_at
            FROM users
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
    }

    async fn get(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, bio, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
    }

    async fn insert(&self, new_user: UserCreate) -> Result<User, sqlx::Error> {
        let mut tx = self.db.begin().await?;
        let outcome = insert_row(&mut *tx, &new_user).await;
        finish(tx, outcome).await
    }

    async fn update(&self, id: i64, patch: UserUpdate) -> Result<Option<User>, sqlx::Error> {
        let mut tx = self.db.begin().await?;
        let outcome = update_row(&mut *tx, id, &patch).await;
        finish(tx, outcome).await
    }

    async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = self.db.begin().await?;
        let outcome = delete_row(&mut *tx, id).await;
        finish(tx, outcome).await
    }
}
