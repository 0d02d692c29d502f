//! In-process `UserStore` for router tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use super::dto::{UserCreate, UserUpdate};
use super::repo::UserStore;
use super::repo_types::User;

#[derive(Default)]
struct Table {
    rows: BTreeMap<i64, User>,
    last_id: i64,
    writes: usize,
}

#[derive(Default)]
pub struct MemoryUserStore {
    table: Mutex<Table>,
}

impl MemoryUserStore {
    /// Number of successful insert/update/delete calls so far.
    pub fn writes(&self) -> usize {
        self.table.lock().unwrap().writes
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list(&self) -> Result<Vec<User>, sqlx::Error> {
        Ok(self.table.lock().unwrap().rows.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        Ok(self.table.lock().unwrap().rows.get(&id).cloned())
    }

    async fn insert(&self, new_user: UserCreate) -> Result<User, sqlx::Error> {
        let mut table = self.table.lock().unwrap();
        table.last_id += 1;
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: table.last_id,
            name: new_user.name,
            email: new_user.email,
            bio: new_user.bio,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(user.id, user.clone());
        table.writes += 1;
        Ok(user)
    }

    async fn update(&self, id: i64, patch: UserUpdate) -> Result<Option<User>, sqlx::Error> {
        let mut table = self.table.lock().unwrap();
        let Some(row) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        let fields = patch.apply_to(row);
        row.name = fields.name;
        row.email = fields.email;
        row.bio = fields.bio;
        row.updated_at = OffsetDateTime::now_utc().max(row.created_at);
        let updated = row.clone();
        table.writes += 1;
        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut table = self.table.lock().unwrap();
        let removed = table.rows.remove(&id).is_some();
        if removed {
            table.writes += 1;
        }
        Ok(removed)
    }
}

/// Store whose every call fails the way an unreachable database would.
pub struct FailingUserStore;

#[async_trait]
impl UserStore for FailingUserStore {
    async fn list(&self) -> Result<Vec<User>, sqlx::Error> {
        Err(sqlx::Error::Protocol("relation \"users\" does not exist".into()))
    }

    async fn get(&self, _id: i64) -> Result<Option<User>, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }

    async fn insert(&self, _new_user: UserCreate) -> Result<User, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }

    async fn update(&self, _id: i64, _patch: UserUpdate) -> Result<Option<User>, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }

    async fn delete(&self, _id: i64) -> Result<bool, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }
}

/// Store that panics inside the handler, for exercising the panic boundary.
pub struct PanickingUserStore;

#[async_trait]
impl UserStore for PanickingUserStore {
    async fn list(&self) -> Result<Vec<User>, sqlx::Error> {
        panic!("store exploded")
    }

    async fn get(&self, _id: i64) -> Result<Option<User>, sqlx::Error> {
        panic!("store exploded")
    }

    async fn insert(&self, _new_user: UserCreate) -> Result<User, sqlx::Error> {
        panic!("store exploded")
    }

    async fn update(&self, _id: i64, _patch: UserUpdate) -> Result<Option<User>, sqlx::Error> {
        panic!("store exploded")
    }

    async fn delete(&self, _id: i64) -> Result<bool, sqlx::Error> {
        panic!("store exploded")
    }
}
