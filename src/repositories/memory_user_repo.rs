//! In-memory user repository.
//!
//! Rows live in an ordered map so listing and paging follow id order like
//! the SQL adapter. Every operation holds the lock for its whole body,
//! which gives it the all-or-nothing effect of a transaction.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{AppError, AppResult};
use crate::models::{NewUser, UpdateUser, User};
use crate::repositories::{UserRepository, empty_update_error};

#[derive(Debug, Default)]
struct Store {
    last_id: i32,
    rows: BTreeMap<i32, User>,
}

/// Process-local [`UserRepository`] used by tests and `serve --in-memory`.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    store: Mutex<Store>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Store>> {
        self.store.lock().map_err(|_| AppError::Internal {
            source: anyhow::anyhow!("in-memory user store lock poisoned"),
        })
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        let mut store = self.lock()?;
        let id = store.last_id.checked_add(1).ok_or_else(|| AppError::Internal {
            source: anyhow::anyhow!("in-memory user ids exhausted"),
        })?;
        store.last_id = id;
        let user = User {
            id,
            username: new_user.username,
            email: new_user.email,
            password: new_user.password,
        };
        store.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: i32) -> AppResult<User> {
        self.lock()?
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::user_not_found(id))
    }

    async fn get_all_users(&self) -> AppResult<Vec<User>> {
        Ok(self.lock()?.rows.values().cloned().collect())
    }

    async fn get_users_page(&self, offset: i64, limit: i64) -> AppResult<(Vec<User>, i64)> {
        let store = self.lock()?;
        let total = store.rows.len() as i64;
        let page = store
            .rows
            .values()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn update_user(&self, update: UpdateUser) -> AppResult<()> {
        if !update.has_changes() {
            return Err(empty_update_error());
        }

        let mut store = self.lock()?;
        let user = store
            .rows
            .get_mut(&update.id)
            .ok_or_else(|| AppError::user_not_found(update.id))?;
        update.apply_to(user);
        Ok(())
    }

    async fn delete_user_by_id(&self, id: i32) -> AppResult<()> {
        self.lock()?
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::user_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{}@example.com", name),
            password: "12345678".to_string(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_assigned_sequentially() {
        let repo = InMemoryUserRepository::new();
        let first = repo.create_user(new_user("ivan")).await.unwrap();
        let second = repo.create_user(new_user("olga")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.get_user_by_id(2).await.unwrap(), second);
    }

    #[tokio::test]
    async fn test_exhausted_ids_fail_without_insert() {
        let repo = InMemoryUserRepository::new();
        repo.lock().unwrap().last_id = i32::MAX;

        let err = repo.create_user(new_user("ivan")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(matches!(err, AppError::Internal { .. }));

        let store = repo.lock().unwrap();
        assert_eq!(store.last_id, i32::MAX);
        assert!(store.rows.is_empty());
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let repo = InMemoryUserRepository::new();
        let first = repo.create_user(new_user("ivan")).await.unwrap();
        repo.delete_user_by_id(first.id).await.unwrap();

        let next = repo.create_user(new_user("olga")).await.unwrap();
        assert_eq!(next.id, 2);
    }

    #[tokio::test]
    async fn test_page_window_and_total() {
        let repo = InMemoryUserRepository::new();
        for i in 0..5 {
            repo.create_user(new_user(&format!("user{}", i))).await.unwrap();
        }

        let (page, total) = repo.get_users_page(2, 2).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(page.iter().map(|u| u.id).collect::<Vec<_>>(), vec![3, 4]);

        let (beyond, total) = repo.get_users_page(10, 2).await.unwrap();
        assert!(beyond.is_empty());
        assert_eq!(total, 5);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let repo = InMemoryUserRepository::new();
        let result = repo
            .update_user(UpdateUser {
                id: 42,
                username: Some("ghost".to_string()),
                ..Default::default()
            })
            .await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_empty_update_rejected() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create_user(new_user("ivan")).await.unwrap();

        let result = repo
            .update_user(UpdateUser {
                id: user.id,
                ..Default::default()
            })
            .await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(repo.get_user_by_id(user.id).await.unwrap(), user);
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create_user(new_user("ivan")).await.unwrap();

        repo.delete_user_by_id(user.id).await.unwrap();
        let second = repo.delete_user_by_id(user.id).await;
        assert_eq!(second.unwrap_err().kind(), ErrorKind::NotFound);
    }
}
