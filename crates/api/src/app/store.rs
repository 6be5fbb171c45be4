//! Identity store: trait + in-memory implementation.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

use gatehouse_auth::{NewUser, User, UserChanges, UserId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already in use")]
    EmailTaken,

    #[error("{0}")]
    Backend(String),
}

/// Profile fields applied only when `get_or_create_by_email` has to create.
#[derive(Debug, Clone, Default)]
pub struct ProfileDefaults {
    pub full_name: String,
    pub profile_url: String,
}

/// Persistent record of registered users.
///
/// Email uniqueness is this layer's invariant, and `get_or_create_by_email`
/// is atomic: concurrent first logins with the same email resolve to a single
/// record.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new: NewUser) -> Result<User, StoreError>;

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Upsert keyed on email. Never overwrites an existing user's fields; the
    /// flag reports whether a new user was created.
    async fn get_or_create_by_email(
        &self,
        email: &str,
        defaults: ProfileDefaults,
    ) -> Result<(User, bool), StoreError>;

    /// All users, newest first (`date_joined` descending).
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    async fn update(&self, id: UserId, changes: UserChanges) -> Result<Option<User>, StoreError>;

    async fn delete(&self, id: UserId) -> Result<bool, StoreError>;

    /// Flip `is_active` and persist; returns the updated user.
    async fn toggle_active(&self, id: UserId) -> Result<Option<User>, StoreError>;
}

/// In-memory store (dev/test default).
pub struct InMemoryUserStore {
    users: RwLock<HashMap<i64, User>>,
    next_id: AtomicI64,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn build_user(&self, new: NewUser) -> User {
        User {
            id: UserId::new(self.next_id.fetch_add(1, Ordering::SeqCst)),
            email: new.email,
            full_name: new.full_name,
            profile_url: new.profile_url,
            password_hash: new.password_hash,
            is_staff: new.is_staff,
            is_superuser: new.is_superuser,
            is_active: true,
            date_joined: Utc::now(),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().map_err(poisoned)?;

        if users.values().any(|u| u.email == new.email) {
            return Err(StoreError::EmailTaken);
        }

        let user = self.build_user(new);
        users.insert(user.id.as_i64(), user.clone());
        Ok(user)
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.get(&id.as_i64()).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn get_or_create_by_email(
        &self,
        email: &str,
        defaults: ProfileDefaults,
    ) -> Result<(User, bool), StoreError> {
        // Lookup and insert under one write lock.
        let mut users = self.users.write().map_err(poisoned)?;

        if let Some(existing) = users.values().find(|u| u.email == email) {
            return Ok((existing.clone(), false));
        }

        let user = self.build_user(NewUser {
            email: email.to_string(),
            full_name: defaults.full_name,
            profile_url: defaults.profile_url,
            ..Default::default()
        });
        users.insert(user.id.as_i64(), user.clone());
        Ok((user, true))
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().map_err(poisoned)?;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| b.date_joined.cmp(&a.date_joined).then(b.id.cmp(&a.id)));
        Ok(all)
    }

    async fn update(&self, id: UserId, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().map_err(poisoned)?;

        if let Some(new_email) = &changes.email {
            if users.values().any(|u| u.id != id && &u.email == new_email) {
                return Err(StoreError::EmailTaken);
            }
        }

        let Some(user) = users.get_mut(&id.as_i64()) else {
            return Ok(None);
        };

        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(full_name) = changes.full_name {
            user.full_name = full_name;
        }
        if let Some(profile_url) = changes.profile_url {
            user.profile_url = profile_url;
        }
        if let Some(is_active) = changes.is_active {
            user.is_active = is_active;
        }

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        let mut users = self.users.write().map_err(poisoned)?;
        Ok(users.remove(&id.as_i64()).is_some())
    }

    async fn toggle_active(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().map_err(poisoned)?;
        let Some(user) = users.get_mut(&id.as_i64()) else {
            return Ok(None);
        };
        user.is_active = !user.is_active;
        Ok(Some(user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_enforces_unique_email() {
        let store = InMemoryUserStore::new();
        store.create(new_user("a@x.com")).await.unwrap();

        let err = store.create(new_user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent_and_preserves_fields() {
        let store = InMemoryUserStore::new();

        let (first, created) = store
            .get_or_create_by_email(
                "a@x.com",
                ProfileDefaults {
                    full_name: "Ada".to_string(),
                    profile_url: "https://pics/ada".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(created);

        // Second resolution with different defaults must not touch the record.
        let (second, created) = store
            .get_or_create_by_email(
                "a@x.com",
                ProfileDefaults {
                    full_name: "Someone Else".to_string(),
                    profile_url: String::new(),
                },
            )
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.full_name, "Ada");
        assert_eq!(second.profile_url, "https://pics/ada");

        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_orders_newest_first() {
        let store = InMemoryUserStore::new();
        let a = store.create(new_user("a@x.com")).await.unwrap();
        let b = store.create(new_user("b@x.com")).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all[0].id, b.id);
        assert_eq!(all[1].id, a.id);
    }

    #[tokio::test]
    async fn toggle_active_is_its_own_inverse() {
        let store = InMemoryUserStore::new();
        let user = store.create(new_user("a@x.com")).await.unwrap();
        assert!(user.is_active);

        let once = store.toggle_active(user.id).await.unwrap().unwrap();
        assert!(!once.is_active);

        let twice = store.toggle_active(user.id).await.unwrap().unwrap();
        assert!(twice.is_active);
    }

    #[tokio::test]
    async fn toggle_active_unknown_user_is_none() {
        let store = InMemoryUserStore::new();
        assert!(store.toggle_active(UserId::new(9999)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_applies_changes_and_rejects_taken_email() {
        let store = InMemoryUserStore::new();
        let a = store.create(new_user("a@x.com")).await.unwrap();
        store.create(new_user("b@x.com")).await.unwrap();

        let updated = store
            .update(
                a.id,
                UserChanges {
                    full_name: Some("Ada".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.full_name, "Ada");
        assert_eq!(updated.email, "a@x.com");

        let err = store
            .update(
                a.id,
                UserChanges {
                    email: Some("b@x.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));
    }

    #[tokio::test]
    async fn update_unknown_user_is_none() {
        let store = InMemoryUserStore::new();
        let result = store
            .update(UserId::new(1), UserChanges::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
