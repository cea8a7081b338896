use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::AuthError;
use crate::models::user::User;

/// Data needed to create an account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Account storage, keyed by normalized email.
///
/// Carried in `AppState` as `Arc<dyn UserRepository>` so a persistent store
/// can replace the in-memory one without touching handlers.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, new_user: NewUser) -> Result<User, AuthError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;
}

/// Trimmed, lowercase email used as the account key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Process-local repository. Accounts are lost on restart.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, AuthError> {
        let email = normalize_email(&new_user.email);
        let mut users = self.users.write().await;
        if users.contains_key(&email) {
            return Err(AuthError::UserExists);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name.trim().to_string(),
            email: email.clone(),
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
        };
        users.insert(email, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        Ok(self.users.read().await.get(&normalize_email(email)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: " Ada ".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let repo = InMemoryUserRepository::default();
        let created = repo.create(new_user("ada@example.com")).await.unwrap();
        assert_eq!(created.name, "Ada");

        let found = repo.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn test_email_is_case_and_space_insensitive() {
        let repo = InMemoryUserRepository::default();
        repo.create(new_user("  Ada@Example.COM ")).await.unwrap();
        assert!(repo.find_by_email("ada@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let repo = InMemoryUserRepository::default();
        repo.create(new_user("ada@example.com")).await.unwrap();
        let err = repo.create(new_user("ADA@example.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::UserExists));
    }

    #[tokio::test]
    async fn test_unknown_email_is_none() {
        let repo = InMemoryUserRepository::default();
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }
}
