// Accounts and sessions for the analysis API.
// Nothing in here is visible to the matching engine; handlers only use the
// `AuthenticatedUser` extractor as a gate.

pub mod extractor;
pub mod handlers;
pub mod password;
pub mod repository;
pub mod sessions;

use thiserror::Error;

pub use extractor::AuthenticatedUser;
pub use repository::{InMemoryUserRepository, NewUser, UserRepository};
pub use sessions::SessionStore;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User already exists")]
    UserExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}
