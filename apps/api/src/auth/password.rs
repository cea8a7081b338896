use argon2::{
    password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use secrecy::{ExposeSecret, Secret};

use super::AuthError;

/// Hashes a password into PHC format (Argon2id, random salt).
///
/// CPU-intensive: call it from the blocking pool.
pub fn hash_password(password: &Secret<String>) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Checks a candidate password against a stored PHC hash.
/// A malformed stored hash is an error, a wrong password is `Ok(false)`.
pub fn verify_password(phc_hash: &str, candidate: &Secret<String>) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(phc_hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(candidate.expose_secret().as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> Secret<String> {
        Secret::new(s.to_string())
    }

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password(&secret("hunter2-but-longer")).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&hash, &secret("hunter2-but-longer")).unwrap());
    }

    #[test]
    fn test_wrong_password_does_not_verify() {
        let hash = hash_password(&secret("correct horse")).unwrap();
        assert!(!verify_password(&hash, &secret("battery staple")).unwrap());
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let a = hash_password(&secret("same")).unwrap();
        let b = hash_password(&secret("same")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(verify_password("not-a-phc-string", &secret("x")).is_err());
    }
}
