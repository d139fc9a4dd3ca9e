//! Password hashing for admin accounts.
//!
//! Both operations are CPU-bound; async callers run them through
//! [`tokio::task::spawn_blocking`].

use bcrypt::{BcryptError, hash, verify};

/// Work factor used for every stored hash.
pub const BCRYPT_COST: u32 = 10;

/// Hash a plaintext password with bcrypt.
pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    hash(password.as_bytes(), BCRYPT_COST)
}

/// Compare a plaintext password against a stored bcrypt hash.
///
/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match verify(password.as_bytes(), stored_hash) {
        Ok(matches) => matches,
        Err(err) => {
            tracing::warn!(error = %err, "stored password hash could not be parsed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hashed = hash_password("correct horse battery").unwrap();
        assert!(hashed.starts_with("$2"));
        assert_ne!(hashed, "correct horse battery");
        assert!(verify_password("correct horse battery", &hashed));
        assert!(!verify_password("wrong horse battery", &hashed));
    }

    #[test]
    fn garbage_hash_never_matches() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }
}
