//! Password hashing utilities

use bcrypt::{hash, verify, DEFAULT_COST};

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Malformed stored hashes count as a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    verify(password, stored_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_only_the_original_password() {
        let stored = bcrypt::hash("segredo123", 4).unwrap();
        assert!(verify_password("segredo123", &stored));
        assert!(!verify_password("outra-senha", &stored));
        assert!(!verify_password("segredo123", "not-a-hash"));
    }
}
