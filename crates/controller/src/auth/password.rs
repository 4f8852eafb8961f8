//! Password hashing for the credential store
//!
//! Argon2id with a random salt per hash. Verification is constant-time
//! with respect to the hash content.
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

#[derive(Debug, thiserror::Error)]
#[error("Failed to hash password: {0}")]
pub struct HashError(argon2::password_hash::Error);

/// Hashes a plaintext password into a PHC string for storage.
///
/// Password length rules are enforced at the request boundary, not here.
pub fn hash_password(plaintext: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(HashError)
}

/// Verifies a plaintext password against a stored PHC string.
///
/// Returns false for a mismatch or an unparsable stored hash; callers
/// cannot distinguish the two, matching the login behavior where an
/// unknown email and a wrong password look identical.
pub fn verify_password(plaintext: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::warn!("Encountered unparsable password hash, {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();

        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("incorrect horse", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("hunter2").unwrap();
        let second = hash_password("hunter2").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn unparsable_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
    }
}
