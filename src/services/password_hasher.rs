use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};

use crate::errors::IdentityError;

/// One-way hashing for passwords and verification codes
///
/// Verification codes go through the same primitive before persistence, so a
/// database leak does not expose live codes.
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create a hasher with the fixed default work factor
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Hash a plaintext secret with a fresh random salt
    ///
    /// # Returns
    /// * `Ok(String)` - PHC-format hash string
    /// * `Err(IdentityError)` - hashing failed
    pub fn hash(&self, plaintext: &str) -> Result<String, IdentityError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| IdentityError::PasswordHash(e.to_string()))
    }

    /// Compare a plaintext secret against a stored hash
    ///
    /// Returns false on mismatch and on malformed hashes; never errors.
    pub fn compare(&self, plaintext: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_produces_argon2_phc_string() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("Passw0rd!").unwrap();

        assert_ne!(hash, "Passw0rd!");
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_compare_succeeds_with_correct_secret() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("Passw0rd!").unwrap();

        assert!(hasher.compare("Passw0rd!", &hash));
    }

    #[test]
    fn test_compare_fails_with_wrong_secret() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("Passw0rd!").unwrap();

        assert!(!hasher.compare("not-the-password", &hash));
    }

    #[test]
    fn test_compare_returns_false_on_malformed_hash() {
        let hasher = PasswordHasher::new();

        assert!(!hasher.compare("anything", "not-a-phc-hash"));
        assert!(!hasher.compare("anything", ""));
    }

    #[test]
    fn test_same_secret_hashes_differently() {
        let hasher = PasswordHasher::new();

        let hash1 = hasher.hash("Passw0rd!").unwrap();
        let hash2 = hasher.hash("Passw0rd!").unwrap();

        // Fresh salt per hash
        assert_ne!(hash1, hash2);
        assert!(hasher.compare("Passw0rd!", &hash1));
        assert!(hasher.compare("Passw0rd!", &hash2));
    }

    #[test]
    fn test_verification_codes_hash_like_passwords() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("483920").unwrap();

        assert!(hasher.compare("483920", &hash));
        assert!(!hasher.compare("483921", &hash));
    }
}
