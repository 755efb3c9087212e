use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::error::MarketplaceError;

/// Hash a password with Argon2id and a random 16-byte salt (PHC string format).
pub fn hash_password(plain: &str) -> Result<String, MarketplaceError> {
    let salt_bytes: [u8; 16] = rand::random();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| MarketplaceError::Internal(anyhow::anyhow!("encode salt: {e}")))?;
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| MarketplaceError::Internal(anyhow::anyhow!("hash password: {e}")))?;
    Ok(hash.to_string())
}

/// Check `plain` against a stored PHC hash. Unparsable hashes never match.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
