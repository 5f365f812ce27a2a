//! Password hashing, opaque tokens and signed verification links.

use ring::hmac;

use crate::domain::DomainError;

pub fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt: [u8; 16] = rand::random();
    argon2::hash_encoded(password.as_bytes(), &salt, &argon2::Config::default()).map_err(|e| {
        tracing::error!("failed to hash password: {}", e);
        DomainError::Internal("password could not be hashed".to_string())
    })
}

/// Malformed hashes never verify.
pub fn verify_password(hash: &str, password: &str) -> bool {
    argon2::verify_encoded(hash, password.as_bytes()).unwrap_or(false)
}

/// A random 64 character hex token.
pub fn random_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

pub fn sign(key: &str, message: &str) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key.as_bytes());
    hex::encode(hmac::sign(&key, message.as_bytes()).as_ref())
}

/// Constant time comparison of `signature` against the signature of `message`.
pub fn verify_signature(key: &str, message: &str, signature: &str) -> bool {
    let Ok(tag) = hex::decode(signature) else {
        return false;
    };
    let key = hmac::Key::new(hmac::HMAC_SHA256, key.as_bytes());
    hmac::verify(&key, message.as_bytes(), &tag).is_ok()
}
