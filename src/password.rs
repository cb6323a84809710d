//! Password digests as stored with a user.
//!
//! The stored form is `SHA-256:<hex>` where the digest runs over the password
//! followed by the user name, so equal passwords of different users differ.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::constants::PASSWORD_HASH_PREFIX;

#[must_use]
pub fn encrypt_password(username: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(username.as_bytes());
    format!("{PASSWORD_HASH_PREFIX}{}", hex::encode(hasher.finalize()))
}

/// Checks `password` against a stored digest.
///
/// A stored value without the digest prefix is treated as a legacy plain hex
/// digest of the password alone.
#[must_use]
pub fn validate_password(username: &str, password: &str, stored: &str) -> bool {
    match stored.strip_prefix(PASSWORD_HASH_PREFIX) {
        Some(_) => constant_time_eq(
            encrypt_password(username, password).as_bytes(),
            stored.as_bytes(),
        ),
        None => {
            let legacy = hex::encode(Sha256::digest(password.as_bytes()));
            constant_time_eq(legacy.as_bytes(), stored.as_bytes())
        }
    }
}

/// Slices of different lengths compare unequal.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    bool::from(a.ct_eq(b))
}
