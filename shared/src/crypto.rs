use log::error;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

const SALT_LEN: usize = 16;
const DERIVED_KEY_LEN: usize = 32;
const PBKDF2_ITERATIONS: u32 = 100_000;

/// Result of hashing an invitation code. `hash` is the persisted form,
/// `"<salt_hex>:<derived_key_hex>"`; `salt` is the salt hex on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedCode {
    pub hash: String,
    pub salt: String,
}

/// Hashes a plaintext invitation code with a fresh random 16-byte salt.
pub fn hash_code(code: &str) -> HashedCode {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    hash_code_with_salt(code, &salt)
}

/// Hashes a plaintext invitation code with a caller-provided salt. This is
/// the path `verify_code` takes to recompute a hash against the stored salt.
pub fn hash_code_with_salt(code: &str, salt: &[u8]) -> HashedCode {
    let salt_hex = hex::encode(salt);
    HashedCode {
        hash: format!("{}:{}", salt_hex, derive_key_hex(code, salt)),
        salt: salt_hex,
    }
}

fn derive_key_hex(code: &str, salt: &[u8]) -> String {
    let mut derived_key = [0u8; DERIVED_KEY_LEN];
    pbkdf2_hmac::<Sha256>(code.as_bytes(), salt, PBKDF2_ITERATIONS, &mut derived_key);
    hex::encode(derived_key)
}

/// Checks a plaintext guess against a stored `"<salt_hex>:<derived_key_hex>"`
/// hash. Returns `false` on any mismatch or malformed stored hash; never
/// panics and never surfaces an error to the caller.
pub fn verify_code(code: &str, stored_hash: &str) -> bool {
    let mut parts = stored_hash.split(':');
    let (salt_hex, key_hex) = match (parts.next(), parts.next(), parts.next()) {
        (Some(salt_hex), Some(key_hex), None) if !salt_hex.is_empty() && !key_hex.is_empty() => {
            (salt_hex, key_hex)
        }
        _ => return false,
    };

    let salt = match hex::decode(salt_hex) {
        Ok(salt) => salt,
        Err(e) => {
            error!("Stored code hash has a non-hex salt: {}", e);
            return false;
        }
    };

    derive_key_hex(code, &salt) == key_hex
}
