use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::QcError;
use crate::serde::to_canonical_json_bytes;

/// Lower-case hex SHA-256 of the canonical JSON form of `value`.
///
/// Two configurations that serialise to the same canonical JSON share a
/// hash, so this is the key index spaces are cached under.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, QcError> {
    let digest = Sha256::digest(to_canonical_json_bytes(value)?);
    Ok(digest.iter().map(|byte| format!("{byte:02x}")).collect())
}
