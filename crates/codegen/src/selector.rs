//! Selector hashing

use sha3::{Digest, Keccak256};

/// Hex characters in a function or event selector
pub const SELECTOR_LENGTH: usize = 8;

/// Hex characters of a link placeholder hash
const PLACEHOLDER_HASH_LENGTH: usize = 34;

/// Keccak-256 digest of `input` as 64 uppercase hex characters
pub fn hash(input: &str) -> String {
    hex::encode_upper(Keccak256::digest(input.as_bytes()))
}

/// Selector of a canonical signature: the first four digest bytes, uppercase
pub fn selector(signature: &str) -> String {
    let mut digest = hash(signature);
    digest.truncate(SELECTOR_LENGTH);
    digest
}

/// Placeholder solc writes into bytecode for an unlinked `file:Library`
pub fn link_placeholder(token: &str) -> String {
    let digest = hash(token).to_lowercase();
    format!("__${}$__", &digest[..PLACEHOLDER_HASH_LENGTH])
}
