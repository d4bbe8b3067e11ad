//! Checksum calculation for dataset provenance.

use sha2::{Digest, Sha256};

/// Calculate SHA-256 checksum of dataset file content.
///
/// # Arguments
/// * `content` - Raw text of the dataset file
///
/// # Returns
/// Hexadecimal string representation of the SHA-256 hash.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
