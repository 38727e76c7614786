use serde_json::Value;
use sha2::{Digest, Sha256};

/// Hex SHA-256 of the trimmed, lower-cased address.
pub fn email_digest(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Only strings can be hashed.
pub fn digest_value(value: &Value) -> Option<String> {
    value.as_str().map(email_digest)
}
