//! Shared-secret access key and authentication failure reasons.
//!
//! Only the SHA-256 digest of the configured secret is retained. Presented
//! tokens are digested the same way and compared over the fixed 32-byte width,
//! so the comparison time depends on neither the token length nor the position
//! of the first differing byte.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;
use zeroize::Zeroize;

const DIGEST_LEN: usize = 32;

/// Machine-readable reason attached to `unauthorized` responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthFailure {
    /// No `Authorization` header was supplied.
    AuthRequired,
    /// The header did not use the `Bearer <key>` scheme.
    InvalidAuthFormat,
    /// The presented key does not match the configured secret.
    InvalidAccessKey,
}

impl AuthFailure {
    /// Client-facing message for this failure.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::AuthRequired => "Access key required",
            Self::InvalidAuthFormat => "Invalid authorization format. Use: Bearer <key>",
            Self::InvalidAccessKey => "Invalid access key",
        }
    }
}

/// Raised when an access key cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessKeyError {
    /// The configured secret is blank.
    #[error("access key must not be empty")]
    Empty,
}

/// Configured shared secret, held as a digest that is wiped on drop.
///
/// # Examples
/// ```
/// use drawings::domain::AccessKey;
///
/// let key = AccessKey::new("s3cret".to_owned()).expect("non-empty key");
/// assert!(key.verify("s3cret"));
/// assert!(!key.verify("s3cret "));
/// ```
#[derive(Clone)]
pub struct AccessKey {
    digest: [u8; DIGEST_LEN],
}

impl AccessKey {
    /// Digest and retain `secret`. The plaintext buffer is zeroised.
    ///
    /// # Errors
    /// Returns [`AccessKeyError::Empty`] when `secret` is blank.
    pub fn new(mut secret: String) -> Result<Self, AccessKeyError> {
        if secret.trim().is_empty() {
            secret.zeroize();
            return Err(AccessKeyError::Empty);
        }
        let digest = digest(secret.as_bytes());
        secret.zeroize();
        Ok(Self { digest })
    }

    /// Compare a presented token against the secret in constant time.
    ///
    /// The token is taken as raw bytes so header values outside visible ASCII
    /// are compared rather than discarded.
    #[must_use]
    pub fn verify(&self, presented: impl AsRef<[u8]>) -> bool {
        let mut candidate = digest(presented.as_ref());
        let diff = self
            .digest
            .iter()
            .zip(candidate.iter())
            .fold(0_u8, |acc, (a, b)| acc | (a ^ b));
        candidate.zeroize();
        diff == 0
    }
}

fn digest(bytes: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

impl Drop for AccessKey {
    fn drop(&mut self) {
        self.digest.zeroize();
    }
}

impl std::fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessKey(<redacted>)")
    }
}
