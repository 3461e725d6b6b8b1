use bcrypt::BcryptError;

use crate::core::errors::AcquisitionsError;

/// bcrypt with a configurable work factor. Inputs past bcrypt's 72-byte limit
/// are refused rather than silently truncated.
#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        PasswordHasher { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, AcquisitionsError> {
        bcrypt::non_truncating_hash(password, self.cost).map_err(|e| match e {
            BcryptError::Truncation(len) => AcquisitionsError::invalid(
                "password",
                format!("password is {} bytes, at most 72 are allowed", len),
            ),
            other => other.into(),
        })
    }

    /// A candidate too long to have been hashed can never match.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AcquisitionsError> {
        match bcrypt::non_truncating_verify(password, hash) {
            Ok(matched) => Ok(matched),
            Err(BcryptError::Truncation(_)) => Ok(false),
            Err(e) => Err(AcquisitionsError::InternalServerError(format!(
                "Password verification error: {}",
                e
            ))),
        }
    }
}
