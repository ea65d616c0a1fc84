//! Email format validation and the uniqueness-lookup contract

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{DirectoryError, ValidationError};

/// Validates basic email structure: one `@`, a non-empty local part, and
/// a dotted domain with a TLD of at least two characters.
pub fn validate_email_format(email: &str) -> Result<(), ValidationError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail);
    };

    if local.is_empty() || local.len() > 64 {
        return Err(ValidationError::InvalidEmail);
    }
    if !local
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | '+'))
    {
        return Err(ValidationError::InvalidEmail);
    }

    if domain.is_empty()
        || domain.len() > 255
        || domain.starts_with(['.', '-'])
        || domain.ends_with(['.', '-'])
        || domain.contains("..")
        || domain.contains('@')
    {
        return Err(ValidationError::InvalidEmail);
    }
    if !domain.chars().all(|c| c.is_alphanumeric() || matches!(c, '.' | '-')) {
        return Err(ValidationError::InvalidEmail);
    }

    match domain.rsplit_once('.') {
        Some((_, tld)) if tld.len() >= 2 => Ok(()),
        _ => Err(ValidationError::InvalidEmail),
    }
}

/// Lookup contract for the asynchronous uniqueness check.
///
/// The production instance consults an in-memory set with simulated
/// latency; a real deployment would swap in a network or database lookup
/// without touching the validator's contract.
#[async_trait]
pub trait EmailDirectory: Send + Sync {
    /// Whether `email` is already registered.
    async fn exists(&self, email: &str) -> Result<bool, DirectoryError>;
}

/// In-memory directory of registered addresses.
#[derive(Debug, Clone)]
pub struct InMemoryEmailDirectory {
    emails: HashSet<String>,
    latency: Duration,
}

impl InMemoryEmailDirectory {
    pub fn new(emails: impl IntoIterator<Item = String>, latency: Duration) -> Self {
        Self {
            emails: emails.into_iter().collect(),
            latency,
        }
    }

    /// Directory seeded with the addresses known to the demo backend.
    pub fn seeded(latency: Duration) -> Self {
        Self::new(
            [
                "test@test.com".to_string(),
                "reserva@viajes.com".to_string(),
                "admin@travel.com".to_string(),
            ],
            latency,
        )
    }
}

impl Default for InMemoryEmailDirectory {
    fn default() -> Self {
        Self::seeded(Duration::from_secs(1))
    }
}

#[async_trait]
impl EmailDirectory for InMemoryEmailDirectory {
    async fn exists(&self, email: &str) -> Result<bool, DirectoryError> {
        // Simulated round trip to the backing store
        tokio::time::sleep(self.latency).await;
        Ok(self.emails.contains(email))
    }
}
