//! Output ports to collaborators outside the database.

use async_trait::async_trait;

/// External image hosting. Only release is needed: uploads happen client-side
/// and the flat stores the resulting URL and handle.
#[async_trait]
pub trait ImageStore: Send + Sync + 'static {
    async fn release(&self, handle: &str) -> anyhow::Result<()>;
}

/// Delivers a password reset token to its owner (normally by email).
#[async_trait]
pub trait ResetNotifier: Send + Sync + 'static {
    async fn send_reset(&self, email: &str, token: &str) -> anyhow::Result<()>;
}

/// CPU-bound; the service runs it on the blocking pool.
pub trait PasswordHasher: Send + Sync + 'static {
    fn hash(&self, password: &str) -> anyhow::Result<String>;
    fn verify(&self, password: &str, hash: &str) -> bool;
}
