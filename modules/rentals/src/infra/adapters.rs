//! Default collaborators used when no external service is configured.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{ImageStore, ResetNotifier};

/// Image hosting is external; releasing a handle is only recorded.
#[derive(Debug, Default, Clone)]
pub struct LoggingImageStore;

#[async_trait]
impl ImageStore for LoggingImageStore {
    async fn release(&self, handle: &str) -> anyhow::Result<()> {
        info!(%handle, "image release requested");
        Ok(())
    }
}

/// Writes the reset token to the debug log instead of sending mail.
#[derive(Debug, Default, Clone)]
pub struct LogResetNotifier;

#[async_trait]
impl ResetNotifier for LogResetNotifier {
    async fn send_reset(&self, email: &str, token: &str) -> anyhow::Result<()> {
        debug!(%email, %token, "password reset token issued");
        Ok(())
    }
}
