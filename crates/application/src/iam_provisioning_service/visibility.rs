use datamesh_core::{AppError, AppResult};
use tracing::debug;

use super::IamProvisioningService;

impl IamProvisioningService {
    /// Polls until a freshly created user is readable, with doubling delays.
    pub(super) async fn wait_until_user_visible(&self, user_name: &str) -> AppResult<()> {
        let policy = self.visibility;
        let mut delay = policy.initial_delay;
        let mut attempt = 0_u32;

        while attempt < policy.max_attempts {
            attempt = attempt.saturating_add(1);

            if self.iam.user_exists(user_name).await? {
                debug!(user_name = %user_name, attempt, "user visible");
                return Ok(());
            }

            if attempt < policy.max_attempts {
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2).min(policy.max_delay);
            }
        }

        Err(AppError::Timeout(format!(
            "user '{user_name}' was not visible after {} attempts ({:?} total wait)",
            policy.max_attempts,
            policy.max_wait()
        )))
    }
}
