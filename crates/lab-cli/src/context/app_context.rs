use anyhow::Context;
use lab_config::LabConfig;
use lab_core::entities::User;
use lab_db::service::LabService;

use crate::cli::GlobalFlags;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: LabService,
    pub config: LabConfig,
}

impl AppContext {
    /// Open the database, trail and asset root named by the configuration.
    pub async fn init(config: LabConfig) -> anyhow::Result<Self> {
        let service = LabService::from_config(&config)
            .await
            .context("failed to initialize lab-db service")?;
        tracing::debug!(
            db = %config.storage.db_path,
            assets = %config.storage.assets_dir,
            "context: service ready"
        );
        Ok(Self { service, config })
    }

    /// The user named by `--as`.
    pub async fn actor(&self, flags: &GlobalFlags) -> anyhow::Result<User> {
        let email = flags
            .actor
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("this command needs --as <email> to name the acting user"))?;
        self.service
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| anyhow::anyhow!("no user with email '{email}'. Run 'lab user add' first."))
    }

    /// Id recorded as the actor of result-level changes: the `--as` user if
    /// given, otherwise the literal `cli`.
    pub async fn actor_id(&self, flags: &GlobalFlags) -> anyhow::Result<String> {
        if flags.actor.is_some() {
            Ok(self.actor(flags).await?.id)
        } else {
            Ok(String::from("cli"))
        }
    }
}
