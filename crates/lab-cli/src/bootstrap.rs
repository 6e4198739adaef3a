use anyhow::Context;
use lab_config::LabConfig;

/// Load `.env` from the current directory (if any), then the layered config.
pub fn load_config() -> anyhow::Result<LabConfig> {
    let env_path = std::env::current_dir()
        .context("failed to determine current directory")?
        .join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    }

    LabConfig::load().map_err(anyhow::Error::from)
}
