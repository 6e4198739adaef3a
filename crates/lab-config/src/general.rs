//! General application configuration.

use serde::{Deserialize, Serialize};

/// Default result limit.
const fn default_limit() -> u32 {
    20
}

const fn default_exclude_maintenance() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Default result limit for list commands.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Hide results produced by maintenance workers in result listings.
    #[serde(default = "default_exclude_maintenance")]
    pub exclude_maintenance_results: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            exclude_maintenance_results: default_exclude_maintenance(),
        }
    }
}
