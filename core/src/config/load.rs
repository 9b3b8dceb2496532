use std::path::Path;

use super::types::SchedulerConfig;

/// Load a scheduler configuration from a TOML file. Missing keys fall back
/// to their serde defaults.
pub fn load_path(path: &Path) -> anyhow::Result<SchedulerConfig> {
    let s = std::fs::read_to_string(path)?;
    let cfg = toml::from_str::<SchedulerConfig>(&s)?;
    Ok(cfg)
}
