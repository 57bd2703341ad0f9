use super::CrowdwatchConfig;

/// Override file/default settings from `CROWDWATCH_*` environment variables.
///
/// Unparsable values are ignored and the existing setting kept.
pub fn apply_env_overrides(config: &mut CrowdwatchConfig) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

fn apply_overrides_from(config: &mut CrowdwatchConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("CROWDWATCH_BIND_ADDRESS") {
        if !v.trim().is_empty() {
            config.server.bind_address = v;
        }
    }
    if let Some(v) = var("CROWDWATCH_PORT") {
        if let Ok(port) = v.parse::<u16>() {
            config.server.port = port;
        }
    }
    if let Some(v) = var("CROWDWATCH_UPLOAD_DIR") {
        if !v.trim().is_empty() {
            config.media.upload_dir = v.into();
        }
    }
    if let Some(v) = var("CROWDWATCH_SIMULATION_ENABLED") {
        if let Ok(b) = v.parse::<bool>() {
            config.simulation.enabled = b;
        }
    }
    if let Some(v) = var("CROWDWATCH_SIMULATION_INTERVAL_SECONDS") {
        if let Ok(n) = v.parse::<u64>() {
            config.simulation.interval_seconds = n;
        }
    }
}
