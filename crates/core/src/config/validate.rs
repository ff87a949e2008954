use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - At least one probe backend, with a non-zero timeout
/// - Recompute progress buffer is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.probe.backends.is_empty() {
        return Err(ConfigError::ValidationError(
            "probe.backends must list at least one backend".to_string(),
        ));
    }

    if config.probe.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "probe.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.recompute.progress_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "recompute.progress_buffer cannot be 0".to_string(),
        ));
    }

    Ok(())
}
