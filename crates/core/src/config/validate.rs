use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Upload limit and output pixel budget are not 0
/// - Qualities are within 1..=100
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.transform.max_upload_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "transform.max_upload_bytes cannot be 0".to_string(),
        ));
    }

    if config.transform.max_output_pixels == 0 {
        return Err(ConfigError::ValidationError(
            "transform.max_output_pixels cannot be 0".to_string(),
        ));
    }

    for (name, value) in [
        ("transform.default_quality", config.transform.default_quality),
        ("transform.resize_quality", config.transform.resize_quality),
    ] {
        if !(1..=100).contains(&value) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be between 1 and 100, got {}",
                name, value
            )));
        }
    }

    Ok(())
}
