use super::{types::Config, ConfigError};

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}

/// Validate configuration
/// Currently validates:
/// - Tool paths and codecs are not empty
/// - Timeouts are not 0
/// - The default download name cannot escape its directory
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let converter = &config.converter;
    if converter.ffmpeg_path.as_os_str().is_empty() {
        return Err(invalid("converter.ffmpeg_path cannot be empty"));
    }
    if converter.ffprobe_path.as_os_str().is_empty() {
        return Err(invalid("converter.ffprobe_path cannot be empty"));
    }
    if converter.video_codec.trim().is_empty() || converter.audio_codec.trim().is_empty() {
        return Err(invalid("converter codecs cannot be empty"));
    }
    if converter.timeout_secs == 0 {
        return Err(invalid("converter.timeout_secs cannot be 0"));
    }

    let resolver = &config.resolver;
    if resolver.ytdlp_path.as_os_str().is_empty() {
        return Err(invalid("resolver.ytdlp_path cannot be empty"));
    }
    if resolver.format.trim().is_empty() {
        return Err(invalid("resolver.format cannot be empty"));
    }
    if resolver.socket_timeout_secs == 0 || resolver.thumbnail_timeout_secs == 0 {
        return Err(invalid("resolver timeouts cannot be 0"));
    }
    let name = resolver.default_filename.trim();
    if name.is_empty() || name.contains(['/', '\\']) {
        return Err(invalid(
            "resolver.default_filename must be a plain, non-empty file name",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_timeout_zero_fails() {
        let mut config = Config::default();
        config.converter.timeout_secs = 0;
        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_empty_path_fails() {
        let mut config = Config::default();
        config.resolver.ytdlp_path = PathBuf::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_default_filename() {
        let mut config = Config::default();
        config.resolver.default_filename = "../video".to_string();
        assert!(validate_config(&config).is_err());

        config.resolver.default_filename = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }
}
