use thiserror::Error;

/// Library errors using thiserror for structured error handling.
///
/// These errors represent domain-specific failures that can occur while
/// driving playback. They provide context and can be chained with anyhow.

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to load audio clip: {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode audio clip: {clip}")]
    DecodeFailed {
        clip: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to initialize audio output stream")]
    StreamInitFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to create output voice")]
    VoiceCreationFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Playback manager has been shut down")]
    ShutDown,
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load settings from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save settings to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("No settings directory available on this platform")]
    NoSettingsDir,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to create config directory: {path}")]
    DirectoryCreationFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No config directory available on this platform")]
    NoConfigDir,
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = AudioError::ShutDown;
        assert_eq!(err.to_string(), "Playback manager has been shut down");

        let err = ConfigError::Invalid("tick_interval_ms must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: tick_interval_ms must be positive"
        );
    }

    #[test]
    fn test_error_source_chain() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = AudioError::LoadFailed {
            path: "/test/click.wav".to_string(),
            source: io_err,
        };

        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "Failed to load audio clip: /test/click.wav");
    }
}
