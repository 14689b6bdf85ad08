//! Error types for the notification system.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while playing a completion cue.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The configured sound file does not exist
    #[error("Sound file not found: {}", path.display())]
    SoundFileMissing { path: PathBuf },

    /// Every candidate audio player was missing or failed
    #[error("No audio player available (tried: {tried})")]
    NoPlayer { tried: String },

    /// The player process could not be spawned
    #[error("Failed to start '{player}': {source}")]
    Spawn {
        player: String,
        #[source]
        source: std::io::Error,
    },

    /// The player ran but reported failure
    #[error("'{player}' exited with status {status}")]
    PlayerFailed { player: String, status: String },

    /// Playback did not finish in time
    #[error("Playback timed out after {secs}s")]
    Timeout { secs: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NotifyError::SoundFileMissing {
            path: PathBuf::from("/tmp/ding.wav"),
        };
        assert_eq!(err.to_string(), "Sound file not found: /tmp/ding.wav");

        let err = NotifyError::Timeout { secs: 10 };
        assert_eq!(err.to_string(), "Playback timed out after 10s");
    }
}
