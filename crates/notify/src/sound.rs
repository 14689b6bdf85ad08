//! Sound playback through the platform audio player.
//!
//! On macOS, uses `afplay`.
//! On Linux, tries `paplay` (PulseAudio) first, then `aplay` (ALSA).

use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::bell;
use crate::error::NotifyError;
use crate::Notifier;

/// Upper bound on a single playback.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// An external program able to play a sound file.
#[derive(Debug, Clone)]
pub struct Player {
    pub program: String,
    pub args: Vec<String>,
}

impl Player {
    /// Create a player invoked as `program [args..] <sound>`.
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
        }
    }
}

/// Plays the sound file with the first player that succeeds.
#[derive(Debug, Clone)]
pub struct SoundNotifier {
    players: Vec<Player>,
    timeout: Duration,
    bell_fallback: bool,
}

impl SoundNotifier {
    /// Players appropriate for the current platform.
    #[must_use]
    pub fn platform_default() -> Self {
        Self::with_players(platform_players())
    }

    /// Use an explicit list of candidate players, tried in order.
    #[must_use]
    pub fn with_players(players: Vec<Player>) -> Self {
        Self {
            players,
            timeout: DEFAULT_TIMEOUT,
            bell_fallback: true,
        }
    }

    /// Override the playback timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Ring the terminal bell when the sound file is missing.
    #[must_use]
    pub fn with_bell_fallback(mut self, enabled: bool) -> Self {
        self.bell_fallback = enabled;
        self
    }

    async fn play_with(&self, player: &Player, sound: &Path) -> Result<(), NotifyError> {
        let mut child = Command::new(&player.program)
            .args(&player.args)
            .arg(sound)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| NotifyError::Spawn {
                player: player.program.clone(),
                source,
            })?;

        if let Ok(status) = tokio::time::timeout(self.timeout, child.wait()).await {
            let status = status.map_err(|source| NotifyError::Spawn {
                player: player.program.clone(),
                source,
            })?;
            if status.success() {
                Ok(())
            } else {
                Err(NotifyError::PlayerFailed {
                    player: player.program.clone(),
                    status: status.to_string(),
                })
            }
        } else {
            let _ = child.kill().await;
            Err(NotifyError::Timeout {
                secs: self.timeout.as_secs(),
            })
        }
    }
}

impl Default for SoundNotifier {
    fn default() -> Self {
        Self::platform_default()
    }
}

#[async_trait]
impl Notifier for SoundNotifier {
    fn name(&self) -> &'static str {
        "sound"
    }

    async fn notify(&self, sound: &Path) -> Result<(), NotifyError> {
        if !sound.exists() {
            if self.bell_fallback {
                bell::ring();
            }
            return Err(NotifyError::SoundFileMissing {
                path: sound.to_path_buf(),
            });
        }

        for player in &self.players {
            match self.play_with(player, sound).await {
                Ok(()) => {
                    debug!(player = %player.program, "Played completion sound");
                    return Ok(());
                }
                Err(e @ NotifyError::Timeout { .. }) => {
                    warn!(player = %player.program, error = %e, "Playback timed out");
                    return Err(e);
                }
                Err(NotifyError::Spawn { ref source, .. }) if source.kind() == ErrorKind::NotFound => {
                    debug!(player = %player.program, "Player not installed, trying next");
                }
                Err(e) => {
                    debug!(player = %player.program, error = %e, "Player failed, trying next");
                }
            }
        }

        Err(NotifyError::NoPlayer {
            tried: self
                .players
                .iter()
                .map(|p| p.program.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

#[cfg(target_os = "macos")]
fn platform_players() -> Vec<Player> {
    vec![Player::new("afplay", &[])]
}

#[cfg(target_os = "linux")]
fn platform_players() -> Vec<Player> {
    vec![Player::new("paplay", &[]), Player::new("aplay", &["-q"])]
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn platform_players() -> Vec<Player> {
    Vec::new()
}
