//! Audible completion cues for task-timer.
//!
//! This crate provides the best-effort notification capability used when a
//! countdown finishes. Callers hand it the path of a sound file and get back
//! success or a [`NotifyError`]; they are expected to log failures and move
//! on rather than propagate them.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use notify::{Notifier, SoundNotifier};
//!
//! # async fn run() {
//! let notifier = SoundNotifier::platform_default();
//! if let Err(e) = notifier.notify(Path::new("/usr/share/sounds/ding.wav")).await {
//!     eprintln!("no sound: {e}");
//! }
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`Notifier`] trait defines the interface the timer consumes
//! - [`SoundNotifier`] shells out to the platform audio player
//! - [`DisabledNotifier`] does nothing (silent runs, tests)

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bell;
pub mod error;
pub mod sound;

pub use error::NotifyError;
pub use sound::{Player, SoundNotifier};

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

/// Capability that plays a cue when a countdown completes.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Get the name of this notifier.
    fn name(&self) -> &'static str;

    /// Play the given sound file.
    async fn notify(&self, sound: &Path) -> Result<(), NotifyError>;
}

/// Notifier that never makes a sound.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn notify(&self, sound: &Path) -> Result<(), NotifyError> {
        debug!(sound = %sound.display(), "Notifications disabled, skipping cue");
        Ok(())
    }
}
