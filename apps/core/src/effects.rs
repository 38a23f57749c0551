//! Concrete alert and notification effects for a terminal host.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use crate::actors::traits::{AlertEffect, NotifyEffect};
use crate::error::AppError;
use crate::sound::{encode_wav, synthesize_faaah, SAMPLE_RATE};

pub const TOAST_TITLE: &str = "REJECTION DETECTED";
pub const TOAST_FOOTER: &str = "You'll get 'em next time, champ.";

/// File name of the rendered alert clip inside the data directory
pub const CLIP_FILENAME: &str = "faaah.wav";

/// Command line players tried in order
pub const PLAYERS: &[&str] = &["paplay", "pw-play", "aplay", "afplay"];

/// Write `bytes` and flush, reporting failures as an effect error.
fn write_effect(out: &mut impl Write, bytes: &[u8]) -> Result<(), AppError> {
    out.write_all(bytes)
        .and_then(|_| out.flush())
        .map_err(|e| AppError::Effect(format!("Terminal write failed: {}", e)))
}

/// Rings the terminal bell.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl TerminalBell {
    pub fn ring(out: &mut impl Write) -> Result<(), AppError> {
        write_effect(out, b"\x07")
    }
}

impl AlertEffect for TerminalBell {
    fn play(&self) -> Result<(), AppError> {
        Self::ring(&mut io::stdout().lock())
    }
}

/// Plays the rendered "FAAAAHHHHH" clip through a command line player.
///
/// Without a player on `PATH`, or when the clip cannot be written, it rings
/// the terminal bell instead.
#[derive(Debug, Clone)]
pub struct SoundAlert {
    clip: PathBuf,
    player: Option<PathBuf>,
}

impl SoundAlert {
    /// Render the clip into `data_dir` and look up a player.
    pub fn prepare(data_dir: &Path) -> Self {
        let clip = data_dir.join(CLIP_FILENAME);
        let player = match Self::write_clip(&clip) {
            Ok(()) => Self::find_player(),
            Err(e) => {
                warn!("Could not write alert clip {:?}: {}", clip, e);
                None
            }
        };
        if player.is_none() {
            warn!("No audio player found, alerts will ring the terminal bell");
        }
        Self { clip, player }
    }

    pub fn with_player(clip: impl Into<PathBuf>, player: Option<PathBuf>) -> Self {
        Self {
            clip: clip.into(),
            player,
        }
    }

    pub fn clip(&self) -> &Path {
        &self.clip
    }

    pub fn player(&self) -> Option<&Path> {
        self.player.as_deref()
    }

    fn write_clip(path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, encode_wav(&synthesize_faaah(SAMPLE_RATE), SAMPLE_RATE))?;
        Ok(())
    }

    fn find_player() -> Option<PathBuf> {
        PLAYERS.iter().find_map(|name| which::which(name).ok())
    }
}

impl AlertEffect for SoundAlert {
    fn play(&self) -> Result<(), AppError> {
        let Some(player) = &self.player else {
            return TerminalBell.play();
        };

        let mut child = Command::new(player)
            .arg(&self.clip)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AppError::Effect(format!("Failed to start {:?}: {}", player, e)))?;
        debug!(pid = child.id(), "Alert clip playing");

        // Reap the player without blocking the caller
        std::thread::spawn(move || {
            if let Err(e) = child.wait() {
                warn!("Alert player did not exit cleanly: {}", e);
            }
        });
        Ok(())
    }
}

/// Alert that only logs; for hosts without a terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlert;

impl AlertEffect for LogAlert {
    fn play(&self) -> Result<(), AppError> {
        warn!("FAAAAHHHHH");
        Ok(())
    }
}

/// Prints a framed toast to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleToast;

impl ConsoleToast {
    /// Text lines of the toast for `count` rejections
    pub fn render(count: u64) -> Vec<String> {
        vec![
            TOAST_TITLE.to_string(),
            format!("Total rejections today: {}", count),
            TOAST_FOOTER.to_string(),
        ]
    }

    fn framed(count: u64) -> String {
        let lines = Self::render(count);
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let border = format!("+{}+", "-".repeat(width + 2));

        let mut out = String::new();
        out.push_str(&border);
        out.push('\n');
        for line in &lines {
            out.push_str(&format!("| {:<width$} |\n", line, width = width));
        }
        out.push_str(&border);
        out.push('\n');
        out
    }
}

impl NotifyEffect for ConsoleToast {
    fn notify(&self, count: u64) -> Result<(), AppError> {
        write_effect(&mut io::stdout().lock(), Self::framed(count).as_bytes())
    }
}

/// Notification through the tracing pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotifyEffect for LogNotifier {
    fn notify(&self, count: u64) -> Result<(), AppError> {
        info!(count, "{} - Total rejections today: {}", TOAST_TITLE, count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_text() {
        let lines = ConsoleToast::render(3);
        assert_eq!(lines[0], "REJECTION DETECTED");
        assert_eq!(lines[1], "Total rejections today: 3");
        assert_eq!(lines[2], TOAST_FOOTER);
    }

    #[test]
    fn test_toast_frame_is_aligned() {
        let framed = ConsoleToast::framed(12);
        let widths: Vec<usize> = framed.lines().map(|l| l.chars().count()).collect();
        assert_eq!(widths.len(), 5);
        assert!(widths.iter().all(|w| *w == widths[0]));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_bell_writes_bel() {
        let mut out = Vec::new();
        TerminalBell::ring(&mut out).unwrap();
        assert_eq!(out, b"\x07");
    }

    #[test]
    fn test_write_failure_is_effect_error() {
        let result = TerminalBell::ring(&mut BrokenPipe);
        assert!(matches!(result, Err(AppError::Effect(_))));
    }

    #[test]
    fn test_sound_alert_writes_clip() {
        let dir = tempfile::tempdir().unwrap();
        let alert = SoundAlert::prepare(&dir.path().join("data"));

        let bytes = fs::read(alert.clip()).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
    }

    #[test]
    fn test_sound_alert_reports_missing_player() {
        let dir = tempfile::tempdir().unwrap();
        let alert = SoundAlert::with_player(
            dir.path().join(CLIP_FILENAME),
            Some(dir.path().join("no-such-player")),
        );

        assert!(matches!(alert.play(), Err(AppError::Effect(_))));
    }

    #[test]
    fn test_log_effects_never_fail() {
        assert!(LogAlert.play().is_ok());
        assert!(LogNotifier.notify(1).is_ok());
    }
}
