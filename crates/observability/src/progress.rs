//! Fortschrittsmeldungen als Log-Eintraege

use klarton_audio::{AudioResult, Progress, ProgressObserver};
use tracing::info;

/// Meldet den Fortschritt eines Laufs auf Level `info`
#[derive(Debug, Default)]
pub struct LogProgress {
    meldungen: u64,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anzahl bisheriger Meldungen
    pub fn meldungen(&self) -> u64 {
        self.meldungen
    }
}

impl ProgressObserver for LogProgress {
    fn report(&mut self, progress: &Progress) -> AudioResult<()> {
        self.meldungen += 1;
        info!(
            frames = progress.frames,
            "Verarbeitet: {:.1} Sekunden",
            progress.elapsed_secs
        );
        Ok(())
    }
}
