//! Fehlertypen fuer Klarton
//!
//! Zentraler Fehler-Enum fuer alles, was vor dem Start der Verarbeitung
//! schiefgehen kann. Die Audio-Crate konvertiert ihn via `#[from]`.

use thiserror::Error;

/// Globaler Result-Alias fuer Klarton
pub type Result<T> = std::result::Result<T, KlartonError>;

/// Fehler die vor oder ausserhalb der Frame-Verarbeitung auftreten
#[derive(Debug, Error)]
pub enum KlartonError {
    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    #[error("Unbekannter Verarbeitungsmodus: '{0}'")]
    UnbekannterModus(String),

    #[error("Modus-Optionen schliessen sich gegenseitig aus: {0}")]
    ModusKonflikt(String),

    // --- Intern ---
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl KlartonError {
    /// Erstellt einen Konfigurationsfehler aus einer beliebigen Nachricht
    pub fn konfiguration(msg: impl Into<String>) -> Self {
        Self::Konfiguration(msg.into())
    }

    /// Gibt true zurueck wenn der Fehler aus der Konfiguration stammt
    pub fn ist_konfigurationsfehler(&self) -> bool {
        matches!(
            self,
            Self::Konfiguration(_) | Self::UnbekannterModus(_) | Self::ModusKonflikt(_)
        )
    }
}
