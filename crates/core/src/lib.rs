//! klarton-core – Gemeinsame Typen, Konfiguration und Fehlertypen
//!
//! Dieses Crate stellt die Bausteine bereit, die von der Audio-Verarbeitung
//! und dem Kommandozeilen-Werkzeug gemeinsam genutzt werden: den
//! Verarbeitungsmodus, die unveraenderliche Pipeline-Konfiguration und den
//! zentralen Fehlertyp.

pub mod config;
pub mod error;
pub mod mode;

// Re-Exporte fuer bequemen Zugriff
pub use config::{NsConfig, PipelineConfig};
pub use error::{KlartonError, Result};
pub use mode::ProcessingMode;
