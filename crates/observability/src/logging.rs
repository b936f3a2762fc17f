//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable:
//! - `KLARTON_LOG_LEVEL`: Log-Level oder Filter-Direktive, Standard: info
//! - `KLARTON_LOG_FORMAT`: Format (text/json), Standard: text
//!
//! Die Umgebung hat Vorrang vor den Werten aus der Konfiguration. Logs gehen
//! nach stderr, damit stdout frei fuer Ergebnisse bleibt.

use anyhow::anyhow;
use tracing_subscriber::{fmt, EnvFilter};

pub const ENV_LOG_LEVEL: &str = "KLARTON_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "KLARTON_LOG_FORMAT";

/// Initialisiert das Logging-System.
///
/// Schlaegt fehl, wenn bereits ein globaler Subscriber gesetzt ist.
pub fn logging_initialisieren(level: &str, format: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(ENV_LOG_LEVEL)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let ergebnis = match log_format_waehlen(std::env::var(ENV_LOG_FORMAT).ok(), format) {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .try_init(),
        _ => fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    ergebnis.map_err(|e| anyhow!("Logging konnte nicht initialisiert werden: {e}"))
}

/// Waehlt das Log-Format: Umgebung vor Konfiguration, unbekannte Werte -> text
pub fn log_format_waehlen(env: Option<String>, konfig: &str) -> &'static str {
    let gewaehlt = env.unwrap_or_else(|| konfig.to_string());
    if gewaehlt == "json" {
        "json"
    } else {
        "text"
    }
}

/// Validiert ob ein Log-Level-String gueltig ist.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}
