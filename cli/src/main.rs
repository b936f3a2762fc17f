//! Klarton – Einstiegspunkt
//!
//! Laedt die Konfiguration, uebernimmt die Kommandozeilen-Argumente,
//! initialisiert das Logging und startet den Lauf.

use anyhow::Result;
use clap::Parser;
use klarton_cli::config::{Args, ToolConfig};
use klarton_observability::logging_initialisieren;

fn main() -> Result<()> {
    let args = Args::parse();

    // Konfiguration laden (Standardwerte falls Datei fehlt), dann Argumente anwenden
    let datei = ToolConfig::laden(&args.config)?;
    let gefunden = datei.is_some();
    let config = datei.unwrap_or_default().mit_argumenten(&args)?;

    logging_initialisieren(&config.logging.level, &config.logging.format)?;
    if !gefunden {
        tracing::warn!(
            pfad = %args.config.display(),
            "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
        );
    }
    config.validieren()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        "Klarton wird gestartet"
    );

    let summary = klarton_cli::ausfuehren(&config)?;

    println!(
        "Total processed: {:.1} seconds ({} frames)",
        summary.elapsed_secs, summary.frames
    );
    Ok(())
}
