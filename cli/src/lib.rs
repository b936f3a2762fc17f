//! klarton-cli – Bibliotheks-Root
//!
//! Oeffnet die Dateien eines Laufs, baut die Frame-Pipeline mit der
//! eingebauten Engine und stellt den Einstiegspunkt fuer
//! Integrationstests bereit.

pub mod config;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;

use anyhow::{Context, Result};
use klarton_audio::{requires_far_end, BuiltinEngines, FramePipeline, RunSummary};
use klarton_observability::LogProgress;

use config::ToolConfig;

fn oeffnen(pfad: &Path, rolle: &str) -> Result<BufReader<File>> {
    let datei = File::open(pfad)
        .with_context(|| format!("{rolle}-Datei '{}' nicht lesbar", pfad.display()))?;
    Ok(BufReader::new(datei))
}

/// Fuehrt einen vollstaendigen Lauf mit einer validierten Konfiguration aus
pub fn ausfuehren(config: &ToolConfig) -> Result<RunSummary> {
    let modus = config.verarbeitung.modus;

    let mic = config
        .dateien
        .mikrofon
        .as_deref()
        .context("Mikrofon-Datei fehlt")?;
    let near = oeffnen(mic, "Mikrofon")?;

    let mut far = if requires_far_end(modus) {
        let speaker = config
            .dateien
            .lautsprecher
            .as_deref()
            .with_context(|| format!("Modus {modus} benoetigt eine Lautsprecher-Datei"))?;
        Some(oeffnen(speaker, "Lautsprecher")?)
    } else {
        None
    };

    let ausgabe = &config.dateien.ausgabe;
    let out = BufWriter::new(File::create(ausgabe).with_context(|| {
        format!("Ausgabedatei '{}' nicht anlegbar", ausgabe.display())
    })?);

    tracing::info!(
        mikrofon = %mic.display(),
        ausgabe = %ausgabe.display(),
        modus = %modus,
        "Dateien geoeffnet"
    );

    let mut pipeline = FramePipeline::new(
        modus,
        config.verarbeitung.pipeline.clone(),
        &BuiltinEngines,
    )
    .context("Pipeline konnte nicht erstellt werden")?;

    let summary = pipeline
        .run(
            near,
            far.as_mut().map(|f| f as &mut dyn Read),
            out,
            &mut LogProgress::new(),
        )
        .context("Verarbeitung abgebrochen")?;

    Ok(summary)
}
