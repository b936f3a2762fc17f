//! Werkzeug-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen und danach mit den
//! Kommandozeilen-Argumenten ueberschrieben. Alle Felder haben
//! Standardwerte, sodass das Werkzeug ohne Konfigurationsdatei laeuft.

use std::path::{Path, PathBuf};

use clap::Parser;
use klarton_audio::requires_far_end;
use klarton_core::{KlartonError, PipelineConfig, ProcessingMode};
use klarton_observability::{log_format_gueltig, log_level_gueltig};
use serde::{Deserialize, Serialize};

/// Kommandozeilen-Argumente
#[derive(Parser, Debug)]
#[command(name = "klarton")]
#[command(about = "Echo- und Rauschunterdrueckung fuer rohe A-law-Aufnahmen")]
#[command(version)]
pub struct Args {
    /// Konfigurationsdatei (TOML)
    #[arg(long, env = "KLARTON_CONFIG", default_value = "klarton.toml")]
    pub config: PathBuf,

    /// Mikrofon-Aufnahme (A-law)
    #[arg(long)]
    pub mic: Option<PathBuf>,

    /// Lautsprecher-Referenz (A-law)
    #[arg(long)]
    pub speaker: Option<PathBuf>,

    /// Ausgabedatei (A-law)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Vorherigen Referenz-Frame verwenden (Verzoegerungsausgleich)
    #[arg(long)]
    pub prev_speaker: bool,

    /// Erst Rauschunterdrueckung, dann Echounterdrueckung
    #[arg(long)]
    pub ns_first: bool,

    /// Nur Rauschunterdrueckung
    #[arg(long)]
    pub ns_only: bool,

    /// Nur Echounterdrueckung
    #[arg(long)]
    pub aec_only: bool,

    /// Keine Verarbeitung
    #[arg(long)]
    pub bypass: bool,

    /// Nur A-law dekodieren und wieder kodieren
    #[arg(long)]
    pub test_alaw: bool,

    /// Modus per Name (z.B. aec-first, ns-only)
    #[arg(long)]
    pub mode: Option<ProcessingMode>,

    /// Abtastrate in Hz
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Samples pro Frame
    #[arg(long)]
    pub frame_size: Option<usize>,

    /// Echo-Nachhall in Millisekunden
    #[arg(long)]
    pub echo_tail: Option<u32>,

    /// Filterlaenge in Samples (> 0 ueberschreibt --echo-tail)
    #[arg(long)]
    pub filter_len: Option<usize>,

    /// Fortschritts-Intervall in Sekunden (<= 0 deaktiviert)
    #[arg(long, allow_negative_numbers = true)]
    pub progress_sec: Option<f64>,

    /// Maximale Rauschdaempfung in dB (negativ)
    #[arg(long, allow_negative_numbers = true)]
    pub noise_suppress: Option<f64>,

    /// Voice Activity Detection aktivieren
    #[arg(long)]
    pub vad: bool,

    /// VAD-Startschwelle (0-100)
    #[arg(long)]
    pub vad_prob_start: Option<u8>,

    /// VAD-Fortsetzungsschwelle (0-100)
    #[arg(long)]
    pub vad_prob_continue: Option<u8>,

    /// Automatic Gain Control aktivieren
    #[arg(long)]
    pub agc: bool,

    /// AGC-Zielpegel
    #[arg(long)]
    pub agc_level: Option<f64>,

    /// Log-Level (trace/debug/info/warn/error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log-Format (text/json)
    #[arg(long)]
    pub log_format: Option<String>,
}

impl Args {
    /// Modus aus den Flags; mehr als ein gesetzter Modus ist ein Fehler
    pub fn modus(&self) -> Result<Option<ProcessingMode>, KlartonError> {
        let flags = [
            ("--ns-first", self.ns_first, ProcessingMode::NoiseSuppressThenEcho),
            ("--ns-only", self.ns_only, ProcessingMode::NoiseSuppressOnly),
            ("--aec-only", self.aec_only, ProcessingMode::EchoCancelOnly),
            ("--bypass", self.bypass, ProcessingMode::Bypass),
            ("--test-alaw", self.test_alaw, ProcessingMode::CodecRoundtripTest),
        ];
        let mut gesetzt: Vec<(&str, ProcessingMode)> = flags
            .into_iter()
            .filter(|(_, aktiv, _)| *aktiv)
            .map(|(name, _, modus)| (name, modus))
            .collect();
        if let Some(modus) = self.mode {
            gesetzt.push(("--mode", modus));
        }

        match gesetzt.as_slice() {
            [] => Ok(None),
            [(_, modus)] => Ok(Some(*modus)),
            mehrere => Err(KlartonError::ModusKonflikt(
                mehrere
                    .iter()
                    .map(|(name, _)| *name)
                    .collect::<Vec<_>>()
                    .join(", "),
            )),
        }
    }
}

/// Vollstaendige Werkzeug-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Ein- und Ausgabedateien
    pub dateien: DateiEinstellungen,
    /// Modus und Pipeline-Parameter
    pub verarbeitung: VerarbeitungsEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Ein- und Ausgabedateien
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DateiEinstellungen {
    /// Mikrofon-Aufnahme (Pflicht)
    pub mikrofon: Option<PathBuf>,
    /// Lautsprecher-Referenz (Pflicht in Modi mit Echounterdrueckung)
    pub lautsprecher: Option<PathBuf>,
    /// Ausgabedatei
    pub ausgabe: PathBuf,
}

impl Default for DateiEinstellungen {
    fn default() -> Self {
        Self {
            mikrofon: None,
            lautsprecher: None,
            ausgabe: PathBuf::from("output.alaw"),
        }
    }
}

/// Modus und Pipeline-Parameter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerarbeitungsEinstellungen {
    pub modus: ProcessingMode,
    #[serde(flatten)]
    pub pipeline: PipelineConfig,
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ToolConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// `None` wenn die Datei nicht existiert; der Aufrufer faellt dann auf
    /// die Standardwerte zurueck.
    pub fn laden(pfad: &Path) -> anyhow::Result<Option<Self>> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt).map_err(|e| {
                    anyhow::anyhow!("Konfigurationsfehler in '{}': {e}", pfad.display())
                })?;
                Ok(Some(config))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{}' nicht lesbar: {e}",
                pfad.display()
            )),
        }
    }

    /// Ueberschreibt Werte mit den gesetzten Kommandozeilen-Argumenten
    pub fn mit_argumenten(mut self, args: &Args) -> Result<Self, KlartonError> {
        if let Some(modus) = args.modus()? {
            self.verarbeitung.modus = modus;
        }

        if let Some(mic) = &args.mic {
            self.dateien.mikrofon = Some(mic.clone());
        }
        if let Some(speaker) = &args.speaker {
            self.dateien.lautsprecher = Some(speaker.clone());
        }
        if let Some(output) = &args.output {
            self.dateien.ausgabe = output.clone();
        }

        let p = &mut self.verarbeitung.pipeline;
        if args.prev_speaker {
            p.delay_compensation = true;
        }
        if let Some(v) = args.sample_rate {
            p.sample_rate = v;
        }
        if let Some(v) = args.frame_size {
            p.frame_size = v;
        }
        if let Some(v) = args.echo_tail {
            p.echo_tail_ms = v;
        }
        if let Some(v) = args.filter_len.filter(|&n| n > 0) {
            p.filter_length = Some(v);
        }
        if let Some(v) = args.progress_sec {
            p.progress_interval_secs = v;
        }

        let ns = &mut p.rauschunterdrueckung;
        if let Some(v) = args.noise_suppress {
            ns.suppress_db = v;
        }
        if args.vad {
            ns.vad_enabled = true;
        }
        if let Some(v) = args.vad_prob_start {
            ns.vad_prob_start = v;
        }
        if let Some(v) = args.vad_prob_continue {
            ns.vad_prob_continue = v;
        }
        if args.agc {
            ns.agc_enabled = true;
        }
        if let Some(v) = args.agc_level {
            ns.agc_level = v;
        }

        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }
        if let Some(format) = &args.log_format {
            self.logging.format = format.clone();
        }

        Ok(self)
    }

    /// Prueft Dateien, Pipeline-Parameter und Logging vor dem ersten Frame
    pub fn validieren(&self) -> Result<(), KlartonError> {
        let modus = self.verarbeitung.modus;
        if self.dateien.mikrofon.is_none() {
            return Err(KlartonError::konfiguration(
                "Mikrofon-Datei fehlt (--mic)",
            ));
        }
        if requires_far_end(modus) && self.dateien.lautsprecher.is_none() {
            return Err(KlartonError::konfiguration(format!(
                "Modus {modus} benoetigt eine Lautsprecher-Datei (--speaker)"
            )));
        }
        if !log_level_gueltig(&self.logging.level) {
            return Err(KlartonError::konfiguration(format!(
                "Unbekannter Log-Level: {}",
                self.logging.level
            )));
        }
        if !log_format_gueltig(&self.logging.format) {
            return Err(KlartonError::konfiguration(format!(
                "Unbekanntes Log-Format: {}",
                self.logging.format
            )));
        }
        self.verarbeitung.pipeline.validieren()
    }
}
