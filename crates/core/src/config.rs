//! Pipeline-Konfiguration
//!
//! Wird einmal vor dem ersten Frame erstellt und ist danach unveraenderlich.
//! Alle Felder haben die Standardwerte des Werkzeugs, sodass eine leere
//! Konfigurationsdatei gueltig ist.

use serde::{Deserialize, Serialize};

use crate::error::{KlartonError, Result};

/// Einstellungen der Rauschunterdrueckung (inkl. VAD und AGC)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NsConfig {
    /// Maximale Rauschdaempfung in dB (negativer = staerker)
    pub suppress_db: f64,
    /// Voice Activity Detection aktivieren
    pub vad_enabled: bool,
    /// Sprachwahrscheinlichkeit (0-100) ab der Sprache beginnt
    pub vad_prob_start: u8,
    /// Sprachwahrscheinlichkeit (0-100) die laufende Sprache haelt
    pub vad_prob_continue: u8,
    /// Automatic Gain Control aktivieren
    pub agc_enabled: bool,
    /// AGC-Zielpegel (RMS im 16-Bit-Bereich)
    pub agc_level: f64,
}

impl Default for NsConfig {
    fn default() -> Self {
        Self {
            suppress_db: -15.0,
            vad_enabled: false,
            vad_prob_start: 80,
            vad_prob_continue: 65,
            agc_enabled: false,
            agc_level: 30000.0,
        }
    }
}

impl NsConfig {
    /// Einstellungen des an die Echounterdrueckung gekoppelten Preprocessors:
    /// Denoise mit Standardpegel plus AGC auf den Standard-Zielpegel.
    pub fn echo_gekoppelt() -> Self {
        Self {
            agc_enabled: true,
            agc_level: 8000.0,
            ..Self::default()
        }
    }

    /// Validiert die Einstellungen. VAD- und AGC-Werte werden nur geprueft,
    /// wenn die jeweilige Funktion aktiviert ist.
    pub fn validieren(&self) -> Result<()> {
        if !self.suppress_db.is_finite() || self.suppress_db > 0.0 {
            return Err(KlartonError::konfiguration(format!(
                "Rauschunterdrueckung muss ein Wert <= 0 dB sein (war: {})",
                self.suppress_db
            )));
        }
        if self.vad_enabled {
            for (name, wert) in [
                ("vad_prob_start", self.vad_prob_start),
                ("vad_prob_continue", self.vad_prob_continue),
            ] {
                if wert > 100 {
                    return Err(KlartonError::konfiguration(format!(
                        "{name} muss zwischen 0 und 100 liegen (war: {wert})"
                    )));
                }
            }
        }
        if self.agc_enabled && !(self.agc_level.is_finite() && self.agc_level > 0.0) {
            return Err(KlartonError::konfiguration(format!(
                "AGC-Zielpegel muss positiv sein (war: {})",
                self.agc_level
            )));
        }
        Ok(())
    }
}

/// Unveraenderliche Einstellungen eines Verarbeitungslaufs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Abtastrate in Hz
    pub sample_rate: u32,
    /// Samples pro Frame
    pub frame_size: usize,
    /// Laenge des Echo-Nachhalls in Millisekunden
    pub echo_tail_ms: u32,
    /// Explizite Filterlaenge in Samples, ueberschreibt `echo_tail_ms`
    pub filter_length: Option<usize>,
    /// Vorherigen Referenz-Frame verwenden (Verzoegerungsausgleich)
    pub delay_compensation: bool,
    /// Fortschritts-Intervall in Sekunden (<= 0 deaktiviert)
    pub progress_interval_secs: f64,
    /// Rauschunterdrueckung
    pub rauschunterdrueckung: NsConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            frame_size: 320,
            echo_tail_ms: 200,
            filter_length: None,
            delay_compensation: false,
            progress_interval_secs: 16.0,
            rauschunterdrueckung: NsConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Filterlaenge in Samples: explizit gesetzt (> 0) oder aus dem Echo-Nachhall abgeleitet
    pub fn effective_filter_length(&self) -> usize {
        match self.filter_length {
            Some(len) if len > 0 => len,
            _ => (u64::from(self.sample_rate) * u64::from(self.echo_tail_ms) / 1000) as usize,
        }
    }

    /// Frame-Dauer in Millisekunden
    pub fn frame_ms(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_size as f64 / f64::from(self.sample_rate) * 1000.0
    }

    /// Anzahl Frames zwischen zwei Fortschrittsmeldungen, `None` wenn deaktiviert
    pub fn frames_per_progress(&self) -> Option<u64> {
        if self.progress_interval_secs.is_nan()
            || self.progress_interval_secs <= 0.0
            || self.frame_size == 0
        {
            return None;
        }
        let frames = (f64::from(self.sample_rate) / self.frame_size as f64
            * self.progress_interval_secs)
            .round();
        Some(if frames >= 1.0 { frames as u64 } else { 1 })
    }

    /// Validiert die Konfiguration
    pub fn validieren(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(KlartonError::konfiguration("Abtastrate muss positiv sein"));
        }
        if self.frame_size == 0 {
            return Err(KlartonError::konfiguration("Frame-Groesse muss positiv sein"));
        }
        if self.effective_filter_length() == 0 {
            return Err(KlartonError::konfiguration(format!(
                "Filterlaenge muss positiv sein (echo_tail_ms={}, filter_length={:?})",
                self.echo_tail_ms, self.filter_length
            )));
        }
        if self.progress_interval_secs.is_nan() {
            return Err(KlartonError::konfiguration(
                "Fortschritts-Intervall ist keine Zahl",
            ));
        }
        self.rauschunterdrueckung.validieren()
    }
}
