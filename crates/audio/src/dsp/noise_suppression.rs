//! Rauschunterdrueckung via spektrale Subtraktion (Zeitbereich-Naeherung)
//!
//! Schaetzt den Rauschpegel waehrend leiser Frames und daempft jeden Frame
//! um einen daraus abgeleiteten Gain. Die maximale Daempfung wird in dB
//! vorgegeben und begrenzt den Gain nach unten.

use super::AudioProcessor;

/// Subtraktions-Faktor
const ALPHA: f32 = 2.5;

/// Rechnet eine Daempfung in dB in einen linearen Gain um
pub fn db_to_gain(db: f64) -> f32 {
    10f64.powf(db / 20.0) as f32
}

/// Rauschunterdruecker
///
/// Der geschaetzte Rauschpegel wird per exponentieller Glaettung aktualisiert;
/// der Gain ist `max(floor, 1 - alpha * noise / signal)`.
pub struct NoiseSuppressor {
    /// Minimaler Gain (aus der maximalen Daempfung in dB)
    floor: f32,
    /// Geschaetzter Rauschpegel (RMS)
    noise_estimate: f32,
    /// Glaettungsfaktor fuer Rauschschaetzung
    noise_smoothing: f32,
    /// Frames unterhalb dieses Pegels gelten als Rauschen
    silence_threshold: f32,
}

impl NoiseSuppressor {
    /// Erstellt einen Rauschunterdruecker mit maximaler Daempfung `suppress_db` (<= 0)
    pub fn new(suppress_db: f64) -> Self {
        Self {
            floor: db_to_gain(suppress_db.min(0.0)),
            noise_estimate: 0.0,
            noise_smoothing: 0.95,
            silence_threshold: 0.02,
        }
    }
}

/// RMS eines Frames
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

impl AudioProcessor for NoiseSuppressor {
    fn process(&mut self, samples: &mut [f32]) {
        let frame_rms = rms(samples);

        if frame_rms < self.silence_threshold {
            self.noise_estimate = self.noise_smoothing * self.noise_estimate
                + (1.0 - self.noise_smoothing) * frame_rms;
        }

        if self.noise_estimate < 1e-7 {
            return;
        }

        let gain = if frame_rms > 1e-7 {
            (1.0 - ALPHA * self.noise_estimate / frame_rms).max(self.floor)
        } else {
            self.floor
        };

        for sample in samples.iter_mut() {
            *sample *= gain;
        }
    }

    fn reset(&mut self) {
        self.noise_estimate = 0.0;
    }
}
