//! Voice Activity Detection (VAD)
//!
//! Energie-basierte Sprachwahrscheinlichkeit (0-100) kombiniert mit
//! Zero-Crossing-Rate. Sprache beginnt, wenn die Wahrscheinlichkeit die
//! Start-Schwelle erreicht, und haelt, solange sie ueber der
//! Fortsetzungs-Schwelle bleibt. Rein analytisch, Samples bleiben unveraendert.

/// Pegel (dBFS) ab dem die Wahrscheinlichkeit ueber 0 steigt
const PEGEL_MIN_DB: f32 = -60.0;
/// Pegel (dBFS) ab dem die Wahrscheinlichkeit 100 erreicht
const PEGEL_MAX_DB: f32 = -20.0;

/// Konfiguration fuer die VAD
#[derive(Debug, Clone)]
pub struct VadConfig {
    /// Wahrscheinlichkeit (0-100) ab der Sprache beginnt
    pub prob_start: u8,
    /// Wahrscheinlichkeit (0-100) die laufende Sprache haelt
    pub prob_continue: u8,
    /// Zero-Crossing-Rate oberhalb der ein Frame eher Rauschen ist
    pub zcr_threshold: f32,
    /// Glaettungsfaktor fuer Energie (0.0 = keine Glaettung)
    pub smoothing: f32,
}

impl VadConfig {
    pub fn new(prob_start: u8, prob_continue: u8) -> Self {
        Self {
            prob_start: prob_start.min(100),
            prob_continue: prob_continue.min(100),
            ..Self::default()
        }
    }
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            prob_start: 80,
            prob_continue: 65,
            zcr_threshold: 0.3,
            smoothing: 0.5,
        }
    }
}

/// Voice Activity Detector
pub struct Vad {
    config: VadConfig,
    smoothed_energy: f32,
    probability: u8,
    voice_active: bool,
}

impl Vad {
    pub fn new(config: VadConfig) -> Self {
        Self {
            config,
            smoothed_energy: 0.0,
            probability: 0,
            voice_active: false,
        }
    }

    /// Ob im letzten verarbeiteten Frame Sprache erkannt wurde
    pub fn is_voice_active(&self) -> bool {
        self.voice_active
    }

    /// Analysiert einen Frame und gibt zurueck ob Sprache aktiv ist
    pub fn detect(&mut self, samples: &[f32]) -> bool {
        if samples.is_empty() {
            return false;
        }

        let energy = rms_energy(samples);
        self.smoothed_energy =
            self.config.smoothing * self.smoothed_energy + (1.0 - self.config.smoothing) * energy;

        let mut probability = energy_probability(self.smoothed_energy);
        // Hohe ZCR spricht fuer Rauschen statt Sprache
        if zero_crossing_rate(samples) > self.config.zcr_threshold {
            probability *= 0.5;
        }
        self.probability = probability.round().clamp(0.0, 100.0) as u8;

        let schwelle = if self.voice_active {
            self.config.prob_continue
        } else {
            self.config.prob_start
        };
        self.voice_active = self.probability >= schwelle;

        self.voice_active
    }

    pub fn reset(&mut self) {
        self.smoothed_energy = 0.0;
        self.probability = 0;
        self.voice_active = false;
    }
}

/// Bildet einen RMS-Wert linear in dB auf 0-100 ab
fn energy_probability(rms: f32) -> f32 {
    if rms <= 0.0 {
        return 0.0;
    }
    let pegel = 20.0 * rms.log10();
    ((pegel - PEGEL_MIN_DB) / (PEGEL_MAX_DB - PEGEL_MIN_DB)).clamp(0.0, 1.0) * 100.0
}

/// Berechnet den RMS-Energiewert eines Frames
pub fn rms_energy(samples: &[f32]) -> f32 {
    super::noise_suppression::rms(samples)
}

/// Berechnet die normalisierte Zero-Crossing-Rate
pub fn zero_crossing_rate(samples: &[f32]) -> f32 {
    if samples.len() < 2 {
        return 0.0;
    }
    let crossings = samples
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count();
    crossings as f32 / (samples.len() - 1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ungeglaettet() -> VadConfig {
        VadConfig {
            smoothing: 0.0,
            ..VadConfig::default()
        }
    }

    #[test]
    fn vad_stille_nicht_aktiv() {
        let mut vad = Vad::new(VadConfig::default());
        let samples = vec![0.0f32; 320];
        assert!(!vad.detect(&samples));
        assert_eq!(vad.probability, 0);
    }

    #[test]
    fn lautes_signal_aktiv() {
        let mut vad = Vad::new(ungeglaettet());
        assert!(vad.detect(&vec![0.5f32; 320]));
        assert_eq!(vad.probability, 100);
    }

    #[test]
    fn hysterese_zwischen_start_und_fortsetzung() {
        let mut vad = Vad::new(ungeglaettet());
        // -32 dBFS ergibt eine Wahrscheinlichkeit von 70
        let mittel = vec![0.025_12f32; 320];

        // Aus dem Ruhezustand reicht 70 nicht fuer den Start (80)
        assert!(!vad.detect(&mittel));
        assert_eq!(vad.probability, 70);

        // Nach lautem Frame haelt 70 die Sprache (Fortsetzung 65)
        assert!(vad.detect(&vec![0.5f32; 320]));
        assert!(vad.detect(&mittel));

        // Unter der Fortsetzungs-Schwelle endet die Sprache
        assert!(!vad.detect(&vec![0.001f32; 320]));
    }

    #[test]
    fn hohe_zcr_senkt_wahrscheinlichkeit() {
        let mut vad = Vad::new(ungeglaettet());
        let alternierend: Vec<f32> = (0..320)
            .map(|i| if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        vad.detect(&alternierend);
        assert_eq!(vad.probability, 50);
    }

    #[test]
    fn schwellen_auf_100_begrenzt() {
        let cfg = VadConfig::new(200, 150);
        assert_eq!(cfg.prob_start, 100);
        assert_eq!(cfg.prob_continue, 100);
    }

    #[test]
    fn vad_reset_setzt_zustand() {
        let mut vad = Vad::new(VadConfig::default());
        vad.detect(&vec![0.5f32; 320]);
        vad.reset();
        assert_eq!(vad.probability, 0);
        assert!(!vad.is_voice_active());
    }

    #[test]
    fn zcr_sinus_niedrig() {
        let samples: Vec<f32> = (0..480).map(|i| (i as f32 * 0.05).sin()).collect();
        let zcr = zero_crossing_rate(&samples);
        assert!(zcr < 0.1, "Niederfrequenter Sinus hat niedrige ZCR: {}", zcr);
    }
}
