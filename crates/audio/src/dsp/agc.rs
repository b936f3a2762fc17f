//! Automatic Gain Control (AGC)
//!
//! Regelt den Frame-Pegel (RMS) automatisch auf einen Zielwert.
//! Enthaelt Attack/Release-Glaettung und einen Limiter.

use super::noise_suppression::rms;
use super::AudioProcessor;

/// Konfiguration fuer den AGC
#[derive(Debug, Clone)]
pub struct AgcConfig {
    /// Ziel-RMS-Pegel (normalisiert, 0.0..1.0)
    pub target_level: f32,
    /// Maximaler Gain-Faktor
    pub max_gain: f32,
    /// Minimaler Gain-Faktor
    pub min_gain: f32,
    /// Attack-Koeffizient pro Sample (wie schnell Gain sinkt)
    pub attack_coeff: f32,
    /// Release-Koeffizient pro Sample (wie schnell Gain steigt)
    pub release_coeff: f32,
    /// Limiter-Schwellenwert (Hard Clip)
    pub limiter_threshold: f32,
}

impl AgcConfig {
    /// Sprach-Konfiguration; `level` ist der Zielpegel im 16-Bit-Bereich
    pub fn speech(sample_rate: f32, level: f64) -> Self {
        Self {
            target_level: (level / 32768.0).clamp(0.001, 1.0) as f32,
            max_gain: 20.0,
            min_gain: 0.1,
            attack_coeff: Self::time_to_coeff(0.01, sample_rate),
            release_coeff: Self::time_to_coeff(0.15, sample_rate),
            limiter_threshold: 0.95,
        }
    }

    fn time_to_coeff(time_secs: f32, sample_rate: f32) -> f32 {
        if time_secs <= 0.0 || sample_rate <= 0.0 {
            return 0.0;
        }
        (-1.0 / (time_secs * sample_rate)).exp()
    }
}

impl Default for AgcConfig {
    fn default() -> Self {
        Self::speech(16000.0, 8000.0)
    }
}

/// Automatic Gain Control Prozessor
pub struct Agc {
    config: AgcConfig,
    current_gain: f32,
}

impl Agc {
    pub fn new(config: AgcConfig) -> Self {
        Self {
            current_gain: 1.0,
            config,
        }
    }
}

impl AudioProcessor for Agc {
    fn process(&mut self, samples: &mut [f32]) {
        let frame_rms = rms(samples);
        // In Stille den Gain halten statt ihn hochzuregeln
        let desired_gain = if frame_rms > 1e-6 {
            (self.config.target_level / frame_rms).clamp(self.config.min_gain, self.config.max_gain)
        } else {
            self.current_gain
        };

        for sample in samples.iter_mut() {
            // Gain glaetten: schnell runter (Attack), langsam hoch (Release)
            let coeff = if desired_gain < self.current_gain {
                self.config.attack_coeff
            } else {
                self.config.release_coeff
            };
            self.current_gain = coeff * self.current_gain + (1.0 - coeff) * desired_gain;

            *sample = (*sample * self.current_gain)
                .clamp(-self.config.limiter_threshold, self.config.limiter_threshold);
        }
    }

    fn reset(&mut self) {
        self.current_gain = 1.0;
    }
}
