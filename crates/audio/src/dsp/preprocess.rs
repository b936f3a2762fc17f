//! Sprach-Preprocessor: Rauschunterdrueckung -> VAD -> AGC
//!
//! Die formenden Stufen laufen als `AudioProcessor`-Kette; die VAD sitzt
//! dazwischen und analysiert das entrauschte Signal, ohne es zu veraendern.

use klarton_core::NsConfig;

use super::agc::{Agc, AgcConfig};
use super::noise_suppression::NoiseSuppressor;
use super::vad::{Vad, VadConfig};
use super::AudioProcessor;

pub struct SpeechPreprocessor {
    /// Stufen vor der VAD
    vorher: Vec<Box<dyn AudioProcessor>>,
    vad: Option<Vad>,
    /// Stufen nach der VAD
    nachher: Vec<Box<dyn AudioProcessor>>,
}

impl SpeechPreprocessor {
    pub fn new(sample_rate: u32, ns: &NsConfig) -> Self {
        let vad = ns
            .vad_enabled
            .then(|| Vad::new(VadConfig::new(ns.vad_prob_start, ns.vad_prob_continue)));

        let mut nachher: Vec<Box<dyn AudioProcessor>> = Vec::new();
        if ns.agc_enabled {
            nachher.push(Box::new(Agc::new(AgcConfig::speech(
                sample_rate as f32,
                ns.agc_level,
            ))));
        }

        Self {
            vorher: vec![Box::new(NoiseSuppressor::new(ns.suppress_db))],
            vad,
            nachher,
        }
    }

    /// VAD-Ergebnis des letzten Frames, `None` wenn VAD deaktiviert
    pub fn voice_active(&self) -> Option<bool> {
        self.vad.as_ref().map(Vad::is_voice_active)
    }
}

impl AudioProcessor for SpeechPreprocessor {
    fn process(&mut self, samples: &mut [f32]) {
        for p in self.vorher.iter_mut() {
            p.process(samples);
        }
        if let Some(vad) = self.vad.as_mut() {
            vad.detect(samples);
        }
        for p in self.nachher.iter_mut() {
            p.process(samples);
        }
    }

    fn reset(&mut self) {
        for p in self.vorher.iter_mut().chain(self.nachher.iter_mut()) {
            p.reset();
        }
        if let Some(vad) = self.vad.as_mut() {
            vad.reset();
        }
    }
}
