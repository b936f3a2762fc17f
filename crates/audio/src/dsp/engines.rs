//! Eingebaute Engines auf Basis der DSP-Bausteine
//!
//! Die Frames werden am Rand von i16 nach f32 (-1.0..1.0) umgerechnet,
//! intern in-place verarbeitet und auf dem Rueckweg begrenzt und gerundet.

use klarton_core::NsConfig;
use tracing::{debug, trace};

use super::echo_cancel::{EchoCancelConfig, EchoCanceller};
use super::preprocess::SpeechPreprocessor;
use super::AudioProcessor;
use crate::engine::{EchoEngine, EngineFactory, SuppressionEngine};
use crate::error::EngineError;

const SKALIERUNG: f32 = 32768.0;

fn to_float(pcm: &[i16], out: &mut Vec<f32>) {
    out.clear();
    out.extend(pcm.iter().map(|&s| f32::from(s) / SKALIERUNG));
}

fn to_pcm(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s * SKALIERUNG).round().clamp(-32768.0, 32767.0) as i16)
        .collect()
}

fn pruefe_parameter(frame_size: usize, sample_rate: u32) -> Result<(), EngineError> {
    if frame_size == 0 {
        return Err(EngineError::UngueltigeParameter(
            "Frame-Groesse muss positiv sein".into(),
        ));
    }
    if sample_rate == 0 {
        return Err(EngineError::UngueltigeParameter(
            "Abtastrate muss positiv sein".into(),
        ));
    }
    Ok(())
}

/// Factory fuer die eingebauten Engines
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinEngines;

impl EngineFactory for BuiltinEngines {
    fn echo_engine(
        &self,
        frame_size: usize,
        filter_length: usize,
        sample_rate: u32,
    ) -> Result<Box<dyn EchoEngine>, EngineError> {
        pruefe_parameter(frame_size, sample_rate)?;
        if filter_length == 0 {
            return Err(EngineError::UngueltigeParameter(
                "Filterlaenge muss positiv sein".into(),
            ));
        }
        Ok(Box::new(BuiltinEchoEngine::new(
            frame_size,
            filter_length,
            sample_rate,
        )))
    }

    fn suppressor(
        &self,
        frame_size: usize,
        sample_rate: u32,
        ns: &NsConfig,
    ) -> Result<Box<dyn SuppressionEngine>, EngineError> {
        pruefe_parameter(frame_size, sample_rate)?;
        Ok(Box::new(BuiltinSuppressor::new(frame_size, sample_rate, ns)))
    }
}

/// NLMS-Echounterdrueckung mit gekoppeltem Preprocessor
pub struct BuiltinEchoEngine {
    frame_size: usize,
    canceller: EchoCanceller,
    /// Nur im kombinierten Aufruf aktiv
    preprocessor: SpeechPreprocessor,
    near: Vec<f32>,
    far: Vec<f32>,
}

impl BuiltinEchoEngine {
    pub fn new(frame_size: usize, filter_length: usize, sample_rate: u32) -> Self {
        Self {
            frame_size,
            canceller: EchoCanceller::new(EchoCancelConfig::new(filter_length)),
            preprocessor: SpeechPreprocessor::new(sample_rate, &NsConfig::echo_gekoppelt()),
            near: Vec::with_capacity(frame_size),
            far: Vec::with_capacity(frame_size),
        }
    }

    fn cancel(&mut self, near: &[i16], far: &[i16]) -> Result<(), EngineError> {
        EngineError::pruefe_laenge(self.frame_size, near)?;
        EngineError::pruefe_laenge(self.frame_size, far)?;
        to_float(near, &mut self.near);
        to_float(far, &mut self.far);
        self.canceller.feed_reference(&self.far);
        self.canceller.process(&mut self.near);
        Ok(())
    }
}

impl EchoEngine for BuiltinEchoEngine {
    fn frame_size(&self) -> usize {
        self.frame_size
    }

    fn process_combined(&mut self, near: &[i16], far: &[i16]) -> Result<Vec<i16>, EngineError> {
        self.cancel(near, far)?;
        self.preprocessor.process(&mut self.near);
        trace!(voice_active = ?self.preprocessor.voice_active(), "AEC+NS");
        Ok(to_pcm(&self.near))
    }

    fn process_echo_only(&mut self, near: &[i16], far: &[i16]) -> Result<Vec<i16>, EngineError> {
        self.cancel(near, far)?;
        Ok(to_pcm(&self.near))
    }

    fn reset(&mut self) {
        self.canceller.reset();
        self.preprocessor.reset();
    }
}

impl Drop for BuiltinEchoEngine {
    fn drop(&mut self) {
        debug!(
            filter_length = self.canceller.filter_length(),
            "Echo-Engine beendet"
        );
    }
}

/// Eigenstaendiger Rauschunterdruecker mit den konfigurierten NS-Einstellungen
pub struct BuiltinSuppressor {
    frame_size: usize,
    preprocessor: SpeechPreprocessor,
    samples: Vec<f32>,
}

impl BuiltinSuppressor {
    pub fn new(frame_size: usize, sample_rate: u32, ns: &NsConfig) -> Self {
        Self {
            frame_size,
            preprocessor: SpeechPreprocessor::new(sample_rate, ns),
            samples: Vec::with_capacity(frame_size),
        }
    }
}

impl SuppressionEngine for BuiltinSuppressor {
    fn frame_size(&self) -> usize {
        self.frame_size
    }

    fn process_noise_suppress(&mut self, near: &[i16]) -> Result<Vec<i16>, EngineError> {
        EngineError::pruefe_laenge(self.frame_size, near)?;
        to_float(near, &mut self.samples);
        self.preprocessor.process(&mut self.samples);
        if let Some(aktiv) = self.preprocessor.voice_active() {
            trace!(voice_active = aktiv, "NS");
        }
        Ok(to_pcm(&self.samples))
    }
}

impl Drop for BuiltinSuppressor {
    fn drop(&mut self) {
        debug!(frame_size = self.frame_size, "Rauschunterdruecker beendet");
    }
}
