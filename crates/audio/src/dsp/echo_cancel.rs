//! Echo Cancellation (AEC) via adaptivem NLMS-Filter
//!
//! Das Referenzsignal (Lautsprecher) wird Sample fuer Sample in einen
//! Ring-Buffer geschoben, dessen Laenge der Filterlaenge entspricht. Der
//! Filter schaetzt daraus das Echo im Mikrofonsignal und zieht es ab; der
//! Restfehler treibt die Adaption der Gewichte.

use super::AudioProcessor;

/// Konfiguration fuer Echo Cancellation
#[derive(Debug, Clone)]
pub struct EchoCancelConfig {
    /// Anzahl Filter-Taps (= abgedeckter Echo-Nachhall in Samples)
    pub filter_length: usize,
    /// NLMS-Schrittweite (0.0..1.0)
    pub step_size: f32,
    /// Regularisierung gegen Division durch Null bei stiller Referenz
    pub regularisierung: f32,
}

impl EchoCancelConfig {
    pub fn new(filter_length: usize) -> Self {
        Self {
            filter_length,
            ..Self::default()
        }
    }
}

impl Default for EchoCancelConfig {
    fn default() -> Self {
        Self {
            filter_length: 3200, // 200ms bei 16kHz
            step_size: 0.5,
            regularisierung: 1e-6,
        }
    }
}

/// NLMS Echo Canceller
///
/// Vor jedem `process()` muss mit [`EchoCanceller::feed_reference`] der
/// zugehoerige Referenz-Frame uebergeben werden. Fehlende Referenz-Samples
/// gelten als Stille.
pub struct EchoCanceller {
    config: EchoCancelConfig,
    /// Adaptive Filtergewichte, Index 0 = juengstes Referenz-Sample
    weights: Vec<f32>,
    /// Ring-Buffer fuer das Referenzsignal
    reference: Vec<f32>,
    /// Position des juengsten Referenz-Samples
    newest: usize,
    /// Laufende Energie des Ring-Buffers
    reference_energy: f32,
    /// Referenz fuer den naechsten `process()`-Aufruf
    pending: Vec<f32>,
}

impl EchoCanceller {
    pub fn new(config: EchoCancelConfig) -> Self {
        let len = config.filter_length.max(1);
        Self {
            weights: vec![0.0; len],
            reference: vec![0.0; len],
            newest: len - 1,
            reference_energy: 0.0,
            pending: Vec::new(),
            config: EchoCancelConfig {
                filter_length: len,
                step_size: config.step_size.clamp(0.01, 1.0),
                ..config
            },
        }
    }

    pub fn filter_length(&self) -> usize {
        self.config.filter_length
    }

    /// Merkt sich den Referenz-Frame fuer den naechsten `process()`-Aufruf
    pub fn feed_reference(&mut self, samples: &[f32]) {
        self.pending.clear();
        self.pending.extend_from_slice(samples);
    }

    fn push_reference(&mut self, sample: f32) {
        self.newest += 1;
        if self.newest == self.reference.len() {
            self.newest = 0;
            // Rundungsdrift der laufenden Summe einmal pro Umlauf verwerfen
            self.reference_energy = self.reference.iter().map(|r| r * r).sum();
        }
        let alt = std::mem::replace(&mut self.reference[self.newest], sample);
        self.reference_energy = (self.reference_energy + sample * sample - alt * alt).max(0.0);
    }

    fn cancel_sample(&mut self, near: f32, far: f32) -> f32 {
        self.push_reference(far);

        let (juenger, aelter) = self.reference.split_at(self.newest + 1);
        let historie = || juenger.iter().rev().chain(aelter.iter().rev());

        let echo_estimate: f32 = self.weights.iter().zip(historie()).map(|(w, r)| w * r).sum();
        let error = near - echo_estimate;

        let step =
            self.config.step_size * error / (self.reference_energy + self.config.regularisierung);
        for (w, r) in self.weights.iter_mut().zip(historie()) {
            *w += step * r;
        }

        error
    }
}

impl AudioProcessor for EchoCanceller {
    fn process(&mut self, samples: &mut [f32]) {
        let pending = std::mem::take(&mut self.pending);
        for (i, sample) in samples.iter_mut().enumerate() {
            let far = pending.get(i).copied().unwrap_or(0.0);
            *sample = self.cancel_sample(*sample, far);
        }
        self.pending = pending;
        self.pending.clear();
    }

    fn reset(&mut self) {
        self.weights.fill(0.0);
        self.reference.fill(0.0);
        self.newest = self.reference.len() - 1;
        self.reference_energy = 0.0;
        self.pending.clear();
    }
}
