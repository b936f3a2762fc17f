//! DSP-Module fuer die eingebaute Engine
//!
//! Die formenden Bausteine implementieren das `AudioProcessor` Trait und verarbeiten
//! normierte f32-Samples in-place. [`engines`] verpackt sie hinter dem
//! Engine-Vertrag der Pipeline.

pub mod agc;
pub mod echo_cancel;
pub mod engines;
pub mod noise_suppression;
pub mod preprocess;
pub mod vad;

pub use engines::{BuiltinEchoEngine, BuiltinEngines, BuiltinSuppressor};

/// Gemeinsames Trait fuer alle Audio-Prozessoren
///
/// Formende DSP-Bausteine verarbeiten Samples in-place und sind
/// Send + Sync, damit Engines zwischen Threads verschoben werden koennen.
pub trait AudioProcessor: Send + Sync {
    /// Verarbeitet einen Puffer von Samples in-place
    fn process(&mut self, samples: &mut [f32]);

    /// Setzt den internen Zustand zurueck (z.B. Filter-Historie)
    fn reset(&mut self);
}
