//! klarton-audio – A-law Frame-Verarbeitung
//!
//! - G.711 A-law Codec
//! - Mode-Policy: Referenzbedarf, Stufenfolge, benoetigte Engines
//! - Engine-Vertrag (Echo / Rauschunterdrueckung) mit eingebauter DSP-Engine
//! - Frame-Pipeline ueber rohe A-law-Byte-Streams

pub mod codec;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod policy;

// Bequeme Re-Exporte der wichtigsten Typen
pub use dsp::{AudioProcessor, BuiltinEngines};
pub use engine::{EchoEngine, EngineFactory, EngineSet, SuppressionEngine};
pub use error::{AudioError, AudioResult, EngineError, StreamRole};
pub use pipeline::{
    FramePipeline, NoProgress, PipelineState, Progress, ProgressObserver, RunSummary,
};
pub use policy::{engine_requirements, requires_far_end, stage_order, EngineRequirements, Stage};
