//! Frame-Pipeline
//!
//! Liest Mikrofon- und (je nach Modus) Referenz-Frames als rohes A-law,
//! dekodiert, fuehrt die Stufen des Modus aus, kodiert und schreibt das
//! Ergebnis. Ein kurzer letzter Frame wird mit A-law-Stille aufgefuellt;
//! endet die Referenz vor dem Mikrofon, endet der Lauf regulaer.

use std::io::{ErrorKind, Read, Write};

use klarton_core::{PipelineConfig, ProcessingMode};
use tracing::{debug, info, trace};

use crate::codec;
use crate::engine::{EngineFactory, EngineSet};
use crate::error::{AudioError, AudioResult, EngineError, StreamRole};
use crate::policy::{self, Stage};

/// Zustand der Pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Reading,
    Converting,
    Processing,
    Encoding,
    Writing,
    Draining,
    Done,
    Failed,
}

/// Fortschrittsmeldung
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Bisher verarbeitete Frames
    pub frames: u64,
    /// Verarbeitete Audiodauer in Sekunden
    pub elapsed_secs: f64,
}

/// Ergebnis eines vollstaendigen Laufs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub elapsed_secs: f64,
    pub bytes_written: u64,
}

/// Empfaenger von Fortschrittsmeldungen
///
/// Ein Fehler bricht den Lauf ab.
pub trait ProgressObserver {
    fn report(&mut self, progress: &Progress) -> AudioResult<()>;
}

impl<F> ProgressObserver for F
where
    F: FnMut(&Progress) -> AudioResult<()>,
{
    fn report(&mut self, progress: &Progress) -> AudioResult<()> {
        self(progress)
    }
}

/// Verwirft alle Meldungen
#[derive(Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn report(&mut self, _progress: &Progress) -> AudioResult<()> {
        Ok(())
    }
}

/// Liest einen vollstaendigen Frame. Ein kurzer Rest wird mit Stille
/// aufgefuellt; `false` bei Stream-Ende ohne ein einziges Byte.
fn read_frame<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
    stream: StreamRole,
) -> AudioResult<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(AudioError::lesen(stream, e)),
        }
    }

    if filled == 0 {
        return Ok(false);
    }
    if filled < buf.len() {
        trace!(%stream, gelesen = filled, "Kurzer Frame, mit Stille aufgefuellt");
        buf[filled..].fill(codec::SILENCE);
    }
    Ok(true)
}

/// Fuehrt die Stufenfolge aus; jede Ausgabe ist die Eingabe der naechsten Stufe
fn run_stages(
    engines: &mut EngineSet,
    stages: &[Stage],
    near: &[i16],
    far: &[i16],
    frame: u64,
) -> AudioResult<Vec<i16>> {
    let mut current = near.to_vec();
    for &stage in stages {
        let fehler = |source| AudioError::Verarbeitung {
            frame,
            stage,
            source,
        };
        if let Some(out) = engines.run_stage(stage, &current, far).map_err(fehler)? {
            EngineError::pruefe_laenge(near.len(), &out).map_err(fehler)?;
            current = out;
        }
    }
    Ok(current)
}

pub struct FramePipeline {
    mode: ProcessingMode,
    config: PipelineConfig,
    engines: EngineSet,
    state: PipelineState,
    near_bytes: Vec<u8>,
    far_bytes: Vec<u8>,
    near_pcm: Vec<i16>,
    far_pcm: Vec<i16>,
    /// Referenz-Frame der vorherigen Iteration
    delayed_far: Vec<i16>,
    out_bytes: Vec<u8>,
}

impl FramePipeline {
    /// Validiert die Konfiguration und erzeugt die vom Modus benoetigten Engines
    pub fn new(
        mode: ProcessingMode,
        config: PipelineConfig,
        factory: &dyn EngineFactory,
    ) -> AudioResult<Self> {
        config.validieren()?;
        let engines = EngineSet::acquire(mode, &config, factory)?;
        let n = config.frame_size;

        Ok(Self {
            mode,
            engines,
            state: PipelineState::Idle,
            near_bytes: vec![codec::SILENCE; n],
            far_bytes: vec![codec::SILENCE; n],
            near_pcm: vec![0; n],
            far_pcm: vec![0; n],
            delayed_far: vec![0; n],
            out_bytes: vec![codec::SILENCE; n],
            config,
        })
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn mode(&self) -> ProcessingMode {
        self.mode
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn elapsed_secs(&self, frames: u64) -> f64 {
        frames as f64 * self.config.frame_size as f64 / f64::from(self.config.sample_rate)
    }

    fn start_banner(&self, far_required: bool) {
        info!(
            "Frame-Groesse: {} Samples ({:.1} ms)",
            self.config.frame_size,
            self.config.frame_ms()
        );
        let zusatz = if self.config.delay_compensation && far_required {
            " mit Verzoegerungsausgleich"
        } else {
            ""
        };
        info!(
            mode = %self.mode,
            stages = ?policy::stage_order(self.mode),
            "Modus: {}{}",
            self.mode,
            zusatz
        );
    }

    /// Verarbeitet alle Frames bis zum Ende eines Eingangsstreams.
    ///
    /// `far` wird nur in Modi mit Referenzsignal gelesen und ist dort Pflicht.
    /// Bei einem Fehler bleibt bereits Geschriebenes erhalten.
    pub fn run(
        &mut self,
        mut near: impl Read,
        far: Option<&mut dyn Read>,
        mut out: impl Write,
        observer: &mut dyn ProgressObserver,
    ) -> AudioResult<RunSummary> {
        if self.state != PipelineState::Idle {
            return Err(AudioError::Konfiguration(
                "Pipeline wurde bereits ausgefuehrt".into(),
            ));
        }

        let result = self.run_frames(&mut near, far, &mut out, observer);
        self.state = match result {
            Ok(_) => PipelineState::Done,
            Err(_) => PipelineState::Failed,
        };

        if let Ok(summary) = &result {
            info!(
                frames = summary.frames,
                bytes = summary.bytes_written,
                "Verarbeitet: {:.1} Sekunden ({} Frames)",
                summary.elapsed_secs,
                summary.frames
            );
        }
        result
    }

    fn run_frames(
        &mut self,
        near: &mut dyn Read,
        far: Option<&mut dyn Read>,
        out: &mut dyn Write,
        observer: &mut dyn ProgressObserver,
    ) -> AudioResult<RunSummary> {
        let far_required = policy::requires_far_end(self.mode);
        let mut far = match (far_required, far) {
            (true, None) => {
                return Err(AudioError::Konfiguration(format!(
                    "Modus {} benoetigt ein Referenzsignal",
                    self.mode
                )))
            }
            (true, Some(f)) => Some(f),
            (false, Some(_)) => {
                debug!(mode = %self.mode, "Referenzsignal wird in diesem Modus ignoriert");
                None
            }
            (false, None) => None,
        };

        self.start_banner(far_required);

        let stages = policy::stage_order(self.mode);
        let delay = self.config.delay_compensation && far_required;
        let progress_every = self.config.frames_per_progress();
        let mut frames: u64 = 0;
        let mut bytes_written: u64 = 0;

        loop {
            self.state = PipelineState::Reading;
            if !read_frame(near, &mut self.near_bytes, StreamRole::NearEnd)? {
                debug!(frames, "Mikrofon-Stream beendet");
                break;
            }
            if let Some(f) = far.as_mut() {
                if !read_frame(f, &mut self.far_bytes, StreamRole::FarEnd)? {
                    debug!(frames, "Referenz-Stream beendet");
                    break;
                }
            }

            let encoded: &[u8] = if policy::uses_codec(self.mode) {
                self.state = PipelineState::Converting;
                codec::decode_buffer(&self.near_bytes, &mut self.near_pcm);
                if far_required {
                    codec::decode_buffer(&self.far_bytes, &mut self.far_pcm);
                }

                self.state = PipelineState::Processing;
                let far_for_engine: &[i16] = match (far_required, delay) {
                    (false, _) => &[],
                    (true, true) => &self.delayed_far,
                    (true, false) => &self.far_pcm,
                };
                let processed = run_stages(
                    &mut self.engines,
                    stages,
                    &self.near_pcm,
                    far_for_engine,
                    frames,
                )?;
                if delay {
                    self.delayed_far.copy_from_slice(&self.far_pcm);
                }

                self.state = PipelineState::Encoding;
                codec::encode_buffer(&processed, &mut self.out_bytes);
                &self.out_bytes
            } else {
                &self.near_bytes
            };

            self.state = PipelineState::Writing;
            out.write_all(encoded).map_err(AudioError::schreiben)?;
            bytes_written += encoded.len() as u64;
            frames += 1;
            trace!(frame = frames, bytes = encoded.len(), "Frame geschrieben");

            if let Some(every) = progress_every {
                if frames % every == 0 {
                    observer.report(&Progress {
                        frames,
                        elapsed_secs: self.elapsed_secs(frames),
                    })?;
                }
            }
        }

        self.state = PipelineState::Draining;
        out.flush().map_err(AudioError::schreiben)?;

        Ok(RunSummary {
            frames,
            elapsed_secs: self.elapsed_secs(frames),
            bytes_written,
        })
    }
}
