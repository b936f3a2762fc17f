//! Engine-Vertrag – Schnittstelle zur DSP-Engine
//!
//! Die eigentliche Echo- und Rauschunterdrueckung liegt hinter zwei
//! Faehigkeiten: einer Echo-faehigen Engine (Echo allein oder mit
//! gekoppelter Rauschunterdrueckung) und einem eigenstaendigen
//! Rauschunterdruecker. Erzeugt werden sie ueber eine [`EngineFactory`],
//! genau einmal vor der Frame-Schleife. Das [`EngineSet`] besitzt die
//! Instanzen; freigegeben werden sie per `Drop` auf jedem Ausstiegspfad.

use klarton_core::{NsConfig, PipelineConfig, ProcessingMode};
use tracing::debug;

use crate::error::{AudioError, AudioResult, EngineError};
use crate::policy::{self, Stage};

/// Echo-faehige Engine
///
/// Alle Aufrufe schlagen fehl, wenn ein Eingangs-Frame nicht genau
/// `frame_size()` Samples lang ist.
pub trait EchoEngine: Send {
    /// Konfigurierte Frame-Groesse in Samples
    fn frame_size(&self) -> usize;

    /// Echounterdrueckung mit anschliessender gekoppelter Rauschunterdrueckung
    fn process_combined(&mut self, near: &[i16], far: &[i16]) -> Result<Vec<i16>, EngineError>;

    /// Nur Echounterdrueckung
    fn process_echo_only(&mut self, near: &[i16], far: &[i16]) -> Result<Vec<i16>, EngineError>;

    /// Setzt den adaptiven Zustand zurueck
    fn reset(&mut self);
}

/// Eigenstaendiger Rauschunterdruecker (ohne Echo-Zustand)
pub trait SuppressionEngine: Send {
    /// Konfigurierte Frame-Groesse in Samples
    fn frame_size(&self) -> usize;

    /// Rauschunterdrueckung eines Frames
    fn process_noise_suppress(&mut self, near: &[i16]) -> Result<Vec<i16>, EngineError>;
}

/// Erzeugt Engine-Instanzen
pub trait EngineFactory {
    /// Echo-faehige Engine aus (Frame-Groesse, Filterlaenge, Abtastrate)
    fn echo_engine(
        &self,
        frame_size: usize,
        filter_length: usize,
        sample_rate: u32,
    ) -> Result<Box<dyn EchoEngine>, EngineError>;

    /// Rauschunterdruecker aus (Frame-Groesse, Abtastrate, NS-Einstellungen)
    fn suppressor(
        &self,
        frame_size: usize,
        sample_rate: u32,
        ns: &NsConfig,
    ) -> Result<Box<dyn SuppressionEngine>, EngineError>;
}

/// Die fuer einen Lauf erzeugten Engines
pub struct EngineSet {
    echo: Option<Box<dyn EchoEngine>>,
    suppressor: Option<Box<dyn SuppressionEngine>>,
}

impl EngineSet {
    /// Leeres Set (Bypass, Codec-Test)
    pub fn empty() -> Self {
        Self {
            echo: None,
            suppressor: None,
        }
    }

    /// Erzeugt genau die Engines, die der Modus laut Policy braucht
    pub fn acquire(
        mode: ProcessingMode,
        config: &PipelineConfig,
        factory: &dyn EngineFactory,
    ) -> AudioResult<Self> {
        let bedarf = policy::engine_requirements(mode);
        let mut set = Self::empty();

        if bedarf.echo {
            let filter_length = config.effective_filter_length();
            set.echo = Some(
                factory
                    .echo_engine(config.frame_size, filter_length, config.sample_rate)
                    .map_err(AudioError::Engine)?,
            );
            debug!(
                frame_size = config.frame_size,
                filter_length,
                sample_rate = config.sample_rate,
                "Echo-Engine erzeugt"
            );
        }

        if bedarf.suppressor {
            set.suppressor = Some(
                factory
                    .suppressor(
                        config.frame_size,
                        config.sample_rate,
                        &config.rauschunterdrueckung,
                    )
                    .map_err(AudioError::Engine)?,
            );
            debug!(
                frame_size = config.frame_size,
                sample_rate = config.sample_rate,
                "Rauschunterdruecker erzeugt"
            );
        }

        Ok(set)
    }

    /// Fuehrt eine Stufe aus.
    ///
    /// Codec-Stufen (`Decode`, `Encode`) erledigt die Pipeline selbst; fuer
    /// sie wird `Ok(None)` zurueckgegeben und der Frame laeuft unveraendert weiter.
    pub fn run_stage(
        &mut self,
        stage: Stage,
        near: &[i16],
        far: &[i16],
    ) -> Result<Option<Vec<i16>>, EngineError> {
        let ausgabe = match stage {
            Stage::Decode | Stage::Encode => return Ok(None),
            Stage::NoiseSuppress => self.suppressor_mut()?.process_noise_suppress(near)?,
            Stage::EchoCancelOnly => self.echo_mut()?.process_echo_only(near, far)?,
            Stage::EchoCancelAndSuppress => self.echo_mut()?.process_combined(near, far)?,
        };
        Ok(Some(ausgabe))
    }

    fn echo_mut(&mut self) -> Result<&mut (dyn EchoEngine + 'static), EngineError> {
        self.echo
            .as_deref_mut()
            .ok_or_else(|| EngineError::Fehlgeschlagen("keine Echo-Engine erzeugt".into()))
    }

    fn suppressor_mut(&mut self) -> Result<&mut (dyn SuppressionEngine + 'static), EngineError> {
        self.suppressor
            .as_deref_mut()
            .ok_or_else(|| EngineError::Fehlgeschlagen("kein Rauschunterdruecker erzeugt".into()))
    }
}

impl Drop for EngineSet {
    fn drop(&mut self) {
        if self.echo.is_some() || self.suppressor.is_some() {
            debug!(
                echo = self.echo.is_some(),
                suppressor = self.suppressor.is_some(),
                "Engines freigegeben"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Zaehlt erzeugte und freigegebene Instanzen
    #[derive(Default)]
    struct Zaehler {
        echo_erzeugt: AtomicUsize,
        ns_erzeugt: AtomicUsize,
        freigegeben: AtomicUsize,
    }

    struct TestEcho {
        frame_size: usize,
        zaehler: Arc<Zaehler>,
    }

    impl EchoEngine for TestEcho {
        fn frame_size(&self) -> usize {
            self.frame_size
        }
        fn process_combined(&mut self, near: &[i16], far: &[i16]) -> Result<Vec<i16>, EngineError> {
            EngineError::pruefe_laenge(self.frame_size, far)?;
            Ok(near.iter().map(|s| s / 2).collect())
        }
        fn process_echo_only(&mut self, near: &[i16], far: &[i16]) -> Result<Vec<i16>, EngineError> {
            EngineError::pruefe_laenge(self.frame_size, far)?;
            Ok(near.iter().zip(far).map(|(n, f)| n - f).collect())
        }
        fn reset(&mut self) {}
    }

    impl Drop for TestEcho {
        fn drop(&mut self) {
            self.zaehler.freigegeben.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct TestNs {
        frame_size: usize,
        zaehler: Arc<Zaehler>,
    }

    impl SuppressionEngine for TestNs {
        fn frame_size(&self) -> usize {
            self.frame_size
        }
        fn process_noise_suppress(&mut self, near: &[i16]) -> Result<Vec<i16>, EngineError> {
            Ok(near.iter().map(|s| s + 1).collect())
        }
    }

    impl Drop for TestNs {
        fn drop(&mut self) {
            self.zaehler.freigegeben.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct TestFactory(Arc<Zaehler>);

    impl EngineFactory for TestFactory {
        fn echo_engine(
            &self,
            frame_size: usize,
            _filter_length: usize,
            _sample_rate: u32,
        ) -> Result<Box<dyn EchoEngine>, EngineError> {
            self.0.echo_erzeugt.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(TestEcho {
                frame_size,
                zaehler: Arc::clone(&self.0),
            }))
        }

        fn suppressor(
            &self,
            frame_size: usize,
            _sample_rate: u32,
            _ns: &NsConfig,
        ) -> Result<Box<dyn SuppressionEngine>, EngineError> {
            self.0.ns_erzeugt.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(TestNs {
                frame_size,
                zaehler: Arc::clone(&self.0),
            }))
        }
    }

    fn kleine_config() -> PipelineConfig {
        PipelineConfig {
            frame_size: 4,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn bypass_erzeugt_keine_engines() {
        let zaehler = Arc::new(Zaehler::default());
        let set = EngineSet::acquire(
            ProcessingMode::Bypass,
            &kleine_config(),
            &TestFactory(Arc::clone(&zaehler)),
        )
        .unwrap();
        assert!(set.echo.is_none());
        assert!(set.suppressor.is_none());
        assert_eq!(zaehler.echo_erzeugt.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn ns_first_erzeugt_beide_und_gibt_frei() {
        let zaehler = Arc::new(Zaehler::default());
        {
            let set = EngineSet::acquire(
                ProcessingMode::NoiseSuppressThenEcho,
                &kleine_config(),
                &TestFactory(Arc::clone(&zaehler)),
            )
            .unwrap();
            assert!(set.echo.is_some());
            assert!(set.suppressor.is_some());
        }
        assert_eq!(zaehler.echo_erzeugt.load(Ordering::SeqCst), 1);
        assert_eq!(zaehler.ns_erzeugt.load(Ordering::SeqCst), 1);
        assert_eq!(zaehler.freigegeben.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn codec_stufen_ohne_engine() {
        let mut set = EngineSet::empty();
        assert_eq!(set.run_stage(Stage::Decode, &[1, 2], &[]), Ok(None));
        assert_eq!(set.run_stage(Stage::Encode, &[1, 2], &[]), Ok(None));
    }

    #[test]
    fn fehlende_engine_ist_fehler() {
        let mut set = EngineSet::empty();
        assert!(set.run_stage(Stage::NoiseSuppress, &[0; 4], &[]).is_err());
        assert!(set.run_stage(Stage::EchoCancelOnly, &[0; 4], &[0; 4]).is_err());
    }

    #[test]
    fn stufen_rufen_richtige_engine() {
        let zaehler = Arc::new(Zaehler::default());
        let mut set = EngineSet::acquire(
            ProcessingMode::NoiseSuppressThenEcho,
            &kleine_config(),
            &TestFactory(zaehler),
        )
        .unwrap();
        let ns = set
            .run_stage(Stage::NoiseSuppress, &[1, 2, 3, 4], &[])
            .unwrap()
            .unwrap();
        assert_eq!(ns, vec![2, 3, 4, 5]);
        let aec = set
            .run_stage(Stage::EchoCancelOnly, &ns, &[1, 1, 1, 1])
            .unwrap()
            .unwrap();
        assert_eq!(aec, vec![1, 2, 3, 4]);
    }
}
