//! Mode-Policy
//!
//! Reine Entscheidungslogik pro Verarbeitungsmodus: wird ein Referenzsignal
//! benoetigt, welche Stufen laufen in welcher Reihenfolge, und welche
//! Engines muessen dafuer erzeugt werden. Ein neuer Modus ist eine Zeile in
//! [`regel`].

use std::fmt;

use klarton_core::ProcessingMode;

/// Eine Verarbeitungsstufe innerhalb eines Frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// A-law -> PCM16 (nur im Codec-Testmodus als eigene Stufe gefuehrt)
    Decode,
    /// PCM16 -> A-law (nur im Codec-Testmodus als eigene Stufe gefuehrt)
    Encode,
    /// Eigenstaendige Rauschunterdrueckung
    NoiseSuppress,
    /// Echounterdrueckung ohne Nachbearbeitung
    EchoCancelOnly,
    /// Echounterdrueckung mit gekoppelter Rauschunterdrueckung (ein Engine-Aufruf)
    EchoCancelAndSuppress,
}

impl Stage {
    /// Ob die Stufe eine Echo-faehige Engine braucht
    pub fn braucht_echo_engine(&self) -> bool {
        matches!(self, Self::EchoCancelOnly | Self::EchoCancelAndSuppress)
    }

    /// Ob die Stufe einen eigenstaendigen Rauschunterdruecker braucht
    pub fn braucht_suppressor(&self) -> bool {
        matches!(self, Self::NoiseSuppress)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Decode => "decode",
            Self::Encode => "encode",
            Self::NoiseSuppress => "noise-suppress",
            Self::EchoCancelOnly => "echo-cancel",
            Self::EchoCancelAndSuppress => "echo-cancel+suppress",
        };
        f.write_str(name)
    }
}

/// Welche Engines ein Modus benoetigt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineRequirements {
    /// Echo-faehige Engine (mit gekoppeltem Preprocessor)
    pub echo: bool,
    /// Eigenstaendiger Rauschunterdruecker
    pub suppressor: bool,
}

impl EngineRequirements {
    /// Ob ueberhaupt eine Engine erzeugt werden muss
    pub fn ist_leer(&self) -> bool {
        !self.echo && !self.suppressor
    }
}

/// Tabelleneintrag eines Modus
#[derive(Debug, Clone, Copy)]
struct Regel {
    far_end: bool,
    stages: &'static [Stage],
}

const fn regel(mode: ProcessingMode) -> Regel {
    match mode {
        ProcessingMode::Bypass => Regel {
            far_end: false,
            stages: &[],
        },
        ProcessingMode::CodecRoundtripTest => Regel {
            far_end: false,
            stages: &[Stage::Decode, Stage::Encode],
        },
        ProcessingMode::NoiseSuppressOnly => Regel {
            far_end: false,
            stages: &[Stage::NoiseSuppress],
        },
        ProcessingMode::EchoCancelOnly => Regel {
            far_end: true,
            stages: &[Stage::EchoCancelOnly],
        },
        ProcessingMode::NoiseSuppressThenEcho => Regel {
            far_end: true,
            stages: &[Stage::NoiseSuppress, Stage::EchoCancelOnly],
        },
        ProcessingMode::EchoThenNoiseSuppress => Regel {
            far_end: true,
            stages: &[Stage::EchoCancelAndSuppress],
        },
    }
}

/// Ob der Modus ein Referenzsignal (Far-End) liest
pub fn requires_far_end(mode: ProcessingMode) -> bool {
    regel(mode).far_end
}

/// Stufen des Modus in Ausfuehrungsreihenfolge
pub fn stage_order(mode: ProcessingMode) -> &'static [Stage] {
    regel(mode).stages
}

/// Benoetigte Engines, abgeleitet aus der Stufenfolge
pub fn engine_requirements(mode: ProcessingMode) -> EngineRequirements {
    stage_order(mode)
        .iter()
        .fold(EngineRequirements::default(), |acc, stage| EngineRequirements {
            echo: acc.echo || stage.braucht_echo_engine(),
            suppressor: acc.suppressor || stage.braucht_suppressor(),
        })
}

/// Ob der Modus den Codec ueberhaupt benutzt
pub fn uses_codec(mode: ProcessingMode) -> bool {
    mode != ProcessingMode::Bypass
}
