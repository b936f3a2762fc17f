//! Verarbeitungsmodus
//!
//! Genau ein Modus ist pro Lauf aktiv. Welche Stufen er ausloest und ob ein
//! Referenzsignal (Far-End) benoetigt wird, entscheidet die Mode-Policy in
//! `klarton-audio`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KlartonError;

/// Verarbeitungsmodus eines Laufs
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessingMode {
    /// Keine Verarbeitung, A-law-Bytes werden unveraendert kopiert
    Bypass,
    /// A-law -> PCM -> A-law, prueft den Codec Ende-zu-Ende
    CodecRoundtripTest,
    /// Nur Rauschunterdrueckung
    NoiseSuppressOnly,
    /// Nur Echounterdrueckung
    EchoCancelOnly,
    /// Erst Rauschunterdrueckung, dann Echounterdrueckung
    NoiseSuppressThenEcho,
    /// Echounterdrueckung mit gekoppelter Rauschunterdrueckung (Standard)
    #[default]
    EchoThenNoiseSuppress,
}

impl ProcessingMode {
    /// Alle Modi in stabiler Reihenfolge
    pub const ALLE: [ProcessingMode; 6] = [
        Self::Bypass,
        Self::CodecRoundtripTest,
        Self::NoiseSuppressOnly,
        Self::EchoCancelOnly,
        Self::NoiseSuppressThenEcho,
        Self::EchoThenNoiseSuppress,
    ];

    /// Kurzname fuer Logs und Banner
    pub fn anzeigename(&self) -> &'static str {
        match self {
            Self::Bypass => "BYPASS",
            Self::CodecRoundtripTest => "A-LAW-TEST",
            Self::NoiseSuppressOnly => "NS-only",
            Self::EchoCancelOnly => "AEC-only",
            Self::NoiseSuppressThenEcho => "NS-first",
            Self::EchoThenNoiseSuppress => "AEC-first",
        }
    }

    /// Name wie er in der Konfigurationsdatei steht
    pub fn konfig_name(&self) -> &'static str {
        match self {
            Self::Bypass => "bypass",
            Self::CodecRoundtripTest => "codec-roundtrip-test",
            Self::NoiseSuppressOnly => "noise-suppress-only",
            Self::EchoCancelOnly => "echo-cancel-only",
            Self::NoiseSuppressThenEcho => "noise-suppress-then-echo",
            Self::EchoThenNoiseSuppress => "echo-then-noise-suppress",
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.anzeigename())
    }
}

impl FromStr for ProcessingMode {
    type Err = KlartonError;

    /// Akzeptiert Konfig-Namen, Anzeigenamen und die Kurzformen der Flags
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalisiert = s.trim().to_ascii_lowercase();
        let modus = match normalisiert.as_str() {
            "bypass" => Self::Bypass,
            "codec-roundtrip-test" | "a-law-test" | "test-alaw" => Self::CodecRoundtripTest,
            "noise-suppress-only" | "ns-only" => Self::NoiseSuppressOnly,
            "echo-cancel-only" | "aec-only" => Self::EchoCancelOnly,
            "noise-suppress-then-echo" | "ns-first" => Self::NoiseSuppressThenEcho,
            "echo-then-noise-suppress" | "aec-first" => Self::EchoThenNoiseSuppress,
            _ => return Err(KlartonError::UnbekannterModus(s.to_string())),
        };
        Ok(modus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_ist_aec_first() {
        assert_eq!(ProcessingMode::default(), ProcessingMode::EchoThenNoiseSuppress);
    }

    #[test]
    fn anzeigenamen() {
        assert_eq!(ProcessingMode::Bypass.to_string(), "BYPASS");
        assert_eq!(ProcessingMode::CodecRoundtripTest.to_string(), "A-LAW-TEST");
        assert_eq!(ProcessingMode::NoiseSuppressThenEcho.to_string(), "NS-first");
    }

    #[test]
    fn parsen_aller_namen() {
        for modus in ProcessingMode::ALLE {
            assert_eq!(modus.konfig_name().parse::<ProcessingMode>().unwrap(), modus);
            assert_eq!(modus.anzeigename().parse::<ProcessingMode>().unwrap(), modus);
        }
        assert_eq!(
            "ns-only".parse::<ProcessingMode>().unwrap(),
            ProcessingMode::NoiseSuppressOnly
        );
    }

    #[test]
    fn unbekannter_name_fehler() {
        let err = "turbo".parse::<ProcessingMode>().unwrap_err();
        assert!(matches!(err, KlartonError::UnbekannterModus(_)));
    }

    #[test]
    fn serde_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            modus: ProcessingMode,
        }
        let w: Wrapper = toml::from_str(r#"modus = "noise-suppress-then-echo""#).unwrap();
        assert_eq!(w.modus, ProcessingMode::NoiseSuppressThenEcho);
    }
}
