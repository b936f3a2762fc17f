//! Fehlertypen fuer die Audio-Verarbeitung

use std::fmt;

use thiserror::Error;

use crate::policy::Stage;

/// Rolle eines Byte-Streams im Lauf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamRole {
    /// Mikrofon
    NearEnd,
    /// Lautsprecher-Referenz
    FarEnd,
    /// Ausgabe
    Output,
}

impl fmt::Display for StreamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NearEnd => "Mikrofon",
            Self::FarEnd => "Referenz",
            Self::Output => "Ausgabe",
        })
    }
}

/// Fehler einer DSP-Engine
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("Frame-Laenge falsch: erwartet={erwartet}, erhalten={erhalten}")]
    FrameLaenge { erwartet: usize, erhalten: usize },

    #[error("Ungueltige Engine-Parameter: {0}")]
    UngueltigeParameter(String),

    #[error("Verarbeitung fehlgeschlagen: {0}")]
    Fehlgeschlagen(String),
}

impl EngineError {
    /// Prueft eine Frame-Laenge gegen die konfigurierte Groesse
    pub fn pruefe_laenge(erwartet: usize, frame: &[i16]) -> Result<(), Self> {
        if frame.len() == erwartet {
            Ok(())
        } else {
            Err(Self::FrameLaenge {
                erwartet,
                erhalten: frame.len(),
            })
        }
    }
}

/// Alle moeglichen Fehler eines Verarbeitungslaufs
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    #[error("IO-Fehler beim {operation} ({stream}): {source}")]
    Io {
        stream: StreamRole,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Stufe {stage} fehlgeschlagen bei Frame {frame}: {source}")]
    Verarbeitung {
        frame: u64,
        stage: Stage,
        #[source]
        source: EngineError,
    },

    #[error("Engine konnte nicht erzeugt werden: {0}")]
    Engine(#[source] EngineError),

    #[error("Fortschrittsmeldung fehlgeschlagen: {0}")]
    Fortschritt(String),

    #[error(transparent)]
    Kern(#[from] klarton_core::KlartonError),
}

impl AudioError {
    /// Fehler beim Lesen eines Eingangsstreams
    pub fn lesen(stream: StreamRole, source: std::io::Error) -> Self {
        Self::Io {
            stream,
            operation: "Lesen",
            source,
        }
    }

    /// Fehler beim Schreiben der Ausgabe
    pub fn schreiben(source: std::io::Error) -> Self {
        Self::Io {
            stream: StreamRole::Output,
            operation: "Schreiben",
            source,
        }
    }

    /// Frame-Index bei Verarbeitungsfehlern
    pub fn frame(&self) -> Option<u64> {
        match self {
            Self::Verarbeitung { frame, .. } => Some(*frame),
            _ => None,
        }
    }
}

pub type AudioResult<T> = Result<T, AudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn laengenpruefung() {
        assert!(EngineError::pruefe_laenge(4, &[0; 4]).is_ok());
        assert_eq!(
            EngineError::pruefe_laenge(4, &[0; 3]),
            Err(EngineError::FrameLaenge {
                erwartet: 4,
                erhalten: 3
            })
        );
    }

    #[test]
    fn verarbeitungsfehler_nennt_frame() {
        let e = AudioError::Verarbeitung {
            frame: 17,
            stage: Stage::EchoCancelOnly,
            source: EngineError::Fehlgeschlagen("test".into()),
        };
        assert_eq!(e.frame(), Some(17));
        let text = e.to_string();
        assert!(text.contains("Frame 17"), "{text}");
        assert!(text.contains("echo-cancel"), "{text}");
    }

    #[test]
    fn io_fehler_nennt_stream() {
        let e = AudioError::lesen(
            StreamRole::FarEnd,
            std::io::Error::new(std::io::ErrorKind::Other, "kaputt"),
        );
        let text = e.to_string();
        assert!(text.contains("Referenz"), "{text}");
        assert!(text.contains("Lesen"), "{text}");
        assert_eq!(e.frame(), None);
    }
}
