//! Ende-zu-Ende-Laeufe ueber echte Dateien

use std::fs;
use std::path::{Path, PathBuf};

use klarton_audio::codec;
use klarton_cli::ausfuehren;
use klarton_cli::config::ToolConfig;
use klarton_core::ProcessingMode;
use tempfile::TempDir;

fn datei(dir: &TempDir, name: &str, inhalt: &[u8]) -> PathBuf {
    let pfad = dir.path().join(name);
    fs::write(&pfad, inhalt).unwrap();
    pfad
}

fn config(modus: ProcessingMode, mic: &Path, speaker: Option<&Path>, out: &Path) -> ToolConfig {
    let mut cfg = ToolConfig::default();
    cfg.verarbeitung.modus = modus;
    cfg.dateien.mikrofon = Some(mic.to_path_buf());
    cfg.dateien.lautsprecher = speaker.map(Path::to_path_buf);
    cfg.dateien.ausgabe = out.to_path_buf();
    cfg
}

#[test]
fn stille_bleibt_stille_aec_first() {
    let dir = TempDir::new().unwrap();
    let stille = vec![codec::SILENCE; 320];
    let mic = datei(&dir, "mic.alaw", &stille);
    let spk = datei(&dir, "spk.alaw", &stille);
    let out = dir.path().join("out.alaw");

    let cfg = config(ProcessingMode::EchoThenNoiseSuppress, &mic, Some(&spk), &out);
    cfg.validieren().unwrap();
    let summary = ausfuehren(&cfg).unwrap();

    assert_eq!(summary.frames, 1);
    assert!((summary.elapsed_secs - 0.02).abs() < 1e-9);
    assert_eq!(fs::read(&out).unwrap(), stille);
}

#[test]
fn ns_only_fuellt_letzten_frame_auf() {
    let dir = TempDir::new().unwrap();
    let mic = datei(&dir, "mic.alaw", &vec![0x80u8; 321]);
    let out = dir.path().join("out.alaw");

    let cfg = config(ProcessingMode::NoiseSuppressOnly, &mic, None, &out);
    let summary = ausfuehren(&cfg).unwrap();

    assert_eq!(summary.frames, 2);
    assert_eq!(summary.bytes_written, 640);
    assert_eq!(fs::read(&out).unwrap().len(), 640);
}

#[test]
fn bypass_kopiert_datei() {
    let dir = TempDir::new().unwrap();
    let inhalt: Vec<u8> = (0..640u32).map(|i| (i % 256) as u8).collect();
    let mic = datei(&dir, "mic.alaw", &inhalt);
    let out = dir.path().join("out.alaw");

    ausfuehren(&config(ProcessingMode::Bypass, &mic, None, &out)).unwrap();
    assert_eq!(fs::read(&out).unwrap(), inhalt);
}

#[test]
fn codec_test_ist_verlustfrei() {
    let dir = TempDir::new().unwrap();
    let inhalt: Vec<u8> = (0..640u32).map(|i| (i * 7 % 256) as u8).collect();
    let mic = datei(&dir, "mic.alaw", &inhalt);
    let out = dir.path().join("out.alaw");

    ausfuehren(&config(ProcessingMode::CodecRoundtripTest, &mic, None, &out)).unwrap();
    assert_eq!(fs::read(&out).unwrap(), inhalt);
}

#[test]
fn kurze_referenz_beendet_lauf() {
    let dir = TempDir::new().unwrap();
    let mic = datei(&dir, "mic.alaw", &vec![codec::SILENCE; 320 * 3]);
    let spk = datei(&dir, "spk.alaw", &vec![codec::SILENCE; 320]);
    let out = dir.path().join("out.alaw");

    let mut cfg = config(ProcessingMode::EchoCancelOnly, &mic, Some(&spk), &out);
    cfg.verarbeitung.pipeline.delay_compensation = true;
    let summary = ausfuehren(&cfg).unwrap();

    assert_eq!(summary.frames, 1);
    assert_eq!(fs::read(&out).unwrap().len(), 320);
}

#[test]
fn fehlende_mikrofon_datei() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.alaw");
    let cfg = config(
        ProcessingMode::NoiseSuppressOnly,
        &dir.path().join("gibt-es-nicht.alaw"),
        None,
        &out,
    );
    let err = ausfuehren(&cfg).unwrap_err();
    assert!(format!("{err:#}").contains("Mikrofon"), "{err:#}");
}

#[test]
fn config_datei_laden() {
    let dir = TempDir::new().unwrap();
    let pfad = datei(
        &dir,
        "klarton.toml",
        br#"
[verarbeitung]
modus = "noise-suppress-only"
sample_rate = 8000
frame_size = 160

[verarbeitung.rauschunterdrueckung]
vad_enabled = true
"#,
    );
    let cfg = ToolConfig::laden(&pfad).unwrap().expect("Datei vorhanden");
    assert_eq!(cfg.verarbeitung.modus, ProcessingMode::NoiseSuppressOnly);
    assert_eq!(cfg.verarbeitung.pipeline.sample_rate, 8000);
    assert!(cfg.verarbeitung.pipeline.rauschunterdrueckung.vad_enabled);
}

#[test]
fn fehlende_config_ergibt_standard() {
    let dir = TempDir::new().unwrap();
    let geladen = ToolConfig::laden(&dir.path().join("fehlt.toml")).unwrap();
    assert!(geladen.is_none());
    let cfg = geladen.unwrap_or_default();
    assert_eq!(cfg.verarbeitung.modus, ProcessingMode::EchoThenNoiseSuppress);
    assert_eq!(cfg.verarbeitung.pipeline.frame_size, 320);
}

#[test]
fn kaputte_config_ist_fehler() {
    let dir = TempDir::new().unwrap();
    let pfad = datei(&dir, "klarton.toml", b"[verarbeitung\nmodus = 3");
    assert!(ToolConfig::laden(&pfad).is_err());

    let pfad = datei(&dir, "modus.toml", b"[verarbeitung]\nmodus = \"turbo\"\n");
    assert!(ToolConfig::laden(&pfad).is_err());
}
