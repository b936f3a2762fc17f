//! G.711 A-law Codec
//!
//! Bit-exakte Umwandlung zwischen 8-Bit-A-law-Samples und linearem
//! 16-Bit-PCM nach ITU-T G.711. Zustandslos, keine Fehlerfaelle: jedes
//! A-law-Byte ist gueltig und jedes i16 wird (verlustbehaftet) kodiert.
//!
//! Aufbau eines A-law-Bytes (vor dem Toggeln der geraden Bits):
//! `S SSS MMMM` – Vorzeichen (1 = positiv), 3-Bit-Segment, 4-Bit-Mantisse.

/// A-law-Code fuer digitale Stille
pub const SILENCE: u8 = 0xD5;

/// Maske fuer positive Samples (Vorzeichenbit + gerade Bits getoggelt)
const MASK_POSITIVE: u8 = 0xD5;
/// Maske fuer negative Samples (nur gerade Bits getoggelt)
const MASK_NEGATIVE: u8 = 0x55;

/// Obere Grenze jedes Segments im 13-Bit-Betragsbereich
const SEGMENT_END: [i16; 8] = [0x1F, 0x3F, 0x7F, 0xFF, 0x1FF, 0x3FF, 0x7FF, 0xFFF];

/// Dekodiertabelle, zur Compilezeit aufgebaut
const DECODE_TABLE: [i16; 256] = build_decode_table();

/// Rekonstruiert den Mittelpunkt des Quantisierungsintervalls eines Codes
const fn expand(code: u8) -> i16 {
    let a = code ^ MASK_NEGATIVE;
    let mut t = ((a & 0x0F) as i16) << 4;
    let segment = (a & 0x70) >> 4;
    match segment {
        0 => t += 8,
        1 => t += 0x108,
        _ => {
            t += 0x108;
            t <<= segment - 1;
        }
    }
    if a & 0x80 != 0 {
        t
    } else {
        -t
    }
}

const fn build_decode_table() -> [i16; 256] {
    let mut table = [0i16; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = expand(i as u8);
        i += 1;
    }
    // Gepolsterte Frames muessen digitale Stille ergeben, nicht +8
    table[SILENCE as usize] = 0;
    table
}

/// Dekodiert ein A-law-Sample zu linearem PCM16
#[inline]
pub fn decode(alaw: u8) -> i16 {
    DECODE_TABLE[alaw as usize]
}

/// Kodiert ein lineares PCM16-Sample zu A-law
///
/// Betraege ausserhalb des obersten Segments werden auf dessen Maximum begrenzt.
pub fn encode(sample: i16) -> u8 {
    // 13 signifikante Bits
    let mut pcm = sample >> 3;
    let mask = if pcm >= 0 {
        MASK_POSITIVE
    } else {
        pcm = -pcm - 1;
        MASK_NEGATIVE
    };

    match SEGMENT_END.iter().position(|&end| pcm <= end) {
        Some(segment) => {
            let mantissa = if segment < 2 {
                (pcm >> 1) & 0x0F
            } else {
                (pcm >> segment) & 0x0F
            };
            (((segment as u8) << 4) | mantissa as u8) ^ mask
        }
        None => 0x7F ^ mask,
    }
}

/// Dekodiert einen A-law-Puffer in einen PCM16-Puffer.
///
/// Verarbeitet nur bis zur kuerzeren der beiden Laengen; ueberzaehlige
/// Elemente bleiben unveraendert. Gibt die Anzahl umgewandelter Samples zurueck.
pub fn decode_buffer(alaw: &[u8], pcm: &mut [i16]) -> usize {
    let n = alaw.len().min(pcm.len());
    for (out, &code) in pcm[..n].iter_mut().zip(&alaw[..n]) {
        *out = decode(code);
    }
    n
}

/// Kodiert einen PCM16-Puffer in einen A-law-Puffer.
///
/// Gleiche Kuerzungsregel wie [`decode_buffer`].
pub fn encode_buffer(pcm: &[i16], alaw: &mut [u8]) -> usize {
    let n = pcm.len().min(alaw.len());
    for (out, &sample) in alaw[..n].iter_mut().zip(&pcm[..n]) {
        *out = encode(sample);
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stille_roundtrip_exakt() {
        assert_eq!(decode(SILENCE), 0);
        assert_eq!(encode(0), SILENCE);
    }

    #[test]
    fn referenzvektoren_kodieren() {
        assert_eq!(encode(100), 0xD3);
        assert_eq!(encode(-100), 0x53);
        assert_eq!(encode(32767), 0xAA);
        assert_eq!(encode(-32768), 0x2A);
        assert_eq!(encode(-1), 0x55);
    }

    #[test]
    fn referenzvektoren_dekodieren() {
        // Werte aus der G.711-Rekonstruktionstabelle
        assert_eq!(decode(0x00), -5504);
        assert_eq!(decode(0x80), 5504);
        assert_eq!(decode(0x55), -8);
        assert_eq!(decode(0xD4), 24);
        assert_eq!(decode(0xD3), 104);
        assert_eq!(decode(0xAA), 32256);
        assert_eq!(decode(0x2A), -32256);
        assert_eq!(decode(0xFF), 848);
    }

    #[test]
    fn vorzeichen_konvention() {
        for code in 0u8..=255 {
            let wert = decode(code);
            if code < 0x80 {
                assert!(wert < 0, "Code 0x{code:02X} muss negativ sein: {wert}");
            } else if code != SILENCE {
                assert!(wert > 0, "Code 0x{code:02X} muss positiv sein: {wert}");
            }
        }
    }

    #[test]
    fn alle_codes_roundtrip() {
        for code in 0u8..=255 {
            assert_eq!(
                encode(decode(code)),
                code,
                "encode(decode(0x{code:02X})) weicht ab"
            );
        }
    }

    #[test]
    fn roundtrip_toleranz_waechst_mit_betrag() {
        for (wert, toleranz) in [
            (0i16, 0i32),
            (100, 10),
            (-100, 10),
            (1000, 10),
            (-1000, 10),
            (10000, 100),
            (-10000, 100),
            (32767, 1000),
            (-32768, 1000),
        ] {
            let zurueck = decode(encode(wert));
            let fehler = (i32::from(zurueck) - i32::from(wert)).abs();
            assert!(
                fehler <= toleranz,
                "{wert} -> 0x{:02X} -> {zurueck} (Fehler {fehler}, Toleranz {toleranz})",
                encode(wert)
            );
        }
    }

    #[test]
    fn quantisierungsfehler_im_segmentband() {
        for wert in (i16::MIN..=i16::MAX).step_by(7) {
            let fehler = (i32::from(decode(encode(wert))) - i32::from(wert)).abs();
            let grenze = (i32::from(wert).abs() / 32 + 1).max(16);
            assert!(fehler <= grenze, "{wert}: Fehler {fehler} > {grenze}");
        }
    }

    #[test]
    fn kodieren_ist_idempotent() {
        for wert in (i16::MIN..=i16::MAX).step_by(13) {
            let code = encode(wert);
            assert_eq!(encode(decode(code)), code);
        }
    }

    #[test]
    fn puffer_kuerzere_laenge_gewinnt() {
        let pcm = [0i16, 100, -100, 1000, -1000];
        let mut alaw = [0u8; 3];
        assert_eq!(encode_buffer(&pcm, &mut alaw), 3);
        assert_eq!(alaw, [0xD5, 0xD3, 0x53]);

        let mut zurueck = [7i16; 5];
        assert_eq!(decode_buffer(&alaw, &mut zurueck), 3);
        assert_eq!(zurueck[0], 0);
        // Ueberzaehlige Elemente bleiben unveraendert
        assert_eq!(&zurueck[3..], &[7, 7]);
    }

    #[test]
    fn puffer_roundtrip_innerhalb_toleranz() {
        let pcm = [0i16, 100, -100, 1000, -1000];
        let mut alaw = [0u8; 5];
        let mut zurueck = [0i16; 5];
        encode_buffer(&pcm, &mut alaw);
        decode_buffer(&alaw, &mut zurueck);
        for (a, b) in pcm.iter().zip(&zurueck) {
            assert!((i32::from(*a) - i32::from(*b)).abs() <= 10, "{a} -> {b}");
        }
    }

    #[test]
    fn leere_puffer() {
        assert_eq!(decode_buffer(&[], &mut [0i16; 4]), 0);
        assert_eq!(encode_buffer(&[1, 2], &mut []), 0);
    }
}
