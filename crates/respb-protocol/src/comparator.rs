//! Byte-level comparison between a TP frame and its BP re-encoding.

use serde::Serialize;

/// One measurement of a single frame's TP-vs-BP size comparison.
#[derive(Debug, Clone, Serialize)]
pub struct Measurement {
    pub verb_preview: String,
    pub tp_size: usize,
    pub bp_size: usize,
    pub delta: i64,
    pub delta_pct: f64,
    pub tp_hex_preview: String,
    pub bp_hex_preview: String,
}

const HEX_PREVIEW_BYTES: usize = 32;

/// Compare `tp_bytes` against `bp_bytes` for the given verb, producing a
/// [`Measurement`]. `delta_pct` is defined as `0.0` when `tp_size == 0`.
#[must_use]
pub fn compare(verb: &str, tp_bytes: &[u8], bp_bytes: &[u8]) -> Measurement {
    let tp_size = tp_bytes.len();
    let bp_size = bp_bytes.len();
    let delta = tp_size as i64 - bp_size as i64;
    let delta_pct = if tp_size == 0 {
        0.0
    } else {
        delta as f64 / tp_size as f64 * 100.0
    };

    Measurement {
        verb_preview: verb.to_string(),
        tp_size,
        bp_size,
        delta,
        delta_pct,
        tp_hex_preview: hex_preview(tp_bytes),
        bp_hex_preview: hex_preview(bp_bytes),
    }
}

fn hex_preview(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take(HEX_PREVIEW_BYTES)
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_and_pct_are_consistent() {
        let m = compare("GET", &[0u8; 24], &[0u8; 12]);
        assert_eq!(m.delta, 12);
        assert!((m.delta_pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn empty_tp_size_yields_zero_pct() {
        let m = compare("X", &[], &[1, 2, 3]);
        assert_eq!(m.delta_pct, 0.0);
        assert_eq!(m.delta, -3);
    }

    #[test]
    fn negative_delta_is_a_legitimate_measurement() {
        let m = compare("PING", &[0u8; 2], &[0u8; 4]);
        assert_eq!(m.delta, -2);
    }
}
