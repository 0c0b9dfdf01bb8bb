//! Frame timestamp normalization and animation phase helpers.
//!
//! Frame callbacks deliver monotonically increasing millisecond timestamps;
//! all motion formulas run on seconds. Nothing here carries state between
//! frames, which keeps every animation a pure function of the timestamp and
//! therefore reproducible: feeding the same timestamp sequence twice yields
//! bit-identical rotations.

/// Convert a host frame timestamp in milliseconds to animation seconds.
pub fn to_seconds(timestamp_ms: f64) -> f32 {
    (timestamp_ms * 0.001) as f32
}

/// Rotation angle in radians after `seconds` at `speed` radians per second.
pub fn spin(seconds: f32, speed: f32) -> f32 {
    seconds * speed
}

/// Per-object animation speed: a base rate plus an index-derived offset so
/// sibling objects animate out of phase.
pub fn indexed_speed(base: f32, step: f32, index: usize) -> f32 {
    base + index as f32 * step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milliseconds_to_seconds() {
        assert_eq!(to_seconds(0.0), 0.0);
        assert_eq!(to_seconds(1000.0), 1.0);
        assert_eq!(to_seconds(16.0), 0.016);
    }

    #[test]
    fn spin_is_reproducible() {
        let timestamps = [0.0, 16.7, 33.4, 1000.0, 2500.5];
        let first: Vec<f32> = timestamps
            .iter()
            .map(|&ms| spin(to_seconds(ms), 1.3))
            .collect();
        let second: Vec<f32> = timestamps
            .iter()
            .map(|&ms| spin(to_seconds(ms), 1.3))
            .collect();
        // bit-for-bit, not approximately
        assert_eq!(
            first.iter().map(|f| f.to_bits()).collect::<Vec<_>>(),
            second.iter().map(|f| f.to_bits()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn indexed_speeds_diverge() {
        assert_eq!(indexed_speed(1.0, 0.1, 0), 1.0);
        assert_eq!(indexed_speed(1.0, 0.1, 2), 1.2);
        assert_eq!(indexed_speed(0.1, 0.05, 1), 0.15);
    }
}
