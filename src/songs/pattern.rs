use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use crate::vision::Gesture;

/// Gestures a chart can demand on a beat.
pub const BEAT_GESTURES: [Gesture; 4] = [
    Gesture::Peace,
    Gesture::Index,
    Gesture::Fist,
    Gesture::OpenHand,
];

/// Derive the deterministic RNG seed for a song key.
///
/// The first eight bytes of the key's MD5 digest, read little-endian, give a
/// stable seed across runs and machines.
fn seed_for_key(key: &str) -> u64 {
    let digest = md5::compute(key.as_bytes());
    u64::from_le_bytes([
        digest.0[0], digest.0[1], digest.0[2], digest.0[3], digest.0[4], digest.0[5], digest.0[6],
        digest.0[7],
    ])
}

/// Number of beats a chart holds for the given tempo, length and tier
/// multiplier. Degenerate inputs produce an empty chart.
fn beat_count(bpm: f32, duration: f32, multiplier: f32) -> usize {
    let beats = bpm / 60.0 * duration * multiplier;
    if !beats.is_finite() || beats <= 0.0 {
        return 0;
    }
    beats as usize
}

/// Generate the gesture chart for a song.
///
/// The same key always yields the same chart; the tempo, duration and
/// multiplier only control its length.
pub fn generate(key: &str, bpm: f32, duration: f32, multiplier: f32) -> Vec<Gesture> {
    let mut rng = StdRng::seed_from_u64(seed_for_key(key));
    let length = beat_count(bpm, duration, multiplier);
    (0..length)
        .filter_map(|_| BEAT_GESTURES.choose(&mut rng).copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_length_follows_beats_and_multiplier() {
        // 120 BPM over 200 seconds at the Medium multiplier is 480 beats.
        let chart = generate("demo-song", 120.0, 200.0, 1.2);
        assert_eq!(chart.len(), 480);
    }

    #[test]
    fn chart_length_truncates_fractional_beats() {
        // 140 BPM over 250 seconds at 1.5 is 875 beats exactly; adding a
        // fraction of a beat must not round up.
        assert_eq!(beat_count(140.0, 250.0, 1.5), 875);
        assert_eq!(beat_count(61.0, 60.0, 1.0), 61);
        assert_eq!(beat_count(61.0, 59.0, 1.0), 59);
    }

    #[test]
    fn degenerate_inputs_produce_empty_charts() {
        assert!(generate("x", 0.0, 200.0, 1.0).is_empty());
        assert!(generate("x", 120.0, 0.0, 1.0).is_empty());
        assert!(generate("x", f32::NAN, 200.0, 1.0).is_empty());
    }

    #[test]
    fn charts_only_use_playable_gestures() {
        let chart = generate("alphabet-check", 120.0, 300.0, 2.0);
        assert!(chart.iter().all(|g| BEAT_GESTURES.contains(g)));
        for gesture in BEAT_GESTURES {
            assert!(
                chart.contains(&gesture),
                "{gesture} missing from a 1200-beat chart"
            );
        }
    }

    #[test]
    fn same_key_yields_same_chart() {
        let first = generate("repeatable", 128.0, 180.0, 1.2);
        let second = generate("repeatable", 128.0, 180.0, 1.2);
        assert_eq!(first, second);
    }

    #[test]
    fn different_keys_diverge() {
        let one = generate("song-one", 128.0, 180.0, 1.2);
        let two = generate("song-two", 128.0, 180.0, 1.2);
        assert_ne!(one, two);
    }
}
