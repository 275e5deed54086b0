//! Synthetic test signals
//!
//! Deterministic generators shared by unit tests, integration tests and the
//! CLI demo. Noise uses a seeded [`StdRng`] so runs are reproducible.

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f64::consts::PI;

use crate::analysis::chroma::{midi_to_freq, REFERENCE_MIDI_NOTE};
use crate::analysis::Chord;

/// Relative amplitudes of root, third and fifth in synthesized triads
pub const TRIAD_WEIGHTS: [f32; 3] = [1.0, 0.8, 0.6];

/// Seed used by [`white_noise`] when callers don't need a specific one
pub const DEFAULT_NOISE_SEED: u64 = 0x5A5A_FFF0;

/// A single sinusoidal component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partial {
    pub frequency_hz: f32,
    pub amplitude: f32,
}

impl Partial {
    pub fn new(frequency_hz: f32, amplitude: f32) -> Self {
        Self {
            frequency_hz,
            amplitude,
        }
    }
}

/// `len` samples of a sine starting at phase 0
pub fn sine(frequency_hz: f32, amplitude: f32, sample_rate: u32, len: usize) -> Vec<f32> {
    mix(&[Partial::new(frequency_hz, amplitude)], sample_rate, len)
}

/// `len` samples of superposed sines
pub fn mix(partials: &[Partial], sample_rate: u32, len: usize) -> Vec<f32> {
    let mut source = ToneSource::new(partials.to_vec(), sample_rate);
    let mut out = vec![0.0; len];
    source.fill(&mut out);
    out
}

/// Partials of a triad voiced from octave 4, weighted by [`TRIAD_WEIGHTS`]
pub fn triad_partials(chord: Chord) -> Vec<Partial> {
    let base = REFERENCE_MIDI_NOTE + chord.root as i32;
    chord
        .quality
        .degrees()
        .iter()
        .zip(TRIAD_WEIGHTS)
        .map(|(&degree, weight)| Partial::new(midi_to_freq(base + degree as i32), weight))
        .collect()
}

/// `len` samples of a synthesized triad
pub fn triad(chord: Chord, sample_rate: u32, len: usize) -> Vec<f32> {
    mix(&triad_partials(chord), sample_rate, len)
}

/// C4 + E4 + G4 at 1.0 / 0.8 / 0.6
pub fn c_major_triad(sample_rate: u32, len: usize) -> Vec<f32> {
    triad(
        Chord::new(0, crate::analysis::ChordQuality::Major),
        sample_rate,
        len,
    )
}

/// Uniform noise in `[-amplitude, amplitude)`
pub fn white_noise(amplitude: f32, len: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            if amplitude > 0.0 {
                rng.gen_range(-amplitude..amplitude)
            } else {
                0.0
            }
        })
        .collect()
}

/// Continuous multi-sine source for feeding a pipeline frame by frame
#[derive(Debug, Clone)]
pub struct ToneSource {
    partials: Vec<Partial>,
    sample_rate: u32,
    position: u64,
}

impl ToneSource {
    pub fn new(partials: Vec<Partial>, sample_rate: u32) -> Self {
        Self {
            partials,
            sample_rate,
            position: 0,
        }
    }

    pub fn for_chord(chord: Chord, sample_rate: u32) -> Self {
        Self::new(triad_partials(chord), sample_rate)
    }

    /// Write the next `buffer.len()` samples
    pub fn fill(&mut self, buffer: &mut [f32]) {
        let sample_rate = self.sample_rate as f64;
        for sample in buffer.iter_mut() {
            let t = self.position as f64 / sample_rate;
            *sample = self
                .partials
                .iter()
                .map(|p| (p.amplitude as f64 * (2.0 * PI * p.frequency_hz as f64 * t).sin()) as f32)
                .sum();
            self.position += 1;
        }
    }

    /// Samples generated so far
    pub fn position(&self) -> u64 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ChordQuality;

    #[test]
    fn test_sine_shape() {
        let signal = sine(11_025.0, 0.5, 44_100, 8);
        // Quarter of the sample rate: 0, 0.5, 0, -0.5, ...
        let expected = [0.0, 0.5, 0.0, -0.5, 0.0, 0.5, 0.0, -0.5];
        for (got, want) in signal.iter().zip(expected) {
            assert!((got - want).abs() < 1e-5, "{} vs {}", got, want);
        }
    }

    #[test]
    fn test_triad_partials() {
        let partials = triad_partials(Chord::new(9, ChordQuality::Minor));
        assert_eq!(partials.len(), 3);
        assert!((partials[0].frequency_hz - 440.0).abs() < 1e-2);
        assert!((partials[1].frequency_hz - 523.25).abs() < 1e-1);
        assert!((partials[2].frequency_hz - 659.26).abs() < 1e-1);
        assert_eq!(partials[1].amplitude, 0.8);
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let one_shot = c_major_triad(44_100, 64);
        let mut source = ToneSource::for_chord(Chord::new(0, ChordQuality::Major), 44_100);
        let mut streamed = vec![0.0; 64];
        source.fill(&mut streamed[..20]);
        source.fill(&mut streamed[20..]);
        assert_eq!(one_shot, streamed);
        assert_eq!(source.position(), 64);
    }

    #[test]
    fn test_white_noise_is_seeded_and_bounded() {
        let a = white_noise(0.25, 512, 7);
        let b = white_noise(0.25, 512, 7);
        assert_eq!(a, b);
        assert!(a.iter().all(|s| (-0.25..0.25).contains(s)));
        assert_ne!(a, white_noise(0.25, 512, 8));
        assert!(white_noise(0.0, 4, 1).iter().all(|&s| s == 0.0));
    }
}
