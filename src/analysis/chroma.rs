//! Chroma extraction - harmonic-product energy per pitch class
//!
//! Each of the 12 pitch classes is measured in a band a quarter tone either
//! side of its reference frequency, starting at middle C (MIDI 60). The band
//! mean is taken once per octave and the per-octave means are multiplied, so
//! a pitch class with energy in several octaves outscores a transient peak in
//! a single band.

/// Number of pitch classes (C..B)
pub const PITCH_CLASSES: usize = 12;

/// Frequencies below this are excluded from every energy estimate (DC, rumble)
pub const HIGH_PASS_HZ: f32 = 50.0;

/// MIDI note of the lowest reference octave (C4)
pub const REFERENCE_MIDI_NOTE: i32 = 60;

/// Largest usable octave count. C4 doubled 16 times is far above the
/// Nyquist frequency of any audio sample rate.
pub const MAX_OCTAVE_COUNT: usize = 16;

/// Frequency ratio of a quarter tone, 2^(1/24)
pub fn quarter_tone_ratio() -> f32 {
    2f32.powf(1.0 / 24.0)
}

/// Equal-tempered frequency of a MIDI note (A4 = 440 Hz)
pub fn midi_to_freq(midi: i32) -> f32 {
    440.0 * 2f32.powf((midi - 69) as f32 / 12.0)
}

/// FFT bin containing `freq`: floor(freq·n / sample_rate)
pub fn freq_to_bin(freq: f32, n: usize, sample_rate: u32) -> usize {
    let bin = (freq * n as f32 / sample_rate as f32).floor();
    if bin <= 0.0 {
        0
    } else {
        bin as usize
    }
}

/// First bin included in energy estimates
pub fn high_pass_bin(n: usize, sample_rate: u32) -> usize {
    freq_to_bin(HIGH_PASS_HZ, n, sample_rate)
}

/// Mean of `power[lower..=upper]`, 0 for an empty range
fn band_mean(power: &[f32], lower: usize, upper: usize) -> f32 {
    if lower > upper {
        return 0.0;
    }
    let band = &power[lower..=upper];
    band.iter().sum::<f32>() / band.len() as f32
}

/// Compute the 12-bin chroma vector.
///
/// # Arguments
/// * `power` - Power spectrum of bins `0..=n/2`
/// * `n` - FFT size the spectrum came from
/// * `sample_rate` - Sample rate in Hz
/// * `octave_count` - Octaves multiplied into each bin
///
/// # Returns
/// Non-negative energy per pitch class, index 0 = C
pub fn compute_chroma(
    power: &[f32],
    n: usize,
    sample_rate: u32,
    octave_count: usize,
) -> [f32; PITCH_CLASSES] {
    debug_assert_eq!(power.len(), n / 2 + 1);
    let nyquist_bin = n / 2;
    let high_pass = high_pass_bin(n, sample_rate);
    let ratio = quarter_tone_ratio();

    let mut chroma = [1.0f32; PITCH_CLASSES];
    let mut reference = midi_to_freq(REFERENCE_MIDI_NOTE);

    for value in chroma.iter_mut() {
        let mut lower_freq = reference / ratio;
        let mut upper_freq = reference * ratio;

        for _ in 0..octave_count {
            let lower = freq_to_bin(lower_freq, n, sample_rate).max(high_pass);
            let upper = freq_to_bin(upper_freq, n, sample_rate).min(nyquist_bin);
            *value *= band_mean(power, lower, upper);

            lower_freq *= 2.0;
            upper_freq *= 2.0;
        }

        reference *= ratio * ratio;
    }

    chroma
}

/// Largest power in `[high_pass_bin, n/2)`
pub fn max_power(power: &[f32], high_pass: usize, n: usize) -> f32 {
    let end = (n / 2).min(power.len());
    if high_pass >= end {
        return 0.0;
    }
    power[high_pass..end].iter().copied().fold(0.0f32, f32::max)
}

/// Fill the harmonic display curve.
///
/// `harmonic[i]` is the product of the magnitudes at `i, 2i, ... octave_count·i`.
/// Bins below the high-pass, and bins whose top harmonic lies past Nyquist,
/// are 0.
///
/// # Arguments
/// * `power` - Power spectrum of bins `0..=n/2`
/// * `high_pass` - First bin considered
/// * `octave_count` - Number of harmonics multiplied
/// * `harmonic` - Output, n/2 values
pub fn compute_harmonic_spectrum(
    power: &[f32],
    high_pass: usize,
    octave_count: usize,
    harmonic: &mut [f32],
) {
    let limit = harmonic.len();
    for (i, out) in harmonic.iter_mut().enumerate() {
        if i < high_pass || i * octave_count >= limit {
            *out = 0.0;
            continue;
        }
        *out = (1..=octave_count)
            .map(|h| power[i * h].sqrt())
            .product();
    }
}

/// Chroma rescaled to sum to 1 for relative display (all zeros stays zero)
pub fn relative_chroma(chroma: &[f32; PITCH_CLASSES]) -> [f32; PITCH_CLASSES] {
    let total: f32 = chroma.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return [0.0; PITCH_CLASSES];
    }
    let mut relative = *chroma;
    for value in relative.iter_mut() {
        *value /= total;
    }
    relative
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_frequencies() {
        assert!((midi_to_freq(69) - 440.0).abs() < 1e-3);
        assert!((midi_to_freq(60) - 261.6256).abs() < 1e-2);
        assert!((quarter_tone_ratio().powi(24) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_bin_mapping() {
        assert_eq!(freq_to_bin(0.0, 8192, 44_100), 0);
        assert_eq!(high_pass_bin(8192, 44_100), 9);
        // C4 at 44.1 kHz / 8192 lands in bin 48
        assert_eq!(freq_to_bin(261.63, 8192, 44_100), 48);
        assert_eq!(freq_to_bin(22_050.0, 8192, 44_100), 4096);
    }

    #[test]
    fn test_silent_spectrum_gives_zero_chroma() {
        let n = 1024;
        let power = vec![0.0; n / 2 + 1];
        let chroma = compute_chroma(&power, n, 44_100, 3);
        assert_eq!(chroma, [0.0; PITCH_CLASSES]);
        assert_eq!(max_power(&power, high_pass_bin(n, 44_100), n), 0.0);
    }

    #[test]
    fn test_energy_in_c_band_lands_in_chroma_zero() {
        let n = 8192;
        let sample_rate = 44_100;
        let mut power = vec![1.0; n / 2 + 1];
        // Boost the C4 band (bins 47..=50)
        for bin in &mut power[47..=50] {
            *bin = 100.0;
        }

        let chroma = compute_chroma(&power, n, sample_rate, 1);
        assert!((chroma[0] - 100.0).abs() < 1e-3);
        // C# shares edge bin 50 with C's upper edge
        assert!(chroma[1] > 1.0 && chroma[1] < chroma[0]);
        for p in 2..PITCH_CLASSES {
            assert!((chroma[p] - 1.0).abs() < 1e-6, "pitch class {}", p);
        }
    }

    #[test]
    fn test_octave_bands_multiply() {
        let n = 8192;
        let sample_rate = 44_100;
        let mut power = vec![1.0; n / 2 + 1];
        for bin in &mut power[47..=50] {
            *bin = 10.0;
        }
        // C5 band is the C4 band edges doubled: bins 94..=100
        for bin in &mut power[94..=100] {
            *bin = 3.0;
        }

        let chroma = compute_chroma(&power, n, sample_rate, 2);
        assert!((chroma[0] - 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_band_is_clamped_to_nyquist() {
        // Tiny FFT: upper octaves run past Nyquist and must not index out of range
        let n = 64;
        let power = vec![1.0; n / 2 + 1];
        let chroma = compute_chroma(&power, n, 8_000, 8);
        assert!(chroma.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_harmonic_spectrum_products() {
        let power = vec![4.0; 9];
        let mut harmonic = vec![0.0; 8];
        compute_harmonic_spectrum(&power, 1, 2, &mut harmonic);

        assert_eq!(harmonic[0], 0.0);
        // sqrt(4) * sqrt(4) for bins whose second harmonic is in range
        assert_eq!(&harmonic[1..4], &[4.0, 4.0, 4.0]);
        assert!(harmonic[4..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_relative_chroma_sums_to_one() {
        let mut chroma = [0.0; PITCH_CLASSES];
        chroma[0] = 3.0;
        chroma[4] = 1.0;
        let relative = relative_chroma(&chroma);
        assert!((relative.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert!((relative[0] - 0.75).abs() < 1e-6);

        assert_eq!(relative_chroma(&[0.0; PITCH_CLASSES]), [0.0; PITCH_CLASSES]);
    }
}
