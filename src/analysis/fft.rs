// FFT module - power spectrum of one analysis window
//
// The plan and both work buffers are allocated once per window size, so a
// transform on the analysis thread never allocates. No window function is
// applied: chroma band edges are defined on the raw transform.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::error::{try_zeroed, AnalysisError};

/// Planned forward FFT for real-valued input
pub struct FftProcessor {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl FftProcessor {
    /// Create a processor for windows of `fft_size` samples
    ///
    /// # Errors
    /// `InvalidWindowSize` for odd sizes or sizes below 2,
    /// `ResourceExhausted` if the work buffers cannot be allocated
    pub fn new(fft_size: usize) -> Result<Self, AnalysisError> {
        if fft_size < 2 || fft_size % 2 != 0 {
            return Err(AnalysisError::InvalidWindowSize { size: fft_size });
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let buffer = try_zeroed(fft_size, "FFT buffer")?;
        let scratch = try_zeroed(fft.get_inplace_scratch_len(), "FFT scratch")?;

        Ok(Self {
            fft,
            fft_size,
            buffer,
            scratch,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of non-redundant bins produced for real input (n/2 + 1)
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Compute `re² + im²` for bins `0..=n/2`.
    ///
    /// # Arguments
    /// * `signal` - Exactly `fft_size` samples
    /// * `power` - Output, exactly `bin_count()` values
    pub fn compute_power_spectrum(
        &mut self,
        signal: &[f32],
        power: &mut [f32],
    ) -> Result<(), AnalysisError> {
        if signal.len() != self.fft_size {
            return Err(AnalysisError::WindowSizeMismatch {
                expected: self.fft_size,
                actual: signal.len(),
            });
        }
        debug_assert_eq!(power.len(), self.bin_count());

        for (slot, &sample) in self.buffer.iter_mut().zip(signal) {
            *slot = Complex::new(sample, 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        for (out, bin) in power.iter_mut().zip(&self.buffer[..self.bin_count()]) {
            *out = bin.norm_sqr();
        }
        Ok(())
    }
}
