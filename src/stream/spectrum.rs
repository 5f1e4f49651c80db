use rustfft::{num_complex::Complex, FftPlanner};

/// Positive-frequency power spectrum of one channel.
#[derive(Clone, Debug, Default)]
pub struct PowerSpectrum {
    pub frequencies_hz: Vec<f64>,
    pub power: Vec<f64>,
}

impl PowerSpectrum {
    /// Forward FFT of the mean-centered samples, keeping the strictly
    /// positive frequency bins with power `X * conj(X)`.
    ///
    /// `sample_spacing_s` is the spacing between consecutive samples in
    /// seconds; fewer than two samples or a non-positive spacing yields an
    /// empty spectrum.
    pub fn compute(samples: &[f64], sample_spacing_s: f64) -> Self {
        let n = samples.len();
        if n < 2 || sample_spacing_s <= 0.0 {
            return Self::default();
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let mut buffer: Vec<Complex<f64>> = samples
            .iter()
            .map(|&v| Complex::new(v - mean, 0.0))
            .collect();
        FftPlanner::<f64>::new().plan_fft_forward(n).process(&mut buffer);

        let bin_width = 1.0 / (n as f64 * sample_spacing_s);
        let half = n / 2;
        let mut frequencies_hz = Vec::with_capacity(half.saturating_sub(1));
        let mut power = Vec::with_capacity(half.saturating_sub(1));
        for (k, value) in buffer.iter().enumerate().take(half).skip(1) {
            frequencies_hz.push(k as f64 * bin_width);
            power.push(value.norm_sqr());
        }
        Self {
            frequencies_hz,
            power,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }

    pub fn peak(&self) -> Option<(f64, f64)> {
        self.frequencies_hz
            .iter()
            .zip(&self.power)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(&f, &p)| (f, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_peaks_at_its_own_frequency() {
        let sample_rate = 1_000.0;
        let tone_hz = 125.0;
        let samples: Vec<f64> = (0..512)
            .map(|i| (2.0 * std::f64::consts::PI * tone_hz * i as f64 / sample_rate).sin())
            .collect();
        let spectrum = PowerSpectrum::compute(&samples, 1.0 / sample_rate);
        let (peak_hz, peak_power) = spectrum.peak().unwrap();
        assert!((peak_hz - tone_hz).abs() < sample_rate / 512.0);
        assert!(peak_power > 0.0);
    }

    #[test]
    fn constant_signal_has_no_residual_power() {
        let samples = vec![3.3; 256];
        let spectrum = PowerSpectrum::compute(&samples, 1e-3);
        assert!(spectrum.power.iter().all(|&p| p < 1e-12));
    }

    #[test]
    fn dc_bin_is_excluded() {
        let samples: Vec<f64> = (0..128).map(|i| (i as f64 * 0.1).sin() + 100.0).collect();
        let spectrum = PowerSpectrum::compute(&samples, 1e-3);
        assert!(spectrum.frequencies_hz.iter().all(|&f| f > 0.0));
        assert_eq!(spectrum.frequencies_hz.len(), 128 / 2 - 1);
    }

    #[test]
    fn degenerate_inputs_yield_an_empty_spectrum() {
        assert!(PowerSpectrum::compute(&[], 1e-3).is_empty());
        assert!(PowerSpectrum::compute(&[1.0], 1e-3).is_empty());
        assert!(PowerSpectrum::compute(&[1.0, 2.0], 0.0).is_empty());
    }
}
