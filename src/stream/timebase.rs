use crate::stream::error::DecodeError;

/// Device time stamps arrive in microseconds; the reference divisor turns
/// them into milliseconds.
pub const MICROS_PER_MILLI: f64 = 1_000.0;

/// Rebase a time channel to start at zero and rescale its units.
///
/// Relative spacing between samples is preserved exactly (up to the
/// divisor); only the origin moves.
pub fn normalize(series: &[f64], unit_divisor: f64) -> Result<Vec<f64>, DecodeError> {
    let first = series.first().copied().ok_or(DecodeError::EmptyChannel)?;
    Ok(series.iter().map(|v| (v - first) / unit_divisor).collect())
}
