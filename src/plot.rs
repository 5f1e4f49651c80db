use std::io::Cursor;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::live::{TimeTrace, TraceView};
use crate::stream::PowerSpectrum;

#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub trace_color: RGBColor,
    pub spectrum_color: RGBColor,
    /// Fixed vertical range of the time panel, in volts.
    pub trace_range: (f64, f64),
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 600,
            background: RGBColor(10, 10, 10),
            trace_color: CYAN,
            spectrum_color: MAGENTA,
            // ADC full scale.
            trace_range: (0.0, 3.3),
        }
    }
}

/// Renders both panels into a PNG snapshot, rewritten on every cycle;
/// point an auto-reloading image viewer at the file for a live display.
pub struct SnapshotView {
    path: PathBuf,
    style: PlotStyle,
}

impl SnapshotView {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            style: PlotStyle::default(),
        }
    }

    pub fn with_style(path: impl Into<PathBuf>, style: PlotStyle) -> Self {
        Self {
            path: path.into(),
            style,
        }
    }
}

impl TraceView for SnapshotView {
    fn show(&mut self, trace: &TimeTrace, spectrum: &PowerSpectrum) -> Result<()> {
        let png = render_snapshot(trace, spectrum, &self.style)?;
        std::fs::write(&self.path, png)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}

pub fn render_snapshot(
    trace: &TimeTrace,
    spectrum: &PowerSpectrum,
    style: &PlotStyle,
) -> Result<Vec<u8>> {
    if trace.time_ms.is_empty() {
        return Err(anyhow!("time trace has no samples"));
    }
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)
            .map_err(|e| anyhow!("failed to clear canvas: {e}"))?;
        let (upper, lower) = root.clone().split_vertically((style.height / 2) as i32);
        draw_trace(&upper, trace, style)?;
        draw_spectrum(&lower, spectrum, style)?;
        root.present()
            .map_err(|e| anyhow!("failed to finalize canvas: {e}"))?;
    }
    encode_png(&buffer, style.width, style.height)
}

fn draw_trace(
    area: &DrawingArea<BitMapBackend, Shift>,
    trace: &TimeTrace,
    style: &PlotStyle,
) -> Result<()> {
    let t_start = trace.time_ms[0];
    let mut t_end = trace.time_ms[trace.time_ms.len() - 1];
    if t_end <= t_start {
        t_end = t_start + 1.0;
    }
    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .caption("A0", ("sans-serif", 20).into_font().color(&WHITE))
        .set_label_area_size(LabelAreaPosition::Left, 50)
        .set_label_area_size(LabelAreaPosition::Bottom, 35)
        .build_cartesian_2d(t_start..t_end, style.trace_range.0..style.trace_range.1)
        .map_err(|e| anyhow!("failed to lay out time panel: {e}"))?;
    chart
        .configure_mesh()
        .light_line_style(WHITE.mix(0.1))
        .x_desc("Time (ms)")
        .y_desc("A0 (V)")
        .axis_desc_style(("sans-serif", 14).into_font().color(&WHITE))
        .draw()
        .map_err(|e| anyhow!("failed to draw time mesh: {e}"))?;
    chart
        .draw_series(LineSeries::new(
            trace
                .time_ms
                .iter()
                .copied()
                .zip(trace.volts.iter().copied()),
            &style.trace_color,
        ))
        .map_err(|e| anyhow!("failed to draw time trace: {e}"))?;
    Ok(())
}

fn draw_spectrum(
    area: &DrawingArea<BitMapBackend, Shift>,
    spectrum: &PowerSpectrum,
    style: &PlotStyle,
) -> Result<()> {
    let f_max = spectrum
        .frequencies_hz
        .last()
        .copied()
        .unwrap_or(1.0)
        .max(1.0);
    // Rescaled every refresh so the dominant peak always fits.
    let p_max = spectrum
        .power
        .iter()
        .copied()
        .fold(0.0f64, f64::max)
        .max(1e-12);
    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .caption("Power spectrum", ("sans-serif", 20).into_font().color(&WHITE))
        .set_label_area_size(LabelAreaPosition::Left, 50)
        .set_label_area_size(LabelAreaPosition::Bottom, 35)
        .build_cartesian_2d(0.0..f_max, 0.0..p_max)
        .map_err(|e| anyhow!("failed to lay out spectrum panel: {e}"))?;
    chart
        .configure_mesh()
        .light_line_style(WHITE.mix(0.1))
        .x_desc("Frequency (Hz)")
        .axis_desc_style(("sans-serif", 14).into_font().color(&WHITE))
        .draw()
        .map_err(|e| anyhow!("failed to draw spectrum mesh: {e}"))?;
    chart
        .draw_series(LineSeries::new(
            spectrum
                .frequencies_hz
                .iter()
                .copied()
                .zip(spectrum.power.iter().copied()),
            &style.spectrum_color,
        ))
        .map_err(|e| anyhow!("failed to draw spectrum trace: {e}"))?;
    Ok(())
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let img = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| anyhow!("failed to allocate image buffer"))?;
    let mut output = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
        .context("failed to encode snapshot as png")?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_renders_to_png() {
        let trace = TimeTrace {
            time_ms: (0..64).map(|i| i as f64 * 0.05).collect(),
            volts: (0..64).map(|i| 1.65 + (i as f64 * 0.4).sin()).collect(),
        };
        let spectrum = PowerSpectrum::compute(&trace.volts, 50e-6);
        let png = render_snapshot(&trace, &spectrum, &PlotStyle::default()).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn empty_trace_is_rejected() {
        let trace = TimeTrace {
            time_ms: vec![],
            volts: vec![],
        };
        let spectrum = PowerSpectrum::default();
        assert!(render_snapshot(&trace, &spectrum, &PlotStyle::default()).is_err());
    }
}
