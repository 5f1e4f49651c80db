use ndarray::{Array3, Axis};

use crate::stream::error::DecodeError;

/// Fixed per-acquisition frame shape: `channel_count` lanes of
/// `frame_length` samples each, emitted back-to-back with no delimiter.
/// Channel 0 is always the time channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameGeometry {
    channel_count: usize,
    frame_length: usize,
}

impl FrameGeometry {
    pub fn new(channel_count: usize, frame_length: usize) -> Result<Self, DecodeError> {
        if channel_count == 0 || frame_length == 0 {
            return Err(DecodeError::InvalidGeometry);
        }
        Ok(Self {
            channel_count,
            frame_length,
        })
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn frame_length(&self) -> usize {
        self.frame_length
    }

    /// Flat samples per frame.
    pub fn frame_samples(&self) -> usize {
        self.channel_count * self.frame_length
    }
}

impl Default for FrameGeometry {
    /// Reference logger: one time channel plus one ADC channel, 2000
    /// samples per lane per flush.
    fn default() -> Self {
        Self {
            channel_count: 2,
            frame_length: 2000,
        }
    }
}

/// Decodes one raw acquisition payload into per-channel sample series.
///
/// The device prints every sample followed by the field separator and ends
/// the record with a line terminator, so the final token of a split is
/// never numeric and is always discarded before parsing.
pub struct FrameDecoder {
    geometry: FrameGeometry,
}

impl FrameDecoder {
    pub fn new(geometry: FrameGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Tokenize, parse, reshape into whole frames and deinterleave.
    ///
    /// Returns `channel_count` series, each the concatenation of that
    /// channel's lane across every frame in payload order.
    pub fn decode(&self, payload: &str) -> Result<Vec<Vec<f64>>, DecodeError> {
        let mut tokens: Vec<&str> = payload.split(',').collect();
        // Trailing terminator artifact; split always yields at least one token.
        tokens.pop();

        let samples = tokens
            .iter()
            .enumerate()
            .map(|(index, token)| {
                token.trim().parse::<f64>().map_err(|_| DecodeError::BadToken {
                    index,
                    token: (*token).to_owned(),
                })
            })
            .collect::<Result<Vec<f64>, DecodeError>>()?;

        if samples.is_empty() {
            return Err(DecodeError::EmptyPayload);
        }
        let frame_samples = self.geometry.frame_samples();
        if samples.len() % frame_samples != 0 {
            return Err(DecodeError::Framing {
                samples: samples.len(),
                frame_samples,
            });
        }
        let frames = samples.len() / frame_samples;

        let cube = Array3::from_shape_vec(
            (
                frames,
                self.geometry.channel_count(),
                self.geometry.frame_length(),
            ),
            samples,
        )
        .map_err(|_| DecodeError::Framing {
            samples: frames * frame_samples,
            frame_samples,
        })?;

        // One allocation per channel, filled in frame order.
        let series_len = frames * self.geometry.frame_length();
        let channels = (0..self.geometry.channel_count())
            .map(|channel| {
                let lane = cube.index_axis(Axis(1), channel);
                let mut series = Vec::with_capacity(series_len);
                series.extend(lane.iter().copied());
                series
            })
            .collect();
        Ok(channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder(channels: usize, frame_length: usize) -> FrameDecoder {
        FrameDecoder::new(FrameGeometry::new(channels, frame_length).unwrap())
    }

    /// Encode frames the way the device does: every sample trailed by a
    /// comma, record closed by the newline the transport strips off.
    fn encode(flat: &[f64]) -> String {
        flat.iter().map(|v| format!("{v},")).collect()
    }

    #[test]
    fn single_frame_decodes_to_raw_slices() {
        let channels = decoder(2, 3).decode(&encode(&[0.0, 10.0, 20.0, 1.0, 2.0, 3.0])).unwrap();
        assert_eq!(channels, vec![vec![0.0, 10.0, 20.0], vec![1.0, 2.0, 3.0]]);
    }

    #[test]
    fn two_frames_concatenate_per_channel() {
        let flat = [
            0.0, 10.0, 20.0, 1.0, 2.0, 3.0, // frame 0
            30.0, 40.0, 50.0, 4.0, 5.0, 6.0, // frame 1
        ];
        let channels = decoder(2, 3).decode(&encode(&flat)).unwrap();
        assert_eq!(channels[0], vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
        assert_eq!(channels[1], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn round_trips_synthetic_frames() {
        let geometry = FrameGeometry::new(3, 4).unwrap();
        let frames = 5;
        let mut flat = Vec::new();
        let mut expected = vec![Vec::new(); geometry.channel_count()];
        for frame in 0..frames {
            for channel in 0..geometry.channel_count() {
                for slot in 0..geometry.frame_length() {
                    let value = (frame * 100 + channel * 10 + slot) as f64;
                    flat.push(value);
                    expected[channel].push(value);
                }
            }
        }
        let channels = FrameDecoder::new(geometry).decode(&encode(&flat)).unwrap();
        assert_eq!(channels, expected);
    }

    #[test]
    fn partial_frame_is_a_framing_error() {
        let result = decoder(2, 3).decode(&encode(&[0.0, 1.0, 2.0, 3.0]));
        assert_eq!(
            result,
            Err(DecodeError::Framing {
                samples: 4,
                frame_samples: 6
            })
        );
    }

    #[test]
    fn non_numeric_token_is_fatal() {
        let result = decoder(1, 2).decode("1.5,oops,2.5,");
        assert_eq!(
            result,
            Err(DecodeError::BadToken {
                index: 1,
                token: "oops".to_owned()
            })
        );
    }

    #[test]
    fn empty_payload_is_an_error_not_an_empty_success() {
        assert_eq!(decoder(2, 2000).decode(""), Err(DecodeError::EmptyPayload));
    }

    #[test]
    fn zero_geometry_is_rejected() {
        assert_eq!(FrameGeometry::new(0, 2000), Err(DecodeError::InvalidGeometry));
        assert_eq!(FrameGeometry::new(2, 0), Err(DecodeError::InvalidGeometry));
    }
}
