//! Decoded audio clips and the cache that owns them.

mod default_loader;
mod loader;
mod store;

pub use default_loader::DefaultClipLoader;
pub use loader::ClipLoader;
pub use store::ClipStore;

use std::sync::Arc;
use std::time::Duration;

/// A decoded, memory-resident sound clip.
///
/// Clips are always mono after loading; multi-channel sources are downmixed
/// by averaging every channel per frame. The sample buffer sits behind an
/// `Arc`, so cloning is cheap and replacing a cached clip never invalidates a
/// voice still playing the old buffer.
#[derive(Debug, Clone)]
pub struct AudioClip {
    inner: Arc<ClipInner>,
}

#[derive(Debug)]
struct ClipInner {
    id: String,
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
    duration: Duration,
}

impl AudioClip {
    pub(crate) fn new(id: impl Into<String>, samples: Vec<f32>, sample_rate: u32) -> Self {
        let duration = Duration::from_secs_f64(samples.len() as f64 / f64::from(sample_rate));
        Self {
            inner: Arc::new(ClipInner {
                id: id.into(),
                samples,
                sample_rate,
                channels: 1,
                duration,
            }),
        }
    }

    /// Identifier the clip was loaded under, normally its file name.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Mono sample buffer.
    pub fn samples(&self) -> &[f32] {
        &self.inner.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.inner.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.inner.channels
    }

    pub fn duration(&self) -> Duration {
        self.inner.duration
    }

    pub fn total_frames(&self) -> usize {
        self.inner.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.samples.is_empty()
    }
}

/// Downmixes interleaved samples to mono by per-frame averaging.
pub(crate) fn downmix_to_mono(samples: Vec<f32>, channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples;
    }
    samples
        .chunks(channels as usize)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_averages_channels_per_frame() {
        let interleaved = vec![0.2, 0.4, -1.0, 1.0, 0.0, 0.6];
        let mono = downmix_to_mono(interleaved, 2);
        assert_eq!(mono.len(), 3);
        assert!((mono[0] - 0.3).abs() < 1e-6);
        assert!(mono[1].abs() < 1e-6);
        assert!((mono[2] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn downmix_keeps_mono_untouched() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(downmix_to_mono(samples.clone(), 1), samples);
    }

    #[test]
    fn downmix_handles_surround_frames() {
        let interleaved = vec![1.0, 0.0, 0.5, 0.5, -1.0, 1.0, 0.0, 0.0];
        let mono = downmix_to_mono(interleaved, 4);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.5).abs() < 1e-6);
        assert!(mono[1].abs() < 1e-6);
    }

    #[test]
    fn clip_reports_duration_from_rate() {
        let clip = AudioClip::new("half-second.wav", vec![0.0; 24_000], 48_000);
        assert_eq!(clip.channels(), 1);
        assert_eq!(clip.total_frames(), 24_000);
        assert!((clip.duration().as_secs_f64() - 0.5).abs() < 1e-9);
    }
}
