//! Playback voices and the pool that recycles them.

pub(crate) mod pool;

use crate::clip::AudioClip;
use crate::spatial::{MAX_OUTPUT_CHANNELS, fill_flat_matrix};
use std::fmt;

/// Channel count every decoded clip is reduced to before playback.
pub const SOURCE_CHANNELS: u16 = 1;

/// Bit depth of decoded samples; clips are stored as 32-bit floats.
pub const SOURCE_BITS_PER_SAMPLE: u16 = 32;

/// Stable handle for a pooled voice.
///
/// Indices are assigned in creation order and never move, so a handle stays
/// valid across recycling for as long as the output is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VoiceIndex(pub(crate) u16);

impl VoiceIndex {
    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for VoiceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source format a voice was created for. Voices are only recycled onto
/// clips with an identical format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VoiceFormat {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl VoiceFormat {
    pub fn for_clip(clip: &AudioClip) -> Self {
        Self {
            channels: clip.channels(),
            sample_rate: clip.sample_rate(),
            bits_per_sample: SOURCE_BITS_PER_SAMPLE,
        }
    }
}

/// Whether a voice is currently feeding the mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,
    Active,
}

/// One pooled playback voice. Shared with the output stream through the
/// render state, so everything here is plain data.
pub(crate) struct Voice {
    pub(crate) format: VoiceFormat,
    pub(crate) state: VoiceState,
    pub(crate) gain_matrix: [f32; MAX_OUTPUT_CHANNELS],
    pub(crate) volume: f32,
    pub(crate) clip: Option<AudioClip>,
    pub(crate) cursor: f64,
    pub(crate) step: f64,
}

impl Voice {
    pub(crate) fn new(format: VoiceFormat, dest_channels: u16) -> Self {
        let mut gain_matrix = [0.0; MAX_OUTPUT_CHANNELS];
        fill_flat_matrix(&mut gain_matrix, dest_channels);
        Self {
            format,
            state: VoiceState::Idle,
            gain_matrix,
            volume: 1.0,
            clip: None,
            cursor: 0.0,
            step: 1.0,
        }
    }

    /// Drops the clip and rewinds, leaving the voice ready for reuse.
    pub(crate) fn clear_playback(&mut self) {
        self.state = VoiceState::Idle;
        self.clip = None;
        self.cursor = 0.0;
    }
}

/// Everything the output stream callback reads while mixing.
pub(crate) struct RenderState {
    pub(crate) voices: Vec<Voice>,
    pub(crate) master_volume: f32,
}

impl RenderState {
    pub(crate) fn new() -> Self {
        Self {
            voices: Vec::new(),
            master_volume: 1.0,
        }
    }
}
