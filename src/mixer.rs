//! Accumulates active voices into interleaved output buffers.

use crate::spatial::MAX_OUTPUT_CHANNELS;
use crate::voice::{RenderState, VoiceIndex, VoiceState};
use crossbeam_channel::Sender;
use std::sync::{Arc, Mutex};

/// Mixes every active voice into `buffer`, interleaved at `dest_channels`.
///
/// Runs on the output stream thread. The lock is only tried, never waited on;
/// a contended state means one silent buffer. Voices that reach the end of
/// their clip are cleared here and reported on `completions` for the pool to
/// recycle.
pub(crate) fn mix_into(
    buffer: &mut [f32],
    dest_channels: u16,
    render: &Arc<Mutex<RenderState>>,
    completions: &Sender<VoiceIndex>,
) {
    buffer.fill(0.0);

    let channels = dest_channels as usize;
    if channels == 0 {
        return;
    }

    let Ok(mut render) = render.try_lock() else {
        log::warn!("Render state is contended, skipping one output buffer");
        return;
    };
    let master = render.master_volume;

    for (voice_index, voice) in render.voices.iter_mut().enumerate() {
        if voice.state != VoiceState::Active {
            continue;
        }
        let Some(clip) = voice.clip.clone() else {
            continue;
        };
        let samples = clip.samples();

        for frame in buffer.chunks_mut(channels) {
            let position = voice.cursor as usize;
            if position >= samples.len() {
                break;
            }
            // Nearest-sample stepping covers rate mismatches; no filtering.
            let sample = samples[position] * voice.volume * master;
            for (channel, out) in frame.iter_mut().enumerate().take(MAX_OUTPUT_CHANNELS) {
                *out += sample * voice.gain_matrix[channel];
            }
            voice.cursor += voice.step;
        }

        if voice.cursor as usize >= samples.len() {
            voice.clear_playback();
            log::trace!("Voice {voice_index} finished playback");
            if let Err(e) = completions.send(VoiceIndex(voice_index as u16)) {
                log::error!("Failed to report voice {voice_index} completion: {e}");
            }
        }
    }
}
