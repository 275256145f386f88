//! The playback engine tying clips, voices, and the output stream together.

use crate::camera::CameraFeed;
use crate::clip::ClipStore;
use crate::config::CueSonicDesc;
use crate::device::{self, DEFAULT_DEVICE_ID, DeviceSelection, OutputDevice};
use crate::error::{CueSonicError, Result};
use crate::math::Vec3;
use crate::mixer;
use crate::spatial::{listener_pose, to_engine_space};
use crate::voice::pool::VoicePool;
use crate::voice::{RenderState, VoiceFormat, VoiceIndex};
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use crossbeam_channel::Sender;
use std::sync::{Arc, Mutex};

/// Every voice plays at twice the requested volume.
pub(crate) const VOICE_GAIN_HEADROOM: f32 = 2.0;

/// Per-voice gain for a caller-requested volume.
pub(crate) fn playback_gain(volume: f32) -> f32 {
    VOICE_GAIN_HEADROOM * volume
}

/// Placement options for one play request.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayParams {
    /// World position in game units. Absent plays flat on every channel.
    pub position: Option<Vec3>,
    /// Positions against the stationary fallback listener and is left
    /// alone by [`CueSonicEngine::retrack`].
    pub preview: bool,
}

impl PlayParams {
    /// A positioned sound that follows the listener.
    pub fn at(position: Vec3) -> Self {
        Self {
            position: Some(position),
            preview: false,
        }
    }

    /// A positioned sound heard from the stationary fallback listener.
    pub fn preview_at(position: Vec3) -> Self {
        Self {
            position: Some(position),
            preview: true,
        }
    }
}

/// A live output stream and the voice pool feeding it.
struct AudioOutput {
    _stream: cpal::Stream,
    pool: VoicePool,
    sample_rate: u32,
    channels: u16,
}

/// Real-time positional playback engine.
///
/// Decodes clips from a sound directory, pools playback voices, and mixes
/// them into one cpal output stream. The engine owns the stream, so it must
/// stay on the thread that created it; all control calls go through `&mut`.
pub struct CueSonicEngine {
    desc: CueSonicDesc,
    camera: Arc<dyn CameraFeed>,
    clips: ClipStore,
    output: Option<AudioOutput>,
    output_id: String,
    volume: f32,
}

impl CueSonicEngine {
    /// Builds an engine from a configuration and a camera feed. No audio
    /// device is touched until [`initialize`].
    ///
    /// [`initialize`]: CueSonicEngine::initialize
    pub fn new(desc: CueSonicDesc, camera: Arc<dyn CameraFeed>) -> Self {
        let clips = ClipStore::new(desc.sounds_dir.clone());
        let output_id = desc.output_id.clone();
        let volume = desc.volume;
        Self {
            desc,
            camera,
            clips,
            output: None,
            output_id,
            volume,
        }
    }

    /// Opens the configured output device and starts the stream. Does
    /// nothing when the output is already open.
    ///
    /// A configured device that has since disappeared is replaced by the
    /// system default, which also becomes the engine's output id.
    pub fn initialize(&mut self) -> Result<()> {
        if self.output.is_some() {
            return Ok(());
        }

        let selection = device::consolidate_output_devices(&self.output_id);
        if selection.fell_back {
            self.output_id = selection.resolved.id.clone();
        }
        let cpal_device = device::open_output_device(&selection.resolved.id)?;
        let default_config = cpal_device.default_output_config().map_err(|e| {
            CueSonicError::Device(format!("Failed to query the output format: {}", e))
        })?;

        let sample_rate = default_config.sample_rate().0;
        let channels = default_config.channels();
        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate: default_config.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        };

        let (completions_tx, completions_rx) = crossbeam_channel::unbounded();
        let mut pool = VoicePool::new(channels, sample_rate, self.desc.max_voices, completions_rx);
        pool.set_master_volume(self.volume);
        let render = pool.render_state();

        let stream = match default_config.sample_format() {
            cpal::SampleFormat::F32 => self.create_stream::<f32>(
                &cpal_device,
                &stream_config,
                render,
                completions_tx,
                channels,
            )?,
            cpal::SampleFormat::I16 => self.create_stream::<i16>(
                &cpal_device,
                &stream_config,
                render,
                completions_tx,
                channels,
            )?,
            cpal::SampleFormat::U16 => self.create_stream::<u16>(
                &cpal_device,
                &stream_config,
                render,
                completions_tx,
                channels,
            )?,
            other => {
                return Err(CueSonicError::Device(format!(
                    "Unsupported sample format {:?}",
                    other
                )));
            }
        };

        stream
            .play()
            .map_err(|e| CueSonicError::Device(format!("Failed to start the stream: {}", e)))?;

        self.output = Some(AudioOutput {
            _stream: stream,
            pool,
            sample_rate,
            channels,
        });
        log::info!(
            "Audio output open on {:?} ({} Hz, {} channels)",
            selection.resolved.id,
            sample_rate,
            channels
        );
        Ok(())
    }

    /// Switches to another output device, reopening the stream if one was
    /// open. Before [`initialize`] this only records the id.
    ///
    /// [`initialize`]: CueSonicEngine::initialize
    pub fn set_output_id(&mut self, id: &str) -> Result<()> {
        if id == self.output_id && self.output.is_some() {
            return Ok(());
        }
        let was_open = self.output.is_some();
        self.teardown_output();
        self.output_id = id.to_string();
        if was_open {
            self.initialize()
        } else {
            Ok(())
        }
    }

    /// Plays a clip, decoding it on first use. Fire and forget; the voice
    /// recycles itself when the clip runs out.
    ///
    /// `volume` is the caller's 0 to 1 level for this sound; the master
    /// volume applies on top in the mix.
    pub fn play_sound(
        &mut self,
        id: &str,
        params: Option<PlayParams>,
        volume: f32,
    ) -> Result<()> {
        let output = self
            .output
            .as_mut()
            .ok_or_else(|| CueSonicError::Engine("Audio output is not initialized".to_string()))?;
        let clip = self.clips.load(id, false)?;

        let format = VoiceFormat::for_clip(&clip);
        let index = output.pool.acquire(format)?;
        output.pool.set_voice_volume(index, playback_gain(volume))?;

        if let Some(params) = params {
            if let Some(position) = params.position {
                let listener = listener_pose(self.camera.as_ref(), params.preview);
                let source = to_engine_space(position);
                output
                    .pool
                    .apply_spatial(index, &listener, source, !params.preview)?;
            }
        }

        output.pool.submit(index, clip)?;
        output.pool.start(index)?;
        log::debug!("Playing {:?} on voice {index}", id);
        Ok(())
    }

    /// Re-aims every tracked voice at the current listener pose. Call once
    /// per frame; finished voices are collected here as well.
    pub fn retrack(&mut self) {
        let Some(output) = self.output.as_mut() else {
            return;
        };
        output.pool.drain_completions();
        if !output.pool.has_tracked() {
            return;
        }
        let listener = listener_pose(self.camera.as_ref(), false);
        output.pool.retrack(&listener);
    }

    /// Replaces every cached clip with a fresh decode of `ids`, typically
    /// an [`EventSoundTable::sound_ids`] listing. Failures are logged and
    /// skipped.
    ///
    /// [`EventSoundTable::sound_ids`]: crate::events::EventSoundTable::sound_ids
    pub fn preload_all<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.clips.preload(ids);
    }

    /// Drops every cached clip. Voices already playing keep their audio.
    pub fn unload_all(&mut self) {
        self.clips.unload_all();
    }

    /// Duration of a clip in seconds, decoding it on first use.
    pub fn sound_duration(&mut self, id: &str) -> Result<f64> {
        self.clips.load(id, false)?;
        self.clips.duration_seconds(id)
    }

    /// Clip files available in the sound directory.
    pub fn list_sound_files(&self) -> Vec<String> {
        self.clips.list_files()
    }

    /// Outputs currently available for [`set_output_id`].
    ///
    /// [`set_output_id`]: CueSonicEngine::set_output_id
    pub fn enumerate_output_devices(&self) -> Vec<OutputDevice> {
        device::enumerate_output_devices()
    }

    /// Re-checks the device list against the engine's output id and moves
    /// to the system default if that id has disappeared. With `reapply`
    /// set the fallback also reopens the stream onto the default output;
    /// otherwise only the id is updated.
    pub fn consolidate_devices(&mut self, reapply: bool) -> Result<DeviceSelection> {
        let selection = device::consolidate_output_devices(&self.output_id);
        if selection.fell_back {
            if reapply {
                self.set_output_id(DEFAULT_DEVICE_ID)?;
            } else {
                self.output_id = DEFAULT_DEVICE_ID.to_string();
            }
        }
        Ok(selection)
    }

    /// Sets the master volume, clamped to 0 to 1. Takes effect immediately
    /// when the output is open and is remembered either way.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(output) = self.output.as_mut() {
            output.pool.set_master_volume(self.volume);
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn output_id(&self) -> &str {
        &self.output_id
    }

    pub fn is_initialized(&self) -> bool {
        self.output.is_some()
    }

    /// Sample rate of the open output, if any.
    pub fn output_sample_rate(&self) -> Option<u32> {
        self.output.as_ref().map(|output| output.sample_rate)
    }

    /// Channel count of the open output, if any.
    pub fn output_channels(&self) -> Option<u16> {
        self.output.as_ref().map(|output| output.channels)
    }

    pub fn desc(&self) -> &CueSonicDesc {
        &self.desc
    }

    /// Stops the stream and releases every voice and cached clip.
    pub fn shutdown(&mut self) {
        self.teardown_output();
        self.clips.unload_all();
    }

    fn teardown_output(&mut self) {
        if let Some(output) = self.output.take() {
            let AudioOutput {
                _stream: stream,
                mut pool,
                ..
            } = output;
            // The stream must stop before the voices behind it go away.
            drop(stream);
            pool.teardown();
            log::info!("Audio output closed");
        }
    }

    fn create_stream<T>(
        &self,
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        render: Arc<Mutex<RenderState>>,
        completions: Sender<VoiceIndex>,
        channels: u16,
    ) -> Result<cpal::Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let mut scratch: Vec<f32> = Vec::new();

        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    scratch.resize(data.len(), 0.0);
                    mixer::mix_into(&mut scratch, channels, &render, &completions);
                    for (out, sample) in data.iter_mut().zip(&scratch) {
                        *out = T::from_sample(*sample);
                    }
                },
                move |err| {
                    log::error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| CueSonicError::Device(format!("Failed to build the stream: {}", e)))?;

        Ok(stream)
    }
}

impl Drop for CueSonicEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::FixedCameraFeed;

    fn test_engine() -> CueSonicEngine {
        let desc = CueSonicDesc::new().sounds_dir("/definitely/not/a/real/path");
        CueSonicEngine::new(desc, Arc::new(FixedCameraFeed::default()))
    }

    #[test]
    fn playback_gain_doubles_the_requested_volume() {
        assert_eq!(playback_gain(0.5), 1.0);
        assert_eq!(playback_gain(1.0), 2.0);
        assert_eq!(playback_gain(0.0), 0.0);
    }

    #[test]
    fn play_params_constructors_cover_both_placements() {
        let tracked = PlayParams::at(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(tracked.position, Some(Vec3::new(1.0, 2.0, 3.0)));
        assert!(!tracked.preview);

        let preview = PlayParams::preview_at(Vec3::ONE);
        assert!(preview.preview);

        assert_eq!(PlayParams::default().position, None);
    }

    #[test]
    fn playing_without_an_output_is_an_engine_error() {
        let mut engine = test_engine();
        let err = engine.play_sound("bonk.wav", None, 1.0).unwrap_err();
        assert!(matches!(err, CueSonicError::Engine(_)));
    }

    #[test]
    fn retrack_without_an_output_does_nothing() {
        let mut engine = test_engine();
        engine.retrack();
        assert!(!engine.is_initialized());
    }

    #[test]
    fn set_output_id_before_initialize_only_records_it() {
        let mut engine = test_engine();
        engine.set_output_id("Speakers").unwrap();
        assert_eq!(engine.output_id(), "Speakers");
        assert!(!engine.is_initialized());
    }

    #[test]
    fn master_volume_is_clamped_and_remembered() {
        let mut engine = test_engine();
        engine.set_volume(3.0);
        assert_eq!(engine.volume(), 1.0);
        engine.set_volume(-0.5);
        assert_eq!(engine.volume(), 0.0);
        engine.set_volume(0.25);
        assert_eq!(engine.volume(), 0.25);
    }

    #[test]
    fn durations_need_a_decodable_file() {
        let mut engine = test_engine();
        let err = engine.sound_duration("missing.wav").unwrap_err();
        assert!(matches!(err, CueSonicError::Decode(_)));
    }

    #[test]
    fn consolidating_a_default_id_never_falls_back() {
        let mut engine = test_engine();
        let selection = engine.consolidate_devices(false).unwrap();
        assert!(selection.resolved.is_default());
        assert!(!selection.fell_back);
        assert_eq!(engine.output_id(), DEFAULT_DEVICE_ID);
        assert!(!engine.is_initialized());
    }

    #[test]
    fn preloading_undecodable_ids_caches_nothing() {
        let mut engine = test_engine();
        engine.preload_all(["missing.wav", "also-missing.wav"]);
        assert!(engine.sound_duration("missing.wav").is_err());
    }

    #[test]
    fn listing_a_missing_sound_directory_is_empty() {
        let engine = test_engine();
        assert!(engine.list_sound_files().is_empty());
        assert!(engine.output_sample_rate().is_none());
        assert!(engine.output_channels().is_none());
    }
}
