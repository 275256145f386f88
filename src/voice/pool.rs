use crate::clip::AudioClip;
use crate::error::{CueSonicError, Result};
use crate::math::Vec3;
use crate::spatial::{ListenerPose, fill_flat_matrix, fill_spatial_matrix};
use crate::voice::{
    RenderState, SOURCE_BITS_PER_SAMPLE, SOURCE_CHANNELS, Voice, VoiceFormat, VoiceIndex,
    VoiceState,
};
use crossbeam_channel::Receiver;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Pool of playback voices for one open output.
///
/// Voices are created on demand up to `max_voices` and never destroyed until
/// [`teardown`]; a finished voice goes to the back of its format's idle queue
/// and the oldest idle voice of a matching format is reused first. The stream
/// callback reports finished voices over a channel, drained here before every
/// acquisition.
///
/// [`teardown`]: VoicePool::teardown
pub(crate) struct VoicePool {
    dest_channels: u16,
    device_sample_rate: u32,
    max_voices: usize,
    render: Arc<Mutex<RenderState>>,
    /// Format per created voice, indexed by voice index.
    formats: Vec<VoiceFormat>,
    /// Idle voices per format, oldest first.
    idle: BTreeMap<VoiceFormat, VecDeque<VoiceIndex>>,
    /// Acquired voices; the position is present while the voice tracks the
    /// listener and absent for flat or fire-and-forget placements.
    active: BTreeMap<VoiceIndex, Option<Vec3>>,
    completions: Receiver<VoiceIndex>,
}

impl VoicePool {
    pub(crate) fn new(
        dest_channels: u16,
        device_sample_rate: u32,
        max_voices: usize,
        completions: Receiver<VoiceIndex>,
    ) -> Self {
        Self {
            dest_channels,
            device_sample_rate,
            max_voices,
            render: Arc::new(Mutex::new(RenderState::new())),
            formats: Vec::new(),
            idle: BTreeMap::new(),
            active: BTreeMap::new(),
            completions,
        }
    }

    /// Shared state for the output stream callback.
    pub(crate) fn render_state(&self) -> Arc<Mutex<RenderState>> {
        Arc::clone(&self.render)
    }

    /// Hands out an idle voice of `format`, creating one if none is queued.
    ///
    /// Reused voices come back with unit volume and a flat matrix; placement
    /// is applied separately.
    pub(crate) fn acquire(&mut self, format: VoiceFormat) -> Result<VoiceIndex> {
        self.drain_completions();

        let reused = self
            .idle
            .get_mut(&format)
            .and_then(|queue| queue.pop_front());
        let index = match reused {
            Some(index) => {
                let mut render = self.render.lock().unwrap();
                let voice = &mut render.voices[index.0 as usize];
                voice.volume = 1.0;
                fill_flat_matrix(&mut voice.gain_matrix, self.dest_channels);
                index
            }
            None => self.create_voice(format)?,
        };
        self.active.insert(index, None);
        log::trace!(
            "Acquired voice {index} ({} Hz); {} created, {} idle, {} active",
            format.sample_rate,
            self.voice_count(),
            self.idle_count(),
            self.active.len()
        );
        Ok(index)
    }

    fn create_voice(&mut self, format: VoiceFormat) -> Result<VoiceIndex> {
        if format.channels != SOURCE_CHANNELS || format.bits_per_sample != SOURCE_BITS_PER_SAMPLE {
            return Err(CueSonicError::VoiceCreation(format!(
                "Unsupported source format: {} channel(s) at {} bits",
                format.channels, format.bits_per_sample
            )));
        }
        if format.sample_rate == 0 {
            return Err(CueSonicError::VoiceCreation(
                "Source sample rate must be non-zero".to_string(),
            ));
        }
        if self.formats.len() >= self.max_voices {
            return Err(CueSonicError::VoiceCreation(format!(
                "Voice pool is full ({} voices)",
                self.max_voices
            )));
        }

        let index = VoiceIndex(self.formats.len() as u16);
        self.render
            .lock()
            .unwrap()
            .voices
            .push(Voice::new(format, self.dest_channels));
        self.formats.push(format);
        log::debug!("Created voice {index} for {} Hz sources", format.sample_rate);
        Ok(index)
    }

    /// Applies distance and pan gains for a source at `position` in engine
    /// space. Tracked voices are revisited by [`retrack`]; untracked ones
    /// keep this placement until they finish.
    ///
    /// [`retrack`]: VoicePool::retrack
    pub(crate) fn apply_spatial(
        &mut self,
        index: VoiceIndex,
        listener: &ListenerPose,
        position: Vec3,
        tracked: bool,
    ) -> Result<()> {
        let dest_channels = self.dest_channels;
        self.with_acquired(index, |voice| {
            fill_spatial_matrix(&mut voice.gain_matrix, dest_channels, listener, position);
            Ok(())
        })?;
        if tracked {
            self.active.insert(index, Some(position));
        }
        Ok(())
    }

    /// Recomputes gains for every tracked voice against a fresh listener pose.
    pub(crate) fn retrack(&mut self, listener: &ListenerPose) {
        let mut render = self.render.lock().unwrap();
        for (&index, position) in &self.active {
            if let Some(position) = position {
                let voice = &mut render.voices[index.0 as usize];
                fill_spatial_matrix(&mut voice.gain_matrix, self.dest_channels, listener, *position);
            }
        }
    }

    pub(crate) fn has_tracked(&self) -> bool {
        self.active.values().any(|position| position.is_some())
    }

    pub(crate) fn set_master_volume(&mut self, volume: f32) {
        self.render.lock().unwrap().master_volume = volume;
    }

    pub(crate) fn set_voice_volume(&mut self, index: VoiceIndex, volume: f32) -> Result<()> {
        self.with_acquired(index, |voice| {
            voice.volume = volume;
            Ok(())
        })
    }

    /// Queues a clip on an acquired, not yet playing voice. The clip must
    /// match the format the voice was created for.
    pub(crate) fn submit(&mut self, index: VoiceIndex, clip: AudioClip) -> Result<()> {
        let clip_format = VoiceFormat::for_clip(&clip);
        let step = f64::from(clip.sample_rate()) / f64::from(self.device_sample_rate);
        self.with_acquired(index, |voice| {
            if voice.state == VoiceState::Active {
                return Err(CueSonicError::Submission(format!(
                    "Voice {index} is already playing"
                )));
            }
            if clip_format != voice.format {
                return Err(CueSonicError::Submission(format!(
                    "Clip format {} Hz does not match voice {index} at {} Hz",
                    clip_format.sample_rate, voice.format.sample_rate
                )));
            }
            voice.clip = Some(clip);
            voice.cursor = 0.0;
            voice.step = step;
            Ok(())
        })
    }

    /// Starts the queued clip; the voice feeds the mix from the next callback.
    pub(crate) fn start(&mut self, index: VoiceIndex) -> Result<()> {
        self.with_acquired(index, |voice| {
            if voice.clip.is_none() {
                return Err(CueSonicError::Submission(format!(
                    "Voice {index} has no buffer to play"
                )));
            }
            voice.state = VoiceState::Active;
            Ok(())
        })
    }

    /// Moves every voice the stream has finished back onto its idle queue.
    pub(crate) fn drain_completions(&mut self) {
        while let Ok(index) = self.completions.try_recv() {
            self.recycle(index);
        }
    }

    fn recycle(&mut self, index: VoiceIndex) {
        if self.active.remove(&index).is_none() {
            return;
        }
        let format = self.formats[index.0 as usize];
        self.idle.entry(format).or_default().push_back(index);
        log::trace!("Recycled voice {index}");
    }

    /// Destroys every voice. Call only after the output stream is gone.
    pub(crate) fn teardown(&mut self) {
        self.drain_completions();
        let count = self.formats.len();
        self.render.lock().unwrap().voices.clear();
        self.formats.clear();
        self.idle.clear();
        self.active.clear();
        if count > 0 {
            log::debug!("Tore down {count} voices");
        }
    }

    pub(crate) fn voice_count(&self) -> usize {
        self.formats.len()
    }

    pub(crate) fn idle_count(&self) -> usize {
        self.idle.values().map(VecDeque::len).sum()
    }

    fn with_acquired<F>(&mut self, index: VoiceIndex, f: F) -> Result<()>
    where
        F: FnOnce(&mut Voice) -> Result<()>,
    {
        if !self.active.contains_key(&index) {
            return Err(CueSonicError::Submission(format!(
                "Voice {index} is not acquired"
            )));
        }
        let mut render = self.render.lock().unwrap();
        f(&mut render.voices[index.0 as usize])
    }
}
