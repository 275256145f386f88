//! Engine configuration.

use std::path::PathBuf;

/// Configuration descriptor for a CueSonic engine.
#[derive(Debug, Clone)]
pub struct CueSonicDesc {
    /// Directory sound clips are loaded from.
    pub sounds_dir: PathBuf,
    /// Configured output device id; `"default"` selects the system default.
    pub output_id: String,
    /// Initial master volume in `0.0..=1.0`.
    pub volume: f32,
    /// Maximum number of voices the pool may create.
    pub max_voices: usize,
}

impl Default for CueSonicDesc {
    fn default() -> Self {
        Self {
            sounds_dir: PathBuf::from("sounds"),
            output_id: crate::device::DEFAULT_DEVICE_ID.to_string(),
            volume: 1.0,
            max_voices: 64,
        }
    }
}

impl CueSonicDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sounds_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sounds_dir = dir.into();
        self
    }

    pub fn output_id(mut self, id: impl Into<String>) -> Self {
        self.output_id = id.into();
        self
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn max_voices(mut self, max_voices: usize) -> Self {
        self.max_voices = max_voices;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let desc = CueSonicDesc::new()
            .sounds_dir("clips")
            .output_id("Speakers")
            .volume(0.25)
            .max_voices(8);
        assert_eq!(desc.sounds_dir, PathBuf::from("clips"));
        assert_eq!(desc.output_id, "Speakers");
        assert_eq!(desc.volume, 0.25);
        assert_eq!(desc.max_voices, 8);
    }

    #[test]
    fn volume_is_clamped() {
        assert_eq!(CueSonicDesc::new().volume(4.0).volume, 1.0);
        assert_eq!(CueSonicDesc::new().volume(-1.0).volume, 0.0);
    }
}
