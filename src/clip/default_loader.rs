use crate::clip::{AudioClip, ClipLoader, downmix_to_mono};
use crate::error::{CueSonicError, Result};
use std::fs::File;
use std::path::Path;
use symphonia::{
    core::{
        audio::SampleBuffer, codecs::DecoderOptions, errors::Error, formats::FormatOptions,
        io::MediaSourceStream, meta::MetadataOptions, probe::Hint,
    },
    default::{get_codecs, get_probe},
};

/// Default clip loader backed by the Symphonia decoder.
///
/// Decodes the linear PCM containers the engine accepts (WAV and AIFF) into
/// f32 samples and downmixes multi-channel sources to mono.
pub struct DefaultClipLoader;

impl ClipLoader for DefaultClipLoader {
    fn load(&self, path: &Path) -> Result<AudioClip> {
        let file = File::open(path).map_err(|e| {
            CueSonicError::Decode(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| CueSonicError::Decode(format!("Failed to probe audio format: {:?}", e)))?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| CueSonicError::Decode("No default audio track found".to_string()))?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| CueSonicError::Decode("Sample rate not found".to_string()))?;

        let channels = track
            .codec_params
            .channels
            .ok_or_else(|| CueSonicError::Decode("Channel count not found".to_string()))?
            .count() as u16;

        let mut decoder = get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| CueSonicError::Decode(format!("Failed to create decoder: {:?}", e)))?;

        let mut samples: Vec<f32> = Vec::new();

        loop {
            // Read the next packet from the container
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(Error::IoError(_)) => break, // end-of-file
                Err(e) => {
                    return Err(CueSonicError::Decode(format!(
                        "Error reading packet: {:?}",
                        e
                    )));
                }
            };

            // Decode the packet into audio samples
            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(Error::IoError(_)) => break, // also EOF in some formats
                Err(Error::DecodeError(_)) => continue, // recoverable corruption
                Err(e) => {
                    return Err(CueSonicError::Decode(format!(
                        "Error decoding packet: {:?}",
                        e
                    )));
                }
            };

            // Convert to f32 regardless of the stored sample type
            let spec = *decoded.spec();
            let capacity = decoded.capacity();

            let mut tmp = SampleBuffer::<f32>::new(capacity as u64, spec);
            tmp.copy_interleaved_ref(decoded);

            samples.extend_from_slice(tmp.samples());
        }

        let id = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();

        let mono = downmix_to_mono(samples, channels);
        Ok(AudioClip::new(id, mono, sample_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    struct TempDir(PathBuf);

    impl TempDir {
        fn new(tag: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "cuesonic-{}-{}",
                tag,
                std::process::id()
            ));
            std::fs::create_dir_all(&path).unwrap();
            Self(path)
        }

        fn path(&self) -> &Path {
            &self.0
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    /// Writes a minimal 16-bit PCM WAV file with interleaved samples.
    fn write_wav(path: &Path, channels: u16, sample_rate: u32, samples: &[i16]) {
        let data_len = (samples.len() * 2) as u32;
        let byte_rate = sample_rate * u32::from(channels) * 2;
        let block_align = channels * 2;

        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&channels.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&byte_rate.to_le_bytes());
        bytes.extend_from_slice(&block_align.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        for sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }

        let mut file = File::create(path).unwrap();
        file.write_all(&bytes).unwrap();
    }

    #[test]
    fn stereo_wav_decodes_to_averaged_mono() {
        init_logs();
        let dir = TempDir::new("stereo-decode");
        let path = dir.path().join("stereo.wav");
        // Two frames: (1000, 3000) and (-2000, 2000).
        write_wav(&path, 2, 44_100, &[1000, 3000, -2000, 2000]);

        let clip = DefaultClipLoader.load(&path).unwrap();
        assert_eq!(clip.channels(), 1);
        assert_eq!(clip.sample_rate(), 44_100);
        assert_eq!(clip.total_frames(), 2);
        assert_eq!(clip.id(), "stereo.wav");

        let expected_first = 2000.0 / 32768.0;
        assert!((clip.samples()[0] - expected_first).abs() < 1e-4);
        assert!(clip.samples()[1].abs() < 1e-4);
    }

    #[test]
    fn mono_wav_keeps_sample_values() {
        let dir = TempDir::new("mono-decode");
        let path = dir.path().join("mono.wav");
        write_wav(&path, 1, 22_050, &[16384, -16384, 0]);

        let clip = DefaultClipLoader.load(&path).unwrap();
        assert_eq!(clip.sample_rate(), 22_050);
        assert_eq!(clip.total_frames(), 3);
        assert!((clip.samples()[0] - 0.5).abs() < 1e-4);
        assert!((clip.samples()[1] + 0.5).abs() < 1e-4);
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let dir = TempDir::new("missing-file");
        let err = DefaultClipLoader
            .load(&dir.path().join("nope.wav"))
            .unwrap_err();
        assert!(matches!(err, CueSonicError::Decode(_)));
    }

    #[test]
    fn garbage_file_is_a_decode_error() {
        init_logs();
        let dir = TempDir::new("garbage-file");
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"this is not a riff container").unwrap();
        let err = DefaultClipLoader.load(&path).unwrap_err();
        assert!(matches!(err, CueSonicError::Decode(_)));
    }
}
