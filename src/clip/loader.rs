use crate::clip::AudioClip;
use crate::error::Result;
use std::path::Path;

/// Trait for decoding clip files into mono PCM.
///
/// [`ClipStore`](crate::clip::ClipStore) uses [`DefaultClipLoader`] unless
/// handed another implementation, which is also how tests feed the store
/// synthetic clips without touching the filesystem.
///
/// Implementations must deliver mono samples; the spatializer only handles
/// single-channel emitters.
///
/// [`DefaultClipLoader`]: crate::clip::DefaultClipLoader
pub trait ClipLoader {
    /// Decodes the file at `path` into a clip.
    ///
    /// # Errors
    ///
    /// Returns [`CueSonicError::Decode`](crate::CueSonicError::Decode) when
    /// the file is missing, unreadable, or not a supported format.
    fn load(&self, path: &Path) -> Result<AudioClip>;
}
