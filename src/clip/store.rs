use crate::clip::{AudioClip, ClipLoader, DefaultClipLoader};
use crate::error::{CueSonicError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Clip file extensions the store accepts, matched case-insensitively.
const CLIP_EXTENSIONS: [&str; 2] = ["wav", "aiff"];

/// Cache of decoded clips keyed by file name, rooted at one directory.
///
/// Clips load lazily on first use and stay resident until [`unload_all`] or a
/// [`preload`] replaces the cache wholesale. A failed decode never disturbs
/// whatever is already cached.
///
/// [`unload_all`]: ClipStore::unload_all
/// [`preload`]: ClipStore::preload
pub struct ClipStore {
    root: PathBuf,
    loader: Box<dyn ClipLoader>,
    clips: HashMap<String, AudioClip>,
}

impl ClipStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_loader(root, Box::new(DefaultClipLoader))
    }

    pub fn with_loader(root: impl Into<PathBuf>, loader: Box<dyn ClipLoader>) -> Self {
        Self {
            root: root.into(),
            loader,
            clips: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the cached clip, decoding it first if needed.
    ///
    /// With `force` set the file is re-read even when cached; the cache entry
    /// is only replaced once the new decode succeeds.
    pub fn load(&mut self, id: &str, force: bool) -> Result<AudioClip> {
        if !force {
            if let Some(clip) = self.clips.get(id) {
                return Ok(clip.clone());
            }
        }

        let path = self.root.join(id);
        let clip = self.loader.load(&path)?;
        log::debug!(
            "Loaded clip {:?} ({} frames at {} Hz)",
            id,
            clip.total_frames(),
            clip.sample_rate()
        );
        self.clips.insert(id.to_string(), clip.clone());
        Ok(clip)
    }

    pub fn get(&self, id: &str) -> Option<AudioClip> {
        self.clips.get(id).cloned()
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.clips.contains_key(id)
    }

    /// Replaces the whole cache with force-loaded copies of `ids`.
    ///
    /// Failures are logged and skipped so one bad file cannot block the rest.
    pub fn preload<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.clips.clear();
        let mut loaded = 0usize;
        for id in ids {
            let id = id.as_ref();
            match self.load(id, true) {
                Ok(_) => loaded += 1,
                Err(e) => log::warn!("Skipping preload of {:?}: {}", id, e),
            }
        }
        log::info!("Preloaded {} clips from {}", loaded, self.root.display());
    }

    /// Drops every cached clip.
    pub fn unload_all(&mut self) {
        self.clips.clear();
    }

    /// Duration of a resident clip in seconds.
    pub fn duration_seconds(&self, id: &str) -> Result<f64> {
        self.clips
            .get(id)
            .map(|clip| clip.duration().as_secs_f64())
            .ok_or_else(|| CueSonicError::Decode(format!("Clip {:?} is not loaded", id)))
    }

    /// File names in the root directory with an accepted extension, sorted.
    ///
    /// A missing or unreadable directory logs a warning and lists nothing.
    pub fn list_files(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!(
                    "Failed to read sound directory {}: {}",
                    self.root.display(),
                    e
                );
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| has_clip_extension(name))
            .collect();
        names.sort();
        names
    }
}

fn has_clip_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            CLIP_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Counts loads and hands out clips whose first sample is the load
    /// generation, so tests can tell cache hits from fresh decodes.
    #[derive(Default)]
    struct StubLoader {
        generation: Cell<u32>,
        fail: Cell<bool>,
    }

    impl ClipLoader for Rc<StubLoader> {
        fn load(&self, path: &Path) -> Result<AudioClip> {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            if self.fail.get() || name.contains("bad") {
                return Err(CueSonicError::Decode(format!("Cannot decode {:?}", name)));
            }
            let generation = self.generation.get();
            self.generation.set(generation + 1);
            Ok(AudioClip::new(name, vec![generation as f32; 4], 48_000))
        }
    }

    fn stub_store() -> (ClipStore, Rc<StubLoader>) {
        let loader = Rc::new(StubLoader::default());
        let store = ClipStore::with_loader("sounds", Box::new(Rc::clone(&loader)));
        (store, loader)
    }

    fn generation_of(clip: &AudioClip) -> u32 {
        clip.samples()[0] as u32
    }

    #[test]
    fn cached_load_skips_the_decoder() {
        let (mut store, _loader) = stub_store();
        let first = store.load("a.wav", false).unwrap();
        let second = store.load("a.wav", false).unwrap();
        assert_eq!(generation_of(&first), 0);
        assert_eq!(generation_of(&second), 0);
        assert!(store.is_loaded("a.wav"));
    }

    #[test]
    fn forced_load_replaces_the_cache_entry() {
        let (mut store, _loader) = stub_store();
        let first = store.load("a.wav", false).unwrap();
        let second = store.load("a.wav", true).unwrap();
        assert_eq!(generation_of(&first), 0);
        assert_eq!(generation_of(&second), 1);
        assert_eq!(generation_of(&store.get("a.wav").unwrap()), 1);
    }

    #[test]
    fn failed_forced_reload_keeps_the_old_clip() {
        let (mut store, loader) = stub_store();
        store.load("a.wav", false).unwrap();

        loader.fail.set(true);
        assert!(store.load("a.wav", true).is_err());
        assert_eq!(generation_of(&store.get("a.wav").unwrap()), 0);
    }

    #[test]
    fn failed_load_of_new_id_changes_nothing() {
        let (mut store, _loader) = stub_store();
        store.load("a.wav", false).unwrap();
        assert!(store.load("bad.wav", false).is_err());
        assert!(store.is_loaded("a.wav"));
        assert!(!store.is_loaded("bad.wav"));
    }

    #[test]
    fn preload_discards_everything_first() {
        let (mut store, _loader) = stub_store();
        store.load("a.wav", false).unwrap();
        store.load("b.wav", false).unwrap();

        store.preload(["b.wav", "c.wav"]);
        assert!(!store.is_loaded("a.wav"));
        assert!(store.is_loaded("b.wav"));
        assert!(store.is_loaded("c.wav"));
        // b.wav was re-decoded, not carried over from the old cache.
        assert_eq!(generation_of(&store.get("b.wav").unwrap()), 2);
    }

    #[test]
    fn preload_skips_failures_and_continues() {
        let (mut store, _loader) = stub_store();
        store.preload(["a.wav", "bad.wav", "c.wav"]);
        assert!(store.is_loaded("a.wav"));
        assert!(!store.is_loaded("bad.wav"));
        assert!(store.is_loaded("c.wav"));
    }

    #[test]
    fn duration_requires_a_resident_clip() {
        let (mut store, _loader) = stub_store();
        assert!(store.duration_seconds("a.wav").is_err());
        store.load("a.wav", false).unwrap();
        let seconds = store.duration_seconds("a.wav").unwrap();
        assert!((seconds - 4.0 / 48_000.0).abs() < 1e-9);
    }

    #[test]
    fn extension_filter_accepts_both_cases() {
        assert!(has_clip_extension("bonk.wav"));
        assert!(has_clip_extension("BONK.WAV"));
        assert!(has_clip_extension("chime.aiff"));
        assert!(has_clip_extension("chime.AIFF"));
        assert!(!has_clip_extension("track.mp3"));
        assert!(!has_clip_extension("noext"));
    }

    #[test]
    fn list_files_filters_and_sorts() {
        let dir = std::env::temp_dir().join(format!("cuesonic-list-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["b.wav", "a.WAV", "c.aiff", "notes.txt"] {
            std::fs::write(dir.join(name), b"x").unwrap();
        }

        let store = ClipStore::new(&dir);
        assert_eq!(store.list_files(), vec!["a.WAV", "b.wav", "c.aiff"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn list_files_survives_a_missing_directory() {
        let store = ClipStore::new("/definitely/not/a/real/path");
        assert!(store.list_files().is_empty());
    }
}
