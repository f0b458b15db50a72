//! Load-once cache for the persisted pipeline.
//!
//! The first successful [`ModelCache::get`] reads the artifact under an
//! initialization lock; later calls return the same `Arc` without locking.
//! A failed load leaves the cache empty so the next call tries again.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::error::Result;
use crate::pipeline::SpamPipeline;

/// Lazily loaded, read-only pipeline bound to one artifact path.
#[derive(Debug)]
pub struct ModelCache {
    path: PathBuf,
    pipeline: OnceLock<Arc<SpamPipeline>>,
    init: Mutex<()>,
}

impl ModelCache {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            pipeline: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// Artifact location this cache reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.pipeline.get().is_some()
    }

    /// The cached pipeline, loading it on first use.
    pub fn get(&self) -> Result<Arc<SpamPipeline>> {
        if let Some(pipeline) = self.pipeline.get() {
            return Ok(Arc::clone(pipeline));
        }

        let _guard = self.init.lock();
        // Another caller may have finished loading while we waited.
        if let Some(pipeline) = self.pipeline.get() {
            return Ok(Arc::clone(pipeline));
        }

        let pipeline = Arc::new(SpamPipeline::load(&self.path)?);
        log::info!("Cached pipeline from {}", self.path.display());
        Ok(Arc::clone(self.pipeline.get_or_init(|| pipeline)))
    }
}

static SHARED: OnceLock<ModelCache> = OnceLock::new();

/// Process-wide cache. Bound to the path given on the first call; later paths
/// are ignored.
pub fn shared<P: AsRef<Path>>(path: P) -> &'static ModelCache {
    SHARED.get_or_init(|| ModelCache::new(path.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::dataset::{Dataset, Label, LabeledMessage};
    use std::thread;
    use tempfile::TempDir;

    fn write_artifact(path: &Path) {
        let dataset: Dataset = [
            (Label::Spam, "free prize call now"),
            (Label::Spam, "claim free prize now"),
            (Label::Spam, "call now to claim prize"),
            (Label::Ham, "lunch tomorrow"),
            (Label::Ham, "see you at lunch tomorrow"),
            (Label::Ham, "meeting tomorrow at lunch"),
        ]
        .into_iter()
        .map(|(label, text)| LabeledMessage::new(label, text))
        .collect();

        let mut pipeline = SpamPipeline::with_defaults().unwrap();
        pipeline.fit(&dataset).unwrap();
        pipeline.save(path).unwrap();
    }

    #[test]
    fn test_loads_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("spam.bin");
        write_artifact(&path);

        let cache = ModelCache::new(&path);
        assert!(!cache.is_loaded());
        let first = cache.get().unwrap();
        assert!(cache.is_loaded());

        // Removing the file does not matter once loaded.
        std::fs::remove_file(&path).unwrap();
        let second = cache.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_failed_load_is_retried() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("spam.bin");
        let cache = ModelCache::new(&path);

        let err = cache.get().unwrap_err();
        assert!(err.is_artifact_not_found());
        assert!(!cache.is_loaded());

        write_artifact(&path);
        assert!(cache.get().is_ok());
    }

    #[test]
    fn test_concurrent_get_shares_one_pipeline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("spam.bin");
        write_artifact(&path);

        let cache = Arc::new(ModelCache::new(&path));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.get().unwrap())
            })
            .collect();
        let pipelines: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(pipelines.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
