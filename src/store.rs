//! On-disk store for rendered PNGs
//!
//! Files are addressed by render key and written at most once. Writers hold a
//! per-key lock and publish through a temp file + rename, so a reader never
//! sees a partial PNG and concurrent first requests share one render.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use dashmap::DashMap;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::{IconError, Result},
    types::RenderKey,
};

const TEMP_MARKER: &str = ".tmp.";

/// Render-once PNG store rooted at a writable directory
pub struct RasterStore {
    root: PathBuf,
    locks: DashMap<RenderKey, Arc<Mutex<()>>>,
}

impl RasterStore {
    /// Create a store; the directory itself is created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();

        // Clean up any orphaned temp files from previous runs
        if let Ok(entries) = std::fs::read_dir(&root) {
            for entry in entries.flatten() {
                let path = entry.path();
                if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
                    if file_name.contains(TEMP_MARKER) {
                        log::warn!("Removing orphaned temp file: {:?}", path);
                        let _ = std::fs::remove_file(&path);
                    }
                }
            }
        }

        Self {
            root,
            locks: DashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final location of the PNG for a key
    pub fn path_for(&self, key: &RenderKey) -> PathBuf {
        self.root.join(key.file_name())
    }

    /// Whether a finished PNG exists for a key
    pub async fn contains(&self, key: &RenderKey) -> bool {
        fs::try_exists(self.path_for(key)).await.unwrap_or(false)
    }

    /// Return the PNG for `key`, calling `render` only if it does not exist yet.
    ///
    /// An existing file is trusted as-is. If `render` fails nothing is written.
    pub async fn get_or_create<F, Fut>(&self, key: &RenderKey, render: F) -> Result<PathBuf>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>>>,
    {
        let path = self.path_for(key);
        if fs::try_exists(&path).await.unwrap_or(false) {
            log::trace!("Rendered icon cache hit: {}", key);
            return Ok(path);
        }

        let slot = LockSlot::new(&self.locks, key);
        let _guard = slot.lock.lock().await;
        self.create_locked(key, &path, render).await
    }

    async fn create_locked<F, Fut>(&self, key: &RenderKey, path: &Path, render: F) -> Result<PathBuf>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>>>,
    {
        // another request may have finished while we waited
        if fs::try_exists(path).await.unwrap_or(false) {
            return Ok(path.to_path_buf());
        }

        let data = render().await?;
        if data.is_empty() {
            return Err(IconError::Render(format!("Rasterizer produced no data for {}", key)));
        }

        fs::create_dir_all(&self.root).await?;

        let temp = TempFile::new(
            self.root
                .join(format!("{}{}{}", key.file_name(), TEMP_MARKER, Uuid::new_v4())),
        );
        write_file(&temp.path, &data).await?;

        // Atomic rename
        temp.persist(path).await?;

        log::info!("Stored rendered icon {:?} ({} bytes)", path, data.len());
        Ok(path.to_path_buf())
    }

    /// Number of keys currently being rendered
    pub fn in_flight(&self) -> usize {
        self.locks.len()
    }
}

/// Per-key lock handle; the map entry goes away with the last handle,
/// including when the owning request is cancelled
struct LockSlot<'a> {
    locks: &'a DashMap<RenderKey, Arc<Mutex<()>>>,
    key: &'a RenderKey,
    lock: Arc<Mutex<()>>,
}

impl<'a> LockSlot<'a> {
    fn new(locks: &'a DashMap<RenderKey, Arc<Mutex<()>>>, key: &'a RenderKey) -> Self {
        let lock = locks.entry(key.clone()).or_default().clone();
        Self { locks, key, lock }
    }
}

impl Drop for LockSlot<'_> {
    fn drop(&mut self) {
        // release our handle before checking for other holders
        drop(std::mem::take(&mut self.lock));
        self.locks.remove_if(self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Temp file that is deleted on drop unless renamed into place
struct TempFile {
    path: PathBuf,
    persisted: bool,
}

impl TempFile {
    fn new(path: PathBuf) -> Self {
        Self { path, persisted: false }
    }

    async fn persist(mut self, dest: &Path) -> Result<()> {
        fs::rename(&self.path, dest).await?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

async fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    Ok(())
}
