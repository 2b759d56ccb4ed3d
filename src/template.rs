//! SVG template loading and caching

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use dashmap::DashMap;
use tokio::task;
use walkdir::WalkDir;

use crate::{
    error::{IconError, Result},
    types::BaseColour,
};

/// Key/value store holding template text between requests
pub trait TemplateCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Arc<str>>;
    fn set(&self, key: &str, value: Arc<str>, ttl: Duration);
}

struct CacheEntry {
    value: Arc<str>,
    /// `None` when the TTL is beyond what `Instant` can represent
    expires_at: Option<Instant>,
}

/// Process-local template cache with per-entry expiry
#[derive(Default)]
pub struct MemoryTemplateCache {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryTemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TemplateCache for MemoryTemplateCache {
    fn get(&self, key: &str) -> Option<Arc<str>> {
        let now = Instant::now();
        self.entries
            .remove_if(key, |_, entry| entry.expires_at.is_some_and(|at| at <= now));
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    fn set(&self, key: &str, value: Arc<str>, ttl: Duration) {
        let expires_at = Instant::now().checked_add(ttl);
        self.entries.insert(key.to_string(), CacheEntry { value, expires_at });
    }
}

/// Template cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemplateStats {
    pub hits: u64,
    pub misses: u64,
}

/// Loads icon templates from `icons/{black,white}/svg/{name}.svg`
pub struct TemplateStore {
    icons_dir: PathBuf,
    cache: Arc<dyn TemplateCache>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TemplateStore {
    pub fn new(icons_dir: impl Into<PathBuf>, cache: Arc<dyn TemplateCache>, ttl: Duration) -> Self {
        Self {
            icons_dir: icons_dir.into(),
            cache,
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Location of a template on disk
    pub fn template_path(&self, name: &str, base: BaseColour) -> PathBuf {
        self.icons_dir
            .join("icons")
            .join(base.dir_name())
            .join("svg")
            .join(format!("{name}.svg"))
    }

    /// Load a template, reading it from disk on a cache miss
    pub async fn load(&self, name: &str, base: BaseColour) -> Result<Arc<str>> {
        if !is_icon_name(name) {
            return Err(IconError::TemplateNotFound(name.to_string()));
        }

        // black and white artwork may share a name
        let key = format!("{}/{}", base.dir_name(), name);
        if let Some(svg) = self.cache.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            log::trace!("Template cache hit: {}", key);
            return Ok(svg);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let path = self.template_path(name, base);
        let svg: Arc<str> = match tokio::fs::read_to_string(&path).await {
            Ok(svg) => svg.into(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No template for icon '{}' at {:?}", name, path);
                return Err(IconError::TemplateNotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        self.cache.set(&key, svg.clone(), self.ttl);
        log::debug!("Loaded template {:?} ({} bytes)", path, svg.len());
        Ok(svg)
    }

    pub fn stats(&self) -> TemplateStats {
        TemplateStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Names of every icon with a template in either colour
    pub async fn available_icons(&self) -> Result<Vec<String>> {
        let icons_dir = self.icons_dir.clone();
        let names = task::spawn_blocking(move || {
            let mut names = BTreeSet::new();
            for base in [BaseColour::Black, BaseColour::White] {
                let dir = icons_dir.join("icons").join(base.dir_name()).join("svg");
                names.extend(scan_svg_directory(&dir));
            }
            names.into_iter().collect::<Vec<_>>()
        })
        .await?;

        Ok(names)
    }
}

fn scan_svg_directory(dir: &Path) -> Vec<String> {
    if !dir.exists() {
        return vec![];
    }

    WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let path = e.path();
            let is_svg = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("svg"))
                .unwrap_or(false);
            if !is_svg {
                return None;
            }
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .filter(|stem| is_icon_name(stem))
                .map(str::to_string)
        })
        .collect()
}

/// Icon names are `[a-z0-9-]+`, which also keeps them inside `icons/`
pub fn is_icon_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_icon(root: &Path, base: &str, name: &str, svg: &str) {
        let dir = root.join("icons").join(base).join("svg");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{name}.svg")), svg).unwrap();
    }

    fn store(root: &Path) -> TemplateStore {
        TemplateStore::new(root, Arc::new(MemoryTemplateCache::new()), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_load_and_cache() {
        let temp_dir = TempDir::new().unwrap();
        write_icon(temp_dir.path(), "black", "star", "<svg >black</svg>");
        let store = store(temp_dir.path());

        let svg = store.load("star", BaseColour::Black).await.unwrap();
        assert_eq!(&*svg, "<svg >black</svg>");

        // served from cache even after the source changes
        write_icon(temp_dir.path(), "black", "star", "<svg >changed</svg>");
        let svg = store.load("star", BaseColour::Black).await.unwrap();
        assert_eq!(&*svg, "<svg >black</svg>");

        assert_eq!(store.stats(), TemplateStats { hits: 1, misses: 1 });
    }

    #[tokio::test]
    async fn test_colour_variants_cached_separately() {
        let temp_dir = TempDir::new().unwrap();
        write_icon(temp_dir.path(), "black", "star", "black");
        write_icon(temp_dir.path(), "white", "star", "white");
        let store = store(temp_dir.path());

        assert_eq!(&*store.load("star", BaseColour::Black).await.unwrap(), "black");
        assert_eq!(&*store.load("star", BaseColour::White).await.unwrap(), "white");
    }

    #[tokio::test]
    async fn test_missing_and_invalid_names() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(temp_dir.path());

        let result = store.load("nonexistent-icon", BaseColour::Black).await;
        assert!(matches!(result, Err(IconError::TemplateNotFound(_))));

        let result = store.load("../secret", BaseColour::Black).await;
        assert!(matches!(result, Err(IconError::TemplateNotFound(_))));
    }

    #[test]
    fn test_memory_cache_expiry() {
        let cache = MemoryTemplateCache::new();
        cache.set("a", Arc::from("x"), Duration::ZERO);
        cache.set("b", Arc::from("y"), Duration::from_secs(60));

        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("b").as_deref(), Some("y"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_available_icons() {
        let temp_dir = TempDir::new().unwrap();
        write_icon(temp_dir.path(), "black", "star", "");
        write_icon(temp_dir.path(), "black", "arrow-left", "");
        write_icon(temp_dir.path(), "white", "star", "");
        fs::write(temp_dir.path().join("icons/black/svg/readme.txt"), "").unwrap();

        let names = store(temp_dir.path()).available_icons().await.unwrap();
        assert_eq!(names, vec!["arrow-left".to_string(), "star".to_string()]);
    }

    #[test]
    fn test_icon_name_validation() {
        assert!(is_icon_name("arrow-left"));
        assert!(is_icon_name("500px"));
        assert!(!is_icon_name(""));
        assert!(!is_icon_name("Arrow"));
        assert!(!is_icon_name("a/b"));
    }
}
