//! Configuration for the icon service

use std::path::PathBuf;
use std::time::Duration;
use serde::{Serialize, Deserialize};

/// One year, the lifetime of a cached template
pub const TEMPLATE_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Configuration for the icon service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconServiceConfig {
    // Source artwork
    /// Directory containing `icons/{black,white}/{svg,png}`
    pub icons_dir: PathBuf,
    /// Public URL that serves `icons_dir`
    pub icons_url: String,

    // Rendered PNG store
    /// Writable directory for rendered PNGs
    pub store_dir: PathBuf,
    /// Public URL that serves `store_dir`
    pub store_url: String,

    // Routing
    /// Literal path segment that marks an icon route
    pub route_marker: String,

    // Cache and render tuning
    /// How long a loaded template stays cached
    pub template_ttl: Duration,
    /// Upper bound on a single rasterization
    pub render_timeout: Duration,
    /// Maximum number of rasterizations running at once
    pub max_parallel_renders: usize,
    /// PNG edge used when the request carries no size
    pub default_raster_size: u32,
    /// Largest PNG edge that will be rendered
    pub max_raster_size: u32,
}

impl Default for IconServiceConfig {
    fn default() -> Self {
        Self {
            icons_dir: PathBuf::from("."),
            icons_url: String::new(),
            store_dir: PathBuf::from("uploads/svg-icons"),
            store_url: "/uploads/svg-icons".to_string(),
            route_marker: "svg-icon".to_string(),
            template_ttl: TEMPLATE_TTL,
            render_timeout: Duration::from_secs(30),
            max_parallel_renders: num_cpus::get(),
            default_raster_size: 256,
            max_raster_size: 2048,
        }
    }
}

impl IconServiceConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the artwork directory and its public URL
    pub fn with_icons(mut self, dir: PathBuf, url: impl Into<String>) -> Self {
        self.icons_dir = dir;
        self.icons_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the rendered PNG directory and its public URL
    pub fn with_store(mut self, dir: PathBuf, url: impl Into<String>) -> Self {
        self.store_dir = dir;
        self.store_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the render timeout
    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }

    /// Set the number of concurrent rasterizations (at least one)
    pub fn with_max_parallel_renders(mut self, renders: usize) -> Self {
        self.max_parallel_renders = renders.max(1);
        self
    }

    /// Set the largest PNG edge that will be rendered
    pub fn with_max_raster_size(mut self, size: u32) -> Self {
        self.max_raster_size = size;
        self
    }

    pub fn with_template_ttl(mut self, ttl: Duration) -> Self {
        self.template_ttl = ttl;
        self
    }

    /// Apply `SVG_ICONS_*` environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("SVG_ICONS_DIR") {
            self.icons_dir = PathBuf::from(dir);
        }
        if let Ok(url) = std::env::var("SVG_ICONS_URL") {
            self.icons_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(dir) = std::env::var("SVG_ICONS_STORE") {
            self.store_dir = PathBuf::from(dir);
        }
        if let Ok(url) = std::env::var("SVG_ICONS_STORE_URL") {
            self.store_url = url.trim_end_matches('/').to_string();
        }
        self
    }
}
