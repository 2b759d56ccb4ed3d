//! Icon service: turns icon routes into SVG bodies or PNG redirects

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task;

use crate::{
    config::IconServiceConfig,
    error::{IconError, Result},
    fallback::{fallback_url, resolve_bucket},
    raster::{default_rasterizer, Rasterizer},
    request::RequestParser,
    sanitize::{Sanitizer, TextSanitizer},
    store::RasterStore,
    template::{MemoryTemplateCache, TemplateCache, TemplateStats, TemplateStore},
    transform::SvgTransform,
    types::{BaseColour, IconFormat, IconRequest, IconResponse, SvgOptions, SVG_NOT_FOUND},
};

/// Resolves icon requests against the template set and the PNG store
pub struct IconService {
    config: IconServiceConfig,
    sanitizer: Arc<dyn Sanitizer>,
    templates: TemplateStore,
    store: RasterStore,
    rasterizer: Arc<dyn Rasterizer>,
    render_slots: Arc<Semaphore>,
}

impl IconService {
    /// Create a service with an in-memory template cache and the default rasterizer
    pub fn new(config: IconServiceConfig) -> Self {
        let templates = TemplateStore::new(
            config.icons_dir.clone(),
            Arc::new(MemoryTemplateCache::new()),
            config.template_ttl,
        );

        Self {
            store: RasterStore::new(config.store_dir.clone()),
            render_slots: Arc::new(Semaphore::new(config.max_parallel_renders.max(1))),
            sanitizer: Arc::new(TextSanitizer),
            rasterizer: default_rasterizer(),
            templates,
            config,
        }
    }

    /// Use a different template cache
    pub fn with_template_cache(mut self, cache: Arc<dyn TemplateCache>) -> Self {
        self.templates = TemplateStore::new(self.config.icons_dir.clone(), cache, self.config.template_ttl);
        self
    }

    /// Use a different rasterizer
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    /// Use a host-provided sanitizer for request fields
    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn Sanitizer>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn config(&self) -> &IconServiceConfig {
        &self.config
    }

    /// Parse a raw path into an icon descriptor
    pub fn parse(&self, raw_path: &str) -> Option<IconRequest> {
        RequestParser::new(&self.config.route_marker, self.sanitizer.as_ref()).parse(raw_path)
    }

    /// Handle a raw request path.
    ///
    /// `None` means the router should carry on as if this were not an icon
    /// route: either the path does not match, or a PNG could not be produced.
    pub async fn resolve_icon(&self, raw_path: &str) -> Option<IconResponse> {
        let request = self.parse(raw_path)?;

        match request.format {
            IconFormat::Svg => {
                let options = SvgOptions {
                    size: request.size,
                    colour: request.colour.clone(),
                    fallback: true,
                };
                Some(IconResponse::svg(self.get_svg(&request.name, &options).await))
            }
            IconFormat::Png => {
                let key = request.render_key();
                match self.render_png(&request).await {
                    Ok(_) => Some(IconResponse::redirect(self.public_url(&request))),
                    Err(e) if e.is_unavailable() => {
                        log::warn!("Cannot render {}: rasterization is not available", key);
                        None
                    }
                    Err(IconError::TemplateNotFound(name)) => {
                        log::debug!("Not rendering {}: no template for '{}'", key, name);
                        None
                    }
                    Err(e) => {
                        log::error!("Failed to render icon {}: {}", key, e);
                        None
                    }
                }
            }
        }
    }

    /// SVG markup for an icon, or the not-found placeholder
    pub async fn get_svg(&self, name: &str, options: &SvgOptions) -> String {
        match self.build_svg(name, options).await {
            Ok(svg) => svg,
            Err(IconError::TemplateNotFound(_)) => SVG_NOT_FOUND.to_string(),
            Err(e) => {
                log::warn!("Failed to load template for '{}': {}", name, e);
                SVG_NOT_FOUND.to_string()
            }
        }
    }

    async fn build_svg(&self, name: &str, options: &SvgOptions) -> Result<String> {
        let colour = options.colour.to_ascii_lowercase();
        let base = BaseColour::for_colour(&colour);
        let template = self.templates.load(name, base).await?;

        let fallback_src = options.fallback.then(|| {
            fallback_url(&self.config.icons_url, base, resolve_bucket(options.size), name)
        });

        Ok(SvgTransform::for_icon(name, options.size, &colour, fallback_src).apply(&template))
    }

    /// Make sure the PNG for a request exists on disk and return its path
    pub async fn render_png(&self, request: &IconRequest) -> Result<PathBuf> {
        if !self.rasterizer.is_available() {
            return Err(IconError::RasterUnavailable);
        }

        let edge = if request.size > 0 {
            request.size
        } else {
            self.config.default_raster_size
        };
        if edge > self.config.max_raster_size {
            return Err(IconError::SizeLimit {
                size: edge,
                max: self.config.max_raster_size,
            });
        }

        let key = request.render_key();
        self.store
            .get_or_create(&key, || async {
                let options = SvgOptions {
                    size: request.size,
                    colour: request.colour.clone(),
                    fallback: false,
                };
                let svg = self.build_svg(&request.name, &options).await?;

                let permit = self
                    .render_slots
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|e| IconError::RuntimeError(e.to_string()))?;
                let rasterizer = self.rasterizer.clone();

                // the permit lives as long as the blocking job, even past a timeout
                let job = task::spawn_blocking(move || {
                    let _permit = permit;
                    rasterizer.rasterize(&svg, edge)
                });

                match tokio::time::timeout(self.config.render_timeout, job).await {
                    Ok(joined) => joined?,
                    Err(_) => Err(IconError::RenderTimeout {
                        seconds: self.config.render_timeout.as_secs(),
                    }),
                }
            })
            .await
    }

    /// Public URL of the rendered PNG for a request
    pub fn public_url(&self, request: &IconRequest) -> String {
        format!("{}/{}", self.config.store_url, request.render_key().file_name())
    }

    /// Names of every icon in the template set
    pub async fn available_icons(&self) -> Result<Vec<String>> {
        self.templates.available_icons().await
    }

    pub fn template_stats(&self) -> TemplateStats {
        self.templates.stats()
    }
}
