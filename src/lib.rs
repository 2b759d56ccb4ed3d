//! On-demand SVG icons
//!
//! Serves icons by name, size and colour as SVG markup, or as PNGs that are
//! rasterized once and then served from disk.

pub mod types;
pub mod config;
pub mod error;
pub mod sanitize;
pub mod request;
pub mod template;
pub mod transform;
pub mod fallback;
pub mod raster;
pub mod store;
pub mod service;

#[cfg(feature = "python-bindings")]
pub mod python;

pub use config::IconServiceConfig;
pub use error::{IconError, Result};
pub use raster::{Rasterizer, UnavailableRasterizer};
pub use sanitize::{Sanitizer, TextSanitizer};
pub use service::IconService;
pub use template::{MemoryTemplateCache, TemplateCache};
pub use types::{IconFormat, IconRequest, IconResponse, RenderKey, SvgOptions};

#[cfg(feature = "raster")]
pub use raster::ResvgRasterizer;

#[cfg(feature = "python-bindings")]
use pyo3::prelude::*;

#[cfg(feature = "python-bindings")]
#[pymodule]
fn rust_svg_icons(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let _ = env_logger::try_init();

    m.add_class::<python::PySvgIcons>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("SVG_NOT_FOUND", types::SVG_NOT_FOUND)?;

    Ok(())
}
