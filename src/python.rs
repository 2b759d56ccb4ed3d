//! Python bindings for the icon service

use std::path::PathBuf;
use std::sync::Arc;
use pyo3::prelude::*;
use pyo3::exceptions::PyRuntimeError;
use pyo3::types::PyDict;
use pyo3_async_runtimes::tokio::future_into_py;

use crate::{
    config::IconServiceConfig,
    service::IconService,
    types::{IconResponse, SvgOptions},
};

/// Python wrapper for the icon service
#[pyclass(name = "SvgIcons", module = "rust_svg_icons")]
pub struct PySvgIcons {
    inner: Arc<IconService>,
    runtime: Arc<tokio::runtime::Runtime>,
}

fn response_to_dict(py: Python<'_>, response: IconResponse) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);
    match response {
        IconResponse::Svg { content_type, body } => {
            dict.set_item("status", 200)?;
            dict.set_item("content_type", content_type)?;
            dict.set_item("body", body)?;
        }
        IconResponse::Redirect { status, location } => {
            dict.set_item("status", status)?;
            dict.set_item("location", location)?;
        }
    }
    Ok(dict.into())
}

#[pymethods]
impl PySvgIcons {
    /// Create a service; unset arguments fall back to `SVG_ICONS_*` env vars, then defaults
    #[new]
    #[pyo3(signature = (icons_dir=None, icons_url=None, store_dir=None, store_url=None))]
    pub fn new(
        icons_dir: Option<String>,
        icons_url: Option<String>,
        store_dir: Option<String>,
        store_url: Option<String>,
    ) -> PyResult<Self> {
        let mut config = IconServiceConfig::default().with_env_overrides();

        if icons_dir.is_some() || icons_url.is_some() {
            let dir = icons_dir.map(PathBuf::from).unwrap_or(config.icons_dir.clone());
            let url = icons_url.unwrap_or(config.icons_url.clone());
            config = config.with_icons(dir, url);
        }
        if store_dir.is_some() || store_url.is_some() {
            let dir = store_dir.map(PathBuf::from).unwrap_or(config.store_dir.clone());
            let url = store_url.unwrap_or(config.store_url.clone());
            config = config.with_store(dir, url);
        }

        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| PyRuntimeError::new_err(format!("Failed to create Tokio runtime: {}", e)))?;

        Ok(Self {
            inner: Arc::new(IconService::new(config)),
            runtime: Arc::new(runtime),
        })
    }

    /// SVG markup for an icon (sync)
    #[pyo3(signature = (name, size=64, colour="000".to_string(), fallback=true))]
    pub fn get_svg(&self, py: Python<'_>, name: String, size: u32, colour: String, fallback: bool) -> String {
        let inner = self.inner.clone();
        let runtime = self.runtime.clone();
        let options = SvgOptions { size, colour, fallback };

        py.detach(move || runtime.block_on(async move { inner.get_svg(&name, &options).await }))
    }

    /// Resolve a request path (async); returns a response dict or None
    pub fn resolve_icon<'py>(&self, py: Python<'py>, path: String) -> PyResult<Bound<'py, PyAny>> {
        let inner = self.inner.clone();

        future_into_py(py, async move {
            match inner.resolve_icon(&path).await {
                Some(response) => Python::attach(|py| response_to_dict(py, response).map(Some)),
                None => Ok(None),
            }
        })
    }

    /// Resolve a request path synchronously
    pub fn resolve_icon_sync(&self, py: Python<'_>, path: String) -> PyResult<Option<Py<PyDict>>> {
        let inner = self.inner.clone();
        let runtime = self.runtime.clone();

        let response = py.detach(move || runtime.block_on(async move { inner.resolve_icon(&path).await }));
        response.map(|response| response_to_dict(py, response)).transpose()
    }

    /// Names of all available icons
    pub fn available_icons(&self, py: Python<'_>) -> PyResult<Vec<String>> {
        let inner = self.inner.clone();
        let runtime = self.runtime.clone();

        py.detach(move || runtime.block_on(async move { inner.available_icons().await }))
            .map_err(|e| PyRuntimeError::new_err(format!("Failed to list icons: {}", e)))
    }
}
