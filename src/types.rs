//! Core types for the icon service

use serde::{Serialize, Deserialize};

/// Canonical edges of the pre-rendered fallback PNGs, ascending
pub const SIZE_BUCKETS: [u32; 8] = [16, 22, 24, 32, 48, 64, 128, 256];

/// Largest fallback bucket
pub const MAX_BUCKET: u32 = 256;

/// Edge of the source artwork as written in every template
pub const NATIVE_DIMENSION: u32 = 1792;

/// Body returned for an icon without a template
pub const SVG_NOT_FOUND: &str = "<!-- SVG not found -->";

/// Output format of an icon request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IconFormat {
    Svg,
    Png,
}

impl IconFormat {
    /// Parse a path suffix
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "svg" => Some(IconFormat::Svg),
            "png" => Some(IconFormat::Png),
            _ => None,
        }
    }

    /// Get the MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            IconFormat::Svg => "image/svg+xml",
            IconFormat::Png => "image/png",
        }
    }

    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            IconFormat::Svg => "svg",
            IconFormat::Png => "png",
        }
    }
}

/// Variant of the source artwork a colour is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseColour {
    Black,
    White,
}

impl BaseColour {
    /// Pick the artwork for a requested colour.
    ///
    /// Light colours (`white`, `fff`, `ffffff`, any case) use the white artwork
    /// so the unstyled fallback stays readable; everything else uses black.
    pub fn for_colour(colour: &str) -> Self {
        match colour.to_ascii_lowercase().as_str() {
            "white" | "fff" | "ffffff" => BaseColour::White,
            _ => BaseColour::Black,
        }
    }

    /// Directory name under `icons/`
    pub fn dir_name(&self) -> &'static str {
        match self {
            BaseColour::Black => "black",
            BaseColour::White => "white",
        }
    }
}

/// A parsed icon descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconRequest {
    /// Icon identifier, `[a-z0-9-]+`
    pub name: String,
    /// Pixel edge, 0 when unspecified
    pub size: u32,
    /// Hex triplet or word alias, empty when unspecified
    pub colour: String,
    /// Whether the `inline` token was present
    pub inline: bool,
    /// Requested output format
    pub format: IconFormat,
}

impl IconRequest {
    /// Key of the rendered PNG for this request
    pub fn render_key(&self) -> RenderKey {
        RenderKey::new(&self.name, self.size, &self.colour)
    }
}

/// Identifier of a rendered PNG: the non-empty parts of `name-size-colour`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderKey(String);

impl RenderKey {
    pub fn new(name: &str, size: u32, colour: &str) -> Self {
        let size = if size > 0 { size.to_string() } else { String::new() };
        let key = [name, size.as_str(), colour]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("-");
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the rendered PNG
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, IconFormat::Png.extension())
    }
}

impl std::fmt::Display for RenderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Options for building SVG markup outside of a routed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgOptions {
    /// Pixel edge, 0 keeps the native dimension
    pub size: u32,
    /// Fill colour without the leading `#`, empty keeps the artwork colour
    pub colour: String,
    /// Embed a pre-rendered PNG for renderers without SVG support
    pub fallback: bool,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            size: 64,
            colour: "000".to_string(),
            fallback: true,
        }
    }
}

/// Response produced for a handled icon route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconResponse {
    /// SVG markup served directly
    Svg { content_type: &'static str, body: String },
    /// Permanent redirect to a rendered PNG
    Redirect { status: u16, location: String },
}

impl IconResponse {
    pub fn svg(body: String) -> Self {
        IconResponse::Svg {
            content_type: IconFormat::Svg.mime_type(),
            body,
        }
    }

    pub fn redirect(location: String) -> Self {
        IconResponse::Redirect { status: 301, location }
    }
}
