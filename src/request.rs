//! Icon route parsing
//!
//! Routes look like `svg-icon/{name}[/{size}][/{colour}][/inline].{svg|png}`.
//! Anything that does not fit is simply not an icon request.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    sanitize::Sanitizer,
    types::{IconFormat, IconRequest},
};

static ICON_TAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z0-9\-]+)(?:/(\d+))?(?:/([a-zA-Z0-9]{3,6}))?(?:/(inline))?\.(svg|png)$")
        .expect("valid icon route pattern")
});

const INLINE_TOKEN: &str = "inline";

/// Parses raw request paths into icon descriptors
pub struct RequestParser<'a> {
    marker: &'a str,
    sanitizer: &'a dyn Sanitizer,
}

impl<'a> RequestParser<'a> {
    pub fn new(marker: &'a str, sanitizer: &'a dyn Sanitizer) -> Self {
        Self { marker, sanitizer }
    }

    /// Parse a path, returning `None` when it is not an icon request
    pub fn parse(&self, raw_path: &str) -> Option<IconRequest> {
        if !raw_path.contains(self.marker) {
            return None;
        }

        let Some(tail) = raw_path
            .trim_start_matches('/')
            .strip_prefix(self.marker)
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            log::trace!("Path {:?} has no icon route prefix", raw_path);
            return None;
        };

        let captures = ICON_TAIL.captures(tail)?;

        let field = |index: usize| {
            captures
                .get(index)
                .map(|m| self.sanitizer.sanitize(m.as_str()))
                .unwrap_or_default()
        };

        let name = field(1);
        let format = IconFormat::from_extension(&field(5));
        let size = match captures.get(2) {
            Some(size) => match size.as_str().parse::<u32>() {
                Ok(size) => size,
                Err(_) => {
                    log::debug!("Ignoring icon path with out-of-range size: {:?}", raw_path);
                    return None;
                }
            },
            None => 0,
        };

        let (Some(format), false) = (format, name.is_empty()) else {
            return None;
        };

        // the colour pattern also matches the bare `inline` token
        let mut colour = field(3);
        let mut inline = captures.get(4).is_some();
        if !inline && colour == INLINE_TOKEN {
            colour.clear();
            inline = true;
        }

        Some(IconRequest {
            name,
            size,
            colour,
            inline,
            format,
        })
    }
}
