//! SVG template transforms
//!
//! Templates come from a fixed, internally generated icon set, so every step
//! works on exact literal anchors rather than a parsed document. A template
//! missing an anchor passes through that step unchanged.

use crate::types::NATIVE_DIMENSION;

const ROOT_OPEN: &str = "<svg ";
const ROOT_CLOSE: &str = "</svg>";
const PATH_OPEN: &str = "<path ";

/// A single string-level edit applied to SVG markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformStep {
    /// Add `class="icon icon-{name} icon-size-{size}"` to the root element
    ClassName { name: String, size: u32 },
    /// Swap the native `width`/`height` for the requested edge
    Dimensions { size: u32 },
    /// Add `fill="#{colour}"` to every path
    Fill { colour: String },
    /// Append an `<image>` pointing at a pre-rendered PNG before the root closes
    Fallback { name: String, size: u32, src: String },
}

impl TransformStep {
    pub fn apply(&self, svg: &str) -> String {
        match self {
            TransformStep::ClassName { name, size } => svg.replacen(
                ROOT_OPEN,
                &format!("<svg class=\"icon icon-{name} icon-size-{size}\" "),
                1,
            ),
            TransformStep::Dimensions { size } => svg
                .replace(&format!("width=\"{NATIVE_DIMENSION}\""), &format!("width=\"{size}\""))
                .replace(&format!("height=\"{NATIVE_DIMENSION}\""), &format!("height=\"{size}\"")),
            TransformStep::Fill { colour } => {
                svg.replace(PATH_OPEN, &format!("<path fill=\"#{colour}\" "))
            }
            TransformStep::Fallback { name, size, src } => match svg.rfind(ROOT_CLOSE) {
                Some(at) => {
                    let image = format!(
                        "<image class=\"icon icon-fallback icon-{name}\" width=\"{size}\" height=\"{size}\" xlink:href=\"\" src=\"{src}\" />"
                    );
                    let mut out = String::with_capacity(svg.len() + image.len());
                    out.push_str(&svg[..at]);
                    out.push_str(&image);
                    out.push_str(&svg[at..]);
                    out
                }
                None => svg.to_string(),
            },
        }
    }
}

/// Ordered transform pipeline for one icon rendering
#[derive(Debug, Clone, Default)]
pub struct SvgTransform {
    steps: Vec<TransformStep>,
}

impl SvgTransform {
    /// Build the pipeline for an icon.
    ///
    /// Steps run in a fixed order: class, dimensions (non-zero size only),
    /// fill (non-empty colour only), fallback (when a PNG URL is given).
    pub fn for_icon(name: &str, size: u32, colour: &str, fallback_src: Option<String>) -> Self {
        let mut steps = vec![TransformStep::ClassName {
            name: name.to_string(),
            size,
        }];

        if size > 0 {
            steps.push(TransformStep::Dimensions { size });
        }

        if !colour.is_empty() {
            steps.push(TransformStep::Fill {
                colour: colour.to_string(),
            });
        }

        if let Some(src) = fallback_src {
            steps.push(TransformStep::Fallback {
                name: name.to_string(),
                size,
                src,
            });
        }

        Self { steps }
    }

    pub fn steps(&self) -> &[TransformStep] {
        &self.steps
    }

    pub fn apply(&self, template: &str) -> String {
        self.steps
            .iter()
            .fold(template.to_string(), |svg, step| step.apply(&svg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TEMPLATE: &str = r#"<svg width="1792" height="1792" viewBox="0 -256 1792 1792" xmlns="http://www.w3.org/2000/svg"><g transform="matrix(1,0,0,-1,0,1536)"><path d="M0 0h10v10z"/><path d="M5 5h2v2z"/></g></svg>"#;

    #[test]
    fn test_class_injection() {
        let svg = TransformStep::ClassName { name: "star".into(), size: 32 }.apply(TEMPLATE);
        assert!(svg.starts_with(r#"<svg class="icon icon-star icon-size-32" width="1792""#));
        assert_eq!(svg.matches("class=").count(), 1);
    }

    #[test]
    fn test_dimensions() {
        let svg = TransformStep::Dimensions { size: 48 }.apply(TEMPLATE);
        assert!(svg.contains(r#"width="48" height="48""#));
        assert!(!svg.contains(r#"width="1792""#));
        assert!(!svg.contains(r#"height="1792""#));
        assert!(svg.contains(r#"viewBox="0 -256 1792 1792""#));
    }

    #[test]
    fn test_fill_every_path() {
        let svg = TransformStep::Fill { colour: "ff0000".into() }.apply(TEMPLATE);
        assert_eq!(svg.matches(r##"<path fill="#ff0000" d="##).count(), 2);
    }

    #[test]
    fn test_fallback_before_root_close() {
        let step = TransformStep::Fallback {
            name: "star".into(),
            size: 20,
            src: "/icons/black/png/22/star.png".into(),
        };
        let svg = step.apply(TEMPLATE);
        assert!(svg.ends_with(
            r#"<image class="icon icon-fallback icon-star" width="20" height="20" xlink:href="" src="/icons/black/png/22/star.png" /></svg>"#
        ));
    }

    #[test]
    fn test_missing_anchors_pass_through() {
        let text = "<!-- SVG not found -->";
        let transform = SvgTransform::for_icon("star", 32, "fff", Some("/x.png".into()));
        assert_eq!(transform.apply(text), text);
    }

    #[test]
    fn test_pipeline_order_and_skips() {
        let transform = SvgTransform::for_icon("star", 0, "", None);
        assert_eq!(
            transform.steps(),
            &[TransformStep::ClassName { name: "star".into(), size: 0 }]
        );

        let svg = transform.apply(TEMPLATE);
        assert!(svg.contains(r#"class="icon icon-star icon-size-0""#));
        assert!(svg.contains(r#"width="1792" height="1792""#));
        assert!(!svg.contains("fill="));
        assert!(!svg.contains("<image"));
    }

    #[test]
    fn test_full_pipeline() {
        let transform = SvgTransform::for_icon("star", 24, "abc", Some("/p.png".into()));
        assert_eq!(transform.steps().len(), 4);

        let svg = transform.apply(TEMPLATE);
        assert!(svg.starts_with(r#"<svg class="icon icon-star icon-size-24" width="24" height="24""#));
        assert_eq!(svg.matches(r##"fill="#abc""##).count(), 2);
        assert!(svg.contains(r#"src="/p.png" /></svg>"#));
    }
}
