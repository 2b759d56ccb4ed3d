//! Text sanitization applied to every field taken from a request path

use once_cell::sync::Lazy;
use regex::Regex;

static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>?").expect("valid tag pattern"));
static OCTETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"%[a-fA-F0-9]{2}").expect("valid octet pattern"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Cleans untrusted text before it reaches markup or the filesystem.
///
/// Hosts with their own escaping rules plug them in here.
pub trait Sanitizer: Send + Sync {
    fn sanitize(&self, input: &str) -> String;
}

/// Default sanitizer: strips markup, percent-encoded octets and control
/// characters, then collapses whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSanitizer;

impl Sanitizer for TextSanitizer {
    fn sanitize(&self, input: &str) -> String {
        let text = TAGS.replace_all(input, "");
        let text = OCTETS.replace_all(&text, "");
        let text: String = text.chars().filter(|c| !c.is_control() || c.is_whitespace()).collect();
        WHITESPACE.replace_all(text.trim(), " ").into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(TextSanitizer.sanitize("arrow-left"), "arrow-left");
        assert_eq!(TextSanitizer.sanitize("ff0000"), "ff0000");
    }

    #[test]
    fn test_strips_markup_and_controls() {
        assert_eq!(TextSanitizer.sanitize("<b>star</b>"), "star");
        assert_eq!(TextSanitizer.sanitize("st\u{0}ar\u{7f}"), "star");
        assert_eq!(TextSanitizer.sanitize("a%3Cb"), "ab");
        assert_eq!(TextSanitizer.sanitize("  a \n\t b  "), "a b");
    }
}
