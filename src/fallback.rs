//! Fallback PNG selection for SVG output

use crate::types::{BaseColour, MAX_BUCKET, SIZE_BUCKETS};

/// Round a requested edge up to the nearest pre-rendered bucket.
///
/// Zero means "unspecified" and maps to the largest bucket; anything above
/// the largest bucket is capped to it.
pub fn resolve_bucket(requested: u32) -> u32 {
    if requested == 0 {
        return MAX_BUCKET;
    }

    let clamped = requested.min(MAX_BUCKET);
    SIZE_BUCKETS
        .iter()
        .copied()
        .find(|bucket| *bucket >= clamped)
        .unwrap_or(MAX_BUCKET)
}

/// Public URL of the pre-rendered PNG for an icon
pub fn fallback_url(icons_url: &str, base: BaseColour, bucket: u32, name: &str) -> String {
    format!("{}/icons/{}/png/{}/{}.png", icons_url, base.dir_name(), bucket, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_resolution() {
        assert_eq!(resolve_bucket(0), 256);
        assert_eq!(resolve_bucket(1), 16);
        assert_eq!(resolve_bucket(10), 16);
        assert_eq!(resolve_bucket(16), 16);
        assert_eq!(resolve_bucket(17), 22);
        assert_eq!(resolve_bucket(23), 24);
        assert_eq!(resolve_bucket(100), 128);
        assert_eq!(resolve_bucket(256), 256);
        assert_eq!(resolve_bucket(300), 256);
        assert_eq!(resolve_bucket(u32::MAX), 256);
    }

    #[test]
    fn test_every_bucket_maps_to_itself() {
        for bucket in SIZE_BUCKETS {
            assert_eq!(resolve_bucket(bucket), bucket);
        }
    }

    #[test]
    fn test_fallback_url() {
        assert_eq!(
            fallback_url("https://cdn.test/plugin", BaseColour::White, 32, "star"),
            "https://cdn.test/plugin/icons/white/png/32/star.png"
        );
    }
}
