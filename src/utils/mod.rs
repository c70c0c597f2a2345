//! Shared helpers: slug derivation and crate-wide constants.

pub mod constants;

pub use constants::*;

/// Derive a filesystem-safe slug from a URL's final path segment.
///
/// Non-alphanumeric characters become `-` and the result is lowercased, so
/// `https://www.reactbits.dev/animations/splash-cursor` maps to
/// `splash-cursor`. The result is additionally passed through
/// `sanitize_filename` as a backstop against hostile URL segments.
pub fn slug_for_url(url: &str) -> String {
    let segment = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url);

    let dashed: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();

    sanitize_filename::sanitize(dashed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_uses_last_path_segment() {
        assert_eq!(
            slug_for_url("https://www.reactbits.dev/components/stepper"),
            "stepper"
        );
        assert_eq!(
            slug_for_url("https://www.reactbits.dev/animations/splash-cursor"),
            "splash-cursor"
        );
    }

    #[test]
    fn slug_handles_trailing_slash_and_case() {
        assert_eq!(
            slug_for_url("https://example.com/Things/GridMotion/"),
            "gridmotion"
        );
    }

    #[test]
    fn slug_replaces_non_alphanumerics() {
        assert_eq!(slug_for_url("https://example.com/a b%c"), "a-b-c");
    }
}
