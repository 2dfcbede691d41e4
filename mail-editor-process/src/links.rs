//! Link normalization.

/// Make `url` absolute against `base_url`.
///
/// URLs with an explicit non-HTTP scheme (`tel:`, `mailto:`, `data:`, ...),
/// absolute URLs and protocol-relative URLs are returned unchanged. An empty
/// `url` yields the base itself, or `/` when the base is empty too.
///
/// `base_url` is expected to be an absolute `scheme://host` URL or empty.
///
/// ```
/// use mail_editor_process::absolutize;
///
/// assert_eq!(absolutize("foo", "https://example.com/"), "https://example.com/foo");
/// assert_eq!(absolutize("mailto:a@example.com", "https://example.com"), "mailto:a@example.com");
/// ```
pub fn absolutize(url: &str, base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');

    if url.is_empty() {
        return if base.is_empty() {
            "/".to_string()
        } else {
            base.to_string()
        };
    }

    if has_explicit_scheme(url) || url.contains("://") || url.starts_with("//") {
        return url.to_string();
    }

    if url.starts_with('/') {
        format!("{}{}", base, url)
    } else {
        format!("{}/{}", base, url)
    }
}

/// Whether `url` starts with a scheme other than http(s) that is not
/// followed by `//`, e.g. `tel:123` or `data:image/png;base64,...`.
pub fn has_explicit_scheme(url: &str) -> bool {
    let Some((scheme, rest)) = url.split_once(':') else {
        return false;
    };

    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    valid
        && !rest.starts_with("//")
        && !scheme.eq_ignore_ascii_case("http")
        && !scheme.eq_ignore_ascii_case("https")
}

/// Strip the query string and fragment.
pub(crate) fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolutize() {
        let cases = [
            ("http://example.com", "/foo", "http://example.com/foo"),
            ("http://example.com", "foo", "http://example.com/foo"),
            ("http://example.com/", "/foo", "http://example.com/foo"),
            ("http://example.com", "", "http://example.com"),
            ("http://example.com/", "", "http://example.com"),
            ("http://example.com", "http://example.com/foo", "http://example.com/foo"),
            ("", "http://example.com/foo", "http://example.com/foo"),
            ("", "foo", "/foo"),
            ("", "", "/"),
            ("http://example.com", "//cdn.example.com/x.png", "//cdn.example.com/x.png"),
        ];

        for (base, url, expected) in cases {
            assert_eq!(absolutize(url, base), expected, "absolutize({url:?}, {base:?})");
        }
    }

    #[test]
    fn test_scheme_preservation() {
        for base in ["", "http://example.com", "https://example.com/"] {
            for url in [
                "tel:123456789",
                "mailto:foo@example.com",
                "data:image/png;base64,xyz",
                "sms:+3161234",
                "javascript:void(0)",
            ] {
                assert_eq!(absolutize(url, base), url);
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let urls = ["", "/", "foo", "/foo/bar", "foo?x=1#y", "tel:1", "https://a.b/c", "//x/y"];
        for base in ["", "https://example.com", "https://example.com/"] {
            for url in urls {
                let once = absolutize(url, base);
                assert_eq!(absolutize(&once, base), once, "url {url:?} base {base:?}");
            }
        }
    }

    #[test]
    fn test_has_explicit_scheme() {
        assert!(has_explicit_scheme("tel:1"));
        assert!(has_explicit_scheme("data:,x"));
        assert!(!has_explicit_scheme("https://example.com"));
        assert!(!has_explicit_scheme("http:foo"));
        assert!(!has_explicit_scheme("/foo:bar"));
        assert!(!has_explicit_scheme("1a:b"));
        assert!(!has_explicit_scheme("foo"));
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(strip_query("/static/a.png?v=1"), "/static/a.png");
        assert_eq!(strip_query("/static/a.png#top"), "/static/a.png");
        assert_eq!(strip_query("/static/a.png"), "/static/a.png");
    }
}
