//! Route path type for type-safe path handling.
//!
//! - Internal representation: Always decoded (human-readable)
//! - Browser boundary: Decode on input, encode on output
//!
//! Every constructor goes through the same normalization, so a path built
//! from the route manifest and a path typed by a reader compare equal
//! whenever they name the same page.

use std::borrow::Borrow;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

/// Dummy base used to resolve `.` and `..` segments.
static BASE: LazyLock<Option<url::Url>> = LazyLock::new(|| url::Url::parse("http://x").ok());

/// Normalized route path (registry key)
///
/// Invariants:
/// - Always decoded, except `%` itself (kept as `%25`) and bytes that are
///   not UTF-8 (kept encoded)
/// - Always starts with `/`, never contains `//`
/// - No query string or fragment
/// - A trailing `index.html` is folded into its directory
/// - Extensionless paths end with `/`; `.html` pages keep their name
/// - Case is preserved (comparison is case-sensitive)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoutePath(Arc<str>);

impl RoutePath {
    /// Normalize any raw path (manifest key, link target or browser URL).
    pub fn new(raw: &str) -> Self {
        // Query and fragment never take part in routing
        let path = strip_query(raw.trim());

        // Decode before anything structural, so `%2F`, `%2E`, `%3F` and
        // `%23` are normalized like their literal forms
        let path = match decode(path) {
            Some(decoded) => escape_percent(strip_query(&decoded)),
            None => path.to_string(),
        };

        if path.is_empty() || path == "/" {
            return Self::root();
        }

        let collapsed = collapse_slashes(&path);
        let resolved = resolve_dots(&collapsed);

        let mut normalized = fold_index(resolved);
        if needs_trailing_slash(&normalized) {
            normalized.push('/');
        }

        Self(Arc::from(normalized))
    }

    /// The root path `/`.
    pub fn root() -> Self {
        Self(Arc::from("/"))
    }

    /// Get the decoded path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Encode for browser (percent-encode non-ASCII and special characters).
    pub fn to_encoded(&self) -> String {
        use percent_encoding::{NON_ALPHANUMERIC, percent_decode_str, percent_encode};
        self.0
            .split('/')
            .map(|segment| {
                let bytes: Vec<u8> = percent_decode_str(segment).collect();
                percent_encode(&bytes, NON_ALPHANUMERIC).to_string()
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Check if this is the root path.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.as_ref() == "/"
    }

    /// Check if path starts with the given prefix.
    #[inline]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Get parent directory path.
    ///
    /// `/docs/intro.html` -> `/docs/`, `/docs/` -> `/`, `/` -> `None`
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.0.trim_end_matches('/');
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.rfind('/') {
            Some(0) | None => Some(Self::root()),
            Some(idx) => Some(Self(Arc::from(format!("{}/", &trimmed[..idx])))),
        }
    }
}

/// Ensure a leading slash and collapse runs of `/`.
fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    out.push('/');
    for ch in path.chars() {
        if ch == '/' && out.ends_with('/') {
            continue;
        }
        out.push(ch);
    }
    out
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

/// Percent-decode. `None` when the bytes are not UTF-8.
fn decode(path: &str) -> Option<String> {
    percent_encoding::percent_decode_str(path)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

/// A literal `%` is stored as `%25`, so decoding a stored path is a no-op.
fn escape_percent(path: &str) -> String {
    path.replace('%', "%25")
}

/// Resolve `.`/`..` segments using the url crate.
///
/// Input must start with a single `/` (otherwise `//host` would parse as
/// a network path).
fn resolve_dots(path: &str) -> String {
    let joined = BASE.as_ref().and_then(|base| base.join(path).ok());
    let encoded = match &joined {
        Some(url) => url.path(),
        None => path,
    };

    // url crate returns a percent-encoded path; invalid UTF-8 stays encoded
    match decode(encoded) {
        Some(decoded) => escape_percent(&decoded),
        None => encoded.to_string(),
    }
}

/// `/docs/index.html` -> `/docs/`
fn fold_index(path: String) -> String {
    match path.strip_suffix("index.html") {
        Some(dir) if dir.ends_with('/') => dir.to_string(),
        _ => path,
    }
}

/// Extensionless final segments are directory pages.
fn needs_trailing_slash(path: &str) -> bool {
    if path.ends_with('/') {
        return false;
    }
    let last = path.rsplit('/').next().unwrap_or_default();
    std::path::Path::new(last).extension().is_none()
}

impl std::fmt::Display for RoutePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for RoutePath {
    fn default() -> Self {
        Self::root()
    }
}

impl AsRef<str> for RoutePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RoutePath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for RoutePath {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<&str> for RoutePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<&RoutePath> for RoutePath {
    fn from(p: &RoutePath) -> Self {
        p.clone()
    }
}

impl PartialEq<str> for RoutePath {
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for RoutePath {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl Serialize for RoutePath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RoutePath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root() {
        assert_eq!(RoutePath::new("").as_str(), "/");
        assert_eq!(RoutePath::new("   ").as_str(), "/");
        assert_eq!(RoutePath::new("/").as_str(), "/");
        assert!(RoutePath::new("/?q=1").is_root());
    }

    #[test]
    fn test_directory_pages_get_trailing_slash() {
        assert_eq!(RoutePath::new("/docs").as_str(), "/docs/");
        assert_eq!(RoutePath::new("/docs/").as_str(), "/docs/");
        assert_eq!(RoutePath::new("docs").as_str(), "/docs/");
    }

    #[test]
    fn test_html_pages_keep_name() {
        assert_eq!(
            RoutePath::new("/get-started.html").as_str(),
            "/get-started.html"
        );
        assert_eq!(
            RoutePath::new("documentation/replaying.html").as_str(),
            "/documentation/replaying.html"
        );
    }

    #[test]
    fn test_index_html_folds_into_directory() {
        assert_eq!(
            RoutePath::new("/documentation/index.html").as_str(),
            "/documentation/"
        );
        assert_eq!(RoutePath::new("/index.html").as_str(), "/");
        // Only a whole segment counts
        assert_eq!(
            RoutePath::new("/appendix.html").as_str(),
            "/appendix.html"
        );
        assert_eq!(RoutePath::new("/myindex.html").as_str(), "/myindex.html");
    }

    #[test]
    fn test_strips_query_and_fragment() {
        assert_eq!(RoutePath::new("/docs/?v=1").as_str(), "/docs/");
        assert_eq!(RoutePath::new("/docs#intro").as_str(), "/docs/");
        assert_eq!(
            RoutePath::new("/a.html?v=1#section").as_str(),
            "/a.html"
        );
    }

    #[test]
    fn test_collapses_slashes() {
        assert_eq!(RoutePath::new("//docs//intro/").as_str(), "/docs/intro/");
        assert_eq!(RoutePath::new("///").as_str(), "/");
    }

    #[test]
    fn test_resolves_dot_segments() {
        assert_eq!(RoutePath::new("/docs/./intro/").as_str(), "/docs/intro/");
        assert_eq!(RoutePath::new("/docs/../about/").as_str(), "/about/");
        assert_eq!(RoutePath::new("/../../etc").as_str(), "/etc/");
    }

    #[test]
    fn test_decodes_percent_encoding() {
        assert_eq!(
            RoutePath::new("/posts/%E4%B8%AD%E6%96%87/").as_str(),
            "/posts/中文/"
        );
        assert_eq!(
            RoutePath::new("/posts/hello%20world/").as_str(),
            "/posts/hello world/"
        );
    }

    #[test]
    fn test_invalid_utf8_preserved() {
        let path = RoutePath::new("/posts/%FF/");
        assert_eq!(path.as_str(), "/posts/%FF/");
    }

    #[test]
    fn test_case_preserved() {
        assert_ne!(RoutePath::new("/Docs/"), RoutePath::new("/docs/"));
        assert_eq!(RoutePath::new("/Docs").as_str(), "/Docs/");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for raw in [
            "/docs",
            "/a.html",
            "/x/index.html",
            "/中文",
            "/a/../b?x#y",
            "/a%2F%2Fb",
            "/x%2F..%2Fy",
            "/faq%3Fx",
            "/a%23b",
            "/100%25",
            "/a%2541",
            "/posts/%FF/",
        ] {
            let once = RoutePath::new(raw);
            let twice = RoutePath::new(once.as_str());
            assert_eq!(once, twice, "not idempotent for {raw}");
        }
    }

    #[test]
    fn test_encoded_reserved_characters() {
        assert_eq!(RoutePath::new("/a%2F%2Fb"), RoutePath::new("/a//b/"));
        assert_eq!(RoutePath::new("/a%2F%2Fb").as_str(), "/a/b/");
        assert_eq!(RoutePath::new("/x%2F..%2Fy").as_str(), "/y/");
        assert_eq!(RoutePath::new("/docs/%2E%2E/about").as_str(), "/about/");
        assert_eq!(RoutePath::new("/faq%3Fx").as_str(), "/faq/");
        assert_eq!(RoutePath::new("/a%23b").as_str(), "/a/");
    }

    #[test]
    fn test_literal_percent() {
        let path = RoutePath::new("/100%25");
        assert_eq!(path.as_str(), "/100%25/");
        assert_eq!(path.to_encoded(), "/100%25/");
        assert_eq!(RoutePath::new(path.as_str()), path);
    }

    #[test]
    fn test_to_encoded() {
        let path = RoutePath::new("/posts/中文/");
        assert_eq!(path.to_encoded(), "/posts/%E4%B8%AD%E6%96%87/");
        let path = RoutePath::new("/posts/hello world/");
        assert_eq!(path.to_encoded(), "/posts/hello%20world/");
    }

    #[test]
    fn test_parent() {
        assert_eq!(
            RoutePath::new("/docs/intro/").parent(),
            Some(RoutePath::new("/docs/"))
        );
        assert_eq!(
            RoutePath::new("/docs/intro.html").parent(),
            Some(RoutePath::new("/docs/"))
        );
        assert_eq!(RoutePath::new("/docs/").parent(), Some(RoutePath::root()));
        assert_eq!(RoutePath::root().parent(), None);
    }

    #[test]
    fn test_hash_and_eq() {
        use rustc_hash::FxHashSet;

        let mut set = FxHashSet::default();
        set.insert(RoutePath::new("/docs"));
        set.insert(RoutePath::new("/docs/"));
        set.insert(RoutePath::new("/docs/index.html"));
        assert_eq!(set.len(), 1);
        assert!(set.contains("/docs/"));
    }

    #[test]
    fn test_serialize_deserialize() {
        let path = RoutePath::new("/posts/中文/");
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#""/posts/中文/""#);

        let parsed: RoutePath = serde_json::from_str(r#""/posts/%E4%B8%AD%E6%96%87""#).unwrap();
        assert_eq!(parsed, path);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", RoutePath::new("/docs")), "/docs/");
    }
}
