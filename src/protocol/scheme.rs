//! Transport scheme resolution.
//!
//! The scheme comes from the asset prefix when it is an absolute URL and
//! from the hosting page otherwise. Only a plain `http` origin gets a
//! plaintext socket; everything else is upgraded to `wss`.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use url::Url;

use crate::location::PageLocation;

// ============================================================================
// Constants
// ============================================================================

/// The only page scheme that maps to a plaintext socket.
const PLAINTEXT_PAGE_SCHEME: &str = "http";

// ============================================================================
// Scheme
// ============================================================================

/// WebSocket transport scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Plaintext `ws`.
    Ws,
    /// Encrypted `wss`.
    Wss,
}

impl Scheme {
    /// Returns the scheme as used in URLs.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ws => "ws",
            Self::Wss => "wss",
        }
    }

    /// Returns `true` for [`Scheme::Wss`].
    #[inline]
    #[must_use]
    pub const fn is_secure(self) -> bool {
        matches!(self, Self::Wss)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolves the transport scheme.
///
/// `base_url` wins when it parses as an absolute URL; otherwise (absent,
/// empty, relative) the page's scheme is used.
///
/// # Example
///
/// ```
/// use hmr_client::{PageLocation, Scheme, resolve};
///
/// let page = PageLocation::localhost(3000);
/// assert_eq!(resolve(None, &page), Scheme::Ws);
/// assert_eq!(resolve(Some("https://cdn.example.com/app/"), &page), Scheme::Wss);
/// ```
#[must_use]
pub fn resolve(base_url: Option<&str>, page: &PageLocation) -> Scheme {
    let parsed = base_url.and_then(|base| Url::parse(base).ok());
    let scheme = parsed.as_ref().map_or(page.scheme(), Url::scheme);

    if scheme == PLAINTEXT_PAGE_SCHEME {
        Scheme::Ws
    } else {
        Scheme::Wss
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn page(scheme: &str) -> PageLocation {
        PageLocation::new(scheme, "localhost", Some(3000))
    }

    #[test]
    fn test_absent_base_uses_page() {
        assert_eq!(resolve(None, &page("http")), Scheme::Ws);
        assert_eq!(resolve(None, &page("https")), Scheme::Wss);
    }

    #[test]
    fn test_empty_base_uses_page() {
        assert_eq!(resolve(Some(""), &page("http")), Scheme::Ws);
        assert_eq!(resolve(Some(""), &page("https")), Scheme::Wss);
    }

    #[test]
    fn test_absolute_https_base_wins() {
        let base = Some("https://cdn.example.com/app/");
        assert_eq!(resolve(base, &page("http")), Scheme::Wss);
        assert_eq!(resolve(base, &page("https")), Scheme::Wss);
    }

    #[test]
    fn test_absolute_http_base_wins() {
        let base = Some("http://cdn.example.com/assets");
        assert_eq!(resolve(base, &page("https")), Scheme::Ws);
    }

    #[test]
    fn test_other_schemes_are_encrypted() {
        assert_eq!(resolve(None, &page("file")), Scheme::Wss);
        assert_eq!(resolve(Some("ftp://files.example.com"), &page("http")), Scheme::Wss);
    }

    #[test]
    fn test_display() {
        assert_eq!(Scheme::Ws.to_string(), "ws");
        assert_eq!(Scheme::Wss.to_string(), "wss");
        assert!(Scheme::Wss.is_secure());
        assert!(!Scheme::Ws.is_secure());
    }

    proptest! {
        #[test]
        fn relative_prefix_follows_page_scheme(
            prefix in "[a-z0-9/_.-]{0,24}",
            secure in any::<bool>(),
        ) {
            let page = page(if secure { "https" } else { "http" });
            let expected = if secure { Scheme::Wss } else { Scheme::Ws };
            prop_assert_eq!(resolve(Some(prefix.as_str()), &page), expected);
        }
    }
}
