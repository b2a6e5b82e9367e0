//! Location of the page hosting the client.
//!
//! The dev server is usually reached through the same origin that served the
//! page, so the hostname, port and scheme of that page drive URL
//! construction when no absolute asset prefix is configured.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// PageLocation
// ============================================================================

/// Scheme, hostname and port of the hosting page.
///
/// # Example
///
/// ```
/// use hmr_client::PageLocation;
///
/// let page = PageLocation::parse("http://localhost:3000/dashboard").unwrap();
/// assert_eq!(page.scheme(), "http");
/// assert_eq!(page.authority(), "localhost:3000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    /// Lower-case scheme without the trailing colon (`http`, `https`).
    scheme: String,
    /// Hostname, with brackets for IPv6 literals.
    hostname: String,
    /// Explicit port; `None` means the scheme's default port.
    port: Option<u16>,
}

impl PageLocation {
    /// Creates a page location from its parts.
    ///
    /// A trailing `:` on the scheme is accepted and dropped.
    #[must_use]
    pub fn new(scheme: impl AsRef<str>, hostname: impl Into<String>, port: Option<u16>) -> Self {
        let scheme = scheme.as_ref();
        let scheme = scheme.strip_suffix(':').unwrap_or(scheme);

        Self {
            scheme: scheme.to_ascii_lowercase(),
            hostname: hostname.into(),
            port,
        }
    }

    /// Creates an `http://localhost:{port}` location.
    #[inline]
    #[must_use]
    pub fn localhost(port: u16) -> Self {
        Self::new("http", "localhost", Some(port))
    }

    /// Parses a page URL.
    ///
    /// Only the scheme, host and port are kept; a port equal to the
    /// scheme's default is treated as absent.
    ///
    /// # Errors
    ///
    /// - [`Error::Url`] if `url` is not an absolute URL
    /// - [`Error::Config`] if the URL has no host
    pub fn parse(url: &str) -> Result<Self> {
        let parsed = Url::parse(url)?;
        let hostname = parsed
            .host_str()
            .ok_or_else(|| Error::config(format!("Page URL has no host: {url}")))?;

        Ok(Self::new(parsed.scheme(), hostname, parsed.port()))
    }

    /// Returns the scheme (`http`, `https`, ...).
    #[inline]
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the hostname.
    #[inline]
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Returns the explicit port, if any.
    #[inline]
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns `hostname:port`, or just the hostname when no port is set.
    #[must_use]
    pub fn authority(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{port}", self.hostname),
            None => self.hostname.clone(),
        }
    }
}

impl fmt::Display for PageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_port() {
        let page = PageLocation::parse("http://localhost:3000/some/page?x=1").unwrap();
        assert_eq!(page.scheme(), "http");
        assert_eq!(page.hostname(), "localhost");
        assert_eq!(page.port(), Some(3000));
    }

    #[test]
    fn test_parse_default_port_is_absent() {
        let page = PageLocation::parse("https://example.com:443/").unwrap();
        assert_eq!(page.port(), None);
        assert_eq!(page.authority(), "example.com");
    }

    #[test]
    fn test_parse_ipv6() {
        let page = PageLocation::parse("http://[::1]:8080").unwrap();
        assert_eq!(page.hostname(), "[::1]");
        assert_eq!(page.authority(), "[::1]:8080");
    }

    #[test]
    fn test_parse_rejects_relative() {
        assert!(matches!(
            PageLocation::parse("/relative/path"),
            Err(Error::Url(_))
        ));
    }

    #[test]
    fn test_parse_rejects_hostless() {
        assert!(matches!(
            PageLocation::parse("data:text/plain,hi"),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_new_normalizes_scheme() {
        let page = PageLocation::new("HTTP:", "localhost", None);
        assert_eq!(page.scheme(), "http");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            PageLocation::localhost(3000).to_string(),
            "http://localhost:3000"
        );
    }
}
