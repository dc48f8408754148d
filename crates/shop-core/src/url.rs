//! Absolute URL construction for listing links.

use std::fmt;

/// Base URL of a handler mount: `scheme://host[:port]{context}{servlet}/`.
///
/// The port is left out when it is the default for the scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    scheme: String,
    host: String,
    port: u16,
    context_path: String,
    servlet_path: String,
}

impl BaseUrl {
    /// Create a base URL for a server origin.
    pub fn new(scheme: &str, host: &str, port: u16) -> Self {
        Self {
            scheme: scheme.to_ascii_lowercase(),
            host: host.to_string(),
            port,
            context_path: String::new(),
            servlet_path: String::new(),
        }
    }

    /// Set the application mount path.
    pub fn with_context_path(mut self, path: &str) -> Self {
        self.context_path = path.to_string();
        self
    }

    /// Set the handler mount path.
    pub fn with_servlet_path(mut self, path: &str) -> Self {
        self.servlet_path = path.to_string();
        self
    }

    fn is_default_port(&self) -> bool {
        matches!(
            (self.scheme.as_str(), self.port),
            ("http", 80) | ("https", 443)
        )
    }

    /// Append a relative path (a listing URI path, or `_id/<id>`).
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self, path.trim_start_matches('/'))
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        if !self.is_default_port() {
            write!(f, ":{}", self.port)?;
        }
        write!(f, "{}{}/", self.context_path, self.servlet_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ports_omitted() {
        assert_eq!(BaseUrl::new("http", "shop.example.com", 80).to_string(), "http://shop.example.com/");
        assert_eq!(BaseUrl::new("HTTPS", "shop.example.com", 443).to_string(), "https://shop.example.com/");
        assert_eq!(BaseUrl::new("https", "shop.example.com", 443).to_string(), "https://shop.example.com/");
    }

    #[test]
    fn test_non_default_ports_kept() {
        assert_eq!(BaseUrl::new("http", "localhost", 8080).to_string(), "http://localhost:8080/");
        assert_eq!(BaseUrl::new("https", "localhost", 80).to_string(), "https://localhost:80/");
    }

    #[test]
    fn test_join_with_mount_paths() {
        let base = BaseUrl::new("https", "shop.example.com", 443)
            .with_context_path("/fanshop")
            .with_servlet_path("/listings");

        assert_eq!(base.to_string(), "https://shop.example.com/fanshop/listings/");
        assert_eq!(
            base.join("shirts/blue-tee"),
            "https://shop.example.com/fanshop/listings/shirts/blue-tee"
        );
        assert_eq!(
            base.join("/shirts/blue-tee"),
            "https://shop.example.com/fanshop/listings/shirts/blue-tee"
        );
    }
}
