//! Request context with multi-valued query parameters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::CoreError;
use crate::url::BaseUrl;

/// Unique request identifier for log correlation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

static SEQUENCE: AtomicU32 = AtomicU32::new(1);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("{:x}-{:x}", nanos, seq))
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    /// Any method without a variant of its own.
    Other,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query string parameters, keeping repeated keys in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` query string.
    ///
    /// A key without `=` is present with an empty value, so `?help` can be
    /// detected with [`QueryParams::contains`].
    pub fn parse(query_string: &str) -> Self {
        let query_string = query_string.strip_prefix('?').unwrap_or(query_string);
        let pairs = query_string
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let mut parts = pair.splitn(2, '=');
                let key = parts.next().unwrap_or("");
                let value = parts.next().unwrap_or("");
                (form_decode(key), form_decode(value))
            })
            .collect();
        Self { pairs }
    }

    /// First value for a parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values for a parameter, in request order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Whether the parameter appears at all, even without a value.
    pub fn contains(&self, name: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == name)
    }
}

fn form_decode(s: &str) -> String {
    let plus_decoded = s.replace('+', " ");
    urlencoding::decode(&plus_decoded)
        .map(|cow| cow.into_owned())
        .unwrap_or(plus_decoded)
}

/// HTTP headers.
pub type Headers = HashMap<String, String>;

/// Request context handed to the listing handlers.
///
/// Mirrors the servlet view of a request: the path is split into context
/// path, servlet path and path info once the handler mount is known.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: RequestId,
    /// HTTP method.
    pub method: Method,
    /// Request scheme (`http` or `https`).
    pub scheme: String,
    /// Server host name.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Application mount path (empty or starting with `/`).
    pub context_path: String,
    /// Handler mount path below the context path.
    pub servlet_path: String,
    /// Decoded remainder of the path below the servlet path.
    pub path_info: Option<String>,
    /// Query string parameters.
    pub query: QueryParams,
    /// HTTP headers.
    pub headers: Headers,
}

impl RequestContext {
    /// Create a context for a request path with query string.
    ///
    /// The whole path starts out as path info; call [`RequestContext::mount`]
    /// to split off the context and servlet paths.
    pub fn new(method: Method, path_with_query: &str) -> Self {
        let (path, query) = match path_with_query.split_once('?') {
            Some((path, query)) => (path, query),
            None => (path_with_query, ""),
        };

        Self {
            request_id: RequestId::generate(),
            method,
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: 80,
            context_path: String::new(),
            servlet_path: String::new(),
            path_info: decode_path(path),
            query: QueryParams::parse(query),
            headers: HashMap::new(),
        }
    }

    /// Set scheme, host and port from the request URL or `Host` header.
    pub fn with_origin(mut self, scheme: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        self.scheme = scheme.into();
        self.host = host.into();
        self.port = port;
        self
    }

    /// Set scheme, host and port from a `Host` header value such as
    /// `shop.example.com:8080`.
    ///
    /// The scheme is lowercased, so `HTTPS` from a proxy header counts as
    /// `https`.
    pub fn with_host_header(self, scheme: &str, host_header: &str) -> Result<Self, CoreError> {
        let scheme = scheme.trim().to_ascii_lowercase();
        let default_port = if scheme == "https" { 443 } else { 80 };
        // IPv6 literals keep their brackets: `[::1]:8080`.
        let split = match host_header.rfind(']') {
            Some(end) => host_header[end..].find(':').map(|i| end + i),
            None => host_header.rfind(':'),
        };
        let (host, port) = match split {
            Some(i) => {
                let port = host_header[i + 1..]
                    .parse::<u16>()
                    .map_err(|_| CoreError::InvalidRequest(format!("bad port in host header: {}", host_header)))?;
                (&host_header[..i], port)
            }
            None => (host_header, default_port),
        };
        Ok(self.with_origin(scheme, host, port))
    }

    /// Split the request path into context path, servlet path and path info.
    ///
    /// Returns `None` when the path is not below `context_path + servlet_path`.
    pub fn mount(mut self, context_path: &str, servlet_path: &str) -> Option<Self> {
        let full = self.path_info.take().unwrap_or_default();
        let prefix = format!("{}{}", context_path, servlet_path);
        let rest = full.strip_prefix(&prefix)?;
        if !rest.is_empty() && !rest.starts_with('/') {
            return None;
        }

        self.context_path = context_path.to_string();
        self.servlet_path = servlet_path.to_string();
        self.path_info = if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        };
        Some(self)
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        let name_lower = name.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| k.to_lowercase() == name_lower)
            .map(|(_, v)| v.as_str())
    }

    /// Base URL of the handler mount, ending with `/`.
    pub fn base_url(&self) -> BaseUrl {
        BaseUrl::new(&self.scheme, &self.host, self.port)
            .with_context_path(&self.context_path)
            .with_servlet_path(&self.servlet_path)
    }
}

fn decode_path(path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(path)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| path.to_string());
    Some(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params_repeated_keys_keep_order() {
        let params = QueryParams::parse("c=shirts&q=blue+shirt&c=underwear");

        assert_eq!(params.get("q"), Some("blue shirt"));
        assert_eq!(params.get_all("c"), vec!["shirts", "underwear"]);
        assert!(params.get_all("t").is_empty());
    }

    #[test]
    fn test_query_params_flag_without_value() {
        let params = QueryParams::parse("?help&text=");

        assert!(params.contains("help"));
        assert_eq!(params.get("help"), Some(""));
        assert!(params.contains("text"));
        assert!(!params.contains("q"));
    }

    #[test]
    fn test_query_params_percent_decoding() {
        let params = QueryParams::parse("narrow=price%3A%5B10+TO+20%5D");
        assert_eq!(params.get("narrow"), Some("price:[10 TO 20]"));
    }

    #[test]
    fn test_mount_splits_path_info() {
        let ctx = RequestContext::new(Method::Get, "/shop/listings/shoes/red?s=1")
            .mount("/shop", "/listings")
            .unwrap();

        assert_eq!(ctx.context_path, "/shop");
        assert_eq!(ctx.servlet_path, "/listings");
        assert_eq!(ctx.path_info.as_deref(), Some("/shoes/red"));
        assert_eq!(ctx.query.get("s"), Some("1"));
    }

    #[test]
    fn test_mount_without_path_info() {
        let ctx = RequestContext::new(Method::Get, "/listings").mount("", "/listings").unwrap();
        assert!(ctx.path_info.is_none());
    }

    #[test]
    fn test_mount_rejects_other_prefix() {
        assert!(RequestContext::new(Method::Get, "/listingsx/a").mount("", "/listings").is_none());
        assert!(RequestContext::new(Method::Get, "/other").mount("", "/listings").is_none());
    }

    #[test]
    fn test_host_header_port() {
        let ctx = RequestContext::new(Method::Get, "/")
            .with_host_header("http", "shop.example.com:8080")
            .unwrap();
        assert_eq!(ctx.host, "shop.example.com");
        assert_eq!(ctx.port, 8080);

        let ctx = RequestContext::new(Method::Get, "/")
            .with_host_header("https", "shop.example.com")
            .unwrap();
        assert_eq!(ctx.port, 443);
    }

    #[test]
    fn test_host_header_scheme_lowercased() {
        let ctx = RequestContext::new(Method::Get, "/listings")
            .with_host_header("HTTPS", "shop.example.com")
            .unwrap();
        assert_eq!(ctx.scheme, "https");
        assert_eq!(ctx.port, 443);

        let ctx = ctx.mount("", "/listings").unwrap();
        assert_eq!(ctx.base_url().to_string(), "https://shop.example.com/listings/");
    }

    #[test]
    fn test_method_names() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Other.as_str(), "OTHER");
    }

    #[test]
    fn test_header_case_insensitive() {
        let ctx = RequestContext::new(Method::Get, "/").with_header("X-Forwarded-Proto", "https");
        assert_eq!(ctx.header("x-forwarded-proto"), Some("https"));
    }

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }
}
