use std::net::IpAddr;
use thiserror::Error;
use url::{Host, Url};

/// Errors that can occur during URL validation.
///
/// Covers parsing failures and, when the private-host guard is enabled,
/// the SSRF (Server-Side Request Forgery) policy violations.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL points to a private/internal IP address.
    #[error("Private IP address not allowed: {0}")]
    PrivateIp(String),
    /// The URL points to localhost.
    #[error("Localhost not allowed")]
    Localhost,
}

/// Validates a feed or article URL before any request is issued.
///
/// Every URL must parse and use the `http` or `https` scheme. When
/// `block_private_hosts` is set, the following are rejected as well:
/// - Localhost addresses (`localhost`, `127.0.0.1`, `::1`)
/// - Private IP ranges (RFC 1918, link-local, unique local IPv6)
/// - IPv4-mapped IPv6 addresses (`::ffff:10.0.0.1`) pointing at either
///
/// # Errors
///
/// - [`UrlValidationError::InvalidUrl`] if the string cannot be parsed
/// - [`UrlValidationError::UnsupportedScheme`] for anything but http/https
/// - [`UrlValidationError::Localhost`] / [`UrlValidationError::PrivateIp`]
///   when the guard is enabled and the host is internal
///
/// # Examples
///
/// ```
/// use rrss::util::validate_url;
///
/// let url = validate_url("https://example.com/feed.xml", true).unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
///
/// assert!(validate_url("http://localhost/feed", true).is_err());
/// assert!(validate_url("http://localhost/feed", false).is_ok());
/// assert!(validate_url("file:///etc/passwd", false).is_err());
/// ```
pub fn validate_url(url_str: &str, block_private_hosts: bool) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if !block_private_hosts {
        return Ok(url);
    }

    check_host(&url)?;
    Ok(url)
}

fn check_host(url: &Url) -> Result<(), UrlValidationError> {
    match url.host() {
        Some(Host::Domain(domain)) => {
            // "localhost." resolves the same as "localhost"
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            if domain == "localhost" || domain.ends_with(".localhost") {
                return Err(UrlValidationError::Localhost);
            }
            Ok(())
        }
        Some(Host::Ipv4(ip)) => check_ip(IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => check_ip(IpAddr::V6(ip)),
        None => Ok(()),
    }
}

fn check_ip(ip: IpAddr) -> Result<(), UrlValidationError> {
    // ::ffff:a.b.c.d reaches the IPv4 host a.b.c.d
    let ip = match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(IpAddr::V6(v6), IpAddr::V4),
        v4 => v4,
    };
    if ip.is_loopback() {
        return Err(UrlValidationError::Localhost);
    }
    if is_private_ip(&ip) {
        return Err(UrlValidationError::PrivateIp(ip.to_string()));
    }
    Ok(())
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            ipv4.is_private() || ipv4.is_loopback() || ipv4.is_link_local() || ipv4.is_unspecified()
        }
        IpAddr::V6(ipv6) => {
            if ipv6.is_loopback() || ipv6.is_unspecified() {
                return true;
            }
            let segments = ipv6.segments();
            // Unique Local (fc00::/7)
            let is_unique_local = (segments[0] & 0xfe00) == 0xfc00;
            // Link-Local (fe80::/10)
            let is_link_local = (segments[0] & 0xffc0) == 0xfe80;
            is_unique_local || is_link_local
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert!(validate_url("https://example.com/feed.xml", true).is_ok());
        assert!(validate_url("http://news.example.org", true).is_ok());
    }

    #[test]
    fn test_surrounding_whitespace_tolerated() {
        let url = validate_url("  https://example.com/post/1 \n", false).unwrap();
        assert_eq!(url.path(), "/post/1");
    }

    #[test]
    fn test_invalid_schemes() {
        assert!(matches!(
            validate_url("file:///etc/passwd", false),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
        assert!(validate_url("ftp://example.com", false).is_err());
        assert!(validate_url("javascript:alert(1)", false).is_err());
    }

    #[test]
    fn test_relative_url_rejected() {
        assert!(matches!(
            validate_url("/posts/1", false),
            Err(UrlValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_localhost_allowed_without_guard() {
        assert!(validate_url("http://127.0.0.1:8080/article", false).is_ok());
        assert!(validate_url("http://localhost/article", false).is_ok());
    }

    #[test]
    fn test_localhost_rejected_with_guard() {
        assert!(validate_url("http://localhost/feed", true).is_err());
        assert!(validate_url("http://127.0.0.1/feed", true).is_err());
        assert!(validate_url("http://[::1]/feed", true).is_err());
    }

    #[test]
    fn test_private_ips_rejected_with_guard() {
        assert!(validate_url("http://192.168.1.1/feed", true).is_err());
        assert!(validate_url("http://10.0.0.1:3000/feed", true).is_err());
        assert!(validate_url("http://172.16.0.1/feed", true).is_err());
        assert!(validate_url("http://169.254.1.1/feed", true).is_err());
        assert!(validate_url("http://[fe80::1]/feed", true).is_err());
        assert!(validate_url("http://0.0.0.0/feed", true).is_err());
    }

    #[test]
    fn test_ipv4_mapped_ipv6_rejected_with_guard() {
        assert!(matches!(
            validate_url("http://[::ffff:127.0.0.1]/x", true),
            Err(UrlValidationError::Localhost)
        ));
        assert!(matches!(
            validate_url("http://[::ffff:10.0.0.1]/x", true),
            Err(UrlValidationError::PrivateIp(_))
        ));
        assert!(matches!(
            validate_url("http://[::ffff:192.168.1.1]/x", true),
            Err(UrlValidationError::PrivateIp(_))
        ));
        assert!(validate_url("http://[::ffff:93.184.216.34]/x", true).is_ok());
    }

    #[test]
    fn test_localhost_variants_rejected_with_guard() {
        assert!(validate_url("http://localhost./x", true).is_err());
        assert!(validate_url("http://LOCALHOST/x", true).is_err());
        assert!(validate_url("http://app.localhost/x", true).is_err());
        assert!(validate_url("http://localhost.example.com/x", true).is_ok());
    }
}
