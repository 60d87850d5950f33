//! SSRF (Server-Side Request Forgery) guard for media URLs
//!
//! Media URLs come straight from API callers and are fetched server side, so
//! before any request:
//! - the scheme must be http or https
//! - the host must be in the allowlist when one is configured
//! - private/internal IPs and hostnames are rejected unless explicitly allowed
//! - the hostname is resolved and every resolved IP is checked (DNS rebinding)

use std::net::{IpAddr, Ipv6Addr};
use tokio::net::lookup_host;

/// Which remote URLs the service may contact.
#[derive(Debug, Clone, Default)]
pub struct UrlPolicy {
    pub allow_private_ips: bool,
    pub allowlist: Option<Vec<String>>,
}

impl UrlPolicy {
    pub fn new(allow_private_ips: bool, allowlist: Option<Vec<String>>) -> Self {
        Self {
            allow_private_ips,
            allowlist,
        }
    }

    pub async fn validate(&self, url: &str) -> Result<(), String> {
        validate_url_for_ssrf(url, self.allow_private_ips, self.allowlist.as_deref()).await
    }
}

/// Validate URL to prevent SSRF attacks
///
/// # Arguments
/// * `url` - URL to validate
/// * `allow_private_ips` - If true, allows private IPs and internal hostnames
/// * `allowlist` - Optional list of allowed domains (subdomains match too)
pub async fn validate_url_for_ssrf(
    url: &str,
    allow_private_ips: bool,
    allowlist: Option<&[String]>,
) -> Result<(), String> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err("URL must start with http:// or https://".to_string());
    }

    let parsed_url = reqwest::Url::parse(url).map_err(|e| format!("Invalid URL format: {}", e))?;

    let host = parsed_url
        .host_str()
        .ok_or_else(|| "URL must have a host".to_string())?;
    let host = host.trim_start_matches('[').trim_end_matches(']');

    if let Some(allowed_domains) = allowlist {
        let host_lower = host.to_lowercase();
        let is_allowed = allowed_domains.iter().any(|allowed| {
            let allowed_lower = allowed.to_lowercase();
            host_lower == allowed_lower || host_lower.ends_with(&format!(".{}", allowed_lower))
        });

        if !is_allowed {
            return Err(format!(
                "URL hostname '{}' is not in the allowed list. Allowed domains: {}",
                host,
                allowed_domains.join(", ")
            ));
        }
    }

    if allow_private_ips {
        return Ok(());
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_private_ip(&ip) {
            return Err("Private/internal IP addresses are not allowed".to_string());
        }
    }

    if is_internal_hostname(host) {
        return Err("Localhost and internal hostnames are not allowed".to_string());
    }

    let port = parsed_url.port_or_known_default().unwrap_or(80);
    match lookup_host((host, port)).await {
        Ok(addrs) => {
            for addr in addrs {
                if is_private_ip(&addr.ip()) {
                    return Err(format!(
                        "Hostname resolves to private/internal IP address: {}",
                        addr.ip()
                    ));
                }
            }
        }
        Err(e) => {
            // The request itself will fail if the name really does not resolve.
            tracing::warn!(host = %host, error = %e, "Failed to resolve hostname for SSRF validation");
        }
    }

    Ok(())
}

fn is_internal_hostname(host: &str) -> bool {
    let host_lower = host.to_lowercase();
    host_lower == "localhost"
        || host_lower.ends_with(".localhost")
        || host_lower.ends_with(".local")
        || host_lower.starts_with("0.")
        || host_lower.contains(".internal")
        || host_lower.contains(".corp")
}

/// Check if an IP address is private/internal
///
/// Returns true for:
/// - IPv4 private ranges: 10.0.0.0/8, 172.16.0.0/12, 192.168.0.0/16
/// - IPv4 localhost: 127.0.0.0/8
/// - IPv4 link-local: 169.254.0.0/16
/// - IPv4 multicast: 224.0.0.0/4
/// - IPv4 reserved: 0.0.0.0/8
/// - IPv6 loopback, unspecified, multicast, link-local (fe80::/10), unique local (fc00::/7)
pub fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            let octets = ipv4.octets();
            octets[0] == 10
                || (octets[0] == 172 && (16..=31).contains(&octets[1]))
                || (octets[0] == 192 && octets[1] == 168)
                || octets[0] == 127
                || (octets[0] == 169 && octets[1] == 254)
                || (224..=239).contains(&octets[0])
                || octets[0] == 0
        }
        IpAddr::V6(ipv6) => {
            if let Some(mapped) = ipv6.to_ipv4_mapped() {
                return is_private_ip(&IpAddr::V4(mapped));
            }
            ipv6.is_loopback()
                || ipv6.is_unspecified()
                || ipv6.is_multicast()
                || is_ipv6_link_local(ipv6)
                || is_ipv6_unique_local(ipv6)
        }
    }
}

fn is_ipv6_link_local(ip: &Ipv6Addr) -> bool {
    ip.segments()[0] & 0xffc0 == 0xfe80
}

fn is_ipv6_unique_local(ip: &Ipv6Addr) -> bool {
    ip.segments()[0] & 0xfe00 == 0xfc00
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[tokio::test]
    async fn test_rejects_localhost() {
        assert!(validate_url_for_ssrf("http://localhost/cat.png", false, None)
            .await
            .is_err());
        assert!(validate_url_for_ssrf("http://127.0.0.1/cat.png", false, None)
            .await
            .is_err());
        assert!(validate_url_for_ssrf("http://[::1]/cat.png", false, None)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_rejects_private_ips() {
        for url in [
            "http://192.168.1.1/cat.png",
            "http://10.0.0.1/cat.png",
            "http://172.16.0.1/cat.png",
            "http://169.254.169.254/latest/meta-data",
        ] {
            assert!(validate_url_for_ssrf(url, false, None).await.is_err(), "{}", url);
        }
    }

    #[tokio::test]
    async fn test_rejects_internal_hostnames() {
        assert!(
            validate_url_for_ssrf("http://images.service.local/cat.png", false, None)
                .await
                .is_err()
        );
        assert!(validate_url_for_ssrf("http://media.corp/cat.png", false, None)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_rejects_invalid_schemes() {
        assert!(validate_url_for_ssrf("file:///etc/passwd", false, None)
            .await
            .is_err());
        assert!(validate_url_for_ssrf("ftp://example.com/cat.png", false, None)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_allow_private_ips_permits_loopback() {
        assert!(validate_url_for_ssrf("http://127.0.0.1:8080/cat.png", true, None)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_allowlist() {
        let allowlist = vec!["example.com".to_string()];
        assert!(
            validate_url_for_ssrf("https://evil.com/cat.png", false, Some(&allowlist))
                .await
                .is_err()
        );
        // Allowlist applies even when private addresses are allowed
        assert!(
            validate_url_for_ssrf("http://127.0.0.1/cat.png", true, Some(&allowlist))
                .await
                .is_err()
        );
    }

    #[test]
    fn test_is_private_ip() {
        assert!(is_private_ip(&IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))));
        assert!(is_private_ip(&IpAddr::V4(Ipv4Addr::new(172, 31, 0, 1))));
        assert!(!is_private_ip(&IpAddr::V4(Ipv4Addr::new(172, 32, 0, 1))));
        assert!(!is_private_ip(&IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8))));
        assert!(is_private_ip(&IpAddr::V6(Ipv6Addr::LOCALHOST)));
        assert!(is_private_ip(&IpAddr::V6(
            Ipv4Addr::new(10, 0, 0, 1).to_ipv6_mapped()
        )));
    }
}
