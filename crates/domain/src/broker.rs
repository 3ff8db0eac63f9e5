//! Broker connection settings and reachable-address resolution.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Parsed `scheme://host[:port]` broker URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerUri {
    pub scheme: String,
    /// Host without IPv6 brackets.
    pub host: String,
    pub port: Option<u16>,
}

/// Why a broker URI could not be parsed.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BrokerUriError {
    #[error("broker URI must look like scheme://host[:port]")]
    MissingScheme,

    #[error("broker URI has no host")]
    MissingHost,

    #[error("invalid broker port {0:?}")]
    InvalidPort(String),
}

impl FromStr for BrokerUri {
    type Err = BrokerUriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scheme, rest) = s.split_once("://").ok_or(BrokerUriError::MissingScheme)?;
        if scheme.is_empty() {
            return Err(BrokerUriError::MissingScheme);
        }
        let authority = rest.split('/').next().unwrap_or_default();
        let (host, port) = split_authority(authority)?;
        if host.is_empty() {
            return Err(BrokerUriError::MissingHost);
        }
        Ok(Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            port,
        })
    }
}

fn split_authority(authority: &str) -> Result<(&str, Option<u16>), BrokerUriError> {
    // Bracketed IPv6 literal, optionally followed by a port.
    if let Some(rest) = authority.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or(BrokerUriError::MissingHost)?;
        let port = match tail.strip_prefix(':') {
            Some(port) => Some(parse_port(port)?),
            None if tail.is_empty() => None,
            None => return Err(BrokerUriError::InvalidPort(tail.to_string())),
        };
        return Ok((host, port));
    }
    // Bare IPv6 literal such as `::1` carries no port.
    if authority.parse::<std::net::Ipv6Addr>().is_ok() {
        return Ok((authority, None));
    }
    match authority.rsplit_once(':') {
        Some((host, port)) => Ok((host, Some(parse_port(port)?))),
        None => Ok((authority, None)),
    }
}

fn parse_port(port: &str) -> Result<u16, BrokerUriError> {
    port.parse()
        .map_err(|_| BrokerUriError::InvalidPort(port.to_string()))
}

impl BrokerUri {
    /// Host and optional port as they appear in a URI, with IPv6 hosts
    /// bracketed.
    #[must_use]
    pub fn authority(&self) -> String {
        format_authority(&self.host, self.port)
    }

    fn loopback_family(&self) -> Option<AddressFamily> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Some(AddressFamily::V4);
        }
        match self.host.parse::<IpAddr>() {
            Ok(IpAddr::V4(ip)) if ip.is_loopback() => Some(AddressFamily::V4),
            Ok(IpAddr::V6(ip)) if ip.is_loopback() => Some(AddressFamily::V6),
            _ => None,
        }
    }
}

impl fmt::Display for BrokerUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority())
    }
}

fn format_authority(host: &str, port: Option<u16>) -> String {
    let host = if host.contains(':') {
        format!("[{host}]")
    } else {
        host.to_string()
    };
    match port {
        Some(port) => format!("{host}:{port}"),
        None => host,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    fn matches(self, ip: &IpAddr) -> bool {
        matches!(
            (self, ip),
            (Self::V4, IpAddr::V4(_)) | (Self::V6, IpAddr::V6(_))
        )
    }
}

/// Address under which remote consumers can reach the broker.
///
/// Loopback hosts are meaningless outside the publishing machine, so they are
/// swapped for the first non-loopback interface address of the same family
/// (`localhost` counts as IPv4). Other hosts pass through unchanged. The port,
/// if any, is kept.
///
/// Returns `None` when the host is loopback and no interface of the matching
/// family is available.
#[must_use]
pub fn resolve_reachable_host(uri: &BrokerUri, interfaces: &[IpAddr]) -> Option<String> {
    let Some(family) = uri.loopback_family() else {
        return Some(uri.authority());
    };
    interfaces
        .iter()
        .find(|ip| family.matches(ip) && !ip.is_loopback())
        .map(|ip| format_authority(&ip.to_string(), uri.port))
}

/// Principal/secret pair used to authenticate against the broker.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    /// Build credentials only when both halves are present and non-empty.
    #[must_use]
    pub fn from_parts(user: Option<&str>, password: Option<&str>) -> Option<Self> {
        match (user, password) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
                Some(Self {
                    user: user.to_string(),
                    password: password.to_string(),
                })
            }
            _ => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Everything about the broker connection that ends up inside a rendered
/// description.
#[derive(Debug, Clone)]
pub struct BrokerSettings {
    pub uri: BrokerUri,
    /// Topic prefix the host publishes device state under.
    pub base_topic: String,
    pub credentials: Option<Credentials>,
}
