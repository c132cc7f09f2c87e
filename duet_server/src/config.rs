//! Command-line and environment configuration

use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Browser origins accepted when none are configured
pub const DEFAULT_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "https://duomegle.vercel.app",
];

#[derive(Debug, Clone, Parser)]
#[command(
    name = "duet-signaling",
    version,
    about = "Matchmaking and WebRTC signaling server for one-on-one video chat"
)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "DUET_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Browser origin allowed to connect (repeatable, replaces the defaults)
    #[arg(long = "allowed-origin", value_name = "ORIGIN")]
    pub allowed_origins: Vec<String>,

    /// Deployed frontend origin, appended to the allowed origins
    #[arg(long, env = "FRONTEND_URL")]
    pub frontend_url: Option<String>,

    /// Accept connections from any origin
    #[arg(long)]
    pub allow_any_origin: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            allowed_origins: Vec::new(),
            frontend_url: None,
            allow_any_origin: false,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn origin_policy(&self) -> OriginPolicy {
        if self.allow_any_origin {
            return OriginPolicy::Any;
        }
        let mut origins: Vec<String> = if self.allowed_origins.is_empty() {
            DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect()
        } else {
            self.allowed_origins.clone()
        };
        if let Some(url) = &self.frontend_url {
            origins.push(url.clone());
        }
        OriginPolicy::AllowList(origins.iter().map(|o| normalize(o).to_string()).collect())
    }
}

/// Which `Origin` headers the WebSocket handshake accepts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OriginPolicy {
    #[default]
    Any,
    AllowList(Vec<String>),
}

impl OriginPolicy {
    /// Requests without an `Origin` header come from non-browser clients
    /// and are always accepted.
    pub fn permits(&self, origin: Option<&str>) -> bool {
        match (self, origin) {
            (OriginPolicy::Any, _) | (_, None) => true,
            (OriginPolicy::AllowList(list), Some(origin)) => {
                let origin = normalize(origin);
                list.iter().any(|allowed| allowed == origin)
            }
        }
    }
}

fn normalize(origin: &str) -> &str {
    origin.trim().trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_known_frontends() {
        let policy = ServerConfig::default().origin_policy();
        assert!(policy.permits(Some("http://localhost:5173")));
        assert!(policy.permits(Some("https://duomegle.vercel.app/")));
        assert!(!policy.permits(Some("https://evil.example")));
        assert!(policy.permits(None));
    }

    #[test]
    fn frontend_url_extends_list() {
        let config = ServerConfig {
            allowed_origins: vec!["https://a.example".to_string()],
            frontend_url: Some("https://b.example/".to_string()),
            ..ServerConfig::default()
        };
        let policy = config.origin_policy();
        assert!(policy.permits(Some("https://a.example")));
        assert!(policy.permits(Some("https://b.example")));
        assert!(!policy.permits(Some("http://localhost:5173")));
    }

    #[test]
    fn allow_any_wins() {
        let config = ServerConfig {
            allow_any_origin: true,
            allowed_origins: vec!["https://a.example".to_string()],
            ..ServerConfig::default()
        };
        assert_eq!(config.origin_policy(), OriginPolicy::Any);
    }

    #[test]
    fn parses_flags() {
        let config = ServerConfig::try_parse_from([
            "duet-signaling",
            "--host",
            "127.0.0.1",
            "--port",
            "4000",
            "--allowed-origin",
            "https://a.example",
            "--allowed-origin",
            "https://b.example",
        ])
        .unwrap();
        assert_eq!(config.addr(), "127.0.0.1:4000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.allowed_origins.len(), 2);
    }
}
