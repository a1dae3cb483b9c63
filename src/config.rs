//! Lock identity and process configuration

use crate::{GateError, Result};
use ethereum_types::Address;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Default JSON-RPC endpoint template, `{network}` is replaced by the chain id
pub const DEFAULT_RPC_URL_TEMPLATE: &str = "https://rpc.unlock-protocol.com/{network}";

/// Re-read interval for a live membership subscription
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_millis(4_000);

/// How long a page render waits for the membership read to settle
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_millis(5_000);

/// The lock that gates this site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockConfig {
    /// PublicLock contract address
    pub lock_address: Address,
    /// Chain id the lock is deployed on
    pub network: u64,
}

impl LockConfig {
    /// Create a new lock config
    pub fn new(lock_address: Address, network: u64) -> Self {
        Self {
            lock_address,
            network,
        }
    }

    /// Parse a lock config from a hex address string
    pub fn parse(lock_address: &str, network: u64) -> Result<Self> {
        let lock_address = parse_address(lock_address)
            .ok_or_else(|| GateError::config(format!("invalid lock address: {}", lock_address)))?;
        Ok(Self::new(lock_address, network))
    }

    /// Checksum-free 0x-prefixed lowercase hex of the lock address
    pub fn lock_address_hex(&self) -> String {
        format!("{:?}", self.lock_address)
    }
}

/// Parse a 0x-prefixed 20-byte hex address
pub fn parse_address(value: &str) -> Option<Address> {
    let digits = value.trim().strip_prefix("0x")?;
    if digits.len() != 40 {
        return None;
    }
    Address::from_str(digits).ok()
}

/// Full process configuration
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Lock identity
    pub lock: LockConfig,
    /// RPC endpoint template
    pub rpc_url_template: String,
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Directory holding pre-rendered post HTML
    pub posts_dir: PathBuf,
    /// Membership re-read interval
    pub watch_interval: Duration,
    /// Render wait budget for the membership read
    pub render_timeout: Duration,
    /// Site name shown in page titles
    pub site_name: String,
}

impl GateConfig {
    /// Create a config with defaults for everything but the lock
    pub fn new(lock: LockConfig) -> Self {
        Self {
            lock,
            rpc_url_template: DEFAULT_RPC_URL_TEMPLATE.to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            posts_dir: PathBuf::from("posts"),
            watch_interval: DEFAULT_WATCH_INTERVAL,
            render_timeout: DEFAULT_RENDER_TIMEOUT,
            site_name: "Members Blog".to_string(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        let lock_address = env::var("LOCK_ADDRESS")
            .map_err(|_| GateError::config("LOCK_ADDRESS must be set"))?;
        let network = env::var("NETWORK")
            .map_err(|_| GateError::config("NETWORK must be set"))?
            .parse::<u64>()
            .map_err(|_| GateError::config("NETWORK must be a chain id"))?;

        let mut config = Self::new(LockConfig::parse(&lock_address, network)?);

        if let Ok(template) = env::var("RPC_URL_TEMPLATE") {
            config.rpc_url_template = template;
        }
        if let Ok(bind_addr) = env::var("BIND_ADDR") {
            config.bind_addr = bind_addr
                .parse()
                .map_err(|_| GateError::config("BIND_ADDR must be host:port"))?;
        }
        if let Ok(posts_dir) = env::var("POSTS_DIR") {
            config.posts_dir = PathBuf::from(posts_dir);
        }
        if let Ok(ms) = env::var("WATCH_INTERVAL_MS") {
            config.watch_interval = parse_millis("WATCH_INTERVAL_MS", &ms)?;
        }
        if let Ok(ms) = env::var("RENDER_TIMEOUT_MS") {
            config.render_timeout = parse_millis("RENDER_TIMEOUT_MS", &ms)?;
        }
        if let Ok(site_name) = env::var("SITE_NAME") {
            config.site_name = site_name;
        }

        Ok(config)
    }

    /// Set the RPC endpoint template
    pub fn with_rpc_url_template(mut self, template: impl Into<String>) -> Self {
        self.rpc_url_template = template.into();
        self
    }

    /// Set the posts directory
    pub fn with_posts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.posts_dir = dir.into();
        self
    }

    /// Set the membership re-read interval
    pub fn with_watch_interval(mut self, interval: Duration) -> Self {
        self.watch_interval = interval;
        self
    }

    /// Set the render wait budget
    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }

    /// Set the site name
    pub fn with_site_name(mut self, name: impl Into<String>) -> Self {
        self.site_name = name.into();
        self
    }

    /// Resolve the RPC endpoint for the configured network
    pub fn rpc_url(&self) -> Result<Url> {
        let raw = self
            .rpc_url_template
            .replace("{network}", &self.lock.network.to_string());
        let url = Url::parse(&raw)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(GateError::config(format!(
                "unsupported RPC scheme: {}",
                other
            ))),
        }
    }
}

fn parse_millis(name: &str, value: &str) -> Result<Duration> {
    value
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| GateError::config(format!("{} must be a number of milliseconds", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCK: &str = "0xCE62D71c768aeC13C0F5C8BD4B3e8B0B9A5c1f2A";

    #[test]
    fn test_lock_config_parse() {
        let lock = LockConfig::parse(LOCK, 5).unwrap();
        assert_eq!(lock.network, 5);
        assert_eq!(
            lock.lock_address_hex(),
            "0xce62d71c768aec13c0f5c8bd4b3e8b0b9a5c1f2a"
        );
    }

    #[test]
    fn test_lock_config_rejects_bad_address() {
        assert!(LockConfig::parse("0x1234", 5).is_err());
        assert!(LockConfig::parse("not-an-address", 5).is_err());
        assert!(LockConfig::parse("CE62D71c768aeC13C0F5C8BD4B3e8B0B9A5c1f2A", 5).is_err());
    }

    #[test]
    fn test_rpc_url_substitutes_network() {
        let config = GateConfig::new(LockConfig::parse(LOCK, 137).unwrap());
        assert_eq!(
            config.rpc_url().unwrap().as_str(),
            "https://rpc.unlock-protocol.com/137"
        );
    }

    #[test]
    fn test_malformed_rpc_url() {
        let config = GateConfig::new(LockConfig::parse(LOCK, 137).unwrap())
            .with_rpc_url_template("not a url/{network}");
        assert!(config.rpc_url().is_err());

        let config = GateConfig::new(LockConfig::parse(LOCK, 137).unwrap())
            .with_rpc_url_template("ftp://rpc.example.com/{network}");
        assert!(config.rpc_url().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = GateConfig::new(LockConfig::parse(LOCK, 5).unwrap())
            .with_posts_dir("content")
            .with_watch_interval(Duration::from_secs(1))
            .with_render_timeout(Duration::from_millis(250))
            .with_site_name("Unlock Blog");

        assert_eq!(config.posts_dir, PathBuf::from("content"));
        assert_eq!(config.watch_interval, Duration::from_secs(1));
        assert_eq!(config.render_timeout, Duration::from_millis(250));
        assert_eq!(config.site_name, "Unlock Blog");
        assert_eq!(config.rpc_url_template, DEFAULT_RPC_URL_TEMPLATE);
    }

    #[test]
    fn test_parse_millis() {
        assert_eq!(
            parse_millis("X", "1500").unwrap(),
            Duration::from_millis(1500)
        );
        assert!(parse_millis("X", "soon").is_err());
    }
}
