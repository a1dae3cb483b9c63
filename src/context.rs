//! Process-wide application context
//!
//! Built once at startup from [`GateConfig`] and shared read-only (behind an
//! `Arc`) with every request. Holds the RPC client bound to the lock's chain,
//! the lock identity and the render settings.

use crate::config::{GateConfig, LockConfig};
use crate::membership::MembershipWatcher;
use crate::rpc::{MembershipQuery, RpcClient};
use crate::template::PageConfig;
use crate::Result;
use ethereum_types::Address;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Shared state every gate evaluation reads from
#[derive(Clone)]
pub struct AppContext {
    lock: LockConfig,
    rpc: Arc<RpcClient>,
    query: Arc<dyn MembershipQuery>,
    watch_interval: Duration,
    render_timeout: Duration,
    page: PageConfig,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("lock", &self.lock)
            .field("rpc", &self.rpc.endpoint().as_str())
            .field("query", &"<membership query>")
            .field("watch_interval", &self.watch_interval)
            .field("render_timeout", &self.render_timeout)
            .field("page", &self.page)
            .finish()
    }
}

impl AppContext {
    /// Build the context; a malformed RPC endpoint fails here
    pub fn new(config: &GateConfig) -> Result<Self> {
        let endpoint = config.rpc_url()?;
        tracing::info!(
            network = config.lock.network,
            lock = %config.lock.lock_address_hex(),
            endpoint = %endpoint,
            "creating RPC client"
        );

        let rpc = Arc::new(RpcClient::new(endpoint, config.lock.network));
        let query: Arc<dyn MembershipQuery> = rpc.clone();

        Ok(Self {
            lock: config.lock,
            rpc,
            query,
            watch_interval: config.watch_interval,
            render_timeout: config.render_timeout,
            page: PageConfig::new().with_site_name(&config.site_name),
        })
    }

    /// Replace the membership source (the RPC client is kept for health checks)
    pub fn with_query(mut self, query: Arc<dyn MembershipQuery>) -> Self {
        self.query = query;
        self
    }

    /// Replace the page configuration
    pub fn with_page_config(mut self, page: PageConfig) -> Self {
        self.page = page;
        self
    }

    /// Lock identity
    pub fn lock(&self) -> &LockConfig {
        &self.lock
    }

    /// RPC client bound to the lock's chain
    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// Membership source
    pub fn query(&self) -> &Arc<dyn MembershipQuery> {
        &self.query
    }

    /// Render wait budget for a membership read
    pub fn render_timeout(&self) -> Duration {
        self.render_timeout
    }

    /// Page layout configuration
    pub fn page(&self) -> &PageConfig {
        &self.page
    }

    /// Subscribe a membership watcher for the accounts on `accounts`
    pub fn watch_membership(
        &self,
        accounts: watch::Receiver<Option<Address>>,
    ) -> MembershipWatcher {
        MembershipWatcher::subscribe(
            self.query.clone(),
            self.lock.lock_address,
            accounts,
            self.watch_interval,
        )
    }
}
