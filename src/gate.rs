//! Membership gate
//!
//! Picks what a visitor sees in place of gated content. The decision is a
//! pure function of the wallet connection and the membership status, checked
//! in this order, first match wins:
//!
//! 1. not connected: sign-in prompt
//! 2. loading: loading indicator
//! 3. error: static error message
//! 4. not a member: purchase prompt
//! 5. member: the content, unchanged

use crate::config::LockConfig;
use crate::membership::MembershipStatus;
use crate::template::{prompts, Html};
use crate::wallet::{Connector, WalletConnection};
use ethereum_types::Address;
use serde::Serialize;
use std::collections::BTreeMap;

/// The branch the gate selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GateState {
    Connect,
    Loading,
    Error,
    Purchase,
    Member,
}

impl GateState {
    /// Select the branch for this connection and status
    pub fn evaluate(connection: &WalletConnection, status: &MembershipStatus) -> Self {
        if !connection.is_connected {
            GateState::Connect
        } else if status.is_loading {
            GateState::Loading
        } else if status.is_error {
            GateState::Error
        } else if !status.is_member {
            GateState::Purchase
        } else {
            GateState::Member
        }
    }
}

/// Per-lock checkout options
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutLock {
    pub network: u64,
}

/// Configuration handed to the hosted checkout modal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutConfig {
    /// Lock address to options
    pub locks: BTreeMap<String, CheckoutLock>,
    /// Only report success once the purchase is confirmed on chain
    pub pessimistic: bool,
}

impl CheckoutConfig {
    /// Checkout for a single lock with on-chain confirmation
    pub fn for_lock(lock: &LockConfig) -> Self {
        let mut locks = BTreeMap::new();
        locks.insert(
            lock.lock_address_hex(),
            CheckoutLock {
                network: lock.network,
            },
        );

        Self {
            locks,
            pessimistic: true,
        }
    }

    /// JSON form consumed by the paywall script
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Output of a gate render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateView {
    /// Selected branch
    pub state: GateState,
    /// Markup for the branch
    pub html: Html,
}

/// Gate bound to one lock
#[derive(Debug, Clone, Copy)]
pub struct TokenGate<'a> {
    lock: &'a LockConfig,
}

impl<'a> TokenGate<'a> {
    /// Create a gate for `lock`
    pub fn new(lock: &'a LockConfig) -> Self {
        Self { lock }
    }

    /// Checkout configuration the purchase control opens
    pub fn checkout(&self) -> CheckoutConfig {
        CheckoutConfig::for_lock(self.lock)
    }

    /// Render the branch for this connection and status around `content`
    pub fn render(
        &self,
        connection: &WalletConnection,
        status: &MembershipStatus,
        content: &Html,
    ) -> crate::Result<GateView> {
        let state = GateState::evaluate(connection, status);
        let html = match state {
            GateState::Connect => {
                prompts::connect_prompt(connection.connector.unwrap_or(Connector::Injected))
            }
            GateState::Loading => prompts::loading_indicator(),
            GateState::Error => prompts::error_message(),
            GateState::Purchase => {
                let membership_url = connection.address.as_ref().map(membership_url);
                prompts::purchase_prompt(&self.checkout().to_json()?, membership_url.as_deref())
            }
            GateState::Member => content.clone(),
        };

        Ok(GateView { state, html })
    }
}

/// Route that reports membership of `owner` in the configured lock
pub fn membership_url(owner: &Address) -> String {
    format!("/api/membership/{:?}", owner)
}
