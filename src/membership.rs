//! Live membership status
//!
//! A [`MembershipWatcher`] subscribes to account changes published through
//! [`AccountEvents`] and keeps a [`MembershipStatus`] current for whichever
//! account is connected. It re-reads the lock balance on every account change
//! and on every watch interval. Dropping the watcher tears the subscription
//! down.

use crate::rpc::MembershipQuery;
use crate::Result;
use ethereum_types::{Address, U256};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Derived result of the `balanceOf` read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipStatus {
    /// Balance is greater than zero
    pub is_member: bool,
    /// First read for the current account has not completed
    pub is_loading: bool,
    /// Last read failed
    pub is_error: bool,
}

impl MembershipStatus {
    /// No read issued (no account)
    pub fn idle() -> Self {
        Self::default()
    }

    /// Waiting for the first read
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    /// Read failed
    pub fn error() -> Self {
        Self {
            is_error: true,
            ..Self::default()
        }
    }

    /// Read succeeded
    pub fn member(is_member: bool) -> Self {
        Self {
            is_member,
            ..Self::default()
        }
    }

    /// Status for a completed balance read
    pub fn from_balance(balance: &Result<U256>) -> Self {
        match balance {
            Ok(balance) => Self::member(!balance.is_zero()),
            Err(_) => Self::error(),
        }
    }

    /// Whether a read has completed for the current account
    pub fn is_settled(&self) -> bool {
        !self.is_loading
    }
}

/// Publisher of the connected account
#[derive(Debug)]
pub struct AccountEvents {
    tx: watch::Sender<Option<Address>>,
}

impl AccountEvents {
    /// Create a publisher starting at `account`
    pub fn new(account: Option<Address>) -> Self {
        let (tx, _rx) = watch::channel(account);
        Self { tx }
    }

    /// Publish the connected account; unchanged accounts notify nobody
    pub fn set_account(&self, account: Option<Address>) {
        self.tx.send_if_modified(|current| {
            if *current == account {
                false
            } else {
                *current = account;
                true
            }
        });
    }

    /// Currently published account
    pub fn account(&self) -> Option<Address> {
        *self.tx.borrow()
    }

    /// Subscribe to account changes
    pub fn subscribe(&self) -> watch::Receiver<Option<Address>> {
        self.tx.subscribe()
    }
}

/// Subscription keeping a membership status live
#[derive(Debug)]
pub struct MembershipWatcher {
    status: watch::Receiver<MembershipStatus>,
    task: JoinHandle<()>,
}

impl MembershipWatcher {
    /// Start watching `lock` for the accounts published on `accounts`
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe(
        query: Arc<dyn MembershipQuery>,
        lock: Address,
        accounts: watch::Receiver<Option<Address>>,
        interval: Duration,
    ) -> Self {
        let initial = match *accounts.borrow() {
            Some(_) => MembershipStatus::loading(),
            None => MembershipStatus::idle(),
        };
        let (status_tx, status) = watch::channel(initial);
        let task = tokio::spawn(watch_membership(query, lock, accounts, interval, status_tx));

        Self { status, task }
    }

    /// Latest status
    pub fn status(&self) -> MembershipStatus {
        *self.status.borrow()
    }

    /// Wait for the next status update
    ///
    /// Returns `None` once the watcher task has stopped.
    pub async fn changed(&mut self) -> Option<MembershipStatus> {
        self.status.changed().await.ok()?;
        Some(*self.status.borrow_and_update())
    }

    /// Wait up to `timeout` for a settled status, then return whatever is
    /// current
    pub async fn settled(&mut self, timeout: Duration) -> MembershipStatus {
        let settled = match tokio::time::timeout(
            timeout,
            self.status.wait_for(MembershipStatus::is_settled),
        )
        .await
        {
            Ok(Ok(status)) => Some(*status),
            _ => None,
        };

        settled.unwrap_or_else(|| self.status())
    }
}

impl Drop for MembershipWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Resolves when the account changes; never resolves once the publisher is gone
async fn account_changed(accounts: &mut watch::Receiver<Option<Address>>) {
    if accounts.changed().await.is_err() {
        std::future::pending::<()>().await;
    }
}

async fn watch_membership(
    query: Arc<dyn MembershipQuery>,
    lock: Address,
    mut accounts: watch::Receiver<Option<Address>>,
    interval: Duration,
    status_tx: watch::Sender<MembershipStatus>,
) {
    'account: loop {
        let account = *accounts.borrow_and_update();

        let Some(owner) = account else {
            status_tx.send_replace(MembershipStatus::idle());
            account_changed(&mut accounts).await;
            continue 'account;
        };

        tracing::debug!(owner = ?owner, "watching membership");
        status_tx.send_replace(MembershipStatus::loading());

        loop {
            let result = tokio::select! {
                result = query.balance_of(&lock, &owner) => result,
                _ = account_changed(&mut accounts) => continue 'account,
            };

            if let Err(e) = &result {
                tracing::warn!(owner = ?owner, error = %e, "membership read failed");
            }

            let status = MembershipStatus::from_balance(&result);
            status_tx.send_if_modified(|current| {
                if *current == status {
                    false
                } else {
                    *current = status;
                    true
                }
            });

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = account_changed(&mut accounts) => continue 'account,
            }
        }
    }
}
