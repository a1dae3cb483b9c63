//! # token-gate - membership-gated blog posts
//!
//! Renders blog posts whose body is only shown to holders of an Unlock
//! Protocol lock key. Visitors without a connected wallet see a sign-in
//! prompt, connected non-members see a purchase prompt that opens the hosted
//! Unlock checkout, and members see the post.
//!
//! The decision itself lives in [`gate::GateState::evaluate`]; the
//! [`context::AppContext`] carries the RPC client and lock identity into it,
//! and [`membership::MembershipWatcher`] keeps the membership status current.

pub mod abi;
pub mod config;
pub mod context;
pub mod error;
pub mod gate;
pub mod membership;
pub mod post;
pub mod rpc;
pub mod template;
pub mod wallet;

// Re-exports for convenience
pub use config::{GateConfig, LockConfig};
pub use context::AppContext;
pub use error::{GateError, Result};
pub use gate::{membership_url, CheckoutConfig, GateState, GateView, TokenGate};
pub use membership::{AccountEvents, MembershipStatus, MembershipWatcher};
pub use post::{Post, PostBody, PostStore};
pub use template::Html;
pub use wallet::{Connector, WalletConnection};

// Feature-gated framework support
#[cfg(feature = "axum")]
pub mod server;

/// Current version of the token-gate library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(!VERSION.is_empty());
    }
}
