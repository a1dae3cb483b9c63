//! Wallet connection state
//!
//! The wallet itself lives in the visitor's browser. The server only sees
//! what the connect script leaves behind: the connected account in the
//! `wallet_address` cookie.

use crate::config::parse_address;
use ethereum_types::Address;

/// Cookie written by the connect script
pub const WALLET_COOKIE: &str = "wallet_address";

/// How the wallet was connected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    /// Provider injected by a browser extension at `window.ethereum`
    Injected,
}

impl Connector {
    /// Browser script that runs this connector's connect routine
    ///
    /// Includes the account listener, so a page showing the sign-in prompt
    /// also picks up an account connected from the wallet itself.
    pub fn connect_script(&self) -> String {
        match self {
            Connector::Injected => format!(
                r#"async function tokenGateConnect() {{
  if (!window.ethereum) {{
    console.warn('No injected wallet provider found');
    return;
  }}
  const accounts = await window.ethereum.request({{ method: 'eth_requestAccounts' }});
  if (accounts && accounts.length > 0) {{
    document.cookie = '{cookie}=' + accounts[0] + '; path=/; SameSite=Lax';
    window.location.reload();
  }}
}}
{listener}"#,
                cookie = WALLET_COOKIE,
                listener = self.account_listener_script(),
            ),
        }
    }

    /// Browser script that follows account switches in the wallet
    ///
    /// A new account replaces the cookie, an empty account list clears it.
    /// Either way the page reloads so the gate re-reads membership for the
    /// account the wallet now reports.
    pub fn account_listener_script(&self) -> String {
        match self {
            Connector::Injected => format!(
                r#"(function () {{
  if (!window.ethereum || typeof window.ethereum.on !== 'function') {{
    return;
  }}
  const match = document.cookie.match(/(?:^|; ){cookie}=([^;]*)/);
  const current = match ? match[1].toLowerCase() : null;
  window.ethereum.on('accountsChanged', function (accounts) {{
    const next = accounts && accounts.length > 0 ? accounts[0].toLowerCase() : null;
    if (next === current) {{
      return;
    }}
    if (next) {{
      document.cookie = '{cookie}=' + next + '; path=/; SameSite=Lax';
    }} else {{
      document.cookie = '{cookie}=; path=/; max-age=0; SameSite=Lax';
    }}
    window.location.reload();
  }});
}})();"#,
                cookie = WALLET_COOKIE,
            ),
        }
    }
}

/// Connection state as observed by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WalletConnection {
    /// Whether an account is connected
    pub is_connected: bool,
    /// The connected account
    pub address: Option<Address>,
    /// Connector used for the current connection
    pub connector: Option<Connector>,
}

impl WalletConnection {
    /// No wallet connected
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Account connected through the injected provider
    pub fn connected(address: Address) -> Self {
        Self {
            is_connected: true,
            address: Some(address),
            connector: Some(Connector::Injected),
        }
    }

    /// Read the connection from a `Cookie` header value
    ///
    /// A missing or malformed `wallet_address` cookie reads as disconnected.
    pub fn from_cookie_header(header: &str) -> Self {
        header
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .find(|(name, _)| name.trim() == WALLET_COOKIE)
            .and_then(|(_, value)| parse_address(value))
            .map(Self::connected)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const ACCOUNT: &str = "0x857b06519E91e3A54538791bDbb0E22373e36b66";

    #[test]
    fn test_connected_from_cookie() {
        let header = format!("theme=dark; {}={}; other=1", WALLET_COOKIE, ACCOUNT);
        let connection = WalletConnection::from_cookie_header(&header);

        assert!(connection.is_connected);
        assert_eq!(
            connection.address,
            Some(Address::from_str(&ACCOUNT[2..]).unwrap())
        );
        assert_eq!(connection.connector, Some(Connector::Injected));
    }

    #[test]
    fn test_missing_cookie_is_disconnected() {
        let connection = WalletConnection::from_cookie_header("theme=dark");
        assert_eq!(connection, WalletConnection::disconnected());
        assert!(!connection.is_connected);
        assert!(connection.address.is_none());
    }

    #[test]
    fn test_malformed_cookie_is_disconnected() {
        let header = format!("{}=0xnope", WALLET_COOKIE);
        assert!(!WalletConnection::from_cookie_header(&header).is_connected);
    }

    #[test]
    fn test_connect_script_uses_injected_provider() {
        let script = Connector::Injected.connect_script();
        assert!(script.contains("window.ethereum"));
        assert!(script.contains("eth_requestAccounts"));
        assert!(script.contains(WALLET_COOKIE));
        assert!(script.contains("window.ethereum.on('accountsChanged'"));
    }

    #[test]
    fn test_account_listener_rewrites_or_clears_cookie() {
        let script = Connector::Injected.account_listener_script();

        assert!(script.contains("window.ethereum.on('accountsChanged'"));
        // switched account replaces the cookie
        assert!(script.contains("document.cookie = 'wallet_address=' + next + '; path=/; SameSite=Lax'"));
        // disconnect from the wallet expires it
        assert!(script.contains("document.cookie = 'wallet_address=; path=/; max-age=0; SameSite=Lax'"));
        assert!(script.contains("accounts.length > 0"));
        assert!(script.contains("window.location.reload()"));
    }
}
