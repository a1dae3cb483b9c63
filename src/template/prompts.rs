//! Markup shown in place of gated content

use super::Html;
use crate::wallet::Connector;

/// Hosted Unlock checkout widget
pub const PAYWALL_SCRIPT_URL: &str =
    "https://paywall.unlock-protocol.com/static/unlock.latest.min.js";

/// Shown while the membership read is pending
pub const LOADING_MESSAGE: &str = "Loading...";

/// Shown when the membership read failed
pub const ERROR_MESSAGE: &str =
    "There was an error checking your membership status. Please reload the page!";

const BUTTON_CLASS: &str = "bg-blue-500 hover:bg-blue-700 text-white font-bold py-2 px-4 rounded";

/// Sign-in prompt wired to `connector`
pub fn connect_prompt(connector: Connector) -> Html {
    Html::trusted(format!(
        r#"<section>
  <p class="mb-4">To view this post you need to be a member!</p>
  <button type="button" onclick="tokenGateConnect()" class="{}">Sign-In</button>
  <script>
{}
  </script>
</section>"#,
        BUTTON_CLASS,
        connector.connect_script()
    ))
}

/// Loading indicator
pub fn loading_indicator() -> Html {
    Html::trusted(format!("<div>{}</div>", LOADING_MESSAGE))
}

/// Static membership-read error
pub fn error_message() -> Html {
    Html::trusted(format!("<div>{}</div>", ERROR_MESSAGE))
}

/// Milliseconds between membership re-reads after the checkout modal opens
pub const MEMBERSHIP_POLL_MS: u64 = 4_000;

/// Purchase prompt that opens the hosted checkout modal
///
/// `checkout_json` is the serialized checkout configuration handed to the
/// paywall script through `window.unlockProtocolConfig`. The paywall is
/// bound to the injected provider before the modal opens.
///
/// Once the modal is open the page waits for the purchase to land: an
/// `unlocked` status from the paywall, or `membership_url` reporting
/// `isMember`, reloads the page so the gate re-reads the balance.
pub fn purchase_prompt(checkout_json: &str, membership_url: Option<&str>) -> Html {
    let membership_url = match membership_url {
        Some(url) => format!("'{}'", url.replace('\\', "\\\\").replace('\'', "\\'")),
        None => "null".to_string(),
    };

    Html::trusted(format!(
        r#"<section>
  <p class="mb-4">You currently don't have a membership... </p>
  <button type="button" onclick="tokenGateCheckout()" class="{button}">Purchase one now!</button>
  <script>
    window.unlockProtocolConfig = {config};
    const tokenGateMembershipUrl = {membership_url};
    let tokenGatePoll = null;

    function tokenGateUnlocked() {{
      if (tokenGatePoll) {{
        clearInterval(tokenGatePoll);
        tokenGatePoll = null;
      }}
      window.location.reload();
    }}

    async function tokenGateCheckMembership() {{
      try {{
        const response = await fetch(tokenGateMembershipUrl, {{ cache: 'no-store' }});
        if (!response.ok) {{
          return;
        }}
        const status = await response.json();
        if (status.isMember) {{
          tokenGateUnlocked();
        }}
      }} catch (e) {{
        console.warn('Membership check failed', e);
      }}
    }}

    window.addEventListener('unlockProtocol.status', function (event) {{
      if (event.detail && event.detail.state === 'unlocked') {{
        tokenGateUnlocked();
      }}
    }});

    function tokenGateCheckout() {{
      const paywall = window.unlockProtocol;
      if (!paywall) {{
        console.warn('Unlock paywall not loaded yet');
        return;
      }}
      if (window.ethereum && typeof paywall.connect === 'function') {{
        paywall.connect(window.ethereum);
      }}
      paywall.loadCheckoutModal(window.unlockProtocolConfig);
      if (tokenGateMembershipUrl && !tokenGatePoll) {{
        tokenGatePoll = setInterval(tokenGateCheckMembership, {poll_ms});
      }}
    }}
  </script>
  <script src="{src}"></script>
</section>"#,
        button = BUTTON_CLASS,
        config = script_safe_json(checkout_json),
        membership_url = script_safe_json(&membership_url),
        poll_ms = MEMBERSHIP_POLL_MS,
        src = PAYWALL_SCRIPT_URL,
    ))
}

/// Keep embedded JSON from closing the surrounding script element
fn script_safe_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_prompt() {
        let html = connect_prompt(Connector::Injected);
        assert!(html.as_str().contains("Sign-In"));
        assert!(html.as_str().contains("eth_requestAccounts"));
    }

    #[test]
    fn test_static_messages() {
        assert_eq!(loading_indicator().as_str(), "<div>Loading...</div>");
        assert_eq!(
            error_message().as_str(),
            "<div>There was an error checking your membership status. Please reload the page!</div>"
        );
    }

    #[test]
    fn test_purchase_prompt_embeds_config() {
        let html = purchase_prompt(r#"{"pessimistic":true}"#, None);
        assert!(html.as_str().contains("Purchase one now!"));
        assert!(html
            .as_str()
            .contains(r#"window.unlockProtocolConfig = {"pessimistic":true};"#));
        assert!(html.as_str().contains(PAYWALL_SCRIPT_URL));
        assert!(html
            .as_str()
            .contains("const tokenGateMembershipUrl = null;"));
    }

    #[test]
    fn test_purchase_prompt_waits_for_membership() {
        let html = purchase_prompt(
            r#"{"pessimistic":true}"#,
            Some("/api/membership/0x857b06519e91e3a54538791bdbb0e22373e36b66"),
        );
        let html = html.as_str();

        // checkout runs against the injected wallet
        assert!(html.contains("paywall.connect(window.ethereum);"));
        assert!(html.contains("paywall.loadCheckoutModal(window.unlockProtocolConfig);"));

        // a confirmed purchase reloads the page
        assert!(html.contains("window.addEventListener('unlockProtocol.status'"));
        assert!(html.contains("event.detail.state === 'unlocked'"));
        assert!(html.contains(
            "const tokenGateMembershipUrl = '/api/membership/0x857b06519e91e3a54538791bdbb0e22373e36b66';"
        ));
        assert!(html.contains("setInterval(tokenGateCheckMembership, 4000)"));
        assert!(html.contains("if (status.isMember)"));
        assert!(html.contains("window.location.reload();"));
    }

    #[test]
    fn test_script_safe_json() {
        assert_eq!(script_safe_json(r#"{"a":"</script>"}"#), r#"{"a":"<\/script>"}"#);
    }
}
