//! Error handling tests for token-gate

use token_gate::{GateConfig, GateError, LockConfig, PostStore};

#[test]
fn test_rpc_error_message() {
    let error = GateError::rpc(-32000, "execution reverted");

    let error_msg = error.to_string();
    assert!(
        error_msg.contains("RPC error -32000"),
        "Error message MUST contain the RPC error code - actual: {}",
        error_msg
    );
    assert!(
        error_msg.contains("execution reverted"),
        "Error message MUST contain the node's message - actual: {}",
        error_msg
    );
}

#[test]
fn test_decode_error_message() {
    let error = GateError::decode("empty return data");

    let error_msg = error.to_string();
    assert!(
        error_msg.contains("Decode error"),
        "Error message MUST contain 'Decode error' - actual: {}",
        error_msg
    );
    assert!(
        error_msg.contains("empty return data"),
        "Error message MUST contain the decode failure - actual: {}",
        error_msg
    );
}

#[test]
fn test_post_not_found_error() {
    let error = GateError::post_not_found("hello-world");

    let error_msg = error.to_string();
    assert!(
        error_msg.contains("Post not found"),
        "Error message MUST contain 'Post not found' - actual: {}",
        error_msg
    );
    assert!(
        error_msg.contains("hello-world"),
        "Error message MUST contain the slug - actual: {}",
        error_msg
    );
}

#[test]
fn test_invalid_address_error() {
    let error = GateError::invalid_address("0x1234");

    let error_msg = error.to_string();
    assert!(
        error_msg.contains("Invalid address"),
        "Error message MUST contain 'Invalid address' - actual: {}",
        error_msg
    );
    assert!(
        error_msg.contains("0x1234"),
        "Error message MUST contain the rejected value - actual: {}",
        error_msg
    );
    assert!(
        !matches!(error, GateError::Config { .. }),
        "Request input MUST NOT be reported as a configuration error - actual: {:?}",
        error
    );
}

#[test]
fn test_invalid_lock_address_is_config_error() {
    let error = LockConfig::parse("0xdeadbeef", 5).unwrap_err();

    assert!(
        matches!(error, GateError::Config { .. }),
        "Short lock address MUST be a configuration error - actual: {:?}",
        error
    );
    assert!(
        error.to_string().contains("invalid lock address"),
        "Error message MUST name the lock address problem - actual: {}",
        error
    );
}

#[test]
fn test_malformed_rpc_template_is_url_error() {
    let lock = LockConfig::parse("0xCE62D71c768aeC13C0F5C8BD4B3e8B0B9A5c1f2A", 5).unwrap();
    let error = GateConfig::new(lock)
        .with_rpc_url_template("rpc.unlock-protocol.com/{network}")
        .rpc_url()
        .unwrap_err();

    assert!(
        matches!(error, GateError::Url(_)),
        "Relative RPC URL MUST fail to parse - actual: {:?}",
        error
    );
}

#[test]
fn test_missing_posts_dir_is_io_error() {
    let error = PostStore::load_dir("/no/such/posts/dir").unwrap_err();

    assert!(
        matches!(error, GateError::Io(_)),
        "Missing posts directory MUST be an IO error - actual: {:?}",
        error
    );
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let error: GateError = json_error.into();

    assert!(
        error.to_string().contains("JSON error"),
        "Error message MUST contain 'JSON error' - actual: {}",
        error
    );
}
