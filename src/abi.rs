//! Minimal ABI helpers for the PublicLock `balanceOf` read

use crate::{GateError, Result};
use ethereum_types::{Address, U256};
use sha3::{Digest, Keccak256};

/// Solidity signature of the membership read
pub const BALANCE_OF_SIGNATURE: &str = "balanceOf(address)";

/// First four bytes of the keccak256 hash of a function signature
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash: [u8; 32] = Keccak256::digest(signature.as_bytes()).into();
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encode calldata for `balanceOf(owner)` as a 0x-prefixed hex string
pub fn encode_balance_of(owner: &Address) -> String {
    let selector = function_selector(BALANCE_OF_SIGNATURE);
    format!(
        "0x{}{:0>64}",
        hex::encode(selector),
        hex::encode(owner.as_bytes())
    )
}

/// Decode a single `uint256` return value
///
/// Empty return data means the target has no code on this chain, which is
/// reported as an error rather than a zero balance.
pub fn decode_uint256(data: &str) -> Result<U256> {
    let digits = data.trim_start_matches("0x");
    if digits.is_empty() {
        return Err(GateError::decode("empty return data"));
    }
    if digits.len() > 64 {
        return Err(GateError::decode(format!(
            "expected a single uint256, got {} bytes",
            digits.len() / 2
        )));
    }

    U256::from_str_radix(digits, 16)
        .map_err(|_| GateError::decode(format!("invalid uint256 hex: {}", data)))
}
