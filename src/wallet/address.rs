use std::str::FromStr;

use solana_sdk::pubkey::Pubkey;

/// Base58 public keys are 32 to 44 characters and must decode to 32 bytes.
pub fn is_valid_solana_address(address: &str) -> bool {
    if address.len() < 32 || address.len() > 44 {
        return false;
    }
    Pubkey::from_str(address).is_ok()
}

/// Shortens an address for chat output: `7VfiZz...Yo4g`.
pub fn format_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() < 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
