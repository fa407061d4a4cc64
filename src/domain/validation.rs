//! Format-only validation for addresses and form amounts.
//!
//! These functions are total: malformed input yields `false`, never a panic.

use super::primitives::ChainKind;

pub const NATIVE_ADDRESS_PREFIX: &str = "aleo1";
pub const NATIVE_ADDRESS_LEN: usize = 63;
pub const EVM_ADDRESS_PREFIX: &str = "0x";
pub const EVM_ADDRESS_LEN: usize = 42;

/// Check an address against the prefix and exact length of its chain family.
///
/// No checksum is verified.
pub fn validate_address(address: &str, chain: ChainKind) -> bool {
    let (prefix, len) = match chain {
        ChainKind::Native => (NATIVE_ADDRESS_PREFIX, NATIVE_ADDRESS_LEN),
        ChainKind::Evm => (EVM_ADDRESS_PREFIX, EVM_ADDRESS_LEN),
    };
    address.starts_with(prefix) && address.len() == len
}

/// True iff `value` parses as a finite number strictly greater than zero.
pub fn validate_amount(value: &str) -> bool {
    match value.trim().parse::<f64>() {
        Ok(n) => n.is_finite() && n > 0.0,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_address() {
        assert!(validate_address(&format!("aleo1{}", "a".repeat(58)), ChainKind::Native));
        assert!(!validate_address("aleo1abc", ChainKind::Native));
        assert!(!validate_address(&format!("aleo2{}", "a".repeat(58)), ChainKind::Native));
        assert!(!validate_address("", ChainKind::Native));
    }

    #[test]
    fn test_evm_address() {
        assert!(validate_address(&format!("0x{}", "a".repeat(40)), ChainKind::Evm));
        assert!(!validate_address("0xabc", ChainKind::Evm));
        assert!(!validate_address(&format!("1x{}", "a".repeat(40)), ChainKind::Evm));
    }

    #[test]
    fn test_address_kinds_do_not_cross() {
        assert!(!validate_address(&format!("0x{}", "a".repeat(40)), ChainKind::Native));
        assert!(!validate_address(&format!("aleo1{}", "a".repeat(58)), ChainKind::Evm));
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("1"));
        assert!(validate_amount(" 0.5 "));
        assert!(!validate_amount("0"));
        assert!(!validate_amount("-3"));
        assert!(!validate_amount("abc"));
        assert!(!validate_amount(""));
        assert!(!validate_amount("NaN"));
        assert!(!validate_amount("inf"));
    }
}
