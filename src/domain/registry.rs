//! Fixed display registries: DCA tokens, bridge chains and bridge contracts.

use serde::Serialize;

/// A token the DCA program can swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    pub id: u64,
    pub name: &'static str,
    pub symbol: &'static str,
}

pub const DCA_TOKENS: &[TokenInfo] = &[
    TokenInfo { id: 1, name: "Aleo Credits", symbol: "ALEO" },
    TokenInfo { id: 2, name: "USDC", symbol: "USDC" },
    TokenInfo { id: 3, name: "Wrapped Ethereum", symbol: "WETH" },
    TokenInfo { id: 4, name: "Wrapped Bitcoin", symbol: "WBTC" },
];

pub fn token(id: u64) -> Option<&'static TokenInfo> {
    DCA_TOKENS.iter().find(|t| t.id == id)
}

/// Render a token as `Name (SYMBOL)`, or `Token #<id>` when unregistered.
pub fn format_token(id: u64) -> String {
    match token(id) {
        Some(t) => format!("{} ({})", t.name, t.symbol),
        None => format!("Token #{}", id),
    }
}

/// A chain known to the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub chain_id: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
    pub icon: &'static str,
}

pub const ALEO_CHAIN_ID: &str = "6694886634403";
pub const ETH_SEPOLIA_CHAIN_ID: &str = "28556963657430695";
pub const BASE_SEPOLIA_CHAIN_ID: &str = "443067135441324596";
pub const ARBITRUM_SEPOLIA_CHAIN_ID: &str = "438861435819683566";

pub const BRIDGE_CHAINS: &[ChainInfo] = &[
    ChainInfo { chain_id: ALEO_CHAIN_ID, name: "Aleo", symbol: "ALEO", icon: "/aleo.svg" },
    ChainInfo {
        chain_id: ETH_SEPOLIA_CHAIN_ID,
        name: "Ethereum (Sepolia)",
        symbol: "ETH",
        icon: "/ethereum.svg",
    },
    ChainInfo {
        chain_id: BASE_SEPOLIA_CHAIN_ID,
        name: "Base (Sepolia)",
        symbol: "ETH",
        icon: "/base.svg",
    },
    ChainInfo {
        chain_id: ARBITRUM_SEPOLIA_CHAIN_ID,
        name: "Arbitrum (Sepolia)",
        symbol: "ETH",
        icon: "/arbitrum.svg",
    },
];

pub fn chain(chain_id: &str) -> Option<&'static ChainInfo> {
    BRIDGE_CHAINS.iter().find(|c| c.chain_id == chain_id)
}

/// Bridged token identifiers on the native chain, keyed by ticker.
pub const BRIDGE_TOKENS: &[(&str, &str)] = &[
    (
        "vUSDC",
        "6088188135219746443092391282916151282477828391085949070550825603498725268775field",
    ),
    (
        "vUSDT",
        "7311977476241952331367670434347097026669181172395481678807963832961201831695field",
    ),
    (
        "vETH",
        "1381601714105276218895759962490543360839827276760458984912661726715051428034field",
    ),
];

pub const EVM_TOKEN_SERVICE: &str = "0x28E761500e7Fd17b5B0A21a1eAD29a8E22D73170";
pub const ALEO_TOKEN_SERVICE: &str = "vlink_token_service_v1.aleo";

/// Token service contract on an EVM source chain, if the chain is bridged.
pub fn evm_token_service(chain_id: &str) -> Option<&'static str> {
    match chain_id {
        ETH_SEPOLIA_CHAIN_ID | BASE_SEPOLIA_CHAIN_ID | ARBITRUM_SEPOLIA_CHAIN_ID => {
            Some(EVM_TOKEN_SERVICE)
        }
        _ => None,
    }
}

/// Shorten a long address to `first6...last4`.
pub fn truncate_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() > 10 {
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        address.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_token_known_and_unknown() {
        assert_eq!(format_token(1), "Aleo Credits (ALEO)");
        assert_eq!(format_token(4), "Wrapped Bitcoin (WBTC)");
        assert_eq!(format_token(99), "Token #99");
    }

    #[test]
    fn test_chain_lookup() {
        assert_eq!(chain(ALEO_CHAIN_ID).map(|c| c.name), Some("Aleo"));
        assert!(chain("1").is_none());
    }

    #[test]
    fn test_chain_wire_names_are_camel_case() {
        let json = serde_json::to_value(chain(ALEO_CHAIN_ID).unwrap()).unwrap();
        assert_eq!(json["chainId"], ALEO_CHAIN_ID);
        assert!(json.get("chain_id").is_none());
    }

    #[test]
    fn test_evm_token_service_only_for_bridged_evm_chains() {
        assert_eq!(evm_token_service(BASE_SEPOLIA_CHAIN_ID), Some(EVM_TOKEN_SERVICE));
        assert_eq!(evm_token_service(ALEO_CHAIN_ID), None);
    }

    #[test]
    fn test_truncate_address() {
        assert_eq!(truncate_address("aleo1abcdefghijklmnop"), "aleo1a...mnop");
        assert_eq!(truncate_address("short"), "short");
        assert_eq!(truncate_address("0123456789"), "0123456789");
    }
}
