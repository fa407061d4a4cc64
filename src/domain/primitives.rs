//! Domain primitives: Address, BlockHeight, ChainKind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::validation::validate_address;

/// Native chain account address (`aleo1...`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid native address: {0}")]
pub struct AddressParseError(pub String);

impl Address {
    /// Get the address as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if validate_address(trimmed, ChainKind::Native) {
            Ok(Address(trimmed.to_string()))
        } else {
            Err(AddressParseError(s.to_string()))
        }
    }
}

impl TryFrom<String> for Address {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::from_str(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ledger block height.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlockHeight(pub u32);

impl BlockHeight {
    pub fn new(height: u32) -> Self {
        BlockHeight(height)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Height `blocks` after this one, or `None` past `u32::MAX`.
    pub fn advance(&self, blocks: u32) -> Option<Self> {
        self.0.checked_add(blocks).map(BlockHeight)
    }
}

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address family used for format validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainKind {
    /// The privacy chain the DCA program lives on.
    Native,
    /// Any EVM-compatible chain reachable through the bridge.
    Evm,
}

impl FromStr for ChainKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "aleo" => Ok(ChainKind::Native),
            "evm" | "ethereum" => Ok(ChainKind::Evm),
            other => Err(format!("unknown chain kind: {}", other)),
        }
    }
}

impl fmt::Display for ChainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainKind::Native => write!(f, "native"),
            ChainKind::Evm => write!(f, "evm"),
        }
    }
}
