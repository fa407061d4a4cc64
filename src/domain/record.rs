//! Wallet-held records as returned by the custody collaborator.

use serde::{Deserialize, Serialize};

/// Record name the DCA program gives its position records.
pub const POSITION_RECORD_NAME: &str = "DCAPosition";
/// Marker some wallets leave in the plaintext instead of a record name.
pub const POSITION_RECORD_MARKER: &str = "dca_position";

/// An opaque record: serialized `key: value` plaintext plus a spent flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    #[serde(default)]
    pub record_name: String,
    pub plaintext: String,
    #[serde(default)]
    pub spent: bool,
}

impl WalletRecord {
    pub fn new(record_name: impl Into<String>, plaintext: impl Into<String>, spent: bool) -> Self {
        Self {
            record_name: record_name.into(),
            plaintext: plaintext.into(),
            spent,
        }
    }

    /// True if the record holds a DCA position.
    pub fn is_position_kind(&self) -> bool {
        self.record_name == POSITION_RECORD_NAME || self.plaintext.contains(POSITION_RECORD_MARKER)
    }
}
