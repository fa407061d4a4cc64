//! Domain types for the DCA position manager.
//!
//! This module provides:
//! - Domain primitives: Address, BlockHeight, ChainKind
//! - Format-only validation of addresses and amounts
//! - The position model and its lifecycle markers
//! - Wallet records and the fixed display registries

pub mod position;
pub mod primitives;
pub mod record;
pub mod registry;
pub mod validation;

pub use position::{
    Confirmation, CreatePositionParams, InFlight, Operation, Outcome, Position, PositionState,
};
pub use primitives::{Address, AddressParseError, BlockHeight, ChainKind};
pub use record::WalletRecord;
pub use validation::{validate_address, validate_amount};
