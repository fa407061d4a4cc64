pub mod api;
pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod transactions;
pub mod worker;

pub use config::Config;
pub use datasource::{DataSourceError, MockBridge, MockCustody, MockLedger, MockNameService};
pub use db::{init_db, Repository};
pub use domain::{
    Address, BlockHeight, ChainKind, CreatePositionParams, Outcome, Position, PositionState,
    WalletRecord,
};
pub use error::{AppError, DcaError};
pub use orchestration::PositionManager;
pub use transactions::{TransactionBuilder, TransactionRequest};
pub use worker::{BlockHeightPoller, WorkerHandle};
