pub mod manager;

pub use manager::{PositionManager, Submission};
