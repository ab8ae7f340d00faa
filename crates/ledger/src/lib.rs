#![doc = include_str!("../README.md")]

pub mod error;
pub mod ledger;
pub mod memory;
pub mod state;

pub use error::LedgerError;
pub use ledger::{CartonManifest, ItemLedger};
pub use memory::MemoryUnitStore;
pub use state::{TransitionViolation, UnitTransition, evaluate, fold};
