#![doc = include_str!("../README.md")]

pub mod error;
pub mod log;
pub mod memory;

pub use error::AlertLogError;
pub use log::AlertLog;
pub use memory::MemoryAlertStore;
