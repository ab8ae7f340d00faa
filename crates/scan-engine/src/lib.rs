#![doc = include_str!("../README.md")]

pub mod decoder;
pub mod error;
pub mod processor;
pub mod request;
pub mod session;
pub mod suppress;

pub use decoder::DecodeLoop;
pub use error::ScanEngineError;
pub use processor::ScanProcessor;
pub use request::{ActorContext, ScanAction, ScanOutcome, ScanRequest};
pub use session::ScanSession;
pub use suppress::RepeatSuppressor;
