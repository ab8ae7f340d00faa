#![doc = include_str!("../README.md")]

pub mod error;
pub mod memory;
pub mod registry;

pub use error::RegistryError;
pub use memory::MemoryCredentialStore;
pub use registry::CredentialRegistry;
