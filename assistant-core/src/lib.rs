// assistant-core/src/lib.rs
// Exchange client, order checks and account services behind the crypto-assistant CLI

pub mod config;
pub mod exchange;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

// Re-export assistant-common for convenience
pub use assistant_common::{analysis, filters, order};
