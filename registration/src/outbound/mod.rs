//! Outbound adapters for the domain ports.

pub mod delay;
pub mod storage;
