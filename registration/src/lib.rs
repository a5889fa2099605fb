//! Registration form domain, local storage adapters and command-line surface.
//!
//! The crate validates person records (names, email, date of birth, postal
//! code and town), computes ages in whole years, and persists accepted
//! records to a local key-value store.

pub mod domain;
pub mod inbound;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
