//! Domain ports implemented by outbound adapters.

mod key_value_store;
mod macros;
mod submission_delay;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use key_value_store::MockKeyValueStore;
pub use key_value_store::{KeyValueStore, KeyValueStoreError};
pub use submission_delay::SubmissionDelay;
