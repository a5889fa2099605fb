//! Port for the local key-value store that keeps submitted records.
//!
//! String keys map to string values, a missing key reads as `None`, and
//! writes replace the previous value wholesale. Records are only ever
//! written and read back, so there is no removal operation.

use super::define_port_error;

define_port_error! {
    /// Errors raised by key-value store adapters.
    pub enum KeyValueStoreError {
        /// The backing medium could not be read or written.
        Io {
            /// Description of the underlying failure.
            message: String,
        } => "key-value store I/O failed: {message}",
        /// The backing medium holds data the adapter cannot decode.
        Corrupt {
            /// Description of the decoding failure.
            message: String,
        } => "key-value store contents are corrupt: {message}",
    }
}

/// String-keyed persistent store.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueStoreError`] when the store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, KeyValueStoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueStoreError`] when the store cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), KeyValueStoreError>;
}
