/*
 * Copyright 2018 Bitwise IO, Inc.
 * Copyright 2019 Cargill Incorporated
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 * -----------------------------------------------------------------------------
 */

//! Committed world state, as visible to a contract.
//!
//! The world state is the current key-value snapshot derived from the ordered
//! history of committed transactions.  Contracts never touch it directly:
//! reads go through a `Read` view bound to a `TransactionContext`, and writes
//! only land when the peer's validation pipeline commits a finalized write
//! set via `Write`.  Whether a write set commits at all is decided outside
//! this crate.

pub mod btree;
pub mod error;

pub use error::{StateReadError, StateWriteError};

/// A single intended change to world state, recorded by a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    Set { key: String, value: Vec<u8> },
    Delete { key: String },
}

impl StateChange {
    pub fn key(&self) -> &str {
        match self {
            StateChange::Set { key, .. } => key,
            StateChange::Delete { key } => key,
        }
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.key() == key
    }
}

/// Read access to committed world state.
///
/// Implementations must only ever expose committed entries; the write sets of
/// in-flight transactions are private to their own contexts.  All peers must
/// observe identical values for identical keys at the same commit height.
pub trait Read: Send {
    /// Returns the `(key, value)` pairs for those of the given keys that are
    /// set in state, preserving the order in which the keys were requested.
    fn get(&self, keys: &[String]) -> Result<Vec<(String, Vec<u8>)>, StateReadError>;

    /// Returns the committed entries with keys in `[start, end)`, in
    /// ascending key order.  An absent bound leaves that side of the range
    /// open.  The result is a finite snapshot taken at call time.
    fn range(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<(String, Vec<u8>)>, StateReadError>;

    fn clone_box(&self) -> Box<dyn Read>;
}

impl Clone for Box<dyn Read> {
    fn clone(&self) -> Box<dyn Read> {
        self.clone_box()
    }
}

/// Write access to committed world state, used by the commit path only.
pub trait Write: Send {
    /// Atomically applies a finalized write set.  Change order within the
    /// slice is observed, though finalized write sets carry at most one
    /// change per key.
    fn commit(&self, state_changes: &[StateChange]) -> Result<(), StateWriteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_change_key_access() {
        let set = StateChange::Set {
            key: "alpha".to_string(),
            value: b"1".to_vec(),
        };
        let delete = StateChange::Delete {
            key: "beta".to_string(),
        };

        assert_eq!(set.key(), "alpha");
        assert_eq!(delete.key(), "beta");
        assert!(set.has_key("alpha"));
        assert!(!set.has_key("beta"));
        assert!(delete.has_key("beta"));
    }
}
