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

//! Provides a simple, in-memory implementation of world state backed by
//! `std::collections::BTreeMap`.
//!
//! The ordered map makes range queries natural; this backend is used by the
//! in-process peer loopback and by tests.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, Mutex};

use super::error::{StateReadError, StateWriteError};
use super::{Read, StateChange, Write};

/// An in-memory, ordered implementation of world state.
///
/// Cloning is shallow; clones share the same underlying entries, so a clone
/// handed to a contract process observes commits performed through any other
/// clone.
#[derive(Debug, Clone, Default)]
pub struct BTreeState {
    entries: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl BTreeState {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Read for BTreeState {
    fn get(&self, keys: &[String]) -> Result<Vec<(String, Vec<u8>)>, StateReadError> {
        let entries = self
            .entries
            .lock()
            .map_err(|err| StateReadError::StorageError(Box::new(LockError(err.to_string()))))?;

        Ok(keys
            .iter()
            .filter_map(|key| entries.get(key).map(|value| (key.clone(), value.clone())))
            .collect())
    }

    fn range(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<(String, Vec<u8>)>, StateReadError> {
        let entries = self
            .entries
            .lock()
            .map_err(|err| StateReadError::StorageError(Box::new(LockError(err.to_string()))))?;

        let lower = match start {
            Some(key) => Bound::Included(key.to_string()),
            None => Bound::Unbounded,
        };
        let upper = match end {
            Some(key) => Bound::Excluded(key.to_string()),
            None => Bound::Unbounded,
        };

        Ok(entries
            .range((lower, upper))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    fn clone_box(&self) -> Box<dyn Read> {
        Box::new(self.clone())
    }
}

impl Write for BTreeState {
    fn commit(&self, state_changes: &[StateChange]) -> Result<(), StateWriteError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|err| StateWriteError::StorageError(Box::new(LockError(err.to_string()))))?;

        for change in state_changes {
            match change {
                StateChange::Set { key, value } => {
                    entries.insert(key.clone(), value.clone());
                }
                StateChange::Delete { key } => {
                    entries.remove(key);
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug)]
struct LockError(String);

impl std::fmt::Display for LockError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "state lock poisoned: {}", self.0)
    }
}

impl std::error::Error for LockError {}
