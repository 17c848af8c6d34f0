/*
 * Copyright 2019 Bitwise IO, Inc.
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

//! The per-invocation view of a transaction and its state access.
//!
//! A `TransactionContext` is created for each dispatched invocation and
//! discarded once the response is sent.  It is owned exclusively by that
//! invocation: reads see the transaction's own prior writes layered over
//! committed state, and never the write set of any other in-flight
//! transaction.  Conflict detection between transactions happens in the
//! peer's validation pipeline at commit time, not here.

mod error;

use std::collections::BTreeMap;
use std::mem;
use std::vec;

use uuid::Uuid;

pub use crate::context::error::ContextError;
use crate::protocol::InvocationRequest;
use crate::state::{Read, StateChange};

/// Unique id referencing a context in diagnostics; never written to state.
pub type ContextId = [u8; 16];

/// The delimiter reserved for composite keys.  A simple key may not contain
/// it, which is what keeps every key a contract can form inside its own
/// namespace.
const COMPOSITE_KEY_DELIMITER: char = '\u{0}';

/// The greatest code point, used as the exclusive upper bound when scanning
/// all keys under a composite-key prefix.
const MAX_KEY_CODE_POINT: char = '\u{10ffff}';

pub struct TransactionContext {
    id: ContextId,
    transaction_id: String,
    function: String,
    args: Vec<String>,
    creator: Vec<u8>,
    state: Box<dyn Read>,
    state_changes: Vec<StateChange>,
    finalized: bool,
}

impl TransactionContext {
    pub fn new(request: InvocationRequest, state: Box<dyn Read>) -> Self {
        let (transaction_id, function, args, creator) = request.into_parts();
        TransactionContext {
            id: *Uuid::new_v4().as_bytes(),
            transaction_id,
            function,
            args,
            creator,
            state,
            state_changes: Vec::new(),
            finalized: false,
        }
    }

    pub fn id(&self) -> &ContextId {
        &self.id
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn creator(&self) -> &[u8] {
        &self.creator
    }

    /// Returns the value currently visible for `key` within this
    /// transaction: the transaction's own most recent write if it has one,
    /// otherwise the committed value, otherwise `None`.
    pub fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, ContextError> {
        self.check_active()?;
        validate_key(key)?;

        if let Some(change) = self
            .state_changes
            .iter()
            .rev()
            .find(|change| change.has_key(key))
        {
            return Ok(match change {
                StateChange::Set { value, .. } => Some(value.clone()),
                StateChange::Delete { .. } => None,
            });
        }

        Ok(self
            .state
            .get(&[key.to_string()])?
            .into_iter()
            .map(|(_, value)| value)
            .next())
    }

    /// Records an intended write.  Not durable until the peer commits the
    /// transaction; overwriting the same key keeps only the last value.
    pub fn set_state(&mut self, key: String, value: Vec<u8>) -> Result<(), ContextError> {
        self.check_active()?;
        validate_key(&key)?;
        self.state_changes.push(StateChange::Set { key, value });
        Ok(())
    }

    /// Records an intended deletion, equivalent to a write of "absent".
    pub fn delete_state(&mut self, key: &str) -> Result<(), ContextError> {
        self.check_active()?;
        validate_key(key)?;
        self.state_changes.push(StateChange::Delete {
            key: key.to_string(),
        });
        Ok(())
    }

    /// Returns the entries visible to this transaction with keys in
    /// `[start, end)`: committed entries merged with this transaction's own
    /// write set.  An absent bound leaves that side open.
    pub fn get_state_range(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<StateRange, ContextError> {
        self.check_active()?;

        let mut merged: BTreeMap<String, Vec<u8>> =
            self.state.range(start, end)?.into_iter().collect();

        for change in &self.state_changes {
            if !in_bounds(change.key(), start, end) {
                continue;
            }
            match change {
                StateChange::Set { key, value } => {
                    merged.insert(key.clone(), value.clone());
                }
                StateChange::Delete { key } => {
                    merged.remove(key);
                }
            }
        }

        Ok(StateRange {
            entries: merged.into_iter().collect::<Vec<_>>().into_iter(),
        })
    }

    /// Returns the entries visible to this transaction whose composite keys
    /// begin with the given object type and attribute prefix, in key order.
    pub fn get_state_by_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<StateRange, ContextError> {
        let prefix = composite_key(object_type, attributes)?;
        let end = format!("{}{}", prefix, MAX_KEY_CODE_POINT);
        self.get_state_range(Some(&prefix), Some(&end))
    }

    /// Collapses the write set to its last-write-wins form, ordered by key,
    /// and seals the context.  Every state access after this fails.
    pub fn finalize(&mut self) -> Vec<StateChange> {
        self.finalized = true;

        let mut collapsed: BTreeMap<String, StateChange> = BTreeMap::new();
        for change in mem::take(&mut self.state_changes) {
            collapsed.insert(change.key().to_string(), change);
        }
        collapsed.into_iter().map(|(_, change)| change).collect()
    }

    fn check_active(&self) -> Result<(), ContextError> {
        if self.finalized {
            return Err(ContextError::ContextFinalized(format!(
                "transaction {} has been finalized",
                self.transaction_id
            )));
        }
        Ok(())
    }
}

/// A finite, key-ordered sequence of `(key, value)` entries.
///
/// The iterator owns its snapshot; dropping it releases the resource on
/// every exit path, including a handler failure partway through iteration.
pub struct StateRange {
    entries: vec::IntoIter<(String, Vec<u8>)>,
}

impl Iterator for StateRange {
    type Item = (String, Vec<u8>);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }
}

/// Builds a composite key from an object type and attribute values.
///
/// The key starts with the reserved delimiter and terminates each component
/// with it, so composite keys sort together under their object type and can
/// never collide with a simple key.
pub fn composite_key(object_type: &str, attributes: &[&str]) -> Result<String, ContextError> {
    if object_type.is_empty() {
        return Err(ContextError::AccessViolation(
            "composite key object type must not be empty".to_string(),
        ));
    }

    let mut key = String::new();
    key.push(COMPOSITE_KEY_DELIMITER);
    for component in std::iter::once(&object_type).chain(attributes.iter()) {
        if component.contains(COMPOSITE_KEY_DELIMITER) {
            return Err(ContextError::AccessViolation(format!(
                "composite key component contains the reserved delimiter: {:?}",
                component
            )));
        }
        key.push_str(component);
        key.push(COMPOSITE_KEY_DELIMITER);
    }
    Ok(key)
}

/// Splits a composite key back into its object type and attribute values.
pub fn split_composite_key(key: &str) -> Result<(String, Vec<String>), ContextError> {
    let inner = key.strip_prefix(COMPOSITE_KEY_DELIMITER).ok_or_else(|| {
        ContextError::AccessViolation(format!("not a composite key: {:?}", key))
    })?;
    let inner = inner.strip_suffix(COMPOSITE_KEY_DELIMITER).ok_or_else(|| {
        ContextError::AccessViolation(format!("malformed composite key: {:?}", key))
    })?;

    let mut components = inner.split(COMPOSITE_KEY_DELIMITER);
    let object_type = match components.next() {
        Some(object_type) if !object_type.is_empty() => object_type.to_string(),
        _ => {
            return Err(ContextError::AccessViolation(format!(
                "malformed composite key: {:?}",
                key
            )))
        }
    };
    Ok((object_type, components.map(String::from).collect()))
}

fn validate_key(key: &str) -> Result<(), ContextError> {
    if key.is_empty() {
        return Err(ContextError::AccessViolation(
            "state key must not be empty".to_string(),
        ));
    }
    // Composite keys carry a leading delimiter; anywhere else the delimiter
    // would let a key escape the contract's namespace.
    if !key.starts_with(COMPOSITE_KEY_DELIMITER)
        && key.contains(COMPOSITE_KEY_DELIMITER)
    {
        return Err(ContextError::AccessViolation(format!(
            "key contains the reserved namespace delimiter: {:?}",
            key
        )));
    }
    Ok(())
}

fn in_bounds(key: &str, start: Option<&str>, end: Option<&str>) -> bool {
    if let Some(start) = start {
        if key < start {
            return false;
        }
    }
    if let Some(end) = end {
        if key >= end {
            return false;
        }
    }
    true
}
