/*
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
use std::error::Error;

use crate::state::StateReadError;

#[derive(Debug)]
pub enum ContextError {
    /// Returned for a key a contract is not permitted to address: an empty
    /// key, or a simple key embedding the reserved namespace delimiter.
    AccessViolation(String),
    /// Returned for any state access after the context has been finalized.
    ContextFinalized(String),
    /// Returned when the underlying state view fails.
    StorageError(Box<dyn Error + Send>),
}

impl Error for ContextError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ContextError::AccessViolation(_) => None,
            ContextError::ContextFinalized(_) => None,
            ContextError::StorageError(err) => Some(err.as_ref()),
        }
    }
}

impl std::fmt::Display for ContextError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            ContextError::AccessViolation(ref s) => write!(f, "AccessViolation: {}", s),
            ContextError::ContextFinalized(ref s) => write!(f, "ContextFinalized: {}", s),
            ContextError::StorageError(ref err) => write!(f, "StorageError: {}", err),
        }
    }
}

impl From<StateReadError> for ContextError {
    fn from(err: StateReadError) -> Self {
        match err {
            StateReadError::InvalidKey(key) => ContextError::AccessViolation(key),
            StateReadError::StorageError(err) => ContextError::StorageError(err),
        }
    }
}
