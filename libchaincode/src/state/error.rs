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

use std::error::Error;
use std::fmt;

/// An error that may occur on state reads.
#[derive(Debug)]
pub enum StateReadError {
    /// A poorly formed or invalid key was provided.
    InvalidKey(String),
    /// An error occurred with the underlying storage mechanism.
    StorageError(Box<dyn Error + Send>),
}

impl fmt::Display for StateReadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StateReadError::InvalidKey(key) => write!(f, "Invalid Key: {}", key),
            StateReadError::StorageError(err) => write!(f, "Storage Error: {}", err),
        }
    }
}

impl Error for StateReadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StateReadError::InvalidKey(_) => None,
            StateReadError::StorageError(err) => Some(err.as_ref()),
        }
    }
}

/// An error that may occur on state writes.
#[derive(Debug)]
pub enum StateWriteError {
    /// A poorly formed or invalid key was provided.
    InvalidKey(String),
    /// An error occurred with the underlying storage mechanism.
    StorageError(Box<dyn Error + Send>),
}

impl fmt::Display for StateWriteError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StateWriteError::InvalidKey(key) => write!(f, "Invalid Key: {}", key),
            StateWriteError::StorageError(err) => write!(f, "Storage Error: {}", err),
        }
    }
}

impl Error for StateWriteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StateWriteError::InvalidKey(_) => None,
            StateWriteError::StorageError(err) => Some(err.as_ref()),
        }
    }
}
