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

/// Errors from the process bootstrap and service loop.  These are the only
/// errors in the crate that are allowed to terminate the process: they occur
/// outside any transaction, so exiting drops no accepted work.
#[derive(Debug, PartialEq)]
pub enum ProcessError {
    /// Returned when registration with the peer-facing runtime fails.
    RegistrationError(String),
    /// Returned when the peer connection is severed while serving.
    ConnectionClosed(String),
}

impl Error for ProcessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl std::fmt::Display for ProcessError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            ProcessError::RegistrationError(ref s) => write!(f, "RegistrationError: {}", s),
            ProcessError::ConnectionClosed(ref s) => write!(f, "ConnectionClosed: {}", s),
        }
    }
}
