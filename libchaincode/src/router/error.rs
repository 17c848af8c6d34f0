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

#[derive(Debug, PartialEq)]
pub enum RoutingError {
    /// Returned when a function name is registered twice.  Duplicate
    /// registration is a configuration error detected at bootstrap, not a
    /// runtime condition.
    DuplicateFunction(String),
    /// Returned when no handler is registered under the invoked name.
    UnknownFunction(String),
}

impl Error for RoutingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl std::fmt::Display for RoutingError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            RoutingError::DuplicateFunction(ref s) => {
                write!(f, "DuplicateFunction: {}", s)
            }
            RoutingError::UnknownFunction(ref s) => write!(f, "UnknownFunction: {}", s),
        }
    }
}
