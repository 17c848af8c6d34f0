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

//! Routes an invocation's function name to its registered handler.
//!
//! The mapping is built once during process bootstrap and is read-only for
//! the rest of the process's life: the router moves into the dispatcher by
//! value before the service loop starts, so no registration is reachable
//! afterwards.

mod error;

use std::collections::HashMap;

use crate::handler::FunctionHandler;
pub use crate::router::error::RoutingError;

#[derive(Default)]
pub struct FunctionRouter {
    handlers: HashMap<String, Box<dyn FunctionHandler>>,
}

impl FunctionRouter {
    pub fn new() -> Self {
        FunctionRouter::default()
    }

    /// Registers a handler under a case-sensitive function name.  Returns
    /// `DuplicateFunction` if the name is taken; the caller should treat
    /// that as fatal to bootstrap rather than silently overwrite.
    pub fn register(
        &mut self,
        name: &str,
        handler: Box<dyn FunctionHandler>,
    ) -> Result<(), RoutingError> {
        if self.handlers.contains_key(name) {
            return Err(RoutingError::DuplicateFunction(name.to_string()));
        }
        self.handlers.insert(name.to_string(), handler);
        Ok(())
    }

    /// Resolves a function name to the handler registered under it; the
    /// returned reference is the registered handler itself, not a copy.
    pub fn resolve(&self, name: &str) -> Result<&dyn FunctionHandler, RoutingError> {
        self.handlers
            .get(name)
            .map(|handler| handler.as_ref())
            .ok_or_else(|| RoutingError::UnknownFunction(name.to_string()))
    }
}
