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

//! A single transaction invocation as dispatched by the peer.

use std::error::Error as StdError;
use std::fmt;

/// Everything the peer supplies for one invocation of a contract.
///
/// The transaction id is unique per invocation and is assigned by the peer;
/// the function name selects the handler; the arguments are passed to the
/// handler unmodified and in their original order.  The creator is the
/// opaque identity material of the client that submitted the transaction
/// proposal, and may be empty when the peer does not forward it.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    transaction_id: String,
    function: String,
    args: Vec<String>,
    creator: Vec<u8>,
}

impl InvocationRequest {
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

    pub(crate) fn into_parts(self) -> (String, String, Vec<String>, Vec<u8>) {
        (
            self.transaction_id,
            self.function,
            self.args,
            self.creator,
        )
    }
}

#[derive(Debug, PartialEq)]
pub enum InvocationBuildError {
    MissingField(String),
}

impl StdError for InvocationBuildError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        None
    }
}

impl fmt::Display for InvocationBuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            InvocationBuildError::MissingField(ref s) => write!(f, "MissingField: {}", s),
        }
    }
}

#[derive(Default, Clone)]
pub struct InvocationRequestBuilder {
    transaction_id: Option<String>,
    function: Option<String>,
    args: Option<Vec<String>>,
    creator: Option<Vec<u8>>,
}

impl InvocationRequestBuilder {
    pub fn new() -> Self {
        InvocationRequestBuilder::default()
    }

    pub fn with_transaction_id(mut self, transaction_id: String) -> InvocationRequestBuilder {
        self.transaction_id = Some(transaction_id);
        self
    }

    pub fn with_function(mut self, function: String) -> InvocationRequestBuilder {
        self.function = Some(function);
        self
    }

    pub fn with_args(mut self, args: Vec<String>) -> InvocationRequestBuilder {
        self.args = Some(args);
        self
    }

    pub fn with_creator(mut self, creator: Vec<u8>) -> InvocationRequestBuilder {
        self.creator = Some(creator);
        self
    }

    pub fn build(self) -> Result<InvocationRequest, InvocationBuildError> {
        let transaction_id = self.transaction_id.ok_or_else(|| {
            InvocationBuildError::MissingField("'transaction_id' field is required".to_string())
        })?;
        let function = self.function.ok_or_else(|| {
            InvocationBuildError::MissingField("'function' field is required".to_string())
        })?;
        let args = self.args.unwrap_or_default();
        let creator = self.creator.unwrap_or_default();

        Ok(InvocationRequest {
            transaction_id,
            function,
            args,
            creator,
        })
    }
}
