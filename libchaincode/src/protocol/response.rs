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

//! The outcome of one invocation, as returned to the peer.

use crate::handler::ApplyError;

/// Exactly one of a success payload or a failure message is produced per
/// invocation; the variant is the status indicator the peer inspects before
/// deciding whether the transaction's write set may proceed to commit.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Success { payload: Vec<u8> },
    Failure { message: String },
}

impl Response {
    /// A success response carrying the given payload; the payload may be
    /// empty.
    pub fn success(payload: Vec<u8>) -> Self {
        Response::Success { payload }
    }

    pub fn failure(message: String) -> Self {
        Response::Failure { message }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }
}

impl From<Result<Vec<u8>, ApplyError>> for Response {
    fn from(result: Result<Vec<u8>, ApplyError>) -> Self {
        match result {
            Ok(payload) => Response::Success { payload },
            Err(err) => Response::Failure {
                message: err.to_string(),
            },
        }
    }
}
