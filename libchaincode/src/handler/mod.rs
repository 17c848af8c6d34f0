/*
 * Copyright 2017 Bitwise IO, Inc.
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

//! The trait implemented by a contract's business logic.
//!
//! Handlers must be stateless and deterministic: identical arguments against
//! identical world state must produce identical payloads and write sets on
//! every peer, so handlers must not consult wall-clock time, randomness, or
//! any I/O outside the transaction context they are given.

mod error;

pub use crate::handler::error::ApplyError;
use crate::context::TransactionContext;

/// A single contract function, registered under a name at process bootstrap.
///
/// Apply is called once per invocation routed to this function.  The
/// returned payload is forwarded to the peer unchanged on success; an
/// `ApplyError` becomes a failure response and discards the transaction's
/// write set.  Argument validation is the handler's responsibility; the
/// router passes the raw argument sequence through unmodified.
pub trait FunctionHandler: Send + Sync {
    fn apply(&self, context: &mut TransactionContext) -> Result<Vec<u8>, ApplyError>;
}

impl<F> FunctionHandler for F
where
    F: Fn(&mut TransactionContext) -> Result<Vec<u8>, ApplyError> + Send + Sync,
{
    fn apply(&self, context: &mut TransactionContext) -> Result<Vec<u8>, ApplyError> {
        (self)(context)
    }
}
