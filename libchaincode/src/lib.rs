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

//! Contract-side runtime for a permissioned distributed-ledger peer.
//!
//! A contract process registers its functions with a `FunctionRouter`, wraps
//! the router in a `Dispatcher`, and hands both to a `ContractProcess`, which
//! serves invocations dispatched by the peer for the life of the process.
//! Handlers read and write world state exclusively through the
//! `TransactionContext` bound to their invocation; the resulting write set is
//! surfaced to the peer alongside the response and is not durable until the
//! peer's validation and commit pipeline applies it.

pub mod context;
pub mod dispatch;
pub mod handler;
pub mod process;
pub mod protocol;
pub mod router;
pub mod state;

#[macro_use]
extern crate log;
