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

//! The types exchanged between the peer runtime and a contract process.
//!
//! An `InvocationRequest` carries everything the peer knows about a single
//! transaction invocation; a `Response` carries the single success-or-failure
//! outcome back.

pub mod invocation;
pub mod response;

pub use invocation::{InvocationBuildError, InvocationRequest, InvocationRequestBuilder};
pub use response::Response;
