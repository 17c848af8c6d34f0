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

//! End-to-end tests of a contract process served over the loopback peer.

use std::thread;
use std::thread::JoinHandle;

use chaincode::context::TransactionContext;
use chaincode::dispatch::Dispatcher;
use chaincode::handler::ApplyError;
use chaincode::process::loopback::{LoopbackHandle, LoopbackPeer};
use chaincode::process::{ContractProcess, ProcessError};
use chaincode::protocol::{InvocationRequest, InvocationRequestBuilder, Response};
use chaincode::router::FunctionRouter;
use chaincode::state::btree::BTreeState;
use chaincode::state::{Read, StateChange, Write};

fn apply_create(context: &mut TransactionContext) -> Result<Vec<u8>, ApplyError> {
    let args = context.args().to_vec();
    if args.len() != 1 {
        return Err(ApplyError::InvalidTransaction(format!(
            "create expects 1 argument, got {}",
            args.len()
        )));
    }
    if context.get_state(&args[0])?.is_some() {
        return Err(ApplyError::InvalidTransaction(format!(
            "asset {} already exists",
            args[0]
        )));
    }
    context.set_state(args[0].clone(), b"created".to_vec())?;
    Ok(Vec::new())
}

fn apply_get(context: &mut TransactionContext) -> Result<Vec<u8>, ApplyError> {
    let args = context.args().to_vec();
    if args.len() != 1 {
        return Err(ApplyError::InvalidTransaction(format!(
            "get expects 1 argument, got {}",
            args.len()
        )));
    }
    context
        .get_state(&args[0])?
        .ok_or_else(|| ApplyError::InvalidTransaction(format!("no such asset: {}", args[0])))
}

fn apply_list(context: &mut TransactionContext) -> Result<Vec<u8>, ApplyError> {
    let args = context.args().to_vec();
    if args.len() != 2 {
        return Err(ApplyError::InvalidTransaction(format!(
            "list expects 2 arguments, got {}",
            args.len()
        )));
    }
    let mut listing = Vec::new();
    for (key, _) in context.get_state_range(Some(&args[0]), Some(&args[1]))? {
        if !listing.is_empty() {
            listing.push(b',');
        }
        listing.extend_from_slice(key.as_bytes());
    }
    Ok(listing)
}

fn apply_transfer(_context: &mut TransactionContext) -> Result<Vec<u8>, ApplyError> {
    panic!("transfer balance table corrupted")
}

fn start_contract(state: &BTreeState) -> (LoopbackHandle, JoinHandle<Result<(), ProcessError>>) {
    let mut router = FunctionRouter::new();
    router
        .register("create", Box::new(apply_create))
        .expect("Unable to register create");
    router
        .register("get", Box::new(apply_get))
        .expect("Unable to register get");
    router
        .register("list", Box::new(apply_list))
        .expect("Unable to register list");
    router
        .register("transfer", Box::new(apply_transfer))
        .expect("Unable to register transfer");

    let dispatcher = Dispatcher::new(router).with_initializer(Box::new(
        |context: &mut TransactionContext| -> Result<Vec<u8>, ApplyError> {
            for arg in context.args().to_vec() {
                context.set_state(arg, b"created".to_vec())?;
            }
            Ok(Vec::new())
        },
    ));

    let process = ContractProcess::new("assets", dispatcher, state.clone_box());
    let (peer, handle) = LoopbackPeer::new();
    let service = thread::Builder::new()
        .name("assets-process".into())
        .spawn(move || process.start(&peer))
        .expect("Unable to spawn service thread");

    (handle, service)
}

fn make_request(transaction_id: &str, function: &str, args: Vec<&str>) -> InvocationRequest {
    InvocationRequestBuilder::new()
        .with_transaction_id(transaction_id.to_string())
        .with_function(function.to_string())
        .with_args(args.into_iter().map(String::from).collect())
        .build()
        .expect("Unable to build request")
}

/// Drives an invocation and commits its write set on success, the way the
/// peer's commit pipeline would after validation.
fn invoke_and_commit(
    handle: &LoopbackHandle,
    state: &BTreeState,
    request: InvocationRequest,
) -> (Response, Vec<StateChange>) {
    let (response, changes) = handle.invoke(request).expect("Unable to invoke");
    state.commit(&changes).expect("Unable to commit");
    (response, changes)
}

/// Init with no arguments succeeds with an empty payload and writes nothing.
#[test]
fn init_without_arguments_is_an_empty_success() {
    let state = BTreeState::new();
    let (handle, service) = start_contract(&state);

    let (response, changes) = handle
        .init(make_request("txn-genesis", "", vec![]))
        .expect("Unable to init");

    assert_eq!(response, Response::success(Vec::new()));
    assert!(changes.is_empty());

    handle.shutdown().expect("Unable to send shutdown");
    service.join().expect("Service thread panicked").unwrap();
}

/// Init arguments become the genesis transaction's write set.
#[test]
fn init_arguments_seed_state() {
    let state = BTreeState::new();
    let (handle, service) = start_contract(&state);

    let (response, changes) = handle
        .init(make_request("txn-genesis", "", vec!["asset-a", "asset-b"]))
        .expect("Unable to init");
    assert!(response.is_success());
    assert_eq!(changes.len(), 2);
    state.commit(&changes).expect("Unable to commit");

    let (response, _) = invoke_and_commit(
        &handle,
        &state,
        make_request("txn-1", "get", vec!["asset-a"]),
    );
    assert_eq!(response, Response::success(b"created".to_vec()));

    handle.shutdown().expect("Unable to send shutdown");
    service.join().expect("Service thread panicked").unwrap();
}

/// An unregistered function name surfaces as an ordinary failure response
/// and the process keeps serving.
#[test]
fn unknown_function_fails_without_stopping_the_process() {
    let state = BTreeState::new();
    let (handle, service) = start_contract(&state);

    let (response, changes) = handle
        .invoke(make_request("txn-1", "mint", vec![]))
        .expect("Unable to invoke");
    match response {
        Response::Failure { message } => assert!(message.contains("mint")),
        res => panic!("Expected failure, got {:?}", res),
    }
    assert!(changes.is_empty());

    let (response, _) = invoke_and_commit(
        &handle,
        &state,
        make_request("txn-2", "create", vec!["asset-a"]),
    );
    assert!(response.is_success());

    handle.shutdown().expect("Unable to send shutdown");
    service.join().expect("Service thread panicked").unwrap();
}

/// A handler arity violation produces a validation failure and commits no
/// state.
#[test]
fn create_without_arguments_fails_validation() {
    let state = BTreeState::new();
    let (handle, service) = start_contract(&state);

    let (response, changes) = handle
        .invoke(make_request("txn-1", "create", vec![]))
        .expect("Unable to invoke");
    match response {
        Response::Failure { message } => assert!(message.contains("expects 1 argument")),
        res => panic!("Expected failure, got {:?}", res),
    }
    assert!(changes.is_empty());
    assert!(state.range(None, None).expect("Unable to read state").is_empty());

    handle.shutdown().expect("Unable to send shutdown");
    service.join().expect("Service thread panicked").unwrap();
}

/// A panicking handler becomes a failure response; the process stays alive
/// and serves the next invocation normally.
#[test]
fn handler_fault_does_not_kill_the_process() {
    let state = BTreeState::new();
    let (handle, service) = start_contract(&state);

    let (response, changes) = handle
        .invoke(make_request("txn-1", "transfer", vec![]))
        .expect("Unable to invoke");
    match response {
        Response::Failure { message } => assert!(message.contains("handler fault")),
        res => panic!("Expected failure, got {:?}", res),
    }
    assert!(changes.is_empty());

    let (response, _) = invoke_and_commit(
        &handle,
        &state,
        make_request("txn-2", "create", vec!["asset-a"]),
    );
    assert!(response.is_success());

    handle.shutdown().expect("Unable to send shutdown");
    service.join().expect("Service thread panicked").unwrap();
}

/// Committed entries are visible to later transactions, and range listings
/// come back in key order bounded by `[start, end)`.
#[test]
fn committed_state_flows_into_later_transactions() {
    let state = BTreeState::new();
    let (handle, service) = start_contract(&state);

    for (i, name) in ["asset-c", "asset-a", "asset-b", "zzz"].iter().enumerate() {
        let (response, _) = invoke_and_commit(
            &handle,
            &state,
            make_request(&format!("txn-{}", i), "create", vec![*name]),
        );
        assert!(response.is_success());
    }

    let (response, _) = invoke_and_commit(
        &handle,
        &state,
        make_request("txn-list", "list", vec!["asset-a", "asset-z"]),
    );
    assert_eq!(
        response,
        Response::success(b"asset-a,asset-b,asset-c".to_vec())
    );

    // Creating the same asset twice is rejected by the handler's state
    // precondition, and the rejection commits nothing.
    let (response, changes) = handle
        .invoke(make_request("txn-dup", "create", vec!["asset-a"]))
        .expect("Unable to invoke");
    match response {
        Response::Failure { message } => assert!(message.contains("already exists")),
        res => panic!("Expected failure, got {:?}", res),
    }
    assert!(changes.is_empty());

    handle.shutdown().expect("Unable to send shutdown");
    service.join().expect("Service thread panicked").unwrap();
}
